use super::{
    config_stub, default_config, load_config, parse_snapshot_signal, resolve_config_from,
    validate_config, write_config, ConfigSource, NormalConfig, PreReleaseConfig, ReckonConfig,
    Signals, CONFIG_FILE_NAME,
};
use crate::inventory::Inventory;
use crate::version::Version;
use std::path::Path;

fn write_file(path: &Path, contents: &str) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("create parent directory");
    }
    std::fs::write(path, contents.as_bytes()).expect("write file");
}

fn ahead_of_release(commits: u64) -> Inventory {
    Inventory::builder("head")
        .tag(Version::new(1, 2, 3), "base")
        .base_version(Some(Version::new(1, 2, 3)))
        .commits_since_base(commits)
        .build()
        .expect("build inventory")
}

#[test]
fn stub_parses_back_to_the_default_config() {
    let parsed: ReckonConfig = serde_json::from_str(&config_stub()).expect("parse stub");
    assert_eq!(parsed, default_config());
    validate_config(&parsed).expect("stub is valid");
}

#[test]
fn omitted_fields_take_defaults() {
    let parsed: ReckonConfig =
        serde_json::from_str(r#"{"schema_version": 1}"#).expect("parse minimal config");
    assert_eq!(parsed.normal, NormalConfig::Scope);
    assert_eq!(parsed.pre_release, PreReleaseConfig::Snapshot);
    assert_eq!(parsed.tag_prefix, "v");
    assert_eq!(parsed.default_scope, None);
    assert!(!parsed.strict_ordering);
}

#[test]
fn strategy_variants_are_tagged() {
    let parsed: ReckonConfig = serde_json::from_str(
        r#"{
            "schema_version": 1,
            "normal": {"strategy": "fixed", "version": "3.1.0"},
            "pre_release": {"strategy": "stage", "stages": ["beta", "rc", "final"]},
            "tag_prefix": ""
        }"#,
    )
    .expect("parse config");
    assert_eq!(
        parsed.normal,
        NormalConfig::Fixed {
            version: "3.1.0".to_string()
        }
    );
    let signals = Signals {
        stage: Some("rc".to_string()),
        ..Signals::default()
    };
    let version = parsed
        .reckoner(&signals)
        .expect("build reckoner")
        .reckon(&ahead_of_release(2))
        .expect("reckon");
    assert_eq!(version.to_string(), "3.1.0-rc.1");
}

#[test]
fn unknown_fields_are_rejected() {
    let err = serde_json::from_str::<ReckonConfig>(r#"{"schema_version": 1, "scope": "major"}"#)
        .expect_err("unknown field");
    assert!(err.to_string().contains("unknown field"));
}

#[test]
fn validation_catches_bad_parameters() {
    let mut config = default_config();
    config.schema_version = 2;
    assert!(validate_config(&config).is_err());

    let mut config = default_config();
    config.default_scope = Some("huge".to_string());
    let err = validate_config(&config).expect_err("bad default scope");
    assert!(format!("{err:#}").contains("default_scope"));

    let mut config = default_config();
    config.normal = NormalConfig::Fixed {
        version: "2.0.0-rc.1".to_string(),
    };
    assert!(validate_config(&config).is_err());

    let mut config = default_config();
    config.pre_release = PreReleaseConfig::Stage {
        stages: vec!["final".to_string()],
    };
    assert!(validate_config(&config).is_err());

    let mut config = default_config();
    config.tag_prefix = "release ".to_string();
    assert!(validate_config(&config).is_err());
}

#[test]
fn default_config_bumps_minor_for_snapshots() {
    let reckoner = default_config()
        .reckoner(&Signals::default())
        .expect("build reckoner");
    let version = reckoner.reckon(&ahead_of_release(3)).expect("reckon");
    assert_eq!(version.to_string(), "1.3.0-SNAPSHOT");

    let signals = Signals {
        scope: Some("patch".to_string()),
        snapshot: Some(false),
        ..Signals::default()
    };
    let err = default_config()
        .reckoner(&signals)
        .expect("build reckoner")
        .reckon(&ahead_of_release(3))
        .expect_err("unresolved without snapshot");
    assert_eq!(err.code(), 31);
}

#[test]
fn snapshot_on_a_released_commit_starts_the_next_line() {
    let released = Inventory::builder("head")
        .tag(Version::new(1, 2, 3), "head")
        .base_version(Some(Version::new(1, 2, 3)))
        .build()
        .expect("build inventory");
    let rebuilt = default_config()
        .reckoner(&Signals::default())
        .expect("build reckoner")
        .reckon(&released)
        .expect("reckon");
    assert_eq!(rebuilt.to_string(), "1.2.3");

    let signals = Signals {
        snapshot: Some(true),
        ..Signals::default()
    };
    let version = default_config()
        .reckoner(&signals)
        .expect("build reckoner")
        .reckon(&released)
        .expect("snapshot of a released commit");
    assert_eq!(version.to_string(), "1.3.0-SNAPSHOT");
    assert!(version > Version::new(1, 2, 3));
}

#[test]
fn snapshot_signal_follows_boolean_text() {
    assert!(parse_snapshot_signal("true"));
    assert!(parse_snapshot_signal(" TRUE "));
    assert!(!parse_snapshot_signal("false"));
    assert!(!parse_snapshot_signal("yes"));
    assert!(!parse_snapshot_signal(""));
}

#[test]
fn resolution_prefers_flag_then_env_then_repository_then_user() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let repo = dir.path().join("repo");
    let flag = dir.path().join("flag.json");
    let env_path = dir.path().join("env.json");
    let user = dir.path().join("user/config.json");
    let body = |prefix: &str| format!(r#"{{"schema_version": 1, "tag_prefix": "{prefix}"}}"#);
    write_file(&repo.join(CONFIG_FILE_NAME), &body("repo-"));
    write_file(&flag, &body("flag-"));
    write_file(&env_path, &body("env-"));
    write_file(&user, &body("user-"));

    let resolved = resolve_config_from(
        Some(repo.as_path()),
        Some(flag.as_path()),
        Some(env_path.clone()),
        Some(user.clone()),
    )
    .expect("resolve");
    assert_eq!(resolved.source, ConfigSource::Flag(flag.clone()));
    assert_eq!(resolved.config.tag_prefix, "flag-");

    let resolved =
        resolve_config_from(Some(repo.as_path()), None, Some(env_path.clone()), Some(user.clone()))
            .expect("resolve");
    assert_eq!(resolved.config.tag_prefix, "env-");

    let resolved =
        resolve_config_from(Some(repo.as_path()), None, None, Some(user.clone())).expect("resolve");
    assert_eq!(
        resolved.source,
        ConfigSource::Repository(repo.join(CONFIG_FILE_NAME))
    );

    let resolved = resolve_config_from(None, None, None, Some(user.clone())).expect("resolve");
    assert_eq!(resolved.source, ConfigSource::User(user));

    let resolved = resolve_config_from(None, None, None, None).expect("resolve");
    assert_eq!(resolved.source, ConfigSource::Default);
    assert_eq!(resolved.config, default_config());
}

#[test]
fn explicit_paths_must_exist() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let missing = dir.path().join("missing.json");
    let err = resolve_config_from(None, Some(missing.as_path()), None, None).expect_err("missing file");
    assert!(format!("{err:#}").contains("missing.json"));
}

#[test]
fn write_config_refuses_to_overwrite_without_force() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let path = write_config(dir.path(), &default_config(), false).expect("write config");
    assert_eq!(load_config(&path).expect("load config"), default_config());
    assert!(write_config(dir.path(), &default_config(), false).is_err());
    write_config(dir.path(), &default_config(), true).expect("forced write");
}
