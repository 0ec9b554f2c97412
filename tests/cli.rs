mod common;

use common::TestRepo;
use std::path::Path;
use std::process::{Command, Output};

/// Run the binary with a scrubbed environment so host config never leaks in.
fn reckon(dir: &Path, args: &[&str], env: &[(&str, &str)]) -> Output {
    let home = tempfile::tempdir().expect("create temp home");
    let mut command = Command::new(env!("CARGO_BIN_EXE_reckon"));
    command
        .args(args)
        .arg("--repo")
        .arg(dir)
        .env_remove("RECKON_CONFIG")
        .env_remove("RECKON_SCOPE")
        .env_remove("RECKON_STAGE")
        .env_remove("RECKON_SNAPSHOT")
        .env_remove("RECKON_LOG")
        .env_remove("GIT_DIR")
        .env_remove("GIT_WORK_TREE")
        .env("HOME", home.path())
        .env("XDG_CONFIG_HOME", home.path().join("config"));
    for (key, value) in env {
        command.env(key, value);
    }
    command.output().expect("run reckon")
}

fn stdout(output: &Output) -> String {
    assert!(
        output.status.success(),
        "reckon failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

fn released_repo() -> Option<TestRepo> {
    let mut repo = TestRepo::init()?;
    repo.commit();
    repo.tag("v1.2.3");
    Some(repo)
}

#[test]
fn tagged_commit_rebuilds_its_release() {
    let Some(repo) = released_repo() else {
        return;
    };
    let output = reckon(repo.path(), &["version"], &[]);
    assert_eq!(stdout(&output), "1.2.3");
}

#[test]
fn snapshot_requested_on_a_release_targets_the_next_minor() {
    let Some(repo) = released_repo() else {
        return;
    };
    let output = reckon(repo.path(), &["version"], &[("RECKON_SNAPSHOT", "true")]);
    assert_eq!(stdout(&output), "1.3.0-SNAPSHOT");
}

#[test]
fn work_after_a_release_is_a_minor_snapshot() {
    let Some(mut repo) = released_repo() else {
        return;
    };
    repo.commit();
    let output = reckon(repo.path(), &["version"], &[]);
    assert_eq!(stdout(&output), "1.3.0-SNAPSHOT");

    let output = reckon(repo.path(), &["version", "--scope", "major"], &[]);
    assert_eq!(stdout(&output), "2.0.0-SNAPSHOT");
}

#[test]
fn signals_fall_back_to_the_environment() {
    let Some(mut repo) = released_repo() else {
        return;
    };
    repo.commit();
    let output = reckon(
        repo.path(),
        &["version"],
        &[("RECKON_SCOPE", "patch"), ("RECKON_SNAPSHOT", "TRUE")],
    );
    assert_eq!(stdout(&output), "1.2.4-SNAPSHOT");
}

#[test]
fn ambiguous_state_fails_with_a_message() {
    let Some(mut repo) = released_repo() else {
        return;
    };
    repo.commit();
    let output = reckon(repo.path(), &["version", "--snapshot", "false"], &[]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("cannot determine a final version"), "{stderr}");
}

#[test]
fn invalid_scope_is_reported() {
    let Some(repo) = released_repo() else {
        return;
    };
    let output = reckon(repo.path(), &["version", "--scope", "huge"], &[]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("invalid scope"), "{stderr}");
}

#[test]
fn stage_config_numbers_pre_releases() {
    let Some(mut repo) = released_repo() else {
        return;
    };
    repo.write(
        ".reckon.json",
        r#"{"schema_version": 1, "pre_release": {"strategy": "stage", "stages": ["beta", "rc", "final"]}}"#,
    );
    repo.git(&["add", ".reckon.json"]);
    repo.git(&["commit", "--quiet", "-m", "configure stages"]);
    repo.tag("v1.3.0-rc.1");
    repo.commit();

    let output = reckon(
        repo.path(),
        &["version", "--scope", "none", "--stage", "rc"],
        &[],
    );
    assert_eq!(stdout(&output), "1.3.0-rc.2");

    let output = reckon(repo.path(), &["version", "--stage", "alpha"], &[]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("invalid stage"), "{stderr}");
}

#[test]
fn json_report_describes_the_inventory() {
    let Some(mut repo) = released_repo() else {
        return;
    };
    let head = repo.commit();
    let output = reckon(repo.path(), &["version", "--json"], &[]);
    let report: serde_json::Value = serde_json::from_str(&stdout(&output)).expect("parse json");
    assert_eq!(report["version"], "1.3.0-SNAPSHOT");
    assert_eq!(report["reckoned"], true);
    assert_eq!(report["commit"], head.as_str());
    assert_eq!(report["base_version"], "1.2.3");
    assert_eq!(report["commits_since_base"], 1);
    assert_eq!(report["clean"], true);
    assert_eq!(report["config"], "built-in defaults");
}

#[test]
fn inventory_command_lists_tags() {
    let Some(repo) = released_repo() else {
        return;
    };
    let output = reckon(repo.path(), &["inventory", "--json"], &[]);
    let inventory: serde_json::Value =
        serde_json::from_str(&stdout(&output)).expect("parse json");
    assert_eq!(inventory["base_version"], "1.2.3");
    assert_eq!(inventory["commits_since_base"], 0);
    assert_eq!(inventory["clean"], true);
    assert_eq!(inventory["current_commit"], repo.head().as_str());
    assert_eq!(inventory["tagged_versions"]["1.2.3"], repo.head().as_str());

    let output = reckon(repo.path(), &["inventory"], &[]);
    let text = stdout(&output);
    assert!(text.contains("base version: 1.2.3"), "{text}");
    assert!(text.contains("tagged versions: 1"), "{text}");
}

#[test]
fn init_writes_a_config_once() {
    let Some(repo) = released_repo() else {
        return;
    };
    let output = reckon(repo.path(), &["init"], &[]);
    assert!(stdout(&output).starts_with("wrote "));
    let written = std::fs::read_to_string(repo.path().join(".reckon.json")).expect("read config");
    let config: serde_json::Value = serde_json::from_str(&written).expect("parse config");
    assert_eq!(config["schema_version"], 1);
    assert_eq!(config["default_scope"], "minor");

    let again = reckon(repo.path(), &["init"], &[]);
    assert!(!again.status.success());
    let forced = reckon(repo.path(), &["init", "--force"], &[]);
    assert!(forced.status.success());
}

#[test]
fn outside_a_repository_the_version_is_unspecified() {
    if common::find_in_path("git").is_none() {
        return;
    }
    let dir = tempfile::tempdir().expect("create temp dir");
    let output = reckon(dir.path(), &["version"], &[]);
    assert_eq!(stdout(&output), "unspecified");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("no git repository found"), "{stderr}");

    let output = reckon(dir.path(), &["version", "--json"], &[]);
    let report: serde_json::Value = serde_json::from_str(&stdout(&output)).expect("parse json");
    assert_eq!(
        report,
        serde_json::json!({"version": "unspecified", "reckoned": false})
    );
}

#[test]
fn mistyped_repo_path_fails_instead_of_printing_unspecified() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let output = reckon(&dir.path().join("typo"), &["version"], &[]);
    assert!(!output.status.success());
    assert!(output.stdout.is_empty());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("not a directory"), "{stderr}");
}

#[test]
fn init_help_explains_the_default_scope() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let output = reckon(dir.path(), &["init", "--help"], &[]);
    let help = stdout(&output);
    assert!(help.contains("default_scope \"minor\""), "{help}");
}
