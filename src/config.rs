//! Reckon configuration helpers.
//!
//! The config selects strategy variants and their fixed parameters. Signals
//! (scope, stage, snapshot) are never stored here; they arrive per invocation.
use crate::error::ReckonError;
use crate::git::{TagParser, DEFAULT_TAG_PREFIX};
use crate::normal::{parse_scope, NormalStrategy};
use crate::pre_release::{PreReleaseStrategy, FINAL_STAGE};
use crate::reckoner::Reckoner;
use crate::version::Version;
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

pub const CONFIG_SCHEMA_VERSION: u32 = 1;

/// Repository-level config file, relative to the work tree root.
pub const CONFIG_FILE_NAME: &str = ".reckon.json";

/// Environment variable naming an explicit config file.
pub const CONFIG_PATH_ENV: &str = "RECKON_CONFIG";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReckonConfig {
    pub schema_version: u32,
    #[serde(default)]
    pub normal: NormalConfig,
    #[serde(default)]
    pub pre_release: PreReleaseConfig,
    #[serde(default = "default_tag_prefix")]
    pub tag_prefix: String,
    /// Scope applied when no scope signal is supplied.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_scope: Option<String>,
    /// Reject versions that order below the base version.
    #[serde(default)]
    pub strict_ordering: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "strategy", rename_all = "snake_case")]
pub enum NormalConfig {
    #[default]
    Scope,
    Fixed {
        version: String,
    },
    Unchanged,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "strategy", rename_all = "snake_case")]
pub enum PreReleaseConfig {
    Stage {
        stages: Vec<String>,
    },
    #[default]
    Snapshot,
    None,
}

/// Per-invocation signals from flags or the environment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Signals {
    pub scope: Option<String>,
    pub stage: Option<String>,
    pub snapshot: Option<bool>,
}

/// Only `true` (any case) enables snapshots; every other value disables them.
pub fn parse_snapshot_signal(raw: &str) -> bool {
    raw.trim().eq_ignore_ascii_case("true")
}

fn default_tag_prefix() -> String {
    DEFAULT_TAG_PREFIX.to_string()
}

/// Config used when no file is found, and the stub written by `reckon init`.
///
/// Unlike the engine, it bumps the minor version when no scope is given.
pub fn default_config() -> ReckonConfig {
    ReckonConfig {
        schema_version: CONFIG_SCHEMA_VERSION,
        normal: NormalConfig::Scope,
        pre_release: PreReleaseConfig::Snapshot,
        tag_prefix: default_tag_prefix(),
        default_scope: Some("minor".to_string()),
        strict_ordering: true,
    }
}

/// Pretty JSON for a new config file.
pub fn config_stub() -> String {
    let config = default_config();
    serde_json::to_string_pretty(&config).expect("serialize config stub")
}

impl ReckonConfig {
    pub fn tag_parser(&self) -> TagParser {
        TagParser::new(self.tag_prefix.clone())
    }

    /// Assemble the strategies for one invocation.
    pub fn reckoner(&self, signals: &Signals) -> crate::Result<Reckoner> {
        let default_scope = parse_scope(self.default_scope.as_deref()).map_err(|err| {
            ReckonError::Configuration(format!("default_scope: {err}"))
        })?;
        let normal = match &self.normal {
            NormalConfig::Scope => NormalStrategy::scope_from_signal(signals.scope.as_deref())
                .with_default_scope(default_scope),
            NormalConfig::Fixed { version } => {
                let parsed = Version::parse(version).map_err(|err| {
                    ReckonError::Configuration(format!("fixed normal version: {err}"))
                })?;
                if !parsed.is_final() {
                    return Err(ReckonError::Configuration(format!(
                        "fixed normal version {version:?} must not carry a pre-release"
                    )));
                }
                NormalStrategy::Fixed(parsed.normal())
            }
            NormalConfig::Unchanged => NormalStrategy::Unchanged,
        };
        let pre_release = match &self.pre_release {
            PreReleaseConfig::Stage { stages } => {
                PreReleaseStrategy::stage_from_signal(stages.iter().cloned(), signals.stage.as_deref())?
            }
            PreReleaseConfig::Snapshot => PreReleaseStrategy::snapshot_from_signal(signals.snapshot),
            PreReleaseConfig::None => PreReleaseStrategy::None,
        };
        Reckoner::builder()
            .normal(normal)
            .pre_release(pre_release)
            .strict_ordering(self.strict_ordering)
            .build()
    }
}

/// Validate schema version and every strategy parameter.
pub fn validate_config(config: &ReckonConfig) -> Result<()> {
    if config.schema_version != CONFIG_SCHEMA_VERSION {
        return Err(anyhow!(
            "unsupported reckon config schema_version {}",
            config.schema_version
        ));
    }
    if config.tag_prefix.chars().any(char::is_whitespace) {
        return Err(anyhow!(
            "tag_prefix must not contain whitespace (got {:?})",
            config.tag_prefix
        ));
    }
    if let PreReleaseConfig::Stage { stages } = &config.pre_release {
        if stages.iter().all(|stage| stage == FINAL_STAGE) {
            return Err(anyhow!(
                "stage strategy needs at least one stage besides {FINAL_STAGE:?}"
            ));
        }
    }
    config
        .reckoner(&Signals::default())
        .context("invalid strategy configuration")?;
    Ok(())
}

pub fn load_config(path: &Path) -> Result<ReckonConfig> {
    let bytes = fs::read(path).with_context(|| format!("read config {}", path.display()))?;
    let config: ReckonConfig = serde_json::from_slice(&bytes)
        .with_context(|| format!("parse reckon config JSON {}", path.display()))?;
    Ok(config)
}

/// Write `config` to `<repo_root>/.reckon.json`, refusing to clobber unless forced.
pub fn write_config(repo_root: &Path, config: &ReckonConfig, force: bool) -> Result<PathBuf> {
    let path = repo_root.join(CONFIG_FILE_NAME);
    if path.is_file() && !force {
        return Err(anyhow!(
            "config already exists at {} (use --force to overwrite)",
            path.display()
        ));
    }
    let mut text = serde_json::to_string_pretty(config).context("serialize reckon config")?;
    text.push('\n');
    fs::write(&path, text.as_bytes()).with_context(|| format!("write {}", path.display()))?;
    Ok(path)
}

/// Where the effective config came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    Flag(PathBuf),
    Env(PathBuf),
    Repository(PathBuf),
    User(PathBuf),
    Default,
}

impl ConfigSource {
    pub fn describe(&self) -> String {
        match self {
            ConfigSource::Flag(path) => format!("--config {}", path.display()),
            ConfigSource::Env(path) => format!("{CONFIG_PATH_ENV}={}", path.display()),
            ConfigSource::Repository(path) | ConfigSource::User(path) => {
                path.display().to_string()
            }
            ConfigSource::Default => "built-in defaults".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub config: ReckonConfig,
    pub source: ConfigSource,
}

/// `~/.config/reckon/config.json` (or the platform equivalent).
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("reckon").join("config.json"))
}

/// Resolve config in order: `--config`, `RECKON_CONFIG`, repository file,
/// user config dir, built-in defaults. The result is validated.
pub fn resolve_config(repo_root: Option<&Path>, flag: Option<&Path>) -> Result<ResolvedConfig> {
    let env_path = env::var_os(CONFIG_PATH_ENV)
        .filter(|value| !value.is_empty())
        .map(PathBuf::from);
    resolve_config_from(repo_root, flag, env_path, user_config_path())
}

fn resolve_config_from(
    repo_root: Option<&Path>,
    flag: Option<&Path>,
    env_path: Option<PathBuf>,
    user_path: Option<PathBuf>,
) -> Result<ResolvedConfig> {
    let source = if let Some(path) = flag {
        ConfigSource::Flag(path.to_path_buf())
    } else if let Some(path) = env_path {
        ConfigSource::Env(path)
    } else if let Some(path) = repo_root
        .map(|root| root.join(CONFIG_FILE_NAME))
        .filter(|path| path.is_file())
    {
        ConfigSource::Repository(path)
    } else if let Some(path) = user_path.filter(|path| path.is_file()) {
        ConfigSource::User(path)
    } else {
        ConfigSource::Default
    };

    let config = match &source {
        ConfigSource::Flag(path)
        | ConfigSource::Env(path)
        | ConfigSource::Repository(path)
        | ConfigSource::User(path) => load_config(path)?,
        ConfigSource::Default => default_config(),
    };
    validate_config(&config).with_context(|| format!("validate {}", source.describe()))?;
    Ok(ResolvedConfig { config, source })
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
