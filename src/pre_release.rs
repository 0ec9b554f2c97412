//! Strategies deciding whether and how a version is qualified as pre-release.
use crate::error::{ReckonError, Result};
use crate::inventory::Inventory;
use crate::version::{Normal, PreRelease, StageOrder, Version, SNAPSHOT_MARKER};
use regex::Regex;
use std::sync::OnceLock;

/// Stage name that selects the bare normal version when it is allowed.
pub const FINAL_STAGE: &str = "final";

fn stage_name_regex() -> &'static Regex {
    static STAGE_RE: OnceLock<Regex> = OnceLock::new();
    STAGE_RE.get_or_init(|| Regex::new(r"^[0-9A-Za-z-]+$").expect("stage pattern compiles"))
}

fn validate_stage_name(name: &str) -> Result<()> {
    if !stage_name_regex().is_match(name) {
        return Err(ReckonError::Configuration(format!(
            "stage {name:?} must contain only ASCII letters, digits and '-'"
        )));
    }
    if name.bytes().all(|byte| byte.is_ascii_digit()) {
        return Err(ReckonError::Configuration(format!(
            "stage {name:?} must not be purely numeric"
        )));
    }
    if name == SNAPSHOT_MARKER {
        return Err(ReckonError::Configuration(format!(
            "stage {name:?} is reserved for snapshots"
        )));
    }
    Ok(())
}

fn signal(token: Option<&str>) -> Option<&str> {
    token.map(str::trim).filter(|value| !value.is_empty())
}

/// Named stages with a per-normal counter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageStrategy {
    stages: Vec<String>,
    stage: Option<String>,
}

impl StageStrategy {
    /// Allowed stages in ranking order, `final` included when configured.
    pub fn stages(&self) -> &[String] {
        &self.stages
    }

    fn selected(&self) -> Result<Option<&str>> {
        let Some(stage) = signal(self.stage.as_deref()) else {
            return Ok(None);
        };
        if !self.stages.iter().any(|allowed| allowed == stage) {
            return Err(ReckonError::InvalidStage {
                value: stage.to_string(),
                allowed: self.stages.clone(),
            });
        }
        Ok(Some(stage))
    }

    fn stage_order(&self) -> StageOrder {
        StageOrder::new(self.stages.iter().filter(|stage| *stage != FINAL_STAGE).cloned())
    }

    fn version(&self, inventory: &Inventory, normal: Normal) -> Result<Version> {
        match self.selected()? {
            Some(FINAL_STAGE) => Ok(Version::final_release(normal)),
            Some(stage) => Ok(next_stage_version(inventory, normal, stage)),
            None if inventory.is_at_tag() => Ok(Version::final_release(normal)),
            None => Err(ReckonError::UnresolvedStage {
                allowed: self.stages.clone(),
            }),
        }
    }
}

/// Reuse the stage version already on a clean current commit, otherwise the
/// smallest counter nobody has claimed for this `(normal, stage)`.
fn next_stage_version(inventory: &Inventory, normal: Normal, stage: &str) -> Version {
    if inventory.is_clean() {
        let existing = inventory.current_tags().find(|version| {
            version.normal() == normal
                && version.pre_release().and_then(PreRelease::stage_name) == Some(stage)
        });
        if let Some(existing) = existing {
            return existing.clone();
        }
    }
    let mut number = 1;
    loop {
        let candidate = Version::with_pre_release(normal, PreRelease::stage(stage, number));
        if !inventory.is_claimed(&candidate) {
            return candidate;
        }
        number += 1;
    }
}

/// How (and whether) the normal version gets a pre-release qualifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreReleaseStrategy {
    Stage(StageStrategy),
    /// `None` signal means the default, which is a snapshot.
    Snapshot { snapshot: Option<bool> },
    /// Always the bare normal version.
    None,
}

impl PreReleaseStrategy {
    /// Build a stage strategy over an allow-list. Duplicates are dropped, the
    /// first occurrence fixes the ranking.
    pub fn stage_from_signal<I, S>(stages: I, stage: Option<&str>) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut allowed: Vec<String> = Vec::new();
        for name in stages {
            let name = name.into();
            validate_stage_name(&name)?;
            if !allowed.contains(&name) {
                allowed.push(name);
            }
        }
        if allowed.is_empty() {
            return Err(ReckonError::Configuration(
                "stage strategy needs at least one allowed stage".to_string(),
            ));
        }
        Ok(PreReleaseStrategy::Stage(StageStrategy {
            stages: allowed,
            stage: stage.map(str::to_string),
        }))
    }

    pub fn snapshot_from_signal(snapshot: Option<bool>) -> Self {
        PreReleaseStrategy::Snapshot { snapshot }
    }

    /// Whether a signal explicitly asks for a pre-release qualifier.
    ///
    /// Also validates the stage token so a rebuild never hides a bad signal.
    pub fn requests_qualifier(&self) -> Result<bool> {
        match self {
            PreReleaseStrategy::Stage(strategy) => {
                Ok(matches!(strategy.selected()?, Some(stage) if stage != FINAL_STAGE))
            }
            PreReleaseStrategy::Snapshot { snapshot } => Ok(*snapshot == Some(true)),
            PreReleaseStrategy::None => Ok(false),
        }
    }

    /// Ranking used to check the result against the base version.
    pub fn stage_order(&self) -> StageOrder {
        match self {
            PreReleaseStrategy::Stage(strategy) => strategy.stage_order(),
            PreReleaseStrategy::Snapshot { .. } | PreReleaseStrategy::None => {
                StageOrder::default()
            }
        }
    }

    pub fn version(&self, inventory: &Inventory, normal: Normal) -> Result<Version> {
        match self {
            PreReleaseStrategy::Stage(strategy) => strategy.version(inventory, normal),
            PreReleaseStrategy::Snapshot { snapshot } => {
                if snapshot.unwrap_or(true) {
                    Ok(Version::snapshot(normal))
                } else if inventory.is_at_tag() {
                    Ok(Version::final_release(normal))
                } else {
                    Err(ReckonError::UnresolvedVersion)
                }
            }
            PreReleaseStrategy::None => Ok(Version::final_release(normal)),
        }
    }
}

#[cfg(test)]
#[path = "pre_release_tests.rs"]
mod tests;
