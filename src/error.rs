//! Error taxonomy for version reckoning.

use thiserror::Error;

/// Result type alias for engine operations.
pub type Result<T> = std::result::Result<T, ReckonError>;

/// Everything that can stop a version from being reckoned.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReckonError {
    // Caller wiring (10-19)
    #[error("configuration error: {0}")]
    Configuration(String),

    // Bad external signals (20-29)
    #[error("invalid scope {value:?} (allowed: {allowed})")]
    InvalidScope { value: String, allowed: String },

    #[error("invalid stage {value:?} (allowed: {})", .allowed.join(", "))]
    InvalidStage { value: String, allowed: Vec<String> },

    // Repository state needs more signal (30-39)
    #[error(
        "cannot determine a version without a stage: the tree is dirty or ahead of the last tag \
         (supply one of: {})",
        .allowed.join(", ")
    )]
    UnresolvedStage { allowed: Vec<String> },

    #[error(
        "cannot determine a final version: the tree is dirty or ahead of the last tag \
         (enable snapshot or tag the current commit)"
    )]
    UnresolvedVersion,

    // Ordering and reuse (40-49)
    #[error("version {version} is already claimed by commit {claimed_by} (current commit is {current})")]
    VersionConflict {
        version: String,
        claimed_by: String,
        current: String,
    },

    #[error("version {version} orders below the base version {base} (supply a scope)")]
    VersionRegression { version: String, base: String },

    // Repository access (50-59)
    #[error("inventory error: {0}")]
    Inventory(String),

    // Parsing (60-69)
    #[error("invalid version {input:?}: {reason}")]
    VersionParse { input: String, reason: String },
}

impl ReckonError {
    /// Stable numeric code, grouped by category.
    pub fn code(&self) -> u32 {
        match self {
            ReckonError::Configuration(_) => 10,
            ReckonError::InvalidScope { .. } => 20,
            ReckonError::InvalidStage { .. } => 21,
            ReckonError::UnresolvedStage { .. } => 30,
            ReckonError::UnresolvedVersion => 31,
            ReckonError::VersionConflict { .. } => 40,
            ReckonError::VersionRegression { .. } => 41,
            ReckonError::Inventory(_) => 50,
            ReckonError::VersionParse { .. } => 60,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_stage_lists_allowed_values() {
        let err = ReckonError::InvalidStage {
            value: "gamma".to_string(),
            allowed: vec!["alpha".to_string(), "beta".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "invalid stage \"gamma\" (allowed: alpha, beta)"
        );
        assert_eq!(err.code(), 21);
    }

    #[test]
    fn conflict_names_both_commits() {
        let err = ReckonError::VersionConflict {
            version: "1.2.3".to_string(),
            claimed_by: "abc".to_string(),
            current: "def".to_string(),
        };
        let text = err.to_string();
        assert!(text.contains("abc"));
        assert!(text.contains("def"));
    }
}
