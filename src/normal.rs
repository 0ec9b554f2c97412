//! Strategies choosing the normal (release-line) part of the next version.
use crate::error::{ReckonError, Result};
use crate::inventory::Inventory;
use crate::version::{Normal, Scope};

/// Accepted scope tokens, as shown in error messages.
pub const SCOPE_VALUES: &str = "major, minor, patch, none";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScopeToken {
    Absent,
    Unchanged,
    Bump(Scope),
}

fn parse_scope_token(token: Option<&str>) -> Result<ScopeToken> {
    let Some(raw) = token else {
        return Ok(ScopeToken::Absent);
    };
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(ScopeToken::Absent);
    }
    match trimmed.to_ascii_lowercase().as_str() {
        "major" => Ok(ScopeToken::Bump(Scope::Major)),
        "minor" => Ok(ScopeToken::Bump(Scope::Minor)),
        "patch" => Ok(ScopeToken::Bump(Scope::Patch)),
        "none" => Ok(ScopeToken::Unchanged),
        _ => Err(ReckonError::InvalidScope {
            value: raw.to_string(),
            allowed: SCOPE_VALUES.to_string(),
        }),
    }
}

/// Parse a scope token; `none`, empty and absent all mean "no bump".
pub fn parse_scope(token: Option<&str>) -> Result<Option<Scope>> {
    Ok(match parse_scope_token(token)? {
        ScopeToken::Bump(scope) => Some(scope),
        ScopeToken::Absent | ScopeToken::Unchanged => None,
    })
}

/// How the normal version for this build is chosen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NormalStrategy {
    /// Escalate the base version by an external scope token.
    ScopeFromSignal {
        scope: Option<String>,
        /// Applied when the token is absent (not when it is `none`).
        default_scope: Option<Scope>,
    },
    /// Always the configured normal version.
    Fixed(Normal),
    /// The base version's normal, untouched.
    Unchanged,
}

impl NormalStrategy {
    pub fn scope_from_signal(scope: Option<&str>) -> Self {
        NormalStrategy::ScopeFromSignal {
            scope: scope.map(str::to_string),
            default_scope: None,
        }
    }

    /// Set the scope used when no token is supplied. No-op for other variants.
    pub fn with_default_scope(self, default: Option<Scope>) -> Self {
        match self {
            NormalStrategy::ScopeFromSignal { scope, .. } => NormalStrategy::ScopeFromSignal {
                scope,
                default_scope: default,
            },
            other => other,
        }
    }

    /// Whether the caller explicitly asked for a normal other than the base.
    ///
    /// A released commit rebuilt without such a request keeps its version.
    pub fn requests_change(&self, inventory: &Inventory) -> Result<bool> {
        match self {
            NormalStrategy::ScopeFromSignal { scope, .. } => Ok(matches!(
                parse_scope_token(scope.as_deref())?,
                ScopeToken::Bump(_)
            )),
            NormalStrategy::Fixed(normal) => Ok(*normal != inventory.base_normal()),
            NormalStrategy::Unchanged => Ok(false),
        }
    }

    pub fn normal(&self, inventory: &Inventory) -> Result<Normal> {
        let base = inventory.base_normal();
        match self {
            NormalStrategy::ScopeFromSignal {
                scope,
                default_scope,
            } => match parse_scope_token(scope.as_deref())? {
                ScopeToken::Bump(scope) => base.increment(scope),
                ScopeToken::Unchanged => Ok(base),
                ScopeToken::Absent => match default_scope {
                    Some(scope) => base.increment(*scope),
                    None => Ok(base),
                },
            },
            NormalStrategy::Fixed(normal) => Ok(*normal),
            NormalStrategy::Unchanged => Ok(base),
        }
    }
}
