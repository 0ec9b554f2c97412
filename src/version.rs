//! Semantic version model and its precedence rules.
//!
//! Ordering follows semver precedence with one addition: the `SNAPSHOT`
//! marker sorts below every named pre-release of the same normal version.
//! Build metadata never takes part in comparisons.
use crate::error::{ReckonError, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;
use std::sync::OnceLock;

/// Pre-release text that parses to [`PreRelease::Snapshot`].
pub const SNAPSHOT_MARKER: &str = "SNAPSHOT";

const VERSION_PATTERN: &str = r"^(0|[1-9][0-9]*)\.(0|[1-9][0-9]*)\.(0|[1-9][0-9]*)(?:-([0-9A-Za-z-]+(?:\.[0-9A-Za-z-]+)*))?(?:\+([0-9A-Za-z-]+(?:\.[0-9A-Za-z-]+)*))?$";

fn version_regex() -> &'static Regex {
    static VERSION_RE: OnceLock<Regex> = OnceLock::new();
    VERSION_RE.get_or_init(|| Regex::new(VERSION_PATTERN).expect("version pattern compiles"))
}

/// Component of the normal version a scope escalates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scope {
    Major,
    Minor,
    Patch,
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Scope::Major => "major",
            Scope::Minor => "minor",
            Scope::Patch => "patch",
        };
        f.write_str(text)
    }
}

/// The release line: `major.minor.patch`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Normal {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
}

impl Normal {
    pub const ZERO: Normal = Normal {
        major: 0,
        minor: 0,
        patch: 0,
    };

    pub fn new(major: u64, minor: u64, patch: u64) -> Self {
        Normal {
            major,
            minor,
            patch,
        }
    }

    /// Increment `scope` and reset every lower component to zero.
    ///
    /// Fails when the component is already `u64::MAX`.
    pub fn increment(self, scope: Scope) -> Result<Self> {
        let component = match scope {
            Scope::Major => self.major,
            Scope::Minor => self.minor,
            Scope::Patch => self.patch,
        };
        let next = component.checked_add(1).ok_or_else(|| {
            parse_error(
                &self.to_string(),
                format!("{scope} component cannot be incremented past {component}"),
            )
        })?;
        Ok(match scope {
            Scope::Major => Normal::new(next, 0, 0),
            Scope::Minor => Normal::new(self.major, next, 0),
            Scope::Patch => Normal::new(self.major, self.minor, next),
        })
    }
}

impl fmt::Display for Normal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// One dot-separated pre-release identifier.
///
/// Variant order matters: the derived `Ord` places numeric identifiers below
/// alphanumeric ones, as semver requires.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Identifier {
    Numeric(u64),
    Alpha(String),
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Identifier::Numeric(value) => write!(f, "{value}"),
            Identifier::Alpha(value) => f.write_str(value),
        }
    }
}

/// Qualifier marking a version as not yet final.
///
/// `Snapshot` is declared first so the derived `Ord` sorts it below any
/// named qualifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PreRelease {
    Snapshot,
    Named(Vec<Identifier>),
}

impl PreRelease {
    /// `<name>.<number>`, the shape stage strategies produce.
    pub fn stage(name: &str, number: u64) -> Self {
        PreRelease::Named(vec![
            Identifier::Alpha(name.to_string()),
            Identifier::Numeric(number),
        ])
    }

    /// Leading alphanumeric identifier, if any.
    pub fn stage_name(&self) -> Option<&str> {
        match self {
            PreRelease::Named(identifiers) => match identifiers.first() {
                Some(Identifier::Alpha(name)) => Some(name.as_str()),
                _ => None,
            },
            PreRelease::Snapshot => None,
        }
    }

    /// Counter of a `<name>.<number>` qualifier. Longer qualifiers have none.
    pub fn stage_number(&self) -> Option<u64> {
        match self {
            PreRelease::Named(identifiers) => match identifiers.as_slice() {
                [Identifier::Alpha(_), Identifier::Numeric(number)] => Some(*number),
                _ => None,
            },
            PreRelease::Snapshot => None,
        }
    }

    fn parse(text: &str, input: &str) -> Result<Self> {
        if text == SNAPSHOT_MARKER {
            return Ok(PreRelease::Snapshot);
        }
        let mut identifiers = Vec::new();
        for part in text.split('.') {
            identifiers.push(parse_identifier(part, input)?);
        }
        Ok(PreRelease::Named(identifiers))
    }
}

impl fmt::Display for PreRelease {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PreRelease::Snapshot => f.write_str(SNAPSHOT_MARKER),
            PreRelease::Named(identifiers) => {
                for (idx, identifier) in identifiers.iter().enumerate() {
                    if idx > 0 {
                        f.write_str(".")?;
                    }
                    write!(f, "{identifier}")?;
                }
                Ok(())
            }
        }
    }
}

fn parse_identifier(part: &str, input: &str) -> Result<Identifier> {
    if !part.bytes().all(|byte| byte.is_ascii_digit()) {
        return Ok(Identifier::Alpha(part.to_string()));
    }
    if part.len() > 1 && part.starts_with('0') {
        return Err(parse_error(
            input,
            format!("numeric identifier {part:?} has a leading zero"),
        ));
    }
    part.parse::<u64>()
        .map(Identifier::Numeric)
        .map_err(|err| parse_error(input, format!("identifier {part:?}: {err}")))
}

fn parse_component(text: &str, input: &str) -> Result<u64> {
    text.parse::<u64>()
        .map_err(|err| parse_error(input, format!("component {text:?}: {err}")))
}

fn parse_error(input: &str, reason: impl Into<String>) -> ReckonError {
    ReckonError::VersionParse {
        input: input.to_string(),
        reason: reason.into(),
    }
}

/// A parsed semantic version.
///
/// Equality, hashing and ordering ignore build metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct Version {
    normal: Normal,
    pre_release: Option<PreRelease>,
    build: Option<String>,
}

impl Version {
    pub fn new(major: u64, minor: u64, patch: u64) -> Self {
        Version::final_release(Normal::new(major, minor, patch))
    }

    pub fn final_release(normal: Normal) -> Self {
        Version {
            normal,
            pre_release: None,
            build: None,
        }
    }

    pub fn with_pre_release(normal: Normal, pre_release: PreRelease) -> Self {
        Version {
            normal,
            pre_release: Some(pre_release),
            build: None,
        }
    }

    pub fn snapshot(normal: Normal) -> Self {
        Version::with_pre_release(normal, PreRelease::Snapshot)
    }

    /// Attach build metadata. The text is kept verbatim for display only.
    pub fn with_build(mut self, build: impl Into<String>) -> Self {
        self.build = Some(build.into());
        self
    }

    pub fn parse(input: &str) -> Result<Self> {
        let caps = version_regex()
            .captures(input)
            .ok_or_else(|| parse_error(input, "expected MAJOR.MINOR.PATCH[-PRE][+BUILD]"))?;
        let normal = Normal::new(
            parse_component(&caps[1], input)?,
            parse_component(&caps[2], input)?,
            parse_component(&caps[3], input)?,
        );
        let pre_release = match caps.get(4) {
            Some(text) => Some(PreRelease::parse(text.as_str(), input)?),
            None => None,
        };
        Ok(Version {
            normal,
            pre_release,
            build: caps.get(5).map(|text| text.as_str().to_string()),
        })
    }

    pub fn normal(&self) -> Normal {
        self.normal
    }

    pub fn pre_release(&self) -> Option<&PreRelease> {
        self.pre_release.as_ref()
    }

    pub fn build(&self) -> Option<&str> {
        self.build.as_deref()
    }

    /// True when there is no pre-release qualifier.
    pub fn is_final(&self) -> bool {
        self.pre_release.is_none()
    }

    /// Precedence with named stages ranked by `order` instead of lexically.
    pub fn cmp_with(&self, other: &Version, order: &StageOrder) -> Ordering {
        self.normal.cmp(&other.normal).then_with(|| {
            match (&self.pre_release, &other.pre_release) {
                (None, None) => Ordering::Equal,
                (None, Some(_)) => Ordering::Greater,
                (Some(_), None) => Ordering::Less,
                (Some(left), Some(right)) => order.compare_pre_release(left, right),
            }
        })
    }
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Version {}

impl Hash for Version {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.normal.hash(state);
        self.pre_release.hash(state);
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        self.cmp_with(other, &StageOrder::default())
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.normal)?;
        if let Some(pre_release) = &self.pre_release {
            write!(f, "-{pre_release}")?;
        }
        if let Some(build) = &self.build {
            write!(f, "+{build}")?;
        }
        Ok(())
    }
}

impl FromStr for Version {
    type Err = ReckonError;

    fn from_str(input: &str) -> Result<Self> {
        Version::parse(input)
    }
}

impl From<Version> for String {
    fn from(version: Version) -> Self {
        version.to_string()
    }
}

impl TryFrom<String> for Version {
    type Error = ReckonError;

    fn try_from(value: String) -> Result<Self> {
        Version::parse(&value)
    }
}

/// Caller-supplied ranking of stage names.
///
/// Listed stages rank by position and below every unlisted stage; unlisted
/// stages keep the default identifier order. An empty order is exactly the
/// default `Ord` on [`Version`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StageOrder {
    stages: Vec<String>,
}

impl StageOrder {
    pub fn new<I, S>(stages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        StageOrder {
            stages: stages.into_iter().map(Into::into).collect(),
        }
    }

    pub fn stages(&self) -> &[String] {
        &self.stages
    }

    fn rank(&self, pre_release: &PreRelease) -> Option<usize> {
        let name = pre_release.stage_name()?;
        self.stages.iter().position(|stage| stage == name)
    }

    fn compare_pre_release(&self, left: &PreRelease, right: &PreRelease) -> Ordering {
        if self.stages.is_empty() {
            return left.cmp(right);
        }
        match (self.rank(left), self.rank(right)) {
            (Some(l), Some(r)) if l != r => l.cmp(&r),
            // Snapshot never has a rank, so it still falls through to `Ord`.
            (Some(_), None) if *right != PreRelease::Snapshot => Ordering::Less,
            (None, Some(_)) if *left != PreRelease::Snapshot => Ordering::Greater,
            _ => left.cmp(right),
        }
    }
}
