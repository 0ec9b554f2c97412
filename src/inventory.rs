//! Frozen snapshot of the repository facts a reckoning needs.
//!
//! An inventory is built once per invocation (usually by
//! [`crate::git::GitRepository`]) and never changes afterwards.
use crate::error::{ReckonError, Result};
use crate::version::{Normal, Version};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Opaque commit identity (a full object id for git).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CommitId(String);

impl CommitId {
    pub fn new(id: impl Into<String>) -> Self {
        CommitId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Abbreviated form for messages.
    pub fn short(&self) -> &str {
        let end = self
            .0
            .char_indices()
            .nth(10)
            .map(|(idx, _)| idx)
            .unwrap_or(self.0.len());
        &self.0[..end]
    }
}

impl fmt::Display for CommitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CommitId {
    fn from(id: &str) -> Self {
        CommitId::new(id)
    }
}

impl From<String> for CommitId {
    fn from(id: String) -> Self {
        CommitId(id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Inventory {
    current_commit: CommitId,
    tagged_versions: BTreeMap<Version, CommitId>,
    claimed_versions: BTreeSet<Version>,
    commits_since_base: u64,
    base_version: Option<Version>,
    clean: bool,
}

impl Inventory {
    pub fn builder(current_commit: impl Into<CommitId>) -> InventoryBuilder {
        InventoryBuilder {
            current_commit: current_commit.into(),
            tags: Vec::new(),
            claims: Vec::new(),
            commits_since_base: 0,
            base_version: None,
            clean: true,
        }
    }

    pub fn current_commit(&self) -> &CommitId {
        &self.current_commit
    }

    /// Every parseable version tag in the repository and the commit it decorates.
    pub fn tagged_versions(&self) -> &BTreeMap<Version, CommitId> {
        &self.tagged_versions
    }

    /// Versions already used anywhere in history.
    pub fn claimed_versions(&self) -> &BTreeSet<Version> {
        &self.claimed_versions
    }

    pub fn commits_since_base(&self) -> u64 {
        self.commits_since_base
    }

    pub fn base_version(&self) -> Option<&Version> {
        self.base_version.as_ref()
    }

    /// Normal component of the base version, `0.0.0` when nothing is tagged.
    pub fn base_normal(&self) -> Normal {
        self.base_version
            .as_ref()
            .map(Version::normal)
            .unwrap_or(Normal::ZERO)
    }

    pub fn is_clean(&self) -> bool {
        self.clean
    }

    /// Clean tree sitting exactly on a tagged commit.
    pub fn is_at_tag(&self) -> bool {
        self.clean && self.commits_since_base == 0 && self.base_version.is_some()
    }

    /// The final version this commit was already released as, if any.
    pub fn released_version(&self) -> Option<&Version> {
        if !self.is_at_tag() {
            return None;
        }
        self.base_version.as_ref().filter(|base| base.is_final())
    }

    pub fn is_claimed(&self, version: &Version) -> bool {
        self.claimed_versions.contains(version)
    }

    /// Commit a claimed version is tagged on, when it is known.
    pub fn claimed_by(&self, version: &Version) -> Option<&CommitId> {
        self.tagged_versions.get(version)
    }

    /// Versions tagged on the current commit, lowest first.
    pub fn current_tags(&self) -> impl Iterator<Item = &Version> {
        self.tagged_versions
            .iter()
            .filter(|(_, commit)| **commit == self.current_commit)
            .map(|(version, _)| version)
    }
}

pub struct InventoryBuilder {
    current_commit: CommitId,
    tags: Vec<(Version, CommitId)>,
    claims: Vec<Version>,
    commits_since_base: u64,
    base_version: Option<Version>,
    clean: bool,
}

impl InventoryBuilder {
    /// Record `version` as tagged on `commit`. Tagged versions are also claimed.
    pub fn tag(mut self, version: Version, commit: impl Into<CommitId>) -> Self {
        self.tags.push((version, commit.into()));
        self
    }

    /// Record a version used elsewhere whose commit is unknown.
    pub fn claim(mut self, version: Version) -> Self {
        self.claims.push(version);
        self
    }

    pub fn commits_since_base(mut self, commits: u64) -> Self {
        self.commits_since_base = commits;
        self
    }

    pub fn base_version(mut self, version: Option<Version>) -> Self {
        self.base_version = version;
        self
    }

    pub fn clean(mut self, clean: bool) -> Self {
        self.clean = clean;
        self
    }

    /// Freeze the inventory. Fails when one version tags two commits.
    pub fn build(self) -> Result<Inventory> {
        let mut tagged_versions: BTreeMap<Version, CommitId> = BTreeMap::new();
        for (version, commit) in self.tags {
            if let Some(existing) = tagged_versions.get(&version) {
                if *existing != commit {
                    return Err(ReckonError::Inventory(format!(
                        "version {version} is tagged on two commits: {existing} and {commit}"
                    )));
                }
                continue;
            }
            tagged_versions.insert(version, commit);
        }

        let mut claimed_versions: BTreeSet<Version> = tagged_versions.keys().cloned().collect();
        claimed_versions.extend(self.claims);

        Ok(Inventory {
            current_commit: self.current_commit,
            tagged_versions,
            claimed_versions,
            commits_since_base: self.commits_since_base,
            base_version: self.base_version,
            clean: self.clean,
        })
    }
}
