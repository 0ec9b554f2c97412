//! Inventory loading from a git working copy.
//!
//! Everything goes through the `git` binary found on `PATH`; the history walk
//! runs at most once per [`GitRepository`] handle.
use crate::error::{ReckonError, Result};
use crate::inventory::{CommitId, Inventory};
use crate::version::Version;
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use std::sync::OnceLock;
use std::time::Instant;

/// Tag prefix stripped before parsing when no other is configured.
pub const DEFAULT_TAG_PREFIX: &str = "v";

const TAG_FORMAT: &str = "--format=%(refname:strip=2)%09%(objectname)%09%(*objectname)";

/// Turns tag names into versions. The prefix is optional on each tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagParser {
    prefix: String,
}

impl TagParser {
    pub fn new(prefix: impl Into<String>) -> Self {
        TagParser {
            prefix: prefix.into(),
        }
    }

    pub fn parse(&self, tag: &str) -> Option<Version> {
        let text = tag.strip_prefix(self.prefix.as_str()).unwrap_or(tag);
        Version::parse(text).ok()
    }
}

impl Default for TagParser {
    fn default() -> Self {
        TagParser::new(DEFAULT_TAG_PREFIX)
    }
}

/// Handle on a git working copy.
#[derive(Debug)]
pub struct GitRepository {
    root: PathBuf,
    git: PathBuf,
    tags: TagParser,
    inventory: OnceLock<Inventory>,
}

impl GitRepository {
    /// Find the working copy containing `start`.
    ///
    /// Returns `Ok(None)` when git is not installed or `start` is not inside
    /// a work tree. A `start` that is not a directory is an error.
    pub fn discover(start: &Path) -> Result<Option<Self>> {
        if !start.is_dir() {
            return Err(ReckonError::Inventory(format!(
                "{} does not exist or is not a directory",
                start.display()
            )));
        }
        let Ok(git) = which::which("git") else {
            tracing::debug!("git binary not found on PATH");
            return Ok(None);
        };
        let output = git_output(&git, start, &["rev-parse", "--show-toplevel"])?;
        if !output.status.success() {
            tracing::debug!(path = %start.display(), "not inside a git work tree");
            return Ok(None);
        }
        let root = PathBuf::from(String::from_utf8_lossy(&output.stdout).trim());
        Ok(Some(GitRepository {
            root,
            git,
            tags: TagParser::default(),
            inventory: OnceLock::new(),
        }))
    }

    /// Like [`GitRepository::discover`], but a missing repository is an error.
    pub fn open(start: &Path) -> Result<Self> {
        GitRepository::discover(start)?.ok_or_else(|| {
            ReckonError::Inventory(format!(
                "{} is not inside a git repository (or git is not installed)",
                start.display()
            ))
        })
    }

    /// Use `tags` to read version tags. Drops any cached inventory.
    pub fn with_tags(mut self, tags: TagParser) -> Self {
        self.tags = tags;
        self.inventory = OnceLock::new();
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The inventory for the current state, computed on first access.
    pub fn inventory(&self) -> Result<&Inventory> {
        if let Some(inventory) = self.inventory.get() {
            return Ok(inventory);
        }
        let loaded = self.load_inventory()?;
        Ok(self.inventory.get_or_init(|| loaded))
    }

    fn load_inventory(&self) -> Result<Inventory> {
        let start = Instant::now();
        let head = self.head()?;
        let clean = self
            .run(&["status", "--porcelain", "--untracked-files=normal"])?
            .trim()
            .is_empty();

        let tags = self.tagged_commits()?;
        let reachable: HashSet<String> = self
            .run(&["rev-list", "HEAD"])?
            .lines()
            .map(str::to_string)
            .collect();

        // Highest version per reachable tagged commit.
        let mut candidates: BTreeMap<CommitId, Version> = BTreeMap::new();
        for (version, commit) in &tags {
            if !reachable.contains(commit.as_str()) {
                continue;
            }
            let entry = candidates
                .entry(commit.clone())
                .or_insert_with(|| version.clone());
            if *version > *entry {
                *entry = version.clone();
            }
        }

        let mut base: Option<(u64, Version)> = None;
        for (commit, version) in candidates {
            let distance = self.count(&format!("{}..HEAD", commit.as_str()))?;
            let better = match &base {
                None => true,
                Some((best, best_version)) => {
                    distance < *best || (distance == *best && version > *best_version)
                }
            };
            if better {
                base = Some((distance, version));
            }
        }
        let (commits_since_base, base_version) = match base {
            Some((distance, version)) => (distance, Some(version)),
            None => (self.count("HEAD")?, None),
        };

        let mut builder = Inventory::builder(head)
            .commits_since_base(commits_since_base)
            .base_version(base_version)
            .clean(clean);
        for (version, commit) in tags {
            builder = builder.tag(version, commit);
        }
        let inventory = builder.build()?;

        tracing::info!(
            elapsed_ms = start.elapsed().as_millis() as u64,
            commit = %inventory.current_commit().short(),
            base = ?inventory.base_version().map(ToString::to_string),
            commits_since_base = inventory.commits_since_base(),
            clean = inventory.is_clean(),
            tagged = inventory.tagged_versions().len(),
            "inventory loaded"
        );
        Ok(inventory)
    }

    fn head(&self) -> Result<CommitId> {
        let output = self.output(&["rev-parse", "--verify", "--quiet", "HEAD^{commit}"])?;
        if !output.status.success() {
            return Err(ReckonError::Inventory(format!(
                "repository at {} has no commits",
                self.root.display()
            )));
        }
        Ok(CommitId::new(
            String::from_utf8_lossy(&output.stdout).trim().to_string(),
        ))
    }

    /// Parseable version tags in refname order, resolved to the object they
    /// peel to.
    fn tagged_commits(&self) -> Result<Vec<(Version, CommitId)>> {
        let listing = self.run(&["for-each-ref", TAG_FORMAT, "refs/tags"])?;
        let mut tags = Vec::new();
        for line in listing.lines() {
            let mut fields = line.split('\t');
            let (Some(name), Some(object)) = (fields.next(), fields.next()) else {
                continue;
            };
            let peeled = fields.next().filter(|value| !value.is_empty());
            let Some(version) = self.tags.parse(name) else {
                tracing::debug!(tag = name, "skipping tag that is not a version");
                continue;
            };
            tags.push((version, CommitId::new(peeled.unwrap_or(object))));
        }
        Ok(tags)
    }

    fn count(&self, range: &str) -> Result<u64> {
        let text = self.run(&["rev-list", "--count", range])?;
        text.trim().parse::<u64>().map_err(|err| {
            ReckonError::Inventory(format!("parse commit count {:?}: {err}", text.trim()))
        })
    }

    fn run(&self, args: &[&str]) -> Result<String> {
        let output = self.output(args)?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let detail = stderr.trim().lines().next().unwrap_or_default();
            return Err(ReckonError::Inventory(format!(
                "git {} failed with {}: {detail}",
                args.join(" "),
                output.status
            )));
        }
        String::from_utf8(output.stdout).map_err(|err| {
            ReckonError::Inventory(format!("decode git {} output: {err}", args.join(" ")))
        })
    }

    fn output(&self, args: &[&str]) -> Result<Output> {
        git_output(&self.git, &self.root, args)
    }
}

fn git_output(git: &Path, dir: &Path, args: &[&str]) -> Result<Output> {
    let start = Instant::now();
    let output = Command::new(git)
        .arg("-C")
        .arg(dir)
        .args(args)
        .env("LC_ALL", "C")
        .env("GIT_TERMINAL_PROMPT", "0")
        .output()
        .map_err(|err| ReckonError::Inventory(format!("run git {}: {err}", args.join(" "))))?;
    tracing::debug!(
        elapsed_ms = start.elapsed().as_millis() as u64,
        command = %args.join(" "),
        status = ?output.status.code(),
        stdout_bytes = output.stdout.len(),
        "git command complete"
    );
    Ok(output)
}
