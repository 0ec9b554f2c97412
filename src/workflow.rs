//! Command implementations: gather signals, load the inventory, print results.
use crate::cli::{InitArgs, InventoryArgs, RepoArgs, VersionArgs};
use crate::config::{self, parse_snapshot_signal, ResolvedConfig, Signals};
use crate::git::GitRepository;
use crate::inventory::{CommitId, Inventory};
use crate::version::Version;
use anyhow::{Context, Result};
use serde::Serialize;

/// Printed when there is no repository to reckon from.
pub const UNSPECIFIED_VERSION: &str = "unspecified";

#[derive(Serialize)]
struct VersionReport<'a> {
    version: String,
    reckoned: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    commit: Option<&'a CommitId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    base_version: Option<&'a Version>,
    #[serde(skip_serializing_if = "Option::is_none")]
    commits_since_base: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    clean: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    config: Option<String>,
}

struct RepoContext {
    repo: GitRepository,
    resolved: ResolvedConfig,
}

impl RepoContext {
    fn load(args: &RepoArgs) -> Result<Option<Self>> {
        let Some(repo) = GitRepository::discover(&args.repo)? else {
            return Ok(None);
        };
        let resolved = config::resolve_config(Some(repo.root()), args.config.as_deref())?;
        tracing::debug!(config = %resolved.source.describe(), "resolved config");
        let repo = repo.with_tags(resolved.config.tag_parser());
        Ok(Some(RepoContext { repo, resolved }))
    }

    fn inventory(&self) -> Result<&Inventory> {
        self.repo
            .inventory()
            .with_context(|| format!("load inventory for {}", self.repo.root().display()))
    }
}

pub fn run_version(args: VersionArgs) -> Result<()> {
    let signals = Signals {
        scope: args.scope.clone(),
        stage: args.stage.clone(),
        snapshot: args.snapshot.as_deref().map(parse_snapshot_signal),
    };
    let Some(ctx) = RepoContext::load(&args.repo)? else {
        tracing::warn!(
            path = %args.repo.repo.display(),
            "no git repository found; version will be '{UNSPECIFIED_VERSION}'"
        );
        let report = VersionReport {
            version: UNSPECIFIED_VERSION.to_string(),
            reckoned: false,
            commit: None,
            base_version: None,
            commits_since_base: None,
            clean: None,
            config: None,
        };
        return print_version(&report, args.json);
    };

    let reckoner = ctx
        .resolved
        .config
        .reckoner(&signals)
        .with_context(|| format!("configure strategies from {}", ctx.resolved.source.describe()))?;
    let inventory = ctx.inventory()?;
    let version = reckoner.reckon(inventory)?;
    tracing::info!(version = %version, "reckoned version");

    let report = VersionReport {
        version: version.to_string(),
        reckoned: true,
        commit: Some(inventory.current_commit()),
        base_version: inventory.base_version(),
        commits_since_base: Some(inventory.commits_since_base()),
        clean: Some(inventory.is_clean()),
        config: Some(ctx.resolved.source.describe()),
    };
    print_version(&report, args.json)
}

fn print_version(report: &VersionReport<'_>, json: bool) -> Result<()> {
    if json {
        let text = serde_json::to_string_pretty(report).context("serialize version report")?;
        println!("{text}");
    } else {
        println!("{}", report.version);
    }
    Ok(())
}

pub fn run_inventory(args: InventoryArgs) -> Result<()> {
    let ctx = RepoContext::load(&args.repo)?.with_context(|| {
        format!(
            "{} is not inside a git repository (or git is not installed)",
            args.repo.repo.display()
        )
    })?;
    let inventory = ctx.inventory()?;
    if args.json {
        let text = serde_json::to_string_pretty(inventory).context("serialize inventory")?;
        println!("{text}");
        return Ok(());
    }
    print!("{}", render_inventory(inventory));
    Ok(())
}

fn render_inventory(inventory: &Inventory) -> String {
    let mut out = String::new();
    out.push_str(&format!("commit: {}\n", inventory.current_commit()));
    out.push_str(&format!("clean: {}\n", inventory.is_clean()));
    match inventory.base_version() {
        Some(base) => out.push_str(&format!("base version: {base}\n")),
        None => out.push_str("base version: none\n"),
    }
    out.push_str(&format!(
        "commits since base: {}\n",
        inventory.commits_since_base()
    ));
    out.push_str(&format!(
        "tagged versions: {}\n",
        inventory.tagged_versions().len()
    ));
    for (version, commit) in inventory.tagged_versions().iter().rev() {
        out.push_str(&format!("  {version} {}\n", commit.short()));
    }
    let untagged = inventory.claimed_versions().len() - inventory.tagged_versions().len();
    if untagged > 0 {
        out.push_str(&format!("claimed without a commit: {untagged}\n"));
    }
    out
}

pub fn run_init(args: InitArgs) -> Result<()> {
    let repo = GitRepository::open(&args.repo)?;
    let path = config::write_config(repo.root(), &config::default_config(), args.force)?;
    println!("wrote {}", path.display());
    Ok(())
}
