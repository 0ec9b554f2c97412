//! Shared test infrastructure for integration tests.
#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

pub fn find_in_path(name: &str) -> Option<PathBuf> {
    which::which(name).ok()
}

/// Throwaway git repository in a temporary directory.
pub struct TestRepo {
    dir: TempDir,
    git: PathBuf,
    commits: u32,
}

impl TestRepo {
    /// `None` when git is not installed; callers skip the test.
    pub fn init() -> Option<Self> {
        let git = find_in_path("git")?;
        let dir = tempfile::tempdir().expect("create temp dir");
        let repo = TestRepo {
            dir,
            git,
            commits: 0,
        };
        repo.git(&["init", "--quiet"]);
        Some(repo)
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Run git in the repository and return trimmed stdout, panicking on failure.
    pub fn git(&self, args: &[&str]) -> String {
        let output = self.git_output(args);
        assert!(
            output.status.success(),
            "git {} failed: {}",
            args.join(" "),
            String::from_utf8_lossy(&output.stderr)
        );
        String::from_utf8_lossy(&output.stdout).trim().to_string()
    }

    fn git_output(&self, args: &[&str]) -> Output {
        Command::new(&self.git)
            .arg("-C")
            .arg(self.path())
            .args([
                "-c",
                "user.name=Reckon Tests",
                "-c",
                "user.email=tests@example.com",
                "-c",
                "commit.gpgsign=false",
                "-c",
                "tag.gpgSign=false",
                "-c",
                "init.defaultBranch=main",
            ])
            .args(args)
            .env("LC_ALL", "C")
            .env("GIT_TERMINAL_PROMPT", "0")
            .env_remove("GIT_DIR")
            .env_remove("GIT_WORK_TREE")
            .output()
            .expect("run git")
    }

    /// Commit a new file and return the commit id.
    pub fn commit(&mut self) -> String {
        self.commits += 1;
        let name = format!("file-{}.txt", self.commits);
        self.write(&name, &format!("change {}\n", self.commits));
        self.git(&["add", "--all"]);
        self.git(&[
            "commit",
            "--quiet",
            "-m",
            &format!("commit {}", self.commits),
        ]);
        self.head()
    }

    pub fn head(&self) -> String {
        self.git(&["rev-parse", "HEAD"])
    }

    pub fn tag(&self, name: &str) {
        self.git(&["tag", name]);
    }

    pub fn annotated_tag(&self, name: &str) {
        self.git(&["tag", "-a", name, "-m", &format!("release {name}")]);
    }

    pub fn write(&self, name: &str, contents: &str) {
        std::fs::write(self.path().join(name), contents.as_bytes()).expect("write file");
    }
}
