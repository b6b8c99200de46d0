//! Real git fixtures: a bare remote and a working clone with `master` and
//! `develop` branches.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

pub struct GitFixture {
    pub dir: TempDir,
    pub remote: PathBuf,
    pub work: PathBuf,
}

pub fn git(dir: &Path, args: &[&str]) -> String {
    let output = Command::new("git")
        .args(args)
        .current_dir(dir)
        .env("GIT_TERMINAL_PROMPT", "0")
        .output()
        .expect("failed to spawn git");
    assert!(
        output.status.success(),
        "git {:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

fn commit_file(dir: &Path, file: &str, contents: &str, message: &str) {
    fs::write(dir.join(file), contents).unwrap();
    git(dir, &["add", file]);
    git(dir, &["commit", "-m", message]);
}

impl GitFixture {
    /// `master` and `develop` share a base; `master` has one extra commit
    /// that merges cleanly into `develop`. The clone is left on `develop`.
    pub fn new() -> Self {
        let fixture = Self::base();
        let work = &fixture.work;

        git(work, &["checkout", "master"]);
        commit_file(work, "hotfix.txt", "hotfix\n", "Hotfix on master");
        git(work, &["push", "origin", "master"]);

        git(work, &["checkout", "develop"]);
        commit_file(work, "feature.txt", "feature\n", "Feature on develop");
        git(work, &["push", "origin", "develop"]);
        fixture
    }

    /// Like [`GitFixture::new`] but both branches change `shared.txt`
    pub fn conflicting() -> Self {
        Self::conflicting_on("shared.txt")
    }

    /// Both branches add or change `file` differently
    pub fn conflicting_on(file: &str) -> Self {
        let fixture = Self::base();
        let work = &fixture.work;

        git(work, &["checkout", "master"]);
        commit_file(work, file, "production change\n", "Change on master");
        git(work, &["push", "origin", "master"]);

        git(work, &["checkout", "develop"]);
        commit_file(work, file, "develop change\n", "Change on develop");
        git(work, &["push", "origin", "develop"]);
        fixture
    }

    fn base() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let remote = dir.path().join("remote.git");
        let work = dir.path().join("work");

        git(dir.path(), &["init", "--bare", "remote.git"]);
        git(&remote, &["symbolic-ref", "HEAD", "refs/heads/master"]);
        git(dir.path(), &["clone", "remote.git", "work"]);

        git(&work, &["config", "user.name", "Release Test"]);
        git(&work, &["config", "user.email", "release@example.com"]);
        git(&work, &["config", "commit.gpgsign", "false"]);
        git(&work, &["config", "tag.gpgsign", "false"]);

        git(&work, &["symbolic-ref", "HEAD", "refs/heads/master"]);
        commit_file(&work, "shared.txt", "base\n", "Initial commit");
        git(&work, &["push", "-u", "origin", "master"]);
        git(&work, &["checkout", "-b", "develop"]);
        git(&work, &["push", "-u", "origin", "develop"]);

        Self { dir, remote, work }
    }

    pub fn git_dir(&self) -> PathBuf {
        self.work.join(".git")
    }

    pub fn remote_refs(&self) -> Vec<String> {
        git(&self.remote, &["for-each-ref", "--format=%(refname)"])
            .lines()
            .map(str::to_string)
            .collect()
    }

    pub fn local_refs(&self) -> Vec<String> {
        git(&self.work, &["for-each-ref", "--format=%(refname)", "refs/heads", "refs/tags"])
            .lines()
            .map(str::to_string)
            .collect()
    }

    pub fn current_branch(&self) -> String {
        git(&self.work, &["rev-parse", "--abbrev-ref", "HEAD"])
    }

    /// Resolve `shared.txt` and commit the merge, as the operator would
    pub fn resolve_conflict(&self) {
        fs::write(self.work.join("shared.txt"), "resolved\n").unwrap();
        git(&self.work, &["add", "shared.txt"]);
        git(&self.work, &["commit", "--no-edit"]);
    }

    /// Another clone of the remote, checked out on `master`, with no local
    /// release branches
    pub fn fresh_clone(&self, name: &str) -> PathBuf {
        git(self.dir.path(), &["clone", "remote.git", name]);
        let clone = self.dir.path().join(name);
        git(&clone, &["config", "user.name", "Release Test"]);
        git(&clone, &["config", "user.email", "release@example.com"]);
        clone
    }

    /// Write a config file registering the clone as `api`
    pub fn write_config(&self, kind: &str) -> PathBuf {
        self.write_config_for(&self.work, kind)
    }

    /// Write a config file registering `work` as `api`
    pub fn write_config_for(&self, work: &Path, kind: &str) -> PathBuf {
        let path = self.dir.path().join("config.yaml");
        let yaml = format!(
            "repositories:\n  - name: api\n    path: {}\n    branches: {{ develop: develop, production: master, kind: {} }}\n",
            work.display(),
            kind
        );
        fs::write(&path, yaml).unwrap();
        path
    }
}
