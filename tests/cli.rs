//! Command line behaviour.

mod common;

use assert_cmd::Command;
use common::GitFixture;
use predicates::prelude::*;

fn release_flow(config: &std::path::Path) -> Command {
    let mut cmd = Command::cargo_bin("release_flow").unwrap();
    cmd.env_remove("RELEASE_FLOW_CONFIG")
        .env_remove("RUST_LOG")
        .arg("--config")
        .arg(config);
    cmd
}

#[test]
fn list_empty_configuration() {
    let dir = tempfile::tempdir().unwrap();
    release_flow(&dir.path().join("config.yaml"))
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("No repositories configured"));
}

#[test]
fn add_then_list() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("config.yaml");
    let repo = dir.path().join("api");
    std::fs::create_dir(&repo).unwrap();

    release_flow(&config)
        .args(["add", "api"])
        .arg(&repo)
        .args(["--production", "main", "--kind", "legacy"])
        .assert()
        .success();

    release_flow(&config)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("api"))
        .stdout(predicate::str::contains("main → develop, legacy"));

    // Same name again is refused
    release_flow(&config)
        .args(["add", "api"])
        .arg(&repo)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("already configured"));
}

#[test]
fn plan_prints_artifact_names() {
    let fixture = GitFixture::new();
    let config = fixture.write_config("standard");

    release_flow(&config)
        .args(["plan", "api", "--version", "1.0.0"])
        .assert()
        .success()
        .stdout(predicate::str::contains("rollback_develop_v1.0.0"))
        .stdout(predicate::str::contains("release_develop_1.0.0"))
        .stdout(predicate::str::contains("v_api_1.0.0"))
        .stdout(predicate::str::contains("release_master_1.0.0"));

    release_flow(&config)
        .args(["plan", "api", "--version", "2.0.0", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "\"final_release_branch\": \"release_master_2.0.0\"",
        ));
}

#[test]
fn unknown_repository_exits_one() {
    let dir = tempfile::tempdir().unwrap();
    release_flow(&dir.path().join("config.yaml"))
        .args(["plan", "nope", "--version", "1.0.0"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("'nope' is not configured"));
}

#[test]
fn invalid_version_exits_one() {
    let fixture = GitFixture::new();
    let config = fixture.write_config("standard");
    release_flow(&config)
        .args(["plan", "api", "--version", "1..0"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Invalid version"));
}

#[test]
fn release_then_rollback() {
    let fixture = GitFixture::new();
    let config = fixture.write_config("standard");

    release_flow(&config)
        .args(["release", "api", "--version", "1.0.0", "--yes"])
        .assert()
        .success()
        .stdout(predicate::str::contains("completed successfully"));
    assert!(
        fixture
            .remote_refs()
            .contains(&"refs/tags/v_api_1.0.0".to_string())
    );

    release_flow(&config)
        .args(["status", "api", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"merge_in_progress\": false"));

    release_flow(&config)
        .args(["rollback", "api", "--version", "1.0.0", "--yes"])
        .assert()
        .success()
        .stdout(predicate::str::contains("8 attempted, 8 succeeded, 0 failed"));

    let remote = fixture.remote_refs();
    assert!(!remote.iter().any(|r| r.contains("1.0.0")));
    assert!(!fixture.local_refs().iter().any(|r| r.contains("1.0.0")));
}

#[test]
fn rollback_from_clone_without_local_branches() {
    let fixture = GitFixture::new();
    let config = fixture.write_config("standard");
    release_flow(&config)
        .args(["release", "api", "--version", "1.0.0", "--yes"])
        .assert()
        .success();

    // Tags arrive with the clone, release branches only exist on the remote
    let clone = fixture.fresh_clone("other");
    let config = fixture.write_config_for(&clone, "standard");
    release_flow(&config)
        .args(["rollback", "api", "--version", "1.0.0", "--yes"])
        .assert()
        .success()
        .stdout(predicate::str::contains("6 attempted, 6 succeeded, 0 failed"));

    assert!(!fixture.remote_refs().iter().any(|r| r.contains("1.0.0")));
}
