//! End-to-end release runs against real git repositories.

mod common;

use common::GitFixture;
use release_flow::error::{GitError, LockError};
use release_flow::workflow::{WorkflowStatus, WorkflowPhase};
use release_flow::{
    GitCli, ReleaseError, ReleaseRequest, ReleaseWorkflow, RepositoryDescriptor, WorkdirLease,
    WorkflowKind,
};

async fn workflow(fixture: &GitFixture, kind: WorkflowKind) -> ReleaseWorkflow<GitCli> {
    let mut descriptor = RepositoryDescriptor::new("api", &fixture.work);
    descriptor.branches.kind = kind;
    let request = ReleaseRequest::new(descriptor, "1.0.0").unwrap();
    let git = GitCli::open(&fixture.work).await.unwrap();
    ReleaseWorkflow::for_request(git, request)
}

#[tokio::test]
async fn clean_release_pushes_all_refs() {
    let fixture = GitFixture::new();
    let mut workflow = workflow(&fixture, WorkflowKind::Standard).await;

    let result = match workflow.start().await.unwrap() {
        WorkflowStatus::Completed(result) => result,
        other => panic!("expected completion, got {:?}", other),
    };

    assert!(result.success);
    assert_eq!(result.rollback_tag.as_deref(), Some("rollback_develop_v1.0.0"));
    assert_eq!(result.release_branch.as_deref(), Some("release_develop_1.0.0"));
    assert_eq!(result.version_tag.as_deref(), Some("v_api_1.0.0"));
    assert_eq!(
        result.final_release_branch.as_deref(),
        Some("release_master_1.0.0")
    );

    let remote = fixture.remote_refs();
    for expected in [
        "refs/tags/rollback_develop_v1.0.0",
        "refs/tags/v_api_1.0.0",
        "refs/heads/release_develop_1.0.0",
        "refs/heads/release_master_1.0.0",
    ] {
        assert!(remote.contains(&expected.to_string()), "missing {}", expected);
    }

    // The release branch carries both the develop feature and the master hotfix
    assert!(fixture.work.join("feature.txt").exists());
    assert!(fixture.work.join("hotfix.txt").exists());
    assert_eq!(fixture.current_branch(), "release_master_1.0.0");
}

#[tokio::test]
async fn legacy_release_uses_legacy_names() {
    let fixture = GitFixture::new();
    let mut workflow = workflow(&fixture, WorkflowKind::Legacy).await;

    let result = match workflow.start().await.unwrap() {
        WorkflowStatus::Completed(result) => result,
        other => panic!("expected completion, got {:?}", other),
    };
    assert_eq!(result.version_tag.as_deref(), Some("1.0.0"));
    assert_eq!(
        result.final_release_branch.as_deref(),
        Some("release_master_develop_1.0.0")
    );
    assert!(fixture.remote_refs().contains(&"refs/tags/1.0.0".to_string()));
}

#[tokio::test]
async fn conflict_abort_rolls_back() {
    let fixture = GitFixture::conflicting();
    let mut workflow = workflow(&fixture, WorkflowKind::Standard).await;

    let report = match workflow.start().await.unwrap() {
        WorkflowStatus::Suspended(report) => report,
        other => panic!("expected suspension, got {:?}", other),
    };
    assert_eq!(report.conflicted_paths, vec!["shared.txt".to_string()]);
    assert!(report.merge_in_progress);

    let failure = workflow.abort().await;
    assert!(!failure.result.success);
    assert!(
        failure
            .result
            .error_message
            .as_deref()
            .unwrap_or_default()
            .contains("aborted")
    );

    let rollback = failure.rollback.expect("rollback ran");
    assert!(rollback.is_clean(), "{}", rollback.format_result());
    assert_eq!(rollback.total().attempted, 3);

    let remote = fixture.remote_refs();
    assert!(!remote.iter().any(|r| r.contains("rollback_develop_v1.0.0")));
    let local = fixture.local_refs();
    assert!(!local.iter().any(|r| r.contains("rollback_develop_v1.0.0")));
    assert!(!local.iter().any(|r| r.contains("release_develop_1.0.0")));
    assert!(!fixture.git_dir().join("MERGE_HEAD").exists());
    assert_eq!(fixture.current_branch(), "develop");
}

#[tokio::test]
async fn conflict_report_shows_non_ascii_paths_verbatim() {
    let fixture = GitFixture::conflicting_on("café.txt");
    let mut workflow = workflow(&fixture, WorkflowKind::Standard).await;

    let report = match workflow.start().await.unwrap() {
        WorkflowStatus::Suspended(report) => report,
        other => panic!("expected suspension, got {:?}", other),
    };
    assert_eq!(report.conflicted_paths, vec!["café.txt".to_string()]);
    workflow.abort().await;
}

#[tokio::test]
async fn conflict_resolved_then_resumed() {
    let fixture = GitFixture::conflicting();
    let mut workflow = workflow(&fixture, WorkflowKind::Standard).await;

    assert!(matches!(
        workflow.start().await.unwrap(),
        WorkflowStatus::Suspended(_)
    ));

    // Resuming before the operator committed is re-detected, not progress
    let failure = workflow.resume().await.unwrap_err();
    assert!(failure.is_resumable());
    assert!(matches!(
        failure.error,
        ReleaseError::ConflictUnresolved { .. }
    ));
    assert_eq!(workflow.phase(), WorkflowPhase::Suspended);
    assert!(
        !fixture
            .remote_refs()
            .iter()
            .any(|r| r.contains("v_api_1.0.0"))
    );

    fixture.resolve_conflict();
    let result = match workflow.resume().await.unwrap() {
        WorkflowStatus::Completed(result) => result,
        other => panic!("expected completion, got {:?}", other),
    };
    assert!(result.success);
    assert!(
        fixture
            .remote_refs()
            .contains(&"refs/heads/release_master_1.0.0".to_string())
    );
}

#[tokio::test]
async fn manually_aborted_merge_is_not_released() {
    let fixture = GitFixture::conflicting();
    let mut workflow = workflow(&fixture, WorkflowKind::Standard).await;
    assert!(matches!(
        workflow.start().await.unwrap(),
        WorkflowStatus::Suspended(_)
    ));

    common::git(&fixture.work, &["merge", "--abort"]);
    let failure = workflow.resume().await.unwrap_err();
    assert!(matches!(
        failure.error,
        ReleaseError::MergeNotConcluded { .. }
    ));
    assert!(failure.is_resumable());
    assert!(
        !fixture
            .remote_refs()
            .iter()
            .any(|r| r.contains("v_api_1.0.0") || r.contains("release_master_1.0.0"))
    );

    let failure = workflow.abort().await;
    assert!(matches!(failure.error, ReleaseError::MergeAborted { .. }));
    let rollback = failure.rollback.expect("rollback ran");
    assert!(rollback.is_clean(), "{}", rollback.format_result());
}

#[tokio::test]
async fn rerun_fails_at_rollback_tag() {
    let fixture = GitFixture::new();
    workflow(&fixture, WorkflowKind::Standard)
        .await
        .start()
        .await
        .unwrap();
    let before = fixture.remote_refs();

    let failure = workflow(&fixture, WorkflowKind::Standard)
        .await
        .start()
        .await
        .unwrap_err();
    assert!(matches!(
        failure.error,
        ReleaseError::Git(GitError::TagExists { .. })
    ));
    assert!(failure.rollback.expect("rollback ran").is_noop());
    assert_eq!(fixture.remote_refs(), before);
}

#[tokio::test]
async fn concurrent_run_fails_fast() {
    let fixture = GitFixture::new();
    let _held = WorkdirLease::acquire(&fixture.git_dir(), "other-run").unwrap();

    let failure = workflow(&fixture, WorkflowKind::Standard)
        .await
        .start()
        .await
        .unwrap_err();
    assert!(matches!(
        failure.error,
        ReleaseError::Lock(LockError::Held { .. })
    ));
    assert!(
        !fixture
            .local_refs()
            .iter()
            .any(|r| r.contains("rollback_develop"))
    );
}
