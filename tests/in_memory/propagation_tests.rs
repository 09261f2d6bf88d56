//! Summary propagation tests across the build lifecycle.

use brunel::build::{
    domain::{ProjectId, ProjectSummary, StatusCode},
    ports::ProjectDirectory,
};
use rstest::rstest;

use crate::in_memory::helpers::{
    Stack, create_matrix_build, create_plain_build, finish_all_jobs, run_plain_build, stack,
};

async fn summary_of(stack: &Stack, project_id: ProjectId) -> ProjectSummary {
    stack
        .projects
        .summary_of(project_id)
        .await
        .expect("summary lookup should succeed")
        .expect("summary should be recorded")
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn a_started_build_projects_its_identity(stack: Stack) {
    let project_id = ProjectId::new();
    let build = create_plain_build(&stack.creation, project_id).await;

    let started = stack
        .transitions
        .start(build.id())
        .await
        .expect("build start should succeed");

    let summary = summary_of(&stack, project_id).await;
    assert_eq!(summary.last_build_id(), Some(build.id()));
    assert_eq!(summary.last_build_number(), Some(build.number()));
    assert_eq!(summary.last_build_started_at(), started.started_at());
    assert_eq!(summary.last_build_status(), None);
    assert_eq!(summary.last_build_finished_at(), None);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn a_finished_matrix_projects_its_aggregate_outcome(stack: Stack) {
    let project_id = ProjectId::new();
    let build = create_matrix_build(&stack.creation, project_id, &["1.75", "1.76"]).await;
    stack
        .transitions
        .start(build.id())
        .await
        .expect("build start should succeed");

    let outcome = finish_all_jobs(&stack.transitions, &build, StatusCode::new(1)).await;

    assert!(outcome.is_finished());
    let summary = summary_of(&stack, project_id).await;
    assert_eq!(summary.last_build_id(), Some(build.id()));
    assert_eq!(summary.last_build_status(), Some(StatusCode::new(1)));
    assert_eq!(
        summary.last_build_finished_at(),
        outcome.build().finished_at()
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn a_newer_start_keeps_the_previous_outcome_on_display(stack: Stack) {
    let project_id = ProjectId::new();
    let previous = run_plain_build(&stack, project_id, StatusCode::PASSED).await;

    let next = create_plain_build(&stack.creation, project_id).await;
    stack
        .transitions
        .start(next.id())
        .await
        .expect("build start should succeed");

    // The start patch replaces the identity fields only; the outcome stays
    // on display until the newer build finishes.
    let summary = summary_of(&stack, project_id).await;
    assert_eq!(summary.last_build_id(), Some(next.id()));
    assert_eq!(summary.last_build_number(), Some(next.number()));
    assert_eq!(summary.last_build_status(), Some(StatusCode::PASSED));
    assert_eq!(summary.last_build_finished_at(), previous.finished_at());

    stack
        .transitions
        .finish(next.id(), StatusCode::new(1))
        .await
        .expect("build finish should succeed");
    let updated = summary_of(&stack, project_id).await;
    assert_eq!(updated.last_build_status(), Some(StatusCode::new(1)));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn an_older_build_finishing_late_does_not_overwrite_newer_state(stack: Stack) {
    let project_id = ProjectId::new();
    let older = create_plain_build(&stack.creation, project_id).await;
    let newer = create_plain_build(&stack.creation, project_id).await;

    stack
        .transitions
        .start(newer.id())
        .await
        .expect("newer build start should succeed");
    stack
        .transitions
        .finish(newer.id(), StatusCode::PASSED)
        .await
        .expect("newer build finish should succeed");

    // The older build still runs to completion; its patches are skipped.
    stack
        .transitions
        .start(older.id())
        .await
        .expect("older build start should succeed");
    stack
        .transitions
        .finish(older.id(), StatusCode::new(1))
        .await
        .expect("older build finish should succeed");

    let summary = summary_of(&stack, project_id).await;
    assert_eq!(summary.last_build_id(), Some(newer.id()));
    assert_eq!(summary.last_build_number(), Some(newer.number()));
    assert_eq!(summary.last_build_status(), Some(StatusCode::PASSED));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn projects_track_their_builds_independently(stack: Stack) {
    let first_project = ProjectId::new();
    let second_project = ProjectId::new();

    let failed = run_plain_build(&stack, first_project, StatusCode::new(1)).await;
    let passed = run_plain_build(&stack, second_project, StatusCode::PASSED).await;

    let first_summary = summary_of(&stack, first_project).await;
    let second_summary = summary_of(&stack, second_project).await;
    assert_eq!(first_summary.last_build_id(), Some(failed.id()));
    assert_eq!(first_summary.last_build_status(), Some(StatusCode::new(1)));
    assert_eq!(second_summary.last_build_id(), Some(passed.id()));
    assert_eq!(second_summary.last_build_status(), Some(StatusCode::PASSED));
}
