//! End-to-end lifecycle tests for matrix builds.

use crate::in_memory::helpers::{
    Stack, create_matrix_build, create_plain_build, finish_all_jobs, job_ids, stack,
};
use brunel::build::{
    domain::{Build, BuildState, JobState, ProjectId, StatusCode, TransitionError},
    ports::{BuildRepository, ProjectDirectory},
    services::{BuildTransitionError, JobReport},
};
use rstest::rstest;
use serde_json::json;

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn a_matrix_build_runs_from_creation_to_aggregate_finish(stack: Stack) {
    let project_id = ProjectId::new();
    let build = create_matrix_build(&stack.creation, project_id, &["1.74", "1.75", "1.76"]).await;

    assert_eq!(build.state(), BuildState::Created);
    assert!(build.is_pending());
    assert_eq!(build.matrix().len(), 3);
    let positions: Vec<_> = build.matrix().iter().map(|job| job.position()).collect();
    assert_eq!(positions, vec![1, 2, 3]);
    for job in build.matrix() {
        assert_eq!(job.build_id(), build.id());
        assert_eq!(job.spec().get("script"), Some(&json!("cargo test")));
    }

    stack
        .transitions
        .start(build.id())
        .await
        .expect("build start should succeed");

    let ids = job_ids(&build);
    for job_id in ids.iter().take(2).copied() {
        let outcome = stack
            .transitions
            .report_job(JobReport::finished(job_id, StatusCode::PASSED))
            .await
            .expect("job report should be accepted");
        assert!(!outcome.is_finished());
    }

    // One job is still outstanding, so an explicit finish is refused.
    let premature = stack.transitions.finish(build.id(), StatusCode::PASSED).await;
    assert!(matches!(
        premature,
        Err(BuildTransitionError::Transition(
            TransitionError::GuardNotSatisfied { unfinished: 1, .. }
        ))
    ));

    let last_job = ids.last().copied().expect("matrix should have jobs");
    let outcome = stack
        .transitions
        .report_job(JobReport::finished(last_job, StatusCode::PASSED))
        .await
        .expect("job report should be accepted");

    assert!(outcome.is_finished());
    let finished = outcome.build();
    assert_eq!(finished.state(), BuildState::Finished);
    assert_eq!(finished.status(), Some(StatusCode::PASSED));
    assert!(finished.passed());
    assert_eq!(finished.status_message(), "Passed");
    assert_eq!(finished.color(), "green");

    let started_at = finished
        .started_at()
        .expect("started build records a start time");
    let finished_at = finished
        .finished_at()
        .expect("finished build records a finish time");
    assert!(finished.created_at() <= started_at);
    assert!(started_at <= finished_at);

    let summary = stack
        .projects
        .summary_of(project_id)
        .await
        .expect("summary lookup should succeed")
        .expect("summary should be recorded");
    assert_eq!(summary.last_build_status(), Some(StatusCode::PASSED));
    assert_eq!(summary.last_build_finished_at(), finished.finished_at());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn an_axis_free_build_finishes_without_job_reports(stack: Stack) {
    let project_id = ProjectId::new();
    let build = create_plain_build(&stack.creation, project_id).await;
    assert!(build.matrix().is_empty());

    stack
        .transitions
        .start(build.id())
        .await
        .expect("build start should succeed");
    let finished = stack
        .transitions
        .finish(build.id(), StatusCode::PASSED)
        .await
        .expect("build finish should succeed");

    assert_eq!(finished.state(), BuildState::Finished);
    assert!(finished.passed());
    assert_eq!(finished.status_message(), "Passed");
    assert_eq!(finished.color(), "green");
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn job_progress_is_durable_between_reports(stack: Stack) {
    let project_id = ProjectId::new();
    let build = create_matrix_build(&stack.creation, project_id, &["1.74", "1.75"]).await;
    stack
        .transitions
        .start(build.id())
        .await
        .expect("build start should succeed");
    let first_job = job_ids(&build)
        .into_iter()
        .next()
        .expect("matrix should have jobs");

    stack
        .transitions
        .report_job(JobReport::started(first_job))
        .await
        .expect("job report should be accepted");

    let stored = stack
        .repository
        .find_by_id(build.id())
        .await
        .expect("lookup should succeed")
        .expect("build should be stored");
    let job = stored.job(first_job).expect("job should be present");
    assert_eq!(job.state(), JobState::Started);
    assert!(job.started_at().is_some());
    assert_eq!(stored.state(), BuildState::Started);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn a_failing_job_fails_the_whole_matrix(stack: Stack) {
    let project_id = ProjectId::new();
    let build = create_matrix_build(&stack.creation, project_id, &["1.75", "1.76"]).await;
    stack
        .transitions
        .start(build.id())
        .await
        .expect("build start should succeed");

    let outcome = finish_all_jobs(&stack.transitions, &build, StatusCode::new(2)).await;

    assert!(outcome.is_finished());
    assert_eq!(outcome.build().status(), Some(StatusCode::new(2)));
    assert!(!outcome.build().passed());
    assert_eq!(outcome.build().status_message(), "Failed");
    assert_eq!(outcome.build().color(), "red");
}

/// Asserts every matrix job carries the expected axis selection.
///
/// # Errors
///
/// Returns an error when a job's spec does not name its own version or the
/// shared script.
fn assert_matrix_covers_versions(build: &Build, versions: &[&str]) -> Result<(), eyre::Report> {
    eyre::ensure!(
        build.matrix().len() == versions.len(),
        "expected {} jobs, found {}",
        versions.len(),
        build.matrix().len()
    );
    for (job, version) in build.matrix().iter().zip(versions) {
        let axis = job
            .spec()
            .get("rust")
            .ok_or_else(|| eyre::eyre!("job {} is missing its axis entry", job.position()))?;
        eyre::ensure!(
            axis == &json!(version),
            "job {} expanded the wrong version",
            job.position()
        );
        eyre::ensure!(
            job.spec().get("script") == Some(&json!("cargo test")),
            "job {} lost the shared settings",
            job.position()
        );
    }
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn expansion_assigns_each_job_its_axis_selection(
    stack: Stack,
) -> Result<(), eyre::Report> {
    let project_id = ProjectId::new();
    let versions = ["1.74", "1.75", "1.76"];

    let build = create_matrix_build(&stack.creation, project_id, &versions).await;

    assert_matrix_covers_versions(&build, &versions)
}
