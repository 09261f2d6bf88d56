//! Concurrency tests for exactly-once completion.

use async_trait::async_trait;
use brunel::build::{
    adapters::memory::{InMemoryBuildRepository, InMemoryProjectDirectory},
    domain::{
        BuildState, ProjectId, ProjectSummary, PropagationOutcome, StatusCode, SummaryFields,
        SummaryPatch, TransitionError,
    },
    ports::{BuildRepository, ProjectDirectory, ProjectDirectoryResult, WorstOutcome},
    services::{BuildCreationService, BuildTransitionError, BuildTransitionService, JobReport},
};
use mockable::DefaultClock;
use rstest::rstest;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::in_memory::helpers::{
    Stack, create_matrix_build, create_plain_build, job_ids, stack,
};

/// Project directory that counts finish patches while delegating storage.
#[derive(Default)]
struct FinishCountingDirectory {
    inner: InMemoryProjectDirectory,
    finishes: AtomicUsize,
}

impl FinishCountingDirectory {
    fn finish_count(&self) -> usize {
        self.finishes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ProjectDirectory for FinishCountingDirectory {
    async fn apply(&self, patch: &SummaryPatch) -> ProjectDirectoryResult<PropagationOutcome> {
        if matches!(patch.fields(), SummaryFields::Finished { .. }) {
            self.finishes.fetch_add(1, Ordering::SeqCst);
        }
        self.inner.apply(patch).await
    }

    async fn summary_of(
        &self,
        project_id: ProjectId,
    ) -> ProjectDirectoryResult<Option<ProjectSummary>> {
        self.inner.summary_of(project_id).await
    }
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn concurrent_job_reports_finish_the_build_exactly_once() {
    let repository = Arc::new(InMemoryBuildRepository::new());
    let directory = Arc::new(FinishCountingDirectory::default());
    let clock = Arc::new(DefaultClock);
    let creation = BuildCreationService::new(Arc::clone(&repository), Arc::clone(&clock));
    let transitions = Arc::new(BuildTransitionService::new(
        Arc::clone(&repository),
        Arc::clone(&directory),
        Arc::new(WorstOutcome),
        clock,
    ));

    let project_id = ProjectId::new();
    let versions = ["1.70", "1.71", "1.72", "1.73", "1.74", "1.75", "1.76", "1.77"];
    let build = create_matrix_build(&creation, project_id, &versions).await;
    transitions
        .start(build.id())
        .await
        .expect("build start should succeed");

    let mut handles = Vec::new();
    for job_id in job_ids(&build) {
        let worker = Arc::clone(&transitions);
        handles.push(tokio::spawn(async move {
            worker
                .report_job(JobReport::finished(job_id, StatusCode::PASSED))
                .await
                .expect("job report should be accepted")
        }));
    }

    let mut finished_reports = 0_usize;
    for handle in handles {
        let outcome = handle.await.expect("report task should complete");
        if outcome.is_finished() {
            finished_reports += 1;
        }
    }

    assert_eq!(finished_reports, 1);
    assert_eq!(directory.finish_count(), 1);
    let stored = repository
        .find_by_id(build.id())
        .await
        .expect("lookup should succeed")
        .expect("build should be stored");
    assert_eq!(stored.state(), BuildState::Finished);
    assert_eq!(stored.status(), Some(StatusCode::PASSED));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn concurrent_explicit_finishes_accept_exactly_one(stack: Stack) {
    let project_id = ProjectId::new();
    let build = create_plain_build(&stack.creation, project_id).await;
    let transitions = Arc::new(stack.transitions);
    transitions
        .start(build.id())
        .await
        .expect("build start should succeed");

    let mut handles = Vec::new();
    for _ in 0..2 {
        let worker = Arc::clone(&transitions);
        let build_id = build.id();
        handles.push(tokio::spawn(async move {
            worker.finish(build_id, StatusCode::PASSED).await
        }));
    }

    let mut accepted = 0_usize;
    let mut refused = 0_usize;
    for handle in handles {
        match handle.await.expect("finish task should complete") {
            Ok(_) => accepted += 1,
            Err(BuildTransitionError::Transition(TransitionError::InvalidTransition {
                ..
            })) => refused += 1,
            Err(other) => panic!("unexpected error: {other}"),
        }
    }

    assert_eq!(accepted, 1);
    assert_eq!(refused, 1);
    let stored = stack
        .repository
        .find_by_id(build.id())
        .await
        .expect("lookup should succeed")
        .expect("build should be stored");
    assert_eq!(stored.state(), BuildState::Finished);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn concurrent_starts_accept_exactly_one(stack: Stack) {
    let project_id = ProjectId::new();
    let build = create_plain_build(&stack.creation, project_id).await;
    let transitions = Arc::new(stack.transitions);

    let mut handles = Vec::new();
    for _ in 0..2 {
        let worker = Arc::clone(&transitions);
        let build_id = build.id();
        handles.push(tokio::spawn(async move { worker.start(build_id).await }));
    }

    let mut accepted = 0_usize;
    for handle in handles {
        if handle.await.expect("start task should complete").is_ok() {
            accepted += 1;
        }
    }

    assert_eq!(accepted, 1);
    let summary = stack
        .projects
        .summary_of(project_id)
        .await
        .expect("summary lookup should succeed")
        .expect("summary should be recorded");
    assert_eq!(summary.last_build_id(), Some(build.id()));
}
