//! Run dispatcher
//!
//! Triggers submit runs to a bounded queue and return immediately. A single
//! dispatch task drains the queue and spawns one task per run, holding a
//! semaphore permit so that at most `max_concurrent_runs` execute at once.

use std::sync::Arc;

use recordflow_core::domain::company::CompanyCreated;
use recordflow_core::domain::person::PeopleDescription;
use recordflow_core::domain::run::PipelineRun;
use recordflow_runner::{
    COMPANY_PIPELINE_ID, Collaborators, CompanyPipeline, PEOPLE_PIPELINE_ID, PeoplePipeline,
};
use thiserror::Error;
use tokio::sync::{OwnedSemaphorePermit, Semaphore, mpsc};
use tracing::{debug, info, warn};

use super::registry::RunRegistry;

/// The pipelines a trigger can start
pub struct Pipelines {
    pub company: CompanyPipeline,
    pub people: PeoplePipeline,
}

impl Pipelines {
    pub fn from_collaborators(collaborators: &Collaborators) -> Self {
        Self {
            company: collaborators.company_pipeline(),
            people: collaborators.people_pipeline(),
        }
    }
}

/// Input of a queued run
#[derive(Debug, Clone)]
pub enum RunRequest {
    Company(CompanyCreated),
    People(PeopleDescription),
}

impl RunRequest {
    pub fn pipeline_id(&self) -> &'static str {
        match self {
            RunRequest::Company(_) => COMPANY_PIPELINE_ID,
            RunRequest::People(_) => PEOPLE_PIPELINE_ID,
        }
    }
}

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("run queue is full")]
    QueueFull,

    #[error("run queue is closed")]
    Closed,
}

struct Submission {
    run: PipelineRun,
    request: RunRequest,
}

/// Submitting half of the run queue
pub struct Dispatcher {
    sender: mpsc::Sender<Submission>,
    registry: Arc<RunRegistry>,
}

/// Draining half of the run queue
pub struct DispatchQueue {
    receiver: mpsc::Receiver<Submission>,
    registry: Arc<RunRegistry>,
}

impl Dispatcher {
    /// Creates the queue without starting it
    pub fn channel(capacity: usize, registry: Arc<RunRegistry>) -> (Self, DispatchQueue) {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        (
            Self {
                sender,
                registry: registry.clone(),
            },
            DispatchQueue { receiver, registry },
        )
    }

    /// Creates the queue and spawns the dispatch task
    pub fn start(
        pipelines: Arc<Pipelines>,
        registry: Arc<RunRegistry>,
        capacity: usize,
        max_concurrent_runs: usize,
    ) -> Self {
        let (dispatcher, queue) = Self::channel(capacity, registry);
        tokio::spawn(queue.run(pipelines, max_concurrent_runs));
        dispatcher
    }

    /// Queues a run and returns its id without waiting for it to start
    pub fn submit(&self, request: RunRequest) -> Result<String, DispatchError> {
        let run = PipelineRun::new(request.pipeline_id());
        let run_id = run.id.clone();

        self.registry.record(&run);

        match self.sender.try_send(Submission { run, request }) {
            Ok(()) => {
                debug!("Queued run {}", run_id);
                Ok(run_id)
            }
            Err(e) => {
                self.registry.remove(&run_id);
                Err(match e {
                    mpsc::error::TrySendError::Full(_) => DispatchError::QueueFull,
                    mpsc::error::TrySendError::Closed(_) => DispatchError::Closed,
                })
            }
        }
    }
}

impl DispatchQueue {
    /// Drains the queue until every [`Dispatcher`] is dropped
    pub async fn run(mut self, pipelines: Arc<Pipelines>, max_concurrent_runs: usize) {
        let semaphore = Arc::new(Semaphore::new(max_concurrent_runs.max(1)));
        info!(
            "Dispatcher started (max concurrent runs: {})",
            max_concurrent_runs
        );

        while let Some(submission) = self.receiver.recv().await {
            let permit = match semaphore.clone().acquire_owned().await {
                Ok(permit) => permit,
                Err(_) => break,
            };

            Self::spawn_run(
                submission,
                Arc::clone(&pipelines),
                Arc::clone(&self.registry),
                permit,
            );
        }

        info!("Dispatcher stopped");
    }

    fn spawn_run(
        submission: Submission,
        pipelines: Arc<Pipelines>,
        registry: Arc<RunRegistry>,
        permit: OwnedSemaphorePermit,
    ) {
        tokio::spawn(async move {
            let _permit = permit;
            let Submission { mut run, request } = submission;

            // Failures are logged by the runner with run and stage ids
            let outcome = match request {
                RunRequest::Company(input) => pipelines
                    .company
                    .run_tracked(&mut run, input, registry.as_ref())
                    .await
                    .map(|output| {
                        format!("record {} synchronized", output.airtable_record_id)
                    }),
                RunRequest::People(input) => pipelines
                    .people
                    .run_tracked(&mut run, input, registry.as_ref())
                    .await
                    .map(|created| format!("{} person record(s) created", created.len())),
            };

            match outcome {
                Ok(summary) => info!("Run {} finished: {}", run.id, summary),
                Err(e) => warn!("Run {} did not complete: {}", run.id, e),
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use recordflow_agents::ScriptedAgent;
    use recordflow_client::tables::TableNames;
    use recordflow_client::{Fields, InMemoryRecordStore};
    use recordflow_core::domain::run::RunStatus;
    use std::time::Duration;

    fn scripted_pipelines(store: &InMemoryRecordStore) -> Pipelines {
        Pipelines::from_collaborators(&Collaborators {
            research: Arc::new(ScriptedAgent::new("research").always("Acme runs 2 GW of solar.")),
            polish: Arc::new(ScriptedAgent::new("polish").always("A 2 GW solar platform.")),
            extractor: Arc::new(
                ScriptedAgent::new("extractor")
                    .always(r#"[{"person":{"name":"Maria"},"pets":[{"name":"Rex","species":"Dog"}]}]"#),
            ),
            store: Arc::new(store.clone()),
            tables: TableNames::default(),
        })
    }

    async fn wait_for_terminal(registry: &RunRegistry, run_id: &str) -> PipelineRun {
        for _ in 0..200 {
            if let Some(run) = registry.get(run_id) {
                if run.status.is_terminal() {
                    return run;
                }
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("run {} did not finish", run_id);
    }

    #[tokio::test]
    async fn test_submitted_runs_complete() {
        let store = InMemoryRecordStore::new();
        store.insert("Companies", "rec123", Fields::new());
        let registry = Arc::new(RunRegistry::new(10));
        let dispatcher = Dispatcher::start(
            Arc::new(scripted_pipelines(&store)),
            registry.clone(),
            4,
            2,
        );

        let company = dispatcher
            .submit(RunRequest::Company(CompanyCreated {
                airtable_record_id: "rec123".to_string(),
                name: "Acme".to_string(),
            }))
            .unwrap();
        let people = dispatcher
            .submit(RunRequest::People(PeopleDescription {
                description: "Maria has a dog named Rex".to_string(),
            }))
            .unwrap();

        assert_eq!(wait_for_terminal(&registry, &company).await.status, RunStatus::Succeeded);
        assert_eq!(wait_for_terminal(&registry, &people).await.status, RunStatus::Succeeded);
        assert_eq!(store.count("People"), 1);
        assert_eq!(store.count("Pets"), 1);
    }

    #[tokio::test]
    async fn test_failed_run_is_recorded_with_stage() {
        let store = InMemoryRecordStore::new();
        let registry = Arc::new(RunRegistry::new(10));
        let dispatcher = Dispatcher::start(
            Arc::new(scripted_pipelines(&store)),
            registry.clone(),
            4,
            1,
        );

        // Record does not exist, so the final update fails
        let run_id = dispatcher
            .submit(RunRequest::Company(CompanyCreated {
                airtable_record_id: "recMissing".to_string(),
                name: "Acme".to_string(),
            }))
            .unwrap();

        let run = wait_for_terminal(&registry, &run_id).await;
        assert_eq!(run.status, RunStatus::Failed);
        assert_eq!(run.stage_id.as_deref(), Some("update-company-record"));
        assert!(run.error.unwrap().contains("recMissing"));
    }

    #[tokio::test]
    async fn test_full_queue_rejects_without_recording() {
        let registry = Arc::new(RunRegistry::new(10));
        let (dispatcher, _queue) = Dispatcher::channel(1, registry.clone());
        let request = RunRequest::People(PeopleDescription {
            description: "Ana".to_string(),
        });

        let first = dispatcher.submit(request.clone()).unwrap();
        let err = dispatcher.submit(request).unwrap_err();

        assert!(matches!(err, DispatchError::QueueFull));
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get(&first).unwrap().status, RunStatus::Pending);
    }

    #[tokio::test]
    async fn test_closed_queue() {
        let registry = Arc::new(RunRegistry::new(10));
        let (dispatcher, queue) = Dispatcher::channel(1, registry.clone());
        drop(queue);

        let err = dispatcher
            .submit(RunRequest::People(PeopleDescription {
                description: "Ana".to_string(),
            }))
            .unwrap_err();

        assert!(matches!(err, DispatchError::Closed));
        assert!(registry.is_empty());
    }
}
