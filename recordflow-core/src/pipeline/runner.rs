//! Sequential pipeline runner

use std::any::Any;
use std::marker::PhantomData;

use async_trait::async_trait;
use thiserror::Error;
use tracing::{error, info};

use super::stage::{Stage, StageFailure};
use crate::domain::run::PipelineRun;
use crate::validate::{Validate, ValidationError};

type Payload = Box<dyn Any + Send>;

/// Receives a snapshot of the run after every transition
pub trait RunObserver: Send + Sync {
    fn on_update(&self, run: &PipelineRun);
}

/// Observer that ignores every update
pub struct NoopObserver;

impl RunObserver for NoopObserver {
    fn on_update(&self, _run: &PipelineRun) {}
}

/// Pipeline execution error
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The pipeline input did not match the first stage's input shape; no
    /// stage was executed
    #[error("invalid input for pipeline '{pipeline_id}': {source}")]
    InvalidInput {
        run_id: String,
        pipeline_id: &'static str,
        #[source]
        source: ValidationError,
    },

    /// A stage failed; later stages were not executed
    #[error("stage '{stage_id}' failed in run {run_id}: {source}")]
    StageFailed {
        run_id: String,
        stage_id: &'static str,
        stage_index: usize,
        #[source]
        source: StageFailure,
    },

    /// The last stage produced a value of another type than the pipeline
    /// declares
    #[error("pipeline '{pipeline_id}' produced an unexpected output type in run {run_id}")]
    OutputMismatch {
        run_id: String,
        pipeline_id: &'static str,
    },
}

impl PipelineError {
    pub fn run_id(&self) -> &str {
        match self {
            PipelineError::InvalidInput { run_id, .. }
            | PipelineError::StageFailed { run_id, .. }
            | PipelineError::OutputMismatch { run_id, .. } => run_id,
        }
    }

    /// Id of the failed stage, if a stage failed
    pub fn stage_id(&self) -> Option<&'static str> {
        match self {
            PipelineError::StageFailed { stage_id, .. } => Some(stage_id),
            _ => None,
        }
    }
}

#[async_trait]
trait ErasedStage: Send + Sync {
    fn id(&self) -> &'static str;

    async fn execute_erased(&self, input: Payload) -> Result<Payload, StageFailure>;
}

struct Erased<S>(S);

#[async_trait]
impl<S: Stage + 'static> ErasedStage for Erased<S> {
    fn id(&self) -> &'static str {
        self.0.id()
    }

    async fn execute_erased(&self, input: Payload) -> Result<Payload, StageFailure> {
        let input = input.downcast::<S::Input>().map_err(|_| {
            ValidationError::new(
                "input",
                format!("expected {}", std::any::type_name::<S::Input>()),
            )
        })?;

        let output = self.0.execute(*input).await?;
        output.validate()?;

        Ok(Box::new(output))
    }
}

/// An ordered composition of stages taking `I` and producing `O`
pub struct Pipeline<I, O> {
    id: &'static str,
    stages: Vec<Box<dyn ErasedStage>>,
    _io: PhantomData<fn(I) -> O>,
}

impl<I, O> Pipeline<I, O>
where
    I: Validate + Send + 'static,
    O: Validate + Send + 'static,
{
    /// Starts a pipeline with its first stage
    pub fn new<S>(id: &'static str, first: S) -> Self
    where
        S: Stage<Input = I, Output = O> + 'static,
    {
        Self {
            id,
            stages: vec![Box::new(Erased(first))],
            _io: PhantomData,
        }
    }

    /// Appends a stage consuming the current output
    pub fn then<S>(mut self, next: S) -> Pipeline<I, S::Output>
    where
        S: Stage<Input = O> + 'static,
    {
        self.stages.push(Box::new(Erased(next)));
        Pipeline {
            id: self.id,
            stages: self.stages,
            _io: PhantomData,
        }
    }

    pub fn id(&self) -> &'static str {
        self.id
    }

    pub fn stage_ids(&self) -> Vec<&'static str> {
        self.stages.iter().map(|s| s.id()).collect()
    }

    /// Runs the pipeline with a fresh run record
    pub async fn run(&self, input: I) -> Result<O, PipelineError> {
        let mut run = PipelineRun::new(self.id);
        self.run_tracked(&mut run, input, &NoopObserver).await
    }

    /// Runs the pipeline, recording progress in `run` and reporting every
    /// transition to `observer`
    pub async fn run_tracked(
        &self,
        run: &mut PipelineRun,
        input: I,
        observer: &dyn RunObserver,
    ) -> Result<O, PipelineError> {
        if let Err(source) = input.validate() {
            error!(
                "Run {} of pipeline '{}' rejected: invalid input: {}",
                run.id, self.id, source
            );
            run.fail(format!("invalid input: {}", source));
            observer.on_update(run);
            return Err(PipelineError::InvalidInput {
                run_id: run.id.clone(),
                pipeline_id: self.id,
                source,
            });
        }

        run.start();
        observer.on_update(run);
        info!("Starting run {} of pipeline '{}'", run.id, self.id);

        let total = self.stages.len();
        let mut payload: Payload = Box::new(input);

        for (idx, stage) in self.stages.iter().enumerate() {
            run.enter_stage(idx, stage.id());
            observer.on_update(run);
            info!(
                "Run {}: executing stage {}/{}: {}",
                run.id,
                idx + 1,
                total,
                stage.id()
            );

            payload = match stage.execute_erased(payload).await {
                Ok(output) => output,
                Err(source) => {
                    error!(
                        "Run {}: stage '{}' failed ({}): {}",
                        run.id,
                        stage.id(),
                        source.kind(),
                        source
                    );
                    run.fail(source.to_string());
                    observer.on_update(run);
                    return Err(PipelineError::StageFailed {
                        run_id: run.id.clone(),
                        stage_id: stage.id(),
                        stage_index: idx,
                        source,
                    });
                }
            };

            info!("Run {}: stage '{}' completed", run.id, stage.id());
        }

        match payload.downcast::<O>() {
            Ok(output) => {
                run.succeed();
                observer.on_update(run);
                info!("Run {} of pipeline '{}' succeeded", run.id, self.id);
                Ok(*output)
            }
            Err(_) => {
                run.fail("unexpected output type");
                observer.on_update(run);
                Err(PipelineError::OutputMismatch {
                    run_id: run.id.clone(),
                    pipeline_id: self.id,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::run::RunStatus;
    use std::sync::{Arc, Mutex};

    #[derive(Debug, Clone, Copy, PartialEq)]
    struct Num(i64);

    impl Validate for Num {
        fn validate(&self) -> Result<(), ValidationError> {
            if self.0 < 0 {
                return Err(ValidationError::new("value", "must not be negative"));
            }
            Ok(())
        }
    }

    type CallLog = Arc<Mutex<Vec<&'static str>>>;

    struct Arith {
        id: &'static str,
        op: fn(i64) -> i64,
        calls: CallLog,
    }

    #[async_trait]
    impl Stage for Arith {
        type Input = Num;
        type Output = Num;

        fn id(&self) -> &'static str {
            self.id
        }

        async fn execute(&self, input: Num) -> Result<Num, StageFailure> {
            self.calls.lock().unwrap().push(self.id);
            Ok(Num((self.op)(input.0)))
        }
    }

    struct Failing {
        calls: CallLog,
    }

    #[async_trait]
    impl Stage for Failing {
        type Input = Num;
        type Output = Num;

        fn id(&self) -> &'static str {
            "failing"
        }

        async fn execute(&self, _input: Num) -> Result<Num, StageFailure> {
            self.calls.lock().unwrap().push("failing");
            Err(StageFailure::extraction("not json", "<html>"))
        }
    }

    fn arith(id: &'static str, op: fn(i64) -> i64, calls: &CallLog) -> Arith {
        Arith {
            id,
            op,
            calls: calls.clone(),
        }
    }

    #[derive(Default)]
    struct Recorder(Mutex<Vec<(RunStatus, Option<usize>)>>);

    impl RunObserver for Recorder {
        fn on_update(&self, run: &PipelineRun) {
            self.0.lock().unwrap().push((run.status, run.stage_index));
        }
    }

    #[tokio::test]
    async fn test_runs_stages_in_order() {
        let calls = CallLog::default();
        let pipeline = Pipeline::new("p", arith("double", |x| x * 2, &calls))
            .then(arith("add-one", |x| x + 1, &calls))
            .then(arith("square", |x| x * x, &calls));

        let output = pipeline.run(Num(3)).await.unwrap();

        assert_eq!(output, Num(49));
        assert_eq!(*calls.lock().unwrap(), vec!["double", "add-one", "square"]);
        assert_eq!(pipeline.stage_ids(), vec!["double", "add-one", "square"]);
    }

    #[tokio::test]
    async fn test_invalid_input_fails_before_any_stage() {
        let calls = CallLog::default();
        let pipeline = Pipeline::new("p", arith("double", |x| x * 2, &calls));

        let mut run = PipelineRun::new("p");
        let err = pipeline
            .run_tracked(&mut run, Num(-1), &NoopObserver)
            .await
            .unwrap_err();

        assert!(matches!(err, PipelineError::InvalidInput { .. }));
        assert!(calls.lock().unwrap().is_empty());
        assert_eq!(run.status, RunStatus::Failed);
        assert_eq!(err.run_id(), run.id);
    }

    #[tokio::test]
    async fn test_aborts_at_first_failure() {
        let calls = CallLog::default();
        let pipeline = Pipeline::new("p", arith("double", |x| x * 2, &calls))
            .then(Failing {
                calls: calls.clone(),
            })
            .then(arith("add-one", |x| x + 1, &calls));

        let mut run = PipelineRun::new("p");
        let err = pipeline
            .run_tracked(&mut run, Num(1), &NoopObserver)
            .await
            .unwrap_err();

        match &err {
            PipelineError::StageFailed {
                stage_id,
                stage_index,
                source,
                ..
            } => {
                assert_eq!(*stage_id, "failing");
                assert_eq!(*stage_index, 1);
                assert_eq!(source.kind(), "extraction");
                assert!(source.to_string().contains("<html>"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert_eq!(*calls.lock().unwrap(), vec!["double", "failing"]);
        assert_eq!(run.status, RunStatus::Failed);
        assert_eq!(run.stage_id.as_deref(), Some("failing"));
    }

    #[tokio::test]
    async fn test_invalid_stage_output_is_a_stage_failure() {
        let calls = CallLog::default();
        let pipeline = Pipeline::new("p", arith("negate", |x| -x, &calls))
            .then(arith("double", |x| x * 2, &calls));

        let err = pipeline.run(Num(4)).await.unwrap_err();

        match err {
            PipelineError::StageFailed {
                stage_id, source, ..
            } => {
                assert_eq!(stage_id, "negate");
                assert!(matches!(source, StageFailure::Validation(_)));
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert_eq!(*calls.lock().unwrap(), vec!["negate"]);
    }

    #[tokio::test]
    async fn test_composition_matches_combined_stage() {
        let calls = CallLog::default();
        let composed = Pipeline::new("composed", arith("a", |x| x + 3, &calls))
            .then(arith("b", |x| x * 5, &calls));
        let combined = Pipeline::new("combined", arith("b-after-a", |x| (x + 3) * 5, &calls));

        for value in [0, 1, 7, 42] {
            assert_eq!(
                composed.run(Num(value)).await.unwrap(),
                combined.run(Num(value)).await.unwrap()
            );
        }
    }

    #[derive(Debug, thiserror::Error)]
    #[error("lookup timed out after {0:?}")]
    struct LookupTimeout(std::time::Duration);

    impl crate::retry::CollaboratorError for LookupTimeout {
        fn is_transient(&self) -> bool {
            true
        }

        fn deadline_exceeded(after: std::time::Duration) -> Self {
            LookupTimeout(after)
        }

        fn deadline(&self) -> Option<std::time::Duration> {
            Some(self.0)
        }
    }

    /// Stage whose collaborator never answers within its deadline
    struct SlowLookup {
        attempts: Arc<Mutex<u32>>,
    }

    #[async_trait]
    impl Stage for SlowLookup {
        type Input = Num;
        type Output = Num;

        fn id(&self) -> &'static str {
            "slow-lookup"
        }

        async fn execute(&self, input: Num) -> Result<Num, StageFailure> {
            let policy = crate::retry::RetryPolicy::new(2, std::time::Duration::from_millis(50))
                .with_delays(
                    std::time::Duration::from_millis(1),
                    std::time::Duration::from_millis(1),
                );

            crate::retry::with_retry(&policy, "lookup", || async {
                *self.attempts.lock().unwrap() += 1;
                tokio::time::sleep(std::time::Duration::from_secs(5)).await;
                Ok::<_, LookupTimeout>(input)
            })
            .await
            .map_err(|e| StageFailure::collaborator("lookup service", e))
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_collaborator_deadline_fails_the_stage() {
        let calls = CallLog::default();
        let attempts = Arc::new(Mutex::new(0));
        let pipeline = Pipeline::new(
            "p",
            SlowLookup {
                attempts: attempts.clone(),
            },
        )
        .then(arith("double", |x| x * 2, &calls));

        let mut run = PipelineRun::new("p");
        let err = pipeline
            .run_tracked(&mut run, Num(1), &NoopObserver)
            .await
            .unwrap_err();

        match &err {
            PipelineError::StageFailed {
                stage_id, source, ..
            } => {
                assert_eq!(*stage_id, "slow-lookup");
                assert_eq!(source.kind(), "deadline_exceeded");
                assert_eq!(
                    source.to_string(),
                    "lookup service deadline exceeded after 50ms"
                );
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert_eq!(*attempts.lock().unwrap(), 2);
        assert!(calls.lock().unwrap().is_empty());
        assert_eq!(run.status, RunStatus::Failed);
        assert_eq!(run.stage_id.as_deref(), Some("slow-lookup"));
    }

    #[tokio::test]
    async fn test_observer_sees_every_transition() {
        let calls = CallLog::default();
        let pipeline = Pipeline::new("p", arith("a", |x| x, &calls))
            .then(arith("b", |x| x, &calls));

        let recorder = Recorder::default();
        let mut run = PipelineRun::new("p");
        pipeline
            .run_tracked(&mut run, Num(1), &recorder)
            .await
            .unwrap();

        assert_eq!(
            *recorder.0.lock().unwrap(),
            vec![
                (RunStatus::Running, None),
                (RunStatus::Running, Some(0)),
                (RunStatus::Running, Some(1)),
                (RunStatus::Succeeded, Some(1)),
            ]
        );
    }
}
