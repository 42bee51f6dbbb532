//! In-memory run registry
//!
//! Holds the latest snapshot of every recent run for status polling. The
//! registry is the run observer: the pipeline runner pushes a snapshot on
//! every transition.

use std::collections::{HashMap, VecDeque};
use std::sync::{PoisonError, RwLock};

use recordflow_core::RunObserver;
use recordflow_core::domain::run::PipelineRun;
use tracing::debug;

#[derive(Default)]
struct Inner {
    runs: HashMap<String, PipelineRun>,
    /// Run ids, oldest first
    order: VecDeque<String>,
}

/// Bounded map of run id to latest snapshot
pub struct RunRegistry {
    inner: RwLock<Inner>,
    capacity: usize,
}

impl RunRegistry {
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: RwLock::new(Inner::default()),
            capacity: capacity.max(1),
        }
    }

    pub fn get(&self, run_id: &str) -> Option<PipelineRun> {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        inner.runs.get(run_id).cloned()
    }

    pub fn len(&self) -> usize {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        inner.runs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Records a snapshot, evicting old runs when over capacity
    pub fn record(&self, run: &PipelineRun) {
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);

        if inner.runs.insert(run.id.clone(), run.clone()).is_none() {
            inner.order.push_back(run.id.clone());
        }

        while inner.runs.len() > self.capacity {
            let Some(evicted) = Self::evict_one(&mut inner) else {
                break;
            };
            debug!("Evicted run {} from registry", evicted);
        }
    }

    /// Forgets a run that never made it into the queue
    pub fn remove(&self, run_id: &str) {
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        if inner.runs.remove(run_id).is_some() {
            inner.order.retain(|id| id != run_id);
        }
    }

    /// Drops the oldest finished run, or the oldest run if none has finished
    fn evict_one(inner: &mut Inner) -> Option<String> {
        let position = inner
            .order
            .iter()
            .position(|id| {
                inner
                    .runs
                    .get(id)
                    .is_some_and(|run| run.status.is_terminal())
            })
            .unwrap_or(0);

        let id = inner.order.remove(position)?;
        inner.runs.remove(&id);
        Some(id)
    }
}

impl RunObserver for RunRegistry {
    fn on_update(&self, run: &PipelineRun) {
        self.record(run);
    }
}
