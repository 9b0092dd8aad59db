//! Request tracking for evaluator runs.
//!
//! A session remembers which request is the latest. Every submission
//! becomes the latest; when an older one finishes its result is dropped.
//! Nothing is cancelled: a stale run still completes and cleans up.

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use tokio::task::JoinHandle;
use tracing::{info, warn};
use uuid::Uuid;

use crate::evaluator::{EvaluationJob, EvaluationOutput, Evaluator};

/// Identifies one submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequestId(Uuid);

impl RequestId {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// The result of a run that was still current when it finished.
#[derive(Debug, Clone)]
pub struct RebaseOutcome {
    /// Which submission this was.
    pub request: RequestId,
    /// Evaluator output.
    pub output: EvaluationOutput,
    /// Wall time spent in the evaluator.
    pub elapsed: Duration,
}

#[derive(Debug, Default)]
struct SessionState {
    latest: Mutex<Option<RequestId>>,
    in_flight: AtomicUsize,
}

impl SessionState {
    fn latest(&self) -> Option<RequestId> {
        *self.latest.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn set_latest(&self, id: RequestId) {
        *self.latest.lock().unwrap_or_else(PoisonError::into_inner) = Some(id);
    }
}

/// Runs evaluations and keeps only the newest result.
pub struct RebaseSession<E> {
    evaluator: Arc<E>,
    state: Arc<SessionState>,
}

impl<E> Clone for RebaseSession<E> {
    fn clone(&self) -> Self {
        Self {
            evaluator: Arc::clone(&self.evaluator),
            state: Arc::clone(&self.state),
        }
    }
}

impl<E: Evaluator + 'static> RebaseSession<E> {
    /// Create a session around an evaluator.
    pub fn new(evaluator: E) -> Self {
        Self {
            evaluator: Arc::new(evaluator),
            state: Arc::default(),
        }
    }

    /// The wrapped evaluator.
    pub fn evaluator(&self) -> &E {
        &self.evaluator
    }

    /// The most recent submission, if any.
    pub fn latest_request(&self) -> Option<RequestId> {
        self.state.latest()
    }

    /// True while any submitted run has not finished.
    pub fn is_busy(&self) -> bool {
        self.state.in_flight.load(Ordering::SeqCst) > 0
    }

    /// Submit a job. It becomes the latest request immediately.
    ///
    /// The returned task resolves to `None` if a newer job was submitted
    /// before this one finished. Must be called from within a tokio
    /// runtime.
    pub fn submit(&self, job: EvaluationJob) -> JoinHandle<Option<RebaseOutcome>> {
        let id = RequestId::new();
        self.state.set_latest(id);
        self.state.in_flight.fetch_add(1, Ordering::SeqCst);

        let evaluator = Arc::clone(&self.evaluator);
        let state = Arc::clone(&self.state);
        tokio::spawn(async move {
            let started = Instant::now();
            let result = tokio::task::spawn_blocking(move || evaluator.evaluate(&job)).await;
            state.in_flight.fetch_sub(1, Ordering::SeqCst);

            let output = result.unwrap_or_else(|e| {
                EvaluationOutput::failed(format!("ERROR: evaluator task failed: {e}"))
            });
            let elapsed = started.elapsed();

            if state.latest() != Some(id) {
                warn!(request = %id, "dropping superseded result");
                return None;
            }
            for line in output.warnings() {
                warn!(request = %id, "{line}");
            }
            info!(
                request = %id,
                failed = output.is_failure(),
                elapsed_ms = elapsed.as_millis() as u64,
                "evaluation complete"
            );
            Some(RebaseOutcome {
                request: id,
                output,
                elapsed,
            })
        })
    }
}
