//! Embedded in-process queue broker
//!
//! Backs deployments that run workers inside the gateway process, and the
//! test suite. Queues are FIFO per name; delayed jobs become visible
//! lazily on the next depth check or claim; finished records are pruned
//! to the retention limit, oldest first.

use chrono::Utc;
use dashmap::DashMap;
use parking_lot::Mutex;
use std::collections::{HashSet, VecDeque};
use std::time::{Duration, Instant};
use tokio::sync::oneshot;
use tracing::debug;
use uuid::Uuid;

use async_trait::async_trait;

use crate::broker::traits::{
    EnqueueOptions, Job, JobBroker, JobCounts, JobHandle, JobOutcome, JobResult,
};
use crate::error::{AppError, Result};
use crate::model::defaults::JobPayload;

struct DelayedJob {
    visible_at: Instant,
    job: Job,
}

struct FinishedJob {
    id: Uuid,
    outcome: JobOutcome,
}

#[derive(Default)]
struct QueueState {
    waiting: VecDeque<Job>,
    delayed: Vec<DelayedJob>,
    active: HashSet<Uuid>,
    finished: VecDeque<FinishedJob>,
    retention: usize,
}

impl QueueState {
    /// Move delayed jobs whose visibility deadline has passed into the
    /// waiting queue, preserving enqueue order.
    fn promote_due(&mut self) {
        let now = Instant::now();
        let mut i = 0;
        while i < self.delayed.len() {
            if self.delayed[i].visible_at <= now {
                let due = self.delayed.remove(i);
                self.waiting.push_back(due.job);
            } else {
                i += 1;
            }
        }
    }

    fn prune_finished(&mut self) {
        while self.finished.len() > self.retention {
            self.finished.pop_front();
        }
    }
}

/// In-process job broker with per-queue FIFO state.
///
/// The gateway consumes it through [`JobBroker`]; workers use the
/// concrete claim/complete/fail surface.
pub struct MemoryBroker {
    queues: DashMap<String, Mutex<QueueState>>,
    waiters: DashMap<Uuid, oneshot::Sender<JobOutcome>>,
}

impl MemoryBroker {
    pub fn new() -> Self {
        Self {
            queues: DashMap::new(),
            waiters: DashMap::new(),
        }
    }

    fn with_queue<T>(&self, queue: &str, f: impl FnOnce(&mut QueueState) -> T) -> T {
        let entry = self
            .queues
            .entry(queue.to_string())
            .or_insert_with(|| Mutex::new(QueueState::default()));
        let mut state = entry.lock();
        f(&mut state)
    }

    fn finished_outcome(&self, queue: &str, id: Uuid) -> Option<JobOutcome> {
        self.with_queue(queue, |state| {
            state
                .finished
                .iter()
                .find(|f| f.id == id)
                .map(|f| f.outcome.clone())
        })
    }

    fn record_finished(&self, queue: &str, id: Uuid, outcome: JobOutcome) {
        self.with_queue(queue, |state| {
            state.active.remove(&id);
            state.finished.push_back(FinishedJob {
                id,
                outcome: outcome.clone(),
            });
            state.prune_finished();
        });

        // Fulfil the pending wait, if any. A missing waiter means the
        // caller gave up or has not subscribed yet; the finished record
        // above covers the latter.
        if let Some((_, tx)) = self.waiters.remove(&id) {
            let _ = tx.send(outcome);
        }
    }

    /// Claim the next visible job from a queue, if any. Worker-side.
    pub fn claim(&self, queue: &str) -> Option<Job> {
        self.with_queue(queue, |state| {
            state.promote_due();
            let job = state.waiting.pop_front()?;
            state.active.insert(job.id);
            Some(job)
        })
    }

    /// Mark a claimed job completed and deliver its result. Worker-side.
    pub fn complete(&self, queue: &str, id: Uuid, result: JobResult) {
        debug!(queue = %queue, job = %id, "job completed");
        self.record_finished(queue, id, JobOutcome::Completed(result));
    }

    /// Mark a claimed job failed. Worker-side.
    pub fn fail(&self, queue: &str, id: Uuid, reason: impl Into<String>) {
        let reason = reason.into();
        debug!(queue = %queue, job = %id, reason = %reason, "job failed");
        self.record_finished(queue, id, JobOutcome::Failed(reason));
    }

    /// Number of retained finished records for a queue
    pub fn finished_count(&self, queue: &str) -> usize {
        self.with_queue(queue, |state| state.finished.len())
    }

    /// Drop all queue state and fail any pending waits
    pub fn drain(&self) {
        self.queues.clear();
        let ids: Vec<Uuid> = self.waiters.iter().map(|e| *e.key()).collect();
        for id in ids {
            if let Some((_, tx)) = self.waiters.remove(&id) {
                let _ = tx.send(JobOutcome::Failed("broker shut down".to_string()));
            }
        }
    }
}

impl Default for MemoryBroker {
    fn default() -> Self {
        Self::new()
    }
}

fn outcome_to_result(outcome: JobOutcome) -> Result<JobResult> {
    match outcome {
        JobOutcome::Completed(result) => Ok(result),
        JobOutcome::Failed(reason) => Err(AppError::JobFailed(reason)),
    }
}

#[async_trait]
impl JobBroker for MemoryBroker {
    async fn counts(&self, queue: &str) -> Result<JobCounts> {
        Ok(self.with_queue(queue, |state| {
            state.promote_due();
            JobCounts {
                active: state.active.len() as u64,
                delayed: state.delayed.len() as u64,
                waiting: state.waiting.len() as u64,
            }
        }))
    }

    async fn enqueue(
        &self,
        queue: &str,
        payload: JobPayload,
        opts: EnqueueOptions,
    ) -> Result<JobHandle> {
        let handle = JobHandle {
            id: Uuid::new_v4(),
            enqueued_at: Utc::now(),
        };
        let job = Job {
            id: handle.id,
            payload,
        };

        self.with_queue(queue, |state| {
            state.retention = opts.retention;
            if opts.delay.is_zero() {
                state.waiting.push_back(job);
            } else {
                state.delayed.push(DelayedJob {
                    visible_at: Instant::now() + opts.delay,
                    job,
                });
            }
        });

        debug!(queue = %queue, job = %handle.id, delay_ms = opts.delay.as_millis() as u64, "job enqueued");
        Ok(handle)
    }

    async fn await_finished(
        &self,
        queue: &str,
        handle: &JobHandle,
        timeout: Duration,
    ) -> Result<JobResult> {
        if let Some(outcome) = self.finished_outcome(queue, handle.id) {
            return outcome_to_result(outcome);
        }

        let (tx, rx) = oneshot::channel();
        self.waiters.insert(handle.id, tx);

        // The job may have finished between the first check and the
        // waiter registration; re-check before suspending.
        if let Some(outcome) = self.finished_outcome(queue, handle.id) {
            self.waiters.remove(&handle.id);
            return outcome_to_result(outcome);
        }

        match tokio::time::timeout(timeout, rx).await {
            Ok(Ok(outcome)) => outcome_to_result(outcome),
            Ok(Err(_)) => Err(AppError::Internal(
                "completion channel closed before delivery".to_string(),
            )),
            Err(_) => {
                self.waiters.remove(&handle.id);
                Err(AppError::JobTimeout)
            }
        }
    }
}
