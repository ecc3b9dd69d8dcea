//! Consumer-side broker contract and job types

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use uuid::Uuid;

use crate::error::Result;
use crate::model::defaults::JobPayload;

/// Identifies an enqueued job
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobHandle {
    pub id: Uuid,
    pub enqueued_at: DateTime<Utc>,
}

/// Per-queue job counts by state
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct JobCounts {
    pub active: u64,
    pub delayed: u64,
    pub waiting: u64,
}

impl JobCounts {
    /// Backlog depth: everything not yet finished
    pub fn depth(&self) -> u64 {
        self.active + self.delayed + self.waiting
    }
}

/// Options applied when appending a job to a queue
#[derive(Debug, Clone, Copy)]
pub struct EnqueueOptions {
    /// Minimum visibility delay before a worker may claim the job
    pub delay: Duration,
    /// How many finished job records the queue retains (oldest pruned
    /// first)
    pub retention: usize,
}

/// A claimed job, as seen by a worker
#[derive(Debug, Clone)]
pub struct Job {
    pub id: Uuid,
    pub payload: JobPayload,
}

/// What a worker produced for one job
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobResult {
    /// Encoded image data, opaque to the gateway
    pub base64: String,
    /// The seed the worker actually used
    pub seed: i64,
}

/// Terminal record for a finished job
#[derive(Debug, Clone)]
pub enum JobOutcome {
    Completed(JobResult),
    Failed(String),
}

/// The queue broker as consumed by the gateway.
///
/// Implementations must preserve FIFO order within a queue and deliver
/// each job's outcome at most once per handle. The worker-side surface
/// (claiming and finishing jobs) is deliberately not part of this
/// contract.
#[async_trait]
pub trait JobBroker: Send + Sync {
    /// Current job counts for a queue. A broker that cannot be reached
    /// must fail here rather than report zero.
    async fn counts(&self, queue: &str) -> Result<JobCounts>;

    /// Append a payload to the tail of a queue
    async fn enqueue(
        &self,
        queue: &str,
        payload: JobPayload,
        opts: EnqueueOptions,
    ) -> Result<JobHandle>;

    /// Block until the identified job finishes or the timeout elapses.
    ///
    /// A timeout cancels only this wait; the job stays in the queue and
    /// may still run to completion with its result discarded.
    async fn await_finished(
        &self,
        queue: &str,
        handle: &JobHandle,
        timeout: Duration,
    ) -> Result<JobResult>;
}
