//! Typed per-model handle over the broker connection

use std::sync::Arc;
use std::time::Duration;

use crate::broker::traits::{EnqueueOptions, JobBroker, JobHandle, JobResult};
use crate::config::QueueConfig;
use crate::error::Result;
use crate::model::defaults::JobPayload;
use crate::model::Model;

/// One model class's view of the work queue: depth inquiry, enqueue with
/// the configured delay and retention, and the bounded completion wait.
pub struct ModelQueue {
    broker: Arc<dyn JobBroker>,
    queue: &'static str,
    delay: Duration,
    retention: usize,
    wait_timeout: Duration,
}

impl ModelQueue {
    pub fn new(broker: Arc<dyn JobBroker>, model: Model, config: &QueueConfig) -> Self {
        Self {
            broker,
            queue: model.as_str(),
            delay: Duration::from_millis(config.enqueue_delay_ms),
            retention: config.retention_limit,
            wait_timeout: Duration::from_millis(config.wait_timeout_ms),
        }
    }

    /// Backlog depth for this class: active + delayed + waiting
    pub async fn depth(&self) -> Result<u64> {
        Ok(self.broker.counts(self.queue).await?.depth())
    }

    /// Append a merged payload to the tail of this class's queue
    pub async fn enqueue(&self, payload: JobPayload) -> Result<JobHandle> {
        self.broker
            .enqueue(
                self.queue,
                payload,
                EnqueueOptions {
                    delay: self.delay,
                    retention: self.retention,
                },
            )
            .await
    }

    /// Block until the job finishes or the configured timeout elapses
    pub async fn await_finished(&self, handle: &JobHandle) -> Result<JobResult> {
        self.broker
            .await_finished(self.queue, handle, self.wait_timeout)
            .await
    }
}
