//! Registry table bundling defaults and queue handle per model class

use std::sync::Arc;

use crate::broker::traits::JobBroker;
use crate::config::QueueConfig;
use crate::model::defaults::{builtin_defaults, JobPayload};
use crate::model::Model;
use crate::queue::ModelQueue;

/// Everything the dispatcher needs for one model class
pub struct ModelEntry {
    pub defaults: JobPayload,
    pub queue: ModelQueue,
}

/// Immutable routing table, one entry per [`Model`] variant.
///
/// Built once at startup; lookups are total because the table is
/// constructed over `Model::ALL`.
pub struct ModelRegistry {
    entries: Vec<ModelEntry>,
}

impl ModelRegistry {
    pub fn new(broker: Arc<dyn JobBroker>, config: &QueueConfig, default_steps: u32) -> Self {
        let entries = Model::ALL
            .iter()
            .map(|&model| ModelEntry {
                defaults: builtin_defaults(model, default_steps),
                queue: ModelQueue::new(broker.clone(), model, config),
            })
            .collect();
        Self { entries }
    }

    pub fn entry(&self, model: Model) -> &ModelEntry {
        &self.entries[model as usize]
    }

    pub fn defaults(&self, model: Model) -> &JobPayload {
        &self.entry(model).defaults
    }
}
