//! Backlog-depth admission control

use std::sync::Arc;
use tracing::warn;

use crate::error::{AppError, Result};
use crate::model::registry::ModelRegistry;
use crate::model::Model;

/// Accepts or rejects submissions against a process-wide backlog limit.
///
/// The limit is shared by all classes. A depth exactly at the limit is
/// still admitted; only depths above it are rejected. The depth read and
/// the subsequent enqueue are not atomic, so concurrent submitters can
/// transiently push a queue past the limit - the cap is best-effort.
pub struct AdmissionController {
    registry: Arc<ModelRegistry>,
    backlog_limit: u64,
}

impl AdmissionController {
    pub fn new(registry: Arc<ModelRegistry>, backlog_limit: u64) -> Self {
        Self {
            registry,
            backlog_limit,
        }
    }

    /// Check the class backlog against the limit, returning the observed
    /// depth on admission. Broker failures propagate as hard errors.
    pub async fn admit(&self, model: Model) -> Result<u64> {
        let depth = self.registry.entry(model).queue.depth().await?;
        if depth > self.backlog_limit {
            warn!(model = %model, depth, limit = self.backlog_limit, "submission rejected, queue over capacity");
            return Err(AppError::Overloaded {
                model: model.to_string(),
                depth,
            });
        }
        Ok(depth)
    }
}
