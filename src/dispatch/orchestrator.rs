//! Request orchestration: validate, admit, merge, enqueue, wait

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};

use crate::dispatch::admission::AdmissionController;
use crate::error::{AppError, Result};
use crate::model::merge::{merge, GenerateRequest};
use crate::model::registry::ModelRegistry;
use crate::model::Model;

/// Response for a completed generation request.
///
/// `base64` and `seed` come from the worker's result; `positive` and
/// `negative` echo the caller's override fragments (omitted when the
/// caller sent none); the scalars are the merged values that were
/// actually enqueued.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateReply {
    pub base64: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub positive: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub negative: Option<String>,
    pub cfg_scale: f32,
    pub denoising_strength: f32,
    pub model: String,
    pub seed: i64,
}

/// Drives each inbound request through its terminal outcome: completed,
/// failed, timed out, or rejected. No retries happen at this layer, and
/// a timed-out wait does not retract the already-enqueued job.
pub struct Dispatcher {
    registry: Arc<ModelRegistry>,
    admission: AdmissionController,
}

impl Dispatcher {
    pub fn new(registry: Arc<ModelRegistry>, admission: AdmissionController) -> Self {
        Self {
            registry,
            admission,
        }
    }

    /// Submit a generation request and block until its result arrives
    pub async fn dispatch(&self, model: &str, request: GenerateRequest) -> Result<GenerateReply> {
        let model = Self::parse_model(model)?;
        let depth = self.admission.admit(model).await?;
        debug!(model = %model, depth, "submission admitted");

        let entry = self.registry.entry(model);
        let payload = merge(&entry.defaults, &request);

        let handle = entry.queue.enqueue(payload.clone()).await?;
        info!(model = %model, job = %handle.id, "job enqueued");

        let result = entry.queue.await_finished(&handle).await?;
        debug!(model = %model, job = %handle.id, seed = result.seed, "job finished");

        Ok(GenerateReply {
            base64: result.base64,
            positive: request.prompt,
            negative: request.negative_prompt,
            cfg_scale: payload.cfg_scale,
            denoising_strength: payload.denoising_strength,
            model: model.to_string(),
            seed: result.seed,
        })
    }

    /// Current backlog depth for a class, with the same class validation
    /// as dispatch
    pub async fn queue_depth(&self, model: &str) -> Result<u64> {
        let model = Self::parse_model(model)?;
        self.registry.entry(model).queue.depth().await
    }

    fn parse_model(model: &str) -> Result<Model> {
        Model::parse(model).ok_or_else(|| AppError::UnknownModel(model.to_string()))
    }
}
