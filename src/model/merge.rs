//! Merging caller overrides over class defaults

use serde::{Deserialize, Serialize};

use crate::model::defaults::JobPayload;

/// Caller-supplied overrides for a generation request.
///
/// Every field is optional; unknown JSON fields are ignored. A missing
/// request body deserializes to the all-`None` default.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenerateRequest {
    #[serde(default)]
    pub prompt: Option<String>,
    #[serde(default)]
    pub negative_prompt: Option<String>,
    #[serde(default)]
    pub cfg_scale: Option<f32>,
    #[serde(default)]
    pub denoising_strength: Option<f32>,
    #[serde(default)]
    pub seed: Option<i64>,
}

/// Combine class defaults with caller overrides into the payload that
/// gets enqueued.
///
/// Textual fields are appended: a non-empty override yields
/// `default + ", " + override`, never replacing the default. Scalar
/// fields are replaced wholesale when the override is present and
/// non-zero; zero is treated the same as omitting the field, so the
/// default stays. No range validation happens here; out-of-range values
/// pass through to the worker.
pub fn merge(defaults: &JobPayload, overrides: &GenerateRequest) -> JobPayload {
    let mut payload = defaults.clone();

    if let Some(prompt) = overrides.prompt.as_deref().filter(|p| !p.is_empty()) {
        payload.prompt = format!("{}, {}", payload.prompt, prompt);
    }
    if let Some(negative) = overrides
        .negative_prompt
        .as_deref()
        .filter(|p| !p.is_empty())
    {
        payload.negative_prompt = format!("{}, {}", payload.negative_prompt, negative);
    }
    if let Some(cfg_scale) = overrides.cfg_scale.filter(|v| *v != 0.0) {
        payload.cfg_scale = cfg_scale;
    }
    if let Some(strength) = overrides.denoising_strength.filter(|v| *v != 0.0) {
        payload.denoising_strength = strength;
    }
    if let Some(seed) = overrides.seed.filter(|v| *v != 0) {
        payload.seed = seed;
    }

    payload
}
