//! Built-in default payloads per model class

use serde::{Deserialize, Serialize};

use crate::model::Model;

const ANYTHING_NEGATIVE: &str = "EasyNegative, extra fingers,fewer fingers, lowres, bad anatomy, bad hands, text, error, missing fingers, extra digit, fewer digits, cropped, worst quality, low quality, normal quality, jpeg artifacts,signature, watermark, username, blurry, artist name";

const AOM_NEGATIVE: &str = "EasyNegative, (worst quality, low quality:1.4), lowres, bad anatomy, bad hands, text, error, missing fingers, extra digit, fewer digits, cropped, worst quality, low quality, normal quality, jpeg artifacts,signature, watermark, username, blurry, artist name";

const COUNTERFEIT_NEGATIVE: &str = "EasyNegative, extra fingers,fewer fingers, lowres, bad anatomy, bad hands, text, error, missing fingers, extra digit, fewer digits, cropped, worst quality, low quality, normal quality, jpeg artifacts,signature, watermark, username, blurry, artist name";

/// The full parameter set handed to a worker.
///
/// A payload always starts as a clone of its class defaults; merging only
/// appends to the prompt fields or replaces the scalar fields, so every
/// default field survives into the enqueued job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobPayload {
    pub prompt: String,
    pub negative_prompt: String,
    pub sampler_index: String,
    pub steps: u32,
    pub cfg_scale: f32,
    pub sd_model_checkpoint: String,
    pub denoising_strength: f32,
    pub seed: i64,
}

/// Default payload for a model class. `default_steps` comes from
/// configuration and is shared by all classes.
pub fn builtin_defaults(model: Model, default_steps: u32) -> JobPayload {
    match model {
        Model::Anything => JobPayload {
            prompt: "masterpiece, best quality".to_string(),
            negative_prompt: ANYTHING_NEGATIVE.to_string(),
            sampler_index: "DPM++ 2M Karras".to_string(),
            steps: default_steps,
            cfg_scale: 7.0,
            sd_model_checkpoint: "anything-v4.0.ckpt".to_string(),
            denoising_strength: 0.0,
            seed: -1,
        },
        Model::Aom => JobPayload {
            prompt: String::new(),
            negative_prompt: AOM_NEGATIVE.to_string(),
            sampler_index: "DPM++ SDE Karras".to_string(),
            steps: default_steps,
            cfg_scale: 5.0,
            sd_model_checkpoint: "aom3.safetensors".to_string(),
            denoising_strength: 0.5,
            seed: -1,
        },
        Model::Counterfeit => JobPayload {
            prompt: "((masterpiece,best quality))".to_string(),
            negative_prompt: COUNTERFEIT_NEGATIVE.to_string(),
            sampler_index: "DPM++ 2M Karras".to_string(),
            steps: default_steps,
            cfg_scale: 10.0,
            sd_model_checkpoint: "counterfeit-v2.5.safetensors".to_string(),
            denoising_strength: 0.5,
            seed: -1,
        },
    }
}
