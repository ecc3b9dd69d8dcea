//! Admission-Controlled Generation Dispatch Gateway
//!
//! Routes generation requests to per-model work queues behind a backlog
//! ceiling, merges caller overrides over class defaults, and waits
//! inline for worker results.

pub mod api;
pub mod broker;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod model;
pub mod queue;

pub use error::{AppError, Result};

use std::sync::Arc;

use dispatch::Dispatcher;
use model::registry::ModelRegistry;

/// Application state shared across all handlers
pub struct AppState {
    pub settings: config::Settings,
    pub registry: Arc<ModelRegistry>,
    pub dispatcher: Arc<Dispatcher>,
}
