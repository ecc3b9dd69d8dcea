//! Configuration module

pub mod settings;

pub use settings::{
    BrokerConfig, CorsConfig, GenerationConfig, LoggingConfig, QueueConfig, ServerConfig, Settings,
};
