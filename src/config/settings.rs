//! Application settings and configuration management

use crate::error::{AppError, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Root configuration structure
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Settings {
    pub server: ServerConfig,
    pub broker: BrokerConfig,
    pub queue: QueueConfig,
    pub generation: GenerationConfig,
    pub cors: CorsConfig,
    pub logging: LoggingConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

/// Queue broker connection configuration
///
/// Only the embedded in-process driver is linked today; the connection
/// parameters are carried for deployments that point the gateway at a
/// wire broker instead.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BrokerConfig {
    #[serde(default = "default_broker_driver")]
    pub driver: String,
    #[serde(default = "default_broker_host")]
    pub host: String,
    #[serde(default = "default_broker_port")]
    pub port: u16,
    #[serde(default)]
    pub password: Option<String>,
}

fn default_broker_driver() -> String {
    "memory".to_string()
}

fn default_broker_host() -> String {
    "127.0.0.1".to_string()
}

fn default_broker_port() -> u16 {
    6379
}

/// Per-class queue behavior
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct QueueConfig {
    /// Maximum backlog (active + delayed + waiting) before new
    /// submissions are rejected
    #[serde(default = "default_backlog_limit")]
    pub backlog_limit: u64,
    /// Visibility delay before a worker may claim an enqueued job
    #[serde(default = "default_enqueue_delay")]
    pub enqueue_delay_ms: u64,
    /// How long a dispatch call waits for a worker result
    #[serde(default = "default_wait_timeout")]
    pub wait_timeout_ms: u64,
    /// How many finished job records the broker retains per queue
    #[serde(default = "default_retention_limit")]
    pub retention_limit: usize,
}

fn default_backlog_limit() -> u64 {
    10
}

fn default_enqueue_delay() -> u64 {
    1000
}

fn default_wait_timeout() -> u64 {
    120_000
}

fn default_retention_limit() -> usize {
    50
}

/// Generation defaults shared by all models
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GenerationConfig {
    #[serde(default = "default_steps")]
    pub default_steps: u32,
}

fn default_steps() -> u32 {
    20
}

/// Cross-origin configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CorsConfig {
    #[serde(default)]
    pub allowed_origins: Vec<String>,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "json".to_string()
}

impl Settings {
    /// Load settings from configuration files and environment variables
    pub fn load() -> Result<Self> {
        Self::load_from_path("config/default.toml")
    }

    /// Load settings from a specific configuration file path
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let config = Config::builder()
            // Start with default values
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8080)?
            .set_default("broker.driver", "memory")?
            .set_default("broker.host", "127.0.0.1")?
            .set_default("broker.port", 6379)?
            .set_default("queue.backlog_limit", 10)?
            .set_default("queue.enqueue_delay_ms", 1000)?
            .set_default("queue.wait_timeout_ms", 120_000)?
            .set_default("queue.retention_limit", 50)?
            .set_default("generation.default_steps", 20)?
            .set_default("logging.level", "info")?
            .set_default("logging.format", "json")?
            // Load from configuration file
            .add_source(
                File::with_name(path.as_ref().to_str().unwrap_or("config/default"))
                    .required(false),
            )
            // Override with environment variables (prefixed with GATEWAY__)
            .add_source(
                Environment::with_prefix("GATEWAY")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let settings: Settings = config.try_deserialize()?;
        Ok(settings)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            return Err(AppError::Config(config::ConfigError::Message(
                "Server port cannot be 0".to_string(),
            )));
        }

        if self.broker.driver != "memory" {
            return Err(AppError::Config(config::ConfigError::Message(format!(
                "Unknown broker driver '{}'. Only 'memory' is available",
                self.broker.driver
            ))));
        }

        if self.broker.host.is_empty() {
            return Err(AppError::Config(config::ConfigError::Message(
                "Broker host cannot be empty".to_string(),
            )));
        }

        if self.generation.default_steps == 0 {
            return Err(AppError::Config(config::ConfigError::Message(
                "generation.default_steps must be at least 1".to_string(),
            )));
        }

        if self.queue.wait_timeout_ms == 0 {
            return Err(AppError::Config(config::ConfigError::Message(
                "queue.wait_timeout_ms must be greater than 0".to_string(),
            )));
        }

        Ok(())
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: default_host(),
                port: default_port(),
            },
            broker: BrokerConfig {
                driver: default_broker_driver(),
                host: default_broker_host(),
                port: default_broker_port(),
                password: None,
            },
            queue: QueueConfig {
                backlog_limit: default_backlog_limit(),
                enqueue_delay_ms: default_enqueue_delay(),
                wait_timeout_ms: default_wait_timeout(),
                retention_limit: default_retention_limit(),
            },
            generation: GenerationConfig {
                default_steps: default_steps(),
            },
            cors: CorsConfig {
                allowed_origins: vec![],
            },
            logging: LoggingConfig {
                level: default_log_level(),
                format: default_log_format(),
            },
        }
    }
}
