//! Process-wide owner of the broker connection
//!
//! Queue adapters borrow handles from the pool instead of opening
//! ambient connections of their own.

use std::sync::Arc;
use tracing::info;

use crate::broker::memory::MemoryBroker;
use crate::broker::traits::JobBroker;
use crate::config::BrokerConfig;
use crate::error::{AppError, Result};

/// Owns the broker connection for the lifetime of the process, with
/// explicit init and teardown.
pub struct BrokerPool {
    broker: Arc<MemoryBroker>,
}

impl BrokerPool {
    /// Initialize the configured broker driver
    pub fn init(config: &BrokerConfig) -> Result<Self> {
        match config.driver.as_str() {
            "memory" => {
                info!(driver = %config.driver, "broker pool initialized");
                Ok(Self {
                    broker: Arc::new(MemoryBroker::new()),
                })
            }
            other => Err(AppError::Config(config::ConfigError::Message(format!(
                "unknown broker driver '{}'",
                other
            )))),
        }
    }

    /// Consumer-side handle for injection into queue adapters
    pub fn handle(&self) -> Arc<dyn JobBroker> {
        self.broker.clone()
    }

    /// Worker-side handle to the embedded broker
    pub fn worker_handle(&self) -> Arc<MemoryBroker> {
        self.broker.clone()
    }

    /// Tear down the connection, failing any pending waits
    pub fn shutdown(&self) {
        self.broker.drain();
        info!("broker pool shut down");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BrokerConfig;

    fn config(driver: &str) -> BrokerConfig {
        BrokerConfig {
            driver: driver.to_string(),
            host: "127.0.0.1".to_string(),
            port: 6379,
            password: None,
        }
    }

    #[test]
    fn test_init_memory_driver() {
        assert!(BrokerPool::init(&config("memory")).is_ok());
    }

    #[test]
    fn test_init_rejects_unknown_driver() {
        assert!(BrokerPool::init(&config("redis")).is_err());
    }
}
