//! Broker wiring
//!
//! `Broker` is the explicitly constructed context every part of the bus
//! hangs off: one `TopicRegistry` and one `MessagePool`, shared by `Arc`.
//! It is also the only way to create a `Subscriber`, so every subscriber is
//! wired to the same registry and has its worker running.
//!
//! Usage notes:
//! - Create one `Broker` at startup and clone it (cheap) wherever producers
//!   or consumers need it. There is no global instance.
//! - `subscriber()` starts one OS thread per subscriber; it works with or
//!   without a tokio runtime.

use std::sync::Arc;

use tracing::debug;

use crate::broker::registry::TopicRegistry;
use crate::client::Subscriber;
use crate::config::{PoolSettings, Settings};
use crate::pool::MessagePool;
use crate::utils::error::Result;

#[derive(Debug, Clone)]
pub struct Broker {
    registry: Arc<TopicRegistry>,
    pool: Arc<MessagePool>,
}

impl Default for Broker {
    fn default() -> Self {
        Self::new(&PoolSettings {
            max_size: crate::pool::DEFAULT_MAX_SIZE,
        })
    }
}

impl Broker {
    pub fn new(pool: &PoolSettings) -> Self {
        debug!(pool_max_size = pool.max_size, "broker created");
        Self {
            registry: Arc::new(TopicRegistry::new()),
            pool: Arc::new(MessagePool::new(pool.max_size)),
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(&settings.pool)
    }

    /// Creates a subscriber bound to this broker and starts its worker.
    pub fn subscriber(&self) -> Result<Subscriber> {
        Subscriber::new(Arc::clone(&self.registry))
    }

    pub fn registry(&self) -> &Arc<TopicRegistry> {
        &self.registry
    }

    pub fn pool(&self) -> &Arc<MessagePool> {
        &self.pool
    }
}
