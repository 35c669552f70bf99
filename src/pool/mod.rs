//! The `pool` module provides a bounded pool of reusable `Message` objects.
//!
//! Producers publishing at high rates can acquire messages from the pool and
//! release them after use, keeping allocation churn down.

pub mod message_pool;

pub use message_pool::{DEFAULT_MAX_SIZE, MessagePool, PooledMessage};
