//! # PopBus
//!
//! `popbus` is an in-process publish/subscribe message bus. Producers publish
//! messages on named topics; subscribers register interest in topics and get
//! each message delivered asynchronously to a handler running on their own
//! worker thread.
//!
//! ## Core Modules
//!
//! - `broker`: The topic registry, topics and fan-out, plus the `Broker` context that wires them together.
//! - `client`: The `Subscriber` with its inbound queue, worker and handler.
//! - `pool`: A bounded pool of reusable messages for high publish rates.
//! - `config`: Handles loading and managing configuration.
//! - `utils`: Shared error type and logging setup.
//!
//! ## Example
//!
//! ```rust
//! use popbus::{Broker, Message};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), popbus::BusError> {
//! let broker = Broker::default();
//! let consumer = broker.subscriber()?;
//! consumer.set_handler(|msg: &Message| println!("{}: {}", msg.topic_name, msg.content))?;
//! consumer.subscribe("orders")?;
//!
//! let producer = broker.subscriber()?;
//! assert!(producer.publish(Message::new("o1", "orders"))?);
//!
//! consumer.shutdown().await;
//! # Ok(())
//! # }
//! ```

pub mod broker;
pub mod client;
pub mod config;
pub mod pool;
pub mod utils;

pub use broker::{Broker, Message};
pub use client::{MessageHandler, Subscriber};
pub use utils::error::BusError;
