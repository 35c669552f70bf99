//! The `client` module defines the subscriber side of the bus.
//!
//! It provides the `Subscriber` struct, which owns an inbound queue and the
//! worker thread draining it, and the `MessageHandler` trait the worker hands
//! each message to.

pub mod handler;
pub mod pubsub_client;

pub use handler::{HandlerError, HandlerResult, MessageHandler};
pub use pubsub_client::Subscriber;
