//! Message sink capability
//!
//! A `MessageSink` is anything a topic can fan a message out to. The broker
//! only ever holds sinks through `Weak` handles, so registering with a topic
//! never keeps a subscriber alive on its own.

use std::fmt;
use std::sync::Arc;

use uuid::Uuid;

use crate::broker::message::Message;

/// Identity of a subscriber.
///
/// Topic membership is keyed by this id, so two subscribers are distinct
/// even when everything else about them is equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriberId(Uuid);

impl SubscriberId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SubscriberId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SubscriberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "subscriber-{}", self.0)
    }
}

pub trait MessageSink: Send + Sync {
    fn id(&self) -> SubscriberId;

    /// Queues `msg` for asynchronous handling.
    ///
    /// Must not block beyond a short critical section. Returns `false` when
    /// the sink no longer accepts messages (it is shutting down).
    fn enqueue(&self, msg: Arc<Message>) -> bool;
}
