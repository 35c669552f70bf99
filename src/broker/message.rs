use serde::{Deserialize, Serialize};

/// A message published on the bus.
///
/// A message consists of a topic name used for routing and the text
/// content handed to every subscriber of that topic. Messages carry no
/// identity: two messages with the same fields are the same message.
///
/// # Fields
///
/// - `content` - The payload delivered to subscribers.
/// - `topic_name` - The name of the topic this message is routed to.
///
/// # Example
///
/// ```rust
/// use popbus::broker::message::Message;
///
/// let msg = Message::new("o1", "orders");
/// assert_eq!(msg.topic_name, "orders");
/// assert!(msg.is_publishable());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Message {
    pub content: String,
    pub topic_name: String,
}

impl Message {
    pub fn new(content: impl Into<String>, topic_name: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            topic_name: topic_name.into(),
        }
    }

    /// True when both fields are non-empty.
    pub fn is_publishable(&self) -> bool {
        !self.content.is_empty() && !self.topic_name.is_empty()
    }

    /// Empties both fields while keeping their allocations.
    pub fn clear(&mut self) {
        self.content.clear();
        self.topic_name.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty() && self.topic_name.is_empty()
    }
}
