//! Topic registry
//!
//! The registry maps topic names to `Topic`s and routes subscribe,
//! unsubscribe and publish calls to the right one.
//!
//! Concurrency notes:
//! - The name map sits behind a single `RwLock`. Creating a topic happens
//!   under the write lock, so two first subscribers racing on the same name
//!   always end up in the same `Topic`.
//! - The map lock is only held long enough to find (or create) a topic.
//!   Membership changes use the topic's own lock and fan-out runs with no
//!   registry lock held.
//! - Topics are never removed, even once empty. Registry memory is bounded by
//!   the number of distinct topic names ever used.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::debug;

use crate::broker::message::Message;
use crate::broker::sink::{MessageSink, SubscriberId};
use crate::broker::topic::Topic;

#[derive(Debug, Default)]
pub struct TopicRegistry {
    topics: RwLock<HashMap<String, Arc<Topic>>>,
}

impl TopicRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `sink` under `name`, creating the topic on first use.
    ///
    /// Returns `false` only when the sink was already registered there, so a
    /// repeated subscribe never leads to duplicate delivery.
    pub fn add_topic(&self, name: &str, sink: &Arc<dyn MessageSink>) -> bool {
        if let Some(topic) = self.get(name) {
            return topic.add_subscriber(sink);
        }

        let topic = {
            let mut topics = self.topics.write();
            Arc::clone(topics.entry(name.to_string()).or_insert_with(|| {
                debug!(topic = name, "created topic");
                Arc::new(Topic::new(name))
            }))
        };
        topic.add_subscriber(sink)
    }

    /// Removes `id` from the topic `name`.
    ///
    /// Returns `false` if no such topic exists. A subscriber that was never
    /// registered there is not an error.
    pub fn remove_topic(&self, name: &str, id: &SubscriberId) -> bool {
        match self.get(name) {
            Some(topic) => {
                topic.remove_subscriber(id);
                true
            }
            None => false,
        }
    }

    /// Fans `msg` out to its topic. Returns `false` if the topic is unknown.
    pub fn publish_msg(&self, msg: Message) -> bool {
        let Some(topic) = self.get(&msg.topic_name) else {
            debug!(topic = %msg.topic_name, "publish to unknown topic");
            return false;
        };
        let delivered = topic.publish(Arc::new(msg));
        debug!(topic = topic.name(), delivered, "published message");
        true
    }

    /// Removes `id` from every topic.
    pub fn remove_subscriber_everywhere(&self, id: &SubscriberId) {
        let topics: Vec<Arc<Topic>> = self.topics.read().values().cloned().collect();
        for topic in topics {
            if topic.remove_subscriber(id) {
                debug!(subscriber = %id, topic = topic.name(), "unsubscribed");
            }
        }
    }

    pub fn has_topic(&self, name: &str) -> bool {
        self.topics.read().contains_key(name)
    }

    pub fn is_subscribed(&self, name: &str, id: &SubscriberId) -> bool {
        self.get(name).is_some_and(|topic| topic.has_subscriber(id))
    }

    pub fn topic_count(&self) -> usize {
        self.topics.read().len()
    }

    /// Number of subscribers of `name`, or `None` if the topic does not exist.
    pub fn subscriber_count(&self, name: &str) -> Option<usize> {
        self.get(name).map(|topic| topic.len())
    }

    fn get(&self, name: &str) -> Option<Arc<Topic>> {
        self.topics.read().get(name).cloned()
    }
}
