//! Topic management
//!
//! A `Topic` holds the set of subscribers registered under one topic name.
//! Subscriptions are stored as a map from `SubscriberId` to a weak sink
//! handle, so duplicate subscriptions are a no-op and a topic never owns a
//! subscriber.
//!
//! Each topic carries its own lock. Publishing on one topic never contends
//! with subscription changes on another.

use std::collections::HashMap;
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use tracing::trace;

use crate::broker::message::Message;
use crate::broker::sink::{MessageSink, SubscriberId};

pub struct Topic {
    name: String,
    subscribers: Mutex<HashMap<SubscriberId, Weak<dyn MessageSink>>>,
}

impl Topic {
    /// Create a new topic with the given name.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            subscribers: Mutex::new(HashMap::new()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Add a subscriber to the topic. Returns `false` if it was already present.
    pub fn add_subscriber(&self, sink: &Arc<dyn MessageSink>) -> bool {
        let mut subscribers = self.subscribers.lock();
        let id = sink.id();
        if subscribers
            .get(&id)
            .is_some_and(|existing| existing.strong_count() > 0)
        {
            return false;
        }
        subscribers.insert(id, Arc::downgrade(sink));
        true
    }

    /// Remove a subscriber from the topic. Returns `false` if it was not present.
    pub fn remove_subscriber(&self, id: &SubscriberId) -> bool {
        self.subscribers.lock().remove(id).is_some()
    }

    pub fn has_subscriber(&self, id: &SubscriberId) -> bool {
        self.subscribers
            .lock()
            .get(id)
            .is_some_and(|sink| sink.strong_count() > 0)
    }

    /// Number of live subscribers.
    pub fn len(&self) -> usize {
        self.subscribers
            .lock()
            .values()
            .filter(|sink| sink.strong_count() > 0)
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Fan `msg` out to every subscriber registered at the time of the call.
    ///
    /// The subscriber set is copied under the lock and delivery happens after
    /// the lock is released. A subscriber leaving concurrently may still get
    /// this one message. Returns the number of sinks that accepted it.
    pub fn publish(&self, msg: Arc<Message>) -> usize {
        let snapshot = self.snapshot();

        let mut delivered = 0;
        for sink in &snapshot {
            if sink.enqueue(Arc::clone(&msg)) {
                delivered += 1;
            } else {
                trace!(topic = %self.name, subscriber = %sink.id(), "sink closed, message dropped");
            }
        }
        delivered
    }

    fn snapshot(&self) -> Vec<Arc<dyn MessageSink>> {
        let mut subscribers = self.subscribers.lock();
        subscribers.retain(|_, sink| sink.strong_count() > 0);
        subscribers.values().filter_map(Weak::upgrade).collect()
    }
}

impl std::fmt::Debug for Topic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Topic")
            .field("name", &self.name)
            .field("subscribers", &self.len())
            .finish()
    }
}
