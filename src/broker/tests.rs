use std::sync::Arc;
use std::thread;

use parking_lot::Mutex;

use super::message::Message;
use super::registry::TopicRegistry;
use super::sink::{MessageSink, SubscriberId};
use super::topic::Topic;
use super::Broker;

/// Sink that records everything it is handed, synchronously.
struct RecordingSink {
    id: SubscriberId,
    received: Mutex<Vec<Arc<Message>>>,
    open: Mutex<bool>,
}

impl RecordingSink {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            id: SubscriberId::new(),
            received: Mutex::new(Vec::new()),
            open: Mutex::new(true),
        })
    }

    fn contents(&self) -> Vec<String> {
        self.received
            .lock()
            .iter()
            .map(|m| m.content.clone())
            .collect()
    }
}

impl MessageSink for RecordingSink {
    fn id(&self) -> SubscriberId {
        self.id
    }

    fn enqueue(&self, msg: Arc<Message>) -> bool {
        if !*self.open.lock() {
            return false;
        }
        self.received.lock().push(msg);
        true
    }
}

fn as_sink(sink: &Arc<RecordingSink>) -> Arc<dyn MessageSink> {
    sink.clone()
}

#[test]
fn test_message_is_publishable() {
    assert!(Message::new("x", "orders").is_publishable());
    assert!(!Message::new("", "orders").is_publishable());
    assert!(!Message::new("x", "").is_publishable());
    assert!(!Message::default().is_publishable());
}

#[test]
fn test_topic_new() {
    let topic = Topic::new("test_topic");
    assert_eq!(topic.name(), "test_topic");
    assert!(topic.is_empty());
}

#[test]
fn test_topic_add_subscriber_is_idempotent() {
    let topic = Topic::new("test_topic");
    let sink = RecordingSink::new();
    assert!(topic.add_subscriber(&as_sink(&sink)));
    assert!(!topic.add_subscriber(&as_sink(&sink)));
    assert_eq!(topic.len(), 1);
    assert!(topic.has_subscriber(&sink.id));
}

#[test]
fn test_topic_remove_subscriber() {
    let topic = Topic::new("test_topic");
    let sink = RecordingSink::new();
    topic.add_subscriber(&as_sink(&sink));
    assert!(topic.remove_subscriber(&sink.id));
    assert!(!topic.has_subscriber(&sink.id));
    assert!(!topic.remove_subscriber(&sink.id));
}

#[test]
fn test_topic_publish_fans_out() {
    let topic = Topic::new("orders");
    let a = RecordingSink::new();
    let b = RecordingSink::new();
    topic.add_subscriber(&as_sink(&a));
    topic.add_subscriber(&as_sink(&b));

    let delivered = topic.publish(Arc::new(Message::new("x", "orders")));
    assert_eq!(delivered, 2);
    assert_eq!(a.contents(), vec!["x"]);
    assert_eq!(b.contents(), vec!["x"]);
}

#[test]
fn test_topic_does_not_keep_subscribers_alive() {
    let topic = Topic::new("orders");
    let sink = RecordingSink::new();
    let id = sink.id;
    topic.add_subscriber(&as_sink(&sink));
    drop(sink);

    assert!(!topic.has_subscriber(&id));
    assert_eq!(topic.len(), 0);
    assert!(topic.is_empty());
    assert_eq!(topic.publish(Arc::new(Message::new("x", "orders"))), 0);
    assert!(topic.is_empty());
}

#[test]
fn test_topic_publish_skips_closed_sink() {
    let topic = Topic::new("orders");
    let open = RecordingSink::new();
    let closed = RecordingSink::new();
    *closed.open.lock() = false;
    topic.add_subscriber(&as_sink(&open));
    topic.add_subscriber(&as_sink(&closed));

    assert_eq!(topic.publish(Arc::new(Message::new("x", "orders"))), 1);
    assert!(closed.contents().is_empty());
}

#[test]
fn test_registry_add_topic_creates_topic() {
    let registry = TopicRegistry::new();
    let sink = RecordingSink::new();
    assert!(!registry.has_topic("orders"));
    assert!(registry.add_topic("orders", &as_sink(&sink)));
    assert!(registry.has_topic("orders"));
    assert_eq!(registry.subscriber_count("orders"), Some(1));
    assert!(registry.is_subscribed("orders", &sink.id));
}

#[test]
fn test_registry_add_topic_twice_returns_false() {
    let registry = TopicRegistry::new();
    let sink = RecordingSink::new();
    assert!(registry.add_topic("orders", &as_sink(&sink)));
    assert!(!registry.add_topic("orders", &as_sink(&sink)));
    assert_eq!(registry.topic_count(), 1);

    registry.publish_msg(Message::new("once", "orders"));
    assert_eq!(sink.contents(), vec!["once"]);
}

#[test]
fn test_registry_remove_topic() {
    let registry = TopicRegistry::new();
    let sink = RecordingSink::new();
    let other = RecordingSink::new();
    registry.add_topic("orders", &as_sink(&sink));

    assert!(!registry.remove_topic("missing", &sink.id));
    // known topic, subscriber never joined: still true
    assert!(registry.remove_topic("orders", &other.id));
    assert!(registry.remove_topic("orders", &sink.id));
    assert!(!registry.is_subscribed("orders", &sink.id));

    // the topic outlives its last subscriber
    assert!(registry.has_topic("orders"));
    assert_eq!(registry.subscriber_count("orders"), Some(0));
}

#[test]
fn test_registry_publish_to_unknown_topic() {
    let registry = TopicRegistry::new();
    let sink = RecordingSink::new();
    registry.add_topic("orders", &as_sink(&sink));

    assert!(!registry.publish_msg(Message::new("z", "missing")));
    assert!(sink.contents().is_empty());
    assert!(!registry.has_topic("missing"));
}

#[test]
fn test_registry_publish_to_empty_topic() {
    let registry = TopicRegistry::new();
    let sink = RecordingSink::new();
    registry.add_topic("orders", &as_sink(&sink));
    registry.remove_topic("orders", &sink.id);

    // the topic exists, it just has nobody to deliver to
    assert!(registry.publish_msg(Message::new("z", "orders")));
    assert!(sink.contents().is_empty());
}

#[test]
fn test_registry_publish_routes_by_topic() {
    let registry = TopicRegistry::new();
    let orders = RecordingSink::new();
    let audit = RecordingSink::new();
    registry.add_topic("orders", &as_sink(&orders));
    registry.add_topic("audit", &as_sink(&audit));

    registry.publish_msg(Message::new("o1", "orders"));
    registry.publish_msg(Message::new("a1", "audit"));
    registry.publish_msg(Message::new("o2", "orders"));

    assert_eq!(orders.contents(), vec!["o1", "o2"]);
    assert_eq!(audit.contents(), vec!["a1"]);
}

#[test]
fn test_registry_subscriber_count_ignores_dropped_sinks() {
    let registry = TopicRegistry::new();
    let kept = RecordingSink::new();
    let gone = RecordingSink::new();
    registry.add_topic("orders", &as_sink(&kept));
    registry.add_topic("orders", &as_sink(&gone));
    drop(gone);

    // no publish has pruned the dead entry yet
    assert_eq!(registry.subscriber_count("orders"), Some(1));
}

#[test]
fn test_registry_remove_subscriber_everywhere() {
    let registry = TopicRegistry::new();
    let sink = RecordingSink::new();
    let other = RecordingSink::new();
    for name in ["a", "b", "c"] {
        registry.add_topic(name, &as_sink(&sink));
    }
    registry.add_topic("b", &as_sink(&other));

    registry.remove_subscriber_everywhere(&sink.id);
    for name in ["a", "b", "c"] {
        assert!(!registry.is_subscribed(name, &sink.id));
    }
    assert!(registry.is_subscribed("b", &other.id));
}

#[test]
fn test_registry_concurrent_first_subscribe_creates_one_topic() {
    let registry = Arc::new(TopicRegistry::new());
    let sinks: Vec<_> = (0..16).map(|_| RecordingSink::new()).collect();

    let handles: Vec<_> = sinks
        .iter()
        .map(|sink| {
            let registry = Arc::clone(&registry);
            let sink = as_sink(sink);
            thread::spawn(move || registry.add_topic("race", &sink))
        })
        .collect();
    for handle in handles {
        assert!(handle.join().unwrap());
    }

    assert_eq!(registry.topic_count(), 1);
    assert_eq!(registry.subscriber_count("race"), Some(16));

    registry.publish_msg(Message::new("go", "race"));
    for sink in &sinks {
        assert_eq!(sink.contents(), vec!["go"]);
    }
}

#[test]
fn test_broker_new() {
    let broker = Broker::default();
    assert_eq!(broker.registry().topic_count(), 0);
    assert_eq!(broker.pool().max_size(), crate::pool::DEFAULT_MAX_SIZE);
}

#[test]
fn test_broker_from_settings() {
    let mut settings = crate::config::Settings::default();
    settings.pool.max_size = 7;
    let broker = Broker::from_settings(&settings);
    assert_eq!(broker.pool().max_size(), 7);
}

#[test]
fn test_broker_clones_share_registry() {
    let broker = Broker::default();
    let clone = broker.clone();
    let sink = RecordingSink::new();
    clone.registry().add_topic("shared", &as_sink(&sink));
    assert!(broker.registry().has_topic("shared"));
    assert!(Arc::ptr_eq(broker.pool(), clone.pool()));
}

#[test]
fn test_broker_subscriber_outside_runtime() {
    let broker = Broker::default();
    let handled = Arc::new(Mutex::new(Vec::new()));
    let log = Arc::clone(&handled);

    let sub = broker.subscriber().unwrap();
    sub.set_handler(move |msg: &Message| log.lock().push(msg.content.clone()))
        .unwrap();
    sub.subscribe("plain").unwrap();
    sub.publish(Message::new("no runtime", "plain")).unwrap();
    drop(sub);

    assert_eq!(*handled.lock(), vec!["no runtime"]);
}
