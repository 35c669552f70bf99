//! Subscriber
//!
//! A `Subscriber` is the handle calling code uses to take part in the bus.
//! Each subscriber owns an unbounded inbound queue and one worker thread that
//! drains it, so publishers never wait on message handling and a slow handler
//! never occupies an async runtime thread.
//!
//! Lifecycle:
//! - created through `Broker::subscriber`, which starts the worker once the
//!   subscriber is fully built
//! - subscribe / unsubscribe / publish at any time, handler set at most once
//! - dropping unregisters from every topic, closes the queue and joins the
//!   worker once it has handled everything already queued; `shutdown().await`
//!   does the same without blocking the calling task

use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, OnceLock};
use std::thread::{self, JoinHandle};

use parking_lot::Mutex;
use tokio::sync::mpsc;
use tracing::{debug, trace, warn};

use crate::broker::message::Message;
use crate::broker::registry::TopicRegistry;
use crate::broker::sink::{MessageSink, SubscriberId};
use crate::client::handler::MessageHandler;
use crate::utils::error::{BusError, Result};

type HandlerSlot = Arc<OnceLock<Arc<dyn MessageHandler>>>;

/// Inbound side of a subscriber, the part topics hold a weak handle to.
struct Inbox {
    id: SubscriberId,
    sender: Mutex<Option<mpsc::UnboundedSender<Arc<Message>>>>,
    pending: Arc<AtomicUsize>,
}

impl Inbox {
    fn close(&self) -> bool {
        self.sender.lock().take().is_some()
    }
}

impl MessageSink for Inbox {
    fn id(&self) -> SubscriberId {
        self.id
    }

    fn enqueue(&self, msg: Arc<Message>) -> bool {
        let sender = self.sender.lock();
        let Some(tx) = sender.as_ref() else {
            return false;
        };
        self.pending.fetch_add(1, Ordering::AcqRel);
        if tx.send(msg).is_err() {
            self.pending.fetch_sub(1, Ordering::AcqRel);
            return false;
        }
        true
    }
}

pub struct Subscriber {
    inbox: Arc<Inbox>,
    handler: HandlerSlot,
    registry: Arc<TopicRegistry>,
    worker: Option<JoinHandle<()>>,
}

impl Subscriber {
    /// Builds a subscriber wired to `registry` and starts its worker thread.
    pub(crate) fn new(registry: Arc<TopicRegistry>) -> Result<Self> {
        let (tx, rx) = mpsc::unbounded_channel();
        let pending = Arc::new(AtomicUsize::new(0));
        let mut subscriber = Self {
            inbox: Arc::new(Inbox {
                id: SubscriberId::new(),
                sender: Mutex::new(Some(tx)),
                pending: Arc::clone(&pending),
            }),
            handler: Arc::new(OnceLock::new()),
            registry,
            worker: None,
        };

        let id = subscriber.id();
        let handler = Arc::clone(&subscriber.handler);
        let worker = thread::Builder::new()
            .name(format!("popbus-{id}"))
            .spawn(move || run_worker(id, rx, handler, pending))
            .map_err(|e| BusError::WorkerSpawn(e.to_string()))?;
        subscriber.worker = Some(worker);
        debug!(subscriber = %subscriber.id(), "subscriber started");
        Ok(subscriber)
    }

    pub fn id(&self) -> SubscriberId {
        self.inbox.id
    }

    /// Subscribes to `topic_name`, creating the topic if needed.
    ///
    /// Returns `Ok(false)` if this subscriber was already subscribed; it still
    /// receives each message on that topic exactly once.
    pub fn subscribe(&self, topic_name: &str) -> Result<bool> {
        if topic_name.is_empty() {
            return Err(BusError::InvalidArgument("topic name must not be empty"));
        }
        let sink: Arc<dyn MessageSink> = self.inbox.clone();
        let added = self.registry.add_topic(topic_name, &sink);
        debug!(subscriber = %self.id(), topic = topic_name, added, "subscribe");
        Ok(added)
    }

    /// Registers the handler invoked for every dequeued message.
    ///
    /// The handler can be set once. Messages dequeued before it is set are
    /// discarded.
    pub fn set_handler<H: MessageHandler>(&self, handler: H) -> Result<()> {
        let handler: Arc<dyn MessageHandler> = Arc::new(handler);
        self.handler
            .set(handler)
            .map_err(|_| BusError::InvalidArgument("message handler can only be set once"))
    }

    pub fn has_handler(&self) -> bool {
        self.handler.get().is_some()
    }

    /// Unsubscribes from `topic_name`. Returns `Ok(false)` if the topic does not exist.
    pub fn unsubscribe(&self, topic_name: &str) -> Result<bool> {
        if topic_name.is_empty() {
            return Err(BusError::InvalidArgument("topic name must not be empty"));
        }
        let found = self.registry.remove_topic(topic_name, &self.id());
        debug!(subscriber = %self.id(), topic = topic_name, found, "unsubscribe");
        Ok(found)
    }

    pub fn unsubscribe_all(&self) {
        self.registry.remove_subscriber_everywhere(&self.id());
    }

    /// Publishes `msg` to its topic.
    ///
    /// Returns `Ok(false)` when nobody ever subscribed to the topic.
    pub fn publish(&self, msg: Message) -> Result<bool> {
        if !msg.is_publishable() {
            return Err(BusError::InvalidArgument(
                "message topic and content must not be empty",
            ));
        }
        Ok(self.registry.publish_msg(msg))
    }

    pub fn is_subscribed(&self, topic_name: &str) -> bool {
        self.registry.is_subscribed(topic_name, &self.id())
    }

    /// Messages enqueued but not yet handled.
    pub fn pending(&self) -> usize {
        self.inbox.pending.load(Ordering::Acquire)
    }

    /// Leaves every topic, closes the queue and waits for the worker to
    /// handle what is left in it, without blocking the calling task.
    pub async fn shutdown(mut self) {
        self.close();
        if let Some(worker) = self.worker.take() {
            match tokio::task::spawn_blocking(move || worker.join()).await {
                Ok(Ok(())) => {}
                Ok(Err(_)) => warn!(subscriber = %self.id(), "worker thread panicked"),
                Err(e) => warn!(subscriber = %self.id(), "failed to join worker: {e}"),
            }
        }
    }

    /// Blocks until the worker has drained the queue and exited.
    fn join_worker(&mut self) {
        let Some(worker) = self.worker.take() else {
            return;
        };
        // dropped from inside its own handler: the worker exits on its own
        if worker.thread().id() == thread::current().id() {
            return;
        }
        if worker.join().is_err() {
            warn!(subscriber = %self.id(), "worker thread panicked");
        }
    }

    fn close(&self) {
        self.unsubscribe_all();
        if self.inbox.close() {
            debug!(subscriber = %self.id(), "inbound queue closed");
        }
    }
}

impl Drop for Subscriber {
    fn drop(&mut self) {
        self.close();
        self.join_worker();
    }
}

impl std::fmt::Debug for Subscriber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscriber")
            .field("id", &self.id())
            .field("has_handler", &self.has_handler())
            .field("pending", &self.pending())
            .finish()
    }
}

fn run_worker(
    id: SubscriberId,
    mut rx: mpsc::UnboundedReceiver<Arc<Message>>,
    handler: HandlerSlot,
    pending: Arc<AtomicUsize>,
) {
    while let Some(msg) = rx.blocking_recv() {
        match handler.get() {
            Some(handler) => dispatch(id, handler.as_ref(), &msg),
            None => trace!(subscriber = %id, topic = %msg.topic_name, "no handler set, message discarded"),
        }
        pending.fetch_sub(1, Ordering::AcqRel);
    }
    debug!(subscriber = %id, "worker stopped");
}

fn dispatch(id: SubscriberId, handler: &dyn MessageHandler, msg: &Message) {
    match panic::catch_unwind(AssertUnwindSafe(|| handler.handle(msg))) {
        Ok(Ok(())) => {}
        Ok(Err(e)) => {
            debug!(subscriber = %id, topic = %msg.topic_name, "handler failed: {e}");
        }
        Err(_) => {
            warn!(subscriber = %id, topic = %msg.topic_name, "handler panicked, message discarded");
        }
    }
}
