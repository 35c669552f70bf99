use crate::broker::message::Message;

pub type HandlerError = Box<dyn std::error::Error + Send + Sync>;

pub type HandlerResult = Result<(), HandlerError>;

/// Processes messages dequeued by a subscriber's worker.
///
/// Handlers run on the worker thread, one message at a time, in the order the
/// messages were enqueued. An `Err` result or a panic is caught by the worker
/// and the message is discarded; neither stops the worker nor reaches the
/// publisher.
///
/// Any `Fn(&Message)` closure is a handler:
///
/// ```rust
/// use popbus::broker::message::Message;
/// use popbus::client::MessageHandler;
///
/// fn assert_handler<H: MessageHandler>(_: H) {}
/// assert_handler(|msg: &Message| println!("{}", msg.content));
/// ```
pub trait MessageHandler: Send + Sync + 'static {
    fn handle(&self, msg: &Message) -> HandlerResult;
}

impl<F> MessageHandler for F
where
    F: Fn(&Message) + Send + Sync + 'static,
{
    fn handle(&self, msg: &Message) -> HandlerResult {
        self(msg);
        Ok(())
    }
}
