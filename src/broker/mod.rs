pub mod engine;
pub mod message;
pub mod registry;
pub mod sink;
pub mod topic;

pub use engine::Broker;
pub use message::Message;
pub use registry::TopicRegistry;
pub use sink::{MessageSink, SubscriberId};

#[cfg(test)]
mod tests;
