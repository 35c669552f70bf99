//! Message pool
//!
//! `MessagePool` keeps released `Message`s around so high-rate producers can
//! reuse their string allocations instead of allocating per message.
//!
//! The pool is bounded by `max_size`. Releasing into a full pool simply drops
//! the message; that is not an error.

use std::collections::VecDeque;
use std::ops::{Deref, DerefMut};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::broker::message::Message;

/// Default bound on the number of pooled messages.
pub const DEFAULT_MAX_SIZE: usize = 1000;

#[derive(Debug)]
struct PoolState {
    free: VecDeque<Message>,
    max_size: usize,
}

#[derive(Debug)]
pub struct MessagePool {
    state: Mutex<PoolState>,
}

impl Default for MessagePool {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_SIZE)
    }
}

impl MessagePool {
    pub fn new(max_size: usize) -> Self {
        Self {
            state: Mutex::new(PoolState {
                free: VecDeque::new(),
                max_size,
            }),
        }
    }

    /// Takes a cleared message from the pool, or allocates a fresh one.
    pub fn acquire(&self) -> Message {
        self.state.lock().free.pop_front().unwrap_or_default()
    }

    /// `acquire` followed by filling in both fields.
    pub fn acquire_with(&self, content: &str, topic_name: &str) -> Message {
        let mut msg = self.acquire();
        msg.content.push_str(content);
        msg.topic_name.push_str(topic_name);
        msg
    }

    /// Like `acquire`, but the message goes back to the pool when the guard drops.
    pub fn acquire_guard(self: &Arc<Self>) -> PooledMessage {
        PooledMessage {
            msg: self.acquire(),
            pool: Arc::clone(self),
            detached: false,
        }
    }

    /// Clears `msg` and keeps it for reuse if the pool has room.
    pub fn release(&self, mut msg: Message) {
        msg.clear();
        let mut state = self.state.lock();
        if state.free.len() < state.max_size {
            state.free.push_back(msg);
        }
    }

    /// Changes the bound, dropping pooled messages above it right away.
    pub fn set_max_size(&self, max_size: usize) {
        let mut state = self.state.lock();
        state.max_size = max_size;
        state.free.truncate(max_size);
    }

    pub fn max_size(&self) -> usize {
        self.state.lock().max_size
    }

    /// Number of messages currently waiting in the pool.
    pub fn size(&self) -> usize {
        self.state.lock().free.len()
    }
}

/// A pooled `Message` that returns itself to its pool on drop.
#[derive(Debug)]
pub struct PooledMessage {
    msg: Message,
    pool: Arc<MessagePool>,
    detached: bool,
}

impl PooledMessage {
    /// Detaches the message from the pool.
    pub fn into_inner(mut self) -> Message {
        self.detached = true;
        std::mem::take(&mut self.msg)
    }
}

impl Deref for PooledMessage {
    type Target = Message;

    fn deref(&self) -> &Message {
        &self.msg
    }
}

impl DerefMut for PooledMessage {
    fn deref_mut(&mut self) -> &mut Message {
        &mut self.msg
    }
}

impl Drop for PooledMessage {
    fn drop(&mut self) {
        if !self.detached {
            self.pool.release(std::mem::take(&mut self.msg));
        }
    }
}
