//! Bounded conversation history owned by the boundary layer.
//!
//! The pipeline never touches these buffers directly: the boundary takes a
//! [`HistoryBuffer::snapshot`] before each run and passes it in as
//! `previous_messages`.

use std::collections::{HashMap, VecDeque};
use std::sync::{PoisonError, RwLock};

use tracing::debug;

use crate::state::Message;

/// Default number of messages remembered per channel.
pub const DEFAULT_HISTORY_CAPACITY: usize = 20;

// ─────────────────────────────────────────────
// HistoryBuffer
// ─────────────────────────────────────────────

/// Fixed-capacity message buffer; the oldest message is evicted first.
#[derive(Clone, Debug)]
pub struct HistoryBuffer {
    capacity: usize,
    messages: VecDeque<Message>,
}

impl HistoryBuffer {
    /// Create an empty buffer. A zero capacity is bumped to 1.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            messages: VecDeque::with_capacity(capacity),
        }
    }

    /// Append a message, evicting the oldest one when full.
    pub fn push(&mut self, message: Message) {
        if self.messages.len() == self.capacity {
            self.messages.pop_front();
        }
        self.messages.push_back(message);
    }

    /// Copy of the buffered messages, oldest → newest.
    pub fn snapshot(&self) -> Vec<Message> {
        self.messages.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for HistoryBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY)
    }
}

// ─────────────────────────────────────────────
// ChannelHistories
// ─────────────────────────────────────────────

/// One [`HistoryBuffer`] per channel, safe to share between request tasks.
pub struct ChannelHistories {
    capacity: usize,
    channels: RwLock<HashMap<String, HistoryBuffer>>,
}

impl ChannelHistories {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            channels: RwLock::new(HashMap::new()),
        }
    }

    /// Record an incoming message and return the history that preceded it.
    ///
    /// The returned snapshot excludes `message` itself.
    pub fn record(&self, channel: &str, message: Message) -> Vec<Message> {
        let mut channels = self.channels.write().unwrap_or_else(PoisonError::into_inner);
        let buffer = channels
            .entry(channel.to_string())
            .or_insert_with(|| HistoryBuffer::new(self.capacity));
        let snapshot = buffer.snapshot();
        buffer.push(message);
        debug!(channel, buffered = buffer.len(), "recorded message in history");
        snapshot
    }

    /// Current history of a channel, oldest → newest.
    pub fn snapshot(&self, channel: &str) -> Vec<Message> {
        let channels = self.channels.read().unwrap_or_else(PoisonError::into_inner);
        channels
            .get(channel)
            .map(HistoryBuffer::snapshot)
            .unwrap_or_default()
    }
}

impl Default for ChannelHistories {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn msg(i: usize) -> Message {
        Message::new("user", format!("message {i}"))
    }

    #[test]
    fn test_buffer_evicts_oldest() {
        let mut buffer = HistoryBuffer::new(3);
        for i in 0..5 {
            buffer.push(msg(i));
        }
        let snapshot = buffer.snapshot();
        assert_eq!(snapshot.len(), 3);
        assert_eq!(snapshot[0].content, "message 2");
        assert_eq!(snapshot[2].content, "message 4");
    }

    #[test]
    fn test_zero_capacity_is_bumped() {
        let mut buffer = HistoryBuffer::new(0);
        buffer.push(msg(0));
        buffer.push(msg(1));
        assert_eq!(buffer.capacity(), 1);
        assert_eq!(buffer.snapshot(), vec![msg(1)]);
    }

    #[test]
    fn test_record_returns_prior_history() {
        let histories = ChannelHistories::new(20);
        assert!(histories.record("general", msg(0)).is_empty());
        let prior = histories.record("general", msg(1));
        assert_eq!(prior, vec![msg(0)]);
        assert_eq!(histories.snapshot("general").len(), 2);
    }

    #[test]
    fn test_channels_are_isolated() {
        let histories = ChannelHistories::default();
        histories.record("a", msg(0));
        assert!(histories.snapshot("b").is_empty());
        assert!(histories.record("b", msg(1)).is_empty());
    }
}
