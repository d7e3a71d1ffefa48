use std::collections::HashMap;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};

/// Very small topic based event bus. Subscribers whose receiver has been
/// dropped are pruned on the next publish to their topic.
pub struct EventBus<T> {
    subscribers: HashMap<String, Vec<UnboundedSender<T>>>,
}

impl<T: Clone> EventBus<T> {
    pub fn new() -> Self {
        Self {
            subscribers: HashMap::new(),
        }
    }

    /// Subscribe to a topic, returning a receiver for events.
    pub fn subscribe(&mut self, topic: &str) -> UnboundedReceiver<T> {
        let (tx, rx) = unbounded_channel();
        self.subscribers
            .entry(topic.to_string())
            .or_default()
            .push(tx);
        rx
    }

    /// Publish an event on a topic.
    pub fn publish(&mut self, topic: &str, payload: T) {
        if let Some(list) = self.subscribers.get_mut(topic) {
            list.retain(|tx| tx.send(payload.clone()).is_ok());
        }
    }
}

impl<T: Clone> Default for EventBus<T> {
    fn default() -> Self {
        Self::new()
    }
}
