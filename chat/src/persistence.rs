use std::sync::Arc;

use lounge_core::KeyValueStore;
use tracing::{debug, error, warn};

use crate::model::ChatMessage;

/// Storage key holding the JSON encoded message list.
pub const MESSAGES_KEY: &str = "chat-messages";

/// Reads and writes the message collection as one JSON string entry.
#[derive(Clone)]
pub struct MessageArchive {
    storage: Arc<dyn KeyValueStore>,
}

impl MessageArchive {
    pub fn new(storage: Arc<dyn KeyValueStore>) -> Self {
        Self { storage }
    }

    /// Overwrite the stored collection. Failures are logged, not returned.
    pub fn save(&self, messages: &[ChatMessage]) {
        let encoded = match serde_json::to_string(messages) {
            Ok(encoded) => encoded,
            Err(err) => {
                error!("failed to encode messages: {err}");
                return;
            }
        };
        match self.storage.set(MESSAGES_KEY, encoded) {
            Ok(()) => debug!(count = messages.len(), "messages saved"),
            Err(err) => error!("failed to save messages: {err}"),
        }
    }

    /// Stored collection, or `None` when nothing usable is stored.
    pub fn load(&self) -> Option<Vec<ChatMessage>> {
        let raw = self.storage.get(MESSAGES_KEY)?;
        match serde_json::from_str::<Vec<ChatMessage>>(&raw) {
            Ok(mut messages) => {
                messages.iter_mut().for_each(ChatMessage::normalize_reactions);
                debug!(count = messages.len(), "messages loaded");
                Some(messages)
            }
            Err(err) => {
                warn!("failed to load messages from storage: {err}");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed;
    use lounge_core::MemoryStorage;
    use time::macros::datetime;

    fn archive() -> (MessageArchive, Arc<MemoryStorage>) {
        let storage = Arc::new(MemoryStorage::new());
        (MessageArchive::new(storage.clone()), storage)
    }

    #[test]
    fn absent_key_loads_none() {
        let (archive, _) = archive();
        assert!(archive.load().is_none());
    }

    #[test]
    fn round_trip_keeps_timestamps_and_reactions() {
        let (archive, _) = archive();
        let messages = seed::messages(datetime!(2024-03-01 12:00:00.250 UTC));
        archive.save(&messages);
        let loaded = archive.load().unwrap();
        assert_eq!(loaded, messages);
        assert_eq!(loaded[1].timestamp, datetime!(2024-03-01 10:05:00.250 UTC));
    }

    #[test]
    fn stored_layout_is_a_json_array_with_iso_strings() {
        let (archive, storage) = archive();
        archive.save(&seed::messages(datetime!(2024-03-01 12:00 UTC)));
        let raw: serde_json::Value = serde_json::from_str(&storage.get(MESSAGES_KEY).unwrap()).unwrap();
        assert_eq!(raw[0]["timestamp"], "2024-03-01T10:00:00.000Z");
        assert_eq!(raw[0]["reactions"][0]["userIds"][1], "user-3");
    }

    #[test]
    fn malformed_data_loads_none() {
        let (archive, storage) = archive();
        storage.set(MESSAGES_KEY, "[{\"id\":".into()).unwrap();
        assert!(archive.load().is_none());
        storage
            .set(
                MESSAGES_KEY,
                r#"[{"id":"m","roomId":"r","userId":"u","username":"U","content":"c","timestamp":"yesterday"}]"#
                    .into(),
            )
            .unwrap();
        assert!(archive.load().is_none());
    }

    #[test]
    fn save_overwrites_previous_value() {
        let (archive, _) = archive();
        let messages = seed::messages(datetime!(2024-03-01 12:00 UTC));
        archive.save(&messages);
        archive.save(&messages[..1]);
        assert_eq!(archive.load().unwrap().len(), 1);
    }
}
