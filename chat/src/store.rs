use std::sync::Arc;

use lounge_core::EventBus;
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::debug;

use crate::{
    action::{Action, ChatEvent, Effect},
    env::Environment,
    model::ChatState,
    persistence::MessageArchive,
    reducer::{reduce, Transition},
};

/// Holds the current [`ChatState`] and applies actions to it one at a time.
///
/// Readers get cheap `Arc` snapshots; a snapshot never changes after it has
/// been handed out.
pub struct Store {
    state: Arc<ChatState>,
    archive: MessageArchive,
    env: Arc<dyn Environment>,
    events: EventBus<ChatEvent>,
}

impl Store {
    pub fn new(initial: ChatState, archive: MessageArchive, env: Arc<dyn Environment>) -> Self {
        Self {
            state: Arc::new(initial),
            archive,
            env,
            events: EventBus::new(),
        }
    }

    /// Current state snapshot.
    pub fn state(&self) -> Arc<ChatState> {
        self.state.clone()
    }

    /// Apply an action, then run the effects it asked for.
    pub fn dispatch(&mut self, action: Action) {
        debug!(action = action.name(), "dispatch");
        let Transition { state, effects } = reduce(&self.state, action, self.env.as_ref());
        self.state = Arc::new(state);
        for effect in effects {
            match effect {
                Effect::PersistMessages => self.archive.save(&self.state.messages),
                Effect::Notify(event) => self.events.publish(event.topic(), event),
            }
        }
    }

    /// Receive events published on `topic` (see the [`ChatEvent`] constants).
    pub fn subscribe(&mut self, topic: &str) -> UnboundedReceiver<ChatEvent> {
        self.events.subscribe(topic)
    }
}
