//! Session wiring: one store per session, shared with consumers through
//! [`ChatHandle`]s.
//!
//! A session owns the store and the presence timer. Handles only hold a weak
//! reference, so using one after the session has ended is caught at the call
//! site instead of silently acting on stale state.

use std::sync::{Arc, Weak};

use lounge_core::{IntervalHandle, KeyValueStore};
use parking_lot::Mutex;
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::info;

use crate::{
    action::{Action, ChatEvent},
    env::{Environment, SystemEnvironment},
    model::{ChatState, MessageId, PartialChatState, RoomId, UserStatus},
    persistence::MessageArchive,
    presence::{PresenceConfig, PresenceSimulator},
    seed,
    store::Store,
};

/// The narrow seam background producers need: read a snapshot, dispatch.
pub trait Dispatch: Send + Sync {
    fn snapshot(&self) -> Arc<ChatState>;
    fn dispatch(&self, action: Action);
}

/// Cloneable access to the session's store.
#[derive(Clone)]
pub struct ChatHandle {
    store: Weak<Mutex<Store>>,
}

impl ChatHandle {
    /// # Panics
    ///
    /// Panics when the owning session has ended.
    fn store(&self) -> Arc<Mutex<Store>> {
        match self.store.upgrade() {
            Some(store) => store,
            None => panic!("chat store used outside of an active session"),
        }
    }

    /// Whether the owning session is still alive.
    pub fn is_active(&self) -> bool {
        self.store.strong_count() > 0
    }

    /// Current state snapshot.
    pub fn state(&self) -> Arc<ChatState> {
        self.store().lock().state()
    }

    pub fn dispatch(&self, action: Action) {
        self.store().lock().dispatch(action);
    }

    pub fn subscribe(&self, topic: &str) -> UnboundedReceiver<ChatEvent> {
        self.store().lock().subscribe(topic)
    }

    pub fn send_message(&self, content: impl Into<String>) {
        self.dispatch(Action::SendMessage {
            content: content.into(),
        });
    }

    pub fn switch_room(&self, room_id: impl Into<RoomId>) {
        self.dispatch(Action::SwitchRoom {
            room_id: room_id.into(),
        });
    }

    pub fn add_reaction(&self, message_id: impl Into<MessageId>, emoji: impl Into<String>) {
        self.dispatch(Action::AddReaction {
            message_id: message_id.into(),
            emoji: emoji.into(),
        });
    }

    pub fn remove_reaction(&self, message_id: impl Into<MessageId>, emoji: impl Into<String>) {
        self.dispatch(Action::RemoveReaction {
            message_id: message_id.into(),
            emoji: emoji.into(),
        });
    }

    pub fn update_user_status(&self, status: UserStatus) {
        self.dispatch(Action::UpdateUserStatus { status });
    }
}

impl Dispatch for ChatHandle {
    fn snapshot(&self) -> Arc<ChatState> {
        self.state()
    }

    fn dispatch(&self, action: Action) {
        ChatHandle::dispatch(self, action);
    }
}

pub struct SessionOptions {
    /// `None` disables simulated messages.
    pub presence: Option<PresenceConfig>,
    pub env: Arc<dyn Environment>,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            presence: Some(PresenceConfig::default()),
            env: Arc::new(SystemEnvironment),
        }
    }
}

/// Owns the store and the presence timer. End it with [`Session::shutdown`];
/// dropping it instead stops the timer without waiting for a tick in flight.
pub struct Session {
    // declared first so the timer stops before the store goes away
    presence: Option<IntervalHandle>,
    store: Arc<Mutex<Store>>,
}

impl Session {
    /// Build the starting state from the seed plus whatever messages the
    /// storage holds, then start the presence timer if configured.
    ///
    /// Starting the timer requires a tokio runtime.
    pub fn start(storage: Arc<dyn KeyValueStore>, options: SessionOptions) -> Self {
        let SessionOptions { presence, env } = options;
        let archive = MessageArchive::new(storage);
        let mut store = Store::new(seed::initial_state(env.now()), archive.clone(), env.clone());
        if let Some(messages) = archive.load() {
            info!(count = messages.len(), "restored messages from storage");
            store.dispatch(Action::LoadFromStorage {
                state: PartialChatState::messages(messages),
            });
        }

        let mut session = Self {
            presence: None,
            store: Arc::new(Mutex::new(store)),
        };
        if let Some(config) = presence {
            let simulator = PresenceSimulator::new(&config, env);
            session.presence = Some(simulator.spawn(session.handle()));
            info!(interval = ?config.interval, probability = config.probability, "presence simulator running");
        }
        session
    }

    pub fn handle(&self) -> ChatHandle {
        ChatHandle {
            store: Arc::downgrade(&self.store),
        }
    }

    pub fn presence_running(&self) -> bool {
        self.presence.as_ref().is_some_and(|p| !p.is_cancelled())
    }

    /// Stop background work and release the store. Outstanding handles stop
    /// working once this returns.
    pub async fn shutdown(mut self) {
        if let Some(timer) = self.presence.take() {
            timer.cancel().await;
        }
        info!("session ended");
    }
}
