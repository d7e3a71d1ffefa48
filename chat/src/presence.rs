//! Simulated activity from the other members of the room.
//!
//! On every tick a coin is tossed; on success a random online user (never the
//! current user) posts one of a handful of canned replies into the room the
//! current user is looking at.

use std::{sync::Arc, time::Duration};

use lounge_core::{spawn_interval, IntervalHandle};
use rand::{rngs::StdRng, seq::SliceRandom, Rng, SeedableRng};
use tracing::debug;

use crate::{
    action::Action,
    env::Environment,
    model::{ChatMessage, ChatState, User},
    session::Dispatch,
};

pub const CANNED_RESPONSES: [&str; 7] = [
    "That's interesting!",
    "I agree with that point.",
    "Has anyone tried the new features?",
    "Great discussion everyone!",
    "I'm working on something similar.",
    "Thanks for sharing!",
    "Looking forward to hearing more about this.",
];

/// Longest accepted time between draws.
pub const MAX_INTERVAL: Duration = Duration::from_secs(24 * 60 * 60);

#[derive(Debug, Clone, PartialEq)]
pub struct PresenceConfig {
    /// Time between draws.
    pub interval: Duration,
    /// Chance that a draw produces a message.
    pub probability: f64,
    /// Fixed seed for reproducible runs.
    pub seed: Option<u64>,
}

impl Default for PresenceConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(10),
            probability: 0.3,
            seed: None,
        }
    }
}

impl PresenceConfig {
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.interval < Duration::from_secs(1) || self.interval > MAX_INTERVAL {
            anyhow::bail!("invalid_presence_interval");
        }
        if !(0.0..=1.0).contains(&self.probability) {
            anyhow::bail!("invalid_presence_probability");
        }
        Ok(())
    }
}

pub struct PresenceSimulator {
    interval: Duration,
    probability: f64,
    rng: StdRng,
    env: Arc<dyn Environment>,
}

impl PresenceSimulator {
    pub fn new(config: &PresenceConfig, env: Arc<dyn Environment>) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let probability = if (0.0..=1.0).contains(&config.probability) {
            config.probability
        } else {
            0.0
        };
        Self {
            interval: config.interval,
            probability,
            rng,
            env,
        }
    }

    /// Run one draw against `state`. Returns the message to post, if any.
    pub fn tick(&mut self, state: &ChatState) -> Option<ChatMessage> {
        if !self.rng.gen_bool(self.probability) {
            return None;
        }
        let others: Vec<&User> = state
            .users
            .iter()
            .filter(|u| u.is_online && u.id != state.current_user.id)
            .collect();
        let author = *others.choose(&mut self.rng)?;
        let content = *CANNED_RESPONSES.choose(&mut self.rng)?;
        Some(ChatMessage::text(
            self.env.message_id("auto-msg"),
            state.current_room_id.clone(),
            author,
            content,
            self.env.now(),
        ))
    }

    /// Start ticking in the background, posting through `target`.
    pub fn spawn<D>(mut self, target: D) -> IntervalHandle
    where
        D: Dispatch + 'static,
    {
        let interval = self.interval;
        spawn_interval("presence", interval, move || {
            let snapshot = target.snapshot();
            if let Some(message) = self.tick(&snapshot) {
                debug!(author = %message.username, room = %message.room_id, "simulated message");
                target.dispatch(Action::AddAutoMessage { message });
            }
        })
    }
}
