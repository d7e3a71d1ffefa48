//! Inputs and outputs of the chat state machine.
//!
//! An [`Action`] is a request to change state. A transition answers it with a
//! new state plus the [`Effect`]s the store has to carry out afterwards.

use crate::model::{ChatMessage, MessageId, PartialChatState, RoomId, UserStatus};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Post `content` to the current room as the current user.
    SendMessage { content: String },
    /// Make `room_id` the current room. Existence is not checked.
    SwitchRoom { room_id: RoomId },
    /// React to a message as the current user.
    AddReaction { message_id: MessageId, emoji: String },
    /// Withdraw the current user's reaction.
    RemoveReaction { message_id: MessageId, emoji: String },
    /// Change the current user's status.
    UpdateUserStatus { status: UserStatus },
    /// Append a message built elsewhere, e.g. by the presence simulator.
    AddAutoMessage { message: ChatMessage },
    /// Overlay state restored from storage.
    LoadFromStorage { state: PartialChatState },
}

impl Action {
    pub fn name(&self) -> &'static str {
        match self {
            Self::SendMessage { .. } => "send_message",
            Self::SwitchRoom { .. } => "switch_room",
            Self::AddReaction { .. } => "add_reaction",
            Self::RemoveReaction { .. } => "remove_reaction",
            Self::UpdateUserStatus { .. } => "update_user_status",
            Self::AddAutoMessage { .. } => "add_auto_message",
            Self::LoadFromStorage { .. } => "load_from_storage",
        }
    }
}

/// Work requested by a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Write the full message collection to storage.
    PersistMessages,
    /// Tell subscribers what changed.
    Notify(ChatEvent),
}

/// Change notifications published by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatEvent {
    MessageAdded(ChatMessage),
    RoomSwitched { room_id: RoomId },
    ReactionChanged { message_id: MessageId, emoji: String },
    StatusChanged { status: UserStatus },
    StateLoaded,
}

impl ChatEvent {
    pub const MESSAGE_ADDED: &'static str = "message.added";
    pub const ROOM_SWITCHED: &'static str = "room.switched";
    pub const REACTION_CHANGED: &'static str = "reaction.changed";
    pub const STATUS_CHANGED: &'static str = "status.changed";
    pub const STATE_LOADED: &'static str = "state.loaded";

    pub fn topic(&self) -> &'static str {
        match self {
            Self::MessageAdded(_) => Self::MESSAGE_ADDED,
            Self::RoomSwitched { .. } => Self::ROOM_SWITCHED,
            Self::ReactionChanged { .. } => Self::REACTION_CHANGED,
            Self::StatusChanged { .. } => Self::STATUS_CHANGED,
            Self::StateLoaded => Self::STATE_LOADED,
        }
    }
}
