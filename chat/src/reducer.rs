//! Pure transition function for [`ChatState`].
//!
//! [`reduce`] never mutates its input. Collections are `Arc`s and are copied
//! with [`Arc::make_mut`] only when a transition actually changes them, so
//! the previous state stays valid and shares whatever was left untouched.

use std::sync::Arc;

use crate::{
    action::{Action, ChatEvent, Effect},
    env::Environment,
    model::{ChatMessage, ChatState, PartialChatState, Reaction},
};

/// Result of applying one action.
#[derive(Debug, Clone)]
pub struct Transition {
    pub state: ChatState,
    pub effects: Vec<Effect>,
}

impl Transition {
    fn unchanged(state: &ChatState) -> Self {
        Self {
            state: state.clone(),
            effects: Vec::new(),
        }
    }

    fn persisted(state: ChatState, event: ChatEvent) -> Self {
        Self {
            state,
            effects: vec![Effect::PersistMessages, Effect::Notify(event)],
        }
    }

    fn notified(state: ChatState, event: ChatEvent) -> Self {
        Self {
            state,
            effects: vec![Effect::Notify(event)],
        }
    }
}

/// Apply `action` to `state`.
pub fn reduce(state: &ChatState, action: Action, env: &dyn Environment) -> Transition {
    match action {
        Action::SendMessage { content } => send_message(state, content, env),
        Action::SwitchRoom { room_id } => {
            let mut next = state.clone();
            next.current_room_id = room_id.clone();
            Transition::notified(next, ChatEvent::RoomSwitched { room_id })
        }
        Action::AddReaction { message_id, emoji } => add_reaction(state, message_id, emoji),
        Action::RemoveReaction { message_id, emoji } => remove_reaction(state, message_id, emoji),
        Action::UpdateUserStatus { status } => {
            let mut next = state.clone();
            next.current_user.status = status;
            Transition::notified(next, ChatEvent::StatusChanged { status })
        }
        Action::AddAutoMessage { message } => {
            let mut next = state.clone();
            Arc::make_mut(&mut next.messages).push(message.clone());
            Transition::persisted(next, ChatEvent::MessageAdded(message))
        }
        Action::LoadFromStorage { state: partial } => {
            Transition::notified(merge(state, partial), ChatEvent::StateLoaded)
        }
    }
}

fn send_message(state: &ChatState, content: String, env: &dyn Environment) -> Transition {
    let now = env.now();
    let room_id = state.current_room_id.clone();
    let message = ChatMessage::text(
        env.message_id("msg"),
        room_id.clone(),
        &state.current_user,
        content,
        now,
    );

    let mut next = state.clone();
    Arc::make_mut(&mut next.messages).push(message.clone());
    if let Some(index) = state.rooms.iter().position(|room| room.id == room_id) {
        Arc::make_mut(&mut next.rooms)[index].last_activity = now;
    }
    Transition::persisted(next, ChatEvent::MessageAdded(message))
}

fn add_reaction(state: &ChatState, message_id: String, emoji: String) -> Transition {
    let user_id = &state.current_user.id;
    let Some(index) = state.messages.iter().position(|m| m.id == message_id) else {
        return Transition::unchanged(state);
    };
    let current = &state.messages[index].reactions;
    let existing = current.iter().position(|r| r.emoji == emoji);
    if existing.is_some_and(|r| current[r].includes(user_id)) {
        return Transition::unchanged(state);
    }

    let mut next = state.clone();
    let reactions = &mut Arc::make_mut(&mut next.messages)[index].reactions;
    match existing {
        Some(r) => {
            let reaction = &mut reactions[r];
            reaction.user_ids.push(user_id.clone());
            reaction.count = reaction.user_ids.len() as u32;
        }
        None => reactions.push(Reaction::new(emoji.clone(), user_id.clone())),
    }
    Transition::persisted(next, ChatEvent::ReactionChanged { message_id, emoji })
}

fn remove_reaction(state: &ChatState, message_id: String, emoji: String) -> Transition {
    let user_id = &state.current_user.id;
    let Some(index) = state.messages.iter().position(|m| m.id == message_id) else {
        return Transition::unchanged(state);
    };
    let Some(r) = state.messages[index]
        .reactions
        .iter()
        .position(|r| r.emoji == emoji && r.includes(user_id))
    else {
        return Transition::unchanged(state);
    };

    let mut next = state.clone();
    let reactions = &mut Arc::make_mut(&mut next.messages)[index].reactions;
    let reaction = &mut reactions[r];
    reaction.user_ids.retain(|id| id != user_id);
    reaction.count = reaction.user_ids.len() as u32;
    if reaction.count == 0 {
        reactions.remove(r);
    }
    Transition::persisted(next, ChatEvent::ReactionChanged { message_id, emoji })
}

/// Shallow merge: every field present in `partial` replaces the current one.
fn merge(state: &ChatState, partial: PartialChatState) -> ChatState {
    let mut next = state.clone();
    if let Some(user) = partial.current_user {
        next.current_user = user;
    }
    if let Some(users) = partial.users {
        next.users = Arc::new(users);
    }
    if let Some(rooms) = partial.rooms {
        next.rooms = Arc::new(rooms);
    }
    if let Some(messages) = partial.messages {
        next.messages = Arc::new(messages);
    }
    if let Some(room_id) = partial.current_room_id {
        next.current_room_id = room_id;
    }
    if let Some(loading) = partial.is_loading {
        next.is_loading = loading;
    }
    next
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{env::ManualEnvironment, model::UserStatus, seed};
    use time::macros::datetime;

    fn setup() -> (ChatState, ManualEnvironment) {
        let now = datetime!(2024-03-01 12:00 UTC);
        (seed::initial_state(now), ManualEnvironment::new(now))
    }

    fn react(state: &ChatState, env: &ManualEnvironment, message_id: &str, emoji: &str) -> Transition {
        reduce(
            state,
            Action::AddReaction {
                message_id: message_id.into(),
                emoji: emoji.into(),
            },
            env,
        )
    }

    fn unreact(state: &ChatState, env: &ManualEnvironment, message_id: &str, emoji: &str) -> Transition {
        reduce(
            state,
            Action::RemoveReaction {
                message_id: message_id.into(),
                emoji: emoji.into(),
            },
            env,
        )
    }

    #[test]
    fn switch_room_leaves_messages_alone() {
        let (state, env) = setup();
        let t = reduce(&state, Action::SwitchRoom { room_id: "random".into() }, &env);
        assert_eq!(t.state.current_room_id, "random");
        assert!(Arc::ptr_eq(&t.state.messages, &state.messages));
        assert_eq!(
            t.effects,
            vec![Effect::Notify(ChatEvent::RoomSwitched { room_id: "random".into() })]
        );
    }

    #[test]
    fn send_message_appends_and_touches_room() {
        let (state, env) = setup();
        env.advance(std::time::Duration::from_secs(30));
        let t = reduce(&state, Action::SendMessage { content: "hello".into() }, &env);

        assert_eq!(t.state.messages.len(), state.messages.len() + 1);
        let sent = t.state.messages.last().unwrap();
        assert_eq!(sent.content, "hello");
        assert_eq!(sent.room_id, "general");
        assert_eq!(sent.user_id, state.current_user.id);
        assert_eq!(sent.username, "You");
        assert!(sent.reactions.is_empty());
        assert_eq!(sent.timestamp, datetime!(2024-03-01 12:00:30 UTC));
        assert_eq!(t.state.room("general").unwrap().last_activity, sent.timestamp);
        assert_eq!(t.state.room("random"), state.room("random"));
        assert_eq!(t.effects[0], Effect::PersistMessages);

        // the input state is untouched
        assert_eq!(state.messages.len(), 3);
        assert_ne!(state.room("general").unwrap().last_activity, sent.timestamp);
    }

    #[test]
    fn send_into_unknown_room_keeps_rooms() {
        let (state, env) = setup();
        let moved = reduce(&state, Action::SwitchRoom { room_id: "nowhere".into() }, &env).state;
        let t = reduce(&moved, Action::SendMessage { content: "echo".into() }, &env);
        assert_eq!(t.state.messages.last().unwrap().room_id, "nowhere");
        assert!(Arc::ptr_eq(&t.state.rooms, &moved.rooms));
    }

    #[test]
    fn new_reaction_is_created_for_current_user() {
        let (state, env) = setup();
        let t = react(&state, &env, "msg-1", "👍");
        let reaction = t.state.message("msg-1").unwrap().reaction("👍").unwrap();
        assert_eq!(reaction, &Reaction::new("👍", "user-1"));
        assert_eq!(t.effects[0], Effect::PersistMessages);
    }

    #[test]
    fn existing_reaction_gains_member() {
        let (state, env) = setup();
        let t = react(&state, &env, "msg-3", "❤️");
        let reaction = t.state.message("msg-3").unwrap().reaction("❤️").unwrap();
        assert_eq!(reaction.count, 2);
        assert_eq!(reaction.user_ids, vec!["user-2", "user-1"]);
    }

    #[test]
    fn add_reaction_is_idempotent() {
        let (state, env) = setup();
        let once = react(&state, &env, "msg-1", "👍").state;
        let twice = react(&once, &env, "msg-1", "👍");
        assert_eq!(twice.state, once);
        assert!(twice.effects.is_empty());

        // already a member of the seeded wave
        let wave = react(&state, &env, "msg-1", "👋");
        assert_eq!(wave.state, state);
    }

    #[test]
    fn draining_a_reaction_removes_it() {
        let (state, env) = setup();
        let added = react(&state, &env, "msg-1", "👍").state;
        let removed = unreact(&added, &env, "msg-1", "👍").state;
        assert!(removed.message("msg-1").unwrap().reaction("👍").is_none());
        assert_eq!(removed.message("msg-1").unwrap().reactions.len(), 1);
    }

    #[test]
    fn removing_keeps_other_members() {
        let (state, env) = setup();
        let t = unreact(&state, &env, "msg-1", "👋");
        let reaction = t.state.message("msg-1").unwrap().reaction("👋").unwrap();
        assert_eq!(reaction.count, 1);
        assert_eq!(reaction.user_ids, vec!["user-3"]);
    }

    #[test]
    fn removing_a_reaction_never_given_is_a_no_op() {
        let (state, env) = setup();
        let t = unreact(&state, &env, "msg-3", "❤️");
        assert_eq!(t.state, state);
        assert!(t.effects.is_empty());
    }

    #[test]
    fn readding_after_removal_restores_membership() {
        let (state, env) = setup();
        let s = react(&state, &env, "msg-2", "🎉").state;
        let s = unreact(&s, &env, "msg-2", "🎉").state;
        let s = react(&s, &env, "msg-2", "🎉").state;
        assert_eq!(s.message("msg-2").unwrap().reaction("🎉").unwrap().count, 1);
    }

    #[test]
    fn unknown_message_is_ignored() {
        let (state, env) = setup();
        assert_eq!(react(&state, &env, "nope", "👍").state, state);
        assert_eq!(unreact(&state, &env, "nope", "👍").state, state);
    }

    #[test]
    fn status_change_leaves_users_list() {
        let (state, env) = setup();
        let t = reduce(&state, Action::UpdateUserStatus { status: UserStatus::Busy }, &env);
        assert_eq!(t.state.current_user.status, UserStatus::Busy);
        assert!(t.state.current_user.is_online);
        assert_eq!(t.state.user("user-1").unwrap().status, UserStatus::Online);
        assert!(!t.effects.contains(&Effect::PersistMessages));
    }

    #[test]
    fn auto_message_is_appended_as_is() {
        let (state, env) = setup();
        let alice = state.user("user-2").unwrap().clone();
        let msg = ChatMessage::text("auto-1", "help", &alice, "Thanks for sharing!", env.now());
        let t = reduce(&state, Action::AddAutoMessage { message: msg.clone() }, &env);
        assert_eq!(t.state.messages.last(), Some(&msg));
        assert_eq!(t.state.rooms, state.rooms);
        assert_eq!(t.state.current_room_id, "general");
    }

    #[test]
    fn load_merges_only_given_fields() {
        let (state, env) = setup();
        let restored = vec![state.messages[0].clone()];
        let t = reduce(
            &state,
            Action::LoadFromStorage {
                state: PartialChatState::messages(restored.clone()),
            },
            &env,
        );
        assert_eq!(*t.state.messages, restored);
        assert_eq!(t.state.rooms, state.rooms);
        assert_eq!(t.state.current_user, state.current_user);
        assert!(!t.effects.contains(&Effect::PersistMessages));

        let t = reduce(
            &t.state,
            Action::LoadFromStorage {
                state: PartialChatState {
                    current_room_id: Some("help".into()),
                    is_loading: Some(true),
                    ..Default::default()
                },
            },
            &env,
        );
        assert_eq!(t.state.current_room_id, "help");
        assert!(t.state.is_loading);
        assert_eq!(*t.state.messages, restored);
    }
}
