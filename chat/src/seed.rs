//! Fixed starting data for a session: four users, four rooms and a short
//! conversation in `general`. Times are relative to the session start.

use std::sync::Arc;

use time::{Duration, OffsetDateTime};

use crate::model::{
    ChatMessage, ChatRoom, ChatState, MessageKind, Reaction, RoomKind, User, UserStatus,
};

pub const CURRENT_USER_ID: &str = "user-1";
pub const DEFAULT_ROOM_ID: &str = "general";

fn user(id: &str, username: &str, status: UserStatus, last_seen: OffsetDateTime) -> User {
    User {
        id: id.into(),
        username: username.into(),
        avatar: format!("avatars/{id}.png"),
        is_online: status != UserStatus::Offline,
        status,
        last_seen,
    }
}

pub fn users(now: OffsetDateTime) -> Vec<User> {
    vec![
        user(CURRENT_USER_ID, "You", UserStatus::Online, now),
        user("user-2", "Alice", UserStatus::Online, now),
        user("user-3", "Bob", UserStatus::Away, now - Duration::minutes(10)),
        user("user-4", "Charlie", UserStatus::Offline, now - Duration::hours(2)),
    ]
}

fn room(id: &str, description: &str, members: u32, last: OffsetDateTime, kind: RoomKind) -> ChatRoom {
    ChatRoom {
        id: id.into(),
        name: id.into(),
        description: description.into(),
        member_count: members,
        last_activity: last,
        kind,
    }
}

pub fn rooms(now: OffsetDateTime) -> Vec<ChatRoom> {
    vec![
        room("general", "General discussion", 4, now, RoomKind::General),
        room("random", "Random conversations", 3, now - Duration::minutes(30), RoomKind::Random),
        room("help", "Get help from the community", 2, now - Duration::hours(2), RoomKind::Help),
        room(
            "announcements",
            "Important announcements",
            4,
            now - Duration::hours(24),
            RoomKind::Announcements,
        ),
    ]
}

fn message(
    id: &str,
    author: (&str, &str),
    content: &str,
    timestamp: OffsetDateTime,
    reactions: Vec<Reaction>,
) -> ChatMessage {
    ChatMessage {
        id: id.into(),
        room_id: DEFAULT_ROOM_ID.into(),
        user_id: author.0.into(),
        username: author.1.into(),
        content: content.into(),
        timestamp,
        reactions,
        kind: MessageKind::Text,
    }
}

fn reaction(emoji: &str, user_ids: &[&str]) -> Reaction {
    Reaction {
        emoji: emoji.into(),
        count: user_ids.len() as u32,
        user_ids: user_ids.iter().map(|id| id.to_string()).collect(),
    }
}

pub fn messages(now: OffsetDateTime) -> Vec<ChatMessage> {
    let start = now - Duration::hours(2);
    vec![
        message(
            "msg-1",
            ("user-2", "Alice"),
            "Hey everyone! How's your day going?",
            start,
            vec![reaction("👋", &["user-1", "user-3"])],
        ),
        message(
            "msg-2",
            ("user-3", "Bob"),
            "Pretty good! Working on some exciting projects.",
            start + Duration::minutes(5),
            vec![],
        ),
        message(
            "msg-3",
            (CURRENT_USER_ID, "You"),
            "Same here! Love the new chat interface.",
            start + Duration::minutes(10),
            vec![reaction("❤️", &["user-2"])],
        ),
    ]
}

/// Complete starting state with `user-1` as the current user in `general`.
pub fn initial_state(now: OffsetDateTime) -> ChatState {
    let users = users(now);
    let current_user = users[0].clone();
    ChatState {
        current_user,
        users: Arc::new(users),
        rooms: Arc::new(rooms(now)),
        messages: Arc::new(messages(now)),
        current_room_id: DEFAULT_ROOM_ID.into(),
        is_loading: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn seed_is_consistent() {
        let state = initial_state(OffsetDateTime::UNIX_EPOCH + Duration::days(1));
        assert_eq!(state.current_user.id, CURRENT_USER_ID);
        assert!(state.current_room().is_some());

        let room_ids: HashSet<_> = state.rooms.iter().map(|r| &r.id).collect();
        assert_eq!(room_ids.len(), state.rooms.len());
        let user_ids: HashSet<_> = state.users.iter().map(|u| &u.id).collect();
        assert_eq!(user_ids.len(), state.users.len());

        for msg in state.messages.iter() {
            assert!(room_ids.contains(&msg.room_id));
            for r in &msg.reactions {
                assert_eq!(r.count as usize, r.user_ids.len());
            }
        }
    }

    #[test]
    fn only_charlie_is_offline() {
        let offline: Vec<_> = users(OffsetDateTime::UNIX_EPOCH)
            .into_iter()
            .filter(|u| !u.is_online)
            .map(|u| u.username)
            .collect();
        assert_eq!(offline, vec!["Charlie"]);
    }
}
