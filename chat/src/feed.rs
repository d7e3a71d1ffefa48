//! Read-side selectors for the message feed and the member list.

use time::{
    format_description::FormatItem, macros::format_description, Date, OffsetDateTime, UtcOffset,
};

use crate::{
    action::Action,
    model::{ChatMessage, ChatRoom, ChatState, User},
};

/// Emojis offered by the reaction picker.
pub const COMMON_EMOJIS: [&str; 8] = ["👍", "❤️", "😂", "😮", "😢", "😡", "👏", "🎉"];

const LONG_DATE: &[FormatItem<'static>] =
    format_description!("[weekday], [month repr:long] [day padding:none], [year]");

const SHORT_DATE: &[FormatItem<'static>] = format_description!("[month repr:short] [day padding:none]");

/// Messages of one calendar day, in display order.
#[derive(Debug, PartialEq, Eq)]
pub struct DateGroup<'a> {
    pub date: Date,
    pub label: String,
    pub messages: Vec<&'a ChatMessage>,
}

/// Messages posted to `room_id`, oldest first. Equal timestamps keep their
/// insertion order.
pub fn room_messages<'a>(state: &'a ChatState, room_id: &str) -> Vec<&'a ChatMessage> {
    let mut messages: Vec<&ChatMessage> = state
        .messages
        .iter()
        .filter(|m| m.room_id == room_id)
        .collect();
    messages.sort_by_key(|m| m.timestamp);
    messages
}

pub fn current_feed(state: &ChatState) -> Vec<&ChatMessage> {
    room_messages(state, &state.current_room_id)
}

/// "Today", "Yesterday", or the full date.
pub fn date_label(date: Date, today: Date) -> String {
    if date == today {
        "Today".to_string()
    } else if today.previous_day() == Some(date) {
        "Yesterday".to_string()
    } else {
        date.format(LONG_DATE).unwrap_or_else(|_| date.to_string())
    }
}

/// Split time ordered messages into calendar days in the viewer's `offset`.
pub fn group_by_date<'a>(
    messages: &[&'a ChatMessage],
    today: Date,
    offset: UtcOffset,
) -> Vec<DateGroup<'a>> {
    let mut groups: Vec<DateGroup<'a>> = Vec::new();
    for &message in messages {
        let date = message.timestamp.to_offset(offset).date();
        match groups.last_mut() {
            Some(group) if group.date == date => group.messages.push(message),
            _ => groups.push(DateGroup {
                date,
                label: date_label(date, today),
                messages: vec![message],
            }),
        }
    }
    groups
}

/// Rooms with the most recent activity first. Ties keep their stored order.
pub fn rooms_by_activity(state: &ChatState) -> Vec<&ChatRoom> {
    let mut rooms: Vec<&ChatRoom> = state.rooms.iter().collect();
    rooms.sort_by(|a, b| b.last_activity.cmp(&a.last_activity));
    rooms
}

/// Compact age of `ts` relative to `now`: "now", "5m", "3h", "2d", or the
/// short date in `offset` once a week has passed.
pub fn activity_label(ts: OffsetDateTime, now: OffsetDateTime, offset: UtcOffset) -> String {
    let age = now - ts;
    let minutes = age.whole_minutes();
    let hours = age.whole_hours();
    let days = age.whole_days();
    if minutes < 1 {
        "now".to_string()
    } else if minutes < 60 {
        format!("{minutes}m")
    } else if hours < 24 {
        format!("{hours}h")
    } else if days < 7 {
        format!("{days}d")
    } else {
        let date = ts.to_offset(offset).date();
        date.format(SHORT_DATE).unwrap_or_else(|_| date.to_string())
    }
}

pub fn online_users(state: &ChatState) -> Vec<&User> {
    state.users.iter().filter(|u| u.is_online).collect()
}

pub fn offline_users(state: &ChatState) -> Vec<&User> {
    state.users.iter().filter(|u| !u.is_online).collect()
}

/// Clicking an emoji withdraws the user's reaction if they already gave it,
/// otherwise adds it.
pub fn toggle_reaction(message: &ChatMessage, emoji: &str, user_id: &str) -> Action {
    let reacted = message.reaction(emoji).is_some_and(|r| r.includes(user_id));
    let message_id = message.id.clone();
    let emoji = emoji.to_string();
    if reacted {
        Action::RemoveReaction { message_id, emoji }
    } else {
        Action::AddReaction { message_id, emoji }
    }
}
