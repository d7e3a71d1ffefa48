//! Line oriented terminal front end.
//!
//! Plain lines are sent to the current room; lines starting with `/` are
//! commands. Incoming messages for the room being viewed are printed as the
//! store publishes them.

use std::io::BufRead;

use thiserror::Error;
use time::{
    format_description::FormatItem, macros::format_description, Date, OffsetDateTime, UtcOffset,
};
use tokio::sync::mpsc;
use tracing::debug;

use crate::{
    action::ChatEvent,
    compose::{validate_draft, DraftError},
    feed::{self, COMMON_EMOJIS},
    model::{ChatMessage, ChatState, MessageId, RoomId, User, UserStatus},
    session::ChatHandle,
};

const CLOCK: &[FormatItem<'static>] = format_description!("[hour]:[minute]");

pub const HELP: &str = "\
commands:
  <text>                    send a message to the current room
  /join <room>              switch to another room
  /react <message> <emoji>  toggle a reaction (emoji may be 1-8 for the picker)
  /status <status>          online, away, busy or offline
  /rooms                    list rooms
  /who                      list members
  /feed                     show the current room
  /help                     show this text
  /quit                     leave";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Send(String),
    Join(RoomId),
    React { message_id: MessageId, emoji: String },
    Status(UserStatus),
    Rooms,
    Who,
    Feed,
    Help,
    Quit,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error(transparent)]
    Draft(#[from] DraftError),
    #[error("usage: {0}")]
    Usage(&'static str),
    #[error("unknown command /{0}, try /help")]
    Unknown(String),
    #[error("{0}")]
    Status(String),
}

/// Parse one input line.
pub fn parse_command(line: &str) -> Result<Command, CommandError> {
    let line = line.trim();
    let Some(rest) = line.strip_prefix('/') else {
        return Ok(Command::Send(validate_draft(line)?));
    };
    let (name, args) = match rest.split_once(char::is_whitespace) {
        Some((name, args)) => (name, args.trim()),
        None => (rest, ""),
    };
    match name.to_ascii_lowercase().as_str() {
        "join" | "j" => match args {
            "" => Err(CommandError::Usage("/join <room>")),
            room => Ok(Command::Join(room.trim_start_matches('#').to_string())),
        },
        "react" | "r" => {
            let mut parts = args.split_whitespace();
            match (parts.next(), parts.next(), parts.next()) {
                (Some(message_id), Some(emoji), None) => Ok(Command::React {
                    message_id: message_id.to_string(),
                    emoji: picker_emoji(emoji),
                }),
                _ => Err(CommandError::Usage("/react <message> <emoji>")),
            }
        }
        "status" => match args {
            "" => Err(CommandError::Usage("/status <online|away|busy|offline>")),
            status => status.parse().map(Command::Status).map_err(CommandError::Status),
        },
        "rooms" => Ok(Command::Rooms),
        "who" => Ok(Command::Who),
        "feed" => Ok(Command::Feed),
        "help" | "?" => Ok(Command::Help),
        "quit" | "q" | "exit" => Ok(Command::Quit),
        other => Err(CommandError::Unknown(other.to_string())),
    }
}

/// Picker slots 1-8 stand for the common emojis; anything else is taken as is.
fn picker_emoji(input: &str) -> String {
    input
        .parse::<usize>()
        .ok()
        .and_then(|n| n.checked_sub(1))
        .and_then(|i| COMMON_EMOJIS.get(i))
        .map_or_else(|| input.to_string(), |e| e.to_string())
}

/// Run a parsed command against the store at wall time `now`. Returns the
/// text to show, which may be empty.
pub fn execute(handle: &ChatHandle, command: Command, now: OffsetDateTime, offset: UtcOffset) -> String {
    let today = now.to_offset(offset).date();
    match command {
        Command::Send(content) => {
            handle.send_message(content);
            String::new()
        }
        Command::Join(room) => {
            let state = handle.state();
            let Some(id) = resolve_room(&state, &room) else {
                return format!("no room named {room}, see /rooms");
            };
            handle.switch_room(id);
            render_feed(&handle.state(), today, offset)
        }
        Command::React { message_id, emoji } => {
            let state = handle.state();
            let Some(message) = state.message(&message_id) else {
                return format!("no message {message_id}");
            };
            handle.dispatch(feed::toggle_reaction(message, &emoji, &state.current_user.id));
            let state = handle.state();
            match state.message(&message_id) {
                Some(updated) => render_message(updated, &state.current_user.id, offset),
                None => String::new(),
            }
        }
        Command::Status(status) => {
            handle.update_user_status(status);
            format!("status set to {}", status.as_str())
        }
        Command::Rooms => render_rooms(&handle.state(), now, offset),
        Command::Who => render_who(&handle.state()),
        Command::Feed => render_feed(&handle.state(), today, offset),
        Command::Help => HELP.to_string(),
        Command::Quit => String::new(),
    }
}

/// Rooms are addressed by id or by display name.
fn resolve_room(state: &ChatState, input: &str) -> Option<RoomId> {
    state
        .rooms
        .iter()
        .find(|r| r.id == input || r.name.eq_ignore_ascii_case(input))
        .map(|r| r.id.clone())
}

pub fn render_message(message: &ChatMessage, me: &str, offset: UtcOffset) -> String {
    let clock = message
        .timestamp
        .to_offset(offset)
        .format(CLOCK)
        .unwrap_or_default();
    let mut line = format!("[{clock}] {}: {}  ({})", message.username, message.content, message.id);
    if !message.reactions.is_empty() {
        let tallies: Vec<String> = message
            .reactions
            .iter()
            .map(|r| {
                let mine = if r.includes(me) { "*" } else { "" };
                format!("{}{}{mine}", r.emoji, r.count)
            })
            .collect();
        line.push_str("  ");
        line.push_str(&tallies.join(" "));
    }
    line
}

pub fn render_feed(state: &ChatState, today: Date, offset: UtcOffset) -> String {
    let title = match state.current_room() {
        Some(room) => format!("# {} - {}", room.name, room.description),
        None => format!("# {}", state.current_room_id),
    };
    let messages = feed::current_feed(state);
    if messages.is_empty() {
        return format!("{title}\nno messages yet");
    }
    let mut out = vec![title];
    for group in feed::group_by_date(&messages, today, offset) {
        out.push(format!("-- {} --", group.label));
        out.extend(
            group
                .messages
                .iter()
                .map(|m| render_message(m, &state.current_user.id, offset)),
        );
    }
    out.join("\n")
}

/// Rooms with the most recent activity first, each with its age.
pub fn render_rooms(state: &ChatState, now: OffsetDateTime, offset: UtcOffset) -> String {
    feed::rooms_by_activity(state)
        .into_iter()
        .map(|room| {
            let marker = if room.id == state.current_room_id { '>' } else { ' ' };
            format!(
                "{marker} #{:<14} {:>6}  {:>3} members  {}",
                room.id,
                feed::activity_label(room.last_activity, now, offset),
                room.member_count,
                room.description
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn member_line(user: &User) -> String {
    format!("  {} {} ({})", user.avatar, user.username, user.status.as_str())
}

pub fn render_who(state: &ChatState) -> String {
    let online = feed::online_users(state);
    let offline = feed::offline_users(state);
    let mut out = vec![format!("online ({})", online.len())];
    out.extend(online.into_iter().map(member_line));
    out.push(format!("offline ({})", offline.len()));
    out.extend(offline.into_iter().map(member_line));
    out.push(format!("you are {}", state.current_user.status.as_str()));
    out.join("\n")
}

fn today(offset: UtcOffset) -> Date {
    OffsetDateTime::now_utc().to_offset(offset).date()
}

/// Drive the front end until `/quit`, end of input or Ctrl+C.
pub async fn run(handle: ChatHandle, offset: UtcOffset) -> anyhow::Result<()> {
    // stdin is read on a plain thread so a pending read never holds up shutdown
    let (tx, mut lines) = mpsc::unbounded_channel::<String>();
    std::thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            if tx.send(line).is_err() {
                break;
            }
        }
    });

    let mut added = handle.subscribe(ChatEvent::MESSAGE_ADDED);
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    println!("{}", render_feed(&handle.state(), today(offset), offset));
    println!("type /help for commands");

    loop {
        tokio::select! {
            line = lines.recv() => {
                let Some(line) = line else { break };
                if line.trim().is_empty() {
                    continue;
                }
                match parse_command(&line) {
                    Ok(Command::Quit) => break,
                    Ok(command) => {
                        debug!(?command, "command");
                        let reply = execute(&handle, command, OffsetDateTime::now_utc(), offset);
                        if !reply.is_empty() {
                            println!("{reply}");
                        }
                    }
                    Err(err) => println!("! {err}"),
                }
            }
            Some(ChatEvent::MessageAdded(message)) = added.recv() => {
                let state = handle.state();
                if message.room_id == state.current_room_id {
                    println!("{}", render_message(&message, &state.current_user.id, offset));
                }
            }
            res = &mut ctrl_c => {
                res?;
                break;
            }
        }
    }
    Ok(())
}
