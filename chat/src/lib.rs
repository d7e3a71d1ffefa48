//! Chat lounge: a single user chat client whose state lives in an in-process
//! store. Messages survive restarts through a local key-value store, and a
//! presence simulator keeps the other members talking.

pub mod action;
pub mod compose;
pub mod config;
pub mod console;
pub mod env;
pub mod feed;
pub mod model;
pub mod persistence;
pub mod presence;
pub mod reducer;
pub mod seed;
pub mod session;
pub mod store;
pub mod timestamp;

pub use action::{Action, ChatEvent, Effect};
pub use env::{Environment, ManualEnvironment, SystemEnvironment};
pub use model::{ChatMessage, ChatRoom, ChatState, Reaction, User, UserStatus};
pub use presence::{PresenceConfig, PresenceSimulator};
pub use reducer::{reduce, Transition};
pub use session::{ChatHandle, Dispatch, Session, SessionOptions};
pub use store::Store;
