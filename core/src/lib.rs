//! Local host services shared by the lounge front ends: a string key-value
//! store, cancellable interval timers, logging setup and a topic event bus.

pub mod events;
pub mod services;

pub use events::EventBus;
pub use services::storage::{FileStorage, KeyValueStore, MemoryStorage, StorageError};
pub use services::timer::{spawn_interval, IntervalHandle};
