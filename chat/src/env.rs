//! Time and identifier source for state transitions.
//!
//! Transitions that stamp a message need "now" and a fresh id. Taking both
//! from an [`Environment`] keeps the reducer deterministic under test.

use std::sync::atomic::{AtomicU64, Ordering};

use time::{Duration, OffsetDateTime};
use uuid::Uuid;

use crate::timestamp::truncate_to_millis;

pub trait Environment: Send + Sync {
    /// Current wall clock time, millisecond precision.
    fn now(&self) -> OffsetDateTime;

    /// Fresh message id starting with `prefix`.
    fn message_id(&self, prefix: &str) -> String;
}

/// Wall clock plus random ids.
#[derive(Clone, Copy, Default)]
pub struct SystemEnvironment;

impl Environment for SystemEnvironment {
    fn now(&self) -> OffsetDateTime {
        truncate_to_millis(OffsetDateTime::now_utc())
    }

    fn message_id(&self, prefix: &str) -> String {
        let millis = OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000;
        format!("{prefix}-{millis}-{}", Uuid::new_v4().simple())
    }
}

/// Manually driven clock with sequential, zero padded ids.
pub struct ManualEnvironment {
    start: OffsetDateTime,
    offset_ms: AtomicU64,
    next_id: AtomicU64,
}

impl ManualEnvironment {
    pub fn new(start: OffsetDateTime) -> Self {
        Self {
            start: truncate_to_millis(start),
            offset_ms: AtomicU64::new(0),
            next_id: AtomicU64::new(1),
        }
    }

    pub fn advance(&self, by: std::time::Duration) {
        self.offset_ms
            .fetch_add(by.as_millis() as u64, Ordering::SeqCst);
    }
}

impl Environment for ManualEnvironment {
    fn now(&self) -> OffsetDateTime {
        self.start + Duration::milliseconds(self.offset_ms.load(Ordering::SeqCst) as i64)
    }

    fn message_id(&self, prefix: &str) -> String {
        format!("{prefix}-{:04}", self.next_id.fetch_add(1, Ordering::SeqCst))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn manual_clock_advances() {
        let env = ManualEnvironment::new(datetime!(2024-03-01 10:00 UTC));
        env.advance(std::time::Duration::from_secs(90));
        assert_eq!(env.now(), datetime!(2024-03-01 10:01:30 UTC));
        assert_eq!(env.message_id("msg"), "msg-0001");
        assert_eq!(env.message_id("msg"), "msg-0002");
    }

    #[test]
    fn system_ids_are_unique() {
        let env = SystemEnvironment;
        let a = env.message_id("msg");
        let b = env.message_id("msg");
        assert!(a.starts_with("msg-"));
        assert_ne!(a, b);
        assert_eq!(env.now().nanosecond() % 1_000_000, 0);
    }
}
