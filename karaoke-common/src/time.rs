//! Timestamp utilities

use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicU64, Ordering};

/// Get current UTC timestamp
pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// Current UTC time as milliseconds since the Unix epoch
pub fn now_millis() -> u64 {
    // Pre-1970 clocks clamp to zero
    u64::try_from(now().timestamp_millis()).unwrap_or(0)
}

/// Millisecond clock used to stamp queue submissions.
///
/// Readings never repeat and never go backwards within one clock: if the wall
/// clock has not advanced since the previous reading (or stepped back), the
/// previous value plus one is returned instead.
#[derive(Debug, Default)]
pub struct SubmissionClock {
    last: AtomicU64,
}

impl SubmissionClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Next submission timestamp in milliseconds
    pub fn next_millis(&self) -> u64 {
        self.advance(now_millis())
    }

    fn advance(&self, wall: u64) -> u64 {
        let mut current = self.last.load(Ordering::Relaxed);
        loop {
            let candidate = wall.max(current + 1);
            match self.last.compare_exchange_weak(
                current,
                candidate,
                Ordering::AcqRel,
                Ordering::Relaxed,
            ) {
                Ok(_) => return candidate,
                Err(observed) => current = observed,
            }
        }
    }
}
