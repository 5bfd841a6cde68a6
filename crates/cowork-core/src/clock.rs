//! Strictly increasing wall-clock timestamps.
//!
//! Two notifications dispatched in the same millisecond must still be
//! distinguishable, and an update stamp must land after the stamp it replaces.
//! `MonotonicClock` hands out millisecond timestamps that never repeat and never
//! go backwards for a given clock instance, even if the system clock does.

use std::sync::atomic::{AtomicI64, Ordering};

use chrono::{DateTime, Utc};

/// A millisecond clock that never returns the same value twice.
#[derive(Debug, Default)]
pub struct MonotonicClock {
    last_millis: AtomicI64,
}

impl MonotonicClock {
    /// Create a new clock.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            last_millis: AtomicI64::new(0),
        }
    }

    /// Next timestamp in milliseconds since the Unix epoch.
    pub fn now_millis(&self) -> i64 {
        self.advance(Utc::now().timestamp_millis())
    }

    /// Next timestamp that is also strictly after `floor`.
    pub fn now_after(&self, floor: DateTime<Utc>) -> DateTime<Utc> {
        let wall = Utc::now().timestamp_millis();
        let millis = self.advance(wall.max(floor.timestamp_millis().saturating_add(1)));
        to_datetime(millis)
    }

    /// Next timestamp as a `DateTime`.
    pub fn now(&self) -> DateTime<Utc> {
        to_datetime(self.now_millis())
    }

    fn advance(&self, candidate: i64) -> i64 {
        let mut next = candidate;
        // fetch_update only fails when the closure returns None, which it never does.
        let _ = self
            .last_millis
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| {
                next = candidate.max(last.saturating_add(1));
                Some(next)
            });
        next
    }
}

fn to_datetime(millis: i64) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(millis).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn millis_strictly_increase() {
        let clock = MonotonicClock::new();
        let mut prev = clock.now_millis();
        for _ in 0..1000 {
            let next = clock.now_millis();
            assert!(next > prev);
            prev = next;
        }
    }

    #[test]
    fn now_after_respects_future_floor() {
        let clock = MonotonicClock::new();
        let floor = Utc::now() + Duration::hours(1);
        let stamp = clock.now_after(floor);
        assert!(stamp > floor);

        // The clock keeps moving forward from the bumped value.
        assert!(clock.now() > stamp);
    }

    #[test]
    fn now_after_past_floor_uses_wall_clock() {
        let clock = MonotonicClock::new();
        let floor = Utc::now() - Duration::days(1);
        let before = Utc::now();
        let stamp = clock.now_after(floor);
        assert!(stamp >= before - Duration::milliseconds(1));
    }
}
