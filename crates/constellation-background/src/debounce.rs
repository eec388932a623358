//! Coalescing of bursty notifications.

use std::time::{Duration, Instant};

/// Holds the latest value of a burst until no new value has arrived for
/// `delay`.
#[derive(Debug, Clone)]
pub struct Debouncer<T> {
    delay: Duration,
    pending: Option<(T, Instant)>,
}

impl<T> Debouncer<T> {
    /// Create an idle debouncer.
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    /// Record a new value, restarting the quiet period.
    pub fn trigger(&mut self, value: T, now: Instant) {
        self.pending = Some((value, now + self.delay));
    }

    /// Take the pending value once its quiet period has elapsed.
    pub fn fire(&mut self, now: Instant) -> Option<T> {
        if self.deadline().is_some_and(|deadline| now >= deadline) {
            self.pending.take().map(|(value, _)| value)
        } else {
            None
        }
    }

    /// Drop any pending value.
    pub fn cancel(&mut self) {
        self.pending = None;
    }

    /// When the pending value becomes due.
    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|(_, deadline)| *deadline)
    }

    /// Whether a value is waiting for its quiet period.
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DELAY: Duration = Duration::from_millis(200);

    #[test]
    fn test_burst_fires_once_with_latest_value() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(DELAY);
        for i in 0..10u64 {
            debouncer.trigger(i, start + Duration::from_millis(i * 10));
        }

        // Quiet period restarts on each trigger.
        assert_eq!(debouncer.fire(start + Duration::from_millis(250)), None);
        assert_eq!(debouncer.fire(start + Duration::from_millis(290)), Some(9));
        assert_eq!(debouncer.fire(start + Duration::from_secs(5)), None);
    }

    #[test]
    fn test_cancel_drops_pending() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(DELAY);
        debouncer.trigger("resize", start);
        assert!(debouncer.is_pending());
        assert_eq!(debouncer.deadline(), Some(start + DELAY));

        debouncer.cancel();
        assert!(!debouncer.is_pending());
        assert_eq!(debouncer.fire(start + DELAY), None);
    }

    #[test]
    fn test_fires_exactly_at_deadline() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(DELAY);
        debouncer.trigger(1, start);
        assert_eq!(debouncer.fire(start + DELAY - Duration::from_millis(1)), None);
        assert_eq!(debouncer.fire(start + DELAY), Some(1));
    }
}
