// ReportScope - app/debounce.rs
//
// Software debounce for text inputs. The UI calls `call` on every edit and
// `poll` once per frame; only the latest value survives, and it is released
// after `delay` without further edits. Earlier values are superseded, not
// queued. Time is passed in so behaviour is deterministic under test.

use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct Debouncer<T> {
    delay: Duration,
    pending: Option<(T, Instant)>,
}

impl<T> Debouncer<T> {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Schedule `value`, replacing any pending one and restarting the timer.
    pub fn call(&mut self, value: T, now: Instant) {
        self.pending = Some((value, now + self.delay));
    }

    /// Release the pending value once its deadline has passed.
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        match &self.pending {
            Some((_, deadline)) if now >= *deadline => self.pending.take().map(|(v, _)| v),
            _ => None,
        }
    }

    /// Release the pending value immediately, regardless of the deadline.
    pub fn flush(&mut self) -> Option<T> {
        self.pending.take().map(|(v, _)| v)
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Time left before the pending value fires, for scheduling a repaint.
    pub fn remaining(&self, now: Instant) -> Option<Duration> {
        self.pending
            .as_ref()
            .map(|(_, deadline)| deadline.saturating_duration_since(now))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DELAY: Duration = Duration::from_millis(300);

    #[test]
    fn test_fires_once_after_inactivity() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(DELAY);
        debouncer.call("e", start);
        assert_eq!(debouncer.poll(start + Duration::from_millis(299)), None);
        assert_eq!(debouncer.poll(start + DELAY), Some("e"));
        assert_eq!(debouncer.poll(start + DELAY * 2), None);
    }

    #[test]
    fn test_latest_call_supersedes_earlier_ones() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(DELAY);
        debouncer.call("e", start);
        debouncer.call("er", start + Duration::from_millis(200));
        debouncer.call("err", start + Duration::from_millis(400));
        // The first deadline has passed, but the timer was reset.
        assert_eq!(debouncer.poll(start + Duration::from_millis(500)), None);
        assert_eq!(debouncer.poll(start + Duration::from_millis(700)), Some("err"));
        assert!(!debouncer.is_pending());
    }

    #[test]
    fn test_cancel_and_flush() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(DELAY);
        debouncer.call(1, start);
        debouncer.cancel();
        assert_eq!(debouncer.poll(start + DELAY), None);

        debouncer.call(2, start);
        assert_eq!(debouncer.flush(), Some(2));
        assert_eq!(debouncer.flush(), None);
    }

    #[test]
    fn test_remaining_counts_down() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(DELAY);
        assert_eq!(debouncer.remaining(start), None);
        debouncer.call((), start);
        assert_eq!(
            debouncer.remaining(start + Duration::from_millis(100)),
            Some(Duration::from_millis(200))
        );
        assert_eq!(
            debouncer.remaining(start + Duration::from_secs(1)),
            Some(Duration::ZERO)
        );
    }
}
