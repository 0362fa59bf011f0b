use std::time::Duration;

use tokio::time::Instant;

/// Trailing-edge debounce over a single pending value. At most one payload
/// is held at a time; scheduling while pending supersedes the earlier
/// payload and restarts the countdown, so only the final call in a burst
/// ever fires.
///
/// The machine knows nothing about timers. The owner asks for
/// [deadline](DebounceState::deadline), sleeps however it likes, and calls
/// [tick](DebounceState::tick) with the current instant.
#[derive(Debug)]
pub enum DebounceState<T> {
    Idle,
    Pending { deadline: Instant, payload: T },
}

impl<T> Default for DebounceState<T> {
    fn default() -> Self {
        Self::Idle
    }
}

impl<T> DebounceState<T> {
    pub fn new() -> Self {
        Self::Idle
    }

    /// Records `payload` as the pending value and (re)starts a countdown
    /// of length `quiet_period` from `now`.
    pub fn schedule(&mut self, payload: T, now: Instant, quiet_period: Duration) {
        *self = Self::Pending {
            deadline: now + quiet_period,
            payload,
        };
    }

    /// Clears the machine without firing. Returns the payload that will
    /// now never fire, if one was pending.
    pub fn cancel(&mut self) -> Option<T> {
        match std::mem::take(self) {
            Self::Idle => None,
            Self::Pending { payload, .. } => Some(payload),
        }
    }

    /// Fires if the countdown has run out: yields the pending payload and
    /// returns to idle. A tick before the deadline changes nothing.
    pub fn tick(&mut self, now: Instant) -> Option<T> {
        match self {
            Self::Pending { deadline, .. } if *deadline <= now => self.cancel(),
            _ => None,
        }
    }

    pub fn deadline(&self) -> Option<Instant> {
        match self {
            Self::Idle => None,
            Self::Pending { deadline, .. } => Some(*deadline),
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending { .. })
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tokio::time::Instant;

    use super::DebounceState;

    const QUIET: Duration = Duration::from_secs(2);

    #[tokio::test]
    async fn fires_latest_payload_once() {
        let mut debounce = DebounceState::new();
        let start = Instant::now();

        debounce.schedule("draft A", start, QUIET);
        debounce.schedule("draft A and B", start + Duration::from_millis(500), QUIET);

        // The first countdown was superseded by the second schedule call.
        assert_eq!(debounce.tick(start + QUIET), None);

        let fire_point = start + Duration::from_millis(500) + QUIET;
        assert_eq!(debounce.tick(fire_point), Some("draft A and B"));
        assert_eq!(debounce.tick(fire_point), None);
        assert!(!debounce.is_pending());
    }

    #[tokio::test]
    async fn tick_before_deadline_keeps_pending() {
        let mut debounce = DebounceState::new();
        let start = Instant::now();

        debounce.schedule("draft", start, QUIET);

        assert_eq!(debounce.tick(start + Duration::from_millis(100)), None);
        assert!(debounce.is_pending());
        assert_eq!(debounce.deadline(), Some(start + QUIET));
    }

    #[tokio::test]
    async fn cancel_prevents_firing() {
        let mut debounce = DebounceState::new();
        let start = Instant::now();

        debounce.schedule("draft", start, QUIET);
        assert_eq!(debounce.cancel(), Some("draft"));

        assert_eq!(debounce.tick(start + QUIET), None);
        assert_eq!(debounce.deadline(), None);
    }

    #[tokio::test]
    async fn burst_keeps_only_the_last_snapshot() {
        let mut debounce = DebounceState::new();
        let start = Instant::now();

        for (i, snapshot) in ["s1", "s2", "s3", "s4"].into_iter().enumerate() {
            debounce.schedule(snapshot, start + Duration::from_millis(i as u64 * 10), QUIET);
        }

        let fired = debounce.tick(start + Duration::from_millis(30) + QUIET);
        assert_eq!(fired, Some("s4"));
    }

    #[tokio::test]
    async fn idle_machine_ignores_ticks_and_cancels() {
        let mut debounce = DebounceState::<&str>::new();

        assert_eq!(debounce.tick(Instant::now()), None);
        assert_eq!(debounce.cancel(), None);
        assert_eq!(debounce.deadline(), None);
    }
}
