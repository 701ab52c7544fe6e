//! Debounced autosave policy.
//!
//! The scheduler only tracks time; it never performs I/O. Callers pass the
//! current instant in, which keeps it testable against a paused tokio clock.

use std::time::Duration;

use tokio::time::Instant;

/// Quiescence window after the last edit before an autosave fires.
pub const DEFAULT_AUTOSAVE_DEBOUNCE: Duration = Duration::from_secs(10);

/// Scheduler state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutosaveState {
    /// No save pending.
    Idle,
    /// A save fires once `deadline` is reached.
    Armed {
        /// Instant at which the save becomes due.
        deadline: Instant,
    },
}

/// Reset-on-activity autosave timer.
#[derive(Debug, Clone)]
pub struct AutosaveScheduler {
    debounce: Duration,
    state: AutosaveState,
}

impl AutosaveScheduler {
    /// Creates an idle scheduler.
    #[must_use]
    pub fn new(debounce: Duration) -> Self {
        Self {
            debounce,
            state: AutosaveState::Idle,
        }
    }

    /// Arms, or re-arms, the timer for `now + debounce` and returns the deadline.
    pub fn arm(&mut self, now: Instant) -> Instant {
        let deadline = now + self.debounce;
        self.state = AutosaveState::Armed { deadline };
        deadline
    }

    /// Drops a pending timer. Returns whether one was pending.
    pub fn cancel(&mut self) -> bool {
        let was_armed = self.is_armed();
        self.state = AutosaveState::Idle;
        was_armed
    }

    /// Returns `true` once when armed and `now` has reached the deadline,
    /// moving back to idle.
    pub fn fire(&mut self, now: Instant) -> bool {
        match self.state {
            AutosaveState::Armed { deadline } if now >= deadline => {
                self.state = AutosaveState::Idle;
                true
            }
            _ => false,
        }
    }

    /// Returns the pending deadline.
    #[must_use]
    pub fn deadline(&self) -> Option<Instant> {
        match self.state {
            AutosaveState::Armed { deadline } => Some(deadline),
            AutosaveState::Idle => None,
        }
    }

    /// Returns whether a save is pending.
    #[must_use]
    pub fn is_armed(&self) -> bool {
        matches!(self.state, AutosaveState::Armed { .. })
    }

    /// Returns current state.
    #[must_use]
    pub fn state(&self) -> AutosaveState {
        self.state
    }

    /// Returns the configured quiescence window.
    #[must_use]
    pub fn debounce(&self) -> Duration {
        self.debounce
    }
}

impl Default for AutosaveScheduler {
    fn default() -> Self {
        Self::new(DEFAULT_AUTOSAVE_DEBOUNCE)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tokio::time::Instant;

    use super::{AutosaveScheduler, AutosaveState};

    #[test]
    fn starts_idle_and_never_fires() {
        let mut scheduler = AutosaveScheduler::default();
        let now = Instant::now();

        assert_eq!(scheduler.state(), AutosaveState::Idle);
        assert!(!scheduler.fire(now + Duration::from_secs(60)));
    }

    #[test]
    fn fires_once_after_deadline() {
        let mut scheduler = AutosaveScheduler::default();
        let start = Instant::now();
        scheduler.arm(start);

        assert!(!scheduler.fire(start + Duration::from_millis(9_999)));
        assert!(scheduler.fire(start + Duration::from_secs(10)));
        assert!(!scheduler.fire(start + Duration::from_secs(11)));
        assert_eq!(scheduler.state(), AutosaveState::Idle);
    }

    #[test]
    fn every_arm_pushes_the_deadline_back() {
        let mut scheduler = AutosaveScheduler::default();
        let start = Instant::now();

        let mut fired = 0;
        for second in 0..5 {
            scheduler.arm(start + Duration::from_secs(second));
            if scheduler.fire(start + Duration::from_secs(second) + Duration::from_millis(999)) {
                fired += 1;
            }
        }
        for tick in 5..=14 {
            if scheduler.fire(start + Duration::from_secs(tick)) {
                fired += 1;
                assert_eq!(tick, 14);
            }
        }

        assert_eq!(fired, 1);
    }

    #[test]
    fn cancel_discards_pending_timer() {
        let mut scheduler = AutosaveScheduler::new(Duration::from_secs(3));
        let start = Instant::now();
        scheduler.arm(start);

        assert!(scheduler.cancel());
        assert!(!scheduler.cancel());
        assert!(!scheduler.fire(start + Duration::from_secs(3)));
    }
}
