//! Outage guard — stop hammering a backend that is clearly down.
//!
//! After a run of consecutive failures the guard opens and refuses requests
//! for a cooldown window. Once the window lapses, a single probe request is
//! allowed through (half-open); its outcome decides whether the guard
//! closes again or the window restarts.

use std::sync::Mutex;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GuardState {
    /// Normal operation; tracks the current failure run.
    Closed { consecutive_failures: u32 },
    /// Refusing requests until the cooldown lapses.
    Open { since: Instant },
    /// One probe request is in flight.
    HalfOpen,
}

/// Consecutive-failure guard with a half-open probe.
#[derive(Debug)]
pub struct OutageGuard {
    state: Mutex<GuardState>,
    threshold: u32,
    cooldown: Duration,
}

impl OutageGuard {
    pub fn new(threshold: u32, cooldown: Duration) -> Self {
        Self {
            state: Mutex::new(GuardState::Closed {
                consecutive_failures: 0,
            }),
            threshold,
            cooldown,
        }
    }

    /// Default guard for the filings backend: open after 3 consecutive
    /// failures, probe again after 60 seconds.
    pub fn default_backend() -> Self {
        Self::new(3, Duration::from_secs(60))
    }

    /// Ask permission to send a request. While open, only the first caller
    /// after the cooldown lapses gets through (as the probe).
    pub fn try_acquire(&self) -> bool {
        let mut state = self.state.lock().unwrap();
        match *state {
            GuardState::Closed { .. } => true,
            GuardState::Open { since } if since.elapsed() >= self.cooldown => {
                *state = GuardState::HalfOpen;
                true
            }
            GuardState::Open { .. } | GuardState::HalfOpen => false,
        }
    }

    /// A request completed — the guard closes and the failure run resets.
    pub fn record_success(&self) {
        *self.state.lock().unwrap() = GuardState::Closed {
            consecutive_failures: 0,
        };
    }

    /// A request failed. Reaching the threshold (or failing the half-open
    /// probe) opens the guard.
    pub fn record_failure(&self) {
        let mut state = self.state.lock().unwrap();
        *state = match *state {
            GuardState::Closed {
                consecutive_failures,
            } if consecutive_failures + 1 >= self.threshold => GuardState::Open {
                since: Instant::now(),
            },
            GuardState::Closed {
                consecutive_failures,
            } => GuardState::Closed {
                consecutive_failures: consecutive_failures + 1,
            },
            GuardState::HalfOpen => GuardState::Open {
                since: Instant::now(),
            },
            open @ GuardState::Open { .. } => open,
        };
    }

    pub fn is_open(&self) -> bool {
        matches!(*self.state.lock().unwrap(), GuardState::Open { .. })
    }

    /// Remaining cooldown time (zero unless open).
    pub fn remaining_cooldown(&self) -> Duration {
        match *self.state.lock().unwrap() {
            GuardState::Open { since } => self.cooldown.saturating_sub(since.elapsed()),
            _ => Duration::ZERO,
        }
    }
}
