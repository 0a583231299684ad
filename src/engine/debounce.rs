// src/engine/debounce.rs

//! Stale-Reference Debouncer.
//!
//! A burst of stale handles (files created and removed faster than they can
//! be resolved) should surface as one notice, and never ahead of real
//! events that are already queued. The driver asks [`Debouncer::remaining`]
//! how long to wait for new events, waits, and reports back through
//! [`Debouncer::settle`].

use std::time::{Duration, Instant};

/// Whether a stale notice is owed, plus when the last one went out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StaleState {
    Clear { last_notice: Instant },
    Pending { last_notice: Instant },
}

impl StaleState {
    fn last_notice(&self) -> Instant {
        match *self {
            StaleState::Clear { last_notice } | StaleState::Pending { last_notice } => last_notice,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Debouncer {
    window: Duration,
    state: StaleState,
}

impl Debouncer {
    /// The window starts at `now`, so the first notice is also debounced.
    pub fn new(window: Duration, now: Instant) -> Self {
        Self {
            window,
            state: StaleState::Clear { last_notice: now },
        }
    }

    pub fn state(&self) -> StaleState {
        self.state
    }

    pub fn mark_stale(&mut self) {
        self.state = StaleState::Pending {
            last_notice: self.state.last_notice(),
        };
    }

    pub fn is_pending(&self) -> bool {
        matches!(self.state, StaleState::Pending { .. })
    }

    /// Time left in the current window; zero once it has lapsed.
    pub fn remaining(&self, now: Instant) -> Duration {
        let elapsed = now.saturating_duration_since(self.state.last_notice());
        self.window.saturating_sub(elapsed)
    }

    /// Conclude a wait of [`remaining`](Self::remaining). Returns whether the
    /// notice fires now.
    ///
    /// A real event that became ready during the wait suppresses the notice
    /// and leaves it pending for the next iteration.
    pub fn settle(&mut self, now: Instant, event_ready: bool) -> bool {
        match self.state {
            StaleState::Pending { .. } if !event_ready => {
                self.state = StaleState::Clear { last_notice: now };
                true
            }
            _ => false,
        }
    }
}
