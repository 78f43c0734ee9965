//! Fade-out tracking for the context menu and modals.
//!
//! A hide finishes when the front end reports the end of its fade
//! animation, or when the grace deadline passes, whichever comes first.
//! The completion fires exactly once; reopening the surface cancels it.

use crate::config;
use std::time::{Duration, Instant};

/// Which signal finished the hide
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    /// The front end reported the fade animation ended
    TransitionEnd,
    /// The notification never came and the deadline forced the hide
    Timeout,
}

/// A pending hide with a forced-completion deadline
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HideTransition {
    deadline: Option<Instant>,
}

impl HideTransition {
    /// Time allowed for the fade animation before the hide is forced
    pub fn grace() -> Duration {
        Duration::from_millis(config::HIDE_ANIMATION_MS + config::HIDE_GRACE_MS)
    }

    /// Arm the timer. Restarting an armed transition moves its deadline.
    pub fn start(&mut self, now: Instant) {
        self.deadline = Some(now + Self::grace());
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// Disarm without completing. Returns whether a hide was pending.
    pub fn cancel(&mut self) -> bool {
        self.deadline.take().is_some()
    }

    /// The fade animation ended
    pub fn transition_end(&mut self) -> Option<Completion> {
        self.deadline.take().map(|_| Completion::TransitionEnd)
    }

    /// Check the deadline
    pub fn poll(&mut self, now: Instant) -> Option<Completion> {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                Some(Completion::Timeout)
            }
            _ => None,
        }
    }
}
