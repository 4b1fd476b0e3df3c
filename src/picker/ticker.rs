//! Recurring task bound to an overlay session.
//!
//! Not a thread: the session loop asks how long it may wait and polls the
//! ticker on each turn. A late tick fires once and the schedule restarts from
//! the current instant, so slow ticks run back-to-back without piling up.

use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct Ticker {
    interval: Duration,
    next: Option<Instant>,
}

impl Ticker {
    pub fn new(interval: Duration) -> Self {
        Self { interval, next: None }
    }

    pub fn start(&mut self, now: Instant) {
        self.next = Some(now + self.interval);
    }

    pub fn stop(&mut self) {
        self.next = None;
    }

    pub fn is_running(&self) -> bool {
        self.next.is_some()
    }

    /// Attente maximale avant le prochain tick (`None` si arrêté)
    /// Longest wait before the next tick (`None` when stopped)
    pub fn time_until_due(&self, now: Instant) -> Option<Duration> {
        self.next.map(|next| next.saturating_duration_since(now))
    }

    /// true si un tick est dû; replanifie alors le suivant
    /// true if a tick is due; the next one is then rescheduled
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.next {
            Some(next) if now >= next => {
                let following = next + self.interval;
                self.next = Some(if following > now { following } else { now + self.interval });
                true
            }
            _ => false,
        }
    }
}
