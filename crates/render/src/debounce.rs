//! Cancellable one-shot timer driven by the frame loop
//!
//! Nothing runs in the background: the owner passes the current instant to
//! [`Debounce::arm`] and [`Debounce::poll`], and the timer fires from inside
//! `poll` at most once per arming.

use std::time::{Duration, Instant};

use tracing::trace;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Debounce {
    delay: Duration,
    deadline: Option<Instant>,
}

impl Debounce {
    #[must_use]
    pub const fn new(delay: Duration) -> Self {
        Self { delay, deadline: None }
    }

    #[must_use]
    pub const fn delay(&self) -> Duration {
        self.delay
    }

    /// Cancel any pending deadline and schedule a new one `delay` after `now`.
    pub fn arm(&mut self, now: Instant) {
        self.deadline = Some(now + self.delay);
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    #[must_use]
    pub const fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    /// Returns `true` exactly once when the deadline has passed.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                trace!("debounce fired");
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DELAY: Duration = Duration::from_millis(200);

    #[test]
    fn fires_once_after_quiet_period() {
        let t0 = Instant::now();
        let mut d = Debounce::new(DELAY);
        d.arm(t0);
        assert!(!d.poll(t0 + Duration::from_millis(199)));
        assert!(d.poll(t0 + DELAY));
        assert!(!d.poll(t0 + Duration::from_secs(5)));
        assert!(!d.is_armed());
    }

    #[test]
    fn rearming_pushes_the_deadline_back() {
        let t0 = Instant::now();
        let mut d = Debounce::new(DELAY);
        d.arm(t0);
        d.arm(t0 + Duration::from_millis(150));
        assert!(!d.poll(t0 + Duration::from_millis(250)));
        assert!(d.poll(t0 + Duration::from_millis(350)));
    }

    #[test]
    fn cancel_prevents_firing() {
        let t0 = Instant::now();
        let mut d = Debounce::new(DELAY);
        d.arm(t0);
        d.cancel();
        assert!(!d.poll(t0 + Duration::from_secs(1)));
    }
}
