//! A millisecond countdown timer, the one shape every timeout in this
//! engine (grant, SNDCP, adjacent-site, conventional-registration,
//! collision) is built from.

use std::time::Duration;

/// A countdown timer driven by explicit `tick(ms)` calls rather than wall
/// clock reads, so the whole engine can be driven from one `clock(ms)`
/// pass (spec §5) without touching the system clock.
#[derive(Copy, Clone, Debug, Default)]
pub struct Timer {
    timeout_ms: u64,
    elapsed_ms: u64,
    running: bool,
}

impl Timer {
    pub fn new(timeout: Duration) -> Timer {
        Timer { timeout_ms: timeout.as_millis() as u64, elapsed_ms: 0, running: false }
    }

    /// Start (or restart) the countdown from zero.
    pub fn start(&mut self) {
        self.elapsed_ms = 0;
        self.running = true;
    }

    /// Stop the timer without signalling expiry.
    pub fn stop(&mut self) {
        self.running = false;
        self.elapsed_ms = 0;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Advance the timer by `ms` milliseconds. Returns `true` exactly on
    /// the tick that crosses the timeout (edge-triggered, not level).
    pub fn tick(&mut self, ms: u64) -> bool {
        if !self.running {
            return false;
        }

        let was_expired = self.elapsed_ms >= self.timeout_ms;
        self.elapsed_ms += ms;
        let now_expired = self.elapsed_ms >= self.timeout_ms;

        if now_expired && !was_expired {
            self.running = false;
            return true;
        }

        false
    }

    pub fn remaining(&self) -> Duration {
        Duration::from_millis(self.timeout_ms.saturating_sub(self.elapsed_ms))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_expires_exactly_at_timeout() {
        let mut t = Timer::new(Duration::from_millis(100));
        t.start();
        assert!(!t.tick(60));
        assert!(t.tick(40));
        assert!(!t.is_running());
    }

    #[test]
    fn test_touch_restarts() {
        let mut t = Timer::new(Duration::from_millis(100));
        t.start();
        t.tick(90);
        t.start();
        assert!(!t.tick(90));
    }

    #[test]
    fn test_stopped_timer_never_expires() {
        let mut t = Timer::new(Duration::from_millis(10));
        assert!(!t.tick(100));
    }
}
