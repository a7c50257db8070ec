use std::time::Duration;

/// Leading-edge throttle with a trailing flush. The caller supplies the
/// clock, so the same utility works on real or virtual time.
#[derive(Debug, Clone)]
pub struct Throttle {
    interval: Duration,
    last_fired: Option<Duration>,
    pending: bool,
}

impl Throttle {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_fired: None,
            pending: false,
        }
    }

    fn window_open(&self, now: Duration) -> bool {
        match self.last_fired {
            None => true,
            Some(last) => now.saturating_sub(last) >= self.interval,
        }
    }

    /// Ask to fire now. Returns true when the caller should act; otherwise
    /// the request is remembered for `poll`.
    pub fn request(&mut self, now: Duration) -> bool {
        if self.window_open(now) {
            self.last_fired = Some(now);
            self.pending = false;
            true
        } else {
            self.pending = true;
            false
        }
    }

    /// Fire a remembered request once its window has opened.
    pub fn poll(&mut self, now: Duration) -> bool {
        if self.pending && self.window_open(now) {
            self.last_fired = Some(now);
            self.pending = false;
            return true;
        }
        false
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    #[test]
    fn test_first_request_fires_immediately() {
        let mut throttle = Throttle::new(ms(2_000));
        assert!(throttle.request(ms(0)));
        assert!(!throttle.is_pending());
    }

    #[test]
    fn test_burst_collapses_into_one_trailing_fire() {
        let mut throttle = Throttle::new(ms(2_000));
        assert!(throttle.request(ms(0)));
        assert!(!throttle.request(ms(100)));
        assert!(!throttle.request(ms(900)));
        assert!(!throttle.poll(ms(1_999)));
        assert!(throttle.poll(ms(2_000)));
        assert!(!throttle.poll(ms(2_001)), "trailing fire happens once");
    }

    #[test]
    fn test_poll_without_request_never_fires() {
        let mut throttle = Throttle::new(ms(500));
        assert!(!throttle.poll(ms(10_000)));
    }

    #[test]
    fn test_request_after_window_fires_again() {
        let mut throttle = Throttle::new(ms(500));
        assert!(throttle.request(ms(0)));
        assert!(throttle.request(ms(600)));
    }
}
