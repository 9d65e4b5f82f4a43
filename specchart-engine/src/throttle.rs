//! Rate limiting for host events about continuously changing values.

/// Lets a value through at most once per interval and remembers the latest
/// suppressed value so it can be delivered later.
#[derive(Debug, Clone, PartialEq)]
pub struct Throttle<T> {
    interval_ms: f64,
    last_emit_ms: Option<f64>,
    pending: Option<T>,
}

impl<T> Throttle<T> {
    #[must_use]
    pub fn new(interval_ms: f64) -> Self {
        Self {
            interval_ms,
            last_emit_ms: None,
            pending: None,
        }
    }

    fn is_due(&self, now_ms: f64) -> bool {
        !matches!(self.last_emit_ms, Some(last) if now_ms - last < self.interval_ms)
    }

    /// Offers a new value at `now_ms`.
    ///
    /// Returns it when the interval since the last emission has elapsed;
    /// otherwise keeps it as pending and returns `None`.
    pub fn offer(&mut self, value: T, now_ms: f64) -> Option<T> {
        if self.is_due(now_ms) {
            self.last_emit_ms = Some(now_ms);
            self.pending = None;
            Some(value)
        } else {
            self.pending = Some(value);
            None
        }
    }

    /// Releases the pending value once the interval has elapsed.
    pub fn poll(&mut self, now_ms: f64) -> Option<T> {
        if self.is_due(now_ms) && self.pending.is_some() {
            self.last_emit_ms = Some(now_ms);
            self.pending.take()
        } else {
            None
        }
    }

    /// Whether anything was emitted since the throttle was created.
    #[must_use]
    pub fn has_emitted(&self) -> bool {
        self.last_emit_ms.is_some()
    }

    /// Drops the pending value without emitting it.
    pub fn discard(&mut self) -> Option<T> {
        self.pending.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_value_passes_then_throttles() {
        let mut t = Throttle::new(500.0);
        assert_eq!(t.offer(1, 0.0), Some(1));
        assert_eq!(t.offer(2, 100.0), None);
        assert_eq!(t.offer(3, 200.0), None);
        assert_eq!(t.poll(300.0), None);
        assert_eq!(t.poll(600.0), Some(3));
        assert_eq!(t.poll(700.0), None);
        assert_eq!(t.offer(4, 1200.0), Some(4));
    }

    #[test]
    fn test_discard_drops_pending() {
        let mut t = Throttle::new(500.0);
        assert!(!t.has_emitted());
        t.offer(1, 0.0);
        t.offer(2, 10.0);
        assert_eq!(t.discard(), Some(2));
        assert_eq!(t.poll(1000.0), None);
        assert!(t.has_emitted());
    }
}
