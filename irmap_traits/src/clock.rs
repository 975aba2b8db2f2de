use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread;
use std::time::{Duration, Instant};

/// Time source used to space successive sensor readings.
///
/// Real rigs sleep between analog reads so the sensor output can change;
/// simulated rigs only pretend to.
pub trait Clock {
    fn now(&self) -> Instant;
    fn sleep(&self, d: Duration);

    /// Milliseconds elapsed since `epoch`, saturating at 0 on underflow.
    fn ms_since(&self, epoch: Instant) -> u64 {
        let dur = self.now().saturating_duration_since(epoch);
        u64::try_from(dur.as_millis()).unwrap_or(u64::MAX)
    }
}

/// Wall-clock implementation backed by `std::time::Instant`.
#[derive(Debug, Default, Clone, Copy)]
pub struct MonotonicClock;

impl MonotonicClock {
    #[inline]
    pub fn new() -> Self {
        Self
    }
}

impl Clock for MonotonicClock {
    #[inline]
    fn now(&self) -> Instant {
        Instant::now()
    }

    #[inline]
    fn sleep(&self, d: Duration) {
        if d.is_zero() {
            return;
        }
        thread::sleep(d);
    }
}

/// Virtual clock: `sleep` advances an internal offset instead of blocking.
///
/// Clones share the same timeline, so a test can hand one copy to a sensor
/// and inspect how much time the sensor believed it spent.
#[derive(Debug, Clone)]
pub struct SimClock {
    origin: Instant,
    elapsed_us: Arc<AtomicU64>,
}

impl Default for SimClock {
    fn default() -> Self {
        Self::new()
    }
}

impl SimClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            elapsed_us: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Total virtual time slept so far.
    pub fn elapsed(&self) -> Duration {
        Duration::from_micros(self.elapsed_us.load(Ordering::Relaxed))
    }
}

impl Clock for SimClock {
    fn now(&self) -> Instant {
        self.origin + self.elapsed()
    }

    fn sleep(&self, d: Duration) {
        let us = u64::try_from(d.as_micros()).unwrap_or(u64::MAX);
        self.elapsed_us.fetch_add(us, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_sleep_returns_immediately() {
        let clock = MonotonicClock::new();
        let start = clock.now();
        clock.sleep(Duration::ZERO);
        assert!(clock.ms_since(start) < 50);
    }

    #[test]
    fn sim_clock_advances_without_blocking() {
        let clock = SimClock::new();
        let shared = clock.clone();
        let start = clock.now();
        shared.sleep(Duration::from_millis(750));
        assert_eq!(clock.elapsed(), Duration::from_millis(750));
        assert_eq!(clock.ms_since(start), 750);
    }

    #[test]
    fn ms_since_future_epoch_saturates() {
        let clock = SimClock::new();
        let future = clock.now() + Duration::from_secs(5);
        assert_eq!(clock.ms_since(future), 0);
    }
}
