use std::time::{Instant, SystemTime, UNIX_EPOCH};
use tracing::warn;

/// Millisecond time source for motion deltas and wobble phases.
pub(crate) trait Clock {
    fn now_ms(&self) -> f64;
}

/// Wall-clock aligned but monotonic: the Unix time is sampled once and the
/// rest is measured with `Instant`.
pub(crate) struct SystemClock {
    epoch_ms: f64,
    start: Instant,
}

impl SystemClock {
    pub(crate) fn new() -> Self {
        let epoch_ms = match SystemTime::now().duration_since(UNIX_EPOCH) {
            Ok(d) => d.as_secs_f64() * 1000.0,
            Err(e) => {
                warn!(error = %e, "system time is before the unix epoch, phases start at zero");
                0.0
            }
        };
        Self {
            epoch_ms,
            start: Instant::now(),
        }
    }
}

impl Clock for SystemClock {
    fn now_ms(&self) -> f64 {
        self.epoch_ms + self.start.elapsed().as_secs_f64() * 1000.0
    }
}

/// Repeating timer that fires once due and then waits a full period from
/// the firing time.
#[derive(Clone, Debug)]
pub(crate) struct FixedDelay {
    period_ms: f64,
    next_due_ms: f64,
}

impl FixedDelay {
    /// First firing happens one period after `now_ms`.
    pub(crate) fn new(period_ms: f64, now_ms: f64) -> Self {
        Self {
            period_ms,
            next_due_ms: now_ms + period_ms,
        }
    }

    pub(crate) fn poll(&mut self, now_ms: f64) -> bool {
        if now_ms < self.next_due_ms {
            return false;
        }
        self.next_due_ms = now_ms + self.period_ms;
        true
    }
}

#[cfg(test)]
pub(crate) mod manual {
    use super::Clock;
    use std::cell::Cell;

    pub(crate) struct ManualClock {
        now: Cell<f64>,
    }

    impl ManualClock {
        pub(crate) fn at(ms: f64) -> Self {
            Self { now: Cell::new(ms) }
        }

        pub(crate) fn advance(&self, ms: f64) {
            self.now.set(self.now.get() + ms);
        }
    }

    impl Clock for ManualClock {
        fn now_ms(&self) -> f64 {
            self.now.get()
        }
    }
}
