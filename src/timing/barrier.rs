//! Drift-corrected pacing.
//!
//! [`TimeBarrier`] keeps an ideal schedule, the exact sum of every interval it
//! has waited for, and sleeps only for the distance between that schedule and
//! the measured elapsed time. An oversleep on one wait is absorbed by the next
//! one instead of shifting everything after it, so a long song ends on time
//! even though each individual sleep is coarse.

use std::time::{Duration, Instant};

use super::TickLength;

/// Time source and sleep primitive used by [`TimeBarrier`].
pub trait Clock {
    /// Resets the origin that [`Clock::elapsed`] measures from.
    fn restart(&mut self);

    fn elapsed(&self) -> Duration;

    fn sleep(&mut self, duration: Duration);
}

/// Wall clock backed by [`Instant`] and [`std::thread::sleep`].
#[derive(Debug)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn restart(&mut self) {
        self.origin = Instant::now();
    }

    fn elapsed(&self) -> Duration {
        self.origin.elapsed()
    }

    fn sleep(&mut self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Simulated clock. Sleeping advances it by the requested duration plus a
/// fixed overshoot, which models a coarse, late-waking sleep primitive.
#[derive(Debug, Default, Clone)]
pub struct ManualClock {
    now: Duration,
    overshoot: Duration,
    sleeps: Vec<Duration>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_overshoot(overshoot: Duration) -> Self {
        Self {
            overshoot,
            ..Self::default()
        }
    }

    /// Moves time forward without sleeping, e.g. to model slow processing.
    pub fn advance(&mut self, duration: Duration) {
        self.now += duration;
    }

    pub fn now(&self) -> Duration {
        self.now
    }

    /// Every duration passed to [`Clock::sleep`], in call order.
    pub fn sleeps(&self) -> &[Duration] {
        &self.sleeps
    }
}

impl Clock for ManualClock {
    fn restart(&mut self) {
        self.now = Duration::ZERO;
    }

    fn elapsed(&self) -> Duration {
        self.now
    }

    fn sleep(&mut self, duration: Duration) {
        self.sleeps.push(duration);
        self.now += duration + self.overshoot;
    }
}

#[derive(Debug)]
pub struct TimeBarrier<C: Clock> {
    clock: C,
    started: bool,
    interval: TickLength,
    /// Whole nanoseconds of the ideal schedule.
    scheduled: u128,
    /// Sub-nanosecond part of the ideal schedule, in units of
    /// `1 / interval.denominator()` nanoseconds.
    remainder: u64,
}

impl<C: Clock> TimeBarrier<C> {
    pub fn new(clock: C) -> Self {
        Self {
            clock,
            started: false,
            interval: TickLength::from_duration(Duration::from_secs(1)),
            scheduled: 0,
            remainder: 0,
        }
    }

    /// Sets the length of the next wait. Waits already taken are not affected.
    pub fn set_interval(&mut self, interval: impl Into<TickLength>) {
        let interval = interval.into();
        if interval.denominator() != self.interval.denominator() {
            self.remainder = (self.remainder as u128 * interval.denominator() as u128
                / self.interval.denominator() as u128) as u64;
        }
        self.interval = interval;
    }

    pub fn interval(&self) -> TickLength {
        self.interval
    }

    pub fn start(&mut self) {
        if self.started {
            return;
        }
        self.started = true;
        self.scheduled = 0;
        self.remainder = 0;
        self.clock.restart();
    }

    pub fn stop(&mut self) {
        self.started = false;
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    /// Blocks until the end of the next interval on the ideal schedule.
    ///
    /// When the caller is already past that point the sleep is skipped, and the
    /// schedule still advances by the full interval so later waits catch up.
    pub fn wait(&mut self) {
        if !self.started {
            return;
        }
        let denominator = self.interval.denominator() as u128;
        let fraction = self.remainder as u128 + self.interval.numerator() as u128;
        let desired = self.scheduled + fraction / denominator;

        let elapsed = self.clock.elapsed().as_nanos();
        if desired > elapsed {
            self.clock.sleep(nanos_to_duration(desired - elapsed));
        }

        self.scheduled = desired;
        self.remainder = (fraction % denominator) as u64;
    }

    /// Position of the ideal schedule, rounded down to the nanosecond.
    pub fn scheduled(&self) -> Duration {
        nanos_to_duration(self.scheduled)
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn clock_mut(&mut self) -> &mut C {
        &mut self.clock
    }
}

fn nanos_to_duration(nanos: u128) -> Duration {
    const NANOS_PER_SEC: u128 = 1_000_000_000;
    Duration::new(
        (nanos / NANOS_PER_SEC) as u64,
        (nanos % NANOS_PER_SEC) as u32,
    )
}
