//!
//! Fixed-rate cycle scheduler: tracks the next period boundary and sleeps out
//! the remainder of each cycle, surfacing overruns instead of silently
//! stretching the effective sample period.
//!

use defmt::Format;

use motion_control::ConfigError;

use crate::clock::{MICROS_PER_SECOND, MonotonicClock};

#[derive(Format, Debug, Clone, Copy, PartialEq, Eq)]
/// How one control cycle fit into its period budget
pub enum CycleOutcome {
    /// The cycle body finished early; the scheduler slept out the remaining
    /// `slack_micros`
    OnTime {
        /// Time left in the period when the cycle body finished (us)
        slack_micros: u64,
    },
    /// The cycle body ran `late_micros` past its deadline.  The next deadline
    /// is realigned to the period grid, so the overrun is reported here rather
    /// than absorbed into a stretched sample period.
    Overrun {
        /// Time past the deadline when the cycle body finished (us)
        late_micros: u64,
    },
}

#[derive(Format, Debug, Clone, Copy, PartialEq, Eq)]
/// Enforces a fixed control period by tracking the next deadline explicitly
pub struct CycleScheduler {
    /// The control period (us)
    period_micros: u64,
    /// The deadline the current cycle must finish by (us)
    next_deadline_micros: u64,
}

impl CycleScheduler {
    /// Create a scheduler running at `frequency` hz, starting its first period
    /// now
    pub fn new(frequency: f32, clock: &impl MonotonicClock) -> Result<Self, ConfigError> {
        if frequency <= 0.0 {
            return Err(ConfigError::NonPositiveFrequency);
        }

        let period_micros = (MICROS_PER_SECOND as f32 / frequency) as u64;
        if period_micros == 0 {
            return Err(ConfigError::NonPositiveFrequency);
        }

        Ok(Self {
            period_micros,
            next_deadline_micros: clock.now_micros() + period_micros,
        })
    }

    /// The enforced control period (s), which is also the sample period the
    /// controllers must be configured with
    pub fn period_seconds(&self) -> f32 {
        self.period_micros as f32 / MICROS_PER_SECOND as f32
    }

    /// Block until the next period boundary and arm the one after it.
    ///
    /// If the cycle body already ran past its deadline there is nothing left
    /// to sleep out: the deadline advances by whole periods past the missed
    /// boundary (keeping the cycle cadence aligned) and the overrun is
    /// reported to the caller.
    pub fn sleep(&mut self, clock: &impl MonotonicClock) -> CycleOutcome {
        let now = clock.now_micros();

        if now > self.next_deadline_micros {
            let late_micros = now - self.next_deadline_micros;
            let missed_periods = late_micros / self.period_micros + 1;
            self.next_deadline_micros += missed_periods * self.period_micros;
            return CycleOutcome::Overrun { late_micros };
        }

        let slack_micros = self.next_deadline_micros - now;
        while clock.now_micros() < self.next_deadline_micros {}
        self.next_deadline_micros += self.period_micros;

        CycleOutcome::OnTime { slack_micros }
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use std::cell::Cell;

    use super::*;

    /// A clock that ticks forward one microsecond on every read, so the spin
    /// wait in `sleep` always terminates.  Tests jump it with `set`.
    struct SteppingClock {
        now: Cell<u64>,
    }

    impl SteppingClock {
        fn new() -> Self {
            Self { now: Cell::new(0) }
        }

        fn set(&self, micros: u64) {
            self.now.set(micros);
        }
    }

    impl MonotonicClock for SteppingClock {
        fn now_micros(&self) -> u64 {
            let now = self.now.get();
            self.now.set(now + 1);
            now
        }
    }

    #[test]
    fn test_period_from_frequency() {
        let clock = SteppingClock::new();
        let scheduler = CycleScheduler::new(100.0, &clock).unwrap();
        assert_eq!(scheduler.period_seconds(), 0.01);
    }

    #[test]
    fn test_on_time_cycle_reports_slack() {
        let clock = SteppingClock::new();
        let mut scheduler = CycleScheduler::new(100.0, &clock).unwrap();

        // The cycle body consumed 2ms of the 10ms budget
        clock.set(2_000);

        match scheduler.sleep(&clock) {
            CycleOutcome::OnTime { slack_micros } => assert_eq!(slack_micros, 8_000),
            outcome => panic!("expected an on-time cycle, got {outcome:?}"),
        }
    }

    #[test]
    fn test_sleep_blocks_until_the_deadline() {
        let clock = SteppingClock::new();
        let mut scheduler = CycleScheduler::new(100.0, &clock).unwrap();

        scheduler.sleep(&clock);

        // The spin wait must not return before the first deadline
        assert!(clock.now.get() >= 10_000);
    }

    #[test]
    fn test_overrun_is_reported_not_absorbed() {
        let clock = SteppingClock::new();
        let mut scheduler = CycleScheduler::new(100.0, &clock).unwrap();

        // The cycle body blew through the deadline by 5ms
        clock.set(15_000);

        match scheduler.sleep(&clock) {
            CycleOutcome::Overrun { late_micros } => assert_eq!(late_micros, 5_000),
            outcome => panic!("expected an overrun, got {outcome:?}"),
        }
    }

    #[test]
    fn test_overrun_realigns_to_the_period_grid() {
        let clock = SteppingClock::new();
        let mut scheduler = CycleScheduler::new(100.0, &clock).unwrap();

        // Miss two whole deadlines; the scheduler should skip to the next
        // boundary on the original grid (30ms)
        clock.set(25_000);
        scheduler.sleep(&clock);

        assert_eq!(scheduler.next_deadline_micros, 30_000);

        // A quick cycle after the overrun is on time again
        clock.set(26_000);
        assert!(matches!(
            scheduler.sleep(&clock),
            CycleOutcome::OnTime { .. }
        ));
    }

    #[test]
    fn test_non_positive_frequency_rejected() {
        let clock = SteppingClock::new();
        assert_eq!(
            CycleScheduler::new(0.0, &clock).err(),
            Some(ConfigError::NonPositiveFrequency)
        );
        assert_eq!(
            CycleScheduler::new(-50.0, &clock).err(),
            Some(ConfigError::NonPositiveFrequency)
        );
    }
}
