//!
//! Monotonic time seam for the control loop
//!

/// Microseconds per second
pub const MICROS_PER_SECOND: u64 = 1_000_000;

/// A process-wide monotonic time source, initialized once at startup by the
/// board layer (e.g. bound to a hardware timer peripheral).  The scheduler is
/// the only consumer.
pub trait MonotonicClock {
    /// Microseconds elapsed since the clock was started
    fn now_micros(&self) -> u64;
}
