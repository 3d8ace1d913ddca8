//!
//! Quadrature decoding: maintains an exact relative position count per wheel
//! from the two out-of-phase encoder channels, resolving every valid edge on
//! either channel for 4x resolution.
//!
//! new	new	old	old
//!	B	A	B	A	Result
//!	----	----	----	----	------
//!	0	0	0	0	no movement
//!	0	0	0	1	+1
//!	0	0	1	0	-1
//!	0	0	1	1	skipped (both channels changed)
//!	0	1	0	0	-1
//!	0	1	0	1	no movement
//!	0	1	1	0	skipped (both channels changed)
//!	0	1	1	1	+1
//!	1	0	0	0	+1
//!	1	0	0	1	skipped (both channels changed)
//!	1	0	1	0	no movement
//!	1	0	1	1	-1
//!	1	1	0	0	skipped (both channels changed)
//!	1	1	0	1	-1
//!	1	1	1	0	+1
//!	1	1	1	1	no movement
//!
//! A transition that leaves both channels unchanged (a repeat notification or
//! contact bounce) and a transition where both channels changed at once are
//! skipped counts, not errors: a missed edge degrades position accuracy by a
//! bounded amount and nothing more.
//!

use core::fmt::Debug;

use defmt::Format;

use embedded_hal::digital::v2::InputPin;

use portable_atomic::{AtomicI32, Ordering};

/// A wheel's accumulated count.  Written exclusively by that wheel's edge
/// handler and read atomically by the fixed-rate control cycle, so no
/// read-modify-write races exist on the value itself.
pub struct EncoderCount(AtomicI32);

impl EncoderCount {
    /// Create a new zeroed count, usable in a `static`
    pub const fn new() -> Self {
        Self(AtomicI32::new(0))
    }

    /// Adjust the count from the edge-handler context
    pub fn add(&self, delta: i32) {
        self.0.fetch_add(delta, Ordering::Relaxed);
    }

    /// Read the current count from the cycle context
    pub fn read(&self) -> i32 {
        self.0.load(Ordering::Relaxed)
    }

    /// Zero the count
    pub fn reset(&self) {
        self.0.store(0, Ordering::Relaxed);
    }
}

impl Default for EncoderCount {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Format, Debug, Clone, Copy, PartialEq, Eq)]
/// Channel wiring convention for a wheel's encoder.  With the two wheels
/// mounted facing each other, one wheel's channels are mirror-wired relative
/// to the other, so its decode direction is inverted to keep forward motion
/// counting positive on both wheels.
pub enum Polarity {
    /// Count transitions as decoded
    Normal,
    /// Invert the decoded direction
    Mirrored,
}

impl Polarity {
    fn apply(self, step: i32) -> i32 {
        match self {
            Self::Normal => step,
            Self::Mirrored => -step,
        }
    }
}

/// Classify one quadrature transition from the last-observed channel levels to
/// the newly-read levels, returning the count adjustment.
pub fn quadrature_step(last_a: bool, last_b: bool, a: bool, b: bool) -> i32 {
    match (b, a, last_b, last_a) {
        (false, false, false, true)
        | (false, true, true, true)
        | (true, false, false, false)
        | (true, true, true, false) => 1,
        (false, false, true, false)
        | (false, true, false, false)
        | (true, false, true, true)
        | (true, true, false, true) => -1,
        // same state, or both channels changed at once
        _ => 0,
    }
}

/// Event-driven decoder for one wheel.  [`QuadratureDecoder::on_edge`] is the
/// body of the edge interrupt handler for both of the wheel's channels; it
/// mutates only this wheel's last-observed levels and shared count.
pub struct QuadratureDecoder<'a, A, B> {
    /// The last observed channel A level
    last_a: bool,
    /// The last observed channel B level
    last_b: bool,
    /// This wheel's wiring convention
    polarity: Polarity,
    /// The count shared with the control cycle
    count: &'a EncoderCount,

    /// The channel A input
    channel_a: A,
    /// The channel B input
    channel_b: B,
}

impl<'a, A, B, GPIOE> QuadratureDecoder<'a, A, B>
where
    A: InputPin<Error = GPIOE>,
    B: InputPin<Error = GPIOE>,
    GPIOE: Debug,
{
    /// Create a new decoder, sampling the initial channel levels
    pub fn new(
        channel_a: A,
        channel_b: B,
        polarity: Polarity,
        count: &'a EncoderCount,
    ) -> Result<Self, GPIOE> {
        let last_a = channel_a.is_high()?;
        let last_b = channel_b.is_high()?;

        Ok(Self {
            last_a,
            last_b,
            polarity,
            count,
            channel_a,
            channel_b,
        })
    }

    /// Handle an edge notification on either channel: read both levels,
    /// classify the transition, and adjust this wheel's count
    pub fn on_edge(&mut self) -> Result<(), GPIOE> {
        let a = self.channel_a.is_high()?;
        let b = self.channel_b.is_high()?;

        let step = quadrature_step(self.last_a, self.last_b, a, b);
        if step != 0 {
            self.count.add(self.polarity.apply(step));
        }

        self.last_a = a;
        self.last_b = b;

        Ok(())
    }
}
