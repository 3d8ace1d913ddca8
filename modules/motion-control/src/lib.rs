//!
//! Motion control algorithms for the differential-drive robot: wheel odometry,
//! unicycle-to-wheel kinematics, and the per-wheel PID speed controller.  The
//! algorithms live in their own module because it is a bit easier to write unit
//! tests for crates that don't have a set compilation target
//!

#![no_std]

use defmt::Format;

pub mod kinematics;
pub mod odometry;
pub mod pid;

pub use kinematics::{DifferentialDrive, SpeedLimits, VelocityCommand};
pub use odometry::{OdometryConfig, Pose, Twist, WheelOdometry, WheelSpeeds};
pub use pid::{Pid, PidConfig};

#[derive(Format, Debug, Clone, Copy, PartialEq, Eq)]
/// A configuration value that would break the core control math.  These values
/// are divisors in the control laws, so they are rejected before the control
/// loop starts rather than checked every cycle.
pub enum ConfigError {
    /// The control sample period must be greater than zero
    NonPositivePeriod,
    /// The control loop frequency must be greater than zero
    NonPositiveFrequency,
    /// The wheel radius must be greater than zero
    NonPositiveWheelRadius,
    /// The track width (wheel separation) must be greater than zero
    NonPositiveTrackWidth,
    /// The encoder counts-per-revolution must be greater than zero
    NonPositiveCountsPerRev,
    /// The derivative filter cutoff must be greater than zero
    NonPositiveCutoff,
    /// A saturation limit must be greater than zero
    NonPositiveLimit,
}
