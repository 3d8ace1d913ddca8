//!
//! Motion-control core for a two-wheeled differential-drive robot: quadrature
//! decoding, wheel odometry, unicycle-to-wheel kinematics, and a per-wheel PID
//! velocity loop running at a fixed rate.
//!
//! The crate is hardware-free: encoder channels, motor outputs, and the time
//! source are trait seams (`embedded-hal` pins, [`WheelActuator`],
//! [`MonotonicClock`]) that a board layer binds to peripherals and interrupt
//! handlers.  Per cycle, the board layer runs:
//!
//! counts -> [`DriveController::cycle`] -> (direction, duty) per wheel ->
//! actuators -> [`CycleScheduler::sleep`]
//!
//! with each wheel's [`QuadratureDecoder::on_edge`] bound to that encoder's
//! edge interrupts.  The only state crossing the two contexts is the pair of
//! [`EncoderCount`] cells.
//!

#![no_std]

pub mod clock;
pub mod controller;
pub mod encoder;
pub mod motors;
pub mod scheduler;

pub use clock::MonotonicClock;
pub use controller::{DriveConfig, DriveController};
pub use encoder::{EncoderCount, Polarity, QuadratureDecoder, quadrature_step};
pub use motors::{Direction, HBridge, VoltageScaler, WheelActuator, WheelDrive};
pub use scheduler::{CycleOutcome, CycleScheduler};

pub use motion_control::{
    ConfigError, Pid, PidConfig, Pose, Twist, VelocityCommand, WheelSpeeds,
};
