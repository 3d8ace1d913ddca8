//!
//! Common interfaces between the drive controller and the host link
//!

#![no_std]

pub mod command;
pub mod telemetry;

pub use command::{DRIVE_COMMAND_SIZE, DriveCommand};
pub use telemetry::{TELEMETRY_PACKET_SIZE, TelemetryPacket};
