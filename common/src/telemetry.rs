//!
//! Per-cycle telemetry snapshot exposed for host consumption.  Purely
//! observational; nothing here feeds back into the control loop.
//!

use defmt::Format;
use ncomm_utils::packing::{Packable, PackingError};

/// The size (in bytes) of a telemetry packet
pub const TELEMETRY_PACKET_SIZE: usize = 28;

#[derive(Format, Debug, Clone, Copy, PartialEq, Default)]
/// Snapshot of the drive state over the last control cycle
pub struct TelemetryPacket {
    /// Accumulated right encoder count
    pub right_count: i32,
    /// Accumulated left encoder count
    pub left_count: i32,
    /// Pose x (m)
    pub x: f32,
    /// Pose y (m)
    pub y: f32,
    /// Pose heading (rad)
    pub heading: f32,
    /// Body linear velocity (m/s)
    pub linear: f32,
    /// Body angular velocity (rad/s)
    pub angular: f32,
}

impl Packable for TelemetryPacket {
    fn len() -> usize {
        TELEMETRY_PACKET_SIZE
    }

    fn pack(self, buffer: &mut [u8]) -> Result<(), PackingError> {
        if buffer.len() < Self::len() {
            return Err(PackingError::InvalidBufferSize);
        }

        buffer[0..4].copy_from_slice(&self.right_count.to_le_bytes());
        buffer[4..8].copy_from_slice(&self.left_count.to_le_bytes());
        buffer[8..12].copy_from_slice(&self.x.to_le_bytes());
        buffer[12..16].copy_from_slice(&self.y.to_le_bytes());
        buffer[16..20].copy_from_slice(&self.heading.to_le_bytes());
        buffer[20..24].copy_from_slice(&self.linear.to_le_bytes());
        buffer[24..28].copy_from_slice(&self.angular.to_le_bytes());

        Ok(())
    }

    fn unpack(data: &[u8]) -> Result<Self, PackingError> {
        if data.len() < Self::len() {
            return Err(PackingError::InvalidBufferSize);
        }

        Ok(Self {
            right_count: i32::from_le_bytes(data[0..4].try_into().unwrap()),
            left_count: i32::from_le_bytes(data[4..8].try_into().unwrap()),
            x: f32::from_le_bytes(data[8..12].try_into().unwrap()),
            y: f32::from_le_bytes(data[12..16].try_into().unwrap()),
            heading: f32::from_le_bytes(data[16..20].try_into().unwrap()),
            linear: f32::from_le_bytes(data[20..24].try_into().unwrap()),
            angular: f32::from_le_bytes(data[24..28].try_into().unwrap()),
        })
    }
}
