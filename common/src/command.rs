//!
//! Commands that can be sent to the drive controller from a host link
//!

use defmt::Format;
use ncomm_utils::packing::{Packable, PackingError};

/// The size (in bytes) of a drive command.
pub const DRIVE_COMMAND_SIZE: usize = 9;

#[derive(Format, Debug, PartialEq, Clone, Copy)]
/// Commands that can be sent to the drive controller
pub enum DriveCommand {
    /// Track the given body velocity (m/s linear, rad/s angular)
    Velocity {
        // the commanded linear velocity (m/s)
        linear: f32,
        // the commanded angular velocity (rad/s)
        angular: f32,
    },
    /// Clear both wheel controllers' integral and derivative state after a
    /// discontinuity (e.g. an actuator saturation event or mode change)
    Reset,
    /// Unknown command
    Unknown,
}

impl Default for DriveCommand {
    fn default() -> Self {
        Self::Velocity {
            linear: 0.0,
            angular: 0.0,
        }
    }
}

impl Packable for DriveCommand {
    fn len() -> usize {
        DRIVE_COMMAND_SIZE
    }

    fn pack(self, buffer: &mut [u8]) -> Result<(), PackingError> {
        if buffer.len() < Self::len() {
            return Err(PackingError::InvalidBufferSize);
        }

        match self {
            Self::Velocity { linear, angular } => {
                buffer[0] = 0x01;
                buffer[1..5].copy_from_slice(&linear.to_le_bytes());
                buffer[5..9].copy_from_slice(&angular.to_le_bytes());
            }
            Self::Reset => buffer[0] = 0x02,
            Self::Unknown => (),
        }

        Ok(())
    }

    fn unpack(data: &[u8]) -> Result<Self, PackingError> {
        if data.len() < Self::len() {
            return Err(PackingError::InvalidBufferSize);
        }

        match data[0] {
            0x01 => Ok(Self::Velocity {
                linear: f32::from_le_bytes(data[1..5].try_into().unwrap()),
                angular: f32::from_le_bytes(data[5..9].try_into().unwrap()),
            }),
            0x02 => Ok(Self::Reset),
            _ => Ok(Self::Unknown),
        }
    }
}
