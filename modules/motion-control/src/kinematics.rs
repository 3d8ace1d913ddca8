//!
//! Differential-drive kinematics: paired conversion matrices between the body
//! frame (v, w) and the wheel frame (w_r, w_l).
//!

use defmt::Format;

use nalgebra::{Matrix2, Vector2};

use crate::ConfigError;
use crate::odometry::{Twist, WheelSpeeds};

#[derive(Format, Debug, Clone, Copy, PartialEq, Default)]
/// A commanded body velocity, supplied by a higher-level collaborator each
/// cycle.  Defaults to zero (stop) when no external source is wired.
pub struct VelocityCommand {
    /// Linear velocity command (m/s)
    pub linear: f32,
    /// Angular velocity command (rad/s)
    pub angular: f32,
}

#[derive(Format, Debug, Clone, Copy, PartialEq)]
/// Saturation bounds applied to a velocity command before it is converted to
/// wheel setpoints.
pub struct SpeedLimits {
    max_linear: f32,
    max_angular: f32,
}

impl SpeedLimits {
    /// Create a new set of velocity saturation bounds
    pub fn new(max_linear: f32, max_angular: f32) -> Result<Self, ConfigError> {
        if max_linear <= 0.0 || max_angular <= 0.0 {
            return Err(ConfigError::NonPositiveLimit);
        }

        Ok(Self {
            max_linear,
            max_angular,
        })
    }

    /// Clamp a velocity command to the configured bounds
    pub fn clamp(&self, command: VelocityCommand) -> VelocityCommand {
        VelocityCommand {
            linear: command.linear.clamp(-self.max_linear, self.max_linear),
            angular: command.angular.clamp(-self.max_angular, self.max_angular),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
/// Conversion between body velocities and wheel angular speeds for a
/// two-wheeled differential drive.
pub struct DifferentialDrive {
    // Conversion Matrix from Body Coordinates <v, w> to Wheel Coordinates <w_r, w_l>
    body_to_wheel: Matrix2<f32>,
    // Conversion from Wheel Coordinates to Body Coordinates
    wheel_to_body: Matrix2<f32>,
}

impl DifferentialDrive {
    /// Initialize the conversion matrices from the wheel radius (m) and the
    /// track width (m, distance between the two wheel contact points)
    pub fn new(wheel_radius: f32, track_width: f32) -> Result<Self, ConfigError> {
        if wheel_radius <= 0.0 {
            return Err(ConfigError::NonPositiveWheelRadius);
        }
        if track_width <= 0.0 {
            return Err(ConfigError::NonPositiveTrackWidth);
        }

        let half_track = track_width / 2.0;

        let body_to_wheel = Matrix2::new(
            1.0 / wheel_radius,
            half_track / wheel_radius,
            1.0 / wheel_radius,
            -half_track / wheel_radius,
        );

        // Closed-form inverse of body_to_wheel
        let wheel_to_body = Matrix2::new(
            wheel_radius / 2.0,
            wheel_radius / 2.0,
            wheel_radius / track_width,
            -wheel_radius / track_width,
        );

        Ok(Self {
            body_to_wheel,
            wheel_to_body,
        })
    }

    /// Convert a body velocity command into per-wheel angular speed setpoints
    /// (rad/s).  Saturation is the caller's concern (see [`SpeedLimits`]).
    pub fn body_to_wheel_speeds(&self, command: VelocityCommand) -> WheelSpeeds {
        let wheels = self.body_to_wheel * Vector2::new(command.linear, command.angular);

        WheelSpeeds {
            right: wheels[0],
            left: wheels[1],
        }
    }

    /// Convert measured wheel angular speeds (rad/s) into the body twist
    pub fn wheel_speeds_to_twist(&self, speeds: WheelSpeeds) -> Twist {
        let body = self.wheel_to_body * Vector2::new(speeds.right, speeds.left);

        Twist {
            linear: body[0],
            angular: body[1],
        }
    }
}
