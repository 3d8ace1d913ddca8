//!
//! Wheel odometry: converts raw encoder counts into calibrated wheel speeds,
//! body twist, and a dead-reckoned pose, once per fixed control cycle.
//!

use core::f32::consts::PI;

use defmt::Format;

use libm::{atan2f, cosf, sinf};

use crate::ConfigError;
use crate::kinematics::DifferentialDrive;

#[derive(Format, Debug, Clone, Copy, PartialEq, Default)]
/// Robot pose in the world frame (meters, radians).  A best-effort
/// dead-reckoning estimate; error accumulates with distance traveled and is
/// not corrected here.
pub struct Pose {
    /// X position (m)
    pub x: f32,
    /// Y position (m)
    pub y: f32,
    /// Heading (rad), normalized to (-pi, pi]
    pub heading: f32,
}

#[derive(Format, Debug, Clone, Copy, PartialEq, Default)]
/// Body velocity of the robot, recomputed fully each cycle
pub struct Twist {
    /// Linear velocity (m/s)
    pub linear: f32,
    /// Angular velocity (rad/s)
    pub angular: f32,
}

#[derive(Format, Debug, Clone, Copy, PartialEq, Default)]
/// Per-wheel angular speeds (rad/s)
pub struct WheelSpeeds {
    /// Right wheel angular speed (rad/s)
    pub right: f32,
    /// Left wheel angular speed (rad/s)
    pub left: f32,
}

#[derive(Format, Debug, Clone, Copy, PartialEq)]
/// Calibration values for the odometry update
pub struct OdometryConfig {
    /// Decoded encoder counts per full wheel revolution
    pub counts_per_rev: f32,
    /// Wheel radius (m)
    pub wheel_radius: f32,
    /// Distance between the wheel contact points (m)
    pub track_width: f32,
    /// Fixed control cycle period (s)
    pub cycle_period: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
/// Converts accumulated encoder counts into wheel speeds, body twist, and an
/// integrated pose estimate.
pub struct WheelOdometry {
    drive: DifferentialDrive,
    radians_per_count: f32,
    cycle_period: f32,
    previous_right: i32,
    previous_left: i32,
    pose: Pose,
    twist: Twist,
    wheel_speeds: WheelSpeeds,
}

impl WheelOdometry {
    /// Create a new odometry estimator, rejecting calibration values that
    /// would act as zero divisors in the update
    pub fn new(config: OdometryConfig) -> Result<Self, ConfigError> {
        if config.counts_per_rev <= 0.0 {
            return Err(ConfigError::NonPositiveCountsPerRev);
        }
        if config.cycle_period <= 0.0 {
            return Err(ConfigError::NonPositivePeriod);
        }

        let drive = DifferentialDrive::new(config.wheel_radius, config.track_width)?;

        Ok(Self {
            drive,
            radians_per_count: 2.0 * PI / config.counts_per_rev,
            cycle_period: config.cycle_period,
            previous_right: 0,
            previous_left: 0,
            pose: Pose::default(),
            twist: Twist::default(),
            wheel_speeds: WheelSpeeds::default(),
        })
    }

    /// Run one odometry update from the current accumulated counts.  Must be
    /// called exactly once per control cycle.
    pub fn update(&mut self, right_count: i32, left_count: i32) {
        let delta_right = right_count.wrapping_sub(self.previous_right);
        let delta_left = left_count.wrapping_sub(self.previous_left);
        self.previous_right = right_count;
        self.previous_left = left_count;

        self.wheel_speeds = WheelSpeeds {
            right: delta_right as f32 * self.radians_per_count / self.cycle_period,
            left: delta_left as f32 * self.radians_per_count / self.cycle_period,
        };
        self.twist = self.drive.wheel_speeds_to_twist(self.wheel_speeds);

        // Midpoint rule: evaluate the heading at the half-step to reduce the
        // integration error of the heading over a finite cycle
        let dt = self.cycle_period;
        let heading_mid = self.pose.heading + self.twist.angular * dt / 2.0;
        self.pose.x += self.twist.linear * dt * cosf(heading_mid);
        self.pose.y += self.twist.linear * dt * sinf(heading_mid);
        self.pose.heading = wrap_angle(self.pose.heading + self.twist.angular * dt);
    }

    /// The current pose estimate
    pub fn pose(&self) -> Pose {
        self.pose
    }

    /// The body twist measured over the last cycle
    pub fn twist(&self) -> Twist {
        self.twist
    }

    /// The wheel angular speeds measured over the last cycle
    pub fn wheel_speeds(&self) -> WheelSpeeds {
        self.wheel_speeds
    }

    /// Re-initialize the pose estimate to the world origin.  Count tracking is
    /// unaffected, so the next update produces a correct delta.
    pub fn reset_pose(&mut self) {
        self.pose = Pose::default();
        self.twist = Twist::default();
        self.wheel_speeds = WheelSpeeds::default();
    }
}

/// Normalize an angle to (-pi, pi]
fn wrap_angle(angle: f32) -> f32 {
    let wrapped = atan2f(sinf(angle), cosf(angle));
    if wrapped <= -PI {
        wrapped + 2.0 * PI
    } else {
        wrapped
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;

    const COUNTS_PER_REV: f32 = 1700.0;
    const WHEEL_RADIUS: f32 = 0.0425;
    const TRACK_WIDTH: f32 = 0.2;
    const CYCLE_PERIOD: f32 = 0.01;

    fn odometry() -> WheelOdometry {
        WheelOdometry::new(OdometryConfig {
            counts_per_rev: COUNTS_PER_REV,
            wheel_radius: WHEEL_RADIUS,
            track_width: TRACK_WIDTH,
            cycle_period: CYCLE_PERIOD,
        })
        .unwrap()
    }

    fn within_tolerance(value: f32, target: f32, tolerance: f32) -> bool {
        target > value - tolerance && target < value + tolerance
    }

    #[test]
    fn test_straight_line_single_cycle() {
        let mut odometry = odometry();

        // 17 counts on each wheel over one 10ms cycle
        odometry.update(17, 17);

        let speeds = odometry.wheel_speeds();
        assert!(within_tolerance(speeds.right, 6.28318, 0.001));
        assert!(within_tolerance(speeds.left, 6.28318, 0.001));

        let twist = odometry.twist();
        assert!(within_tolerance(twist.linear, 0.267035, 0.0001));
        assert!(within_tolerance(twist.angular, 0.0, 0.0001));

        let pose = odometry.pose();
        assert!(within_tolerance(pose.x, 0.00267035, 0.00001));
        assert!(within_tolerance(pose.y, 0.0, 0.00001));
        assert!(within_tolerance(pose.heading, 0.0, 0.00001));
    }

    #[test]
    fn test_constant_curvature_matches_analytic_arc() {
        let mut odometry = odometry();

        // Constant 20/14 counts per cycle for two seconds
        let (right_per_cycle, left_per_cycle) = (20, 14);
        let cycles = 200;
        for n in 1..=cycles {
            odometry.update(n * right_per_cycle, n * left_per_cycle);
        }

        let radians_per_count = 2.0 * PI / COUNTS_PER_REV;
        let omega_right = right_per_cycle as f32 * radians_per_count / CYCLE_PERIOD;
        let omega_left = left_per_cycle as f32 * radians_per_count / CYCLE_PERIOD;
        let v = WHEEL_RADIUS * (omega_right + omega_left) / 2.0;
        let w = WHEEL_RADIUS * (omega_right - omega_left) / TRACK_WIDTH;

        // Closed-form constant-curvature arc after two seconds
        let theta = w * cycles as f32 * CYCLE_PERIOD;
        let expected_x = (v / w) * sinf(theta);
        let expected_y = (v / w) * (1.0 - cosf(theta));

        let pose = odometry.pose();
        assert!(within_tolerance(pose.x, expected_x, 0.001));
        assert!(within_tolerance(pose.y, expected_y, 0.001));
        assert!(within_tolerance(pose.heading, theta, 0.001));
    }

    #[test]
    fn test_rotation_in_place_holds_position() {
        let mut odometry = odometry();

        for n in 1..=50 {
            odometry.update(n * 5, n * -5);
        }

        let pose = odometry.pose();
        assert!(within_tolerance(pose.x, 0.0, 0.0001));
        assert!(within_tolerance(pose.y, 0.0, 0.0001));
        assert!(pose.heading > 0.0);
    }

    #[test]
    fn test_heading_stays_normalized() {
        let mut odometry = odometry();

        // Spin in place long enough for the raw heading integral to pass pi
        for n in 1..=2_000 {
            odometry.update(n * 10, n * -10);
        }

        let heading = odometry.pose().heading;
        assert!(heading > -PI && heading <= PI);
    }

    #[test]
    fn test_reset_pose() {
        let mut odometry = odometry();

        odometry.update(100, 50);
        odometry.reset_pose();

        assert_eq!(odometry.pose(), Pose::default());

        // The count baseline survives the reset, so the next delta is exact
        odometry.update(117, 67);
        let twist = odometry.twist();
        assert!(within_tolerance(twist.linear, 0.267035, 0.0001));
        assert!(within_tolerance(twist.angular, 0.0, 0.0001));
    }

    #[test]
    fn test_zero_period_rejected() {
        let result = WheelOdometry::new(OdometryConfig {
            counts_per_rev: COUNTS_PER_REV,
            wheel_radius: WHEEL_RADIUS,
            track_width: TRACK_WIDTH,
            cycle_period: 0.0,
        });

        assert_eq!(result, Err(ConfigError::NonPositivePeriod));
    }

    #[test]
    fn test_zero_counts_per_rev_rejected() {
        let result = WheelOdometry::new(OdometryConfig {
            counts_per_rev: 0.0,
            wheel_radius: WHEEL_RADIUS,
            track_width: TRACK_WIDTH,
            cycle_period: CYCLE_PERIOD,
        });

        assert_eq!(result, Err(ConfigError::NonPositiveCountsPerRev));
    }
}
