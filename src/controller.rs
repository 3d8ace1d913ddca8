//!
//! Cycle orchestration: once per fixed period, read the encoder counts, update
//! odometry, convert the commanded body velocity into wheel setpoints, run
//! each wheel's controller, and scale the voltage outputs into actuation
//! commands.
//!

use common::TelemetryPacket;

use motion_control::{
    ConfigError, DifferentialDrive, OdometryConfig, Pid, PidConfig, Pose, SpeedLimits, Twist,
    VelocityCommand, WheelOdometry, WheelSpeeds,
};

use crate::encoder::EncoderCount;
use crate::motors::{VoltageScaler, WheelDrive};

#[derive(Debug, Clone, Copy, PartialEq)]
/// Full configuration for the drive controller, supplied once before the
/// control loop starts.  No runtime reconfiguration.
pub struct DriveConfig {
    /// Control loop frequency (hz)
    pub control_frequency: f32,
    /// Decoded encoder counts per wheel revolution
    pub counts_per_rev: f32,
    /// Wheel radius (m)
    pub wheel_radius: f32,
    /// Distance between the wheel contact points (m)
    pub track_width: f32,
    /// Linear velocity command saturation (m/s)
    pub max_linear_velocity: f32,
    /// Angular velocity command saturation (rad/s)
    pub max_angular_velocity: f32,
    /// Maximum motor supply voltage (V)
    pub max_voltage: f32,
    /// The actuator's maximum PWM duty value
    pub max_duty: u16,
    /// Right wheel controller gains and limits.  The sample period is derived
    /// from `control_frequency`; any value set here is ignored.
    pub right_pid: PidConfig,
    /// Left wheel controller gains and limits (may differ from the right)
    pub left_pid: PidConfig,
}

/// The closed-loop drive controller.  Owns all per-cycle state; the encoder
/// counts are shared in from the edge-handler context.
pub struct DriveController<'a> {
    odometry: WheelOdometry,
    drive: DifferentialDrive,
    limits: SpeedLimits,
    right_pid: Pid,
    left_pid: Pid,
    scaler: VoltageScaler,

    /// The right wheel's count, written by its decoder
    right_count: &'a EncoderCount,
    /// The left wheel's count, written by its decoder
    left_count: &'a EncoderCount,

    /// Counts as read at the top of the last cycle, for telemetry
    last_counts: (i32, i32),
}

impl<'a> DriveController<'a> {
    /// Validate the configuration and build the controller.  Rejecting bad
    /// calibration here keeps the cycle path free of checks.
    pub fn new(
        config: DriveConfig,
        right_count: &'a EncoderCount,
        left_count: &'a EncoderCount,
    ) -> Result<Self, ConfigError> {
        if config.control_frequency <= 0.0 {
            return Err(ConfigError::NonPositiveFrequency);
        }
        let cycle_period = 1.0 / config.control_frequency;

        let odometry = WheelOdometry::new(OdometryConfig {
            counts_per_rev: config.counts_per_rev,
            wheel_radius: config.wheel_radius,
            track_width: config.track_width,
            cycle_period,
        })?;
        let drive = DifferentialDrive::new(config.wheel_radius, config.track_width)?;
        let limits = SpeedLimits::new(config.max_linear_velocity, config.max_angular_velocity)?;

        // The loop period is the controllers' sample period, whatever the
        // caller put in the per-wheel configs
        let right_pid = Pid::new(PidConfig {
            sample_period: cycle_period,
            ..config.right_pid
        })?;
        let left_pid = Pid::new(PidConfig {
            sample_period: cycle_period,
            ..config.left_pid
        })?;

        let scaler = VoltageScaler::new(config.max_voltage, config.max_duty)?;

        Ok(Self {
            odometry,
            drive,
            limits,
            right_pid,
            left_pid,
            scaler,
            right_count,
            left_count,
            last_counts: (0, 0),
        })
    }

    /// Run one control cycle, returning the (right, left) actuation commands.
    ///
    /// `reset_right` / `reset_left` re-arm the corresponding wheel's
    /// integral/derivative state after a discontinuity; that wheel's output
    /// for this cycle is proportional-only.
    pub fn cycle(
        &mut self,
        command: VelocityCommand,
        reset_right: bool,
        reset_left: bool,
    ) -> (WheelDrive, WheelDrive) {
        let right = self.right_count.read();
        let left = self.left_count.read();
        self.last_counts = (right, left);

        self.odometry.update(right, left);
        let measured = self.odometry.wheel_speeds();

        let setpoints = self.drive.body_to_wheel_speeds(self.limits.clamp(command));

        let right_voltage = self
            .right_pid
            .compute(setpoints.right, measured.right, reset_right);
        let left_voltage = self
            .left_pid
            .compute(setpoints.left, measured.left, reset_left);

        (
            self.scaler.to_drive(right_voltage),
            self.scaler.to_drive(left_voltage),
        )
    }

    /// The current pose estimate
    pub fn pose(&self) -> Pose {
        self.odometry.pose()
    }

    /// The body twist measured over the last cycle
    pub fn twist(&self) -> Twist {
        self.odometry.twist()
    }

    /// The wheel angular speeds measured over the last cycle
    pub fn wheel_speeds(&self) -> WheelSpeeds {
        self.odometry.wheel_speeds()
    }

    /// Re-initialize the pose estimate to the world origin
    pub fn reset_pose(&mut self) {
        self.odometry.reset_pose();
    }

    /// Snapshot of the last cycle for host consumption
    pub fn telemetry(&self) -> TelemetryPacket {
        let pose = self.odometry.pose();
        let twist = self.odometry.twist();

        TelemetryPacket {
            right_count: self.last_counts.0,
            left_count: self.last_counts.1,
            x: pose.x,
            y: pose.y,
            heading: pose.heading,
            linear: twist.linear,
            angular: twist.angular,
        }
    }
}
