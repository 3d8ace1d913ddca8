//!
//! Per-wheel PID speed controller with integral anti-windup, a low-pass
//! filtered derivative-on-measurement term, and an explicit reset path.
//!

use core::f32::consts::PI;

use defmt::Format;

use crate::ConfigError;

#[derive(Format, Debug, Clone, Copy, PartialEq)]
/// Gains and limits for one wheel's controller.  Immutable after
/// configuration; the two wheels may carry different sets.
pub struct PidConfig {
    /// Proportional gain
    pub kp: f32,
    /// Integral gain
    pub ki: f32,
    /// Derivative gain
    pub kd: f32,
    /// Fixed sample period (s), matching the control loop period
    pub sample_period: f32,
    /// Anti-windup clamp: the integral accumulator is held within
    /// `-integral_limit..=integral_limit`
    pub integral_limit: f32,
    /// The published output is held within `-output_limit..=output_limit`
    pub output_limit: f32,
    /// Cutoff frequency (Hz) of the single-pole low-pass filter applied to
    /// the raw derivative to suppress encoder quantization noise
    pub derivative_cutoff: f32,
}

#[derive(Format, Debug, Clone, Copy, PartialEq)]
/// PID Controller implementation.  One instance exists per wheel.
pub struct Pid {
    kp: f32,
    ki: f32,
    kd: f32,
    sample_period: f32,
    integral_limit: f32,
    output_limit: f32,
    /// Smoothing factor of the derivative low-pass, derived from the cutoff
    filter_alpha: f32,
    /// Last calculated integral value
    integral_term: f32,
    /// Last output of the derivative low-pass filter
    filtered_derivative: f32,
    /// The last measurement, `None` right after construction or a reset so the
    /// first derivative sample is zero instead of a spike against stale state
    previous_measurement: Option<f32>,
}

impl Pid {
    /// Create a new pid controller
    pub fn new(config: PidConfig) -> Result<Self, ConfigError> {
        if config.sample_period <= 0.0 {
            return Err(ConfigError::NonPositivePeriod);
        }
        if config.derivative_cutoff <= 0.0 {
            return Err(ConfigError::NonPositiveCutoff);
        }
        if config.integral_limit <= 0.0 || config.output_limit <= 0.0 {
            return Err(ConfigError::NonPositiveLimit);
        }

        let filter_time_constant = 1.0 / (2.0 * PI * config.derivative_cutoff);

        Ok(Self {
            kp: config.kp,
            ki: config.ki,
            kd: config.kd,
            sample_period: config.sample_period,
            integral_limit: config.integral_limit,
            output_limit: config.output_limit,
            filter_alpha: config.sample_period / (config.sample_period + filter_time_constant),
            integral_term: 0.0,
            filtered_derivative: 0.0,
            previous_measurement: None,
        })
    }

    /// Apply the pid controller to determine the next control output.
    ///
    /// With `reset` set, the integral accumulator and derivative filter are
    /// cleared and the output for this cycle is the proportional term alone;
    /// the cleared state is retained for the next cycle.
    pub fn compute(&mut self, setpoint: f32, measurement: f32, reset: bool) -> f32 {
        let error = setpoint - measurement;

        if reset {
            self.integral_term = 0.0;
            self.filtered_derivative = 0.0;
            self.previous_measurement = None;
            return clamp_symmetric(self.kp * error, self.output_limit);
        }

        self.integral_term =
            clamp_symmetric(self.integral_term + error * self.sample_period, self.integral_limit);

        // Derivative on measurement, not on error, so setpoint steps don't
        // spike the derivative term
        let raw_derivative = match self.previous_measurement {
            Some(previous) => (measurement - previous) / self.sample_period,
            None => 0.0,
        };
        self.filtered_derivative += self.filter_alpha * (raw_derivative - self.filtered_derivative);
        self.previous_measurement = Some(measurement);

        let output = self.kp * error + self.ki * self.integral_term
            - self.kd * self.filtered_derivative;
        clamp_symmetric(output, self.output_limit)
    }
}

fn clamp_symmetric(value: f32, limit: f32) -> f32 {
    value.clamp(-limit, limit)
}
