//!
//! Actuation seam: scales a controller voltage into the motor driver's duty
//! range and hands (direction, duty) pairs to the H-bridge
//!

use core::fmt::Debug;

use defmt::Format;

use embedded_hal::PwmPin;
use embedded_hal::digital::v2::OutputPin;

use motion_control::ConfigError;

#[derive(Format, Debug, Clone, Copy, PartialEq, Eq)]
/// Direction a wheel is driven in
pub enum Direction {
    /// The direction that advances the wheel's encoder count
    Forward,
    /// The opposite direction
    Reverse,
}

#[derive(Format, Debug, Clone, Copy, PartialEq, Eq)]
/// One wheel's actuation command
pub struct WheelDrive {
    /// Which way to drive the wheel
    pub direction: Direction,
    /// PWM duty, up to the actuator's maximum
    pub duty: u16,
}

impl WheelDrive {
    /// The stopped command
    pub const STOP: Self = Self {
        direction: Direction::Forward,
        duty: 0,
    };
}

#[derive(Format, Debug, Clone, Copy, PartialEq)]
/// Linear scaling from a controller voltage to the actuator duty range, by the
/// ratio of maximum duty to maximum supply voltage
pub struct VoltageScaler {
    duty_per_volt: f32,
    max_voltage: f32,
    max_duty: u16,
}

impl VoltageScaler {
    /// Create a scaler for an actuator driven from a `max_voltage` supply with
    /// a `max_duty` PWM range
    pub fn new(max_voltage: f32, max_duty: u16) -> Result<Self, ConfigError> {
        if max_voltage <= 0.0 || max_duty == 0 {
            return Err(ConfigError::NonPositiveLimit);
        }

        Ok(Self {
            duty_per_volt: max_duty as f32 / max_voltage,
            max_voltage,
            max_duty,
        })
    }

    /// Convert a signed controller voltage into a (direction, duty) pair.
    /// The sign selects the direction; the magnitude, clamped to the supply
    /// maximum, selects the duty cycle.
    pub fn to_drive(&self, voltage: f32) -> WheelDrive {
        let magnitude = if voltage < 0.0 { -voltage } else { voltage }.min(self.max_voltage);
        let duty = ((magnitude * self.duty_per_volt) as u16).min(self.max_duty);

        WheelDrive {
            direction: if voltage < 0.0 {
                Direction::Reverse
            } else {
                Direction::Forward
            },
            duty,
        }
    }
}

/// The external actuation interface consumed by the control cycle
pub trait WheelActuator {
    /// The underlying driver error
    type Error;

    /// Apply a (direction, duty) pair to the wheel
    fn drive(&mut self, command: WheelDrive) -> Result<(), Self::Error>;
}

/// H-bridge wheel driver: two direction lines plus a PWM line
pub struct HBridge<A, B, P> {
    /// Direction line asserted for forward rotation
    forward_pin: A,
    /// Direction line asserted for reverse rotation
    reverse_pin: B,
    /// The duty line
    pwm: P,
}

impl<A, B, P, GPIOE> HBridge<A, B, P>
where
    A: OutputPin<Error = GPIOE>,
    B: OutputPin<Error = GPIOE>,
    P: PwmPin<Duty = u16>,
    GPIOE: Debug,
{
    /// Create a new h-bridge driver, starting stopped
    pub fn new(forward_pin: A, reverse_pin: B, mut pwm: P) -> Result<Self, GPIOE> {
        pwm.set_duty(0);
        pwm.enable();

        let mut bridge = Self {
            forward_pin,
            reverse_pin,
            pwm,
        };
        bridge.drive(WheelDrive::STOP)?;
        Ok(bridge)
    }

    /// The PWM peripheral's maximum duty value
    pub fn max_duty(&self) -> u16 {
        self.pwm.get_max_duty()
    }
}

impl<A, B, P, GPIOE> WheelActuator for HBridge<A, B, P>
where
    A: OutputPin<Error = GPIOE>,
    B: OutputPin<Error = GPIOE>,
    P: PwmPin<Duty = u16>,
    GPIOE: Debug,
{
    type Error = GPIOE;

    fn drive(&mut self, command: WheelDrive) -> Result<(), GPIOE> {
        match command.direction {
            Direction::Forward => {
                self.forward_pin.set_high()?;
                self.reverse_pin.set_low()?;
            }
            Direction::Reverse => {
                self.forward_pin.set_low()?;
                self.reverse_pin.set_high()?;
            }
        }
        self.pwm.set_duty(command.duty);

        Ok(())
    }
}
