//! Top fan driver (PWM).
//!
//! The duty percentage maps linearly onto a 10 ms PWM period. Generic over
//! any `embedded-hal` PWM channel; on ESP-IDF that is an LEDC channel, on
//! the host a [`SimPwm`](super::sim::SimPwm).

use embedded_hal::pwm::{Error as _, SetDutyCycle};
use log::warn;

/// PWM period of the fan channel.
pub const FAN_PERIOD_US: u16 = 10_000;

/// High time of one period for `duty` percent (clamped to 100).
pub const fn fan_pulse_us(duty: u8) -> u16 {
    let duty = if duty > 100 { 100 } else { duty };
    (duty as u32 * FAN_PERIOD_US as u32 / 100) as u16
}

pub struct FanDriver<P> {
    pwm: Option<P>,
    duty: u8,
}

impl<P: SetDutyCycle> FanDriver<P> {
    /// `None` when the PWM device was not found; the fan then becomes a
    /// logged no-op.
    pub fn new(pwm: Option<P>) -> Self {
        if pwm.is_none() {
            warn!("fan: PWM device not found, fan output disabled");
        }
        Self { pwm, duty: 0 }
    }

    pub fn set(&mut self, duty: u8) {
        self.duty = duty.min(100);
        let Some(pwm) = self.pwm.as_mut() else {
            return;
        };
        if let Err(e) = pwm.set_duty_cycle_fraction(fan_pulse_us(self.duty), FAN_PERIOD_US) {
            warn!("fan: PWM write failed ({:?})", e.kind());
        }
    }

    /// Last commanded duty, whether or not the device exists.
    pub fn duty(&self) -> u8 {
        self.duty
    }

    pub fn is_present(&self) -> bool {
        self.pwm.is_some()
    }
}
