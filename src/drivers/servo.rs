//! Window servo driver (PWM).
//!
//! Standard hobby servo timing: a 20 ms period whose high time runs from
//! 0.5 ms (0°) to 2.5 ms (180°). At startup the servo is parked at 90°
//! (1.5 ms).

use embedded_hal::pwm::{Error as _, SetDutyCycle};
use log::warn;

pub const SERVO_PERIOD_US: u16 = 20_000;
pub const SERVO_MIN_PULSE_US: u16 = 500;
pub const SERVO_MAX_PULSE_US: u16 = 2_500;
pub const SERVO_MAX_ANGLE: u8 = 180;

/// High time for `angle` degrees (clamped to 180).
pub const fn servo_pulse_us(angle: u8) -> u16 {
    let angle = if angle > SERVO_MAX_ANGLE {
        SERVO_MAX_ANGLE
    } else {
        angle
    };
    let span = (SERVO_MAX_PULSE_US - SERVO_MIN_PULSE_US) as u32;
    SERVO_MIN_PULSE_US + (angle as u32 * span / SERVO_MAX_ANGLE as u32) as u16
}

pub struct ServoDriver<P> {
    pwm: Option<P>,
    angle: u8,
}

impl<P: SetDutyCycle> ServoDriver<P> {
    pub fn new(pwm: Option<P>) -> Self {
        if pwm.is_none() {
            warn!("servo: PWM device not found, servo output disabled");
        }
        Self { pwm, angle: 90 }
    }

    pub fn set(&mut self, angle: u8) {
        self.angle = angle.min(SERVO_MAX_ANGLE);
        let Some(pwm) = self.pwm.as_mut() else {
            return;
        };
        if let Err(e) = pwm.set_duty_cycle_fraction(servo_pulse_us(self.angle), SERVO_PERIOD_US) {
            warn!("servo: PWM write failed ({:?})", e.kind());
        }
    }

    pub fn is_present(&self) -> bool {
        self.pwm.is_some()
    }
}
