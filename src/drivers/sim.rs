//! In-memory PWM channel and GPIO for host runs and tests.
//!
//! Clones share state, so a test keeps one handle and gives the other to a
//! driver.

use core::convert::Infallible;
use core::sync::atomic::{AtomicBool, AtomicU16, Ordering};
use std::sync::Arc;

use embedded_hal::digital::{self, OutputPin};
use embedded_hal::pwm::{self, SetDutyCycle};

#[derive(Debug, Clone)]
pub struct SimPwm {
    max: u16,
    duty: Arc<AtomicU16>,
}

impl SimPwm {
    pub fn new(max_duty: u16) -> Self {
        Self {
            max: max_duty,
            duty: Arc::new(AtomicU16::new(0)),
        }
    }

    /// Raw duty last written.
    pub fn duty(&self) -> u16 {
        self.duty.load(Ordering::Relaxed)
    }
}

impl pwm::ErrorType for SimPwm {
    type Error = Infallible;
}

impl SetDutyCycle for SimPwm {
    fn max_duty_cycle(&self) -> u16 {
        self.max
    }

    fn set_duty_cycle(&mut self, duty: u16) -> Result<(), Self::Error> {
        self.duty.store(duty, Ordering::Relaxed);
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct SimPin {
    high: Arc<AtomicBool>,
}

impl SimPin {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_high(&self) -> bool {
        self.high.load(Ordering::Relaxed)
    }

    /// Set the level without going through the driver.
    pub fn force(&self, high: bool) {
        self.high.store(high, Ordering::Relaxed);
    }
}

impl digital::ErrorType for SimPin {
    type Error = Infallible;
}

impl OutputPin for SimPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.force(false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.force(true);
        Ok(())
    }
}
