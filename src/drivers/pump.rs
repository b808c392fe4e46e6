//! Water pump driver (relay / MOSFET on one GPIO, active high).
//!
//! ## Safety contract
//!
//! The pump must never run longer than the configured limit. That is
//! enforced by the supervisor's safety check; this driver is a dumb
//! actuator. The pin is driven low at construction.

use embedded_hal::digital::{Error as _, OutputPin};
use log::warn;

pub struct PumpDriver<P> {
    pin: Option<P>,
    on: bool,
}

impl<P: OutputPin> PumpDriver<P> {
    pub fn new(pin: Option<P>) -> Self {
        let mut driver = Self { pin, on: false };
        if driver.pin.is_none() {
            warn!("pump: GPIO not found, pump output disabled");
        }
        driver.write(false);
        driver
    }

    pub fn set(&mut self, on: bool) {
        self.on = on;
        self.write(on);
    }

    fn write(&mut self, high: bool) {
        let Some(pin) = self.pin.as_mut() else {
            return;
        };
        let result = if high { pin.set_high() } else { pin.set_low() };
        if let Err(e) = result {
            warn!("pump: GPIO write failed ({:?})", e.kind());
        }
    }

    pub fn is_running(&self) -> bool {
        self.on
    }

    pub fn is_present(&self) -> bool {
        self.pin.is_some()
    }
}
