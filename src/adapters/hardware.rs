//! Hardware adapter bridging actuator drivers to the [`ActuatorPort`].
//!
//! Owns the fan, servo and pump drivers. This is the only place the
//! supervisor's effects reach real peripherals; on the host the drivers
//! wrap simulated channels instead.

use embedded_hal::digital::OutputPin;
use embedded_hal::pwm::SetDutyCycle;

use crate::app::ports::ActuatorPort;
use crate::drivers::fan::FanDriver;
use crate::drivers::pump::PumpDriver;
use crate::drivers::servo::ServoDriver;

/// Concrete adapter that combines all actuators behind one port.
pub struct HardwareAdapter<F, S, P> {
    fan: FanDriver<F>,
    servo: ServoDriver<S>,
    pump: PumpDriver<P>,
}

impl<F, S, P> HardwareAdapter<F, S, P>
where
    F: SetDutyCycle,
    S: SetDutyCycle,
    P: OutputPin,
{
    pub fn new(fan: FanDriver<F>, servo: ServoDriver<S>, pump: PumpDriver<P>) -> Self {
        Self { fan, servo, pump }
    }

    pub fn fan(&self) -> &FanDriver<F> {
        &self.fan
    }

    pub fn servo(&self) -> &ServoDriver<S> {
        &self.servo
    }

    pub fn pump(&self) -> &PumpDriver<P> {
        &self.pump
    }
}

impl<F, S, P> ActuatorPort for HardwareAdapter<F, S, P>
where
    F: SetDutyCycle,
    S: SetDutyCycle,
    P: OutputPin,
{
    fn set_fan(&mut self, duty: u8) {
        self.fan.set(duty);
    }

    fn set_servo(&mut self, angle: u8) {
        self.servo.set(angle);
    }

    fn set_pump(&mut self, on: bool) {
        self.pump.set(on);
    }
}
