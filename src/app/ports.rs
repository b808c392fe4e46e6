//! Port traits: the hexagonal boundary between the control core and the
//! outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ Supervisor / producers (domain)
//! ```
//!
//! Driven adapters (sensors, actuators, clocks, event sinks) implement
//! these traits. The supervisor and the producer tasks consume them via
//! generics, so the core never touches hardware directly and every port
//! can be replaced by a recording double in tests.

use crate::error::Result;
use crate::message::Tick;
use crate::sensors::Readings;

// ───────────────────────────────────────────────────────────────
// Sensor port (driven adapter: hardware → producer task)
// ───────────────────────────────────────────────────────────────

/// One physical sensor, already converted to engineering units.
pub trait SensorPort {
    /// Label for log lines.
    fn name(&self) -> &'static str;

    /// Check the backing device exists. Called once before sampling starts;
    /// an `Err` retires the producer with a warning.
    fn probe(&mut self) -> Result<()> {
        Ok(())
    }

    /// Take one sample. A physical sample may yield more than one reading
    /// (the climate probe reports temperature and humidity together).
    fn sample(&mut self) -> Result<Readings>;
}

// ───────────────────────────────────────────────────────────────
// Actuator port (driven adapter: domain → hardware)
// ───────────────────────────────────────────────────────────────

/// Write-side port. Calls are fire-and-forget: the core never depends on
/// their outcome.
pub trait ActuatorPort {
    /// Fan duty, 0–100 %.
    fn set_fan(&mut self, duty: u8);

    /// Servo angle, 0–179°.
    fn set_servo(&mut self, angle: u8);

    fn set_pump(&mut self, on: bool);
}

// ───────────────────────────────────────────────────────────────
// Time port
// ───────────────────────────────────────────────────────────────

/// Monotonic millisecond clock.
pub trait Clock {
    fn now(&self) -> Tick;
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging / telemetry)
// ───────────────────────────────────────────────────────────────

/// The supervisor emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port. Adapters decide where they go.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}
