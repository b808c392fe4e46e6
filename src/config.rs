//! System configuration parameters
//!
//! All tunable parameters for the nursery controller. Nothing is persisted:
//! values come from [`SystemConfig::default`] or, on the host, from a JSON
//! override (see [`SystemConfig::from_json`]).

use serde::{Deserialize, Serialize};

use crate::bus::{BUS_SLOTS, DEFAULT_PERMITS};
use crate::error::{Error, Result};

/// Core system configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SystemConfig {
    // --- Telemetry bus ---
    /// Messages allowed in flight before producers block.
    /// Must not exceed the bus storage (`BUS_SLOTS`).
    pub permit_count: usize,

    // --- Sampling periods ---
    /// Outside light sensor period (milliseconds)
    pub light_period_ms: u32,
    /// Soil moisture sensor period (milliseconds)
    pub soil_period_ms: u32,
    /// Indoor temperature/humidity probe period (milliseconds)
    pub climate_period_ms: u32,

    // --- Supervisor ---
    /// Longest wait for a bus message per iteration (milliseconds)
    pub receive_timeout_ms: u32,
    /// Sleep between supervisor iterations (milliseconds)
    pub supervisor_poll_ms: u32,

    // --- Actuators ---
    /// Pump is forced off once it has run longer than this (milliseconds)
    pub pump_max_on_ms: u32,
    /// Servo angle applied at startup (degrees)
    pub servo_park_angle: u8,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            permit_count: DEFAULT_PERMITS,

            light_period_ms: 1000,
            soil_period_ms: 2000,
            climate_period_ms: 2000,

            receive_timeout_ms: 100,
            supervisor_poll_ms: 100,

            pump_max_on_ms: 5000,
            servo_park_angle: 90,
        }
    }
}

impl SystemConfig {
    /// Parse a (possibly partial) JSON override; missing fields keep defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|_| Error::Config("invalid JSON"))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the controller cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.permit_count == 0 {
            return Err(Error::Config("permit_count must be at least 1"));
        }
        if self.permit_count > BUS_SLOTS {
            return Err(Error::Config("permit_count exceeds capacity_slots"));
        }
        if self.light_period_ms == 0 || self.soil_period_ms == 0 || self.climate_period_ms == 0 {
            return Err(Error::Config("sampling periods must be non-zero"));
        }
        if self.supervisor_poll_ms == 0 {
            return Err(Error::Config("supervisor_poll_ms must be non-zero"));
        }
        // One iteration is a bounded receive plus a poll sleep; the safety
        // check runs once per iteration.
        let iteration_ms = u64::from(self.receive_timeout_ms) + u64::from(self.supervisor_poll_ms);
        if iteration_ms >= u64::from(self.pump_max_on_ms) {
            return Err(Error::Config("supervisor iteration exceeds the pump limit"));
        }
        if self.servo_park_angle > 180 {
            return Err(Error::Config("servo_park_angle exceeds 180"));
        }
        Ok(())
    }
}
