//! Sensor subsystem: sampling producers and their readings.
//!
//! Each physical sensor sits behind a [`SensorPort`](crate::app::ports::SensorPort)
//! and is driven by its own [`producer::Producer`] task, which stamps the
//! readings and moves them onto the telemetry bus.
//!
//! ```text
//!  SensorPort ──sample()──▶ Producer ──send()/send_batch()──▶ TelemetryBus
//! ```

pub mod analog;
pub mod dht;
pub mod producer;
pub mod sim;

use core::time::Duration;

use heapless::Vec;

use crate::config::SystemConfig;
use crate::message::SensorKind;

/// Most readings one physical sample can yield (climate: temperature + humidity).
pub const MAX_READINGS_PER_SAMPLE: usize = 2;

/// One engineering-unit value, not yet timestamped.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reading {
    pub kind: SensorKind,
    pub value: f32,
}

impl Reading {
    pub const fn new(kind: SensorKind, value: f32) -> Self {
        Self { kind, value }
    }
}

/// Readings produced by one sample.
pub type Readings = Vec<Reading, MAX_READINGS_PER_SAMPLE>;

/// A sample holding a single reading.
pub fn single(kind: SensorKind, value: f32) -> Readings {
    let mut readings = Readings::new();
    // Capacity is at least one.
    let _ = readings.push(Reading::new(kind, value));
    readings
}

/// Which sampling schedule a producer follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorGroup {
    /// Outside light intensity.
    Light,
    /// Soil humidity.
    Soil,
    /// Inside temperature and humidity, sampled together.
    Climate,
}

impl SensorGroup {
    pub fn period(self, config: &SystemConfig) -> Duration {
        let ms = match self {
            Self::Light => config.light_period_ms,
            Self::Soil => config.soil_period_ms,
            Self::Climate => config.climate_period_ms,
        };
        Duration::from_millis(ms as u64)
    }
}
