//! Sensor observations carried on the telemetry bus.
//!
//! A [`Message`] is created by exactly one producer and moved exactly once
//! into the bus. It is deliberately neither `Clone` nor `Copy`: after
//! [`TelemetryBus::send`](crate::bus::TelemetryBus::send) the producer no
//! longer has it, unless the bus hands it back inside an error.

use crate::error::Error;

/// Monotonic time in milliseconds since boot.
pub type Tick = u64;

/// The physical quantity a [`Message`] carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum SensorKind {
    OutsideLight = 0,
    InsideTemperature = 1,
    InsideHumidity = 2,
    SoilHumidity = 3,
    FanTop = 4,
    WaterPump = 5,
    ManualControl = 6,
}

impl SensorKind {
    pub const ALL: [SensorKind; 7] = [
        Self::OutsideLight,
        Self::InsideTemperature,
        Self::InsideHumidity,
        Self::SoilHumidity,
        Self::FanTop,
        Self::WaterPump,
        Self::ManualControl,
    ];

    /// Short label used in log lines.
    pub const fn name(self) -> &'static str {
        match self {
            Self::OutsideLight => "light_outside",
            Self::InsideTemperature => "temp_inside",
            Self::InsideHumidity => "humi_inside",
            Self::SoilHumidity => "humi_earth",
            Self::FanTop => "fan_top",
            Self::WaterPump => "water_pump",
            Self::ManualControl => "manual_ctrl",
        }
    }
}

impl TryFrom<u8> for SensorKind {
    type Error = Error;

    fn try_from(raw: u8) -> Result<Self, Self::Error> {
        Self::ALL
            .get(raw as usize)
            .copied()
            .ok_or(Error::MalformedMessage)
    }
}

/// One sensor observation. Immutable once constructed.
#[derive(Debug, PartialEq)]
pub struct Message {
    timestamp: Tick,
    source: SensorKind,
    value: f32,
}

impl Message {
    pub fn new(timestamp: Tick, source: SensorKind, value: f32) -> Self {
        Self {
            timestamp,
            source,
            value,
        }
    }

    pub fn timestamp(&self) -> Tick {
        self.timestamp
    }

    pub fn source(&self) -> SensorKind {
        self.source
    }

    pub fn value(&self) -> f32 {
        self.value
    }

    /// A reading the consumer can route: the value must be finite.
    pub fn is_well_formed(&self) -> bool {
        self.value.is_finite()
    }
}
