//! Controller state owned by the supervisor, and its published snapshot.
//!
//! [`ControlState`] is written by exactly one task (the supervisor). Every
//! other task sees it only as a copy taken from [`SnapshotCell`], which swaps
//! the whole record under a critical section so a reader can never observe
//! a half-applied update.

use core::cell::Cell;

use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use serde::Serialize;

use crate::error::{Error, Result};
use crate::message::{Message, SensorKind, Tick};

/// Latest readings plus actuator and mode flags.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ControlState {
    /// Indoor air temperature (°C).
    pub temperature: f32,
    /// Indoor relative humidity (%RH).
    pub humidity: f32,
    /// Soil moisture (%).
    pub soil_humidity: f32,
    /// Outside light (lux).
    pub light_intensity: f32,

    /// Whether external commands may drive the actuators.
    pub manual_mode: bool,
    /// Fan duty cycle, 0–100 %.
    pub fan_duty: u8,
    /// Servo angle, 0–180°.
    pub servo_angle: u8,
    pub pump_on: bool,
    /// Tick at which the pump last went from off to on.
    pub pump_started_at: Tick,
}

impl Default for ControlState {
    fn default() -> Self {
        Self::new(90)
    }
}

/// What happened to a reading routed into [`ControlState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadingOutcome {
    /// The matching field was overwritten.
    Updated(SensorKind),
    /// The kind has no field in the state (actuator echo, manual flag).
    Ignored(SensorKind),
}

impl ControlState {
    /// Everything off, servo parked at `servo_angle`.
    pub const fn new(servo_angle: u8) -> Self {
        Self {
            temperature: 0.0,
            humidity: 0.0,
            soil_humidity: 0.0,
            light_intensity: 0.0,
            manual_mode: false,
            fan_duty: 0,
            servo_angle,
            pump_on: false,
            pump_started_at: 0,
        }
    }

    /// Route a reading into its field.
    pub fn apply_reading(&mut self, msg: &Message) -> Result<ReadingOutcome> {
        if !msg.is_well_formed() {
            return Err(Error::MalformedMessage);
        }
        let value = msg.value();
        match msg.source() {
            SensorKind::InsideTemperature => self.temperature = value,
            SensorKind::InsideHumidity => self.humidity = value,
            SensorKind::SoilHumidity => self.soil_humidity = value,
            SensorKind::OutsideLight => self.light_intensity = value,
            other @ (SensorKind::FanTop | SensorKind::WaterPump | SensorKind::ManualControl) => {
                return Ok(ReadingOutcome::Ignored(other));
            }
        }
        Ok(ReadingOutcome::Updated(msg.source()))
    }

    /// Sensor half of the state, in the dashboard's wire shape.
    pub fn sensor_report(&self) -> SensorReport {
        SensorReport {
            temp: one_decimal(self.temperature),
            humi: one_decimal(self.humidity),
            soil: one_decimal(self.soil_humidity),
            light: one_decimal(self.light_intensity),
        }
    }
}

fn one_decimal(v: f32) -> f32 {
    (v * 10.0).round() / 10.0
}

/// `{"temp":..,"humi":..,"soil":..,"light":..}` served to the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SensorReport {
    pub temp: f32,
    pub humi: f32,
    pub soil: f32,
    pub light: f32,
}

impl SensorReport {
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|_| Error::MalformedMessage)
    }
}

// ---------------------------------------------------------------------------
// Snapshot publication
// ---------------------------------------------------------------------------

/// Single-writer, many-reader copy of the latest [`ControlState`].
pub struct SnapshotCell {
    inner: Mutex<CriticalSectionRawMutex, Cell<ControlState>>,
}

impl SnapshotCell {
    pub const fn new(initial: ControlState) -> Self {
        Self {
            inner: Mutex::new(Cell::new(initial)),
        }
    }

    /// Replace the published record. Called by the supervisor only.
    pub fn publish(&self, state: ControlState) {
        self.inner.lock(|cell| cell.set(state));
    }

    /// Point-in-time copy of the whole record.
    pub fn get(&self) -> ControlState {
        self.inner.lock(Cell::get)
    }
}

impl Default for SnapshotCell {
    fn default() -> Self {
        Self::new(ControlState::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn readings_land_in_their_fields() {
        let mut s = ControlState::default();
        let cases = [
            (SensorKind::InsideTemperature, 23.5),
            (SensorKind::InsideHumidity, 58.0),
            (SensorKind::SoilHumidity, 37.25),
            (SensorKind::OutsideLight, 1450.0),
        ];
        for (kind, value) in cases {
            let out = s.apply_reading(&Message::new(1, kind, value)).unwrap();
            assert_eq!(out, ReadingOutcome::Updated(kind));
        }
        assert_eq!(s.temperature, 23.5);
        assert_eq!(s.humidity, 58.0);
        assert_eq!(s.soil_humidity, 37.25);
        assert_eq!(s.light_intensity, 1450.0);
    }

    #[test]
    fn actuator_kinds_do_not_touch_state() {
        let mut s = ControlState::default();
        let before = s;
        for kind in [SensorKind::FanTop, SensorKind::WaterPump, SensorKind::ManualControl] {
            let out = s.apply_reading(&Message::new(1, kind, 1.0)).unwrap();
            assert_eq!(out, ReadingOutcome::Ignored(kind));
        }
        assert_eq!(s, before);
    }

    #[test]
    fn malformed_reading_is_rejected_without_side_effects() {
        let mut s = ControlState::default();
        s.temperature = 21.0;
        let err = s
            .apply_reading(&Message::new(1, SensorKind::InsideTemperature, f32::NAN))
            .unwrap_err();
        assert_eq!(err, Error::MalformedMessage);
        assert_eq!(s.temperature, 21.0);
    }

    #[test]
    fn report_json_matches_dashboard_shape() {
        let mut s = ControlState::default();
        s.temperature = 24.26;
        s.humidity = 60.0;
        s.soil_humidity = 41.04;
        s.light_intensity = 812.0;
        let json = s.sensor_report().to_json().unwrap();
        let v: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert!((v["temp"].as_f64().unwrap() - 24.3).abs() < 1e-4);
        assert!((v["soil"].as_f64().unwrap() - 41.0).abs() < 1e-4);
        assert!((v["light"].as_f64().unwrap() - 812.0).abs() < 1e-4);
        assert!(v.get("humi").is_some());
    }

    #[test]
    fn snapshot_is_a_copy() {
        let cell = SnapshotCell::default();
        let mut copy = cell.get();
        copy.pump_on = true;
        assert!(!cell.get().pump_on);

        cell.publish(copy);
        assert!(cell.get().pump_on);
    }
}
