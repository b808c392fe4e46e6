//! Simulated sensors for host runs and tests.
//!
//! A [`SimChannel`] is a shared, lock-free input cell: the test (or the host
//! binary, with fixed values) writes into it and the sensor reads it on its
//! next sample. Channels can also pretend the device is absent
//! or make the next reads fail.

use core::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;

use crate::app::ports::SensorPort;
use crate::error::{Error, Result};
use crate::message::SensorKind;

use super::{Reading, Readings, single};

/// Injectable value source behind one simulated device.
#[derive(Debug)]
pub struct SimChannel {
    bits: AtomicU32,
    present: AtomicBool,
    pending_failures: AtomicU32,
}

impl SimChannel {
    pub fn new(initial: f32) -> Arc<Self> {
        Arc::new(Self {
            bits: AtomicU32::new(initial.to_bits()),
            present: AtomicBool::new(true),
            pending_failures: AtomicU32::new(0),
        })
    }

    pub fn set(&self, value: f32) {
        self.bits.store(value.to_bits(), Ordering::Relaxed);
    }

    fn get(&self) -> f32 {
        f32::from_bits(self.bits.load(Ordering::Relaxed))
    }

    /// Make the device look unplugged (or plugged back in).
    pub fn set_present(&self, present: bool) {
        self.present.store(present, Ordering::Relaxed);
    }

    pub fn is_present(&self) -> bool {
        self.present.load(Ordering::Relaxed)
    }

    /// Fail the next `count` reads.
    pub fn fail_next(&self, count: u32) {
        self.pending_failures.store(count, Ordering::Relaxed);
    }

    fn take_failure(&self) -> bool {
        self.pending_failures
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |n| n.checked_sub(1))
            .is_ok()
    }

    fn read(&self, name: &'static str) -> Result<f32> {
        if !self.is_present() {
            return Err(Error::DeviceNotFound(name));
        }
        if self.take_failure() {
            return Err(Error::SensorRead(name));
        }
        Ok(self.get())
    }
}

/// One simulated single-value sensor (light, soil).
pub struct SimSensor {
    name: &'static str,
    kind: SensorKind,
    input: Arc<SimChannel>,
}

impl SimSensor {
    pub fn new(name: &'static str, kind: SensorKind, input: Arc<SimChannel>) -> Self {
        Self { name, kind, input }
    }

    pub fn light(input: Arc<SimChannel>) -> Self {
        Self::new("light", SensorKind::OutsideLight, input)
    }

    pub fn soil(input: Arc<SimChannel>) -> Self {
        Self::new("soil", SensorKind::SoilHumidity, input)
    }
}

impl SensorPort for SimSensor {
    fn name(&self) -> &'static str {
        self.name
    }

    fn probe(&mut self) -> Result<()> {
        if self.input.is_present() {
            Ok(())
        } else {
            Err(Error::DeviceNotFound(self.name))
        }
    }

    fn sample(&mut self) -> Result<Readings> {
        Ok(single(self.kind, self.input.read(self.name)?))
    }
}

/// Simulated temperature/humidity probe. One sample yields both values.
pub struct SimClimate {
    temperature: Arc<SimChannel>,
    humidity: Arc<SimChannel>,
}

impl SimClimate {
    pub fn new(temperature: Arc<SimChannel>, humidity: Arc<SimChannel>) -> Self {
        Self {
            temperature,
            humidity,
        }
    }
}

impl SensorPort for SimClimate {
    fn name(&self) -> &'static str {
        "climate"
    }

    fn probe(&mut self) -> Result<()> {
        if self.temperature.is_present() && self.humidity.is_present() {
            Ok(())
        } else {
            Err(Error::DeviceNotFound("climate"))
        }
    }

    fn sample(&mut self) -> Result<Readings> {
        let temperature = self.temperature.read("climate")?;
        let humidity = self.humidity.read("climate")?;
        let mut readings = Readings::new();
        readings
            .push(Reading::new(SensorKind::InsideTemperature, temperature))
            .map_err(|_| Error::AllocationFailure)?;
        readings
            .push(Reading::new(SensorKind::InsideHumidity, humidity))
            .map_err(|_| Error::AllocationFailure)?;
        Ok(readings)
    }
}
