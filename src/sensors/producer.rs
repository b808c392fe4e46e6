//! Sampling producer, one task per physical sensor.
//!
//! Every period the producer samples its [`SensorPort`], stamps the readings
//! with the current tick and moves them onto the bus. Nothing a producer
//! hits is fatal:
//!
//! * device missing at startup → warn once, retire this producer only;
//! * failed read → warn, retry next period;
//! * bus overrun → the message is dropped, the permit is already back.

use core::time::Duration;

use heapless::Vec;
use log::{debug, info, warn};

use crate::app::ports::{Clock, SensorPort};
use crate::bus::SensorBus;
use crate::error::{Error, Result};
use crate::message::{Message, SensorKind};

use super::{MAX_READINGS_PER_SAMPLE, Readings};

/// Outcome of one sampling cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleReport {
    /// Messages accepted by the bus.
    pub sent: usize,
    /// Messages dropped: refused by the bus or discarded as implausible.
    pub dropped: usize,
}

pub struct Producer<'a, S, C> {
    sensor: S,
    bus: &'a SensorBus,
    clock: &'a C,
    period: Duration,
}

impl<'a, S: SensorPort, C: Clock> Producer<'a, S, C> {
    pub fn new(sensor: S, bus: &'a SensorBus, clock: &'a C, period: Duration) -> Self {
        Self {
            sensor,
            bus,
            clock,
            period,
        }
    }

    /// Sample forever. Returns only if the device is missing at startup.
    pub async fn run(mut self) {
        if let Err(e) = self.sensor.probe() {
            warn!("{}: {}, producer disabled", self.sensor.name(), e);
            return;
        }
        info!(
            "{}: sampling every {}ms",
            self.sensor.name(),
            self.period.as_millis()
        );

        loop {
            // Failures are already logged; the next period retries.
            let _ = self.sample_once().await;
            async_io_mini::Timer::after(self.period).await;
        }
    }

    /// One sampling cycle: read, stamp, send.
    pub async fn sample_once(&mut self) -> Result<CycleReport> {
        let readings = self.sensor.sample().inspect_err(|e| {
            warn!("{}: read failed ({}), retrying next period", self.sensor.name(), e);
        })?;

        if let Some(temp) = negative_temperature(&readings) {
            debug!(
                "{}: discarding sample with temperature {:.1}",
                self.sensor.name(),
                temp
            );
            return Ok(CycleReport {
                sent: 0,
                dropped: readings.len(),
            });
        }

        let now = self.clock.now();
        let mut batch: Vec<Message, MAX_READINGS_PER_SAMPLE> = Vec::new();
        for reading in &readings {
            batch
                .push(Message::new(now, reading.kind, reading.value))
                .map_err(|_| Error::AllocationFailure)?;
        }

        let total = batch.len();
        let dropped = if total == 1 {
            match batch.pop() {
                Some(msg) => usize::from(self.bus.send(msg).await.is_err()),
                None => 0,
            }
        } else {
            // Readings of one sample stay adjacent on the bus.
            self.bus.send_batch(batch).await.len()
        };

        if dropped > 0 {
            warn!("{}: {} message(s) dropped on overrun", self.sensor.name(), dropped);
        }
        Ok(CycleReport {
            sent: total - dropped,
            dropped,
        })
    }
}

/// A climate probe sample with a sub-zero temperature is treated as a bad
/// read and discarded whole.
fn negative_temperature(readings: &Readings) -> Option<f32> {
    readings
        .iter()
        .find(|r| r.kind == SensorKind::InsideTemperature && r.value < 0.0)
        .map(|r| r.value)
}
