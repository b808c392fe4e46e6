//! DHT11 temperature/humidity probe on a single open-drain data line.
//!
//! Wire protocol, as seen from the host:
//!
//! ```text
//!  host start   sensor ack          40 data bits (MSB first)
//!  ‾‾\_18ms_/‾‾‾\__80us__/‾‾80us‾‾\__50__/‾‾26..28 = 0 or 70 = 1‾‾\__ …
//! ```
//!
//! Frame: `[humi_int, humi_dec, temp_int, temp_dec, checksum]`, where the
//! checksum is the wrapping sum of the first four bytes and bit 7 of
//! `temp_dec` marks a negative temperature. A bit is a one when its high
//! phase outlasts the preceding low phase, which keeps the decision
//! independent of how long one polling step really takes.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};

use crate::app::ports::SensorPort;
use crate::error::{Error, Result};
use crate::message::SensorKind;

use super::{Reading, Readings};

const NAME: &str = "climate";
const START_LOW_MS: u32 = 18;
const PULSE_TIMEOUT_US: u32 = 200;

pub type Frame = [u8; 5];

/// Bit-level access to the data line.
pub struct Dht11Bus<P, D> {
    pin: P,
    delay: D,
}

impl<P: InputPin + OutputPin, D: DelayNs> Dht11Bus<P, D> {
    pub fn new(pin: P, delay: D) -> Self {
        Self { pin, delay }
    }

    pub fn read_frame(&mut self) -> Result<Frame> {
        self.pin.set_low().map_err(|_| Error::SensorRead(NAME))?;
        self.delay.delay_ms(START_LOW_MS);
        self.pin.set_high().map_err(|_| Error::SensorRead(NAME))?;

        // Release, then the sensor's 80us low / 80us high acknowledgement.
        self.pulse(true)?;
        self.pulse(false)?;
        self.pulse(true)?;

        let mut frame = [0u8; 5];
        for bit in 0..40 {
            let low = self.pulse(false)?;
            let high = self.pulse(true)?;
            if high > low {
                frame[bit / 8] |= 0x80 >> (bit % 8);
            }
        }
        Ok(frame)
    }

    /// Microseconds the line stays at `level`.
    fn pulse(&mut self, level: bool) -> Result<u32> {
        let mut us = 0;
        while self.pin.is_high().map_err(|_| Error::SensorRead(NAME))? == level {
            if us >= PULSE_TIMEOUT_US {
                return Err(Error::SensorRead(NAME));
            }
            self.delay.delay_us(1);
            us += 1;
        }
        Ok(us)
    }
}

/// Validate the checksum and return `(temperature °C, humidity %)`.
pub fn decode_frame(frame: Frame) -> Result<(f32, f32)> {
    let sum = frame[..4].iter().fold(0u8, |acc, b| acc.wrapping_add(*b));
    if sum != frame[4] {
        return Err(Error::SensorRead(NAME));
    }
    let humidity = f32::from(frame[0]) + f32::from(frame[1]) / 10.0;
    let magnitude = f32::from(frame[2]) + f32::from(frame[3] & 0x7f) / 10.0;
    let temperature = if frame[3] & 0x80 != 0 {
        -magnitude
    } else {
        magnitude
    };
    Ok((temperature, humidity))
}

pub struct Dht11<P, D> {
    bus: Option<Dht11Bus<P, D>>,
}

impl<P: InputPin + OutputPin, D: DelayNs> Dht11<P, D> {
    pub fn new(bus: Option<Dht11Bus<P, D>>) -> Self {
        Self { bus }
    }
}

impl<P: InputPin + OutputPin, D: DelayNs> SensorPort for Dht11<P, D> {
    fn name(&self) -> &'static str {
        NAME
    }

    fn probe(&mut self) -> Result<()> {
        match self.bus {
            Some(_) => Ok(()),
            None => Err(Error::DeviceNotFound(NAME)),
        }
    }

    fn sample(&mut self) -> Result<Readings> {
        let bus = self.bus.as_mut().ok_or(Error::DeviceNotFound(NAME))?;
        let (temperature, humidity) = decode_frame(bus.read_frame()?)?;
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
