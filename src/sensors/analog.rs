//! ADC-backed sensors: outside light and soil humidity.
//!
//! Both are resistive dividers read as a voltage and mapped linearly onto
//! engineering units, clamped at the ends of the calibrated span.
//!
//! | Sensor | Span (mV)            | Output          |
//! |--------|----------------------|-----------------|
//! | light  | 100 (dark) → 2000    | 0 → 2000 lux    |
//! | soil   | 2500 (dry) → 1000    | 0 → 100 %       |

use crate::app::ports::SensorPort;
use crate::error::{Error, Result};
use crate::message::SensorKind;

use super::{Readings, single};

/// One ADC input, already scaled to millivolts.
pub trait AdcChannel {
    fn read_millivolts(&mut self) -> Result<u16>;
}

pub const LIGHT_DARK_MV: u16 = 100;
pub const LIGHT_BRIGHT_MV: u16 = 2_000;
pub const LIGHT_MAX_LUX: f32 = 2_000.0;

pub const SOIL_DRY_MV: u16 = 2_500;
pub const SOIL_WET_MV: u16 = 1_000;

pub fn light_lux(mv: u16) -> f32 {
    if mv <= LIGHT_DARK_MV {
        0.0
    } else if mv >= LIGHT_BRIGHT_MV {
        LIGHT_MAX_LUX
    } else {
        LIGHT_MAX_LUX * f32::from(mv - LIGHT_DARK_MV) / f32::from(LIGHT_BRIGHT_MV - LIGHT_DARK_MV)
    }
}

pub fn soil_percent(mv: u16) -> f32 {
    let span = f32::from(SOIL_DRY_MV - SOIL_WET_MV);
    (100.0 * (f32::from(SOIL_DRY_MV) - f32::from(mv)) / span).clamp(0.0, 100.0)
}

pub struct AnalogSensor<A> {
    name: &'static str,
    kind: SensorKind,
    adc: Option<A>,
    convert: fn(u16) -> f32,
}

impl<A: AdcChannel> AnalogSensor<A> {
    pub fn light(adc: Option<A>) -> Self {
        Self {
            name: "light",
            kind: SensorKind::OutsideLight,
            adc,
            convert: light_lux,
        }
    }

    pub fn soil(adc: Option<A>) -> Self {
        Self {
            name: "soil",
            kind: SensorKind::SoilHumidity,
            adc,
            convert: soil_percent,
        }
    }
}

impl<A: AdcChannel> SensorPort for AnalogSensor<A> {
    fn name(&self) -> &'static str {
        self.name
    }

    fn probe(&mut self) -> Result<()> {
        match self.adc {
            Some(_) => Ok(()),
            None => Err(Error::DeviceNotFound(self.name)),
        }
    }

    fn sample(&mut self) -> Result<Readings> {
        let adc = self.adc.as_mut().ok_or(Error::DeviceNotFound(self.name))?;
        let mv = adc.read_millivolts()?;
        Ok(single(self.kind, (self.convert)(mv)))
    }
}
