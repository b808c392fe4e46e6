//! Board bring-up for the ESP32-S3 controller board.
//!
//! Pin map and the ADC1 oneshot unit shared by the light and soil
//! channels. PWM and GPIO peripherals are taken through esp-idf-hal in
//! `main`; only the ADC goes through raw sys calls, since one unit serves
//! two tasks.

use std::sync::Arc;

use esp_idf_svc::sys::*;
use log::info;

use crate::error::{Error, Result};
use crate::sensors::analog::AdcChannel;

// ── Pin map ───────────────────────────────────────────────────

/// ADC1 channel of the light sensor divider (GPIO4).
pub const LIGHT_ADC_CH: u32 = 3;
/// ADC1 channel of the soil probe (GPIO3).
pub const SOIL_ADC_CH: u32 = 2;
// DHT11 data GPIO5, fan PWM GPIO6, servo PWM GPIO7, pump GPIO8: taken as
// typed pins in `main`.

/// Full-scale input at 12 dB attenuation, nominal.
const ADC_FULL_SCALE_MV: u32 = 3_300;
const ADC_MAX_RAW: u32 = 4_095;

// ── ADC1 oneshot unit ─────────────────────────────────────────

pub struct Adc1 {
    handle: adc_oneshot_unit_handle_t,
}

// SAFETY: the oneshot driver serialises reads on a unit internally; the
// handle is never freed while an `Arc<Adc1>` exists.
unsafe impl Send for Adc1 {}
unsafe impl Sync for Adc1 {}

impl Adc1 {
    /// Create the unit and configure `channels` for 12-bit reads.
    pub fn new(channels: &[u32]) -> Result<Arc<Self>> {
        let init_cfg = adc_oneshot_unit_init_cfg_t {
            unit_id: adc_unit_t_ADC_UNIT_1,
            ulp_mode: adc_ulp_mode_t_ADC_ULP_MODE_DISABLE,
            ..Default::default()
        };
        let mut handle: adc_oneshot_unit_handle_t = core::ptr::null_mut();
        // SAFETY: out-pointer to a local; called once at boot.
        let ret = unsafe { adc_oneshot_new_unit(&init_cfg, &mut handle) };
        if ret != ESP_OK as i32 {
            return Err(Error::DeviceNotFound("adc1"));
        }

        let chan_cfg = adc_oneshot_chan_cfg_t {
            atten: adc_atten_t_ADC_ATTEN_DB_12,
            bitwidth: adc_bitwidth_t_ADC_BITWIDTH_12,
        };
        for &channel in channels {
            // SAFETY: handle was just created above.
            let ret = unsafe { adc_oneshot_config_channel(handle, channel, &chan_cfg) };
            if ret != ESP_OK as i32 {
                return Err(Error::DeviceNotFound("adc1"));
            }
        }

        info!("board: ADC1 configured (channels {:?})", channels);
        Ok(Arc::new(Self { handle }))
    }

    pub fn channel(self: &Arc<Self>, channel: u32) -> BoardAdcChannel {
        BoardAdcChannel {
            unit: Arc::clone(self),
            channel,
        }
    }
}

pub struct BoardAdcChannel {
    unit: Arc<Adc1>,
    channel: u32,
}

impl AdcChannel for BoardAdcChannel {
    fn read_millivolts(&mut self) -> Result<u16> {
        let mut raw: i32 = 0;
        // SAFETY: the unit outlives this channel (Arc) and the channel was
        // configured in `Adc1::new`.
        let ret = unsafe { adc_oneshot_read(self.unit.handle, self.channel, &mut raw) };
        if ret != ESP_OK as i32 {
            return Err(Error::SensorRead("adc1"));
        }
        let raw = (raw.max(0) as u32).min(ADC_MAX_RAW);
        Ok((raw * ADC_FULL_SCALE_MV / ADC_MAX_RAW) as u16)
    }
}
