//! Pump safety shutoff.
//!
//! Runs once per supervisor iteration, after commands have been applied.
//! If the pump has been running for longer than the configured limit it is
//! forced off, whatever the mode and whatever the last command asked for.
//! This is the only path that stops the pump without an explicit command.
//!
//! ```text
//!   pump_on && now - pump_started_at > pump_max_on_ms   ──▶  SetPump(off)
//! ```

use log::error;

use crate::config::SystemConfig;
use crate::control::{ActuationEffect, ControlState};
use crate::message::Tick;

/// Time-bounded pump shutoff.
pub struct PumpSafety {
    max_on_ms: Tick,
    /// Number of forced shutoffs since startup.
    trips: u32,
}

impl PumpSafety {
    pub fn new(config: &SystemConfig) -> Self {
        Self {
            max_on_ms: config.pump_max_on_ms as Tick,
            trips: 0,
        }
    }

    /// Check the pump against the run-time limit.
    ///
    /// Returns the effect to apply when the pump has to be stopped.
    pub fn evaluate(&mut self, state: &mut ControlState, now: Tick) -> Option<ActuationEffect> {
        if !state.pump_on {
            return None;
        }
        let ran_for = now.saturating_sub(state.pump_started_at);
        if ran_for <= self.max_on_ms {
            return None;
        }

        state.pump_on = false;
        self.trips = self.trips.saturating_add(1);
        error!(
            "SAFETY: pump ran {}ms (limit {}ms), forcing off (manual_mode={})",
            ran_for, self.max_on_ms, state.manual_mode
        );
        Some(ActuationEffect::SetPump {
            on: false,
            started_at: None,
        })
    }

    pub fn trips(&self) -> u32 {
        self.trips
    }

    pub fn max_on_ms(&self) -> Tick {
        self.max_on_ms
    }
}
