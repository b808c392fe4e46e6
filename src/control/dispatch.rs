//! Command dispatcher: integer command code → actuation decision.
//!
//! Code map, evaluated strictly in this order:
//!
//! ```text
//!   200 / 201            manual mode on / off        (always honoured)
//!   ── below only while manual mode is on ──────────────────────────
//!     0 ..= 100          fan duty %
//!   101 ..= 102          (gap)                       Ignored
//!   103 ..= 282          servo angle = code - 103    (0 ..= 179°)
//!   283 ..= 299          (gap)                       Ignored
//!   300                  pump off
//!   301 ..               pump on
//!   ── anything else, or manual mode off ───────────────────────────
//!                        Ignored
//! ```

use crate::control::state::ControlState;
use crate::message::Tick;

pub const MANUAL_ENABLE: i32 = 200;
pub const MANUAL_DISABLE: i32 = 201;
pub const FAN_MAX: i32 = 100;
pub const SERVO_BASE: i32 = 103;
pub const SERVO_MAX: i32 = 282;
pub const PUMP_BASE: i32 = 300;

/// The decision produced for one command code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActuationEffect {
    /// Manual mode was set to `manual`.
    ModeChanged { manual: bool },
    /// Fan duty, 0–100 %.
    SetFan { duty: u8 },
    /// Servo angle, 0–179°.
    SetServo { angle: u8 },
    /// Pump state. `started_at` is the run start while the pump is on.
    SetPump { on: bool, started_at: Option<Tick> },
    /// Nothing to do.
    Ignored,
}

/// Decide what `code` means in the current mode and update `state`.
///
/// Total over every `i32`. `now` is only used to stamp an off→on pump
/// transition; asking for "on" while the pump already runs keeps the
/// original start time, so repeated commands cannot extend the run.
pub fn dispatch(code: i32, state: &mut ControlState, now: Tick) -> ActuationEffect {
    if code == MANUAL_ENABLE || code == MANUAL_DISABLE {
        state.manual_mode = code == MANUAL_ENABLE;
        return ActuationEffect::ModeChanged {
            manual: state.manual_mode,
        };
    }

    if !state.manual_mode {
        return ActuationEffect::Ignored;
    }

    match code {
        0..=FAN_MAX => {
            let duty = code as u8;
            state.fan_duty = duty;
            ActuationEffect::SetFan { duty }
        }
        SERVO_BASE..=SERVO_MAX => {
            let angle = (code - SERVO_BASE) as u8;
            state.servo_angle = angle;
            ActuationEffect::SetServo { angle }
        }
        PUMP_BASE.. => {
            let on = code != PUMP_BASE;
            if on && !state.pump_on {
                state.pump_started_at = now;
            }
            state.pump_on = on;
            ActuationEffect::SetPump {
                on,
                started_at: on.then_some(state.pump_started_at),
            }
        }
        _ => ActuationEffect::Ignored,
    }
}
