//! Outbound application events.
//!
//! The [`Supervisor`](super::supervisor::Supervisor) emits these through
//! the [`EventSink`](super::ports::EventSink) port. Adapters on the other
//! side decide what to do with them (serial log, dashboard feed, test
//! recorder).

use crate::bus::BusStats;
use crate::control::{ActuationEffect, ControlState, SensorReport};
use crate::error::Error;
use crate::message::SensorKind;

/// Structured events emitted by the control core.
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    /// Actuators were initialised; carries the initial state.
    Started(ControlState),

    /// A reading was applied. Carries the full sensor picture afterwards.
    SensorUpdated {
        kind: SensorKind,
        report: SensorReport,
    },

    /// A bus message was dropped by the consumer.
    MessageDropped { kind: SensorKind, reason: Error },

    /// Manual mode was set by a command.
    ModeChanged { manual: bool },

    /// A command code was dispatched and its effect applied.
    CommandApplied { code: i32, effect: ActuationEffect },

    /// A command code had no effect (auto mode, or a code in a gap).
    CommandIgnored { code: i32 },

    /// The pump ran past its limit and was forced off.
    PumpSafetyShutoff { ran_for_ms: u64 },

    /// Periodic telemetry snapshot.
    Telemetry(TelemetryData),
}

/// A point-in-time telemetry snapshot suitable for logging or transmission.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TelemetryData {
    pub state: ControlState,
    pub bus: BusStats,
    pub in_flight: usize,
    pub safety_trips: u32,
}
