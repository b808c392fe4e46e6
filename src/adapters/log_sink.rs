//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing one line per application event to
//! the logger (UART on the board, stderr on the host). Lines start with a
//! fixed tag so they can be grepped.

use log::{error, info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`].
#[derive(Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Started(state) => {
                info!(
                    "START | fan={}% servo={}\u{00b0} pump={} manual={}",
                    state.fan_duty,
                    state.servo_angle,
                    if state.pump_on { "ON" } else { "OFF" },
                    state.manual_mode
                );
            }
            AppEvent::SensorUpdated { kind, report } => {
                info!(
                    "SENSOR | {} | T={:.1}\u{00b0}C H={:.1}% S={:.1}% L={:.1}",
                    kind.name(),
                    report.temp,
                    report.humi,
                    report.soil,
                    report.light
                );
            }
            AppEvent::MessageDropped { kind, reason } => {
                warn!("DROP | {} | {}", kind.name(), reason);
            }
            AppEvent::ModeChanged { manual } => {
                info!("MODE | {}", if *manual { "manual" } else { "auto" });
            }
            AppEvent::CommandApplied { code, effect } => {
                info!("ACT | cmd={} -> {:?}", code, effect);
            }
            AppEvent::CommandIgnored { code } => {
                info!("ACT | cmd={} ignored", code);
            }
            AppEvent::PumpSafetyShutoff { ran_for_ms } => {
                error!("SAFETY | pump forced off after {}ms", ran_for_ms);
            }
            AppEvent::Telemetry(t) => {
                info!(
                    "TELEM | T={:.1}\u{00b0}C H={:.1}% S={:.1}% L={:.1} | fan={}% servo={}\u{00b0} \
                     pump={} manual={} | bus sent={} delivered={} overruns={} in_flight={} | \
                     safety_trips={}",
                    t.state.temperature,
                    t.state.humidity,
                    t.state.soil_humidity,
                    t.state.light_intensity,
                    t.state.fan_duty,
                    t.state.servo_angle,
                    if t.state.pump_on { "ON" } else { "OFF" },
                    t.state.manual_mode,
                    t.bus.sent,
                    t.bus.delivered,
                    t.bus.overruns,
                    t.in_flight,
                    t.safety_trips,
                );
            }
        }
    }
}
