//! Supervisor, the single consumer of the telemetry bus.
//!
//! [`Supervisor`] owns the [`ControlState`] and the pump safety check. It
//! exposes a hardware-agnostic API: all I/O flows through port traits
//! injected at call sites, so the whole loop runs against mock adapters.
//!
//! ```text
//!  TelemetryBus ──▶ ┌─────────────────────────┐ ──▶ EventSink
//!  CommandQueue ──▶ │       Supervisor        │
//!         Clock ──▶ │ state · dispatch · pump │ ──▶ ActuatorPort
//!                   └────────────┬────────────┘
//!                                └──▶ SnapshotCell (copies for readers)
//! ```
//!
//! One iteration walks the phases in order and never terminates the loop:
//!
//! ```text
//!  Idle ─▶ DrainingBus ─▶ ApplyingCommand ─▶ SafetyCheck ─▶ Idle ─▶ …
//! ```

use core::time::Duration;

use log::{debug, info, warn};

use crate::context::SystemContext;
use crate::control::{ActuationEffect, ControlState, ReadingOutcome, dispatch};
use crate::message::{Message, Tick};
use crate::safety::PumpSafety;

use super::events::{AppEvent, TelemetryData};
use super::ports::{ActuatorPort, Clock, EventSink};

/// Iterations between two telemetry events of [`Supervisor::run`].
pub const TELEMETRY_EVERY: u64 = 50;

/// Where the supervisor currently is within an iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    DrainingBus,
    ApplyingCommand,
    SafetyCheck,
}

// ───────────────────────────────────────────────────────────────
// Supervisor
// ───────────────────────────────────────────────────────────────

pub struct Supervisor<'a> {
    ctx: &'a SystemContext,
    state: ControlState,
    safety: PumpSafety,
    phase: Phase,
    receive_timeout: Duration,
    poll_interval: Duration,
    iterations: u64,
}

impl<'a> Supervisor<'a> {
    pub fn new(ctx: &'a SystemContext) -> Self {
        let config = &ctx.config;
        Self {
            ctx,
            state: ControlState::new(config.servo_park_angle),
            safety: PumpSafety::new(config),
            phase: Phase::Idle,
            receive_timeout: Duration::from_millis(config.receive_timeout_ms as u64),
            poll_interval: Duration::from_millis(config.supervisor_poll_ms as u64),
            iterations: 0,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Put every actuator in its initial position: fan stopped, servo
    /// parked, pump off.
    pub fn start(&mut self, hw: &mut impl ActuatorPort, sink: &mut impl EventSink) {
        hw.set_fan(self.state.fan_duty);
        hw.set_servo(self.state.servo_angle);
        hw.set_pump(false);
        self.ctx.snapshot.publish(self.state);
        sink.emit(&AppEvent::Started(self.state));
        info!(
            "Supervisor started (permits={}/{} slots, pump limit {}ms)",
            self.ctx.bus.permit_count(),
            self.ctx.bus.capacity_slots(),
            self.safety.max_on_ms()
        );
    }

    /// Run forever: one iteration, then a short fixed sleep. Emits a
    /// telemetry event every [`TELEMETRY_EVERY`] iterations.
    pub async fn run(
        mut self,
        hw: &mut impl ActuatorPort,
        clock: &impl Clock,
        sink: &mut impl EventSink,
    ) {
        loop {
            self.step(hw, clock, sink).await;
            if self.iterations % TELEMETRY_EVERY == 0 {
                sink.emit(&AppEvent::Telemetry(self.telemetry()));
            }
            async_io_mini::Timer::after(self.poll_interval).await;
        }
    }

    // ── Per-iteration orchestration ───────────────────────────

    /// One full iteration: bus (bounded wait) → commands → safety → publish.
    pub async fn step(
        &mut self,
        hw: &mut impl ActuatorPort,
        clock: &impl Clock,
        sink: &mut impl EventSink,
    ) {
        self.phase = Phase::DrainingBus;
        if let Some(first) = self.receive_within(self.receive_timeout).await {
            self.apply_message(first, sink);
            self.drain_bus(sink);
        }
        self.finish_iteration(hw, clock, sink);
    }

    /// Same as [`step`](Self::step) but never waits for the bus.
    pub fn poll(
        &mut self,
        hw: &mut impl ActuatorPort,
        clock: &impl Clock,
        sink: &mut impl EventSink,
    ) {
        self.phase = Phase::DrainingBus;
        self.drain_bus(sink);
        self.finish_iteration(hw, clock, sink);
    }

    async fn receive_within(&self, timeout: Duration) -> Option<Message> {
        let bus = &self.ctx.bus;
        futures_lite::future::or(async { Some(bus.receive().await) }, async {
            async_io_mini::Timer::after(timeout).await;
            None
        })
        .await
    }

    fn drain_bus(&mut self, sink: &mut impl EventSink) {
        while let Some(msg) = self.ctx.bus.try_receive() {
            self.apply_message(msg, sink);
        }
    }

    fn finish_iteration(
        &mut self,
        hw: &mut impl ActuatorPort,
        clock: &impl Clock,
        sink: &mut impl EventSink,
    ) {
        self.phase = Phase::ApplyingCommand;
        while let Some(code) = self.ctx.commands.take() {
            self.apply_command(code, hw, clock.now(), sink);
        }

        self.phase = Phase::SafetyCheck;
        self.safety_check(hw, clock.now(), sink);

        self.ctx.snapshot.publish(self.state);
        self.phase = Phase::Idle;
        self.iterations += 1;
    }

    // ── Individual steps ──────────────────────────────────────

    /// Route one dequeued message into the state. The message is released
    /// here whatever the outcome.
    pub fn apply_message(&mut self, msg: Message, sink: &mut impl EventSink) {
        match self.state.apply_reading(&msg) {
            Ok(ReadingOutcome::Updated(kind)) => {
                sink.emit(&AppEvent::SensorUpdated {
                    kind,
                    report: self.state.sensor_report(),
                });
            }
            Ok(ReadingOutcome::Ignored(kind)) => {
                debug!("Supervisor: no state field for {}, ignored", kind.name());
            }
            Err(reason) => {
                warn!(
                    "Supervisor: dropping {} reading from t={} ({})",
                    msg.source().name(),
                    msg.timestamp(),
                    reason
                );
                sink.emit(&AppEvent::MessageDropped {
                    kind: msg.source(),
                    reason,
                });
            }
        }
    }

    /// Dispatch one command code and drive the actuators accordingly.
    pub fn apply_command(
        &mut self,
        code: i32,
        hw: &mut impl ActuatorPort,
        now: Tick,
        sink: &mut impl EventSink,
    ) -> ActuationEffect {
        let effect = dispatch(code, &mut self.state, now);
        match effect {
            ActuationEffect::Ignored => {
                debug!("Supervisor: command {} ignored", code);
                sink.emit(&AppEvent::CommandIgnored { code });
            }
            ActuationEffect::ModeChanged { manual } => {
                sink.emit(&AppEvent::ModeChanged { manual });
            }
            _ => {
                apply_effect(hw, effect);
                sink.emit(&AppEvent::CommandApplied { code, effect });
            }
        }
        effect
    }

    /// Force the pump off if it has outrun its limit.
    pub fn safety_check(
        &mut self,
        hw: &mut impl ActuatorPort,
        now: Tick,
        sink: &mut impl EventSink,
    ) -> Option<ActuationEffect> {
        let started = self.state.pump_started_at;
        let effect = self.safety.evaluate(&mut self.state, now)?;
        apply_effect(hw, effect);
        sink.emit(&AppEvent::PumpSafetyShutoff {
            ran_for_ms: now.saturating_sub(started),
        });
        Some(effect)
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn telemetry(&self) -> TelemetryData {
        TelemetryData {
            state: self.state,
            bus: self.ctx.bus.stats(),
            in_flight: self.ctx.bus.in_flight(),
            safety_trips: self.safety.trips(),
        }
    }

    pub fn state(&self) -> &ControlState {
        &self.state
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Completed iterations since startup.
    pub fn iterations(&self) -> u64 {
        self.iterations
    }
}

/// Translate an effect into actuator port calls.
fn apply_effect(hw: &mut impl ActuatorPort, effect: ActuationEffect) {
    match effect {
        ActuationEffect::SetFan { duty } => hw.set_fan(duty),
        ActuationEffect::SetServo { angle } => hw.set_servo(angle),
        ActuationEffect::SetPump { on, .. } => hw.set_pump(on),
        ActuationEffect::ModeChanged { .. } | ActuationEffect::Ignored => {}
    }
}
