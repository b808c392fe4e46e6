//! Mock adapters for integration tests.
//!
//! Records every actuator call and every emitted event so tests can assert
//! on the full history without touching real GPIO/PWM.

use std::cell::Cell;

use nursery::app::events::AppEvent;
use nursery::app::ports::{ActuatorPort, Clock, EventSink};
use nursery::message::Tick;

// ── Actuator call record ──────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActuatorCall {
    SetFan(u8),
    SetServo(u8),
    SetPump(bool),
}

// ── MockHardware ──────────────────────────────────────────────

#[derive(Default)]
pub struct MockHardware {
    pub calls: Vec<ActuatorCall>,
}

#[allow(dead_code)]
impl MockHardware {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_call(&self) -> Option<ActuatorCall> {
        self.calls.last().copied()
    }

    pub fn pump_on(&self) -> bool {
        self.calls
            .iter()
            .rev()
            .find_map(|c| match c {
                ActuatorCall::SetPump(on) => Some(*on),
                _ => None,
            })
            .unwrap_or(false)
    }

    pub fn clear(&mut self) {
        self.calls.clear();
    }
}

impl ActuatorPort for MockHardware {
    fn set_fan(&mut self, duty: u8) {
        self.calls.push(ActuatorCall::SetFan(duty));
    }

    fn set_servo(&mut self, angle: u8) {
        self.calls.push(ActuatorCall::SetServo(angle));
    }

    fn set_pump(&mut self, on: bool) {
        self.calls.push(ActuatorCall::SetPump(on));
    }
}

// ── ManualClock ───────────────────────────────────────────────

/// Clock that only moves when the test says so.
#[derive(Default)]
pub struct ManualClock {
    now: Cell<Tick>,
}

#[allow(dead_code)]
impl ManualClock {
    pub fn at(now: Tick) -> Self {
        Self {
            now: Cell::new(now),
        }
    }

    pub fn set(&self, now: Tick) {
        self.now.set(now);
    }

    pub fn advance(&self, ms: Tick) {
        self.now.set(self.now.get() + ms);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Tick {
        self.now.get()
    }
}

// ── RecordingSink ─────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingSink {
    pub events: Vec<AppEvent>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self, pred: impl Fn(&AppEvent) -> bool) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}
