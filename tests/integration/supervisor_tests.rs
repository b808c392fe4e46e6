//! Supervisor end-to-end: commands through the queue, readings through the
//! bus, actuator calls and events recorded by the mocks.

use nursery::app::events::AppEvent;
use nursery::app::supervisor::Supervisor;
use nursery::config::SystemConfig;
use nursery::context::SystemContext;
use nursery::control::ActuationEffect;
use nursery::error::Error;
use nursery::message::{Message, SensorKind};

use super::mock_hw::{ActuatorCall, ManualClock, MockHardware, RecordingSink};

fn context() -> SystemContext {
    SystemContext::new(SystemConfig::default()).unwrap()
}

/// Submit `codes`, run one iteration, return the actuator calls it made.
fn run_codes(
    ctx: &SystemContext,
    sup: &mut Supervisor<'_>,
    clock: &ManualClock,
    sink: &mut RecordingSink,
    codes: &[i32],
) -> Vec<ActuatorCall> {
    let mut hw = MockHardware::new();
    for &code in codes {
        ctx.commands.submit(code).unwrap();
    }
    sup.poll(&mut hw, clock, sink);
    hw.calls
}

#[test]
fn start_puts_actuators_in_initial_position() {
    let ctx = context();
    let mut sup = Supervisor::new(&ctx);
    let mut hw = MockHardware::new();
    let mut sink = RecordingSink::new();

    sup.start(&mut hw, &mut sink);

    assert_eq!(
        hw.calls,
        [
            ActuatorCall::SetFan(0),
            ActuatorCall::SetServo(90),
            ActuatorCall::SetPump(false)
        ]
    );
    assert!(matches!(sink.events[0], AppEvent::Started(s) if !s.manual_mode));
}

#[test]
fn manual_fan_boundaries() {
    let ctx = context();
    let mut sup = Supervisor::new(&ctx);
    let clock = ManualClock::at(0);
    let mut sink = RecordingSink::new();

    assert_eq!(
        run_codes(&ctx, &mut sup, &clock, &mut sink, &[200, 100]),
        [ActuatorCall::SetFan(100)]
    );
    assert!(run_codes(&ctx, &mut sup, &clock, &mut sink, &[101, 102]).is_empty());
    assert_eq!(ctx.snapshot.get().fan_duty, 100);
    assert_eq!(
        sink.count(|e| matches!(e, AppEvent::CommandIgnored { .. })),
        2
    );
}

#[test]
fn manual_servo_boundaries() {
    let ctx = context();
    let mut sup = Supervisor::new(&ctx);
    let clock = ManualClock::at(0);
    let mut sink = RecordingSink::new();

    assert_eq!(
        run_codes(&ctx, &mut sup, &clock, &mut sink, &[200, 103, 282, 283, 299]),
        [ActuatorCall::SetServo(0), ActuatorCall::SetServo(179)]
    );
    assert_eq!(ctx.snapshot.get().servo_angle, 179);
}

#[test]
fn manual_pump_codes() {
    let ctx = context();
    let mut sup = Supervisor::new(&ctx);
    let clock = ManualClock::at(7_000);
    let mut sink = RecordingSink::new();

    assert_eq!(
        run_codes(&ctx, &mut sup, &clock, &mut sink, &[200, 300]),
        [ActuatorCall::SetPump(false)]
    );
    assert_eq!(
        run_codes(&ctx, &mut sup, &clock, &mut sink, &[301]),
        [ActuatorCall::SetPump(true)]
    );
    let state = ctx.snapshot.get();
    assert!(state.pump_on);
    assert_eq!(state.pump_started_at, 7_000);
    assert!(sink.events.contains(&AppEvent::CommandApplied {
        code: 301,
        effect: ActuationEffect::SetPump {
            on: true,
            started_at: Some(7_000)
        }
    }));
}

#[test]
fn auto_mode_ignores_actuator_codes() {
    let ctx = context();
    let mut sup = Supervisor::new(&ctx);
    let clock = ManualClock::at(0);
    let mut sink = RecordingSink::new();

    assert!(run_codes(&ctx, &mut sup, &clock, &mut sink, &[50, 150, 301]).is_empty());
    let state = ctx.snapshot.get();
    assert_eq!(state.fan_duty, 0);
    assert!(!state.pump_on);
}

#[test]
fn mode_toggle_is_idempotent() {
    let ctx = context();
    let mut sup = Supervisor::new(&ctx);
    let clock = ManualClock::at(0);
    let mut sink = RecordingSink::new();

    run_codes(&ctx, &mut sup, &clock, &mut sink, &[200, 200]);
    assert!(ctx.snapshot.get().manual_mode);
    run_codes(&ctx, &mut sup, &clock, &mut sink, &[201, 201]);
    assert!(!ctx.snapshot.get().manual_mode);
    assert_eq!(
        sink.events
            .iter()
            .filter(|e| matches!(e, AppEvent::ModeChanged { .. }))
            .count(),
        4
    );
}

#[test]
fn pump_is_forced_off_after_limit_even_in_auto_mode() {
    let ctx = context();
    let mut sup = Supervisor::new(&ctx);
    let clock = ManualClock::at(1_000);
    let mut sink = RecordingSink::new();

    // Pump on at T=1000, then back to auto mode.
    run_codes(&ctx, &mut sup, &clock, &mut sink, &[200, 301, 201]);
    assert!(ctx.snapshot.get().pump_on);

    clock.set(6_000);
    assert!(run_codes(&ctx, &mut sup, &clock, &mut sink, &[]).is_empty());
    assert!(ctx.snapshot.get().pump_on);

    clock.set(6_001);
    assert_eq!(
        run_codes(&ctx, &mut sup, &clock, &mut sink, &[]),
        [ActuatorCall::SetPump(false)]
    );
    assert!(!ctx.snapshot.get().pump_on);
    assert_eq!(
        sink.events.last(),
        Some(&AppEvent::PumpSafetyShutoff { ran_for_ms: 5_001 })
    );
    assert_eq!(sup.telemetry().safety_trips, 1);
}

#[test]
fn repeated_pump_on_does_not_extend_the_run() {
    let ctx = context();
    let mut sup = Supervisor::new(&ctx);
    let clock = ManualClock::at(0);
    let mut sink = RecordingSink::new();

    run_codes(&ctx, &mut sup, &clock, &mut sink, &[200, 301]);
    clock.set(4_000);
    run_codes(&ctx, &mut sup, &clock, &mut sink, &[305]);
    clock.set(5_001);
    assert_eq!(
        run_codes(&ctx, &mut sup, &clock, &mut sink, &[]),
        [ActuatorCall::SetPump(false)]
    );
}

#[test]
fn readings_update_state_and_release_permits() {
    let ctx = context();
    let mut sup = Supervisor::new(&ctx);
    let clock = ManualClock::at(0);
    let mut sink = RecordingSink::new();

    for (kind, value) in [
        (SensorKind::InsideTemperature, 24.0),
        (SensorKind::InsideHumidity, 61.0),
        (SensorKind::SoilHumidity, 35.0),
        (SensorKind::OutsideLight, 900.0),
        (SensorKind::FanTop, 1.0),
    ] {
        ctx.bus.try_send(Message::new(10, kind, value)).unwrap();
    }
    run_codes(&ctx, &mut sup, &clock, &mut sink, &[]);

    let state = ctx.snapshot.get();
    assert_eq!(state.temperature, 24.0);
    assert_eq!(state.humidity, 61.0);
    assert_eq!(state.soil_humidity, 35.0);
    assert_eq!(state.light_intensity, 900.0);
    assert_eq!(ctx.bus.in_flight(), 0);
    assert_eq!(ctx.bus.stats().delivered, 5);
    assert_eq!(
        sink.count(|e| matches!(e, AppEvent::SensorUpdated { .. })),
        4
    );
}

#[test]
fn malformed_reading_is_dropped_and_logged() {
    let ctx = context();
    let mut sup = Supervisor::new(&ctx);
    let clock = ManualClock::at(0);
    let mut sink = RecordingSink::new();

    ctx.bus
        .try_send(Message::new(0, SensorKind::SoilHumidity, f32::NAN))
        .unwrap();
    ctx.bus
        .try_send(Message::new(0, SensorKind::SoilHumidity, 44.0))
        .unwrap();
    run_codes(&ctx, &mut sup, &clock, &mut sink, &[]);

    assert_eq!(ctx.snapshot.get().soil_humidity, 44.0);
    assert!(sink.events.contains(&AppEvent::MessageDropped {
        kind: SensorKind::SoilHumidity,
        reason: Error::MalformedMessage
    }));
    assert_eq!(ctx.bus.in_flight(), 0);
}

#[test]
fn step_waits_for_a_reading_within_the_timeout() {
    let config = SystemConfig {
        receive_timeout_ms: 500,
        ..SystemConfig::default()
    };
    let ctx = SystemContext::new(config).unwrap();
    let clock = ManualClock::at(0);
    let mut sink = RecordingSink::new();
    let mut hw = MockHardware::new();

    std::thread::scope(|s| {
        s.spawn(|| {
            std::thread::sleep(std::time::Duration::from_millis(20));
            futures_lite::future::block_on(
                ctx.bus
                    .send(Message::new(20, SensorKind::OutsideLight, 333.0)),
            )
            .unwrap();
        });
        let mut sup = Supervisor::new(&ctx);
        futures_lite::future::block_on(sup.step(&mut hw, &clock, &mut sink));
    });

    assert_eq!(ctx.snapshot.get().light_intensity, 333.0);
}
