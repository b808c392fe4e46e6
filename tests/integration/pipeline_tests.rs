//! Sensor producers → bus → supervisor, with simulated devices.

use std::time::Duration;

use futures_lite::future::block_on;

use nursery::app::events::AppEvent;
use nursery::app::supervisor::Supervisor;
use nursery::config::SystemConfig;
use nursery::context::SystemContext;
use nursery::error::Error;
use nursery::sensors::producer::Producer;
use nursery::sensors::sim::{SimChannel, SimClimate, SimSensor};

use super::mock_hw::{ManualClock, MockHardware, RecordingSink};

#[test]
fn sampled_values_reach_the_snapshot() {
    let ctx = SystemContext::new(SystemConfig::default()).unwrap();
    let clock = ManualClock::at(2_000);
    let mut sink = RecordingSink::new();
    let mut hw = MockHardware::new();
    let mut sup = Supervisor::new(&ctx);

    let mut light = Producer::new(
        SimSensor::light(SimChannel::new(1_200.0)),
        &ctx.bus,
        &clock,
        Duration::from_secs(1),
    );
    let mut climate = Producer::new(
        SimClimate::new(SimChannel::new(26.3), SimChannel::new(48.0)),
        &ctx.bus,
        &clock,
        Duration::from_secs(2),
    );
    block_on(light.sample_once()).unwrap();
    block_on(climate.sample_once()).unwrap();
    assert_eq!(ctx.bus.in_flight(), 3);

    sup.poll(&mut hw, &clock, &mut sink);

    let report = ctx.snapshot.get().sensor_report();
    assert_eq!(report.light, 1_200.0);
    assert_eq!(report.temp, 26.3);
    assert_eq!(report.humi, 48.0);
    assert_eq!(
        report.to_json().unwrap(),
        r#"{"temp":26.3,"humi":48.0,"soil":0.0,"light":1200.0}"#
    );
    assert_eq!(ctx.bus.in_flight(), 0);
}

#[test]
fn a_missing_sensor_does_not_stop_the_others() {
    let ctx = SystemContext::new(SystemConfig::default()).unwrap();
    let clock = ManualClock::at(0);
    let mut sink = RecordingSink::new();
    let mut sup = Supervisor::new(&ctx);

    let absent = SimChannel::new(0.0);
    absent.set_present(false);
    block_on(Producer::new(SimSensor::light(absent), &ctx.bus, &clock, Duration::from_secs(1)).run());

    let mut soil = Producer::new(
        SimSensor::soil(SimChannel::new(37.0)),
        &ctx.bus,
        &clock,
        Duration::from_secs(2),
    );
    block_on(soil.sample_once()).unwrap();
    sup.poll(&mut MockHardware::new(), &clock, &mut sink);

    assert_eq!(ctx.snapshot.get().soil_humidity, 37.0);
    assert_eq!(ctx.snapshot.get().light_intensity, 0.0);
}

#[test]
fn failed_read_is_retried_on_the_next_cycle() {
    let ctx = SystemContext::new(SystemConfig::default()).unwrap();
    let clock = ManualClock::at(0);
    let input = SimChannel::new(52.0);
    let mut soil = Producer::new(SimSensor::soil(input.clone()), &ctx.bus, &clock, Duration::from_secs(2));

    input.fail_next(1);
    assert_eq!(block_on(soil.sample_once()), Err(Error::SensorRead("soil")));
    clock.advance(2_000);
    assert!(block_on(soil.sample_once()).is_ok());
    assert_eq!(ctx.bus.try_receive().unwrap().timestamp(), 2_000);
}

#[test]
fn sensor_events_carry_the_full_report() {
    let ctx = SystemContext::new(SystemConfig::default()).unwrap();
    let clock = ManualClock::at(0);
    let mut sink = RecordingSink::new();
    let mut sup = Supervisor::new(&ctx);
    let mut soil = Producer::new(
        SimSensor::soil(SimChannel::new(41.04)),
        &ctx.bus,
        &clock,
        Duration::from_secs(2),
    );

    block_on(soil.sample_once()).unwrap();
    sup.poll(&mut MockHardware::new(), &clock, &mut sink);

    let Some(AppEvent::SensorUpdated { report, .. }) = sink.events.first() else {
        panic!("expected a sensor update, got {:?}", sink.events);
    };
    assert_eq!(report.soil, 41.0);
}
