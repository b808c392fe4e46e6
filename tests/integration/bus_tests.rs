//! Telemetry bus under real thread contention.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use futures_lite::future::block_on;
use heapless::Vec as HVec;

use nursery::bus::{BUS_SLOTS, SensorBus};
use nursery::message::{Message, SensorKind};

#[test]
fn per_producer_fifo_and_permit_bound_hold_under_contention() {
    const PER_PRODUCER: u32 = 200;
    let bus = Arc::new(SensorBus::new(10).unwrap());
    let sources = [
        SensorKind::OutsideLight,
        SensorKind::SoilHumidity,
        SensorKind::InsideTemperature,
    ];

    let producers: Vec<_> = sources
        .iter()
        .map(|&kind| {
            let bus = Arc::clone(&bus);
            thread::spawn(move || {
                for seq in 0..PER_PRODUCER {
                    block_on(bus.send(Message::new(u64::from(seq), kind, seq as f32))).unwrap();
                }
            })
        })
        .collect();

    let mut last_seen: HashMap<SensorKind, f32> = HashMap::new();
    for _ in 0..PER_PRODUCER * sources.len() as u32 {
        assert!(bus.in_flight() <= bus.permit_count());
        let msg = block_on(bus.receive());
        if let Some(prev) = last_seen.insert(msg.source(), msg.value()) {
            assert!(msg.value() > prev, "{:?} reordered", msg.source());
        }
    }

    for p in producers {
        p.join().unwrap();
    }
    let stats = bus.stats();
    assert_eq!(stats.sent, PER_PRODUCER * 3);
    assert_eq!(stats.delivered, PER_PRODUCER * 3);
    assert_eq!(stats.overruns, 0);
    assert_eq!(bus.in_flight(), 0);
}

#[test]
fn send_blocks_until_consumer_returns_a_permit() {
    let bus = Arc::new(SensorBus::new(2).unwrap());
    bus.try_send(Message::new(0, SensorKind::OutsideLight, 1.0)).unwrap();
    bus.try_send(Message::new(0, SensorKind::OutsideLight, 2.0)).unwrap();

    let done = Arc::new(AtomicBool::new(false));
    let producer = {
        let bus = Arc::clone(&bus);
        let done = Arc::clone(&done);
        thread::spawn(move || {
            block_on(bus.send(Message::new(1, SensorKind::OutsideLight, 3.0))).unwrap();
            done.store(true, Ordering::SeqCst);
        })
    };

    thread::sleep(Duration::from_millis(50));
    assert!(!done.load(Ordering::SeqCst), "send must wait for a permit");
    assert_eq!(bus.in_flight(), 2);

    assert_eq!(block_on(bus.receive()).value(), 1.0);
    producer.join().unwrap();
    assert!(done.load(Ordering::SeqCst));
    assert_eq!(bus.in_flight(), 2);
    assert_eq!(block_on(bus.receive()).value(), 2.0);
    assert_eq!(block_on(bus.receive()).value(), 3.0);
}

#[test]
fn batches_from_racing_producers_are_never_interleaved() {
    const BATCHES: u64 = 100;
    let bus = Arc::new(SensorBus::new(4).unwrap());

    let producers: Vec<_> = (0..2u64)
        .map(|id| {
            let bus = Arc::clone(&bus);
            thread::spawn(move || {
                for n in 0..BATCHES {
                    let stamp = id * 1_000 + n;
                    let mut batch: HVec<Message, 2> = HVec::new();
                    batch
                        .push(Message::new(stamp, SensorKind::InsideTemperature, 20.0))
                        .unwrap();
                    batch
                        .push(Message::new(stamp, SensorKind::InsideHumidity, 50.0))
                        .unwrap();
                    assert!(block_on(bus.send_batch(batch)).is_empty());
                }
            })
        })
        .collect();

    for _ in 0..BATCHES * 2 {
        let temp = block_on(bus.receive());
        let humi = block_on(bus.receive());
        assert_eq!(temp.source(), SensorKind::InsideTemperature);
        assert_eq!(humi.source(), SensorKind::InsideHumidity);
        assert_eq!(temp.timestamp(), humi.timestamp());
    }
    for p in producers {
        p.join().unwrap();
    }
}

#[test]
fn permit_count_equal_to_capacity_is_accepted() {
    let bus = SensorBus::new(BUS_SLOTS).unwrap();
    for i in 0..BUS_SLOTS {
        bus.try_send(Message::new(i as u64, SensorKind::SoilHumidity, 1.0))
            .unwrap();
    }
    assert_eq!(bus.in_flight(), BUS_SLOTS);
    assert!(bus.try_send(Message::new(99, SensorKind::SoilHumidity, 1.0)).is_err());
}
