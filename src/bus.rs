//! Sensor telemetry bus: a bounded multi-producer / single-consumer queue.
//!
//! ```text
//!  ┌────────────┐
//!  │ light task │──┐    ┌───────────────┐  ┌────────────┐   ┌────────────┐
//!  └────────────┘  │    │ producer lock │  │  permits   │   │   queue    │
//!  ┌────────────┐  ├───▶│ (async mutex) │─▶│ (semaphore)│──▶│ (SLOTS)    │──▶ Supervisor
//!  │ soil task  │──┤    └───────────────┘  └────────────┘   └────────────┘
//!  └────────────┘  │                            ▲                 │
//!  ┌────────────┐  │                            └── release(1) ◀──┘
//!  │climate task│──┘                                on receive()
//!  └────────────┘
//! ```
//!
//! Two independent bounds:
//!
//! * `SLOTS` (`capacity_slots`): storage in the queue.
//! * `permit_count`: messages allowed in flight (sent but not yet
//!   received). Always `<= SLOTS`, normally strictly below it.
//!
//! A producer takes the producer lock, then waits for a permit while still
//! holding the lock, then enqueues. Holding the lock across the permit wait
//! makes "reserve + enqueue" atomic across producers, so the queue order is
//! exactly the lock-acquisition order. The cost is that producers also
//! serialise their wait for a permit; under contention that is the
//! throughput ceiling of the bus.
//!
//! A permit leaves the pool when a message is enqueued and returns on
//! exactly one of two paths: the consumer's `receive()`, or the producer's
//! own error path when the queue refuses a message it held a permit for.

use core::sync::atomic::{AtomicU32, Ordering};

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::{Channel, TrySendError as QueueFull};
use embassy_sync::mutex::Mutex;
use embassy_sync::semaphore::{GreedySemaphore, Semaphore, SemaphoreReleaser};
use heapless::Vec;
use log::{debug, warn};

use crate::error::{Error, Overrun, Result, TrySendError};
use crate::message::Message;

/// Queue storage of the controller's sensor bus.
pub const BUS_SLOTS: usize = 16;

/// Default number of in-flight messages before producers block.
pub const DEFAULT_PERMITS: usize = 10;

/// The bus type used by the controller.
pub type SensorBus = TelemetryBus<BUS_SLOTS>;

type Permit<'a> = SemaphoreReleaser<'a, GreedySemaphore<CriticalSectionRawMutex>>;

/// Counters exposed for diagnostics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BusStats {
    /// Messages accepted into the queue.
    pub sent: u32,
    /// Messages handed to the consumer.
    pub delivered: u32,
    /// Messages refused by the queue while a permit was held.
    pub overruns: u32,
}

#[derive(Default)]
struct Counters {
    sent: AtomicU32,
    delivered: AtomicU32,
    overruns: AtomicU32,
}

/// Bounded MPSC telemetry bus with `SLOTS` queue slots.
pub struct TelemetryBus<const SLOTS: usize> {
    queue: Channel<CriticalSectionRawMutex, Message, SLOTS>,
    permits: GreedySemaphore<CriticalSectionRawMutex>,
    producer_lock: Mutex<CriticalSectionRawMutex, ()>,
    permit_count: usize,
    counters: Counters,
}

impl<const SLOTS: usize> TelemetryBus<SLOTS> {
    /// Build a bus allowing `permit_count` messages in flight.
    ///
    /// Fails unless `0 < permit_count <= SLOTS`.
    pub fn new(permit_count: usize) -> Result<Self> {
        if permit_count == 0 {
            return Err(Error::Config("permit_count must be at least 1"));
        }
        if permit_count > SLOTS {
            return Err(Error::Config("permit_count exceeds capacity_slots"));
        }
        Ok(Self {
            queue: Channel::new(),
            permits: GreedySemaphore::new(permit_count),
            producer_lock: Mutex::new(()),
            permit_count,
            counters: Counters::default(),
        })
    }

    // ── Producer side ────────────────────────────────────────

    /// Send one message, waiting for the producer lock and then a permit.
    ///
    /// On `Err`, the permit has been returned and the caller owns the
    /// message again; it should drop it and carry on with its next sample.
    pub async fn send(&self, msg: Message) -> core::result::Result<(), Overrun> {
        let _guard = self.producer_lock.lock().await;
        let permit = self.acquire_permit().await;
        self.enqueue(permit, msg)
    }

    /// Send several messages under a single hold of the producer lock.
    ///
    /// Each message takes its own permit, in order. A refused message does
    /// not stop the rest of the batch. Returns the refused messages (empty
    /// when every message was enqueued).
    pub async fn send_batch<const N: usize>(&self, batch: Vec<Message, N>) -> Vec<Overrun, N> {
        let mut refused = Vec::new();
        let _guard = self.producer_lock.lock().await;
        for msg in batch {
            let permit = self.acquire_permit().await;
            if let Err(overrun) = self.enqueue(permit, msg) {
                // Capacity matches the batch, so this cannot fail.
                let _ = refused.push(overrun);
            }
        }
        refused
    }

    /// Non-blocking send. Reserves nothing unless it can enqueue.
    pub fn try_send(&self, msg: Message) -> core::result::Result<(), TrySendError> {
        let Ok(_guard) = self.producer_lock.try_lock() else {
            return Err(TrySendError::WouldBlock(msg));
        };
        let Some(permit) = self.permits.try_acquire(1) else {
            return Err(TrySendError::WouldBlock(msg));
        };
        self.enqueue(permit, msg)
            .map_err(|Overrun(msg)| TrySendError::Overrun(msg))
    }

    async fn acquire_permit(&self) -> Permit<'_> {
        match self.permits.acquire(1).await {
            Ok(permit) => permit,
            Err(never) => match never {},
        }
    }

    fn enqueue(&self, permit: Permit<'_>, msg: Message) -> core::result::Result<(), Overrun> {
        match self.queue.try_send(msg) {
            Ok(()) => {
                // The permit now travels with the message; receive() returns it.
                let _ = permit.disarm();
                self.counters.sent.fetch_add(1, Ordering::Relaxed);
                Ok(())
            }
            Err(QueueFull::Full(msg)) => {
                drop(permit);
                self.counters.overruns.fetch_add(1, Ordering::Relaxed);
                warn!(
                    "bus: queue refused {} reading, permit returned",
                    msg.source().name()
                );
                Err(Overrun(msg))
            }
        }
    }

    // ── Consumer side (single consumer only) ─────────────────

    /// Wait for the next message, then return its permit to the pool.
    pub async fn receive(&self) -> Message {
        let msg = self.queue.receive().await;
        self.release_permit();
        msg
    }

    /// Take the next message if one is queued.
    pub fn try_receive(&self) -> Option<Message> {
        let msg = self.queue.try_receive().ok()?;
        self.release_permit();
        Some(msg)
    }

    fn release_permit(&self) {
        self.permits.release(1);
        self.counters.delivered.fetch_add(1, Ordering::Relaxed);
        debug!("bus: permit released ({} in flight)", self.in_flight());
    }

    // ── Introspection ────────────────────────────────────────

    /// Messages sent but not yet received.
    pub fn in_flight(&self) -> usize {
        self.queue.len()
    }

    pub fn permit_count(&self) -> usize {
        self.permit_count
    }

    pub const fn capacity_slots(&self) -> usize {
        SLOTS
    }

    pub fn stats(&self) -> BusStats {
        BusStats {
            sent: self.counters.sent.load(Ordering::Relaxed),
            delivered: self.counters.delivered.load(Ordering::Relaxed),
            overruns: self.counters.overruns.load(Ordering::Relaxed),
        }
    }
}
