//! Unified error types for the nursery controller.
//!
//! A single `Error` enum that every subsystem converts into, keeping the
//! supervisor's error handling uniform. No variant is fatal: each one is
//! handled locally by the task that produced it (see the per-variant docs).
//! All variants are `Copy` so they can be logged and passed around freely.

use core::fmt;

use crate::message::Message;

// ---------------------------------------------------------------------------
// Top-level controller error
// ---------------------------------------------------------------------------

/// Every fallible operation in the controller funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A fixed-capacity buffer had no room for a new reading.
    /// Local to the producer: the sample is discarded.
    AllocationFailure,
    /// The bus storage rejected a message although a permit was held.
    /// The permit is returned and the message discarded by its producer.
    QueueOverrun,
    /// A backing sensor or actuator is absent. That single path degrades
    /// to a logged no-op.
    DeviceNotFound(&'static str),
    /// An external command could not be handed to the supervisor.
    SendFailure,
    /// A reading the consumer cannot route (non-finite value).
    MalformedMessage,
    /// A sensor returned no usable sample this period.
    SensorRead(&'static str),
    /// Configuration is invalid.
    Config(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AllocationFailure => write!(f, "allocation failure"),
            Self::QueueOverrun => write!(f, "telemetry queue overrun"),
            Self::DeviceNotFound(dev) => write!(f, "device not found: {dev}"),
            Self::SendFailure => write!(f, "command send failure"),
            Self::MalformedMessage => write!(f, "malformed message"),
            Self::SensorRead(msg) => write!(f, "sensor read: {msg}"),
            Self::Config(msg) => write!(f, "config: {msg}"),
        }
    }
}

impl core::error::Error for Error {}

// ---------------------------------------------------------------------------
// Bus send errors (carry the rejected message back to its producer)
// ---------------------------------------------------------------------------

/// Returned by [`TelemetryBus::send`](crate::bus::TelemetryBus::send) when
/// the queue refused the message even though a permit was held.
///
/// The permit has already been returned to the pool. The producer owns the
/// message again and is expected to drop it.
#[derive(Debug, PartialEq)]
pub struct Overrun(pub Message);

impl Overrun {
    /// Take the rejected message back.
    pub fn into_inner(self) -> Message {
        self.0
    }
}

impl fmt::Display for Overrun {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "queue overrun, dropped {:?} reading", self.0.source())
    }
}

impl From<Overrun> for Error {
    fn from(_: Overrun) -> Self {
        Self::QueueOverrun
    }
}

/// Returned by the non-blocking
/// [`TelemetryBus::try_send`](crate::bus::TelemetryBus::try_send).
#[derive(Debug, PartialEq)]
pub enum TrySendError {
    /// The producer lock is held or no permit is free. Nothing was reserved.
    WouldBlock(Message),
    /// A permit was free but the queue refused the message.
    Overrun(Message),
}

impl TrySendError {
    /// Take the rejected message back.
    pub fn into_inner(self) -> Message {
        match self {
            Self::WouldBlock(m) | Self::Overrun(m) => m,
        }
    }
}

impl fmt::Display for TrySendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WouldBlock(_) => write!(f, "bus busy"),
            Self::Overrun(_) => write!(f, "telemetry queue overrun"),
        }
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Controller-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
