//! Control core: the supervisor-owned state and the command dispatcher.

pub mod dispatch;
pub mod state;

pub use dispatch::{ActuationEffect, dispatch};
pub use state::{ControlState, ReadingOutcome, SensorReport, SnapshotCell};
