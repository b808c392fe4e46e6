//! Nursery controller library.
//!
//! Sensor producers feed a bounded telemetry bus; a single supervisor
//! drains it, keeps the control state, dispatches external command codes
//! to the fan, window servo and water pump, and enforces the pump run-time
//! limit. ESP-IDF specific code is guarded by `#[cfg(target_os = "espidf")]`
//! inside each module; everything else runs on the host.

#![deny(unused_must_use)]

pub mod adapters;
pub mod app;
pub mod bus;
pub mod config;
pub mod context;
pub mod control;
pub mod drivers;
pub mod error;
pub mod message;
pub mod runtime;
pub mod safety;
pub mod sensors;

pub use error::{Error, Result};
