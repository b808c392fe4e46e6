//! Application core: control logic behind port traits.
//!
//! The supervisor, the command queue and the event vocabulary live here.
//! All interaction with hardware happens through the **port traits** in
//! [`ports`], keeping this layer testable without real peripherals.

pub mod commands;
pub mod events;
pub mod ports;
pub mod supervisor;
