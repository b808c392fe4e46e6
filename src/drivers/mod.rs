//! Actuator drivers and task placement helpers.
//!
//! Drivers are generic over `embedded-hal` traits and take an `Option` of
//! their peripheral: a device missing at startup turns that actuator into a
//! logged no-op without affecting the others.

#[cfg(target_os = "espidf")]
pub mod board;
pub mod fan;
pub mod pump;
pub mod servo;
pub mod sim;
pub mod task_pin;
