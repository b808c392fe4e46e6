//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter     | Implements    | Connects to                     |
//! |-------------|---------------|---------------------------------|
//! | `hardware`  | ActuatorPort  | fan / servo PWM, pump GPIO      |
//! | `log_sink`  | EventSink     | serial log output               |
//! | `time`      | Clock         | ESP32 system timer / `Instant`  |
//! | `console`   | (command src) | request lines → CommandQueue    |
//!
//! Sensor adapters live next to their producers in [`crate::sensors`].

pub mod console;
pub mod hardware;
pub mod log_sink;
pub mod time;
