//! Inbound command codes.
//!
//! External sources (the HTTP control endpoint, a serial console, tests)
//! hand integer codes to [`CommandQueue::submit`]. The queue is separate
//! from the telemetry bus; the supervisor drains it once per iteration and
//! runs every code through the dispatcher.
//!
//! ```text
//! ┌──────────────┐  i32 code  ┌──────────────┐
//! │ HTTP handler │───────────▶│  Supervisor  │──▶ dispatch() ──▶ ActuatorPort
//! └──────────────┘            └──────────────┘
//! ```

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use log::warn;

use crate::error::{Error, Result};

/// Commands buffered between the command source and the supervisor.
pub const COMMAND_DEPTH: usize = 8;

/// Bounded queue of command codes.
pub struct CommandQueue {
    channel: Channel<CriticalSectionRawMutex, i32, COMMAND_DEPTH>,
}

impl CommandQueue {
    pub const fn new() -> Self {
        Self {
            channel: Channel::new(),
        }
    }

    /// Hand a code to the supervisor. Never blocks.
    ///
    /// `Err(SendFailure)` when the queue is full; the caller reports the
    /// failure to its client and the code is dropped.
    pub fn submit(&self, code: i32) -> Result<()> {
        self.channel.try_send(code).map_err(|_| {
            warn!("command queue full, dropping code {}", code);
            Error::SendFailure
        })
    }

    /// Next pending code, if any. Supervisor only.
    pub fn take(&self) -> Option<i32> {
        self.channel.try_receive().ok()
    }

    pub fn pending(&self) -> usize {
        self.channel.len()
    }
}

impl Default for CommandQueue {
    fn default() -> Self {
        Self::new()
    }
}

/// Extract the code from a control request such as
/// `GET /api/control?cmd=301 HTTP/1.1`.
///
/// Takes the decimal digits right after the first `cmd=`. Returns `None`
/// when the key is missing, no digit follows, or the number overflows.
pub fn parse_command_query(request: &str) -> Option<i32> {
    let start = request.find("cmd=")? + "cmd=".len();
    let rest = &request[start..];
    let end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    rest[..end].parse().ok()
}
