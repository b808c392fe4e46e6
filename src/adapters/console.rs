//! Request-line command source.
//!
//! Serves the two dashboard routes on top of whatever line transport the
//! board exposes (HTTP request line, serial console):
//!
//! | Request                    | Effect                                    |
//! |----------------------------|-------------------------------------------|
//! | `…/api/sensors…`           | JSON sensor report from the snapshot      |
//! | `…cmd=<code>…`             | code submitted to the [`CommandQueue`]    |
//! | a bare integer (`301`)     | same as `cmd=301`                         |
//!
//! The adapter only reads the snapshot and submits codes; it never touches
//! the supervisor's state.

use log::{debug, warn};

use crate::app::commands::{CommandQueue, parse_command_query};
use crate::control::SnapshotCell;
use crate::error::Error;

#[derive(Debug, Clone, PartialEq)]
pub enum Response {
    /// JSON body for `/api/sensors`.
    Sensors(String),
    /// Code accepted into the command queue.
    Accepted(i32),
    /// Code parsed but the queue refused it.
    Rejected { code: i32, reason: Error },
    /// Nothing recognisable in the request.
    BadRequest,
}

pub struct CommandConsole<'a> {
    commands: &'a CommandQueue,
    snapshot: &'a SnapshotCell,
}

impl<'a> CommandConsole<'a> {
    pub fn new(commands: &'a CommandQueue, snapshot: &'a SnapshotCell) -> Self {
        Self { commands, snapshot }
    }

    pub fn handle(&self, request: &str) -> Response {
        let request = request.trim();
        if request.contains("/api/sensors") {
            return match self.snapshot.get().sensor_report().to_json() {
                Ok(body) => Response::Sensors(body),
                Err(e) => {
                    warn!("console: sensor report failed ({})", e);
                    Response::BadRequest
                }
            };
        }

        let code = parse_command_query(request).or_else(|| parse_bare_code(request));
        let Some(code) = code else {
            debug!("console: unrecognised request {:?}", request);
            return Response::BadRequest;
        };
        match self.commands.submit(code) {
            Ok(()) => Response::Accepted(code),
            Err(reason) => Response::Rejected { code, reason },
        }
    }
}

/// A bare run of digits, the same form `cmd=` accepts.
fn parse_bare_code(request: &str) -> Option<i32> {
    if !request.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    request.parse::<u32>().ok().and_then(|c| i32::try_from(c).ok())
}
