//! System context: every shared handle, built once at startup.
//!
//! Tasks receive an `Arc<SystemContext>` instead of reaching for globals.
//! The context holds only things that are safe to share: the bus, the
//! command queue, and the published snapshot. [`ControlState`] itself is
//! owned by the supervisor and never lives here.
//!
//! [`ControlState`]: crate::control::ControlState

use crate::app::commands::CommandQueue;
use crate::bus::SensorBus;
use crate::config::SystemConfig;
use crate::control::{ControlState, SnapshotCell};
use crate::error::Result;

pub struct SystemContext {
    pub config: SystemConfig,
    pub bus: SensorBus,
    pub commands: CommandQueue,
    pub snapshot: SnapshotCell,
}

impl SystemContext {
    /// Validate `config` and build the shared handles.
    pub fn new(config: SystemConfig) -> Result<Self> {
        config.validate()?;
        let bus = SensorBus::new(config.permit_count)?;
        let snapshot = SnapshotCell::new(ControlState::new(config.servo_park_angle));
        Ok(Self {
            config,
            bus,
            commands: CommandQueue::new(),
            snapshot,
        })
    }
}
