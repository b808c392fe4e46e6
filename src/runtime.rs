//! Task wiring: two threads, one per core.
//!
//! ```text
//!  Core 0 "sensors"                         Core 1 "supervisor"
//!  ┌──────────────────────────────┐         ┌──────────────────────────┐
//!  │ futures_lite::block_on       │         │ futures_lite::block_on   │
//!  │  └─ edge_executor::Local…    │  bus    │  └─ Supervisor::run      │
//!  │      ├─ light producer   ────┼────────▶│                          │
//!  │      ├─ soil producer    ────┤         │                          │
//!  │      └─ climate producer ────┘         └──────────────────────────┘
//!  └──────────────────────────────┘
//! ```
//!
//! Producers are cooperative tasks on one executor; they still contend on
//! the bus lock exactly as separate threads would, since the lock and the
//! permits are async primitives. Neither thread ever returns.

use std::io;
use std::sync::Arc;
use std::thread::JoinHandle;

use edge_executor::LocalExecutor;
use log::info;

use crate::app::ports::{ActuatorPort, Clock, EventSink, SensorPort};
use crate::app::supervisor::Supervisor;
use crate::context::SystemContext;
use crate::drivers::task_pin::{Core, TaskSpec, spawn_on_core};
use crate::sensors::SensorGroup;
use crate::sensors::producer::Producer;

pub const SENSOR_TASK: TaskSpec = TaskSpec {
    name: "sensors\0",
    core: Core::Pro,
    priority: 5,
    stack_kb: 16,
};

pub const SUPERVISOR_TASK: TaskSpec = TaskSpec {
    name: "supervisor\0",
    core: Core::App,
    priority: 10,
    stack_kb: 16,
};

/// The three sampling sensors of the controller.
pub struct SensorSet<L, S, C> {
    pub light: L,
    pub soil: S,
    pub climate: C,
}

/// Spawn the sampling thread. Every producer runs as its own task.
pub fn spawn_producers<L, S, C, K>(
    ctx: Arc<SystemContext>,
    clock: Arc<K>,
    sensors: SensorSet<L, S, C>,
) -> io::Result<JoinHandle<()>>
where
    L: SensorPort + Send + 'static,
    S: SensorPort + Send + 'static,
    C: SensorPort + Send + 'static,
    K: Clock + Send + Sync + 'static,
{
    spawn_on_core(SENSOR_TASK, move || run_producers(&ctx, &*clock, sensors))
}

fn run_producers<L, S, C, K>(ctx: &SystemContext, clock: &K, sensors: SensorSet<L, S, C>)
where
    L: SensorPort,
    S: SensorPort,
    C: SensorPort,
    K: Clock,
{
    let executor: LocalExecutor<'_, 4> = LocalExecutor::new();
    let config = &ctx.config;

    executor
        .spawn(Producer::new(sensors.light, &ctx.bus, clock, SensorGroup::Light.period(config)).run())
        .detach();
    executor
        .spawn(Producer::new(sensors.soil, &ctx.bus, clock, SensorGroup::Soil.period(config)).run())
        .detach();
    executor
        .spawn(
            Producer::new(sensors.climate, &ctx.bus, clock, SensorGroup::Climate.period(config))
                .run(),
        )
        .detach();

    info!("Sensor task started (3 producers, one executor)");

    // block_on drives the reactor (timers) while the executor drives the
    // producers. A retired producer simply completes; the rest keep going.
    futures_lite::future::block_on(executor.run(core::future::pending::<()>()));
}

/// Spawn the supervisor thread: initialise actuators, then loop forever.
pub fn spawn_supervisor<A, E, K>(
    ctx: Arc<SystemContext>,
    clock: Arc<K>,
    hw: A,
    sink: E,
) -> io::Result<JoinHandle<()>>
where
    A: ActuatorPort + Send + 'static,
    E: EventSink + Send + 'static,
    K: Clock + Send + Sync + 'static,
{
    spawn_on_core(SUPERVISOR_TASK, move || {
        let (mut hw, mut sink) = (hw, sink);
        let mut supervisor = Supervisor::new(&ctx);
        supervisor.start(&mut hw, &mut sink);
        futures_lite::future::block_on(supervisor.run(&mut hw, &*clock, &mut sink));
    })
}
