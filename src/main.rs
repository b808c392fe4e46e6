//! Nursery controller main entry point.
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────┐
//! │                    Adapters (outer ring)                      │
//! │  AnalogSensor / Dht11 / SimSensor     HardwareAdapter         │
//! │  (SensorPort)                         (ActuatorPort)          │
//! │  MonotonicClock (Clock)   LogEventSink (EventSink)            │
//! │  CommandConsole (stdin / UART → CommandQueue)                 │
//! │                                                               │
//! │  ─────────────────── Port Trait Boundary ───────────────────  │
//! │                                                               │
//! │   producers ──▶ TelemetryBus ──▶ Supervisor ──▶ actuators     │
//! │                                   ▲                           │
//! │                   CommandQueue ───┘                           │
//! └───────────────────────────────────────────────────────────────┘
//! ```
//!
//! On the board the peripherals come from esp-idf-hal; on the host every
//! device is simulated and `NURSERY_CONFIG` may carry a JSON config
//! override.

#![deny(unused_must_use)]

use std::io::BufRead;
use std::sync::Arc;
use std::thread::JoinHandle;

use anyhow::{Context, Result, anyhow};
use log::info;

use nursery::adapters::console::{CommandConsole, Response};
use nursery::adapters::hardware::HardwareAdapter;
use nursery::adapters::log_sink::LogEventSink;
use nursery::adapters::time::MonotonicClock;
use nursery::config::SystemConfig;
use nursery::context::SystemContext;
use nursery::runtime::{self, SensorSet};

fn main() -> Result<()> {
    init_platform()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  Nursery controller v{}           ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    let config = load_config();
    let ctx = Arc::new(SystemContext::new(config).context("invalid configuration")?);
    let clock = Arc::new(MonotonicClock::new());

    let supervisor = start_tasks(&ctx, &clock)?;

    serve_console(&ctx);
    info!("Console closed, controller keeps running");
    supervisor
        .join()
        .map_err(|_| anyhow!("supervisor thread panicked"))
}

// ── Platform ──────────────────────────────────────────────────

#[cfg(target_os = "espidf")]
fn init_platform() -> Result<()> {
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
fn init_platform() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    Ok(())
}

#[cfg(target_os = "espidf")]
fn load_config() -> SystemConfig {
    SystemConfig::default()
}

#[cfg(not(target_os = "espidf"))]
fn load_config() -> SystemConfig {
    let Ok(json) = std::env::var("NURSERY_CONFIG") else {
        return SystemConfig::default();
    };
    match SystemConfig::from_json(&json) {
        Ok(config) => {
            info!("Config loaded from NURSERY_CONFIG");
            config
        }
        Err(e) => {
            log::warn!("NURSERY_CONFIG rejected ({}), using defaults", e);
            SystemConfig::default()
        }
    }
}

// ── Devices and tasks ─────────────────────────────────────────

#[cfg(target_os = "espidf")]
fn start_tasks(ctx: &Arc<SystemContext>, clock: &Arc<MonotonicClock>) -> Result<JoinHandle<()>> {
    use esp_idf_svc::hal::delay::Ets;
    use esp_idf_svc::hal::gpio::PinDriver;
    use esp_idf_svc::hal::ledc::config::TimerConfig;
    use esp_idf_svc::hal::ledc::{LedcDriver, LedcTimerDriver, Resolution};
    use esp_idf_svc::hal::peripherals::Peripherals;
    use esp_idf_svc::hal::units::FromValueType;
    use log::warn;

    use nursery::drivers::board::{Adc1, LIGHT_ADC_CH, SOIL_ADC_CH};
    use nursery::drivers::fan::FanDriver;
    use nursery::drivers::pump::PumpDriver;
    use nursery::drivers::servo::ServoDriver;
    use nursery::sensors::analog::AnalogSensor;
    use nursery::sensors::dht::{Dht11, Dht11Bus};

    let p = Peripherals::take()?;

    // Fan: 10 ms period. Servo: 20 ms period, fine resolution for the
    // 0.5–2.5 ms pulse.
    let fan_pwm = LedcTimerDriver::new(p.ledc.timer0, &TimerConfig::default().frequency(100.Hz()))
        .and_then(|timer| LedcDriver::new(p.ledc.channel0, timer, p.pins.gpio6))
        .inspect_err(|e| warn!("fan PWM init failed: {}", e))
        .ok();
    let servo_pwm = LedcTimerDriver::new(
        p.ledc.timer1,
        &TimerConfig::default()
            .frequency(50.Hz())
            .resolution(Resolution::Bits14),
    )
    .and_then(|timer| LedcDriver::new(p.ledc.channel1, timer, p.pins.gpio7))
    .inspect_err(|e| warn!("servo PWM init failed: {}", e))
    .ok();
    let pump_pin = PinDriver::output(p.pins.gpio8)
        .inspect_err(|e| warn!("pump GPIO init failed: {}", e))
        .ok();

    let adc = Adc1::new(&[LIGHT_ADC_CH, SOIL_ADC_CH])
        .inspect_err(|e| warn!("{}", e))
        .ok();
    let dht_bus = PinDriver::input_output_od(p.pins.gpio5)
        .inspect_err(|e| warn!("DHT11 GPIO init failed: {}", e))
        .ok()
        .map(|pin| Dht11Bus::new(pin, Ets));

    let sensors = SensorSet {
        light: AnalogSensor::light(adc.as_ref().map(|unit| unit.channel(LIGHT_ADC_CH))),
        soil: AnalogSensor::soil(adc.as_ref().map(|unit| unit.channel(SOIL_ADC_CH))),
        climate: Dht11::new(dht_bus),
    };
    let hw = HardwareAdapter::new(
        FanDriver::new(fan_pwm),
        ServoDriver::new(servo_pwm),
        PumpDriver::new(pump_pin),
    );

    runtime::spawn_producers(Arc::clone(ctx), Arc::clone(clock), sensors)
        .context("spawning sensor task")?;
    runtime::spawn_supervisor(Arc::clone(ctx), Arc::clone(clock), hw, LogEventSink::new())
        .context("spawning supervisor task")
}

#[cfg(not(target_os = "espidf"))]
fn start_tasks(ctx: &Arc<SystemContext>, clock: &Arc<MonotonicClock>) -> Result<JoinHandle<()>> {
    use nursery::drivers::fan::FanDriver;
    use nursery::drivers::pump::PumpDriver;
    use nursery::drivers::servo::ServoDriver;
    use nursery::drivers::sim::{SimPin, SimPwm};
    use nursery::sensors::sim::{SimChannel, SimClimate, SimSensor};

    info!("Running with simulated devices");
    let sensors = SensorSet {
        light: SimSensor::light(SimChannel::new(640.0)),
        soil: SimSensor::soil(SimChannel::new(42.0)),
        climate: SimClimate::new(SimChannel::new(23.5), SimChannel::new(58.0)),
    };
    let hw = HardwareAdapter::new(
        FanDriver::new(Some(SimPwm::new(1_000))),
        ServoDriver::new(Some(SimPwm::new(20_000))),
        PumpDriver::new(Some(SimPin::new())),
    );

    runtime::spawn_producers(Arc::clone(ctx), Arc::clone(clock), sensors)
        .context("spawning sensor task")?;
    runtime::spawn_supervisor(Arc::clone(ctx), Arc::clone(clock), hw, LogEventSink::new())
        .context("spawning supervisor task")
}

// ── Command console ───────────────────────────────────────────

/// Serve request lines from stdin (the UART on the board) until EOF.
fn serve_console(ctx: &SystemContext) {
    let console = CommandConsole::new(&ctx.commands, &ctx.snapshot);
    for line in std::io::stdin().lock().lines() {
        let Ok(line) = line else {
            break;
        };
        if line.trim().is_empty() {
            continue;
        }
        match console.handle(&line) {
            Response::Sensors(body) => println!("{body}"),
            Response::Accepted(code) => println!("ok {code}"),
            Response::Rejected { code, reason } => println!("rejected {code}: {reason}"),
            Response::BadRequest => println!("bad request"),
        }
    }
}
