//! Replay recorded link telemetry through the link driver.
//!
//! A producer thread publishes one JSON telemetry line per tick into a
//! `TelemetryCell`, standing in for the radio thread. The flight loop runs
//! a `FlightController` over a `LinkQuadcopter` whose command side just
//! prints what it would send.
//!
//! Run with: `cargo run -p quadpilot_sitl --example link_replay -- [FILE]`
//!
//! Without FILE a synthetic take-off and drift is generated.

use std::env;
use std::fs;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use quadpilot_core::control::Triggers;
use quadpilot_core::parameters::ParameterStore;
use quadpilot_core::FlightController;
use quadpilot_sitl::{
    logger, CommandLink, FlightConfig, LinkQuadcopter, ScriptedPilot, SimulatorError,
    TelemetryCell, TelemetryFrame,
};

const TICK: Duration = Duration::from_millis(20);

/// Command side that logs instead of transmitting
struct PrintLink {
    ticks: u32,
}

impl CommandLink for PrintLink {
    fn is_connected(&self) -> bool {
        true
    }

    fn start_motors(&mut self) -> Result<(), SimulatorError> {
        println!("-> start motors");
        Ok(())
    }

    fn take_off(&mut self) -> Result<(), SimulatorError> {
        println!("-> take off");
        Ok(())
    }

    fn land(&mut self) -> Result<(), SimulatorError> {
        println!("-> land");
        Ok(())
    }

    fn set_axes(&mut self, yaw: f32, throttle: f32, roll: f32, pitch: f32) {
        self.ticks += 1;
        if self.ticks % 25 == 0 {
            println!("-> axes yaw={yaw:.2} throttle={throttle:.2} roll={roll:.2} pitch={pitch:.2}");
        }
    }
}

/// Aircraft on the ground at an arbitrary tracking origin, then launching
/// and drifting slowly along +x.
fn synthetic() -> Vec<String> {
    let mut lines = Vec::new();
    for i in 0..200 {
        let t = i as f32 * 0.02;
        let airborne = t > 1.0;
        let x = 5.0 + if airborne { (t - 1.0) * 0.1 } else { 0.0 };
        lines.push(format!(
            r#"{{"position":[{x},{y},-2.0],"height_dm":{h},"mode":{m},"flying":{f},"on_ground":{g}}}"#,
            y = if airborne { 0.8 } else { 0.0 },
            h = if airborne { 8 } else { 0 },
            m = if airborne { 6 } else { 1 },
            f = airborne,
            g = !airborne,
        ));
    }
    lines
}

fn main() -> Result<(), SimulatorError> {
    logger::init(log::LevelFilter::Info);

    let lines = match env::args().nth(1) {
        Some(path) => fs::read_to_string(path)?
            .lines()
            .map(str::to_string)
            .collect(),
        None => synthetic(),
    };

    let cell = Arc::new(TelemetryCell::new());
    let producer = {
        let cell = Arc::clone(&cell);
        thread::spawn(move || {
            for line in lines {
                match TelemetryFrame::from_json(&line) {
                    Ok(frame) => {
                        if cell.publish(frame).is_err() {
                            break;
                        }
                    }
                    Err(e) => eprintln!("skipping line: {e}"),
                }
                thread::sleep(TICK);
            }
            cell.close();
        })
    };

    let mut store = ParameterStore::new();
    FlightConfig::default().apply(&mut store)?;

    let driver = LinkQuadcopter::new(PrintLink { ticks: 0 }, Arc::clone(&cell));
    let pilot = ScriptedPilot::new().press(Triggers::TAKE_OFF);
    let mut fc = FlightController::from_store(driver, pilot, &store);

    let mut last_status = fc.status();
    while !cell.is_closed() || cell.has_update() {
        let report = fc.tick(TICK.as_secs_f32());
        if report.status != last_status {
            println!("status {} -> {}", last_status, report.status);
            last_status = report.status;
        }
        if report.telemetry_updated && report.tracking {
            let p = fc.quad().pose().position;
            log::debug!("pose ({:.2}, {:.2}, {:.2})", p.x, p.y, p.z);
        }
        thread::sleep(TICK);
    }

    let _ = producer.join();
    println!(
        "Replayed {} frames, home {:?}",
        cell.published(),
        fc.quad().home().map(|h| h.position)
    );
    Ok(())
}
