//! Fly the flight core against the point-mass simulator.
//!
//! Usage:
//!   cargo run -p quadpilot_sitl --bin quadpilot-sim -- [OPTIONS]
//!
//! Options:
//!   -c, --config <PATH>   JSON run configuration (default: built-in)
//!   --duration <S>        Override run length in seconds
//!   --rate <HZ>           Override tick rate
//!   --real-time           Pace ticks against the wall clock
//!   -v, --verbose         Debug logging

use std::env;
use std::process;

use log::LevelFilter;

use quadpilot_core::control::Triggers;
use quadpilot_core::parameters::ParameterStore;
use quadpilot_core::quad::FlightStatus;
use quadpilot_core::traits::TickTimer;
use quadpilot_core::FlightController;
use quadpilot_sitl::{logger, FlightConfig, ScriptedPilot, SimQuadcopter, SimulatorError, SitlClock};

struct Args {
    config: Option<String>,
    duration_s: Option<f32>,
    rate_hz: Option<f32>,
    real_time: bool,
    verbose: bool,
}

fn parse_args() -> Args {
    let mut args = Args {
        config: None,
        duration_s: None,
        rate_hz: None,
        real_time: false,
        verbose: false,
    };

    let raw: Vec<String> = env::args().collect();
    let mut i = 1;
    while i < raw.len() {
        match raw[i].as_str() {
            "-c" | "--config" => {
                i += 1;
                args.config = Some(arg_value(&raw, i, "config").to_string());
            }
            "--duration" => {
                i += 1;
                args.duration_s = Some(parse_f32_arg(&raw, i, "duration"));
            }
            "--rate" => {
                i += 1;
                args.rate_hz = Some(parse_f32_arg(&raw, i, "rate"));
            }
            "--real-time" => args.real_time = true,
            "-v" | "--verbose" => args.verbose = true,
            "-h" | "--help" => {
                print_usage();
                process::exit(0);
            }
            other => {
                eprintln!("Unknown option: {other}");
                print_usage();
                process::exit(1);
            }
        }
        i += 1;
    }
    args
}

fn arg_value<'a>(raw: &'a [String], i: usize, name: &str) -> &'a str {
    raw.get(i).map(String::as_str).unwrap_or_else(|| {
        eprintln!("Error: --{name} requires a value");
        process::exit(1);
    })
}

fn parse_f32_arg(raw: &[String], i: usize, name: &str) -> f32 {
    arg_value(raw, i, name).parse().unwrap_or_else(|_| {
        eprintln!("Error: invalid value for --{name}");
        process::exit(1);
    })
}

fn print_usage() {
    eprintln!(
        "Usage: quadpilot-sim [OPTIONS]\n\
         \n\
         Options:\n\
         \x20 -c, --config <PATH>   JSON run configuration (default: built-in)\n\
         \x20 --duration <S>        Override run length in seconds\n\
         \x20 --rate <HZ>           Override tick rate\n\
         \x20 --real-time           Pace ticks against the wall clock\n\
         \x20 -v, --verbose         Debug logging\n\
         \x20 -h, --help            Show this help"
    );
}

/// Take off, settle, then hand over to the autopilot.
fn default_script() -> ScriptedPilot {
    ScriptedPilot::new()
        .press(Triggers::TAKE_OFF)
        .wait(3.0)
        .press(Triggers::TOGGLE_AUTOPILOT)
}

fn run(args: Args) -> Result<(), SimulatorError> {
    let mut config = match &args.config {
        Some(path) => FlightConfig::load(path)?,
        None => FlightConfig::default(),
    };
    if let Some(d) = args.duration_s {
        config.run.duration_s = d;
    }
    if let Some(r) = args.rate_hz {
        config.run.rate_hz = r;
    }
    config.run.real_time |= args.real_time;
    config.validate()?;

    let mut store = ParameterStore::new();
    config.apply(&mut store)?;

    let pilot = if config.script.is_empty() {
        default_script()
    } else {
        config.pilot()
    };
    let sim = SimQuadcopter::new(config.sim_config());
    let mut fc = FlightController::from_store(sim, pilot, &store);
    if let Some(mission) = config.mission()? {
        log::info!("mission: {} waypoints", mission.len());
        fc.load_mission(mission);
    }

    let clock = if config.run.real_time {
        SitlClock::wall()
    } else {
        SitlClock::simulated()
    };
    let mut timer = TickTimer::new(clock.clone());
    timer.tick();

    let step_us = (1_000_000.0 / config.run.rate_hz) as u64;
    let ticks = (config.run.duration_s * config.run.rate_hz).ceil() as u64;
    let report_every = config.run.rate_hz.max(1.0) as u64;

    println!("=== quadpilot simulator ===");
    println!(
        "rate {} Hz, {} ticks, {} clock",
        config.run.rate_hz,
        ticks,
        if clock.is_simulated() { "simulated" } else { "wall" }
    );

    let mut last_status = fc.status();
    for n in 0..ticks {
        clock.delay_us(step_us);
        let dt = timer.tick();
        let report = fc.tick(dt);

        if report.status != last_status || n % report_every == 0 {
            let pose = fc.quad().pose();
            let p = pose.position;
            let mission = fc
                .mission()
                .map(|m| format!("{:?}", m.state()))
                .unwrap_or_else(|| "-".into());
            let target = fc
                .autopilot()
                .target()
                .filter(|_| fc.autopilot().is_active())
                .map(|w| config.waypoint_label(w.id))
                .unwrap_or_else(|| "-".into());
            println!(
                "t={:6.2}s {:<12} pos=({:6.2},{:6.2},{:6.2}) yaw={:6.1} ap={} target={} mission={}",
                fc.quad().driver().sim_time_us() as f64 / 1e6,
                report.status.to_string(),
                p.x,
                p.y,
                p.z,
                pose.yaw_deg(),
                if fc.autopilot().is_active() { "on" } else { "off" },
                target,
                mission
            );
            last_status = report.status;
        }

        if last_status == FlightStatus::PreLaunch
            && fc.input().is_finished()
            && fc.mission().is_some_and(|m| !m.is_running())
            && n > 0
        {
            println!("Landed, stopping.");
            break;
        }
    }

    if let Some(mission) = fc.mission() {
        println!("Mission finished as {:?} after {} laps", mission.state(), mission.laps());
    }
    Ok(())
}

fn main() {
    let args = parse_args();
    logger::init(if args.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    });

    if let Err(e) = run(args) {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}
