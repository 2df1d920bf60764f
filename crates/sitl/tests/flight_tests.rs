//! End-to-end flights of the flight core against the point-mass simulator.

use nalgebra::Vector3;

use quadpilot_core::control::{ControlVector, Triggers};
use quadpilot_core::flight::HOME_WAYPOINT;
use quadpilot_core::mission::MissionState;
use quadpilot_core::parameters::ParameterStore;
use quadpilot_core::quad::FlightStatus;
use quadpilot_core::FlightController;
use quadpilot_sitl::{FlightConfig, ScriptedPilot, SimPhase, SimQuadcopter};

const DT: f32 = 0.02;

type SimFlight = FlightController<SimQuadcopter, ScriptedPilot>;

const BASE: &str = r#"{
    "navigator": { "style": "instant", "arrival_dist": 0.2 },
    "gains": {
        "instant": {
            "x": { "p": 1.0 },
            "y": { "p": 1.0 },
            "z": { "p": 1.0 }
        }
    },
    "sim": { "seed": 1, "position_noise": 0.0 }
}"#;

fn base_config() -> FlightConfig {
    FlightConfig::from_json(BASE).unwrap()
}

fn build(config: &FlightConfig, pilot: ScriptedPilot) -> SimFlight {
    let mut store = ParameterStore::new();
    config.apply(&mut store).unwrap();
    let sim = SimQuadcopter::new(config.sim_config());
    let mut fc = FlightController::from_store(sim, pilot, &store);
    if let Some(mission) = config.mission().unwrap() {
        fc.load_mission(mission);
    }
    fc
}

/// Tick until `done` holds or `max_ticks` run out. Returns ticks used.
fn run_until(fc: &mut SimFlight, max_ticks: u32, done: impl Fn(&SimFlight) -> bool) -> Option<u32> {
    for n in 0..max_ticks {
        if done(fc) {
            return Some(n);
        }
        fc.tick(DT);
    }
    done(fc).then_some(max_ticks)
}

fn launch_then_autopilot() -> ScriptedPilot {
    ScriptedPilot::new()
        .press(Triggers::TAKE_OFF)
        .wait(2.5)
        .press(Triggers::TOGGLE_AUTOPILOT)
}

// ============================================================================
// Launch and landing
// ============================================================================

#[test]
fn test_take_off_reaches_flying_at_launch_height() {
    let config = base_config();
    let mut fc = build(&config, ScriptedPilot::new().press(Triggers::TAKE_OFF));

    let ticks = run_until(&mut fc, 200, |fc| fc.status() == FlightStatus::Flying);
    assert!(ticks.is_some(), "never reached Flying");

    let home = fc.quad().home().unwrap();
    assert!((home.position.y - 0.8).abs() < 0.05);
    assert_eq!(fc.quad().driver().phase(), SimPhase::Airborne);
}

#[test]
fn test_land_returns_to_pre_launch() {
    let config = base_config();
    let pilot = ScriptedPilot::new()
        .press(Triggers::TAKE_OFF)
        .wait(2.5)
        .press(Triggers::LAND);
    let mut fc = build(&config, pilot);

    assert!(run_until(&mut fc, 200, |fc| fc.status() == FlightStatus::Landing).is_some());
    assert!(run_until(&mut fc, 200, |fc| fc.status() == FlightStatus::PreLaunch).is_some());
    assert!(fc.quad().driver().position().y.abs() < 1e-4);
}

// ============================================================================
// Missions
// ============================================================================

#[test]
fn test_mission_completes_and_lands() {
    let mut config = base_config();
    config.mission = FlightConfig::from_json(
        r#"{ "mission": {
            "waypoints": [
                { "id": 1, "position": [1.0, 0.8, 0.0] },
                { "id": 2, "position": [1.0, 0.8, 1.0] }
            ],
            "land_on_complete": true
        } }"#,
    )
    .unwrap()
    .mission;
    let mut fc = build(&config, launch_then_autopilot());

    assert!(run_until(&mut fc, 200, |fc| fc.autopilot().is_active()).is_some());
    assert_eq!(fc.mission().unwrap().state(), MissionState::Running);

    let done = run_until(&mut fc, 1500, |fc| {
        fc.mission().unwrap().state() == MissionState::Completed
    });
    assert!(done.is_some(), "mission did not complete");

    let p = fc.quad().driver().position();
    assert!((p.x - 1.0).abs() < 0.3 && (p.z - 1.0).abs() < 0.3, "ended at {p:?}");

    assert!(run_until(&mut fc, 500, |fc| fc.status() == FlightStatus::PreLaunch).is_some());
    assert!(!fc.autopilot().is_active());
}

#[test]
fn test_looping_mission_counts_laps() {
    let mut config = base_config();
    config.mission.looping = true;
    config.mission.waypoints = FlightConfig::from_json(
        r#"{ "mission": { "waypoints": [
            { "id": 1, "position": [0.5, 0.8, 0.0] },
            { "id": 2, "position": [0.0, 0.8, 0.5] }
        ] } }"#,
    )
    .unwrap()
    .mission
    .waypoints;
    let mut fc = build(&config, launch_then_autopilot());

    let lapped = run_until(&mut fc, 3000, |fc| fc.mission().unwrap().laps() >= 1);
    assert!(lapped.is_some(), "no lap completed");
    assert!(fc.mission().unwrap().is_running());
    assert_eq!(fc.status(), FlightStatus::Flying);
}

#[test]
fn test_pilot_stick_interrupts_mission() {
    let mut config = base_config();
    config.mission.waypoints = FlightConfig::from_json(
        r#"{ "mission": { "waypoints": [ { "id": 1, "position": [0.0, 0.8, 5.0] } ] } }"#,
    )
    .unwrap()
    .mission
    .waypoints;
    let pilot = launch_then_autopilot()
        .wait(1.0)
        .hold(0.5, ControlVector::new(0.0, 0.4, 0.0, 0.0));
    let mut fc = build(&config, pilot);

    assert!(run_until(&mut fc, 200, |fc| fc.autopilot().is_active()).is_some());
    assert!(run_until(&mut fc, 100, |fc| !fc.autopilot().is_active()).is_some());

    assert_eq!(fc.mission().unwrap().state(), MissionState::Interrupted);
    assert_eq!(fc.status(), FlightStatus::Flying);
}

// ============================================================================
// Return home
// ============================================================================

#[test]
fn test_return_home_after_manual_drift() {
    let config = base_config();
    let pilot = ScriptedPilot::new()
        .press(Triggers::TAKE_OFF)
        .wait(2.5)
        .hold(1.0, ControlVector::new(0.0, 0.5, 0.5, 0.0));
    let mut fc = build(&config, pilot);

    assert!(run_until(&mut fc, 400, |fc| fc.input().is_finished()).is_some());
    let home = fc.quad().home().unwrap().position;
    assert!((fc.quad().pose().position - home).norm() > 0.5);

    assert!(fc.return_home());
    assert_eq!(fc.autopilot().target().map(|t| t.id), Some(HOME_WAYPOINT));

    let back = run_until(&mut fc, 1000, |fc| {
        (fc.quad().pose().position - home).norm() < 0.2
    });
    assert!(back.is_some());
    assert!(fc.autopilot().is_active());
}

#[test]
fn test_headless_pitch_moves_along_field_z() {
    let mut config = base_config();
    config.navigator.headless = Some(true);
    config.sim.spawn_yaw_deg = Some(90.0);
    let pilot = ScriptedPilot::new()
        .press(Triggers::TAKE_OFF)
        .wait(2.5)
        .hold(1.0, ControlVector::new(0.0, 0.5, 0.0, 0.0));
    let mut fc = build(&config, pilot);

    assert!(run_until(&mut fc, 400, |fc| fc.input().is_finished()).is_some());
    let moved: Vector3<f32> = fc.quad().driver().position() - fc.quad().home().unwrap().position;
    assert!(moved.z > 0.3, "moved {moved:?}");
    assert!(moved.x.abs() < 0.05, "moved {moved:?}");
}

// ============================================================================
// Bundled configuration
// ============================================================================

#[test]
fn test_bundled_square_config_loads() {
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/config/square.json");
    let config = FlightConfig::load(path).unwrap();
    let mission = config.mission().unwrap().unwrap();
    assert_eq!(mission.len(), 4);
    assert!(mission.lands_on_complete());
    assert_eq!(config.pilot().remaining(), 3);
}
