//! JSON run configuration.
//!
//! Every section is optional. Navigator and gain values are written into a
//! [`ParameterStore`] so the flight core reads them the same way it would
//! read stored parameters; the simulator, mission and pilot script are
//! built directly.
//!
//! ```json
//! {
//!   "navigator": { "style": "instant", "arrival_dist": 0.2 },
//!   "gains": { "instant": { "x": { "p": 1.0 }, "z": { "p": 1.0 } } },
//!   "sim": { "seed": 7, "position_noise": 0.002 },
//!   "mission": {
//!     "waypoints": [ { "id": 1, "position": [1.0, 0.8, 0.0] } ],
//!     "loop": false,
//!     "land_on_complete": true
//!   },
//!   "script": [ { "press": "take_off" }, { "duration_s": 3.0 }, { "press": "toggle_autopilot" } ]
//! }
//! ```

use std::fs;
use std::path::Path;

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use quadpilot_core::autopilot::{AxisGains, TranslationStyle};
use quadpilot_core::control::{ControlVector, PidGains, Triggers};
use quadpilot_core::mission::{Mission, MAX_WAYPOINTS};
use quadpilot_core::navigation::{Waypoint, WaypointId};
use quadpilot_core::parameters::{
    NavigatorParams, ParamValue, ParameterError, ParameterStore, PidProfileParams,
};

use crate::adapter::SimConfig;
use crate::error::SimulatorError;
use crate::input::{ScriptStep, ScriptedPilot};

/// Top-level run configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FlightConfig {
    pub run: RunSection,
    pub navigator: NavigatorSection,
    pub gains: GainsSection,
    pub sim: SimSection,
    pub mission: MissionSection,
    pub script: Vec<ScriptStepConfig>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RunSection {
    pub rate_hz: f32,
    pub duration_s: f32,
    /// Pace ticks against the wall clock instead of running flat out
    pub real_time: bool,
}

impl Default for RunSection {
    fn default() -> Self {
        Self {
            rate_hz: 50.0,
            duration_s: 30.0,
            real_time: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StyleName {
    Linear,
    NonLinear,
    Instant,
}

impl From<StyleName> for TranslationStyle {
    fn from(name: StyleName) -> Self {
        match name {
            StyleName::Linear => TranslationStyle::Linear,
            StyleName::NonLinear => TranslationStyle::NonLinear,
            StyleName::Instant => TranslationStyle::Instant,
        }
    }
}

/// Navigator overrides. Unset fields keep the stored value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NavigatorSection {
    pub arrival_dist: Option<f32>,
    pub linear_speed: Option<f32>,
    pub non_linear_speed: Option<f32>,
    pub track_jump: Option<f32>,
    pub style: Option<StyleName>,
    pub headless: Option<bool>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GainConfig {
    pub p: f32,
    pub i: f32,
    pub d: f32,
}

impl From<GainConfig> for PidGains {
    fn from(g: GainConfig) -> Self {
        PidGains::new(g.p, g.i, g.d)
    }
}

/// Per-axis gain overrides for one style. Unset axes keep the stored gains.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AxisGainsConfig {
    pub x: Option<GainConfig>,
    pub y: Option<GainConfig>,
    pub z: Option<GainConfig>,
    pub yaw: Option<GainConfig>,
}

impl AxisGainsConfig {
    fn merge_into(&self, gains: &mut AxisGains) {
        let axes = [
            (self.x, &mut gains.x),
            (self.y, &mut gains.y),
            (self.z, &mut gains.z),
            (self.yaw, &mut gains.yaw),
        ];
        for (config, slot) in axes {
            if let Some(config) = config {
                *slot = config.into();
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GainsSection {
    pub linear: Option<AxisGainsConfig>,
    pub non_linear: Option<AxisGainsConfig>,
    pub instant: Option<AxisGainsConfig>,
}

impl GainsSection {
    fn get(&self, style: TranslationStyle) -> Option<AxisGainsConfig> {
        match style {
            TranslationStyle::Linear => self.linear,
            TranslationStyle::NonLinear => self.non_linear,
            TranslationStyle::Instant => self.instant,
        }
    }
}

/// Simulator overrides. Unset fields take the [`SimConfig`] defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimSection {
    pub seed: Option<u64>,
    pub position_noise: Option<f32>,
    pub take_off_height: Option<f32>,
    pub climb_rate: Option<f32>,
    pub max_speed: Option<f32>,
    pub max_yaw_rate: Option<f32>,
    pub response: Option<f32>,
    pub spawn: Option<[f32; 3]>,
    pub spawn_yaw_deg: Option<f32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WaypointConfig {
    pub id: u16,
    #[serde(default)]
    pub name: Option<String>,
    pub position: [f32; 3],
    #[serde(default)]
    pub yaw_deg: f32,
}

impl WaypointConfig {
    fn to_waypoint(&self) -> Waypoint {
        let [x, y, z] = self.position;
        Waypoint::new(self.id, Vector3::new(x, y, z), self.yaw_deg)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MissionSection {
    pub waypoints: Vec<WaypointConfig>,
    #[serde(rename = "loop")]
    pub looping: bool,
    pub start: Option<WaypointConfig>,
    pub land_on_complete: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Press {
    TakeOff,
    Land,
    ToggleAutopilot,
}

impl From<Press> for Triggers {
    fn from(press: Press) -> Self {
        match press {
            Press::TakeOff => Triggers::TAKE_OFF,
            Press::Land => Triggers::LAND,
            Press::ToggleAutopilot => Triggers::TOGGLE_AUTOPILOT,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScriptStepConfig {
    pub duration_s: f32,
    pub yaw: f32,
    pub pitch: f32,
    pub roll: f32,
    pub throttle: f32,
    pub press: Option<Press>,
}

impl ScriptStepConfig {
    fn to_step(self) -> ScriptStep {
        let mut command = ControlVector::new(self.yaw, self.pitch, self.roll, self.throttle);
        if let Some(press) = self.press {
            command = command.with_triggers(press.into());
        }
        ScriptStep {
            duration_s: self.duration_s,
            command,
        }
    }
}

fn invalid(msg: impl Into<String>) -> SimulatorError {
    SimulatorError::InvalidConfig(msg.into())
}

fn check_finite(name: &str, value: f32) -> Result<(), SimulatorError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(invalid(format!("{name} must be finite")))
    }
}

fn check_positive(name: &str, value: Option<f32>) -> Result<(), SimulatorError> {
    match value {
        Some(v) if !(v.is_finite() && v > 0.0) => Err(invalid(format!("{name} must be positive"))),
        _ => Ok(()),
    }
}

impl FlightConfig {
    /// Read and validate a configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SimulatorError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| SimulatorError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_json(&text)?;
        log::info!("config: loaded {}", path.display());
        Ok(config)
    }

    pub fn from_json(text: &str) -> Result<Self, SimulatorError> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, SimulatorError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), SimulatorError> {
        check_positive("run.rate_hz", Some(self.run.rate_hz))?;
        if !(self.run.duration_s.is_finite() && self.run.duration_s >= 0.0) {
            return Err(invalid("run.duration_s must be non-negative"));
        }

        let nav = &self.navigator;
        check_positive("navigator.arrival_dist", nav.arrival_dist)?;
        check_positive("navigator.linear_speed", nav.linear_speed)?;
        check_positive("navigator.non_linear_speed", nav.non_linear_speed)?;
        check_positive("navigator.track_jump", nav.track_jump)?;

        let sim = &self.sim;
        if let Some(noise) = sim.position_noise {
            if !(noise.is_finite() && noise >= 0.0) {
                return Err(invalid("sim.position_noise must be non-negative"));
            }
        }
        check_positive("sim.take_off_height", sim.take_off_height)?;
        check_positive("sim.climb_rate", sim.climb_rate)?;
        check_positive("sim.max_speed", sim.max_speed)?;
        check_positive("sim.max_yaw_rate", sim.max_yaw_rate)?;
        check_positive("sim.response", sim.response)?;

        let mission = &self.mission;
        if mission.waypoints.len() > MAX_WAYPOINTS {
            return Err(invalid(format!(
                "mission has {} waypoints, at most {} supported",
                mission.waypoints.len(),
                MAX_WAYPOINTS
            )));
        }
        for wp in mission.waypoints.iter().chain(mission.start.iter()) {
            for v in wp.position {
                check_finite("waypoint position", v)?;
            }
            check_finite("waypoint yaw", wp.yaw_deg)?;
        }

        for step in &self.script {
            if !(step.duration_s.is_finite() && step.duration_s >= 0.0) {
                return Err(invalid("script step duration must be non-negative"));
            }
        }
        Ok(())
    }

    /// Register flight parameters in `store` and write this file's overrides.
    pub fn apply(&self, store: &mut ParameterStore) -> Result<(), SimulatorError> {
        let param = |e: ParameterError| invalid(format!("parameter store: {e}"));

        NavigatorParams::register_defaults(store).map_err(param)?;
        PidProfileParams::register_defaults(store).map_err(param)?;

        let nav = &self.navigator;
        let floats = [
            ("NAV_ARRIVE_DIST", nav.arrival_dist),
            ("NAV_LIN_SPEED", nav.linear_speed),
            ("NAV_NLIN_SPEED", nav.non_linear_speed),
            ("NAV_TRACK_JUMP", nav.track_jump),
        ];
        for (name, value) in floats {
            if let Some(v) = value {
                store.set(name, ParamValue::Float(v)).map_err(param)?;
            }
        }
        if let Some(style) = nav.style {
            let code = TranslationStyle::from(style).code();
            store.set("NAV_STYLE", ParamValue::Int(code)).map_err(param)?;
        }
        if let Some(headless) = nav.headless {
            store.set("NAV_HEADLESS", ParamValue::Bool(headless)).map_err(param)?;
        }

        let profiles = PidProfileParams::from_store(store).to_profiles();
        for style in TranslationStyle::ALL {
            if let Some(overrides) = self.gains.get(style) {
                let mut gains = profiles.get(style);
                overrides.merge_into(&mut gains);
                PidProfileParams::store_gains(store, style, &gains).map_err(param)?;
            }
        }
        Ok(())
    }

    pub fn sim_config(&self) -> SimConfig {
        let d = SimConfig::default();
        let s = &self.sim;
        SimConfig {
            seed: s.seed.or(d.seed),
            position_noise: s.position_noise.unwrap_or(d.position_noise),
            take_off_height: s.take_off_height.unwrap_or(d.take_off_height),
            climb_rate: s.climb_rate.unwrap_or(d.climb_rate),
            max_speed: s.max_speed.unwrap_or(d.max_speed),
            max_yaw_rate: s.max_yaw_rate.unwrap_or(d.max_yaw_rate),
            response: s.response.unwrap_or(d.response),
            spawn: s.spawn.map(Vector3::from).unwrap_or(d.spawn),
            spawn_yaw_deg: s.spawn_yaw_deg.unwrap_or(d.spawn_yaw_deg),
        }
    }

    /// Build the mission, or `None` when no waypoints are configured.
    pub fn mission(&self) -> Result<Option<Mission>, SimulatorError> {
        let section = &self.mission;
        if section.waypoints.is_empty() {
            return Ok(None);
        }
        let waypoints: Vec<Waypoint> = section.waypoints.iter().map(|w| w.to_waypoint()).collect();
        let mut mission =
            Mission::from_waypoints(&waypoints).map_err(|e| invalid(format!("mission: {e}")))?;
        mission.set_loop(section.looping);
        mission.set_start(section.start.as_ref().map(|w| w.to_waypoint()));
        mission.set_land_on_complete(section.land_on_complete);
        Ok(Some(mission))
    }

    /// Configured name of the mission waypoint or start point with `id`.
    pub fn waypoint_name(&self, id: WaypointId) -> Option<&str> {
        self.mission
            .waypoints
            .iter()
            .chain(self.mission.start.as_ref())
            .find(|w| w.id == id.0)
            .and_then(|w| w.name.as_deref())
    }

    /// Status label for a waypoint: its configured name, else `#id`.
    pub fn waypoint_label(&self, id: WaypointId) -> String {
        match self.waypoint_name(id) {
            Some(name) => name.to_string(),
            None => format!("#{}", id.0),
        }
    }

    pub fn pilot(&self) -> ScriptedPilot {
        let mut pilot = ScriptedPilot::new();
        for step in &self.script {
            pilot.push(step.to_step());
        }
        pilot
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = FlightConfig::from_json("{}").unwrap();
        assert_eq!(config, FlightConfig::default());
        assert_eq!(config.run.rate_hz, 50.0);
        assert_eq!(config.sim_config(), SimConfig::default());
        assert!(config.mission().unwrap().is_none());
        assert!(config.pilot().is_finished());
    }

    #[test]
    fn test_unknown_field_rejected() {
        let err = FlightConfig::from_json(r#"{ "navigator": { "speed": 1.0 } }"#).unwrap_err();
        assert!(matches!(err, SimulatorError::ConfigParse(_)));
    }

    #[test]
    fn test_negative_rate_rejected() {
        let err = FlightConfig::from_json(r#"{ "run": { "rate_hz": -5 } }"#).unwrap_err();
        assert!(matches!(err, SimulatorError::InvalidConfig(_)));
    }

    #[test]
    fn test_navigator_overrides_reach_store() {
        let config = FlightConfig::from_json(
            r#"{ "navigator": { "style": "non_linear", "arrival_dist": 0.3, "headless": true } }"#,
        )
        .unwrap();
        let mut store = ParameterStore::new();
        config.apply(&mut store).unwrap();

        let params = NavigatorParams::from_store(&store);
        assert_eq!(params.style, TranslationStyle::NonLinear);
        assert!((params.arrival_dist - 0.3).abs() < 1e-6);
        assert!(params.headless);
        assert!((params.linear_speed - NavigatorParams::default().linear_speed).abs() < 1e-6);
    }

    #[test]
    fn test_gain_overrides_merge_per_axis() {
        let config = FlightConfig::from_json(
            r#"{ "gains": { "instant": { "x": { "p": 1.5, "d": 0.2 } } } }"#,
        )
        .unwrap();
        let mut store = ParameterStore::new();
        config.apply(&mut store).unwrap();

        let profiles = PidProfileParams::from_store(&store).to_profiles();
        let defaults = AxisGains::default();
        assert_eq!(profiles.instant.x, PidGains::new(1.5, 0.0, 0.2));
        assert_eq!(profiles.instant.z, defaults.z);
        assert_eq!(profiles.linear, defaults);
    }

    #[test]
    fn test_mission_section() {
        let config = FlightConfig::from_json(
            r#"{
                "mission": {
                    "waypoints": [
                        { "id": 1, "name": "gate", "position": [1.0, 0.8, 0.0] },
                        { "id": 2, "position": [1.0, 0.8, 2.0], "yaw_deg": 90.0 }
                    ],
                    "loop": true,
                    "start": { "id": 9, "position": [0.0, 1.0, 0.0] },
                    "land_on_complete": true
                }
            }"#,
        )
        .unwrap();
        let mission = config.mission().unwrap().unwrap();
        assert_eq!(mission.len(), 2);
        assert!(mission.is_looping());
        assert!(mission.lands_on_complete());
        assert_eq!(mission.start().map(|w| w.id.0), Some(9));
        assert!((mission.waypoints()[1].pose.yaw_deg() - 90.0).abs() < 1e-3);
    }

    #[test]
    fn test_waypoint_names_resolve_by_id() {
        let config = FlightConfig::from_json(
            r#"{
                "mission": {
                    "waypoints": [
                        { "id": 1, "name": "gate", "position": [1.0, 0.8, 0.0] },
                        { "id": 2, "position": [1.0, 0.8, 2.0] }
                    ],
                    "start": { "id": 9, "name": "pad", "position": [0.0, 1.0, 0.0] }
                }
            }"#,
        )
        .unwrap();
        assert_eq!(config.waypoint_name(WaypointId(1)), Some("gate"));
        assert_eq!(config.waypoint_name(WaypointId(9)), Some("pad"));
        assert_eq!(config.waypoint_name(WaypointId(2)), None);
        assert_eq!(config.waypoint_label(WaypointId(1)), "gate");
        assert_eq!(config.waypoint_label(WaypointId(2)), "#2");
        assert_eq!(config.waypoint_label(WaypointId(40)), "#40");
    }

    #[test]
    fn test_too_many_waypoints() {
        let waypoints: Vec<String> = (0..=MAX_WAYPOINTS)
            .map(|i| format!(r#"{{ "id": {i}, "position": [0, 0, 0] }}"#))
            .collect();
        let json = format!(r#"{{ "mission": {{ "waypoints": [{}] }} }}"#, waypoints.join(","));
        let err = FlightConfig::from_json(&json).unwrap_err();
        assert!(matches!(err, SimulatorError::InvalidConfig(_)));
    }

    #[test]
    fn test_sim_section_overrides() {
        let config =
            FlightConfig::from_json(r#"{ "sim": { "seed": 3, "spawn": [1, 0, 2] } }"#).unwrap();
        let sim = config.sim_config();
        assert_eq!(sim.seed, Some(3));
        assert_eq!(sim.spawn, Vector3::new(1.0, 0.0, 2.0));
        assert_eq!(sim.take_off_height, SimConfig::default().take_off_height);
    }

    #[test]
    fn test_script_section() {
        let config = FlightConfig::from_json(
            r#"{ "script": [ { "press": "take_off" }, { "duration_s": 2.0, "pitch": 0.5 } ] }"#,
        )
        .unwrap();
        let pilot = config.pilot();
        assert_eq!(pilot.remaining(), 2);
    }

    #[test]
    fn test_json_round_trip_keeps_loop_key() {
        let mut config = FlightConfig::default();
        config.mission.looping = true;
        let json = config.to_json().unwrap();
        assert!(json.contains("\"loop\": true"));
        assert_eq!(FlightConfig::from_json(&json).unwrap(), config);
    }
}
