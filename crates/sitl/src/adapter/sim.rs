//! Simulated quadcopter.
//!
//! Kinematic model with no external dependencies, suitable for CI and
//! mission rehearsal. Stick inputs set a target velocity in the aircraft's
//! local frame which the airframe approaches with a first-order lag. Take-off
//! and landing are scripted climbs and descents. Reported positions can carry
//! Gaussian noise, seeded for deterministic runs.

use nalgebra::Vector3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use quadpilot_core::control::ControlVector;
use quadpilot_core::navigation::Pose;
use quadpilot_core::quad::{AircraftDriver, DriverError};

/// Configuration for the simulated quadcopter.
#[derive(Debug, Clone, PartialEq)]
pub struct SimConfig {
    /// RNG seed for deterministic mode. None = random.
    pub seed: Option<u64>,
    /// Position noise standard deviation per axis.
    pub position_noise: f32,
    /// Hover height reached by the take-off climb.
    pub take_off_height: f32,
    /// Vertical speed of the take-off climb and landing descent.
    pub climb_rate: f32,
    /// Speed at full stick deflection.
    pub max_speed: f32,
    /// Yaw rate at full stick deflection, degrees per second.
    pub max_yaw_rate: f32,
    /// Velocity response rate (1/s); higher is snappier.
    pub response: f32,
    /// Where the aircraft sits before take-off.
    pub spawn: Vector3<f32>,
    pub spawn_yaw_deg: f32,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed: None,
            position_noise: 0.0,
            take_off_height: 0.8,
            climb_rate: 0.5,
            max_speed: 1.5,
            max_yaw_rate: 90.0,
            response: 4.0,
            spawn: Vector3::zeros(),
            spawn_yaw_deg: 0.0,
        }
    }
}

/// What the airframe is doing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimPhase {
    /// Motors off on the ground
    Grounded,
    /// Motors idling on the ground
    Spinning,
    /// Scripted take-off climb
    Climbing,
    /// Under stick control
    Airborne,
    /// Scripted landing descent
    Descending,
}

/// Simulated aircraft driver.
pub struct SimQuadcopter {
    config: SimConfig,
    rng: StdRng,
    phase: SimPhase,
    position: Vector3<f32>,
    velocity: Vector3<f32>,
    yaw_deg: f32,
    /// Noisy pose from the last `sync`
    measured: Pose,
    last_command: ControlVector,
    sim_time_us: u64,
}

impl SimQuadcopter {
    pub fn new(config: SimConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let position = config.spawn;
        let yaw_deg = config.spawn_yaw_deg;
        Self {
            config,
            rng,
            phase: SimPhase::Grounded,
            position,
            velocity: Vector3::zeros(),
            yaw_deg,
            measured: Pose::new(position, yaw_deg),
            last_command: ControlVector::neutral(),
            sim_time_us: 0,
        }
    }

    pub fn with_defaults() -> Self {
        Self::new(SimConfig::default())
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn phase(&self) -> SimPhase {
        self.phase
    }

    /// True position, without measurement noise.
    pub fn position(&self) -> Vector3<f32> {
        self.position
    }

    pub fn velocity(&self) -> Vector3<f32> {
        self.velocity
    }

    pub fn yaw_deg(&self) -> f32 {
        self.yaw_deg
    }

    pub fn last_command(&self) -> ControlVector {
        self.last_command
    }

    pub fn sim_time_us(&self) -> u64 {
        self.sim_time_us
    }

    /// Advance the airframe by `dt` seconds under `command`.
    fn step(&mut self, command: &ControlVector, dt: f32) {
        if dt <= 0.0 {
            return;
        }
        self.sim_time_us += (dt * 1_000_000.0) as u64;

        match self.phase {
            SimPhase::Grounded | SimPhase::Spinning => {
                self.velocity = Vector3::zeros();
            }
            SimPhase::Climbing => {
                self.position.y += self.config.climb_rate * dt;
                if self.position.y >= self.config.take_off_height {
                    self.position.y = self.config.take_off_height;
                    self.phase = SimPhase::Airborne;
                    log::info!("sim: hovering at {:.2}", self.position.y);
                }
            }
            SimPhase::Airborne => self.fly(command, dt),
            SimPhase::Descending => {
                self.velocity = Vector3::zeros();
                self.position.y -= self.config.climb_rate * dt;
                if self.position.y <= 0.0 {
                    self.position.y = 0.0;
                    self.phase = SimPhase::Grounded;
                    log::info!("sim: touched down");
                }
            }
        }
    }

    fn fly(&mut self, command: &ControlVector, dt: f32) {
        let heading = Pose::new(self.position, self.yaw_deg);
        let target = (heading.right() * command.roll
            + Vector3::y() * command.throttle
            + heading.forward() * command.pitch)
            * self.config.max_speed;

        let blend = (self.config.response * dt).min(1.0);
        self.velocity += (target - self.velocity) * blend;
        self.position += self.velocity * dt;
        if self.position.y < 0.0 {
            self.position.y = 0.0;
            self.velocity.y = 0.0;
        }

        self.yaw_deg = (self.yaw_deg + command.yaw * self.config.max_yaw_rate * dt).rem_euclid(360.0);
    }

    /// Generate Gaussian noise using Box-Muller transform.
    fn gaussian_noise(&mut self, stddev: f32) -> f32 {
        if stddev == 0.0 {
            return 0.0;
        }
        let u1: f32 = self.rng.gen::<f32>().max(f32::EPSILON);
        let u2: f32 = self.rng.gen();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f32::consts::PI * u2).cos();
        z * stddev
    }
}

impl std::fmt::Debug for SimQuadcopter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimQuadcopter")
            .field("phase", &self.phase)
            .field("position", &self.position)
            .field("yaw_deg", &self.yaw_deg)
            .field("sim_time_us", &self.sim_time_us)
            .finish()
    }
}

impl AircraftDriver for SimQuadcopter {
    fn sync(&mut self) -> bool {
        let sigma = self.config.position_noise;
        let noise = Vector3::new(
            self.gaussian_noise(sigma),
            self.gaussian_noise(sigma),
            self.gaussian_noise(sigma),
        );
        self.measured = Pose::new(self.position + noise, self.yaw_deg);
        true
    }

    fn pose(&self) -> Result<Pose, DriverError> {
        Ok(self.measured)
    }

    fn is_simulated(&self) -> bool {
        true
    }

    fn is_tracking(&self) -> bool {
        true
    }

    fn launch_complete(&self) -> bool {
        self.phase == SimPhase::Airborne
    }

    fn landing_complete(&self) -> bool {
        self.phase == SimPhase::Grounded
    }

    fn start_motors(&mut self) -> Result<(), DriverError> {
        match self.phase {
            SimPhase::Grounded | SimPhase::Spinning => {
                self.phase = SimPhase::Spinning;
                Ok(())
            }
            _ => Err(DriverError::Rejected),
        }
    }

    fn take_off(&mut self) -> Result<(), DriverError> {
        match self.phase {
            SimPhase::Grounded | SimPhase::Spinning => {
                log::info!("sim: take-off to {:.2}", self.config.take_off_height);
                self.phase = SimPhase::Climbing;
                Ok(())
            }
            _ => Err(DriverError::Rejected),
        }
    }

    fn land(&mut self) -> Result<(), DriverError> {
        match self.phase {
            SimPhase::Spinning => {
                self.phase = SimPhase::Grounded;
                Ok(())
            }
            SimPhase::Climbing | SimPhase::Airborne => {
                self.phase = SimPhase::Descending;
                Ok(())
            }
            _ => Err(DriverError::Rejected),
        }
    }

    fn send(&mut self, command: &ControlVector, dt_s: f32) {
        self.last_command = *command;
        self.step(command, dt_s);
    }
}
