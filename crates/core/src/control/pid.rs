//! Single-axis PID feedback controller
//!
//! Computes `clamp(kp * e + ki * integral(e dt) + kd * de/dt, min, max)` with
//! `e = set_point - process_variable`. Elapsed time is supplied per call in
//! whole milliseconds.
//!
//! The integral accumulator has no bound of its own; only the output is
//! clamped. Tuned gains depend on this, so a sustained error can wind the
//! integral up.

/// Gain set for one controller axis
///
/// A controller takes its gains by value at construction. Changing gains
/// means building a new controller, which drops integrator history.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct PidGains {
    /// Proportional gain
    pub kp: f32,
    /// Integral gain
    pub ki: f32,
    /// Derivative gain
    pub kd: f32,
}

impl PidGains {
    pub const fn new(kp: f32, ki: f32, kd: f32) -> Self {
        Self { kp, ki, kd }
    }
}

/// Runtime state for one feedback loop
#[derive(Clone, Debug)]
pub struct PidController {
    gains: PidGains,
    set_point: f32,
    process_variable: f32,
    integral: f32,
    previous_error: f32,
    /// Set after the first update; the derivative is zero until then
    primed: bool,
    output_min: f32,
    output_max: f32,
}

impl PidController {
    /// Create a controller with the given gains and output limits.
    ///
    /// Limits are swapped if given in the wrong order.
    pub fn new(gains: PidGains, output_min: f32, output_max: f32) -> Self {
        let (output_min, output_max) = if output_min <= output_max {
            (output_min, output_max)
        } else {
            (output_max, output_min)
        };
        Self {
            gains,
            set_point: 0.0,
            process_variable: 0.0,
            integral: 0.0,
            previous_error: 0.0,
            primed: false,
            output_min,
            output_max,
        }
    }

    pub fn gains(&self) -> PidGains {
        self.gains
    }

    pub fn set_point(&self) -> f32 {
        self.set_point
    }

    pub fn set_set_point(&mut self, set_point: f32) {
        self.set_point = set_point;
    }

    /// Last process variable fed to [`update`](Self::update)
    pub fn process_variable(&self) -> f32 {
        self.process_variable
    }

    pub fn output_limits(&self) -> (f32, f32) {
        (self.output_min, self.output_max)
    }

    pub fn integral(&self) -> f32 {
        self.integral
    }

    /// Feed a new process variable and compute the clamped output.
    ///
    /// `elapsed_ms` is the time since the previous update. The derivative term
    /// is zero on the first update and whenever `elapsed_ms` is zero.
    ///
    /// A non-finite error leaves the integrator and derivative history
    /// untouched and yields the clamped zero output.
    pub fn update(&mut self, process_variable: f32, elapsed_ms: u32) -> f32 {
        let error = self.set_point - process_variable;
        if !error.is_finite() {
            return self.clamp_output(0.0);
        }

        self.process_variable = process_variable;
        let dt = elapsed_ms as f32 / 1000.0;

        self.integral += error * dt;

        let derivative = if self.primed && elapsed_ms > 0 {
            (error - self.previous_error) / dt
        } else {
            0.0
        };

        self.previous_error = error;
        self.primed = true;

        let output =
            self.gains.kp * error + self.gains.ki * self.integral + self.gains.kd * derivative;
        self.clamp_output(output)
    }

    /// Drop integrator and derivative history.
    pub fn reset(&mut self) {
        self.integral = 0.0;
        self.previous_error = 0.0;
        self.process_variable = 0.0;
        self.primed = false;
    }

    fn clamp_output(&self, output: f32) -> f32 {
        if output.is_nan() {
            return 0.0_f32.clamp(self.output_min, self.output_max);
        }
        output.clamp(self.output_min, self.output_max)
    }
}
