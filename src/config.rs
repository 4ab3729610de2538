//! Simulation configuration.
//!
//! `SimConfig` is the live configuration; `SimConfigUpdate` carries a partial
//! change from the host. Updates are merged into a copy, validated, and only
//! then committed, so a bad update never leaves the engine half-configured.
//!
//! JSON field names are camel case, matching the host payloads:
//!
//! ```json
//! {
//!   "dt": 0.5,
//!   "targetTemperature": 300.0,
//!   "confinementRadius": 10.0,
//!   "confinementForce": 2.0,
//!   "thermostatTau": 20.0,
//!   "stepsPerUpdate": 10,
//!   "maxStepDisplacement": 0.05,
//!   "relaxation": "steepestDescent",
//!   "seed": 42
//! }
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SimError};

/// How overlapping initial placements are resolved before dynamics start.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RelaxationMethod {
    #[default]
    SteepestDescent,
    Dynamical,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SimConfig {
    pub dt: f64,                    // fs
    pub target_temperature: f64,    // K, 0 disables the thermostat
    pub confinement_radius: f64,    // A
    pub confinement_force: f64,     // eV/A^2, 0 disables the wall
    pub thermostat_tau: f64,        // fs, 0 disables the thermostat
    pub steps_per_update: usize,    // host batching factor
    pub max_step_displacement: f64, // A, velocity cap = this / dt
    pub relaxation: RelaxationMethod,
    pub seed: Option<u64>,
}

impl Default for SimConfig {
    fn default() -> Self {
        SimConfig {
            dt: 0.5,
            target_temperature: 300.0,
            confinement_radius: 10.0,
            confinement_force: 2.0,
            thermostat_tau: 20.0,
            steps_per_update: 10,
            max_step_displacement: 0.05,
            relaxation: RelaxationMethod::SteepestDescent,
            seed: None,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SimConfigUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dt: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confinement_radius: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confinement_force: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thermostat_tau: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub steps_per_update: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_step_displacement: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relaxation: Option<RelaxationMethod>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

fn require_finite(field: &'static str, value: f64) -> Result<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(SimError::config(field, format!("must be finite, got {value}")))
    }
}

impl SimConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: SimConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn validate(&self) -> Result<()> {
        require_finite("dt", self.dt)?;
        require_finite("targetTemperature", self.target_temperature)?;
        require_finite("confinementRadius", self.confinement_radius)?;
        require_finite("confinementForce", self.confinement_force)?;
        require_finite("thermostatTau", self.thermostat_tau)?;
        require_finite("maxStepDisplacement", self.max_step_displacement)?;

        if self.dt <= 0.0 {
            return Err(SimError::config("dt", format!("must be positive, got {}", self.dt)));
        }
        if self.target_temperature < 0.0 {
            return Err(SimError::config(
                "targetTemperature",
                format!("must not be negative, got {}", self.target_temperature),
            ));
        }
        if self.confinement_radius <= 0.0 {
            return Err(SimError::config(
                "confinementRadius",
                format!("must be positive, got {}", self.confinement_radius),
            ));
        }
        if self.confinement_force < 0.0 {
            return Err(SimError::config(
                "confinementForce",
                format!("must not be negative, got {}", self.confinement_force),
            ));
        }
        // tau = 0 switches coupling off; below dt a single step would overshoot
        if self.thermostat_tau < 0.0 || (self.thermostat_tau > 0.0 && self.thermostat_tau < self.dt) {
            return Err(SimError::config(
                "thermostatTau",
                format!(
                    "must be 0 or at least dt ({}), got {}",
                    self.dt, self.thermostat_tau
                ),
            ));
        }
        if self.steps_per_update == 0 {
            return Err(SimError::config("stepsPerUpdate", "must be at least 1"));
        }
        if self.max_step_displacement <= 0.0 {
            return Err(SimError::config(
                "maxStepDisplacement",
                format!("must be positive, got {}", self.max_step_displacement),
            ));
        }
        Ok(())
    }

    /// Copy of `self` with every field present in `update` replaced.
    pub fn merged(&self, update: &SimConfigUpdate) -> SimConfig {
        let mut next = self.clone();
        if let Some(dt) = update.dt {
            next.dt = dt;
        }
        if let Some(t) = update.target_temperature {
            next.target_temperature = t;
        }
        if let Some(r) = update.confinement_radius {
            next.confinement_radius = r;
        }
        if let Some(k) = update.confinement_force {
            next.confinement_force = k;
        }
        if let Some(tau) = update.thermostat_tau {
            next.thermostat_tau = tau;
        }
        if let Some(n) = update.steps_per_update {
            next.steps_per_update = n;
        }
        if let Some(d) = update.max_step_displacement {
            next.max_step_displacement = d;
        }
        if let Some(method) = update.relaxation {
            next.relaxation = method;
        }
        if update.seed.is_some() {
            next.seed = update.seed;
        }
        next
    }

    /// Merge and validate; `self` is only modified when the result is valid.
    pub fn apply(&mut self, update: &SimConfigUpdate) -> Result<()> {
        let next = self.merged(update);
        next.validate()?;
        *self = next;
        Ok(())
    }

    pub fn thermostat_enabled(&self) -> bool {
        self.target_temperature > 0.0 && self.thermostat_tau > 0.0
    }
}
