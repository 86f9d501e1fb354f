//! OCP configuration
//!
//! Horizon, cost weights, constraint bounds and model parameters of the
//! attitude OCP. Everything is serde-serializable and can be loaded from JSON.

use std::path::Path;

use nalgebra::{Vector3, Vector4};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use quad_ode_core::dynamics::QuadrotorParams;
use quad_ode_core::{ModelError, OutputVector, TerminalOutputVector};

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read configuration: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Invalid model parameters: {0}")]
    InvalidParams(#[from] ModelError),
    #[error("Invalid horizon: {0}")]
    InvalidHorizon(String),
    #[error("Invalid bounds: lower {lower} > upper {upper}")]
    InvalidBounds { lower: f64, upper: f64 },
    #[error("Invalid constraint tolerance: {0}")]
    InvalidTolerance(f64),
}

/// Main OCP configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OcpConfig {
    /// Model name, used for generated-code naming by the solver framework
    pub model_name: String,
    /// Horizon discretization
    pub horizon: HorizonConfig,
    /// Cost function weights
    pub weights: CostWeights,
    /// Constraint bounds
    pub constraints: ConstraintConfig,
    /// Physical parameters, flattened into `p` at every node
    pub params: QuadrotorParams,
}

impl Default for OcpConfig {
    fn default() -> Self {
        Self {
            model_name: crate::model::MODEL_NAME.to_string(),
            horizon: HorizonConfig::default(),
            weights: CostWeights::default(),
            constraints: ConstraintConfig::default(),
            params: QuadrotorParams::default(),
        }
    }
}

impl OcpConfig {
    /// Parse and validate a JSON configuration. Missing fields, also inside
    /// nested sections, take defaults.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON configuration file
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        log::debug!("loading OCP configuration from {}", path.display());
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn to_json_string(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.params.validate()?;
        self.horizon.validate()?;
        self.constraints.validate()?;
        Ok(())
    }
}

/// Horizon configuration for the OCP
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HorizonConfig {
    /// Number of shooting intervals N
    pub num_nodes: usize,
    /// Total horizon time [s]
    pub horizon_time: f64,
    /// Intervals grow linearly along the horizon instead of being equal
    pub non_uniform: bool,
}

impl Default for HorizonConfig {
    fn default() -> Self {
        Self {
            num_nodes: 20,
            horizon_time: 1.0,
            non_uniform: false,
        }
    }
}

impl HorizonConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.num_nodes == 0 {
            return Err(ConfigError::InvalidHorizon("num_nodes must be positive".into()));
        }
        if !(self.horizon_time.is_finite() && self.horizon_time > 0.0) {
            return Err(ConfigError::InvalidHorizon(format!(
                "horizon_time must be positive, got {}",
                self.horizon_time
            )));
        }
        Ok(())
    }

    /// Compute time intervals for each shooting interval
    ///
    /// Non-uniform intervals increase linearly so that the last one is twice
    /// the first; they always sum to `horizon_time`.
    pub fn compute_intervals(&self) -> Vec<f64> {
        let n = self.num_nodes;
        if !self.non_uniform || n < 2 {
            return vec![self.horizon_time / n.max(1) as f64; n];
        }

        // dt_k = dt_0 (1 + (r − 1) k / (N − 1)),  Σ dt_k = dt_0 N (1 + (r − 1)/2)
        let ratio = 2.0;
        let dt_0 = self.horizon_time / (n as f64 * (1.0 + (ratio - 1.0) / 2.0));

        (0..n)
            .map(|k| dt_0 * (1.0 + (ratio - 1.0) * k as f64 / (n - 1) as f64))
            .collect()
    }

    /// Node times t_0 = 0, ..., t_N = horizon_time
    pub fn node_times(&self) -> Vec<f64> {
        std::iter::once(0.0)
            .chain(self.compute_intervals().into_iter().scan(0.0, |t, dt| {
                *t += dt;
                Some(*t)
            }))
            .collect()
    }
}

/// Diagonal weights of the nonlinear-least-squares cost
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CostWeights {
    /// Roll, pitch, yaw tracking weight
    pub w_euler: Vector3<f64>,
    /// Quaternion tracking weight
    pub w_quaternion: Vector4<f64>,
    /// Angular velocity tracking weight
    pub w_angular_velocity: Vector3<f64>,
    /// Rotor speed weight
    pub w_rotor_speed: Vector4<f64>,
    /// Terminal weights are the stage state weights times this factor
    pub terminal_scale: f64,
}

impl Default for CostWeights {
    fn default() -> Self {
        Self {
            w_euler: Vector3::repeat(100.0),
            w_quaternion: Vector4::repeat(10.0),
            w_angular_velocity: Vector3::repeat(1.0),
            // Rotor speeds are O(100) rad/s, keep them from dominating
            w_rotor_speed: Vector4::repeat(1e-3),
            terminal_scale: 10.0,
        }
    }
}

impl CostWeights {
    /// Stage weight diagonal matching `[Eul; x; u]`
    pub fn stage_diagonal(&self) -> OutputVector {
        let mut w = OutputVector::zeros();
        w.fixed_rows_mut::<3>(0).copy_from(&self.w_euler);
        w.fixed_rows_mut::<4>(3).copy_from(&self.w_quaternion);
        w.fixed_rows_mut::<3>(7).copy_from(&self.w_angular_velocity);
        w.fixed_rows_mut::<4>(10).copy_from(&self.w_rotor_speed);
        w
    }

    /// Terminal weight diagonal matching `[Eul; x]`
    pub fn terminal_diagonal(&self) -> TerminalOutputVector {
        let stage = self.stage_diagonal();
        stage.fixed_rows::<10>(0).into_owned() * self.terminal_scale
    }
}

/// Bounds on the unit-quaternion path constraint h = ‖q‖²
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuaternionNormBounds {
    pub lower: f64,
    pub upper: f64,
    /// Slack below which a deviation still counts as satisfied
    pub tolerance: f64,
}

impl Default for QuaternionNormBounds {
    fn default() -> Self {
        Self {
            lower: 1.0,
            upper: 1.0,
            tolerance: 1e-9,
        }
    }
}

/// Constraint bounds configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConstraintConfig {
    /// Nonlinear path constraint lh ≤ h(x) ≤ uh
    pub quaternion_norm: QuaternionNormBounds,
    /// Minimum rotor speed [rad/s]
    pub rotor_speed_min: f64,
    /// Maximum rotor speed [rad/s]
    pub rotor_speed_max: f64,
}

impl Default for ConstraintConfig {
    fn default() -> Self {
        Self {
            quaternion_norm: QuaternionNormBounds::default(),
            rotor_speed_min: 0.0,
            rotor_speed_max: 1000.0,
        }
    }
}

impl ConstraintConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let h = &self.quaternion_norm;
        if !(h.lower <= h.upper) {
            return Err(ConfigError::InvalidBounds {
                lower: h.lower,
                upper: h.upper,
            });
        }
        if !(h.tolerance.is_finite() && h.tolerance >= 0.0) {
            return Err(ConfigError::InvalidTolerance(h.tolerance));
        }
        if !(self.rotor_speed_min <= self.rotor_speed_max) {
            return Err(ConfigError::InvalidBounds {
                lower: self.rotor_speed_min,
                upper: self.rotor_speed_max,
            });
        }
        Ok(())
    }
}
