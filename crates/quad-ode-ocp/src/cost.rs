//! Nonlinear-least-squares cost
//!
//! ```text
//! l(x, u) = [roll(x) − roll_ref; pitch(x) − pitch_ref; yaw(x) − yaw_ref; x − x_ref; u − u_ref]   (14)
//! m(x)    = [roll(x) − roll_ref; pitch(x) − pitch_ref; yaw(x) − yaw_ref; x − x_ref]            (10)
//! ```
//!
//! The solver minimizes ½‖y − y_ref‖²_W at every stage and ½‖y_e − y_ref_e‖²_{W_e}
//! at the terminal node.

use nalgebra::{Vector3, Vector4};

use quad_ode_core::dynamics::{AttitudeState, RotorSpeeds};
use quad_ode_core::math::{euler_from_quaternion, is_near_gimbal_lock, quaternion_from_euler, EulerAngles};
use quad_ode_core::{ControlVector, OutputVector, StateVector, TerminalOutputVector, NX, NY_E};

use crate::config::CostWeights;

/// Distance of |sin(pitch)| from 1 below which roll and yaw are ill-conditioned
pub const GIMBAL_LOCK_TOLERANCE: f64 = 1e-6;

/// Stage cost features y = [Eul; x; u]
pub fn stage_outputs(x: &StateVector, u: &ControlVector) -> OutputVector {
    let mut y = OutputVector::zeros();
    y.fixed_rows_mut::<NY_E>(0).copy_from(&terminal_outputs(x));
    y.fixed_rows_mut::<4>(3 + NX).copy_from(u);
    y
}

/// Terminal cost features y_e = [Eul; x]
pub fn terminal_outputs(x: &StateVector) -> TerminalOutputVector {
    let q = x.fixed_rows::<4>(0).into_owned();
    if is_near_gimbal_lock(&q, GIMBAL_LOCK_TOLERANCE) {
        log::debug!("Euler features evaluated near gimbal lock, q = {:?}", q.as_slice());
    }
    let euler = euler_from_quaternion(&q);

    let mut y_e = TerminalOutputVector::zeros();
    y_e.fixed_rows_mut::<3>(0).copy_from(&euler.to_vector());
    y_e.fixed_rows_mut::<NX>(3).copy_from(x);
    y_e
}

/// Output reference pair (y_ref, y_ref_e)
#[derive(Debug, Clone, PartialEq)]
pub struct OutputReference {
    pub stage: OutputVector,
    pub terminal: TerminalOutputVector,
}

impl OutputReference {
    /// Reference from a target attitude, body rates and rotor speeds
    ///
    /// The Euler and quaternion entries describe the same attitude, so the
    /// reference is consistent with the output maps.
    pub fn from_attitude(angles: &EulerAngles, angular_velocity: &Vector3<f64>, rotors: &RotorSpeeds) -> Self {
        let x_ref = AttitudeState::new(quaternion_from_euler(angles), *angular_velocity).to_vector();
        Self {
            stage: stage_outputs(&x_ref, &rotors.to_vector()),
            terminal: terminal_outputs(&x_ref),
        }
    }

    /// Level attitude at the given yaw, at rest, with all rotors at `rotor_speed`
    pub fn hover(yaw: f64, rotor_speed: f64) -> Self {
        Self::from_attitude(
            &EulerAngles::new(0.0, 0.0, yaw),
            &Vector3::zeros(),
            &RotorSpeeds::uniform(rotor_speed),
        )
    }

    /// Reference quaternion stored in the stage reference
    pub fn quaternion(&self) -> Vector4<f64> {
        self.stage.fixed_rows::<4>(3).into_owned()
    }
}

/// Weighted nonlinear-least-squares cost
#[derive(Debug, Clone, PartialEq)]
pub struct NonlinearLeastSquares {
    /// W (diagonal)
    pub stage_weights: OutputVector,
    /// W_e (diagonal)
    pub terminal_weights: TerminalOutputVector,
}

impl NonlinearLeastSquares {
    pub fn new(weights: &CostWeights) -> Self {
        Self {
            stage_weights: weights.stage_diagonal(),
            terminal_weights: weights.terminal_diagonal(),
        }
    }

    /// y(x, u) − y_ref
    pub fn stage_residual(&self, x: &StateVector, u: &ControlVector, y_ref: &OutputVector) -> OutputVector {
        stage_outputs(x, u) - y_ref
    }

    /// y_e(x) − y_ref_e
    pub fn terminal_residual(&self, x: &StateVector, y_ref_e: &TerminalOutputVector) -> TerminalOutputVector {
        terminal_outputs(x) - y_ref_e
    }

    /// ½ Σ Wᵢ (yᵢ − y_refᵢ)²
    pub fn stage_cost(&self, x: &StateVector, u: &ControlVector, y_ref: &OutputVector) -> f64 {
        let r = self.stage_residual(x, u, y_ref);
        0.5 * r.component_mul(&r).dot(&self.stage_weights)
    }

    /// ½ Σ W_eᵢ (y_eᵢ − y_ref_eᵢ)²
    pub fn terminal_cost(&self, x: &StateVector, y_ref_e: &TerminalOutputVector) -> f64 {
        let r = self.terminal_residual(x, y_ref_e);
        0.5 * r.component_mul(&r).dot(&self.terminal_weights)
    }
}

impl Default for NonlinearLeastSquares {
    fn default() -> Self {
        Self::new(&CostWeights::default())
    }
}
