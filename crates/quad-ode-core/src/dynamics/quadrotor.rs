//! Quadrotor attitude dynamics
//!
//! Rotational dynamics of a quadrotor driven by rotor speeds:
//!
//! q̇ = 1/2 S(q)ᵀ ω
//! Jω̇ = T − ω × Jω
//!
//! Tx = 1/2 A Cl ρ (w2² − w4²)
//! Ty = 1/2 A Cl ρ (w1² − w3²)
//! Tz = 1/2 A Cd ρ (w1² − w2² + w3² − w4²)
//!
//! where:
//! - q: body-to-inertial orientation (scalar-first quaternion)
//! - ω: angular velocity (body frame)
//! - J = diag(J1, J2, J3): principal moments of inertia
//! - T: rotor-induced body torque
//! - wᵢ: rotor angular speeds

use nalgebra::{SMatrix, Vector3, Vector4};
use serde::{Deserialize, Serialize};

use crate::error::ModelError;
use crate::math::{identity_quaternion, jacobian, normalize_quaternion, quaternion_rate, rk4, rollout, DifferenceConfig};
use crate::{ControlVector, ParamVector, StateVector, GRAVITY, NU, NX};

/// Attitude state
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AttitudeState {
    /// Orientation quaternion (w, x, y, z), body to inertial
    pub orientation: Vector4<f64>,
    /// Angular velocity [rad/s] (body frame)
    pub angular_velocity: Vector3<f64>,
}

impl Default for AttitudeState {
    fn default() -> Self {
        Self {
            orientation: identity_quaternion(),
            angular_velocity: Vector3::zeros(),
        }
    }
}

impl AttitudeState {
    pub fn new(orientation: Vector4<f64>, angular_velocity: Vector3<f64>) -> Self {
        Self {
            orientation,
            angular_velocity,
        }
    }

    /// Unpack from `[q0, q1, q2, q3, ωx, ωy, ωz]`
    pub fn from_vector(x: &StateVector) -> Self {
        Self {
            orientation: x.fixed_rows::<4>(0).into_owned(),
            angular_velocity: x.fixed_rows::<3>(4).into_owned(),
        }
    }

    /// Pack into `[q0, q1, q2, q3, ωx, ωy, ωz]`
    pub fn to_vector(&self) -> StateVector {
        let mut x = StateVector::zeros();
        x.fixed_rows_mut::<4>(0).copy_from(&self.orientation);
        x.fixed_rows_mut::<3>(4).copy_from(&self.angular_velocity);
        x
    }
}

/// Rotor angular speeds `(w1, w2, w3, w4)` [rad/s]
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RotorSpeeds {
    pub speeds: Vector4<f64>,
}

impl RotorSpeeds {
    pub fn new(w1: f64, w2: f64, w3: f64, w4: f64) -> Self {
        Self {
            speeds: Vector4::new(w1, w2, w3, w4),
        }
    }

    /// All four rotors at the same speed (no net torque)
    pub fn uniform(w: f64) -> Self {
        Self::new(w, w, w, w)
    }

    pub fn from_vector(u: &ControlVector) -> Self {
        Self { speeds: *u }
    }

    pub fn to_vector(&self) -> ControlVector {
        self.speeds
    }
}

/// Quadrotor model parameters
///
/// Flattened as `p = [ρ, A, Cl, Cd, m, g, J1, J2, J3]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuadrotorParams {
    /// Air density ρ [kg/m³]
    pub air_density: f64,
    /// Propeller area A [m²]
    pub propeller_area: f64,
    /// Lift coefficient Cl
    pub lift_coefficient: f64,
    /// Drag coefficient Cd
    pub drag_coefficient: f64,
    /// Mass [kg]. Carried in p, unused by the attitude dynamics.
    pub mass: f64,
    /// Gravity [m/s²]. Carried in p, unused by the attitude dynamics.
    pub gravity: f64,
    /// Principal moments of inertia (J1, J2, J3) [kg·m²]
    pub inertia: Vector3<f64>,
}

impl Default for QuadrotorParams {
    fn default() -> Self {
        Self {
            air_density: 1.2,
            propeller_area: 0.1,
            lift_coefficient: 1.0,
            drag_coefficient: 0.05,
            mass: 1.0,
            gravity: GRAVITY,
            inertia: Vector3::new(0.01, 0.01, 0.02),
        }
    }
}

impl QuadrotorParams {
    /// Unpack from `[ρ, A, Cl, Cd, m, g, J1, J2, J3]` without validation
    pub fn from_vector(p: &ParamVector) -> Self {
        Self {
            air_density: p[0],
            propeller_area: p[1],
            lift_coefficient: p[2],
            drag_coefficient: p[3],
            mass: p[4],
            gravity: p[5],
            inertia: Vector3::new(p[6], p[7], p[8]),
        }
    }

    /// Pack into `[ρ, A, Cl, Cd, m, g, J1, J2, J3]`
    pub fn to_vector(&self) -> ParamVector {
        ParamVector::from_column_slice(&[
            self.air_density,
            self.propeller_area,
            self.lift_coefficient,
            self.drag_coefficient,
            self.mass,
            self.gravity,
            self.inertia.x,
            self.inertia.y,
            self.inertia.z,
        ])
    }

    /// Same as `from_vector`, but checks the length of a flat slice first
    pub fn from_slice(p: &[f64]) -> Result<Self, ModelError> {
        if p.len() != crate::NP {
            return Err(ModelError::DimensionMismatch {
                expected: crate::NP,
                got: p.len(),
            });
        }
        Ok(Self::from_vector(&ParamVector::from_column_slice(p)))
    }

    /// Check the parameters before handing them to the model
    ///
    /// All values must be finite; ρ, A, m and J1..J3 must be positive.
    pub fn validate(&self) -> Result<(), ModelError> {
        let positive = [
            ("rho", self.air_density),
            ("A", self.propeller_area),
            ("m", self.mass),
            ("J1", self.inertia.x),
            ("J2", self.inertia.y),
            ("J3", self.inertia.z),
        ];
        let finite = [
            ("Cl", self.lift_coefficient),
            ("Cd", self.drag_coefficient),
            ("g", self.gravity),
        ];

        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                log::warn!("rejecting parameter {} = {}", name, value);
                return Err(ModelError::InvalidParameter { name, value });
            }
        }
        for (name, value) in finite {
            if !value.is_finite() {
                log::warn!("rejecting parameter {} = {}", name, value);
                return Err(ModelError::InvalidParameter { name, value });
            }
        }

        Ok(())
    }

    /// Diagonal of J⁻¹
    pub fn inertia_inv(&self) -> Vector3<f64> {
        self.inertia.map(|j| 1.0 / j)
    }
}

/// State derivative split by component
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AttitudeStateDerivative {
    /// Quaternion derivative (w, x, y, z)
    pub orientation_rate: Vector4<f64>,
    /// Angular velocity derivative [rad/s²]
    pub angular_acceleration: Vector3<f64>,
}

impl AttitudeStateDerivative {
    pub fn to_vector(&self) -> StateVector {
        AttitudeState::new(self.orientation_rate, self.angular_acceleration).to_vector()
    }
}

/// Quadrotor attitude dynamics model
#[derive(Debug, Clone)]
pub struct AttitudeDynamics {
    pub params: QuadrotorParams,
}

impl AttitudeDynamics {
    pub fn new(params: QuadrotorParams) -> Self {
        Self { params }
    }

    /// Build from a flat parameter vector without validation
    pub fn from_param_vector(p: &ParamVector) -> Self {
        Self::new(QuadrotorParams::from_vector(p))
    }

    /// Body torque induced by rotor speed differentials
    pub fn rotor_torque(&self, rotors: &RotorSpeeds) -> Vector3<f64> {
        let p = &self.params;
        let w2 = rotors.speeds.component_mul(&rotors.speeds);

        let lift = 0.5 * p.propeller_area * p.lift_coefficient * p.air_density;
        let drag = 0.5 * p.propeller_area * p.drag_coefficient * p.air_density;

        Vector3::new(
            lift * (w2[1] - w2[3]),
            lift * (w2[0] - w2[2]),
            drag * (w2[0] - w2[1] + w2[2] - w2[3]),
        )
    }

    /// Angular acceleration
    ///
    /// ω̇ = J⁻¹ (T − ω × Jω), with J⁻¹ = diag(1/J1, 1/J2, 1/J3)
    pub fn angular_acceleration(&self, omega: &Vector3<f64>, torque: &Vector3<f64>) -> Vector3<f64> {
        let j_omega = self.params.inertia.component_mul(omega);
        let gyro = omega.cross(&j_omega);

        self.params.inertia_inv().component_mul(&(torque - gyro))
    }

    /// Full state derivative
    pub fn state_derivative(&self, state: &AttitudeState, rotors: &RotorSpeeds) -> AttitudeStateDerivative {
        let torque = self.rotor_torque(rotors);

        AttitudeStateDerivative {
            orientation_rate: quaternion_rate(&state.orientation, &state.angular_velocity),
            angular_acceleration: self.angular_acceleration(&state.angular_velocity, &torque),
        }
    }

    /// Explicit dynamics on flat vectors: xdot = f(x, u)
    pub fn f_expl(&self, x: &StateVector, u: &ControlVector) -> StateVector {
        self.state_derivative(&AttitudeState::from_vector(x), &RotorSpeeds::from_vector(u))
            .to_vector()
    }

    /// Implicit residual: xdot − f(x, u)
    pub fn f_impl(&self, x: &StateVector, xdot: &StateVector, u: &ControlVector) -> StateVector {
        xdot - self.f_expl(x, u)
    }

    /// One RK4 step under constant rotor speeds, renormalizing the quaternion
    pub fn step_rk4(&self, x: &StateVector, u: &ControlVector, dt: f64) -> StateVector {
        let mut next = rk4(x, dt, |x| self.f_expl(x, u));

        let q = normalize_quaternion(&next.fixed_rows::<4>(0).into_owned());
        next.fixed_rows_mut::<4>(0).copy_from(&q);
        next
    }

    /// Simulate `steps` RK4 steps under constant rotor speeds
    ///
    /// Returns `steps + 1` states including `x0`.
    pub fn simulate(&self, x0: &StateVector, u: &ControlVector, dt: f64, steps: usize) -> Vec<StateVector> {
        let trajectory = rollout(x0, steps, |x| self.step_rk4(x, u, dt));

        if let Some(k) = trajectory.iter().position(|x| x.iter().any(|v| !v.is_finite())) {
            log::warn!("attitude simulation became non-finite at step {}", k);
        }

        trajectory
    }

    /// ∂f/∂x by finite differences
    pub fn state_jacobian(
        &self,
        x: &StateVector,
        u: &ControlVector,
        config: &DifferenceConfig,
    ) -> Result<SMatrix<f64, NX, NX>, ModelError> {
        jacobian(|x: &StateVector| self.f_expl(x, u), x, config)
    }

    /// ∂f/∂u by finite differences
    pub fn control_jacobian(
        &self,
        x: &StateVector,
        u: &ControlVector,
        config: &DifferenceConfig,
    ) -> Result<SMatrix<f64, NX, NU>, ModelError> {
        jacobian(|u: &ControlVector| self.f_expl(x, u), u, config)
    }
}

/// Explicit dynamics xdot = f(x, u, p)
///
/// Pure and allocation-free; parameters are not validated.
pub fn f_expl(x: &StateVector, u: &ControlVector, p: &ParamVector) -> StateVector {
    AttitudeDynamics::from_param_vector(p).f_expl(x, u)
}

/// Implicit residual xdot − f(x, u, p), zero along solutions
pub fn f_impl(x: &StateVector, xdot: &StateVector, u: &ControlVector, p: &ParamVector) -> StateVector {
    AttitudeDynamics::from_param_vector(p).f_impl(x, xdot, u)
}
