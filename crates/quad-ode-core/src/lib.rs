//! # Quad ODE Core
//!
//! Quaternion attitude dynamics of a quadrotor, written as closed-form
//! numeric functions for consumption by a nonlinear model-predictive
//! controller (NMPC).
//!
//! The model has seven states, four controls and nine parameters:
//!
//! ```text
//! x = [q0, q1, q2, q3, ωx, ωy, ωz]
//! u = [w1, w2, w3, w4]                       (rotor speeds)
//! p = [ρ, A, Cl, Cd, m, g, J1, J2, J3]
//!
//! q̇ = 1/2 S(q)ᵀ ω
//! ω̇ = J⁻¹ (T(u, p) − ω × Jω)
//! ```
//!
//! ## Modules
//!
//! - [`math`]: Quaternion kinematics, rotations, integrators, finite differences
//! - [`dynamics`]: Model parameters and the attitude dynamics
//! - [`error`]: Error type for boundary checks

pub mod math;
pub mod dynamics;
pub mod error;

pub use error::ModelError;

use nalgebra::SVector;

/// State dimension
pub const NX: usize = 7;

/// Control dimension
pub const NU: usize = 4;

/// Parameter dimension
pub const NP: usize = 9;

/// Stage cost output dimension: Euler angles + state + control
pub const NY: usize = 3 + NX + NU;

/// Terminal cost output dimension: Euler angles + state
pub const NY_E: usize = 3 + NX;

/// Number of nonlinear path constraints
pub const NH: usize = 1;

/// State vector `[q0, q1, q2, q3, ωx, ωy, ωz]`
pub type StateVector = SVector<f64, NX>;

/// Control vector `[w1, w2, w3, w4]`
pub type ControlVector = SVector<f64, NU>;

/// Parameter vector `[ρ, A, Cl, Cd, m, g, J1, J2, J3]`
pub type ParamVector = SVector<f64, NP>;

/// Stage cost output vector `[roll, pitch, yaw, x, u]`
pub type OutputVector = SVector<f64, NY>;

/// Terminal cost output vector `[roll, pitch, yaw, x]`
pub type TerminalOutputVector = SVector<f64, NY_E>;

/// Gravity constant [m/s²]
pub const GRAVITY: f64 = 9.81;
