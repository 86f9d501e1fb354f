//! Mathematical utilities
//!
//! Quaternion kinematics, rotations and Euler angles, fixed-step integrators
//! and finite-difference Jacobians.

pub mod quaternion;
pub mod rotation;
pub mod integrator;
pub mod jacobian;

pub use quaternion::*;
pub use rotation::*;
pub use integrator::*;
pub use jacobian::*;
