//! Dynamics models
//!
//! Quaternion kinematics and rigid-body rotational dynamics of a quadrotor
//! driven by its four rotor speeds.

pub mod quadrotor;

pub use quadrotor::*;
