//! Quad ODE OCP
//!
//! Model description of the quadrotor attitude problem for an external
//! nonlinear MPC framework.
//!
//! # Architecture
//!
//! The framework receives a [`ModelDescription`] record and builds the OCP:
//!
//! ```text
//! minimize    Σₖ ½‖y(xₖ, uₖ) − y_ref‖²_W + ½‖y_e(x_N) − y_ref_e‖²_{W_e}
//! subject to  x₀ = x_init
//!             ẋ = f(x, u, p)            (attitude dynamics)
//!             lh ≤ ‖q‖² ≤ uh            (unit quaternion)
//! ```
//!
//! # Components
//!
//! - [`model`]: Model record and `export_quad_ode_model`
//! - [`cost`]: Euler-angle output maps and least-squares cost
//! - [`constraints`]: Quaternion norm and rotor speed bounds
//! - [`config`]: Horizon, weights and bounds, loadable from JSON
//! - [`ocp`]: OCP definition and node evaluation

pub mod config;
pub mod constraints;
pub mod cost;
pub mod model;
pub mod ocp;

// Re-exports
pub use config::{ConfigError, OcpConfig};
pub use model::{export_quad_ode_model, ModelDescription};
pub use ocp::OcpDefinition;
