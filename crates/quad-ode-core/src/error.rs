//! Errors raised at the boundary of the model
//!
//! The evaluation functions themselves never fail; degenerate inputs
//! propagate as NaN/Inf. These errors come from the checks callers run
//! before evaluating.

use thiserror::Error;

/// Model boundary errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ModelError {
    #[error("Invalid parameter {name}: {value}")]
    InvalidParameter { name: &'static str, value: f64 },
    #[error("Invalid dimension: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },
    #[error("Finite-difference step must be in (0, 1e-2], got {0}")]
    InvalidStep(f64),
}
