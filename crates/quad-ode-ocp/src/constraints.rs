//! Path constraints for the OCP
//!
//! - Nonlinear: lh ≤ h(x) = q0² + q1² + q2² + q3² ≤ uh (unit quaternion)
//! - Control bounds: w_min ≤ wᵢ ≤ w_max

use quad_ode_core::{ControlVector, StateVector};

use crate::config::ConstraintConfig;

/// Path constraint h(x) = ‖q‖²
pub fn quaternion_norm_squared(x: &StateVector) -> f64 {
    x.fixed_rows::<4>(0).norm_squared()
}

/// Result of constraint evaluation
#[derive(Debug, Clone)]
pub struct ConstraintEvaluation {
    /// Constraint values (non-positive = satisfied, positive = violated)
    pub values: Vec<f64>,
    /// Names for debugging
    pub names: Vec<String>,
    /// Whether all constraints are satisfied
    pub all_satisfied: bool,
    /// Maximum violation (0 if all satisfied)
    pub max_violation: f64,
}

impl ConstraintEvaluation {
    pub fn new() -> Self {
        Self {
            values: Vec::new(),
            names: Vec::new(),
            all_satisfied: true,
            max_violation: 0.0,
        }
    }

    pub fn add(&mut self, name: &str, value: f64) {
        self.names.push(name.to_string());
        self.values.push(value);
        // NaN counts as violated
        if !(value <= 0.0) {
            self.all_satisfied = false;
            if value.is_nan() || self.max_violation.is_nan() {
                self.max_violation = f64::NAN;
            } else {
                self.max_violation = self.max_violation.max(value);
            }
        }
    }

    /// Value of a named constraint
    pub fn get(&self, name: &str) -> Option<f64> {
        self.names
            .iter()
            .position(|n| n == name)
            .map(|i| self.values[i])
    }

    /// Names of the violated constraints
    pub fn violated(&self) -> impl Iterator<Item = &str> {
        self.names
            .iter()
            .zip(&self.values)
            .filter(|(_, v)| !(**v <= 0.0))
            .map(|(n, _)| n.as_str())
    }
}

impl Default for ConstraintEvaluation {
    fn default() -> Self {
        Self::new()
    }
}

/// Constraint evaluator for the OCP
#[derive(Debug, Clone)]
pub struct ConstraintEvaluator {
    config: ConstraintConfig,
}

impl ConstraintEvaluator {
    pub fn new(config: ConstraintConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ConstraintConfig {
        &self.config
    }

    /// Evaluate the quaternion norm constraint at a state
    pub fn evaluate_state(&self, x: &StateVector) -> ConstraintEvaluation {
        let mut eval = ConstraintEvaluation::new();
        self.evaluate_quaternion_norm(x, &mut eval);
        eval
    }

    /// Evaluate all path constraints at a stage node
    pub fn evaluate(&self, x: &StateVector, u: &ControlVector) -> ConstraintEvaluation {
        let mut eval = ConstraintEvaluation::new();
        self.evaluate_quaternion_norm(x, &mut eval);
        self.evaluate_rotor_bounds(u, &mut eval);

        if !eval.all_satisfied {
            log::debug!(
                "path constraints violated ({:?}), max violation {:.3e}",
                eval.violated().collect::<Vec<_>>(),
                eval.max_violation
            );
        }

        eval
    }

    fn evaluate_quaternion_norm(&self, x: &StateVector, eval: &mut ConstraintEvaluation) {
        let bounds = &self.config.quaternion_norm;
        let h = quaternion_norm_squared(x);

        eval.add("h_lower", bounds.lower - h - bounds.tolerance);
        eval.add("h_upper", h - bounds.upper - bounds.tolerance);
    }

    fn evaluate_rotor_bounds(&self, u: &ControlVector, eval: &mut ConstraintEvaluation) {
        for (i, w) in u.iter().enumerate() {
            eval.add(&format!("w{}_min", i + 1), self.config.rotor_speed_min - w);
            eval.add(&format!("w{}_max", i + 1), w - self.config.rotor_speed_max);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use quad_ode_core::dynamics::AttitudeState;
    use quad_ode_core::math::{quaternion_from_euler, EulerAngles};
    use nalgebra::Vector3;

    fn evaluator() -> ConstraintEvaluator {
        ConstraintEvaluator::new(ConstraintConfig::default())
    }

    fn state_with_quaternion_scale(scale: f64) -> StateVector {
        let q = quaternion_from_euler(&EulerAngles::new(0.3, -0.2, 1.4)) * scale;
        AttitudeState::new(q, Vector3::new(0.1, 0.2, 0.3)).to_vector()
    }

    #[test]
    fn test_h_is_one_for_unit_quaternion() {
        let x = state_with_quaternion_scale(1.0);
        assert_relative_eq!(quaternion_norm_squared(&x), 1.0, epsilon = 1e-9);

        let eval = evaluator().evaluate_state(&x);
        assert!(eval.all_satisfied);
        assert_relative_eq!(eval.max_violation, 0.0);
    }

    #[test]
    fn test_scaled_quaternion_detected() {
        for scale in [0.9, 1.1, 2.0] {
            let x = state_with_quaternion_scale(scale);
            assert_relative_eq!(quaternion_norm_squared(&x), scale * scale, epsilon = 1e-9);

            let eval = evaluator().evaluate_state(&x);
            assert!(!eval.all_satisfied);
            assert_relative_eq!(eval.max_violation, (scale * scale - 1.0).abs() - 1e-9, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_violation_side() {
        let eval = evaluator().evaluate_state(&state_with_quaternion_scale(1.1));

        assert!(eval.get("h_upper").unwrap() > 0.0);
        assert!(eval.get("h_lower").unwrap() < 0.0);
        assert_eq!(eval.violated().collect::<Vec<_>>(), vec!["h_upper"]);
    }

    #[test]
    fn test_rotor_bounds() {
        let x = state_with_quaternion_scale(1.0);

        let ok = evaluator().evaluate(&x, &ControlVector::new(0.0, 100.0, 500.0, 1000.0));
        assert!(ok.all_satisfied);
        assert_eq!(ok.values.len(), 2 + 8);

        let bad = evaluator().evaluate(&x, &ControlVector::new(-5.0, 100.0, 1200.0, 0.0));
        assert!(!bad.all_satisfied);
        assert_eq!(bad.violated().collect::<Vec<_>>(), vec!["w1_min", "w3_max"]);
        assert_relative_eq!(bad.max_violation, 200.0);
    }

    #[test]
    fn test_nan_state_is_violation() {
        let mut x = state_with_quaternion_scale(1.0);
        x[0] = f64::NAN;

        let eval = evaluator().evaluate_state(&x);
        assert!(!eval.all_satisfied);
        assert!(eval.max_violation.is_nan());
    }
}
