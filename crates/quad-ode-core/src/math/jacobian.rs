//! Finite-difference Jacobians
//!
//! Gradients of the closed-form model maps are obtained by centered
//! differences instead of an expression graph.

use nalgebra::{SMatrix, SVector};
use serde::{Deserialize, Serialize};

use crate::error::ModelError;

/// Finite-difference configuration
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DifferenceConfig {
    /// Perturbation size. Must be in `(0, 1e-2]`.
    pub eps: f64,
    /// Use centered differences (O(ε²)) instead of forward (O(ε))
    pub centered: bool,
}

impl Default for DifferenceConfig {
    fn default() -> Self {
        Self {
            eps: 1e-6,
            centered: true,
        }
    }
}

impl DifferenceConfig {
    pub fn validate(&self) -> Result<(), ModelError> {
        if self.eps.is_finite() && self.eps > 0.0 && self.eps <= 1e-2 {
            Ok(())
        } else {
            Err(ModelError::InvalidStep(self.eps))
        }
    }
}

/// Jacobian ∂f/∂x of `f: ℝᴺ → ℝᴹ` at `x`
pub fn jacobian<const M: usize, const N: usize, F>(
    f: F,
    x: &SVector<f64, N>,
    config: &DifferenceConfig,
) -> Result<SMatrix<f64, M, N>, ModelError>
where
    F: Fn(&SVector<f64, N>) -> SVector<f64, M>,
{
    config.validate()?;
    let eps = config.eps;

    let f0 = if config.centered { None } else { Some(f(x)) };
    let mut jac = SMatrix::<f64, M, N>::zeros();
    let mut perturbed = *x;

    for j in 0..N {
        perturbed[j] = x[j] + eps;
        let f_plus = f(&perturbed);

        let col = match f0 {
            Some(ref f0) => (f_plus - f0) / eps,
            None => {
                perturbed[j] = x[j] - eps;
                (f_plus - f(&perturbed)) / (2.0 * eps)
            }
        };

        jac.set_column(j, &col);
        perturbed[j] = x[j];
    }

    Ok(jac)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::{Matrix2x3, Vector2, Vector3};

    #[test]
    fn test_linear_map_exact() {
        let a = Matrix2x3::new(
            1.0, 2.0, 3.0,
            -4.0, 0.5, 0.0,
        );
        let x = Vector3::new(0.3, -0.2, 1.0);

        let jac = jacobian(|x: &Vector3<f64>| a * x, &x, &DifferenceConfig::default()).unwrap();

        assert_relative_eq!(jac, a, epsilon = 1e-8);
    }

    #[test]
    fn test_nonlinear_map() {
        // f(x, y) = [x²y, sin(y)]
        let f = |v: &Vector2<f64>| Vector2::new(v.x * v.x * v.y, v.y.sin());
        let x = Vector2::new(1.5, 0.4);

        let jac = jacobian(f, &x, &DifferenceConfig::default()).unwrap();

        assert_relative_eq!(jac[(0, 0)], 2.0 * 1.5 * 0.4, epsilon = 1e-7);
        assert_relative_eq!(jac[(0, 1)], 1.5 * 1.5, epsilon = 1e-7);
        assert_relative_eq!(jac[(1, 0)], 0.0, epsilon = 1e-7);
        assert_relative_eq!(jac[(1, 1)], 0.4_f64.cos(), epsilon = 1e-7);
    }

    #[test]
    fn test_forward_differences() {
        let f = |v: &Vector2<f64>| Vector2::new(v.x * v.x, v.y);
        let config = DifferenceConfig {
            eps: 1e-7,
            centered: false,
        };

        let jac = jacobian(f, &Vector2::new(2.0, 0.0), &config).unwrap();

        assert_relative_eq!(jac[(0, 0)], 4.0, epsilon = 1e-5);
        assert_relative_eq!(jac[(1, 1)], 1.0, epsilon = 1e-5);
    }

    #[test]
    fn test_invalid_step_rejected() {
        let f = |v: &Vector2<f64>| *v;
        for eps in [0.0, -1e-6, 0.1, f64::NAN] {
            let config = DifferenceConfig { eps, centered: true };
            let result = jacobian(f, &Vector2::zeros(), &config);
            assert!(matches!(result, Err(ModelError::InvalidStep(_))));
        }
    }
}
