//! Fixed-step integrators for autonomous ODEs
//!
//! The attitude model is time-invariant, so the derivative closures take
//! only the state: dx/dt = f(x).

use nalgebra::SVector;

/// 4th-order Runge-Kutta step
///
/// # Arguments
/// * `x` - Current state
/// * `dt` - Time step
/// * `f` - Derivative function f(x) -> dx/dt
pub fn rk4<const N: usize, F>(x: &SVector<f64, N>, dt: f64, f: F) -> SVector<f64, N>
where
    F: Fn(&SVector<f64, N>) -> SVector<f64, N>,
{
    let k1 = f(x);
    let k2 = f(&(x + k1 * (dt / 2.0)));
    let k3 = f(&(x + k2 * (dt / 2.0)));
    let k4 = f(&(x + k3 * dt));

    x + (k1 + k2 * 2.0 + k3 * 2.0 + k4) * (dt / 6.0)
}

/// Roll out `steps` applications of `step`, returning every state
/// including the initial one (`steps + 1` entries)
pub fn rollout<const N: usize, S>(x0: &SVector<f64, N>, steps: usize, mut step: S) -> Vec<SVector<f64, N>>
where
    S: FnMut(&SVector<f64, N>) -> SVector<f64, N>,
{
    let mut trajectory = Vec::with_capacity(steps + 1);
    trajectory.push(*x0);

    let mut x = *x0;
    for _ in 0..steps {
        x = step(&x);
        trajectory.push(x);
    }

    trajectory
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::PI;

    #[test]
    fn test_rk4_exponential_decay() {
        // dx/dt = -x, x(0) = 1  =>  x(1) = e^-1
        let mut x = SVector::<f64, 1>::new(1.0);
        let dt = 0.01;

        for _ in 0..100 {
            x = rk4(&x, dt, |x| -*x);
        }

        assert_relative_eq!(x[0], (-1.0_f64).exp(), epsilon = 1e-6);
    }

    #[test]
    fn test_rk4_harmonic_oscillator() {
        // [x, v]: dx/dt = v, dv/dt = -x, x(0) = 1  =>  x(t) = cos(t)
        let dt = 0.001;
        let steps = (PI / 2.0 / dt) as usize;

        let trajectory = rollout(&SVector::<f64, 2>::new(1.0, 0.0), steps, |x| {
            rk4(x, dt, |s| SVector::<f64, 2>::new(s[1], -s[0]))
        });

        let last = trajectory[steps];
        assert_relative_eq!(last[0], 0.0, epsilon = 1e-3);
        assert_relative_eq!(last[1], -1.0, epsilon = 1e-3);
    }



    #[test]
    fn test_rollout_length() {
        let trajectory = rollout(&SVector::<f64, 1>::new(0.0), 5, |x| x.add_scalar(1.0));

        assert_eq!(trajectory.len(), 6);
        assert_relative_eq!(trajectory[0][0], 0.0);
        assert_relative_eq!(trajectory[5][0], 5.0);
    }
}
