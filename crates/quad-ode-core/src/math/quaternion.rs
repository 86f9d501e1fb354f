//! Quaternion kinematics for attitude representation
//!
//! Quaternions are stored scalar-first as raw `Vector4` values `(q0, q1, q2, q3)`
//! rather than `UnitQuaternion`, because the solver evaluates the model at
//! points where the unit norm only holds approximately.
//!
//! - Kinematics matrix: S(q) = [-v | q0·I₃ − [v]×], v = (q1, q2, q3)
//! - Quaternion rate: q̇ = 1/2 S(q)ᵀ ω

use nalgebra::{Matrix3, Matrix3x4, UnitQuaternion, Vector3, Vector4};

use super::rotation::skew;

/// Identity quaternion `(1, 0, 0, 0)`
pub fn identity_quaternion() -> Vector4<f64> {
    Vector4::new(1.0, 0.0, 0.0, 0.0)
}

/// Quaternion kinematics matrix S(q) ∈ ℝ³ˣ⁴
///
/// ```text
/// S(q) = [-q1   q0   q3  -q2]
///        [-q2  -q3   q0   q1]
///        [-q3   q2  -q1   q0]
/// ```
pub fn kinematics_matrix(q: &Vector4<f64>) -> Matrix3x4<f64> {
    let v = Vector3::new(q[1], q[2], q[3]);

    let mut s = Matrix3x4::zeros();
    s.set_column(0, &(-v));
    s.fixed_view_mut::<3, 3>(0, 1)
        .copy_from(&(Matrix3::identity() * q[0] - skew(&v)));
    s
}

/// Compute the quaternion derivative given body angular velocity
///
/// q̇ = 1/2 S(q)ᵀ ω
///
/// # Arguments
/// * `q` - Orientation quaternion (w, x, y, z), not necessarily unit
/// * `omega` - Angular velocity in body frame [rad/s]
///
/// # Returns
/// Quaternion derivative as Vector4 (w, x, y, z)
pub fn quaternion_rate(q: &Vector4<f64>, omega: &Vector3<f64>) -> Vector4<f64> {
    0.5 * kinematics_matrix(q).transpose() * omega
}

/// Normalize a quaternion, falling back to identity for a zero vector
pub fn normalize_quaternion(q: &Vector4<f64>) -> Vector4<f64> {
    let norm = q.norm();
    if norm < 1e-12 {
        return identity_quaternion();
    }
    q / norm
}

/// Convert a nalgebra unit quaternion to the raw scalar-first layout
pub fn from_unit_quaternion(q: &UnitQuaternion<f64>) -> Vector4<f64> {
    Vector4::new(q.w, q.i, q.j, q.k)
}

/// Compute quaternion from axis-angle representation
///
/// # Arguments
/// * `axis` - Rotation axis (will be normalized)
/// * `angle` - Rotation angle [rad]
pub fn quaternion_from_axis_angle(axis: &Vector3<f64>, angle: f64) -> Vector4<f64> {
    from_unit_quaternion(&UnitQuaternion::from_axis_angle(
        &nalgebra::Unit::new_normalize(*axis),
        angle,
    ))
}
