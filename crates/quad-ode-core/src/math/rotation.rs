//! Rotation utilities and Euler angle conversions
//!
//! Euler angles use the ZYX (yaw-pitch-roll) convention and are only used to
//! build cost features and references; the dynamics stay in quaternion form.

use nalgebra::{Matrix3, Vector3, Vector4};
use serde::{Deserialize, Serialize};

/// Skew-symmetric matrix from vector (hat operator)
///
/// For v = [x, y, z]^T:
/// ```text
/// [v]× = [ 0  -z   y]
///        [ z   0  -x]
///        [-y   x   0]
/// ```
///
/// so that `skew(v) * w == v × w`.
pub fn skew(v: &Vector3<f64>) -> Matrix3<f64> {
    Matrix3::new(
        0.0, -v.z, v.y,
        v.z, 0.0, -v.x,
        -v.y, v.x, 0.0,
    )
}

/// Roll, pitch and yaw [rad]
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct EulerAngles {
    /// Rotation about body x
    pub roll: f64,
    /// Rotation about body y
    pub pitch: f64,
    /// Rotation about body z
    pub yaw: f64,
}

impl EulerAngles {
    pub fn new(roll: f64, pitch: f64, yaw: f64) -> Self {
        Self { roll, pitch, yaw }
    }

    /// Pack as `[roll, pitch, yaw]`
    pub fn to_vector(&self) -> Vector3<f64> {
        Vector3::new(self.roll, self.pitch, self.yaw)
    }
}

/// Sine of the pitch angle, `2(q0q2 − q3q1)`, before clamping
pub fn pitch_sine(q: &Vector4<f64>) -> f64 {
    2.0 * (q[0] * q[2] - q[3] * q[1])
}

/// Extract ZYX Euler angles from a scalar-first quaternion
///
/// ```text
/// roll  = atan2(2(q0q1 + q2q3), 1 − 2(q1² + q2²))
/// pitch = asin(clamp(2(q0q2 − q3q1), −1, 1))
/// yaw   = atan2(2(q0q3 + q1q2), 1 − 2(q2² + q3²))
/// ```
///
/// The pitch argument is clamped so quaternion drift off the unit sphere
/// saturates at ±π/2 instead of producing NaN.
pub fn euler_from_quaternion(q: &Vector4<f64>) -> EulerAngles {
    let (q0, q1, q2, q3) = (q[0], q[1], q[2], q[3]);

    let roll = (2.0 * (q0 * q1 + q2 * q3)).atan2(1.0 - 2.0 * (q1 * q1 + q2 * q2));
    let pitch = pitch_sine(q).clamp(-1.0, 1.0).asin();
    let yaw = (2.0 * (q0 * q3 + q1 * q2)).atan2(1.0 - 2.0 * (q2 * q2 + q3 * q3));

    EulerAngles { roll, pitch, yaw }
}

/// Build a scalar-first quaternion from ZYX Euler angles
pub fn quaternion_from_euler(angles: &EulerAngles) -> Vector4<f64> {
    let (sr, cr) = (angles.roll / 2.0).sin_cos();
    let (sp, cp) = (angles.pitch / 2.0).sin_cos();
    let (sy, cy) = (angles.yaw / 2.0).sin_cos();

    Vector4::new(
        cr * cp * cy + sr * sp * sy,
        sr * cp * cy - cr * sp * sy,
        cr * sp * cy + sr * cp * sy,
        cr * cp * sy - sr * sp * cy,
    )
}

/// Whether the attitude is within `tolerance` of the ±90° pitch singularity
pub fn is_near_gimbal_lock(q: &Vector4<f64>, tolerance: f64) -> bool {
    1.0 - pitch_sine(q).abs() < tolerance
}
