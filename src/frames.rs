//! Wind/body axes rotations.
//!
//! Body axes: x-forward, y-right, z-down. Wind axes: x along the relative
//! wind. The two frames are related by the sideslip angle (rotation about
//! the z-axis) followed by the angle of attack (rotation about the y-axis).

use nalgebra::{Matrix3, Vector3};

/// Rotation matrix taking wind-axes components to body-axes components.
fn wind_to_body_matrix(alpha: f64, beta: f64) -> Matrix3<f64> {
    let (sa, ca) = alpha.sin_cos();
    let (sb, cb) = beta.sin_cos();

    Matrix3::new(
        ca * cb, -ca * sb, -sa, //
        sb, cb, 0.0, //
        sa * cb, -sa * sb, ca,
    )
}

/// Rotate a wind-axes vector into body axes.
///
/// For the airspeed vector `(TAS, 0, 0)` this yields the body-axes air
/// velocity `(u, v, w) = TAS * (cos(alpha)cos(beta), sin(beta),
/// sin(alpha)cos(beta))`.
pub fn wind_to_body(vector: Vector3<f64>, alpha: f64, beta: f64) -> Vector3<f64> {
    wind_to_body_matrix(alpha, beta) * vector
}
