//! Rigid-body equations of motion.

use nalgebra::{Matrix3, Vector3, Vector6};

use crate::error::TrimError;

/// Evaluates the 6-DOF rigid-body equations of motion.
///
/// The trim solver never assumes a particular formulation; the
/// implementation is always supplied explicitly by the caller.
pub trait RigidBodyDynamics {
    /// State derivative (3 linear + 3 angular accelerations, body axes).
    ///
    /// `state` is the body-axes velocity state `[u, v, w, p, q, r]`;
    /// `forces` and `moments` are body-axes totals acting on the vehicle.
    fn state_derivative(
        &self,
        t: f64,
        state: &Vector6<f64>,
        mass: f64,
        inertia: &Matrix3<f64>,
        forces: &Vector3<f64>,
        moments: &Vector3<f64>,
    ) -> Result<Vector6<f64>, TrimError>;
}

/// Flat-earth Euler equations in body axes.
///
/// Linear: `dv/dt = F/m - omega × v`. Angular: `domega/dt =
/// I^-1 (M - omega × (I omega))`. Gravity is not added here; the force
/// model is responsible for projecting weight into body axes.
#[derive(Debug, Clone, Copy, Default)]
pub struct EulerFlatEarth;

impl RigidBodyDynamics for EulerFlatEarth {
    fn state_derivative(
        &self,
        _t: f64,
        state: &Vector6<f64>,
        mass: f64,
        inertia: &Matrix3<f64>,
        forces: &Vector3<f64>,
        moments: &Vector3<f64>,
    ) -> Result<Vector6<f64>, TrimError> {
        let velocity = Vector3::new(state[0], state[1], state[2]);
        let omega = Vector3::new(state[3], state[4], state[5]);

        let inertia_inv = inertia.try_inverse().ok_or(TrimError::SingularInertia)?;

        let linear_accel = forces / mass - omega.cross(&velocity);
        let angular_accel = inertia_inv * (moments - omega.cross(&(inertia * omega)));

        Ok(Vector6::new(
            linear_accel.x,
            linear_accel.y,
            linear_accel.z,
            angular_accel.x,
            angular_accel.y,
            angular_accel.z,
        ))
    }
}
