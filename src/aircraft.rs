//! Aircraft force model interface.

use nalgebra::{Matrix3, Vector3};
use serde::{Deserialize, Serialize};

/// Air data seen by the force model for one evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AirData {
    /// True airspeed (m/s).
    pub true_airspeed: f64,
    /// Air density (kg/m^3).
    pub density: f64,
    /// Angle of attack (rad).
    pub alpha: f64,
    /// Sideslip angle (rad).
    pub beta: f64,
}

/// Control surface deflections and throttle setting.
///
/// Deflections are normalized to [-1, 1], throttle to [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Controls {
    pub elevator: f64,
    pub elevator_trim: f64,
    pub aileron: f64,
    pub rudder: f64,
    pub throttle: f64,
}

/// Euler attitude angles (rad).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Attitude {
    /// Pitch angle.
    pub theta: f64,
    /// Bank angle.
    pub phi: f64,
    /// Heading angle.
    pub psi: f64,
}

/// Capability interface for a vehicle's force/moment and mass model.
///
/// Any vehicle the trim solver can work on implements these two
/// operations. Forces and moments are expressed in body axes and must
/// include every contribution acting on the airframe (aerodynamic,
/// propulsive and gravitational), since the solver drives the resulting
/// accelerations to zero.
pub trait AircraftForceModel {
    /// Total body-axes forces (N) and moments (N·m) for the given flight
    /// state and control settings.
    fn forces_and_moments(
        &self,
        air: &AirData,
        controls: &Controls,
        attitude: &Attitude,
    ) -> (Vector3<f64>, Vector3<f64>);

    /// Vehicle mass (kg) and symmetric inertia tensor (kg·m^2), body axes.
    fn mass_and_inertia(&self) -> (f64, Matrix3<f64>);
}
