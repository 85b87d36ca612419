use nalgebra::{Vector3, Vector6};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::aircraft::Controls;
use crate::error::TrimError;

/// Target steady-state flight condition. Immutable for the duration of a
/// solve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FlightCondition {
    /// Geopotential altitude (m).
    pub altitude: f64,
    /// True airspeed (m/s). Must be positive.
    pub tas: f64,
    /// Flight path angle (rad).
    pub gamma: f64,
    /// Turn rate, d(psi)/dt (rad/s).
    pub turn_rate: f64,
}

impl FlightCondition {
    /// Straight and level flight at the given altitude and airspeed.
    pub fn new(altitude: f64, tas: f64) -> Self {
        Self {
            altitude,
            tas,
            gamma: 0.0,
            turn_rate: 0.0,
        }
    }

    /// Sets the flight path angle (rad).
    pub fn with_gamma(mut self, gamma: f64) -> Self {
        self.gamma = gamma;
        self
    }

    /// Sets the turn rate (rad/s).
    pub fn with_turn_rate(mut self, turn_rate: f64) -> Self {
        self.turn_rate = turn_rate;
        self
    }

    /// Rejects conditions the closure formulas cannot handle. The airspeed
    /// divides both constraint equations, so it must be strictly positive.
    pub fn validate(&self) -> Result<(), TrimError> {
        if !(self.tas > 0.0) {
            return Err(TrimError::InvalidAirspeed { tas: self.tas });
        }
        Ok(())
    }
}

/// The six free parameters of the trim search.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrimVariables {
    /// Angle of attack (rad).
    pub alpha: f64,
    /// Sideslip angle (rad).
    pub beta: f64,
    /// Elevator deflection, normalized.
    pub elevator: f64,
    /// Aileron deflection, normalized.
    pub aileron: f64,
    /// Rudder deflection, normalized.
    pub rudder: f64,
    /// Throttle setting in [0, 1].
    pub throttle: f64,
}

/// Sign with sign(0) = 0, unlike `f64::signum`.
fn sign(x: f64) -> f64 {
    if x > 0.0 {
        1.0
    } else if x < 0.0 {
        -1.0
    } else {
        0.0
    }
}

impl TrimVariables {
    /// Deterministic initial guess for the given flight condition.
    pub fn initial_guess(condition: &FlightCondition) -> Self {
        Self {
            alpha: 0.05 * sign(condition.gamma),
            beta: 0.001 * sign(condition.turn_rate),
            elevator: 0.05,
            aileron: 0.01 * sign(condition.turn_rate),
            rudder: 0.01 * sign(condition.turn_rate),
            throttle: 0.5,
        }
    }

    pub fn to_vector(self) -> Vec<f64> {
        vec![
            self.alpha,
            self.beta,
            self.elevator,
            self.aileron,
            self.rudder,
            self.throttle,
        ]
    }

    pub fn from_vector(vec: &[f64]) -> Self {
        Self {
            alpha: vec[0],
            beta: vec[1],
            elevator: vec[2],
            aileron: vec[3],
            rudder: vec[4],
            throttle: vec[5],
        }
    }

    /// Control settings implied by these variables. The elevator trim tab
    /// is not a trim unknown and stays at zero.
    pub fn controls(&self) -> Controls {
        Controls {
            elevator: self.elevator,
            elevator_trim: 0.0,
            aileron: self.aileron,
            rudder: self.rudder,
            throttle: self.throttle,
        }
    }
}

/// Non-fatal findings attached to a [`TrimResult`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum TrimDiagnostic {
    /// The search terminated above the acceptance thresholds. The result
    /// is still the best point found.
    NotConverged { cost: f64, max_residual: f64 },
    /// The resolved throttle is essentially saturated; the demanded
    /// condition likely exceeds the available power.
    InsufficientPower { throttle: f64 },
}

impl fmt::Display for TrimDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrimDiagnostic::NotConverged { cost, max_residual } => write!(
                f,
                "trim process did not converge (cost {:e}, max residual {:e})",
                cost, max_residual
            ),
            TrimDiagnostic::InsufficientPower { throttle } => write!(
                f,
                "probably not enough power for demanded conditions (throttle {:.3})",
                throttle
            ),
        }
    }
}

/// Trimmed steady-state flight condition.
///
/// `phi` and `theta` are always the closure-equation values for the final
/// `alpha`, `beta` and flight condition; they are never optimized
/// independently.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrimResult {
    /// Air linear velocity `[u, v, w]`, body axes (m/s).
    pub linear_velocity: Vector3<f64>,
    /// Angular velocity `[p, q, r]`, body axes (rad/s).
    pub angular_velocity: Vector3<f64>,
    /// Pitch angle (rad).
    pub theta: f64,
    /// Bank angle (rad).
    pub phi: f64,
    /// Angle of attack (rad).
    pub alpha: f64,
    /// Sideslip angle (rad).
    pub beta: f64,
    /// Trimmed control settings.
    pub controls: Controls,
    /// Final cost, `0.5 * |residual|^2`.
    pub cost: f64,
    /// Body-axes acceleration residual at the solution.
    pub residual: Vector6<f64>,
    /// Optimizer iterations spent across all stages.
    pub iterations: u64,
    /// Non-fatal findings; empty for a clean trim.
    pub diagnostics: Vec<TrimDiagnostic>,
}

impl TrimResult {
    /// True when no convergence diagnostic was attached.
    pub fn converged(&self) -> bool {
        !self
            .diagnostics
            .iter()
            .any(|d| matches!(d, TrimDiagnostic::NotConverged { .. }))
    }
}
