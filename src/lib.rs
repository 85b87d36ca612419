//! Steady-state flight trim for rigid-body aircraft.
//!
//! A trim solve finds the combination of airflow angles, angular rates,
//! attitude and control settings for which all body-axes accelerations are
//! zero at a demanded altitude, airspeed, flight-path angle and turn rate.
//! The solver couples two closed-form kinematic constraints with a
//! black-box force model inside a bounded nonlinear least-squares search,
//! and reports convergence quality as structured diagnostics instead of
//! aborting on a marginal solve.

mod aircraft;
mod atmosphere;
mod dynamics;
mod error;
mod frames;
mod trim;

pub use aircraft::{AirData, AircraftForceModel, Attitude, Controls};
pub use atmosphere::{Atmosphere, AtmosphereState, Isa};
pub use dynamics::{EulerFlatEarth, RigidBodyDynamics};
pub use error::TrimError;
pub use frames::wind_to_body;
pub use trim::{
    rate_of_climb, steady_turn_rates, turn_coordination, FlightCondition, TrimBounds,
    TrimDiagnostic, TrimResult, TrimSolver, TrimSolverConfig, TrimVariables,
};
