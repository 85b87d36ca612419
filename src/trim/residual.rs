use argmin::core::{CostFunction, Error, Gradient};
use nalgebra::Vector6;

use crate::aircraft::{AirData, AircraftForceModel, Attitude};
use crate::atmosphere::Atmosphere;
use crate::dynamics::RigidBodyDynamics;
use crate::error::TrimError;
use crate::trim::constraints::close_state;
use crate::trim::{FlightCondition, TrimBounds, TrimVariables};

/// Weight of the out-of-bounds quadratic penalty in the cost.
const PENALTY_WEIGHT: f64 = 100.0;

/// Step for the central-difference cost gradient.
const GRADIENT_EPS: f64 = 1e-6;

/// The optimization problem behind a trim solve: maps trial trim variables
/// to the body-axes acceleration residual of the equations of motion.
pub(crate) struct TrimProblem<'a, A, D, M> {
    pub condition: FlightCondition,
    pub bounds: TrimBounds,
    pub aircraft: &'a A,
    pub dynamics: &'a D,
    pub atmosphere: &'a M,
}

impl<A, D, M> Clone for TrimProblem<'_, A, D, M> {
    fn clone(&self) -> Self {
        Self {
            condition: self.condition,
            bounds: self.bounds,
            aircraft: self.aircraft,
            dynamics: self.dynamics,
            atmosphere: self.atmosphere,
        }
    }
}

/// Quadratic penalty for a value outside its range.
fn constraint_penalty(value: f64, range: (f64, f64), weight: f64) -> f64 {
    let (min, max) = range;
    let below_min = if value < min { (min - value).powi(2) } else { 0.0 };
    let above_max = if value > max { (value - max).powi(2) } else { 0.0 };
    weight * (below_min + above_max)
}

impl<A, D, M> TrimProblem<'_, A, D, M>
where
    A: AircraftForceModel,
    D: RigidBodyDynamics,
    M: Atmosphere,
{
    /// Evaluates the 6-component acceleration residual at a trial point.
    ///
    /// The derivative returned by the dynamics is the residual, unmodified;
    /// a perfect trim drives every component to zero.
    pub fn residual(&self, vars: &TrimVariables) -> Result<Vector6<f64>, TrimError> {
        let closed = close_state(&self.condition, vars.alpha, vars.beta)?;

        // Heading does not change the gravity projection onto body axes in
        // a flat-earth model, so it is fixed at zero.
        let attitude = Attitude {
            theta: closed.theta,
            phi: closed.phi,
            psi: 0.0,
        };

        let air = AirData {
            true_airspeed: self.condition.tas,
            density: self.atmosphere.query(self.condition.altitude).density,
            alpha: vars.alpha,
            beta: vars.beta,
        };

        let (forces, moments) =
            self.aircraft
                .forces_and_moments(&air, &vars.controls(), &attitude);
        let (mass, inertia) = self.aircraft.mass_and_inertia();

        let state = Vector6::new(
            closed.linear_velocity.x,
            closed.linear_velocity.y,
            closed.linear_velocity.z,
            closed.angular_velocity.x,
            closed.angular_velocity.y,
            closed.angular_velocity.z,
        );

        self.dynamics
            .state_derivative(0.0, &state, mass, &inertia, &forces, &moments)
    }
}

impl<A, D, M> CostFunction for TrimProblem<'_, A, D, M>
where
    A: AircraftForceModel,
    D: RigidBodyDynamics,
    M: Atmosphere,
{
    type Param = Vec<f64>;
    type Output = f64;

    /// Squared-norm cost of the residual, evaluated at the trial point
    /// clamped into the box, plus quadratic penalties for the excursion.
    ///
    /// Clamping keeps the closure equations and the force model inside the
    /// flight envelope while the penalty steers the search back into the
    /// box.
    fn cost(&self, param: &Self::Param) -> Result<Self::Output, Error> {
        let clamped = self.bounds.clamp(param);
        let residual = self.residual(&TrimVariables::from_vector(&clamped))?;

        let mut cost = 0.5 * residual.norm_squared();
        for (&value, range) in param.iter().zip(self.bounds.ranges()) {
            cost += constraint_penalty(value, range, PENALTY_WEIGHT);
        }
        Ok(cost)
    }
}

impl<A, D, M> Gradient for TrimProblem<'_, A, D, M>
where
    A: AircraftForceModel,
    D: RigidBodyDynamics,
    M: Atmosphere,
{
    type Param = Vec<f64>;
    type Gradient = Vec<f64>;

    /// Central-difference gradient of the cost.
    fn gradient(&self, param: &Self::Param) -> Result<Self::Gradient, Error> {
        let mut grad = vec![0.0; param.len()];

        for i in 0..param.len() {
            let mut param_plus = param.clone();
            let mut param_minus = param.clone();
            param_plus[i] += GRADIENT_EPS;
            param_minus[i] -= GRADIENT_EPS;

            let f_plus = self.cost(&param_plus)?;
            let f_minus = self.cost(&param_minus)?;

            grad[i] = (f_plus - f_minus) / (2.0 * GRADIENT_EPS);
        }

        Ok(grad)
    }
}
