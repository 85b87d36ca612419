use argmin::core::observers::ObserverMode;
use argmin::core::{Error, Executor};
use argmin::solver::linesearch::MoreThuenteLineSearch;
use argmin::solver::neldermead::NelderMead;
use argmin::solver::quasinewton::LBFGS;
use argmin_observer_slog::SlogLogger;

use crate::aircraft::AircraftForceModel;
use crate::atmosphere::Atmosphere;
use crate::dynamics::RigidBodyDynamics;
use crate::error::TrimError;
use crate::trim::constraints::close_state;
use crate::trim::residual::TrimProblem;
use crate::trim::{FlightCondition, TrimDiagnostic, TrimResult, TrimSolverConfig, TrimVariables};

/// Final cost above which the solve is flagged as not converged.
const COST_THRESHOLD: f64 = 1e-7;

/// Residual component magnitude above which the solve is flagged as not
/// converged.
const RESIDUAL_THRESHOLD: f64 = 1e-3;

/// Throttle setting above which the demanded condition is flagged as
/// exceeding the available power.
const THROTTLE_SATURATION: f64 = 0.99;

/// Search rounds (direct search + refinement each) before the solver
/// settles for the best point found. Keeps the total evaluation count
/// bounded by a small multiple of the configured budgets.
const MAX_SEARCH_ROUNDS: usize = 3;

/// Steady-state flight trim solver.
///
/// Finds the state and control combination for which all body-axes
/// accelerations vanish at a demanded altitude, airspeed, flight-path
/// angle and turn rate. The dynamics implementation is a mandatory,
/// explicit dependency; there is no implicit default.
///
/// The search runs a Nelder-Mead direct stage over the six trim variables
/// followed by an optional L-BFGS refinement with finite-difference
/// gradients, both bounded by the configured iteration budgets.
pub struct TrimSolver<A, D, M> {
    aircraft: A,
    dynamics: D,
    atmosphere: M,
    config: TrimSolverConfig,
}

impl<A, D, M> TrimSolver<A, D, M>
where
    A: AircraftForceModel,
    D: RigidBodyDynamics,
    M: Atmosphere,
{
    pub fn new(aircraft: A, dynamics: D, atmosphere: M) -> Self {
        Self {
            aircraft,
            dynamics,
            atmosphere,
            config: TrimSolverConfig::default(),
        }
    }

    pub fn with_config(mut self, config: TrimSolverConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &TrimSolverConfig {
        &self.config
    }

    /// Evaluates the acceleration residual for a trial set of trim
    /// variables under the given flight condition.
    ///
    /// This is the objective the solver drives to zero; it is exposed so a
    /// returned result can be re-checked independently.
    pub fn evaluate_residual(
        &self,
        condition: &FlightCondition,
        vars: &TrimVariables,
    ) -> Result<nalgebra::Vector6<f64>, TrimError> {
        condition.validate()?;
        self.problem(condition).residual(vars)
    }

    /// Solves for the trimmed state at the given flight condition.
    ///
    /// Poor convergence and throttle saturation do not fail the solve;
    /// they are reported as diagnostics on the returned result. Domain
    /// errors in the closure equations and invalid flight conditions are
    /// hard failures.
    pub fn solve(&self, condition: &FlightCondition) -> Result<TrimResult, TrimError> {
        condition.validate()?;

        let problem = self.problem(condition);

        let mut best_param = TrimVariables::initial_guess(condition).to_vector();
        let mut best_cost = f64::INFINITY;
        let mut iterations = 0;
        let mut previous_round_cost = f64::INFINITY;

        for _ in 0..MAX_SEARCH_ROUNDS {
            let (param, cost, iters) = self
                .direct_search(&problem, &best_param)
                .map_err(from_argmin)?;
            iterations += iters;
            if cost < best_cost {
                best_param = param;
                best_cost = cost;
            }

            if self.config.use_gradient_refinement && best_cost > self.config.cost_tolerance {
                match self.refine(&problem, &best_param).map_err(from_argmin) {
                    Ok((param, cost, iters)) => {
                        iterations += iters;
                        if cost < best_cost {
                            best_param = param;
                            best_cost = cost;
                        }
                    }
                    // A stalled line search near the optimum is not fatal;
                    // the direct-search point stands. Anything else is.
                    Err(TrimError::Solver(_)) => {}
                    Err(err) => return Err(err),
                }
            }

            // Done, or no longer making progress.
            if best_cost <= self.config.cost_tolerance.max(COST_THRESHOLD * 1e-2) {
                break;
            }
            if best_cost >= 0.99 * previous_round_cost {
                break;
            }
            previous_round_cost = best_cost;
        }

        // The reported state is the best point clamped into the box and
        // re-evaluated once, so the returned cost and residual reconstruct
        // exactly from the returned variables.
        let vars = TrimVariables::from_vector(&self.config.bounds.clamp(&best_param));
        let residual = problem.residual(&vars)?;
        let cost = 0.5 * residual.norm_squared();

        let mut diagnostics = Vec::new();
        let max_residual = residual.amax();
        if cost > COST_THRESHOLD || max_residual > RESIDUAL_THRESHOLD {
            diagnostics.push(TrimDiagnostic::NotConverged { cost, max_residual });
        }
        if vars.throttle > THROTTLE_SATURATION {
            diagnostics.push(TrimDiagnostic::InsufficientPower {
                throttle: vars.throttle,
            });
        }

        let closed = close_state(condition, vars.alpha, vars.beta)?;

        Ok(TrimResult {
            linear_velocity: closed.linear_velocity,
            angular_velocity: closed.angular_velocity,
            theta: closed.theta,
            phi: closed.phi,
            alpha: vars.alpha,
            beta: vars.beta,
            controls: vars.controls(),
            cost,
            residual,
            iterations,
            diagnostics,
        })
    }

    fn problem<'a>(&'a self, condition: &FlightCondition) -> TrimProblem<'a, A, D, M> {
        TrimProblem {
            condition: *condition,
            bounds: self.config.bounds,
            aircraft: &self.aircraft,
            dynamics: &self.dynamics,
            atmosphere: &self.atmosphere,
        }
    }

    fn direct_search(
        &self,
        problem: &TrimProblem<'_, A, D, M>,
        init: &[f64],
    ) -> Result<(Vec<f64>, f64, u64), Error> {
        let mut simplex = Vec::with_capacity(init.len() + 1);
        simplex.push(init.to_vec());
        for i in 0..init.len() {
            let mut vertex = init.to_vec();
            let perturbation = if vertex[i].abs() > 1e-10 {
                0.1 * vertex[i].abs()
            } else {
                0.005
            };
            if i < init.len() / 2 {
                vertex[i] += perturbation;
            } else {
                vertex[i] -= perturbation;
            }
            simplex.push(vertex);
        }

        let solver = NelderMead::new(simplex).with_sd_tolerance(1e-12)?;

        let executor = Executor::new(problem.clone(), solver).configure(|state| {
            state
                .max_iters(self.config.max_iterations)
                .target_cost(self.config.cost_tolerance)
        });
        let executor = match self.config.debug_level {
            0 => executor,
            1 => executor.add_observer(SlogLogger::term(), ObserverMode::NewBest),
            _ => executor.add_observer(SlogLogger::term(), ObserverMode::Always),
        };

        let result = executor.run()?;
        let state = result.state;
        let param = state.best_param.clone().unwrap_or_else(|| init.to_vec());
        Ok((param, state.best_cost, state.iter))
    }

    fn refine(
        &self,
        problem: &TrimProblem<'_, A, D, M>,
        init: &[f64],
    ) -> Result<(Vec<f64>, f64, u64), Error> {
        let linesearch = MoreThuenteLineSearch::new().with_c(1e-4, 0.5)?;
        let solver = LBFGS::new(linesearch, 7);

        let executor = Executor::new(problem.clone(), solver).configure(|state| {
            state
                .param(init.to_vec())
                .max_iters(self.config.refine_iterations)
                .target_cost(self.config.cost_tolerance)
        });
        let executor = match self.config.debug_level {
            0 => executor,
            1 => executor.add_observer(SlogLogger::term(), ObserverMode::NewBest),
            _ => executor.add_observer(SlogLogger::term(), ObserverMode::Always),
        };

        let result = executor.run()?;
        let state = result.state;
        let param = state.best_param.clone().unwrap_or_else(|| init.to_vec());
        Ok((param, state.best_cost, state.iter))
    }
}

/// Maps an argmin error back onto the crate taxonomy. Closure domain
/// errors travel through the optimizer boxed; everything else becomes a
/// solver failure.
fn from_argmin(err: Error) -> TrimError {
    match err.downcast::<TrimError>() {
        Ok(trim) => trim,
        Err(other) => TrimError::Solver(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aircraft::{AirData, Attitude, Controls};
    use crate::atmosphere::Isa;
    use crate::dynamics::EulerFlatEarth;
    use crate::trim::TrimBounds;
    use nalgebra::{Matrix3, Vector3};

    /// Fails the test if the optimizer ever evaluates it.
    struct UnreachableModel;

    impl AircraftForceModel for UnreachableModel {
        fn forces_and_moments(
            &self,
            _air: &AirData,
            _controls: &Controls,
            _attitude: &Attitude,
        ) -> (Vector3<f64>, Vector3<f64>) {
            panic!("force model must not be evaluated for an invalid flight condition");
        }

        fn mass_and_inertia(&self) -> (f64, Matrix3<f64>) {
            panic!("force model must not be evaluated for an invalid flight condition");
        }
    }

    #[test]
    fn invalid_airspeed_is_rejected_before_any_evaluation() {
        let solver = TrimSolver::new(UnreachableModel, EulerFlatEarth, Isa);

        for tas in [0.0, -30.0] {
            let err = solver
                .solve(&FlightCondition::new(1_000.0, tas))
                .unwrap_err();
            assert_eq!(err, TrimError::InvalidAirspeed { tas });
        }
    }

    /// Constant-load model for plumbing tests.
    struct ConstantLoads;

    impl AircraftForceModel for ConstantLoads {
        fn forces_and_moments(
            &self,
            _air: &AirData,
            _controls: &Controls,
            _attitude: &Attitude,
        ) -> (Vector3<f64>, Vector3<f64>) {
            (Vector3::zeros(), Vector3::zeros())
        }

        fn mass_and_inertia(&self) -> (f64, Matrix3<f64>) {
            (1_000.0, Matrix3::from_diagonal(&Vector3::new(1e3, 2e3, 1.5e3)))
        }
    }

    #[test]
    fn closure_domain_error_aborts_the_solve() {
        // Near-vertical climb in a turn: with the sideslip bound forced
        // high, the first residual evaluation leaves the turn-coordination
        // sqrt domain.
        let config = TrimSolverConfig {
            bounds: TrimBounds {
                beta_range: (0.45, 0.5),
                ..TrimBounds::default()
            },
            ..TrimSolverConfig::default()
        };
        let solver = TrimSolver::new(ConstantLoads, EulerFlatEarth, Isa).with_config(config);

        let condition = FlightCondition::new(1_000.0, 50.0)
            .with_gamma(1.3)
            .with_turn_rate(0.01);

        let err = solver.solve(&condition).unwrap_err();
        assert!(matches!(err, TrimError::TurnCoordinationSqrt { .. }));
    }

    #[test]
    fn iteration_budget_is_respected() {
        let config = TrimSolverConfig {
            max_iterations: 5,
            refine_iterations: 5,
            ..TrimSolverConfig::default()
        };
        let solver = TrimSolver::new(ConstantLoads, EulerFlatEarth, Isa).with_config(config);

        // Zero loads can never trim (gravity-free model in level flight
        // has a nonzero kinematic residual in a turn), but the solve must
        // still terminate quickly and return a best-effort result.
        let condition = FlightCondition::new(1_000.0, 50.0).with_turn_rate(0.2);
        let result = solver.solve(&condition).unwrap();

        // Three rounds of (direct search + refinement) at most.
        assert!(result.iterations <= 30);
        assert!(!result.converged());
    }
}
