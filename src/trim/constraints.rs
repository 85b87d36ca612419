//! Kinematic closure of the trim problem.
//!
//! Two constraint equations relate the optimizer unknowns to the full
//! body-axis state: the coordinated-turn constraint fixes the bank angle
//! and the rate-of-climb constraint fixes the pitch angle. Both are pure
//! closed-form functions (Stevens & Lewis, "Aircraft Control and
//! Simulation", section 3.4); the optimizer relies on repeated evaluations
//! being bitwise identical.

use nalgebra::Vector3;

use crate::error::TrimError;
use crate::frames::wind_to_body;
use crate::trim::FlightCondition;

const G0: f64 = 9.81;

/// Turn rates below this are treated as straight flight.
pub(crate) const TURN_RATE_EPS: f64 = 1e-8;

const GAMMA_EPS: f64 = 1e-8;

/// Bank angle for a coordinated turn.
///
/// An out-of-domain input (negative square-root argument or vanishing
/// denominator) is a hard error; silently coercing it would feed NaN into
/// the optimizer and corrupt the search trajectory.
pub fn turn_coordination(
    turn_rate: f64,
    alpha: f64,
    beta: f64,
    tas: f64,
    gamma: f64,
) -> Result<f64, TrimError> {
    let g = turn_rate * tas / G0;

    if gamma.abs() < GAMMA_EPS {
        let den = alpha.cos() - g * alpha.sin() * beta.sin();
        if den == 0.0 {
            return Err(TrimError::TurnCoordinationSingular {
                turn_rate,
                alpha,
                beta,
                tas,
                gamma,
            });
        }
        return Ok((g * beta.cos() / den).atan());
    }

    let a = 1.0 - g * alpha.tan() * beta.sin();
    let b = gamma.sin() / beta.cos();
    let c = 1.0 + g.powi(2) * beta.cos().powi(2);

    let argument = c * (1.0 - b.powi(2)) + g.powi(2) * beta.sin().powi(2);
    if argument < 0.0 {
        return Err(TrimError::TurnCoordinationSqrt {
            argument,
            turn_rate,
            alpha,
            beta,
            tas,
            gamma,
        });
    }
    let sq = argument.sqrt();

    let num = (a - b.powi(2)) + b * alpha.tan() * sq;
    let den = a.powi(2) - b.powi(2) * (1.0 + c * alpha.tan().powi(2));
    if den == 0.0 {
        return Err(TrimError::TurnCoordinationSingular {
            turn_rate,
            alpha,
            beta,
            tas,
            gamma,
        });
    }

    Ok((g * beta.cos() / alpha.cos() * num / den).atan())
}

/// Pitch angle for the demanded rate of climb, wind angles and bank angle.
pub fn rate_of_climb(gamma: f64, alpha: f64, beta: f64, phi: f64) -> Result<f64, TrimError> {
    let a = alpha.cos() * beta.cos();
    let b = phi.sin() * beta.sin() + phi.cos() * alpha.sin() * beta.cos();

    let argument = a.powi(2) - gamma.sin().powi(2) + b.powi(2);
    if argument < 0.0 {
        return Err(TrimError::RateOfClimbSqrt {
            argument,
            gamma,
            alpha,
            beta,
            phi,
        });
    }
    let sq = argument.sqrt();

    let den = a.powi(2) - gamma.sin().powi(2);
    if den == 0.0 {
        return Err(TrimError::RateOfClimbSingular {
            gamma,
            alpha,
            beta,
            phi,
        });
    }

    Ok(((a * b + gamma.sin() * sq) / den).atan())
}

/// Body-axes angular rates of a steady turn about the local vertical.
///
/// The turn-rate vector `psi_dot * k_h` is decomposed into body axes
/// through the attitude angles.
pub fn steady_turn_rates(turn_rate: f64, theta: f64, phi: f64) -> Vector3<f64> {
    Vector3::new(
        -turn_rate * theta.sin(),
        turn_rate * phi.sin() * theta.cos(),
        turn_rate * theta.cos() * phi.sin(),
    )
}

/// Full body-axis state implied by a pair of wind angles under a flight
/// condition.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ClosedState {
    pub phi: f64,
    pub theta: f64,
    pub linear_velocity: Vector3<f64>,
    pub angular_velocity: Vector3<f64>,
}

/// Applies both closure constraints and the turn-rate decomposition.
///
/// Shared by the residual evaluation and the final result assembly so the
/// returned attitude is exactly the attitude the optimizer converged on.
pub(crate) fn close_state(
    condition: &FlightCondition,
    alpha: f64,
    beta: f64,
) -> Result<ClosedState, TrimError> {
    let phi = if condition.turn_rate.abs() < TURN_RATE_EPS {
        0.0
    } else {
        turn_coordination(condition.turn_rate, alpha, beta, condition.tas, condition.gamma)?
    };

    let theta = rate_of_climb(condition.gamma, alpha, beta, phi)?;

    Ok(ClosedState {
        phi,
        theta,
        linear_velocity: wind_to_body(Vector3::new(condition.tas, 0.0, 0.0), alpha, beta),
        angular_velocity: steady_turn_rates(condition.turn_rate, theta, phi),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn zero_turn_rate_gives_zero_bank_in_both_branches() {
        // Level branch
        assert_eq!(turn_coordination(0.0, 0.2, 0.1, 100.0, 0.0).unwrap(), 0.0);
        // General branch
        assert_eq!(turn_coordination(0.0, 0.2, 0.1, 100.0, 0.3).unwrap(), 0.0);
        assert_eq!(turn_coordination(0.0, -0.4, 0.0, 60.0, -0.2).unwrap(), 0.0);
    }

    #[test]
    fn level_branch_matches_general_branch_limit() {
        // The general formula evaluated just above the gamma threshold
        // must agree with the dedicated level-flight branch.
        let level = turn_coordination(0.05, 0.03, 0.01, 120.0, 0.0).unwrap();
        let near_level = turn_coordination(0.05, 0.03, 0.01, 120.0, 1e-7).unwrap();
        assert_relative_eq!(level, near_level, epsilon = 1e-5);
    }

    #[test]
    fn level_coordinated_turn_with_zero_wind_angles() {
        // alpha = beta = 0 reduces the constraint to phi = atan(G).
        let turn_rate: f64 = 0.05;
        let tas: f64 = 120.0;
        let expected = (turn_rate * tas / 9.81).atan();

        let phi = turn_coordination(turn_rate, 0.0, 0.0, tas, 0.0).unwrap();
        assert_relative_eq!(phi, expected, epsilon = 1e-12);
    }

    #[test]
    fn constraints_are_referentially_transparent() {
        let phi_a = turn_coordination(0.04, 0.02, -0.01, 95.0, 0.08).unwrap();
        let phi_b = turn_coordination(0.04, 0.02, -0.01, 95.0, 0.08).unwrap();
        assert_eq!(phi_a.to_bits(), phi_b.to_bits());

        let theta_a = rate_of_climb(0.08, 0.02, -0.01, phi_a).unwrap();
        let theta_b = rate_of_climb(0.08, 0.02, -0.01, phi_b).unwrap();
        assert_eq!(theta_a.to_bits(), theta_b.to_bits());
    }

    #[test]
    fn wings_level_pitch_is_alpha_plus_gamma() {
        // With phi = 0 and beta = 0 the formula collapses to
        // theta = alpha + gamma by sum-to-product identities.
        for (alpha, gamma) in [(0.05, 0.02), (0.0, 0.1), (-0.03, 0.05), (0.08, -0.04)] {
            let theta = rate_of_climb(gamma, alpha, 0.0, 0.0).unwrap();
            assert_relative_eq!(theta, alpha + gamma, epsilon = 1e-12);
        }
    }

    #[test]
    fn vertical_flight_path_is_out_of_domain() {
        let err = rate_of_climb(FRAC_PI_2, 0.0, 0.0, 0.0).unwrap_err();
        assert!(matches!(err, TrimError::RateOfClimbSingular { .. }));
    }

    #[test]
    fn steep_climb_with_bank_fails_the_sqrt_domain() {
        let err = rate_of_climb(1.4, 0.3, 0.0, FRAC_PI_2).unwrap_err();
        assert!(matches!(err, TrimError::RateOfClimbSqrt { .. }));
    }

    #[test]
    fn steep_climb_with_large_sideslip_fails_turn_coordination() {
        let err = turn_coordination(0.01, 0.0, 0.45, 50.0, 1.3).unwrap_err();
        assert!(matches!(err, TrimError::TurnCoordinationSqrt { .. }));
    }

    #[test]
    fn turn_rates_decompose_through_attitude() {
        let turn_rate = 0.1;
        let theta: f64 = 0.05;
        let phi: f64 = 0.4;

        let omega = steady_turn_rates(turn_rate, theta, phi);

        assert_relative_eq!(omega.x, -turn_rate * theta.sin(), epsilon = 1e-15);
        assert_relative_eq!(omega.y, turn_rate * phi.sin() * theta.cos(), epsilon = 1e-15);
        assert_relative_eq!(omega.z, turn_rate * theta.cos() * phi.sin(), epsilon = 1e-15);

        // No turn, no rotation.
        assert_eq!(steady_turn_rates(0.0, 0.2, 0.3), Vector3::zeros());
    }

    #[test]
    fn closed_state_reconstructs_airspeed() {
        let condition = FlightCondition::new(1_000.0, 80.0).with_turn_rate(0.05);
        let closed = close_state(&condition, 0.04, 0.002).unwrap();

        assert_relative_eq!(closed.linear_velocity.norm(), 80.0, epsilon = 1e-9);
        assert!(closed.phi > 0.0);
        // Straight flight keeps the wings level and the rates zero.
        let straight = close_state(&FlightCondition::new(1_000.0, 80.0), 0.04, 0.002).unwrap();
        assert_eq!(straight.phi, 0.0);
        assert_eq!(straight.angular_velocity, Vector3::zeros());
    }
}
