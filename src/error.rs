use thiserror::Error;

/// Fatal failures of a trim solve.
///
/// Non-fatal conditions (poor convergence, throttle saturation) are not
/// errors; they are reported as [`TrimDiagnostic`](crate::TrimDiagnostic)
/// entries on the returned result.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TrimError {
    #[error("invalid flight condition: true airspeed must be positive, got {tas} m/s")]
    InvalidAirspeed { tas: f64 },

    #[error(
        "turn coordination constraint is undefined: square root argument {argument:e} is \
         negative (turn_rate={turn_rate}, alpha={alpha}, beta={beta}, TAS={tas}, gamma={gamma})"
    )]
    TurnCoordinationSqrt {
        argument: f64,
        turn_rate: f64,
        alpha: f64,
        beta: f64,
        tas: f64,
        gamma: f64,
    },

    #[error(
        "turn coordination constraint is undefined: denominator vanished \
         (turn_rate={turn_rate}, alpha={alpha}, beta={beta}, TAS={tas}, gamma={gamma})"
    )]
    TurnCoordinationSingular {
        turn_rate: f64,
        alpha: f64,
        beta: f64,
        tas: f64,
        gamma: f64,
    },

    #[error(
        "rate of climb constraint is undefined: square root argument {argument:e} is \
         negative (gamma={gamma}, alpha={alpha}, beta={beta}, phi={phi})"
    )]
    RateOfClimbSqrt {
        argument: f64,
        gamma: f64,
        alpha: f64,
        beta: f64,
        phi: f64,
    },

    #[error(
        "rate of climb constraint is undefined: cos^2(alpha)cos^2(beta) equals sin^2(gamma) \
         (gamma={gamma}, alpha={alpha}, beta={beta}, phi={phi})"
    )]
    RateOfClimbSingular {
        gamma: f64,
        alpha: f64,
        beta: f64,
        phi: f64,
    },

    #[error("inertia tensor is singular and cannot be inverted")]
    SingularInertia,

    #[error("optimizer failed: {0}")]
    Solver(String),
}
