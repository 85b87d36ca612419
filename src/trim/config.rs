use serde::{Deserialize, Serialize};

/// Box constraints for the six trim variables.
///
/// The physical evaluation point is always clamped into these ranges, and
/// excursions outside them are penalized in the cost, so the search never
/// feeds the closure equations or the force model an out-of-envelope
/// state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrimBounds {
    pub alpha_range: (f64, f64),
    pub beta_range: (f64, f64),
    pub elevator_range: (f64, f64),
    pub aileron_range: (f64, f64),
    pub rudder_range: (f64, f64),
    pub throttle_range: (f64, f64),
}

impl Default for TrimBounds {
    fn default() -> Self {
        Self {
            alpha_range: (-1.0, 1.0),
            beta_range: (-0.5, 0.5),
            elevator_range: (-1.0, 1.0),
            aileron_range: (-1.0, 1.0),
            rudder_range: (-1.0, 1.0),
            throttle_range: (0.0, 1.0),
        }
    }
}

impl TrimBounds {
    /// Ranges in trim-variable order (alpha, beta, elevator, aileron,
    /// rudder, throttle).
    pub fn ranges(&self) -> [(f64, f64); 6] {
        [
            self.alpha_range,
            self.beta_range,
            self.elevator_range,
            self.aileron_range,
            self.rudder_range,
            self.throttle_range,
        ]
    }

    /// Clamps a parameter vector into the box.
    pub fn clamp(&self, param: &[f64]) -> Vec<f64> {
        param
            .iter()
            .zip(self.ranges())
            .map(|(&value, (min, max))| value.clamp(min, max))
            .collect()
    }
}

/// Configuration for the trim solver.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrimSolverConfig {
    /// Iteration budget for the direct-search stage.
    pub max_iterations: u64,
    /// Iteration budget for the gradient-refinement stage.
    pub refine_iterations: u64,
    /// Target cost at which the search stops early.
    pub cost_tolerance: f64,
    /// Whether to refine the direct-search solution with L-BFGS.
    pub use_gradient_refinement: bool,
    /// Bounds for the trim variables.
    pub bounds: TrimBounds,
    /// 0 = silent, 1 = log new best iterates, 2 = log every iterate.
    pub debug_level: usize,
}

impl Default for TrimSolverConfig {
    fn default() -> Self {
        Self {
            max_iterations: 1000,
            refine_iterations: 500,
            cost_tolerance: 1e-12,
            use_gradient_refinement: true,
            bounds: TrimBounds::default(),
            debug_level: 0,
        }
    }
}
