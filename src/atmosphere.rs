//! Atmosphere models.
//!
//! The trim solver only consumes air density, but the query returns the
//! full set of atmospheric state variables so force models that need
//! temperature or Mach number can share the same interface.

use serde::{Deserialize, Serialize};

const R_AIR: f64 = 287.052_87; // specific gas constant for dry air, J/(kg·K)
const GAMMA_AIR: f64 = 1.4; // ratio of specific heats
const G_STD: f64 = 9.806_65; // standard gravity, m/s^2

/// Atmospheric state variables at a given altitude.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AtmosphereState {
    /// Temperature (K).
    pub temperature: f64,
    /// Static pressure (Pa).
    pub pressure: f64,
    /// Air density (kg/m^3).
    pub density: f64,
    /// Speed of sound (m/s).
    pub speed_of_sound: f64,
}

/// Maps altitude to atmospheric state.
pub trait Atmosphere {
    /// Atmospheric state at the given geopotential altitude (m).
    fn query(&self, altitude: f64) -> AtmosphereState;
}

/// ISA standard atmosphere, sea level to 86 km.
///
/// Piecewise temperature profile; altitudes below sea level are clamped.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Isa;

struct IsaLayer {
    base_altitude: f64,
    base_temperature: f64,
    base_pressure: f64,
    lapse_rate: f64, // K/m, 0 for isothermal layers
}

const ISA_LAYERS: &[IsaLayer] = &[
    // Troposphere
    IsaLayer {
        base_altitude: 0.0,
        base_temperature: 288.15,
        base_pressure: 101_325.0,
        lapse_rate: -0.0065,
    },
    // Tropopause
    IsaLayer {
        base_altitude: 11_000.0,
        base_temperature: 216.65,
        base_pressure: 22_632.1,
        lapse_rate: 0.0,
    },
    // Stratosphere I
    IsaLayer {
        base_altitude: 20_000.0,
        base_temperature: 216.65,
        base_pressure: 5_474.89,
        lapse_rate: 0.001,
    },
    // Stratosphere II
    IsaLayer {
        base_altitude: 32_000.0,
        base_temperature: 228.65,
        base_pressure: 868.019,
        lapse_rate: 0.0028,
    },
    // Stratopause
    IsaLayer {
        base_altitude: 47_000.0,
        base_temperature: 270.65,
        base_pressure: 110.906,
        lapse_rate: 0.0,
    },
    // Mesosphere I
    IsaLayer {
        base_altitude: 51_000.0,
        base_temperature: 270.65,
        base_pressure: 66.9389,
        lapse_rate: -0.0028,
    },
    // Mesosphere II
    IsaLayer {
        base_altitude: 71_000.0,
        base_temperature: 214.65,
        base_pressure: 3.956_42,
        lapse_rate: -0.002,
    },
];

impl Atmosphere for Isa {
    fn query(&self, altitude: f64) -> AtmosphereState {
        let h = altitude.clamp(0.0, 86_000.0);

        let layer = ISA_LAYERS
            .iter()
            .rev()
            .find(|layer| h >= layer.base_altitude)
            .unwrap_or(&ISA_LAYERS[0]);

        let dh = h - layer.base_altitude;
        let temperature = layer.base_temperature + layer.lapse_rate * dh;

        let pressure = if layer.lapse_rate == 0.0 {
            layer.base_pressure * (-G_STD * dh / (R_AIR * layer.base_temperature)).exp()
        } else {
            layer.base_pressure
                * (temperature / layer.base_temperature).powf(-G_STD / (layer.lapse_rate * R_AIR))
        };

        AtmosphereState {
            temperature,
            pressure,
            density: pressure / (R_AIR * temperature),
            speed_of_sound: (GAMMA_AIR * R_AIR * temperature).sqrt(),
        }
    }
}
