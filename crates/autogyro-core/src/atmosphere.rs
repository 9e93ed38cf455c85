//! Density-altitude atmosphere.
//!
//! Barometric power law in feet-equivalent altitude:
//!
//!   ρ(h) = 1.225 · (1 − h·(0.00357/518.4))^(1/0.235)
//!   σ    = ρ / 1.225
//!
//! `Atmosphere` is a plain value: changing altitude means building a new one,
//! so density and density ratio can never go stale.

use serde::{Deserialize, Serialize};

use crate::error::{AnalysisError, AnalysisResult};
use crate::units::RHO0;

/// Temperature lapse per foot over sea-level absolute temperature [1/ft].
const LAPSE_OVER_T0: f64 = 0.00357 / 518.4;
/// Density exponent.
const EXPONENT: f64 = 1.0 / 0.235;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Atmosphere {
    /// Density altitude [ft]
    pub altitude_ft: f64,
    /// Air density [kg/m³]
    pub density: f64,
    /// ρ / ρ0 [1]
    pub density_ratio: f64,
}

impl Atmosphere {
    /// Standard sea level (h = 0).
    pub fn sea_level() -> Self {
        Self { altitude_ft: 0.0, density: RHO0, density_ratio: 1.0 }
    }

    /// Atmosphere at density altitude `altitude_ft`.
    pub fn at_altitude(altitude_ft: f64) -> AnalysisResult<Self> {
        let base = 1.0 - altitude_ft * LAPSE_OVER_T0;
        if !altitude_ft.is_finite() || base <= 0.0 {
            return Err(AnalysisError::config(format!(
                "altitude {altitude_ft} ft is outside the atmosphere model (must be finite and below {:.0} ft)",
                1.0 / LAPSE_OVER_T0
            )));
        }
        let density = RHO0 * base.powf(EXPONENT);
        Ok(Self { altitude_ft, density, density_ratio: density / RHO0 })
    }

    /// Atmosphere with a given density ratio σ; the altitude is recovered by
    /// inverting the power law.
    pub fn from_density_ratio(sigma: f64) -> AnalysisResult<Self> {
        if !sigma.is_finite() || sigma <= 0.0 {
            return Err(AnalysisError::config(format!("density ratio must be positive and finite, got {sigma}")));
        }
        let altitude_ft = (1.0 - sigma.powf(1.0 / EXPONENT)) / LAPSE_OVER_T0;
        Ok(Self { altitude_ft, density: RHO0 * sigma, density_ratio: sigma })
    }
}

impl Default for Atmosphere {
    fn default() -> Self { Self::sea_level() }
}
