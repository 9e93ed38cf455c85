//! Momentum-theory helpers shared by the flight-condition and blade-element
//! models.

use std::f64::consts::PI;

use crate::error::{AnalysisError, AnalysisResult, DomainViolation};

/// cos(α) magnitudes below this are treated as α = 90°.
const COS_FLOOR: f64 = 1e-9;

/// Rotor disk area A = π/4 · D² [m²]
pub fn disk_area(diameter_m: f64) -> f64 {
    PI * 0.25 * diameter_m * diameter_m
}

/// Rotor thrust needed to carry `weight_n` with the disk tilted `angle_deg`:
/// T = W / cos(α).
///
/// `index` is reported back in the domain error when cos(α) ≈ 0.
pub fn thrust_at_angle(index: usize, weight_n: f64, angle_deg: f64) -> AnalysisResult<f64> {
    let c = angle_deg.to_radians().cos();
    if !c.is_finite() || c.abs() < COS_FLOOR {
        return Err(AnalysisError::domain(index, DomainViolation::ThrustAngle { angle_deg }));
    }
    Ok(weight_n / c)
}

/// Forward speed for an advance ratio: Voo = v · sqrt(T / (2ρA)).
pub fn advance_speed(advance_ratio: f64, thrust_n: f64, density: f64, area_m2: f64) -> f64 {
    advance_ratio * (thrust_n / (2.0 * density * area_m2)).sqrt()
}
