//! autogyro-flight
//!
//! Steady horizontal-flight performance of an autogyro at one density altitude.
//! - Each operating point is an (advance ratio, disk angle) pair.
//! - Produces per-point rows: thrust, advance speed, parasite drag, propulsive
//!   force, required / available / climb power and climb velocity.
//! - Service ceiling by walking altitude until climb power at a reference
//!   operating point is used up.
//!
//! Maths (per operating point, v = Voo/Vh, α = disk angle):
//!   T      = W / cos α
//!   Voo    = v · sqrt(T / (2ρA))
//!   Dp     = ½ ρ Voo² f
//!   Tp     = T sin α + Dp
//!   P_req  = Tp · Voo / 745.7          [hp]
//!   P_av   = σ · Pd · n                [hp]
//!   P_c    = P_av − P_req
//!   Vc     = 745.7 · P_c / T
//!
//! Altitudes are density altitudes in feet; everything else is SI.

use autogyro_core::error::{finite, require_positive, AnalysisResult};
use autogyro_core::units::{hp_to_watts, watts_to_hp};
use autogyro_core::{
    advance_speed, disk_area, search, thrust_at_angle, AnalysisError, Atmosphere, Convergence, Equilibrium,
    SearchMode, SearchOptions,
};
use log::debug;
use serde::{Deserialize, Serialize};

/// Highest density ratio accepted by the σ sweep.
const MAX_DENSITY_RATIO: f64 = 1.5;

/// Vehicle parameters for the flight-condition model.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct VehicleSpec {
    /// Gross weight [N]
    pub weight_n: f64,
    /// Rated shaft power [hp]
    pub rated_power_hp: f64,
    /// Rotor diameter [m]
    pub rotor_diameter_m: f64,
    /// Fraction of rated power available to the propeller, in (0, 1]
    pub power_availability: f64,
    /// Equivalent flat-plate drag area [m²]
    pub flat_plate_area_m2: f64,
}

impl VehicleSpec {
    /// Rotor disk area [m²]
    pub fn disk_area(&self) -> f64 {
        disk_area(self.rotor_diameter_m)
    }

    /// Available power [hp] at density ratio `sigma`.
    pub fn available_power_hp(&self, sigma: f64) -> f64 {
        sigma * self.rated_power_hp * self.power_availability
    }

    pub fn validate(&self) -> AnalysisResult<()> {
        require_positive("weight", self.weight_n)?;
        require_positive("rated power", self.rated_power_hp)?;
        require_positive("rotor diameter", self.rotor_diameter_m)?;
        require_positive("flat-plate area", self.flat_plate_area_m2)?;
        let n = require_positive("power availability", self.power_availability)?;
        if n > 1.0 {
            return Err(AnalysisError::config(format!("power availability must be at most 1, got {n}")));
        }
        Ok(())
    }
}

/// One operating point: advance ratio Voo/Vh and its disk angle.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct OperatingPoint {
    pub advance_ratio: f64,
    /// Disk angle α [deg], 0..90
    pub angle_deg: f64,
}

impl OperatingPoint {
    pub const fn new(advance_ratio: f64, angle_deg: f64) -> Self {
        Self { advance_ratio, angle_deg }
    }

    /// The 12-point sweep used for the reference autogyro. Index 3 is
    /// (1.8, 30°), the service-ceiling reference.
    pub fn reference_sweep() -> Vec<Self> {
        [
            (1.8, 80.0), (1.8, 60.0), (1.8, 40.0), (1.8, 30.0),
            (3.0, 10.0), (4.0, 7.0), (4.25, 6.0), (4.52, 5.0),
            (6.0, 4.0), (6.4, 3.0), (8.0, 3.5), (9.0, 2.0),
        ]
        .into_iter()
        .map(|(v, a)| Self::new(v, a))
        .collect()
    }
}

/// Model output for one operating point.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Row {
    pub point: OperatingPoint,
    pub thrust_n: f64,
    pub advance_speed_mps: f64,
    pub parasite_drag_n: f64,
    pub propulsive_force_n: f64,
    pub required_power_hp: f64,
    pub available_power_hp: f64,
    pub climb_power_hp: f64,
    pub climb_velocity_mps: f64,
}

/// Rows for an ordered list of operating points, in input order.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct OperatingPointSeries {
    /// Air used for T, Voo and Dp; its density ratio scales available power.
    pub atmosphere: Atmosphere,
    pub rows: Vec<Row>,
}

/// Result of [`evaluate_flight_condition_by_density_ratio`].
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DensityRatioSweep {
    /// Series at the requested altitude.
    pub baseline: OperatingPointSeries,
    /// One series per requested σ, in input order.
    pub by_ratio: Vec<OperatingPointSeries>,
}

/// Top-level API: evaluate every operating point at density altitude `altitude_ft`.
pub fn evaluate_flight_condition(
    vehicle: &VehicleSpec,
    altitude_ft: f64,
    points: &[OperatingPoint],
) -> AnalysisResult<OperatingPointSeries> {
    let atmosphere = Atmosphere::at_altitude(altitude_ft)?;
    evaluate_in(vehicle, atmosphere, points)
}

/// Evaluate the operating points once at `altitude_ft` and once per density
/// ratio σ, where ρ = σ·1.225 and available power is σ·Pd·n.
pub fn evaluate_flight_condition_by_density_ratio(
    vehicle: &VehicleSpec,
    altitude_ft: f64,
    points: &[OperatingPoint],
    density_ratios: &[f64],
) -> AnalysisResult<DensityRatioSweep> {
    if density_ratios.is_empty() {
        return Err(AnalysisError::config("density-ratio sweep needs at least one ratio"));
    }
    let baseline = evaluate_flight_condition(vehicle, altitude_ft, points)?;

    let mut by_ratio = Vec::with_capacity(density_ratios.len());
    for &sigma in density_ratios {
        if !(sigma > 0.0 && sigma <= MAX_DENSITY_RATIO) {
            return Err(AnalysisError::config(format!(
                "density ratio must be in (0, {MAX_DENSITY_RATIO}], got {sigma}"
            )));
        }
        by_ratio.push(evaluate_in(vehicle, Atmosphere::from_density_ratio(sigma)?, points)?);
    }
    Ok(DensityRatioSweep { baseline, by_ratio })
}

/// Options for [`find_service_ceiling`].
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CeilingSearch {
    /// Operating point whose climb power is driven to zero.
    pub reference_index: usize,
    /// Altitude increment per trial [ft]
    pub step: f64,
    /// Converged once climb power ≤ tolerance [hp]
    pub tolerance: f64,
    pub max_iterations: usize,
    pub mode: SearchMode,
}

impl Default for CeilingSearch {
    fn default() -> Self {
        Self { reference_index: 3, step: 0.1, tolerance: 0.01, max_iterations: 2_000_000, mode: SearchMode::Linear }
    }
}

impl CeilingSearch {
    fn options(&self) -> SearchOptions {
        SearchOptions {
            step: self.step,
            tolerance: self.tolerance,
            max_iterations: self.max_iterations,
            criterion: Convergence::AtOrBelow,
            mode: self.mode,
        }
    }
}

/// Walk density altitude from `initial_altitude_ft` until available power minus
/// required power at `opts.reference_index` drops to the tolerance.
///
/// The returned state is the full series at the last altitude tried.
pub fn find_service_ceiling(
    vehicle: &VehicleSpec,
    points: &[OperatingPoint],
    initial_altitude_ft: f64,
    opts: &CeilingSearch,
) -> AnalysisResult<Equilibrium<OperatingPointSeries>> {
    let idx = opts.reference_index;
    if idx >= points.len() {
        return Err(AnalysisError::config(format!(
            "reference index {idx} out of range for {} operating points",
            points.len()
        )));
    }
    debug!("service ceiling search tracking point {idx}: {:?}", points[idx]);

    search(
        |h| evaluate_flight_condition(vehicle, h, points),
        |s: &OperatingPointSeries| s.rows.get(idx).map_or(f64::NAN, |r| r.climb_power_hp),
        initial_altitude_ft,
        &opts.options(),
    )
}

/* ------------------------------- internals ------------------------------- */

fn evaluate_in(
    vehicle: &VehicleSpec,
    atmosphere: Atmosphere,
    points: &[OperatingPoint],
) -> AnalysisResult<OperatingPointSeries> {
    vehicle.validate()?;
    if points.is_empty() {
        return Err(AnalysisError::config("no operating points given"));
    }

    let area = vehicle.disk_area();
    let rows = points
        .iter()
        .enumerate()
        .map(|(i, p)| operating_row(i, vehicle, area, &atmosphere, *p))
        .collect::<AnalysisResult<Vec<_>>>()?;

    debug!(
        "evaluated {} operating points at {:.1} ft (ρ = {:.4}, σ = {:.4})",
        rows.len(),
        atmosphere.altitude_ft,
        atmosphere.density,
        atmosphere.density_ratio
    );
    Ok(OperatingPointSeries { atmosphere, rows })
}

fn operating_row(
    index: usize,
    vehicle: &VehicleSpec,
    area: f64,
    atmosphere: &Atmosphere,
    point: OperatingPoint,
) -> AnalysisResult<Row> {
    let rho = atmosphere.density;

    let thrust = thrust_at_angle(index, vehicle.weight_n, point.angle_deg)?;
    let voo = finite(index, "advance speed", advance_speed(point.advance_ratio, thrust, rho, area))?;
    let dp = 0.5 * rho * voo * voo * vehicle.flat_plate_area_m2;
    let tp = finite(index, "propulsive force", thrust * point.angle_deg.to_radians().sin() + dp)?;

    let p_req = watts_to_hp(tp * voo);
    let p_av = vehicle.available_power_hp(atmosphere.density_ratio);
    let p_c = p_av - p_req;
    let vc = finite(index, "climb velocity", hp_to_watts(p_c) / thrust)?;

    Ok(Row {
        point,
        thrust_n: thrust,
        advance_speed_mps: voo,
        parasite_drag_n: dp,
        propulsive_force_n: tp,
        required_power_hp: p_req,
        available_power_hp: p_av,
        climb_power_hp: p_c,
        climb_velocity_mps: vc,
    })
}

/* ----------------------------------- tests ---------------------------------- */

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use autogyro_core::DomainViolation;

    fn reference_vehicle() -> VehicleSpec {
        VehicleSpec {
            weight_n: 450.0 * 9.81,
            rated_power_hp: 100.0,
            rotor_diameter_m: 8.4,
            power_availability: 0.7,
            flat_plate_area_m2: 0.557_418,
        }
    }

    #[test]
    fn reference_point_at_sea_level() {
        let v = reference_vehicle();
        let s = evaluate_flight_condition(&v, 0.0, &[OperatingPoint::new(4.0, 7.0)]).unwrap();
        assert_eq!(s.rows.len(), 1);
        let r = s.rows[0];
        assert_abs_diff_eq!(r.thrust_n, 4447.65, epsilon = 0.005);
        assert_abs_diff_eq!(v.disk_area(), 55.42, epsilon = 0.005);
        assert_abs_diff_eq!(r.advance_speed_mps, 22.89, epsilon = 0.005);
        assert_abs_diff_eq!(r.parasite_drag_n, 178.95, epsilon = 0.005);
        assert_abs_diff_eq!(r.propulsive_force_n, 720.98, epsilon = 0.005);
        assert_abs_diff_eq!(r.required_power_hp, 22.13, epsilon = 0.005);
        assert_abs_diff_eq!(r.climb_power_hp, 47.87, epsilon = 0.005);
        assert_abs_diff_eq!(r.climb_velocity_mps, 8.03, epsilon = 0.005);
        assert_abs_diff_eq!(r.available_power_hp, 70.0, epsilon = 1e-12);
    }

    #[test]
    fn rows_follow_input_order() {
        let pts = OperatingPoint::reference_sweep();
        let s = evaluate_flight_condition(&reference_vehicle(), 2_000.0, &pts).unwrap();
        assert_eq!(s.rows.len(), pts.len());
        for (row, p) in s.rows.iter().zip(&pts) {
            assert_eq!(row.point, *p);
        }
    }

    #[test]
    fn ninety_degrees_is_reported_with_its_index() {
        let pts = [OperatingPoint::new(1.8, 30.0), OperatingPoint::new(1.8, 90.0)];
        let err = evaluate_flight_condition(&reference_vehicle(), 0.0, &pts).unwrap_err();
        assert_eq!(err, AnalysisError::domain(1, DomainViolation::ThrustAngle { angle_deg: 90.0 }));
    }

    #[test]
    fn bad_inputs_are_config_errors() {
        let v = reference_vehicle();
        assert!(matches!(evaluate_flight_condition(&v, 0.0, &[]), Err(AnalysisError::Config(_))));
        let mut broken = v;
        broken.power_availability = 1.2;
        let pts = [OperatingPoint::new(4.0, 7.0)];
        assert!(matches!(evaluate_flight_condition(&broken, 0.0, &pts), Err(AnalysisError::Config(_))));
        assert!(matches!(evaluate_flight_condition(&v, 1.0e6, &pts), Err(AnalysisError::Config(_))));
    }

    #[test]
    fn climb_power_shrinks_with_altitude() {
        let pts = OperatingPoint::reference_sweep();
        let v = reference_vehicle();
        let low = evaluate_flight_condition(&v, 0.0, &pts).unwrap();
        let high = evaluate_flight_condition(&v, 10_000.0, &pts).unwrap();
        assert_abs_diff_eq!(low.rows[3].climb_power_hp, 31.69, epsilon = 0.005);
        assert_abs_diff_eq!(high.rows[3].climb_power_hp, 7.08, epsilon = 0.005);
        for (lo, hi) in low.rows.iter().zip(&high.rows) {
            assert!(hi.climb_power_hp < lo.climb_power_hp);
            // Dp is independent of density at fixed v and α
            assert_abs_diff_eq!(hi.parasite_drag_n, lo.parasite_drag_n, epsilon = 1e-9);
        }
    }

    #[test]
    fn density_ratio_sweep() {
        let v = reference_vehicle();
        let pts = [OperatingPoint::new(1.8, 30.0), OperatingPoint::new(4.0, 7.0)];
        let sweep = evaluate_flight_condition_by_density_ratio(&v, 0.0, &pts, &[1.0, 0.8]).unwrap();
        assert_eq!(sweep.by_ratio.len(), 2);

        // σ = 1 reproduces sea level
        assert_eq!(sweep.by_ratio[0].rows, sweep.baseline.rows);

        let s08 = &sweep.by_ratio[1];
        assert_abs_diff_eq!(s08.atmosphere.density, 0.98, epsilon = 1e-12);
        assert_abs_diff_eq!(s08.rows[0].advance_speed_mps, 12.33, epsilon = 0.005);
        assert_abs_diff_eq!(s08.rows[0].climb_power_hp, 13.17, epsilon = 0.005);
        assert_abs_diff_eq!(s08.rows[1].required_power_hp, 24.75, epsilon = 0.005);
        assert_abs_diff_eq!(s08.rows[1].available_power_hp, 56.0, epsilon = 1e-9);
    }

    #[test]
    fn density_ratio_sweep_rejects_bad_ratios() {
        let v = reference_vehicle();
        let pts = [OperatingPoint::new(4.0, 7.0)];
        assert!(evaluate_flight_condition_by_density_ratio(&v, 0.0, &pts, &[]).is_err());
        assert!(evaluate_flight_condition_by_density_ratio(&v, 0.0, &pts, &[0.0]).is_err());
        assert!(evaluate_flight_condition_by_density_ratio(&v, 0.0, &pts, &[2.0]).is_err());
    }

    #[test]
    fn vehicle_spec_from_json() {
        let json = r#"{
            "weight_n": 4414.5,
            "rated_power_hp": 100.0,
            "rotor_diameter_m": 8.4,
            "power_availability": 0.7,
            "flat_plate_area_m2": 0.557418
        }"#;
        let v: VehicleSpec = serde_json::from_str(json).unwrap();
        let r = reference_vehicle();
        assert_abs_diff_eq!(v.weight_n, r.weight_n, epsilon = 1e-9);
        assert_eq!(v.rated_power_hp, r.rated_power_hp);
        assert_eq!(v.rotor_diameter_m, r.rotor_diameter_m);
        assert_eq!(v.flat_plate_area_m2, r.flat_plate_area_m2);
    }
}
