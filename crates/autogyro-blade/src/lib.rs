//! autogyro-blade
//!
//! Blade-element torque model for a two-bladed autogyro rotor in forward
//! flight, and the autorotation search built on it.
//!
//! The blade is cut into elements of width `dr` from the root cutout out to the
//! tip. At every element both blades are evaluated: the advancing blade ("fb")
//! sees the forward-speed component added to its rotational speed, the
//! retreating blade ("bb") has it subtracted.
//!
//! Per element, per blade (α_r = rotor tilt, θ = blade pitch):
//!   u        = Ω[rpm] · 2π/60 · r
//!   V_R      = sqrt((Voo sin α_r)² + (u ± Voo cos α_r)²)
//!   α        = asin(Voo sin α_r / V_R) + θ
//!   dL       = ½ ρ V_R² c a α dr
//!   dD       = ½ ρ V_R² c Cdo dr
//!   dQ       = (dD − α dL) · r · dr
//!
//! Rotor torque Q = Σ dQ_fb + Σ dQ_bb. Q = 0 is autorotation.
//!
//! Note: the lift term of dQ is α·dL, i.e. the in-plane lift component uses the
//! local angle itself rather than a separate inflow angle.

use autogyro_core::error::{finite, require_positive, AnalysisResult};
use autogyro_core::units::rpm_to_rad_s;
use autogyro_core::{
    advance_speed, disk_area, search, thrust_at_angle, AnalysisError, Atmosphere, Convergence, DomainViolation,
    Equilibrium, SearchMode, SearchOptions,
};
use log::{debug, trace};
use serde::{Deserialize, Serialize};

/// Relative slack when flooring length/step, so 3.68 / 0.08 counts 46 elements.
const COUNT_SLACK: f64 = 1e-9;

/// Rotor and flight parameters for the blade-element model.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RotorBladeSpec {
    /// Gross weight [N]
    pub weight_n: f64,
    /// Rotor diameter [m]
    pub rotor_diameter_m: f64,
    /// Blade chord [m]
    pub chord_m: f64,
    /// Lift-curve slope a [1/rad]
    pub lift_slope: f64,
    /// Profile drag coefficient Cdo
    pub profile_drag_coefficient: f64,
    /// Blade length from the root cutout to the tip [m]
    pub effective_length_m: f64,
    /// Rotor disk tilt α_r [deg]
    pub rotor_tilt_deg: f64,
    /// Forward speed Voo [m/s]
    pub forward_speed_mps: f64,
    /// Blade pitch θ [deg]
    pub pitch_deg: f64,
}

impl RotorBladeSpec {
    /// Radius where the lifting blade starts [m]
    pub fn root_cutout(&self) -> f64 {
        self.tip_radius() - self.effective_length_m
    }

    pub fn tip_radius(&self) -> f64 {
        0.5 * self.rotor_diameter_m
    }

    pub fn disk_area(&self) -> f64 {
        disk_area(self.rotor_diameter_m)
    }

    /// Rotor thrust at the disk tilt: T = W / cos α_r.
    pub fn thrust(&self) -> AnalysisResult<f64> {
        thrust_at_angle(0, self.weight_n, self.rotor_tilt_deg)
    }

    /// Same rotor, flying at the forward speed that corresponds to
    /// `advance_ratio` in `atmosphere`: Voo = v · sqrt(T / (2ρA)).
    pub fn with_advance_ratio(mut self, advance_ratio: f64, atmosphere: &Atmosphere) -> AnalysisResult<Self> {
        let t = self.thrust()?;
        self.forward_speed_mps =
            finite(0, "forward speed", advance_speed(advance_ratio, t, atmosphere.density, self.disk_area()))?;
        Ok(self)
    }

    pub fn validate(&self) -> AnalysisResult<()> {
        require_positive("weight", self.weight_n)?;
        require_positive("rotor diameter", self.rotor_diameter_m)?;
        require_positive("chord", self.chord_m)?;
        require_positive("lift slope", self.lift_slope)?;
        require_positive("effective blade length", self.effective_length_m)?;
        if !(self.profile_drag_coefficient.is_finite() && self.profile_drag_coefficient >= 0.0) {
            return Err(AnalysisError::config(format!(
                "profile drag coefficient must be non-negative, got {}",
                self.profile_drag_coefficient
            )));
        }
        if self.effective_length_m > self.tip_radius() {
            return Err(AnalysisError::config(format!(
                "effective blade length {} m exceeds the rotor radius {} m",
                self.effective_length_m,
                self.tip_radius()
            )));
        }
        if !(self.forward_speed_mps.is_finite() && self.forward_speed_mps >= 0.0) {
            return Err(AnalysisError::config(format!(
                "forward speed must be non-negative, got {}",
                self.forward_speed_mps
            )));
        }
        if !(self.rotor_tilt_deg.is_finite() && self.pitch_deg.is_finite()) {
            return Err(AnalysisError::config("rotor tilt and blade pitch must be finite"));
        }
        Ok(())
    }
}

/// Aerodynamics of one blade at one element.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct BladeSection {
    pub relative_velocity_mps: f64,
    /// Local angle of attack [rad]
    pub angle_of_attack_rad: f64,
    pub lift_n: f64,
    pub drag_n: f64,
    pub torque_nm: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct BladeElement {
    pub radius_m: f64,
    /// Advancing blade (fb)
    pub advancing: BladeSection,
    /// Retreating blade (bb)
    pub retreating: BladeSection,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct TorqueBreakdown {
    /// Σ dQ over the advancing blade [N·m]
    pub advancing_nm: f64,
    /// Σ dQ over the retreating blade [N·m]
    pub retreating_nm: f64,
    /// advancing + retreating [N·m]
    pub total_nm: f64,
}

/// Elements root to tip, and the rotor torque they add up to.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BladeElementSeries {
    pub rpm: f64,
    pub step_m: f64,
    pub atmosphere: Atmosphere,
    pub thrust_n: f64,
    pub forward_speed_mps: f64,
    pub root_cutout_m: f64,
    pub elements: Vec<BladeElement>,
    pub torque: TorqueBreakdown,
}

impl BladeElementSeries {
    /// Net rotor torque Q [N·m]
    pub fn total_torque(&self) -> f64 {
        self.torque.total_nm
    }
}

/// Number of elements of width `step` that fit in `length`: floor(length/step).
pub fn element_count(length: f64, step: f64) -> usize {
    let n = length / step;
    // Truncation intended: n is finite and non-negative once inputs are validated.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let count = (n + n * COUNT_SLACK).floor() as usize;
    count
}

/// Top-level API: evaluate every blade element of `rotor` at `rpm`, with
/// element width `step` [m], at density altitude `altitude_ft`.
///
/// Any invalid element aborts the whole evaluation.
pub fn evaluate_blade_elements(
    rotor: &RotorBladeSpec,
    rpm: f64,
    step: f64,
    altitude_ft: f64,
) -> AnalysisResult<BladeElementSeries> {
    rotor.validate()?;
    require_positive("rotor speed [rpm]", rpm)?;
    require_positive("element width", step)?;
    if step > rotor.effective_length_m {
        return Err(AnalysisError::config(format!(
            "element width {step} m is larger than the effective blade length {} m",
            rotor.effective_length_m
        )));
    }
    let atmosphere = Atmosphere::at_altitude(altitude_ft)?;
    let thrust_n = rotor.thrust()?;

    let flow = Flow::new(rotor, atmosphere.density, step);
    let r0 = rotor.root_cutout();
    let tip = rotor.tip_radius();
    let omega = rpm_to_rad_s(rpm);

    let n = element_count(rotor.effective_length_m, step);
    let mut elements = Vec::with_capacity(n);
    let mut torque = TorqueBreakdown::default();

    for i in 0..n {
        // From the index, not a running sum; `min` only absorbs rounding at an exact tip.
        let r = (r0 + (i + 1) as f64 * step).min(tip);
        let u = omega * r;
        let advancing = flow.section(i, r, u + flow.v_axial)?;
        let retreating = flow.section(i, r, u - flow.v_axial)?;

        torque.advancing_nm += advancing.torque_nm;
        torque.retreating_nm += retreating.torque_nm;
        elements.push(BladeElement { radius_m: r, advancing, retreating });
    }
    torque.total_nm = torque.advancing_nm + torque.retreating_nm;

    trace!("{} elements at {rpm} rpm: Q = {:.5} N·m", elements.len(), torque.total_nm);
    Ok(BladeElementSeries {
        rpm,
        step_m: step,
        atmosphere,
        thrust_n,
        forward_speed_mps: rotor.forward_speed_mps,
        root_cutout_m: r0,
        elements,
        torque,
    })
}

/// Rotor torque at one rotor speed.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct TorqueSample {
    pub rpm: f64,
    pub torque_nm: f64,
}

/// Total torque for each rotor speed in `rpms`, in input order.
pub fn torque_sweep(
    rotor: &RotorBladeSpec,
    rpms: &[f64],
    step: f64,
    altitude_ft: f64,
) -> AnalysisResult<Vec<TorqueSample>> {
    if rpms.is_empty() {
        return Err(AnalysisError::config("torque sweep needs at least one rotor speed"));
    }
    debug!("torque sweep over {} rotor speeds", rpms.len());
    rpms.iter()
        .map(|&rpm| {
            let s = evaluate_blade_elements(rotor, rpm, step, altitude_ft)?;
            Ok(TorqueSample { rpm, torque_nm: s.total_torque() })
        })
        .collect()
}

/// Options for [`find_autorotation_rpm`].
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct AutorotationSearch {
    /// Rotor-speed increment per trial [rpm]
    pub rpm_step: f64,
    /// Converged once |Q| ≤ tolerance [N·m]
    pub tolerance: f64,
    pub max_iterations: usize,
    pub mode: SearchMode,
}

impl Default for AutorotationSearch {
    fn default() -> Self {
        Self { rpm_step: 0.001, tolerance: 0.01, max_iterations: 1_000_000, mode: SearchMode::Linear }
    }
}

/// Walk rotor speed from `initial_rpm` until the net rotor torque vanishes.
///
/// The returned state is the blade series at the last rotor speed tried.
pub fn find_autorotation_rpm(
    rotor: &RotorBladeSpec,
    step: f64,
    altitude_ft: f64,
    initial_rpm: f64,
    opts: &AutorotationSearch,
) -> AnalysisResult<Equilibrium<BladeElementSeries>> {
    let options = SearchOptions {
        step: opts.rpm_step,
        tolerance: opts.tolerance,
        max_iterations: opts.max_iterations,
        criterion: Convergence::Magnitude,
        mode: opts.mode,
    };
    search(
        |rpm| evaluate_blade_elements(rotor, rpm, step, altitude_ft),
        BladeElementSeries::total_torque,
        initial_rpm,
        &options,
    )
}

/* ------------------------------- internals ------------------------------- */

/// Per-evaluation constants shared by every element.
struct Flow {
    /// Voo sin α_r, through the disk
    v_normal: f64,
    /// Voo cos α_r, in the disk plane
    v_axial: f64,
    pitch_rad: f64,
    /// ½ ρ c
    half_rho_c: f64,
    lift_slope: f64,
    cdo: f64,
    step: f64,
}

impl Flow {
    fn new(rotor: &RotorBladeSpec, density: f64, step: f64) -> Self {
        let tilt = rotor.rotor_tilt_deg.to_radians();
        Self {
            v_normal: rotor.forward_speed_mps * tilt.sin(),
            v_axial: rotor.forward_speed_mps * tilt.cos(),
            pitch_rad: rotor.pitch_deg.to_radians(),
            half_rho_c: 0.5 * density * rotor.chord_m,
            lift_slope: rotor.lift_slope,
            cdo: rotor.profile_drag_coefficient,
            step,
        }
    }

    /// One blade at element `index`, radius `r`, with in-plane speed `tangential`.
    fn section(&self, index: usize, r: f64, tangential: f64) -> AnalysisResult<BladeSection> {
        let vr = self.v_normal.hypot(tangential);
        let alpha = angle_of_attack(index, self.v_normal, vr, self.pitch_rad)?;

        let q = self.half_rho_c * vr * vr;
        let lift = q * self.lift_slope * alpha * self.step;
        let drag = q * self.cdo * self.step;
        let torque = (drag - alpha * lift) * r * self.step;

        Ok(BladeSection {
            relative_velocity_mps: vr,
            angle_of_attack_rad: alpha,
            lift_n: lift,
            drag_n: drag,
            torque_nm: finite(index, "element torque", torque)?,
        })
    }
}

/// α = asin(v_normal / V_R) + θ. The argument is never clamped.
fn angle_of_attack(index: usize, v_normal: f64, vr: f64, pitch_rad: f64) -> AnalysisResult<f64> {
    if vr == 0.0 {
        return Err(AnalysisError::domain(index, DomainViolation::ZeroRelativeVelocity));
    }
    let argument = v_normal / vr;
    if !(-1.0..=1.0).contains(&argument) {
        return Err(AnalysisError::domain(index, DomainViolation::Arcsin { argument }));
    }
    Ok(argument.asin() + pitch_rad)
}

/* ----------------------------------- tests ---------------------------------- */
