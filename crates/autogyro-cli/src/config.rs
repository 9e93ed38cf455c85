// JSON configuration for the driver. Anything not given falls back to the
// reference autogyro in `presets`.

use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use autogyro_blade::RotorBladeSpec;
use autogyro_core::Atmosphere;
use autogyro_flight::{OperatingPoint, VehicleSpec};
use log::info;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::presets;

/// Rotor file. Give either `forward_speed_mps` or `advance_ratio`; an advance
/// ratio is turned into a forward speed with sea-level density.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RotorConfig {
    pub weight_n: f64,
    pub rotor_diameter_m: f64,
    pub chord_m: f64,
    pub lift_slope: f64,
    pub profile_drag_coefficient: f64,
    pub effective_length_m: f64,
    pub rotor_tilt_deg: f64,
    #[serde(default)]
    pub pitch_deg: f64,
    #[serde(default)]
    pub forward_speed_mps: Option<f64>,
    #[serde(default)]
    pub advance_ratio: Option<f64>,
}

impl RotorConfig {
    pub fn resolve(&self) -> Result<RotorBladeSpec> {
        let spec = RotorBladeSpec {
            weight_n: self.weight_n,
            rotor_diameter_m: self.rotor_diameter_m,
            chord_m: self.chord_m,
            lift_slope: self.lift_slope,
            profile_drag_coefficient: self.profile_drag_coefficient,
            effective_length_m: self.effective_length_m,
            rotor_tilt_deg: self.rotor_tilt_deg,
            forward_speed_mps: self.forward_speed_mps.unwrap_or(0.0),
            pitch_deg: self.pitch_deg,
        };
        let spec = match (self.forward_speed_mps, self.advance_ratio) {
            (Some(_), None) => spec,
            (None, Some(ratio)) => spec
                .with_advance_ratio(ratio, &Atmosphere::sea_level())
                .context("deriving forward speed from the advance ratio")?,
            (Some(_), Some(_)) => bail!("rotor config sets both forward_speed_mps and advance_ratio"),
            (None, None) => bail!("rotor config needs forward_speed_mps or advance_ratio"),
        };
        spec.validate().context("invalid rotor config")?;
        Ok(spec)
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let text = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))
}

pub fn vehicle(path: Option<&Path>) -> Result<VehicleSpec> {
    let v = match path {
        Some(p) => {
            info!("vehicle from {}", p.display());
            read_json::<VehicleSpec>(p)?
        }
        None => presets::vehicle(),
    };
    v.validate().context("invalid vehicle config")?;
    Ok(v)
}

pub fn rotor(path: Option<&Path>) -> Result<RotorBladeSpec> {
    match path {
        Some(p) => {
            info!("rotor from {}", p.display());
            read_json::<RotorConfig>(p)?.resolve()
        }
        None => presets::rotor().resolve(),
    }
}

pub fn operating_points(path: Option<&Path>) -> Result<Vec<OperatingPoint>> {
    let points = match path {
        Some(p) => {
            info!("operating points from {}", p.display());
            read_json::<Vec<OperatingPoint>>(p)?
        }
        None => presets::operating_points(),
    };
    if points.is_empty() {
        bail!("operating-point list is empty");
    }
    Ok(points)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn rotor_with_explicit_speed() {
        let json = r#"{
            "weight_n": 4414.5, "rotor_diameter_m": 8.4, "chord_m": 0.24,
            "lift_slope": 5.6, "profile_drag_coefficient": 0.007,
            "effective_length_m": 3.68, "rotor_tilt_deg": 30.0,
            "forward_speed_mps": 15.0
        }"#;
        let cfg: RotorConfig = serde_json::from_str(json).unwrap();
        let spec = cfg.resolve().unwrap();
        assert_abs_diff_eq!(spec.forward_speed_mps, 15.0);
        assert_abs_diff_eq!(spec.pitch_deg, 0.0);
    }

    #[test]
    fn rotor_speed_must_be_given_exactly_once() {
        let mut cfg = presets::rotor();
        cfg.forward_speed_mps = Some(10.0);
        assert!(cfg.resolve().is_err());
        cfg.forward_speed_mps = None;
        cfg.advance_ratio = None;
        assert!(cfg.resolve().is_err());
    }

    #[test]
    fn unknown_rotor_fields_are_rejected() {
        let json = r#"{ "weight_n": 1.0, "rotor_diameter_m": 8.4, "chord_m": 0.24,
            "lift_slope": 5.6, "profile_drag_coefficient": 0.007, "effective_length_m": 3.68,
            "rotor_tilt_deg": 30.0, "advance_ratio": 2.0, "cord_m": 0.2 }"#;
        assert!(serde_json::from_str::<RotorConfig>(json).is_err());
    }

    #[test]
    fn shipped_data_files_match_the_presets() {
        let data = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../data");
        let v = vehicle(Some(&data.join("reference_vehicle.json"))).unwrap();
        assert_abs_diff_eq!(v.weight_n, presets::vehicle().weight_n, epsilon = 1e-9);
        assert_abs_diff_eq!(v.flat_plate_area_m2, presets::vehicle().flat_plate_area_m2);

        let r = rotor(Some(&data.join("reference_rotor.json"))).unwrap();
        let p = presets::rotor().resolve().unwrap();
        assert_abs_diff_eq!(r.forward_speed_mps, p.forward_speed_mps, epsilon = 1e-9);

        let pts = operating_points(Some(&data.join("reference_points.json"))).unwrap();
        assert_eq!(pts, presets::operating_points());
    }

    #[test]
    fn missing_file_is_reported_with_its_path() {
        let err = vehicle(Some(Path::new("no/such/vehicle.json"))).unwrap_err();
        assert!(format!("{err:#}").contains("no/such/vehicle.json"));
    }

    #[test]
    fn operating_points_parse_as_pairs() {
        let pts: Vec<OperatingPoint> =
            serde_json::from_str(r#"[{"advance_ratio": 1.8, "angle_deg": 30.0}, {"advance_ratio": 4.0, "angle_deg": 7.0}]"#)
                .unwrap();
        assert_eq!(pts, vec![OperatingPoint::new(1.8, 30.0), OperatingPoint::new(4.0, 7.0)]);
    }
}
