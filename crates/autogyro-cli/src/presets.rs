// Built-in reference autogyro, used when no config file is given.

use autogyro_blade::RotorBladeSpec;
use autogyro_core::units::kg_to_newtons;
use autogyro_flight::{OperatingPoint, VehicleSpec};

use crate::config::RotorConfig;

/// 450 kg, 100 hp, 8.4 m rotor.
pub fn vehicle() -> VehicleSpec {
    VehicleSpec {
        weight_n: kg_to_newtons(450.0),
        rated_power_hp: 100.0,
        rotor_diameter_m: 8.4,
        power_availability: 0.7,
        flat_plate_area_m2: 0.557_418,
    }
}

/// Same airframe's rotor, flying at Voo/Vh = 2 with the disk at 30°.
pub fn rotor() -> RotorConfig {
    RotorConfig {
        weight_n: kg_to_newtons(450.0),
        rotor_diameter_m: 8.4,
        chord_m: 0.24,
        lift_slope: 5.6,
        profile_drag_coefficient: 0.007,
        effective_length_m: 3.68,
        rotor_tilt_deg: 30.0,
        pitch_deg: 0.0,
        forward_speed_mps: None,
        advance_ratio: Some(2.0),
    }
}

pub fn operating_points() -> Vec<OperatingPoint> {
    OperatingPoint::reference_sweep()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn reference_rotor_resolves_forward_speed() {
        let spec: RotorBladeSpec = rotor().resolve().unwrap();
        assert_abs_diff_eq!(spec.forward_speed_mps, 12.25, epsilon = 0.005);
        assert!(vehicle().validate().is_ok());
        assert_eq!(operating_points().len(), 12);
    }
}
