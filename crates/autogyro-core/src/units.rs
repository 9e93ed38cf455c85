//! Units & conversions.
//!
//! Inputs are SI; power is reported in mechanical horsepower.

use std::f64::consts::PI;

/// Watts per mechanical horsepower. Every hp <-> W conversion goes through here.
pub const WATTS_PER_HP: f64 = 745.7;

/// Sea-level standard density [kg/m³]
pub const RHO0: f64 = 1.225;

/// Standard gravity [m/s²]
pub const G: f64 = 9.81;

pub fn watts_to_hp(w: f64) -> f64 { w / WATTS_PER_HP }
pub fn hp_to_watts(hp: f64) -> f64 { hp * WATTS_PER_HP }

/// Rotor speed [rpm] -> angular rate [rad/s]
pub fn rpm_to_rad_s(rpm: f64) -> f64 { rpm * (2.0 * PI / 60.0) }
pub fn rad_s_to_rpm(w: f64) -> f64 { w * (60.0 / (2.0 * PI)) }

pub fn kg_to_newtons(kg: f64) -> f64 { kg * G }
