// Plain-text tables for terminal output.
//
// Numbers are rounded to 2 decimals unless a column asks for more; blade angles
// are shown in degrees.

use std::fmt;

use autogyro_blade::{BladeElementSeries, TorqueSample};
use autogyro_flight::OperatingPointSeries;

pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new<I, S>(headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self { headers: headers.into_iter().map(Into::into).collect(), rows: Vec::new() }
    }

    pub fn push(&mut self, cells: Vec<String>) {
        self.rows.push(cells);
    }

    fn widths(&self) -> Vec<usize> {
        let mut w: Vec<usize> = self.headers.iter().map(|h| h.chars().count()).collect();
        for row in &self.rows {
            for (i, cell) in row.iter().enumerate() {
                if let Some(slot) = w.get_mut(i) {
                    *slot = (*slot).max(cell.chars().count());
                }
            }
        }
        w
    }
}

fn write_line(f: &mut fmt::Formatter<'_>, cells: &[String], widths: &[usize]) -> fmt::Result {
    let padded: Vec<String> = cells.iter().zip(widths).map(|(c, &w)| format!("{c:>w$}")).collect();
    writeln!(f, "{}", padded.join("  ").trim_end())
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let widths = self.widths();
        write_line(f, &self.headers, &widths)?;
        let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
        writeln!(f, "{}", rule.join("  "))?;
        for row in &self.rows {
            write_line(f, row, &widths)?;
        }
        Ok(())
    }
}

fn num(v: f64) -> String {
    format!("{v:.2}")
}

pub fn operating_points(series: &OperatingPointSeries) -> Table {
    let mut t = Table::new([
        "Voo/Vh", "alpha [deg]", "T [N]", "Voo [m/s]", "Dp [N]", "Tp [N]",
        "Preq [hp]", "Pav [hp]", "Pc [hp]", "Vc [m/s]",
    ]);
    for r in &series.rows {
        t.push(vec![
            num(r.point.advance_ratio),
            num(r.point.angle_deg),
            num(r.thrust_n),
            num(r.advance_speed_mps),
            num(r.parasite_drag_n),
            num(r.propulsive_force_n),
            num(r.required_power_hp),
            num(r.available_power_hp),
            num(r.climb_power_hp),
            num(r.climb_velocity_mps),
        ]);
    }
    t
}

pub fn blade_elements(series: &BladeElementSeries) -> Table {
    let mut t = Table::new([
        "r [m]", "VR fb [m/s]", "VR bb [m/s]", "alpha fb [deg]", "alpha bb [deg]",
        "dL fb [N]", "dL bb [N]", "dD fb [N]", "dD bb [N]", "dQ fb [Nm]", "dQ bb [Nm]",
    ]);
    for e in &series.elements {
        let (fb, bb) = (&e.advancing, &e.retreating);
        t.push(vec![
            num(e.radius_m),
            num(fb.relative_velocity_mps),
            num(bb.relative_velocity_mps),
            num(fb.angle_of_attack_rad.to_degrees()),
            num(bb.angle_of_attack_rad.to_degrees()),
            num(fb.lift_n),
            num(bb.lift_n),
            format!("{:.3}", fb.drag_n),
            format!("{:.3}", bb.drag_n),
            format!("{:.3}", fb.torque_nm),
            format!("{:.3}", bb.torque_nm),
        ]);
    }
    t
}

pub fn torque_samples(samples: &[TorqueSample]) -> Table {
    let mut t = Table::new(["RPM", "Torque [Nm]"]);
    for s in samples {
        t.push(vec![num(s.rpm), format!("{:.4}", s.torque_nm)]);
    }
    t
}

#[cfg(test)]
mod tests {
    use super::*;
    use autogyro_flight::{evaluate_flight_condition, OperatingPoint};

    use crate::presets;

    #[test]
    fn columns_are_right_aligned() {
        let mut t = Table::new(["a", "long header"]);
        t.push(vec!["12.50".into(), "1.00".into()]);
        let out = t.to_string();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "    a  long header");
        assert_eq!(lines[1], "-----  -----------");
        assert_eq!(lines[2], "12.50         1.00");
    }

    #[test]
    fn operating_point_table_rounds_to_two_decimals() {
        let s = evaluate_flight_condition(&presets::vehicle(), 0.0, &[OperatingPoint::new(4.0, 7.0)]).unwrap();
        let out = operating_points(&s).to_string();
        let row = out.lines().nth(2).unwrap();
        for expected in ["4447.65", "22.89", "178.95", "720.98", "22.13", "47.87", "8.03"] {
            assert!(row.contains(expected), "{expected} missing from {row}");
        }
    }
}
