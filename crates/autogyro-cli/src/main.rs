// autogyro: command-line driver.
//
// Loads the vehicle / rotor / operating points (JSON or built-in reference),
// runs one analysis and prints a table, or JSON with `--json`.

mod config;
mod presets;
mod table;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use autogyro_blade::{evaluate_blade_elements, find_autorotation_rpm, torque_sweep, AutorotationSearch};
use autogyro_core::{Equilibrium, SearchMode};
use autogyro_flight::{
    evaluate_flight_condition, evaluate_flight_condition_by_density_ratio, find_service_ceiling, CeilingSearch,
    OperatingPointSeries,
};
use clap::{ArgAction, Parser, Subcommand};
use log::info;
use serde::Serialize;

#[derive(Parser, Debug)]
#[command(name = "autogyro")]
#[command(version)]
#[command(about = "Autogyro rotor performance: power & climb tables, blade-element torque, service ceiling, autorotation")]
struct Args {
    #[command(subcommand)]
    command: Commands,

    /// Vehicle JSON (flight-condition model)
    #[arg(long, global = true)]
    vehicle: Option<PathBuf>,

    /// Rotor JSON (blade-element model)
    #[arg(long, global = true)]
    rotor: Option<PathBuf>,

    /// Operating points JSON: [{"advance_ratio": .., "angle_deg": ..}, ...]
    #[arg(long, global = true)]
    points: Option<PathBuf>,

    /// Print JSON instead of tables
    #[arg(long, global = true)]
    json: bool,

    /// More logging (-v info, -vv debug, -vvv trace); RUST_LOG overrides
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Errors only
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Power and climb table at one density altitude
    Flight {
        /// Density altitude [ft]
        #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
        altitude: f64,
    },
    /// Power and climb tables for a list of density ratios
    Sigma {
        /// Density altitude of the baseline table [ft]
        #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
        altitude: f64,
        /// Comma-separated density ratios
        #[arg(long, value_delimiter = ',', default_values_t = [1.0, 0.9, 0.8, 0.7])]
        ratios: Vec<f64>,
    },
    /// Service ceiling: walk altitude until climb power at one point is used up
    Ceiling {
        /// Starting density altitude [ft]
        #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
        initial_altitude: f64,
        /// Operating point tracked by the search
        #[arg(long, default_value_t = 3)]
        reference_index: usize,
        /// Altitude step [ft]
        #[arg(long, default_value_t = 0.1, allow_negative_numbers = true)]
        step: f64,
        /// Climb-power tolerance [hp]
        #[arg(long, default_value_t = 0.01)]
        tolerance: f64,
        #[arg(long, default_value_t = 2_000_000)]
        max_iterations: usize,
        /// Bracket the crossing and bisect instead of walking all the way
        #[arg(long)]
        bisect: bool,
    },
    /// Blade-element table at one rotor speed
    Blade {
        #[arg(long, default_value_t = 500.0)]
        rpm: f64,
        /// Element width [m]
        #[arg(long, default_value_t = 0.08)]
        step: f64,
        #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
        altitude: f64,
    },
    /// Rotor torque for a list of rotor speeds
    Torque {
        /// Comma-separated rotor speeds [rpm]
        #[arg(long, value_delimiter = ',', required = true)]
        rpms: Vec<f64>,
        #[arg(long, default_value_t = 0.08)]
        step: f64,
        #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
        altitude: f64,
    },
    /// Rotor speed at which net torque vanishes
    Autorotation {
        #[arg(long, default_value_t = 530.0)]
        initial_rpm: f64,
        /// Rotor-speed step [rpm]
        #[arg(long, default_value_t = 0.001, allow_negative_numbers = true)]
        rpm_step: f64,
        /// Torque tolerance [N·m]
        #[arg(long, default_value_t = 0.01)]
        tolerance: f64,
        #[arg(long, default_value_t = 1_000_000)]
        max_iterations: usize,
        /// Element width [m]
        #[arg(long, default_value_t = 0.08)]
        step: f64,
        #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
        altitude: f64,
        #[arg(long)]
        bisect: bool,
    },
}

fn init_logging(verbose: u8, quiet: bool) {
    let level = match (quiet, verbose) {
        (true, _) => "error",
        (false, 0) => "warn",
        (false, 1) => "info",
        (false, 2) => "debug",
        (false, _) => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

fn mode(bisect: bool) -> SearchMode {
    if bisect { SearchMode::Bisection } else { SearchMode::Linear }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value).context("serializing output")?);
    Ok(())
}

fn print_series(label: &str, series: &OperatingPointSeries) {
    let a = &series.atmosphere;
    println!(
        "{label}: h = {:.1} ft, rho = {:.4} kg/m^3, sigma = {:.4}",
        a.altitude_ft, a.density, a.density_ratio
    );
    println!("{}", table::operating_points(series));
}

/// Print a search result; `unit` labels the parameter.
fn report<S: Serialize>(what: &str, unit: &str, eq: &Equilibrium<S>, json: bool) -> Result<ExitCode> {
    if json {
        print_json(eq)?;
    } else {
        match eq {
            Equilibrium::Converged { parameter, residual, iterations, .. } => {
                println!("{what}: {parameter:.4} {unit} (residual {residual:.5}, {iterations} evaluations)");
            }
            Equilibrium::NotConverged { last_parameter, last_residual, iterations, .. } => {
                println!(
                    "{what}: not converged after {iterations} evaluations; last {last_parameter:.4} {unit} (residual {last_residual:.5})"
                );
            }
        }
    }
    Ok(if eq.is_converged() { ExitCode::SUCCESS } else { ExitCode::from(2) })
}

fn main() -> Result<ExitCode> {
    let args = Args::parse();
    init_logging(args.verbose, args.quiet);

    match args.command {
        Commands::Flight { altitude } => {
            let vehicle = config::vehicle(args.vehicle.as_deref())?;
            let points = config::operating_points(args.points.as_deref())?;
            info!("flight condition at {altitude} ft over {} points", points.len());
            let series = evaluate_flight_condition(&vehicle, altitude, &points).context("flight-condition model")?;
            if args.json {
                print_json(&series)?;
            } else {
                print_series("Flight condition", &series);
            }
        }
        Commands::Sigma { altitude, ratios } => {
            let vehicle = config::vehicle(args.vehicle.as_deref())?;
            let points = config::operating_points(args.points.as_deref())?;
            let sweep = evaluate_flight_condition_by_density_ratio(&vehicle, altitude, &points, &ratios)
                .context("density-ratio sweep")?;
            if args.json {
                print_json(&sweep)?;
            } else {
                print_series("Baseline", &sweep.baseline);
                for s in &sweep.by_ratio {
                    print_series(&format!("sigma = {}", s.atmosphere.density_ratio), s);
                }
            }
        }
        Commands::Ceiling { initial_altitude, reference_index, step, tolerance, max_iterations, bisect } => {
            let vehicle = config::vehicle(args.vehicle.as_deref())?;
            let points = config::operating_points(args.points.as_deref())?;
            let opts = CeilingSearch { reference_index, step, tolerance, max_iterations, mode: mode(bisect) };
            info!("service ceiling from {initial_altitude} ft, {opts:?}");
            let eq = find_service_ceiling(&vehicle, &points, initial_altitude, &opts).context("service-ceiling search")?;
            return report("Service ceiling", "ft", &eq, args.json);
        }
        Commands::Blade { rpm, step, altitude } => {
            let rotor = config::rotor(args.rotor.as_deref())?;
            let series = evaluate_blade_elements(&rotor, rpm, step, altitude).context("blade-element model")?;
            if args.json {
                print_json(&series)?;
            } else {
                println!(
                    "Blade elements at {rpm} rpm: T = {:.2} N, Voo = {:.2} m/s, r0 = {:.2} m, {} elements",
                    series.thrust_n,
                    series.forward_speed_mps,
                    series.root_cutout_m,
                    series.elements.len()
                );
                println!("{}", table::blade_elements(&series));
                let q = &series.torque;
                println!(
                    "Q fb = {:.4} Nm, Q bb = {:.4} Nm, Q total = {:.4} Nm",
                    q.advancing_nm, q.retreating_nm, q.total_nm
                );
            }
        }
        Commands::Torque { rpms, step, altitude } => {
            let rotor = config::rotor(args.rotor.as_deref())?;
            let samples = torque_sweep(&rotor, &rpms, step, altitude).context("torque sweep")?;
            if args.json {
                print_json(&samples)?;
            } else {
                println!("{}", table::torque_samples(&samples));
            }
        }
        Commands::Autorotation { initial_rpm, rpm_step, tolerance, max_iterations, step, altitude, bisect } => {
            let rotor = config::rotor(args.rotor.as_deref())?;
            let opts = AutorotationSearch { rpm_step, tolerance, max_iterations, mode: mode(bisect) };
            info!("autorotation search from {initial_rpm} rpm, {opts:?}");
            let eq = find_autorotation_rpm(&rotor, step, altitude, initial_rpm, &opts).context("autorotation search")?;
            return report("RPM for autorotation", "rpm", &eq, args.json);
        }
    }
    Ok(ExitCode::SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Args::command().debug_assert();
    }

    #[test]
    fn parses_lists_and_flags() {
        let args = Args::try_parse_from(["autogyro", "sigma", "--ratios", "1,0.8", "--json"]).unwrap();
        assert!(args.json);
        match args.command {
            Commands::Sigma { ratios, altitude } => {
                assert_eq!(ratios, vec![1.0, 0.8]);
                assert_eq!(altitude, 0.0);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn search_defaults_match_the_library() {
        let args = Args::try_parse_from(["autogyro", "ceiling"]).unwrap();
        let Commands::Ceiling { reference_index, step, tolerance, bisect, .. } = args.command else {
            panic!("expected ceiling");
        };
        let d = CeilingSearch::default();
        assert_eq!((reference_index, step, tolerance, bisect), (d.reference_index, d.step, d.tolerance, false));

        let args = Args::try_parse_from(["autogyro", "autorotation", "--rpm-step", "-0.5", "--bisect"]).unwrap();
        let Commands::Autorotation { rpm_step, bisect, .. } = args.command else {
            panic!("expected autorotation");
        };
        assert_eq!(rpm_step, -0.5);
        assert!(bisect);
    }
}
