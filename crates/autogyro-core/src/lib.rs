//! Core autogyro performance utilities
//!
//! Includes:
//! - Units & conversions (SI inputs, horsepower outputs)
//! - Barometric density-altitude atmosphere
//! - Momentum-theory helpers shared by the flight and blade models
//! - Error types
//! - The fixed-step equilibrium search used by both models

pub mod atmosphere;
pub mod equilibrium;
pub mod error;
pub mod momentum;
pub mod units;

pub use atmosphere::Atmosphere;
pub use equilibrium::{search, Convergence, Equilibrium, SearchMode, SearchOptions};
pub use error::{AnalysisError, DomainViolation};
pub use momentum::{advance_speed, disk_area, thrust_at_angle};
