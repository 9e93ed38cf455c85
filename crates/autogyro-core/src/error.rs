//! Error types shared by every analysis.
//!
//! A failed equilibrium search is *not* an error; see
//! [`Equilibrium::NotConverged`](crate::Equilibrium::NotConverged).

use thiserror::Error;

/// Result alias used across the workspace.
pub type AnalysisResult<T> = Result<T, AnalysisError>;

/// A mathematically invalid intermediate.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum DomainViolation {
    /// cos(α) vanished while computing T = W / cos(α).
    #[error("thrust undefined at angle {angle_deg}° (cos α ≈ 0)")]
    ThrustAngle { angle_deg: f64 },
    /// asin argument fell outside [-1, 1].
    #[error("arcsin argument {argument} outside [-1, 1]")]
    Arcsin { argument: f64 },
    #[error("relative velocity is zero")]
    ZeroRelativeVelocity,
    /// Some derived quantity came out infinite or NaN.
    #[error("{quantity} is not finite")]
    NonFinite { quantity: &'static str },
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum AnalysisError {
    /// Invalid intermediate at operating point / blade element `index`.
    #[error("domain error at index {index}: {violation}")]
    Domain { index: usize, violation: DomainViolation },
    /// Bad inputs: mismatched/empty lists, non-positive steps, out-of-range altitude...
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl AnalysisError {
    pub fn domain(index: usize, violation: DomainViolation) -> Self {
        Self::Domain { index, violation }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}

/// Reject non-finite or non-positive values with a `Config` error naming `what`.
pub fn require_positive(what: &str, value: f64) -> AnalysisResult<f64> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(AnalysisError::config(format!("{what} must be positive and finite, got {value}")))
    }
}

/// Pass `value` through, or report it as a `NonFinite` domain error at `index`.
pub fn finite(index: usize, quantity: &'static str, value: f64) -> AnalysisResult<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(AnalysisError::domain(index, DomainViolation::NonFinite { quantity }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_index() {
        let e = AnalysisError::domain(3, DomainViolation::ThrustAngle { angle_deg: 90.0 });
        assert_eq!(e.to_string(), "domain error at index 3: thrust undefined at angle 90° (cos α ≈ 0)");
    }

    #[test]
    fn positivity_guard() {
        assert_eq!(require_positive("step", 0.08), Ok(0.08));
        assert!(matches!(require_positive("step", 0.0), Err(AnalysisError::Config(_))));
        assert!(matches!(require_positive("step", f64::NAN), Err(AnalysisError::Config(_))));
        assert!(finite(7, "drag", f64::INFINITY).is_err());
    }
}
