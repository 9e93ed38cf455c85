//! Fixed-step equilibrium search.
//!
//! Both the autorotation-RPM search and the service-ceiling search are the same
//! 1-D problem: set a scalar parameter, re-run the whole model, pull a residual
//! out of the result and stop once it is small enough.
//!
//! [`SearchMode::Linear`] walks `start + k·step` and stops at the first trial
//! that meets the [`Convergence`] criterion. It assumes a single crossing in the
//! walking direction; there is no bracketing, so the iteration cap is what stops
//! a search pointed the wrong way.
//!
//! [`SearchMode::Bisection`] walks the same grid only until the residual changes
//! sign, then bisects that interval. Same budget, far fewer model evaluations
//! when `step` is coarse.

use log::{debug, trace, warn};
use serde::{Deserialize, Serialize};

use crate::error::{finite, AnalysisError, AnalysisResult};

/// When a residual counts as converged.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Convergence {
    /// |r| ≤ tolerance
    #[default]
    Magnitude,
    /// r ≤ tolerance (signed; any overshoot past the crossing also converges)
    AtOrBelow,
}

impl Convergence {
    #[inline]
    pub fn is_met(self, residual: f64, tolerance: f64) -> bool {
        match self {
            Self::Magnitude => residual.abs() <= tolerance,
            Self::AtOrBelow => residual <= tolerance,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SearchMode {
    /// Walk the grid until the criterion is met.
    #[default]
    Linear,
    /// Walk until the residual changes sign, then bisect. The bisection phase
    /// always converges on |r| ≤ tolerance.
    Bisection,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SearchOptions {
    /// Signed parameter increment per trial.
    pub step: f64,
    pub tolerance: f64,
    /// Budget of model evaluations (both phases for bisection).
    pub max_iterations: usize,
    pub criterion: Convergence,
    pub mode: SearchMode,
}

impl SearchOptions {
    pub fn validate(&self) -> AnalysisResult<()> {
        if !self.step.is_finite() || self.step == 0.0 {
            return Err(AnalysisError::config(format!("search step must be finite and non-zero, got {}", self.step)));
        }
        if !self.tolerance.is_finite() || self.tolerance <= 0.0 {
            return Err(AnalysisError::config(format!("search tolerance must be positive, got {}", self.tolerance)));
        }
        if self.max_iterations == 0 {
            return Err(AnalysisError::config("search needs at least one iteration"));
        }
        Ok(())
    }
}

/// Outcome of a search. `NotConverged` is an expected result, not an error.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub enum Equilibrium<S> {
    Converged {
        parameter: f64,
        residual: f64,
        iterations: usize,
        /// Model output at `parameter`.
        state: S,
    },
    NotConverged {
        last_parameter: f64,
        last_residual: f64,
        iterations: usize,
        state: S,
    },
}

impl<S> Equilibrium<S> {
    pub fn is_converged(&self) -> bool {
        matches!(self, Self::Converged { .. })
    }

    /// The converged parameter, if any.
    pub fn parameter(&self) -> Option<f64> {
        match self {
            Self::Converged { parameter, .. } => Some(*parameter),
            Self::NotConverged { .. } => None,
        }
    }

    /// Last evaluated parameter, converged or not.
    pub fn last_parameter(&self) -> f64 {
        match self {
            Self::Converged { parameter, .. } => *parameter,
            Self::NotConverged { last_parameter, .. } => *last_parameter,
        }
    }

    pub fn residual(&self) -> f64 {
        match self {
            Self::Converged { residual, .. } => *residual,
            Self::NotConverged { last_residual, .. } => *last_residual,
        }
    }

    pub fn iterations(&self) -> usize {
        match self {
            Self::Converged { iterations, .. } | Self::NotConverged { iterations, .. } => *iterations,
        }
    }

    pub fn state(&self) -> &S {
        match self {
            Self::Converged { state, .. } | Self::NotConverged { state, .. } => state,
        }
    }

    pub fn into_state(self) -> S {
        match self {
            Self::Converged { state, .. } | Self::NotConverged { state, .. } => state,
        }
    }
}

/// One model evaluation.
struct Trial<S> {
    parameter: f64,
    residual: f64,
    state: S,
}

impl<S> Trial<S> {
    fn converged(self, iterations: usize) -> Equilibrium<S> {
        debug!("search converged at {} (residual {:.6}, {} evaluations)", self.parameter, self.residual, iterations);
        Equilibrium::Converged { parameter: self.parameter, residual: self.residual, iterations, state: self.state }
    }

    fn exhausted(self, iterations: usize) -> Equilibrium<S> {
        warn!(
            "search gave up after {} evaluations at {} (residual {:.6})",
            iterations, self.parameter, self.residual
        );
        Equilibrium::NotConverged {
            last_parameter: self.parameter,
            last_residual: self.residual,
            iterations,
            state: self.state,
        }
    }
}

/// Search for the parameter at which `residual(evaluate(p))` converges,
/// starting at `start`.
///
/// Model errors abort the search and are returned as-is. A non-finite residual
/// is a `NonFinite` domain error whose index is the trial number.
pub fn search<S, M, R>(mut evaluate: M, residual: R, start: f64, opts: &SearchOptions) -> AnalysisResult<Equilibrium<S>>
where
    M: FnMut(f64) -> AnalysisResult<S>,
    R: Fn(&S) -> f64,
{
    opts.validate()?;
    if !start.is_finite() {
        return Err(AnalysisError::config(format!("search start must be finite, got {start}")));
    }
    debug!(
        "{:?} search from {} (step {}, tol {}, max {} evaluations)",
        opts.mode, start, opts.step, opts.tolerance, opts.max_iterations
    );

    let mut count = 0usize;
    let mut run = |parameter: f64| -> AnalysisResult<Trial<S>> {
        let state = evaluate(parameter)?;
        let r = finite(count, "search residual", residual(&state))?;
        count += 1;
        trace!("trial {count}: parameter {parameter} residual {r}");
        Ok(Trial { parameter, residual: r, state })
    };

    // Grid points come from the trial index, not a running sum, so long walks
    // do not drift.
    let grid = |k: usize| start + k as f64 * opts.step;

    match opts.mode {
        SearchMode::Linear => {
            let mut trial = run(grid(0))?;
            let mut k = 1;
            loop {
                if opts.criterion.is_met(trial.residual, opts.tolerance) {
                    return Ok(trial.converged(k));
                }
                if k >= opts.max_iterations {
                    return Ok(trial.exhausted(k));
                }
                trial = run(grid(k))?;
                k += 1;
            }
        }
        SearchMode::Bisection => {
            let tol = opts.tolerance;
            let mut prev = run(grid(0))?;
            let mut k = 1;
            if prev.residual.abs() <= tol {
                return Ok(prev.converged(k));
            }

            // Bracket.
            let next = loop {
                if k >= opts.max_iterations {
                    return Ok(prev.exhausted(k));
                }
                let cur = run(grid(k))?;
                k += 1;
                if cur.residual.abs() <= tol {
                    return Ok(cur.converged(k));
                }
                if cur.residual.signum() != prev.residual.signum() {
                    break cur;
                }
                prev = cur;
            };
            debug!("bracketed sign change in [{}, {}]", prev.parameter, next.parameter);

            // Bisect.
            let (mut lo, mut hi) = (prev, next);
            loop {
                if k >= opts.max_iterations {
                    let best = if lo.residual.abs() <= hi.residual.abs() { lo } else { hi };
                    return Ok(best.exhausted(k));
                }
                let mid = run(0.5 * (lo.parameter + hi.parameter))?;
                k += 1;
                if mid.residual.abs() <= tol {
                    return Ok(mid.converged(k));
                }
                if mid.residual.signum() == lo.residual.signum() {
                    lo = mid;
                } else {
                    hi = mid;
                }
            }
        }
    }
}

/* -------------------------------- tests -------------------------------- */

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DomainViolation;
    use approx::assert_abs_diff_eq;

    fn opts(step: f64, tolerance: f64, max_iterations: usize) -> SearchOptions {
        SearchOptions { step, tolerance, max_iterations, criterion: Convergence::Magnitude, mode: SearchMode::Linear }
    }

    // f(x) = x - 2.5, root at 2.5
    fn line(x: f64) -> AnalysisResult<f64> {
        Ok(x - 2.5)
    }

    #[test]
    fn linear_walks_to_the_root() {
        let eq = search(line, |r| *r, 0.0, &opts(0.001, 0.01, 100_000)).unwrap();
        let p = eq.parameter().unwrap();
        assert!(eq.is_converged());
        assert_abs_diff_eq!(p, 2.49, epsilon = 1e-9);
        assert!(eq.residual().abs() <= 0.01);
        assert_eq!(eq.iterations(), 2491);
        assert_abs_diff_eq!(*eq.state(), p - 2.5, epsilon = 1e-12);
    }

    #[test]
    fn converged_at_start_costs_one_evaluation() {
        let eq = search(line, |r| *r, 2.5, &opts(1.0, 0.01, 10)).unwrap();
        assert_eq!(eq.iterations(), 1);
        assert_eq!(eq.parameter(), Some(2.5));
    }

    #[test]
    fn signed_criterion_accepts_overshoot() {
        // Decreasing residual, stop as soon as it drops to tol.
        let mut o = opts(1.0, 0.01, 100);
        o.criterion = Convergence::AtOrBelow;
        let eq = search(|x: f64| Ok(10.0 - x), |r| *r, 0.5, &o).unwrap();
        // 0.5, 1.5, ... 10.5 is the first grid point with r ≤ 0.01
        assert_abs_diff_eq!(eq.parameter().unwrap(), 10.5);
        assert_abs_diff_eq!(eq.residual(), -0.5);
    }

    #[test]
    fn wrong_direction_hits_the_cap() {
        let eq = search(line, |r| *r, 0.0, &opts(-0.5, 0.01, 50)).unwrap();
        assert!(!eq.is_converged());
        assert_eq!(eq.parameter(), None);
        assert_eq!(eq.iterations(), 50);
        assert_abs_diff_eq!(eq.last_parameter(), -24.5);
        assert_abs_diff_eq!(eq.residual(), -27.0);
    }

    #[test]
    fn bisection_matches_linear_with_fewer_evaluations() {
        let mut o = opts(0.7, 0.01, 200);
        o.mode = SearchMode::Bisection;
        let eq = search(line, |r| *r, 0.0, &o).unwrap();
        assert!(eq.is_converged());
        assert_abs_diff_eq!(eq.parameter().unwrap(), 2.5, epsilon = 0.01);
        assert!(eq.iterations() < 20, "took {}", eq.iterations());
    }

    #[test]
    fn bisection_respects_the_budget() {
        let mut o = opts(0.7, 1e-12, 8);
        o.mode = SearchMode::Bisection;
        let eq = search(line, |r| *r, 0.0, &o).unwrap();
        assert!(!eq.is_converged());
        assert_eq!(eq.iterations(), 8);
        assert!(eq.residual().abs() < 0.7);
    }

    #[test]
    fn model_errors_abort() {
        let failing = |x: f64| {
            if x > 1.0 {
                Err(AnalysisError::domain(0, DomainViolation::ZeroRelativeVelocity))
            } else {
                Ok(x - 2.5)
            }
        };
        let err = search(failing, |r| *r, 0.0, &opts(0.5, 0.01, 100)).unwrap_err();
        assert!(matches!(err, AnalysisError::Domain { .. }));
    }

    #[test]
    fn nan_residual_is_reported() {
        let err = search(|_| Ok(f64::NAN), |r| *r, 0.0, &opts(0.5, 0.01, 100)).unwrap_err();
        assert!(matches!(err, AnalysisError::Domain { index: 0, violation: DomainViolation::NonFinite { .. } }));
    }

    #[test]
    fn invalid_options() {
        assert!(search(line, |r| *r, 0.0, &opts(0.0, 0.01, 10)).is_err());
        assert!(search(line, |r| *r, 0.0, &opts(0.1, 0.0, 10)).is_err());
        assert!(search(line, |r| *r, 0.0, &opts(0.1, 0.01, 0)).is_err());
        assert!(search(line, |r| *r, f64::NAN, &opts(0.1, 0.01, 10)).is_err());
    }
}
