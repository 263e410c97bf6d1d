//! Bracketed scalar root finding with Brent's method.
//!
//! Wraps argmin's [`BrentRoot`] so that callers get a [`TopsResult`] with a
//! clear split between the three possible outcomes:
//!
//! | Outcome                         | Return value                     |
//! |---------------------------------|----------------------------------|
//! | root found within tolerance     | `Ok(Some(x))`                    |
//! | no sign change over the bracket | `Ok(None)`                       |
//! | iteration budget exhausted      | `Err(TopsError::Convergence)`    |
//!
//! A bracket without a sign change is not a solver failure. The equal-area
//! analysis, for example, turns a missing post-fault equilibrium into an
//! instability verdict rather than an error.
//!
//! ## References
//!
//! - Brent (1973): "Algorithms for Minimization without Derivatives", ch. 4.
//!   Prentice-Hall.

use argmin::core::{CostFunction, Executor, State, TerminationReason};
use argmin::solver::brent::BrentRoot;
use serde::{Deserialize, Serialize};
use tops_core::{TopsError, TopsResult};
use tracing::debug;

/// Tolerance and iteration budget for [`bracketed_root`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RootFinderSettings {
    /// Absolute tolerance on the root location
    pub tolerance: f64,
    /// Maximum Brent iterations before giving up
    pub max_iterations: u64,
}

impl Default for RootFinderSettings {
    fn default() -> Self {
        Self {
            tolerance: 1e-10,
            max_iterations: 100,
        }
    }
}

impl RootFinderSettings {
    pub fn with_tolerance(mut self, tol: f64) -> Self {
        self.tolerance = tol;
        self
    }

    pub fn with_max_iterations(mut self, max_iter: u64) -> Self {
        self.max_iterations = max_iter;
        self
    }

    pub fn validate(&self) -> TopsResult<()> {
        if !(self.tolerance.is_finite() && self.tolerance > 0.0) {
            return Err(TopsError::Config(format!(
                "root finder tolerance must be positive, got {}",
                self.tolerance
            )));
        }
        if self.max_iterations == 0 {
            return Err(TopsError::Config(
                "root finder needs at least one iteration".to_string(),
            ));
        }
        Ok(())
    }
}

/// Adapter exposing a fallible scalar function to argmin.
struct ScalarEquation<F> {
    f: F,
}

impl<F> CostFunction for ScalarEquation<F>
where
    F: Fn(f64) -> TopsResult<f64>,
{
    type Param = f64;
    type Output = f64;

    fn cost(&self, x: &Self::Param) -> Result<Self::Output, argmin::core::Error> {
        let value = (self.f)(*x)?;
        if !value.is_finite() {
            return Err(TopsError::domain(format!("equation is not finite at x = {x}")).into());
        }
        Ok(value)
    }
}

/// Find a root of `f` in `[lower, upper]`.
///
/// Endpoints that are exact roots are returned directly. See the module docs
/// for the meaning of each outcome.
pub fn bracketed_root<F>(
    f: F,
    lower: f64,
    upper: f64,
    settings: &RootFinderSettings,
) -> TopsResult<Option<f64>>
where
    F: Fn(f64) -> TopsResult<f64>,
{
    settings.validate()?;
    if !(lower.is_finite() && upper.is_finite()) || lower >= upper {
        return Err(TopsError::domain(format!(
            "invalid root bracket [{lower}, {upper}]"
        )));
    }

    let f_lower = f(lower)?;
    let f_upper = f(upper)?;
    if !(f_lower.is_finite() && f_upper.is_finite()) {
        return Err(TopsError::domain(format!(
            "equation is not finite at the bracket ends: f({lower}) = {f_lower}, f({upper}) = {f_upper}"
        )));
    }
    if f_lower == 0.0 {
        return Ok(Some(lower));
    }
    if f_upper == 0.0 {
        return Ok(Some(upper));
    }
    if f_lower.signum() == f_upper.signum() {
        debug!(lower, upper, f_lower, f_upper, "no sign change over bracket");
        return Ok(None);
    }

    let solver = BrentRoot::new(lower, upper, settings.tolerance);
    let result = Executor::new(ScalarEquation { f }, solver)
        .configure(|state| state.max_iters(settings.max_iterations))
        .run()?;

    let state = result.state();
    let iterations = state.get_iter();
    match state.get_termination_reason() {
        Some(TerminationReason::SolverConverged) => {}
        reason => {
            return Err(TopsError::convergence(format!(
                "Brent root search on [{lower}, {upper}] stopped after {iterations} iterations ({reason:?})"
            )));
        }
    }

    let root = state.get_param().copied().ok_or_else(|| {
        TopsError::convergence(format!(
            "Brent root search on [{lower}, {upper}] produced no estimate"
        ))
    })?;
    debug!(root, iterations, "Brent root search converged");
    Ok(Some(root))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_square_root_of_two() {
        let root = bracketed_root(|x| Ok(x * x - 2.0), 0.0, 2.0, &RootFinderSettings::default())
            .unwrap()
            .unwrap();
        assert!((root - 2f64.sqrt()).abs() < 1e-9);
    }

    #[test]
    fn missing_sign_change_is_not_an_error() {
        let root =
            bracketed_root(|x| Ok(x * x + 1.0), -1.0, 1.0, &RootFinderSettings::default()).unwrap();
        assert!(root.is_none());
    }

    #[test]
    fn exact_endpoint_root_is_returned() {
        let root = bracketed_root(|x| Ok(x.sin()), 0.0, 1.0, &RootFinderSettings::default())
            .unwrap();
        assert_eq!(root, Some(0.0));
    }

    #[test]
    fn exhausted_budget_is_convergence_error() {
        let settings = RootFinderSettings::default()
            .with_tolerance(1e-14)
            .with_max_iterations(2);
        let err = bracketed_root(|x| Ok(x.powi(3) - 0.3), -3.0, 5.0, &settings).unwrap_err();
        assert!(matches!(err, TopsError::Convergence(_)), "{err}");
    }

    #[test]
    fn equation_errors_propagate() {
        let inside = bracketed_root(
            |x| {
                if x > 0.5 {
                    Err(TopsError::domain("outside model range"))
                } else {
                    Ok(x - 0.25)
                }
            },
            0.0,
            0.4,
            &RootFinderSettings::default(),
        );
        assert!((inside.unwrap().unwrap() - 0.25).abs() < 1e-9);

        let err = bracketed_root(
            |_| Err(TopsError::domain("zero reactance")),
            0.0,
            1.0,
            &RootFinderSettings::default(),
        )
        .unwrap_err();
        assert!(matches!(err, TopsError::Domain(_)));
    }

    #[test]
    fn invalid_settings_are_rejected() {
        let settings = RootFinderSettings::default().with_tolerance(0.0);
        let err = bracketed_root(|x| Ok(x), -1.0, 1.0, &settings).unwrap_err();
        assert!(matches!(err, TopsError::Config(_)));
    }
}
