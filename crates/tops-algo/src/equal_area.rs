//! Equal-Area Criterion for First-Swing Transient Stability
//!
//! A machine running at mechanical power P_m on the power-angle curve
//! `P_e(δ) = sin δ · |E|·|Vs| / x_dt` is hit by a fault that drops the
//! electrical output to P_e,sc until the fault is cleared at δ_clear.
//!
//! ```text
//!  P ▲          ╭──────╮  P_e(δ)
//!    │        ╱ ░░░░░░░░╲
//!P_m ┼──────╱──░░A2░░░░░░╲────
//!    │ ▓▓▓▓▓▓▓│            ╲
//!    │ ▓▓A1▓▓▓│             ╲
//!P_sc┼─┴──────┴──────────────┴──▶ δ
//!      δ_0   δ_clear        δ_end
//! ```
//!
//! - A1 = (P_m − P_e,sc)·(δ_clear − δ_0) is the kinetic energy gained while
//!   the fault is on.
//! - A2 = ∫ P_e dδ − P_m·(δ_end − δ_clear) over [δ_clear, δ_end] is the
//!   energy the post-fault network can absorb before the rotor passes the
//!   unstable equilibrium δ_end.
//!
//! The first swing is stable iff A2 ≥ A1.
//!
//! ## Algorithm
//!
//! 1. δ_0: Brent root of P_e(δ) − P_m on the stable branch [−π/2, π/2]
//! 2. δ_end: Brent root of the same equation on the decelerating branch [π/2, π]
//! 3. A2 by adaptive quadrature of P_e over [δ_clear, δ_end]
//! 4. Verdict from the areas, or an explicit instability reason
//!
//! ## References
//!
//! - Machowski, Bialek & Bumby (2008): "Power System Dynamics: Stability and
//!   Control", 2nd ed., section 5.4. Wiley.

use crate::numeric::{bracketed_root, integrate, QuadratureSettings, RootFinderSettings};
use serde::{Deserialize, Serialize};
use std::f64::consts::{FRAC_PI_2, PI};
use std::fmt;
use tops_core::{PowerAngleCurve, StabilityAreas, TopsError, TopsResult};
use tracing::{debug, warn};

/// Electrical power transferred at rotor angle `delta`.
///
/// Fails with [`TopsError::Domain`] for a zero, negative or non-finite
/// reactance.
pub fn power_curve(delta: f64, e: f64, vs: f64, x_dt: f64) -> TopsResult<f64> {
    Ok(PowerAngleCurve::new(e, vs, x_dt)?.power(delta))
}

/// Why a first swing is lost.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InstabilityReason {
    /// P_e never returns to P_m below δ = π after the fault
    NoPostFaultEquilibrium,
    /// The fault is cleared at or beyond the unstable equilibrium δ_end
    ClearedBeyondEquilibrium,
    /// The decelerating area A2 is smaller than the accelerating area A1
    InsufficientDeceleratingArea,
}

impl fmt::Display for InstabilityReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            InstabilityReason::NoPostFaultEquilibrium => "no post-fault equilibrium below π",
            InstabilityReason::ClearedBeyondEquilibrium => {
                "fault cleared beyond the unstable equilibrium"
            }
            InstabilityReason::InsufficientDeceleratingArea => "decelerating area A2 < A1",
        };
        f.write_str(text)
    }
}

/// Outcome of the first-swing check. Instability is a result, not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", tag = "verdict", content = "reason")]
pub enum StabilityVerdict {
    Stable,
    Unstable(InstabilityReason),
}

impl StabilityVerdict {
    pub fn is_stable(&self) -> bool {
        matches!(self, StabilityVerdict::Stable)
    }
}

impl fmt::Display for StabilityVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StabilityVerdict::Stable => f.write_str("stable"),
            StabilityVerdict::Unstable(reason) => write!(f, "unstable ({reason})"),
        }
    }
}

/// Full result of [`EqualAreaCriterion::assess`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EqualAreaAssessment {
    pub delta_0: f64,
    pub delta_clear: f64,
    /// Unstable post-fault equilibrium; `None` if there is none below π
    pub delta_end: Option<f64>,
    /// Accelerating and decelerating areas; `None` without δ_end
    pub areas: Option<StabilityAreas>,
    pub verdict: StabilityVerdict,
}

/// Equal-area analysis of one machine on one power-angle curve.
#[derive(Debug, Clone, PartialEq)]
pub struct EqualAreaCriterion {
    curve: PowerAngleCurve,
    mechanical_power: f64,
    root_finder: RootFinderSettings,
    quadrature: QuadratureSettings,
}

impl EqualAreaCriterion {
    /// `p_m` is the mechanical input power; `e`, `vs`, `x_dt` define the
    /// post-fault power-angle curve.
    pub fn new(p_m: f64, e: f64, vs: f64, x_dt: f64) -> TopsResult<Self> {
        Self::from_curve(PowerAngleCurve::new(e, vs, x_dt)?, p_m)
    }

    pub fn from_curve(curve: PowerAngleCurve, p_m: f64) -> TopsResult<Self> {
        if !p_m.is_finite() {
            return Err(TopsError::domain(format!(
                "mechanical power must be finite, got P_m = {p_m}"
            )));
        }
        Ok(Self {
            curve,
            mechanical_power: p_m,
            root_finder: RootFinderSettings::default(),
            quadrature: QuadratureSettings::default(),
        })
    }

    pub fn with_root_finder(mut self, settings: RootFinderSettings) -> Self {
        self.root_finder = settings;
        self
    }

    pub fn with_quadrature(mut self, settings: QuadratureSettings) -> Self {
        self.quadrature = settings;
        self
    }

    pub fn curve(&self) -> &PowerAngleCurve {
        &self.curve
    }

    pub fn mechanical_power(&self) -> f64 {
        self.mechanical_power
    }

    fn mismatch(&self, delta: f64) -> TopsResult<f64> {
        Ok(self.curve.power(delta) - self.mechanical_power)
    }

    /// Pre-fault stable equilibrium δ_0 on [−π/2, π/2].
    ///
    /// Fails with [`TopsError::Convergence`] when P_m lies outside ±P_max, as
    /// the machine then has no operating point at all.
    pub fn find_delta_0(&self) -> TopsResult<f64> {
        let root = bracketed_root(
            |delta| self.mismatch(delta),
            -FRAC_PI_2,
            FRAC_PI_2,
            &self.root_finder,
        )?;
        root.ok_or_else(|| {
            TopsError::convergence(format!(
                "no stable equilibrium: P_m = {} exceeds P_max = {}",
                self.mechanical_power,
                self.curve.p_max()
            ))
        })
    }

    /// Unstable post-fault equilibrium δ_end on [π/2, π).
    ///
    /// `Ok(None)` when the curve does not come back down to P_m below π.
    pub fn find_delta_end(&self) -> TopsResult<Option<f64>> {
        let root = bracketed_root(
            |delta| self.mismatch(delta),
            FRAC_PI_2,
            PI,
            &self.root_finder,
        )?;
        Ok(root.filter(|delta| *delta < PI))
    }

    /// ∫ P_e(δ) dδ over [δ_start, δ_end].
    pub fn integrate_power_curve(&self, delta_start: f64, delta_end: f64) -> TopsResult<f64> {
        let result = integrate(
            |delta| self.curve.power(delta),
            delta_start,
            delta_end,
            &self.quadrature,
        )?;
        debug!(
            delta_start,
            delta_end,
            value = result.value,
            error_estimate = result.error_estimate,
            subdivisions = result.subdivisions,
            "integrated power curve"
        );
        Ok(result.value)
    }

    /// Accelerating area A1 and decelerating area A2.
    pub fn compute_areas(
        &self,
        delta_clear: f64,
        p_e_sc: f64,
        delta_0: f64,
        delta_end: f64,
    ) -> TopsResult<StabilityAreas> {
        let p_m = self.mechanical_power;
        let a1 = (p_m - p_e_sc) * (delta_clear - delta_0);
        let a2 = self.integrate_power_curve(delta_clear, delta_end)?
            - p_m * (delta_end - delta_clear);
        Ok(StabilityAreas { a1, a2 })
    }

    /// Clearing at `delta_clear` with fault-on power `p_e_sc`: is the first
    /// swing stable?
    pub fn assess(&self, delta_clear: f64, p_e_sc: f64) -> TopsResult<EqualAreaAssessment> {
        if !(delta_clear.is_finite() && p_e_sc.is_finite()) {
            return Err(TopsError::domain(format!(
                "clearing angle and fault-on power must be finite, got δ_clear = {delta_clear}, P_e_sc = {p_e_sc}"
            )));
        }
        let delta_0 = self.find_delta_0()?;
        if delta_clear < delta_0 {
            return Err(TopsError::domain(format!(
                "clearing angle {delta_clear:.4} rad lies before the pre-fault equilibrium {delta_0:.4} rad"
            )));
        }

        let Some(delta_end) = self.find_delta_end()? else {
            warn!(
                p_m = self.mechanical_power,
                p_max = self.curve.p_max(),
                "no post-fault equilibrium below π"
            );
            return Ok(EqualAreaAssessment {
                delta_0,
                delta_clear,
                delta_end: None,
                areas: None,
                verdict: StabilityVerdict::Unstable(InstabilityReason::NoPostFaultEquilibrium),
            });
        };

        let areas = self.compute_areas(delta_clear, p_e_sc, delta_0, delta_end)?;
        let verdict = if delta_clear >= delta_end {
            StabilityVerdict::Unstable(InstabilityReason::ClearedBeyondEquilibrium)
        } else if areas.a2 >= areas.a1 {
            StabilityVerdict::Stable
        } else {
            StabilityVerdict::Unstable(InstabilityReason::InsufficientDeceleratingArea)
        };
        debug!(delta_0, delta_end, a1 = areas.a1, a2 = areas.a2, %verdict, "equal-area verdict");

        Ok(EqualAreaAssessment {
            delta_0,
            delta_clear,
            delta_end: Some(delta_end),
            areas: Some(areas),
            verdict,
        })
    }

    /// Clearing angle at which A1 = A2.
    ///
    /// `None` when there is no post-fault equilibrium, or when every clearing
    /// angle between δ_0 and δ_end is stable (P_e,sc ≥ P_m).
    pub fn critical_clearing_angle(&self, p_e_sc: f64) -> TopsResult<Option<f64>> {
        if !p_e_sc.is_finite() {
            return Err(TopsError::domain(format!(
                "fault-on power must be finite, got P_e_sc = {p_e_sc}"
            )));
        }
        if p_e_sc >= self.mechanical_power {
            return Ok(None);
        }
        let delta_0 = self.find_delta_0()?;
        let Some(delta_end) = self.find_delta_end()? else {
            return Ok(None);
        };
        if delta_end <= delta_0 {
            return Ok(None);
        }

        bracketed_root(
            |delta_clear| {
                let areas = self.compute_areas(delta_clear, p_e_sc, delta_0, delta_end)?;
                Ok(areas.margin())
            },
            delta_0,
            delta_end,
            &self.root_finder,
        )
    }
}
