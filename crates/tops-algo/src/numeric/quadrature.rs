//! Globally adaptive quadrature over a finite interval.
//!
//! The driver keeps a list of segments, always bisects the one with the largest
//! error estimate, and stops once the summed estimate is within
//! `max(abs_tol, rel_tol·|I|)`. Two local rules are available:
//!
//! - [`QuadratureKind::GaussKronrod`]: 7-point Gauss / 15-point Kronrod pair,
//!   error = |K15 − G7|. Default; matches QUADPACK's QAG with key 1.
//! - [`QuadratureKind::Simpson`]: Simpson's rule on the segment and on its two
//!   halves, error = |S₂ − S₁|/15 with Richardson correction.
//!
//! The subdivision budget is hard: when it runs out before the tolerance is met
//! the integral is reported as [`TopsError::Convergence`], never returned as a
//! best guess. A non-finite integrand value is a [`TopsError::Domain`].
//!
//! ## References
//!
//! - Piessens, de Doncker-Kapenga, Überhuber & Kahaner (1983): "QUADPACK: A
//!   Subroutine Package for Automatic Integration". Springer.
//!   DOI: [10.1007/978-3-642-61786-7](https://doi.org/10.1007/978-3-642-61786-7)

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tops_core::{TopsError, TopsResult};
use tracing::debug;

/// Kronrod abscissae on [-1, 1]; odd indices are the 7-point Gauss nodes.
const XGK: [f64; 8] = [
    0.991_455_371_120_812_6,
    0.949_107_912_342_758_5,
    0.864_864_423_359_769_1,
    0.741_531_185_599_394_4,
    0.586_087_235_467_691_1,
    0.405_845_151_377_397_2,
    0.207_784_955_007_898_5,
    0.0,
];

const WGK: [f64; 8] = [
    0.022_935_322_010_529_22,
    0.063_092_092_629_978_55,
    0.104_790_010_322_250_2,
    0.140_653_259_715_525_9,
    0.169_004_726_639_267_9,
    0.190_350_578_064_785_4,
    0.204_432_940_075_298_9,
    0.209_482_141_084_727_8,
];

const WG: [f64; 4] = [
    0.129_484_966_168_869_7,
    0.279_705_391_489_276_7,
    0.381_830_050_505_118_9,
    0.417_959_183_673_469_4,
];

/// Tolerances and budget for adaptive integration.
///
/// Defaults follow the usual QUADPACK driver settings (ε ≈ 1.49e-8, 50
/// subdivisions).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuadratureSettings {
    pub abs_tol: f64,
    pub rel_tol: f64,
    /// Maximum number of bisections
    pub max_subdivisions: usize,
    pub kind: QuadratureKind,
}

impl Default for QuadratureSettings {
    fn default() -> Self {
        Self {
            abs_tol: 1.49e-8,
            rel_tol: 1.49e-8,
            max_subdivisions: 50,
            kind: QuadratureKind::GaussKronrod,
        }
    }
}

impl QuadratureSettings {
    pub fn with_kind(mut self, kind: QuadratureKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_tolerances(mut self, abs_tol: f64, rel_tol: f64) -> Self {
        self.abs_tol = abs_tol;
        self.rel_tol = rel_tol;
        self
    }

    pub fn with_max_subdivisions(mut self, max: usize) -> Self {
        self.max_subdivisions = max;
        self
    }

    pub fn validate(&self) -> TopsResult<()> {
        let valid_tol = |t: f64| t.is_finite() && t >= 0.0;
        if !valid_tol(self.abs_tol) || !valid_tol(self.rel_tol) {
            return Err(TopsError::Config(format!(
                "quadrature tolerances must be non-negative, got abs_tol = {}, rel_tol = {}",
                self.abs_tol, self.rel_tol
            )));
        }
        if self.abs_tol == 0.0 && self.rel_tol == 0.0 {
            return Err(TopsError::Config(
                "at least one of abs_tol and rel_tol must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// Local rule used inside the adaptive driver.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum QuadratureKind {
    #[default]
    GaussKronrod,
    Simpson,
}

impl FromStr for QuadratureKind {
    type Err = TopsError;

    fn from_str(input: &str) -> TopsResult<Self> {
        match input.to_ascii_lowercase().as_str() {
            "gauss-kronrod" | "gk15" | "default" => Ok(QuadratureKind::GaussKronrod),
            "simpson" => Ok(QuadratureKind::Simpson),
            other => Err(TopsError::Config(format!(
                "unknown quadrature rule '{}'; supported values: {}",
                other,
                Self::available().join(", ")
            ))),
        }
    }
}

impl QuadratureKind {
    pub fn available() -> &'static [&'static str] {
        &["gauss-kronrod", "simpson"]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            QuadratureKind::GaussKronrod => "gauss-kronrod",
            QuadratureKind::Simpson => "simpson",
        }
    }

    /// (value, error estimate, function evaluations) on [a, b].
    fn estimate<F: Fn(f64) -> f64>(self, f: &F, a: f64, b: f64) -> (f64, f64, usize) {
        match self {
            QuadratureKind::GaussKronrod => gauss_kronrod_15(f, a, b),
            QuadratureKind::Simpson => simpson_pair(f, a, b),
        }
    }
}

/// Converged integral with its bookkeeping.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QuadratureResult {
    pub value: f64,
    pub error_estimate: f64,
    pub evaluations: usize,
    pub subdivisions: usize,
}

fn gauss_kronrod_15<F: Fn(f64) -> f64>(f: &F, a: f64, b: f64) -> (f64, f64, usize) {
    let center = 0.5 * (a + b);
    let half = 0.5 * (b - a);
    let fc = f(center);

    let mut gauss = fc * WG[3];
    let mut kronrod = fc * WGK[7];

    for j in 0..3 {
        let k = 2 * j + 1;
        let dx = half * XGK[k];
        let pair = f(center - dx) + f(center + dx);
        gauss += WG[j] * pair;
        kronrod += WGK[k] * pair;
    }
    for j in 0..4 {
        let k = 2 * j;
        let dx = half * XGK[k];
        kronrod += WGK[k] * (f(center - dx) + f(center + dx));
    }

    let value = kronrod * half;
    let error = ((kronrod - gauss) * half).abs();
    (value, error, 15)
}

fn simpson_pair<F: Fn(f64) -> f64>(f: &F, a: f64, b: f64) -> (f64, f64, usize) {
    let m = 0.5 * (a + b);
    let (lm, rm) = (0.5 * (a + m), 0.5 * (m + b));
    let (fa, fb, fm, flm, frm) = (f(a), f(b), f(m), f(lm), f(rm));

    let h = b - a;
    let whole = h / 6.0 * (fa + 4.0 * fm + fb);
    let halves = h / 12.0 * (fa + 4.0 * flm + 2.0 * fm + 4.0 * frm + fb);
    let diff = halves - whole;
    (halves + diff / 15.0, diff.abs() / 15.0, 5)
}

#[derive(Debug, Clone, Copy)]
struct Segment {
    a: f64,
    b: f64,
    value: f64,
    error: f64,
}

/// Integrate `f` over `[a, b]` (either orientation).
pub fn integrate<F>(f: F, a: f64, b: f64, settings: &QuadratureSettings) -> TopsResult<QuadratureResult>
where
    F: Fn(f64) -> f64,
{
    settings.validate()?;
    if !(a.is_finite() && b.is_finite()) {
        return Err(TopsError::domain(format!(
            "integration limits must be finite, got [{a}, {b}]"
        )));
    }
    if a == b {
        return Ok(QuadratureResult {
            value: 0.0,
            error_estimate: 0.0,
            evaluations: 0,
            subdivisions: 0,
        });
    }
    if a > b {
        let flipped = integrate(f, b, a, settings)?;
        return Ok(QuadratureResult {
            value: -flipped.value,
            ..flipped
        });
    }

    let kind = settings.kind;
    let evaluate = |lo: f64, hi: f64| -> TopsResult<(Segment, usize)> {
        let (value, error, evals) = kind.estimate(&f, lo, hi);
        if !(value.is_finite() && error.is_finite()) {
            return Err(TopsError::domain(format!(
                "integrand is not finite on [{lo}, {hi}]"
            )));
        }
        Ok((Segment { a: lo, b: hi, value, error }, evals))
    };

    let (first, mut evaluations) = evaluate(a, b)?;
    let mut segments = vec![first];
    let mut subdivisions = 0;

    loop {
        let total: f64 = segments.iter().map(|s| s.value).sum();
        let error: f64 = segments.iter().map(|s| s.error).sum();
        let target = settings.abs_tol.max(settings.rel_tol * total.abs());

        if error <= target {
            debug!(
                rule = kind.as_str(),
                value = total,
                error,
                subdivisions,
                "quadrature converged"
            );
            return Ok(QuadratureResult {
                value: total,
                error_estimate: error,
                evaluations,
                subdivisions,
            });
        }
        if subdivisions >= settings.max_subdivisions {
            return Err(TopsError::convergence(format!(
                "{} quadrature on [{a}, {b}] reached {} subdivisions with error estimate {error:.3e} (target {target:.3e})",
                kind.as_str(),
                settings.max_subdivisions
            )));
        }

        let (worst, _) = segments
            .iter()
            .enumerate()
            .max_by(|(_, x), (_, y)| x.error.total_cmp(&y.error))
            .ok_or_else(|| TopsError::Other("quadrature segment list is empty".to_string()))?;
        let split = segments.swap_remove(worst);
        let mid = 0.5 * (split.a + split.b);

        let (left, left_evals) = evaluate(split.a, mid)?;
        let (right, right_evals) = evaluate(mid, split.b)?;
        segments.push(left);
        segments.push(right);
        evaluations += left_evals + right_evals;
        subdivisions += 1;
    }
}
