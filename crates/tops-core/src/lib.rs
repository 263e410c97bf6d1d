//! # tops-core: Power System Stability Data Model
//!
//! Provides the value types shared by the stability analyzers in `tops-algo`
//! and the `tops` command-line driver.
//!
//! ## Design Philosophy
//!
//! Every quantity here is a small `Copy` record with no hidden state. The
//! analyzers are pure functions over these records, so two calls with the same
//! inputs always produce the same outputs and nothing needs to be shared or
//! locked.
//!
//! Non-physical inputs are rejected at construction (or by an explicit
//! `validate()`), never silently turned into `inf`/`NaN` further down the line.
//!
//! ## Quick Start
//!
//! ```rust
//! use tops_core::*;
//!
//! // Generator G1 of the Kundur two-area system on its own base
//! let machine = MachineSwingParameters::new(6.5, 0.0, 1.0, 50.0);
//! machine.validate()?;
//!
//! // Single-machine-infinite-bus transient power-angle curve
//! let curve = PowerAngleCurve::new(1.1, 1.0, 0.3)?;
//! assert!((curve.p_max() - 1.1 / 0.3).abs() < 1e-12);
//!
//! // Balanced three-phase voltage at ωt = 0
//! let v = ThreePhaseQuantity::balanced(1.0, 0.0, 0.0);
//! assert!(v.sum().abs() < 1e-12);
//! # Ok::<(), TopsError>(())
//! ```
//!
//! ## Core Data Structures
//!
//! - [`ThreePhaseQuantity`], [`AlphaBetaQuantity`], [`DqQuantity`] - the three
//!   reference frames of the Clarke/Park transforms
//! - [`MachineSwingParameters`] - H, D, K, f_N of the linearized swing equation
//! - [`Eigenvalue`] - a state-matrix eigenvalue with damping and frequency
//! - [`PowerAngleCurve`] / [`StabilityAreas`] - equal-area criterion inputs and outputs
//! - [`PhasorKind`] / [`PhasorDiagram`] - SMIB steady-state phasors
//!
//! ## Modules
//!
//! - [`error`] - [`TopsError`] and [`TopsResult`]
//! - [`solver`] - eigenvalue backends for 2×2 state matrices
//! - [`units`] - newtype wrappers for angles, frequencies and time constants

use num_complex::Complex64;
use serde::{Deserialize, Serialize};
use std::f64::consts::{FRAC_PI_3, PI};
use std::fmt;

pub mod error;
pub mod solver;
pub mod units;

pub use error::{TopsError, TopsResult};
pub use solver::*;
pub use units::{Decibels, Degrees, Hertz, Radians, RadiansPerSecond, Seconds};

// =============================================================================
// Reference-frame quantities
// =============================================================================

/// Instantaneous values of the three phases (volts or amperes).
///
/// No balance invariant is enforced; a balanced set sums to zero.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ThreePhaseQuantity {
    pub a: f64,
    pub b: f64,
    pub c: f64,
}

impl ThreePhaseQuantity {
    pub fn new(a: f64, b: f64, c: f64) -> Self {
        Self { a, b, c }
    }

    /// Positive-sequence balanced set sampled at electrical angle `wt`.
    ///
    /// `a = M·cos(ωt + φ)`, `b = M·cos(ωt − 2π/3 + φ)`, `c = M·cos(ωt + 2π/3 + φ)`
    pub fn balanced(magnitude: f64, wt: f64, phase_shift: f64) -> Self {
        let two_thirds_pi = 2.0 * FRAC_PI_3;
        Self {
            a: magnitude * (wt + phase_shift).cos(),
            b: magnitude * (wt - two_thirds_pi + phase_shift).cos(),
            c: magnitude * (wt + two_thirds_pi + phase_shift).cos(),
        }
    }

    /// a + b + c (zero-sequence content times three)
    pub fn sum(&self) -> f64 {
        self.a + self.b + self.c
    }

    pub fn as_array(&self) -> [f64; 3] {
        [self.a, self.b, self.c]
    }
}

/// Stationary two-axis (α, β) quantity.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct AlphaBetaQuantity {
    pub alpha: f64,
    pub beta: f64,
}

impl AlphaBetaQuantity {
    pub fn new(alpha: f64, beta: f64) -> Self {
        Self { alpha, beta }
    }

    pub fn magnitude(&self) -> f64 {
        self.alpha.hypot(self.beta)
    }

    /// Angle of the space vector measured from the α axis.
    pub fn angle(&self) -> Radians {
        Radians(self.beta.atan2(self.alpha))
    }
}

/// Rotating-frame (d, q) quantity. Only meaningful together with the rotation
/// angle it was computed for.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct DqQuantity {
    pub d: f64,
    pub q: f64,
}

impl DqQuantity {
    pub fn new(d: f64, q: f64) -> Self {
        Self { d, q }
    }

    pub fn magnitude(&self) -> f64 {
        self.d.hypot(self.q)
    }
}

// =============================================================================
// Small-signal model
// =============================================================================

/// Parameters of the linearized single-machine swing equation.
///
/// Owned by the caller; analyzers only read them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MachineSwingParameters {
    /// Inertia constant H
    pub inertia: Seconds,
    /// Damping coefficient D (p.u. torque per p.u. speed deviation)
    pub damping: f64,
    /// Synchronizing power coefficient K (p.u. torque/rad)
    pub synchronizing_power: f64,
    /// Nominal system frequency f_N
    pub nominal_frequency: Hertz,
}

impl Default for MachineSwingParameters {
    fn default() -> Self {
        Self {
            inertia: Seconds(6.5),
            damping: 0.0,
            synchronizing_power: 1.0,
            nominal_frequency: Hertz::FIFTY,
        }
    }
}

impl MachineSwingParameters {
    pub fn new(h: f64, d: f64, k: f64, f_n: f64) -> Self {
        Self {
            inertia: Seconds(h),
            damping: d,
            synchronizing_power: k,
            nominal_frequency: Hertz(f_n),
        }
    }

    pub fn with_damping(mut self, d: f64) -> Self {
        self.damping = d;
        self
    }

    pub fn with_inertia(mut self, h: f64) -> Self {
        self.inertia = Seconds(h);
        self
    }

    pub fn with_synchronizing_power(mut self, k: f64) -> Self {
        self.synchronizing_power = k;
        self
    }

    /// Reject non-physical inertia and non-finite coefficients.
    ///
    /// Negative D or K are accepted: they describe unstable machines, which is
    /// a valid analysis outcome.
    pub fn validate(&self) -> TopsResult<()> {
        let fields = [
            ("H", self.inertia.value()),
            ("D", self.damping),
            ("K", self.synchronizing_power),
            ("f_N", self.nominal_frequency.value()),
        ];
        if let Some((name, value)) = fields.iter().find(|(_, v)| !v.is_finite()) {
            return Err(TopsError::domain(format!("{name} must be finite, got {value}")));
        }
        if self.inertia.value() <= 0.0 {
            return Err(TopsError::domain(format!(
                "non-physical inertia H = {} s; H must be positive",
                self.inertia.value()
            )));
        }
        Ok(())
    }
}

/// An eigenvalue λ = σ + jω of a state matrix.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Eigenvalue(pub Complex64);

impl Eigenvalue {
    pub fn new(re: f64, im: f64) -> Self {
        Eigenvalue(Complex64::new(re, im))
    }

    #[inline]
    pub fn re(&self) -> f64 {
        self.0.re
    }

    #[inline]
    pub fn im(&self) -> f64 {
        self.0.im
    }

    #[inline]
    pub fn magnitude(&self) -> f64 {
        self.0.norm()
    }

    /// Damping ratio in percent: −σ/|λ|·100.
    pub fn damping_ratio(&self) -> TopsResult<f64> {
        let magnitude = self.nonzero_magnitude()?;
        Ok(-self.0.re / magnitude * 100.0)
    }

    /// Oscillation frequency |ω|/2π.
    pub fn frequency(&self) -> TopsResult<Hertz> {
        self.nonzero_magnitude()?;
        Ok(RadiansPerSecond(self.0.im.abs()).to_hertz())
    }

    pub fn is_oscillatory(&self) -> bool {
        self.0.im != 0.0
    }

    fn nonzero_magnitude(&self) -> TopsResult<f64> {
        let magnitude = self.magnitude();
        if !magnitude.is_finite() || magnitude == 0.0 {
            return Err(TopsError::domain(format!(
                "damping and frequency are undefined for eigenvalue {self}"
            )));
        }
        Ok(magnitude)
    }
}

impl From<Complex64> for Eigenvalue {
    fn from(value: Complex64) -> Self {
        Eigenvalue(value)
    }
}

impl fmt::Display for Eigenvalue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.im < 0.0 {
            write!(f, "{:.4} - j{:.4}", self.0.re, -self.0.im)
        } else {
            write!(f, "{:.4} + j{:.4}", self.0.re, self.0.im)
        }
    }
}

// =============================================================================
// Large-disturbance model
// =============================================================================

/// Transient power-angle curve of a single machine against an infinite bus:
/// `P_e(δ) = sin δ · |E|·|Vs| / x_dt`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PowerAngleCurve {
    /// Internal EMF magnitude |E|
    pub e: f64,
    /// Infinite-bus voltage magnitude |Vs|
    pub vs: f64,
    /// Total transient reactance between EMF and infinite bus
    pub x_dt: f64,
}

impl PowerAngleCurve {
    /// Magnitudes are taken as absolute values. A zero, negative or non-finite
    /// reactance is a [`TopsError::Domain`].
    pub fn new(e: f64, vs: f64, x_dt: f64) -> TopsResult<Self> {
        if !x_dt.is_finite() || x_dt <= 0.0 {
            return Err(TopsError::domain(format!(
                "total transient reactance must be positive and finite, got x_dt = {x_dt}"
            )));
        }
        if !e.is_finite() || !vs.is_finite() {
            return Err(TopsError::domain(format!(
                "voltage magnitudes must be finite, got |E| = {e}, |Vs| = {vs}"
            )));
        }
        Ok(Self {
            e: e.abs(),
            vs: vs.abs(),
            x_dt,
        })
    }

    /// Peak transferable power |E|·|Vs|/x_dt.
    #[inline]
    pub fn p_max(&self) -> f64 {
        self.e * self.vs / self.x_dt
    }

    /// Electrical power at rotor angle δ (radians).
    #[inline]
    pub fn power(&self, delta: f64) -> f64 {
        delta.sin() * self.p_max()
    }

    /// `n` evenly spaced (δ, P_e) samples over [0, π].
    pub fn sample(&self, n: usize) -> Vec<(f64, f64)> {
        match n {
            0 => Vec::new(),
            1 => vec![(0.0, self.power(0.0))],
            _ => (0..n)
                .map(|i| {
                    let delta = PI * i as f64 / (n - 1) as f64;
                    (delta, self.power(delta))
                })
                .collect(),
        }
    }
}

/// Accelerating (A1) and decelerating (A2) energy areas.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StabilityAreas {
    pub a1: f64,
    pub a2: f64,
}

impl StabilityAreas {
    /// A2 − A1; non-negative when the deceleration can absorb the fault energy.
    pub fn margin(&self) -> f64 {
        self.a2 - self.a1
    }
}

// =============================================================================
// Phasors
// =============================================================================

/// Phasors of the SMIB steady-state diagram.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PhasorKind {
    /// Infinite-bus voltage
    Vs,
    /// Terminal voltage at the line end
    Vt,
    /// Generator terminal voltage
    Vg,
    /// Internal EMF behind synchronous reactance
    Eq,
    /// Transient EMF E'q
    EqTransient,
    /// Stator current
    I,
    /// d-axis current component
    Id,
    /// q-axis current component
    Iq,
}

impl PhasorKind {
    pub const ALL: [PhasorKind; 8] = [
        PhasorKind::Vs,
        PhasorKind::Vt,
        PhasorKind::Vg,
        PhasorKind::Eq,
        PhasorKind::EqTransient,
        PhasorKind::I,
        PhasorKind::Id,
        PhasorKind::Iq,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            PhasorKind::Vs => "Vs",
            PhasorKind::Vt => "Vt",
            PhasorKind::Vg => "Vg",
            PhasorKind::Eq => "Eq",
            PhasorKind::EqTransient => "Eq_t",
            PhasorKind::I => "I",
            PhasorKind::Id => "Id",
            PhasorKind::Iq => "Iq",
        }
    }

    pub fn is_current(&self) -> bool {
        matches!(self, PhasorKind::I | PhasorKind::Id | PhasorKind::Iq)
    }
}

/// One value per [`PhasorKind`], in p.u. on the machine base.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhasorDiagram {
    pub vs: Complex64,
    pub vt: Complex64,
    pub vg: Complex64,
    pub eq: Complex64,
    pub eq_transient: Complex64,
    pub i: Complex64,
    pub id: Complex64,
    pub iq: Complex64,
}

impl PhasorDiagram {
    pub fn get(&self, kind: PhasorKind) -> Complex64 {
        match kind {
            PhasorKind::Vs => self.vs,
            PhasorKind::Vt => self.vt,
            PhasorKind::Vg => self.vg,
            PhasorKind::Eq => self.eq,
            PhasorKind::EqTransient => self.eq_transient,
            PhasorKind::I => self.i,
            PhasorKind::Id => self.id,
            PhasorKind::Iq => self.iq,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (PhasorKind, Complex64)> + '_ {
        PhasorKind::ALL.into_iter().map(move |kind| (kind, self.get(kind)))
    }

    /// Rotor (load) angle δ = arg(Eq).
    pub fn load_angle(&self) -> Radians {
        Radians(self.eq.arg())
    }

    /// Power-factor angle φ = −arg(I); positive for lagging (overexcited) operation.
    pub fn power_factor_angle(&self) -> Radians {
        Radians(-self.i.arg())
    }
}
