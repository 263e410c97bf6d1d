//! Clarke and Park Coordinate Transforms
//!
//! Maps instantaneous three-phase quantities into the stationary αβ frame
//! (Clarke) and from there into a frame rotating with angle θ (Park).
//!
//! ## Conventions
//!
//! The Clarke matrix is the amplitude-invariant form
//!
//! ```text
//!          2 ⎡ 1   −1/2   −1/2 ⎤
//! T_αβ = ─── ⎢                 ⎥
//!          3 ⎣ 0   √3/2  −√3/2 ⎦
//! ```
//!
//! so a balanced set of peak `M` becomes a space vector of length `M`. The
//! zero-sequence component is discarded.
//!
//! The Park rotation projects onto the d axis (aligned with θ) and the q axis
//! (leading d by 90°):
//!
//! ```text
//! ⎡d⎤   ⎡ cos θ   sin θ ⎤ ⎡α⎤
//! ⎣q⎦ = ⎣−sin θ   cos θ ⎦ ⎣β⎦
//! ```
//!
//! With θ = ωt a balanced sinusoid at angular frequency ω maps to a constant
//! dq vector.

use serde::{Deserialize, Serialize};
use std::f64::consts::{PI, SQRT_2};
use tops_core::{AlphaBetaQuantity, DqQuantity, ThreePhaseQuantity};

const SQRT_3_OVER_2: f64 = 0.866_025_403_784_438_6;

/// Clarke transform abc → αβ (amplitude-invariant).
pub fn abc_to_alphabeta(abc: &ThreePhaseQuantity) -> AlphaBetaQuantity {
    let ThreePhaseQuantity { a, b, c } = *abc;
    AlphaBetaQuantity {
        alpha: 2.0 / 3.0 * (a - 0.5 * b - 0.5 * c),
        beta: 2.0 / 3.0 * (SQRT_3_OVER_2 * b - SQRT_3_OVER_2 * c),
    }
}

/// Inverse Clarke transform αβ → abc, assuming no zero-sequence content.
pub fn alphabeta_to_abc(ab: &AlphaBetaQuantity) -> ThreePhaseQuantity {
    let AlphaBetaQuantity { alpha, beta } = *ab;
    ThreePhaseQuantity {
        a: alpha,
        b: -0.5 * alpha + SQRT_3_OVER_2 * beta,
        c: -0.5 * alpha - SQRT_3_OVER_2 * beta,
    }
}

/// Park rotation αβ → dq by angle `theta` (radians).
pub fn alphabeta_to_dq(ab: &AlphaBetaQuantity, theta: f64) -> DqQuantity {
    let (sin, cos) = theta.sin_cos();
    DqQuantity {
        d: cos * ab.alpha + sin * ab.beta,
        q: -sin * ab.alpha + cos * ab.beta,
    }
}

/// Inverse Park rotation dq → αβ by angle `theta` (radians).
pub fn dq_to_alphabeta(dq: &DqQuantity, theta: f64) -> AlphaBetaQuantity {
    let (sin, cos) = theta.sin_cos();
    AlphaBetaQuantity {
        alpha: cos * dq.d - sin * dq.q,
        beta: sin * dq.d + cos * dq.q,
    }
}

/// Convenience composition abc → dq.
pub fn abc_to_dq(abc: &ThreePhaseQuantity, theta: f64) -> DqQuantity {
    alphabeta_to_dq(&abc_to_alphabeta(abc), theta)
}

/// One waveform (voltage or current) viewed in all three frames.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FrameView {
    pub abc: ThreePhaseQuantity,
    pub alphabeta: AlphaBetaQuantity,
    pub dq: DqQuantity,
}

impl FrameView {
    fn of(abc: ThreePhaseQuantity, theta: f64) -> Self {
        let alphabeta = abc_to_alphabeta(&abc);
        Self {
            abc,
            alphabeta,
            dq: alphabeta_to_dq(&alphabeta, theta),
        }
    }
}

/// Voltage and current of a balanced machine at one instant, in abc, αβ and dq.
///
/// The dq frame rotates synchronously: θ = 2π·f_N·t.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CoordinateSnapshot {
    /// Time of the snapshot (s)
    pub time: f64,
    /// Rotation angle of the dq frame (rad)
    pub theta: f64,
    pub voltage: FrameView,
    pub current: FrameView,
}

impl CoordinateSnapshot {
    /// Sample a balanced voltage of peak `vm` and a balanced current of peak
    /// `im` lagging by `current_phase` radians (negative = lagging).
    pub fn at(time: f64, vm: f64, im: f64, current_phase: f64, nominal_frequency: f64) -> Self {
        let theta = 2.0 * PI * nominal_frequency * time;
        let voltage = ThreePhaseQuantity::balanced(vm, theta, 0.0);
        let current = ThreePhaseQuantity::balanced(im, theta, current_phase);
        Self {
            time,
            theta,
            voltage: FrameView::of(voltage, theta),
            current: FrameView::of(current, theta),
        }
    }

    /// Snapshot of a system with RMS line quantities, converted to phase peaks.
    pub fn from_rms(
        time: f64,
        v_rms: f64,
        i_rms: f64,
        current_phase: f64,
        nominal_frequency: f64,
    ) -> Self {
        Self::at(
            time,
            v_rms * SQRT_2,
            i_rms * SQRT_2,
            current_phase,
            nominal_frequency,
        )
    }
}
