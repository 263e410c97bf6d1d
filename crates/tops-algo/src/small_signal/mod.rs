//! Small-Signal Stability of a Single Machine against an Infinite Bus
//!
//! Linearizing the swing equation around an operating point gives a
//! two-state model in the rotor angle deviation Δδ and the speed deviation
//! Δω (p.u.):
//!
//! ```text
//! ⎡Δδ̇⎤   ⎡   0        2π·f_N ⎤ ⎡Δδ⎤
//! ⎣Δω̇⎦ = ⎣ −K/(2H)   −D/(2H) ⎦ ⎣Δω⎦
//! ```
//!
//! The eigenvalues of this state matrix give the damping ratio and frequency
//! of the rotor-angle oscillation, which is then compared with the
//! electromechanical band.
//!
//! ## Example
//!
//! ```
//! use tops_algo::small_signal::SmallSignalStabilityAnalyzer;
//! use tops_core::MachineSwingParameters;
//!
//! let machine = MachineSwingParameters::new(6.5, 2.0, 1.0, 50.0);
//! let report = SmallSignalStabilityAnalyzer::new().analyze(&machine)?;
//! assert!(report.is_stable());
//! # Ok::<(), tops_core::TopsError>(())
//! ```
//!
//! ## References
//!
//! - Kundur (1994): "Power System Stability and Control", ch. 12.
//!   McGraw-Hill.

mod locus;
mod modes;

pub use locus::{linspace, RootLocusPoint, SweepParameter};
pub use modes::{ElectromechanicalBand, ModeClass};

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tops_core::{
    EigenBackend, EigenSolverKind, Eigenvalue, Hertz, MachineSwingParameters, TopsResult,
};
use tracing::debug;

/// State matrix of the linearized swing equation.
///
/// Fails with [`tops_core::TopsError::Domain`] for non-positive or non-finite
/// inertia.
pub fn build_state_matrix(params: &MachineSwingParameters) -> TopsResult<[[f64; 2]; 2]> {
    params.validate()?;
    let two_h = 2.0 * params.inertia.value();
    Ok([
        [0.0, params.nominal_frequency.to_angular().value()],
        [-params.synchronizing_power / two_h, -params.damping / two_h],
    ])
}

/// Eigenvalues of a 2×2 state matrix with the default backend, sorted by
/// descending imaginary part then descending real part.
pub fn eigenvalues(matrix: &[[f64; 2]; 2]) -> TopsResult<[Eigenvalue; 2]> {
    eigenvalues_with(EigenSolverKind::default().build_solver().as_ref(), matrix)
}

/// Same as [`eigenvalues`] with an explicit backend.
pub fn eigenvalues_with(
    backend: &dyn EigenBackend,
    matrix: &[[f64; 2]; 2],
) -> TopsResult<[Eigenvalue; 2]> {
    // −0.0 and +0.0 must sort together whichever backend produced them
    let mut values = backend.eigenvalues(matrix)?.map(|mut lambda| {
        if lambda.im == 0.0 {
            lambda.im = 0.0;
        }
        if lambda.re == 0.0 {
            lambda.re = 0.0;
        }
        Eigenvalue::from(lambda)
    });
    values.sort_by(|a, b| b.im().total_cmp(&a.im()).then(b.re().total_cmp(&a.re())));
    Ok(values)
}

/// Damping ratio (%) and oscillation frequency of one eigenvalue.
pub fn damping_and_frequency(lambda: &Eigenvalue) -> TopsResult<(f64, Hertz)> {
    Ok((lambda.damping_ratio()?, lambda.frequency()?))
}

/// One analysed eigenvalue.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModeReport {
    pub eigenvalue: Eigenvalue,
    /// Damping ratio (%); `None` for λ = 0
    pub damping_ratio: Option<f64>,
    /// Oscillation frequency (Hz); `None` for λ = 0
    pub frequency: Option<Hertz>,
    pub class: ModeClass,
}

/// Everything the analyzer derives from one set of swing parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SmallSignalReport {
    pub parameters: MachineSwingParameters,
    pub state_matrix: [[f64; 2]; 2],
    pub modes: [ModeReport; 2],
}

impl SmallSignalReport {
    /// No eigenvalue in the open right half-plane.
    pub fn is_stable(&self) -> bool {
        self.modes.iter().all(|m| m.eigenvalue.re() <= 0.0)
    }

    pub fn eigenvalues(&self) -> [Eigenvalue; 2] {
        self.modes.map(|m| m.eigenvalue)
    }

    /// The oscillatory mode with positive frequency, if any.
    pub fn dominant_mode(&self) -> Option<&ModeReport> {
        self.modes.iter().find(|m| m.eigenvalue.im() > 0.0)
    }
}

/// Configured small-signal analyzer.
#[derive(Clone)]
pub struct SmallSignalStabilityAnalyzer {
    solver: EigenSolverKind,
    backend: Arc<dyn EigenBackend>,
    band: ElectromechanicalBand,
}

impl Default for SmallSignalStabilityAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for SmallSignalStabilityAnalyzer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmallSignalStabilityAnalyzer")
            .field("solver", &self.solver)
            .field("band", &self.band)
            .finish()
    }
}

impl SmallSignalStabilityAnalyzer {
    pub fn new() -> Self {
        let solver = EigenSolverKind::default();
        Self {
            solver,
            backend: solver.build_solver(),
            band: ElectromechanicalBand::default(),
        }
    }

    pub fn with_solver(mut self, solver: EigenSolverKind) -> Self {
        self.solver = solver;
        self.backend = solver.build_solver();
        self
    }

    pub fn with_band(mut self, band: ElectromechanicalBand) -> Self {
        self.band = band;
        self
    }

    pub fn solver(&self) -> EigenSolverKind {
        self.solver
    }

    pub fn band(&self) -> &ElectromechanicalBand {
        &self.band
    }

    pub fn eigenvalues(&self, params: &MachineSwingParameters) -> TopsResult<[Eigenvalue; 2]> {
        let matrix = build_state_matrix(params)?;
        eigenvalues_with(self.backend.as_ref(), &matrix)
    }

    pub fn analyze(&self, params: &MachineSwingParameters) -> TopsResult<SmallSignalReport> {
        self.band.validate()?;
        let state_matrix = build_state_matrix(params)?;
        let values = eigenvalues_with(self.backend.as_ref(), &state_matrix)?;

        let modes = [self.mode_report(values[0])?, self.mode_report(values[1])?];

        Ok(SmallSignalReport {
            parameters: *params,
            state_matrix,
            modes,
        })
    }

    fn mode_report(&self, eigenvalue: Eigenvalue) -> TopsResult<ModeReport> {
        let (damping_ratio, frequency) = if eigenvalue.magnitude() == 0.0 {
            (None, None)
        } else {
            let (damping, frequency) = damping_and_frequency(&eigenvalue)?;
            (Some(damping), Some(frequency))
        };
        let class = self.band.classify(&eigenvalue)?;
        debug!(
            solver = self.solver.as_str(),
            %eigenvalue,
            damping = ?damping_ratio,
            class = class.as_str(),
            "classified mode"
        );
        Ok(ModeReport {
            eigenvalue,
            damping_ratio,
            frequency,
            class,
        })
    }
}
