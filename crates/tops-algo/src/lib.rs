//! # tops-algo: Stability Analysis for a Machine against an Infinite Bus
//!
//! Numerical core behind the `tops` toolkit. Every analysis is a pure function
//! of the `tops-core` data model; the only iterative parts (root finding and
//! quadrature) run under explicit budgets from [`numeric`].
//!
//! ## Analyses
//!
//! | Module | Question answered | Method |
//! |--------|-------------------|--------|
//! | [`transforms`] | What does a three-phase quantity look like in αβ and dq? | Clarke / Park matrices |
//! | [`small_signal`] | How damped is the rotor-angle oscillation? | 2×2 state-matrix eigenvalues |
//! | [`equal_area`] | Does the machine survive the first swing after a fault? | Equal-area criterion |
//! | [`loop_model`] | How does a hydro governor change the swing loop? | Transfer functions, Bode |
//! | [`phasor`] | Where do the steady-state phasors sit? | SMIB phasor diagram |
//!
//! ## Example
//!
//! ```
//! use tops_algo::equal_area::EqualAreaCriterion;
//!
//! // P_m = 0.8, |E| = 1.1, |Vs| = 1.0, x_dt = 0.3; bolted fault cleared at 1.2 rad
//! let eac = EqualAreaCriterion::new(0.8, 1.1, 1.0, 0.3)?;
//! let result = eac.assess(1.2, 0.0)?;
//! assert!(result.verdict.is_stable());
//! # Ok::<(), tops_core::TopsError>(())
//! ```

pub mod equal_area;
pub mod loop_model;
pub mod numeric;
pub mod phasor;
pub mod small_signal;
pub mod transforms;

pub use equal_area::{
    power_curve, EqualAreaAssessment, EqualAreaCriterion, InstabilityReason, StabilityVerdict,
};
pub use loop_model::{
    combined, governor_transfer_function, logspace, open_loop_transfer_function,
    stability_margins, FrequencyPoint, StabilityMargins, TransferFunction,
};
pub use numeric::{QuadratureKind, QuadratureSettings, RootFinderSettings};
pub use phasor::SmibOperatingPoint;
pub use small_signal::{
    build_state_matrix, damping_and_frequency, eigenvalues, ElectromechanicalBand, ModeClass,
    SmallSignalReport, SmallSignalStabilityAnalyzer, SweepParameter,
};
pub use transforms::{
    abc_to_alphabeta, alphabeta_to_abc, alphabeta_to_dq, dq_to_alphabeta, CoordinateSnapshot,
};
