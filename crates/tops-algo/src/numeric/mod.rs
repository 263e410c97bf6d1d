//! Iterative numeric building blocks with explicit budgets.
//!
//! - [`root`]: bracketed Brent root finding (argmin)
//! - [`quadrature`]: globally adaptive Gauss–Kronrod / Simpson integration

pub mod quadrature;
pub mod root;

pub use quadrature::{integrate, QuadratureKind, QuadratureResult, QuadratureSettings};
pub use root::{bracketed_root, RootFinderSettings};
