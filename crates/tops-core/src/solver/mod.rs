//! Eigenvalue backends for small dense state matrices.

pub mod backend;
pub mod registry;

pub use backend::{ClosedFormEigen, EigenBackend, FaerEigen};
pub use registry::EigenSolverKind;
