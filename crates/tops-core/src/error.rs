//! Unified error types for the tops workspace
//!
//! Every analysis in `tops-algo` reports failures through [`TopsError`]. Only
//! two kinds are produced by the numeric core itself:
//!
//! - [`TopsError::Domain`]: a non-physical input (zero inertia, zero
//!   reactance, a zero eigenvalue passed to the damping calculation)
//! - [`TopsError::Convergence`]: a root finder or quadrature ran out of its
//!   iteration budget before meeting tolerance
//!
//! The remaining variants belong to the outer layers (configuration files,
//! JSON output). A transient-stability "unstable" result is not an error; it
//! is reported as a verdict by the equal-area analysis.
//!
//! # Example
//!
//! ```
//! use tops_core::{MachineSwingParameters, TopsError, TopsResult};
//!
//! fn checked(h: f64) -> TopsResult<MachineSwingParameters> {
//!     let params = MachineSwingParameters::new(h, 0.0, 1.0, 50.0);
//!     params.validate()?;
//!     Ok(params)
//! }
//!
//! assert!(matches!(checked(0.0), Err(TopsError::Domain(_))));
//! ```

use thiserror::Error;

/// Unified error type for all tops operations.
#[derive(Error, Debug)]
pub enum TopsError {
    /// Non-physical input rejected before computing anything
    #[error("Domain error: {0}")]
    Domain(String),

    /// Iterative solver exhausted its budget without meeting tolerance
    #[error("Convergence error: {0}")]
    Convergence(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O errors (config files, output)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Parsing/deserialization errors
    #[error("Parse error: {0}")]
    Parse(String),

    /// Generic errors (for wrapping external errors)
    #[error("{0}")]
    Other(String),
}

/// Convenience type alias for Results using TopsError.
pub type TopsResult<T> = Result<T, TopsError>;

impl TopsError {
    /// Shorthand for building a [`TopsError::Domain`].
    pub fn domain(msg: impl Into<String>) -> Self {
        TopsError::Domain(msg.into())
    }

    /// Shorthand for building a [`TopsError::Convergence`].
    pub fn convergence(msg: impl Into<String>) -> Self {
        TopsError::Convergence(msg.into())
    }
}

// Solver crates (argmin) report through anyhow; keep our own variant if one
// was tunnelled through them.
impl From<anyhow::Error> for TopsError {
    fn from(err: anyhow::Error) -> Self {
        match err.downcast::<TopsError>() {
            Ok(inner) => inner,
            Err(other) => TopsError::Other(other.to_string()),
        }
    }
}

impl From<String> for TopsError {
    fn from(s: String) -> Self {
        TopsError::Other(s)
    }
}

impl From<&str> for TopsError {
    fn from(s: &str) -> Self {
        TopsError::Other(s.to_string())
    }
}

impl From<serde_json::Error> for TopsError {
    fn from(err: serde_json::Error) -> Self {
        TopsError::Parse(err.to_string())
    }
}
