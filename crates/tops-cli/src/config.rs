//! Solver budgets and classification thresholds for the `tops` CLI.
//!
//! The [`TopsConfig`] is read from `--config <path>` or, when that flag is
//! absent, from `~/.tops/config.toml` if it exists. Every section is optional;
//! unspecified values use the library defaults.
//!
//! ```toml
//! [root_finder]
//! tolerance = 1e-12
//! max_iterations = 200
//!
//! [quadrature]
//! kind = "simpson"
//! max_subdivisions = 200
//!
//! [eigen]
//! solver = "faer"
//!
//! [band]
//! damping_threshold = 5.0
//!
//! [bode]
//! points = 1000
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tops_algo::numeric::{QuadratureSettings, RootFinderSettings};
use tops_algo::small_signal::ElectromechanicalBand;
use tops_core::{EigenSolverKind, TopsError, TopsResult};
use tracing::debug;

/// Main configuration for the `tops` binary.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TopsConfig {
    /// Brent root finder used by the equal-area criterion.
    pub root_finder: RootFinderSettings,

    /// Adaptive quadrature of the power-angle curve.
    pub quadrature: QuadratureSettings,

    /// Eigenvalue backend for the small-signal analysis.
    pub eigen: EigenConfig,

    /// Electromechanical band used to classify modes.
    pub band: ElectromechanicalBand,

    /// Default frequency sweep of `tops bode`.
    pub bode: BodeConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EigenConfig {
    pub solver: EigenSolverKind,
}

/// Logarithmic sweep 10^start_exponent … 10^stop_exponent rad/s.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BodeConfig {
    pub start_exponent: f64,
    pub stop_exponent: f64,
    pub points: usize,
}

impl Default for BodeConfig {
    fn default() -> Self {
        Self {
            start_exponent: -2.0,
            stop_exponent: 2.0,
            points: 500,
        }
    }
}

impl BodeConfig {
    pub fn validate(&self) -> TopsResult<()> {
        if !(self.start_exponent.is_finite() && self.stop_exponent.is_finite())
            || self.start_exponent >= self.stop_exponent
        {
            return Err(TopsError::Config(format!(
                "bode sweep needs start_exponent < stop_exponent, got {} and {}",
                self.start_exponent, self.stop_exponent
            )));
        }
        if self.points < 2 {
            return Err(TopsError::Config(format!(
                "bode sweep needs at least 2 points, got {}",
                self.points
            )));
        }
        Ok(())
    }
}

impl TopsConfig {
    /// Get the default config directory path.
    pub fn config_dir() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(".tops"))
    }

    /// Get the default config file path.
    pub fn config_path() -> Option<PathBuf> {
        Self::config_dir().map(|d| d.join("config.toml"))
    }

    /// Load from `path` if given, otherwise from the default location.
    ///
    /// Returns the default config if no file is given and none exists.
    pub fn load(path: Option<&Path>) -> TopsResult<Self> {
        match path {
            Some(path) => Self::load_from(path),
            None => match Self::config_path() {
                Some(path) if path.exists() => Self::load_from(&path),
                _ => Ok(Self::default()),
            },
        }
    }

    /// Load configuration from a specific path.
    pub fn load_from(path: &Path) -> TopsResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config = Self::from_toml(&contents)
            .map_err(|err| TopsError::Config(format!("{}: {err}", path.display())))?;
        debug!(path = %path.display(), "loaded configuration");
        Ok(config)
    }

    /// Parse and validate a TOML document.
    pub fn from_toml(contents: &str) -> TopsResult<Self> {
        let config: Self =
            toml::from_str(contents).map_err(|err| TopsError::Config(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> TopsResult<()> {
        self.root_finder.validate()?;
        self.quadrature.validate()?;
        self.band.validate()?;
        self.bode.validate()
    }

    /// Save configuration to a specific path.
    pub fn save_to(&self, path: &Path) -> TopsResult<()> {
        let contents =
            toml::to_string_pretty(self).map_err(|err| TopsError::Config(err.to_string()))?;
        std::fs::write(path, contents)?;
        Ok(())
    }
}
