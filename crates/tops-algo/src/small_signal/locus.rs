//! Root-locus sweeps over one swing parameter.

use super::{build_state_matrix, eigenvalues_with, SmallSignalStabilityAnalyzer};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tops_core::{Eigenvalue, MachineSwingParameters, TopsError, TopsResult};
use tracing::debug;

/// Which coefficient of the swing equation a sweep varies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SweepParameter {
    /// Inertia constant H
    Inertia,
    /// Damping coefficient D
    Damping,
    /// Synchronizing power coefficient K
    SynchronizingPower,
}

impl FromStr for SweepParameter {
    type Err = TopsError;

    fn from_str(input: &str) -> TopsResult<Self> {
        match input.to_ascii_lowercase().as_str() {
            "h" | "inertia" => Ok(SweepParameter::Inertia),
            "d" | "damping" => Ok(SweepParameter::Damping),
            "k" | "synchronizing-power" | "synchronizing_power" => {
                Ok(SweepParameter::SynchronizingPower)
            }
            other => Err(TopsError::Parse(format!(
                "unknown sweep parameter '{}'; expected one of H, D, K",
                other
            ))),
        }
    }
}

impl SweepParameter {
    pub fn symbol(&self) -> &'static str {
        match self {
            SweepParameter::Inertia => "H",
            SweepParameter::Damping => "D",
            SweepParameter::SynchronizingPower => "K",
        }
    }

    /// Copy of `params` with this coefficient replaced by `value`.
    pub fn apply(&self, params: &MachineSwingParameters, value: f64) -> MachineSwingParameters {
        match self {
            SweepParameter::Inertia => params.with_inertia(value),
            SweepParameter::Damping => params.with_damping(value),
            SweepParameter::SynchronizingPower => params.with_synchronizing_power(value),
        }
    }
}

/// Eigenvalues at one value of the swept coefficient.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RootLocusPoint {
    pub value: f64,
    pub eigenvalues: [Eigenvalue; 2],
}

/// `n` evenly spaced values from `start` to `stop` inclusive.
pub fn linspace(start: f64, stop: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (stop - start) / (n - 1) as f64;
            (0..n).map(|i| start + step * i as f64).collect()
        }
    }
}

impl SmallSignalStabilityAnalyzer {
    /// Eigenvalue trajectory while `parameter` takes each of `values`.
    ///
    /// Any value giving an invalid machine (e.g. H ≤ 0) fails the whole sweep.
    pub fn root_locus(
        &self,
        params: &MachineSwingParameters,
        parameter: SweepParameter,
        values: &[f64],
    ) -> TopsResult<Vec<RootLocusPoint>> {
        let points = values
            .iter()
            .map(|&value| {
                let swept = parameter.apply(params, value);
                let matrix = build_state_matrix(&swept)?;
                Ok(RootLocusPoint {
                    value,
                    eigenvalues: eigenvalues_with(self.backend.as_ref(), &matrix)?,
                })
            })
            .collect::<TopsResult<Vec<_>>>()?;
        debug!(
            parameter = parameter.symbol(),
            points = points.len(),
            "root locus sweep complete"
        );
        Ok(points)
    }
}
