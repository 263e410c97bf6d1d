//! Mode classification against the electromechanical band.
//!
//! Rotor-angle oscillations of synchronous machines sit roughly between
//! 0.1 Hz (inter-area) and 2 Hz (local plant). Modes in that range with less
//! than 10 % damping are the ones a power-system stabilizer has to fix.

use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;
use std::fmt;
use tops_core::{Eigenvalue, TopsError, TopsResult};

/// Frequency range and damping threshold of the electromechanical band.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ElectromechanicalBand {
    /// Lowest electromechanical frequency (Hz)
    pub min_frequency: f64,
    /// Highest electromechanical frequency (Hz)
    pub max_frequency: f64,
    /// Damping ratio (%) below which a mode counts as poorly damped
    pub damping_threshold: f64,
}

impl Default for ElectromechanicalBand {
    fn default() -> Self {
        Self {
            min_frequency: 0.1,
            max_frequency: 2.0,
            damping_threshold: 10.0,
        }
    }
}

/// Where an eigenvalue falls relative to the band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ModeClass {
    /// Inside the band and below the damping threshold
    PoorlyDampedElectromechanical,
    /// Inside the band with adequate damping
    Electromechanical,
    /// Oscillatory but outside the band
    Oscillatory,
    /// Real, non-positive eigenvalue
    NonOscillatory,
    /// Positive real part
    Unstable,
}

impl ModeClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModeClass::PoorlyDampedElectromechanical => "poorly-damped-electromechanical",
            ModeClass::Electromechanical => "electromechanical",
            ModeClass::Oscillatory => "oscillatory",
            ModeClass::NonOscillatory => "non-oscillatory",
            ModeClass::Unstable => "unstable",
        }
    }

    pub fn is_electromechanical(&self) -> bool {
        matches!(
            self,
            ModeClass::PoorlyDampedElectromechanical | ModeClass::Electromechanical
        )
    }
}

impl fmt::Display for ModeClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ElectromechanicalBand {
    pub fn validate(&self) -> TopsResult<()> {
        let finite = [self.min_frequency, self.max_frequency, self.damping_threshold]
            .iter()
            .all(|v| v.is_finite());
        if !finite || self.min_frequency < 0.0 || self.min_frequency >= self.max_frequency {
            return Err(TopsError::Config(format!(
                "invalid electromechanical band [{}, {}] Hz",
                self.min_frequency, self.max_frequency
            )));
        }
        if !(0.0..100.0).contains(&self.damping_threshold) {
            return Err(TopsError::Config(format!(
                "damping threshold must lie in [0, 100) %, got {}",
                self.damping_threshold
            )));
        }
        Ok(())
    }

    pub fn contains_frequency(&self, frequency: f64) -> bool {
        (self.min_frequency..=self.max_frequency).contains(&frequency)
    }

    /// Classify one eigenvalue.
    ///
    /// A real eigenvalue (including λ = 0) is never an error here: it is
    /// simply not an oscillation.
    pub fn classify(&self, lambda: &Eigenvalue) -> TopsResult<ModeClass> {
        if lambda.re() > 0.0 {
            return Ok(ModeClass::Unstable);
        }
        if !lambda.is_oscillatory() {
            return Ok(ModeClass::NonOscillatory);
        }

        let damping = lambda.damping_ratio()?;
        let frequency = lambda.frequency()?.value();
        if !self.contains_frequency(frequency) {
            return Ok(ModeClass::Oscillatory);
        }
        if damping < self.damping_threshold {
            Ok(ModeClass::PoorlyDampedElectromechanical)
        } else {
            Ok(ModeClass::Electromechanical)
        }
    }

    /// Outline of the poorly damped region in the s-plane, as `n` points
    /// `(σ, ω)` along the threshold damping line from the lowest to the highest
    /// band frequency.
    ///
    /// A mode of frequency f and damping ζ sits at σ = −ζ·2πf, ω = 2πf·√(1−ζ²).
    pub fn boundary(&self, n: usize) -> Vec<(f64, f64)> {
        let zeta = self.damping_threshold / 100.0;
        let point = |f: f64| {
            let omega_n = TAU * f;
            (-zeta * omega_n, omega_n * (1.0 - zeta * zeta).sqrt())
        };
        match n {
            0 => Vec::new(),
            1 => vec![point(self.min_frequency)],
            _ => {
                let step = (self.max_frequency - self.min_frequency) / (n - 1) as f64;
                (0..n)
                    .map(|i| point(self.min_frequency + step * i as f64))
                    .collect()
            }
        }
    }
}
