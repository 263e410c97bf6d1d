//! Small-Signal Loop Model: Swing Dynamics and Hydro Governor
//!
//! Rational transfer functions in the Laplace variable s, stored as
//! coefficient vectors with the highest power first:
//!
//! | Block                     | Transfer function                     |
//! |---------------------------|---------------------------------------|
//! | Open-loop swing           | s / (2H·s² + D·s + 2π·f_N·K)          |
//! | Hydro governor            | K_gov·(1 − T_w·s) / (0.5·T_w·s + 1)   |
//! | Open loop with governor   | series product of the two             |
//!
//! The governor's right-half-plane zero (water-column inertia) is what erodes
//! the phase margin of the combined loop.
//!
//! Frequency responses are evaluated at s = jω and reported in dB and
//! degrees, with the phase unwrapped along a sweep.

use num_complex::Complex64;
use serde::{Deserialize, Serialize};
use std::fmt;
use tops_core::{Decibels, Hertz, Radians, TopsError, TopsResult};

/// Rational transfer function `num(s) / den(s)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransferFunction {
    /// Numerator coefficients, highest power first
    pub num: Vec<f64>,
    /// Denominator coefficients, highest power first
    pub den: Vec<f64>,
    pub name: String,
}

fn trim_leading_zeros(coefficients: &[f64]) -> Vec<f64> {
    let first = coefficients
        .iter()
        .position(|c| *c != 0.0)
        .unwrap_or(coefficients.len());
    coefficients[first..].to_vec()
}

fn polyval(coefficients: &[f64], s: Complex64) -> Complex64 {
    coefficients
        .iter()
        .fold(Complex64::new(0.0, 0.0), |acc, &c| acc * s + c)
}

fn convolve(a: &[f64], b: &[f64]) -> Vec<f64> {
    let mut out = vec![0.0; a.len() + b.len() - 1];
    for (i, x) in a.iter().enumerate() {
        for (j, y) in b.iter().enumerate() {
            out[i + j] += x * y;
        }
    }
    out
}

fn format_polynomial(coefficients: &[f64]) -> String {
    let degree = coefficients.len().saturating_sub(1);
    let terms: Vec<String> = coefficients
        .iter()
        .enumerate()
        .filter(|(_, c)| **c != 0.0)
        .map(|(i, c)| match degree - i {
            0 => format!("{c}"),
            1 => format!("{c}·s"),
            power => format!("{c}·s^{power}"),
        })
        .collect();
    if terms.is_empty() {
        "0".to_string()
    } else {
        terms.join(" + ")
    }
}

impl TransferFunction {
    /// Build from coefficient vectors. Leading zeros are dropped; an empty
    /// numerator is the zero polynomial.
    pub fn new(num: &[f64], den: &[f64], name: impl Into<String>) -> TopsResult<Self> {
        let name = name.into();
        if num.iter().chain(den).any(|c| !c.is_finite()) {
            return Err(TopsError::domain(format!(
                "transfer function '{name}' has non-finite coefficients"
            )));
        }
        let den = trim_leading_zeros(den);
        if den.is_empty() {
            return Err(TopsError::domain(format!(
                "transfer function '{name}' has a zero denominator"
            )));
        }
        let mut num = trim_leading_zeros(num);
        if num.is_empty() {
            num.push(0.0);
        }
        Ok(Self { num, den, name })
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Series connection `self · other`.
    pub fn series(&self, other: &TransferFunction) -> TopsResult<Self> {
        Self::new(
            &convolve(&self.num, &other.num),
            &convolve(&self.den, &other.den),
            format!("{} · {}", self.name, other.name),
        )
    }

    pub fn order(&self) -> usize {
        self.den.len() - 1
    }

    /// Evaluate at a complex frequency; a pole at `s` is a domain error.
    pub fn evaluate(&self, s: Complex64) -> TopsResult<Complex64> {
        let den = polyval(&self.den, s);
        if den.norm() == 0.0 {
            return Err(TopsError::domain(format!(
                "'{}' has a pole at s = {s}",
                self.name
            )));
        }
        Ok(polyval(&self.num, s) / den)
    }

    /// Response at angular frequency `omega` (rad/s).
    pub fn frequency_response(&self, omega: f64) -> TopsResult<FrequencyPoint> {
        if !omega.is_finite() || omega < 0.0 {
            return Err(TopsError::domain(format!(
                "frequency must be finite and non-negative, got ω = {omega}"
            )));
        }
        let h = self.evaluate(Complex64::new(0.0, omega))?;
        if h.norm() == 0.0 {
            return Err(TopsError::domain(format!(
                "'{}' has a zero at ω = {omega} rad/s; gain in dB is undefined",
                self.name
            )));
        }
        Ok(FrequencyPoint {
            omega,
            magnitude_db: Decibels::from_amplitude(h.norm()).value(),
            phase_deg: Radians(h.arg()).to_degrees().value(),
        })
    }

    /// Frequency response over a sweep with the phase unwrapped so that
    /// consecutive samples never jump by more than 180°.
    pub fn bode(&self, omegas: &[f64]) -> TopsResult<Vec<FrequencyPoint>> {
        let mut points = omegas
            .iter()
            .map(|&omega| self.frequency_response(omega))
            .collect::<TopsResult<Vec<_>>>()?;

        for i in 1..points.len() {
            let previous = points[i - 1].phase_deg;
            let mut phase = points[i].phase_deg;
            while phase - previous > 180.0 {
                phase -= 360.0;
            }
            while phase - previous < -180.0 {
                phase += 360.0;
            }
            points[i].phase_deg = phase;
        }
        Ok(points)
    }
}

impl fmt::Display for TransferFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: ({}) / ({})",
            self.name,
            format_polynomial(&self.num),
            format_polynomial(&self.den)
        )
    }
}

/// One sample of a frequency response.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FrequencyPoint {
    /// Angular frequency (rad/s)
    pub omega: f64,
    pub magnitude_db: f64,
    pub phase_deg: f64,
}

/// Open-loop swing dynamics s / (2H·s² + D·s + 2π·f_N·K).
pub fn open_loop_transfer_function(h: f64, d: f64, f_n: f64, k: f64) -> TopsResult<TransferFunction> {
    if !h.is_finite() || h <= 0.0 {
        return Err(TopsError::domain(format!(
            "non-physical inertia H = {h} s; H must be positive"
        )));
    }
    let omega_n = Hertz(f_n).to_angular().value();
    TransferFunction::new(&[1.0, 0.0], &[2.0 * h, d, omega_n * k], "Open Loop")
}

/// Hydro governor K_gov·(1 − T_w·s) / (0.5·T_w·s + 1).
pub fn governor_transfer_function(tw: f64, kgov: f64) -> TopsResult<TransferFunction> {
    if !tw.is_finite() || tw < 0.0 {
        return Err(TopsError::domain(format!(
            "water starting time must be non-negative, got T_w = {tw}"
        )));
    }
    TransferFunction::new(&[-tw * kgov, kgov], &[0.5 * tw, 1.0], "GOV")
}

/// Open loop in series with the governor.
pub fn combined(h_ol: &TransferFunction, gov: &TransferFunction) -> TopsResult<TransferFunction> {
    Ok(h_ol.series(gov)?.with_name("Open Loop with Governor"))
}

/// `n` points spaced evenly in log10 between `10^start` and `10^stop`.
pub fn logspace(start: f64, stop: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![10f64.powf(start)],
        _ => {
            let step = (stop - start) / (n - 1) as f64;
            (0..n)
                .map(|i| 10f64.powf(start + step * i as f64))
                .collect()
        }
    }
}

/// Classical gain and phase margins read off a swept response.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct StabilityMargins {
    /// −|H| in dB where the phase crosses −180° (mod 360°)
    pub gain_margin_db: Option<f64>,
    /// Frequency (rad/s) of that phase crossover
    pub phase_crossover: Option<f64>,
    /// 180° + ∠H where |H| crosses 0 dB
    pub phase_margin_deg: Option<f64>,
    /// Frequency (rad/s) of that gain crossover
    pub gain_crossover: Option<f64>,
}

fn crossing(x0: f64, x1: f64, level: f64) -> f64 {
    (level - x0) / (x1 - x0)
}

fn interpolate_log(omega0: f64, omega1: f64, t: f64) -> f64 {
    if omega0 > 0.0 && omega1 > 0.0 {
        (omega0.ln() + t * (omega1.ln() - omega0.ln())).exp()
    } else {
        omega0 + t * (omega1 - omega0)
    }
}

/// Margins at the first gain and phase crossovers of an unwrapped sweep
/// (see [`TransferFunction::bode`]). Crossings are interpolated linearly in
/// log-frequency between neighbouring samples; a margin is `None` when the
/// sweep never crosses.
pub fn stability_margins(points: &[FrequencyPoint]) -> StabilityMargins {
    let mut margins = StabilityMargins::default();

    for pair in points.windows(2) {
        let (p0, p1) = (&pair[0], &pair[1]);

        if margins.gain_crossover.is_none()
            && (p0.magnitude_db >= 0.0) != (p1.magnitude_db >= 0.0)
        {
            let t = crossing(p0.magnitude_db, p1.magnitude_db, 0.0);
            let phase = p0.phase_deg + t * (p1.phase_deg - p0.phase_deg);
            let mut margin = (phase + 180.0).rem_euclid(360.0);
            if margin > 180.0 {
                margin -= 360.0;
            }
            margins.gain_crossover = Some(interpolate_log(p0.omega, p1.omega, t));
            margins.phase_margin_deg = Some(margin);
        }

        let turn0 = ((p0.phase_deg + 180.0) / 360.0).floor();
        let turn1 = ((p1.phase_deg + 180.0) / 360.0).floor();
        if margins.phase_crossover.is_none() && turn0 != turn1 {
            let level = turn0.max(turn1) * 360.0 - 180.0;
            let t = crossing(p0.phase_deg, p1.phase_deg, level);
            let magnitude = p0.magnitude_db + t * (p1.magnitude_db - p0.magnitude_db);
            margins.phase_crossover = Some(interpolate_log(p0.omega, p1.omega, t));
            margins.gain_margin_db = Some(-magnitude);
        }
    }
    margins
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::TAU;

    #[test]
    fn test_open_loop_coefficients() {
        let tf = open_loop_transfer_function(6.5, 2.0, 50.0, 1.0).unwrap();
        assert_eq!(tf.num, vec![1.0, 0.0]);
        assert_eq!(tf.den[0], 13.0);
        assert_eq!(tf.den[1], 2.0);
        assert!((tf.den[2] - TAU * 50.0).abs() < 1e-12);
        assert_eq!(tf.order(), 2);
        assert!(matches!(
            open_loop_transfer_function(0.0, 2.0, 50.0, 1.0),
            Err(TopsError::Domain(_))
        ));
    }

    #[test]
    fn test_governor_has_unity_dc_gain_times_kgov() {
        let gov = governor_transfer_function(2.0, 0.5).unwrap();
        let dc = gov.evaluate(Complex64::new(0.0, 0.0)).unwrap();
        assert!((dc.re - 0.5).abs() < 1e-12);
        assert!(dc.im.abs() < 1e-12);
        // high-frequency gain: −T_w·K_gov / (0.5·T_w) = −2·K_gov
        let hf = gov.evaluate(Complex64::new(0.0, 1e9)).unwrap();
        assert!((hf.re + 1.0).abs() < 1e-6);
        assert!(governor_transfer_function(-1.0, 1.0).is_err());
    }

    #[test]
    fn test_series_multiplies_responses() {
        let ol = open_loop_transfer_function(6.5, 2.0, 50.0, 1.0).unwrap();
        let gov = governor_transfer_function(2.0, 1.0).unwrap();
        let both = combined(&ol, &gov).unwrap();
        assert_eq!(both.name, "Open Loop with Governor");
        assert_eq!(both.order(), 3);
        for omega in [0.1, 1.0, 4.9, 30.0] {
            let s = Complex64::new(0.0, omega);
            let product = ol.evaluate(s).unwrap() * gov.evaluate(s).unwrap();
            assert!((both.evaluate(s).unwrap() - product).norm() < 1e-12);
        }
    }

    #[test]
    fn test_zero_denominator_is_rejected() {
        assert!(matches!(
            TransferFunction::new(&[1.0], &[0.0, 0.0], "bad"),
            Err(TopsError::Domain(_))
        ));
        assert!(TransferFunction::new(&[1.0], &[], "bad").is_err());
        let tf = TransferFunction::new(&[0.0, 0.0, 3.0], &[0.0, 1.0, 1.0], "trimmed").unwrap();
        assert_eq!(tf.num, vec![3.0]);
        assert_eq!(tf.den, vec![1.0, 1.0]);
    }

    #[test]
    fn test_integrator_response() {
        let integrator = TransferFunction::new(&[1.0], &[1.0, 0.0], "1/s").unwrap();
        let point = integrator.frequency_response(10.0).unwrap();
        assert!((point.magnitude_db + 20.0).abs() < 1e-12);
        assert!((point.phase_deg + 90.0).abs() < 1e-12);
        assert!(integrator.frequency_response(0.0).is_err());
    }

    #[test]
    fn test_bode_phase_is_unwrapped() {
        // triple pole at −1 sweeps phase from 0° to −270°
        let tf = TransferFunction::new(&[1.0], &[1.0, 3.0, 3.0, 1.0], "triple").unwrap();
        let points = tf.bode(&logspace(-2.0, 3.0, 200)).unwrap();
        for pair in points.windows(2) {
            assert!((pair[1].phase_deg - pair[0].phase_deg).abs() < 180.0);
        }
        assert!((points.last().unwrap().phase_deg + 270.0).abs() < 1.0);
    }

    #[test]
    fn test_margins_of_triple_pole() {
        // K/(s+1)³ with K = 4: phase crossover at ω = √3 where |H| = K/8
        let tf = TransferFunction::new(&[4.0], &[1.0, 3.0, 3.0, 1.0], "plant").unwrap();
        let points = tf.bode(&logspace(-2.0, 2.0, 4000)).unwrap();
        let margins = stability_margins(&points);

        let gm = margins.gain_margin_db.unwrap();
        assert!((gm - 20.0 * 2f64.log10()).abs() < 1e-2);
        assert!((margins.phase_crossover.unwrap() - 3f64.sqrt()).abs() < 1e-2);

        // |H| = 1 where (1 + ω²)^{3/2} = 4
        let wc = (4f64.powf(2.0 / 3.0) - 1.0).sqrt();
        assert!((margins.gain_crossover.unwrap() - wc).abs() < 1e-2);
        let expected_pm = 180.0 - 3.0 * wc.atan().to_degrees();
        assert!((margins.phase_margin_deg.unwrap() - expected_pm).abs() < 0.1);
    }

    #[test]
    fn test_no_crossover_means_no_margin() {
        let tf = TransferFunction::new(&[0.1], &[1.0, 1.0], "lag").unwrap();
        let margins = stability_margins(&tf.bode(&logspace(-1.0, 1.0, 50)).unwrap());
        assert_eq!(margins, StabilityMargins::default());
    }

    #[test]
    fn test_logspace_decades() {
        let values = logspace(-1.0, 2.0, 4);
        let expected = [0.1, 1.0, 10.0, 100.0];
        for (v, e) in values.iter().zip(expected) {
            assert!((v - e).abs() < 1e-12 * e.max(1.0));
        }
    }

    #[test]
    fn test_display_lists_terms() {
        let gov = governor_transfer_function(2.0, 1.0).unwrap();
        assert_eq!(gov.to_string(), "GOV: (-2·s + 1) / (1·s + 1)");
    }
}
