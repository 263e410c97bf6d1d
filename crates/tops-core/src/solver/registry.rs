use super::backend::{ClosedFormEigen, EigenBackend, FaerEigen};
use crate::{TopsError, TopsResult};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::Arc;

/// Simple registry of available eigenvalue backends.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EigenSolverKind {
    #[default]
    ClosedForm,
    Faer,
}

impl FromStr for EigenSolverKind {
    type Err = TopsError;

    fn from_str(input: &str) -> TopsResult<Self> {
        match input.to_ascii_lowercase().as_str() {
            "closed-form" | "closed_form" | "default" => Ok(EigenSolverKind::ClosedForm),
            "faer" => Ok(EigenSolverKind::Faer),
            other => Err(TopsError::Config(format!(
                "unknown eigen solver '{}'; supported values: {}",
                other,
                Self::available().join(", ")
            ))),
        }
    }
}

impl EigenSolverKind {
    pub fn build_solver(self) -> Arc<dyn EigenBackend> {
        match self {
            EigenSolverKind::ClosedForm => Arc::new(ClosedFormEigen),
            EigenSolverKind::Faer => Arc::new(FaerEigen),
        }
    }

    pub fn available() -> &'static [&'static str] {
        &["closed-form", "faer"]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EigenSolverKind::ClosedForm => "closed-form",
            EigenSolverKind::Faer => "faer",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_complex::Complex64;

    fn sorted(mut values: [Complex64; 2]) -> [Complex64; 2] {
        values.sort_by(|a, b| b.im.total_cmp(&a.im).then(b.re.total_cmp(&a.re)));
        values
    }

    #[test]
    fn eigen_kind_parsing_supports_all_engines() {
        assert_eq!(
            "closed-form".parse::<EigenSolverKind>().unwrap(),
            EigenSolverKind::ClosedForm
        );
        assert_eq!("FAER".parse::<EigenSolverKind>().unwrap(), EigenSolverKind::Faer);
        assert!(matches!(
            "lapack".parse::<EigenSolverKind>(),
            Err(TopsError::Config(_))
        ));
    }

    #[test]
    fn backends_agree_on_rotation_matrix() {
        // [[0, 2], [-2, 0]] has eigenvalues ±2j
        let matrix = [[0.0, 2.0], [-2.0, 0.0]];
        for kind in [EigenSolverKind::ClosedForm, EigenSolverKind::Faer] {
            let values = sorted(kind.build_solver().eigenvalues(&matrix).unwrap());
            assert!(values[0].re.abs() < 1e-10, "{}", kind.as_str());
            assert!((values[0].im - 2.0).abs() < 1e-10, "{}", kind.as_str());
            assert!((values[1].im + 2.0).abs() < 1e-10, "{}", kind.as_str());
        }
    }

    #[test]
    fn backends_agree_on_real_spectrum() {
        let matrix = [[-1.0, 0.0], [0.0, -3.0]];
        for kind in [EigenSolverKind::ClosedForm, EigenSolverKind::Faer] {
            let values = sorted(kind.build_solver().eigenvalues(&matrix).unwrap());
            assert!((values[0].re + 1.0).abs() < 1e-10);
            assert!((values[1].re + 3.0).abs() < 1e-10);
            assert!(values.iter().all(|v| v.im.abs() < 1e-10));
        }
    }

    #[test]
    fn non_finite_matrix_is_domain_error() {
        let matrix = [[f64::NAN, 1.0], [0.0, 0.0]];
        let err = ClosedFormEigen.eigenvalues(&matrix).unwrap_err();
        assert!(matches!(err, TopsError::Domain(_)));
    }
}
