use crate::{TopsError, TopsResult};
use faer::complex_native::c64;
use faer::{FaerMat, Mat};
use num_complex::Complex64;

/// Trait for computing the eigenvalues of a small dense real matrix.
///
/// The swing-equation analysis only ever needs 2×2 systems, so the trait is
/// fixed-size. Returned eigenvalues are unordered; callers sort them.
pub trait EigenBackend: Send + Sync {
    fn eigenvalues(&self, matrix: &[[f64; 2]; 2]) -> TopsResult<[Complex64; 2]>;
}

fn check_finite(matrix: &[[f64; 2]; 2]) -> TopsResult<()> {
    if matrix.iter().flatten().all(|v| v.is_finite()) {
        Ok(())
    } else {
        Err(TopsError::domain(format!(
            "state matrix has non-finite entries: {:?}",
            matrix
        )))
    }
}

/// Characteristic-polynomial solve: λ² − tr(A)·λ + det(A) = 0.
#[derive(Debug, Clone, Default)]
pub struct ClosedFormEigen;

impl EigenBackend for ClosedFormEigen {
    fn eigenvalues(&self, matrix: &[[f64; 2]; 2]) -> TopsResult<[Complex64; 2]> {
        check_finite(matrix)?;

        let half_trace = 0.5 * (matrix[0][0] + matrix[1][1]);
        let det = matrix[0][0] * matrix[1][1] - matrix[0][1] * matrix[1][0];
        let disc = half_trace * half_trace - det;

        if disc >= 0.0 {
            let root = disc.sqrt();
            Ok([
                Complex64::new(half_trace + root, 0.0),
                Complex64::new(half_trace - root, 0.0),
            ])
        } else {
            let root = (-disc).sqrt();
            Ok([
                Complex64::new(half_trace, root),
                Complex64::new(half_trace, -root),
            ])
        }
    }
}

/// Dense eigen solver from faer (Hessenberg + shifted QR).
#[derive(Debug, Clone, Default)]
pub struct FaerEigen;

impl EigenBackend for FaerEigen {
    fn eigenvalues(&self, matrix: &[[f64; 2]; 2]) -> TopsResult<[Complex64; 2]> {
        check_finite(matrix)?;

        let mat = Mat::from_fn(2, 2, |i, j| matrix[i][j]);
        let values: Vec<c64> = mat.eigenvalues();
        if values.len() != 2 {
            return Err(TopsError::Other(format!(
                "faer returned {} eigenvalues for a 2x2 matrix",
                values.len()
            )));
        }

        Ok([
            Complex64::new(values[0].re, values[0].im),
            Complex64::new(values[1].re, values[1].im),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sorted(mut values: [Complex64; 2]) -> [Complex64; 2] {
        values.sort_by(|a, b| b.im.total_cmp(&a.im).then(b.re.total_cmp(&a.re)));
        values
    }

    #[test]
    fn test_faer_backend_matches_closed_form() {
        let matrix = [[0.0, 314.159_265], [-1.0 / 13.0, -2.0 / 13.0]];
        let faer = sorted(FaerEigen.eigenvalues(&matrix).unwrap());
        let closed = sorted(ClosedFormEigen.eigenvalues(&matrix).unwrap());
        for (a, b) in faer.iter().zip(&closed) {
            assert!((a - b).norm() < 1e-9, "{a} vs {b}");
        }
        assert!(faer[0].im > 0.0);
    }

    #[test]
    fn test_backends_reject_non_finite_matrix() {
        let matrix = [[f64::NAN, 1.0], [0.0, 1.0]];
        assert!(matches!(FaerEigen.eigenvalues(&matrix), Err(TopsError::Domain(_))));
        assert!(matches!(ClosedFormEigen.eigenvalues(&matrix), Err(TopsError::Domain(_))));
    }
}
