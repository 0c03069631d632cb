//! Dense symmetric linear algebra for the normal equations
//!
//! The regression solves `G w = b` where `G` is a centered Gram matrix. One-hot
//! designs make `G` singular, so the system is solved through an
//! eigendecomposition and small eigenvalues are dropped, giving the
//! minimum-norm solution.

use crate::error::ModelError;
use ndarray::{Array1, Array2};

/// Result of eigenvalue decomposition
#[derive(Debug, Clone)]
pub struct EigenDecomposition {
    /// Eigenvalues (sorted in descending order)
    pub eigenvalues: Array1<f64>,
    /// Eigenvectors (columns are eigenvectors)
    pub eigenvectors: Array2<f64>,
}

/// Cyclic Jacobi eigenvalue decomposition for symmetric matrices
///
/// Each sweep rotates away every off-diagonal pair once. Iteration stops when
/// the off-diagonal Frobenius norm falls below `tolerance` times the norm of
/// the input, or after `max_sweeps` sweeps.
///
/// # Arguments
/// * `matrix` - Symmetric matrix to decompose
/// * `max_sweeps` - Maximum number of full sweeps
/// * `tolerance` - Relative convergence tolerance for off-diagonal elements
///
/// # Returns
/// * Eigenvalues and eigenvectors
pub fn jacobi_eigendecomp(
    matrix: &Array2<f64>,
    max_sweeps: usize,
    tolerance: f64,
) -> Result<EigenDecomposition, ModelError> {
    let n = matrix.nrows();
    if n != matrix.ncols() {
        return Err(ModelError::DimensionMismatch {
            expected: n,
            actual: matrix.ncols(),
        });
    }
    if matrix.iter().any(|v| !v.is_finite()) {
        return Err(ModelError::NonFinite("eigendecomposition input".to_string()));
    }

    // Initialize: A = copy of input matrix, V = identity
    let mut a = matrix.clone();
    let mut v = Array2::<f64>::eye(n);

    let scale = frobenius_norm(matrix);
    let threshold = tolerance * scale;

    for _sweep in 0..max_sweeps {
        if off_diagonal_norm(&a) <= threshold {
            break;
        }

        for p in 0..n {
            for q in (p + 1)..n {
                if a[[p, q]].abs() <= f64::MIN_POSITIVE {
                    continue;
                }
                let (cos_theta, sin_theta) = compute_rotation(a[[p, p]], a[[q, q]], a[[p, q]]);
                apply_jacobi_rotation(&mut a, &mut v, p, q, cos_theta, sin_theta);
            }
        }
    }

    // Extract eigenvalues from diagonal
    let eigenvalues: Array1<f64> = a.diag().to_owned();

    // Sort eigenvalues and eigenvectors in descending order
    let mut indices: Vec<usize> = (0..n).collect();
    indices.sort_by(|&i, &j| {
        eigenvalues[j]
            .partial_cmp(&eigenvalues[i])
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let sorted_eigenvalues = indices.iter().map(|&i| eigenvalues[i]).collect();
    let mut sorted_eigenvectors = Array2::<f64>::zeros((n, n));
    for (new_idx, &old_idx) in indices.iter().enumerate() {
        sorted_eigenvectors
            .column_mut(new_idx)
            .assign(&v.column(old_idx));
    }

    Ok(EigenDecomposition {
        eigenvalues: sorted_eigenvalues,
        eigenvectors: sorted_eigenvectors,
    })
}

/// Minimum-norm solution of `matrix * x = rhs` for symmetric positive
/// semi-definite `matrix`
///
/// Eigenvalues at or below `rcond` times the largest eigenvalue are treated
/// as zero, so directions in the null space get no weight.
pub fn pseudo_solve(
    matrix: &Array2<f64>,
    rhs: &Array1<f64>,
    rcond: f64,
) -> Result<Array1<f64>, ModelError> {
    let n = matrix.nrows();
    if rhs.len() != n {
        return Err(ModelError::DimensionMismatch {
            expected: n,
            actual: rhs.len(),
        });
    }
    if n == 0 {
        return Ok(Array1::zeros(0));
    }

    let decomp = jacobi_eigendecomp(matrix, 100, 1e-14)?;
    let largest = decomp.eigenvalues.iter().cloned().fold(0.0_f64, f64::max);
    let cutoff = rcond * largest;

    let mut solution = Array1::<f64>::zeros(n);
    for (k, &lambda) in decomp.eigenvalues.iter().enumerate() {
        if lambda <= cutoff || lambda <= 0.0 {
            continue;
        }
        let vk = decomp.eigenvectors.column(k);
        let coeff = vk.dot(rhs) / lambda;
        solution.scaled_add(coeff, &vk);
    }

    Ok(solution)
}

fn frobenius_norm(matrix: &Array2<f64>) -> f64 {
    matrix.iter().map(|&x| x * x).sum::<f64>().sqrt()
}

fn off_diagonal_norm(matrix: &Array2<f64>) -> f64 {
    let n = matrix.nrows();
    let mut sum = 0.0;
    for i in 0..n {
        for j in (i + 1)..n {
            sum += 2.0 * matrix[[i, j]] * matrix[[i, j]];
        }
    }
    sum.sqrt()
}

/// Compute the rotation (cos, sin) for Jacobi rotation
/// Returns (cos_theta, sin_theta) tuple
fn compute_rotation(app: f64, aqq: f64, apq: f64) -> (f64, f64) {
    if apq.abs() < 1e-300 {
        return (1.0, 0.0);
    }

    let tau = (aqq - app) / (2.0 * apq);
    let t = if tau >= 0.0 {
        1.0 / (tau + (1.0 + tau * tau).sqrt())
    } else {
        -1.0 / (-tau + (1.0 + tau * tau).sqrt())
    };

    // cos = 1/sqrt(1 + t^2), sin = t * cos
    let cos_theta = 1.0 / (1.0 + t * t).sqrt();
    let sin_theta = t * cos_theta;

    (cos_theta, sin_theta)
}

/// Apply a Jacobi rotation to matrix A and eigenvector matrix V
fn apply_jacobi_rotation(
    a: &mut Array2<f64>,
    v: &mut Array2<f64>,
    p: usize,
    q: usize,
    cos_theta: f64,
    sin_theta: f64,
) {
    let n = a.nrows();

    // Rotate A
    let app = a[[p, p]];
    let aqq = a[[q, q]];
    let apq = a[[p, q]];

    a[[p, p]] = cos_theta * cos_theta * app - 2.0 * cos_theta * sin_theta * apq
        + sin_theta * sin_theta * aqq;
    a[[q, q]] = sin_theta * sin_theta * app
        + 2.0 * cos_theta * sin_theta * apq
        + cos_theta * cos_theta * aqq;
    a[[p, q]] = 0.0;
    a[[q, p]] = 0.0;

    // Rotate rows/columns p and q
    for i in 0..n {
        if i != p && i != q {
            let aip = a[[i, p]];
            let aiq = a[[i, q]];

            a[[i, p]] = cos_theta * aip - sin_theta * aiq;
            a[[p, i]] = a[[i, p]];

            a[[i, q]] = sin_theta * aip + cos_theta * aiq;
            a[[q, i]] = a[[i, q]];
        }
    }

    // Update eigenvectors
    for i in 0..n {
        let vip = v[[i, p]];
        let viq = v[[i, q]];

        v[[i, p]] = cos_theta * vip - sin_theta * viq;
        v[[i, q]] = sin_theta * vip + cos_theta * viq;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    #[test]
    fn test_jacobi_eigendecomp_diagonal() {
        let matrix = array![[4.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 2.0]];
        let decomp = jacobi_eigendecomp(&matrix, 100, 1e-14).unwrap();

        // Eigenvalues should be 4, 2, 1 (in descending order)
        assert_abs_diff_eq!(decomp.eigenvalues[0], 4.0, epsilon = 1e-12);
        assert_abs_diff_eq!(decomp.eigenvalues[1], 2.0, epsilon = 1e-12);
        assert_abs_diff_eq!(decomp.eigenvalues[2], 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_jacobi_eigendecomp_reconstructs() {
        let matrix = array![[2.0, 1.0, 1.0], [1.0, 2.0, 1.0], [1.0, 1.0, 2.0]];
        let decomp = jacobi_eigendecomp(&matrix, 100, 1e-14).unwrap();

        // Eigenvalues of this matrix are 4, 1, 1
        assert_abs_diff_eq!(decomp.eigenvalues[0], 4.0, epsilon = 1e-10);
        assert_abs_diff_eq!(decomp.eigenvalues[2], 1.0, epsilon = 1e-10);

        let v = &decomp.eigenvectors;
        let lambda = Array2::from_diag(&decomp.eigenvalues);
        let reconstructed = v.dot(&lambda).dot(&v.t());
        for (x, y) in matrix.iter().zip(reconstructed.iter()) {
            assert_abs_diff_eq!(*x, *y, epsilon = 1e-10);
        }
    }

    #[test]
    fn test_jacobi_rejects_non_square() {
        let matrix = Array2::<f64>::zeros((2, 3));
        assert!(matches!(
            jacobi_eigendecomp(&matrix, 10, 1e-12),
            Err(ModelError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn test_pseudo_solve_full_rank() {
        let matrix = array![[4.0, 1.0], [1.0, 3.0]];
        let rhs = array![1.0, 2.0];
        let x = pseudo_solve(&matrix, &rhs, 1e-12).unwrap();

        let back = matrix.dot(&x);
        assert_abs_diff_eq!(back[0], 1.0, epsilon = 1e-10);
        assert_abs_diff_eq!(back[1], 2.0, epsilon = 1e-10);
    }

    #[test]
    fn test_pseudo_solve_singular_min_norm() {
        // [[1, 1], [1, 1]] x = [2, 2] has solutions x0 + x1 = 2; min-norm is (1, 1)
        let matrix = array![[1.0, 1.0], [1.0, 1.0]];
        let rhs = array![2.0, 2.0];
        let x = pseudo_solve(&matrix, &rhs, 1e-10).unwrap();

        assert_abs_diff_eq!(x[0], 1.0, epsilon = 1e-10);
        assert_abs_diff_eq!(x[1], 1.0, epsilon = 1e-10);
    }

    #[test]
    fn test_pseudo_solve_zero_matrix() {
        let matrix = Array2::<f64>::zeros((2, 2));
        let x = pseudo_solve(&matrix, &array![0.0, 0.0], 1e-10).unwrap();
        assert_eq!(x, array![0.0, 0.0]);
    }
}
