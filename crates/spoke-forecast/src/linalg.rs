//! Dense solvers for the ridge normal equations.

use ndarray::{Array1, Array2};

/// Solve `A x = b` for a symmetric positive definite `A` via Cholesky.
///
/// Returns `None` if `A` is not square, does not match `b`, or is not
/// positive definite.
pub(crate) fn cholesky_solve(a: &Array2<f64>, b: &Array1<f64>) -> Option<Array1<f64>> {
    let n = a.nrows();
    if a.ncols() != n || b.len() != n {
        return None;
    }

    // A = L * L^T
    let mut l = Array2::<f64>::zeros((n, n));
    for i in 0..n {
        for j in 0..=i {
            let mut sum = a[[i, j]];
            for k in 0..j {
                sum -= l[[i, k]] * l[[j, k]];
            }

            if i == j {
                if sum <= 0.0 || !sum.is_finite() {
                    return None;
                }
                l[[i, i]] = sum.sqrt();
            } else {
                l[[i, j]] = sum / l[[j, j]];
            }
        }
    }

    // Forward substitution: L z = b
    let mut z = Array1::<f64>::zeros(n);
    for i in 0..n {
        let mut sum = b[i];
        for k in 0..i {
            sum -= l[[i, k]] * z[k];
        }
        z[i] = sum / l[[i, i]];
    }

    // Back substitution: L^T x = z
    let mut x = Array1::<f64>::zeros(n);
    for i in (0..n).rev() {
        let mut sum = z[i];
        for k in (i + 1)..n {
            sum -= l[[k, i]] * x[k];
        }
        x[i] = sum / l[[i, i]];
    }

    Some(x)
}

/// Solve the ridge problem `min ||y - X b||^2 + sum_j penalty_j * b_j^2`.
pub(crate) fn ridge_solve(
    design: &Array2<f64>,
    target: &Array1<f64>,
    penalties: &Array1<f64>,
) -> Option<Array1<f64>> {
    let mut gram = design.t().dot(design);
    for (j, &penalty) in penalties.iter().enumerate() {
        gram[[j, j]] += penalty;
    }
    let rhs = design.t().dot(target);
    cholesky_solve(&gram, &rhs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    #[test]
    fn test_cholesky_solve() {
        let a = array![[4.0, 2.0], [2.0, 3.0]];
        let b = array![2.0, 1.0];
        let x = cholesky_solve(&a, &b).unwrap();

        let check = a.dot(&x);
        assert_relative_eq!(check[0], 2.0, epsilon = 1e-12);
        assert_relative_eq!(check[1], 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_not_positive_definite() {
        let a = array![[1.0, 2.0], [2.0, 1.0]];
        let b = array![1.0, 1.0];
        assert!(cholesky_solve(&a, &b).is_none());
    }

    #[test]
    fn test_dimension_mismatch() {
        let a = array![[1.0, 0.0], [0.0, 1.0]];
        let b = array![1.0, 1.0, 1.0];
        assert!(cholesky_solve(&a, &b).is_none());
    }

    #[test]
    fn test_ridge_recovers_line() {
        // y = 1 + 2t with an unpenalised intercept and slope
        let design = array![[1.0, 0.0], [1.0, 1.0], [1.0, 2.0], [1.0, 3.0]];
        let target = array![1.0, 3.0, 5.0, 7.0];
        let penalties = array![1e-10, 1e-10];

        let beta = ridge_solve(&design, &target, &penalties).unwrap();
        assert_relative_eq!(beta[0], 1.0, epsilon = 1e-6);
        assert_relative_eq!(beta[1], 2.0, epsilon = 1e-6);
    }
}
