use ndarray::{Array1, Array2};

use crate::{Error, Result};

/// Pivots smaller than this are treated as zero.
const SINGULARITY_THRESHOLD: f64 = 1e-12;

/// Solves `a x = b` by Gaussian elimination with partial pivoting.
pub(crate) fn solve(mut a: Array2<f64>, mut b: Array1<f64>) -> Result<Array1<f64>> {
    let n = b.len();
    debug_assert_eq!(a.dim(), (n, n));

    for column in 0..n {
        let pivot = (column..n)
            .max_by(|&i, &j| a[[i, column]].abs().total_cmp(&a[[j, column]].abs()))
            .unwrap_or(column);
        if a[[pivot, column]].abs() < SINGULARITY_THRESHOLD {
            return Err(Error::Singular);
        }
        if pivot != column {
            for k in 0..n {
                a.swap([column, k], [pivot, k]);
            }
            b.swap(column, pivot);
        }

        for row in column + 1..n {
            let factor = a[[row, column]] / a[[column, column]];
            if factor == 0.0 {
                continue;
            }
            for k in column..n {
                let delta = factor * a[[column, k]];
                a[[row, k]] -= delta;
            }
            let delta = factor * b[column];
            b[row] -= delta;
        }
    }

    let mut x = Array1::zeros(n);
    for row in (0..n).rev() {
        let tail: f64 = (row + 1..n).map(|k| a[[row, k]] * x[k]).sum();
        x[row] = (b[row] - tail) / a[[row, row]];
    }
    Ok(x)
}

/// `m` raised to `exponent`, by repeated squaring. The zeroth power is the identity.
pub(crate) fn matrix_power(m: &Array2<f64>, exponent: usize) -> Array2<f64> {
    let mut result = Array2::eye(m.nrows());
    let mut base = m.clone();
    let mut exponent = exponent;
    while exponent > 0 {
        if exponent & 1 == 1 {
            result = result.dot(&base);
        }
        exponent >>= 1;
        if exponent > 0 {
            base = base.dot(&base);
        }
    }
    result
}
