//! Weighted linear least squares through SVD.

use crate::error::IrmapError;
use nalgebra::{DMatrix, DVector};

/// Solve `min || diag(w) * (A x - b) ||`.
///
/// Weights multiply residuals (not squared residuals). Columns are scaled to
/// unit norm before the SVD so polynomial terms of very different magnitude
/// stay well conditioned; the solution is unscaled afterwards.
pub fn weighted_lstsq(
    design: &DMatrix<f64>,
    rhs: &DVector<f64>,
    weights: &[f64],
) -> Result<DVector<f64>, IrmapError> {
    let (rows, cols) = design.shape();
    if rhs.len() != rows || weights.len() != rows {
        return Err(IrmapError::Dataset(format!(
            "least squares shape mismatch: {rows} rows, {} targets, {} weights",
            rhs.len(),
            weights.len()
        )));
    }
    if rows < cols {
        return Err(IrmapError::Dataset(format!(
            "need at least {cols} points, got {rows}"
        )));
    }

    let mut a = DMatrix::from_fn(rows, cols, |r, c| design[(r, c)] * weights[r]);
    let b = DVector::from_fn(rows, |r, _| rhs[r] * weights[r]);

    let mut scale = DVector::from_element(cols, 1.0);
    for c in 0..cols {
        let norm = a.column(c).norm();
        if norm > 0.0 && norm.is_finite() {
            scale[c] = norm;
            a.column_mut(c).unscale_mut(norm);
        }
    }

    let svd = a.svd(true, true);
    let tol = f64::EPSILON * rows as f64 * svd.singular_values.max();
    let rank = svd.rank(tol);
    if rank < cols {
        return Err(IrmapError::Dataset(format!(
            "design matrix is rank deficient (rank {rank} < {cols}); need more distinct inputs"
        )));
    }
    let x = svd
        .solve(&b, tol)
        .map_err(|e| IrmapError::Dataset(format!("least squares solve failed: {e}")))?;
    Ok(x.component_div(&scale))
}
