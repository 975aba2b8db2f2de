//! Levenberg-Marquardt solver for small dense least-squares problems.
//!
//! Minimizes `0.5 * ||r(p)||^2` with Marquardt diagonal scaling and an
//! adaptive damping schedule driven by the gain ratio `rho`.

use crate::error::IrmapError;
use nalgebra::{DMatrix, DVector};

/// Floor for the scaled diagonal so a flat Jacobian column stays invertible.
const DIAG_FLOOR: f64 = 1e-12;

/// A residual model the solver can evaluate.
pub trait LeastSquaresProblem {
    /// `r(p)`, one entry per observation.
    fn residuals(&self, params: &DVector<f64>) -> DVector<f64>;
    /// `dr/dp`, shape `observations x params`.
    fn jacobian(&self, params: &DVector<f64>) -> DMatrix<f64>;
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LmOptions {
    pub max_iterations: usize,
    /// Relative cost reduction (actual and predicted) below which we stop.
    pub ftol: f64,
    /// Relative step size below which we stop.
    pub xtol: f64,
    /// Absolute gradient magnitude below which we stop.
    pub gtol: f64,
}

impl Default for LmOptions {
    fn default() -> Self {
        Self {
            max_iterations: 200,
            ftol: 1e-12,
            xtol: 1e-10,
            gtol: 1e-15,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LmOutcome {
    pub params: DVector<f64>,
    /// `0.5 * ||r||^2` at `params`.
    pub cost: f64,
    pub iterations: usize,
}

/// Damping schedule: shrink after good steps, grow after bad ones.
#[derive(Debug, Clone)]
struct AdaptiveDamping {
    lambda: f64,
    factor: f64,
    min_lambda: f64,
    max_lambda: f64,
}

impl AdaptiveDamping {
    fn new() -> Self {
        Self {
            lambda: 1e-3,
            factor: 10.0,
            min_lambda: 1e-12,
            max_lambda: 1e7,
        }
    }

    fn damping(&self) -> f64 {
        self.lambda
    }

    /// `rho` is actual over predicted cost reduction.
    fn update(&mut self, rho: f64) {
        if rho > 0.75 {
            self.lambda = (self.lambda / self.factor).max(self.min_lambda);
        } else if rho > 0.25 {
            self.lambda = (self.lambda / self.factor.sqrt()).max(self.min_lambda);
        } else if rho < 0.0 {
            self.lambda = (self.lambda * self.factor).min(self.max_lambda);
        }
    }

    fn reject_step(&mut self) {
        self.lambda = (self.lambda * self.factor).min(self.max_lambda);
    }

    fn is_stuck(&self) -> bool {
        self.lambda >= self.max_lambda * 0.99
    }
}

fn half_norm_sq(r: &DVector<f64>) -> f64 {
    if r.iter().all(|v| v.is_finite()) {
        0.5 * r.norm_squared()
    } else {
        f64::INFINITY
    }
}

/// Run LM from `initial`. Never returns an unconverged estimate.
pub fn minimize<P: LeastSquaresProblem>(
    problem: &P,
    initial: DVector<f64>,
    opts: &LmOptions,
) -> Result<LmOutcome, IrmapError> {
    let n = initial.len();
    let mut damping = AdaptiveDamping::new();
    let mut params = initial;
    let mut residuals = problem.residuals(&params);
    let mut cost = half_norm_sq(&residuals);
    if !cost.is_finite() {
        return Err(IrmapError::Convergence(
            "residuals are not finite at the initial guess".into(),
        ));
    }

    let done = |params: DVector<f64>, cost: f64, iterations: usize| {
        tracing::debug!(iterations, cost, "levenberg-marquardt converged");
        Ok(LmOutcome {
            params,
            cost,
            iterations,
        })
    };

    for iter in 1..=opts.max_iterations {
        let jac = problem.jacobian(&params);
        let jtj = jac.transpose() * &jac;
        let grad = jac.transpose() * &residuals;
        if !grad.iter().all(|v| v.is_finite()) {
            return Err(IrmapError::Convergence(format!(
                "non-finite gradient at iteration {iter}"
            )));
        }
        if cost == 0.0 || grad.amax() <= opts.gtol {
            return done(params, cost, iter);
        }

        let mut lhs = jtj.clone();
        for k in 0..n {
            lhs[(k, k)] += damping.damping() * jtj[(k, k)].max(DIAG_FLOOR);
        }
        let Some(chol) = lhs.cholesky() else {
            damping.reject_step();
            if damping.is_stuck() {
                return Err(IrmapError::Convergence(format!(
                    "normal equations singular at iteration {iter}"
                )));
            }
            continue;
        };
        let step = chol.solve(&(-&grad));
        let candidate = &params + &step;
        let cand_residuals = problem.residuals(&candidate);
        let cand_cost = half_norm_sq(&cand_residuals);
        let small_step = step.norm() <= opts.xtol * (params.norm() + opts.xtol);

        if cand_cost < cost {
            let predicted = -grad.dot(&step) - 0.5 * step.dot(&(&jtj * &step));
            let reduction = cost - cand_cost;
            let rho = if predicted > 0.0 {
                reduction / predicted
            } else {
                0.0
            };
            let previous = cost;
            params = candidate;
            residuals = cand_residuals;
            cost = cand_cost;
            damping.update(rho);
            tracing::trace!(iter, cost, rho, lambda = damping.damping(), "lm step accepted");
            if small_step || (reduction <= opts.ftol * previous && predicted <= opts.ftol * previous)
            {
                return done(params, cost, iter);
            }
        } else {
            if small_step {
                return done(params, cost, iter);
            }
            damping.reject_step();
            tracing::trace!(iter, lambda = damping.damping(), "lm step rejected");
            if damping.is_stuck() {
                return Err(IrmapError::Convergence(format!(
                    "damping saturated after {iter} iterations (cost {cost:e})"
                )));
            }
        }
    }

    Err(IrmapError::Convergence(format!(
        "no convergence within {} iterations (cost {cost:e})",
        opts.max_iterations
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    /// r = [p0 - 3, 2 * (p1 + 1)]
    struct Bowl;

    impl LeastSquaresProblem for Bowl {
        fn residuals(&self, p: &DVector<f64>) -> DVector<f64> {
            DVector::from_vec(vec![p[0] - 3.0, 2.0 * (p[1] + 1.0)])
        }
        fn jacobian(&self, _p: &DVector<f64>) -> DMatrix<f64> {
            DMatrix::from_row_slice(2, 2, &[1.0, 0.0, 0.0, 2.0])
        }
    }

    #[test]
    fn linear_problem_converges_quickly() {
        let out = minimize(&Bowl, DVector::from_vec(vec![0.0, 0.0]), &LmOptions::default())
            .unwrap();
        assert!((out.params[0] - 3.0).abs() < 1e-9);
        assert!((out.params[1] + 1.0).abs() < 1e-9);
        assert!(out.cost < 1e-18);
        assert!(out.iterations < 20);
    }

    #[test]
    fn iteration_cap_is_a_convergence_error() {
        let opts = LmOptions {
            max_iterations: 0,
            ..LmOptions::default()
        };
        let err = minimize(&Bowl, DVector::from_vec(vec![0.0, 0.0]), &opts).unwrap_err();
        assert!(matches!(err, IrmapError::Convergence(_)));
    }

    #[test]
    fn damping_schedule_moves_both_ways() {
        let mut d = AdaptiveDamping::new();
        let start = d.damping();
        d.update(0.9);
        assert!(d.damping() < start);
        d.update(-1.0);
        d.update(-1.0);
        assert!(d.damping() > start);
        for _ in 0..20 {
            d.reject_step();
        }
        assert!(d.is_stuck());
    }
}
