//! Sensor response curve calibration.
//!
//! Two closed-form models are fitted to (distance, raw response) pairs:
//!
//! - exponential: `a * exp(b * x) * exp(c * x^2)`, a weighted quadratic fit of
//!   `log(response)` with per-point weight `sqrt(response)`;
//! - power law: `a * x^b`, fitted directly on the response with
//!   Levenberg-Marquardt from `(a, b) = (1, 1)`.
//!
//! Both fits are pure functions of their input.

use crate::error::IrmapError;
use crate::lm::{self, LeastSquaresProblem, LmOptions};
use crate::lstsq::weighted_lstsq;
use nalgebra::{DMatrix, DVector};
use std::fmt;

/// Immutable, validated pairs of true distance and raw sensor response.
#[derive(Debug, Clone, PartialEq)]
pub struct CalibrationDataset {
    distance: Vec<f64>,
    response: Vec<f64>,
}

impl CalibrationDataset {
    pub fn new(distance: Vec<f64>, response: Vec<f64>) -> Result<Self, IrmapError> {
        check_pairs(&distance, &response)?;
        Ok(Self { distance, response })
    }

    pub fn distance(&self) -> &[f64] {
        &self.distance
    }

    pub fn response(&self) -> &[f64] {
        &self.response
    }

    pub fn len(&self) -> usize {
        self.distance.len()
    }

    pub fn is_empty(&self) -> bool {
        self.distance.is_empty()
    }
}

fn check_pairs(distances: &[f64], responses: &[f64]) -> Result<(), IrmapError> {
    if distances.len() != responses.len() {
        return Err(IrmapError::Dataset(format!(
            "{} distances but {} responses",
            distances.len(),
            responses.len()
        )));
    }
    if distances.is_empty() {
        return Err(IrmapError::Dataset("dataset is empty".into()));
    }
    Ok(())
}

/// A fitted response curve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FittedModel {
    /// `a * exp(b * x) * exp(c * x^2)`
    Exponential { a: f64, b: f64, c: f64 },
    /// `a * x^b`
    PowerLaw { a: f64, b: f64 },
}

impl FittedModel {
    pub fn evaluate(&self, x: f64) -> f64 {
        match *self {
            FittedModel::Exponential { a, b, c } => a * (b * x).exp() * (c * x * x).exp(),
            FittedModel::PowerLaw { a, b } => a * x.powf(b),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            FittedModel::Exponential { .. } => "exponential",
            FittedModel::PowerLaw { .. } => "power_law",
        }
    }
}

impl fmt::Display for FittedModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FittedModel::Exponential { a, b, c } => {
                write!(f, "{a} * exp({b} * x) * exp({c} * x^2)")
            }
            FittedModel::PowerLaw { a, b } => write!(f, "{a} * x^{b}"),
        }
    }
}

/// Human-readable equation with the fitted parameters substituted.
pub fn equation_string(model: &FittedModel) -> String {
    model.to_string()
}

/// Evaluate `model` at `x`.
pub fn evaluate(model: &FittedModel, x: f64) -> f64 {
    model.evaluate(x)
}

/// Residuals `a * x^b - y` for the power-law fit.
struct PowerLawProblem<'a> {
    x: &'a [f64],
    y: &'a [f64],
}

impl LeastSquaresProblem for PowerLawProblem<'_> {
    fn residuals(&self, p: &DVector<f64>) -> DVector<f64> {
        let (a, b) = (p[0], p[1]);
        DVector::from_iterator(
            self.x.len(),
            self.x.iter().zip(self.y).map(|(&x, &y)| a * x.powf(b) - y),
        )
    }

    fn jacobian(&self, p: &DVector<f64>) -> DMatrix<f64> {
        let (a, b) = (p[0], p[1]);
        DMatrix::from_fn(self.x.len(), 2, |r, c| {
            let x = self.x[r];
            if x == 0.0 {
                // x^b is flat in both parameters at the origin (b > 0)
                return 0.0;
            }
            let xb = x.powf(b);
            if c == 0 { xb } else { a * xb * x.ln() }
        })
    }
}

/// One row of the fitted-vs-observed overlay.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlayRow {
    pub distance: f64,
    pub observed: f64,
    pub predicted: f64,
}

/// Result of fitting both models to one dataset.
///
/// Each fit fails independently, so each keeps its own `Result`.
#[derive(Debug, Clone)]
pub struct CalibrationReport {
    pub exponential: Result<FittedModel, IrmapError>,
    pub power_law: Result<FittedModel, IrmapError>,
}

impl CalibrationReport {
    pub fn models(&self) -> impl Iterator<Item = &FittedModel> {
        [&self.exponential, &self.power_law]
            .into_iter()
            .filter_map(|r| r.as_ref().ok())
    }
}

/// Curve overlay for a plotting collaborator: observed vs predicted per point.
pub fn overlay(model: &FittedModel, dataset: &CalibrationDataset) -> Vec<OverlayRow> {
    dataset
        .distance()
        .iter()
        .zip(dataset.response())
        .map(|(&distance, &observed)| OverlayRow {
            distance,
            observed,
            predicted: model.evaluate(distance),
        })
        .collect()
}

/// Root-mean-square error of `model` over the dataset.
pub fn rms_error(model: &FittedModel, dataset: &CalibrationDataset) -> f64 {
    let n = dataset.len().max(1) as f64;
    let sum_sq: f64 = overlay(model, dataset)
        .iter()
        .map(|r| (r.predicted - r.observed).powi(2))
        .sum();
    (sum_sq / n).sqrt()
}

#[derive(Debug, Clone)]
pub struct CurveCalibrator {
    lm: LmOptions,
    initial_power_law: (f64, f64),
}

impl Default for CurveCalibrator {
    fn default() -> Self {
        Self {
            lm: LmOptions::default(),
            initial_power_law: (1.0, 1.0),
        }
    }
}

impl CurveCalibrator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_iterations(mut self, n: usize) -> Self {
        self.lm.max_iterations = n;
        self
    }

    pub fn with_initial_power_law(mut self, a: f64, b: f64) -> Self {
        self.initial_power_law = (a, b);
        self
    }

    /// Weighted quadratic fit of `log(response)` against `[d^2, d, 1]`.
    pub fn fit_exponential(
        &self,
        distances: &[f64],
        responses: &[f64],
    ) -> Result<FittedModel, IrmapError> {
        check_pairs(distances, responses)?;
        if let Some((i, r)) = responses
            .iter()
            .enumerate()
            .find(|(_, r)| !(r.is_finite() && **r > 0.0))
        {
            return Err(IrmapError::Domain(format!(
                "response[{i}] = {r} is not positive; log is undefined"
            )));
        }
        if let Some(i) = distances.iter().position(|d| !d.is_finite()) {
            return Err(IrmapError::Domain(format!("distance[{i}] is not finite")));
        }

        let n = distances.len();
        let design = DMatrix::from_fn(n, 3, |r, c| {
            let d = distances[r];
            match c {
                0 => d * d,
                1 => d,
                _ => 1.0,
            }
        });
        let log_y = DVector::from_iterator(n, responses.iter().map(|r| r.ln()));
        let weights: Vec<f64> = responses.iter().map(|r| r.sqrt()).collect();
        let coef = weighted_lstsq(&design, &log_y, &weights)?;

        let model = FittedModel::Exponential {
            a: coef[2].exp(),
            b: coef[1],
            c: coef[0],
        };
        tracing::info!(points = n, equation = %model, "exponential fit");
        Ok(model)
    }

    /// Direct non-linear fit of `response = a * distance^b`.
    pub fn fit_power_law(
        &self,
        distances: &[f64],
        responses: &[f64],
    ) -> Result<FittedModel, IrmapError> {
        check_pairs(distances, responses)?;
        if let Some((i, d)) = distances
            .iter()
            .enumerate()
            .find(|(_, d)| !(d.is_finite() && **d >= 0.0))
        {
            return Err(IrmapError::Domain(format!(
                "distance[{i}] = {d}; power law needs non-negative inputs"
            )));
        }
        if let Some(i) = responses.iter().position(|r| !r.is_finite()) {
            return Err(IrmapError::Domain(format!("response[{i}] is not finite")));
        }
        if distances.len() < 2 {
            return Err(IrmapError::Dataset(format!(
                "power law needs at least 2 points, got {}",
                distances.len()
            )));
        }

        let problem = PowerLawProblem {
            x: distances,
            y: responses,
        };
        let (a0, b0) = self.initial_power_law;
        let out = lm::minimize(&problem, DVector::from_vec(vec![a0, b0]), &self.lm)?;
        let (a, b) = (out.params[0], out.params[1]);
        if !(a.is_finite() && b.is_finite()) {
            return Err(IrmapError::Convergence(
                "power-law parameters are not finite".into(),
            ));
        }
        let model = FittedModel::PowerLaw { a, b };
        tracing::info!(
            points = distances.len(),
            iterations = out.iterations,
            equation = %model,
            "power-law fit"
        );
        Ok(model)
    }

    /// Fit both models; one failing does not prevent the other.
    pub fn calibrate(&self, dataset: &CalibrationDataset) -> CalibrationReport {
        let exponential = self.fit_exponential(dataset.distance(), dataset.response());
        if let Err(e) = &exponential {
            tracing::warn!(error = %e, "exponential fit failed");
        }
        let power_law = self.fit_power_law(dataset.distance(), dataset.response());
        if let Err(e) = &power_law {
            tracing::warn!(error = %e, "power-law fit failed");
        }
        CalibrationReport {
            exponential,
            power_law,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_substitutes_parameters() {
        let m = FittedModel::PowerLaw { a: 4.0, b: 1.5 };
        assert_eq!(equation_string(&m), "4 * x^1.5");
        let e = FittedModel::Exponential {
            a: 2.5,
            b: -0.5,
            c: 0.25,
        };
        assert_eq!(e.to_string(), "2.5 * exp(-0.5 * x) * exp(0.25 * x^2)");
    }

    #[test]
    fn evaluate_matches_closed_forms() {
        let p = FittedModel::PowerLaw { a: 4.0, b: 1.5 };
        assert!((evaluate(&p, 4.0) - 32.0).abs() < 1e-12);
        let e = FittedModel::Exponential {
            a: 2.0,
            b: 1.0,
            c: 0.0,
        };
        assert!((evaluate(&e, 1.0) - 2.0 * std::f64::consts::E).abs() < 1e-12);
    }

    #[test]
    fn jacobian_is_zero_at_origin() {
        let problem = PowerLawProblem {
            x: &[0.0, 2.0],
            y: &[0.0, 8.0],
        };
        let j = problem.jacobian(&DVector::from_vec(vec![1.0, 3.0]));
        assert_eq!(j[(0, 0)], 0.0);
        assert_eq!(j[(0, 1)], 0.0);
        assert!((j[(1, 0)] - 8.0).abs() < 1e-12);
        assert!((j[(1, 1)] - 8.0 * 2f64.ln()).abs() < 1e-12);
    }

    #[test]
    fn mismatched_lengths_are_dataset_errors() {
        let err = CalibrationDataset::new(vec![1.0, 2.0], vec![1.0]).unwrap_err();
        assert!(matches!(err, IrmapError::Dataset(_)));
        let err = CurveCalibrator::new()
            .fit_power_law(&[1.0], &[1.0, 2.0])
            .unwrap_err();
        assert!(matches!(err, IrmapError::Dataset(_)));
    }
}
