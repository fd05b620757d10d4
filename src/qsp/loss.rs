// Copyright 2026 QSP Models Contributors
// SPDX-License-Identifier: Apache-2.0

//! Deviation-based losses over complex residuals.
//!
//! The deviation of one example is the complex modulus |y_true − y_pred|.
//! Losses reduce it over the batch by mean or max, optionally squared.
//!
//! Empty batches are not guarded: mean reductions return NaN (0/0) and max
//! reductions return −∞, the identity of `max`.

use std::fmt;

use ndarray::{Array1, ArrayView1};
use num_complex::Complex64;
use serde::{Deserialize, Serialize};

use crate::error::{Result, ValidationError};

/// One of the four supported reductions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LossKind {
    MeanDeviation,
    MaxDeviation,
    MeanDeviationSquared,
    MaxDeviationSquared,
}

impl LossKind {
    /// Select a loss from the `mean_or_max` (0 = mean, 1 = max) and
    /// `squared` (0 = linear, 1 = squared) flags.
    pub fn from_flags(mean_or_max: i64, squared: i64) -> Result<Self> {
        let kind = match (mean_or_max, squared) {
            (0, 0) => LossKind::MeanDeviation,
            (0, 1) => LossKind::MeanDeviationSquared,
            (1, 0) => LossKind::MaxDeviation,
            (1, 1) => LossKind::MaxDeviationSquared,
            (0 | 1, other) => return Err(flag_error("squared", other)),
            (other, _) => return Err(flag_error("mean_or_max", other)),
        };
        Ok(kind)
    }

    pub fn is_max(self) -> bool {
        matches!(self, LossKind::MaxDeviation | LossKind::MaxDeviationSquared)
    }

    pub fn is_squared(self) -> bool {
        matches!(
            self,
            LossKind::MeanDeviationSquared | LossKind::MaxDeviationSquared
        )
    }

    pub fn name(self) -> &'static str {
        match self {
            LossKind::MeanDeviation => "mean_deviation",
            LossKind::MaxDeviation => "max_deviation",
            LossKind::MeanDeviationSquared => "mean_deviation_squared",
            LossKind::MaxDeviationSquared => "max_deviation_squared",
        }
    }

    /// Loss value.
    pub fn evaluate(self, y_true: ArrayView1<'_, Complex64>, y_pred: ArrayView1<'_, Complex64>) -> f64 {
        match self {
            LossKind::MeanDeviation => mean_deviation(y_true, y_pred),
            LossKind::MaxDeviation => max_deviation(y_true, y_pred),
            LossKind::MeanDeviationSquared => mean_deviation_squared(y_true, y_pred),
            LossKind::MaxDeviationSquared => max_deviation_squared(y_true, y_pred),
        }
    }

    /// Loss value and its gradient with respect to each prediction,
    /// packed as ∂L/∂Re(y_pred) + i·∂L/∂Im(y_pred).
    ///
    /// Where the residual is exactly zero the modulus subgradient is taken
    /// as zero. For max reductions the gradient is split evenly across
    /// tied maxima.
    pub fn value_and_grad(
        self,
        y_true: ArrayView1<'_, Complex64>,
        y_pred: ArrayView1<'_, Complex64>,
    ) -> (f64, Array1<Complex64>) {
        let residuals = residuals(y_true, y_pred);
        let n = residuals.len();

        // d|r|/dp = −r/|r|,  d|r|²/dp = −2r
        let local_grad = |r: Complex64| -> Complex64 {
            if self.is_squared() {
                r * -2.0
            } else {
                let m = r.norm();
                if m > 0.0 {
                    -r / m
                } else {
                    Complex64::new(0.0, 0.0)
                }
            }
        };
        let per_example = deviation_values(&residuals, self.is_squared());

        if !self.is_max() {
            let value = per_example.sum() / n as f64;
            let grad = residuals.mapv(|r| local_grad(r) / n as f64);
            return (value, grad);
        }

        let value = nan_propagating_max(&per_example);
        let ties = per_example.iter().filter(|&&v| v == value).count();
        let grad = residuals
            .iter()
            .zip(per_example.iter())
            .map(|(&r, &v)| {
                if ties > 0 && v == value {
                    local_grad(r) / ties as f64
                } else {
                    Complex64::new(0.0, 0.0)
                }
            })
            .collect();
        (value, grad)
    }
}

impl fmt::Display for LossKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Mean over i of |y_true_i − y_pred_i|.
pub fn mean_deviation(y_true: ArrayView1<'_, Complex64>, y_pred: ArrayView1<'_, Complex64>) -> f64 {
    let d = deviation_values(&residuals(y_true, y_pred), false);
    d.sum() / d.len() as f64
}

/// Max over i of |y_true_i − y_pred_i|.
pub fn max_deviation(y_true: ArrayView1<'_, Complex64>, y_pred: ArrayView1<'_, Complex64>) -> f64 {
    nan_propagating_max(&deviation_values(&residuals(y_true, y_pred), false))
}

/// Mean over i of |y_true_i − y_pred_i|².
pub fn mean_deviation_squared(y_true: ArrayView1<'_, Complex64>, y_pred: ArrayView1<'_, Complex64>) -> f64 {
    let d = deviation_values(&residuals(y_true, y_pred), true);
    d.sum() / d.len() as f64
}

/// Max over i of |y_true_i − y_pred_i|².
pub fn max_deviation_squared(y_true: ArrayView1<'_, Complex64>, y_pred: ArrayView1<'_, Complex64>) -> f64 {
    nan_propagating_max(&deviation_values(&residuals(y_true, y_pred), true))
}

/// # Panics
/// Panics if the batches differ in length.
fn residuals(y_true: ArrayView1<'_, Complex64>, y_pred: ArrayView1<'_, Complex64>) -> Array1<Complex64> {
    assert_eq!(
        y_true.len(),
        y_pred.len(),
        "loss requires equal-length target and prediction batches"
    );
    &y_true - &y_pred
}

fn deviation_values(residuals: &Array1<Complex64>, squared: bool) -> Array1<f64> {
    if squared {
        residuals.mapv(|r| r.norm_sqr())
    } else {
        residuals.mapv(|r| r.norm())
    }
}

fn nan_propagating_max(values: &Array1<f64>) -> f64 {
    values.iter().fold(f64::NEG_INFINITY, |acc, &v| {
        if v.is_nan() || acc.is_nan() {
            f64::NAN
        } else {
            acc.max(v)
        }
    })
}

fn flag_error(field: &str, value: i64) -> crate::error::Error {
    ValidationError::Field {
        field: field.into(),
        message: format!("must be 0 or 1, got {}", value),
    }
    .into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    fn c(re: f64, im: f64) -> Complex64 {
        Complex64::new(re, im)
    }

    const ALL: [LossKind; 4] = [
        LossKind::MeanDeviation,
        LossKind::MaxDeviation,
        LossKind::MeanDeviationSquared,
        LossKind::MaxDeviationSquared,
    ];

    #[test]
    fn test_from_flags() {
        assert_eq!(LossKind::from_flags(0, 0).unwrap(), LossKind::MeanDeviation);
        assert_eq!(LossKind::from_flags(0, 1).unwrap(), LossKind::MeanDeviationSquared);
        assert_eq!(LossKind::from_flags(1, 0).unwrap(), LossKind::MaxDeviation);
        assert_eq!(LossKind::from_flags(1, 1).unwrap(), LossKind::MaxDeviationSquared);
    }

    #[test]
    fn test_from_flags_rejects_out_of_range() {
        let err = LossKind::from_flags(2, 0).unwrap_err();
        assert!(err.to_string().contains("mean_or_max"));
        let err = LossKind::from_flags(1, -1).unwrap_err();
        assert!(err.to_string().contains("squared"));
    }

    #[test]
    fn test_self_deviation_is_zero() {
        let a = array![c(0.3, -1.0), c(2.0, 0.5), c(-0.7, 0.0)];
        for kind in ALL {
            assert_eq!(kind.evaluate(a.view(), a.view()), 0.0, "{}", kind);
        }
    }

    #[test]
    fn test_literal_batch() {
        let a = array![c(1.0, 0.0), c(0.0, 1.0)];
        let b = array![c(0.0, 0.0), c(0.0, 0.0)];
        assert_eq!(mean_deviation(a.view(), b.view()), 1.0);
        assert_eq!(mean_deviation_squared(a.view(), b.view()), 1.0);
        assert_eq!(max_deviation(a.view(), b.view()), 1.0);
        assert_eq!(max_deviation_squared(a.view(), b.view()), 1.0);
    }

    #[test]
    fn test_mean_squared_matches_direct_computation() {
        let a = array![c(3.0, 4.0), c(1.0, 1.0), c(0.0, -2.0)];
        let b = array![c(0.0, 0.0), c(1.0, 0.0), c(0.0, 0.0)];
        // |a−b|² = 25, 1, 4
        let direct = (25.0 + 1.0 + 4.0) / 3.0;
        assert_relative_eq!(mean_deviation_squared(a.view(), b.view()), direct, epsilon = 1e-12);
        assert_relative_eq!(mean_deviation(a.view(), b.view()), (5.0 + 1.0 + 2.0) / 3.0, epsilon = 1e-12);
        assert_relative_eq!(max_deviation(a.view(), b.view()), 5.0, epsilon = 1e-12);
        assert_relative_eq!(max_deviation_squared(a.view(), b.view()), 25.0, epsilon = 1e-12);
    }

    #[test]
    fn test_value_and_grad_value_matches_evaluate() {
        let a = array![c(0.2, 0.1), c(-0.4, 0.9), c(1.5, -0.3)];
        let b = array![c(0.0, 0.5), c(0.1, 0.2), c(1.0, 0.0)];
        for kind in ALL {
            let (value, _) = kind.value_and_grad(a.view(), b.view());
            assert_relative_eq!(value, kind.evaluate(a.view(), b.view()), epsilon = 1e-12);
        }
    }

    #[test]
    fn test_gradient_matches_finite_difference() {
        let eps = 1e-6;
        let y_true = array![c(0.2, 0.1), c(-0.4, 0.9), c(1.5, -0.3)];
        let y_pred = array![c(0.0, 0.5), c(0.1, 0.2), c(1.0, 0.0)];
        for kind in ALL {
            let (_, grad) = kind.value_and_grad(y_true.view(), y_pred.view());
            for i in 0..y_pred.len() {
                for (dir, component) in [(c(eps, 0.0), grad[i].re), (c(0.0, eps), grad[i].im)] {
                    let mut up = y_pred.clone();
                    let mut down = y_pred.clone();
                    up[i] += dir;
                    down[i] -= dir;
                    let fd = (kind.evaluate(y_true.view(), up.view())
                        - kind.evaluate(y_true.view(), down.view()))
                        / (2.0 * eps);
                    assert_relative_eq!(component, fd, epsilon = 1e-6, max_relative = 1e-4);
                }
            }
        }
    }

    #[test]
    fn test_max_gradient_splits_across_ties() {
        let y_true = array![c(1.0, 0.0), c(0.0, 1.0), c(0.1, 0.0)];
        let y_pred = Array1::from_elem(3, c(0.0, 0.0));
        let (value, grad) = LossKind::MaxDeviation.value_and_grad(y_true.view(), y_pred.view());
        assert_eq!(value, 1.0);
        assert_relative_eq!(grad[0].re, -0.5, epsilon = 1e-12);
        assert_relative_eq!(grad[1].im, -0.5, epsilon = 1e-12);
        assert_eq!(grad[2], c(0.0, 0.0));
    }

    #[test]
    fn test_zero_residual_has_zero_gradient() {
        let a = array![c(0.5, 0.5)];
        let (_, grad) = LossKind::MeanDeviation.value_and_grad(a.view(), a.view());
        assert_eq!(grad[0], c(0.0, 0.0));
    }

    #[test]
    fn test_empty_batch_conventions() {
        let empty = Array1::<Complex64>::zeros(0);
        assert!(mean_deviation(empty.view(), empty.view()).is_nan());
        assert_eq!(max_deviation(empty.view(), empty.view()), f64::NEG_INFINITY);
    }

    #[test]
    fn test_nan_prediction_propagates_through_max() {
        let a = array![c(0.0, 0.0), c(0.0, 0.0)];
        let b = array![c(f64::NAN, 0.0), c(1.0, 0.0)];
        assert!(max_deviation(a.view(), b.view()).is_nan());
        assert!(mean_deviation(a.view(), b.view()).is_nan());
    }

    #[test]
    #[should_panic(expected = "equal-length")]
    fn test_length_mismatch_panics() {
        let a = array![c(0.0, 0.0)];
        let b = array![c(0.0, 0.0), c(1.0, 0.0)];
        let _ = mean_deviation(a.view(), b.view());
    }
}
