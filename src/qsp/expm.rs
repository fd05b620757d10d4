// Copyright 2026 QSP Models Contributors
// SPDX-License-Identifier: Apache-2.0

//! Matrix exponential for batches of 2x2 complex matrices.
//!
//! Every 2x2 matrix splits as A = τI + B with τ = tr(A)/2 and B traceless.
//! A traceless 2x2 matrix satisfies B² = s²·I with s² = −det(B), so the
//! power series collapses to
//!
//! ```text
//! exp(A) = e^τ · (cosh(s)·I + sinh(s)/s · B)
//! ```
//!
//! For the rotation generators used by the QSP layer (iθX, iφZ) this is
//! Euler's formula, and its derivative with respect to the angle has the
//! same closed form (see [`super::gates::rotation_z_derivative`]).

use ndarray::{Array2, Array3, ArrayView2};
use num_complex::Complex64;

/// Below this |s| the cosh/sinc terms are evaluated by their Taylor series.
const SERIES_CUTOFF: f64 = 1e-6;

/// Compute exp(A) for a single 2x2 complex matrix.
///
/// Non-finite entries propagate into the result; nothing panics on NaN/Inf.
///
/// # Panics
/// Panics if `a` is not 2x2.
pub fn matrix_exp_2x2(a: ArrayView2<'_, Complex64>) -> Array2<Complex64> {
    assert_eq!(a.dim(), (2, 2), "matrix_exp_2x2 requires a 2x2 matrix");

    let tau = (a[[0, 0]] + a[[1, 1]]) * 0.5;
    let b00 = a[[0, 0]] - tau;
    let b11 = a[[1, 1]] - tau;
    let b01 = a[[0, 1]];
    let b10 = a[[1, 0]];

    let s2 = -(b00 * b11 - b01 * b10);
    let (cosh_s, sinhc_s) = cosh_and_sinhc(s2);
    let scale = tau.exp();

    let mut out = Array2::zeros((2, 2));
    out[[0, 0]] = scale * (cosh_s + sinhc_s * b00);
    out[[0, 1]] = scale * sinhc_s * b01;
    out[[1, 0]] = scale * sinhc_s * b10;
    out[[1, 1]] = scale * (cosh_s + sinhc_s * b11);
    out
}

/// Compute exp(A_i) for every matrix in an N×2×2 batch, preserving order.
///
/// # Panics
/// Panics if the trailing dimensions are not 2×2.
pub fn matrix_exp_batch(a: &Array3<Complex64>) -> Array3<Complex64> {
    let (n, rows, cols) = a.dim();
    assert_eq!(
        (rows, cols),
        (2, 2),
        "matrix_exp_batch requires an N×2×2 batch"
    );

    let mut out = Array3::zeros((n, 2, 2));
    for (mut dst, src) in out.outer_iter_mut().zip(a.outer_iter()) {
        dst.assign(&matrix_exp_2x2(src));
    }
    out
}

/// cosh(s) and sinh(s)/s as functions of s², so the branch of √ never matters.
fn cosh_and_sinhc(s2: Complex64) -> (Complex64, Complex64) {
    if s2.norm() < SERIES_CUTOFF * SERIES_CUTOFF {
        let cosh_s = 1.0 + s2 * 0.5 + s2 * s2 / 24.0;
        let sinhc_s = 1.0 + s2 / 6.0 + s2 * s2 / 120.0;
        return (cosh_s, sinhc_s);
    }
    let s = s2.sqrt();
    (s.cosh(), s.sinh() / s)
}
