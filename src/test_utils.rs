// Copyright 2026 QSP Models Contributors
// SPDX-License-Identifier: Apache-2.0

//! Shared test utilities.

use std::f64::consts::PI;

use ndarray::{Array1, Array2, ArrayView2};
use num_complex::Complex64;

use crate::qsp::gates::dagger;
use crate::qsp::layer::forward;
use crate::qsp::types::{Convention, QspConfig};

/// Check matrix equality within tolerance.
pub fn assert_matrix_close(a: &Array2<Complex64>, b: &Array2<Complex64>, tol: f64) {
    assert_eq!(a.shape(), b.shape());
    for ((i, j), val) in a.indexed_iter() {
        let diff = (val - b[[i, j]]).norm();
        assert!(
            diff < tol,
            "Mismatch at ({}, {}): {:?} vs {:?} (diff={})",
            i,
            j,
            val,
            b[[i, j]],
            diff
        );
    }
}

/// Check U·U† = I within tolerance.
pub fn assert_unitary(u: ArrayView2<'_, Complex64>, tol: f64) {
    let product = u.dot(&dagger(u));
    let eye = Array2::from_diag_elem(u.nrows(), Complex64::new(1.0, 0.0));
    assert_matrix_close(&product, &eye, tol);
}

/// `n` evenly spaced signal angles in [0, π).
pub fn theta_grid(n: usize) -> Array1<f64> {
    Array1::from_iter((0..n).map(|i| PI * i as f64 / n as f64))
}

/// Targets produced by a reference circuit with the given phases.
///
/// Returns `(thetas, targets)` with targets as complex readouts.
pub fn synthetic_samples(
    phases: &[f64],
    convention: Convention,
    thetas: &Array1<f64>,
) -> (Array1<f64>, Array1<Complex64>) {
    assert!(!phases.is_empty(), "reference circuit needs at least one phase");
    let config = QspConfig {
        poly_deg: phases.len() - 1,
        convention,
    };
    let phases = Array1::from(phases.to_vec());
    let readout = forward(&config, phases.view(), thetas.view());
    (thetas.clone(), readout.to_complex())
}
