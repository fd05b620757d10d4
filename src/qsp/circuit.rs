// Copyright 2026 QSP Models Contributors
// SPDX-License-Identifier: Apache-2.0

//! Evaluation of a fixed QSP phase sequence.
//!
//! [`QspCircuit`] takes trained phases (typically `trainable_weights()[0]`)
//! and reports the polynomial entries of the circuit unitary over a grid of
//! signal angles.

use ndarray::{Array1, ArrayView1};
use num_complex::Complex64;
use serde::{Deserialize, Serialize};

use super::layer::circuit_unitaries;
use crate::error::Result;
use crate::validation::validate_non_empty;

/// A fixed phase sequence φ_0 … φ_d.
#[derive(Debug, Clone, PartialEq)]
pub struct QspCircuit {
    phases: Array1<f64>,
}

impl QspCircuit {
    /// Fails on an empty phase vector.
    pub fn new(phases: ArrayView1<'_, f64>) -> Result<Self> {
        validate_non_empty("phases", phases.len())?;
        Ok(Self {
            phases: phases.to_owned(),
        })
    }

    pub fn phases(&self) -> ArrayView1<'_, f64> {
        self.phases.view()
    }

    /// Polynomial degree of the sequence.
    pub fn degree(&self) -> usize {
        self.phases.len() - 1
    }

    /// P(x): U[0,0] per signal angle.
    pub fn eval_px(&self, thetas: ArrayView1<'_, f64>) -> Array1<Complex64> {
        self.entry(thetas, 0, 0)
    }

    /// Q(x)·√(1−x²) up to phase: U[0,1] per signal angle.
    pub fn eval_qx(&self, thetas: ArrayView1<'_, f64>) -> Array1<Complex64> {
        self.entry(thetas, 0, 1)
    }

    /// ⟨+|U|+⟩ per signal angle.
    pub fn qsp_response(&self, thetas: ArrayView1<'_, f64>) -> Array1<Complex64> {
        let u = circuit_unitaries(self.phases.view(), thetas);
        Array1::from_iter(
            u.outer_iter()
                .map(|m| (m[[0, 0]] + m[[0, 1]] + m[[1, 0]] + m[[1, 1]]) * 0.5),
        )
    }

    /// Evaluate every quantity over a θ grid.
    pub fn response_table(&self, thetas: ArrayView1<'_, f64>) -> Vec<ResponseRow> {
        let u = circuit_unitaries(self.phases.view(), thetas);
        thetas
            .iter()
            .zip(u.outer_iter())
            .map(|(&theta, m)| {
                let response = (m[[0, 0]] + m[[0, 1]] + m[[1, 0]] + m[[1, 1]]) * 0.5;
                ResponseRow {
                    theta,
                    x: theta.cos(),
                    px_re: m[[0, 0]].re,
                    px_im: m[[0, 0]].im,
                    qx_re: m[[0, 1]].re,
                    qx_im: m[[0, 1]].im,
                    response_re: response.re,
                    response_im: response.im,
                }
            })
            .collect()
    }

    fn entry(&self, thetas: ArrayView1<'_, f64>, row: usize, col: usize) -> Array1<Complex64> {
        let u = circuit_unitaries(self.phases.view(), thetas);
        Array1::from_iter(u.outer_iter().map(|m| m[[row, col]]))
    }
}

/// One evaluated point of a circuit, keyed by x = cos θ.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseRow {
    pub theta: f64,
    pub x: f64,
    pub px_re: f64,
    pub px_im: f64,
    pub qx_re: f64,
    pub qx_im: f64,
    pub response_re: f64,
    pub response_im: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::qsp::layer::forward;
    use crate::qsp::types::QspConfig;
    use crate::test_utils::theta_grid;
    use approx::assert_relative_eq;
    use ndarray::array;

    #[test]
    fn test_rejects_empty_phases() {
        let empty = Array1::<f64>::zeros(0);
        assert!(QspCircuit::new(empty.view()).is_err());
    }

    #[test]
    fn test_entries_match_layer_readout() {
        let phases = array![0.3, 1.1, -0.4];
        let circuit = QspCircuit::new(phases.view()).unwrap();
        let thetas = theta_grid(11);

        let px = circuit.eval_px(thetas.view());
        let qx = circuit.eval_qx(thetas.view());
        let zero = forward(&QspConfig::new(2, 0).unwrap(), phases.view(), thetas.view());
        let plus = forward(&QspConfig::new(2, 1).unwrap(), phases.view(), thetas.view());

        for i in 0..thetas.len() {
            assert_relative_eq!(px[i].re, zero.real[i], epsilon = 1e-12);
            assert_relative_eq!(px[i].im, zero.imag[i], epsilon = 1e-12);
            assert_relative_eq!(qx[i].im, plus.imag[i], epsilon = 1e-12);
        }
    }

    #[test]
    fn test_zero_phases_give_chebyshev() {
        // With all φ = 0, U = W(θ)^d so P(x) = T_d(x) = cos(dθ).
        let circuit = QspCircuit::new(Array1::<f64>::zeros(4).view()).unwrap();
        let thetas = theta_grid(9);
        let px = circuit.eval_px(thetas.view());
        for (i, &theta) in thetas.iter().enumerate() {
            assert_relative_eq!(px[i].re, (3.0 * theta).cos(), epsilon = 1e-10);
            assert_relative_eq!(px[i].im, 0.0, epsilon = 1e-10);
        }
    }

    #[test]
    fn test_response_of_single_phase() {
        // ⟨+|diag(e^{iφ}, e^{-iφ})|+⟩ = cos φ.
        let circuit = QspCircuit::new(array![0.7].view()).unwrap();
        let response = circuit.qsp_response(array![0.2, 1.5].view());
        for r in response.iter() {
            assert_relative_eq!(r.re, 0.7_f64.cos(), epsilon = 1e-12);
            assert_relative_eq!(r.im, 0.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_response_table_rows() {
        let circuit = QspCircuit::new(array![0.1, 0.2].view()).unwrap();
        assert_eq!(circuit.degree(), 1);
        let thetas = theta_grid(4);
        let rows = circuit.response_table(thetas.view());
        let px = circuit.eval_px(thetas.view());
        let response = circuit.qsp_response(thetas.view());

        assert_eq!(rows.len(), 4);
        for (i, row) in rows.iter().enumerate() {
            assert_relative_eq!(row.x, thetas[i].cos());
            assert_relative_eq!(row.px_re, px[i].re, epsilon = 1e-14);
            assert_relative_eq!(row.response_im, response[i].im, epsilon = 1e-14);
        }
    }
}
