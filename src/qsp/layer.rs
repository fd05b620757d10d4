// Copyright 2026 QSP Models Contributors
// SPDX-License-Identifier: Apache-2.0

//! The parameterized QSP layer.
//!
//! For each signal angle θ_i the layer builds
//!
//! ```text
//! U_i = R_z(φ_0) · W(θ_i) · R_z(φ_1) · W(θ_i) · … · W(θ_i) · R_z(φ_d)
//! ```
//!
//! with W(θ) = exp(iθX) and R_z(φ) = exp(iφZ), then reads out either
//! (Re U[0,0], Im U[0,0]) or (Re U[0,0], Im U[0,1]) depending on the
//! [`Convention`].
//!
//! The computation is split into pure functions of (config, phases, θ);
//! [`QspLayer`] only pairs a configuration with its mutable phase vector.
//! Derivatives with respect to the phases are accumulated through prefix
//! and suffix products of the per-step unitaries.

use ndarray::{Array2, Array3, ArrayView1, ArrayView2, Axis};
use num_complex::Complex64;
use rand::Rng;

use super::expm::matrix_exp_batch;
use super::gates::{
    batch_matmul, batch_matmul_left, identity_batch, rotation_z_derivative, x_generator_batch,
    z_generator_batch,
};
use super::types::{Convention, PhaseAngles, QspConfig, Readout, ReadoutJacobian};
use crate::error::{Result, ValidationError};

/// QSP layer: an immutable configuration plus its trainable phases.
#[derive(Debug, Clone)]
pub struct QspLayer {
    config: QspConfig,
    phases: PhaseAngles,
}

impl QspLayer {
    /// Create a layer with `poly_deg + 1` phases drawn uniformly from [0, π).
    ///
    /// Fails on a negative degree or a convention outside {0, 1}.
    pub fn new<R: Rng + ?Sized>(poly_deg: i64, convention: i64, rng: &mut R) -> Result<Self> {
        let config = QspConfig::new(poly_deg, convention)?;
        Ok(Self::from_config(config, rng))
    }

    /// Create a layer from a validated configuration.
    pub fn from_config<R: Rng + ?Sized>(config: QspConfig, rng: &mut R) -> Self {
        let phases = PhaseAngles::random(config.num_phases(), rng);
        Self { config, phases }
    }

    /// Create a layer with explicit phases.
    pub fn with_phases(config: QspConfig, phases: PhaseAngles) -> Result<Self> {
        crate::validation::validate_phase_count(config.poly_deg, phases.len())?;
        Ok(Self { config, phases })
    }

    pub fn config(&self) -> &QspConfig {
        &self.config
    }

    pub fn poly_deg(&self) -> usize {
        self.config.poly_deg
    }

    pub fn convention(&self) -> Convention {
        self.config.convention
    }

    pub fn phases(&self) -> &PhaseAngles {
        &self.phases
    }

    pub(crate) fn phases_mut(&mut self) -> &mut PhaseAngles {
        &mut self.phases
    }

    /// Readout streams for a batch of signal angles.
    pub fn forward(&self, thetas: ArrayView1<'_, f64>) -> Readout {
        forward(&self.config, self.phases.view(), thetas)
    }

    /// Forward pass on a column-shaped N×1 batch, returning N×1 streams.
    pub fn forward_columns(&self, thetas: ArrayView2<'_, f64>) -> Result<(Array2<f64>, Array2<f64>)> {
        if thetas.ncols() != 1 {
            return Err(ValidationError::Field {
                field: "theta".into(),
                message: format!("expected an N×1 column, got {} columns", thetas.ncols()),
            }
            .into());
        }
        let readout = self.forward(thetas.column(0));
        Ok((
            readout.real.insert_axis(Axis(1)),
            readout.imag.insert_axis(Axis(1)),
        ))
    }

    /// Full circuit unitaries, N×2×2.
    pub fn circuit_unitaries(&self, thetas: ArrayView1<'_, f64>) -> Array3<Complex64> {
        circuit_unitaries(self.phases.view(), thetas)
    }

    /// Readout plus its Jacobian with respect to the phases.
    pub fn forward_with_jacobian(&self, thetas: ArrayView1<'_, f64>) -> (Readout, ReadoutJacobian) {
        forward_with_jacobian(&self.config, self.phases.view(), thetas)
    }
}

/// Signal rotations W(θ_i) for the batch. Independent of the phases.
fn signal_rotations(thetas: ArrayView1<'_, f64>) -> Array3<Complex64> {
    matrix_exp_batch(&x_generator_batch(thetas))
}

/// Phase rotations R_z(φ_k), each broadcast across `n` examples.
fn phase_rotations(phases: ArrayView1<'_, f64>, n: usize) -> Vec<Array3<Complex64>> {
    phases
        .iter()
        .map(|&phi| matrix_exp_batch(&z_generator_batch(phi, n)))
        .collect()
}

/// Compute U_i for every signal angle.
///
/// # Panics
/// Panics if `phases` is empty.
pub fn circuit_unitaries(phases: ArrayView1<'_, f64>, thetas: ArrayView1<'_, f64>) -> Array3<Complex64> {
    let n = thetas.len();
    let mut rotations = phase_rotations(phases, n).into_iter();
    let mut u = match rotations.next() {
        Some(rz0) => rz0,
        None => panic!("a QSP sequence needs at least one phase"),
    };
    if phases.len() == 1 {
        return u;
    }

    let w = signal_rotations(thetas);
    for rz_k in rotations {
        u = batch_matmul(&batch_matmul(&u, &w), &rz_k);
    }
    u
}

/// Pure forward pass: readout streams for (config, phases, θ).
pub fn forward(config: &QspConfig, phases: ArrayView1<'_, f64>, thetas: ArrayView1<'_, f64>) -> Readout {
    let u = circuit_unitaries(phases, thetas);
    extract_readout(&u, config.convention)
}

/// Pure forward pass with the Jacobian of both streams.
///
/// With prefix P_k = R_z(φ_0)·W·…·R_z(φ_{k-1})·W and suffix
/// S_k = W·R_z(φ_{k+1})·…·R_z(φ_d), the derivative of the unitary is
/// ∂U/∂φ_k = P_k · (iZ·R_z(φ_k)) · S_k. The signal rotations carry no
/// trainable state and receive no gradient.
pub fn forward_with_jacobian(
    config: &QspConfig,
    phases: ArrayView1<'_, f64>,
    thetas: ArrayView1<'_, f64>,
) -> (Readout, ReadoutJacobian) {
    assert!(!phases.is_empty(), "a QSP sequence needs at least one phase");
    let n = thetas.len();
    let d = phases.len() - 1;
    let w = signal_rotations(thetas);
    let rz = phase_rotations(phases, n);

    // prefix[k] = R_z(φ_0)·W·…·R_z(φ_{k-1})·W, prefix[0] = I
    let mut prefix = Vec::with_capacity(d + 1);
    prefix.push(identity_batch(n));
    for k in 1..=d {
        let next = batch_matmul(&batch_matmul(&prefix[k - 1], &rz[k - 1]), &w);
        prefix.push(next);
    }

    // suffix[k] = W·R_z(φ_{k+1})·…·W·R_z(φ_d), suffix[d] = I
    let mut suffix = vec![identity_batch(n); d + 1];
    for k in (0..d).rev() {
        suffix[k] = batch_matmul(&batch_matmul(&w, &rz[k + 1]), &suffix[k + 1]);
    }

    let unitaries = batch_matmul(&prefix[d], &rz[d]);
    let readout = extract_readout(&unitaries, config.convention);

    let (ri, ci) = config.convention.imag_entry();
    let mut jac_real = Array2::zeros((n, d + 1));
    let mut jac_imag = Array2::zeros((n, d + 1));
    for (k, &phi) in phases.iter().enumerate() {
        let drz = rotation_z_derivative(phi);
        let du = batch_matmul(&prefix[k], &batch_matmul_left(drz.view(), &suffix[k]));
        for i in 0..n {
            jac_real[[i, k]] = du[[i, 0, 0]].re;
            jac_imag[[i, k]] = du[[i, ri, ci]].im;
        }
    }

    (
        readout,
        ReadoutJacobian {
            real: jac_real,
            imag: jac_imag,
        },
    )
}

/// Pick the readout entries from a batch of unitaries.
fn extract_readout(unitaries: &Array3<Complex64>, convention: Convention) -> Readout {
    let (ri, ci) = convention.imag_entry();
    let real = unitaries.outer_iter().map(|u| u[[0, 0]].re).collect();
    let imag = unitaries.outer_iter().map(|u| u[[ri, ci]].im).collect();
    Readout { real, imag }
}
