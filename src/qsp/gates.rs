// Copyright 2026 QSP Models Contributors
// SPDX-License-Identifier: Apache-2.0

//! Rotation generators, closed-form rotations and batched 2x2 products.

use ndarray::{Array2, Array3, ArrayView1, ArrayView2};
use num_complex::Complex64;

const ONE: Complex64 = Complex64::new(1.0, 0.0);

/// Pauli X = [[0, 1], [1, 0]].
pub fn pauli_x() -> Array2<Complex64> {
    let mut m = Array2::zeros((2, 2));
    m[[0, 1]] = ONE;
    m[[1, 0]] = ONE;
    m
}

/// Pauli Z = [[1, 0], [0, -1]].
pub fn pauli_z() -> Array2<Complex64> {
    let mut m = Array2::zeros((2, 2));
    m[[0, 0]] = ONE;
    m[[1, 1]] = -ONE;
    m
}

/// Generators iθ_i·X for every signal angle in the batch.
pub fn x_generator_batch(thetas: ArrayView1<'_, f64>) -> Array3<Complex64> {
    let mut out = Array3::zeros((thetas.len(), 2, 2));
    for (mut m, &theta) in out.outer_iter_mut().zip(thetas.iter()) {
        let arg = Complex64::new(0.0, theta);
        m[[0, 1]] = arg;
        m[[1, 0]] = arg;
    }
    out
}

/// Generator iφ·Z broadcast across a batch of `n` examples.
pub fn z_generator_batch(phi: f64, n: usize) -> Array3<Complex64> {
    let mut out = Array3::zeros((n, 2, 2));
    for mut m in out.outer_iter_mut() {
        m[[0, 0]] = Complex64::new(0.0, phi);
        m[[1, 1]] = Complex64::new(0.0, -phi);
    }
    out
}

/// W(θ) = exp(iθX) = [[cos θ, i sin θ], [i sin θ, cos θ]].
pub fn rotation_x(theta: f64) -> Array2<Complex64> {
    let (s, c) = theta.sin_cos();
    let mut m = Array2::zeros((2, 2));
    m[[0, 0]] = Complex64::new(c, 0.0);
    m[[0, 1]] = Complex64::new(0.0, s);
    m[[1, 0]] = Complex64::new(0.0, s);
    m[[1, 1]] = Complex64::new(c, 0.0);
    m
}

/// R_z(φ) = exp(iφZ) = diag(e^{iφ}, e^{-iφ}).
pub fn rotation_z(phi: f64) -> Array2<Complex64> {
    let mut m = Array2::zeros((2, 2));
    m[[0, 0]] = Complex64::from_polar(1.0, phi);
    m[[1, 1]] = Complex64::from_polar(1.0, -phi);
    m
}

/// dR_z/dφ = iZ·exp(iφZ) = diag(i·e^{iφ}, −i·e^{-iφ}).
pub fn rotation_z_derivative(phi: f64) -> Array2<Complex64> {
    let i = Complex64::new(0.0, 1.0);
    let mut m = Array2::zeros((2, 2));
    m[[0, 0]] = i * Complex64::from_polar(1.0, phi);
    m[[1, 1]] = -i * Complex64::from_polar(1.0, -phi);
    m
}

/// Batch of `n` identity matrices.
pub fn identity_batch(n: usize) -> Array3<Complex64> {
    let mut out = Array3::zeros((n, 2, 2));
    for mut m in out.outer_iter_mut() {
        m[[0, 0]] = ONE;
        m[[1, 1]] = ONE;
    }
    out
}

/// Per-example product C_i = A_i · B_i.
///
/// # Panics
/// Panics if the batches differ in shape.
pub fn batch_matmul(a: &Array3<Complex64>, b: &Array3<Complex64>) -> Array3<Complex64> {
    assert_eq!(a.dim(), b.dim(), "batch_matmul requires equal batch shapes");
    let mut out = Array3::zeros(a.dim());
    for ((mut dst, lhs), rhs) in out.outer_iter_mut().zip(a.outer_iter()).zip(b.outer_iter()) {
        dst.assign(&lhs.dot(&rhs));
    }
    out
}

/// Per-example product C_i = M · B_i with one shared left factor.
pub fn batch_matmul_left(m: ArrayView2<'_, Complex64>, b: &Array3<Complex64>) -> Array3<Complex64> {
    let mut out = Array3::zeros(b.dim());
    for (mut dst, rhs) in out.outer_iter_mut().zip(b.outer_iter()) {
        dst.assign(&m.dot(&rhs));
    }
    out
}

/// Conjugate transpose of a single matrix.
pub fn dagger(m: ArrayView2<'_, Complex64>) -> Array2<Complex64> {
    m.t().mapv(|z| z.conj())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::qsp::expm::{matrix_exp_2x2, matrix_exp_batch};
    use crate::test_utils::{assert_matrix_close, assert_unitary};
    use ndarray::array;

    #[test]
    fn test_rotation_x_matches_expm() {
        for &theta in &[0.0, 0.4, 1.3, 2.9, -0.8] {
            let gen = pauli_x() * Complex64::new(0.0, theta);
            assert_matrix_close(&rotation_x(theta), &matrix_exp_2x2(gen.view()), 1e-12);
        }
    }

    #[test]
    fn test_rotation_z_matches_expm() {
        for &phi in &[0.0, 0.7, 2.2, 3.1] {
            let gen = pauli_z() * Complex64::new(0.0, phi);
            assert_matrix_close(&rotation_z(phi), &matrix_exp_2x2(gen.view()), 1e-12);
        }
    }

    #[test]
    fn test_generator_batches_exponentiate_to_rotations() {
        let thetas = array![0.1, 0.9, 2.4];
        let wx = matrix_exp_batch(&x_generator_batch(thetas.view()));
        for (i, &theta) in thetas.iter().enumerate() {
            assert_matrix_close(&wx.index_axis(ndarray::Axis(0), i).to_owned(), &rotation_x(theta), 1e-12);
        }

        let rz = matrix_exp_batch(&z_generator_batch(0.6, 4));
        assert_eq!(rz.dim(), (4, 2, 2));
        for m in rz.outer_iter() {
            assert_matrix_close(&m.to_owned(), &rotation_z(0.6), 1e-12);
        }
    }

    #[test]
    fn test_rotation_z_derivative_finite_difference() {
        let phi = 0.83;
        let eps = 1e-6;
        let fd = (rotation_z(phi + eps) - rotation_z(phi - eps)) * Complex64::new(0.5 / eps, 0.0);
        assert_matrix_close(&rotation_z_derivative(phi), &fd, 1e-8);
    }

    #[test]
    fn test_rotations_are_unitary() {
        assert_unitary(rotation_x(1.234).view(), 1e-12);
        assert_unitary(rotation_z(-0.77).view(), 1e-12);
    }

    #[test]
    fn test_batch_matmul_identity() {
        let a = matrix_exp_batch(&x_generator_batch(array![0.3, 1.7].view()));
        let eye = identity_batch(2);
        let left = batch_matmul(&eye, &a);
        let right = batch_matmul(&a, &eye);
        for ((l, r), orig) in left.outer_iter().zip(right.outer_iter()).zip(a.outer_iter()) {
            assert_matrix_close(&l.to_owned(), &orig.to_owned(), 1e-14);
            assert_matrix_close(&r.to_owned(), &orig.to_owned(), 1e-14);
        }
    }

    #[test]
    fn test_shared_left_factor_matches_batch_product() {
        let a = matrix_exp_batch(&x_generator_batch(array![0.3, 1.7, 2.2].view()));
        let rz = rotation_z(0.9);
        let rz_batch = matrix_exp_batch(&z_generator_batch(0.9, 3));

        let left = batch_matmul_left(rz.view(), &a);
        let expected_left = batch_matmul(&rz_batch, &a);
        for i in 0..3 {
            let ax = ndarray::Axis(0);
            assert_matrix_close(&left.index_axis(ax, i).to_owned(), &expected_left.index_axis(ax, i).to_owned(), 1e-12);
        }
    }

    #[test]
    fn test_dagger() {
        let m = array![
            [Complex64::new(1.0, 2.0), Complex64::new(3.0, -1.0)],
            [Complex64::new(0.0, 4.0), Complex64::new(-2.0, 0.5)]
        ];
        let d = dagger(m.view());
        assert_eq!(d[[0, 1]], Complex64::new(0.0, -4.0));
        assert_eq!(d[[1, 0]], Complex64::new(3.0, 1.0));
        assert_eq!(d[[1, 1]], Complex64::new(-2.0, -0.5));
    }
}
