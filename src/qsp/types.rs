// Copyright 2026 QSP Models Contributors
// SPDX-License-Identifier: Apache-2.0

//! Configuration, parameter and readout types for the QSP layer.

use std::f64::consts::PI;
use std::fmt;

use ndarray::{Array1, Array2, ArrayView1};
use num_complex::Complex64;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{Result, ValidationError};

/// Which unitary entries are read out as the polynomial approximation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub enum Convention {
    /// |0⟩⟨0| basis: (Re U[0,0], Im U[0,0]), i.e. Re P(x) and Im P(x).
    Zero,
    /// |+⟩⟨+| basis: (Re U[0,0], Im U[0,1]), i.e. Re P(x) and Q(x)·√(1−x²).
    Plus,
}

impl Convention {
    /// Entry of U whose imaginary part forms the second readout stream.
    pub fn imag_entry(self) -> (usize, usize) {
        match self {
            Convention::Zero => (0, 0),
            Convention::Plus => (0, 1),
        }
    }

    /// Integer code (0 or 1).
    pub fn code(self) -> i64 {
        match self {
            Convention::Zero => 0,
            Convention::Plus => 1,
        }
    }
}

impl TryFrom<i64> for Convention {
    type Error = ValidationError;

    fn try_from(value: i64) -> std::result::Result<Self, Self::Error> {
        match value {
            0 => Ok(Convention::Zero),
            1 => Ok(Convention::Plus),
            other => Err(ValidationError::UnsupportedConvention(other)),
        }
    }
}

impl From<Convention> for i64 {
    fn from(c: Convention) -> Self {
        c.code()
    }
}

impl fmt::Display for Convention {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Convention::Zero => write!(f, "|0><0|"),
            Convention::Plus => write!(f, "|+><+|"),
        }
    }
}

/// Immutable layer configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QspConfig {
    /// Degree of the target polynomial; the layer carries `poly_deg + 1` phases.
    pub poly_deg: usize,
    /// Readout convention.
    pub convention: Convention,
}

impl QspConfig {
    /// Validate raw construction parameters.
    pub fn new(poly_deg: i64, convention: i64) -> Result<Self> {
        if poly_deg < 0 {
            return Err(ValidationError::Field {
                field: "poly_deg".into(),
                message: format!("must be non-negative, got {}", poly_deg),
            }
            .into());
        }
        let convention = Convention::try_from(convention)?;
        Ok(Self {
            poly_deg: poly_deg as usize,
            convention,
        })
    }

    /// Number of trainable phases (`poly_deg + 1`).
    pub fn num_phases(&self) -> usize {
        self.poly_deg + 1
    }
}

/// The trainable phase-angle vector, φ_0 first.
#[derive(Debug, Clone, PartialEq)]
pub struct PhaseAngles {
    values: Array1<f64>,
}

impl PhaseAngles {
    /// Sample `n` phases independently and uniformly from [0, π).
    pub fn random<R: Rng + ?Sized>(n: usize, rng: &mut R) -> Self {
        let values = (0..n).map(|_| rng.gen_range(0.0..PI)).collect();
        Self { values }
    }

    /// Wrap explicit phase values.
    pub fn from_vec(values: Vec<f64>) -> Self {
        Self {
            values: Array1::from(values),
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn view(&self) -> ArrayView1<'_, f64> {
        self.values.view()
    }

    pub fn as_array(&self) -> &Array1<f64> {
        &self.values
    }

    pub fn to_vec(&self) -> Vec<f64> {
        self.values.to_vec()
    }

    /// Mutable access for the optimizer.
    pub(crate) fn as_array_mut(&mut self) -> &mut Array1<f64> {
        &mut self.values
    }
}

/// Layer output: two index-aligned streams of N reals.
#[derive(Debug, Clone, PartialEq)]
pub struct Readout {
    /// Re U[0,0] per example.
    pub real: Array1<f64>,
    /// Imaginary part of the convention-selected entry per example.
    pub imag: Array1<f64>,
}

impl Readout {
    pub fn len(&self) -> usize {
        self.real.len()
    }

    pub fn is_empty(&self) -> bool {
        self.real.is_empty()
    }

    /// Combine the streams as real + i·imag.
    pub fn to_complex(&self) -> Array1<Complex64> {
        self.real
            .iter()
            .zip(self.imag.iter())
            .map(|(&re, &im)| Complex64::new(re, im))
            .collect()
    }
}

/// Derivatives of both readout streams with respect to each phase (N × d+1).
#[derive(Debug, Clone, PartialEq)]
pub struct ReadoutJacobian {
    pub real: Array2<f64>,
    pub imag: Array2<f64>,
}
