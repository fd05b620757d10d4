// Copyright 2026 QSP Models Contributors
// SPDX-License-Identifier: Apache-2.0

//! Trainable quantum signal processing (QSP) circuits.
//!
//! A QSP sequence interleaves a signal rotation W(θ) = exp(iθX) with
//! trainable phase rotations R_z(φ_k) = exp(iφ_k Z). Fitting the d + 1
//! phases against sampled (θ, f(cos θ)) pairs yields a circuit whose
//! unitary entry U[0,0] approximates the target polynomial P(x).
//!
//! # Architecture
//!
//! - [`matrix_exp_2x2`]: Closed-form exponential of 2×2 complex matrices
//! - [`QspLayer`]: Phases plus pure forward and Jacobian functions
//! - [`LossKind`]: Mean/max deviation losses, optionally squared
//! - [`Adam`]: Phase optimizer
//! - [`QspModel`]: Model assembled by [`construct_qsp_model`]
//! - [`QspCircuit`]: Evaluation of trained phases
//!
//! # References
//!
//! - Low & Chuang (2017), "Optimal Hamiltonian Simulation by Quantum
//!   Signal Processing", PRL 118, 010501. arXiv:1606.02685
//! - Gilyén, Su, Low & Wiebe (2019), "Quantum singular value
//!   transformation and beyond", STOC 2019. arXiv:1806.01838

pub mod circuit;
pub mod data;
pub mod expm;
pub mod gates;
pub mod layer;
pub mod loss;
pub mod model;
pub mod optimizer;
pub mod pyo3_bindings;
pub mod snapshot;
pub mod types;

pub use circuit::{QspCircuit, ResponseRow};
pub use data::Sample;
pub use expm::matrix_exp_2x2;
pub use layer::QspLayer;
pub use loss::LossKind;
pub use model::{construct_qsp_model, FitOptions, History, QspModel};
pub use optimizer::{Adam, AdamConfig};
pub use snapshot::ModelSnapshot;
pub use types::{Convention, PhaseAngles, QspConfig, Readout};
