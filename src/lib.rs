// Copyright 2026 QSP Models Contributors
// SPDX-License-Identifier: Apache-2.0

//! Trainable Quantum Signal Processing models
//!
//! This crate fits the phase angles of single-qubit QSP circuits so that an
//! entry of the circuit unitary approximates a target polynomial.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │          qsp-fit CLI / PyO3              │
//! ├─────────────────────────────────────────┤
//! │   QspModel (loss + Adam + minibatches)   │
//! ├──────────────────┬──────────────────────┤
//! │   QspLayer       │   QspCircuit         │
//! │   (forward, ∂/∂φ)│   (evaluation)       │
//! ├──────────────────┴──────────────────────┤
//! │        2×2 closed-form matrix exp        │
//! └─────────────────────────────────────────┘
//! ```
//!
//! # Modules
//!
//! - [`config`]: Configuration management
//! - [`qsp`]: Layer, losses, optimizer, model and circuit evaluation
//! - [`validation`]: Input validation utilities
//! - [`error`]: Error types

pub mod config;
pub mod error;
pub mod qsp;
pub mod validation;

pub use config::Config;
pub use error::{Error, Result};

#[cfg(test)]
pub mod test_utils;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Python extension module entry point.
#[cfg(feature = "python")]
#[pyo3::pymodule]
fn qsp_models(m: &pyo3::Bound<'_, pyo3::types::PyModule>) -> pyo3::PyResult<()> {
    qsp::pyo3_bindings::python::register_qsp_module(m)
}
