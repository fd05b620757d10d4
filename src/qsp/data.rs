// Copyright 2026 QSP Models Contributors
// SPDX-License-Identifier: Apache-2.0

//! Training samples read from JSON.

use std::fs;
use std::path::Path;

use ndarray::Array1;
use num_complex::Complex64;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::Result;
use crate::validation::validate_non_empty;

/// One (θ, target) pair; the target is `re + i·im`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub theta: f64,
    pub re: f64,
    pub im: f64,
}

impl Sample {
    pub fn target(&self) -> Complex64 {
        Complex64::new(self.re, self.im)
    }
}

/// Parse a JSON array of samples.
pub fn parse_samples(json: &str) -> Result<Vec<Sample>> {
    let samples: Vec<Sample> = serde_json::from_str(json)?;
    validate_non_empty("samples", samples.len())?;
    Ok(samples)
}

/// Load samples from a JSON file.
pub fn load_samples(path: &Path) -> Result<Vec<Sample>> {
    let content = fs::read_to_string(path)?;
    let samples = parse_samples(&content)?;
    info!(path = %path.display(), count = samples.len(), "Loaded training samples");
    Ok(samples)
}

/// Split samples into index-aligned θ and target arrays.
pub fn to_arrays(samples: &[Sample]) -> (Array1<f64>, Array1<Complex64>) {
    let thetas = samples.iter().map(|s| s.theta).collect();
    let targets = samples.iter().map(Sample::target).collect();
    (thetas, targets)
}
