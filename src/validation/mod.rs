// Copyright 2026 QSP Models Contributors
// SPDX-License-Identifier: Apache-2.0

//! Input validation for model construction and training data.

use crate::error::{Result, ValidationError};

/// Validate that a phase vector carries `poly_deg + 1` entries.
pub fn validate_phase_count(poly_deg: usize, num_phases: usize) -> Result<()> {
    if num_phases != poly_deg + 1 {
        return Err(ValidationError::LengthMismatch {
            field: "phases".into(),
            expected: poly_deg + 1,
            actual: num_phases,
        }
        .into());
    }
    Ok(())
}

/// Validate that signal angles and targets are index-aligned.
pub fn validate_samples(num_thetas: usize, num_targets: usize) -> Result<()> {
    if num_targets != num_thetas {
        return Err(ValidationError::LengthMismatch {
            field: "targets".into(),
            expected: num_thetas,
            actual: num_targets,
        }
        .into());
    }
    Ok(())
}

/// Validate a non-empty training set.
pub fn validate_non_empty(field: &str, len: usize) -> Result<()> {
    if len == 0 {
        return Err(ValidationError::Field {
            field: field.into(),
            message: "cannot be empty".into(),
        }
        .into());
    }
    Ok(())
}

/// Reject NaN or Inf entries.
pub fn validate_finite(field: &str, values: &[f64]) -> Result<()> {
    for (i, val) in values.iter().enumerate() {
        if val.is_nan() {
            return Err(ValidationError::Field {
                field: field.into(),
                message: format!("contains NaN at index {}", i),
            }
            .into());
        }
        if val.is_infinite() {
            return Err(ValidationError::Field {
                field: field.into(),
                message: format!("contains Inf at index {}", i),
            }
            .into());
        }
    }
    Ok(())
}
