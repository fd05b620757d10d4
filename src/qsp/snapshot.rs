// Copyright 2026 QSP Models Contributors
// SPDX-License-Identifier: Apache-2.0

//! JSON persistence of trained models.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use super::loss::LossKind;
use super::types::Convention;
use crate::error::Result;
use crate::validation::{validate_finite, validate_phase_count};

/// Serializable record of a model: its configuration, phases and training curve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelSnapshot {
    pub poly_deg: usize,
    pub convention: Convention,
    pub loss: LossKind,
    pub learning_rate: f64,
    /// φ_0 first.
    pub phases: Vec<f64>,
    #[serde(default)]
    pub loss_history: Vec<f64>,
}

impl ModelSnapshot {
    /// Check that the phases match the degree and are finite.
    pub fn validate(&self) -> Result<()> {
        validate_phase_count(self.poly_deg, self.phases.len())?;
        validate_finite("phases", &self.phases)?;
        Ok(())
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let snapshot: Self = serde_json::from_str(json)?;
        snapshot.validate()?;
        Ok(snapshot)
    }

    /// Write the snapshot as pretty-printed JSON.
    pub fn save(&self, path: &Path) -> Result<()> {
        fs::write(path, self.to_json()?)?;
        info!(path = %path.display(), phases = self.phases.len(), "Saved model snapshot");
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let snapshot = Self::from_json(&content)?;
        info!(path = %path.display(), poly_deg = snapshot.poly_deg, "Loaded model snapshot");
        Ok(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Error, ValidationError};
    use tempfile::tempdir;

    fn sample() -> ModelSnapshot {
        ModelSnapshot {
            poly_deg: 2,
            convention: Convention::Plus,
            loss: LossKind::MaxDeviationSquared,
            learning_rate: 0.05,
            phases: vec![0.1, 0.2, 0.3],
            loss_history: vec![1.0, 0.5],
        }
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("model.json");
        let snapshot = sample();
        snapshot.save(&path).unwrap();
        assert_eq!(ModelSnapshot::load(&path).unwrap(), snapshot);
    }

    #[test]
    fn test_json_uses_integer_convention() {
        let json = sample().to_json().unwrap();
        assert!(json.contains("\"convention\": 1"));
        assert!(json.contains("\"loss\": \"max_deviation_squared\""));
    }

    #[test]
    fn test_missing_history_defaults_empty() {
        let json = r#"{"poly_deg":0,"convention":0,"loss":"mean_deviation","learning_rate":0.01,"phases":[0.7]}"#;
        let snapshot = ModelSnapshot::from_json(json).unwrap();
        assert!(snapshot.loss_history.is_empty());
    }

    #[test]
    fn test_rejects_phase_count_mismatch() {
        let json = r#"{"poly_deg":3,"convention":0,"loss":"mean_deviation","learning_rate":0.01,"phases":[0.1,0.2]}"#;
        let err = ModelSnapshot::from_json(json).unwrap_err();
        assert!(matches!(
            err,
            Error::Validation(ValidationError::LengthMismatch { .. })
        ));
    }

    #[test]
    fn test_rejects_bad_convention() {
        let json = r#"{"poly_deg":0,"convention":4,"loss":"mean_deviation","learning_rate":0.01,"phases":[0.1]}"#;
        assert!(matches!(
            ModelSnapshot::from_json(json),
            Err(Error::Serialization(_))
        ));
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempdir().unwrap();
        let err = ModelSnapshot::load(&dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }
}
