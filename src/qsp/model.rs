// Copyright 2026 QSP Models Contributors
// SPDX-License-Identifier: Apache-2.0

//! End-to-end trainable QSP model.
//!
//! A [`QspModel`] maps a batch of signal angles to complex predictions
//! P(x) + iQ(x), carries one of the four deviation losses, and fits its
//! phases with Adam over minibatches of (θ, target) pairs.

use ndarray::{Array1, ArrayView1, Axis};
use num_complex::Complex64;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::layer::QspLayer;
use super::loss::LossKind;
use super::optimizer::{Adam, AdamConfig};
use super::snapshot::ModelSnapshot;
use super::types::{Convention, PhaseAngles, QspConfig};
use crate::error::{Result, ValidationError};
use crate::validation::{validate_non_empty, validate_samples};

/// Minibatch training options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FitOptions {
    /// Passes over the full sample set.
    pub epochs: usize,
    /// Examples per optimizer step.
    pub batch_size: usize,
    /// Reshuffle sample order every epoch.
    pub shuffle: bool,
}

impl Default for FitOptions {
    fn default() -> Self {
        Self {
            epochs: 1,
            batch_size: 32,
            shuffle: true,
        }
    }
}

impl FitOptions {
    /// Validate options.
    pub fn validate(&self) -> Result<()> {
        if self.epochs == 0 {
            return Err(ValidationError::Field {
                field: "epochs".into(),
                message: "must be greater than 0".into(),
            }
            .into());
        }
        if self.batch_size == 0 {
            return Err(ValidationError::Field {
                field: "batch_size".into(),
                message: "must be greater than 0".into(),
            }
            .into());
        }
        Ok(())
    }
}

/// Per-epoch training record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct History {
    /// Sample-weighted mean of the minibatch losses of each epoch.
    pub loss: Vec<f64>,
}

impl History {
    pub fn initial_loss(&self) -> Option<f64> {
        self.loss.first().copied()
    }

    pub fn final_loss(&self) -> Option<f64> {
        self.loss.last().copied()
    }
}

/// Trainable QSP model.
#[derive(Debug, Clone)]
pub struct QspModel {
    layer: QspLayer,
    loss: LossKind,
    optimizer: Adam,
    rng: StdRng,
}

/// Build a model from raw flags.
///
/// * `convention` - 0 for the |0⟩⟨0| readout, 1 for |+⟩⟨+|
/// * `mean_or_max` - 0 for a mean reduction, 1 for max
/// * `squared` - 0 for |r|, 1 for |r|²
/// * `seed` - seeds phase initialization and minibatch shuffling; `None`
///   draws from the OS
pub fn construct_qsp_model(
    poly_deg: i64,
    convention: i64,
    learning_rate: f64,
    mean_or_max: i64,
    squared: i64,
    seed: Option<u64>,
) -> Result<QspModel> {
    let config = QspConfig::new(poly_deg, convention)?;
    let loss = LossKind::from_flags(mean_or_max, squared)?;
    QspModel::new(config, loss, AdamConfig::with_learning_rate(learning_rate), seed)
}

impl QspModel {
    /// Create a model with randomly initialized phases.
    pub fn new(config: QspConfig, loss: LossKind, adam: AdamConfig, seed: Option<u64>) -> Result<Self> {
        let mut rng = seeded_rng(seed);
        let layer = QspLayer::from_config(config, &mut rng);
        Self::assemble(layer, loss, adam, rng)
    }

    /// Create a model starting from explicit phases.
    pub fn with_phases(
        config: QspConfig,
        phases: PhaseAngles,
        loss: LossKind,
        adam: AdamConfig,
        seed: Option<u64>,
    ) -> Result<Self> {
        let layer = QspLayer::with_phases(config, phases)?;
        Self::assemble(layer, loss, adam, seeded_rng(seed))
    }

    /// Restore a model from a snapshot. Optimizer moments start from zero.
    pub fn from_snapshot(snapshot: &ModelSnapshot, seed: Option<u64>) -> Result<Self> {
        snapshot.validate()?;
        let config = QspConfig {
            poly_deg: snapshot.poly_deg,
            convention: snapshot.convention,
        };
        Self::with_phases(
            config,
            PhaseAngles::from_vec(snapshot.phases.clone()),
            snapshot.loss,
            AdamConfig::with_learning_rate(snapshot.learning_rate),
            seed,
        )
    }

    fn assemble(layer: QspLayer, loss: LossKind, adam: AdamConfig, rng: StdRng) -> Result<Self> {
        let optimizer = Adam::new(adam, layer.phases().len()).map_err(|message| {
            ValidationError::Field {
                field: "optimizer".into(),
                message,
            }
        })?;
        info!(
            poly_deg = layer.poly_deg(),
            convention = layer.convention().code(),
            loss = %loss,
            learning_rate = adam.learning_rate,
            "Constructed QSP model"
        );
        Ok(Self {
            layer,
            loss,
            optimizer,
            rng,
        })
    }

    pub fn layer(&self) -> &QspLayer {
        &self.layer
    }

    pub fn poly_deg(&self) -> usize {
        self.layer.poly_deg()
    }

    /// Readout convention, for consumers that interpret predictions.
    pub fn convention(&self) -> Convention {
        self.layer.convention()
    }

    pub fn loss_kind(&self) -> LossKind {
        self.loss
    }

    pub fn learning_rate(&self) -> f64 {
        self.optimizer.learning_rate()
    }

    /// Optimizer steps applied so far.
    pub fn iterations(&self) -> u64 {
        self.optimizer.iterations()
    }

    /// Trainable tensors; element 0 is the phase vector, φ_0 first.
    pub fn trainable_weights(&self) -> Vec<ArrayView1<'_, f64>> {
        vec![self.layer.phases().view()]
    }

    /// Complex predictions P(x) + iQ(x), one per signal angle.
    pub fn predict(&self, thetas: ArrayView1<'_, f64>) -> Array1<Complex64> {
        self.layer.forward(thetas).to_complex()
    }

    /// Loss on (θ, target) pairs without updating.
    pub fn evaluate(&self, thetas: ArrayView1<'_, f64>, targets: ArrayView1<'_, Complex64>) -> Result<f64> {
        validate_samples(thetas.len(), targets.len())?;
        let predictions = self.predict(thetas);
        Ok(self.loss.evaluate(targets, predictions.view()))
    }

    /// Loss and its gradient with respect to each phase.
    pub fn loss_and_gradient(
        &self,
        thetas: ArrayView1<'_, f64>,
        targets: ArrayView1<'_, Complex64>,
    ) -> Result<(f64, Array1<f64>)> {
        validate_samples(thetas.len(), targets.len())?;
        let (readout, jacobian) = self.layer.forward_with_jacobian(thetas);
        let predictions = readout.to_complex();
        let (value, dl_dpred) = self.loss.value_and_grad(targets, predictions.view());

        // dL/dφ_k = Σ_i Re(g_i)·∂re_i/∂φ_k + Im(g_i)·∂im_i/∂φ_k
        let g_re = dl_dpred.mapv(|z| z.re);
        let g_im = dl_dpred.mapv(|z| z.im);
        let grad = jacobian.real.t().dot(&g_re) + jacobian.imag.t().dot(&g_im);
        Ok((value, grad))
    }

    /// One optimizer step on a single batch. Returns the loss before the update.
    pub fn train_step(&mut self, thetas: ArrayView1<'_, f64>, targets: ArrayView1<'_, Complex64>) -> Result<f64> {
        let (value, grad) = self.loss_and_gradient(thetas, targets)?;
        self.optimizer
            .step(self.layer.phases_mut().as_array_mut(), grad.view());
        debug!(
            step = self.optimizer.iterations(),
            loss = value,
            batch = thetas.len(),
            "Applied optimizer step"
        );
        Ok(value)
    }

    /// Fit the phases to (θ, target) pairs with minibatch Adam.
    pub fn fit(
        &mut self,
        thetas: ArrayView1<'_, f64>,
        targets: ArrayView1<'_, Complex64>,
        options: &FitOptions,
    ) -> Result<History> {
        options.validate()?;
        validate_samples(thetas.len(), targets.len())?;
        validate_non_empty("samples", thetas.len())?;

        let n = thetas.len();
        let mut order: Vec<usize> = (0..n).collect();
        let mut history = History {
            loss: Vec::with_capacity(options.epochs),
        };

        info!(
            samples = n,
            epochs = options.epochs,
            batch_size = options.batch_size,
            loss = %self.loss,
            "Starting QSP training"
        );

        for epoch in 0..options.epochs {
            if options.shuffle {
                order.shuffle(&mut self.rng);
            }

            let mut weighted_sum = 0.0;
            for chunk in order.chunks(options.batch_size) {
                let batch_thetas = thetas.select(Axis(0), chunk);
                let batch_targets = targets.select(Axis(0), chunk);
                let value = self.train_step(batch_thetas.view(), batch_targets.view())?;
                weighted_sum += value * chunk.len() as f64;
            }
            let epoch_loss = weighted_sum / n as f64;
            if !epoch_loss.is_finite() {
                warn!(epoch, loss = epoch_loss, "Non-finite training loss");
            }
            debug!(epoch, loss = epoch_loss, "Epoch complete");
            history.loss.push(epoch_loss);
        }

        info!(
            epochs = options.epochs,
            initial_loss = history.initial_loss(),
            final_loss = history.final_loss(),
            "QSP training finished"
        );
        Ok(history)
    }

    /// Serializable record of the trained model.
    pub fn snapshot(&self, history: Option<&History>) -> ModelSnapshot {
        ModelSnapshot {
            poly_deg: self.poly_deg(),
            convention: self.convention(),
            loss: self.loss,
            learning_rate: self.learning_rate(),
            phases: self.layer.phases().to_vec(),
            loss_history: history.map(|h| h.loss.clone()).unwrap_or_default(),
        }
    }
}

fn seeded_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}
