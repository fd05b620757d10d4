// Copyright 2026 QSP Models Contributors
// SPDX-License-Identifier: Apache-2.0

//! Adam optimizer for the phase-angle vector.
//!
//! Ref: Kingma & Ba (2015), "Adam: A Method for Stochastic Optimization",
//! ICLR. arXiv:1412.6980

use ndarray::{Array1, ArrayView1, Zip};
use serde::{Deserialize, Serialize};

/// Adam hyperparameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AdamConfig {
    /// Step size.
    pub learning_rate: f64,
    /// Decay rate of the first-moment estimate.
    pub beta1: f64,
    /// Decay rate of the second-moment estimate.
    pub beta2: f64,
    /// Denominator offset.
    pub epsilon: f64,
}

impl Default for AdamConfig {
    fn default() -> Self {
        Self {
            learning_rate: 0.001,
            beta1: 0.9,
            beta2: 0.999,
            epsilon: 1e-7,
        }
    }
}

impl AdamConfig {
    /// Default moments with the given learning rate.
    pub fn with_learning_rate(learning_rate: f64) -> Self {
        Self {
            learning_rate,
            ..Default::default()
        }
    }

    /// Validate hyperparameters.
    pub fn validate(&self) -> Result<(), String> {
        if !self.learning_rate.is_finite() || self.learning_rate <= 0.0 {
            return Err("learning_rate must be a finite value > 0".into());
        }
        if !(0.0..1.0).contains(&self.beta1) {
            return Err("beta1 must be in [0, 1)".into());
        }
        if !(0.0..1.0).contains(&self.beta2) {
            return Err("beta2 must be in [0, 1)".into());
        }
        if !self.epsilon.is_finite() || self.epsilon <= 0.0 {
            return Err("epsilon must be > 0".into());
        }
        Ok(())
    }
}

/// Adam state for a fixed-length parameter vector.
#[derive(Debug, Clone)]
pub struct Adam {
    config: AdamConfig,
    m: Array1<f64>,
    v: Array1<f64>,
    step: u64,
}

impl Adam {
    /// Create an optimizer for `num_params` parameters.
    pub fn new(config: AdamConfig, num_params: usize) -> Result<Self, String> {
        config.validate()?;
        Ok(Self {
            config,
            m: Array1::zeros(num_params),
            v: Array1::zeros(num_params),
            step: 0,
        })
    }

    pub fn config(&self) -> &AdamConfig {
        &self.config
    }

    pub fn learning_rate(&self) -> f64 {
        self.config.learning_rate
    }

    /// Number of updates applied so far.
    pub fn iterations(&self) -> u64 {
        self.step
    }

    /// Apply one descent step in place: params ← params − lr_t · m / (√v + ε).
    ///
    /// # Panics
    /// Panics if `params` or `grads` differ in length from the optimizer state.
    pub fn step(&mut self, params: &mut Array1<f64>, grads: ArrayView1<'_, f64>) {
        assert_eq!(params.len(), self.m.len(), "parameter length changed");
        assert_eq!(grads.len(), self.m.len(), "gradient length mismatch");

        self.step += 1;
        let AdamConfig {
            learning_rate,
            beta1,
            beta2,
            epsilon,
        } = self.config;
        let t = self.step as i32;
        let lr_t = learning_rate * (1.0 - beta2.powi(t)).sqrt() / (1.0 - beta1.powi(t));

        Zip::from(params)
            .and(&mut self.m)
            .and(&mut self.v)
            .and(&grads)
            .for_each(|p, m, v, &g| {
                *m = beta1 * *m + (1.0 - beta1) * g;
                *v = beta2 * *v + (1.0 - beta2) * g * g;
                *p -= lr_t * *m / (v.sqrt() + epsilon);
            });
    }
}
