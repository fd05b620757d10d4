// Copyright 2026 QSP Models Contributors
// SPDX-License-Identifier: Apache-2.0

//! PyO3 bindings for the QSP model.
//!
//! Usage from Python:
//! ```python
//! from qsp_models.qsp import QspModel
//!
//! model = QspModel(poly_deg=5, convention=0, learning_rate=0.01, seed=7)
//! history = model.fit(thetas, targets_re, targets_im, epochs=200, batch_size=32)
//! phases = model.trainable_weights()[0]
//! ```

#[cfg(feature = "python")]
pub mod python {
    use ndarray::Array1;
    use num_complex::Complex64;
    use pyo3::exceptions::PyValueError;
    use pyo3::prelude::*;

    use crate::qsp::circuit::QspCircuit;
    use crate::qsp::model::{construct_qsp_model, FitOptions, QspModel};

    fn to_py_err(e: crate::error::Error) -> PyErr {
        PyValueError::new_err(e.to_string())
    }

    fn targets_from_parts(re: Vec<f64>, im: Vec<f64>) -> PyResult<Array1<Complex64>> {
        if re.len() != im.len() {
            return Err(PyValueError::new_err(format!(
                "targets_re has {} entries but targets_im has {}",
                re.len(),
                im.len()
            )));
        }
        Ok(re
            .into_iter()
            .zip(im)
            .map(|(r, i)| Complex64::new(r, i))
            .collect())
    }

    /// Trainable QSP model exposed to Python.
    #[pyclass(name = "QspModel")]
    pub struct PyQspModel {
        inner: QspModel,
    }

    #[pymethods]
    impl PyQspModel {
        #[new]
        #[pyo3(signature = (poly_deg=0, convention=0, learning_rate=0.01, mean_or_max=0, squared=1, seed=None))]
        fn new(
            poly_deg: i64,
            convention: i64,
            learning_rate: f64,
            mean_or_max: i64,
            squared: i64,
            seed: Option<u64>,
        ) -> PyResult<Self> {
            let inner =
                construct_qsp_model(poly_deg, convention, learning_rate, mean_or_max, squared, seed)
                    .map_err(to_py_err)?;
            Ok(Self { inner })
        }

        /// Readout convention (0 or 1).
        #[getter]
        fn convention(&self) -> i64 {
            self.inner.convention().code()
        }

        #[getter]
        fn poly_deg(&self) -> usize {
            self.inner.poly_deg()
        }

        /// Phase vectors, φ_0 first.
        fn trainable_weights(&self) -> Vec<Vec<f64>> {
            self.inner
                .trainable_weights()
                .iter()
                .map(|w| w.to_vec())
                .collect()
        }

        /// Predictions as (real, imag) lists.
        fn predict(&self, thetas: Vec<f64>) -> (Vec<f64>, Vec<f64>) {
            let pred = self.inner.predict(Array1::from(thetas).view());
            (
                pred.iter().map(|z| z.re).collect(),
                pred.iter().map(|z| z.im).collect(),
            )
        }

        /// Train and return the per-epoch loss.
        #[pyo3(signature = (thetas, targets_re, targets_im, epochs=1, batch_size=32, shuffle=true))]
        fn fit(
            &mut self,
            thetas: Vec<f64>,
            targets_re: Vec<f64>,
            targets_im: Vec<f64>,
            epochs: usize,
            batch_size: usize,
            shuffle: bool,
        ) -> PyResult<Vec<f64>> {
            let thetas = Array1::from(thetas);
            let targets = targets_from_parts(targets_re, targets_im)?;
            let options = FitOptions {
                epochs,
                batch_size,
                shuffle,
            };
            let history = self
                .inner
                .fit(thetas.view(), targets.view(), &options)
                .map_err(to_py_err)?;
            Ok(history.loss)
        }

        fn evaluate(&self, thetas: Vec<f64>, targets_re: Vec<f64>, targets_im: Vec<f64>) -> PyResult<f64> {
            let thetas = Array1::from(thetas);
            let targets = targets_from_parts(targets_re, targets_im)?;
            self.inner
                .evaluate(thetas.view(), targets.view())
                .map_err(to_py_err)
        }

        /// ⟨+|U|+⟩ of the current phases as (real, imag) lists.
        fn qsp_response(&self, thetas: Vec<f64>) -> PyResult<(Vec<f64>, Vec<f64>)> {
            let circuit = QspCircuit::new(self.inner.trainable_weights()[0]).map_err(to_py_err)?;
            let response = circuit.qsp_response(Array1::from(thetas).view());
            Ok((
                response.iter().map(|z| z.re).collect(),
                response.iter().map(|z| z.im).collect(),
            ))
        }
    }

    /// Register the QSP submodule with the parent Python module.
    pub fn register_qsp_module(parent: &Bound<'_, PyModule>) -> PyResult<()> {
        let m = PyModule::new(parent.py(), "qsp")?;
        m.add_class::<PyQspModel>()?;
        parent.add_submodule(&m)?;
        Ok(())
    }
}
