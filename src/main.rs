// Copyright 2026 QSP Models Contributors
// SPDX-License-Identifier: Apache-2.0

//! QSP phase fitting tool
//!
//! Fits the phases of a QSP circuit to sampled target values and evaluates
//! trained circuits.
//!
//! # Usage
//!
//! ```bash
//! # Fit a degree-5 circuit and save the snapshot
//! qsp-fit train --data samples.json --poly-deg 5 --output model.json
//!
//! # Evaluate a snapshot on 300 points in [0, π)
//! qsp-fit eval --model model.json --points 300
//!
//! # Show effective configuration
//! qsp-fit config
//! ```

use std::f64::consts::PI;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use ndarray::Array1;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use qsp_models::qsp::data::{load_samples, to_arrays};
use qsp_models::qsp::{ModelSnapshot, QspCircuit};
use qsp_models::{config::Config, Error, Result, VERSION};

/// QSP phase fitting tool
#[derive(Parser)]
#[command(name = "qsp-fit")]
#[command(author = "QSP Models Contributors")]
#[command(version = VERSION)]
#[command(about = "Train and evaluate quantum signal processing circuits")]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fit circuit phases to a sample file
    Train {
        /// JSON array of {theta, re, im} samples
        #[arg(short, long)]
        data: PathBuf,

        /// Where to write the model snapshot
        #[arg(short, long, default_value = "qsp_model.json")]
        output: PathBuf,

        /// Polynomial degree
        #[arg(long)]
        poly_deg: Option<usize>,

        /// Readout convention (0 or 1)
        #[arg(long)]
        convention: Option<i64>,

        /// Training epochs
        #[arg(long)]
        epochs: Option<usize>,

        /// Adam learning rate
        #[arg(long)]
        learning_rate: Option<f64>,

        /// RNG seed
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Evaluate a saved model over [0, π)
    Eval {
        /// Model snapshot file
        #[arg(short, long)]
        model: PathBuf,

        /// Number of grid points
        #[arg(long, default_value_t = 300)]
        points: usize,
    },

    /// Show effective configuration
    Config,

    /// Validate configuration file
    Validate,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(level) = cli.log_level {
        config.logging.level = level;
    }

    init_logging(&config.logging.level, &config.logging.format);

    match cli.command {
        Commands::Train {
            data,
            output,
            poly_deg,
            convention,
            epochs,
            learning_rate,
            seed,
        } => {
            if let Some(deg) = poly_deg {
                config.model.poly_deg = deg;
            }
            if let Some(convention) = convention {
                config.model.convention = convention;
            }
            if let Some(epochs) = epochs {
                config.training.epochs = epochs;
            }
            if let Some(lr) = learning_rate {
                config.training.learning_rate = lr;
            }
            if seed.is_some() {
                config.training.seed = seed;
            }

            config.validate()?;

            let samples = load_samples(&data)?;
            let (thetas, targets) = to_arrays(&samples);

            info!(
                version = VERSION,
                poly_deg = config.model.poly_deg,
                convention = config.model.convention,
                samples = samples.len(),
                "Training QSP model"
            );

            let mut model = config.build_model()?;
            let history = model.fit(thetas.view(), targets.view(), &config.fit_options())?;

            model.snapshot(Some(&history)).save(&output)?;

            let final_loss = history
                .final_loss()
                .ok_or_else(|| Error::Config("training produced no epochs".into()))?;
            println!("final loss: {}", final_loss);
            println!("phases: {:?}", model.trainable_weights()[0].to_vec());
        }

        Commands::Eval { model, points } => {
            if points == 0 {
                return Err(Error::Config("points must be greater than 0".into()));
            }
            let snapshot = ModelSnapshot::load(&model)?;
            let circuit = QspCircuit::new(Array1::from(snapshot.phases.clone()).view())?;
            let thetas = Array1::from_iter((0..points).map(|i| PI * i as f64 / points as f64));

            let rows = circuit.response_table(thetas.view());
            println!("{}", serde_json::to_string_pretty(&rows)?);
        }

        Commands::Config => {
            println!("{}", serde_yaml::to_string(&config)?);
        }

        Commands::Validate => match config.validate() {
            Ok(()) => {
                println!("Configuration is valid");
            }
            Err(e) => {
                eprintln!("Configuration error: {}", e);
                std::process::exit(1);
            }
        },
    }

    Ok(())
}

/// Initialize logging with tracing.
fn init_logging(level: &str, format: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let registry = tracing_subscriber::registry().with(filter);
    if format == "json" {
        registry
            .with(fmt::layer().json().with_target(true).with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
            .init();
    }
}
