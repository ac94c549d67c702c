//! Command line and environment configuration
use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::dataset::DataSource;
use crate::models::ModelKind;
use crate::persist::default_model_path;
use crate::pipeline::TrainConfig;

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Mode {
    /// The bundled iris flower dataset
    #[default]
    Iris,
    /// One or more CSV files with a `label` column
    Csv,
}

/// Train a classifier, print its evaluation as JSON and store the model
#[derive(Parser, Debug, Clone)]
#[command(name = "linfa-train", author, version, about, long_about = None)]
pub struct Cli {
    /// Where the training data comes from
    #[arg(long, env = "LINFA_TRAIN_MODE", value_enum, default_value_t = Mode::Iris)]
    pub mode: Mode,

    /// Classifier to train: randomforest, svm or gradientboosting
    ///
    /// Unknown names fall back to randomforest.
    #[arg(long, env = "LINFA_TRAIN_MODEL", default_value = "randomforest")]
    pub model: String,

    /// CSV files to train on, concatenated in order (csv mode)
    #[arg(long, num_args = 0..)]
    pub files: Vec<PathBuf>,

    /// Field delimiter of the CSV files
    #[arg(long, default_value = ",", value_parser = parse_delimiter)]
    pub delimiter: u8,

    /// Where to store the fitted model
    #[arg(long, env = "LINFA_TRAIN_MODEL_PATH")]
    pub model_path: Option<PathBuf>,
}

impl Cli {
    pub fn into_config(self) -> TrainConfig {
        let source = match self.mode {
            Mode::Iris => {
                if !self.files.is_empty() {
                    tracing::warn!(files = self.files.len(), "ignoring CSV files in iris mode");
                }
                DataSource::Iris
            }
            Mode::Csv => DataSource::Csv {
                files: self.files,
                delimiter: self.delimiter,
            },
        };

        TrainConfig {
            source,
            model: ModelKind::from_name(&self.model),
            model_path: self.model_path.unwrap_or_else(default_model_path),
        }
    }
}

fn parse_delimiter(value: &str) -> Result<u8, String> {
    let mut chars = value.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if c.is_ascii() => Ok(c as u8),
        _ => Err(format!(
            "delimiter must be a single ASCII character, got '{}'",
            value
        )),
    }
}
