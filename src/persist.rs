//! Model artifacts
//!
//! A fitted classifier is stored together with its kind, the label of every
//! class and the feature names it was trained on, encoded with `bincode`.
//! Saving writes a temporary file next to the destination and renames it, so
//! readers never observe a partially written artifact.
use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use linfa::traits::Predict;
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

use crate::dataset::ClassSet;
use crate::error::{Result, TrainError};
use crate::models::{Classifier, ModelKind};

/// Directory of stored models, relative to the install root
pub const MODELS_DIR: &str = "models";
/// File name of the artifact in [`MODELS_DIR`]
pub const MODEL_FILE: &str = "model.pkl";

/// Parent of the directory holding the running executable
///
/// An executable installed as `<root>/bin/linfa-train` resolves to `<root>`.
/// Falls back to the working directory when the executable path is unknown.
pub fn install_root() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().and_then(Path::parent).map(Path::to_path_buf))
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Location of the artifact when none is configured
pub fn default_model_path() -> PathBuf {
    install_root().join(MODELS_DIR).join(MODEL_FILE)
}

/// A fitted classifier ready to be stored or loaded
#[derive(Serialize, Deserialize, Debug)]
pub struct ModelArtifact {
    pub kind: ModelKind,
    pub classes: ClassSet,
    pub feature_names: Vec<String>,
    pub model: Classifier,
}

impl ModelArtifact {
    pub fn new(model: Classifier, classes: ClassSet, feature_names: Vec<String>) -> Self {
        ModelArtifact {
            kind: model.kind(),
            classes,
            feature_names,
            model,
        }
    }

    /// Write the artifact to `path`, replacing any previous file
    pub fn save(&self, path: &Path) -> Result<()> {
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir).map_err(|source| TrainError::Persist {
            path: dir.clone(),
            source,
        })?;

        let file = NamedTempFile::new_in(&dir).map_err(|source| TrainError::Persist {
            path: path.to_path_buf(),
            source,
        })?;
        let mut writer = BufWriter::new(file);
        let written =
            bincode::serde::encode_into_std_write(self, &mut writer, bincode::config::standard())?;

        let file = writer.into_inner().map_err(|err| TrainError::Persist {
            path: path.to_path_buf(),
            source: err.into_error(),
        })?;
        file.persist(path).map_err(|err| TrainError::Persist {
            path: path.to_path_buf(),
            source: err.error,
        })?;

        tracing::info!(
            path = %path.display(),
            bytes = written,
            kind = self.kind.name(),
            "saved model artifact"
        );

        Ok(())
    }

    /// Read an artifact written by [`ModelArtifact::save`]
    pub fn load(path: &Path) -> Result<Self> {
        let mut reader = BufReader::new(File::open(path)?);
        let artifact: ModelArtifact =
            bincode::serde::decode_from_std_read(&mut reader, bincode::config::standard())?;

        tracing::debug!(path = %path.display(), kind = artifact.kind.name(), "loaded model artifact");
        Ok(artifact)
    }

    /// Class index predicted for every record
    pub fn predict(&self, records: &Array2<f64>) -> Array1<usize> {
        self.model.predict(records)
    }

    /// Class label predicted for every record
    pub fn predict_labels(&self, records: &Array2<f64>) -> Vec<String> {
        self.predict(records)
            .iter()
            .map(|class| self.classes.label(*class).to_string())
            .collect()
    }
}
