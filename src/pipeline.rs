//! A complete training run
//!
//! [`run`] loads the data, holds out a stratified test partition, fits the
//! configured classifier on the rest, scores it on the held-out records and
//! stores the artifact. Every step blocks until it is done and the first
//! failing step ends the run.
use std::path::PathBuf;

use linfa::ParamGuard;
use serde::Serialize;

use crate::dataset::DataSource;
use crate::error::Result;
use crate::metrics::{evaluate, Evaluation};
use crate::models::ModelKind;
use crate::persist::{default_model_path, ModelArtifact};
use crate::split::StratifiedSplit;

/// Everything a run needs to know
#[derive(Debug, Clone, PartialEq)]
pub struct TrainConfig {
    pub source: DataSource,
    pub model: ModelKind,
    pub model_path: PathBuf,
}

impl TrainConfig {
    /// Train the default classifier on `source` and store it at the default path
    pub fn new(source: DataSource) -> Self {
        TrainConfig {
            source,
            model: ModelKind::default(),
            model_path: default_model_path(),
        }
    }

    pub fn model(mut self, model: ModelKind) -> Self {
        self.model = model;
        self
    }

    pub fn model_path(mut self, model_path: impl Into<PathBuf>) -> Self {
        self.model_path = model_path.into();
        self
    }
}

/// Outcome of a successful run, serialized in this field order
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub mode: &'static str,
    pub model_type: ModelKind,
    /// Number of records loaded, before splitting
    pub n_samples: usize,
    #[serde(flatten)]
    pub evaluation: Evaluation,
    pub model_path: String,
    pub feature_names: Vec<String>,
    pub n_train: usize,
    pub n_test: usize,
}

pub fn run(config: &TrainConfig) -> Result<RunSummary> {
    let _span = tracing::info_span!(
        "run",
        mode = config.source.mode(),
        model = config.model.name()
    )
    .entered();

    let data = config.source.load()?;
    let (train, test) = StratifiedSplit::params().check()?.split(&data)?;
    tracing::info!(
        samples = data.nsamples(),
        features = data.nfeatures(),
        classes = data.classes().len(),
        train = train.nsamples(),
        test = test.nsamples(),
        "loaded dataset"
    );

    let model = config.model.fit(train.dataset())?;
    let evaluation = evaluate(&model, test.dataset(), data.classes())?;

    let artifact = ModelArtifact::new(
        model,
        data.classes().clone(),
        data.feature_names().to_vec(),
    );
    artifact.save(&config.model_path)?;

    Ok(RunSummary {
        mode: config.source.mode(),
        model_type: artifact.kind,
        n_samples: data.nsamples(),
        evaluation,
        model_path: config.model_path.display().to_string(),
        feature_names: artifact.feature_names,
        n_train: train.nsamples(),
        n_test: test.nsamples(),
    })
}
