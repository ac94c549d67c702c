//! Classifier kinds
//!
//! A run trains exactly one of three classifiers. Each comes with a fixed
//! set of hyper-parameters (see the `*Params::new` constructors) and a
//! seeded random generator, so training on the same data twice yields the
//! same model.
//!
//! | kind | algorithm |
//! |---|---|
//! | `randomforest` | bagged Gini classification trees, majority vote |
//! | `svm` | one-vs-rest `linfa-svm` classifiers with a gaussian kernel |
//! | `gradientboosting` | boosted least-squares regression trees on the multinomial deviance |
use std::fmt;
use std::str::FromStr;

use linfa::prelude::*;
use linfa::ParamGuard;
use ndarray::{Array1, Array2, ArrayView1, Ix1};
use serde::{Deserialize, Serialize};

use crate::error::{Result, TrainError};

mod gradient_boosting;
mod random_forest;
mod svm;

pub use gradient_boosting::*;
pub use random_forest::*;
pub use svm::*;

/// The classifier families a run can train
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ModelKind {
    #[default]
    RandomForest,
    Svm,
    GradientBoosting,
}

impl ModelKind {
    pub const ALL: [ModelKind; 3] = [
        ModelKind::RandomForest,
        ModelKind::Svm,
        ModelKind::GradientBoosting,
    ];

    /// Name of the kind as accepted on the command line
    pub fn name(&self) -> &'static str {
        match self {
            ModelKind::RandomForest => "randomforest",
            ModelKind::Svm => "svm",
            ModelKind::GradientBoosting => "gradientboosting",
        }
    }

    /// Resolve a user supplied name, falling back to the default kind
    ///
    /// Names are compared after lowercasing. The second value is `true` when
    /// `name` did not match any kind and the default was chosen instead.
    pub fn resolve(name: &str) -> (ModelKind, bool) {
        match name.parse::<ModelKind>() {
            Ok(kind) => (kind, false),
            Err(_) => (ModelKind::default(), true),
        }
    }

    /// Like [`ModelKind::resolve`], logging a warning when falling back
    pub fn from_name(name: &str) -> ModelKind {
        let (kind, fallback) = Self::resolve(name);
        if fallback {
            tracing::warn!(
                requested = name,
                using = kind.name(),
                "unknown model kind, falling back to the default"
            );
        }
        kind
    }

    /// Fit a fresh classifier of this kind with its fixed hyper-parameters
    pub fn fit(&self, train: &Dataset<f64, usize, Ix1>) -> Result<Classifier> {
        tracing::info!(
            kind = self.name(),
            samples = train.records().nrows(),
            features = train.records().ncols(),
            "fitting classifier"
        );

        let model = match self {
            ModelKind::RandomForest => {
                Classifier::RandomForest(RandomForestParams::new().check()?.fit(train)?)
            }
            ModelKind::Svm => Classifier::Svm(SvmParams::new().check()?.fit(train)?),
            ModelKind::GradientBoosting => {
                Classifier::GradientBoosting(GradientBoostingParams::new().check()?.fit(train)?)
            }
        };

        Ok(model)
    }
}

impl FromStr for ModelKind {
    type Err = TrainError;

    fn from_str(name: &str) -> Result<Self> {
        let lowered = name.to_lowercase();
        ModelKind::ALL
            .iter()
            .find(|kind| kind.name() == lowered)
            .copied()
            .ok_or_else(|| TrainError::Arguments(format!("unknown model kind '{}'", name)))
    }
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A fitted classifier of any kind
#[derive(Serialize, Deserialize)]
pub enum Classifier {
    RandomForest(RandomForestClassifier),
    Svm(SvmClassifier),
    GradientBoosting(GradientBoostingClassifier),
}

impl Classifier {
    pub fn kind(&self) -> ModelKind {
        match self {
            Classifier::RandomForest(_) => ModelKind::RandomForest,
            Classifier::Svm(_) => ModelKind::Svm,
            Classifier::GradientBoosting(_) => ModelKind::GradientBoosting,
        }
    }
}

impl fmt::Debug for Classifier {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Classifier::RandomForest(model) => model.fmt(f),
            Classifier::Svm(model) => model.fmt(f),
            Classifier::GradientBoosting(model) => model.fmt(f),
        }
    }
}

impl PredictInplace<Array2<f64>, Array1<usize>> for Classifier {
    fn predict_inplace(&self, x: &Array2<f64>, y: &mut Array1<usize>) {
        match self {
            Classifier::RandomForest(model) => model.predict_inplace(x, y),
            Classifier::Svm(model) => model.predict_inplace(x, y),
            Classifier::GradientBoosting(model) => model.predict_inplace(x, y),
        }
    }

    fn default_target(&self, x: &Array2<f64>) -> Array1<usize> {
        Array1::zeros(x.nrows())
    }
}

/// Index of the first maximum of `row`
pub(crate) fn argmax<T: PartialOrd + Copy>(row: ArrayView1<T>) -> usize {
    let mut best = 0;
    for (idx, value) in row.iter().enumerate() {
        if *value > row[best] {
            best = idx;
        }
    }
    best
}

/// Number of classes when targets are class indices
pub(crate) fn nclasses(targets: &Array1<usize>) -> usize {
    targets.iter().max().map_or(0, |x| x + 1)
}
