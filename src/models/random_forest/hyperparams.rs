use linfa::ParamGuard;
use serde::{Deserialize, Serialize};

use crate::error::{Result, TrainError};

/// Number of features every tree of the forest is grown on
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub enum MaxFeatures {
    /// Square root of the number of features, at least one
    Sqrt,
    /// Every feature
    All,
    /// Fraction of the features in `(0, 1]`, at least one
    Fraction(f64),
}

impl MaxFeatures {
    pub fn count(&self, nfeatures: usize) -> usize {
        let count = match self {
            MaxFeatures::Sqrt => (nfeatures as f64).sqrt().floor() as usize,
            MaxFeatures::All => nfeatures,
            MaxFeatures::Fraction(ratio) => (ratio * nfeatures as f64).floor() as usize,
        };
        count.clamp(1.min(nfeatures), nfeatures)
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct RandomForestValidParams {
    ensemble_size: usize,
    bootstrap: bool,
    max_features: MaxFeatures,
    max_depth: Option<usize>,
    seed: u64,
}

impl RandomForestValidParams {
    pub fn ensemble_size(&self) -> usize {
        self.ensemble_size
    }

    pub fn bootstrap(&self) -> bool {
        self.bootstrap
    }

    pub fn max_features(&self) -> MaxFeatures {
        self.max_features
    }

    pub fn max_depth(&self) -> Option<usize> {
        self.max_depth
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }
}

/// The set of hyperparameters of a [random forest](crate::RandomForestClassifier)
///
/// ### Example
///
/// ```rust
/// use linfa::prelude::*;
/// use linfa_train::RandomForestParams;
///
/// let (train, valid) = linfa_datasets::iris().split_with_ratio(0.8);
/// let forest = RandomForestParams::new()
///     .ensemble_size(10)
///     .fit(&train)
///     .unwrap();
/// let predictions = forest.predict(valid.records());
/// assert_eq!(predictions.len(), valid.nsamples());
/// ```
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct RandomForestParams(RandomForestValidParams);

impl RandomForestParams {
    /// Defaults are 100 trees grown on bootstrap samples, `sqrt(n)` features
    /// per tree, unlimited depth and seed `42`
    pub fn new() -> Self {
        Self(RandomForestValidParams {
            ensemble_size: 100,
            bootstrap: true,
            max_features: MaxFeatures::Sqrt,
            max_depth: None,
            seed: 42,
        })
    }

    /// Sets the number of trees in the forest
    pub fn ensemble_size(mut self, ensemble_size: usize) -> Self {
        self.0.ensemble_size = ensemble_size;
        self
    }

    /// Grow every tree on a bootstrap sample (`true`) or on the whole training set
    pub fn bootstrap(mut self, bootstrap: bool) -> Self {
        self.0.bootstrap = bootstrap;
        self
    }

    /// Sets how many features each tree sees
    pub fn max_features(mut self, max_features: MaxFeatures) -> Self {
        self.0.max_features = max_features;
        self
    }

    /// Sets the optional depth limit of every tree
    pub fn max_depth(mut self, max_depth: Option<usize>) -> Self {
        self.0.max_depth = max_depth;
        self
    }

    /// Sets the seed for bootstrap and feature sampling
    pub fn seed(mut self, seed: u64) -> Self {
        self.0.seed = seed;
        self
    }
}

impl Default for RandomForestParams {
    fn default() -> Self {
        Self::new()
    }
}

impl ParamGuard for RandomForestParams {
    type Checked = RandomForestValidParams;
    type Error = TrainError;

    fn check_ref(&self) -> Result<&Self::Checked> {
        if self.0.ensemble_size < 1 {
            Err(TrainError::Parameters(format!(
                "Ensemble size should be at least one, but was {}",
                self.0.ensemble_size
            )))
        } else if let MaxFeatures::Fraction(ratio) = self.0.max_features {
            if ratio <= 0.0 || ratio > 1.0 {
                Err(TrainError::Parameters(format!(
                    "Feature fraction should be in (0, 1], but was {}",
                    ratio
                )))
            } else {
                Ok(&self.0)
            }
        } else {
            Ok(&self.0)
        }
    }

    fn check(self) -> Result<Self::Checked> {
        self.check_ref()?;
        Ok(self.0)
    }
}
