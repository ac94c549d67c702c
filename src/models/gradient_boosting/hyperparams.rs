use linfa::ParamGuard;
use serde::{Deserialize, Serialize};

use super::TreeLimits;
use crate::error::{Result, TrainError};

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct GradientBoostingValidParams {
    n_estimators: usize,
    learning_rate: f64,
    tree_limits: TreeLimits,
    subsample: f64,
    seed: u64,
}

impl GradientBoostingValidParams {
    pub fn n_estimators(&self) -> usize {
        self.n_estimators
    }

    pub fn learning_rate(&self) -> f64 {
        self.learning_rate
    }

    pub fn tree_limits(&self) -> TreeLimits {
        self.tree_limits
    }

    pub fn subsample(&self) -> f64 {
        self.subsample
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }
}

/// The set of hyperparameters of [gradient boosting](crate::GradientBoostingClassifier)
///
/// ### Example
///
/// ```rust
/// use linfa::prelude::*;
/// use linfa_train::GradientBoostingParams;
///
/// let data = linfa_datasets::iris();
/// let model = GradientBoostingParams::new()
///     .n_estimators(10)
///     .max_depth(2)
///     .fit(&data)
///     .unwrap();
/// assert_eq!(model.nstages(), 10);
/// ```
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct GradientBoostingParams(GradientBoostingValidParams);

impl GradientBoostingParams {
    /// Defaults are 100 stages, learning rate `0.1`, trees of depth 3 with at
    /// least two records per split and one per leaf, no subsampling and seed
    /// `42`
    pub fn new() -> Self {
        Self(GradientBoostingValidParams {
            n_estimators: 100,
            learning_rate: 0.1,
            tree_limits: TreeLimits {
                max_depth: 3,
                min_samples_split: 2,
                min_samples_leaf: 1,
            },
            subsample: 1.0,
            seed: 42,
        })
    }

    /// Sets the number of boosting stages
    pub fn n_estimators(mut self, n_estimators: usize) -> Self {
        self.0.n_estimators = n_estimators;
        self
    }

    /// Sets the shrinkage applied to every stage
    pub fn learning_rate(mut self, learning_rate: f64) -> Self {
        self.0.learning_rate = learning_rate;
        self
    }

    pub fn max_depth(mut self, max_depth: usize) -> Self {
        self.0.tree_limits.max_depth = max_depth;
        self
    }

    pub fn min_samples_split(mut self, min_samples_split: usize) -> Self {
        self.0.tree_limits.min_samples_split = min_samples_split;
        self
    }

    pub fn min_samples_leaf(mut self, min_samples_leaf: usize) -> Self {
        self.0.tree_limits.min_samples_leaf = min_samples_leaf;
        self
    }

    /// Sets the fraction of records every stage is fitted on, drawn without
    /// replacement
    pub fn subsample(mut self, subsample: f64) -> Self {
        self.0.subsample = subsample;
        self
    }

    /// Sets the seed used for subsampling
    pub fn seed(mut self, seed: u64) -> Self {
        self.0.seed = seed;
        self
    }
}

impl Default for GradientBoostingParams {
    fn default() -> Self {
        Self::new()
    }
}

impl ParamGuard for GradientBoostingParams {
    type Checked = GradientBoostingValidParams;
    type Error = TrainError;

    fn check_ref(&self) -> Result<&Self::Checked> {
        let params = &self.0;
        if params.n_estimators < 1 {
            Err(TrainError::Parameters(format!(
                "number of estimators should be at least one, but was {}",
                params.n_estimators
            )))
        } else if !(params.learning_rate > 0.0 && params.learning_rate.is_finite()) {
            Err(TrainError::Parameters(format!(
                "learning rate should be positive, but was {}",
                params.learning_rate
            )))
        } else if params.tree_limits.min_samples_split < 2 {
            Err(TrainError::Parameters(format!(
                "min samples split should be at least two, but was {}",
                params.tree_limits.min_samples_split
            )))
        } else if params.tree_limits.min_samples_leaf < 1 {
            Err(TrainError::Parameters(format!(
                "min samples leaf should be at least one, but was {}",
                params.tree_limits.min_samples_leaf
            )))
        } else if !(params.subsample > 0.0 && params.subsample <= 1.0) {
            Err(TrainError::Parameters(format!(
                "subsample should be in (0, 1], but was {}",
                params.subsample
            )))
        } else {
            Ok(&self.0)
        }
    }

    fn check(self) -> Result<Self::Checked> {
        self.check_ref()?;
        Ok(self.0)
    }
}
