use std::collections::BTreeMap;

use linfa::{traits::*, DatasetBase};
use ndarray::{Array1, Array2, Axis};
use rand::rngs::StdRng;
use rand::{seq::index, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::{GradientBoostingValidParams, RegressionTree};
use crate::error::{Result, TrainError};
use crate::models::{argmax, nclasses};

/// Lower bound of the class priors the raw scores start from
const PRIOR_EPS: f64 = f64::EPSILON;
/// Newton denominators below this are treated as zero
const MIN_DENOMINATOR: f64 = 1e-150;

/// A fitted gradient boosting classifier
///
/// Raw scores start at the log prior of every class and every stage adds
/// the prediction of its trees scaled by the learning rate. With two classes
/// a single score holds the log-odds of the second class.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct GradientBoostingClassifier {
    init: Array1<f64>,
    stages: Vec<Vec<RegressionTree>>,
    learning_rate: f64,
    nclasses: usize,
}

impl GradientBoostingClassifier {
    pub fn nstages(&self) -> usize {
        self.stages.len()
    }

    pub fn nclasses(&self) -> usize {
        self.nclasses
    }

    /// Raw scores of every record, one column for two classes, one per class
    /// otherwise
    pub fn decision_function(&self, x: &Array2<f64>) -> Array2<f64> {
        let mut scores = Array2::from_shape_fn((x.nrows(), self.init.len()), |(_, k)| self.init[k]);
        for stage in &self.stages {
            for (k, tree) in stage.iter().enumerate() {
                scores
                    .column_mut(k)
                    .scaled_add(self.learning_rate, &tree.predict(x));
            }
        }
        scores
    }

    /// Class probabilities of every record, one column per class
    pub fn predict_proba(&self, x: &Array2<f64>) -> Array2<f64> {
        let probabilities = probabilities(&self.decision_function(x));
        if probabilities.ncols() == 1 {
            let positive = probabilities.column(0);
            Array2::from_shape_fn((x.nrows(), 2), |(i, k)| {
                if k == 1 {
                    positive[i]
                } else {
                    1.0 - positive[i]
                }
            })
        } else {
            probabilities
        }
    }
}

impl PredictInplace<Array2<f64>, Array1<usize>> for GradientBoostingClassifier {
    fn predict_inplace(&self, x: &Array2<f64>, y: &mut Array1<usize>) {
        assert_eq!(
            x.nrows(),
            y.len(),
            "The number of data points must match the number of output targets."
        );

        let scores = self.decision_function(x);
        for (target, row) in y.iter_mut().zip(scores.rows()) {
            *target = if row.len() == 1 {
                usize::from(row[0] > 0.0)
            } else {
                argmax(row)
            };
        }
    }

    fn default_target(&self, x: &Array2<f64>) -> Array1<usize> {
        Array1::zeros(x.nrows())
    }
}

impl Fit<Array2<f64>, Array1<usize>, TrainError> for GradientBoostingValidParams {
    type Object = GradientBoostingClassifier;

    fn fit(&self, dataset: &DatasetBase<Array2<f64>, Array1<usize>>) -> Result<Self::Object> {
        let (x, y) = (dataset.records(), dataset.targets());
        let nsamples = x.nrows();
        if nsamples == 0 {
            return Err(linfa::Error::NotEnoughSamples.into());
        }
        let nclasses = nclasses(y);
        if nclasses < 2 {
            return Err(TrainError::TooFewClasses { classes: nclasses });
        }

        let ntrees = if nclasses == 2 { 1 } else { nclasses };
        let targets = Array2::from_shape_fn((nsamples, ntrees), |(i, k)| {
            let class = if ntrees == 1 { 1 } else { k };
            if y[i] == class {
                1.0
            } else {
                0.0
            }
        });

        let priors = targets.sum_axis(Axis(0)) / nsamples as f64;
        let init = if ntrees == 1 {
            priors.mapv(|p| {
                let p = p.clamp(PRIOR_EPS, 1.0 - PRIOR_EPS);
                (p / (1.0 - p)).ln()
            })
        } else {
            priors.mapv(|p| p.max(PRIOR_EPS).ln())
        };

        // the Newton step of the multinomial deviance is shrunk by (K - 1) / K
        let factor = if ntrees == 1 {
            1.0
        } else {
            (nclasses - 1) as f64 / nclasses as f64
        };
        let limits = self.tree_limits();
        let nsubsample = ((self.subsample() * nsamples as f64) as usize).max(1);
        let mut rng = StdRng::seed_from_u64(self.seed());

        let mut scores = Array2::from_shape_fn((nsamples, ntrees), |(_, k)| init[k]);
        let mut stages = Vec::with_capacity(self.n_estimators());
        for _ in 0..self.n_estimators() {
            let rows = if nsubsample < nsamples {
                let mut rows = index::sample(&mut rng, nsamples, nsubsample).into_vec();
                rows.sort_unstable();
                rows
            } else {
                (0..nsamples).collect()
            };

            let residuals = &targets - &probabilities(&scores);
            let stage = (0..ntrees)
                .into_par_iter()
                .map(|k| {
                    let residual = residuals.column(k).to_owned();
                    let mut tree = RegressionTree::fit(x, &residual, &rows, &limits);
                    newton_step(&mut tree, x, &residual, &rows, factor);
                    tree
                })
                .collect::<Vec<_>>();

            for (k, tree) in stage.iter().enumerate() {
                scores
                    .column_mut(k)
                    .scaled_add(self.learning_rate(), &tree.predict(x));
            }
            stages.push(stage);
        }

        tracing::debug!(
            stages = stages.len(),
            trees_per_stage = ntrees,
            classes = nclasses,
            "boosted regression trees"
        );

        Ok(GradientBoostingClassifier {
            init,
            stages,
            learning_rate: self.learning_rate(),
            nclasses,
        })
    }
}

/// Replace the leaf values of `tree` by one Newton step on the deviance
fn newton_step(
    tree: &mut RegressionTree,
    x: &Array2<f64>,
    residual: &Array1<f64>,
    rows: &[usize],
    factor: f64,
) {
    let mut sums: BTreeMap<usize, (f64, f64)> = BTreeMap::new();
    for &row in rows {
        let r = residual[row];
        let entry = sums.entry(tree.leaf(x.row(row))).or_insert((0.0, 0.0));
        entry.0 += r;
        entry.1 += r.abs() * (1.0 - r.abs());
    }

    for (leaf, (numerator, denominator)) in sums {
        let value = if denominator.abs() < MIN_DENOMINATOR {
            0.0
        } else {
            factor * numerator / denominator
        };
        tree.set_leaf_value(leaf, value);
    }
}

/// Sigmoid of a single score column, softmax across several
fn probabilities(scores: &Array2<f64>) -> Array2<f64> {
    if scores.ncols() == 1 {
        return scores.mapv(|s| 1.0 / (1.0 + (-s).exp()));
    }

    let mut probabilities = scores.clone();
    for mut row in probabilities.rows_mut() {
        let max = row.fold(f64::NEG_INFINITY, |a, b| a.max(*b));
        row.mapv_inplace(|s| (s - max).exp());
        let sum = row.sum();
        row /= sum;
    }
    probabilities
}
