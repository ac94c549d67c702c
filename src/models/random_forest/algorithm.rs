use std::fmt;

use linfa::{traits::*, DatasetBase};
use ndarray::{Array1, Array2};
use rand::rngs::StdRng;
use rand::{seq::index, Rng, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::{ClassificationTree, RandomForestValidParams};
use crate::error::{Result, TrainError};
use crate::models::{argmax, nclasses};

/// A fitted random forest
///
/// Every tree only sees the subset of features it was grown on, the forest
/// predicts the class most trees vote for. Ties go to the smaller class index.
#[derive(Serialize, Deserialize, Clone, PartialEq)]
pub struct RandomForestClassifier {
    trees: Vec<ClassificationTree>,
    nclasses: usize,
}

impl RandomForestClassifier {
    pub fn ntrees(&self) -> usize {
        self.trees.len()
    }

    pub fn nclasses(&self) -> usize {
        self.nclasses
    }

    /// Number of votes every class receives for every record
    pub fn votes(&self, x: &Array2<f64>) -> Array2<usize> {
        let mut votes = Array2::zeros((x.nrows(), self.nclasses));
        for tree in &self.trees {
            for (row, record) in x.rows().into_iter().enumerate() {
                votes[(row, tree.predict_row(record))] += 1;
            }
        }
        votes
    }
}

impl fmt::Debug for RandomForestClassifier {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("RandomForestClassifier")
            .field("ntrees", &self.trees.len())
            .field("nclasses", &self.nclasses)
            .finish()
    }
}

impl PredictInplace<Array2<f64>, Array1<usize>> for RandomForestClassifier {
    fn predict_inplace(&self, x: &Array2<f64>, y: &mut Array1<usize>) {
        assert_eq!(
            x.nrows(),
            y.len(),
            "The number of data points must match the number of output targets."
        );

        let votes = self.votes(x);
        for (target, row) in y.iter_mut().zip(votes.rows()) {
            *target = argmax(row);
        }
    }

    fn default_target(&self, x: &Array2<f64>) -> Array1<usize> {
        Array1::zeros(x.nrows())
    }
}

impl Fit<Array2<f64>, Array1<usize>, TrainError> for RandomForestValidParams {
    type Object = RandomForestClassifier;

    fn fit(&self, dataset: &DatasetBase<Array2<f64>, Array1<usize>>) -> Result<Self::Object> {
        let (x, y) = (dataset.records(), dataset.targets());
        let (nsamples, nfeatures) = x.dim();
        if nsamples == 0 {
            return Err(linfa::Error::NotEnoughSamples.into());
        }

        // draw every sample up front, trees are then grown in any order
        let mut rng = StdRng::seed_from_u64(self.seed());
        let nselected = self.max_features().count(nfeatures);
        let plans = (0..self.ensemble_size())
            .map(|_| {
                let rows = if self.bootstrap() {
                    (0..nsamples).map(|_| rng.gen_range(0..nsamples)).collect()
                } else {
                    (0..nsamples).collect::<Vec<_>>()
                };
                let mut features = index::sample(&mut rng, nfeatures, nselected).into_vec();
                features.sort_unstable();
                (rows, features)
            })
            .collect::<Vec<_>>();

        let nclasses = nclasses(y);
        let trees = plans
            .into_par_iter()
            .map(|(rows, features)| {
                ClassificationTree::fit(x, y, &rows, &features, self.max_depth(), nclasses)
            })
            .collect::<Vec<_>>();

        tracing::debug!(
            trees = trees.len(),
            features_per_tree = nselected,
            "grew random forest"
        );

        Ok(RandomForestClassifier { trees, nclasses })
    }
}
