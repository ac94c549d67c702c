use std::fmt;

use linfa::{traits::*, DatasetBase};
use linfa_svm::{Svm, SvmError};
use ndarray::{Array1, Array2};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::SvmValidParams;
use crate::error::{Result, TrainError};
use crate::models::{argmax, nclasses};

/// One-vs-rest support vector classifier
///
/// Holds a single machine separating the second class from the first when
/// there are two classes, one machine per class otherwise.
#[derive(Serialize, Deserialize)]
pub struct SvmClassifier {
    machines: Vec<Svm<f64, bool>>,
    gamma: f64,
    nclasses: usize,
}

impl SvmClassifier {
    pub fn nmachines(&self) -> usize {
        self.machines.len()
    }

    pub fn nclasses(&self) -> usize {
        self.nclasses
    }

    /// Coefficient of the gaussian kernel all machines were fitted with
    pub fn gamma(&self) -> f64 {
        self.gamma
    }

    /// Signed distance of every record to the hyperplane of every machine
    pub fn decision_function(&self, x: &Array2<f64>) -> Array2<f64> {
        let mut values = Array2::zeros((x.nrows(), self.machines.len()));
        for (mut column, machine) in values.columns_mut().into_iter().zip(&self.machines) {
            for (value, row) in column.iter_mut().zip(x.rows()) {
                *value = machine.weighted_sum(&row) - machine.rho;
            }
        }
        values
    }
}

impl fmt::Debug for SvmClassifier {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("SvmClassifier")
            .field("machines", &self.machines.len())
            .field("gamma", &self.gamma)
            .field("nclasses", &self.nclasses)
            .finish()
    }
}

impl PredictInplace<Array2<f64>, Array1<usize>> for SvmClassifier {
    fn predict_inplace(&self, x: &Array2<f64>, y: &mut Array1<usize>) {
        assert_eq!(
            x.nrows(),
            y.len(),
            "The number of data points must match the number of output targets."
        );

        let values = self.decision_function(x);
        for (target, row) in y.iter_mut().zip(values.rows()) {
            *target = if row.len() == 1 {
                usize::from(row[0] >= 0.0)
            } else {
                argmax(row)
            };
        }
    }

    fn default_target(&self, x: &Array2<f64>) -> Array1<usize> {
        Array1::zeros(x.nrows())
    }
}

impl Fit<Array2<f64>, Array1<usize>, TrainError> for SvmValidParams {
    type Object = SvmClassifier;

    fn fit(&self, dataset: &DatasetBase<Array2<f64>, Array1<usize>>) -> Result<Self::Object> {
        let (x, y) = (dataset.records(), dataset.targets());
        if x.nrows() == 0 {
            return Err(linfa::Error::NotEnoughSamples.into());
        }
        let nclasses = nclasses(y);
        if nclasses < 2 {
            return Err(TrainError::TooFewClasses { classes: nclasses });
        }

        let gamma = self.gamma().value(x);
        let positives = if nclasses == 2 {
            vec![1]
        } else {
            (0..nclasses).collect()
        };

        let machines = positives
            .into_par_iter()
            .map(|class| {
                let targets = y.mapv(|target| target == class);
                Svm::<f64, bool>::params()
                    .pos_neg_weights(self.c(), self.c())
                    .gaussian_kernel(1.0 / gamma)
                    .fit(&DatasetBase::new(x.clone(), targets))
                    .map_err(|err: SvmError| TrainError::Svm(err.to_string()))
            })
            .collect::<Result<Vec<_>>>()?;

        tracing::debug!(
            machines = machines.len(),
            gamma,
            support_vectors = machines.iter().map(Svm::nsupport).sum::<usize>(),
            "fitted support vector machines"
        );

        Ok(SvmClassifier {
            machines,
            gamma,
            nclasses,
        })
    }
}
