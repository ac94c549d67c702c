use linfa::ParamGuard;
use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::error::{Result, TrainError};

/// Coefficient of the gaussian kernel `exp(-gamma * |x - y|^2)`
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub enum Gamma {
    /// `1 / (nfeatures * var(x))`, or `1` when the records have no variance
    Scale,
    /// A fixed positive coefficient
    Value(f64),
}

impl Gamma {
    pub fn value(&self, x: &Array2<f64>) -> f64 {
        match *self {
            Gamma::Scale => {
                let variance = if x.is_empty() { 0.0 } else { x.var(0.0) };
                if variance > 0.0 {
                    1.0 / (x.ncols() as f64 * variance)
                } else {
                    1.0
                }
            }
            Gamma::Value(gamma) => gamma,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct SvmValidParams {
    c: f64,
    gamma: Gamma,
    seed: u64,
}

impl SvmValidParams {
    pub fn c(&self) -> f64 {
        self.c
    }

    pub fn gamma(&self) -> Gamma {
        self.gamma
    }

    /// The seed is kept with the parameters, the SMO solver itself is
    /// deterministic
    pub fn seed(&self) -> u64 {
        self.seed
    }
}

/// The set of hyperparameters of a [support vector classifier](crate::SvmClassifier)
///
/// ### Example
///
/// ```rust
/// use linfa::prelude::*;
/// use linfa_train::{Gamma, SvmParams};
///
/// let data = linfa_datasets::iris();
/// let model = SvmParams::new().c(10.0).gamma(Gamma::Value(0.5)).fit(&data).unwrap();
/// assert_eq!(model.nmachines(), 3);
/// ```
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct SvmParams(SvmValidParams);

impl SvmParams {
    /// Defaults are `C = 1`, a gaussian kernel with [`Gamma::Scale`] and seed `42`
    pub fn new() -> Self {
        Self(SvmValidParams {
            c: 1.0,
            gamma: Gamma::Scale,
            seed: 42,
        })
    }

    /// Sets the penalty of misclassified records, for both classes of every
    /// machine
    pub fn c(mut self, c: f64) -> Self {
        self.0.c = c;
        self
    }

    pub fn gamma(mut self, gamma: Gamma) -> Self {
        self.0.gamma = gamma;
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.0.seed = seed;
        self
    }
}

impl Default for SvmParams {
    fn default() -> Self {
        Self::new()
    }
}

impl ParamGuard for SvmParams {
    type Checked = SvmValidParams;
    type Error = TrainError;

    fn check_ref(&self) -> Result<&Self::Checked> {
        if !(self.0.c > 0.0 && self.0.c.is_finite()) {
            Err(TrainError::Parameters(format!(
                "C should be positive, but was {}",
                self.0.c
            )))
        } else if let Gamma::Value(gamma) = self.0.gamma {
            if gamma > 0.0 && gamma.is_finite() {
                Ok(&self.0)
            } else {
                Err(TrainError::Parameters(format!(
                    "gamma should be positive, but was {}",
                    gamma
                )))
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
