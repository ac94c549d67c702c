//! linfa-train prelude.
//!
//! This module contains the most used types, type aliases, traits and
//! functions that you can import easily as a group.
//!

#[doc(no_inline)]
pub use crate::error::{ErrorKind, Result, TrainError};

#[doc(no_inline)]
pub use crate::dataset::{ClassSet, DataSource, TabularDataset};

#[doc(no_inline)]
pub use crate::models::{Classifier, ModelKind};

#[doc(no_inline)]
pub use crate::metrics::{evaluate, ClassificationReport, ConfusionMatrix, Evaluation};

#[doc(no_inline)]
pub use crate::persist::ModelArtifact;

#[doc(no_inline)]
pub use crate::pipeline::{run, RunSummary, TrainConfig};

#[doc(no_inline)]
pub use crate::split::StratifiedSplit;

#[doc(no_inline)]
pub use linfa::traits::{Fit, Predict};
