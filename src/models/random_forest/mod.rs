//! Random forest classification
//!
//! A random forest combines the predictions of many Gini
//! [`ClassificationTree`]s, each grown on a bootstrap sample of the training
//! set and a random subset of its features.
mod algorithm;
mod classification_tree;
mod hyperparams;

pub use algorithm::*;
pub use classification_tree::*;
pub use hyperparams::*;
