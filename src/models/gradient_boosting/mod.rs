//! Gradient boosted classification trees
//!
//! Every boosting stage fits one least-squares [`RegressionTree`] per class
//! (a single one for two classes) to the negative gradient of the
//! multinomial deviance, then replaces the leaf values with one Newton step.
mod algorithm;
mod hyperparams;
mod regression_tree;

pub use algorithm::*;
pub use hyperparams::*;
pub use regression_tree::*;
