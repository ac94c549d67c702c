//! Support vector classification
//!
//! `linfa-svm` separates two classes. Several classes are handled one-vs-rest:
//! one machine per class, the class with the largest decision value wins.
mod algorithm;
mod hyperparams;

pub use algorithm::*;
pub use hyperparams::*;
