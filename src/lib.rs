//! `linfa-train` trains a classifier on tabular data and reports how well it
//! does on records it has not seen.
//!
//! A run loads either the iris flower dataset or a set of CSV files with a
//! `label` column, holds out a stratified fifth of the records, fits one of
//! three classifiers on the remainder and scores it on the held-out part.
//! The fitted model is stored as a `bincode` artifact and the outcome is
//! printed as a single JSON document.
//!
//! | kind | algorithm |
//! |---|---|
//! | [`randomforest`](RandomForestClassifier) | bagged Gini classification trees |
//! | [`svm`](SvmClassifier) | one-vs-rest `linfa-svm` machines with a gaussian kernel |
//! | [`gradientboosting`](GradientBoostingClassifier) | boosted regression trees |
//!
//! ## Example
//!
//! ```no_run
//! use linfa_train::prelude::*;
//!
//! let config = TrainConfig::new(DataSource::Iris).model(ModelKind::Svm);
//! let summary = run(&config)?;
//! println!("accuracy: {:.3}", summary.evaluation.accuracy);
//! # Ok::<(), linfa_train::TrainError>(())
//! ```

pub mod cli;
pub mod dataset;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod persist;
pub mod pipeline;
pub mod prelude;
pub mod report;
pub mod split;

pub use error::{ErrorKind, Result, TrainError};
pub use models::*;
