//! Error types in linfa-train
//!
//! Every failure of a run falls into one of three kinds. Callers that only
//! need to report the failure use the `Display` message, callers that need to
//! react differently match on [`ErrorKind`].

use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

/// Simplified `Result` using [`TrainError`](crate::TrainError) as error type
pub type Result<T> = std::result::Result<T, TrainError>;

/// Coarse classification of a [`TrainError`]
#[derive(Serialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ErrorKind {
    /// The user supplied input cannot be used (arguments, files, columns)
    Input,
    /// The data was read but cannot be split or learned from
    Dataset,
    /// Anything failing inside the learning algorithms or while persisting
    Runtime,
}

#[derive(Error, Debug)]
pub enum TrainError {
    #[error("No CSV files provided in csv mode")]
    NoFiles,
    #[error("CSV file not found: {}", .0.display())]
    FileNotFound(PathBuf),
    #[error("CSV must contain a 'label' column")]
    MissingLabel,
    #[error("failed to read CSV file {}: {source}", path.display())]
    Csv { path: PathBuf, source: csv::Error },
    #[error("CSV file {} {problem} column '{column}'", path.display())]
    ColumnMismatch {
        path: PathBuf,
        problem: &'static str,
        column: String,
    },
    #[error("CSV file {}: row {row}, column '{column}' is not a number: '{value}'", path.display())]
    InvalidCell {
        path: PathBuf,
        row: usize,
        column: String,
        value: String,
    },
    #[error("CSV files contain no data rows")]
    EmptyTable,
    #[error("invalid arguments: {0}")]
    Arguments(String),

    #[error("The least populated class in y has only {members} member, which is too few. The minimum number of groups for any class cannot be less than 2.")]
    SparseClass { members: usize },
    #[error("The {partition} size = {size} should be greater or equal to the number of classes = {classes}")]
    PartitionTooSmall {
        partition: &'static str,
        size: usize,
        classes: usize,
    },
    #[error("The number of classes has to be greater than one; got {classes} class")]
    TooFewClasses { classes: usize },

    #[error("invalid parameter {0}")]
    Parameters(String),
    #[error("support vector machine failed: {0}")]
    Svm(String),
    #[error("failed to write model artifact {}: {source}", path.display())]
    Persist {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to encode model artifact: {0}")]
    Encode(#[from] bincode::error::EncodeError),
    #[error("failed to decode model artifact: {0}")]
    Decode(#[from] bincode::error::DecodeError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    BaseCrate(#[from] linfa::Error),
}

impl TrainError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            TrainError::NoFiles
            | TrainError::FileNotFound(_)
            | TrainError::MissingLabel
            | TrainError::Csv { .. }
            | TrainError::ColumnMismatch { .. }
            | TrainError::InvalidCell { .. }
            | TrainError::EmptyTable
            | TrainError::Arguments(_) => ErrorKind::Input,
            TrainError::SparseClass { .. }
            | TrainError::PartitionTooSmall { .. }
            | TrainError::TooFewClasses { .. } => ErrorKind::Dataset,
            TrainError::Parameters(_)
            | TrainError::Svm(_)
            | TrainError::Persist { .. }
            | TrainError::Encode(_)
            | TrainError::Decode(_)
            | TrainError::Io(_)
            | TrainError::BaseCrate(_) => ErrorKind::Runtime,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn autotraits() {
        fn has_autotraits<T: Send + Sync + Sized + Unpin>() {}
        has_autotraits::<TrainError>();
        has_autotraits::<ErrorKind>();
    }

    #[test]
    fn kinds_follow_taxonomy() {
        assert_eq!(TrainError::NoFiles.kind(), ErrorKind::Input);
        assert_eq!(TrainError::MissingLabel.kind(), ErrorKind::Input);
        assert_eq!(
            TrainError::SparseClass { members: 1 }.kind(),
            ErrorKind::Dataset
        );
        assert_eq!(
            TrainError::BaseCrate(linfa::Error::NotEnoughSamples).kind(),
            ErrorKind::Runtime
        );
    }

    #[test]
    fn missing_file_names_path() {
        let err = TrainError::FileNotFound(PathBuf::from("/data/missing.csv"));
        assert_eq!(err.to_string(), "CSV file not found: /data/missing.csv");
    }

    #[test]
    fn kind_serializes_lowercase() {
        let kind = serde_json::to_string(&ErrorKind::Dataset).unwrap();
        assert_eq!(kind, "\"dataset\"");
    }
}
