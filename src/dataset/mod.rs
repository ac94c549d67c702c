//! Datasets
//!
//! Resolves the data a run is trained on: either the bundled iris flower
//! dataset or the concatenation of user supplied CSV files. Both end up as a
//! [`TabularDataset`], a `linfa` dataset with class-index targets together
//! with the original label of every class.
use std::path::PathBuf;

use linfa::Dataset;
use ndarray::{Array1, Array2, Axis, Ix1};

use crate::error::Result;

mod classes;
mod tabular;

pub use classes::ClassSet;
pub use tabular::{read_tables, resolve, Table, TARGET_COLUMN};

/// Where the training data comes from
#[derive(Debug, Clone, PartialEq)]
pub enum DataSource {
    /// The iris flower dataset shipped with `linfa-datasets`
    Iris,
    /// One or more delimited files with a header row and a `label` column
    Csv { files: Vec<PathBuf>, delimiter: u8 },
}

impl DataSource {
    /// Name of the mode as accepted on the command line
    pub fn mode(&self) -> &'static str {
        match self {
            DataSource::Iris => "iris",
            DataSource::Csv { .. } => "csv",
        }
    }

    pub fn load(&self) -> Result<TabularDataset> {
        match self {
            DataSource::Iris => Ok(TabularDataset::iris()),
            DataSource::Csv { files, delimiter } => {
                let table = read_tables(files.as_slice(), *delimiter)?;
                tracing::debug!(
                    rows = table.records.nrows(),
                    features = table.feature_names.len(),
                    files = files.len(),
                    "read CSV tables"
                );
                Ok(TabularDataset::from_table(table))
            }
        }
    }
}

/// Labelled records ready to be split and learned from
#[derive(Debug, Clone)]
pub struct TabularDataset {
    dataset: Dataset<f64, usize, Ix1>,
    classes: ClassSet,
    feature_names: Vec<String>,
}

impl TabularDataset {
    pub fn new(
        records: Array2<f64>,
        targets: Array1<usize>,
        classes: ClassSet,
        feature_names: Vec<String>,
    ) -> Self {
        let dataset = Dataset::new(records, targets).with_feature_names(feature_names.clone());

        TabularDataset {
            dataset,
            classes,
            feature_names,
        }
    }

    /// The iris flower dataset with classes `0`, `1` and `2`
    pub fn iris() -> Self {
        let dataset = linfa_datasets::iris();
        let nclasses = dataset.targets().iter().max().map_or(0, |x| x + 1);
        let feature_names = dataset.feature_names();

        TabularDataset {
            dataset,
            classes: ClassSet::from_indices(nclasses),
            feature_names,
        }
    }

    /// Encode the labels of `table` and wrap its records
    pub fn from_table(table: Table) -> Self {
        let (classes, targets) = ClassSet::encode(&table.labels);

        TabularDataset::new(
            table.records,
            Array1::from(targets),
            classes,
            table.feature_names,
        )
    }

    pub fn dataset(&self) -> &Dataset<f64, usize, Ix1> {
        &self.dataset
    }

    pub fn records(&self) -> &Array2<f64> {
        self.dataset.records()
    }

    pub fn targets(&self) -> &Array1<usize> {
        self.dataset.targets()
    }

    pub fn classes(&self) -> &ClassSet {
        &self.classes
    }

    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    pub fn nsamples(&self) -> usize {
        self.dataset.records().nrows()
    }

    pub fn nfeatures(&self) -> usize {
        self.dataset.records().ncols()
    }

    /// Sub-dataset made of the rows at `indices`, in that order
    pub fn select(&self, indices: &[usize]) -> Self {
        TabularDataset::new(
            self.records().select(Axis(0), indices),
            self.targets().select(Axis(0), indices),
            self.classes.clone(),
            self.feature_names.clone(),
        )
    }
}
