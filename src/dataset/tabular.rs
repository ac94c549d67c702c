//! Reading and concatenating delimited tables
//!
//! Every file needs a header row. Columns are matched by name, so files may
//! order their columns differently as long as they carry the same set.

use std::path::{Path, PathBuf};

use csv::ReaderBuilder;
use ndarray::Array2;

use crate::error::{Result, TrainError};

/// Name of the column holding the class of every row
pub const TARGET_COLUMN: &str = "label";

/// Rows of one or more CSV files, split into numeric features and raw labels
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub feature_names: Vec<String>,
    pub records: Array2<f64>,
    pub labels: Vec<String>,
}

/// Resolve `path` against the working directory and check it exists
pub fn resolve(path: &Path) -> Result<PathBuf> {
    let resolved = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()?.join(path)
    };

    if !resolved.exists() {
        return Err(TrainError::FileNotFound(resolved));
    }

    Ok(resolved)
}

/// Read all `files` and concatenate their rows in order
pub fn read_tables<P: AsRef<Path>>(files: &[P], delimiter: u8) -> Result<Table> {
    if files.is_empty() {
        return Err(TrainError::NoFiles);
    }

    let paths = files
        .iter()
        .map(|p| resolve(p.as_ref()))
        .collect::<Result<Vec<_>>>()?;

    let mut columns: Option<Vec<String>> = None;
    let mut cells: Vec<Vec<String>> = Vec::new();
    let mut origins: Vec<(usize, usize)> = Vec::new();

    for (file_idx, path) in paths.iter().enumerate() {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .delimiter(delimiter)
            .trim(csv::Trim::All)
            .from_path(path)
            .map_err(|source| TrainError::Csv {
                path: path.clone(),
                source,
            })?;

        let header = reader
            .headers()
            .map_err(|source| TrainError::Csv {
                path: path.clone(),
                source,
            })?
            .iter()
            .map(str::to_string)
            .collect::<Vec<_>>();

        // position of every reference column in this file
        let layout = match &columns {
            None => {
                let layout = (0..header.len()).collect::<Vec<_>>();
                columns = Some(header.clone());
                layout
            }
            Some(reference) => align(reference, &header, path)?,
        };

        for (row_idx, record) in reader.records().enumerate() {
            let record = record.map_err(|source| TrainError::Csv {
                path: path.clone(),
                source,
            })?;
            cells.push(
                layout
                    .iter()
                    .map(|&col| record.get(col).unwrap_or_default().to_string())
                    .collect(),
            );
            origins.push((file_idx, row_idx + 1));
        }
    }

    let columns = columns.unwrap_or_default();
    let target = columns
        .iter()
        .position(|name| name == TARGET_COLUMN)
        .ok_or(TrainError::MissingLabel)?;

    if cells.is_empty() {
        return Err(TrainError::EmptyTable);
    }

    let feature_cols = (0..columns.len())
        .filter(|col| *col != target)
        .collect::<Vec<_>>();

    let mut records = Array2::zeros((cells.len(), feature_cols.len()));
    for (row_idx, row) in cells.iter().enumerate() {
        for (feature_idx, &col) in feature_cols.iter().enumerate() {
            let value = &row[col];
            records[(row_idx, feature_idx)] = match value.parse::<f64>() {
                Ok(x) if x.is_finite() => x,
                _ => {
                    let (file_idx, row) = origins[row_idx];
                    return Err(TrainError::InvalidCell {
                        path: paths[file_idx].clone(),
                        row,
                        column: columns[col].clone(),
                        value: value.clone(),
                    });
                }
            };
        }
    }

    Ok(Table {
        feature_names: feature_cols.iter().map(|&col| columns[col].clone()).collect(),
        records,
        labels: cells.into_iter().map(|mut row| row.swap_remove(target)).collect(),
    })
}

/// Map the reference columns onto the positions found in `header`
fn align(reference: &[String], header: &[String], path: &Path) -> Result<Vec<usize>> {
    if let Some(extra) = header.iter().find(|name| !reference.contains(name)) {
        return Err(TrainError::ColumnMismatch {
            path: path.to_path_buf(),
            problem: "has unexpected",
            column: extra.clone(),
        });
    }

    reference
        .iter()
        .map(|name| {
            header
                .iter()
                .position(|x| x == name)
                .ok_or_else(|| TrainError::ColumnMismatch {
                    path: path.to_path_buf(),
                    problem: "is missing",
                    column: name.clone(),
                })
        })
        .collect()
}
