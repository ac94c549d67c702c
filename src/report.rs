//! The JSON document printed at the end of a run
use std::io::Write;

use serde::Serialize;

use crate::error::{ErrorKind, Result, TrainError};
use crate::pipeline::RunSummary;

/// Success or failure of a run, rendered as a single JSON object
#[derive(Serialize, Debug)]
#[serde(untagged)]
pub enum Outcome {
    Success {
        success: bool,
        #[serde(flatten)]
        summary: Box<RunSummary>,
    },
    Failure {
        success: bool,
        error: String,
        kind: ErrorKind,
    },
}

impl Outcome {
    pub fn success(summary: RunSummary) -> Self {
        Outcome::Success {
            success: true,
            summary: Box::new(summary),
        }
    }

    pub fn failure(error: &TrainError) -> Self {
        Outcome::Failure {
            success: false,
            error: error.to_string(),
            kind: error.kind(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success { .. })
    }

    /// `0` for a success, `1` otherwise
    pub fn exit_code(&self) -> u8 {
        if self.is_success() {
            0
        } else {
            1
        }
    }

    /// Write the outcome as one line of JSON
    pub fn write_to<W: Write>(&self, mut writer: W) -> Result<()> {
        let json = serde_json::to_string(self).map_err(std::io::Error::from)?;
        writeln!(writer, "{}", json)?;
        writer.flush()?;
        Ok(())
    }
}

impl From<Result<RunSummary>> for Outcome {
    fn from(result: Result<RunSummary>) -> Self {
        match result {
            Ok(summary) => Outcome::success(summary),
            Err(err) => Outcome::failure(&err),
        }
    }
}
