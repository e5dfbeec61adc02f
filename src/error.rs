//! Error types for ingestion, the persisted dataset and clustering.

use std::path::PathBuf;

use thiserror::Error;

use crate::types::MonthKey;

/// Errors raised while reading event logs and building activity series.
#[derive(Debug, Error)]
pub enum IngestError {
    /// A month key that is not a valid `YYYYMM`.
    #[error("invalid month key '{0}': expected YYYYMM")]
    InvalidMonth(String),

    /// A calendar that is empty, reversed or not contiguous.
    #[error("invalid calendar: {0}")]
    InvalidCalendar(String),

    /// A month file whose name does not end in `_<YYYYMM>`.
    #[error("cannot derive a month from file name {}", path.display())]
    InvalidFileName { path: PathBuf },

    /// Observed data outside the configured calendar.
    #[error("month {month} of project '{project}' is outside the calendar {start}..={end}")]
    MonthOutOfRange {
        project: String,
        month: MonthKey,
        start: MonthKey,
        end: MonthKey,
    },

    #[error("malformed event at {}:{line}: {source}", path.display())]
    MalformedEvent {
        path: PathBuf,
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors raised while exporting or loading the tabular dataset.
#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("dataset header is missing column '{0}'")]
    MissingColumn(&'static str),

    #[error("invalid dataset header: {0}")]
    InvalidHeader(String),

    /// Row numbers are 1-based and exclude the header.
    #[error("row {row} has {actual} cells, expected {expected}")]
    Arity {
        row: usize,
        expected: usize,
        actual: usize,
    },

    #[error("row {row}, column {column}: '{value}' is not a non-negative integer")]
    NonNumeric {
        row: usize,
        column: String,
        value: String,
    },

    #[error("row {row}: elite must be True or False, got '{value}'")]
    InvalidElite { row: usize, value: String },

    #[error("failed to access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors raised by a shape clusterer on malformed input.
///
/// A run that merely fails to produce a valid partition is not an error;
/// clusterers report that as `Ok(None)`.
#[derive(Debug, Error)]
pub enum ClusterError {
    #[error("cannot cluster an empty series matrix")]
    EmptyInput,

    #[error("series {row} has {actual} samples, expected {expected}")]
    RaggedSeries {
        row: usize,
        expected: usize,
        actual: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_offending_value() {
        let err = IngestError::MonthOutOfRange {
            project: "vscode".into(),
            month: "201901".parse().unwrap(),
            start: "201501".parse().unwrap(),
            end: "201810".parse().unwrap(),
        };
        assert_eq!(
            err.to_string(),
            "month 201901 of project 'vscode' is outside the calendar 201501..=201810"
        );

        let err = DatasetError::NonNumeric {
            row: 4,
            column: "201503".into(),
            value: "x".into(),
        };
        assert!(err.to_string().contains("row 4, column 201503"));

        let err = ClusterError::RaggedSeries {
            row: 2,
            expected: 46,
            actual: 45,
        };
        assert_eq!(err.to_string(), "series 2 has 45 samples, expected 46");
    }
}
