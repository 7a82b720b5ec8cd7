//! Error types for the segmentation pipelines.
//!
//! Every validation failure names the offending key so the batch can be
//! aborted with a message that points at the bad row or group.

use thiserror::Error;

/// Key used by `MissingData` when a required column is absent from the header
/// row rather than empty in some data row.
pub const MISSING_COLUMN_KEY: &str = "header";

fn missing_detail(key: &str, field: &str) -> String {
    if key == MISSING_COLUMN_KEY {
        format!("required column {} is absent", field)
    } else {
        format!("column {} is empty", field)
    }
}

#[derive(Debug, Error)]
pub enum SegmentError {
    #[error("Invalid input for {key}: {reason}")]
    InvalidInput { key: String, reason: String },

    #[error("Invalid category for {key}: column {field} has '{value}' (expected N or Y)")]
    InvalidCategory {
        key: String,
        field: String,
        value: String,
    },

    #[error("Missing data for {key}: {}", missing_detail(.key, .field))]
    MissingData { key: String, field: String },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl SegmentError {
    pub fn invalid_input(key: impl Into<String>, reason: impl Into<String>) -> Self {
        SegmentError::InvalidInput {
            key: key.into(),
            reason: reason.into(),
        }
    }

    pub fn missing(key: impl Into<String>, field: impl Into<String>) -> Self {
        SegmentError::MissingData {
            key: key.into(),
            field: field.into(),
        }
    }

    pub fn missing_column(column: impl Into<String>) -> Self {
        SegmentError::missing(MISSING_COLUMN_KEY, column)
    }
}

/// Result type alias for segmentation operations.
pub type SegmentResult<T> = Result<T, SegmentError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_column_and_empty_cell_read_differently() {
        assert_eq!(
            SegmentError::missing_column("SALES").to_string(),
            "Missing data for header: required column SALES is absent"
        );
        assert_eq!(
            SegmentError::missing("line 4", "SALES").to_string(),
            "Missing data for line 4: column SALES is empty"
        );
    }
}
