//! Error types for the crown fire pipeline.
//!
//! Only genuinely unrecoverable conditions are errors. Unknown species codes
//! (deciduous fallback) and non-positive spread components (zero spread rate)
//! are normalised inside the stages and never reach this type.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, CrownFireError>;

/// Failure raised by a pipeline stage, a grid constructor or the config loader.
#[derive(Debug, Error)]
pub enum CrownFireError {
    /// Two grids combined by a stage have different `(rows, cols)` shapes.
    #[error("{stage}: grid shape mismatch, expected {expected:?} but found {found:?}")]
    ShapeMismatch {
        stage: &'static str,
        expected: (usize, usize),
        found: (usize, usize),
    },

    /// A cell produced, or would produce, a non-real value.
    #[error("{stage}: domain error at cell ({row}, {col}) with input {value}")]
    Domain {
        stage: &'static str,
        row: usize,
        col: usize,
        value: f64,
    },

    /// Grid data that cannot form a rectangular raster.
    #[error("invalid grid: {0}")]
    InvalidGrid(String),

    /// Calibration values that break their own invariants.
    #[error("invalid crown fire config: {0}")]
    InvalidConfig(String),

    #[error("failed to parse crown fire config: {0}")]
    ConfigParse(#[from] serde_json::Error),

    #[error("failed to read crown fire config from {path:?}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl CrownFireError {
    /// Build a domain error for the flat cell `index` of a grid `width` cells wide.
    pub(crate) fn domain_at(stage: &'static str, index: usize, width: usize, value: f64) -> Self {
        Self::Domain {
            stage,
            row: index / width,
            col: index % width,
            value,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_error_locates_cell() {
        let err = CrownFireError::domain_at("csi", 7, 3, -2.0);
        match err {
            CrownFireError::Domain { row, col, .. } => {
                assert_eq!((row, col), (2, 1));
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_shape_mismatch_message() {
        let err = CrownFireError::ShapeMismatch {
            stage: "classify_crowning",
            expected: (2, 2),
            found: (3, 2),
        };
        assert_eq!(
            err.to_string(),
            "classify_crowning: grid shape mismatch, expected (2, 2) but found (3, 2)"
        );
    }
}
