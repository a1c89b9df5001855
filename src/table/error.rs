use thiserror::Error;

use super::types::FilterKind;

#[derive(Error, Debug, PartialEq)]
pub enum TableError {
    #[error("Unknown column: {0}")]
    UnknownColumn(String),

    #[error("Sorting is disabled for column: {0}")]
    SortingDisabled(String),

    #[error("Filtering is disabled for column: {0}")]
    FilteringDisabled(String),

    #[error("Column '{column}' uses a {expected:?} filter")]
    FilterKindMismatch { column: String, expected: FilterKind },

    #[error("Row {index} is outside the current page of {len} rows")]
    RowOutOfRange { index: usize, len: usize },
}
