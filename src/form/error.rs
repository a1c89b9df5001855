use thiserror::Error;

use crate::types::EntityKind;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum FormError {
    #[error("Unknown field: {0}")]
    UnknownField(String),

    #[error("Field '{0}' cannot be edited")]
    ReadOnly(String),

    #[error("'{raw}' is not a number ({key})")]
    InvalidNumber { key: String, raw: String },

    #[error("'{raw}' is not a date ({key})")]
    InvalidDate { key: String, raw: String },

    #[error("Not authorized to edit this record")]
    Unauthorized,

    #[error("Record has no {0} identifier")]
    MissingIdentifier(EntityKind),
}
