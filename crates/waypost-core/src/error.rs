//! Error taxonomy for store operations
//!
//! - [`ValidationError`]: the caller sent something unusable (client error)
//! - [`StoreError::NotFound`]: the target record does not exist (client error)
//! - [`StoreError::Storage`]: the backing store failed (server error)

use std::fmt;

use thiserror::Error;

use crate::models::AddressId;
use crate::storage::StorageError;

/// A required field on an address
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Label,
    Details,
}

impl Field {
    pub fn name(&self) -> &'static str {
        match self {
            Field::Label => "label",
            Field::Details => "details",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Input rejected before touching the store
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// One or more required fields were absent or blank
    #[error("{}", missing_fields_message(.0))]
    MissingFields(Vec<Field>),

    /// An identifier that is not a positive integer
    #[error("Invalid ID: '{0}'")]
    InvalidId(String),
}

impl ValidationError {
    /// Fields named by this error (empty for identifier errors)
    pub fn fields(&self) -> &[Field] {
        match self {
            ValidationError::MissingFields(fields) => fields,
            ValidationError::InvalidId(_) => &[],
        }
    }
}

/// "Label is required", "Label and details are required"
fn missing_fields_message(fields: &[Field]) -> String {
    let names: Vec<&str> = fields.iter().map(Field::name).collect();
    let verb = if names.len() > 1 { "are" } else { "is" };
    let mut joined = names.join(" and ");
    if let Some(first) = joined.get(..1) {
        let upper = first.to_ascii_uppercase();
        joined.replace_range(..1, &upper);
    }
    format!("{joined} {verb} required")
}

/// Errors returned by [`AddressStore`](crate::store::AddressStore)
#[derive(Error, Debug)]
pub enum StoreError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Address not found")]
    NotFound(AddressId),

    #[error("Storage failure: {0}")]
    Storage(#[from] StorageError),
}

impl StoreError {
    /// Whether the caller is at fault (and should not expect a retry to help)
    pub fn is_client_error(&self) -> bool {
        matches!(self, StoreError::Validation(_) | StoreError::NotFound(_))
    }
}

pub type StoreResult<T> = Result<T, StoreError>;
