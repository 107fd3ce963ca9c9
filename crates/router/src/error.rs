//! Router error types

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RouterError {
    /// Two contacts in one update share an id
    #[error("duplicate contact id '{id}'")]
    DuplicateContact { id: String },

    /// Contact with an empty id (would suffix-match every address ending in `/`)
    #[error("contact '{name}' has an empty id")]
    EmptyContactId { name: String },
}
