//! Error types for conversion runs
//!
//! A conversion is fail-fast: the first error aborts the run. Rows already
//! handed to a writer for earlier declarations stay written.

use thiserror::Error;

use crate::storage::StorageError;

/// Value or identity resolution failure inside the engine
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolutionError {
    #[error("Unknown value map {0}")]
    UnknownValueMap(String),

    #[error("Value '{value}' is not an integer code of value map {map}")]
    InvalidCode { map: String, value: String },

    #[error("Value '{value}' has no entry in value map {map}")]
    UnresolvableValue { map: String, value: String },

    #[error("Value '{value}' matches several codes in value map {map}: {codes:?}")]
    AmbiguousValue {
        map: String,
        value: String,
        codes: Vec<i64>,
    },

    #[error("Missing ident value in column {column} of {object}")]
    MissingIdent { object: String, column: String },
}

pub type ResolutionResult<T> = Result<T, ResolutionError>;

/// Any failure of a conversion run
#[derive(Error, Debug)]
pub enum ConversionError {
    #[error("Resolution error: {0}")]
    Resolution(#[from] ResolutionError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

pub type ConversionResult<T> = Result<T, ConversionError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ResolutionError::UnresolvableValue {
            map: "VM".to_string(),
            value: "Gone".to_string(),
        };
        assert_eq!(err.to_string(), "Value 'Gone' has no entry in value map VM");

        let err: ConversionError = StorageError::ObjectNotFound("T".to_string()).into();
        assert!(err.to_string().contains("Object not found: T"));
    }
}
