//! Error types for loading documents and building the IR

use thiserror::Error;

/// Result type for transform operations
pub type Result<T> = std::result::Result<T, IrError>;

/// Transformation errors
#[derive(Error, Debug)]
pub enum IrError {
    #[error("Unsupported reference kind: {reference}")]
    UnsupportedReferenceKind { reference: String },

    #[error("Missing required field: {field}")]
    MissingRequiredField { field: String },

    #[error("Invalid document: {0}")]
    InvalidDocument(String),
}

impl IrError {
    pub(crate) fn unsupported_ref(reference: impl Into<String>) -> Self {
        Self::UnsupportedReferenceKind { reference: reference.into() }
    }

    pub(crate) fn missing(field: impl Into<String>) -> Self {
        Self::MissingRequiredField { field: field.into() }
    }
}

/// Errors raised while reading a specification from disk
#[derive(Error, Debug)]
pub enum SpecLoadError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Unsupported specification version: {0}")]
    UnsupportedVersion(String),

    #[error("Invalid specification: {0}")]
    Invalid(#[from] IrError),
}
