// SPDX-FileCopyrightText: 2026 Keel Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Keel account engine.

use thiserror::Error;

/// The primary error type used across all Keel crates.
#[derive(Debug, Error)]
pub enum KeelError {
    /// A referenced record does not exist (e.g. merge with a missing primary).
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// A field value or relationship violates an entity invariant.
    #[error("validation error: {0}")]
    Validation(String),

    /// A workflow action could not be carried out.
    #[error("workflow {workflow_id} failed: {message}")]
    ExecutionFailure { workflow_id: String, message: String },

    /// A row of an import file could not be turned into an account.
    #[error("import row {row}: {message}")]
    Import { row: usize, message: String },

    /// The requested operation or format is not supported.
    #[error("unsupported: {0}")]
    Unsupported(String),

    /// Reading or writing an external file failed.
    #[error("io error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    /// Encoding or decoding a record failed (CSV, JSON).
    #[error("serialization error: {source}")]
    Serialization {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Configuration errors surfaced at runtime.
    #[error("configuration error: {0}")]
    Config(String),

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl KeelError {
    /// Shorthand for a [`KeelError::NotFound`].
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        KeelError::NotFound {
            entity,
            id: id.into(),
        }
    }

    /// Wrap any encoder/decoder error as [`KeelError::Serialization`].
    pub fn serialization(source: impl std::error::Error + Send + Sync + 'static) -> Self {
        KeelError::Serialization {
            source: Box::new(source),
        }
    }
}
