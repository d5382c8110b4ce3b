//! Unified error type for the pixly application.
//!
//! All crates funnel their failures into [`Error`], which carries enough
//! context for the web layer to pick a status code via [`Error::http_status`]
//! and decide whether to redirect with a flash message or render an error
//! page.

use std::fmt;

/// Unified error type covering all failure modes in pixly.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The requested record could not be found.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// The kind of record (e.g. "image", "metadata").
        entity: String,
        /// The identifier that was looked up.
        id: String,
    },

    /// Submitted data failed validation.
    #[error("Validation error: {0}")]
    Validation(String),

    /// A database operation failed.
    #[error("Database error: {source}")]
    Database {
        /// The underlying database error.
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// An I/O operation failed.
    #[error("IO error: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Image bytes could not be decoded or encoded.
    #[error("Image error: {0}")]
    Image(String),

    /// The object store rejected or lost an object.
    #[error("Storage error: {0}")]
    Storage(String),

    /// Catch-all for unexpected internal errors.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Map this error to an appropriate HTTP status code.
    pub fn http_status(&self) -> u16 {
        match self {
            Error::NotFound { .. } => 404,
            Error::Validation(_) => 400,
            Error::Image(_) => 422,
            Error::Storage(_) => 502,
            Error::Database { .. } | Error::Io { .. } | Error::Internal(_) => 500,
        }
    }

    /// Whether the failure was caused by the request rather than the server.
    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.http_status())
    }

    /// Convenience constructor for [`Error::NotFound`].
    pub fn not_found(entity: impl Into<String>, id: impl fmt::Display) -> Self {
        Error::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }

    /// Convenience constructor for [`Error::Database`].
    pub fn database(source: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Error::Database {
            source: source.into(),
        }
    }

    /// Convenience constructor for [`Error::Validation`].
    pub fn validation(msg: impl Into<String>) -> Self {
        Error::Validation(msg.into())
    }
}

/// Result alias using the crate-level [`Error`].
pub type Result<T> = std::result::Result<T, Error>;
