//! Error types for the transaction service
//!
//! Every failure is a deterministic outcome of bad input or a state conflict;
//! nothing here is retryable.
//!
//! # Error Categories
//!
//! - **Service Errors**: returned by the orchestrating service to boundary layers
//! - **Store Errors**: uniqueness violations detected atomically by the record store
//! - **Import Errors**: fatal file or runtime failures while importing a CSV

use thiserror::Error;

/// Which input field or parameter failed validation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum InvalidInputKind {
    #[error("amount must be greater than zero")]
    InvalidAmount,

    #[error("currency must be one of the supported codes")]
    InvalidCurrency,

    #[error("transaction type must be one of the supported types")]
    InvalidTransactionType,

    #[error("description must not exceed 500 characters")]
    InvalidDescription,

    #[error("transaction id must not be blank")]
    InvalidId,

    #[error("page must not be negative")]
    InvalidPage,

    #[error("page size must be between 1 and 100")]
    InvalidPageSize,
}

/// Main error type returned by the transaction service
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceError {
    /// A field or parameter was rejected before any state was touched
    #[error("Invalid input: {kind}")]
    InvalidInput { kind: InvalidInputKind },

    /// No live transaction carries the given id
    #[error("Transaction not found: {id}")]
    NotFound { id: String },

    /// Another live transaction already holds the reference number
    #[error("Duplicate transaction reference number: {reference_number}")]
    DuplicateReference { reference_number: String },

    /// A store invariant was broken; indicates a bug rather than bad input
    #[error("Internal failure: {reason}")]
    InternalFailure { reason: String },
}

impl ServiceError {
    pub fn invalid_input(kind: InvalidInputKind) -> Self {
        ServiceError::InvalidInput { kind }
    }

    pub fn not_found(id: &str) -> Self {
        ServiceError::NotFound { id: id.to_string() }
    }

    pub fn duplicate_reference(reference_number: &str) -> Self {
        ServiceError::DuplicateReference {
            reference_number: reference_number.to_string(),
        }
    }

    pub fn internal_failure(reason: impl Into<String>) -> Self {
        ServiceError::InternalFailure {
            reason: reason.into(),
        }
    }

    /// HTTP status a boundary layer should answer with
    pub fn status_code(&self) -> u16 {
        match self {
            ServiceError::InvalidInput { .. } => 400,
            ServiceError::NotFound { .. } => 404,
            ServiceError::DuplicateReference { .. } => 409,
            ServiceError::InternalFailure { .. } => 500,
        }
    }
}

impl From<InvalidInputKind> for ServiceError {
    fn from(kind: InvalidInputKind) -> Self {
        ServiceError::InvalidInput { kind }
    }
}

impl From<StoreError> for ServiceError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::DuplicateKey {
                reference_number, ..
            } => ServiceError::DuplicateReference { reference_number },
        }
    }
}

/// Errors raised by the record store itself
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// The reference number is already indexed to a different transaction
    #[error("Reference number already exists: {reference_number} (held by {existing_id})")]
    DuplicateKey {
        reference_number: String,
        existing_id: String,
    },
}

/// Fatal errors while importing requests from a CSV file and printing a listing
///
/// Row-level problems are not represented here; they are logged and counted
/// by the import strategies.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ImportError {
    #[error("File not found: {path}")]
    FileNotFound { path: String },

    #[error("I/O error: {message}")]
    Io { message: String },

    #[error("CSV parse error{}: {message}", line.map(|l| format!(" at line {}", l)).unwrap_or_default())]
    Parse { line: Option<u64>, message: String },

    #[error("Runtime error: {message}")]
    Runtime { message: String },

    #[error("Listing failed: {0}")]
    Listing(#[from] ServiceError),
}

impl From<std::io::Error> for ImportError {
    fn from(error: std::io::Error) -> Self {
        ImportError::Io {
            message: error.to_string(),
        }
    }
}

impl From<csv::Error> for ImportError {
    fn from(error: csv::Error) -> Self {
        let line = error.position().map(|pos| pos.line());

        ImportError::Parse {
            line,
            message: error.to_string(),
        }
    }
}

impl From<serde_json::Error> for ImportError {
    fn from(error: serde_json::Error) -> Self {
        ImportError::Io {
            message: error.to_string(),
        }
    }
}
