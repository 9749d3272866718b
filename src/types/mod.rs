//! Types module
//!
//! Contains core data structures used throughout the application.
//! This module organizes types into logical submodules:
//! - `transaction`: Transaction entity, request shape, and identifiers
//! - `page`: Paginated listing result
//! - `error`: Error types for the service, store, and import pipeline

pub mod error;
pub mod page;
pub mod transaction;

pub use error::{ImportError, InvalidInputKind, ServiceError, StoreError};
pub use page::Page;
pub use transaction::{
    Currency, Transaction, TransactionId, TransactionRequest, TransactionType,
    MAX_DESCRIPTION_LENGTH,
};
