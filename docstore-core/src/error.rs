//! Error types and result types for document client operations.
//!
//! Every fallible operation in this crate returns [`StoreResult<T>`]. The
//! variants mirror the conditions a caller can meaningfully react to:
//! resolution failures, absence, conflicts, decode problems, and the
//! caller-side cancellation signals.

use bson::error::Error as BsonError;
use serde_json::Error as SerdeJsonError;
use thiserror::Error;

/// Represents all possible errors produced by the document client and its
/// backend drivers.
///
/// `TransactionConflict` is a retriable signal: the client consumes it inside
/// the bounded conditional-insert retry loop and only surfaces `Transaction`
/// once the attempts are exhausted. All other variants are surfaced on first
/// occurrence.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum StoreError {
    /// The collection name could not be resolved to a readable collection.
    #[error("collection unavailable: {0}")]
    CollectionUnavailable(String),
    /// The requested document does not exist.
    /// The first argument is the document ID, the second the collection name.
    #[error("document {0} not found in collection {1}")]
    NotFound(String, String),
    /// A conditional insert found its target ID already occupied.
    /// The first argument is the conflicting ID, the second the collection name.
    #[error("document {0} already exists in collection {1}")]
    AlreadyExists(String, String),
    /// A stored payload could not be converted to the expected mapping shape.
    #[error("decode error: {0}")]
    Decode(String),
    /// The predicate is malformed or uses an operator the backend rejects.
    #[error("query error: {0}")]
    Query(String),
    /// The backend failed to persist a new document.
    #[error("write error: {0}")]
    Write(String),
    /// A transaction aborted for a reason other than `AlreadyExists`,
    /// including exhausted conflict retries.
    #[error("transaction error: {0}")]
    Transaction(String),
    /// The backend reported a retriable transaction conflict.
    #[error("transaction conflict")]
    TransactionConflict,
    /// The caller's cancellation signal fired before the operation settled.
    #[error("operation canceled")]
    Canceled,
    /// The caller's deadline elapsed before the operation settled.
    #[error("deadline exceeded")]
    DeadlineExceeded,
    /// A genuine backend or transport failure.
    #[error("backend error: {0}")]
    Backend(String),
}

/// A specialized `Result` type for document client operations.
pub type StoreResult<T> = Result<T, StoreError>;

impl From<BsonError> for StoreError {
    fn from(err: BsonError) -> Self {
        StoreError::Decode(err.to_string())
    }
}

impl From<SerdeJsonError> for StoreError {
    fn from(err: SerdeJsonError) -> Self {
        StoreError::Decode(err.to_string())
    }
}
