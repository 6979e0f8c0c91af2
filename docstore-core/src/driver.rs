//! Backend driver abstraction for the document client.
//!
//! The client never talks to a database directly. It consumes the narrow
//! [`Driver`] capability set defined here, which a concrete driver crate
//! implements against a specific document database. Transport, auth,
//! connection pooling, and wire encoding all live behind this trait.
//!
//! # Transactions
//!
//! [`Driver::run_transaction`] executes a caller-supplied body against
//! transactional get/set primitives ([`TxnAccess`]). The driver must
//! serialize the body's reads and writes with respect to any other
//! transaction touching the same document keys, and must discard staged
//! writes when the body returns an error. A driver using optimistic
//! concurrency control signals a lost race with
//! [`StoreError::TransactionConflict`](crate::error::StoreError::TransactionConflict),
//! which the client retries a bounded number of times.

use async_trait::async_trait;
use bson::Bson;
use futures::future::BoxFuture;
use std::fmt;

use crate::{error::StoreResult, predicate::Predicate};

/// A resolved handle to a named collection.
///
/// Drivers hand these out from [`Driver::resolve_collection`]; the client
/// passes them back unchanged to the other driver operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionRef {
    name: String,
}

impl CollectionRef {
    /// Creates a handle for the given collection name.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// Returns the collection name this handle resolves to.
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for CollectionRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Transactional get/set primitives handed to a transaction body.
///
/// Reads observe the state the transaction is serialized against plus any
/// writes already staged by this body. Writes are staged and only become
/// visible when the driver commits the transaction.
#[async_trait]
pub trait TxnAccess: Send {
    /// Reads a document within the transaction's isolation boundary.
    ///
    /// Returns `Ok(None)` when no document occupies the ID.
    async fn get(&mut self, id: &str) -> StoreResult<Option<Bson>>;

    /// Stages a write at the given ID, applied at commit.
    fn set(&mut self, id: &str, data: Bson);
}

/// A one-shot transaction body executed by [`Driver::run_transaction`].
pub type TxnBody = Box<
    dyn for<'t> FnOnce(&'t mut dyn TxnAccess) -> BoxFuture<'t, StoreResult<()>> + Send,
>;

/// The capability set the client consumes from a backend driver.
///
/// Implementations must be thread-safe: every operation takes `&self` and
/// may be invoked concurrently from multiple tasks against the same handle.
#[async_trait]
pub trait Driver: Send + Sync + fmt::Debug {
    /// Resolves a collection name to a handle.
    ///
    /// Collections exist implicitly; this fails with
    /// [`StoreError::CollectionUnavailable`](crate::error::StoreError::CollectionUnavailable)
    /// only when the name itself cannot resolve (e.g. it is malformed for
    /// the backend).
    async fn resolve_collection(&self, name: &str) -> StoreResult<CollectionRef>;

    /// Fetches a single document payload by ID.
    ///
    /// Returns `Ok(None)` when the document is absent, and
    /// `CollectionUnavailable` when the collection itself cannot be read.
    async fn get_document(
        &self,
        collection: &CollectionRef,
        id: &str,
    ) -> StoreResult<Option<Bson>>;

    /// Stores a new document under a backend-generated unique ID and
    /// returns that ID. Creates the collection if it does not exist.
    async fn add_document(&self, collection: &CollectionRef, data: Bson) -> StoreResult<String>;

    /// Runs `body` as a single atomic unit against the collection.
    ///
    /// The body's staged writes commit only if it returns `Ok`; any error
    /// aborts the transaction with no observable partial state.
    async fn run_transaction(
        &self,
        collection: &CollectionRef,
        body: TxnBody,
    ) -> StoreResult<()>;

    /// Returns every `(id, payload)` pair in the collection matching the
    /// predicate. An empty result is success, not an error.
    async fn query_documents(
        &self,
        collection: &CollectionRef,
        predicate: &Predicate,
    ) -> StoreResult<Vec<(String, Bson)>>;
}

#[async_trait]
impl<D> Driver for &D
where
    D: Driver,
{
    async fn resolve_collection(&self, name: &str) -> StoreResult<CollectionRef> {
        (*self).resolve_collection(name).await
    }

    async fn get_document(
        &self,
        collection: &CollectionRef,
        id: &str,
    ) -> StoreResult<Option<Bson>> {
        (*self).get_document(collection, id).await
    }

    async fn add_document(&self, collection: &CollectionRef, data: Bson) -> StoreResult<String> {
        (*self).add_document(collection, data).await
    }

    async fn run_transaction(
        &self,
        collection: &CollectionRef,
        body: TxnBody,
    ) -> StoreResult<()> {
        (*self).run_transaction(collection, body).await
    }

    async fn query_documents(
        &self,
        collection: &CollectionRef,
        predicate: &Predicate,
    ) -> StoreResult<Vec<(String, Bson)>> {
        (*self)
            .query_documents(collection, predicate)
            .await
    }
}

/// Factory trait for constructing driver instances.
#[async_trait]
pub trait DriverBuilder {
    type Driver: Driver;

    async fn build(self) -> StoreResult<Self::Driver>;
}
