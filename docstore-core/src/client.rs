//! The document client façade.
//!
//! [`DocumentClient`] is the single entry point callers use to interact with
//! a document store. It translates the five core operations into backend
//! driver calls and normalizes the results and errors. The client owns no
//! mutable state beyond the driver handle, so one handle can serve any
//! number of concurrent callers.

use bson::Bson;
use log::debug;
use std::collections::HashMap;

use crate::{
    context::OpContext,
    document::Doc,
    driver::{Driver, TxnBody},
    error::{StoreError, StoreResult},
    predicate::{Operator, Predicate},
};

/// Upper bound on transparent retries of a conflicted conditional-insert
/// transaction before surfacing [`StoreError::Transaction`].
const MAX_TXN_ATTEMPTS: u32 = 5;

/// Client for reading, inserting, conditionally inserting, querying, and
/// checking existence of documents in named collections.
///
/// Construct one explicitly per backend connection and drop (or
/// [`into_driver`](DocumentClient::into_driver)) it when done; clients are
/// cheap handles, not ambient state, so independent instances can coexist.
#[derive(Debug, Clone)]
pub struct DocumentClient<D: Driver> {
    driver: D,
}

impl<D: Driver> DocumentClient<D> {
    /// Creates a client over the given backend driver.
    pub fn new(driver: D) -> Self {
        Self { driver }
    }

    /// Consumes the client, returning the underlying driver so the caller
    /// can shut it down.
    pub fn into_driver(self) -> D {
        self.driver
    }

    /// Fetches exactly one document by ID.
    ///
    /// # Errors
    ///
    /// - [`StoreError::CollectionUnavailable`] if the collection cannot be resolved or read
    /// - [`StoreError::NotFound`] if no document with that ID exists
    /// - [`StoreError::Decode`] if the stored payload is not a mapping
    pub async fn read(&self, ctx: &OpContext, collection: &str, id: &str) -> StoreResult<Doc> {
        let col = ctx
            .run(self.driver.resolve_collection(collection))
            .await?;
        debug!("reading {col}/{id}");

        match ctx.run(self.driver.get_document(&col, id)).await? {
            Some(Bson::Document(doc)) => Ok(doc),
            Some(_) => Err(StoreError::Decode(format!(
                "document {id} in collection {col} is not a mapping"
            ))),
            None => Err(StoreError::NotFound(id.to_string(), collection.to_string())),
        }
    }

    /// Creates a new document with a backend-generated unique ID and
    /// returns that ID. The document is visible to subsequent reads once
    /// the call returns.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Write`] on backend failure.
    pub async fn insert(&self, ctx: &OpContext, collection: &str, data: Doc) -> StoreResult<String> {
        let col = ctx
            .run(self.driver.resolve_collection(collection))
            .await?;
        debug!("inserting into {col}");

        ctx.run(self.driver.add_document(&col, Bson::Document(data)))
            .await
            .map_err(|err| match err {
                StoreError::Canceled | StoreError::DeadlineExceeded => err,
                StoreError::Write(_) => err,
                other => StoreError::Write(other.to_string()),
            })
    }

    /// Creates a document at a caller-chosen ID only if that ID is
    /// currently unoccupied, as a single atomic unit against the backend.
    ///
    /// Of any number of racing calls for the same `(collection, id)`, at
    /// most one succeeds; the rest observe [`StoreError::AlreadyExists`].
    /// Retriable backend conflicts are retried transparently up to a fixed
    /// bound, after which [`StoreError::Transaction`] is surfaced.
    ///
    /// # Errors
    ///
    /// - [`StoreError::AlreadyExists`] if the target ID is occupied
    /// - [`StoreError::Transaction`] if the transaction aborts for any other
    ///   reason, including exhausted conflict retries
    pub async fn insert_with_id(
        &self,
        ctx: &OpContext,
        collection: &str,
        id: &str,
        data: Doc,
    ) -> StoreResult<()> {
        let col = ctx
            .run(self.driver.resolve_collection(collection))
            .await?;
        debug!("conditional insert of {col}/{id}");

        ctx.run(async {
            let mut attempts = 0;
            loop {
                attempts += 1;
                let body = conditional_insert_body(
                    id.to_string(),
                    collection.to_string(),
                    Bson::Document(data.clone()),
                );

                match self.driver.run_transaction(&col, body).await {
                    Ok(()) => return Ok(()),
                    Err(StoreError::TransactionConflict) if attempts < MAX_TXN_ATTEMPTS => {
                        debug!("conditional insert of {col}/{id} conflicted, retrying");
                        continue;
                    }
                    Err(StoreError::TransactionConflict) => {
                        return Err(StoreError::Transaction(format!(
                            "conflict retries exhausted after {attempts} attempts"
                        )));
                    }
                    Err(err @ StoreError::AlreadyExists(_, _)) => return Err(err),
                    Err(err @ (StoreError::Canceled | StoreError::DeadlineExceeded)) => {
                        return Err(err);
                    }
                    Err(err @ StoreError::Transaction(_)) => return Err(err),
                    Err(other) => return Err(StoreError::Transaction(other.to_string())),
                }
            }
        })
        .await
    }

    /// Returns every document in the collection matching
    /// `(field, op, value)`, keyed by ID. No ordering is guaranteed, and an
    /// empty map is success, not an error.
    ///
    /// # Errors
    ///
    /// - [`StoreError::Query`] if the predicate is malformed for the operator
    /// - [`StoreError::Decode`] if a matching stored payload is not a mapping
    pub async fn where_field(
        &self,
        ctx: &OpContext,
        collection: &str,
        field: &str,
        op: Operator,
        value: impl Into<Bson>,
    ) -> StoreResult<HashMap<String, Doc>> {
        let predicate = Predicate::new(field, op, value);
        predicate.validate()?;

        let col = ctx
            .run(self.driver.resolve_collection(collection))
            .await?;
        debug!("querying {col} where {} {} ...", predicate.field, predicate.op);

        ctx.run(self.driver.query_documents(&col, &predicate))
            .await?
            .into_iter()
            .map(|(id, payload)| match payload {
                Bson::Document(doc) => Ok((id, doc)),
                _ => Err(StoreError::Decode(format!(
                    "document {id} in collection {collection} is not a mapping"
                ))),
            })
            .collect()
    }

    /// Reports whether a document with the given ID exists.
    ///
    /// Both an unresolvable collection and an absent document yield
    /// `Ok(false)`; only genuine backend failures return an error.
    pub async fn exists(&self, ctx: &OpContext, collection: &str, id: &str) -> StoreResult<bool> {
        let col = match ctx
            .run(self.driver.resolve_collection(collection))
            .await
        {
            Ok(col) => col,
            Err(StoreError::CollectionUnavailable(_)) => return Ok(false),
            Err(err) => return Err(err),
        };

        match ctx.run(self.driver.get_document(&col, id)).await {
            Ok(found) => Ok(found.is_some()),
            Err(StoreError::CollectionUnavailable(_)) => Ok(false),
            Err(err) => Err(err),
        }
    }
}

/// Builds the insert-if-absent transaction body: read the target ID inside
/// the isolation boundary, stage the write only when the read observes
/// absence, and abort with `AlreadyExists` when it does not.
fn conditional_insert_body(id: String, collection: String, payload: Bson) -> TxnBody {
    Box::new(move |txn| {
        Box::pin(async move {
            match txn.get(&id).await? {
                Some(_) => Err(StoreError::AlreadyExists(id, collection)),
                None => {
                    txn.set(&id, payload);
                    Ok(())
                }
            }
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::{CollectionRef, TxnAccess};
    use async_trait::async_trait;
    use bson::doc;
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Driver whose transactions conflict a configurable number of times
    /// before letting the body run against an always-empty view.
    #[derive(Debug, Default)]
    struct ConflictingDriver {
        conflicts: u32,
        attempts: AtomicU32,
    }

    struct EmptyTxn;

    #[async_trait]
    impl TxnAccess for EmptyTxn {
        async fn get(&mut self, _id: &str) -> StoreResult<Option<Bson>> {
            Ok(None)
        }

        fn set(&mut self, _id: &str, _data: Bson) {}
    }

    #[async_trait]
    impl Driver for ConflictingDriver {
        async fn resolve_collection(&self, name: &str) -> StoreResult<CollectionRef> {
            Ok(CollectionRef::new(name))
        }

        async fn get_document(
            &self,
            _collection: &CollectionRef,
            _id: &str,
        ) -> StoreResult<Option<Bson>> {
            Ok(None)
        }

        async fn add_document(
            &self,
            _collection: &CollectionRef,
            _data: Bson,
        ) -> StoreResult<String> {
            Err(StoreError::Backend("not under test".to_string()))
        }

        async fn run_transaction(
            &self,
            _collection: &CollectionRef,
            body: TxnBody,
        ) -> StoreResult<()> {
            let attempt = self.attempts.fetch_add(1, Ordering::SeqCst) + 1;
            if attempt <= self.conflicts {
                return Err(StoreError::TransactionConflict);
            }
            let mut txn = EmptyTxn;
            body(&mut txn).await
        }

        async fn query_documents(
            &self,
            _collection: &CollectionRef,
            _predicate: &Predicate,
        ) -> StoreResult<Vec<(String, Bson)>> {
            Ok(Vec::new())
        }
    }

    /// Driver whose transactional reads fail with a backend error.
    #[derive(Debug)]
    struct FailingReadDriver;

    struct FailingTxn;

    #[async_trait]
    impl TxnAccess for FailingTxn {
        async fn get(&mut self, _id: &str) -> StoreResult<Option<Bson>> {
            Err(StoreError::Backend("connection reset".to_string()))
        }

        fn set(&mut self, _id: &str, _data: Bson) {}
    }

    #[async_trait]
    impl Driver for FailingReadDriver {
        async fn resolve_collection(&self, name: &str) -> StoreResult<CollectionRef> {
            Ok(CollectionRef::new(name))
        }

        async fn get_document(
            &self,
            _collection: &CollectionRef,
            _id: &str,
        ) -> StoreResult<Option<Bson>> {
            Ok(None)
        }

        async fn add_document(
            &self,
            _collection: &CollectionRef,
            _data: Bson,
        ) -> StoreResult<String> {
            Err(StoreError::Backend("not under test".to_string()))
        }

        async fn run_transaction(
            &self,
            _collection: &CollectionRef,
            body: TxnBody,
        ) -> StoreResult<()> {
            let mut txn = FailingTxn;
            body(&mut txn).await
        }

        async fn query_documents(
            &self,
            _collection: &CollectionRef,
            _predicate: &Predicate,
        ) -> StoreResult<Vec<(String, Bson)>> {
            Ok(Vec::new())
        }
    }

    #[tokio::test]
    async fn conflicted_transaction_is_retried_until_it_commits() {
        let client = DocumentClient::new(ConflictingDriver {
            conflicts: 3,
            attempts: AtomicU32::new(0),
        });
        let ctx = OpContext::new();

        client
            .insert_with_id(&ctx, "users", "alice", doc! { "status": "active" })
            .await
            .unwrap();
        assert_eq!(
            client.driver.attempts.load(Ordering::SeqCst),
            4,
            "three conflicts plus the committing attempt"
        );
    }

    #[tokio::test]
    async fn exhausted_conflicts_surface_as_transaction_error() {
        let client = DocumentClient::new(ConflictingDriver {
            conflicts: u32::MAX,
            attempts: AtomicU32::new(0),
        });
        let ctx = OpContext::new();

        let err = client
            .insert_with_id(&ctx, "users", "alice", doc! { "status": "active" })
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Transaction(_)));
        assert_eq!(client.driver.attempts.load(Ordering::SeqCst), MAX_TXN_ATTEMPTS);
    }

    #[tokio::test]
    async fn failed_transactional_read_aborts_with_transaction_error() {
        let client = DocumentClient::new(FailingReadDriver);
        let ctx = OpContext::new();

        let err = client
            .insert_with_id(&ctx, "users", "alice", doc! { "status": "active" })
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Transaction(_)));
    }

    #[tokio::test]
    async fn malformed_predicate_fails_before_reaching_the_driver() {
        let client = DocumentClient::new(ConflictingDriver::default());
        let ctx = OpContext::new();

        let err = client
            .where_field(&ctx, "users", "status", Operator::In, "active")
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Query(_)));
    }
}
