//! In-memory driver implementation.

use async_trait::async_trait;
use bson::Bson;
use mea::rwlock::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

use docstore_core::{
    driver::{CollectionRef, Driver, DriverBuilder, TxnAccess, TxnBody},
    error::{StoreError, StoreResult},
    predicate::Predicate,
};

use crate::evaluator;

type CollectionMap = HashMap<String, Bson>;
type StoreMap = HashMap<String, CollectionMap>;

/// Thread-safe in-memory document store driver.
///
/// Cloning is cheap and clones share the same underlying data, so one
/// driver can back any number of client handles. Collections are created
/// implicitly on first write; a collection that has never been written is
/// reported as unavailable on reads.
///
/// Transactions hold the store's write lock for their entire body, which
/// makes every transaction appear totally ordered with respect to every
/// other operation. There is no conflict to retry under this scheme, so
/// `run_transaction` never reports `TransactionConflict`.
#[derive(Default, Clone, Debug)]
pub struct MemoryDriver {
    store: Arc<RwLock<StoreMap>>,
}

impl MemoryDriver {
    /// Creates an empty in-memory driver.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a builder for constructing a `MemoryDriver`.
    pub fn builder() -> MemoryDriverBuilder {
        MemoryDriverBuilder::default()
    }
}

struct MemoryTxn<'s> {
    committed: Option<&'s CollectionMap>,
    staged: Vec<(String, Bson)>,
}

#[async_trait]
impl TxnAccess for MemoryTxn<'_> {
    async fn get(&mut self, id: &str) -> StoreResult<Option<Bson>> {
        // Staged writes shadow the committed state within this transaction.
        if let Some((_, doc)) = self
            .staged
            .iter()
            .rev()
            .find(|(staged_id, _)| staged_id == id)
        {
            return Ok(Some(doc.clone()));
        }
        Ok(self
            .committed
            .and_then(|map| map.get(id).cloned()))
    }

    fn set(&mut self, id: &str, data: Bson) {
        self.staged.push((id.to_string(), data));
    }
}

#[async_trait]
impl Driver for MemoryDriver {
    async fn resolve_collection(&self, name: &str) -> StoreResult<CollectionRef> {
        if name.is_empty() || name.contains('/') {
            return Err(StoreError::CollectionUnavailable(name.to_string()));
        }
        Ok(CollectionRef::new(name))
    }

    async fn get_document(
        &self,
        collection: &CollectionRef,
        id: &str,
    ) -> StoreResult<Option<Bson>> {
        let store = self.store.read().await;
        match store.get(collection.name()) {
            Some(map) => Ok(map.get(id).cloned()),
            None => Err(StoreError::CollectionUnavailable(
                collection.name().to_string(),
            )),
        }
    }

    async fn add_document(&self, collection: &CollectionRef, data: Bson) -> StoreResult<String> {
        let id = Uuid::new_v4().to_string();
        let mut store = self.store.write().await;
        store
            .entry(collection.name().to_string())
            .or_default()
            .insert(id.clone(), data);
        Ok(id)
    }

    async fn run_transaction(
        &self,
        collection: &CollectionRef,
        body: TxnBody,
    ) -> StoreResult<()> {
        // Holding the write lock across the body serializes this transaction
        // against every other transaction and write on the store.
        let mut store = self.store.write().await;

        let staged = {
            let mut txn = MemoryTxn {
                committed: store.get(collection.name()),
                staged: Vec::new(),
            };
            body(&mut txn).await?;
            txn.staged
        };

        let map = store
            .entry(collection.name().to_string())
            .or_default();
        for (id, doc) in staged {
            map.insert(id, doc);
        }

        Ok(())
    }

    async fn query_documents(
        &self,
        collection: &CollectionRef,
        predicate: &Predicate,
    ) -> StoreResult<Vec<(String, Bson)>> {
        let store = self.store.read().await;
        let Some(map) = store.get(collection.name()) else {
            return Ok(Vec::new());
        };

        let mut rows = Vec::new();
        for (id, payload) in map {
            let Some(mapping) = payload.as_document() else {
                return Err(StoreError::Decode(format!(
                    "document {id} in collection {collection} is not a mapping"
                )));
            };
            if evaluator::matches(mapping, predicate)? {
                rows.push((id.clone(), payload.clone()));
            }
        }
        Ok(rows)
    }
}

/// Builder for constructing [`MemoryDriver`] instances.
#[derive(Default)]
pub struct MemoryDriverBuilder;

#[async_trait]
impl DriverBuilder for MemoryDriverBuilder {
    type Driver = MemoryDriver;

    async fn build(self) -> StoreResult<Self::Driver> {
        Ok(MemoryDriver::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;
    use docstore_core::predicate::Predicate;

    #[tokio::test]
    async fn malformed_names_do_not_resolve() {
        let driver = MemoryDriver::new();
        assert!(matches!(
            driver.resolve_collection("").await,
            Err(StoreError::CollectionUnavailable(_))
        ));
        assert!(matches!(
            driver.resolve_collection("users/active").await,
            Err(StoreError::CollectionUnavailable(_))
        ));
    }

    #[tokio::test]
    async fn reads_from_an_unwritten_collection_are_unavailable() {
        let driver = MemoryDriver::new();
        let col = driver.resolve_collection("users").await.unwrap();
        assert!(matches!(
            driver.get_document(&col, "alice").await,
            Err(StoreError::CollectionUnavailable(_))
        ));
    }

    #[tokio::test]
    async fn add_document_creates_the_collection() {
        let driver = MemoryDriver::new();
        let col = driver.resolve_collection("users").await.unwrap();
        let id = driver
            .add_document(&col, Bson::Document(doc! { "status": "active" }))
            .await
            .unwrap();

        let found = driver.get_document(&col, &id).await.unwrap();
        assert_eq!(found, Some(Bson::Document(doc! { "status": "active" })));
    }

    #[tokio::test]
    async fn transactional_reads_observe_staged_writes() {
        let driver = MemoryDriver::new();
        let col = driver.resolve_collection("users").await.unwrap();

        driver
            .run_transaction(
                &col,
                Box::new(|txn| {
                    Box::pin(async move {
                        assert_eq!(txn.get("alice").await?, None);
                        txn.set("alice", Bson::Document(doc! { "status": "active" }));
                        assert!(txn.get("alice").await?.is_some());
                        Ok(())
                    })
                }),
            )
            .await
            .unwrap();

        let found = driver.get_document(&col, "alice").await.unwrap();
        assert!(found.is_some());
    }

    #[tokio::test]
    async fn aborted_transactions_stage_nothing() {
        let driver = MemoryDriver::new();
        let col = driver.resolve_collection("users").await.unwrap();

        let err = driver
            .run_transaction(
                &col,
                Box::new(|txn| {
                    Box::pin(async move {
                        txn.set("alice", Bson::Document(doc! { "status": "active" }));
                        Err(StoreError::Backend("boom".to_string()))
                    })
                }),
            )
            .await
            .unwrap_err();
        assert_eq!(err, StoreError::Backend("boom".to_string()));

        // The collection was never created, so the write is not visible.
        assert!(matches!(
            driver.get_document(&col, "alice").await,
            Err(StoreError::CollectionUnavailable(_))
        ));
    }

    #[tokio::test]
    async fn query_on_an_unwritten_collection_is_empty() {
        let driver = MemoryDriver::new();
        let col = driver.resolve_collection("users").await.unwrap();
        let rows = driver
            .query_documents(&col, &Predicate::eq("status", "active"))
            .await
            .unwrap();
        assert!(rows.is_empty());
    }
}
