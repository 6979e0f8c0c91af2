//! Convenient re-exports of commonly used types from docstore.
//!
//! Import this prelude module to quickly access the most frequently used
//! types and traits without importing from multiple sub-modules:
//!
//! ```ignore
//! use docstore::prelude::*;
//! ```

pub use docstore_core::{
    client::DocumentClient,
    context::OpContext,
    document::{Doc, doc_from_json, doc_to_json, from_doc, to_doc},
    driver::{CollectionRef, Driver, DriverBuilder, TxnAccess, TxnBody},
    error::{StoreError, StoreResult},
    predicate::{Operator, Predicate},
};
