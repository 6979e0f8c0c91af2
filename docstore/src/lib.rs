//! Main docstore crate providing a unified interface for document storage.
//!
//! This crate is the primary entry point for users of the docstore project.
//! It re-exports the core client, driver abstraction, and error types, and
//! provides the in-memory reference driver under [`memory`].
//!
//! # Quick Start
//!
//! ```ignore
//! use docstore::{prelude::*, memory::MemoryDriver};
//! use bson::doc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = DocumentClient::new(MemoryDriver::new());
//!     let ctx = OpContext::new();
//!
//!     // Conditional create: fails with AlreadyExists if "alice" is taken.
//!     client
//!         .insert_with_id(&ctx, "users", "alice", doc! { "status": "active" })
//!         .await?;
//!
//!     // Predicate query, keyed by document ID.
//!     let active = client
//!         .where_field(&ctx, "users", "status", Operator::Eq, "active")
//!         .await?;
//!     assert!(active.contains_key("alice"));
//!
//!     Ok(())
//! }
//! ```

pub mod prelude;

pub use docstore_core::{client, context, document, driver, error, predicate};

// Re-export BSON types for convenience
pub use bson;

/// In-memory driver implementation.
pub mod memory {
    pub use docstore_memory::{MemoryDriver, MemoryDriverBuilder};
}
