//! In-memory backend driver for docstore.
//!
//! This crate provides a thread-safe, in-memory implementation of the
//! [`Driver`](docstore_core::driver::Driver) trait. Documents live in nested
//! hash maps behind an async-aware read-write lock; transactions take the
//! write lock for their whole lifetime, so conditional inserts racing for
//! the same ID serialize and exactly one observes absence.
//!
//! Intended for development, testing, and small-scale deployments.
//!
//! # Quick Start
//!
//! ```ignore
//! use docstore_core::{client::DocumentClient, context::OpContext};
//! use docstore_memory::MemoryDriver;
//! use bson::doc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = DocumentClient::new(MemoryDriver::new());
//!     let ctx = OpContext::new();
//!
//!     client
//!         .insert_with_id(&ctx, "users", "alice", doc! { "status": "active" })
//!         .await?;
//!     assert!(client.exists(&ctx, "users", "alice").await?);
//!
//!     Ok(())
//! }
//! ```

pub mod driver;
pub mod evaluator;

pub use driver::{MemoryDriver, MemoryDriverBuilder};
