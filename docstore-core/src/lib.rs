//! A minimal abstraction over a schemaless document store.
//!
//! This crate is the core of the docstore project and provides:
//!
//! - **Document client** ([`client`]) - The façade exposing read, insert,
//!   conditional insert, predicate query, and existence checks
//! - **Driver abstraction** ([`driver`]) - The narrow capability set a
//!   backend driver implements against a specific document database
//! - **Predicate model** ([`predicate`]) - `(field, operator, value)`
//!   filters and operator parsing
//! - **Document payloads** ([`document`]) - Dynamic field-value mappings
//!   with explicit encode/decode boundaries
//! - **Operation context** ([`context`]) - Caller-supplied cancellation and
//!   deadline signals
//! - **Error handling** ([`error`]) - The error taxonomy and result type
//!
//! # Example
//!
//! ```ignore
//! use docstore_core::{client::DocumentClient, context::OpContext};
//! use bson::doc;
//!
//! let client = DocumentClient::new(backend_driver);
//! let ctx = OpContext::new();
//!
//! // Insert-if-absent: at most one of any number of racing callers wins.
//! client
//!     .insert_with_id(&ctx, "users", "alice", doc! { "status": "active" })
//!     .await?;
//!
//! let alice = client.read(&ctx, "users", "alice").await?;
//! assert_eq!(alice.get_str("status").unwrap(), "active");
//! ```

pub mod client;
pub mod context;
pub mod document;
pub mod driver;
pub mod error;
pub mod predicate;
