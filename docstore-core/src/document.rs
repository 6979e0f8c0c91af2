//! Document payload representation and conversion helpers.
//!
//! Documents are schemaless field-to-value mappings. They are represented as
//! [`bson::Document`], a tagged-union value type covering strings, numbers,
//! booleans, arrays, and nested mappings. All conversion between caller types
//! and stored payloads happens through the explicit helpers here rather than
//! implicit reflection at the driver boundary.

use bson::{Bson, de::deserialize_from_bson, ser::serialize_to_bson};
use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;

use crate::error::{StoreError, StoreResult};

/// The schemaless payload of a stored document: an order-irrelevant mapping
/// from string field names to dynamically typed values.
pub type Doc = bson::Document;

/// Serializes any `Serialize` value into a document mapping.
///
/// # Errors
///
/// Returns [`StoreError::Decode`] if the value does not serialize to a
/// mapping (e.g. a bare string or number).
pub fn to_doc<T: Serialize>(value: &T) -> StoreResult<Doc> {
    match serialize_to_bson(value)? {
        Bson::Document(doc) => Ok(doc),
        _ => Err(StoreError::Decode(
            "value did not serialize to a document mapping".to_string(),
        )),
    }
}

/// Deserializes a document mapping into a caller-defined type.
///
/// # Errors
///
/// Returns [`StoreError::Decode`] if the stored shape does not match `T`.
pub fn from_doc<T: DeserializeOwned>(doc: Doc) -> StoreResult<T> {
    Ok(deserialize_from_bson(Bson::Document(doc))?)
}

/// Converts a JSON object into a document mapping.
pub fn doc_from_json(value: Value) -> StoreResult<Doc> {
    to_doc(&value)
}

/// Converts a document mapping into a JSON value.
pub fn doc_to_json(doc: &Doc) -> StoreResult<Value> {
    Ok(serde_json::to_value(doc)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Account {
        name: String,
        active: bool,
    }

    #[test]
    fn typed_round_trip() {
        let account = Account { name: "alice".to_string(), active: true };
        let doc = to_doc(&account).unwrap();
        assert_eq!(doc.get_str("name").unwrap(), "alice");

        let back: Account = from_doc(doc).unwrap();
        assert_eq!(back, account);
    }

    #[test]
    fn scalar_is_not_a_mapping() {
        let err = to_doc(&42i64).unwrap_err();
        assert!(matches!(err, StoreError::Decode(_)));
    }

    #[test]
    fn json_round_trip() {
        let doc = doc_from_json(json!({"status": "active", "count": 3})).unwrap();
        assert_eq!(doc, doc! { "status": "active", "count": 3i64 });

        let value = doc_to_json(&doc).unwrap();
        assert_eq!(value["status"], json!("active"));
    }
}
