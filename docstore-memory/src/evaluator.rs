//! Predicate evaluation over in-memory document payloads.
//!
//! Evaluates a [`Predicate`] against one document mapping at a time. BSON
//! values are first normalized into [`Comparable`] so that mixed numeric
//! types compare by value rather than by representation.

use bson::{Bson, datetime::DateTime};
use std::cmp::Ordering;
use std::collections::HashMap;

use docstore_core::{
    document::Doc,
    error::{StoreError, StoreResult},
    predicate::{Operator, Predicate},
};

/// Comparison-friendly view of a BSON value.
///
/// Integers keep their exact `i64` value so that large counters and IDs
/// beyond 2^53 compare precisely; mixed integer/float comparisons go
/// through `f64`. Values with no meaningful ordering across types simply
/// fail `partial_cmp`.
#[derive(Debug)]
pub(crate) enum Comparable<'a> {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    DateTime(DateTime),
    String(&'a str),
    Array(Vec<Comparable<'a>>),
    Map(HashMap<&'a str, Comparable<'a>>),
}

impl<'a> From<&'a Bson> for Comparable<'a> {
    fn from(bson: &'a Bson) -> Self {
        match bson {
            Bson::Null => Comparable::Null,
            Bson::Boolean(value) => Comparable::Bool(*value),
            Bson::Int32(value) => Comparable::Int(*value as i64),
            Bson::Int64(value) => Comparable::Int(*value),
            Bson::Double(value) => Comparable::Float(*value),
            Bson::DateTime(value) => Comparable::DateTime(*value),
            Bson::String(value) => Comparable::String(value),
            Bson::Array(items) => Comparable::Array(
                items
                    .iter()
                    .map(Comparable::from)
                    .collect(),
            ),
            Bson::Document(doc) => Comparable::Map(
                doc.iter()
                    .map(|(k, v)| (k.as_str(), Comparable::from(v)))
                    .collect(),
            ),
            // Remaining BSON types carry no comparison semantics here.
            _ => Comparable::Null,
        }
    }
}

impl PartialEq for Comparable<'_> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Comparable::Null, Comparable::Null) => true,
            (Comparable::Bool(a), Comparable::Bool(b)) => a == b,
            (Comparable::Int(a), Comparable::Int(b)) => a == b,
            (Comparable::Float(a), Comparable::Float(b)) => a == b,
            (Comparable::Int(a), Comparable::Float(b))
            | (Comparable::Float(b), Comparable::Int(a)) => *a as f64 == *b,
            (Comparable::DateTime(a), Comparable::DateTime(b)) => a == b,
            (Comparable::String(a), Comparable::String(b)) => a == b,
            (Comparable::Array(a), Comparable::Array(b)) => a == b,
            (Comparable::Map(a), Comparable::Map(b)) => a == b,
            _ => false,
        }
    }
}

impl PartialOrd for Comparable<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Comparable::Bool(a), Comparable::Bool(b)) => a.partial_cmp(b),
            (Comparable::Int(a), Comparable::Int(b)) => a.partial_cmp(b),
            (Comparable::Float(a), Comparable::Float(b)) => a.partial_cmp(b),
            (Comparable::Int(a), Comparable::Float(b)) => (*a as f64).partial_cmp(b),
            (Comparable::Float(a), Comparable::Int(b)) => a.partial_cmp(&(*b as f64)),
            (Comparable::DateTime(a), Comparable::DateTime(b)) => a.partial_cmp(b),
            (Comparable::String(a), Comparable::String(b)) => a.partial_cmp(b),
            _ => None,
        }
    }
}

/// Reports whether `document` satisfies `predicate`.
///
/// A document whose field is absent never matches, for any operator; this
/// includes `!=` and `not-in`.
///
/// # Errors
///
/// Returns [`StoreError::Query`] when an array operator carries a non-array
/// comparison value.
pub fn matches(document: &Doc, predicate: &Predicate) -> StoreResult<bool> {
    let Some(field_value) = document.get(&predicate.field) else {
        return Ok(false);
    };

    let left = Comparable::from(field_value);
    let right = Comparable::from(&predicate.value);

    match predicate.op {
        Operator::Eq => Ok(left == right),
        Operator::Ne => Ok(left != right),
        Operator::Lt | Operator::Lte | Operator::Gt | Operator::Gte => {
            match left.partial_cmp(&right) {
                Some(ordering) => Ok(match predicate.op {
                    Operator::Lt => ordering == Ordering::Less,
                    Operator::Lte => ordering != Ordering::Greater,
                    Operator::Gt => ordering == Ordering::Greater,
                    Operator::Gte => ordering != Ordering::Less,
                    _ => unreachable!(),
                }),
                None => Ok(false),
            }
        }
        Operator::ArrayContains => match left {
            Comparable::Array(items) => Ok(items.iter().any(|item| item == &right)),
            _ => Ok(false),
        },
        Operator::ArrayContainsAny => {
            let wanted = array_value(predicate)?;
            match left {
                Comparable::Array(items) => Ok(wanted
                    .iter()
                    .map(Comparable::from)
                    .any(|value| items.iter().any(|item| item == &value))),
                _ => Ok(false),
            }
        }
        Operator::In => {
            let wanted = array_value(predicate)?;
            Ok(wanted
                .iter()
                .map(Comparable::from)
                .any(|value| value == left))
        }
        Operator::NotIn => {
            let wanted = array_value(predicate)?;
            Ok(wanted
                .iter()
                .map(Comparable::from)
                .all(|value| value != left))
        }
    }
}

fn array_value(predicate: &Predicate) -> StoreResult<&Vec<Bson>> {
    match &predicate.value {
        Bson::Array(items) => Ok(items),
        _ => Err(StoreError::Query(format!(
            "operator {} requires an array value",
            predicate.op
        ))),
    }
}
