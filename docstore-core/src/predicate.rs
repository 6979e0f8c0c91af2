//! Predicate model for field queries.
//!
//! A [`Predicate`] is a `(field, operator, value)` triple selecting a subset
//! of documents in one collection. The operator set matches what common
//! document databases expose for single-field filters, including the array
//! membership operators.
//!
//! # Example
//!
//! ```ignore
//! use docstore_core::predicate::{Operator, Predicate};
//!
//! let by_status = Predicate::eq("status", "active");
//! let parsed = Operator::parse("array-contains-any").unwrap();
//! assert_eq!(parsed, Operator::ArrayContainsAny);
//! ```

use bson::Bson;
use std::fmt;
use std::str::FromStr;

use crate::error::{StoreError, StoreResult};

/// Field comparison operators supported by [`Predicate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    /// Equal to (exact match).
    Eq,
    /// Not equal to.
    Ne,
    /// Less than.
    Lt,
    /// Less than or equal to.
    Lte,
    /// Greater than.
    Gt,
    /// Greater than or equal to.
    Gte,
    /// Array field contains the value.
    ArrayContains,
    /// Array field contains any of the values (value must be an array).
    ArrayContainsAny,
    /// Field value is one of the values (value must be an array).
    In,
    /// Field value is none of the values (value must be an array).
    NotIn,
}

impl Operator {
    /// Parses an operator from its query symbol (`==`, `!=`, `<`, `<=`, `>`,
    /// `>=`, `array-contains`, `array-contains-any`, `in`, `not-in`).
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Query`] for an unknown symbol.
    pub fn parse(symbol: &str) -> StoreResult<Self> {
        match symbol {
            "==" => Ok(Operator::Eq),
            "!=" => Ok(Operator::Ne),
            "<" => Ok(Operator::Lt),
            "<=" => Ok(Operator::Lte),
            ">" => Ok(Operator::Gt),
            ">=" => Ok(Operator::Gte),
            "array-contains" => Ok(Operator::ArrayContains),
            "array-contains-any" => Ok(Operator::ArrayContainsAny),
            "in" => Ok(Operator::In),
            "not-in" => Ok(Operator::NotIn),
            other => Err(StoreError::Query(format!("unsupported operator: {other}"))),
        }
    }

    /// Returns the query symbol for this operator.
    pub fn symbol(&self) -> &'static str {
        match self {
            Operator::Eq => "==",
            Operator::Ne => "!=",
            Operator::Lt => "<",
            Operator::Lte => "<=",
            Operator::Gt => ">",
            Operator::Gte => ">=",
            Operator::ArrayContains => "array-contains",
            Operator::ArrayContainsAny => "array-contains-any",
            Operator::In => "in",
            Operator::NotIn => "not-in",
        }
    }

    /// Whether this operator requires an array comparison value.
    pub fn requires_array_value(&self) -> bool {
        matches!(
            self,
            Operator::ArrayContainsAny | Operator::In | Operator::NotIn
        )
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl FromStr for Operator {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Operator::parse(s)
    }
}

/// A single-field filter selecting documents within one collection.
#[derive(Debug, Clone)]
pub struct Predicate {
    /// The field name to compare.
    pub field: String,
    /// The comparison operator.
    pub op: Operator,
    /// The value to compare against.
    pub value: Bson,
}

impl Predicate {
    /// Creates a predicate from its parts.
    pub fn new(field: impl Into<String>, op: Operator, value: impl Into<Bson>) -> Self {
        Self { field: field.into(), op, value: value.into() }
    }

    /// Matches documents where the field equals the value.
    pub fn eq(field: impl Into<String>, value: impl Into<Bson>) -> Self {
        Self::new(field, Operator::Eq, value)
    }

    /// Matches documents where the field does not equal the value.
    pub fn ne(field: impl Into<String>, value: impl Into<Bson>) -> Self {
        Self::new(field, Operator::Ne, value)
    }

    /// Matches documents where the field is less than the value.
    pub fn lt(field: impl Into<String>, value: impl Into<Bson>) -> Self {
        Self::new(field, Operator::Lt, value)
    }

    /// Matches documents where the field is less than or equal to the value.
    pub fn lte(field: impl Into<String>, value: impl Into<Bson>) -> Self {
        Self::new(field, Operator::Lte, value)
    }

    /// Matches documents where the field is greater than the value.
    pub fn gt(field: impl Into<String>, value: impl Into<Bson>) -> Self {
        Self::new(field, Operator::Gt, value)
    }

    /// Matches documents where the field is greater than or equal to the value.
    pub fn gte(field: impl Into<String>, value: impl Into<Bson>) -> Self {
        Self::new(field, Operator::Gte, value)
    }

    /// Matches documents where the array field contains the value.
    pub fn array_contains(field: impl Into<String>, value: impl Into<Bson>) -> Self {
        Self::new(field, Operator::ArrayContains, value)
    }

    /// Matches documents where the array field contains any of the values.
    pub fn array_contains_any(field: impl Into<String>, values: impl Into<Bson>) -> Self {
        Self::new(field, Operator::ArrayContainsAny, values)
    }

    /// Matches documents where the field value is one of the values.
    pub fn is_in(field: impl Into<String>, values: impl Into<Bson>) -> Self {
        Self::new(field, Operator::In, values)
    }

    /// Matches documents where the field value is none of the values.
    pub fn not_in(field: impl Into<String>, values: impl Into<Bson>) -> Self {
        Self::new(field, Operator::NotIn, values)
    }

    /// Checks that the predicate is well formed for its operator.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Query`] if the field name is empty or an array
    /// operator was given a non-array value.
    pub fn validate(&self) -> StoreResult<()> {
        if self.field.is_empty() {
            return Err(StoreError::Query("predicate field name is empty".to_string()));
        }
        if self.op.requires_array_value() && !matches!(self.value, Bson::Array(_)) {
            return Err(StoreError::Query(format!(
                "operator {} requires an array value",
                self.op
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::bson;

    #[test]
    fn symbols_round_trip() {
        let ops = [
            Operator::Eq,
            Operator::Ne,
            Operator::Lt,
            Operator::Lte,
            Operator::Gt,
            Operator::Gte,
            Operator::ArrayContains,
            Operator::ArrayContainsAny,
            Operator::In,
            Operator::NotIn,
        ];
        for op in ops {
            assert_eq!(Operator::parse(op.symbol()).unwrap(), op);
        }
    }

    #[test]
    fn unknown_symbol_is_a_query_error() {
        let err = Operator::parse("=~").unwrap_err();
        assert!(matches!(err, StoreError::Query(_)));
    }

    #[test]
    fn array_operators_reject_scalar_values() {
        let predicate = Predicate::is_in("status", "active");
        assert!(matches!(predicate.validate(), Err(StoreError::Query(_))));

        let predicate = Predicate::is_in("status", bson!(["active", "pending"]));
        assert!(predicate.validate().is_ok());
    }

    #[test]
    fn empty_field_is_rejected() {
        let predicate = Predicate::eq("", "active");
        assert!(matches!(predicate.validate(), Err(StoreError::Query(_))));
    }
}
