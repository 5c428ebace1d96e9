//! Field predicates over the stored JSON document.
//!
//! A [`Field`] names a key path inside the payload, an operator, and the
//! value(s) the operator binds. Arity is enforced by construction: each
//! operator has its own constructor with the matching number of value
//! arguments, so an ill-formed predicate cannot be represented.
//!
//! Field paths are identifiers, not values, and therefore cannot be bound as
//! parameters. They are validated before interpolation instead.

use crate::dialect::Op;
use crate::error::{DocError, DocResult};
use serde_json::Value;

/// Validate a (possibly dotted) field path.
///
/// Each dot-separated segment must match `[A-Za-z_][A-Za-z0-9_]*`. This is
/// deliberately narrower than what the engines would quote-accept; paths are
/// spliced into SQL text and must never be able to carry syntax.
pub fn validate_path(path: &str) -> DocResult<()> {
    if path.is_empty() {
        return Err(DocError::validation("Field path cannot be empty"));
    }
    for segment in path.split('.') {
        let mut chars = segment.chars();
        let valid_head = chars
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic() || c == '_');
        if !valid_head || !chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(DocError::validation(format!(
                "Invalid field path segment '{segment}' in '{path}'"
            )));
        }
    }
    Ok(())
}

/// A single-field comparison predicate.
#[derive(Debug, Clone)]
pub struct Field {
    path: String,
    op: Op,
    values: Vec<Value>,
}

impl Field {
    fn new(path: impl Into<String>, op: Op, values: Vec<Value>) -> DocResult<Self> {
        let path = path.into();
        validate_path(&path)?;
        Ok(Self { path, op, values })
    }

    /// Field equals value.
    pub fn eq(path: impl Into<String>, value: impl Into<Value>) -> DocResult<Self> {
        Self::new(path, Op::Eq, vec![value.into()])
    }

    /// Field does not equal value.
    pub fn ne(path: impl Into<String>, value: impl Into<Value>) -> DocResult<Self> {
        Self::new(path, Op::Ne, vec![value.into()])
    }

    /// Field is greater than value.
    pub fn gt(path: impl Into<String>, value: impl Into<Value>) -> DocResult<Self> {
        Self::new(path, Op::Gt, vec![value.into()])
    }

    /// Field is greater than or equal to value.
    pub fn gte(path: impl Into<String>, value: impl Into<Value>) -> DocResult<Self> {
        Self::new(path, Op::Ge, vec![value.into()])
    }

    /// Field is less than value.
    pub fn lt(path: impl Into<String>, value: impl Into<Value>) -> DocResult<Self> {
        Self::new(path, Op::Lt, vec![value.into()])
    }

    /// Field is less than or equal to value.
    pub fn lte(path: impl Into<String>, value: impl Into<Value>) -> DocResult<Self> {
        Self::new(path, Op::Le, vec![value.into()])
    }

    /// Field is between two bounds, inclusive; bounds bind in declared order.
    pub fn between(
        path: impl Into<String>,
        min: impl Into<Value>,
        max: impl Into<Value>,
    ) -> DocResult<Self> {
        Self::new(path, Op::Between, vec![min.into(), max.into()])
    }

    /// Field value is one of the given values.
    ///
    /// An empty list builds a predicate that matches no row.
    pub fn in_list(
        path: impl Into<String>,
        values: impl IntoIterator<Item = impl Into<Value>>,
    ) -> DocResult<Self> {
        Self::new(path, Op::In, values.into_iter().map(Into::into).collect())
    }

    /// Field is present in the document.
    pub fn exists(path: impl Into<String>) -> DocResult<Self> {
        Self::new(path, Op::Exists, Vec::new())
    }

    /// Field is absent from the document.
    pub fn not_exists(path: impl Into<String>) -> DocResult<Self> {
        Self::new(path, Op::NotExists, Vec::new())
    }

    /// The validated field path.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The comparison operator.
    pub fn op(&self) -> Op {
        self.op
    }

    /// The values the operator binds, in declared order.
    pub fn values(&self) -> &[Value] {
        &self.values
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::Arity;

    #[test]
    fn valid_paths() {
        for path in ["Id", "Value", "sub.field", "a1.b2.c3", "_private"] {
            assert!(validate_path(path).is_ok(), "{path} should be valid");
        }
    }

    #[test]
    fn invalid_paths_rejected() {
        for path in ["", "1abc", "a-b", "a.", ".a", "a..b", "x'; DROP TABLE t; --", "a b"] {
            assert!(validate_path(path).is_err(), "{path} should be rejected");
        }
    }

    #[test]
    fn constructors_enforce_arity() {
        assert_eq!(Field::eq("Value", "purple").unwrap().values().len(), 1);
        assert_eq!(Field::between("Age", 18, 65).unwrap().values().len(), 2);
        assert!(Field::exists("Tag").unwrap().values().is_empty());
        assert!(Field::not_exists("Tag").unwrap().values().is_empty());
        assert_eq!(Field::exists("Tag").unwrap().op().arity(), Arity::Zero);
        assert_eq!(Field::between("n", 1, 2).unwrap().op().arity(), Arity::Two);
    }

    #[test]
    fn constructor_rejects_bad_path() {
        assert!(Field::eq("bad path", 1).is_err());
    }

    #[test]
    fn in_list_collects_in_order() {
        let f = Field::in_list("Size", ["S", "M", "L"]).unwrap();
        assert_eq!(f.values().len(), 3);
        assert_eq!(f.values()[0], serde_json::json!("S"));
        assert_eq!(f.values()[2], serde_json::json!("L"));
    }
}
