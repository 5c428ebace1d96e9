//! Parameter binding.
//!
//! Builders emit placeholder text; the functions here emit the matching
//! ordered values. Both sides derive from the same logical inputs, so a
//! builder and its binder agree on order by construction. Values are
//! backend-neutral [`SqlParam`]s; each adapter converts them to its
//! driver's native parameter type at execution time.

use crate::dialect::{Arity, Dialect};
use crate::error::{DocError, DocResult};
use crate::field::{Field, validate_path};
use serde::Serialize;
use serde_json::Value;

/// A backend-neutral bound value.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlParam {
    /// SQL NULL
    Null,
    /// Boolean (bound as INTEGER 0/1 on SQLite)
    Bool(bool),
    /// 64-bit integer
    Int(i64),
    /// Double-precision float
    Real(f64),
    /// Text
    Text(String),
    /// A JSON document or patch. Bound as JSONB on PostgreSQL and as
    /// rendered JSON text on SQLite.
    Json(Value),
    /// A text array (PostgreSQL only; used by remove-fields)
    TextArray(Vec<String>),
}

/// Bind a document key, string-coerced regardless of its native type.
pub fn id_param(id: impl ToString) -> SqlParam {
    SqlParam::Text(id.to_string())
}

/// Serialize a document (or patch) for binding as the payload value.
pub fn doc_param<T: Serialize>(doc: &T) -> DocResult<SqlParam> {
    Ok(SqlParam::Json(serde_json::to_value(doc)?))
}

/// Bind a JSON path expression for a JSON-path predicate.
pub fn json_path_param(path: impl Into<String>) -> SqlParam {
    SqlParam::Text(path.into())
}

/// Bind one comparison value for a dialect.
///
/// PostgreSQL extracts paths as text and the builder casts non-text
/// comparisons (`::double precision`, `::boolean`), so numbers bind as
/// floats there. SQLite's `json_extract` yields native affinity, so
/// integers stay integers. Structured values compare against the text
/// extraction and bind as rendered JSON.
fn scalar_param(dialect: Dialect, value: &Value) -> SqlParam {
    match value {
        Value::Null => SqlParam::Null,
        Value::Bool(b) => SqlParam::Bool(*b),
        Value::Number(n) => match dialect {
            Dialect::Postgres => SqlParam::Real(n.as_f64().unwrap_or_default()),
            Dialect::Sqlite => match n.as_i64() {
                Some(i) => SqlParam::Int(i),
                None => SqlParam::Real(n.as_f64().unwrap_or_default()),
            },
        },
        Value::String(s) => SqlParam::Text(s.clone()),
        Value::Array(_) | Value::Object(_) => SqlParam::Text(value.to_string()),
    }
}

/// Bind the values of a field predicate, honoring operator arity.
///
/// Existence checks bind nothing; `Between` binds its two bounds in
/// declared order; `In` binds one value per list element; every other
/// operator binds exactly one value.
pub fn field_params(dialect: Dialect, field: &Field) -> Vec<SqlParam> {
    match field.op().arity() {
        Arity::Zero => Vec::new(),
        _ => field
            .values()
            .iter()
            .map(|v| scalar_param(dialect, v))
            .collect(),
    }
}

/// Bind the field names for a remove-fields operation.
///
/// PostgreSQL removes keys with `data - $n::text[]` and binds one text
/// array; SQLite removes them with `json_remove(data, ?1, ...)` and binds
/// one `'$.name'` path per field. Only top-level names are accepted, so
/// both engines remove the same thing.
pub fn remove_fields_params(dialect: Dialect, names: &[&str]) -> DocResult<Vec<SqlParam>> {
    if names.is_empty() {
        return Err(DocError::validation(
            "remove-fields requires at least one field name",
        ));
    }
    for name in names {
        validate_path(name)?;
        if name.contains('.') {
            return Err(DocError::validation(format!(
                "remove-fields accepts top-level field names only, got '{name}'"
            )));
        }
    }
    Ok(match dialect {
        Dialect::Postgres => vec![SqlParam::TextArray(
            names.iter().map(|n| (*n).to_string()).collect(),
        )],
        Dialect::Sqlite => names
            .iter()
            .map(|n| SqlParam::Text(format!("$.{n}")))
            .collect(),
    })
}
