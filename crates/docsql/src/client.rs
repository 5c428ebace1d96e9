//! Generic client trait for unified backend access.
//!
//! A [`DocumentClient`] is the seam between the generated SQL and a real
//! driver: it runs one parameterized statement and hands rows back in a
//! backend-neutral shape. Adapters for tokio-postgres, deadpool pools, and
//! rusqlite live in their own modules; the pipeline and store only ever see
//! this trait.

use crate::dialect::Dialect;
use crate::error::{DocError, DocResult};
use crate::param::SqlParam;

/// Emit the SQL that is about to execute, for debugging.
#[cfg(any(feature = "postgres", feature = "sqlite"))]
pub(crate) fn log_sql(dialect: Dialect, sql: &str, param_count: usize) {
    tracing::debug!(target: "docsql.sql", %dialect, param_count, sql = %sql);
}

/// A single column value read back from a backend.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    /// SQL NULL
    Null,
    /// Boolean (PostgreSQL `EXISTS` results)
    Bool(bool),
    /// 64-bit integer (counts, SQLite `EXISTS` results)
    Int(i64),
    /// Double-precision float
    Real(f64),
    /// Text, including SQLite JSON payloads
    Text(String),
    /// A decoded JSON value (PostgreSQL JSONB payloads)
    Json(serde_json::Value),
}

impl SqlValue {
    /// Interpret this value as a JSON document.
    ///
    /// PostgreSQL returns decoded JSONB; SQLite returns the stored text,
    /// which is parsed here.
    pub fn as_json(&self) -> DocResult<serde_json::Value> {
        match self {
            SqlValue::Json(value) => Ok(value.clone()),
            SqlValue::Text(text) => serde_json::from_str(text)
                .map_err(|e| DocError::decode("data", e.to_string())),
            other => Err(DocError::decode(
                "data",
                format!("expected a JSON payload, got {other:?}"),
            )),
        }
    }
}

/// One row of a result set, in column order.
#[derive(Debug, Clone, PartialEq)]
pub struct SqlRow {
    columns: Vec<SqlValue>,
}

impl SqlRow {
    /// Create a row from its column values.
    pub fn new(columns: Vec<SqlValue>) -> Self {
        Self { columns }
    }

    /// Get a column by 0-based index.
    pub fn get(&self, idx: usize) -> DocResult<&SqlValue> {
        self.columns.get(idx).ok_or_else(|| {
            DocError::decode(
                idx.to_string(),
                format!("row has only {} column(s)", self.columns.len()),
            )
        })
    }

    /// Number of columns.
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Whether the row has no columns.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

/// Conversion from a scalar column value.
pub trait FromSqlValue: Sized {
    /// Convert from a column value, or fail with a decode error.
    fn from_sql_value(value: &SqlValue) -> DocResult<Self>;
}

impl FromSqlValue for i64 {
    fn from_sql_value(value: &SqlValue) -> DocResult<Self> {
        match value {
            SqlValue::Int(i) => Ok(*i),
            other => Err(DocError::decode("0", format!("expected integer, got {other:?}"))),
        }
    }
}

impl FromSqlValue for f64 {
    fn from_sql_value(value: &SqlValue) -> DocResult<Self> {
        match value {
            SqlValue::Real(f) => Ok(*f),
            SqlValue::Int(i) => Ok(*i as f64),
            other => Err(DocError::decode("0", format!("expected float, got {other:?}"))),
        }
    }
}

impl FromSqlValue for bool {
    fn from_sql_value(value: &SqlValue) -> DocResult<Self> {
        match value {
            SqlValue::Bool(b) => Ok(*b),
            // SQLite surfaces EXISTS as 0/1.
            SqlValue::Int(i) => Ok(*i != 0),
            other => Err(DocError::decode("0", format!("expected boolean, got {other:?}"))),
        }
    }
}

impl FromSqlValue for String {
    fn from_sql_value(value: &SqlValue) -> DocResult<Self> {
        match value {
            SqlValue::Text(s) => Ok(s.clone()),
            other => Err(DocError::decode("0", format!("expected text, got {other:?}"))),
        }
    }
}

impl FromSqlValue for serde_json::Value {
    fn from_sql_value(value: &SqlValue) -> DocResult<Self> {
        value.as_json()
    }
}

/// A connection-like object that can run one parameterized statement.
///
/// Implemented for `tokio_postgres::Client`, `tokio_postgres::Transaction`,
/// [`SqliteClient`](crate::sqlite::SqliteClient), and
/// [`PoolClient`](crate::pool::PoolClient). Repository-style code can accept
/// either a borrowed connection or a pool wrapper through this trait.
pub trait DocumentClient: Send + Sync {
    /// The SQL dialect this client's backend speaks.
    fn dialect(&self) -> Dialect;

    /// Execute a query and return all rows.
    fn query(
        &self,
        sql: &str,
        params: &[SqlParam],
    ) -> impl std::future::Future<Output = DocResult<Vec<SqlRow>>> + Send;

    /// Execute a query and return the first row, if any.
    ///
    /// Semantics:
    /// - 0 rows: returns `Ok(None)`
    /// - 1 row: returns `Ok(Some(row))`
    /// - multiple rows: returns `Ok(Some(first_row))` (does **not** error)
    fn query_opt(
        &self,
        sql: &str,
        params: &[SqlParam],
    ) -> impl std::future::Future<Output = DocResult<Option<SqlRow>>> + Send {
        async move { Ok(self.query(sql, params).await?.into_iter().next()) }
    }

    /// Execute a statement and return the number of affected rows.
    fn execute(
        &self,
        sql: &str,
        params: &[SqlParam],
    ) -> impl std::future::Future<Output = DocResult<u64>> + Send;
}

impl<C: DocumentClient> DocumentClient for &C {
    fn dialect(&self) -> Dialect {
        (**self).dialect()
    }

    fn query(
        &self,
        sql: &str,
        params: &[SqlParam],
    ) -> impl std::future::Future<Output = DocResult<Vec<SqlRow>>> + Send {
        (**self).query(sql, params)
    }

    fn query_opt(
        &self,
        sql: &str,
        params: &[SqlParam],
    ) -> impl std::future::Future<Output = DocResult<Option<SqlRow>>> + Send {
        (**self).query_opt(sql, params)
    }

    fn execute(
        &self,
        sql: &str,
        params: &[SqlParam],
    ) -> impl std::future::Future<Output = DocResult<u64>> + Send {
        (**self).execute(sql, params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bool_from_int_and_bool() {
        assert!(bool::from_sql_value(&SqlValue::Bool(true)).unwrap());
        assert!(bool::from_sql_value(&SqlValue::Int(1)).unwrap());
        assert!(!bool::from_sql_value(&SqlValue::Int(0)).unwrap());
        assert!(bool::from_sql_value(&SqlValue::Text("t".into())).is_err());
    }

    #[test]
    fn json_from_text_and_json() {
        let from_text = SqlValue::Text(r#"{"Id":"one"}"#.into()).as_json().unwrap();
        let from_json = SqlValue::Json(serde_json::json!({"Id": "one"}))
            .as_json()
            .unwrap();
        assert_eq!(from_text, from_json);
        assert!(SqlValue::Int(3).as_json().is_err());
    }

    #[test]
    fn row_get_out_of_range_is_decode_error() {
        let row = SqlRow::new(vec![SqlValue::Int(1)]);
        assert!(row.get(0).is_ok());
        assert!(matches!(row.get(1), Err(DocError::Decode { .. })));
    }
}
