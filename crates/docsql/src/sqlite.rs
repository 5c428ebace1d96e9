//! SQLite backend adapter over `rusqlite`.
//!
//! `rusqlite::Connection` is not `Sync`, so [`SqliteClient`] wraps it in a
//! mutex and serializes statement execution. Calls run synchronously inside
//! the async methods; the embedded engine performs no network I/O.

use crate::client::{DocumentClient, SqlRow, SqlValue, log_sql};
use crate::dialect::Dialect;
use crate::error::{DocError, DocResult};
use crate::param::SqlParam;
use rusqlite::Connection;
use rusqlite::types::{ToSqlOutput, Value, ValueRef};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

impl rusqlite::types::ToSql for SqlParam {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            SqlParam::Null => ToSqlOutput::Owned(Value::Null),
            SqlParam::Bool(b) => ToSqlOutput::Owned(Value::Integer(i64::from(*b))),
            SqlParam::Int(i) => ToSqlOutput::Owned(Value::Integer(*i)),
            SqlParam::Real(f) => ToSqlOutput::Owned(Value::Real(*f)),
            SqlParam::Text(s) => ToSqlOutput::Borrowed(ValueRef::Text(s.as_bytes())),
            // Documents and patches bind as their rendered JSON text.
            SqlParam::Json(v) => ToSqlOutput::Owned(Value::Text(v.to_string())),
            SqlParam::TextArray(_) => {
                return Err(rusqlite::Error::ToSqlConversionFailure(
                    "text arrays cannot be bound on SQLite".into(),
                ));
            }
        })
    }
}

/// A document client over an owned `rusqlite::Connection`.
pub struct SqliteClient {
    conn: Mutex<Connection>,
}

impl SqliteClient {
    /// Wrap an already-open connection.
    pub fn new(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }

    /// Open (or create) a database file.
    pub fn open(path: impl AsRef<Path>) -> DocResult<Self> {
        Ok(Self::new(Connection::open(path)?))
    }

    /// Open a fresh in-memory database.
    pub fn open_in_memory() -> DocResult<Self> {
        Ok(Self::new(Connection::open_in_memory()?))
    }

    fn lock(&self) -> DocResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| DocError::Connection("SQLite connection mutex poisoned".to_string()))
    }
}

fn convert_value(idx: usize, value: Value) -> DocResult<SqlValue> {
    Ok(match value {
        Value::Null => SqlValue::Null,
        Value::Integer(i) => SqlValue::Int(i),
        Value::Real(f) => SqlValue::Real(f),
        Value::Text(s) => SqlValue::Text(s),
        Value::Blob(_) => {
            return Err(DocError::decode(idx.to_string(), "unexpected BLOB column"));
        }
    })
}

impl DocumentClient for SqliteClient {
    fn dialect(&self) -> Dialect {
        Dialect::Sqlite
    }

    async fn query(&self, sql: &str, params: &[SqlParam]) -> DocResult<Vec<SqlRow>> {
        log_sql(Dialect::Sqlite, sql, params.len());
        let conn = self.lock()?;
        let mut stmt = conn.prepare(sql)?;
        let column_count = stmt.column_count();
        let mut rows = stmt.query(rusqlite::params_from_iter(params.iter()))?;
        let mut out = Vec::new();
        while let Some(row) = rows.next()? {
            let mut columns = Vec::with_capacity(column_count);
            for idx in 0..column_count {
                columns.push(convert_value(idx, row.get::<_, Value>(idx)?)?);
            }
            out.push(SqlRow::new(columns));
        }
        Ok(out)
    }

    async fn execute(&self, sql: &str, params: &[SqlParam]) -> DocResult<u64> {
        log_sql(Dialect::Sqlite, sql, params.len());
        let conn = self.lock()?;
        let affected = conn.execute(sql, rusqlite::params_from_iter(params.iter()))?;
        Ok(affected as u64)
    }
}
