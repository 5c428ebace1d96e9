//! The shared execution pipeline.
//!
//! A [`Query`] pairs SQL text with its ordered parameters and runs against
//! any [`DocumentClient`], producing a list, an optional single value, a
//! scalar, or an affected-row count. Document operations and arbitrary
//! caller-supplied SQL go through the same pipeline; there is no second
//! execution path.
//!
//! Failure semantics: one statement, no retries. Backend and mapping
//! errors propagate unmodified.

use crate::client::{DocumentClient, FromSqlValue, SqlRow};
use crate::error::{DocError, DocResult};
use crate::param::SqlParam;
use serde::de::DeserializeOwned;

/// Map the payload column of a row into a typed document.
pub fn from_document<T: DeserializeOwned>(row: &SqlRow) -> DocResult<T> {
    let value = row.get(0)?.as_json()?;
    serde_json::from_value(value).map_err(|e| DocError::decode("data", e.to_string()))
}

/// A SQL statement with ordered bound parameters.
///
/// Use this directly when you already have SQL text and want the typed
/// pipeline; the document store builds its statements through the same type.
#[must_use]
pub struct Query {
    sql: String,
    params: Vec<SqlParam>,
}

/// Create a new [`Query`] from a complete SQL string.
pub fn query(sql: impl Into<String>) -> Query {
    Query::new(sql)
}

impl Query {
    /// Create a new query.
    pub fn new(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            params: Vec::new(),
        }
    }

    /// Bind a parameter value.
    ///
    /// This does not modify the SQL string; it only appends the value to
    /// the parameter list. The SQL must already contain the matching
    /// placeholder (`$n` or `?n` depending on the backend).
    pub fn bind(mut self, param: SqlParam) -> Self {
        self.params.push(param);
        self
    }

    /// Bind every parameter from an iterator, in order.
    pub fn bind_all(mut self, params: impl IntoIterator<Item = SqlParam>) -> Self {
        self.params.extend(params);
        self
    }

    /// Access the SQL string.
    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// Access the bound parameters in placeholder order.
    pub fn params(&self) -> &[SqlParam] {
        &self.params
    }

    // ==================== Execution ====================

    /// Execute and map every returned row, preserving row order.
    pub async fn fetch_all<T>(
        &self,
        conn: &impl DocumentClient,
        map: impl Fn(&SqlRow) -> DocResult<T>,
    ) -> DocResult<Vec<T>> {
        let rows = conn.query(&self.sql, &self.params).await?;
        rows.iter().map(map).collect()
    }

    /// Execute and map the first row, if any.
    ///
    /// Multiple matching rows are not an error; only the first is surfaced.
    pub async fn fetch_opt<T>(
        &self,
        conn: &impl DocumentClient,
        map: impl Fn(&SqlRow) -> DocResult<T>,
    ) -> DocResult<Option<T>> {
        let row = conn.query_opt(&self.sql, &self.params).await?;
        row.as_ref().map(map).transpose()
    }

    /// Execute and deserialize every row's payload column into `T`.
    pub async fn fetch_all_as<T: DeserializeOwned>(
        &self,
        conn: &impl DocumentClient,
    ) -> DocResult<Vec<T>> {
        self.fetch_all(conn, from_document::<T>).await
    }

    /// Execute and deserialize the first row's payload column, if any.
    pub async fn fetch_opt_as<T: DeserializeOwned>(
        &self,
        conn: &impl DocumentClient,
    ) -> DocResult<Option<T>> {
        self.fetch_opt(conn, from_document::<T>).await
    }

    /// Execute and read the first column of the first row, if any.
    pub async fn fetch_scalar_opt<T: FromSqlValue>(
        &self,
        conn: &impl DocumentClient,
    ) -> DocResult<Option<T>> {
        let row = conn.query_opt(&self.sql, &self.params).await?;
        row.map(|r| T::from_sql_value(r.get(0)?)).transpose()
    }

    /// Execute and read the first column of the first row, or the type's
    /// default when no row was returned.
    pub async fn fetch_scalar_or_default<T: FromSqlValue + Default>(
        &self,
        conn: &impl DocumentClient,
    ) -> DocResult<T> {
        Ok(self.fetch_scalar_opt(conn).await?.unwrap_or_default())
    }

    /// Execute and return the affected-row count.
    pub async fn execute(&self, conn: &impl DocumentClient) -> DocResult<u64> {
        conn.execute(&self.sql, &self.params).await
    }
}
