//! PostgreSQL backend adapter over `tokio-postgres`.
//!
//! Implements [`DocumentClient`] for `tokio_postgres::Client` and
//! `tokio_postgres::Transaction`, so document operations compose with
//! caller-managed transactions unchanged. The caller owns the connection
//! and its lifetime; this adapter only runs statements against it.

use crate::client::{DocumentClient, SqlRow, SqlValue, log_sql};
use crate::dialect::Dialect;
use crate::error::{DocError, DocResult};
use crate::param::SqlParam;
use bytes::{BufMut, BytesMut};
use tokio_postgres::Row;
use tokio_postgres::types::{IsNull, ToSql, Type};

impl ToSql for SqlParam {
    fn to_sql(
        &self,
        ty: &Type,
        out: &mut BytesMut,
    ) -> Result<IsNull, Box<dyn std::error::Error + Sync + Send>> {
        match self {
            SqlParam::Null => Ok(IsNull::Yes),
            SqlParam::Bool(b) if <bool as ToSql>::accepts(ty) => b.to_sql(ty, out),
            SqlParam::Int(i) if <i64 as ToSql>::accepts(ty) => i.to_sql(ty, out),
            SqlParam::Int(i) if <i32 as ToSql>::accepts(ty) => i32::try_from(*i)?.to_sql(ty, out),
            SqlParam::Int(i) if <f64 as ToSql>::accepts(ty) => (*i as f64).to_sql(ty, out),
            SqlParam::Real(f) if <f64 as ToSql>::accepts(ty) => f.to_sql(ty, out),
            // jsonpath has no driver-side Rust type; its binary send format
            // is a version byte followed by the path text.
            SqlParam::Text(s) if *ty == Type::JSONPATH => {
                out.put_u8(1);
                out.put_slice(s.as_bytes());
                Ok(IsNull::No)
            }
            SqlParam::Text(s) if <String as ToSql>::accepts(ty) => s.to_sql(ty, out),
            SqlParam::Json(v) if <serde_json::Value as ToSql>::accepts(ty) => v.to_sql(ty, out),
            SqlParam::Json(v) if <String as ToSql>::accepts(ty) => v.to_string().to_sql(ty, out),
            SqlParam::TextArray(v) if <Vec<String> as ToSql>::accepts(ty) => v.to_sql(ty, out),
            other => Err(format!("cannot bind {other:?} as {ty}").into()),
        }
    }

    fn accepts(ty: &Type) -> bool {
        <bool as ToSql>::accepts(ty)
            || <i64 as ToSql>::accepts(ty)
            || <i32 as ToSql>::accepts(ty)
            || <f64 as ToSql>::accepts(ty)
            || <String as ToSql>::accepts(ty)
            || <serde_json::Value as ToSql>::accepts(ty)
            || <Vec<String> as ToSql>::accepts(ty)
            || *ty == Type::JSONPATH
    }

    tokio_postgres::types::to_sql_checked!();
}

fn pg_params(params: &[SqlParam]) -> Vec<&(dyn ToSql + Sync)> {
    params.iter().map(|p| p as &(dyn ToSql + Sync)).collect()
}

fn convert_row(row: &Row) -> DocResult<SqlRow> {
    let mut columns = Vec::with_capacity(row.len());
    for (idx, col) in row.columns().iter().enumerate() {
        let ty = col.type_();
        let decode = |e: tokio_postgres::Error| DocError::decode(col.name(), e.to_string());
        let value = if *ty == Type::BOOL {
            row.try_get::<_, Option<bool>>(idx)
                .map_err(decode)?
                .map(SqlValue::Bool)
        } else if *ty == Type::INT2 {
            row.try_get::<_, Option<i16>>(idx)
                .map_err(decode)?
                .map(|v| SqlValue::Int(v.into()))
        } else if *ty == Type::INT4 {
            row.try_get::<_, Option<i32>>(idx)
                .map_err(decode)?
                .map(|v| SqlValue::Int(v.into()))
        } else if *ty == Type::INT8 {
            row.try_get::<_, Option<i64>>(idx)
                .map_err(decode)?
                .map(SqlValue::Int)
        } else if *ty == Type::FLOAT4 {
            row.try_get::<_, Option<f32>>(idx)
                .map_err(decode)?
                .map(|v| SqlValue::Real(v.into()))
        } else if *ty == Type::FLOAT8 {
            row.try_get::<_, Option<f64>>(idx)
                .map_err(decode)?
                .map(SqlValue::Real)
        } else if *ty == Type::TEXT || *ty == Type::VARCHAR || *ty == Type::BPCHAR {
            row.try_get::<_, Option<String>>(idx)
                .map_err(decode)?
                .map(SqlValue::Text)
        } else if *ty == Type::JSON || *ty == Type::JSONB {
            row.try_get::<_, Option<serde_json::Value>>(idx)
                .map_err(decode)?
                .map(SqlValue::Json)
        } else {
            return Err(DocError::decode(
                col.name(),
                format!("unsupported column type {ty}"),
            ));
        };
        columns.push(value.unwrap_or(SqlValue::Null));
    }
    Ok(SqlRow::new(columns))
}

impl DocumentClient for tokio_postgres::Client {
    fn dialect(&self) -> Dialect {
        Dialect::Postgres
    }

    async fn query(&self, sql: &str, params: &[SqlParam]) -> DocResult<Vec<SqlRow>> {
        log_sql(Dialect::Postgres, sql, params.len());
        let refs = pg_params(params);
        let rows = tokio_postgres::Client::query(self, sql, &refs).await?;
        rows.iter().map(convert_row).collect()
    }

    async fn execute(&self, sql: &str, params: &[SqlParam]) -> DocResult<u64> {
        log_sql(Dialect::Postgres, sql, params.len());
        let refs = pg_params(params);
        Ok(tokio_postgres::Client::execute(self, sql, &refs).await?)
    }
}

impl DocumentClient for tokio_postgres::Transaction<'_> {
    fn dialect(&self) -> Dialect {
        Dialect::Postgres
    }

    async fn query(&self, sql: &str, params: &[SqlParam]) -> DocResult<Vec<SqlRow>> {
        log_sql(Dialect::Postgres, sql, params.len());
        let refs = pg_params(params);
        let rows = tokio_postgres::Transaction::query(self, sql, &refs).await?;
        rows.iter().map(convert_row).collect()
    }

    async fn execute(&self, sql: &str, params: &[SqlParam]) -> DocResult<u64> {
        log_sql(Dialect::Postgres, sql, params.len());
        let refs = pg_params(params);
        Ok(tokio_postgres::Transaction::execute(self, sql, &refs).await?)
    }
}
