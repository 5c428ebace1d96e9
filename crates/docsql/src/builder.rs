//! Deterministic SQL text builders for every document operation.
//!
//! Builders are pure functions from (dialect, table, predicate inputs) to
//! SQL text: no I/O, no state, and byte-identical output for identical
//! inputs. Table names are trusted and spliced verbatim; field paths are
//! validated identifiers; every value travels through a placeholder.
//!
//! Each builder documents its parameter order; the matching binder
//! functions live in [`crate::param`].

use crate::dialect::{Arity, Dialect, Op};
use crate::error::{DocError, DocResult};
use crate::field::{Field, validate_path};

/// GIN document index shape (PostgreSQL).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentIndexKind {
    /// Index the full document (`USING GIN (data)`); supports all
    /// containment and JSON-path operators.
    Full,
    /// Optimized containment-only index (`USING GIN (data jsonb_path_ops)`).
    Optimized,
}

/// The table part of an index name: `public.people` indexes as `people`.
fn table_base_name(table: &str) -> &str {
    table.rsplit('.').next().unwrap_or(table)
}

/// Render one expression item of an index column list.
///
/// PostgreSQL requires non-column expressions to be parenthesized inside
/// the list; SQLite accepts them bare.
fn index_item(dialect: Dialect, expr: &str) -> String {
    match dialect {
        Dialect::Postgres => format!("({expr})"),
        Dialect::Sqlite => expr.to_string(),
    }
}

// ==================== WHERE fragments ====================

/// Predicate matching the document key. Binds one value at `start + 1`.
pub fn where_by_id(dialect: Dialect, key_field: &str, start: usize) -> DocResult<String> {
    validate_path(key_field)?;
    Ok(format!(
        "{} = {}",
        dialect.key_expr(key_field),
        dialect.placeholder(start + 1)
    ))
}

/// The comparison expression for a field predicate.
///
/// PostgreSQL path extraction yields text, so non-text comparisons cast
/// the extracted value; SQLite extraction already carries native affinity.
fn comparison_expr(dialect: Dialect, field: &Field) -> String {
    let path = dialect.path_expr(field.path());
    match dialect {
        Dialect::Postgres => match field.values().first() {
            Some(serde_json::Value::Number(_)) => format!("({path})::double precision"),
            Some(serde_json::Value::Bool(_)) => format!("({path})::boolean"),
            _ => path,
        },
        Dialect::Sqlite => path,
    }
}

/// Predicate for a single-field comparison, with placeholders starting at
/// `start + 1`. Existence checks produce no placeholder; `Between`
/// produces two; `In` produces one per list element (`1=0` when empty).
pub fn where_by_field(dialect: Dialect, field: &Field, start: usize) -> DocResult<String> {
    let op_sql = field.op().as_sql(dialect)?;
    let expr = comparison_expr(dialect, field);
    Ok(match field.op().arity() {
        Arity::Zero => format!("{expr} {op_sql}"),
        Arity::Two => format!(
            "{expr} {op_sql} {} AND {}",
            dialect.placeholder(start + 1),
            dialect.placeholder(start + 2)
        ),
        Arity::One if field.op() == Op::In => {
            if field.values().is_empty() {
                // IN over an empty list matches nothing.
                "1=0".to_string()
            } else {
                let placeholders: Vec<String> = (0..field.values().len())
                    .map(|i| dialect.placeholder(start + 1 + i))
                    .collect();
                format!("{expr} IN ({})", placeholders.join(", "))
            }
        }
        Arity::One => format!("{expr} {op_sql} {}", dialect.placeholder(start + 1)),
    })
}

/// Containment predicate: the document is a superset of the bound shape.
/// Binds one JSON value at `start + 1`. PostgreSQL only.
pub fn where_contains(dialect: Dialect, start: usize) -> DocResult<String> {
    let op_sql = Op::Contains.as_sql(dialect)?;
    Ok(format!("data {op_sql} {}", dialect.placeholder(start + 1)))
}

/// JSON-path predicate. Binds one path string at `start + 1`.
/// PostgreSQL only.
pub fn where_json_path(dialect: Dialect, start: usize) -> DocResult<String> {
    let func = Op::JsonPath.as_sql(dialect)?;
    Ok(format!(
        "{func}(data, {}::jsonpath)",
        dialect.placeholder(start + 1)
    ))
}

// ==================== Definition (DDL) ====================

/// Idempotent document table DDL.
pub fn table_ddl(dialect: Dialect, table: &str) -> String {
    format!(
        "CREATE TABLE IF NOT EXISTS {table} (data {} NOT NULL)",
        dialect.json_type()
    )
}

/// Idempotent unique index DDL over the string-coerced document key.
///
/// This index backs the upsert in [`save`]; its expression must stay
/// identical to the save builder's conflict target.
pub fn key_index_ddl(dialect: Dialect, table: &str, key_field: &str) -> DocResult<String> {
    validate_path(key_field)?;
    Ok(format!(
        "CREATE UNIQUE INDEX IF NOT EXISTS idx_{}_key ON {table} ({})",
        table_base_name(table),
        index_item(dialect, &dialect.key_expr(key_field))
    ))
}

/// Idempotent index DDL over one or more extracted field paths.
pub fn field_index_ddl(
    dialect: Dialect,
    table: &str,
    index_name: &str,
    paths: &[&str],
) -> DocResult<String> {
    validate_path(index_name)?;
    if index_name.contains('.') {
        return Err(DocError::validation(format!(
            "Invalid index name '{index_name}'"
        )));
    }
    if paths.is_empty() {
        return Err(DocError::validation(
            "A field index requires at least one field path",
        ));
    }
    let mut items = Vec::with_capacity(paths.len());
    for path in paths {
        validate_path(path)?;
        items.push(index_item(dialect, &dialect.path_expr(path)));
    }
    Ok(format!(
        "CREATE INDEX IF NOT EXISTS {index_name} ON {table} ({})",
        items.join(", ")
    ))
}

/// Idempotent GIN document index DDL. PostgreSQL only.
pub fn document_index_ddl(
    dialect: Dialect,
    table: &str,
    kind: DocumentIndexKind,
) -> DocResult<String> {
    if !dialect.supports_json_queries() {
        return Err(DocError::unsupported(format!(
            "document indexes are not available on {dialect}"
        )));
    }
    let target = match kind {
        DocumentIndexKind::Full => "data",
        DocumentIndexKind::Optimized => "data jsonb_path_ops",
    };
    Ok(format!(
        "CREATE INDEX IF NOT EXISTS idx_{}_document ON {table} USING GIN ({target})",
        table_base_name(table)
    ))
}

// ==================== Writes ====================

/// Insert a document. Binds the payload at placeholder 1.
pub fn insert(dialect: Dialect, table: &str) -> String {
    format!(
        "INSERT INTO {table} (data) VALUES ({})",
        dialect.placeholder(1)
    )
}

/// Insert-or-replace a document, keyed by the unique key index.
/// Binds the payload at placeholder 1.
pub fn save(dialect: Dialect, table: &str, key_field: &str) -> DocResult<String> {
    validate_path(key_field)?;
    Ok(match dialect {
        Dialect::Postgres => format!(
            "INSERT INTO {table} (data) VALUES ($1) ON CONFLICT (({})) DO UPDATE SET data = EXCLUDED.data",
            dialect.key_expr(key_field)
        ),
        Dialect::Sqlite => format!("INSERT OR REPLACE INTO {table} (data) VALUES (?1)"),
    })
}

/// Full payload replacement by ID. Binds the payload, then the key.
pub fn update_by_id(dialect: Dialect, table: &str, key_field: &str) -> DocResult<String> {
    Ok(format!(
        "UPDATE {table} SET data = {} WHERE {}",
        dialect.placeholder(1),
        where_by_id(dialect, key_field, 1)?
    ))
}

/// The merge-patch assignment applied to the payload column.
fn patch_assignment(dialect: Dialect) -> String {
    match dialect {
        Dialect::Postgres => format!("data = data || {}", dialect.placeholder(1)),
        Dialect::Sqlite => format!("data = json_patch(data, json({}))", dialect.placeholder(1)),
    }
}

/// Merge-patch by ID. Binds the patch, then the key.
pub fn patch_by_id(dialect: Dialect, table: &str, key_field: &str) -> DocResult<String> {
    Ok(format!(
        "UPDATE {table} SET {} WHERE {}",
        patch_assignment(dialect),
        where_by_id(dialect, key_field, 1)?
    ))
}

/// Merge-patch by field predicate. Binds the patch, then the field values.
pub fn patch_by_field(dialect: Dialect, table: &str, field: &Field) -> DocResult<String> {
    Ok(format!(
        "UPDATE {table} SET {} WHERE {}",
        patch_assignment(dialect),
        where_by_field(dialect, field, 1)?
    ))
}

/// The remove-fields assignment; returns the SQL and how many placeholders
/// it consumed. PostgreSQL removes keys with one bound text array; SQLite
/// binds one path per removed field.
fn remove_fields_assignment(dialect: Dialect, field_count: usize) -> (String, usize) {
    match dialect {
        Dialect::Postgres => ("data = data - $1::text[]".to_string(), 1),
        Dialect::Sqlite => {
            let paths: Vec<String> = (1..=field_count).map(|n| dialect.placeholder(n)).collect();
            (
                format!("data = json_remove(data, {})", paths.join(", ")),
                field_count,
            )
        }
    }
}

/// Remove fields by ID. Binds the field names (see
/// [`crate::param::remove_fields_params`]), then the key.
pub fn remove_fields_by_id(
    dialect: Dialect,
    table: &str,
    key_field: &str,
    field_count: usize,
) -> DocResult<String> {
    let (assignment, used) = remove_fields_assignment(dialect, field_count);
    Ok(format!(
        "UPDATE {table} SET {assignment} WHERE {}",
        where_by_id(dialect, key_field, used)?
    ))
}

/// Remove fields by field predicate. Binds the field names, then the
/// predicate values.
pub fn remove_fields_by_field(
    dialect: Dialect,
    table: &str,
    field: &Field,
    field_count: usize,
) -> DocResult<String> {
    let (assignment, used) = remove_fields_assignment(dialect, field_count);
    Ok(format!(
        "UPDATE {table} SET {assignment} WHERE {}",
        where_by_field(dialect, field, used)?
    ))
}

// ==================== Reads ====================

/// Select every document.
pub fn select_all(table: &str) -> String {
    format!("SELECT data FROM {table}")
}

/// Select by ID. Binds the key.
pub fn select_by_id(dialect: Dialect, table: &str, key_field: &str) -> DocResult<String> {
    Ok(format!(
        "SELECT data FROM {table} WHERE {}",
        where_by_id(dialect, key_field, 0)?
    ))
}

/// Select by field predicate. Binds the predicate values.
pub fn select_by_field(dialect: Dialect, table: &str, field: &Field) -> DocResult<String> {
    Ok(format!(
        "SELECT data FROM {table} WHERE {}",
        where_by_field(dialect, field, 0)?
    ))
}

/// Select by containment. Binds the criteria document. PostgreSQL only.
pub fn select_by_contains(dialect: Dialect, table: &str) -> DocResult<String> {
    Ok(format!(
        "SELECT data FROM {table} WHERE {}",
        where_contains(dialect, 0)?
    ))
}

/// Select by JSON path. Binds the path. PostgreSQL only.
pub fn select_by_json_path(dialect: Dialect, table: &str) -> DocResult<String> {
    Ok(format!(
        "SELECT data FROM {table} WHERE {}",
        where_json_path(dialect, 0)?
    ))
}

/// Count every document.
pub fn count_all(table: &str) -> String {
    format!("SELECT COUNT(*) FROM {table}")
}

/// Count by ID (0 or 1). Binds the key.
pub fn count_by_id(dialect: Dialect, table: &str, key_field: &str) -> DocResult<String> {
    Ok(format!(
        "SELECT COUNT(*) FROM {table} WHERE {}",
        where_by_id(dialect, key_field, 0)?
    ))
}

/// Count by field predicate. Binds the predicate values.
pub fn count_by_field(dialect: Dialect, table: &str, field: &Field) -> DocResult<String> {
    Ok(format!(
        "SELECT COUNT(*) FROM {table} WHERE {}",
        where_by_field(dialect, field, 0)?
    ))
}

/// Count by containment. PostgreSQL only.
pub fn count_by_contains(dialect: Dialect, table: &str) -> DocResult<String> {
    Ok(format!(
        "SELECT COUNT(*) FROM {table} WHERE {}",
        where_contains(dialect, 0)?
    ))
}

/// Count by JSON path. PostgreSQL only.
pub fn count_by_json_path(dialect: Dialect, table: &str) -> DocResult<String> {
    Ok(format!(
        "SELECT COUNT(*) FROM {table} WHERE {}",
        where_json_path(dialect, 0)?
    ))
}

fn exists_stmt(table: &str, predicate: &str) -> String {
    format!("SELECT EXISTS (SELECT 1 FROM {table} WHERE {predicate})")
}

/// Existence by ID. Binds the key.
pub fn exists_by_id(dialect: Dialect, table: &str, key_field: &str) -> DocResult<String> {
    Ok(exists_stmt(table, &where_by_id(dialect, key_field, 0)?))
}

/// Existence by field predicate. Binds the predicate values.
pub fn exists_by_field(dialect: Dialect, table: &str, field: &Field) -> DocResult<String> {
    Ok(exists_stmt(table, &where_by_field(dialect, field, 0)?))
}

/// Existence by containment. PostgreSQL only.
pub fn exists_by_contains(dialect: Dialect, table: &str) -> DocResult<String> {
    Ok(exists_stmt(table, &where_contains(dialect, 0)?))
}

/// Existence by JSON path. PostgreSQL only.
pub fn exists_by_json_path(dialect: Dialect, table: &str) -> DocResult<String> {
    Ok(exists_stmt(table, &where_json_path(dialect, 0)?))
}

// ==================== Deletes ====================

/// Delete by ID. Binds the key.
pub fn delete_by_id(dialect: Dialect, table: &str, key_field: &str) -> DocResult<String> {
    Ok(format!(
        "DELETE FROM {table} WHERE {}",
        where_by_id(dialect, key_field, 0)?
    ))
}

/// Delete by field predicate. Binds the predicate values.
pub fn delete_by_field(dialect: Dialect, table: &str, field: &Field) -> DocResult<String> {
    Ok(format!(
        "DELETE FROM {table} WHERE {}",
        where_by_field(dialect, field, 0)?
    ))
}

/// Delete by containment. PostgreSQL only.
pub fn delete_by_contains(dialect: Dialect, table: &str) -> DocResult<String> {
    Ok(format!(
        "DELETE FROM {table} WHERE {}",
        where_contains(dialect, 0)?
    ))
}

/// Delete by JSON path. PostgreSQL only.
pub fn delete_by_json_path(dialect: Dialect, table: &str) -> DocResult<String> {
    Ok(format!(
        "DELETE FROM {table} WHERE {}",
        where_json_path(dialect, 0)?
    ))
}
