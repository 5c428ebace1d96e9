//! SQL dialect capability and the operator mapping table.
//!
//! Everything that differs between the two supported engines lives here:
//! placeholder syntax, the JSON payload column type, JSON path extraction,
//! and the operator table. Query builders never branch on the backend at
//! call sites; they ask the dialect.

use crate::error::{DocError, DocResult};

/// The JSON-capable SQL engines this crate generates text for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dialect {
    /// PostgreSQL with a JSONB payload column.
    Postgres,
    /// SQLite with a TEXT payload column and the JSON1 functions.
    Sqlite,
}

impl std::fmt::Display for Dialect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Dialect::Postgres => f.write_str("PostgreSQL"),
            Dialect::Sqlite => f.write_str("SQLite"),
        }
    }
}

impl Dialect {
    /// Render the `n`-th (1-based) parameter placeholder.
    pub fn placeholder(self, n: usize) -> String {
        match self {
            Dialect::Postgres => format!("${n}"),
            Dialect::Sqlite => format!("?{n}"),
        }
    }

    /// The SQL type of the payload column.
    pub fn json_type(self) -> &'static str {
        match self {
            Dialect::Postgres => "JSONB",
            Dialect::Sqlite => "TEXT",
        }
    }

    /// Whether containment (`@>`) and JSON-path predicates are available.
    pub fn supports_json_queries(self) -> bool {
        matches!(self, Dialect::Postgres)
    }

    /// Text extraction expression for a (possibly dotted) field path.
    ///
    /// PostgreSQL: `data->>'Name'` or `data#>>'{sub,field}'`.
    /// SQLite: `json_extract(data, '$.sub.field')`.
    ///
    /// The path must already be validated (see [`crate::field::validate_path`]);
    /// it is interpolated, not bound.
    pub(crate) fn path_expr(self, path: &str) -> String {
        match self {
            Dialect::Postgres => {
                if path.contains('.') {
                    format!("data#>>'{{{}}}'", path.replace('.', ","))
                } else {
                    format!("data->>'{path}'")
                }
            }
            Dialect::Sqlite => format!("json_extract(data, '$.{path}')"),
        }
    }

    /// Extraction expression for the document key, string-coerced.
    ///
    /// PostgreSQL `->>` already yields text. SQLite `json_extract` yields the
    /// native storage class, so the key is cast to TEXT to keep the
    /// string-identity contract uniform for numeric document IDs. The unique
    /// key index uses the same expression, which also keys the upsert.
    pub(crate) fn key_expr(self, key_field: &str) -> String {
        match self {
            Dialect::Postgres => self.path_expr(key_field),
            Dialect::Sqlite => format!("CAST({} AS TEXT)", self.path_expr(key_field)),
        }
    }
}

/// How many values an operator binds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    /// No value placeholder (existence checks).
    Zero,
    /// One logical value; for `In` the value is the list, expanded to one
    /// placeholder per element.
    One,
    /// Exactly two values, bound in declared order.
    Two,
}

/// The closed set of comparison operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    /// Equals
    Eq,
    /// Not equals
    Ne,
    /// Greater than
    Gt,
    /// Greater than or equal to
    Ge,
    /// Less than
    Lt,
    /// Less than or equal to
    Le,
    /// Range check, two bounds inclusive
    Between,
    /// Membership in a value list
    In,
    /// The field is present
    Exists,
    /// The field is absent
    NotExists,
    /// The document is a structural superset of a partial shape
    /// (PostgreSQL only)
    Contains,
    /// The document satisfies a JSON path expression (PostgreSQL only)
    JsonPath,
}

impl Op {
    /// The operator's SQL fragment for a dialect.
    ///
    /// For infix operators this is the token between the path expression and
    /// its placeholder(s); existence checks are complete suffixes (they bind
    /// nothing on any dialect); `Contains`/`JsonPath` fragments are combined
    /// with the payload column by the query builder.
    pub fn as_sql(self, dialect: Dialect) -> DocResult<&'static str> {
        match (self, dialect) {
            (Op::Eq, _) => Ok("="),
            (Op::Ne, _) => Ok("<>"),
            (Op::Gt, _) => Ok(">"),
            (Op::Ge, _) => Ok(">="),
            (Op::Lt, _) => Ok("<"),
            (Op::Le, _) => Ok("<="),
            (Op::Between, _) => Ok("BETWEEN"),
            (Op::In, _) => Ok("IN"),
            (Op::Exists, _) => Ok("IS NOT NULL"),
            (Op::NotExists, _) => Ok("IS NULL"),
            (Op::Contains, Dialect::Postgres) => Ok("@>"),
            (Op::JsonPath, Dialect::Postgres) => Ok("jsonb_path_exists"),
            (Op::Contains | Op::JsonPath, Dialect::Sqlite) => Err(DocError::unsupported(format!(
                "{self:?} queries are not available on {dialect}"
            ))),
        }
    }

    /// How many values this operator binds, independent of dialect.
    pub fn arity(self) -> Arity {
        match self {
            Op::Exists | Op::NotExists => Arity::Zero,
            Op::Between => Arity::Two,
            _ => Arity::One,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholders_per_dialect() {
        assert_eq!(Dialect::Postgres.placeholder(1), "$1");
        assert_eq!(Dialect::Postgres.placeholder(12), "$12");
        assert_eq!(Dialect::Sqlite.placeholder(3), "?3");
    }

    #[test]
    fn path_expr_simple_and_nested() {
        assert_eq!(Dialect::Postgres.path_expr("Value"), "data->>'Value'");
        assert_eq!(Dialect::Postgres.path_expr("sub.field"), "data#>>'{sub,field}'");
        assert_eq!(
            Dialect::Sqlite.path_expr("sub.field"),
            "json_extract(data, '$.sub.field')"
        );
    }

    #[test]
    fn key_expr_string_coerces_on_sqlite() {
        assert_eq!(Dialect::Postgres.key_expr("Id"), "data->>'Id'");
        assert_eq!(
            Dialect::Sqlite.key_expr("Id"),
            "CAST(json_extract(data, '$.Id') AS TEXT)"
        );
    }

    #[test]
    fn existence_operators_bind_nothing_on_both_dialects() {
        for dialect in [Dialect::Postgres, Dialect::Sqlite] {
            assert_eq!(Op::Exists.arity(), Arity::Zero);
            assert_eq!(Op::NotExists.arity(), Arity::Zero);
            assert_eq!(Op::Exists.as_sql(dialect).unwrap(), "IS NOT NULL");
            assert_eq!(Op::NotExists.as_sql(dialect).unwrap(), "IS NULL");
        }
    }

    #[test]
    fn between_binds_exactly_two() {
        assert_eq!(Op::Between.arity(), Arity::Two);
    }

    #[test]
    fn json_queries_rejected_on_sqlite() {
        assert!(Op::Contains.as_sql(Dialect::Sqlite).is_err());
        assert!(Op::JsonPath.as_sql(Dialect::Sqlite).is_err());
        assert!(!Dialect::Sqlite.supports_json_queries());
        assert!(Dialect::Postgres.supports_json_queries());
    }
}
