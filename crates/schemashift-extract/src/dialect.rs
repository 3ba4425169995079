use std::fmt::Debug;

use serde::{Deserialize, Serialize};

use schemashift_core::ColumnKind;

/// Trait implemented by source dialects that can classify column calls.
pub trait Dialect: Debug + Sync {
    /// Returns the dialect identifier (e.g. `mysql`).
    fn name(&self) -> &'static str;

    /// Function that opens a table declaration (e.g. `mysqlTable`).
    fn table_constructor(&self) -> &'static str;

    /// Classify the leading call of a column expression.
    fn column_kind(&self, call: &str) -> Option<ColumnKind>;
}

/// Dialect for MySQL table definitions.
#[derive(Debug, Clone, Copy, Default)]
pub struct MySqlDialect;

impl Dialect for MySqlDialect {
    fn name(&self) -> &'static str {
        "mysql"
    }

    fn table_constructor(&self) -> &'static str {
        "mysqlTable"
    }

    fn column_kind(&self, call: &str) -> Option<ColumnKind> {
        let kind = match call {
            "int" | "tinyint" | "smallint" | "mediumint" => ColumnKind::Integer,
            "bigint" => ColumnKind::BigInt,
            "serial" => ColumnKind::BigSerial,
            "varchar" => ColumnKind::VarChar,
            "char" => ColumnKind::Char,
            "text" | "tinytext" | "mediumtext" | "longtext" => ColumnKind::Text,
            "boolean" => ColumnKind::Boolean,
            "decimal" => ColumnKind::Decimal,
            "json" => ColumnKind::Json,
            "timestamp" | "datetime" | "date" => ColumnKind::Timestamp,
            "mysqlEnum" => ColumnKind::Enum,
            _ => return None,
        };
        Some(kind)
    }
}

/// Dialect for PostgreSQL table definitions.
#[derive(Debug, Clone, Copy, Default)]
pub struct PgDialect;

impl Dialect for PgDialect {
    fn name(&self) -> &'static str {
        "pg"
    }

    fn table_constructor(&self) -> &'static str {
        "pgTable"
    }

    fn column_kind(&self, call: &str) -> Option<ColumnKind> {
        let kind = match call {
            "integer" | "smallint" => ColumnKind::Integer,
            "bigint" => ColumnKind::BigInt,
            "serial" | "smallserial" => ColumnKind::Serial,
            "bigserial" => ColumnKind::BigSerial,
            "varchar" => ColumnKind::VarChar,
            "char" => ColumnKind::Char,
            "text" => ColumnKind::Text,
            "boolean" => ColumnKind::Boolean,
            "numeric" | "decimal" => ColumnKind::Decimal,
            "json" | "jsonb" => ColumnKind::Json,
            "timestamp" | "date" => ColumnKind::Timestamp,
            "uuid" => ColumnKind::Uuid,
            _ => return None,
        };
        Some(kind)
    }
}

/// Configured dialect selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DialectKind {
    /// Pick `pg` when the document declares `pgTable` blocks, otherwise `mysql`.
    #[default]
    Auto,
    #[serde(rename = "mysql")]
    MySql,
    Pg,
}

static MYSQL: MySqlDialect = MySqlDialect;
static PG: PgDialect = PgDialect;

/// Resolve the dialect used for `source`.
pub fn resolve_dialect(kind: DialectKind, source: &str) -> &'static dyn Dialect {
    match kind {
        DialectKind::MySql => &MYSQL,
        DialectKind::Pg => &PG,
        DialectKind::Auto if source.contains("pgTable(") => &PG,
        DialectKind::Auto => &MYSQL,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_mysql_calls() {
        let dialect = MySqlDialect;
        assert_eq!(dialect.column_kind("int"), Some(ColumnKind::Integer));
        assert_eq!(dialect.column_kind("mysqlEnum"), Some(ColumnKind::Enum));
        assert_eq!(dialect.column_kind("serial"), Some(ColumnKind::BigSerial));
        assert_eq!(dialect.column_kind("integer"), None);
        assert_eq!(dialect.column_kind("point"), None);
    }

    #[test]
    fn classifies_pg_calls() {
        let dialect = PgDialect;
        assert_eq!(dialect.column_kind("integer"), Some(ColumnKind::Integer));
        assert_eq!(dialect.column_kind("serial"), Some(ColumnKind::Serial));
        assert_eq!(dialect.column_kind("numeric"), Some(ColumnKind::Decimal));
        assert_eq!(dialect.column_kind("jsonb"), Some(ColumnKind::Json));
        assert_eq!(dialect.column_kind("mysqlEnum"), None);
    }

    #[test]
    fn auto_detects_from_table_constructor() {
        let pg = r#"export const users = pgTable("users", { id: serial("id") });"#;
        let mysql = r#"export const users = mysqlTable("users", { id: int() });"#;

        assert_eq!(resolve_dialect(DialectKind::Auto, pg).name(), "pg");
        assert_eq!(resolve_dialect(DialectKind::Auto, mysql).name(), "mysql");
        assert_eq!(resolve_dialect(DialectKind::MySql, pg).name(), "mysql");
    }
}
