//! Extraction of table declarations from source schema documents.

pub mod dialect;
pub mod expr;
pub mod extractor;
pub mod options;

pub use dialect::{Dialect, DialectKind, MySqlDialect, PgDialect, resolve_dialect};
pub use expr::{Call, ColumnExpr, ExprError, Value, parse_column_expr};
pub use extractor::{Extraction, extract_tables};
pub use options::ExtractOptions;
