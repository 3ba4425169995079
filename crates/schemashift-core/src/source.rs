use serde::{Deserialize, Serialize};

/// A table block recognised in the source document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableDeclaration {
    /// Identifier the table is bound to (e.g. `memberGroup`).
    pub ident: String,
    /// Declared table name literal (e.g. `member_group`).
    pub table_name: String,
    /// 1-based line of the declaration header.
    pub line: usize,
    /// Field declarations in document order.
    pub fields: Vec<FieldDeclaration>,
    /// Verbatim text of the trailing index section, when present.
    pub index_block: Option<String>,
    /// Lines of the index section that contain index-defining calls.
    pub index_descriptors: Vec<String>,
}

/// One `name: expression` entry of a table's field object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDeclaration {
    pub name: String,
    /// Raw type/constraint expression, trimmed.
    pub expression: String,
    pub line: usize,
}

/// A field-object entry that did not have the `name: expression` shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedLine {
    /// Identifier of the enclosing table, or empty when outside any table.
    pub table: String,
    pub line: usize,
    pub text: String,
}

/// Column family recognised from the leading call of a column expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnKind {
    Integer,
    BigInt,
    /// Integer column with an implied auto-increment.
    Serial,
    /// Large-integer column with an implied auto-increment.
    BigSerial,
    VarChar,
    Char,
    Text,
    Boolean,
    Decimal,
    Json,
    Timestamp,
    Enum,
    Uuid,
}

impl ColumnKind {
    /// Returns true for the large-integer family.
    pub fn is_large_integer(self) -> bool {
        matches!(self, ColumnKind::BigInt | ColumnKind::BigSerial)
    }

    /// Returns true for integer kinds that auto-increment without a marker.
    pub fn implies_autoincrement(self) -> bool {
        matches!(self, ColumnKind::Serial | ColumnKind::BigSerial)
    }
}
