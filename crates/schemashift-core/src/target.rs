use std::fmt;

use serde::{Deserialize, Serialize};

/// Scalar or enum type of a target field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum TargetType {
    Int,
    BigInt,
    String,
    Boolean,
    Decimal,
    Json,
    DateTime,
    /// Reference to a registered enum by canonical name.
    Enum(String),
    /// No mapping rule matched; rendered as a nullable string.
    Unmapped { raw: String },
}

impl TargetType {
    /// Type name as written in the target document, without the optional suffix.
    pub fn name(&self) -> &str {
        match self {
            TargetType::Int => "Int",
            TargetType::BigInt => "BigInt",
            TargetType::String | TargetType::Unmapped { .. } => "String",
            TargetType::Boolean => "Boolean",
            TargetType::Decimal => "Decimal",
            TargetType::Json => "Json",
            TargetType::DateTime => "DateTime",
            TargetType::Enum(name) => name,
        }
    }

    pub fn is_unmapped(&self) -> bool {
        matches!(self, TargetType::Unmapped { .. })
    }
}

/// Field-level attribute in the target dialect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Attribute {
    Id,
    DefaultAutoincrement,
    DefaultUuid,
    DefaultInt(String),
    DefaultString(String),
    DefaultBool(bool),
    DefaultDecimal(String),
    /// Default referencing one of the field's enum values.
    DefaultEnum(String),
    DefaultNow,
    /// `@default(now())` combined with `@updatedAt`.
    DefaultNowUpdatedAt,
    UpdatedAt,
    Unique,
    VarChar(u32),
    Char(u32),
    DecimalPrecision(u32, u32),
    Uuid,
    /// Column name in the database when it differs from the field name.
    Map(String),
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Attribute::Id => write!(f, "@id"),
            Attribute::DefaultAutoincrement => write!(f, "@default(autoincrement())"),
            Attribute::DefaultUuid => write!(f, "@default(uuid())"),
            Attribute::DefaultInt(value)
            | Attribute::DefaultDecimal(value)
            | Attribute::DefaultEnum(value) => write!(f, "@default({value})"),
            Attribute::DefaultString(value) => {
                write!(f, "@default(\"{}\")", escape_string(value))
            }
            Attribute::DefaultBool(value) => write!(f, "@default({value})"),
            Attribute::DefaultNow => write!(f, "@default(now())"),
            Attribute::DefaultNowUpdatedAt => write!(f, "@default(now()) @updatedAt"),
            Attribute::UpdatedAt => write!(f, "@updatedAt"),
            Attribute::Unique => write!(f, "@unique"),
            Attribute::VarChar(length) => write!(f, "@db.VarChar({length})"),
            Attribute::Char(length) => write!(f, "@db.Char({length})"),
            Attribute::DecimalPrecision(precision, scale) => {
                write!(f, "@db.Decimal({precision}, {scale})")
            }
            Attribute::Uuid => write!(f, "@db.Uuid"),
            Attribute::Map(column) => write!(f, "@map(\"{}\")", escape_string(column)),
        }
    }
}

/// A field converted to the target dialect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappedField {
    pub name: String,
    pub field_type: TargetType,
    pub attributes: Vec<Attribute>,
    optional: bool,
}

impl MappedField {
    /// Create a required field with no attributes.
    pub fn new(name: impl Into<String>, field_type: TargetType) -> Self {
        Self {
            name: name.into(),
            field_type,
            attributes: Vec::new(),
            optional: false,
        }
    }

    pub fn with_attribute(mut self, attribute: Attribute) -> Self {
        self.attributes.push(attribute);
        self
    }

    /// Mark the field optional. Identity fields stay required.
    pub fn mark_optional(&mut self) {
        if !self.is_identity() {
            self.optional = true;
        }
    }

    pub fn optional(mut self) -> Self {
        self.mark_optional();
        self
    }

    pub fn is_optional(&self) -> bool {
        self.optional
    }

    pub fn is_identity(&self) -> bool {
        self.attributes.contains(&Attribute::Id)
    }

    /// Type name with the optional suffix applied.
    pub fn type_expr(&self) -> String {
        if self.optional {
            format!("{}?", self.field_type.name())
        } else {
            self.field_type.name().to_string()
        }
    }

    /// Type expression followed by the attributes, e.g. `String? @unique`.
    pub fn definition(&self) -> String {
        let mut parts = vec![self.type_expr()];
        parts.extend(self.attributes.iter().map(ToString::to_string));
        parts.join(" ")
    }
}

/// Kind of model-level index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndexKind {
    Index,
    Unique,
}

/// Model-level index derived from an index descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexDeclaration {
    pub kind: IndexKind,
    pub name: Option<String>,
    pub fields: Vec<String>,
}

impl fmt::Display for IndexDeclaration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let keyword = match self.kind {
            IndexKind::Index => "@@index",
            IndexKind::Unique => "@@unique",
        };
        write!(f, "{keyword}([{}]", self.fields.join(", "))?;
        if let Some(name) = &self.name {
            write!(f, ", map: \"{}\"", escape_string(name))?;
        }
        write!(f, ")")
    }
}

/// A model produced from one table declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelDeclaration {
    pub name: String,
    /// Source table identifier the model was derived from.
    pub source_ident: String,
    /// Declared table name, emitted as the mapping annotation.
    pub table_name: String,
    pub fields: Vec<MappedField>,
    pub indexes: Vec<IndexDeclaration>,
}

impl ModelDeclaration {
    pub fn field(&self, name: &str) -> Option<&MappedField> {
        self.fields.iter().find(|field| field.name == name)
    }
}

/// Enumeration registered under its canonical name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumDeclaration {
    pub name: String,
    /// Distinct values in first-seen order.
    pub values: Vec<String>,
}

fn escape_string(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}
