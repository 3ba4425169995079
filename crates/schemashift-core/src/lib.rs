//! Core contracts and helpers for schemashift.
//!
//! This crate defines the source-side declarations produced by extraction,
//! the target-side model types consumed by emission, the enum registry, and
//! validation shared across the converter and the CLI.

pub mod enums;
pub mod error;
pub mod naming;
pub mod source;
pub mod target;
pub mod validation;

pub use enums::{EnumConflict, EnumConflictPolicy, EnumRegistry};
pub use error::{Error, Result};
pub use naming::{is_identifier, member_name, pascal_case, sanitize_identifier};
pub use source::{ColumnKind, FieldDeclaration, SkippedLine, TableDeclaration};
pub use target::{
    Attribute, EnumDeclaration, IndexDeclaration, IndexKind, MappedField, ModelDeclaration,
    TargetType,
};
pub use validation::validate_models;

/// Field names treated as audit columns, in injection order.
pub const AUDIT_FIELD_NAMES: [&str; 4] = ["createdAt", "updatedAt", "createdBy", "updatedBy"];
