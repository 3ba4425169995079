use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use schemashift_core::EnumConflictPolicy;
use schemashift_extract::{DialectKind, ExtractOptions};

/// How primary-key fields are typed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdentityPolicy {
    /// Only auto-incrementing large-integer keys keep their type; every
    /// other key becomes a generated string identity.
    #[default]
    Uuid,
    /// Auto-incrementing integer and large-integer keys keep their type.
    Preserve,
}

/// Values written into the document header.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HeaderOptions {
    pub title: String,
    /// Label identifying the conversion run.
    pub run_label: String,
    pub client_provider: String,
    pub provider: String,
    /// Environment variable holding the connection URL.
    pub url_env: String,
}

impl Default for HeaderOptions {
    fn default() -> Self {
        Self {
            title: "Prisma Schema (auto-generated)".to_string(),
            run_label: "schemashift".to_string(),
            client_provider: "prisma-client-js".to_string(),
            provider: "postgresql".to_string(),
            url_env: "DATABASE_URL".to_string(),
        }
    }
}

/// Options that control a conversion run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConvertOptions {
    pub dialect: DialectKind,
    pub include_indexes: bool,
    pub identity: IdentityPolicy,
    pub enum_conflict: EnumConflictPolicy,
    /// Append the conventional audit fields to every model.
    pub audit_fields: bool,
    /// Table identifiers that never produce a model.
    pub exclude: BTreeSet<String>,
    /// Width of the field-name column in model blocks.
    pub column_width: usize,
    pub header: HeaderOptions,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            dialect: DialectKind::Auto,
            include_indexes: true,
            identity: IdentityPolicy::Uuid,
            enum_conflict: EnumConflictPolicy::Error,
            audit_fields: true,
            exclude: BTreeSet::new(),
            column_width: 20,
            header: HeaderOptions::default(),
        }
    }
}

impl ConvertOptions {
    pub fn extract_options(&self) -> ExtractOptions {
        ExtractOptions {
            dialect: self.dialect,
            include_indexes: self.include_indexes,
        }
    }
}
