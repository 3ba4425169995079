use serde::{Deserialize, Serialize};

use crate::dialect::DialectKind;

/// Options that control how extraction behaves.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractOptions {
    pub dialect: DialectKind,
    /// Capture the index section that may follow a table's field object.
    pub include_indexes: bool,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            dialect: DialectKind::Auto,
            include_indexes: true,
        }
    }
}
