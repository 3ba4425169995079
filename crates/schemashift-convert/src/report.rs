use serde::{Deserialize, Serialize};

use schemashift_core::{EnumConflict, SkippedLine};

/// One generated model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelSummary {
    pub model: String,
    pub table: String,
    pub fields: usize,
}

/// A field that fell back to the unmapped type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnmappedField {
    pub model: String,
    pub field: String,
    pub expression: String,
}

/// An index descriptor that could not be turned into an index declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnparsedIndex {
    pub model: String,
    pub descriptor: String,
}

/// Machine-readable outcome of one conversion run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionReport {
    pub dialect: String,
    pub models: Vec<ModelSummary>,
    pub enums: Vec<String>,
    pub excluded_tables: Vec<String>,
    pub skipped_lines: Vec<SkippedLine>,
    pub unmapped_fields: Vec<UnmappedField>,
    pub unparsed_indexes: Vec<UnparsedIndex>,
    pub enum_conflicts: Vec<EnumConflict>,
    pub repaired_blocks: usize,
    /// SHA-256 of the emitted document, hex encoded.
    pub document_fingerprint: String,
}

/// Render the human-readable run summary.
pub fn render_summary(report: &ConversionReport) -> String {
    let mut lines = Vec::new();
    lines.push(format!("Generated {} models", report.models.len()));
    lines.push(format!("Generated {} enum types", report.enums.len()));
    if !report.excluded_tables.is_empty() {
        lines.push(format!(
            "Excluded tables: {}",
            report.excluded_tables.join(", ")
        ));
    }
    if !report.skipped_lines.is_empty() {
        lines.push(format!("Skipped lines: {}", report.skipped_lines.len()));
    }
    if !report.unmapped_fields.is_empty() {
        lines.push(format!("Unmapped fields: {}", report.unmapped_fields.len()));
        for item in &report.unmapped_fields {
            lines.push(format!(
                "  - {}.{}: {}",
                item.model, item.field, item.expression
            ));
        }
    }
    if !report.unparsed_indexes.is_empty() {
        lines.push(format!(
            "Unparsed indexes: {}",
            report.unparsed_indexes.len()
        ));
    }
    for conflict in &report.enum_conflicts {
        lines.push(format!(
            "Enum conflict: {} kept [{}], ignored [{}]",
            conflict.name,
            conflict.existing.join(", "),
            conflict.incoming.join(", ")
        ));
    }

    lines.push(String::new());
    lines.push("Generated tables:".to_string());
    for (idx, model) in report.models.iter().enumerate() {
        lines.push(format!(
            "  {:2}. {:<30} ({})",
            idx + 1,
            model.model,
            model.table
        ));
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report() -> ConversionReport {
        ConversionReport {
            dialect: "mysql".to_string(),
            models: vec![
                ModelSummary {
                    model: "Users".to_string(),
                    table: "users".to_string(),
                    fields: 7,
                },
                ModelSummary {
                    model: "OrderItems".to_string(),
                    table: "order_items".to_string(),
                    fields: 9,
                },
            ],
            enums: vec!["Role".to_string()],
            excluded_tables: Vec::new(),
            skipped_lines: Vec::new(),
            unmapped_fields: vec![UnmappedField {
                model: "Users".to_string(),
                field: "area".to_string(),
                expression: "polygon()".to_string(),
            }],
            unparsed_indexes: Vec::new(),
            enum_conflicts: Vec::new(),
            repaired_blocks: 0,
            document_fingerprint: String::new(),
        }
    }

    #[test]
    fn renders_counts_and_numbered_models() {
        let summary = render_summary(&report());
        let lines: Vec<_> = summary.lines().collect();

        assert_eq!(lines[0], "Generated 2 models");
        assert_eq!(lines[1], "Generated 1 enum types");
        assert_eq!(lines[2], "Unmapped fields: 1");
        assert_eq!(lines[3], "  - Users.area: polygon()");
        assert_eq!(lines[5], "Generated tables:");
        assert_eq!(
            lines[6],
            "   1. Users                          (users)"
        );
        assert_eq!(
            lines[7],
            "   2. OrderItems                     (order_items)"
        );
    }
}
