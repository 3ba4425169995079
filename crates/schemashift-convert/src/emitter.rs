use schemashift_core::{EnumDeclaration, EnumRegistry, ModelDeclaration, is_identifier, member_name};

use crate::options::HeaderOptions;

const RULE: &str =
    "// ============================================================================";

/// Serializes enums and models into the target document.
#[derive(Debug, Clone)]
pub struct SchemaEmitter<'a> {
    header: &'a HeaderOptions,
    column_width: usize,
}

impl<'a> SchemaEmitter<'a> {
    pub fn new(header: &'a HeaderOptions, column_width: usize) -> Self {
        Self {
            header,
            column_width,
        }
    }

    /// Render the full document.
    ///
    /// Enums come out in registry (canonical name) order and models in the
    /// order given. The text ends with exactly one newline.
    pub fn emit(
        &self,
        enums: &EnumRegistry,
        models: &[ModelDeclaration],
        excluded_count: usize,
    ) -> String {
        let mut lines = Vec::new();
        self.push_header(&mut lines, models.len(), excluded_count);

        lines.push(String::new());
        lines.push("// Enums".to_string());
        for declaration in enums.iter() {
            lines.push(String::new());
            push_enum(&mut lines, declaration);
        }

        lines.push(String::new());
        lines.push("// Models".to_string());
        for model in models {
            lines.push(String::new());
            self.push_model(&mut lines, model);
        }

        let mut document = lines.join("\n");
        document.push('\n');
        document
    }

    fn push_header(&self, lines: &mut Vec<String>, model_count: usize, excluded_count: usize) {
        let header = self.header;
        lines.push(RULE.to_string());
        lines.push(format!("// {}", header.title));
        lines.push(RULE.to_string());
        lines.push("// Generated by: schemashift".to_string());
        lines.push(format!("// Run: {}", header.run_label));
        lines.push(format!(
            "// Models: {model_count} (excluding {excluded_count} tables)"
        ));
        lines.push(RULE.to_string());
        lines.push(String::new());
        lines.push("generator client {".to_string());
        lines.push(format!("  provider = \"{}\"", header.client_provider));
        lines.push("}".to_string());
        lines.push(String::new());
        lines.push("datasource db {".to_string());
        lines.push(format!("  provider = \"{}\"", header.provider));
        lines.push(format!("  url      = env(\"{}\")", header.url_env));
        lines.push("}".to_string());
    }

    fn push_model(&self, lines: &mut Vec<String>, model: &ModelDeclaration) {
        let width = self.column_width;
        lines.push(format!("/// {}", model.name));
        lines.push(format!("model {} {{", model.name));
        for field in &model.fields {
            lines.push(format!("  {:<width$} {}", field.name, field.definition()));
        }
        for index in &model.indexes {
            lines.push(format!("  {index}"));
        }
        lines.push(format!("  @@map(\"{}\")", model.table_name));
        lines.push("}".to_string());
    }
}

fn push_enum(lines: &mut Vec<String>, declaration: &EnumDeclaration) {
    lines.push(format!("enum {} {{", declaration.name));
    for value in &declaration.values {
        if is_identifier(value) {
            lines.push(format!("  {value}"));
        } else {
            lines.push(format!(
                "  {} @map(\"{}\")",
                member_name(value),
                value.replace('"', "\\\"")
            ));
        }
    }
    lines.push("}".to_string());
}

#[cfg(test)]
mod tests {
    use super::*;
    use schemashift_core::{
        Attribute, EnumConflictPolicy, IndexDeclaration, IndexKind, MappedField, TargetType,
    };

    fn sample_model() -> ModelDeclaration {
        ModelDeclaration {
            name: "Users".to_string(),
            source_ident: "users".to_string(),
            table_name: "users".to_string(),
            fields: vec![
                MappedField::new("id", TargetType::BigInt)
                    .with_attribute(Attribute::Id)
                    .with_attribute(Attribute::DefaultAutoincrement),
                MappedField::new("email", TargetType::String)
                    .with_attribute(Attribute::VarChar(320))
                    .with_attribute(Attribute::Unique),
            ],
            indexes: vec![IndexDeclaration {
                kind: IndexKind::Index,
                name: Some("users_email_idx".to_string()),
                fields: vec!["email".to_string()],
            }],
        }
    }

    #[test]
    fn emits_header_enums_and_models() {
        let mut enums = EnumRegistry::new(EnumConflictPolicy::Error);
        enums
            .register("status", &["active".to_string(), "in-review".to_string()])
            .unwrap();
        let header = HeaderOptions::default();
        let document = SchemaEmitter::new(&header, 20).emit(&enums, &[sample_model()], 2);

        let expected = [
            RULE,
            "// Prisma Schema (auto-generated)",
            RULE,
            "// Generated by: schemashift",
            "// Run: schemashift",
            "// Models: 1 (excluding 2 tables)",
            RULE,
            "",
            "generator client {",
            "  provider = \"prisma-client-js\"",
            "}",
            "",
            "datasource db {",
            "  provider = \"postgresql\"",
            "  url      = env(\"DATABASE_URL\")",
            "}",
            "",
            "// Enums",
            "",
            "enum Status {",
            "  active",
            "  in_review @map(\"in-review\")",
            "}",
            "",
            "// Models",
            "",
            "/// Users",
            "model Users {",
            "  id                   BigInt @id @default(autoincrement())",
            "  email                String @db.VarChar(320) @unique",
            "  @@index([email], map: \"users_email_idx\")",
            "  @@map(\"users\")",
            "}",
            "",
        ]
        .join("\n");

        pretty_assertions::assert_eq!(document, expected);
    }

    #[test]
    fn empty_sections_keep_their_comment_line() {
        let header = HeaderOptions::default();
        let document = SchemaEmitter::new(&header, 20).emit(&EnumRegistry::default(), &[], 0);

        assert!(document.ends_with("// Enums\n\n// Models\n"));
        assert!(!document.ends_with("\n\n"));
    }

    #[test]
    fn column_width_is_configurable() {
        let header = HeaderOptions::default();
        let document =
            SchemaEmitter::new(&header, 4).emit(&EnumRegistry::default(), &[sample_model()], 0);

        assert!(document.contains("\n  id   BigInt @id"));
        assert!(document.contains("\n  email String @db.VarChar(320) @unique"));
    }
}
