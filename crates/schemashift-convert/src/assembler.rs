use std::collections::BTreeSet;

use regex::Regex;

use schemashift_core::{
    Attribute, IndexDeclaration, IndexKind, MappedField, ModelDeclaration,
    TableDeclaration, TargetType, pascal_case,
};

const INDEX_PATTERN: &str =
    r#"\b(uniqueIndex|index)\(\s*(?:"([^"]*)"|'([^']*)')?\s*\)\s*\.on\(([^)]*)\)"#;

/// Output of assembling one table.
#[derive(Debug, Clone)]
pub struct AssembledModel {
    pub model: ModelDeclaration,
    /// Index descriptors that did not have the `index("name").on(...)` shape.
    pub unparsed_indexes: Vec<String>,
}

/// Composes mapped fields into models and applies the table-skip policy.
#[derive(Debug)]
pub struct ModelAssembler {
    exclude: BTreeSet<String>,
    audit_fields: bool,
    index_pattern: Regex,
}

impl ModelAssembler {
    pub fn new(exclude: &BTreeSet<String>, audit_fields: bool) -> Result<Self, regex::Error> {
        Ok(Self {
            exclude: exclude.clone(),
            audit_fields,
            index_pattern: Regex::new(INDEX_PATTERN)?,
        })
    }

    /// Whether the table is on the exclusion list.
    pub fn excludes(&self, table: &TableDeclaration) -> bool {
        self.exclude.contains(&table.ident)
    }

    /// Build the model for `table`, or `None` when the table is excluded.
    pub fn assemble(
        &self,
        table: &TableDeclaration,
        fields: Vec<MappedField>,
    ) -> Option<AssembledModel> {
        if self.excludes(table) {
            return None;
        }

        let fields = if self.audit_fields {
            inject_audit_fields(fields)
        } else {
            fields
        };

        let mut indexes = Vec::new();
        let mut unparsed_indexes = Vec::new();
        for descriptor in &table.index_descriptors {
            let parsed = self.parse_indexes(descriptor);
            if parsed.is_empty() {
                unparsed_indexes.push(descriptor.clone());
            }
            indexes.extend(parsed);
        }

        Some(AssembledModel {
            model: ModelDeclaration {
                name: pascal_case(&table.ident),
                source_ident: table.ident.clone(),
                table_name: table.table_name.clone(),
                fields,
                indexes,
            },
            unparsed_indexes,
        })
    }

    fn parse_indexes(&self, descriptor: &str) -> Vec<IndexDeclaration> {
        self.index_pattern
            .captures_iter(descriptor)
            .filter_map(|caps| {
                let kind = match caps.get(1)?.as_str() {
                    "uniqueIndex" => IndexKind::Unique,
                    _ => IndexKind::Index,
                };
                let name = caps
                    .get(2)
                    .or_else(|| caps.get(3))
                    .map(|name| name.as_str().to_string())
                    .filter(|name| !name.is_empty());
                let columns: Vec<&str> = caps
                    .get(4)?
                    .as_str()
                    .split(',')
                    .map(str::trim)
                    .filter(|column| !column.is_empty())
                    .collect();
                // Sort modifiers such as `t.createdAt.desc()` leave the
                // descriptor unparsed as a whole.
                let fields = columns
                    .into_iter()
                    .map(column_name)
                    .collect::<Option<Vec<_>>>()?;
                if fields.is_empty() {
                    return None;
                }
                Some(IndexDeclaration { kind, name, fields })
            })
            .collect()
    }
}

/// Column of an `.on(...)` argument: `t.column` or a bare `column`.
fn column_name(reference: &str) -> Option<String> {
    let column = match reference.split_once('.') {
        Some((table, column)) if is_js_identifier(table) => column,
        Some(_) => return None,
        None => reference,
    };
    is_js_identifier(column).then(|| column.to_string())
}

fn is_js_identifier(text: &str) -> bool {
    let mut chars = text.chars();
    chars
        .next()
        .is_some_and(|ch| ch.is_alphabetic() || ch == '_' || ch == '$')
        && chars.all(|ch| ch.is_alphanumeric() || ch == '_' || ch == '$')
}

/// The conventional audit fields in injection order.
pub fn audit_fields() -> Vec<MappedField> {
    vec![
        MappedField::new("createdAt", TargetType::DateTime).with_attribute(Attribute::DefaultNow),
        MappedField::new("updatedAt", TargetType::DateTime).with_attribute(Attribute::UpdatedAt),
        MappedField::new("createdBy", TargetType::String).optional(),
        MappedField::new("updatedBy", TargetType::String).optional(),
    ]
}

/// Append every audit field whose name is absent from `fields`.
pub fn inject_audit_fields(mut fields: Vec<MappedField>) -> Vec<MappedField> {
    for audit in audit_fields() {
        if !fields.iter().any(|field| field.name == audit.name) {
            fields.push(audit);
        }
    }
    fields
}

#[cfg(test)]
mod tests {
    use super::*;
    use schemashift_core::AUDIT_FIELD_NAMES;

    fn table(ident: &str, descriptors: &[&str]) -> TableDeclaration {
        TableDeclaration {
            ident: ident.to_string(),
            table_name: ident.to_lowercase(),
            line: 1,
            fields: Vec::new(),
            index_block: None,
            index_descriptors: descriptors.iter().map(|d| d.to_string()).collect(),
        }
    }

    fn names(fields: &[MappedField]) -> Vec<&str> {
        fields.iter().map(|field| field.name.as_str()).collect()
    }

    #[test]
    fn injects_all_audit_fields_in_order() {
        let fields = inject_audit_fields(vec![MappedField::new("id", TargetType::Int)]);

        assert_eq!(
            names(&fields),
            vec!["id", "createdAt", "updatedAt", "createdBy", "updatedBy"]
        );
        assert_eq!(fields[1].definition(), "DateTime @default(now())");
        assert_eq!(fields[2].definition(), "DateTime @updatedAt");
        assert_eq!(fields[3].definition(), "String?");
    }

    #[test]
    fn keeps_existing_audit_fields() {
        let existing = vec![
            MappedField::new("updatedBy", TargetType::String),
            MappedField::new("createdAt", TargetType::DateTime).optional(),
        ];
        let fields = inject_audit_fields(existing);

        assert_eq!(
            names(&fields),
            vec!["updatedBy", "createdAt", "updatedAt", "createdBy"]
        );
        assert_eq!(fields[1].definition(), "DateTime?");
    }

    #[test]
    fn injection_is_exactly_once() {
        let once = inject_audit_fields(Vec::new());
        let twice = inject_audit_fields(once.clone());

        assert_eq!(once, twice);
        assert_eq!(once.len(), AUDIT_FIELD_NAMES.len());
    }

    #[test]
    fn excluded_tables_produce_no_model() {
        let exclude = BTreeSet::from(["users".to_string()]);
        let assembler = ModelAssembler::new(&exclude, true).unwrap();

        assert!(assembler.assemble(&table("users", &[]), Vec::new()).is_none());
        assert!(assembler.assemble(&table("orders", &[]), Vec::new()).is_some());
    }

    #[test]
    fn model_name_is_pascal_cased_identifier() {
        let assembler = ModelAssembler::new(&BTreeSet::new(), false).unwrap();
        let assembled = assembler
            .assemble(&table("order_items", &[]), Vec::new())
            .unwrap();

        assert_eq!(assembled.model.name, "OrderItems");
        assert_eq!(assembled.model.table_name, "order_items");
        assert!(assembled.model.fields.is_empty());
    }

    #[test]
    fn derives_indexes_from_descriptors() {
        let assembler = ModelAssembler::new(&BTreeSet::new(), false).unwrap();
        let assembled = assembler
            .assemble(
                &table(
                    "orders",
                    &[
                        "userIdx: index(\"orders_user_idx\").on(table.userId)",
                        "storeCode: uniqueIndex('store_code').on(t.storeId, t.code)",
                        "pk: primaryKey({ columns: [t.a, t.b] })",
                    ],
                ),
                Vec::new(),
            )
            .unwrap();

        assert_eq!(
            assembled.model.indexes,
            vec![
                IndexDeclaration {
                    kind: IndexKind::Index,
                    name: Some("orders_user_idx".to_string()),
                    fields: vec!["userId".to_string()],
                },
                IndexDeclaration {
                    kind: IndexKind::Unique,
                    name: Some("store_code".to_string()),
                    fields: vec!["storeId".to_string(), "code".to_string()],
                },
            ]
        );
        assert_eq!(
            assembled.unparsed_indexes,
            vec!["pk: primaryKey({ columns: [t.a, t.b] })".to_string()]
        );
    }

    #[test]
    fn sorted_columns_leave_descriptor_unparsed() {
        let assembler = ModelAssembler::new(&BTreeSet::new(), false).unwrap();
        let descriptor = "createdIdx: index(\"a_created_idx\").on(t.id, t.createdAt.desc())";
        let assembled = assembler
            .assemble(&table("a", &[descriptor]), Vec::new())
            .unwrap();

        assert!(assembled.model.indexes.is_empty());
        assert_eq!(assembled.unparsed_indexes, vec![descriptor.to_string()]);
    }

    #[test]
    fn reads_plain_column_references() {
        assert_eq!(column_name("t.userId"), Some("userId".to_string()));
        assert_eq!(column_name("$id"), Some("$id".to_string()));
        assert_eq!(column_name("t.createdAt.desc("), None);
        assert_eq!(column_name("sql`lower(${t.email})`"), None);
        assert_eq!(column_name("t."), None);
    }

    #[test]
    fn unnamed_index_has_no_map() {
        let assembler = ModelAssembler::new(&BTreeSet::new(), false).unwrap();
        let indexes = assembler.parse_indexes("index().on(t.email)");

        assert_eq!(indexes.len(), 1);
        assert_eq!(indexes[0].to_string(), "@@index([email])");
    }
}
