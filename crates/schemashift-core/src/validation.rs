use std::collections::{BTreeMap, BTreeSet};

use crate::error::{Error, Result};
use crate::target::ModelDeclaration;

/// Validate internal consistency of an assembled model set.
///
/// This checks:
/// - duplicate model names and duplicate table mappings
/// - duplicate field names within a model
/// - index columns refer to fields of the same model
pub fn validate_models(models: &[ModelDeclaration]) -> Result<()> {
    let mut names = BTreeSet::new();
    let mut tables: BTreeMap<&str, &str> = BTreeMap::new();

    for model in models {
        if !names.insert(model.name.as_str()) {
            return Err(Error::InvalidModel(format!(
                "duplicate model name: {}",
                model.name
            )));
        }

        if let Some(previous) = tables.insert(model.table_name.as_str(), model.name.as_str()) {
            return Err(Error::InvalidModel(format!(
                "table {} is mapped by both {} and {}",
                model.table_name, previous, model.name
            )));
        }

        let mut fields = BTreeSet::new();
        for field in &model.fields {
            if !fields.insert(field.name.as_str()) {
                return Err(Error::InvalidModel(format!(
                    "duplicate field name: {}.{}",
                    model.name, field.name
                )));
            }
        }

        for index in &model.indexes {
            for column in &index.fields {
                if !fields.contains(column.as_str()) {
                    return Err(Error::InvalidModel(format!(
                        "index column not found: {}.{}",
                        model.name, column
                    )));
                }
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::target::{IndexDeclaration, IndexKind, MappedField, TargetType};

    fn model(name: &str, table: &str, fields: &[&str]) -> ModelDeclaration {
        ModelDeclaration {
            name: name.to_string(),
            source_ident: table.to_string(),
            table_name: table.to_string(),
            fields: fields
                .iter()
                .map(|field| MappedField::new(*field, TargetType::String))
                .collect(),
            indexes: Vec::new(),
        }
    }

    #[test]
    fn accepts_consistent_models() {
        let mut users = model("Users", "users", &["id", "email"]);
        users.indexes.push(IndexDeclaration {
            kind: IndexKind::Index,
            name: None,
            fields: vec!["email".to_string()],
        });

        assert!(validate_models(&[users, model("Stores", "stores", &["id"])]).is_ok());
    }

    #[test]
    fn rejects_duplicate_fields() {
        let err = validate_models(&[model("Users", "users", &["id", "id"])]).unwrap_err();
        assert!(err.to_string().contains("duplicate field name: Users.id"));
    }

    #[test]
    fn rejects_duplicate_models() {
        let err = validate_models(&[
            model("Users", "users", &["id"]),
            model("Users", "users_archive", &["id"]),
        ])
        .unwrap_err();
        assert!(err.to_string().contains("duplicate model name"));
    }

    #[test]
    fn rejects_shared_table_mapping() {
        let err = validate_models(&[
            model("Users", "users", &["id"]),
            model("Accounts", "users", &["id"]),
        ])
        .unwrap_err();
        assert!(err.to_string().contains("mapped by both Users and Accounts"));
    }

    #[test]
    fn rejects_unknown_index_columns() {
        let mut users = model("Users", "users", &["id"]);
        users.indexes.push(IndexDeclaration {
            kind: IndexKind::Unique,
            name: Some("users_email_idx".to_string()),
            fields: vec!["email".to_string()],
        });

        let err = validate_models(&[users]).unwrap_err();
        assert!(err.to_string().contains("index column not found: Users.email"));
    }
}
