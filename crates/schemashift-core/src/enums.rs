use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::naming::{member_name, pascal_case};
use crate::target::EnumDeclaration;

/// How a divergent redefinition of an enum name is handled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnumConflictPolicy {
    /// Abort the run.
    #[default]
    Error,
    /// Keep the first definition and record the conflict.
    FirstWins,
}

/// A redefinition that was resolved under [`EnumConflictPolicy::FirstWins`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumConflict {
    pub name: String,
    pub existing: Vec<String>,
    pub incoming: Vec<String>,
}

/// Enumerations collected during type mapping, keyed by canonical name.
///
/// Iteration is ordered by canonical name; values keep first-seen order.
#[derive(Debug, Clone, Default)]
pub struct EnumRegistry {
    policy: EnumConflictPolicy,
    entries: BTreeMap<String, EnumDeclaration>,
    conflicts: Vec<EnumConflict>,
}

impl EnumRegistry {
    pub fn new(policy: EnumConflictPolicy) -> Self {
        Self {
            policy,
            entries: BTreeMap::new(),
            conflicts: Vec::new(),
        }
    }

    /// Register `values` under the PascalCase form of `name`.
    ///
    /// Returns the canonical name. A repeated name reuses the existing
    /// declaration; differing values are handled by the conflict policy.
    pub fn register(&mut self, name: &str, values: &[String]) -> Result<String> {
        let canonical = pascal_case(name);
        let incoming = distinct(values);

        match self.entries.get(&canonical) {
            Some(existing) if existing.values == incoming => {}
            Some(existing) => {
                let conflict = EnumConflict {
                    name: canonical.clone(),
                    existing: existing.values.clone(),
                    incoming,
                };
                match self.policy {
                    EnumConflictPolicy::Error => {
                        return Err(Error::EnumConflict {
                            name: conflict.name,
                            existing: conflict.existing.join(", "),
                            incoming: conflict.incoming.join(", "),
                        });
                    }
                    EnumConflictPolicy::FirstWins => self.conflicts.push(conflict),
                }
            }
            None => {
                check_member_names(&canonical, &incoming)?;
                self.entries.insert(
                    canonical.clone(),
                    EnumDeclaration {
                        name: canonical.clone(),
                        values: incoming,
                    },
                );
            }
        }

        Ok(canonical)
    }

    pub fn get(&self, canonical: &str) -> Option<&EnumDeclaration> {
        self.entries.get(canonical)
    }

    pub fn iter(&self) -> impl Iterator<Item = &EnumDeclaration> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn conflicts(&self) -> &[EnumConflict] {
        &self.conflicts
    }
}

/// Distinct values must stay distinct once rewritten into member names.
fn check_member_names(canonical: &str, values: &[String]) -> Result<()> {
    let mut seen: BTreeMap<String, &str> = BTreeMap::new();
    for value in values {
        let member = member_name(value);
        if let Some(first) = seen.insert(member.clone(), value) {
            return Err(Error::InvalidModel(format!(
                "enum {canonical} values \"{first}\" and \"{value}\" both become member {member}"
            )));
        }
    }
    Ok(())
}

fn distinct(values: &[String]) -> Vec<String> {
    let mut seen = Vec::with_capacity(values.len());
    for value in values {
        if !seen.contains(value) {
            seen.push(value.clone());
        }
    }
    seen
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(items: &[&str]) -> Vec<String> {
        items.iter().map(|item| item.to_string()).collect()
    }

    #[test]
    fn registers_under_pascal_case_name() {
        let mut registry = EnumRegistry::default();
        let name = registry
            .register("order_status", &values(&["pending", "paid"]))
            .unwrap();

        assert_eq!(name, "OrderStatus");
        assert_eq!(registry.get("OrderStatus").unwrap().values, values(&["pending", "paid"]));
    }

    #[test]
    fn identical_registration_keeps_one_declaration() {
        let mut registry = EnumRegistry::default();
        registry.register("role", &values(&["admin", "member"])).unwrap();
        registry.register("role", &values(&["admin", "member"])).unwrap();

        let all: Vec<_> = registry.iter().collect();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].values, values(&["admin", "member"]));
        assert!(registry.conflicts().is_empty());
    }

    #[test]
    fn duplicate_values_are_collapsed_in_first_seen_order() {
        let mut registry = EnumRegistry::default();
        registry
            .register("size", &values(&["small", "large", "small", "medium"]))
            .unwrap();

        assert_eq!(
            registry.get("Size").unwrap().values,
            values(&["small", "large", "medium"])
        );
    }

    #[test]
    fn divergent_redefinition_is_an_error_by_default() {
        let mut registry = EnumRegistry::default();
        registry.register("role", &values(&["admin", "member"])).unwrap();
        let err = registry
            .register("role", &values(&["admin", "guest"]))
            .unwrap_err();

        assert!(matches!(err, Error::EnumConflict { ref name, .. } if name == "Role"));
    }

    #[test]
    fn first_wins_keeps_original_values_and_records_conflict() {
        let mut registry = EnumRegistry::new(EnumConflictPolicy::FirstWins);
        registry.register("role", &values(&["admin", "member"])).unwrap();
        let name = registry.register("role", &values(&["guest"])).unwrap();

        assert_eq!(name, "Role");
        assert_eq!(registry.get("Role").unwrap().values, values(&["admin", "member"]));
        assert_eq!(registry.conflicts().len(), 1);
        assert_eq!(registry.conflicts()[0].incoming, values(&["guest"]));
    }

    #[test]
    fn colliding_member_names_are_rejected() {
        let mut registry = EnumRegistry::default();
        let err = registry
            .register("status", &values(&["in-progress", "in_progress"]))
            .unwrap_err();

        assert!(matches!(err, Error::InvalidModel(ref message) if message.contains("in_progress")));
        assert!(registry.get("Status").is_none());

        registry
            .register("status", &values(&["in-progress", "done"]))
            .unwrap();
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn iterates_sorted_by_canonical_name() {
        let mut registry = EnumRegistry::default();
        registry.register("status", &values(&["on"])).unwrap();
        registry.register("accessLevel", &values(&["low"])).unwrap();
        registry.register("kind", &values(&["a"])).unwrap();

        let names: Vec<_> = registry.iter().map(|item| item.name.as_str()).collect();
        assert_eq!(names, vec!["AccessLevel", "Kind", "Status"]);
    }
}
