use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use schemashift_convert::ConvertOptions;

use super::WorkspaceResult;

/// Settings file looked up in the working directory when `--config` is absent.
pub const DEFAULT_SETTINGS_FILE: &str = "schemashift.toml";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathSettings {
    pub input: PathBuf,
    pub output: PathBuf,
}

impl Default for PathSettings {
    fn default() -> Self {
        Self {
            input: PathBuf::from("drizzle/schema.ts"),
            output: PathBuf::from("prisma/schema.prisma"),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub paths: PathSettings,
    pub convert: ConvertOptions,
}

/// Load settings from `explicit`, or from [`DEFAULT_SETTINGS_FILE`] when it
/// exists. A missing explicit file is an error; a missing default file
/// yields the defaults.
pub fn load_settings(explicit: Option<&Path>) -> WorkspaceResult<Settings> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => {
            let path = PathBuf::from(DEFAULT_SETTINGS_FILE);
            if !path.exists() {
                return Ok(Settings::default());
            }
            path
        }
    };

    let content = std::fs::read_to_string(&path)?;
    let settings: Settings = toml::from_str(&content)?;
    tracing::debug!(event = "settings_loaded", path = %path.display());
    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use schemashift_convert::IdentityPolicy;
    use schemashift_core::EnumConflictPolicy;
    use schemashift_extract::DialectKind;

    use crate::workspace::WorkspaceError;

    #[test]
    fn empty_file_yields_defaults() {
        let settings: Settings = toml::from_str("").unwrap();

        assert_eq!(settings.paths.input, PathBuf::from("drizzle/schema.ts"));
        assert_eq!(settings.paths.output, PathBuf::from("prisma/schema.prisma"));
        assert_eq!(settings.convert.column_width, 20);
        assert!(settings.convert.audit_fields);
    }

    #[test]
    fn reads_paths_and_convert_sections() {
        let settings: Settings = toml::from_str(
            r#"
[paths]
input = "db/schema.ts"

[convert]
dialect = "mysql"
identity = "preserve"
enum_conflict = "first_wins"
exclude = ["users", "sessions"]

[convert.header]
title = "Shop schema"
"#,
        )
        .unwrap();

        assert_eq!(settings.paths.input, PathBuf::from("db/schema.ts"));
        assert_eq!(settings.paths.output, PathBuf::from("prisma/schema.prisma"));
        assert_eq!(settings.convert.dialect, DialectKind::MySql);
        assert_eq!(settings.convert.identity, IdentityPolicy::Preserve);
        assert_eq!(settings.convert.enum_conflict, EnumConflictPolicy::FirstWins);
        assert!(settings.convert.exclude.contains("sessions"));
        assert_eq!(settings.convert.header.title, "Shop schema");
        assert_eq!(settings.convert.header.provider, "postgresql");
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let path = std::env::temp_dir().join(format!("schemashift_{}.toml", uuid::Uuid::new_v4()));
        let err = load_settings(Some(&path)).unwrap_err();

        assert!(matches!(err, WorkspaceError::Io(_)));
    }

    #[test]
    fn loads_explicit_file() {
        let path = std::env::temp_dir().join(format!("schemashift_{}.toml", uuid::Uuid::new_v4()));
        std::fs::write(&path, "[convert]\naudit_fields = false\n").unwrap();

        let settings = load_settings(Some(&path)).unwrap();
        assert!(!settings.convert.audit_fields);

        std::fs::remove_file(path).ok();
    }
}
