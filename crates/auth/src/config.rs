//! Loading a grant table from configuration.
//!
//! The file format is a JSON object mapping role names to grant strings:
//!
//! ```json
//! { "OWNER": ["*"], "CLIENT": ["portal.view", "invoices.view"] }
//! ```
//!
//! Roles missing from the file get no grants. Unknown role names, a role key
//! appearing twice and malformed grants fail the whole load.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use studiodesk_core::DomainError;

use crate::{GrantTable, Role};

/// Environment variable naming a grant-table file to load instead of the
/// built-in table.
pub const GRANTS_PATH_ENV: &str = "STUDIODESK_GRANTS_PATH";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read grant table {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("grant table is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid grant table: {0}")]
    Invalid(#[from] DomainError),
}

/// Role entries in file order, repeated keys included.
///
/// A map type would silently keep only the last of two identical keys.
struct GrantTableFile {
    entries: Vec<(String, Vec<String>)>,
}

impl<'de> Deserialize<'de> for GrantTableFile {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        use serde::de::{self, Visitor};

        struct GrantTableFileVisitor;

        impl<'de> Visitor<'de> for GrantTableFileVisitor {
            type Value = GrantTableFile;

            fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
                formatter.write_str("an object mapping role names to arrays of grants")
            }

            fn visit_map<M>(self, mut map: M) -> Result<Self::Value, M::Error>
            where
                M: de::MapAccess<'de>,
            {
                let mut entries = Vec::new();
                while let Some(entry) = map.next_entry::<String, Vec<String>>()? {
                    entries.push(entry);
                }
                Ok(GrantTableFile { entries })
            }
        }

        deserializer.deserialize_map(GrantTableFileVisitor)
    }
}

impl GrantTable {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let file: GrantTableFile = serde_json::from_str(json)?;

        let mut seen = HashSet::new();
        let mut table = GrantTable::empty();
        for (name, grants) in file.entries {
            let role: Role = name.parse()?;
            if !seen.insert(role) {
                return Err(DomainError::validation(format!("role {role} is listed more than once")).into());
            }
            table = table.try_with_grants(role, grants)?;
        }
        Ok(table)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }
}

/// Where the process gets its grant table from.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum GrantTableSource {
    #[default]
    Builtin,
    File(PathBuf),
}

impl GrantTableSource {
    pub fn from_option(path: Option<PathBuf>) -> Self {
        match path {
            Some(path) if !path.as_os_str().is_empty() => Self::File(path),
            _ => Self::Builtin,
        }
    }

    /// Build the table. Must complete before any evaluation uses it.
    pub fn load(&self) -> Result<GrantTable, ConfigError> {
        match self {
            GrantTableSource::Builtin => {
                tracing::info!("using built-in grant table");
                Ok(GrantTable::builtin())
            }
            GrantTableSource::File(path) => {
                let table = GrantTable::from_path(path).inspect_err(|e| {
                    tracing::warn!(path = %path.display(), error = %e, "failed to load grant table");
                })?;
                let empty_roles: Vec<_> = table
                    .roles()
                    .filter(|(_, grants)| grants.is_empty())
                    .map(|(role, _)| role.as_str())
                    .collect();
                tracing::info!(
                    path = %path.display(),
                    ?empty_roles,
                    "loaded grant table from file"
                );
                Ok(table)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_table_and_leaves_unlisted_roles_empty() {
        let table = GrantTable::from_json_str(
            r#"{ "OWNER": ["*"], "CLIENT": ["portal.view", "invoices.*"] }"#,
        )
        .unwrap();

        assert!(table.allows_str(Role::Owner, "anything.at_all"));
        assert!(table.allows_str(Role::Client, "invoices.download"));
        assert!(table.grants_for(Role::Ops).unwrap().is_empty());
        assert!(!table.allows_str(Role::Ops, "finance.view"));
    }

    #[test]
    fn rejects_unknown_role() {
        let err = GrantTable::from_json_str(r#"{ "ADMIN": ["*"] }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(DomainError::Validation(_))));
    }

    #[test]
    fn rejects_repeated_role_key() {
        let err = GrantTable::from_json_str(r#"{ "OPS": ["*"], "OPS": ["users.view"] }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(DomainError::Validation(_))));
        assert!(err.to_string().contains("role OPS is listed more than once"));
    }

    #[test]
    fn lower_case_role_key_is_unknown() {
        let err = GrantTable::from_json_str(r#"{ "ops": ["finance.view"] }"#).unwrap_err();
        assert!(err.to_string().contains("unknown role 'ops'"));
    }

    #[test]
    fn rejects_non_object_document() {
        let err = GrantTable::from_json_str(r#"[["OPS", ["*"]]]"#).unwrap_err();
        assert!(matches!(err, ConfigError::Json(_)));
    }

    #[test]
    fn rejects_malformed_grant() {
        let err = GrantTable::from_json_str(r#"{ "STUDIO": ["studio"] }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn rejects_non_json() {
        let err = GrantTable::from_json_str("OWNER = *").unwrap_err();
        assert!(matches!(err, ConfigError::Json(_)));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = GrantTable::from_path("/nonexistent/studiodesk/grants.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn source_falls_back_to_builtin() {
        assert_eq!(GrantTableSource::from_option(None), GrantTableSource::Builtin);
        assert_eq!(
            GrantTableSource::from_option(Some(PathBuf::new())),
            GrantTableSource::Builtin
        );
        assert_eq!(
            GrantTableSource::from_option(Some(PathBuf::from("grants.json"))),
            GrantTableSource::File(PathBuf::from("grants.json"))
        );
        assert_eq!(GrantTableSource::Builtin.load().unwrap(), GrantTable::builtin());
    }
}
