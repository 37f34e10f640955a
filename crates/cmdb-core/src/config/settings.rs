//! Flat string-keyed configuration table
//!
//! The TOML file is flattened into dotted keys, so
//!
//! ```toml
//! [archi.elements."*"]
//! id = "sys_id"
//! ```
//!
//! becomes `archi.elements.*.id = "sys_id"`. Empty values count as unset.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};

use crate::{Error, Result};

/// Largest configuration file accepted
pub const MAX_CONFIG_SIZE: u64 = 1024 * 1024;

/// Wildcard keyword holding defaults for every keyword of a kind
pub const WILDCARD: &str = "*";

#[derive(Debug, Clone, Default)]
pub struct Settings {
    values: BTreeMap<String, String>,
    source: Option<PathBuf>,
}

impl Settings {
    /// Load and flatten a TOML configuration file
    pub fn load(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(Error::ConfigNotFound {
                path: path.to_path_buf(),
            });
        }
        let size = fs::metadata(path)?.len();
        if size > MAX_CONFIG_SIZE {
            return Err(Error::ConfigTooLarge {
                path: path.to_path_buf(),
                size,
            });
        }

        tracing::debug!(?path, "Loading configuration");
        let content = fs::read_to_string(path)?;
        let mut settings = Self::parse(&content)?;
        settings.source = Some(path.to_path_buf());
        Ok(settings)
    }

    /// Flatten TOML text
    pub fn parse(content: &str) -> Result<Self> {
        let table: toml::Table = content.parse()?;
        let mut values = BTreeMap::new();
        flatten("", &toml::Value::Table(table), &mut values);
        Ok(Self {
            values,
            source: None,
        })
    }

    /// Build settings from already flat pairs
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            values: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
            source: None,
        }
    }

    /// File the settings were loaded from
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values
            .get(key)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }

    /// Value of `key`, or `default` when unset.
    ///
    /// With `hide_value` the value is masked in the trace output.
    pub fn get_string(&self, key: &str, default: Option<&str>, hide_value: bool) -> Option<String> {
        let value = self.get(key).or(default).map(str::to_string);
        if hide_value {
            tracing::debug!(key, value = value.as_ref().map(|_| "********"), "Configuration value");
        } else {
            tracing::debug!(key, ?value, "Configuration value");
        }
        value
    }

    /// Resolve `<domain_kind>.<keyword>.<attribute>`, falling back to the
    /// wildcard keyword and then to `default`
    pub fn lookup(
        &self,
        domain_kind: &str,
        keyword: &str,
        attribute: &str,
        default: Option<&str>,
    ) -> Option<String> {
        let exact = format!("{domain_kind}.{keyword}.{attribute}");
        if self.get(&exact).is_some() {
            return self.get_string(&exact, None, false);
        }
        let wildcard = format!("{domain_kind}.{WILDCARD}.{attribute}");
        self.get_string(&wildcard, default, false)
    }

    /// Keyword that declared a lookup, for error messages
    pub fn lookup_key(&self, domain_kind: &str, keyword: &str, attribute: &str) -> String {
        let exact = format!("{domain_kind}.{keyword}.{attribute}");
        if self.get(&exact).is_some() {
            exact
        } else {
            format!("{domain_kind}.{WILDCARD}.{attribute}")
        }
    }

    /// Keywords below `domain_kind` that set `attribute`, wildcard excluded
    pub fn keywords_with(&self, domain_kind: &str, attribute: &str) -> Vec<String> {
        let prefix = format!("{domain_kind}.");
        let suffix = format!(".{attribute}");
        self.values
            .iter()
            .filter(|(_, v)| !v.is_empty())
            .filter_map(|(k, _)| k.strip_prefix(&prefix)?.strip_suffix(&suffix))
            .filter(|keyword| !keyword.contains('.') && *keyword != WILDCARD)
            .map(str::to_string)
            .collect()
    }

    /// Property names declared for `keyword` or for the wildcard
    pub fn property_names(&self, domain_kind: &str, keyword: &str) -> BTreeSet<String> {
        [keyword, WILDCARD]
            .iter()
            .flat_map(|kw| {
                let prefix = format!("{domain_kind}.{kw}.property.");
                self.values
                    .keys()
                    .filter_map(move |k| k.strip_prefix(&prefix).map(str::to_string))
                    .collect::<Vec<_>>()
            })
            .filter(|name| !name.is_empty())
            .collect()
    }
}

fn flatten(prefix: &str, value: &toml::Value, out: &mut BTreeMap<String, String>) {
    match value {
        toml::Value::Table(table) => {
            for (key, child) in table {
                let path = if prefix.is_empty() {
                    key.clone()
                } else {
                    format!("{prefix}.{key}")
                };
                flatten(&path, child, out);
            }
        }
        toml::Value::String(s) => {
            out.insert(prefix.to_string(), s.clone());
        }
        other => {
            out.insert(prefix.to_string(), other.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    const SAMPLE: &str = r#"
[servicenow]
site = "https://example.service-now.com"
timeout = 10

[archi.elements."*"]
id = "sys_id"
"property.owner" = "owned_by"

[archi.elements.cmdb_ci_server]
archi_class = '"Node"'
name = "host_name"
documentation = ""
"property.cpu" = "cpu_count"
"#;

    #[test]
    fn flattens_nested_tables() {
        let settings = Settings::parse(SAMPLE).unwrap();
        assert_eq!(settings.get("servicenow.timeout"), Some("10"));
        assert_eq!(settings.get("archi.elements.*.id"), Some("sys_id"));
        assert_eq!(
            settings.get("archi.elements.cmdb_ci_server.archi_class"),
            Some("\"Node\"")
        );
    }

    #[test]
    fn lookup_falls_back_to_wildcard_then_default() {
        let settings = Settings::parse(SAMPLE).unwrap();
        let kind = "archi.elements";
        assert_eq!(
            settings.lookup(kind, "cmdb_ci_server", "name", Some("name")),
            Some("host_name".to_string())
        );
        assert_eq!(
            settings.lookup(kind, "cmdb_ci_server", "id", None),
            Some("sys_id".to_string())
        );
        assert_eq!(
            settings.lookup(kind, "cmdb_ci_server", "documentation", Some("short_description")),
            Some("short_description".to_string())
        );
        assert_eq!(settings.lookup(kind, "cmdb_ci_server", "folder", None), None);
        assert_eq!(
            settings.lookup_key(kind, "cmdb_ci_server", "id"),
            "archi.elements.*.id"
        );
    }

    #[test]
    fn get_string_uses_default() {
        let settings = Settings::parse(SAMPLE).unwrap();
        assert_eq!(
            settings.get_string("servicenow.pass", Some("x"), true),
            Some("x".to_string())
        );
        assert_eq!(settings.get_string("servicenow.user", None, false), None);
    }

    #[test]
    fn keywords_and_property_names() {
        let settings = Settings::parse(SAMPLE).unwrap();
        assert_eq!(
            settings.keywords_with("archi.elements", "archi_class"),
            vec!["cmdb_ci_server".to_string()]
        );
        assert_eq!(
            settings
                .property_names("archi.elements", "cmdb_ci_server")
                .into_iter()
                .collect::<Vec<_>>(),
            vec!["cpu".to_string(), "owner".to_string()]
        );
    }

    #[test]
    fn load_rejects_missing_and_oversized_files() {
        let temp = TempDir::new().unwrap();
        let missing = temp.path().join("missing.toml");
        assert!(matches!(
            Settings::load(&missing),
            Err(Error::ConfigNotFound { .. })
        ));

        let big = temp.path().join("big.toml");
        fs::write(&big, "#".repeat(MAX_CONFIG_SIZE as usize + 1)).unwrap();
        assert!(matches!(
            Settings::load(&big),
            Err(Error::ConfigTooLarge { .. })
        ));

        let ok = temp.path().join("ok.toml");
        fs::write(&ok, SAMPLE).unwrap();
        let settings = Settings::load(&ok).unwrap();
        assert_eq!(settings.source(), Some(ok.as_path()));
    }
}
