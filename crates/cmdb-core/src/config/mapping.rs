//! Typed views over the flat settings: service access and record mappings

use std::collections::BTreeMap;
use std::time::Duration;

use cmdb_expr::static_field_names;
use cmdb_remote::{Credentials, DEFAULT_TABLE_API, ProxyConfig, TableUrl};

use super::settings::Settings;
use crate::mode::ImportMode;
use crate::{Error, Result};

pub const ELEMENTS: &str = "archi.elements";
pub const RELATIONS: &str = "archi.relations";

/// Connection settings of the inventory service
#[derive(Debug, Clone)]
pub struct ServiceSettings {
    pub site: String,
    pub credentials: Credentials,
    pub table_api: String,
    pub sysparm_limit: String,
    pub relations_table: String,
    pub timeout: Duration,
    pub proxy: Option<ProxyConfig>,
}

impl ServiceSettings {
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let site = mandatory(settings, "servicenow.site", false)?;
        let user = mandatory(settings, "servicenow.user", false)?;
        let password = mandatory(settings, "servicenow.pass", true)?;

        let timeout_text = settings
            .get_string("servicenow.timeout", Some("30"), false)
            .unwrap_or_default();
        let timeout = timeout_text
            .trim()
            .parse::<u64>()
            .map(Duration::from_secs)
            .map_err(|_| {
                Error::configuration(
                    "servicenow.timeout",
                    format!("'{timeout_text}' is not a number of seconds"),
                )
            })?;

        Ok(Self {
            site,
            credentials: Credentials::new(user, password),
            table_api: settings
                .get_string("servicenow.table_api", Some(DEFAULT_TABLE_API), false)
                .unwrap_or_default(),
            sysparm_limit: settings
                .get_string("servicenow.sysparm_limit", Some("0"), false)
                .unwrap_or_default(),
            relations_table: settings
                .get_string("servicenow.relations.table", Some("cmdb_rel_ci"), false)
                .unwrap_or_default(),
            timeout,
            proxy: proxy_from(settings)?,
        })
    }
}

fn proxy_from(settings: &Settings) -> Result<Option<ProxyConfig>> {
    let Some(host) = settings.get_string("http.proxy_host", None, false) else {
        return Ok(None);
    };
    let port_text = settings
        .get_string("http.proxy_port", Some("80"), false)
        .unwrap_or_default();
    let port = port_text.trim().parse::<u16>().map_err(|_| {
        Error::configuration("http.proxy_port", format!("'{port_text}' is not a port number"))
    })?;
    Ok(Some(ProxyConfig {
        host,
        port,
        user: settings.get_string("http.proxy_user", None, false),
        password: settings.get_string("http.proxy_pass", None, true),
    }))
}

fn mandatory(settings: &Settings, key: &str, hide_value: bool) -> Result<String> {
    settings
        .get_string(key, None, hide_value)
        .ok_or_else(|| Error::configuration(key, "mandatory value is not set"))
}

fn import_mode(settings: &Settings, domain_kind: &str, keyword: &str) -> Result<ImportMode> {
    match settings.lookup(domain_kind, keyword, "import_mode", None) {
        None => Ok(ImportMode::default()),
        Some(text) => text.parse().map_err(|_| {
            Error::configuration(
                settings.lookup_key(domain_kind, keyword, "import_mode"),
                format!("unknown import mode '{text}'"),
            )
        }),
    }
}

fn properties(settings: &Settings, domain_kind: &str, keyword: &str) -> BTreeMap<String, String> {
    settings
        .property_names(domain_kind, keyword)
        .into_iter()
        .filter_map(|name| {
            let expr = settings.lookup(domain_kind, keyword, &format!("property.{name}"), None)?;
            Some((name, expr))
        })
        .collect()
}

/// Mapping of one inventory table onto model elements
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementMapping {
    pub table: String,
    pub archi_class: String,
    pub id: String,
    pub name: String,
    pub documentation: String,
    pub folder: Option<String>,
    pub import_mode: ImportMode,
    pub status: String,
    pub operational_value: String,
    pub sysparm_query: Option<String>,
    /// Property name to field expression
    pub properties: BTreeMap<String, String>,
}

impl ElementMapping {
    pub fn new(settings: &Settings, table: &str) -> Result<Self> {
        let get = |attribute: &str, default: Option<&str>| {
            settings.lookup(ELEMENTS, table, attribute, default)
        };
        let archi_class = get("archi_class", None).ok_or_else(|| {
            Error::configuration(format!("{ELEMENTS}.{table}.archi_class"), "mandatory value is not set")
        })?;

        Ok(Self {
            table: table.to_string(),
            archi_class,
            id: get("id", Some("sys_id")).unwrap_or_default(),
            name: get("name", Some("name")).unwrap_or_default(),
            documentation: get("documentation", Some("short_description")).unwrap_or_default(),
            folder: get("folder", None),
            import_mode: import_mode(settings, ELEMENTS, table)?,
            status: get("status", Some("operational_status")).unwrap_or_default(),
            operational_value: get("operational_value", Some("1")).unwrap_or_default(),
            sysparm_query: get("sysparm_query", None),
            properties: properties(settings, ELEMENTS, table),
        })
    }

    /// Every table declaring an `archi_class`, in key order
    pub fn all(settings: &Settings) -> Result<Vec<Self>> {
        settings
            .keywords_with(ELEMENTS, "archi_class")
            .iter()
            .map(|table| Self::new(settings, table))
            .collect()
    }

    /// Remote fields the mapping reads directly from a batch record
    pub fn fields(&self) -> Vec<String> {
        let mut exprs = vec![
            self.archi_class.as_str(),
            self.id.as_str(),
            self.name.as_str(),
            self.documentation.as_str(),
            self.status.as_str(),
        ];
        exprs.extend(self.folder.as_deref());
        exprs.extend(self.properties.values().map(String::as_str));
        exprs.into_iter().flat_map(static_field_names).collect()
    }
}

/// Mapping of one relationship keyword onto a model relationship type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationClass {
    pub keyword: String,
    pub archi_class: String,
    pub id: String,
    pub source: String,
    pub target: String,
    pub name: Option<String>,
    pub documentation: Option<String>,
    pub folder: Option<String>,
    pub import_mode: ImportMode,
    pub properties: BTreeMap<String, String>,
}

impl RelationClass {
    pub fn new(settings: &Settings, keyword: &str) -> Result<Self> {
        let get = |attribute: &str, default: Option<&str>| {
            settings.lookup(RELATIONS, keyword, attribute, default)
        };
        let archi_class = get("archi_class", None).ok_or_else(|| {
            Error::configuration(
                format!("{RELATIONS}.{keyword}.archi_class"),
                "mandatory value is not set",
            )
        })?;

        Ok(Self {
            keyword: keyword.to_string(),
            archi_class,
            id: get("id", Some("sys_id")).unwrap_or_default(),
            source: get("source", Some("child")).unwrap_or_default(),
            target: get("target", Some("parent")).unwrap_or_default(),
            name: get("name", None),
            documentation: get("documentation", None),
            folder: get("folder", None),
            import_mode: import_mode(settings, RELATIONS, keyword)?,
            properties: properties(settings, RELATIONS, keyword),
        })
    }

    fn expressions(&self) -> Vec<&str> {
        let mut exprs = vec![
            self.archi_class.as_str(),
            self.id.as_str(),
            self.source.as_str(),
            self.target.as_str(),
        ];
        exprs.extend(self.name.as_deref());
        exprs.extend(self.documentation.as_deref());
        exprs.extend(self.folder.as_deref());
        exprs.extend(self.properties.values().map(String::as_str));
        exprs
    }
}

/// Mapping of the relationship table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationMapping {
    /// Expression evaluating a record's relationship keyword
    pub type_expr: String,
    pub sysparm_query: Option<String>,
    pub classes: BTreeMap<String, RelationClass>,
}

impl RelationMapping {
    pub fn new(settings: &Settings) -> Result<Self> {
        let classes = settings
            .keywords_with(RELATIONS, "archi_class")
            .iter()
            .map(|keyword| Ok((keyword.clone(), RelationClass::new(settings, keyword)?)))
            .collect::<Result<BTreeMap<_, _>>>()?;

        Ok(Self {
            type_expr: settings
                .lookup(RELATIONS, "*", "type", Some("type"))
                .unwrap_or_default(),
            sysparm_query: settings.lookup(RELATIONS, "*", "sysparm_query", None),
            classes,
        })
    }

    pub fn class(&self, keyword: &str) -> Option<&RelationClass> {
        self.classes.get(keyword)
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// Remote fields read by the type expression and every class
    pub fn fields(&self) -> Vec<String> {
        std::iter::once(self.type_expr.as_str())
            .chain(self.classes.values().flat_map(RelationClass::expressions))
            .flat_map(static_field_names)
            .collect()
    }
}

/// Everything a synchronization run needs from the configuration
#[derive(Debug, Clone)]
pub struct SyncConfig {
    pub service: ServiceSettings,
    pub elements: Vec<ElementMapping>,
    pub relations: RelationMapping,
}

impl SyncConfig {
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let config = Self {
            service: ServiceSettings::from_settings(settings)?,
            elements: ElementMapping::all(settings)?,
            relations: RelationMapping::new(settings)?,
        };
        tracing::debug!(
            elements = config.elements.len(),
            relations = config.relations.classes.len(),
            "Mapping loaded"
        );
        Ok(config)
    }

    /// Batch URL of an element table
    pub fn element_url(&self, mapping: &ElementMapping) -> Result<String> {
        let service = &self.service;
        let url = TableUrl::new(&service.site, &service.table_api, &mapping.table)
            .limit(service.sysparm_limit.as_str())
            .fields(mapping.fields())
            .query(mapping.sysparm_query.as_deref())
            .build()?;
        Ok(url.to_string())
    }

    /// Batch URL of the relationship table
    pub fn relations_url(&self) -> Result<String> {
        let service = &self.service;
        let url = TableUrl::new(&service.site, &service.table_api, &service.relations_table)
            .limit(service.sysparm_limit.as_str())
            .fields(self.relations.fields())
            .query(self.relations.sysparm_query.as_deref())
            .build()?;
        Ok(url.to_string())
    }

    /// Label and URL of every batch a run fetches, in order
    pub fn fetch_urls(&self) -> Result<Vec<(String, String)>> {
        let mut urls = self
            .elements
            .iter()
            .map(|m| Ok((m.table.clone(), self.element_url(m)?)))
            .collect::<Result<Vec<_>>>()?;
        if !self.relations.is_empty() {
            urls.push((self.service.relations_table.clone(), self.relations_url()?));
        }
        Ok(urls)
    }
}
