//! Configuration parsing and management.

use crate::pagination::{Pagination, PartialPagination, DEFAULT_PAGE, DEFAULT_SIZE};
use crate::schema::{FieldKind, ScalarKind, Schema};
use querysync_types::{AbstractQuery, FlatValue};
use serde::{de, Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse YAML: {0}")]
    ParseError(#[from] serde_yaml::Error),

    #[error("Invalid default for field '{field}': {value:?} is not a {kind}")]
    InvalidDefault {
        field: String,
        value: String,
        kind: String,
    },

    #[error("Page size must be positive")]
    InvalidPageSize,
}

/// Main configuration struct matching the querysync.yml schema
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QuerySyncConfig {
    #[serde(default)]
    pub pagination: PaginationConfig,

    #[serde(default)]
    pub router: RouterConfig,

    /// Declared free-form query fields
    #[serde(default)]
    pub fields: BTreeMap<String, FieldConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginationConfig {
    #[serde(default = "default_page")]
    pub page: u64,

    #[serde(default = "default_size")]
    pub size: u64,
}

fn default_page() -> u64 {
    DEFAULT_PAGE
}

fn default_size() -> u64 {
    DEFAULT_SIZE
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            page: default_page(),
            size: default_size(),
        }
    }
}

/// How a URL router records navigations in the history
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HistoryMode {
    #[default]
    Replace,
    Push,
}

/// How list values are written to a search string
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArrayEncoding {
    /// `tags=a&tags=b`
    #[default]
    Repeated,
    /// `tags=a,b`, each element percent-encoded
    Delimited,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouterConfig {
    #[serde(default)]
    pub history: HistoryMode,

    #[serde(default)]
    pub array_encoding: ArrayEncoding,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldConfig {
    #[serde(default = "default_kind")]
    pub kind: ScalarKind,

    /// Whether the field holds a list of `kind`
    #[serde(default)]
    pub list: bool,

    /// Default value in flat form, coerced with `kind`
    #[serde(default, deserialize_with = "deserialize_default")]
    pub default: Option<FlatValue>,
}

/// Accept plain YAML scalars (`42`, `false`, `text`) or a sequence of them
fn deserialize_default<'de, D>(deserializer: D) -> Result<Option<FlatValue>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(value) = Option::<serde_yaml::Value>::deserialize(deserializer)? else {
        return Ok(None);
    };
    let flat = match &value {
        serde_yaml::Value::Sequence(items) => items
            .iter()
            .map(yaml_scalar)
            .collect::<Option<Vec<_>>>()
            .map(FlatValue::Many),
        other => yaml_scalar(other).map(FlatValue::Single),
    };
    flat.map(Some)
        .ok_or_else(|| de::Error::custom("default must be a scalar or a list of scalars"))
}

fn yaml_scalar(value: &serde_yaml::Value) -> Option<String> {
    match value {
        serde_yaml::Value::String(s) => Some(s.clone()),
        serde_yaml::Value::Number(n) => Some(n.to_string()),
        serde_yaml::Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn default_kind() -> ScalarKind {
    ScalarKind::String
}

impl FieldConfig {
    pub fn field_kind(&self) -> FieldKind {
        if self.list {
            FieldKind::List(self.kind)
        } else {
            FieldKind::Scalar(self.kind)
        }
    }
}

impl QuerySyncConfig {
    /// Load configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        Self::from_yaml(&contents)
    }

    pub fn from_yaml(contents: &str) -> Result<Self, ConfigError> {
        let config: QuerySyncConfig = serde_yaml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.pagination.size == 0 {
            return Err(ConfigError::InvalidPageSize);
        }
        self.default_query().map(|_| ())
    }

    /// The schema parser for the declared fields
    pub fn schema(&self) -> Schema {
        self.fields
            .iter()
            .fold(Schema::new(), |schema, (key, field)| {
                schema.field(key.clone(), field.field_kind())
            })
    }

    /// The typed default query for fields that declare a default
    pub fn default_query(&self) -> Result<AbstractQuery, ConfigError> {
        let mut query = AbstractQuery::new();
        for (key, field) in &self.fields {
            let Some(raw) = &field.default else {
                continue;
            };
            let kind = field.field_kind();
            let value = kind.coerce(raw).ok_or_else(|| ConfigError::InvalidDefault {
                field: key.clone(),
                value: raw.to_string(),
                kind: kind.to_string(),
            })?;
            query.insert(key.clone(), value);
        }
        Ok(query)
    }

    pub fn default_pagination(&self) -> Pagination {
        Pagination::new(self.pagination.page, self.pagination.size)
    }

    pub fn partial_pagination(&self) -> PartialPagination {
        self.default_pagination().into()
    }

    /// Get a config value using a dotted path (e.g., "pagination.size")
    pub fn get(&self, key: &str) -> Option<String> {
        let parts: Vec<&str> = key.split('.').collect();
        match parts.as_slice() {
            ["pagination", "page"] => Some(self.pagination.page.to_string()),
            ["pagination", "size"] => Some(self.pagination.size.to_string()),
            ["router", "history"] => Some(format!("{:?}", self.router.history).to_lowercase()),
            ["router", "array_encoding"] => {
                Some(format!("{:?}", self.router.array_encoding).to_lowercase())
            }
            ["fields", name, "kind"] => self.fields.get(*name).map(|f| f.kind.to_string()),
            ["fields", name, "default"] => self
                .fields
                .get(*name)
                .and_then(|f| f.default.as_ref())
                .map(|d| d.to_string()),
            _ => None,
        }
    }
}
