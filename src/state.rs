//! Resource configuration and state attribute maps.
//!
//! [`ResourceData`] holds schema-validated caller configuration;
//! [`ResourceState`] holds the locally tracked snapshot of a remote object
//! (server-assigned ID plus flattened attributes).

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{ProviderError, Result};
use crate::flatten::path_search;
use crate::schema::{ResourceSchema, TypeError};

/// Flat attribute map shared by configuration and state.
pub type AttrMap = serde_json::Map<String, Value>;

/// Schema-validated caller configuration for one resource instance.
#[derive(Debug, Clone, Default)]
pub struct ResourceData {
    values: AttrMap,
}

impl ResourceData {
    /// Validate `config` against `schema` and apply declared defaults.
    ///
    /// `Null` values are dropped before validation (treated as unset).
    pub fn new(
        schema: &ResourceSchema,
        mut config: AttrMap,
    ) -> std::result::Result<Self, Vec<TypeError>> {
        config.retain(|_, v| !v.is_null());
        schema.validate(&config)?;
        schema.apply_defaults(&mut config);
        Ok(Self { values: config })
    }

    /// An empty configuration (data sources with no filters).
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.values.get(key).and_then(Value::as_str)
    }

    pub fn get_i64(&self, key: &str) -> Option<i64> {
        self.values.get(key).and_then(Value::as_i64)
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.values.get(key).and_then(Value::as_bool)
    }

    /// List attribute as owned strings; non-string items are skipped.
    pub fn get_string_list(&self, key: &str) -> Option<Vec<String>> {
        self.values.get(key).and_then(Value::as_array).map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_owned)
                .collect()
        })
    }

    /// 必填字符串属性（schema 校验后仍缺失视为配置错误）
    pub fn require_str(&self, key: &str) -> Result<&str> {
        self.get_str(key)
            .ok_or_else(|| ProviderError::InvalidParameter {
                service: "config".to_string(),
                param: key.to_string(),
                detail: "required attribute is missing".to_string(),
            })
    }

    pub fn values(&self) -> &AttrMap {
        &self.values
    }
}

/// The locally held snapshot of a remote object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceState {
    /// Server-assigned identifier (possibly composite, `/`-joined).
    pub id: String,
    attributes: AttrMap,
}

impl ResourceState {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            attributes: AttrMap::new(),
        }
    }

    /// Set an attribute. `Null` values are dropped (attribute cleared).
    pub fn set(&mut self, key: &str, value: impl Into<Value>) {
        let value = value.into();
        if value.is_null() {
            self.attributes.remove(key);
        } else {
            self.attributes.insert(key.to_string(), value);
        }
    }

    /// Flatten one field from a response body into this state:
    /// `state.set_path("name", &body, "result.name")`.
    pub fn set_path(&mut self, key: &str, body: &Value, path: &str) {
        if let Some(value) = path_search(path, body) {
            self.set(key, value.clone());
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.attributes.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).and_then(Value::as_str)
    }

    pub fn get_i64(&self, key: &str) -> Option<i64> {
        self.attributes.get(key).and_then(Value::as_i64)
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.attributes.get(key).and_then(Value::as_bool)
    }

    pub fn get_string_list(&self, key: &str) -> Option<Vec<String>> {
        self.attributes.get(key).and_then(Value::as_array).map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_owned)
                .collect()
        })
    }

    /// 必填字符串属性（缺失视为状态损坏）
    pub fn require_str(&self, key: &str) -> Result<&str> {
        self.get_str(key)
            .ok_or_else(|| ProviderError::InvalidParameter {
                service: "state".to_string(),
                param: key.to_string(),
                detail: "attribute is missing from state".to_string(),
            })
    }

    pub fn attributes(&self) -> &AttrMap {
        &self.attributes
    }
}
