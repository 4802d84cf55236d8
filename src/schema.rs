//! Schema - declarative attribute schemas for resources and data sources
//!
//! Every resource declares a schema describing its attributes, enabling
//! configuration validation before any API call is made. Attribute values
//! are plain [`serde_json::Value`]s; the schema layer only constrains their
//! shape.

use std::collections::BTreeMap;
use std::fmt;

use serde_json::Value;

/// Attribute type
#[derive(Debug, Clone)]
pub enum AttributeType {
    /// String
    String,
    /// Integer
    Int,
    /// Boolean
    Bool,
    /// Enum (list of allowed string values)
    Enum(Vec<String>),
    /// List
    List(Box<AttributeType>),
    /// Map with uniformly typed values
    Map(Box<AttributeType>),
    /// Free-form JSON object (used by computed nested blocks)
    Object,
}

impl AttributeType {
    /// Check if a value conforms to this type
    pub fn validate(&self, value: &Value) -> Result<(), TypeError> {
        match (self, value) {
            (Self::String, Value::String(_)) => Ok(()),
            (Self::Int, v) if v.is_i64() || v.is_u64() => Ok(()),
            (Self::Bool, Value::Bool(_)) => Ok(()),

            (Self::Enum(variants), Value::String(s)) => {
                if variants.iter().any(|v| v == s) {
                    Ok(())
                } else {
                    Err(TypeError::InvalidEnumValue {
                        value: s.clone(),
                        expected: variants.clone(),
                    })
                }
            }

            (Self::List(inner), Value::Array(items)) => {
                for (i, item) in items.iter().enumerate() {
                    inner.validate(item).map_err(|e| TypeError::ListItemError {
                        index: i,
                        inner: Box::new(e),
                    })?;
                }
                Ok(())
            }

            (Self::Map(inner), Value::Object(map)) => {
                for (k, v) in map {
                    inner.validate(v).map_err(|e| TypeError::MapValueError {
                        key: k.clone(),
                        inner: Box::new(e),
                    })?;
                }
                Ok(())
            }

            (Self::Object, Value::Object(_)) => Ok(()),

            _ => Err(TypeError::TypeMismatch {
                expected: self.type_name(),
                got: json_type_name(value),
            }),
        }
    }

    fn type_name(&self) -> String {
        match self {
            Self::String => "String".to_string(),
            Self::Int => "Int".to_string(),
            Self::Bool => "Bool".to_string(),
            Self::Enum(variants) => format!("Enum({})", variants.join(" | ")),
            Self::List(inner) => format!("List<{}>", inner.type_name()),
            Self::Map(inner) => format!("Map<{}>", inner.type_name()),
            Self::Object => "Object".to_string(),
        }
    }
}

impl fmt::Display for AttributeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.type_name())
    }
}

fn json_type_name(value: &Value) -> String {
    match value {
        Value::Null => "Null".to_string(),
        Value::Bool(_) => "Bool".to_string(),
        Value::Number(_) => "Number".to_string(),
        Value::String(_) => "String".to_string(),
        Value::Array(_) => "List".to_string(),
        Value::Object(_) => "Object".to_string(),
    }
}

/// Type error
#[derive(Debug, Clone, thiserror::Error)]
pub enum TypeError {
    #[error("Type mismatch: expected {expected}, got {got}")]
    TypeMismatch { expected: String, got: String },

    #[error("Invalid enum value '{value}', expected one of: {}", expected.join(", "))]
    InvalidEnumValue {
        value: String,
        expected: Vec<String>,
    },

    #[error("Required attribute '{name}' is missing")]
    MissingRequired { name: String },

    #[error("Attribute '{name}' is computed and cannot be configured")]
    ComputedOnly { name: String },

    #[error("Unknown attribute '{name}'")]
    UnknownAttribute { name: String },

    #[error("List item at index {index}: {inner}")]
    ListItemError { index: usize, inner: Box<TypeError> },

    #[error("Map value for key '{key}': {inner}")]
    MapValueError { key: String, inner: Box<TypeError> },
}

/// Attribute schema
#[derive(Debug, Clone)]
pub struct AttributeSchema {
    pub name: String,
    pub attr_type: AttributeType,
    /// The caller must supply this attribute.
    pub required: bool,
    /// The caller may supply this attribute.
    pub optional: bool,
    /// The server fills this attribute; it may also be optional (e.g. a
    /// server-assigned default the caller can override).
    pub computed: bool,
    /// Changing this attribute requires replacing the remote object.
    pub force_new: bool,
    /// Value is masked in display contexts (credentials, private keys).
    pub sensitive: bool,
    pub default: Option<Value>,
    pub description: Option<String>,
}

impl AttributeSchema {
    pub fn new(name: impl Into<String>, attr_type: AttributeType) -> Self {
        Self {
            name: name.into(),
            attr_type,
            required: false,
            optional: false,
            computed: false,
            force_new: false,
            sensitive: false,
            default: None,
            description: None,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    pub fn computed(mut self) -> Self {
        self.computed = true;
        self
    }

    pub fn force_new(mut self) -> Self {
        self.force_new = true;
        self
    }

    pub fn sensitive(mut self) -> Self {
        self.sensitive = true;
        self
    }

    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn with_description(mut self, desc: impl Into<String>) -> Self {
        self.description = Some(desc.into());
        self
    }

    /// 调用方是否可以配置该属性
    pub fn settable(&self) -> bool {
        self.required || self.optional
    }
}

/// Resource schema
#[derive(Debug, Clone)]
pub struct ResourceSchema {
    pub resource_type: String,
    pub attributes: BTreeMap<String, AttributeSchema>,
    pub description: Option<String>,
}

impl ResourceSchema {
    pub fn new(resource_type: impl Into<String>) -> Self {
        Self {
            resource_type: resource_type.into(),
            attributes: BTreeMap::new(),
            description: None,
        }
    }

    pub fn attribute(mut self, schema: AttributeSchema) -> Self {
        self.attributes.insert(schema.name.clone(), schema);
        self
    }

    pub fn with_description(mut self, desc: impl Into<String>) -> Self {
        self.description = Some(desc.into());
        self
    }

    pub fn get(&self, name: &str) -> Option<&AttributeSchema> {
        self.attributes.get(name)
    }

    /// Validate caller-supplied attributes.
    ///
    /// Checks required presence, rejects unknown and computed-only
    /// attributes, and type-checks every provided value. `Null` values are
    /// treated as absent.
    pub fn validate(
        &self,
        attributes: &serde_json::Map<String, Value>,
    ) -> Result<(), Vec<TypeError>> {
        let mut errors = Vec::new();

        // Check required attributes
        for (name, schema) in &self.attributes {
            if schema.required
                && schema.default.is_none()
                && !attributes.contains_key(name)
            {
                errors.push(TypeError::MissingRequired { name: name.clone() });
            }
        }

        // Type check each provided attribute
        for (name, value) in attributes {
            if value.is_null() {
                continue;
            }
            match self.attributes.get(name) {
                None => errors.push(TypeError::UnknownAttribute { name: name.clone() }),
                Some(schema) if !schema.settable() => {
                    errors.push(TypeError::ComputedOnly { name: name.clone() });
                }
                Some(schema) => {
                    if let Err(e) = schema.attr_type.validate(value) {
                        errors.push(e);
                    }
                }
            }
        }

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }

    /// Fill declared defaults for absent attributes.
    pub fn apply_defaults(&self, attributes: &mut serde_json::Map<String, Value>) {
        for (name, schema) in &self.attributes {
            if let Some(default) = &schema.default
                && !attributes.contains_key(name)
            {
                attributes.insert(name.clone(), default.clone());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn object(value: Value) -> serde_json::Map<String, Value> {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    fn sample_schema() -> ResourceSchema {
        ResourceSchema::new("dns_zone")
            .attribute(AttributeSchema::new("name", AttributeType::String).required().force_new())
            .attribute(
                AttributeSchema::new(
                    "zone_type",
                    AttributeType::Enum(vec!["public".to_string(), "private".to_string()]),
                )
                .optional()
                .force_new()
                .with_default("public"),
            )
            .attribute(AttributeSchema::new("ttl", AttributeType::Int).optional().with_default(300))
            .attribute(AttributeSchema::new("created_at", AttributeType::String).computed())
    }

    #[test]
    fn validate_ok() {
        let schema = sample_schema();
        let attrs = object(json!({"name": "example.com.", "zone_type": "private", "ttl": 600}));
        assert!(schema.validate(&attrs).is_ok());
    }

    #[test]
    fn missing_required_attribute() {
        let schema = sample_schema();
        let attrs = object(json!({"ttl": 600}));
        let result = schema.validate(&attrs);
        let Err(errors) = result else {
            panic!("expected validation failure");
        };
        assert!(
            errors
                .iter()
                .any(|e| matches!(e, TypeError::MissingRequired { name } if name == "name"))
        );
    }

    #[test]
    fn unknown_attribute_rejected() {
        let schema = sample_schema();
        let attrs = object(json!({"name": "example.com.", "bogus": 1}));
        let Err(errors) = schema.validate(&attrs) else {
            panic!("expected validation failure");
        };
        assert!(
            errors
                .iter()
                .any(|e| matches!(e, TypeError::UnknownAttribute { name } if name == "bogus"))
        );
    }

    #[test]
    fn computed_only_rejected() {
        let schema = sample_schema();
        let attrs = object(json!({"name": "example.com.", "created_at": "now"}));
        let Err(errors) = schema.validate(&attrs) else {
            panic!("expected validation failure");
        };
        assert!(
            errors
                .iter()
                .any(|e| matches!(e, TypeError::ComputedOnly { name } if name == "created_at"))
        );
    }

    #[test]
    fn enum_value_rejected() {
        let schema = sample_schema();
        let attrs = object(json!({"name": "example.com.", "zone_type": "shared"}));
        let Err(errors) = schema.validate(&attrs) else {
            panic!("expected validation failure");
        };
        assert!(
            errors
                .iter()
                .any(|e| matches!(e, TypeError::InvalidEnumValue { value, .. } if value == "shared"))
        );
    }

    #[test]
    fn type_mismatch_detected() {
        let schema = sample_schema();
        let attrs = object(json!({"name": "example.com.", "ttl": "not-a-number"}));
        let Err(errors) = schema.validate(&attrs) else {
            panic!("expected validation failure");
        };
        assert!(errors.iter().any(|e| matches!(e, TypeError::TypeMismatch { .. })));
    }

    #[test]
    fn null_values_treated_as_absent() {
        let schema = sample_schema();
        let attrs = object(json!({"name": "example.com.", "ttl": null}));
        assert!(schema.validate(&attrs).is_ok());
    }

    #[test]
    fn defaults_applied() {
        let schema = sample_schema();
        let mut attrs = object(json!({"name": "example.com."}));
        schema.apply_defaults(&mut attrs);
        assert_eq!(attrs.get("zone_type"), Some(&json!("public")));
        assert_eq!(attrs.get("ttl"), Some(&json!(300)));
    }

    #[test]
    fn defaults_do_not_override() {
        let schema = sample_schema();
        let mut attrs = object(json!({"name": "example.com.", "ttl": 60}));
        schema.apply_defaults(&mut attrs);
        assert_eq!(attrs.get("ttl"), Some(&json!(60)));
    }

    #[test]
    fn list_items_validated() {
        let t = AttributeType::List(Box::new(AttributeType::String));
        assert!(t.validate(&json!(["a", "b"])).is_ok());
        let err = t.validate(&json!(["a", 3]));
        assert!(
            matches!(&err, Err(TypeError::ListItemError { index: 1, .. })),
            "unexpected result: {err:?}"
        );
    }

    #[test]
    fn map_values_validated() {
        let t = AttributeType::Map(Box::new(AttributeType::String));
        assert!(t.validate(&json!({"k": "v"})).is_ok());
        assert!(t.validate(&json!({"k": 1})).is_err());
    }
}
