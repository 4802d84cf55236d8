//! JSON flatten helpers
//!
//! 两个方向的胶水：`path_search` 从嵌套响应中按路径取值（读方向），
//! [`BodyBuilder`] 从 schema 值组装请求体并忽略未设置/空字段（写方向）。

use serde_json::{Map, Value};

/// Look up a dotted path inside a JSON value.
///
/// Path segments address object keys; numeric segments index into arrays.
///
/// ```rust
/// use hwc_resource_provider::path_search;
/// use serde_json::json;
///
/// let body = json!({"zones": [{"id": "z1"}]});
/// assert_eq!(path_search("zones.0.id", &body), Some(&json!("z1")));
/// assert_eq!(path_search("zones.9.id", &body), None);
/// ```
pub fn path_search<'a>(path: &str, value: &'a Value) -> Option<&'a Value> {
    let mut current = value;
    for segment in path.split('.') {
        current = match current {
            Value::Object(map) => map.get(segment)?,
            Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(current)
}

/// `path_search` 的字符串便捷版本
pub fn path_search_str<'a>(path: &str, value: &'a Value) -> Option<&'a str> {
    path_search(path, value).and_then(Value::as_str)
}

/// 值是否视为"空"（请求体中应省略）
///
/// Null、空字符串、空数组、空对象视为空；`false` 与 `0` 是有效值，不视为空。
fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        _ => false,
    }
}

/// Request body builder that drops unset and empty fields.
///
/// ```rust
/// use hwc_resource_provider::BodyBuilder;
/// use serde_json::json;
///
/// let body = BodyBuilder::new()
///     .field("name", "www.example.com.")
///     .opt("description", None::<&str>)
///     .opt("ttl", Some(300))
///     .build();
/// assert_eq!(body, json!({"name": "www.example.com.", "ttl": 300}));
/// ```
#[derive(Debug, Default)]
pub struct BodyBuilder {
    map: Map<String, Value>,
}

impl BodyBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert unconditionally (empty values included).
    pub fn field(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.map.insert(key.to_string(), value.into());
        self
    }

    /// Insert only when `Some` and non-empty.
    pub fn opt<V: Into<Value>>(mut self, key: &str, value: Option<V>) -> Self {
        if let Some(v) = value {
            let v = v.into();
            if !is_empty_value(&v) {
                self.map.insert(key.to_string(), v);
            }
        }
        self
    }

    /// 构建请求体
    pub fn build(self) -> Value {
        Value::Object(self.map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    // ---- path_search ----

    #[test]
    fn search_top_level_key() {
        let body = json!({"id": "abc"});
        assert_eq!(path_search("id", &body), Some(&json!("abc")));
    }

    #[test]
    fn search_nested_path() {
        let body = json!({"result": {"id": "abc", "name": "app"}});
        assert_eq!(path_search("result.id", &body), Some(&json!("abc")));
        assert_eq!(path_search_str("result.name", &body), Some("app"));
    }

    #[test]
    fn search_array_index() {
        let body = json!({"arrange_infos": [{"id": "task-1"}, {"id": "task-2"}]});
        assert_eq!(
            path_search_str("arrange_infos.0.id", &body),
            Some("task-1")
        );
        assert_eq!(
            path_search_str("arrange_infos.1.id", &body),
            Some("task-2")
        );
    }

    #[test]
    fn search_missing_path_is_none() {
        let body = json!({"result": {"id": "abc"}});
        assert_eq!(path_search("result.missing", &body), None);
        assert_eq!(path_search("missing.id", &body), None);
    }

    #[test]
    fn search_out_of_bounds_index_is_none() {
        let body = json!({"items": ["a"]});
        assert_eq!(path_search("items.5", &body), None);
    }

    #[test]
    fn search_through_scalar_is_none() {
        let body = json!({"id": "abc"});
        assert_eq!(path_search("id.inner", &body), None);
    }

    // ---- BodyBuilder ----

    #[test]
    fn builder_keeps_set_fields() {
        let body = BodyBuilder::new()
            .field("name", "example.com.")
            .field("ttl", 300)
            .build();
        assert_eq!(body, json!({"name": "example.com.", "ttl": 300}));
    }

    #[test]
    fn builder_drops_none_and_empty() {
        let body = BodyBuilder::new()
            .field("name", "example.com.")
            .opt("description", None::<&str>)
            .opt("email", Some(""))
            .opt("records", Some(Vec::<String>::new()))
            .build();
        assert_eq!(body, json!({"name": "example.com."}));
    }

    #[test]
    fn builder_keeps_false_and_zero() {
        // false/0 是有效值，不能按"空"丢弃
        let body = BodyBuilder::new()
            .opt("is_draft", Some(false))
            .opt("weight", Some(0))
            .build();
        assert_eq!(body, json!({"is_draft": false, "weight": 0}));
    }

    #[test]
    fn builder_keeps_nested_objects() {
        let body = BodyBuilder::new()
            .field("name", "rule-1")
            .opt("router", Some(json!({"router_id": "vpc-1"})))
            .build();
        assert_eq!(
            body,
            json!({"name": "rule-1", "router": {"router_id": "vpc-1"}})
        );
    }

    #[test]
    fn builder_drops_empty_object() {
        let body = BodyBuilder::new().opt("router", Some(json!({}))).build();
        assert_eq!(body, json!({}));
    }
}
