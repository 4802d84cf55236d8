//! 自定义线路资源

use async_trait::async_trait;
use serde_json::Value;

use crate::client::{Service, ServiceClient};
use crate::error::{ErrorContext, ProviderError, Result};
use crate::flatten::{BodyBuilder, path_search, path_search_str};
use crate::resource::{Resource, check_deleted};
use crate::schema::{AttributeSchema, AttributeType, ResourceSchema};
use crate::state::{ResourceData, ResourceState};

use super::normalize_status;

/// 自定义解析线路（按来源 IP 网段划分）
///
/// - `POST /v2.1/customlines`
/// - `GET /v2.1/customlines?line_id={line_id}`
/// - `PUT /v2.1/customlines/{line_id}`
/// - `DELETE /v2.1/customlines/{line_id}`
///
/// 该接口没有按 ID 的单对象 GET，read 走 list 过滤。
pub struct DnsCustomLine;

impl DnsCustomLine {
    fn build_body(config: &ResourceData) -> Value {
        BodyBuilder::new()
            .opt("name", config.get_str("name"))
            .opt("ip_segments", config.get_string_list("ip_segments"))
            .opt("description", config.get_str("description"))
            .build()
    }

    fn flatten(line_id: &str, line: &Value) -> ResourceState {
        let mut state = ResourceState::new(line_id);
        state.set_path("name", line, "name");
        state.set_path("ip_segments", line, "ip_segments");
        state.set_path("description", line, "description");
        state.set_path("created_at", line, "created_at");
        state.set_path("updated_at", line, "updated_at");
        if let Some(status) = path_search_str("status", line) {
            state.set("status", normalize_status(status));
        }
        state
    }

    /// 从 list 响应中挑出指定 ID 的线路
    fn find_line<'a>(line_id: &str, body: &'a Value) -> Option<&'a Value> {
        path_search("lines", body)?
            .as_array()?
            .iter()
            .find(|line| path_search_str("line_id", line) == Some(line_id))
    }
}

#[async_trait]
impl Resource for DnsCustomLine {
    fn type_name(&self) -> &'static str {
        "dns_custom_line"
    }

    fn service(&self) -> Service {
        Service::Dns
    }

    fn schema(&self) -> ResourceSchema {
        ResourceSchema::new("dns_custom_line")
            .with_description("A custom resolution line defined by source IP segments.")
            .attribute(AttributeSchema::new("name", AttributeType::String).required())
            .attribute(
                AttributeSchema::new(
                    "ip_segments",
                    AttributeType::List(Box::new(AttributeType::String)),
                )
                .required()
                .with_description("IP address ranges, e.g. \"1.1.1.1-1.1.1.10\"."),
            )
            .attribute(
                AttributeSchema::new("description", AttributeType::String).optional().computed(),
            )
            .attribute(AttributeSchema::new("status", AttributeType::String).computed())
            .attribute(AttributeSchema::new("created_at", AttributeType::String).computed())
            .attribute(AttributeSchema::new("updated_at", AttributeType::String).computed())
    }

    async fn create(
        &self,
        client: &ServiceClient,
        config: &ResourceData,
    ) -> Result<ResourceState> {
        let body = Self::build_body(config);
        let ctx = ErrorContext::for_name(config.get_str("name").unwrap_or_default());
        let resp: Value = client.post("/v2.1/customlines", &body, ctx).await?;

        let id = path_search_str("line_id", &resp)
            .or_else(|| path_search_str("id", &resp))
            .map(str::to_owned)
            .ok_or_else(|| ProviderError::ParseError {
                service: "dns".to_string(),
                detail: "unable to find the custom line ID from the API response".to_string(),
            })?;

        let state = ResourceState::new(id);
        self.read(client, &state).await
    }

    async fn read(&self, client: &ServiceClient, state: &ResourceState) -> Result<ResourceState> {
        let query = format!("line_id={}", urlencoding::encode(&state.id));
        let body: Value = client
            .get("/v2.1/customlines", &query, ErrorContext::for_id(&state.id))
            .await?;

        match Self::find_line(&state.id, &body) {
            Some(line) => Ok(Self::flatten(&state.id, line)),
            None => Err(ProviderError::ResourceNotFound {
                service: "dns".to_string(),
                resource_id: state.id.clone(),
                raw_message: None,
            }),
        }
    }

    async fn update(
        &self,
        client: &ServiceClient,
        state: &ResourceState,
        config: &ResourceData,
    ) -> Result<ResourceState> {
        let path = format!("/v2.1/customlines/{}", state.id);
        let body = Self::build_body(config);
        let _resp: Value = client.put(&path, &body, ErrorContext::for_id(&state.id)).await?;
        self.read(client, state).await
    }

    async fn delete(&self, client: &ServiceClient, state: &ResourceState) -> Result<()> {
        let path = format!("/v2.1/customlines/{}", state.id);
        check_deleted(client.delete(&path, ErrorContext::for_id(&state.id)).await).map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn config(value: Value) -> ResourceData {
        let Value::Object(map) = value else {
            panic!("expected object");
        };
        match ResourceData::new(&DnsCustomLine.schema(), map) {
            Ok(data) => data,
            Err(errors) => panic!("config should validate: {errors:?}"),
        }
    }

    #[test]
    fn body_contains_segments() {
        let data = config(json!({
            "name": "line-a",
            "ip_segments": ["1.1.1.1-1.1.1.10", "2.2.2.2-2.2.2.4"]
        }));
        let body = DnsCustomLine::build_body(&data);
        assert_eq!(
            body,
            json!({
                "name": "line-a",
                "ip_segments": ["1.1.1.1-1.1.1.10", "2.2.2.2-2.2.2.4"]
            })
        );
    }

    #[test]
    fn find_line_picks_matching_id() {
        let body = json!({
            "lines": [
                {"line_id": "line-1", "name": "a"},
                {"line_id": "line-2", "name": "b"}
            ],
            "metadata": {"total_count": 2}
        });
        let found = DnsCustomLine::find_line("line-2", &body);
        assert_eq!(found.and_then(|l| path_search_str("name", l)), Some("b"));
        assert!(DnsCustomLine::find_line("line-9", &body).is_none());
    }

    #[test]
    fn flatten_line_entry() {
        let line = json!({
            "line_id": "line-1",
            "name": "line-a",
            "ip_segments": ["1.1.1.1-1.1.1.10"],
            "status": "ACTIVE"
        });
        let state = DnsCustomLine::flatten("line-1", &line);
        assert_eq!(state.get_str("name"), Some("line-a"));
        assert_eq!(state.get_str("status"), Some("ENABLE"));
    }
}
