//! 线路分组资源

use async_trait::async_trait;
use serde_json::Value;

use crate::client::{Service, ServiceClient};
use crate::error::{ErrorContext, ProviderError, Result};
use crate::flatten::{BodyBuilder, path_search_str};
use crate::resource::{Resource, check_deleted};
use crate::schema::{AttributeSchema, AttributeType, ResourceSchema};
use crate::state::{ResourceData, ResourceState};

use super::normalize_status;

/// 线路分组（把多条解析线路组合成一个可引用的集合）
///
/// - `POST /v2.1/linegroups`
/// - `GET /v2.1/linegroups/{linegroup_id}`
/// - `PUT /v2.1/linegroups/{linegroup_id}`
/// - `DELETE /v2.1/linegroups/{linegroup_id}`
pub struct DnsLineGroup;

impl DnsLineGroup {
    fn build_body(config: &ResourceData) -> Value {
        BodyBuilder::new()
            .opt("name", config.get_str("name"))
            .opt("description", config.get_str("description"))
            .opt("lines", config.get_string_list("lines"))
            .build()
    }

    fn flatten(group_id: &str, body: &Value) -> ResourceState {
        let mut state = ResourceState::new(group_id);
        state.set_path("name", body, "name");
        state.set_path("description", body, "description");
        state.set_path("lines", body, "lines");
        state.set_path("created_at", body, "created_at");
        state.set_path("updated_at", body, "updated_at");
        if let Some(status) = path_search_str("status", body) {
            state.set("status", normalize_status(status));
        }
        state
    }
}

#[async_trait]
impl Resource for DnsLineGroup {
    fn type_name(&self) -> &'static str {
        "dns_line_group"
    }

    fn service(&self) -> Service {
        Service::Dns
    }

    fn schema(&self) -> ResourceSchema {
        ResourceSchema::new("dns_line_group")
            .with_description("A reusable group of resolution lines.")
            .attribute(AttributeSchema::new("name", AttributeType::String).required())
            .attribute(
                AttributeSchema::new("lines", AttributeType::List(Box::new(AttributeType::String)))
                    .required()
                    .with_description("The IDs of the lines in the group."),
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
        let resp: Value = client.post("/v2.1/linegroups", &body, ctx).await?;

        let id = path_search_str("line_id", &resp)
            .or_else(|| path_search_str("id", &resp))
            .map(str::to_owned)
            .ok_or_else(|| ProviderError::ParseError {
                service: "dns".to_string(),
                detail: "unable to find the line group ID from the API response".to_string(),
            })?;

        let state = ResourceState::new(id);
        self.read(client, &state).await
    }

    async fn read(&self, client: &ServiceClient, state: &ResourceState) -> Result<ResourceState> {
        let path = format!("/v2.1/linegroups/{}", state.id);
        let body: Value = client.get(&path, "", ErrorContext::for_id(&state.id)).await?;
        Ok(Self::flatten(&state.id, &body))
    }

    async fn update(
        &self,
        client: &ServiceClient,
        state: &ResourceState,
        config: &ResourceData,
    ) -> Result<ResourceState> {
        let path = format!("/v2.1/linegroups/{}", state.id);
        let body = Self::build_body(config);
        let _resp: Value = client.put(&path, &body, ErrorContext::for_id(&state.id)).await?;
        self.read(client, state).await
    }

    async fn delete(&self, client: &ServiceClient, state: &ResourceState) -> Result<()> {
        let path = format!("/v2.1/linegroups/{}", state.id);
        check_deleted(client.delete(&path, ErrorContext::for_id(&state.id)).await).map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn body_and_flatten_round() {
        let Value::Object(map) = json!({
            "name": "group-1",
            "lines": ["line-1", "line-2"],
            "description": "primary lines"
        }) else {
            panic!("expected object");
        };
        let data = match ResourceData::new(&DnsLineGroup.schema(), map) {
            Ok(data) => data,
            Err(errors) => panic!("config should validate: {errors:?}"),
        };

        let body = DnsLineGroup::build_body(&data);
        assert_eq!(
            body,
            json!({
                "name": "group-1",
                "lines": ["line-1", "line-2"],
                "description": "primary lines"
            })
        );

        let resp = json!({
            "line_id": "lg-1",
            "name": "group-1",
            "lines": ["line-1", "line-2"],
            "status": "ACTIVE"
        });
        let state = DnsLineGroup::flatten("lg-1", &resp);
        assert_eq!(state.get_str("status"), Some("ENABLE"));
        assert_eq!(
            state.get_string_list("lines"),
            Some(vec!["line-1".to_string(), "line-2".to_string()])
        );
    }

    #[test]
    fn schema_requires_lines() {
        let Value::Object(map) = json!({"name": "group-1"}) else {
            panic!("expected object");
        };
        let res = ResourceData::new(&DnsLineGroup.schema(), map);
        assert!(res.is_err(), "lines should be required");
    }
}
