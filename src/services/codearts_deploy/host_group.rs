//! 主机集群资源

use async_trait::async_trait;
use serde_json::Value;

use crate::client::{Service, ServiceClient};
use crate::error::{ErrorContext, ProviderError, Result};
use crate::flatten::{BodyBuilder, path_search_str};
use crate::resource::{Resource, check_deleted};
use crate::schema::{AttributeSchema, AttributeType, ResourceSchema};
use crate::state::{ResourceData, ResourceState};

use super::result_of;

/// 主机集群（部署目标主机的分组）
///
/// - `POST /v1/resources/host-groups`
/// - `GET /v1/resources/host-groups/{group_id}`
/// - `PUT /v1/resources/host-groups/{group_id}`
/// - `DELETE /v1/resources/host-groups/{group_id}`
pub struct DeployHostGroup;

impl DeployHostGroup {
    fn build_create_body(config: &ResourceData) -> Value {
        BodyBuilder::new()
            .opt("project_id", config.get_str("project_id"))
            .opt("name", config.get_str("name"))
            .opt("os", config.get_str("os_type"))
            .opt("description", config.get_str("description"))
            .opt("slave_cluster_id", config.get_str("resource_pool_id"))
            .build()
    }

    fn build_update_body(config: &ResourceData) -> Value {
        BodyBuilder::new()
            .opt("name", config.get_str("name"))
            .opt("description", config.get_str("description"))
            .opt("slave_cluster_id", config.get_str("resource_pool_id"))
            .build()
    }

    fn flatten(group_id: &str, body: &Value) -> ResourceState {
        let result = result_of(body);

        let mut state = ResourceState::new(group_id);
        state.set_path("project_id", result, "project_id");
        state.set_path("name", result, "name");
        state.set_path("os_type", result, "os");
        state.set_path("description", result, "description");
        state.set_path("resource_pool_id", result, "slave_cluster_id");
        state.set_path("host_count", result, "host_count");
        state.set_path("created_by", result, "created_by.user_name");
        state.set_path("updated_by", result, "updated_by.user_name");
        state.set_path("created_at", result, "create_time");
        state.set_path("updated_at", result, "update_time");
        state
    }
}

#[async_trait]
impl Resource for DeployHostGroup {
    fn type_name(&self) -> &'static str {
        "codearts_deploy_host_group"
    }

    fn service(&self) -> Service {
        Service::CodeartsDeploy
    }

    fn schema(&self) -> ResourceSchema {
        ResourceSchema::new("codearts_deploy_host_group")
            .with_description("A cluster of deployment target hosts.")
            .attribute(
                AttributeSchema::new("project_id", AttributeType::String)
                    .required()
                    .force_new(),
            )
            .attribute(AttributeSchema::new("name", AttributeType::String).required())
            .attribute(
                AttributeSchema::new(
                    "os_type",
                    AttributeType::Enum(vec!["windows".to_string(), "linux".to_string()]),
                )
                .required()
                .force_new(),
            )
            .attribute(
                AttributeSchema::new("description", AttributeType::String).optional().computed(),
            )
            .attribute(AttributeSchema::new("resource_pool_id", AttributeType::String).optional())
            .attribute(AttributeSchema::new("host_count", AttributeType::Int).computed())
            .attribute(AttributeSchema::new("created_by", AttributeType::String).computed())
            .attribute(AttributeSchema::new("updated_by", AttributeType::String).computed())
            .attribute(AttributeSchema::new("created_at", AttributeType::String).computed())
            .attribute(AttributeSchema::new("updated_at", AttributeType::String).computed())
    }

    async fn create(
        &self,
        client: &ServiceClient,
        config: &ResourceData,
    ) -> Result<ResourceState> {
        let body = Self::build_create_body(config);
        let ctx = ErrorContext::for_name(config.get_str("name").unwrap_or_default());
        let resp: Value = client.post("/v1/resources/host-groups", &body, ctx).await?;

        let id = path_search_str("result.id", &resp)
            .or_else(|| path_search_str("id", &resp))
            .map(str::to_owned)
            .ok_or_else(|| ProviderError::ParseError {
                service: "codearts-deploy".to_string(),
                detail: "unable to find the host group ID from the API response".to_string(),
            })?;

        let state = ResourceState::new(id);
        self.read(client, &state).await
    }

    async fn read(&self, client: &ServiceClient, state: &ResourceState) -> Result<ResourceState> {
        let path = format!("/v1/resources/host-groups/{}", state.id);
        let body: Value = client.get(&path, "", ErrorContext::for_id(&state.id)).await?;
        Ok(Self::flatten(&state.id, &body))
    }

    async fn update(
        &self,
        client: &ServiceClient,
        state: &ResourceState,
        config: &ResourceData,
    ) -> Result<ResourceState> {
        let path = format!("/v1/resources/host-groups/{}", state.id);
        let body = Self::build_update_body(config);
        let _resp: Value = client.put(&path, &body, ErrorContext::for_id(&state.id)).await?;
        self.read(client, state).await
    }

    async fn delete(&self, client: &ServiceClient, state: &ResourceState) -> Result<()> {
        let path = format!("/v1/resources/host-groups/{}", state.id);
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
        match ResourceData::new(&DeployHostGroup.schema(), map) {
            Ok(data) => data,
            Err(errors) => panic!("config should validate: {errors:?}"),
        }
    }

    #[test]
    fn create_body_maps_os_type_to_os() {
        let data = config(json!({
            "project_id": "prj-1",
            "name": "cluster-a",
            "os_type": "linux"
        }));
        let body = DeployHostGroup::build_create_body(&data);
        assert_eq!(body.get("os"), Some(&json!("linux")));
        assert_eq!(body.get("os_type"), None);
    }

    #[test]
    fn update_body_omits_force_new_fields() {
        let data = config(json!({
            "project_id": "prj-1",
            "name": "cluster-a",
            "os_type": "linux",
            "description": "updated"
        }));
        let body = DeployHostGroup::build_update_body(&data);
        assert_eq!(body.get("project_id"), None);
        assert_eq!(body.get("os"), None);
        assert_eq!(body.get("description"), Some(&json!("updated")));
    }

    #[test]
    fn schema_rejects_unknown_os() {
        let Value::Object(map) = json!({
            "project_id": "prj-1",
            "name": "cluster-a",
            "os_type": "solaris"
        }) else {
            panic!("expected object");
        };
        assert!(ResourceData::new(&DeployHostGroup.schema(), map).is_err());
    }

    #[test]
    fn flatten_host_group() {
        let body = json!({
            "result": {
                "id": "hg-1",
                "name": "cluster-a",
                "os": "linux",
                "host_count": 3,
                "created_by": {"user_name": "dev"}
            }
        });
        let state = DeployHostGroup::flatten("hg-1", &body);
        assert_eq!(state.get_str("os_type"), Some("linux"));
        assert_eq!(state.get_i64("host_count"), Some(3));
        assert_eq!(state.get_str("created_by"), Some("dev"));
    }
}
