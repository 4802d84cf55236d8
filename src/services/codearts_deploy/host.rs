//! 主机资源

use async_trait::async_trait;
use serde_json::Value;

use crate::client::{Service, ServiceClient};
use crate::error::{ErrorContext, ProviderError, Result};
use crate::flatten::{BodyBuilder, path_search_str};
use crate::import::{join_composite_id, parse_composite_id};
use crate::resource::{Resource, check_deleted};
use crate::schema::{AttributeSchema, AttributeType, ResourceSchema};
use crate::state::{ResourceData, ResourceState};

use super::result_of;

/// 主机集群中的目标主机，复合 ID `<group_id>/<host_id>`
///
/// - `POST /v1/resources/host-groups/{group_id}/hosts`
/// - `GET /v1/resources/host-groups/{group_id}/hosts/{host_id}`
/// - `PUT /v1/resources/host-groups/{group_id}/hosts/{host_id}`
/// - `DELETE /v1/resources/host-groups/{group_id}/hosts/{host_id}`
pub struct DeployHost;

impl DeployHost {
    fn build_body(config: &ResourceData) -> Value {
        // 凭证按 API 的嵌套结构传递
        let authorization = BodyBuilder::new()
            .opt("username", config.get_str("username"))
            .opt("password", config.get_str("password"))
            .opt("private_key", config.get_str("private_key"))
            .opt("trusted_type", config.get_i64("trusted_type"))
            .build();

        BodyBuilder::new()
            .opt("host_name", config.get_str("name"))
            .opt("ip_address", config.get_str("ip_address"))
            .opt("port", config.get_i64("port"))
            .opt("os", config.get_str("os_type"))
            .opt("as_proxy", config.get_bool("as_proxy"))
            .opt("proxy_host_id", config.get_str("proxy_host_id"))
            .opt("install_icagent", config.get_bool("install_icagent"))
            .opt("authorization", Some(authorization))
            .build()
    }

    fn flatten(id: &str, group_id: &str, body: &Value) -> ResourceState {
        let result = result_of(body);

        let mut state = ResourceState::new(id);
        state.set("group_id", group_id);
        state.set_path("name", result, "host_name");
        state.set_path("ip_address", result, "ip_address");
        state.set_path("port", result, "port");
        state.set_path("os_type", result, "os");
        state.set_path("as_proxy", result, "as_proxy");
        state.set_path("proxy_host_id", result, "proxy_host_id");
        state.set_path("username", result, "authorization.username");
        state.set_path("trusted_type", result, "authorization.trusted_type");
        state.set_path("connection_status", result, "connection_status");
        state.set_path("lastest_connection_at", result, "lastest_connection_time");
        state.set_path("created_at", result, "create_time");
        state.set_path("updated_at", result, "update_time");
        state
    }

    fn split_id(id: &str) -> Result<(String, String)> {
        let parts = parse_composite_id(id, &["group_id", "host_id"])?;
        Ok((parts[0].clone(), parts[1].clone()))
    }
}

#[async_trait]
impl Resource for DeployHost {
    fn type_name(&self) -> &'static str {
        "codearts_deploy_host"
    }

    fn service(&self) -> Service {
        Service::CodeartsDeploy
    }

    fn schema(&self) -> ResourceSchema {
        ResourceSchema::new("codearts_deploy_host")
            .with_description("A deployment target host within a host group.")
            .attribute(
                AttributeSchema::new("group_id", AttributeType::String)
                    .required()
                    .force_new(),
            )
            .attribute(AttributeSchema::new("name", AttributeType::String).required())
            .attribute(AttributeSchema::new("ip_address", AttributeType::String).required())
            .attribute(AttributeSchema::new("port", AttributeType::Int).required())
            .attribute(
                AttributeSchema::new(
                    "os_type",
                    AttributeType::Enum(vec!["windows".to_string(), "linux".to_string()]),
                )
                .required()
                .force_new(),
            )
            .attribute(AttributeSchema::new("username", AttributeType::String).required())
            .attribute(
                AttributeSchema::new("password", AttributeType::String)
                    .optional()
                    .sensitive(),
            )
            .attribute(
                AttributeSchema::new("private_key", AttributeType::String)
                    .optional()
                    .sensitive(),
            )
            .attribute(
                AttributeSchema::new("trusted_type", AttributeType::Int)
                    .optional()
                    .computed()
                    .with_description("Authentication type: 0 for password, 1 for key pair."),
            )
            .attribute(
                AttributeSchema::new("as_proxy", AttributeType::Bool)
                    .optional()
                    .with_default(false),
            )
            .attribute(AttributeSchema::new("proxy_host_id", AttributeType::String).optional())
            .attribute(
                AttributeSchema::new("install_icagent", AttributeType::Bool)
                    .optional()
                    .with_default(false),
            )
            .attribute(AttributeSchema::new("connection_status", AttributeType::String).computed())
            .attribute(
                AttributeSchema::new("lastest_connection_at", AttributeType::String).computed(),
            )
            .attribute(AttributeSchema::new("created_at", AttributeType::String).computed())
            .attribute(AttributeSchema::new("updated_at", AttributeType::String).computed())
    }

    async fn create(
        &self,
        client: &ServiceClient,
        config: &ResourceData,
    ) -> Result<ResourceState> {
        let group_id = config.require_str("group_id")?;
        let path = format!("/v1/resources/host-groups/{group_id}/hosts");
        let body = Self::build_body(config);
        let ctx = ErrorContext::for_name(config.get_str("name").unwrap_or_default());
        let resp: Value = client.post(&path, &body, ctx).await?;

        let host_id = path_search_str("result.id", &resp)
            .or_else(|| path_search_str("id", &resp))
            .map(str::to_owned)
            .ok_or_else(|| ProviderError::ParseError {
                service: "codearts-deploy".to_string(),
                detail: "unable to find the host ID from the API response".to_string(),
            })?;

        let state = ResourceState::new(join_composite_id(&[group_id, host_id.as_str()]));
        self.read(client, &state).await
    }

    async fn read(&self, client: &ServiceClient, state: &ResourceState) -> Result<ResourceState> {
        let (group_id, host_id) = Self::split_id(&state.id)?;
        let path = format!("/v1/resources/host-groups/{group_id}/hosts/{host_id}");
        let body: Value = client.get(&path, "", ErrorContext::for_id(&host_id)).await?;
        let mut next = Self::flatten(&state.id, &group_id, &body);

        // 凭证不会回读，保留本地值
        for secret in ["password", "private_key"] {
            if let Some(value) = state.get(secret) {
                next.set(secret, value.clone());
            }
        }
        Ok(next)
    }

    async fn update(
        &self,
        client: &ServiceClient,
        state: &ResourceState,
        config: &ResourceData,
    ) -> Result<ResourceState> {
        let (group_id, host_id) = Self::split_id(&state.id)?;
        let path = format!("/v1/resources/host-groups/{group_id}/hosts/{host_id}");
        let body = Self::build_body(config);
        let _resp: Value = client.put(&path, &body, ErrorContext::for_id(&host_id)).await?;
        self.read(client, state).await
    }

    async fn delete(&self, client: &ServiceClient, state: &ResourceState) -> Result<()> {
        let (group_id, host_id) = Self::split_id(&state.id)?;
        let path = format!("/v1/resources/host-groups/{group_id}/hosts/{host_id}");
        check_deleted(client.delete(&path, ErrorContext::for_id(&host_id)).await).map(|_| ())
    }

    fn import(&self, id: &str) -> Result<ResourceState> {
        let (group_id, _) = Self::split_id(id)?;
        let mut state = ResourceState::new(id);
        state.set("group_id", group_id);
        Ok(state)
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
        match ResourceData::new(&DeployHost.schema(), map) {
            Ok(data) => data,
            Err(errors) => panic!("config should validate: {errors:?}"),
        }
    }

    fn base_config() -> Value {
        json!({
            "group_id": "hg-1",
            "name": "web-1",
            "ip_address": "192.0.2.10",
            "port": 22,
            "os_type": "linux",
            "username": "root",
            "password": "secret"
        })
    }

    #[test]
    fn body_nests_authorization() {
        let data = config(base_config());
        let body = DeployHost::build_body(&data);
        assert_eq!(
            body.get("authorization"),
            Some(&json!({"username": "root", "password": "secret"}))
        );
        assert_eq!(body.get("host_name"), Some(&json!("web-1")));
        assert_eq!(body.get("username"), None);
        // 默认值也随请求体发送
        assert_eq!(body.get("as_proxy"), Some(&json!(false)));
    }

    #[test]
    fn password_and_key_are_sensitive() {
        let schema = DeployHost.schema();
        for attr in ["password", "private_key"] {
            let Some(field) = schema.get(attr) else {
                panic!("schema should define {attr}");
            };
            assert!(field.sensitive, "{attr} must be marked sensitive");
        }
    }

    #[test]
    fn flatten_keeps_group_and_connection_fields() {
        let body = json!({
            "result": {
                "id": "host-1",
                "host_name": "web-1",
                "ip_address": "192.0.2.10",
                "port": 22,
                "os": "linux",
                "authorization": {"username": "root", "trusted_type": 0},
                "connection_status": "success"
            }
        });
        let state = DeployHost::flatten("hg-1/host-1", "hg-1", &body);
        assert_eq!(state.get_str("group_id"), Some("hg-1"));
        assert_eq!(state.get_str("os_type"), Some("linux"));
        assert_eq!(state.get_str("username"), Some("root"));
        assert_eq!(state.get_str("connection_status"), Some("success"));
    }

    #[test]
    fn import_splits_composite_id() {
        let res = DeployHost.import("hg-1/host-1");
        assert!(res.is_ok(), "expected Ok(..), got {res:?}");
        let Ok(state) = res else {
            return;
        };
        assert_eq!(state.get_str("group_id"), Some("hg-1"));
        assert!(DeployHost.import("host-1").is_err());
    }
}
