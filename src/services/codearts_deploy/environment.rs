//! 部署环境资源

use async_trait::async_trait;
use serde_json::{Value, json};

use crate::client::{Service, ServiceClient};
use crate::error::{ErrorContext, ProviderError, Result};
use crate::flatten::{BodyBuilder, path_search, path_search_str};
use crate::import::{join_composite_id, parse_composite_id};
use crate::pagination::{Page, fetch_all};
use crate::resource::{Resource, check_deleted};
use crate::schema::{AttributeSchema, AttributeType, ResourceSchema};
use crate::state::{ResourceData, ResourceState};

use super::{MAX_PAGE_SIZE, result_of};

/// 应用下的部署环境，复合 ID `<application_id>/<environment_id>`
///
/// - `POST /v1/applications/{application_id}/environments`
/// - `GET /v1/applications/{application_id}/environments/{environment_id}`
/// - `PUT /v1/applications/{application_id}/environments/{environment_id}`
/// - `DELETE /v1/applications/{application_id}/environments/{environment_id}`
/// - `POST /v1/applications/{application_id}/environments/{environment_id}/hosts/import`
/// - `DELETE /v1/applications/{application_id}/environments/{environment_id}/{host_id}`
/// - `GET /v1/applications/{application_id}/environments/{environment_id}/hosts`
///
/// 环境内的主机列表按 `hosts` 配置对账：多退少补。
pub struct DeployEnvironment;

impl DeployEnvironment {
    fn split_id(id: &str) -> Result<(String, String)> {
        let parts = parse_composite_id(id, &["application_id", "environment_id"])?;
        Ok((parts[0].clone(), parts[1].clone()))
    }

    fn build_body(config: &ResourceData) -> Value {
        BodyBuilder::new()
            .opt("name", config.get_str("name"))
            .opt("description", config.get_str("description"))
            .opt("deploy_type", config.get_i64("deploy_type"))
            .opt("os", config.get_str("os_type"))
            .build()
    }

    /// 配置里的主机清单：(group_id, host_id) 对
    fn configured_hosts(config: &ResourceData) -> Vec<(String, String)> {
        config
            .get("hosts")
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(|item| {
                        let group_id = path_search_str("group_id", item)?;
                        let host_id = path_search_str("host_id", item)?;
                        Some((group_id.to_string(), host_id.to_string()))
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    fn flatten(id: &str, application_id: &str, body: &Value) -> ResourceState {
        let result = result_of(body);

        let mut state = ResourceState::new(id);
        state.set("application_id", application_id);
        state.set_path("name", result, "name");
        state.set_path("description", result, "description");
        state.set_path("deploy_type", result, "deploy_type");
        state.set_path("os_type", result, "os");
        state.set_path("instance_count", result, "instance_count");
        state.set_path("created_by", result, "created_by.user_name");
        state.set_path("created_at", result, "created_time");
        state
    }

    fn flatten_host(host: &Value) -> Value {
        BodyBuilder::new()
            .opt("group_id", path_search("group_id", host).cloned())
            .opt("host_id", path_search("host_id", host).cloned())
            .opt("host_name", path_search("host_name", host).cloned())
            .opt("ip_address", path_search("ip", host).cloned())
            .opt("connection_status", path_search("connection_status", host).cloned())
            .build()
    }

    /// 拉取环境内全部主机（分页），按 `as_proxy` 拆成主机与代理两组
    async fn list_hosts(
        client: &ServiceClient,
        application_id: &str,
        environment_id: &str,
    ) -> Result<(Vec<Value>, Vec<Value>)> {
        let path =
            format!("/v1/applications/{application_id}/environments/{environment_id}/hosts");

        let entries = fetch_all(MAX_PAGE_SIZE, |offset, limit| {
            let query = format!("limit={limit}&offset={offset}");
            let path = path.clone();
            async move {
                let body: Value = client
                    .get(&path, &query, ErrorContext::for_id(environment_id))
                    .await?;
                let items = result_of(&body).as_array().cloned().unwrap_or_default();
                let total_count = path_search("total", &body)
                    .and_then(Value::as_u64)
                    .and_then(|total| u32::try_from(total).ok());
                Ok(Page { items, total_count })
            }
        })
        .await?;

        let mut hosts = Vec::new();
        let mut proxies = Vec::new();
        for entry in &entries {
            let flattened = Self::flatten_host(entry);
            if path_search("as_proxy", entry).and_then(Value::as_bool) == Some(true) {
                proxies.push(flattened);
            } else {
                hosts.push(flattened);
            }
        }
        Ok((hosts, proxies))
    }

    /// 导入一批主机（按 group 分组逐组调用）
    async fn import_hosts(
        client: &ServiceClient,
        application_id: &str,
        environment_id: &str,
        hosts: &[(String, String)],
    ) -> Result<()> {
        let path = format!(
            "/v1/applications/{application_id}/environments/{environment_id}/hosts/import"
        );
        for (group_id, host_id) in hosts {
            let body = json!({"group_id": group_id, "host_ids": [host_id]});
            let _resp: Value = client
                .post(&path, &body, ErrorContext::for_id(environment_id))
                .await?;
        }
        Ok(())
    }

    /// 并发移除一批主机，收集第一个失败
    async fn remove_hosts(
        client: &ServiceClient,
        application_id: &str,
        environment_id: &str,
        host_ids: &[String],
    ) -> Result<()> {
        let futures: Vec<_> = host_ids
            .iter()
            .map(|host_id| {
                let path = format!(
                    "/v1/applications/{application_id}/environments/{environment_id}/{host_id}"
                );
                async move {
                    check_deleted(client.delete(&path, ErrorContext::for_id(host_id)).await)
                        .map(|_| ())
                }
            })
            .collect();

        let results = futures::future::join_all(futures).await;
        results.into_iter().collect()
    }
}

#[async_trait]
impl Resource for DeployEnvironment {
    fn type_name(&self) -> &'static str {
        "codearts_deploy_environment"
    }

    fn service(&self) -> Service {
        Service::CodeartsDeploy
    }

    fn schema(&self) -> ResourceSchema {
        ResourceSchema::new("codearts_deploy_environment")
            .with_description("A deployment environment within an application.")
            .attribute(
                AttributeSchema::new("application_id", AttributeType::String)
                    .required()
                    .force_new(),
            )
            .attribute(AttributeSchema::new("name", AttributeType::String).required())
            .attribute(
                AttributeSchema::new("deploy_type", AttributeType::Int)
                    .optional()
                    .force_new()
                    .with_default(0)
                    .with_description("Deployment type: 0 for hosts, 1 for kubernetes."),
            )
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
            .attribute(
                AttributeSchema::new("hosts", AttributeType::List(Box::new(AttributeType::Object)))
                    .optional()
                    .computed()
                    .with_description("Hosts in the environment, each with group_id and host_id."),
            )
            .attribute(
                AttributeSchema::new(
                    "proxies",
                    AttributeType::List(Box::new(AttributeType::Object)),
                )
                .computed(),
            )
            .attribute(AttributeSchema::new("instance_count", AttributeType::Int).computed())
            .attribute(AttributeSchema::new("created_by", AttributeType::String).computed())
            .attribute(AttributeSchema::new("created_at", AttributeType::String).computed())
    }

    async fn create(
        &self,
        client: &ServiceClient,
        config: &ResourceData,
    ) -> Result<ResourceState> {
        let application_id = config.require_str("application_id")?;
        let path = format!("/v1/applications/{application_id}/environments");
        let body = Self::build_body(config);
        let ctx = ErrorContext::for_name(config.get_str("name").unwrap_or_default());
        let resp: Value = client.post(&path, &body, ctx).await?;

        let environment_id = path_search_str("id", &resp)
            .or_else(|| path_search_str("result.id", &resp))
            .map(str::to_owned)
            .ok_or_else(|| ProviderError::ParseError {
                service: "codearts-deploy".to_string(),
                detail: "unable to find the environment ID from the API response".to_string(),
            })?;

        let hosts = Self::configured_hosts(config);
        if !hosts.is_empty() {
            Self::import_hosts(client, application_id, &environment_id, &hosts).await?;
        }

        let state =
            ResourceState::new(join_composite_id(&[application_id, environment_id.as_str()]));
        self.read(client, &state).await
    }

    async fn read(&self, client: &ServiceClient, state: &ResourceState) -> Result<ResourceState> {
        let (application_id, environment_id) = Self::split_id(&state.id)?;

        let path = format!("/v1/applications/{application_id}/environments/{environment_id}");
        let body: Value = client
            .get(&path, "", ErrorContext::for_id(&environment_id))
            .await?;
        let mut next = Self::flatten(&state.id, &application_id, &body);

        let (hosts, proxies) = Self::list_hosts(client, &application_id, &environment_id).await?;
        next.set("hosts", Value::Array(hosts));
        next.set("proxies", Value::Array(proxies));
        Ok(next)
    }

    async fn update(
        &self,
        client: &ServiceClient,
        state: &ResourceState,
        config: &ResourceData,
    ) -> Result<ResourceState> {
        let (application_id, environment_id) = Self::split_id(&state.id)?;

        let path = format!("/v1/applications/{application_id}/environments/{environment_id}");
        let body = BodyBuilder::new()
            .opt("name", config.get_str("name"))
            .opt("description", config.get_str("description"))
            .build();
        let _resp: Value = client
            .put(&path, &body, ErrorContext::for_id(&environment_id))
            .await?;

        // 主机对账：配置减状态为待导入，状态减配置为待移除
        if config.contains("hosts") {
            let desired = Self::configured_hosts(config);
            let current: Vec<(String, String)> = state
                .get("hosts")
                .and_then(Value::as_array)
                .map(|items| {
                    items
                        .iter()
                        .filter_map(|item| {
                            let group_id = path_search_str("group_id", item)?;
                            let host_id = path_search_str("host_id", item)?;
                            Some((group_id.to_string(), host_id.to_string()))
                        })
                        .collect()
                })
                .unwrap_or_default();

            let added: Vec<(String, String)> = desired
                .iter()
                .filter(|pair| !current.contains(pair))
                .cloned()
                .collect();
            let removed: Vec<String> = current
                .iter()
                .filter(|pair| !desired.contains(pair))
                .map(|(_, host_id)| host_id.clone())
                .collect();

            if !added.is_empty() {
                Self::import_hosts(client, &application_id, &environment_id, &added).await?;
            }
            if !removed.is_empty() {
                Self::remove_hosts(client, &application_id, &environment_id, &removed).await?;
            }
        }

        self.read(client, state).await
    }

    async fn delete(&self, client: &ServiceClient, state: &ResourceState) -> Result<()> {
        let (application_id, environment_id) = Self::split_id(&state.id)?;
        let path = format!("/v1/applications/{application_id}/environments/{environment_id}");
        check_deleted(
            client
                .delete(&path, ErrorContext::for_id(&environment_id))
                .await,
        )
        .map(|_| ())
    }

    fn import(&self, id: &str) -> Result<ResourceState> {
        let (application_id, _) = Self::split_id(id)?;
        let mut state = ResourceState::new(id);
        state.set("application_id", application_id);
        Ok(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(value: Value) -> ResourceData {
        let Value::Object(map) = value else {
            panic!("expected object");
        };
        match ResourceData::new(&DeployEnvironment.schema(), map) {
            Ok(data) => data,
            Err(errors) => panic!("config should validate: {errors:?}"),
        }
    }

    #[test]
    fn body_maps_os_type_and_deploy_type() {
        let data = config(json!({
            "application_id": "app-1",
            "name": "staging",
            "os_type": "linux"
        }));
        let body = DeployEnvironment::build_body(&data);
        assert_eq!(body.get("os"), Some(&json!("linux")));
        assert_eq!(body.get("deploy_type"), Some(&json!(0)));
    }

    #[test]
    fn configured_hosts_extracts_pairs() {
        let data = config(json!({
            "application_id": "app-1",
            "name": "staging",
            "os_type": "linux",
            "hosts": [
                {"group_id": "hg-1", "host_id": "h-1"},
                {"group_id": "hg-1", "host_id": "h-2"},
                {"host_id": "orphan"}
            ]
        }));
        let hosts = DeployEnvironment::configured_hosts(&data);
        assert_eq!(
            hosts,
            vec![
                ("hg-1".to_string(), "h-1".to_string()),
                ("hg-1".to_string(), "h-2".to_string())
            ]
        );
    }

    #[test]
    fn flatten_host_entry() {
        let host = json!({
            "group_id": "hg-1",
            "host_id": "h-1",
            "host_name": "web-1",
            "ip": "192.0.2.10",
            "connection_status": "success",
            "as_proxy": false
        });
        let item = DeployEnvironment::flatten_host(&host);
        assert_eq!(item.get("ip_address"), Some(&json!("192.0.2.10")));
        assert_eq!(item.get("as_proxy"), None, "as_proxy only drives grouping");
    }

    #[test]
    fn import_splits_composite_id() {
        let res = DeployEnvironment.import("app-1/env-1");
        assert!(res.is_ok(), "expected Ok(..), got {res:?}");
        let Ok(state) = res else {
            return;
        };
        assert_eq!(state.get_str("application_id"), Some("app-1"));
        assert!(DeployEnvironment.import("env-1").is_err());
    }
}
