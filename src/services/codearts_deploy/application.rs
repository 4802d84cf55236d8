//! 部署应用资源

use async_trait::async_trait;
use serde_json::{Value, json};

use crate::client::{Service, ServiceClient};
use crate::error::{ErrorContext, ProviderError, Result};
use crate::flatten::{BodyBuilder, path_search, path_search_str};
use crate::resource::{Resource, check_deleted};
use crate::schema::{AttributeSchema, AttributeType, ResourceSchema};
use crate::state::{ResourceData, ResourceState};

use super::result_of;

/// 部署应用
///
/// - `POST /v1/applications`
/// - `GET /v1/applications/{app_id}/info`
/// - `PUT /v1/applications`
/// - `DELETE /v1/applications/{app_id}`
/// - `PUT /v1/applications/{app_id}/disable`
/// - `GET /v3/applications/permissions`
/// - `PUT /v1/projects/{project_id}/applications/groups/move`
pub struct DeployApplication;

impl DeployApplication {
    fn build_trigger(config: &ResourceData) -> Option<Value> {
        let trigger = BodyBuilder::new()
            .opt("trigger_source", config.get_str("trigger_source"))
            .opt(
                "artifact_source_system",
                config.get_str("artifact_source_system"),
            )
            .opt("artifact_type", config.get_str("artifact_type"))
            .build();
        (trigger != json!({})).then_some(trigger)
    }

    fn build_arrange_infos(config: &ResourceData) -> Option<Value> {
        let operation_list = config.get("operation_list").and_then(Value::as_array).map(|steps| {
            steps
                .iter()
                .map(|step| {
                    BodyBuilder::new()
                        .opt("name", path_search("name", step).cloned())
                        .opt("description", path_search("description", step).cloned())
                        .opt("code", path_search("code", step).cloned())
                        .opt("params", path_search("params", step).cloned())
                        .opt("entrance", path_search("entrance", step).cloned())
                        .opt("version", path_search("version", step).cloned())
                        .opt("module_id", path_search("module_id", step).cloned())
                        .build()
                })
                .collect::<Vec<Value>>()
        });

        let info = BodyBuilder::new()
            .opt("id", config.get_str("task_id"))
            .opt("template_id", config.get_str("template_id"))
            .opt("operation_list", operation_list)
            .build();
        (info != json!({})).then(|| Value::Array(vec![info]))
    }

    fn build_body(config: &ResourceData, app_id: Option<&str>) -> Value {
        BodyBuilder::new()
            .opt("id", app_id)
            .opt("project_id", config.get_str("project_id"))
            .opt("name", config.get_str("name"))
            .opt("description", config.get_str("description"))
            .opt("is_draft", config.get_bool("is_draft"))
            .opt("create_type", config.get_str("create_type"))
            .opt("slave_cluster_id", config.get_str("resource_pool_id"))
            .opt("group_id", config.get_str("group_id"))
            .opt("trigger", Self::build_trigger(config))
            .opt("arrange_infos", Self::build_arrange_infos(config))
            .build()
    }

    fn flatten(app_id: &str, body: &Value) -> ResourceState {
        let result = result_of(body);

        let mut state = ResourceState::new(app_id);
        state.set_path("project_id", result, "project_id");
        state.set_path("project_name", result, "project_name");
        state.set_path("name", result, "name");
        state.set_path("description", result, "description");
        state.set_path("create_type", result, "create_type");
        state.set_path("resource_pool_id", result, "slave_cluster_id");
        state.set_path("group_id", result, "group_id");
        state.set_path("is_draft", result, "is_draft");
        state.set_path("is_disable", result, "is_disable");
        state.set_path("created_at", result, "create_time");
        state.set_path("updated_at", result, "update_time");
        for permission in [
            "can_modify",
            "can_disable",
            "can_delete",
            "can_view",
            "can_execute",
            "can_copy",
            "can_manage",
            "can_create_env",
        ] {
            state.set_path(permission, result, permission);
        }
        state.set_path("task_id", result, "arrange_infos.0.id");
        state.set_path("task_name", result, "arrange_infos.0.name");
        state.set_path("steps", result, "arrange_infos.0.steps");
        state
    }

    /// 权限矩阵：每个角色一行
    fn flatten_permission_matrix(body: &Value) -> Value {
        let roles = result_of(body).as_array().cloned().unwrap_or_default();
        Value::Array(
            roles
                .iter()
                .map(|role| {
                    let mut row = BodyBuilder::new()
                        .opt("role_id", path_search("role_id", role).cloned())
                        .opt("role_name", path_search("name", role).cloned())
                        .opt("role_type", path_search("role_type", role).cloned());
                    for permission in [
                        "can_modify",
                        "can_disable",
                        "can_delete",
                        "can_view",
                        "can_execute",
                        "can_copy",
                        "can_manage",
                        "can_create_env",
                    ] {
                        row = row.opt(permission, path_search(permission, role).cloned());
                    }
                    row.build()
                })
                .collect(),
        )
    }

    async fn update_disable(client: &ServiceClient, app_id: &str, is_disable: bool) -> Result<()> {
        let path = format!("/v1/applications/{app_id}/disable");
        let _resp: Value = client
            .put(
                &path,
                &json!({"is_disable": is_disable}),
                ErrorContext::for_id(app_id),
            )
            .await?;
        Ok(())
    }

    async fn move_to_group(
        client: &ServiceClient,
        project_id: &str,
        app_id: &str,
        group_id: &str,
    ) -> Result<()> {
        let path = format!("/v1/projects/{project_id}/applications/groups/move");
        let body = json!({
            "group_id": group_id,
            "application_ids": [app_id]
        });
        let _resp: Value = client.put(&path, &body, ErrorContext::for_id(app_id)).await?;
        Ok(())
    }
}

#[async_trait]
impl Resource for DeployApplication {
    fn type_name(&self) -> &'static str {
        "codearts_deploy_application"
    }

    fn service(&self) -> Service {
        Service::CodeartsDeploy
    }

    fn schema(&self) -> ResourceSchema {
        ResourceSchema::new("codearts_deploy_application")
            .with_description("A CodeArts deploy application.")
            .attribute(
                AttributeSchema::new("project_id", AttributeType::String)
                    .required()
                    .force_new(),
            )
            .attribute(AttributeSchema::new("name", AttributeType::String).required())
            .attribute(
                AttributeSchema::new("description", AttributeType::String).optional().computed(),
            )
            .attribute(
                AttributeSchema::new("is_draft", AttributeType::Bool)
                    .optional()
                    .with_default(false),
            )
            .attribute(
                AttributeSchema::new("create_type", AttributeType::String)
                    .optional()
                    .computed()
                    .with_description("How the deployment task is created, e.g. \"template\"."),
            )
            .attribute(AttributeSchema::new("trigger_source", AttributeType::String).optional())
            .attribute(
                AttributeSchema::new("artifact_source_system", AttributeType::String).optional(),
            )
            .attribute(AttributeSchema::new("artifact_type", AttributeType::String).optional())
            .attribute(
                AttributeSchema::new("template_id", AttributeType::String)
                    .optional()
                    .force_new(),
            )
            .attribute(
                AttributeSchema::new(
                    "operation_list",
                    AttributeType::List(Box::new(AttributeType::Object)),
                )
                .optional()
                .with_description("Deployment steps when creating from a template."),
            )
            .attribute(AttributeSchema::new("resource_pool_id", AttributeType::String).optional())
            .attribute(
                AttributeSchema::new("group_id", AttributeType::String).optional().computed(),
            )
            .attribute(
                AttributeSchema::new("is_disable", AttributeType::Bool)
                    .optional()
                    .with_default(false),
            )
            .attribute(AttributeSchema::new("task_id", AttributeType::String).optional().computed())
            .attribute(AttributeSchema::new("task_name", AttributeType::String).computed())
            .attribute(
                AttributeSchema::new("steps", AttributeType::List(Box::new(AttributeType::Object)))
                    .computed(),
            )
            .attribute(
                AttributeSchema::new(
                    "permission_matrix",
                    AttributeType::List(Box::new(AttributeType::Object)),
                )
                .computed(),
            )
            .attribute(AttributeSchema::new("project_name", AttributeType::String).computed())
            .attribute(AttributeSchema::new("can_modify", AttributeType::Bool).computed())
            .attribute(AttributeSchema::new("can_disable", AttributeType::Bool).computed())
            .attribute(AttributeSchema::new("can_delete", AttributeType::Bool).computed())
            .attribute(AttributeSchema::new("can_view", AttributeType::Bool).computed())
            .attribute(AttributeSchema::new("can_execute", AttributeType::Bool).computed())
            .attribute(AttributeSchema::new("can_copy", AttributeType::Bool).computed())
            .attribute(AttributeSchema::new("can_manage", AttributeType::Bool).computed())
            .attribute(AttributeSchema::new("can_create_env", AttributeType::Bool).computed())
            .attribute(AttributeSchema::new("created_at", AttributeType::String).computed())
            .attribute(AttributeSchema::new("updated_at", AttributeType::String).computed())
    }

    async fn create(
        &self,
        client: &ServiceClient,
        config: &ResourceData,
    ) -> Result<ResourceState> {
        let body = Self::build_body(config, None);
        let ctx = ErrorContext::for_name(config.get_str("name").unwrap_or_default());
        let resp: Value = client.post("/v1/applications", &body, ctx).await?;

        let app_id = path_search_str("result.id", &resp)
            .or_else(|| path_search_str("id", &resp))
            .map(str::to_owned)
            .ok_or_else(|| ProviderError::ParseError {
                service: "codearts-deploy".to_string(),
                detail: "unable to find the application ID from the API response".to_string(),
            })?;

        // 创建后默认启用
        if config.get_bool("is_disable") == Some(true) {
            Self::update_disable(client, &app_id, true).await?;
        }

        let state = ResourceState::new(app_id);
        self.read(client, &state).await
    }

    async fn read(&self, client: &ServiceClient, state: &ResourceState) -> Result<ResourceState> {
        let path = format!("/v1/applications/{}/info", state.id);
        let body: Value = client.get(&path, "", ErrorContext::for_id(&state.id)).await?;
        let mut next = Self::flatten(&state.id, &body);

        // 权限矩阵拉取失败不阻塞 read
        let query = format!("app_id={}", urlencoding::encode(&state.id));
        match client
            .get::<Value>("/v3/applications/permissions", &query, ErrorContext::for_id(&state.id))
            .await
        {
            Ok(matrix) => next.set("permission_matrix", Self::flatten_permission_matrix(&matrix)),
            Err(e) => log::warn!("failed to retrieve application permission matrix: {e}"),
        }

        Ok(next)
    }

    async fn update(
        &self,
        client: &ServiceClient,
        state: &ResourceState,
        config: &ResourceData,
    ) -> Result<ResourceState> {
        let body = Self::build_body(config, Some(&state.id));
        let ctx = ErrorContext::for_id(&state.id);
        let _resp: Value = client.put("/v1/applications", &body, ctx).await?;

        if let Some(is_disable) = config.get_bool("is_disable")
            && state.get_bool("is_disable") != Some(is_disable)
        {
            Self::update_disable(client, &state.id, is_disable).await?;
        }

        // 分组变化时单独走移动接口
        if let Some(group_id) = config.get_str("group_id")
            && state.get_str("group_id") != Some(group_id)
        {
            let project_id = config.require_str("project_id")?;
            Self::move_to_group(client, project_id, &state.id, group_id).await?;
        }

        self.read(client, state).await
    }

    async fn delete(&self, client: &ServiceClient, state: &ResourceState) -> Result<()> {
        let path = format!("/v1/applications/{}", state.id);
        check_deleted(client.delete(&path, ErrorContext::for_id(&state.id)).await).map(|_| ())
    }
}
