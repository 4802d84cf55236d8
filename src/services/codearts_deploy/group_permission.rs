//! 主机集群权限资源

use async_trait::async_trait;
use serde_json::{Value, json};

use crate::client::{Service, ServiceClient};
use crate::error::{ErrorContext, ProviderError, Result};
use crate::flatten::{path_search, path_search_str};
use crate::import::{join_composite_id, parse_composite_id};
use crate::resource::Resource;
use crate::schema::{AttributeSchema, AttributeType, ResourceSchema};
use crate::state::{ResourceData, ResourceState};

use super::result_of;

const PERMISSION_NAMES: &[&str] = &[
    "can_view",
    "can_edit",
    "can_delete",
    "can_add_host",
    "can_manage",
    "can_copy",
];

/// 角色在主机集群上的单项权限开关，
/// 复合 ID `<project_id>/<group_id>/<role_id>/<permission_name>`
///
/// - `PUT /v2/host-groups/permissions`
/// - `GET /v2/host-groups/permissions`
///
/// 该 API 只有"设置开关"语义，没有删除端点：delete 将开关重置为 false。
pub struct DeployHostGroupPermission;

impl DeployHostGroupPermission {
    fn split_id(id: &str) -> Result<(String, String, String, String)> {
        let parts = parse_composite_id(
            id,
            &["project_id", "group_id", "role_id", "permission_name"],
        )?;
        Ok((
            parts[0].clone(),
            parts[1].clone(),
            parts[2].clone(),
            parts[3].clone(),
        ))
    }

    async fn set_permission(
        client: &ServiceClient,
        project_id: &str,
        group_id: &str,
        role_id: &str,
        permission_name: &str,
        permission_value: bool,
    ) -> Result<()> {
        let body = json!({
            "project_id": project_id,
            "group_id": group_id,
            "role_id": role_id,
            "permission_name": permission_name,
            "permission_value": permission_value,
        });
        let _resp: Value = client
            .put(
                "/v2/host-groups/permissions",
                &body,
                ErrorContext::for_id(role_id),
            )
            .await?;
        Ok(())
    }

    /// 在权限矩阵里找到指定角色的一行
    fn find_role<'a>(role_id: &str, matrix: &'a Value) -> Option<&'a Value> {
        result_of(matrix)
            .as_array()?
            .iter()
            .find(|role| path_search_str("role_id", role) == Some(role_id))
    }
}

#[async_trait]
impl Resource for DeployHostGroupPermission {
    fn type_name(&self) -> &'static str {
        "codearts_deploy_host_group_permission"
    }

    fn service(&self) -> Service {
        Service::CodeartsDeploy
    }

    fn schema(&self) -> ResourceSchema {
        ResourceSchema::new("codearts_deploy_host_group_permission")
            .with_description("A single role permission switch on a host group.")
            .attribute(
                AttributeSchema::new("project_id", AttributeType::String)
                    .required()
                    .force_new(),
            )
            .attribute(
                AttributeSchema::new("group_id", AttributeType::String)
                    .required()
                    .force_new(),
            )
            .attribute(
                AttributeSchema::new("role_id", AttributeType::String)
                    .required()
                    .force_new(),
            )
            .attribute(
                AttributeSchema::new(
                    "permission_name",
                    AttributeType::Enum(
                        PERMISSION_NAMES.iter().map(ToString::to_string).collect(),
                    ),
                )
                .required()
                .force_new(),
            )
            .attribute(
                AttributeSchema::new("permission_value", AttributeType::Bool).required(),
            )
            .attribute(AttributeSchema::new("role_name", AttributeType::String).computed())
    }

    async fn create(
        &self,
        client: &ServiceClient,
        config: &ResourceData,
    ) -> Result<ResourceState> {
        let project_id = config.require_str("project_id")?;
        let group_id = config.require_str("group_id")?;
        let role_id = config.require_str("role_id")?;
        let permission_name = config.require_str("permission_name")?;
        let permission_value = config.get_bool("permission_value").unwrap_or_default();

        Self::set_permission(
            client,
            project_id,
            group_id,
            role_id,
            permission_name,
            permission_value,
        )
        .await?;

        let state = ResourceState::new(join_composite_id(&[
            project_id,
            group_id,
            role_id,
            permission_name,
        ]));
        self.read(client, &state).await
    }

    async fn read(&self, client: &ServiceClient, state: &ResourceState) -> Result<ResourceState> {
        let (project_id, group_id, role_id, permission_name) = Self::split_id(&state.id)?;

        let query = format!(
            "project_id={}&group_id={}",
            urlencoding::encode(&project_id),
            urlencoding::encode(&group_id)
        );
        let matrix: Value = client
            .get(
                "/v2/host-groups/permissions",
                &query,
                ErrorContext::for_id(&role_id),
            )
            .await?;

        let Some(role) = Self::find_role(&role_id, &matrix) else {
            return Err(ProviderError::ResourceNotFound {
                service: "codearts-deploy".to_string(),
                resource_id: state.id.clone(),
                raw_message: None,
            });
        };

        let mut next = ResourceState::new(&state.id);
        next.set("project_id", project_id.as_str());
        next.set("group_id", group_id.as_str());
        next.set("role_id", role_id.as_str());
        next.set("permission_name", permission_name.as_str());
        next.set_path("role_name", role, "name");
        if let Some(value) = path_search(&permission_name, role).and_then(Value::as_bool) {
            next.set("permission_value", value);
        }
        Ok(next)
    }

    async fn update(
        &self,
        client: &ServiceClient,
        state: &ResourceState,
        config: &ResourceData,
    ) -> Result<ResourceState> {
        let (project_id, group_id, role_id, permission_name) = Self::split_id(&state.id)?;
        let permission_value = config.get_bool("permission_value").unwrap_or_default();

        Self::set_permission(
            client,
            &project_id,
            &group_id,
            &role_id,
            &permission_name,
            permission_value,
        )
        .await?;
        self.read(client, state).await
    }

    /// 没有删除端点，移除即恢复默认：把开关置回 false
    async fn delete(&self, client: &ServiceClient, state: &ResourceState) -> Result<()> {
        let (project_id, group_id, role_id, permission_name) = Self::split_id(&state.id)?;
        Self::set_permission(client, &project_id, &group_id, &role_id, &permission_name, false)
            .await
    }

    fn import(&self, id: &str) -> Result<ResourceState> {
        let (project_id, group_id, role_id, permission_name) = Self::split_id(id)?;
        let mut state = ResourceState::new(id);
        state.set("project_id", project_id);
        state.set("group_id", group_id);
        state.set("role_id", role_id);
        state.set("permission_name", permission_name);
        Ok(state)
    }
}
