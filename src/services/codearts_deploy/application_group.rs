//! 应用分组资源

use async_trait::async_trait;
use serde_json::Value;

use crate::client::{Service, ServiceClient};
use crate::error::{ErrorContext, ProviderError, Result};
use crate::flatten::{BodyBuilder, path_search, path_search_str};
use crate::import::{join_composite_id, parse_composite_id};
use crate::resource::{Resource, check_deleted};
use crate::schema::{AttributeSchema, AttributeType, ResourceSchema};
use crate::state::{ResourceData, ResourceState};

use super::result_of;

/// 应用分组（树形结构），复合 ID `<project_id>/<group_id>`
///
/// - `POST /v1/projects/{project_id}/applications/groups`
/// - `GET /v1/projects/{project_id}/applications/groups`
/// - `PUT /v1/projects/{project_id}/applications/groups/{group_id}`
/// - `DELETE /v1/projects/{project_id}/applications/groups/{group_id}`
///
/// 分组没有单对象 GET，read 在分组树中递归查找。
pub struct DeployApplicationGroup;

impl DeployApplicationGroup {
    fn split_id(id: &str) -> Result<(String, String)> {
        let parts = parse_composite_id(id, &["project_id", "group_id"])?;
        Ok((parts[0].clone(), parts[1].clone()))
    }

    fn build_body(config: &ResourceData) -> Value {
        BodyBuilder::new()
            .opt("name", config.get_str("name"))
            .opt("parent_id", config.get_str("parent_id"))
            .build()
    }

    /// 在分组树中递归查找指定 ID 的分组
    fn find_group<'a>(group_id: &str, groups: &'a [Value]) -> Option<&'a Value> {
        for group in groups {
            if path_search_str("id", group) == Some(group_id) {
                return Some(group);
            }
            if let Some(children) = path_search("children", group).and_then(Value::as_array)
                && let Some(found) = Self::find_group(group_id, children)
            {
                return Some(found);
            }
        }
        None
    }

    fn flatten(id: &str, project_id: &str, group: &Value) -> ResourceState {
        let mut state = ResourceState::new(id);
        state.set("project_id", project_id);
        state.set_path("name", group, "name");
        state.set_path("parent_id", group, "parent_id");
        state.set_path("path", group, "path");
        state.set_path("ordinal", group, "ordinal");
        state.set_path("application_count", group, "application_count");
        state.set_path("created_by", group, "created_by.user_name");
        state.set_path("updated_by", group, "updated_by.user_name");
        state
    }
}

#[async_trait]
impl Resource for DeployApplicationGroup {
    fn type_name(&self) -> &'static str {
        "codearts_deploy_application_group"
    }

    fn service(&self) -> Service {
        Service::CodeartsDeploy
    }

    fn schema(&self) -> ResourceSchema {
        ResourceSchema::new("codearts_deploy_application_group")
            .with_description("A group for organizing deploy applications, tree structured.")
            .attribute(
                AttributeSchema::new("project_id", AttributeType::String)
                    .required()
                    .force_new(),
            )
            .attribute(AttributeSchema::new("name", AttributeType::String).required())
            .attribute(
                AttributeSchema::new("parent_id", AttributeType::String)
                    .optional()
                    .force_new(),
            )
            .attribute(AttributeSchema::new("path", AttributeType::String).computed())
            .attribute(AttributeSchema::new("ordinal", AttributeType::Int).computed())
            .attribute(AttributeSchema::new("application_count", AttributeType::Int).computed())
            .attribute(AttributeSchema::new("created_by", AttributeType::String).computed())
            .attribute(AttributeSchema::new("updated_by", AttributeType::String).computed())
    }

    async fn create(
        &self,
        client: &ServiceClient,
        config: &ResourceData,
    ) -> Result<ResourceState> {
        let project_id = config.require_str("project_id")?;
        let path = format!("/v1/projects/{project_id}/applications/groups");
        let body = Self::build_body(config);
        let ctx = ErrorContext::for_name(config.get_str("name").unwrap_or_default());
        let resp: Value = client.post(&path, &body, ctx).await?;

        let group_id = path_search_str("result.id", &resp)
            .or_else(|| path_search_str("id", &resp))
            .map(str::to_owned)
            .ok_or_else(|| ProviderError::ParseError {
                service: "codearts-deploy".to_string(),
                detail: "unable to find the application group ID from the API response".to_string(),
            })?;

        let state = ResourceState::new(join_composite_id(&[project_id, group_id.as_str()]));
        self.read(client, &state).await
    }

    async fn read(&self, client: &ServiceClient, state: &ResourceState) -> Result<ResourceState> {
        let (project_id, group_id) = Self::split_id(&state.id)?;

        let path = format!("/v1/projects/{project_id}/applications/groups");
        let body: Value = client.get(&path, "", ErrorContext::for_id(&group_id)).await?;
        let groups = result_of(&body).as_array().cloned().unwrap_or_default();

        match Self::find_group(&group_id, &groups) {
            Some(group) => Ok(Self::flatten(&state.id, &project_id, group)),
            None => Err(ProviderError::ResourceNotFound {
                service: "codearts-deploy".to_string(),
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
        let (project_id, group_id) = Self::split_id(&state.id)?;

        let path = format!("/v1/projects/{project_id}/applications/groups/{group_id}");
        let body = BodyBuilder::new().opt("name", config.get_str("name")).build();
        let _resp: Value = client.put(&path, &body, ErrorContext::for_id(&group_id)).await?;
        self.read(client, state).await
    }

    async fn delete(&self, client: &ServiceClient, state: &ResourceState) -> Result<()> {
        let (project_id, group_id) = Self::split_id(&state.id)?;
        let path = format!("/v1/projects/{project_id}/applications/groups/{group_id}");
        check_deleted(client.delete(&path, ErrorContext::for_id(&group_id)).await).map(|_| ())
    }

    fn import(&self, id: &str) -> Result<ResourceState> {
        let (project_id, _) = Self::split_id(id)?;
        let mut state = ResourceState::new(id);
        state.set("project_id", project_id);
        Ok(state)
    }
}
