//! Zone 资源（公网/内网）

use async_trait::async_trait;
use serde_json::{Value, json};

use crate::client::{Service, ServiceClient};
use crate::error::{ErrorContext, ProviderError, Result};
use crate::flatten::{BodyBuilder, path_search_str};
use crate::resource::{Resource, check_deleted};
use crate::schema::{AttributeSchema, AttributeType, ResourceSchema};
use crate::state::{ResourceData, ResourceState};

use super::normalize_status;

/// 公网/内网 Zone
///
/// - `POST /v2/zones`
/// - `GET /v2/zones/{zone_id}`
/// - `PATCH /v2/zones/{zone_id}`
/// - `PUT /v2/zones/{zone_id}/statuses`
/// - `DELETE /v2/zones/{zone_id}`
pub struct DnsZone;

impl DnsZone {
    fn build_create_body(config: &ResourceData) -> Value {
        // 内网 zone 携带 VPC 关联
        let router = config.get_str("router_id").map(|router_id| {
            BodyBuilder::new()
                .field("router_id", router_id)
                .opt("router_region", config.get_str("router_region"))
                .build()
        });

        BodyBuilder::new()
            .opt("name", config.get_str("name"))
            .opt("description", config.get_str("description"))
            .opt("zone_type", config.get_str("zone_type"))
            .opt("email", config.get_str("email"))
            .opt("ttl", config.get_i64("ttl"))
            .opt(
                "enterprise_project_id",
                config.get_str("enterprise_project_id"),
            )
            .opt("router", router)
            .build()
    }

    fn build_update_body(config: &ResourceData) -> Value {
        BodyBuilder::new()
            .opt("description", config.get_str("description"))
            .opt("email", config.get_str("email"))
            .opt("ttl", config.get_i64("ttl"))
            .build()
    }

    fn flatten(zone_id: &str, body: &Value) -> ResourceState {
        let mut state = ResourceState::new(zone_id);
        state.set_path("name", body, "name");
        state.set_path("email", body, "email");
        state.set_path("zone_type", body, "zone_type");
        state.set_path("description", body, "description");
        state.set_path("ttl", body, "ttl");
        state.set_path("enterprise_project_id", body, "enterprise_project_id");
        state.set_path("record_num", body, "record_num");
        state.set_path("masters", body, "masters");
        state.set_path("created_at", body, "created_at");
        state.set_path("updated_at", body, "updated_at");
        if let Some(status) = path_search_str("status", body) {
            state.set("status", normalize_status(status));
        }
        // 内网 zone 关联的 VPC
        state.set_path("router_id", body, "routers.0.router_id");
        state.set_path("router_region", body, "routers.0.router_region");
        state
    }

    async fn update_status(client: &ServiceClient, zone_id: &str, status: &str) -> Result<()> {
        let path = format!("/v2/zones/{zone_id}/statuses");
        let _resp: Value = client
            .put(&path, &json!({"status": status}), ErrorContext::for_id(zone_id))
            .await?;
        Ok(())
    }
}

#[async_trait]
impl Resource for DnsZone {
    fn type_name(&self) -> &'static str {
        "dns_zone"
    }

    fn service(&self) -> Service {
        Service::Dns
    }

    fn schema(&self) -> ResourceSchema {
        ResourceSchema::new("dns_zone")
            .with_description("A public or private DNS zone.")
            .attribute(
                AttributeSchema::new("name", AttributeType::String)
                    .required()
                    .force_new()
                    .with_description("The zone name, trailing dot included."),
            )
            .attribute(
                AttributeSchema::new(
                    "zone_type",
                    AttributeType::Enum(vec!["public".to_string(), "private".to_string()]),
                )
                .optional()
                .force_new()
                .with_default("public"),
            )
            .attribute(AttributeSchema::new("email", AttributeType::String).optional().computed())
            .attribute(
                AttributeSchema::new("description", AttributeType::String).optional().computed(),
            )
            .attribute(
                AttributeSchema::new("ttl", AttributeType::Int)
                    .optional()
                    .with_default(300)
                    .with_description("The default TTL of record sets in the zone (in seconds)."),
            )
            .attribute(
                AttributeSchema::new(
                    "status",
                    AttributeType::Enum(vec!["ENABLE".to_string(), "DISABLE".to_string()]),
                )
                .optional()
                .computed()
                .with_default("ENABLE"),
            )
            .attribute(
                AttributeSchema::new("router_id", AttributeType::String)
                    .optional()
                    .force_new()
                    .with_description("The VPC associated with a private zone."),
            )
            .attribute(
                AttributeSchema::new("router_region", AttributeType::String)
                    .optional()
                    .computed()
                    .force_new(),
            )
            .attribute(
                AttributeSchema::new("enterprise_project_id", AttributeType::String)
                    .optional()
                    .computed()
                    .force_new(),
            )
            .attribute(AttributeSchema::new("record_num", AttributeType::Int).computed())
            .attribute(
                AttributeSchema::new("masters", AttributeType::List(Box::new(AttributeType::String)))
                    .computed(),
            )
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
        let resp: Value = client.post("/v2/zones", &body, ctx).await?;

        let id = path_search_str("id", &resp)
            .map(str::to_owned)
            .ok_or_else(|| ProviderError::ParseError {
                service: "dns".to_string(),
                detail: "unable to find the zone ID from the API response".to_string(),
            })?;

        // 创建后默认 ENABLE，配置为 DISABLE 时补一次状态设置
        if config.get_str("status") == Some("DISABLE") {
            Self::update_status(client, &id, "DISABLE").await?;
        }

        let state = ResourceState::new(id);
        self.read(client, &state).await
    }

    async fn read(&self, client: &ServiceClient, state: &ResourceState) -> Result<ResourceState> {
        let path = format!("/v2/zones/{}", state.id);
        let body: Value = client.get(&path, "", ErrorContext::for_id(&state.id)).await?;
        Ok(Self::flatten(&state.id, &body))
    }

    async fn update(
        &self,
        client: &ServiceClient,
        state: &ResourceState,
        config: &ResourceData,
    ) -> Result<ResourceState> {
        let path = format!("/v2/zones/{}", state.id);
        let body = Self::build_update_body(config);
        let _resp: Value = client.patch(&path, &body, ErrorContext::for_id(&state.id)).await?;

        if let Some(status) = config.get_str("status")
            && state.get_str("status") != Some(status)
        {
            Self::update_status(client, &state.id, status).await?;
        }

        self.read(client, state).await
    }

    async fn delete(&self, client: &ServiceClient, state: &ResourceState) -> Result<()> {
        let path = format!("/v2/zones/{}", state.id);
        check_deleted(client.delete(&path, ErrorContext::for_id(&state.id)).await).map(|_| ())
    }
}
