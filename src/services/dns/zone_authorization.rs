//! Zone 跨账号授权资源

use async_trait::async_trait;
use serde_json::Value;

use crate::client::{Service, ServiceClient};
use crate::error::{ErrorContext, ProviderError, Result};
use crate::flatten::{BodyBuilder, path_search, path_search_str};
use crate::import::{join_composite_id, parse_composite_id};
use crate::resource::{Resource, check_deleted};
use crate::schema::{AttributeSchema, AttributeType, ResourceSchema};
use crate::state::{ResourceData, ResourceState};

/// Zone 管理权的跨账号授权，复合 ID `<zone_id>/<authorization_id>`
///
/// - `POST /v2/zones/{zone_id}/authorizations`
/// - `GET /v2/zones/{zone_id}/authorizations`
/// - `DELETE /v2/zones/{zone_id}/authorizations/{authorization_id}`
///
/// 授权条目没有单对象 GET，read 走列表过滤。
pub struct DnsZoneAuthorization;

impl DnsZoneAuthorization {
    fn split_id(id: &str) -> Result<(String, String)> {
        let parts = parse_composite_id(id, &["zone_id", "authorization_id"])?;
        Ok((parts[0].clone(), parts[1].clone()))
    }

    fn find_authorization<'a>(authorization_id: &str, body: &'a Value) -> Option<&'a Value> {
        path_search("authorizations", body)?
            .as_array()?
            .iter()
            .find(|auth| path_search_str("id", auth) == Some(authorization_id))
    }

    fn flatten(id: &str, zone_id: &str, auth: &Value) -> ResourceState {
        let mut state = ResourceState::new(id);
        state.set("zone_id", zone_id);
        state.set_path("account_id", auth, "account_id");
        state.set_path("status", auth, "status");
        state.set_path("created_at", auth, "created_at");
        state
    }
}

#[async_trait]
impl Resource for DnsZoneAuthorization {
    fn type_name(&self) -> &'static str {
        "dns_zone_authorization"
    }

    fn service(&self) -> Service {
        Service::Dns
    }

    fn schema(&self) -> ResourceSchema {
        ResourceSchema::new("dns_zone_authorization")
            .with_description("Grants another account management access to a zone.")
            .attribute(
                AttributeSchema::new("zone_id", AttributeType::String)
                    .required()
                    .force_new(),
            )
            .attribute(
                AttributeSchema::new("account_id", AttributeType::String)
                    .required()
                    .force_new()
                    .with_description("The account the zone is shared with."),
            )
            .attribute(AttributeSchema::new("status", AttributeType::String).computed())
            .attribute(AttributeSchema::new("created_at", AttributeType::String).computed())
    }

    async fn create(
        &self,
        client: &ServiceClient,
        config: &ResourceData,
    ) -> Result<ResourceState> {
        let zone_id = config.require_str("zone_id")?;
        let body = BodyBuilder::new()
            .opt("account_id", config.get_str("account_id"))
            .build();

        let path = format!("/v2/zones/{zone_id}/authorizations");
        let resp: Value = client.post(&path, &body, ErrorContext::for_id(zone_id)).await?;

        let authorization_id = path_search_str("id", &resp)
            .map(str::to_owned)
            .ok_or_else(|| ProviderError::ParseError {
                service: "dns".to_string(),
                detail: "unable to find the authorization ID from the API response".to_string(),
            })?;

        let state = ResourceState::new(join_composite_id(&[zone_id, authorization_id.as_str()]));
        self.read(client, &state).await
    }

    async fn read(&self, client: &ServiceClient, state: &ResourceState) -> Result<ResourceState> {
        let (zone_id, authorization_id) = Self::split_id(&state.id)?;

        let path = format!("/v2/zones/{zone_id}/authorizations");
        let body: Value = client.get(&path, "", ErrorContext::for_id(&zone_id)).await?;

        match Self::find_authorization(&authorization_id, &body) {
            Some(auth) => Ok(Self::flatten(&state.id, &zone_id, auth)),
            None => Err(ProviderError::ResourceNotFound {
                service: "dns".to_string(),
                resource_id: state.id.clone(),
                raw_message: None,
            }),
        }
    }

    async fn update(
        &self,
        _client: &ServiceClient,
        _state: &ResourceState,
        _config: &ResourceData,
    ) -> Result<ResourceState> {
        // 授权的两个属性都是 force-new，不存在可变更字段
        Err(ProviderError::InvalidParameter {
            service: "dns".to_string(),
            param: "account_id".to_string(),
            detail: "the authorization has no updatable attributes".to_string(),
        })
    }

    async fn delete(&self, client: &ServiceClient, state: &ResourceState) -> Result<()> {
        let (zone_id, authorization_id) = Self::split_id(&state.id)?;
        let path = format!("/v2/zones/{zone_id}/authorizations/{authorization_id}");
        check_deleted(
            client
                .delete(&path, ErrorContext::for_id(&authorization_id))
                .await,
        )
        .map(|_| ())
    }

    fn import(&self, id: &str) -> Result<ResourceState> {
        let (zone_id, _) = Self::split_id(id)?;
        let mut state = ResourceState::new(id);
        state.set("zone_id", zone_id);
        Ok(state)
    }
}
