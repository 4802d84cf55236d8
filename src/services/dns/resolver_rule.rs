//! 转发规则资源

use async_trait::async_trait;
use serde_json::Value;

use crate::client::{Service, ServiceClient};
use crate::error::{ErrorContext, ProviderError, Result};
use crate::flatten::{BodyBuilder, path_search, path_search_str};
use crate::resource::{Resource, check_deleted};
use crate::schema::{AttributeSchema, AttributeType, ResourceSchema};
use crate::state::{ResourceData, ResourceState};

/// 转发规则（把指定域名的解析请求转发到端点 IP）
///
/// - `POST /v2.1/resolverrules`
/// - `GET /v2.1/resolverrules/{resolverrule_id}`
/// - `PUT /v2.1/resolverrules/{resolverrule_id}`
/// - `DELETE /v2.1/resolverrules/{resolverrule_id}`
pub struct DnsResolverRule;

impl DnsResolverRule {
    fn build_ipaddresses(config: &ResourceData) -> Option<Vec<Value>> {
        config.get("ip_addresses").and_then(Value::as_array).map(|items| {
            items
                .iter()
                .map(|item| {
                    BodyBuilder::new()
                        .opt("ip", path_search_str("ip", item))
                        .opt("port", path_search("port", item).and_then(Value::as_i64))
                        .build()
                })
                .collect()
        })
    }

    fn build_create_body(config: &ResourceData) -> Value {
        BodyBuilder::new()
            .opt("name", config.get_str("name"))
            .opt("domain_name", config.get_str("domain_name"))
            .opt("endpoint_id", config.get_str("endpoint_id"))
            .opt("ipaddresses", Self::build_ipaddresses(config))
            .build()
    }

    fn build_update_body(config: &ResourceData) -> Value {
        BodyBuilder::new()
            .opt("name", config.get_str("name"))
            .opt("ipaddresses", Self::build_ipaddresses(config))
            .build()
    }

    fn flatten(rule_id: &str, body: &Value) -> ResourceState {
        let obj = path_search("resolver_rule", body).unwrap_or(body);

        let mut state = ResourceState::new(rule_id);
        state.set_path("name", obj, "name");
        state.set_path("domain_name", obj, "domain_name");
        state.set_path("endpoint_id", obj, "endpoint_id");
        state.set_path("status", obj, "status");
        state.set_path("rule_type", obj, "rule_type");
        state.set_path("ipaddress_count", obj, "ipaddress_count");
        state.set_path("routers", obj, "routers");
        state.set_path("created_at", obj, "create_time");
        state.set_path("updated_at", obj, "update_time");
        state
    }
}

#[async_trait]
impl Resource for DnsResolverRule {
    fn type_name(&self) -> &'static str {
        "dns_resolver_rule"
    }

    fn service(&self) -> Service {
        Service::Dns
    }

    fn schema(&self) -> ResourceSchema {
        ResourceSchema::new("dns_resolver_rule")
            .with_description("A forwarding rule sending queries for a domain to endpoint IPs.")
            .attribute(AttributeSchema::new("name", AttributeType::String).required())
            .attribute(
                AttributeSchema::new("domain_name", AttributeType::String)
                    .required()
                    .force_new(),
            )
            .attribute(
                AttributeSchema::new("endpoint_id", AttributeType::String)
                    .required()
                    .force_new(),
            )
            .attribute(
                AttributeSchema::new("ip_addresses", AttributeType::List(Box::new(AttributeType::Object)))
                    .required()
                    .with_description("Target addresses, each an object with ip and optional port."),
            )
            .attribute(AttributeSchema::new("status", AttributeType::String).computed())
            .attribute(AttributeSchema::new("rule_type", AttributeType::String).computed())
            .attribute(AttributeSchema::new("ipaddress_count", AttributeType::Int).computed())
            .attribute(
                AttributeSchema::new("routers", AttributeType::List(Box::new(AttributeType::Object)))
                    .computed()
                    .with_description("The VPCs this rule is associated with."),
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
        let resp: Value = client.post("/v2.1/resolverrules", &body, ctx).await?;

        let id = path_search_str("resolver_rule.id", &resp)
            .or_else(|| path_search_str("id", &resp))
            .map(str::to_owned)
            .ok_or_else(|| ProviderError::ParseError {
                service: "dns".to_string(),
                detail: "unable to find the resolver rule ID from the API response".to_string(),
            })?;

        let state = ResourceState::new(id);
        self.read(client, &state).await
    }

    async fn read(&self, client: &ServiceClient, state: &ResourceState) -> Result<ResourceState> {
        let path = format!("/v2.1/resolverrules/{}", state.id);
        let body: Value = client.get(&path, "", ErrorContext::for_id(&state.id)).await?;
        Ok(Self::flatten(&state.id, &body))
    }

    async fn update(
        &self,
        client: &ServiceClient,
        state: &ResourceState,
        config: &ResourceData,
    ) -> Result<ResourceState> {
        let path = format!("/v2.1/resolverrules/{}", state.id);
        let body = Self::build_update_body(config);
        let _resp: Value = client.put(&path, &body, ErrorContext::for_id(&state.id)).await?;
        self.read(client, state).await
    }

    async fn delete(&self, client: &ServiceClient, state: &ResourceState) -> Result<()> {
        let path = format!("/v2.1/resolverrules/{}", state.id);
        check_deleted(client.delete(&path, ErrorContext::for_id(&state.id)).await).map(|_| ())
    }
}
