//! 转发规则与 VPC 的关联资源

use async_trait::async_trait;
use serde_json::{Value, json};

use crate::client::{Service, ServiceClient};
use crate::error::{ErrorContext, ProviderError, Result};
use crate::flatten::{path_search, path_search_str};
use crate::import::{join_composite_id, parse_composite_id};
use crate::resource::{Resource, check_deleted};
use crate::schema::{AttributeSchema, AttributeType, ResourceSchema};
use crate::state::{ResourceData, ResourceState};

/// 转发规则的 VPC 关联，复合 ID `<resolver_rule_id>/<router_id>`
///
/// - `POST /v2.1/resolverrules/{resolverrule_id}/associaterouter`
/// - `POST /v2.1/resolverrules/{resolverrule_id}/disassociaterouter`
///
/// 没有独立的查询端点，read 从规则详情的 routers 列表中定位。
pub struct DnsResolverRuleAssociation;

impl DnsResolverRuleAssociation {
    fn split_id(id: &str) -> Result<(String, String)> {
        let parts = parse_composite_id(id, &["resolver_rule_id", "router_id"])?;
        Ok((parts[0].clone(), parts[1].clone()))
    }

    /// 在规则详情里找到指定 VPC 的关联项
    fn find_router<'a>(router_id: &str, rule_body: &'a Value) -> Option<&'a Value> {
        let obj = path_search("resolver_rule", rule_body).unwrap_or(rule_body);
        obj.get("routers")?
            .as_array()?
            .iter()
            .find(|router| path_search_str("router_id", router) == Some(router_id))
    }
}

#[async_trait]
impl Resource for DnsResolverRuleAssociation {
    fn type_name(&self) -> &'static str {
        "dns_resolver_rule_association"
    }

    fn service(&self) -> Service {
        Service::Dns
    }

    fn schema(&self) -> ResourceSchema {
        ResourceSchema::new("dns_resolver_rule_association")
            .with_description("Associates a resolver rule with a VPC.")
            .attribute(
                AttributeSchema::new("resolver_rule_id", AttributeType::String)
                    .required()
                    .force_new(),
            )
            .attribute(
                AttributeSchema::new("router_id", AttributeType::String)
                    .required()
                    .force_new(),
            )
            .attribute(AttributeSchema::new("status", AttributeType::String).computed())
    }

    async fn create(
        &self,
        client: &ServiceClient,
        config: &ResourceData,
    ) -> Result<ResourceState> {
        let rule_id = config.require_str("resolver_rule_id")?;
        let router_id = config.require_str("router_id")?;

        let path = format!("/v2.1/resolverrules/{rule_id}/associaterouter");
        let body = json!({"router": {"router_id": router_id}});
        let _resp: Value = client.post(&path, &body, ErrorContext::for_id(rule_id)).await?;

        let state = ResourceState::new(join_composite_id(&[rule_id, router_id]));
        self.read(client, &state).await
    }

    async fn read(&self, client: &ServiceClient, state: &ResourceState) -> Result<ResourceState> {
        let (rule_id, router_id) = Self::split_id(&state.id)?;

        let path = format!("/v2.1/resolverrules/{rule_id}");
        let body: Value = client.get(&path, "", ErrorContext::for_id(&rule_id)).await?;

        match Self::find_router(&router_id, &body) {
            Some(router) => {
                let mut next = ResourceState::new(&state.id);
                next.set("resolver_rule_id", rule_id.as_str());
                next.set("router_id", router_id.as_str());
                next.set_path("status", router, "status");
                Ok(next)
            }
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
        // 关联的两个属性都是 force-new，不存在可变更字段
        Err(ProviderError::InvalidParameter {
            service: "dns".to_string(),
            param: "resolver_rule_id".to_string(),
            detail: "the association has no updatable attributes".to_string(),
        })
    }

    async fn delete(&self, client: &ServiceClient, state: &ResourceState) -> Result<()> {
        let (rule_id, router_id) = Self::split_id(&state.id)?;

        let path = format!("/v2.1/resolverrules/{rule_id}/disassociaterouter");
        let body = json!({"router": {"router_id": router_id}});
        let result: Result<Value> = client.post(&path, &body, ErrorContext::for_id(&rule_id)).await;
        check_deleted(result).map(|_| ())
    }

    fn import(&self, id: &str) -> Result<ResourceState> {
        let (rule_id, router_id) = Self::split_id(id)?;
        let mut state = ResourceState::new(id);
        state.set("resolver_rule_id", rule_id);
        state.set("router_id", router_id);
        Ok(state)
    }
}
