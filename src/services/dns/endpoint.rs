//! 解析器端点资源

use async_trait::async_trait;
use serde_json::Value;

use crate::client::{Service, ServiceClient};
use crate::error::{ErrorContext, ProviderError, Result};
use crate::flatten::{BodyBuilder, path_search, path_search_str};
use crate::resource::{Resource, check_deleted};
use crate::schema::{AttributeSchema, AttributeType, ResourceSchema};
use crate::state::{ResourceData, ResourceState};

/// 解析器端点（入站/出站转发的 VPC 侧出入口）
///
/// - `POST /v2.1/endpoints`
/// - `GET /v2.1/endpoints/{endpoint_id}`
/// - `PUT /v2.1/endpoints/{endpoint_id}`
/// - `DELETE /v2.1/endpoints/{endpoint_id}`
pub struct DnsEndpoint;

impl DnsEndpoint {
    fn build_create_body(config: &ResourceData) -> Value {
        // 配置里的 ip_addresses 对象列表按 API 字段名传递
        let ipaddresses = config
            .get("ip_addresses")
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .map(|item| {
                        BodyBuilder::new()
                            .opt("subnet_id", path_search_str("subnet_id", item))
                            .opt("ip", path_search_str("ip", item))
                            .build()
                    })
                    .collect::<Vec<Value>>()
            });

        BodyBuilder::new()
            .opt("name", config.get_str("name"))
            .opt("direction", config.get_str("direction"))
            .opt("region", config.get_str("region"))
            .opt("ipaddresses", ipaddresses)
            .build()
    }

    fn flatten(endpoint_id: &str, body: &Value) -> ResourceState {
        // 部分接口把对象包在 "endpoint" 里返回
        let obj = path_search("endpoint", body).unwrap_or(body);

        let mut state = ResourceState::new(endpoint_id);
        state.set_path("name", obj, "name");
        state.set_path("direction", obj, "direction");
        state.set_path("status", obj, "status");
        state.set_path("vpc_id", obj, "vpc_id");
        state.set_path("ipaddress_count", obj, "ipaddress_count");
        state.set_path("resolver_rule_count", obj, "resolver_rule_count");
        state.set_path("created_at", obj, "create_time");
        state.set_path("updated_at", obj, "update_time");
        state
    }
}

#[async_trait]
impl Resource for DnsEndpoint {
    fn type_name(&self) -> &'static str {
        "dns_endpoint"
    }

    fn service(&self) -> Service {
        Service::Dns
    }

    fn schema(&self) -> ResourceSchema {
        ResourceSchema::new("dns_endpoint")
            .with_description("A resolver endpoint for inbound or outbound DNS forwarding.")
            .attribute(AttributeSchema::new("name", AttributeType::String).required())
            .attribute(
                AttributeSchema::new(
                    "direction",
                    AttributeType::Enum(vec!["inbound".to_string(), "outbound".to_string()]),
                )
                .required()
                .force_new(),
            )
            .attribute(
                AttributeSchema::new("region", AttributeType::String).optional().computed(),
            )
            .attribute(
                AttributeSchema::new("ip_addresses", AttributeType::List(Box::new(AttributeType::Object)))
                    .required()
                    .force_new()
                    .with_description("Endpoint addresses, each an object with subnet_id and optional ip."),
            )
            .attribute(AttributeSchema::new("vpc_id", AttributeType::String).computed())
            .attribute(AttributeSchema::new("status", AttributeType::String).computed())
            .attribute(AttributeSchema::new("ipaddress_count", AttributeType::Int).computed())
            .attribute(AttributeSchema::new("resolver_rule_count", AttributeType::Int).computed())
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
        let resp: Value = client.post("/v2.1/endpoints", &body, ctx).await?;

        let id = path_search_str("endpoint.id", &resp)
            .or_else(|| path_search_str("id", &resp))
            .map(str::to_owned)
            .ok_or_else(|| ProviderError::ParseError {
                service: "dns".to_string(),
                detail: "unable to find the endpoint ID from the API response".to_string(),
            })?;

        let state = ResourceState::new(id);
        self.read(client, &state).await
    }

    async fn read(&self, client: &ServiceClient, state: &ResourceState) -> Result<ResourceState> {
        let path = format!("/v2.1/endpoints/{}", state.id);
        let body: Value = client.get(&path, "", ErrorContext::for_id(&state.id)).await?;
        Ok(Self::flatten(&state.id, &body))
    }

    async fn update(
        &self,
        client: &ServiceClient,
        state: &ResourceState,
        config: &ResourceData,
    ) -> Result<ResourceState> {
        // 端点仅名称可变更
        let path = format!("/v2.1/endpoints/{}", state.id);
        let body = BodyBuilder::new().opt("name", config.get_str("name")).build();
        let _resp: Value = client.put(&path, &body, ErrorContext::for_id(&state.id)).await?;
        self.read(client, state).await
    }

    async fn delete(&self, client: &ServiceClient, state: &ResourceState) -> Result<()> {
        let path = format!("/v2.1/endpoints/{}", state.id);
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
        match ResourceData::new(&DnsEndpoint.schema(), map) {
            Ok(data) => data,
            Err(errors) => panic!("config should validate: {errors:?}"),
        }
    }

    #[test]
    fn create_body_maps_addresses() {
        let data = config(json!({
            "name": "ep-1",
            "direction": "inbound",
            "ip_addresses": [
                {"subnet_id": "subnet-1", "ip": "192.168.0.10"},
                {"subnet_id": "subnet-2"}
            ]
        }));
        let body = DnsEndpoint::build_create_body(&data);
        assert_eq!(
            body.get("ipaddresses"),
            Some(&json!([
                {"subnet_id": "subnet-1", "ip": "192.168.0.10"},
                {"subnet_id": "subnet-2"}
            ]))
        );
        assert_eq!(body.get("direction"), Some(&json!("inbound")));
    }

    #[test]
    fn schema_rejects_bad_direction() {
        let Value::Object(map) = json!({
            "name": "ep-1",
            "direction": "sideways",
            "ip_addresses": [{"subnet_id": "subnet-1"}]
        }) else {
            panic!("expected object");
        };
        let res = ResourceData::new(&DnsEndpoint.schema(), map);
        assert!(res.is_err(), "direction must be inbound/outbound");
    }

    #[test]
    fn flatten_unwraps_endpoint_envelope() {
        let body = json!({
            "endpoint": {
                "id": "ep-1",
                "name": "ep-1",
                "direction": "inbound",
                "status": "ACTIVE",
                "vpc_id": "vpc-1",
                "ipaddress_count": 2
            }
        });
        let state = DnsEndpoint::flatten("ep-1", &body);
        assert_eq!(state.get_str("vpc_id"), Some("vpc-1"));
        assert_eq!(state.get_i64("ipaddress_count"), Some(2));

        // 非包裹形式同样可读
        let flat = json!({"id": "ep-1", "name": "ep-1", "vpc_id": "vpc-2"});
        let state = DnsEndpoint::flatten("ep-1", &flat);
        assert_eq!(state.get_str("vpc_id"), Some("vpc-2"));
    }
}
