//! 记录集资源

use async_trait::async_trait;
use serde_json::{Value, json};

use crate::client::{Service, ServiceClient};
use crate::error::{ErrorContext, ProviderError, Result};
use crate::flatten::{BodyBuilder, path_search_str};
use crate::import::{join_composite_id, parse_composite_id};
use crate::resource::{Resource, check_deleted};
use crate::schema::{AttributeSchema, AttributeType, ResourceSchema};
use crate::state::{ResourceData, ResourceState};

use super::{api_version_for, normalize_status, zone_type_of};

/// Zone 内的记录集，复合 ID `<zone_id>/<recordset_id>`
///
/// - `POST /{ver}/zones/{zone_id}/recordsets`
/// - `GET /{ver}/zones/{zone_id}/recordsets/{recordset_id}`
/// - `PUT /{ver}/zones/{zone_id}/recordsets/{recordset_id}`
/// - `PUT /v2.1/recordsets/{recordset_id}/statuses/set`
/// - `DELETE /{ver}/zones/{zone_id}/recordsets/{recordset_id}`
///
/// `ver` 由 zone 类型决定：public 走 v2.1（支持多线路），private 走 v2。
pub struct DnsRecordset;

const RECORD_TYPES: &[&str] = &["A", "AAAA", "MX", "CNAME", "TXT", "NS", "SRV", "CAA"];

impl DnsRecordset {
    fn build_create_body(config: &ResourceData) -> Value {
        BodyBuilder::new()
            .opt("name", config.get_str("name"))
            .opt("description", config.get_str("description"))
            .opt("type", config.get_str("type"))
            .opt("status", config.get_str("status"))
            .opt("ttl", config.get_i64("ttl"))
            .opt("records", config.get_string_list("records"))
            .opt("line", config.get_str("line_id"))
            .opt("weight", config.get_i64("weight"))
            .build()
    }

    fn build_update_body(config: &ResourceData) -> Value {
        BodyBuilder::new()
            .opt("name", config.get_str("name"))
            .opt("description", config.get_str("description"))
            .opt("type", config.get_str("type"))
            .opt("ttl", config.get_i64("ttl"))
            .opt("records", config.get_string_list("records"))
            .opt("weight", config.get_i64("weight"))
            .build()
    }

    fn flatten(id: &str, zone_type: &str, body: &Value) -> ResourceState {
        let mut state = ResourceState::new(id);
        state.set_path("zone_id", body, "zone_id");
        state.set_path("zone_name", body, "zone_name");
        state.set_path("name", body, "name");
        state.set_path("description", body, "description");
        state.set_path("type", body, "type");
        state.set_path("ttl", body, "ttl");
        state.set_path("records", body, "records");
        state.set_path("line_id", body, "line");
        state.set_path("weight", body, "weight");
        state.set_path("created_at", body, "created_at");
        state.set_path("updated_at", body, "updated_at");
        if let Some(status) = path_search_str("status", body) {
            state.set("status", normalize_status(status));
        }
        state.set("zone_type", zone_type);
        state
    }

    /// 内网 zone 不支持线路与权重
    fn reject_private_only_fields(config: &ResourceData, zone_type: &str) -> Result<()> {
        if zone_type != "private" {
            return Ok(());
        }
        for param in ["line_id", "weight"] {
            if config.contains(param) {
                return Err(ProviderError::InvalidParameter {
                    service: "dns".to_string(),
                    param: param.to_string(),
                    detail: "private zone does not support this argument".to_string(),
                });
            }
        }
        Ok(())
    }

    fn split_id(id: &str) -> Result<(String, String)> {
        let parts = parse_composite_id(id, &["zone_id", "recordset_id"])?;
        Ok((parts[0].clone(), parts[1].clone()))
    }

    async fn update_record_status(
        client: &ServiceClient,
        recordset_id: &str,
        status: &str,
    ) -> Result<()> {
        let path = format!("/v2.1/recordsets/{recordset_id}/statuses/set");
        let _resp: Value = client
            .put(
                &path,
                &json!({"status": status}),
                ErrorContext::for_id(recordset_id),
            )
            .await?;
        Ok(())
    }
}

#[async_trait]
impl Resource for DnsRecordset {
    fn type_name(&self) -> &'static str {
        "dns_recordset"
    }

    fn service(&self) -> Service {
        Service::Dns
    }

    fn schema(&self) -> ResourceSchema {
        ResourceSchema::new("dns_recordset")
            .with_description("A record set within a DNS zone.")
            .attribute(
                AttributeSchema::new("zone_id", AttributeType::String)
                    .required()
                    .force_new()
                    .with_description("The ID of the zone to which the record set belongs."),
            )
            .attribute(
                AttributeSchema::new("name", AttributeType::String)
                    .required()
                    .with_description("The name of the record set, trailing dot included."),
            )
            .attribute(
                AttributeSchema::new(
                    "type",
                    AttributeType::Enum(RECORD_TYPES.iter().map(ToString::to_string).collect()),
                )
                .required(),
            )
            .attribute(
                AttributeSchema::new("records", AttributeType::List(Box::new(AttributeType::String)))
                    .required(),
            )
            .attribute(
                AttributeSchema::new("ttl", AttributeType::Int).optional().with_default(300),
            )
            .attribute(
                AttributeSchema::new("line_id", AttributeType::String)
                    .optional()
                    .computed()
                    .force_new()
                    .with_description("The resolution line ID, public zones only."),
            )
            .attribute(
                AttributeSchema::new(
                    "status",
                    AttributeType::Enum(vec!["ENABLE".to_string(), "DISABLE".to_string()]),
                )
                .optional()
                .with_default("ENABLE"),
            )
            .attribute(
                AttributeSchema::new("description", AttributeType::String).optional().computed(),
            )
            .attribute(
                AttributeSchema::new("weight", AttributeType::Int)
                    .optional()
                    .computed()
                    .with_description("The weight of the record set, public zones only."),
            )
            .attribute(AttributeSchema::new("zone_name", AttributeType::String).computed())
            .attribute(AttributeSchema::new("zone_type", AttributeType::String).computed())
            .attribute(AttributeSchema::new("created_at", AttributeType::String).computed())
            .attribute(AttributeSchema::new("updated_at", AttributeType::String).computed())
    }

    async fn create(
        &self,
        client: &ServiceClient,
        config: &ResourceData,
    ) -> Result<ResourceState> {
        let zone_id = config.require_str("zone_id")?;
        let zone_type = zone_type_of(client, zone_id).await?;
        Self::reject_private_only_fields(config, &zone_type)?;

        let version = api_version_for(&zone_type);
        let path = format!("/{version}/zones/{zone_id}/recordsets");
        let body = Self::build_create_body(config);
        let ctx = ErrorContext::for_name(config.get_str("name").unwrap_or_default());
        let resp: Value = client.post(&path, &body, ctx).await?;

        let recordset_id =
            path_search_str("id", &resp)
                .map(str::to_owned)
                .ok_or_else(|| ProviderError::ParseError {
                    service: "dns".to_string(),
                    detail: "unable to find the recordset ID from the API response".to_string(),
                })?;

        let state = ResourceState::new(join_composite_id(&[zone_id, recordset_id.as_str()]));
        self.read(client, &state).await
    }

    async fn read(&self, client: &ServiceClient, state: &ResourceState) -> Result<ResourceState> {
        let (zone_id, recordset_id) = Self::split_id(&state.id)?;
        let zone_type = zone_type_of(client, &zone_id).await?;

        let version = api_version_for(&zone_type);
        let path = format!("/{version}/zones/{zone_id}/recordsets/{recordset_id}");
        let body: Value = client
            .get(&path, "", ErrorContext::for_id(&recordset_id))
            .await?;
        Ok(Self::flatten(&state.id, &zone_type, &body))
    }

    async fn update(
        &self,
        client: &ServiceClient,
        state: &ResourceState,
        config: &ResourceData,
    ) -> Result<ResourceState> {
        let (zone_id, recordset_id) = Self::split_id(&state.id)?;
        let zone_type = zone_type_of(client, &zone_id).await?;
        Self::reject_private_only_fields(config, &zone_type)?;

        let version = api_version_for(&zone_type);
        let path = format!("/{version}/zones/{zone_id}/recordsets/{recordset_id}");
        let body = Self::build_update_body(config);
        let _resp: Value = client
            .put(&path, &body, ErrorContext::for_id(&recordset_id))
            .await?;

        // 状态单独一个端点（仅 public zone）
        if let Some(status) = config.get_str("status")
            && state.get_str("status") != Some(status)
            && zone_type != "private"
        {
            Self::update_record_status(client, &recordset_id, status).await?;
        }

        self.read(client, state).await
    }

    async fn delete(&self, client: &ServiceClient, state: &ResourceState) -> Result<()> {
        let (zone_id, recordset_id) = Self::split_id(&state.id)?;
        let zone_type = zone_type_of(client, &zone_id).await?;

        let version = api_version_for(&zone_type);
        let path = format!("/{version}/zones/{zone_id}/recordsets/{recordset_id}");
        check_deleted(client.delete(&path, ErrorContext::for_id(&recordset_id)).await)
            .map(|_| ())
    }

    fn import(&self, id: &str) -> Result<ResourceState> {
        let (zone_id, _) = Self::split_id(id)?;
        let mut state = ResourceState::new(id);
        state.set("zone_id", zone_id);
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
        match ResourceData::new(&DnsRecordset.schema(), map) {
            Ok(data) => data,
            Err(errors) => panic!("config should validate: {errors:?}"),
        }
    }

    fn base_config() -> Value {
        json!({
            "zone_id": "zone-1",
            "name": "www.example.com.",
            "type": "A",
            "records": ["192.0.2.1", "192.0.2.2"]
        })
    }

    #[test]
    fn schema_rejects_unknown_record_type() {
        let Value::Object(mut map) = base_config() else {
            panic!("expected object");
        };
        map.insert("type".to_string(), json!("LOC"));
        let res = ResourceData::new(&DnsRecordset.schema(), map);
        assert!(res.is_err(), "LOC is not a supported record type");
    }

    #[test]
    fn create_body_maps_line_id_to_line() {
        let Value::Object(mut map) = base_config() else {
            panic!("expected object");
        };
        map.insert("line_id".to_string(), json!("default_view"));
        let data = match ResourceData::new(&DnsRecordset.schema(), map) {
            Ok(data) => data,
            Err(errors) => panic!("config should validate: {errors:?}"),
        };
        let body = DnsRecordset::build_create_body(&data);
        assert_eq!(body.get("line"), Some(&json!("default_view")));
        assert_eq!(body.get("line_id"), None);
        assert_eq!(body.get("records"), Some(&json!(["192.0.2.1", "192.0.2.2"])));
        assert_eq!(body.get("ttl"), Some(&json!(300)));
    }

    #[test]
    fn update_body_omits_status_and_line() {
        let data = config(base_config());
        let body = DnsRecordset::build_update_body(&data);
        assert_eq!(body.get("status"), None, "status has its own endpoint");
        assert_eq!(body.get("line"), None, "line is force-new");
    }

    #[test]
    fn private_zone_rejects_weight() {
        let Value::Object(mut map) = base_config() else {
            panic!("expected object");
        };
        map.insert("weight".to_string(), json!(10));
        let data = match ResourceData::new(&DnsRecordset.schema(), map) {
            Ok(data) => data,
            Err(errors) => panic!("config should validate: {errors:?}"),
        };
        let res = DnsRecordset::reject_private_only_fields(&data, "private");
        assert!(
            matches!(&res, Err(ProviderError::InvalidParameter { param, .. }) if param == "weight"),
            "unexpected result: {res:?}"
        );
        assert!(DnsRecordset::reject_private_only_fields(&data, "public").is_ok());
    }

    #[test]
    fn flatten_recordset_response() {
        let body = json!({
            "id": "rs-1",
            "zone_id": "zone-1",
            "zone_name": "example.com.",
            "name": "www.example.com.",
            "type": "A",
            "ttl": 600,
            "records": ["192.0.2.1"],
            "status": "ACTIVE",
            "line": "default_view",
            "weight": 1
        });
        let state = DnsRecordset::flatten("zone-1/rs-1", "public", &body);
        assert_eq!(state.get_str("status"), Some("ENABLE"));
        assert_eq!(state.get_str("line_id"), Some("default_view"));
        assert_eq!(state.get_str("zone_type"), Some("public"));
        assert_eq!(
            state.get_string_list("records"),
            Some(vec!["192.0.2.1".to_string()])
        );
    }

    #[test]
    fn import_splits_composite_id() {
        let res = DnsRecordset.import("zone-1/rs-1");
        assert!(res.is_ok(), "expected Ok(..), got {res:?}");
        let Ok(state) = res else {
            return;
        };
        assert_eq!(state.id, "zone-1/rs-1");
        assert_eq!(state.get_str("zone_id"), Some("zone-1"));

        let bad = DnsRecordset.import("only-one-part");
        assert!(bad.is_err(), "ID without separator must be rejected");
    }
}
