//! 记录集列表数据源

use std::fmt::Write;

use async_trait::async_trait;
use serde_json::Value;
use sha2::{Digest, Sha256};

use crate::client::{Service, ServiceClient};
use crate::error::{ErrorContext, Result};
use crate::flatten::{BodyBuilder, path_search, path_search_str};
use crate::pagination::{Page, fetch_all};
use crate::resource::DataSource;
use crate::schema::{AttributeSchema, AttributeType, ResourceSchema};
use crate::state::{ResourceData, ResourceState};

use super::{MAX_PAGE_SIZE, api_version_for, normalize_status, zone_type_of};

/// 按过滤条件查询一个 Zone 下全部记录集的快照
///
/// - `GET /{ver}/zones/{zone_id}/recordsets`（offset/limit 分页）
pub struct DnsRecordsets;

impl DnsRecordsets {
    fn filter_query(query: &ResourceData) -> String {
        let mut filter = String::new();
        if let Some(name) = query.get_str("name") {
            let _ = write!(filter, "&name={}", urlencoding::encode(name));
        }
        if let Some(record_type) = query.get_str("type") {
            let _ = write!(filter, "&type={}", urlencoding::encode(record_type));
        }
        if let Some(line_id) = query.get_str("line_id") {
            let _ = write!(filter, "&line_id={}", urlencoding::encode(line_id));
        }
        filter.trim_start_matches('&').to_string()
    }

    fn flatten_recordset(recordset: &Value) -> Value {
        let mut item = BodyBuilder::new()
            .opt("id", path_search("id", recordset).cloned())
            .opt("name", path_search("name", recordset).cloned())
            .opt("type", path_search("type", recordset).cloned())
            .opt("ttl", path_search("ttl", recordset).cloned())
            .opt("records", path_search("records", recordset).cloned())
            .opt("line_id", path_search("line", recordset).cloned())
            .opt("weight", path_search("weight", recordset).cloned())
            .opt("description", path_search("description", recordset).cloned())
            .opt("zone_name", path_search("zone_name", recordset).cloned())
            .opt("created_at", path_search("created_at", recordset).cloned())
            .opt("updated_at", path_search("updated_at", recordset).cloned());
        if let Some(status) = path_search_str("status", recordset) {
            item = item.field("status", normalize_status(status));
        }
        item.build()
    }

    fn snapshot_id(zone_id: &str, filter: &str) -> String {
        let digest = hex::encode(Sha256::digest(format!("{zone_id}?{filter}").as_bytes()));
        format!("dns-recordsets-{}", &digest[..16])
    }
}

#[async_trait]
impl DataSource for DnsRecordsets {
    fn type_name(&self) -> &'static str {
        "dns_recordsets"
    }

    fn service(&self) -> Service {
        Service::Dns
    }

    fn schema(&self) -> ResourceSchema {
        ResourceSchema::new("dns_recordsets")
            .with_description("Snapshot of all record sets in a zone matching the filters.")
            .attribute(AttributeSchema::new("zone_id", AttributeType::String).required())
            .attribute(
                AttributeSchema::new("name", AttributeType::String)
                    .optional()
                    .with_description("Fuzzy name filter."),
            )
            .attribute(AttributeSchema::new("type", AttributeType::String).optional())
            .attribute(AttributeSchema::new("line_id", AttributeType::String).optional())
            .attribute(
                AttributeSchema::new(
                    "recordsets",
                    AttributeType::List(Box::new(AttributeType::Object)),
                )
                .computed(),
            )
    }

    async fn read(&self, client: &ServiceClient, query: &ResourceData) -> Result<ResourceState> {
        let zone_id = query.require_str("zone_id")?;
        let zone_type = zone_type_of(client, zone_id).await?;
        let version = api_version_for(&zone_type);

        let path = format!("/{version}/zones/{zone_id}/recordsets");
        let filter = Self::filter_query(query);

        let recordsets = fetch_all(MAX_PAGE_SIZE, |offset, limit| {
            let query = if filter.is_empty() {
                format!("limit={limit}&offset={offset}")
            } else {
                format!("{filter}&limit={limit}&offset={offset}")
            };
            let path = path.clone();
            async move {
                let body: Value = client
                    .get(&path, &query, ErrorContext::for_id(zone_id))
                    .await?;
                let items = path_search("recordsets", &body)
                    .and_then(Value::as_array)
                    .cloned()
                    .unwrap_or_default();
                let total_count = path_search("metadata.total_count", &body)
                    .and_then(Value::as_u64)
                    .and_then(|total| u32::try_from(total).ok());
                Ok(Page { items, total_count })
            }
        })
        .await?;

        let mut state = ResourceState::new(Self::snapshot_id(zone_id, &filter));
        state.set("zone_id", zone_id);
        state.set(
            "recordsets",
            Value::Array(recordsets.iter().map(Self::flatten_recordset).collect()),
        );
        Ok(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn query(value: Value) -> ResourceData {
        let Value::Object(map) = value else {
            panic!("expected object");
        };
        match ResourceData::new(&DnsRecordsets.schema(), map) {
            Ok(data) => data,
            Err(errors) => panic!("query should validate: {errors:?}"),
        }
    }

    #[test]
    fn filter_query_url_encodes() {
        let q = query(json!({
            "zone_id": "zone-1",
            "name": "www example",
            "type": "A"
        }));
        assert_eq!(DnsRecordsets::filter_query(&q), "name=www%20example&type=A");
    }

    #[test]
    fn snapshot_id_varies_with_zone_and_filter() {
        let a = DnsRecordsets::snapshot_id("zone-1", "type=A");
        let b = DnsRecordsets::snapshot_id("zone-2", "type=A");
        let c = DnsRecordsets::snapshot_id("zone-1", "type=MX");
        assert_ne!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn flatten_maps_line_to_line_id() {
        let recordset = json!({
            "id": "rs-1",
            "name": "www.example.com.",
            "type": "A",
            "records": ["192.0.2.1"],
            "status": "ACTIVE",
            "line": "default_view"
        });
        let item = DnsRecordsets::flatten_recordset(&recordset);
        assert_eq!(item.get("line_id"), Some(&json!("default_view")));
        assert_eq!(item.get("line"), None);
        assert_eq!(item.get("status"), Some(&json!("ENABLE")));
    }
}
