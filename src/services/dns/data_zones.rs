//! Zone 列表数据源

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

use super::{MAX_PAGE_SIZE, normalize_status};

/// 按过滤条件查询全部 Zone 的快照
///
/// - `GET /v2/zones`（offset/limit 分页，累加至 `metadata.total_count`）
pub struct DnsZones;

impl DnsZones {
    /// 过滤条件拼成固定顺序的 query 片段（也用作快照 ID 的散列输入）
    fn filter_query(query: &ResourceData) -> String {
        let mut filter = String::new();
        if let Some(zone_type) = query.get_str("zone_type") {
            let _ = write!(filter, "type={}", urlencoding::encode(zone_type));
        }
        if let Some(name) = query.get_str("name") {
            let _ = write!(filter, "&name={}", urlencoding::encode(name));
        }
        if let Some(status) = query.get_str("status") {
            let _ = write!(filter, "&status={}", urlencoding::encode(status));
        }
        filter.trim_start_matches('&').to_string()
    }

    fn flatten_zone(zone: &Value) -> Value {
        let mut item = BodyBuilder::new()
            .opt("id", path_search("id", zone).cloned())
            .opt("name", path_search("name", zone).cloned())
            .opt("email", path_search("email", zone).cloned())
            .opt("zone_type", path_search("zone_type", zone).cloned())
            .opt("description", path_search("description", zone).cloned())
            .opt("ttl", path_search("ttl", zone).cloned())
            .opt("record_num", path_search("record_num", zone).cloned())
            .opt("masters", path_search("masters", zone).cloned())
            .opt("created_at", path_search("created_at", zone).cloned())
            .opt("updated_at", path_search("updated_at", zone).cloned());
        if let Some(status) = path_search_str("status", zone) {
            item = item.field("status", normalize_status(status));
        }
        item.build()
    }

    /// 快照 ID：过滤条件的摘要，同样的查询得到同样的 ID
    fn snapshot_id(filter: &str) -> String {
        let digest = hex::encode(Sha256::digest(filter.as_bytes()));
        format!("dns-zones-{}", &digest[..16])
    }
}

#[async_trait]
impl DataSource for DnsZones {
    fn type_name(&self) -> &'static str {
        "dns_zones"
    }

    fn service(&self) -> Service {
        Service::Dns
    }

    fn schema(&self) -> ResourceSchema {
        ResourceSchema::new("dns_zones")
            .with_description("Snapshot of all zones matching the filters.")
            .attribute(
                AttributeSchema::new(
                    "zone_type",
                    AttributeType::Enum(vec!["public".to_string(), "private".to_string()]),
                )
                .optional()
                .with_default("public"),
            )
            .attribute(AttributeSchema::new("name", AttributeType::String).optional())
            .attribute(AttributeSchema::new("status", AttributeType::String).optional())
            .attribute(
                AttributeSchema::new("zones", AttributeType::List(Box::new(AttributeType::Object)))
                    .computed(),
            )
    }

    async fn read(&self, client: &ServiceClient, query: &ResourceData) -> Result<ResourceState> {
        let filter = Self::filter_query(query);

        let zones = fetch_all(MAX_PAGE_SIZE, |offset, limit| {
            let query = if filter.is_empty() {
                format!("limit={limit}&offset={offset}")
            } else {
                format!("{filter}&limit={limit}&offset={offset}")
            };
            async move {
                let body: Value = client.get("/v2/zones", &query, ErrorContext::default()).await?;
                let items = path_search("zones", &body)
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

        let mut state = ResourceState::new(Self::snapshot_id(&filter));
        state.set(
            "zones",
            Value::Array(zones.iter().map(Self::flatten_zone).collect()),
        );
        Ok(state)
    }
}
