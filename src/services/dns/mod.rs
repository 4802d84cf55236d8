//! Huawei Cloud DNS resources
//!
//! 云解析服务：公网/内网 Zone、记录集、自定义线路、线路分组、
//! 解析器端点、转发规则及其 VPC 关联、Zone 跨账号授权。

pub(crate) mod error;

mod custom_line;
mod data_recordsets;
mod data_zones;
mod endpoint;
mod line_group;
mod recordset;
mod resolver_rule;
mod resolver_rule_association;
mod zone;
mod zone_authorization;

pub use custom_line::DnsCustomLine;
pub use data_recordsets::DnsRecordsets;
pub use data_zones::DnsZones;
pub use endpoint::DnsEndpoint;
pub use line_group::DnsLineGroup;
pub use recordset::DnsRecordset;
pub use resolver_rule::DnsResolverRule;
pub use resolver_rule_association::DnsResolverRuleAssociation;
pub use zone::DnsZone;
pub use zone_authorization::DnsZoneAuthorization;

use serde_json::Value;

use crate::client::ServiceClient;
use crate::error::{ErrorContext, Result};
use crate::flatten::path_search_str;

/// 单页最大条数（华为云 DNS list 接口上限）
pub(crate) const MAX_PAGE_SIZE: u32 = 500;

/// 按 zone 类型选择 API 版本
///
/// v2.1 支持多线路记录集，仅对 public zone 开放；private zone 走 v2。
pub(crate) fn api_version_for(zone_type: &str) -> &'static str {
    if zone_type == "private" { "v2" } else { "v2.1" }
}

/// 状态归一：API 返回 ACTIVE，schema 层统一为 ENABLE
pub(crate) fn normalize_status(status: &str) -> &str {
    if status == "ACTIVE" { "ENABLE" } else { status }
}

/// 查询 zone 获取其类型（public/private）
pub(crate) async fn zone_type_of(client: &ServiceClient, zone_id: &str) -> Result<String> {
    let body: Value = client
        .get(
            &format!("/v2/zones/{zone_id}"),
            "",
            ErrorContext::for_id(zone_id),
        )
        .await?;
    Ok(path_search_str("zone_type", &body)
        .unwrap_or("public")
        .to_string())
}
