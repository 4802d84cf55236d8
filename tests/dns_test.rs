//! DNS resource integration test
//!
//! Operation mode:
//! ```bash
//! HWC_ACCESS_KEY_ID=xxx HWC_SECRET_ACCESS_KEY=xxx \
//!     cargo test --test dns_test -- --ignored --nocapture --test-threads=1
//! ```
//!
//! 测试会在账号下创建带随机前缀的 zone，结束时清理。

#![cfg(feature = "dns")]

mod common;

use common::{TestContext, generate_test_zone_name, query_data, resource_data};
use hwc_resource_provider::{Service, check_deleted};
use serde_json::json;

// ============ Zone lifecycle ============

#[tokio::test]
#[ignore = "integration test: requires HWC_ACCESS_KEY_ID and HWC_SECRET_ACCESS_KEY"]
async fn test_dns_zone_lifecycle() {
    skip_if_no_credentials!("HWC_ACCESS_KEY_ID", "HWC_SECRET_ACCESS_KEY");

    let ctx = require_some!(TestContext::from_env(), "创建测试上下文失败");
    let client = require_some!(ctx.client(Service::Dns), "创建 DNS 客户端失败");
    let zone = require_some!(TestContext::resource("dns_zone"), "注册表中缺少 dns_zone");

    let zone_name = generate_test_zone_name();
    let config = require_some!(
        resource_data(
            zone.as_ref(),
            json!({
                "name": zone_name,
                "email": "admin@example.com",
                "description": "integration test zone",
                "ttl": 600
            })
        ),
        "zone 配置校验失败"
    );

    // create
    let state = require_ok!(zone.create(&client, &config).await, "create 调用失败");
    assert!(!state.id.is_empty(), "创建应返回 zone ID");
    assert_eq!(state.get_str("name"), Some(zone_name.as_str()));
    println!("✓ created zone {}", state.id);

    // read
    let refreshed = require_ok!(zone.read(&client, &state).await, "read 调用失败");
    assert_eq!(refreshed.get_i64("ttl"), Some(600));

    // update
    let updated_config = require_some!(
        resource_data(
            zone.as_ref(),
            json!({
                "name": zone_name,
                "email": "admin@example.com",
                "description": "integration test zone (updated)",
                "ttl": 300
            })
        ),
        "zone 更新配置校验失败"
    );
    let updated = require_ok!(
        zone.update(&client, &refreshed, &updated_config).await,
        "update 调用失败"
    );
    assert_eq!(updated.get_i64("ttl"), Some(300));
    assert_eq!(
        updated.get_str("description"),
        Some("integration test zone (updated)")
    );

    // delete（幂等：重复删除同样成功）
    require_ok!(zone.delete(&client, &updated).await, "delete 调用失败");
    require_ok!(zone.delete(&client, &updated).await, "重复 delete 应幂等");

    // 删除后 read 映射为"从状态中移除"
    let gone = require_ok!(
        check_deleted(zone.read(&client, &updated).await),
        "删除后的 read 应映射为 None"
    );
    assert!(gone.is_none(), "删除后的 zone 不应再可读");

    println!("✓ dns_zone 生命周期测试通过");
}

// ============ Recordset lifecycle ============

#[tokio::test]
#[ignore = "integration test: requires HWC_ACCESS_KEY_ID and HWC_SECRET_ACCESS_KEY"]
async fn test_dns_recordset_lifecycle() {
    skip_if_no_credentials!("HWC_ACCESS_KEY_ID", "HWC_SECRET_ACCESS_KEY");

    let ctx = require_some!(TestContext::from_env(), "创建测试上下文失败");
    let client = require_some!(ctx.client(Service::Dns), "创建 DNS 客户端失败");
    let zone = require_some!(TestContext::resource("dns_zone"), "注册表中缺少 dns_zone");
    let recordset = require_some!(
        TestContext::resource("dns_recordset"),
        "注册表中缺少 dns_recordset"
    );

    let zone_name = generate_test_zone_name();
    let zone_config = require_some!(
        resource_data(zone.as_ref(), json!({"name": zone_name})),
        "zone 配置校验失败"
    );
    let zone_state = require_ok!(zone.create(&client, &zone_config).await, "创建 zone 失败");

    let record_name = format!("www.{zone_name}");
    let config = require_some!(
        resource_data(
            recordset.as_ref(),
            json!({
                "zone_id": zone_state.id,
                "name": record_name,
                "type": "A",
                "records": ["192.0.2.1"],
                "ttl": 600
            })
        ),
        "recordset 配置校验失败"
    );

    // create：ID 为 <zone_id>/<recordset_id>
    let state = require_ok!(recordset.create(&client, &config).await, "create 调用失败");
    assert!(
        state.id.starts_with(&format!("{}/", zone_state.id)),
        "复合 ID 应以 zone ID 开头: {}",
        state.id
    );
    assert_eq!(
        state.get_string_list("records"),
        Some(vec!["192.0.2.1".to_string()])
    );

    // update records
    let updated_config = require_some!(
        resource_data(
            recordset.as_ref(),
            json!({
                "zone_id": zone_state.id,
                "name": record_name,
                "type": "A",
                "records": ["192.0.2.1", "192.0.2.2"],
                "ttl": 600
            })
        ),
        "recordset 更新配置校验失败"
    );
    let updated = require_ok!(
        recordset.update(&client, &state, &updated_config).await,
        "update 调用失败"
    );
    assert_eq!(
        updated.get_string_list("records").map(|r| r.len()),
        Some(2)
    );

    // import 与远端状态一致
    let imported = require_ok!(recordset.import(&state.id), "import 解析失败");
    let re_read = require_ok!(
        recordset.read(&client, &imported).await,
        "导入后的 read 失败"
    );
    assert_eq!(re_read.get_str("name"), updated.get_str("name"));

    // cleanup
    require_ok!(recordset.delete(&client, &updated).await, "删除 recordset 失败");
    require_ok!(zone.delete(&client, &zone_state).await, "删除 zone 失败");

    println!("✓ dns_recordset 生命周期测试通过");
}

// ============ Data sources ============

#[tokio::test]
#[ignore = "integration test: requires HWC_ACCESS_KEY_ID and HWC_SECRET_ACCESS_KEY"]
async fn test_dns_zones_data_source() {
    skip_if_no_credentials!("HWC_ACCESS_KEY_ID", "HWC_SECRET_ACCESS_KEY");

    let ctx = require_some!(TestContext::from_env(), "创建测试上下文失败");
    let client = require_some!(ctx.client(Service::Dns), "创建 DNS 客户端失败");
    let zone = require_some!(TestContext::resource("dns_zone"), "注册表中缺少 dns_zone");
    let zones = require_some!(
        TestContext::data_source("dns_zones"),
        "注册表中缺少 dns_zones"
    );

    let zone_name = generate_test_zone_name();
    let zone_config = require_some!(
        resource_data(zone.as_ref(), json!({"name": zone_name})),
        "zone 配置校验失败"
    );
    let zone_state = require_ok!(zone.create(&client, &zone_config).await, "创建 zone 失败");

    let query = require_some!(
        query_data(zones.as_ref(), json!({"zone_type": "public", "name": zone_name})),
        "查询参数校验失败"
    );
    let snapshot = require_ok!(zones.read(&client, &query).await, "数据源查询失败");

    let listed = require_some!(
        snapshot.get("zones").and_then(serde_json::Value::as_array),
        "快照应包含 zones 列表"
    );
    assert!(
        listed
            .iter()
            .any(|z| z.get("id").and_then(serde_json::Value::as_str) == Some(zone_state.id.as_str())),
        "快照应包含刚创建的 zone"
    );

    require_ok!(zone.delete(&client, &zone_state).await, "删除 zone 失败");

    println!("✓ dns_zones 数据源测试通过，共 {} 个 zone", listed.len());
}
