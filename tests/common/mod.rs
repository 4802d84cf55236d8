//! 共享测试工具和辅助函数

#![allow(dead_code)]

use std::env;

use hwc_resource_provider::{
    DataSource, ProviderConfig, Resource, ResourceData, Service, ServiceClient,
    data_source_registry, registry,
};
use serde_json::Value;

/// 跳过测试的宏（当环境变量缺失时）
#[macro_export]
macro_rules! skip_if_no_credentials {
    ($($var:expr),+) => {
        $(
            if std::env::var($var).is_err() {
                eprintln!("跳过测试: 缺少环境变量 {}", $var);
                return;
            }
        )+
    };
}

/// 断言 `Option` 为 `Some`，并解包返回内部值（失败则直接让测试失败）。
#[macro_export]
macro_rules! require_some {
    ($expr:expr $(,)?) => {{
        let opt = $expr;
        assert!(opt.is_some(), "expected Some(..), got None");
        let Some(val) = opt else {
            return;
        };
        val
    }};
    ($expr:expr, $($msg:tt)+) => {{
        let opt = $expr;
        assert!(opt.is_some(), "{}", format_args!($($msg)+));
        let Some(val) = opt else {
            return;
        };
        val
    }};
}

/// 断言 `Result` 为 `Ok`，并解包返回内部值（失败则直接让测试失败）。
#[macro_export]
macro_rules! require_ok {
    ($expr:expr $(,)?) => {{
        let res = $expr;
        assert!(res.is_ok(), "expected Ok(..), got {:?}", res.err());
        let Ok(val) = res else {
            return;
        };
        val
    }};
    ($expr:expr, $($msg:tt)+) => {{
        let res = $expr;
        assert!(
            res.is_ok(),
            "{}: {:?}",
            format_args!($($msg)+),
            res.err()
        );
        let Ok(val) = res else {
            return;
        };
        val
    }};
}

/// 生成唯一的测试对象名称
pub fn generate_test_name(prefix: &str) -> String {
    let uuid = uuid::Uuid::new_v4();
    format!("{prefix}-{}", &uuid.to_string()[..8])
}

/// 生成唯一的测试 zone 名称（末尾带点）
pub fn generate_test_zone_name() -> String {
    let uuid = uuid::Uuid::new_v4();
    format!("tf-test-{}.example.com.", &uuid.to_string()[..8])
}

/// 测试上下文 - 封装 ProviderConfig 与注册表查找
pub struct TestContext {
    pub config: ProviderConfig,
}

impl TestContext {
    /// 从环境变量创建测试上下文
    pub fn from_env() -> Option<Self> {
        let access_key_id = env::var("HWC_ACCESS_KEY_ID").ok()?;
        let secret_access_key = env::var("HWC_SECRET_ACCESS_KEY").ok()?;

        let mut builder = ProviderConfig::builder(access_key_id, secret_access_key);
        if let Ok(region) = env::var("HWC_REGION") {
            builder = builder.region(region);
        }
        if let Ok(project_id) = env::var("HWC_PROJECT_ID") {
            builder = builder.project_id(project_id);
        }
        Some(Self {
            config: builder.build(),
        })
    }

    /// 创建指定服务的客户端
    pub fn client(&self, service: Service) -> Option<ServiceClient> {
        self.config.client_for(service).ok()
    }

    /// 在注册表中查找资源实现
    pub fn resource(type_name: &str) -> Option<Box<dyn Resource>> {
        registry().into_iter().find(|r| r.type_name() == type_name)
    }

    /// 在注册表中查找数据源实现
    pub fn data_source(type_name: &str) -> Option<Box<dyn DataSource>> {
        data_source_registry()
            .into_iter()
            .find(|d| d.type_name() == type_name)
    }
}

/// 按资源 schema 构造并校验配置
pub fn resource_data(resource: &dyn Resource, value: Value) -> Option<ResourceData> {
    let Value::Object(map) = value else {
        return None;
    };
    ResourceData::new(&resource.schema(), map).ok()
}

/// 按数据源 schema 构造并校验查询
pub fn query_data(data_source: &dyn DataSource, value: Value) -> Option<ResourceData> {
    let Value::Object(map) = value else {
        return None;
    };
    ResourceData::new(&data_source.schema(), map).ok()
}
