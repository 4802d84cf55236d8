//! CodeArts Deploy resources
//!
//! 部署服务：应用、应用分组、主机集群（主机组）、主机、部署环境、
//! 主机组权限。该服务是项目级的，客户端需携带 project id。

pub(crate) mod error;

mod application;
mod application_group;
mod environment;
mod group_permission;
mod host;
mod host_group;

pub use application::DeployApplication;
pub use application_group::DeployApplicationGroup;
pub use environment::DeployEnvironment;
pub use group_permission::DeployHostGroupPermission;
pub use host::DeployHost;
pub use host_group::DeployHostGroup;

use serde_json::Value;

use crate::flatten::path_search;

/// 单页最大条数（部署服务 list 接口上限）
pub(crate) const MAX_PAGE_SIZE: u32 = 100;

/// 部署服务把对象包在 `result` 信封里返回；没有信封时原样使用
pub(crate) fn result_of(body: &Value) -> &Value {
    path_search("result", body).unwrap_or(body)
}
