//! 部署服务错误码映射
//!
//! 部署服务的错误响应使用 `error_code`/`error_msg` 字段，错误码前缀
//! `Deploy.`。除少量已知错误码外按 HTTP 状态码兜底映射（404 仍得到
//! `ResourceNotFound`，保证 read/delete 的"已删除"语义）。

use crate::error::{ErrorContext, ProviderError, RawApiError, map_status};

const SERVICE: &str = "codearts-deploy";

/// 部署服务错误码映射实现
pub(crate) fn map_api_error(raw: RawApiError, ctx: ErrorContext) -> ProviderError {
    match raw.code.as_deref() {
        // 项目下应用权限正在更新，稍后重试即可成功
        Some("Deploy.00060222") => ProviderError::RateLimited {
            service: SERVICE.to_string(),
            retry_after: None,
            raw_message: Some(raw.message),
        },

        _ => map_status(SERVICE, raw, &ctx),
    }
}
