use serde::{Deserialize, Serialize};

/// Unified error type for all resource operations.
///
/// Each variant includes a `service` field identifying which service client
/// produced the error, plus variant-specific context. All variants are
/// serializable for structured error reporting.
///
/// # Retryable Errors
///
/// The following variants represent transient failures that may succeed on retry:
/// - [`NetworkError`](Self::NetworkError) — network connectivity issues
/// - [`Timeout`](Self::Timeout) — request timed out
/// - [`RateLimited`](Self::RateLimited) — API rate limit exceeded
///
/// The built-in HTTP client automatically retries these with exponential backoff.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "code")]
pub enum ProviderError {
    /// A network-level error occurred (DNS resolution failure, connection refused, etc.).
    ///
    /// This is a transient error and is automatically retried.
    NetworkError {
        /// Service that produced the error.
        service: String,
        /// Error details.
        detail: String,
    },

    /// The HTTP request timed out.
    ///
    /// This is a transient error and is automatically retried.
    Timeout {
        /// Service that produced the error.
        service: String,
        /// Error details.
        detail: String,
    },

    /// The API rate limit has been exceeded (HTTP 429 or equivalent).
    ///
    /// This is a transient error. Unlike [`QuotaExceeded`](Self::QuotaExceeded),
    /// the request should succeed after waiting.
    RateLimited {
        /// Service that produced the error.
        service: String,
        /// Suggested wait time in seconds before retrying, if provided by the API.
        retry_after: Option<u64>,
        /// Original error message from the API, if available.
        raw_message: Option<String>,
    },

    /// The provided credentials are invalid or expired.
    InvalidCredentials {
        /// Service that produced the error.
        service: String,
        /// Original error message from the API, if available.
        raw_message: Option<String>,
    },

    /// The authenticated user lacks permission for the requested operation.
    PermissionDenied {
        /// Service that produced the error.
        service: String,
        /// Original error message from the API, if available.
        raw_message: Option<String>,
    },

    /// The account's resource quota has been exceeded.
    ///
    /// Unlike [`RateLimited`](Self::RateLimited), this is not a transient condition.
    QuotaExceeded {
        /// Service that produced the error.
        service: String,
        /// Original error message from the API, if available.
        raw_message: Option<String>,
    },

    /// The requested remote object was not found.
    ///
    /// On read and delete paths this is remapped to "resource removed from
    /// state" semantics via [`check_deleted`](crate::check_deleted).
    ResourceNotFound {
        /// Service that produced the error.
        service: String,
        /// ID of the object that was not found.
        resource_id: String,
        /// Original error message from the API, if available.
        raw_message: Option<String>,
    },

    /// An object with the same name already exists.
    ResourceExists {
        /// Service that produced the error.
        service: String,
        /// Name of the conflicting object.
        name: String,
        /// Original error message from the API, if available.
        raw_message: Option<String>,
    },

    /// A request parameter is invalid (bad TTL value, malformed ID, etc.).
    InvalidParameter {
        /// Service that produced the error.
        service: String,
        /// Name of the invalid parameter.
        param: String,
        /// Description of what's wrong.
        detail: String,
    },

    /// Failed to parse the API response.
    ParseError {
        /// Service that produced the error.
        service: String,
        /// Details about the parse failure.
        detail: String,
    },

    /// Failed to serialize a request body.
    SerializationError {
        /// Service that produced the error.
        service: String,
        /// Details about the serialization failure.
        detail: String,
    },

    /// An unrecognized error from the API.
    ///
    /// This is a catch-all for error codes not yet mapped to a specific variant.
    Unknown {
        /// Service that produced the error.
        service: String,
        /// Raw error code from the API, if available.
        raw_code: Option<String>,
        /// Raw error message from the API.
        raw_message: String,
    },
}

impl ProviderError {
    /// 是否为预期行为（用户输入、资源不存在等），用于日志分级。
    ///
    /// 返回 `true` 时应使用 `warn` 级别，`false` 时使用 `error` 级别。
    /// **新增变体时请同步更新此方法。**
    #[must_use]
    pub fn is_expected(&self) -> bool {
        matches!(
            self,
            Self::InvalidCredentials { .. }
                | Self::PermissionDenied { .. }
                | Self::QuotaExceeded { .. }
                | Self::ResourceNotFound { .. }
                | Self::ResourceExists { .. }
                | Self::InvalidParameter { .. }
        )
    }

    /// 远端对象是否已不存在（read/delete 时映射为"从状态中移除"）。
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::ResourceNotFound { .. })
    }
}

impl std::fmt::Display for ProviderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NetworkError { service, detail } => {
                write!(f, "[{service}] Network error: {detail}")
            }
            Self::Timeout { service, detail } => {
                write!(f, "[{service}] Request timeout: {detail}")
            }
            Self::RateLimited {
                service,
                retry_after,
                ..
            } => {
                if let Some(secs) = retry_after {
                    write!(f, "[{service}] Rate limited (retry after {secs}s)")
                } else {
                    write!(f, "[{service}] Rate limited")
                }
            }
            Self::InvalidCredentials {
                service,
                raw_message,
            } => {
                if let Some(msg) = raw_message {
                    write!(f, "[{service}] Invalid credentials: {msg}")
                } else {
                    write!(f, "[{service}] Invalid credentials")
                }
            }
            Self::PermissionDenied {
                service,
                raw_message,
            } => {
                if let Some(msg) = raw_message {
                    write!(f, "[{service}] Permission denied: {msg}")
                } else {
                    write!(f, "[{service}] Permission denied")
                }
            }
            Self::QuotaExceeded { service, .. } => {
                write!(f, "[{service}] Quota exceeded")
            }
            Self::ResourceNotFound {
                service,
                resource_id,
                ..
            } => {
                write!(f, "[{service}] Resource '{resource_id}' not found")
            }
            Self::ResourceExists { service, name, .. } => {
                write!(f, "[{service}] Resource '{name}' already exists")
            }
            Self::InvalidParameter {
                service,
                param,
                detail,
            } => {
                write!(f, "[{service}] Invalid parameter '{param}': {detail}")
            }
            Self::ParseError { service, detail } => {
                write!(f, "[{service}] Parse error: {detail}")
            }
            Self::SerializationError { service, detail } => {
                write!(f, "[{service}] Serialization error: {detail}")
            }
            Self::Unknown {
                service,
                raw_message,
                ..
            } => {
                write!(f, "[{service}] {raw_message}")
            }
        }
    }
}

impl std::error::Error for ProviderError {}

/// Convenience type alias for `Result<T, ProviderError>`.
pub type Result<T> = std::result::Result<T, ProviderError>;

/// 原始 API 错误（内部使用）
#[derive(Debug, Clone)]
pub(crate) struct RawApiError {
    /// HTTP 状态码
    pub status: u16,
    /// 错误码（各服务格式不同：DNS.xxxx / APIGW.xxxx / Deploy.xxxxxxxx）
    pub code: Option<String>,
    /// 原始错误消息
    pub message: String,
}

impl RawApiError {
    pub fn new(status: u16, message: impl Into<String>) -> Self {
        Self {
            status,
            code: None,
            message: message.into(),
        }
    }

    pub fn with_code(status: u16, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            status,
            code: Some(code.into()),
            message: message.into(),
        }
    }
}

/// 错误上下文信息（内部使用）
/// 用于在映射错误时提供额外信息
#[derive(Debug, Clone, Default)]
pub(crate) struct ErrorContext {
    /// 对象 ID（用于 `ResourceNotFound` 等错误）
    pub resource_id: Option<String>,
    /// 对象名称（用于 `ResourceExists` 等错误）
    pub name: Option<String>,
}

impl ErrorContext {
    /// 以对象 ID 构造上下文
    pub fn for_id(resource_id: impl Into<String>) -> Self {
        Self {
            resource_id: Some(resource_id.into()),
            ..Self::default()
        }
    }

    /// 以对象名称构造上下文
    pub fn for_name(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }
}

/// 基于 HTTP 状态码的兜底映射。
///
/// 各服务的错误码表（`services/*/error.rs`）优先；仅当响应没有可识别的
/// 结构化错误码时才走这里。
pub(crate) fn map_status(service: &str, raw: RawApiError, ctx: &ErrorContext) -> ProviderError {
    match raw.status {
        401 => ProviderError::InvalidCredentials {
            service: service.to_string(),
            raw_message: Some(raw.message),
        },
        403 => ProviderError::PermissionDenied {
            service: service.to_string(),
            raw_message: Some(raw.message),
        },
        404 => ProviderError::ResourceNotFound {
            service: service.to_string(),
            resource_id: ctx.resource_id.clone().unwrap_or_default(),
            raw_message: Some(raw.message),
        },
        409 => ProviderError::ResourceExists {
            service: service.to_string(),
            name: ctx.name.clone().unwrap_or_default(),
            raw_message: Some(raw.message),
        },
        _ => ProviderError::Unknown {
            service: service.to_string(),
            raw_code: raw.code,
            raw_message: raw.message,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_network_error() {
        let e = ProviderError::NetworkError {
            service: "dns".to_string(),
            detail: "connection refused".to_string(),
        };
        assert_eq!(e.to_string(), "[dns] Network error: connection refused");
    }

    #[test]
    fn display_invalid_credentials_with_message() {
        let e = ProviderError::InvalidCredentials {
            service: "dns".to_string(),
            raw_message: Some("bad key".to_string()),
        };
        assert_eq!(e.to_string(), "[dns] Invalid credentials: bad key");
    }

    #[test]
    fn display_resource_not_found() {
        let e = ProviderError::ResourceNotFound {
            service: "codearts-deploy".to_string(),
            resource_id: "abc123".to_string(),
            raw_message: None,
        };
        assert_eq!(e.to_string(), "[codearts-deploy] Resource 'abc123' not found");
    }

    #[test]
    fn display_invalid_parameter() {
        let e = ProviderError::InvalidParameter {
            service: "dns".to_string(),
            param: "ttl".to_string(),
            detail: "must be > 0".to_string(),
        };
        assert_eq!(e.to_string(), "[dns] Invalid parameter 'ttl': must be > 0");
    }

    #[test]
    fn display_rate_limited_with_retry() {
        let e = ProviderError::RateLimited {
            service: "dns".to_string(),
            retry_after: Some(30),
            raw_message: None,
        };
        assert_eq!(e.to_string(), "[dns] Rate limited (retry after 30s)");
    }

    #[test]
    fn is_not_found_only_for_not_found() {
        let not_found = ProviderError::ResourceNotFound {
            service: "dns".to_string(),
            resource_id: "x".to_string(),
            raw_message: None,
        };
        assert!(not_found.is_not_found());

        let other = ProviderError::QuotaExceeded {
            service: "dns".to_string(),
            raw_message: None,
        };
        assert!(!other.is_not_found());
    }

    #[test]
    fn is_expected_variants() {
        let expected = ProviderError::InvalidParameter {
            service: "dns".to_string(),
            param: "name".to_string(),
            detail: "bad".to_string(),
        };
        assert!(expected.is_expected());

        let unexpected = ProviderError::ParseError {
            service: "dns".to_string(),
            detail: "bad json".to_string(),
        };
        assert!(!unexpected.is_expected());
    }

    #[test]
    fn serialize_json_tagged() {
        let e = ProviderError::RateLimited {
            service: "dns".to_string(),
            retry_after: Some(60),
            raw_message: Some("too many requests".to_string()),
        };
        let json = serde_json::to_string(&e).unwrap();
        assert!(json.contains("\"code\":\"RateLimited\""));
        assert!(json.contains("\"retry_after\":60"));
    }

    #[test]
    fn deserialize_json_round_trip() {
        let original = ProviderError::ResourceExists {
            service: "dns".to_string(),
            name: "www".to_string(),
            raw_message: None,
        };
        let json = serde_json::to_string(&original).unwrap();
        let deserialized: ProviderError = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized.to_string(), original.to_string());
    }

    #[test]
    fn map_status_fallbacks() {
        let ctx = ErrorContext::for_id("rs-1");
        let e = map_status("dns", RawApiError::new(404, "gone"), &ctx);
        assert!(e.is_not_found());

        let e = map_status("dns", RawApiError::new(401, "denied"), &ctx);
        assert!(matches!(e, ProviderError::InvalidCredentials { .. }));

        let e = map_status("dns", RawApiError::new(403, "denied"), &ctx);
        assert!(matches!(e, ProviderError::PermissionDenied { .. }));

        let e = map_status("dns", RawApiError::new(500, "boom"), &ctx);
        assert!(matches!(e, ProviderError::Unknown { .. }));
    }
}
