//! 通用服务客户端
//!
//! 每个华为云服务共用同一套请求流程：构造端点 URL、AK/SK 签名、执行请求、
//! 统一错误映射。服务之间只有端点与错误码表不同。

use std::time::Duration;

use chrono::Utc;
use reqwest::{Client, Method};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{ErrorContext, ProviderError, RawApiError, Result, map_status};
use crate::http::HttpUtils;
use crate::sign::{Credentials, sign_request};

/// 默认连接超时（秒）
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
/// 默认请求超时（秒）
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// DNS 服务全局端点
#[cfg(feature = "dns")]
pub(crate) const DNS_HOST: &str = "dns.myhuaweicloud.com";

/// 创建带超时配置的 HTTP Client
pub(crate) fn create_http_client() -> Client {
    Client::builder()
        .connect_timeout(Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS))
        .timeout(Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS))
        .build()
        .expect("Failed to create HTTP client")
}

/// Identifies which Huawei Cloud service a client or resource talks to.
///
/// Each variant is gated behind its corresponding feature flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Service {
    /// Huawei Cloud DNS. Requires feature `dns`.
    #[cfg(feature = "dns")]
    Dns,
    /// CodeArts Deploy. Requires feature `codearts-deploy`.
    #[cfg(feature = "codearts-deploy")]
    CodeartsDeploy,
}

impl Service {
    /// 服务标识符（用于日志与错误上下文）
    pub fn id(self) -> &'static str {
        match self {
            #[cfg(feature = "dns")]
            Self::Dns => "dns",
            #[cfg(feature = "codearts-deploy")]
            Self::CodeartsDeploy => "codearts-deploy",
        }
    }

    /// 服务端点（DNS 为全局端点，其余服务按 region 区域化）
    pub(crate) fn host(self, region: &str) -> String {
        let _ = region;
        match self {
            #[cfg(feature = "dns")]
            Self::Dns => DNS_HOST.to_string(),
            #[cfg(feature = "codearts-deploy")]
            Self::CodeartsDeploy => format!("codearts-deploy.{region}.myhuaweicloud.com"),
        }
    }

    /// 该服务是否为项目级（需要 project id）
    pub(crate) fn project_scoped(self) -> bool {
        match self {
            #[cfg(feature = "dns")]
            Self::Dns => false,
            #[cfg(feature = "codearts-deploy")]
            Self::CodeartsDeploy => true,
        }
    }

    /// 按服务分派错误码映射
    pub(crate) fn map_error(self, raw: RawApiError, ctx: ErrorContext) -> ProviderError {
        match self {
            #[cfg(feature = "dns")]
            Self::Dns => crate::services::dns::error::map_api_error(raw, ctx),
            #[cfg(feature = "codearts-deploy")]
            Self::CodeartsDeploy => crate::services::codearts_deploy::error::map_api_error(raw, ctx),
        }
    }
}

impl std::fmt::Display for Service {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.id())
    }
}

/// A shared HTTP client preconfigured with one service's endpoint and auth.
///
/// Obtain instances via
/// [`ProviderConfig::client_for()`](crate::ProviderConfig::client_for);
/// every resource operation goes through one of these.
pub struct ServiceClient {
    http: Client,
    service: Service,
    host: String,
    project_id: Option<String>,
    credentials: Credentials,
    max_retries: u32,
}

/// 错误响应体（兼容两种格式：DNS 的 code/message 与 CodeArts 的 `error_code`/`error_msg`）
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    code: Option<String>,
    message: Option<String>,
    error_code: Option<String>,
    error_msg: Option<String>,
}

impl ApiErrorBody {
    fn into_raw(self, status: u16) -> Option<RawApiError> {
        let code = self.code.or(self.error_code)?;
        let message = self.message.or(self.error_msg).unwrap_or_default();
        Some(RawApiError::with_code(status, code, message))
    }
}

impl ServiceClient {
    pub(crate) fn new(
        service: Service,
        host: String,
        project_id: Option<String>,
        credentials: Credentials,
        max_retries: u32,
    ) -> Self {
        Self {
            http: create_http_client(),
            service,
            host,
            project_id,
            credentials,
            max_retries,
        }
    }

    /// The service this client is bound to.
    pub fn service(&self) -> Service {
        self.service
    }

    pub(crate) fn service_name(&self) -> &'static str {
        self.service.id()
    }

    /// 统一处理响应错误
    fn handle_response_error(&self, status: u16, response_text: &str, ctx: ErrorContext) -> Result<()> {
        if (200..300).contains(&status) {
            return Ok(());
        }

        // 尝试解析结构化错误
        if let Ok(body) = serde_json::from_str::<ApiErrorBody>(response_text)
            && let Some(raw) = body.into_raw(status)
        {
            return Err(self.service.map_error(raw, ctx));
        }

        // 回退到状态码映射
        Err(map_status(
            self.service_name(),
            RawApiError::new(status, format!("HTTP {status}: {response_text}")),
            &ctx,
        ))
    }

    /// 执行签名请求，返回 (状态码, 响应文本)
    async fn send(
        &self,
        method: Method,
        path: &str,
        query: &str,
        payload: Option<String>,
        ctx: ErrorContext,
    ) -> Result<(u16, String)> {
        let timestamp = Utc::now().format("%Y%m%dT%H%M%SZ").to_string();

        let mut headers = vec![
            ("Host".to_string(), self.host.clone()),
            ("X-Sdk-Date".to_string(), timestamp.clone()),
        ];
        if let Some(ref project_id) = self.project_id {
            headers.push(("X-Project-Id".to_string(), project_id.clone()));
        }
        if payload.is_some() {
            headers.push(("Content-Type".to_string(), "application/json".to_string()));
        }

        let body = payload.unwrap_or_default();
        let authorization = sign_request(
            &self.credentials,
            method.as_str(),
            path,
            query,
            &headers,
            &body,
            &timestamp,
        );

        let url = if query.is_empty() {
            format!("https://{}{}", self.host, path)
        } else {
            format!("https://{}{}?{}", self.host, path, query)
        };

        let mut request = self.http.request(method.clone(), &url);
        for (key, value) in &headers {
            request = request.header(key, value);
        }
        request = request.header("Authorization", authorization);
        if !body.is_empty() {
            log::debug!("Request Body: {}", crate::utils::log_sanitizer::truncate_for_log(&body));
            request = request.body(body);
        }

        let (status, response_text) = HttpUtils::execute_request_with_retry(
            request,
            self.service_name(),
            method.as_str(),
            &url,
            self.max_retries,
        )
        .await?;

        self.handle_response_error(status, &response_text, ctx)?;
        Ok((status, response_text))
    }

    /// 序列化请求体并执行（POST/PUT/PATCH）
    async fn request_with_body<T, B>(
        &self,
        method: Method,
        path: &str,
        body: &B,
        ctx: ErrorContext,
    ) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize,
    {
        let payload =
            serde_json::to_string(body).map_err(|e| ProviderError::SerializationError {
                service: self.service_name().to_string(),
                detail: e.to_string(),
            })?;

        let (_, text) = self.send(method, path, "", Some(payload), ctx).await?;
        HttpUtils::parse_json(&text, self.service_name())
    }

    /// 执行 GET 请求
    pub(crate) async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &str,
        ctx: ErrorContext,
    ) -> Result<T> {
        let (_, text) = self.send(Method::GET, path, query, None, ctx).await?;
        HttpUtils::parse_json(&text, self.service_name())
    }

    /// 执行 POST 请求
    pub(crate) async fn post<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
        ctx: ErrorContext,
    ) -> Result<T> {
        self.request_with_body(Method::POST, path, body, ctx).await
    }

    /// 执行 PUT 请求
    pub(crate) async fn put<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
        ctx: ErrorContext,
    ) -> Result<T> {
        self.request_with_body(Method::PUT, path, body, ctx).await
    }

    /// 执行 PATCH 请求
    pub(crate) async fn patch<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
        ctx: ErrorContext,
    ) -> Result<T> {
        self.request_with_body(Method::PATCH, path, body, ctx).await
    }

    /// 执行 DELETE 请求
    pub(crate) async fn delete(&self, path: &str, ctx: ErrorContext) -> Result<()> {
        self.send(Method::DELETE, path, "", None, ctx).await.map(|_| ())
    }
}
