//! Provider configuration and per-service client factory.

use std::collections::HashMap;

use crate::client::{Service, ServiceClient};
use crate::error::{ProviderError, Result};
use crate::sign::Credentials;

/// Region used when the caller does not specify one.
pub const DEFAULT_REGION: &str = "cn-north-4";

/// 默认瞬态错误重试次数
const DEFAULT_MAX_RETRIES: u32 = 2;

/// Provider-level configuration: credentials, region and retry behavior.
///
/// One `ProviderConfig` produces a [`ServiceClient`] per service via
/// [`client_for()`](Self::client_for); the clients share credentials but
/// carry service-specific endpoints.
///
/// # Construction
///
/// ```rust,no_run
/// use hwc_resource_provider::ProviderConfig;
///
/// let config = ProviderConfig::builder("your-access-key-id", "your-secret-access-key")
///     .region("cn-north-4")
///     .project_id("your-project-id")
///     .build();
/// ```
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    access_key_id: String,
    secret_access_key: String,
    region: String,
    project_id: Option<String>,
    max_retries: u32,
}

/// Builder for [`ProviderConfig`].
pub struct ProviderConfigBuilder {
    access_key_id: String,
    secret_access_key: String,
    region: String,
    project_id: Option<String>,
    max_retries: u32,
}

impl ProviderConfigBuilder {
    fn new(access_key_id: String, secret_access_key: String) -> Self {
        Self {
            access_key_id,
            secret_access_key,
            region: DEFAULT_REGION.to_string(),
            project_id: None,
            max_retries: DEFAULT_MAX_RETRIES,
        }
    }

    /// Set the target region (default: `cn-north-4`).
    pub fn region(mut self, region: impl Into<String>) -> Self {
        self.region = region.into();
        self
    }

    /// Set the project ID required by project-scoped services (CodeArts Deploy).
    pub fn project_id(mut self, project_id: impl Into<String>) -> Self {
        self.project_id = Some(project_id.into());
        self
    }

    /// Set the maximum number of automatic retries for transient errors (default: 2).
    pub fn max_retries(mut self, retries: u32) -> Self {
        self.max_retries = retries;
        self
    }

    /// Build the [`ProviderConfig`] instance.
    pub fn build(self) -> ProviderConfig {
        ProviderConfig {
            access_key_id: self.access_key_id,
            secret_access_key: self.secret_access_key,
            region: self.region,
            project_id: self.project_id,
            max_retries: self.max_retries,
        }
    }
}

impl ProviderConfig {
    /// Creates a configuration with default region and retry settings.
    pub fn new(access_key_id: impl Into<String>, secret_access_key: impl Into<String>) -> Self {
        Self::builder(access_key_id, secret_access_key).build()
    }

    /// Returns a builder for customizing region, project and retries.
    pub fn builder(
        access_key_id: impl Into<String>,
        secret_access_key: impl Into<String>,
    ) -> ProviderConfigBuilder {
        ProviderConfigBuilder::new(access_key_id.into(), secret_access_key.into())
    }

    /// Construct a configuration from a flat key-value map, validating
    /// required fields.
    ///
    /// Recognized keys: `accessKeyId`, `secretAccessKey` (required),
    /// `region`, `projectId` (optional).
    pub fn from_map(map: &HashMap<String, String>) -> Result<Self> {
        let access_key_id = required_field(map, "accessKeyId")?;
        let secret_access_key = required_field(map, "secretAccessKey")?;

        let mut builder = Self::builder(access_key_id, secret_access_key);
        if let Some(region) = map.get("region")
            && !region.trim().is_empty()
        {
            builder = builder.region(region.clone());
        }
        if let Some(project_id) = map.get("projectId")
            && !project_id.trim().is_empty()
        {
            builder = builder.project_id(project_id.clone());
        }
        Ok(builder.build())
    }

    /// The configured region.
    pub fn region(&self) -> &str {
        &self.region
    }

    /// Create a [`ServiceClient`] bound to `service`.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::InvalidParameter`] when the service is
    /// project-scoped and no project ID was configured.
    pub fn client_for(&self, service: Service) -> Result<ServiceClient> {
        let project_id = if service.project_scoped() {
            match self.project_id.clone() {
                Some(id) => Some(id),
                None => {
                    return Err(ProviderError::InvalidParameter {
                        service: service.id().to_string(),
                        param: "project_id".to_string(),
                        detail: "this service is project-scoped, configure project_id".to_string(),
                    });
                }
            }
        } else {
            None
        };

        Ok(ServiceClient::new(
            service,
            service.host(&self.region),
            project_id,
            Credentials {
                access_key_id: self.access_key_id.clone(),
                secret_access_key: self.secret_access_key.clone(),
            },
            self.max_retries,
        ))
    }
}

/// 从 map 获取必填字段并校验非空
fn required_field(map: &HashMap<String, String>, key: &str) -> Result<String> {
    match map.get(key) {
        None => Err(ProviderError::InvalidParameter {
            service: "config".to_string(),
            param: key.to_string(),
            detail: "missing required field".to_string(),
        }),
        Some(v) if v.trim().is_empty() => Err(ProviderError::InvalidParameter {
            service: "config".to_string(),
            param: key.to_string(),
            detail: "field must not be empty".to_string(),
        }),
        Some(v) => Ok(v.clone()),
    }
}
