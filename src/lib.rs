//! # hwc-resource-provider
//!
//! A declarative resource and data source library for managing Huawei Cloud
//! services.
//!
//! Every remote object type is described by a schema (attribute names, types,
//! required/optional/computed flags, defaults) and implemented as async CRUD
//! glue: build a JSON request body from schema values, call the signed REST
//! endpoint, flatten the JSON response back into a flat attribute map, and
//! paginate list APIs.
//!
//! ## Supported Services
//!
//! | Service | Feature Flag | Endpoint |
//! |---------|-------------|----------|
//! | [Huawei Cloud DNS](https://www.huaweicloud.com/product/dns.html) | `dns` | global |
//! | [CodeArts Deploy](https://www.huaweicloud.com/product/deploy.html) | `codearts-deploy` | regional, project-scoped |
//!
//! ## Feature Flags
//!
//! ### Service Selection
//!
//! - **`all-services`** *(default)* — Enable all services listed above.
//! - **`dns`** — Enable only the DNS resources and data sources.
//! - **`codearts-deploy`** — Enable only the CodeArts Deploy resources.
//!
//! ### TLS Backend
//!
//! - **`native-tls`** *(default)* — Use the platform's native TLS implementation.
//! - **`rustls`** — Use rustls. Recommended for cross-compilation.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use hwc_resource_provider::{ProviderConfig, ResourceData, Service, registry};
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // 1. Configure credentials and build a service client
//!     let config = ProviderConfig::builder("your-access-key-id", "your-secret-access-key")
//!         .region("cn-north-4")
//!         .build();
//!     let client = config.client_for(Service::Dns)?;
//!
//!     // 2. Pick a resource implementation from the registry
//!     let resources = registry();
//!     let Some(zone) = resources.iter().find(|r| r.type_name() == "dns_zone") else {
//!         return Err("dns feature not enabled".into());
//!     };
//!
//!     // 3. Validate the declarative configuration against its schema
//!     let serde_json::Value::Object(attrs) = json!({
//!         "name": "example.com.",
//!         "email": "admin@example.com",
//!         "ttl": 600
//!     }) else {
//!         unreachable!()
//!     };
//!     let data = ResourceData::new(&zone.schema(), attrs)
//!         .map_err(|errors| format!("invalid config: {errors:?}"))?;
//!
//!     // 4. Drive the lifecycle
//!     let state = zone.create(&client, &data).await?;
//!     println!("created zone {}", state.id);
//!
//!     let refreshed = zone.read(&client, &state).await?;
//!     println!("zone status: {:?}", refreshed.get_str("status"));
//!
//!     zone.delete(&client, &state).await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Composite IDs
//!
//! Child resources encode their parents in the state ID, `/`-joined:
//! `dns_recordset` uses `<zone_id>/<recordset_id>`,
//! `codearts_deploy_host_group_permission` uses
//! `<project_id>/<group_id>/<role_id>/<permission_name>`. The
//! [`Resource::import()`] implementations parse these back into attributes.
//!
//! ## Error Handling
//!
//! All operations return [`Result<T, ProviderError>`](ProviderError). Vendor
//! error codes are mapped into structured variants; unmapped codes fall back
//! to the HTTP status. Not-found errors are remapped to "resource removed
//! from state" semantics via [`check_deleted`], which makes read refreshes
//! drop vanished objects and deletes idempotent.
//!
//! Transient errors (`NetworkError`, `Timeout`, `RateLimited`) are
//! automatically retried with exponential backoff.

mod client;
mod config;
mod error;
mod flatten;
mod http;
mod import;
mod pagination;
mod resource;
mod schema;
mod services;
mod sign;
mod state;
mod utils;

// Re-export error types
pub use error::{ProviderError, Result};

// Re-export client and configuration
pub use client::{Service, ServiceClient};
pub use config::{DEFAULT_REGION, ProviderConfig, ProviderConfigBuilder};

// Re-export the schema layer
pub use schema::{AttributeSchema, AttributeType, ResourceSchema, TypeError};

// Re-export configuration/state maps
pub use state::{AttrMap, ResourceData, ResourceState};

// Re-export flatten and pagination helpers
pub use flatten::{BodyBuilder, path_search, path_search_str};
pub use pagination::{Page, fetch_all};

// Re-export import helpers
pub use import::{join_composite_id, parse_composite_id};

// Re-export core traits and registries
pub use resource::{DataSource, Resource, check_deleted, data_source_registry, registry};

// Re-export concrete resources (behind feature flags)
#[cfg(feature = "dns")]
pub use services::dns::{
    DnsCustomLine, DnsEndpoint, DnsLineGroup, DnsRecordset, DnsRecordsets, DnsResolverRule,
    DnsResolverRuleAssociation, DnsZone, DnsZoneAuthorization, DnsZones,
};

#[cfg(feature = "codearts-deploy")]
pub use services::codearts_deploy::{
    DeployApplication, DeployApplicationGroup, DeployEnvironment, DeployHost, DeployHostGroup,
    DeployHostGroupPermission,
};
