//! Resource and data source abstractions
//!
//! Every remote object type implements [`Resource`]: a declarative schema
//! plus async CRUD operations against a [`ServiceClient`]. Read-only
//! queries implement [`DataSource`] instead. The registries enumerate all
//! implementations enabled via feature flags.

use async_trait::async_trait;

use crate::client::{Service, ServiceClient};
use crate::error::Result;
use crate::schema::ResourceSchema;
use crate::state::{ResourceData, ResourceState};

/// A declarative description of a remote object whose lifecycle is managed
/// by this provider.
///
/// Lifecycle is entirely server-driven: `create` assigns an ID, `read`
/// refreshes all attributes, `update` mutates a subset, `delete` removes
/// the object. The only client-side invariant is that
/// [`ResourceState::id`] names a remote object; use
/// [`check_deleted`] to translate not-found errors into
/// "remove from state" semantics.
#[async_trait]
pub trait Resource: Send + Sync {
    /// Resource type name (e.g. `"dns_recordset"`).
    fn type_name(&self) -> &'static str;

    /// Which service this resource belongs to.
    fn service(&self) -> Service;

    /// Declarative attribute schema.
    fn schema(&self) -> ResourceSchema;

    /// Create the remote object and return its initial state.
    async fn create(&self, client: &ServiceClient, config: &ResourceData)
    -> Result<ResourceState>;

    /// Refresh all attributes from the remote object.
    async fn read(&self, client: &ServiceClient, state: &ResourceState) -> Result<ResourceState>;

    /// Apply configuration changes to the remote object.
    async fn update(
        &self,
        client: &ServiceClient,
        state: &ResourceState,
        config: &ResourceData,
    ) -> Result<ResourceState>;

    /// Delete the remote object. Deleting an already absent object is not
    /// an error.
    async fn delete(&self, client: &ServiceClient, state: &ResourceState) -> Result<()>;

    /// Parse an import ID into seed state for a subsequent [`read`](Self::read).
    ///
    /// The default accepts the ID as-is; resources with composite IDs
    /// override this to split the ID into attributes.
    fn import(&self, id: &str) -> Result<ResourceState> {
        Ok(ResourceState::new(id))
    }
}

/// A read-only declarative query returning a snapshot of matching objects.
#[async_trait]
pub trait DataSource: Send + Sync {
    /// Data source type name (e.g. `"dns_zones"`).
    fn type_name(&self) -> &'static str;

    /// Which service this data source belongs to.
    fn service(&self) -> Service;

    /// Declarative query/result schema.
    fn schema(&self) -> ResourceSchema;

    /// Execute the query and return the snapshot.
    async fn read(&self, client: &ServiceClient, query: &ResourceData) -> Result<ResourceState>;
}

/// Remap "not found" errors to `Ok(None)`.
///
/// Read paths use this to drop vanished objects from state instead of
/// failing; delete paths use it for idempotence.
pub fn check_deleted<T>(result: Result<T>) -> Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(e) if e.is_not_found() => Ok(None),
        Err(e) => Err(e),
    }
}

/// All resources enabled via feature flags.
pub fn registry() -> Vec<Box<dyn Resource>> {
    let mut resources: Vec<Box<dyn Resource>> = Vec::new();

    #[cfg(feature = "dns")]
    {
        use crate::services::dns;
        resources.push(Box::new(dns::DnsZone));
        resources.push(Box::new(dns::DnsRecordset));
        resources.push(Box::new(dns::DnsCustomLine));
        resources.push(Box::new(dns::DnsLineGroup));
        resources.push(Box::new(dns::DnsEndpoint));
        resources.push(Box::new(dns::DnsResolverRule));
        resources.push(Box::new(dns::DnsResolverRuleAssociation));
        resources.push(Box::new(dns::DnsZoneAuthorization));
    }

    #[cfg(feature = "codearts-deploy")]
    {
        use crate::services::codearts_deploy;
        resources.push(Box::new(codearts_deploy::DeployApplication));
        resources.push(Box::new(codearts_deploy::DeployApplicationGroup));
        resources.push(Box::new(codearts_deploy::DeployHostGroup));
        resources.push(Box::new(codearts_deploy::DeployHost));
        resources.push(Box::new(codearts_deploy::DeployEnvironment));
        resources.push(Box::new(codearts_deploy::DeployHostGroupPermission));
    }

    resources
}

/// All data sources enabled via feature flags.
pub fn data_source_registry() -> Vec<Box<dyn DataSource>> {
    let mut data_sources: Vec<Box<dyn DataSource>> = Vec::new();

    #[cfg(feature = "dns")]
    {
        use crate::services::dns;
        data_sources.push(Box::new(dns::DnsZones));
        data_sources.push(Box::new(dns::DnsRecordsets));
    }

    data_sources
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProviderError;

    #[test]
    fn check_deleted_passes_values() {
        let result: Result<u32> = Ok(1);
        let checked = check_deleted(result);
        assert!(matches!(checked, Ok(Some(1))));
    }

    #[test]
    fn check_deleted_maps_not_found_to_none() {
        let result: Result<u32> = Err(ProviderError::ResourceNotFound {
            service: "dns".to_string(),
            resource_id: "z1".to_string(),
            raw_message: None,
        });
        let checked = check_deleted(result);
        assert!(matches!(checked, Ok(None)));
    }

    #[test]
    fn check_deleted_propagates_other_errors() {
        let result: Result<u32> = Err(ProviderError::QuotaExceeded {
            service: "dns".to_string(),
            raw_message: None,
        });
        let checked = check_deleted(result);
        assert!(matches!(checked, Err(ProviderError::QuotaExceeded { .. })));
    }

    #[test]
    fn registry_type_names_are_unique() {
        let resources = registry();
        let mut names: Vec<&str> = resources.iter().map(|r| r.type_name()).collect();
        let before = names.len();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), before, "duplicate resource type names");
    }

    #[test]
    fn data_source_registry_type_names_are_unique() {
        let data_sources = data_source_registry();
        let mut names: Vec<&str> = data_sources.iter().map(|d| d.type_name()).collect();
        let before = names.len();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), before, "duplicate data source type names");
    }

    #[cfg(feature = "dns")]
    #[test]
    fn default_import_is_passthrough() {
        use crate::services::dns::DnsZone;
        let res = DnsZone.import("zone-1");
        assert!(res.is_ok(), "expected Ok(..), got {res:?}");
        let Ok(state) = res else {
            return;
        };
        assert_eq!(state.id, "zone-1");
    }
}
