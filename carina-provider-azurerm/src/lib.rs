//! Carina Azure Provider
//!
//! Azure Resource Manager Provider implementation.
//!
//! ## Module Structure
//!
//! - `config` - Provider configuration and credentials
//! - `auth` - Azure AD token acquisition
//! - `client` - Authenticated ARM HTTP client
//! - `error` - Transport error types
//! - `maps` - Azure Maps account resource
//! - `provider` - AzurermProvider implementation
//! - `resources` - Registry of supported resource types
//! - `tags`, `validation` - Helpers shared by resources

pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod maps;
pub mod provider;
pub mod resources;
pub mod tags;
pub mod validation;

// Re-export main types
pub use config::{AzureConfig, Credentials};
pub use error::{AzureError, AzureResult};
pub use provider::AzurermProvider;

use carina_core::provider::{BoxFuture, Provider, ProviderResult};
use carina_core::resource::{Resource, ResourceId, State};
use carina_core::schema::ResourceSchema;

// =============================================================================
// Provider Trait Implementation
// =============================================================================

impl Provider for AzurermProvider {
    fn name(&self) -> &'static str {
        "azurerm"
    }

    fn schemas(&self) -> Vec<ResourceSchema> {
        self.registry().schemas()
    }

    fn read(
        &self,
        id: &ResourceId,
        identifier: Option<&str>,
    ) -> BoxFuture<'_, ProviderResult<State>> {
        let id = id.clone();
        let identifier = identifier.map(|s| s.to_string());
        Box::pin(async move {
            match identifier {
                Some(identifier) => self.read_resource(&id, &identifier).await,
                None => Ok(State::not_found(id)),
            }
        })
    }

    fn create(&self, resource: &Resource) -> BoxFuture<'_, ProviderResult<State>> {
        let resource = resource.clone();
        Box::pin(async move { self.create_resource(&resource).await })
    }

    fn update(
        &self,
        id: &ResourceId,
        identifier: &str,
        from: &State,
        to: &Resource,
    ) -> BoxFuture<'_, ProviderResult<State>> {
        let id = id.clone();
        let identifier = identifier.to_string();
        let from = from.clone();
        let to = to.clone();
        Box::pin(async move { self.update_resource(&id, &identifier, &from, &to).await })
    }

    fn delete(&self, id: &ResourceId, identifier: &str) -> BoxFuture<'_, ProviderResult<()>> {
        let id = id.clone();
        let identifier = identifier.to_string();
        Box::pin(async move { self.delete_resource(&id, &identifier).await })
    }

    fn import(&self, id: &ResourceId, identifier: &str) -> BoxFuture<'_, ProviderResult<State>> {
        let id = id.clone();
        let identifier = identifier.to_string();
        Box::pin(async move { self.import_resource(&id, &identifier).await })
    }
}
