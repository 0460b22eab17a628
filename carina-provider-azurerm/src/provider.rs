//! Azure Resource Manager Provider implementation
//!
//! The provider owns the handler registry and the stop token; each lifecycle
//! call is dispatched to the handler of its resource type inside an
//! operation scope carrying that type's deadline.

use std::sync::Arc;

use carina_core::provider::{ProviderError, ProviderErrorKind, ProviderResult, ResourceHandler};
use carina_core::registry::ResourceRegistry;
use carina_core::resource::{Resource, ResourceId, State};
use carina_core::timeouts::{Operation, OperationContext, ResourceTimeouts};
use log::debug;
use tokio_util::sync::CancellationToken;

use crate::client::ArmClient;
use crate::config::AzureConfig;
use crate::error::AzureResult;
use crate::resources::resource_registry;

/// Azure Resource Manager Provider
pub struct AzurermProvider {
    registry: ResourceRegistry,
    stop: CancellationToken,
}

impl AzurermProvider {
    /// Create a provider with all supported resource types
    pub fn new(config: AzureConfig) -> AzureResult<Self> {
        let arm = Arc::new(ArmClient::new(config)?);
        Ok(Self::with_registry(resource_registry(arm)))
    }

    /// Create a provider configured from `ARM_*` environment variables
    pub fn from_env() -> AzureResult<Self> {
        Self::new(AzureConfig::from_env()?)
    }

    /// Create with a specific registry (for testing)
    pub fn with_registry(registry: ResourceRegistry) -> Self {
        Self {
            registry,
            stop: CancellationToken::new(),
        }
    }

    /// Override the timeouts of a resource type
    pub fn with_timeouts(mut self, resource_type: &str, timeouts: ResourceTimeouts) -> Self {
        if !self.registry.set_timeouts(resource_type, timeouts) {
            debug!("Ignoring timeouts for unknown resource type {}", resource_type);
        }
        self
    }

    /// Cancel all in-flight and future operations
    pub fn stop(&self) {
        self.stop.cancel();
    }

    pub(crate) fn registry(&self) -> &ResourceRegistry {
        &self.registry
    }

    fn handler(&self, id: &ResourceId) -> ProviderResult<&dyn ResourceHandler> {
        self.registry
            .get(&id.resource_type)
            .map_err(|e| e.for_resource(id.clone()))
    }

    fn context(&self, id: &ResourceId, operation: Operation) -> OperationContext {
        let timeout = self.registry.timeouts(&id.resource_type).get(operation);
        debug!("{} {} (timeout {}s)", operation, id, timeout.as_secs());
        OperationContext::new(operation, timeout, &self.stop)
    }

    // =========================================================================
    // Resource Operations
    // =========================================================================

    pub async fn read_resource(&self, id: &ResourceId, identifier: &str) -> ProviderResult<State> {
        let handler = self.handler(id)?;
        let ctx = self.context(id, Operation::Read);
        ctx.run(handler.read(id, identifier))
            .await
            .map_err(|e| attach_resource(e, id))
    }

    pub async fn create_resource(&self, resource: &Resource) -> ProviderResult<State> {
        let handler = self.handler(&resource.id)?;
        validate_attributes(handler, resource)?;

        let ctx = self.context(&resource.id, Operation::Create);
        ctx.run(handler.create(resource))
            .await
            .map_err(|e| attach_resource(e, &resource.id))
    }

    pub async fn update_resource(
        &self,
        id: &ResourceId,
        identifier: &str,
        from: &State,
        to: &Resource,
    ) -> ProviderResult<State> {
        let handler = self.handler(id)?;
        validate_attributes(handler, to)?;

        let replaced = handler
            .schema()
            .replacement_attributes(&from.attributes, &to.attributes);
        if !replaced.is_empty() {
            return Err(ProviderError::new(format!(
                "Update not supported for {} ({} changed), delete and recreate",
                id.resource_type,
                replaced.join(", ")
            ))
            .with_kind(ProviderErrorKind::Validation)
            .for_resource(id.clone()));
        }

        let ctx = self.context(id, Operation::Update);
        ctx.run(handler.update(id, identifier, from, to))
            .await
            .map_err(|e| attach_resource(e, id))
    }

    pub async fn delete_resource(&self, id: &ResourceId, identifier: &str) -> ProviderResult<()> {
        let handler = self.handler(id)?;
        let ctx = self.context(id, Operation::Delete);
        ctx.run(handler.delete(id, identifier))
            .await
            .map_err(|e| attach_resource(e, id))
    }

    pub async fn import_resource(&self, id: &ResourceId, identifier: &str) -> ProviderResult<State> {
        let handler = self.handler(id)?;
        handler
            .validate_identifier(identifier)
            .map_err(|e| attach_resource(e, id))?;

        let state = self.read_resource(id, identifier).await?;
        if !state.exists {
            return Err(ProviderError::new(format!(
                "Cannot import non-existent remote object {:?}",
                identifier
            ))
            .for_resource(id.clone()));
        }
        Ok(state)
    }
}

fn validate_attributes(handler: &dyn ResourceHandler, resource: &Resource) -> ProviderResult<()> {
    handler
        .schema()
        .validate(&resource.attributes)
        .map_err(|errors| ProviderError::validation(&errors).for_resource(resource.id.clone()))
}

fn attach_resource(error: ProviderError, id: &ResourceId) -> ProviderError {
    if error.resource_id.is_some() {
        error
    } else {
        error.for_resource(id.clone())
    }
}
