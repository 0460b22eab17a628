//! Provider - Trait abstracting resource operations
//!
//! A Provider defines operations for a specific infrastructure (Azure, AWS, etc.).
//! It is responsible for converting lifecycle calls into actual API calls.
//! Providers are usually composed from one [`ResourceHandler`] per resource type.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use async_trait::async_trait;

use crate::resource::{Resource, ResourceId, State};
use crate::schema::{ResourceSchema, TypeError};
use crate::timeouts::{Operation, ResourceTimeouts};

/// Category of a provider failure, for callers that need to react to it
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderErrorKind {
    /// Remote API or transport failure
    Api,
    /// A resource with the same identity already exists and must be imported
    AlreadyExists { identifier: String },
    /// The identifier could not be parsed
    InvalidIdentifier,
    /// The remote API reported success but returned inconsistent data
    Inconsistent,
    /// Desired attributes failed schema validation
    Validation,
    /// No handler is registered for the resource type
    UnknownResourceType,
    /// The operation deadline elapsed
    Timeout,
    /// The provider was stopped while the operation was running
    Cancelled,
    Other,
}

/// Error type for Provider operations
#[derive(Debug)]
pub struct ProviderError {
    pub message: String,
    pub kind: ProviderErrorKind,
    pub resource_id: Option<ResourceId>,
    pub cause: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl std::fmt::Display for ProviderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(ref id) = self.resource_id {
            write!(f, "[{}.{}] {}", id.resource_type, id.name, self.message)
        } else {
            write!(f, "{}", self.message)
        }
    }
}

impl std::error::Error for ProviderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.cause
            .as_ref()
            .map(|e| e.as_ref() as &dyn std::error::Error)
    }
}

impl ProviderError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind: ProviderErrorKind::Other,
            resource_id: None,
            cause: None,
        }
    }

    /// Remote API failure with context about the call that failed
    pub fn api(
        message: impl Into<String>,
        cause: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        let message = format!("{}: {}", message.into(), cause);
        Self::new(message)
            .with_kind(ProviderErrorKind::Api)
            .with_cause(cause)
    }

    /// A resource already exists outside of Carina's state
    pub fn already_exists(resource_type: &str, identifier: impl Into<String>) -> Self {
        let identifier = identifier.into();
        Self::new(format!(
            "A resource with the ID {:?} already exists - to be managed via Carina this \
             resource needs to be imported into the state. Please see the resource \
             documentation for {:?} for more information.",
            identifier, resource_type
        ))
        .with_kind(ProviderErrorKind::AlreadyExists { identifier })
    }

    pub fn invalid_identifier(message: impl Into<String>) -> Self {
        Self::new(message).with_kind(ProviderErrorKind::InvalidIdentifier)
    }

    pub fn inconsistent(message: impl Into<String>) -> Self {
        Self::new(message).with_kind(ProviderErrorKind::Inconsistent)
    }

    pub fn validation(errors: &[TypeError]) -> Self {
        let details: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
        Self::new(format!("Invalid attributes: {}", details.join("; ")))
            .with_kind(ProviderErrorKind::Validation)
    }

    pub fn unknown_resource_type(resource_type: &str) -> Self {
        Self::new(format!("Unknown resource type: {}", resource_type))
            .with_kind(ProviderErrorKind::UnknownResourceType)
    }

    pub fn timeout(operation: Operation, after: Duration) -> Self {
        Self::new(format!(
            "Timed out after {}s waiting for {} to complete",
            after.as_secs(),
            operation
        ))
        .with_kind(ProviderErrorKind::Timeout)
    }

    pub fn cancelled(operation: Operation) -> Self {
        Self::new(format!("Provider stopped during {}", operation))
            .with_kind(ProviderErrorKind::Cancelled)
    }

    pub fn with_kind(mut self, kind: ProviderErrorKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn for_resource(mut self, id: ResourceId) -> Self {
        self.resource_id = Some(id);
        self
    }

    pub fn with_cause(mut self, cause: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.cause = Some(Box::new(cause));
        self
    }

    /// Returns true if this error signals an already existing resource
    pub fn is_already_exists(&self) -> bool {
        matches!(self.kind, ProviderErrorKind::AlreadyExists { .. })
    }
}

pub type ProviderResult<T> = Result<T, ProviderError>;

/// Return type for async operations
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Lifecycle implementation for a single resource type
///
/// Handlers receive already validated desired state; deadlines and the stop
/// signal are applied by the provider around each call.
#[async_trait]
pub trait ResourceHandler: Send + Sync {
    /// Resource type name (e.g., "maps_account")
    fn name(&self) -> &'static str;

    /// Attribute schema for this resource type
    fn schema(&self) -> ResourceSchema;

    /// Default timeouts for this resource type
    fn timeouts(&self) -> ResourceTimeouts {
        ResourceTimeouts::default()
    }

    /// Create a resource that is not yet tracked in state
    async fn create(&self, resource: &Resource) -> ProviderResult<State>;

    /// Read the current state of a resource by its identifier
    ///
    /// Returns `State::not_found()` if the resource no longer exists.
    async fn read(&self, id: &ResourceId, identifier: &str) -> ProviderResult<State>;

    /// Update a resource already tracked in state
    async fn update(
        &self,
        id: &ResourceId,
        identifier: &str,
        from: &State,
        to: &Resource,
    ) -> ProviderResult<State>;

    /// Delete a resource
    async fn delete(&self, id: &ResourceId, identifier: &str) -> ProviderResult<()>;

    /// Check that an identifier supplied for import is well formed
    fn validate_identifier(&self, _identifier: &str) -> ProviderResult<()> {
        Ok(())
    }
}

/// Main Provider trait
///
/// Each infrastructure provider (Azure, AWS, etc.) implements this trait.
/// All operations are async and involve side effects.
pub trait Provider: Send + Sync {
    /// Name of this Provider (e.g., "azurerm")
    fn name(&self) -> &'static str;

    /// Schemas of the resource types this Provider can handle
    fn schemas(&self) -> Vec<ResourceSchema>;

    /// Get the current state of a resource
    ///
    /// Returns `State::not_found()` if the resource does not exist or
    /// no identifier is known yet.
    fn read(
        &self,
        id: &ResourceId,
        identifier: Option<&str>,
    ) -> BoxFuture<'_, ProviderResult<State>>;

    /// Create a resource
    ///
    /// Returns State with identifier set to the provider-assigned ID
    fn create(&self, resource: &Resource) -> BoxFuture<'_, ProviderResult<State>>;

    /// Update a resource
    fn update(
        &self,
        id: &ResourceId,
        identifier: &str,
        from: &State,
        to: &Resource,
    ) -> BoxFuture<'_, ProviderResult<State>>;

    /// Delete a resource
    fn delete(&self, id: &ResourceId, identifier: &str) -> BoxFuture<'_, ProviderResult<()>>;

    /// Bring an existing resource under management
    fn import(&self, id: &ResourceId, identifier: &str) -> BoxFuture<'_, ProviderResult<State>> {
        self.read(id, Some(identifier))
    }
}

/// Provider implementation for Box<dyn Provider>
/// This enables dynamic dispatch for Providers
impl Provider for Box<dyn Provider> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn schemas(&self) -> Vec<ResourceSchema> {
        (**self).schemas()
    }

    fn read(
        &self,
        id: &ResourceId,
        identifier: Option<&str>,
    ) -> BoxFuture<'_, ProviderResult<State>> {
        (**self).read(id, identifier)
    }

    fn create(&self, resource: &Resource) -> BoxFuture<'_, ProviderResult<State>> {
        (**self).create(resource)
    }

    fn update(
        &self,
        id: &ResourceId,
        identifier: &str,
        from: &State,
        to: &Resource,
    ) -> BoxFuture<'_, ProviderResult<State>> {
        (**self).update(id, identifier, from, to)
    }

    fn delete(&self, id: &ResourceId, identifier: &str) -> BoxFuture<'_, ProviderResult<()>> {
        (**self).delete(id, identifier)
    }

    fn import(&self, id: &ResourceId, identifier: &str) -> BoxFuture<'_, ProviderResult<State>> {
        (**self).import(id, identifier)
    }
}
