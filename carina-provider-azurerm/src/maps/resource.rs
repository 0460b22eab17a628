//! Maps account lifecycle handler
//!
//! Creation refuses to adopt an account that already exists outside of
//! Carina's state; reads treat a missing account as drift and report it as
//! not found instead of failing.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use carina_core::provider::{ProviderError, ProviderErrorKind, ProviderResult, ResourceHandler};
use carina_core::resource::{Resource, ResourceId, State, Value};
use carina_core::schema::ResourceSchema;
use carina_core::timeouts::ResourceTimeouts;
use log::{debug, info};

use crate::maps::client::MapsAccountsClient;
use crate::maps::models::{MapsAccount, SkuName};
use crate::maps::parse::AccountId;
use crate::maps::schema::{SCHEMA_TYPE, maps_account_schema};
use crate::tags;

/// Resource type name used in `ResourceId`
pub const RESOURCE_TYPE: &str = "maps_account";

/// Maps accounts are global; ARM requires this exact location
const LOCATION: &str = "global";

pub fn maps_account_timeouts() -> ResourceTimeouts {
    ResourceTimeouts {
        create: Duration::from_secs(30 * 60),
        read: Duration::from_secs(5 * 60),
        update: Duration::from_secs(30 * 60),
        delete: Duration::from_secs(30 * 60),
    }
}

/// Desired state of a Maps account
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapsAccountConfig {
    pub name: String,
    pub resource_group_name: String,
    pub sku_name: SkuName,
    pub tags: HashMap<String, String>,
}

impl MapsAccountConfig {
    /// Build the desired state from schema-validated attributes
    pub fn from_resource(resource: &Resource) -> ProviderResult<Self> {
        let required = |key: &str| {
            resource.get_str(key).map(str::to_string).ok_or_else(|| {
                ProviderError::new(format!("Required attribute '{}' is missing", key))
                    .with_kind(ProviderErrorKind::Validation)
                    .for_resource(resource.id.clone())
            })
        };

        let name = required("name")?;
        let resource_group_name = required("resource_group_name")?;
        let sku_name = required("sku_name")?.parse::<SkuName>().map_err(|e| {
            ProviderError::new(e)
                .with_kind(ProviderErrorKind::Validation)
                .for_resource(resource.id.clone())
        })?;

        Ok(Self {
            name,
            resource_group_name,
            sku_name,
            tags: tags::expand(resource.attributes.get("tags")),
        })
    }

    /// Payload for the create-or-update call
    pub fn to_parameters(&self) -> MapsAccount {
        MapsAccount {
            location: Some(LOCATION.to_string()),
            sku: Some(self.sku_name.into()),
            tags: Some(self.tags.clone()),
            ..Default::default()
        }
    }
}

/// Lifecycle handler for `azurerm.maps_account`
pub struct MapsAccountResource {
    client: Arc<dyn MapsAccountsClient>,
}

impl MapsAccountResource {
    pub fn new(client: Arc<dyn MapsAccountsClient>) -> Self {
        Self { client }
    }

    /// Shared body of create and update
    async fn create_update(&self, resource: &Resource, is_new: bool) -> ProviderResult<State> {
        let id = &resource.id;
        info!("Preparing arguments for Maps Account creation");

        let config = MapsAccountConfig::from_resource(resource)?;
        let name = config.name.as_str();
        let resource_group = config.resource_group_name.as_str();

        if is_new {
            match self.client.get(resource_group, name).await {
                Ok(existing) => {
                    if let Some(existing_id) = existing.id.filter(|i| !i.is_empty()) {
                        return Err(ProviderError::already_exists(SCHEMA_TYPE, existing_id)
                            .for_resource(id.clone()));
                    }
                }
                Err(e) if e.is_not_found() => {}
                Err(e) => {
                    return Err(ProviderError::api(
                        format!(
                            "Failed to check for presence of existing Maps Account {:?} (Resource Group {:?})",
                            name, resource_group
                        ),
                        e,
                    )
                    .for_resource(id.clone()));
                }
            }
        }

        let parameters = config.to_parameters();
        self.client
            .create_or_update(resource_group, name, &parameters)
            .await
            .map_err(|e| {
                ProviderError::api(
                    format!(
                        "Failed to create/update Maps Account {:?} (Resource Group {:?})",
                        name, resource_group
                    ),
                    e,
                )
                .for_resource(id.clone())
            })?;

        let read = self.client.get(resource_group, name).await.map_err(|e| {
            ProviderError::api(
                format!(
                    "Failed to retrieve Maps Account {:?} (Resource Group {:?})",
                    name, resource_group
                ),
                e,
            )
            .for_resource(id.clone())
        })?;

        let identifier = read.id.filter(|i| !i.is_empty()).ok_or_else(|| {
            ProviderError::inconsistent(format!(
                "Cannot read Maps Account {:?} (Resource Group {:?}) ID",
                name, resource_group
            ))
            .for_resource(id.clone())
        })?;

        let state = self.read_account(id, &identifier).await?;
        if !state.exists {
            return Err(ProviderError::inconsistent(format!(
                "Maps Account {:?} (Resource Group {:?}) was not found after it was written",
                name, resource_group
            ))
            .for_resource(id.clone()));
        }
        Ok(state)
    }

    async fn read_account(&self, id: &ResourceId, identifier: &str) -> ProviderResult<State> {
        let account_id = parse_identifier(id, identifier)?;
        let name = account_id.name.as_str();
        let resource_group = account_id.resource_group.as_str();

        let resp = match self.client.get(resource_group, name).await {
            Ok(resp) => resp,
            Err(e) if e.is_not_found() => {
                info!(
                    "Maps Account {:?} (Resource Group {:?}) was not found - removing from state",
                    name, resource_group
                );
                return Ok(State::not_found(id.clone()));
            }
            Err(e) => {
                return Err(ProviderError::api(
                    format!(
                        "Failed to read Maps Account {:?} (Resource Group {:?})",
                        name, resource_group
                    ),
                    e,
                )
                .for_resource(id.clone()));
            }
        };

        let mut attributes = HashMap::new();
        attributes.insert("name".to_string(), Value::String(name.to_string()));
        attributes.insert(
            "resource_group_name".to_string(),
            Value::String(resource_group.to_string()),
        );
        if let Some(sku) = &resp.sku {
            attributes.insert("sku_name".to_string(), Value::String(sku.name.clone()));
        }
        let client_id = resp
            .properties
            .as_ref()
            .and_then(|p| p.unique_id.clone())
            .unwrap_or_default();
        attributes.insert("x_ms_client_id".to_string(), Value::String(client_id));

        let keys = self
            .client
            .list_keys(resource_group, name)
            .await
            .map_err(|e| {
                ProviderError::api(
                    format!(
                        "Failed to read access keys of Maps Account {:?} (Resource Group {:?})",
                        name, resource_group
                    ),
                    e,
                )
                .for_resource(id.clone())
            })?;
        attributes.insert(
            "primary_access_key".to_string(),
            Value::String(keys.primary_key.unwrap_or_default()),
        );
        attributes.insert(
            "secondary_access_key".to_string(),
            Value::String(keys.secondary_key.unwrap_or_default()),
        );

        attributes.insert("tags".to_string(), tags::flatten(resp.tags.as_ref()));

        Ok(State::existing(id.clone(), attributes).with_identifier(identifier))
    }

    async fn delete_account(&self, id: &ResourceId, identifier: &str) -> ProviderResult<()> {
        let account_id = parse_identifier(id, identifier)?;
        debug!("Deleting Maps Account {}", account_id);

        self.client
            .delete(&account_id.resource_group, &account_id.name)
            .await
            .map_err(|e| {
                ProviderError::api(
                    format!(
                        "Failed to delete Maps Account {:?} (Resource Group {:?})",
                        account_id.name, account_id.resource_group
                    ),
                    e,
                )
                .for_resource(id.clone())
            })
    }
}

fn parse_identifier(id: &ResourceId, identifier: &str) -> ProviderResult<AccountId> {
    AccountId::parse(identifier).map_err(|e| {
        ProviderError::invalid_identifier(e.to_string())
            .with_cause(e)
            .for_resource(id.clone())
    })
}

#[async_trait]
impl ResourceHandler for MapsAccountResource {
    fn name(&self) -> &'static str {
        RESOURCE_TYPE
    }

    fn schema(&self) -> ResourceSchema {
        maps_account_schema()
    }

    fn timeouts(&self) -> ResourceTimeouts {
        maps_account_timeouts()
    }

    async fn create(&self, resource: &Resource) -> ProviderResult<State> {
        self.create_update(resource, true).await
    }

    async fn read(&self, id: &ResourceId, identifier: &str) -> ProviderResult<State> {
        self.read_account(id, identifier).await
    }

    async fn update(
        &self,
        _id: &ResourceId,
        _identifier: &str,
        _from: &State,
        to: &Resource,
    ) -> ProviderResult<State> {
        self.create_update(to, false).await
    }

    async fn delete(&self, id: &ResourceId, identifier: &str) -> ProviderResult<()> {
        self.delete_account(id, identifier).await
    }

    fn validate_identifier(&self, identifier: &str) -> ProviderResult<()> {
        AccountId::parse(identifier)
            .map(|_| ())
            .map_err(|e| ProviderError::invalid_identifier(e.to_string()).with_cause(e))
    }
}
