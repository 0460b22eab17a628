//! Maps accounts API client

use std::sync::Arc;

use async_trait::async_trait;

use crate::client::ArmClient;
use crate::error::AzureResult;
use crate::maps::models::{MapsAccount, MapsAccountKeys};
use crate::maps::parse::AccountId;

pub const API_VERSION: &str = "2021-02-01";

/// Operations of the `Microsoft.Maps/accounts` API used by the resource
#[async_trait]
pub trait MapsAccountsClient: Send + Sync {
    /// Fetch an account; a missing account is an error with status 404
    async fn get(&self, resource_group: &str, name: &str) -> AzureResult<MapsAccount>;

    async fn create_or_update(
        &self,
        resource_group: &str,
        name: &str,
        parameters: &MapsAccount,
    ) -> AzureResult<MapsAccount>;

    async fn delete(&self, resource_group: &str, name: &str) -> AzureResult<()>;

    async fn list_keys(&self, resource_group: &str, name: &str) -> AzureResult<MapsAccountKeys>;
}

/// [`MapsAccountsClient`] backed by Azure Resource Manager
pub struct ArmMapsAccountsClient {
    arm: Arc<ArmClient>,
}

impl ArmMapsAccountsClient {
    pub fn new(arm: Arc<ArmClient>) -> Self {
        Self { arm }
    }

    fn account_url(&self, resource_group: &str, name: &str, action: Option<&str>) -> String {
        let id = AccountId::new(self.arm.subscription_id(), resource_group, name);
        let path = match action {
            Some(action) => format!("{}/{}", id, action),
            None => id.to_string(),
        };
        self.arm.url(&path, API_VERSION)
    }
}

#[async_trait]
impl MapsAccountsClient for ArmMapsAccountsClient {
    async fn get(&self, resource_group: &str, name: &str) -> AzureResult<MapsAccount> {
        let url = self.account_url(resource_group, name, None);
        self.arm.get(&url).await
    }

    async fn create_or_update(
        &self,
        resource_group: &str,
        name: &str,
        parameters: &MapsAccount,
    ) -> AzureResult<MapsAccount> {
        let url = self.account_url(resource_group, name, None);
        self.arm.put(&url, parameters).await
    }

    async fn delete(&self, resource_group: &str, name: &str) -> AzureResult<()> {
        let url = self.account_url(resource_group, name, None);
        self.arm.delete(&url).await
    }

    async fn list_keys(&self, resource_group: &str, name: &str) -> AzureResult<MapsAccountKeys> {
        let url = self.account_url(resource_group, name, Some("listKeys"));
        self.arm.post(&url).await
    }
}
