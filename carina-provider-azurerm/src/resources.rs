//! Resource handlers supported by the Azure provider

use std::sync::Arc;

use carina_core::registry::ResourceRegistry;

use crate::client::ArmClient;
use crate::maps::{ArmMapsAccountsClient, MapsAccountResource};

/// Build the registry of all resource types backed by the given ARM client
pub fn resource_registry(arm: Arc<ArmClient>) -> ResourceRegistry {
    ResourceRegistry::new().with_handler(Box::new(MapsAccountResource::new(Arc::new(
        ArmMapsAccountsClient::new(arm),
    ))))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AzureConfig, Credentials};

    #[test]
    fn registers_maps_account() {
        let config = AzureConfig::new("sub-1", Credentials::AccessToken("t".to_string()));
        let registry = resource_registry(Arc::new(ArmClient::new(config).unwrap()));
        assert_eq!(registry.names(), vec!["maps_account"]);
        assert_eq!(registry.schemas()[0].resource_type, "azurerm.maps_account");
    }
}
