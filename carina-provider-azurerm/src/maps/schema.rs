//! Maps account schema definition

use carina_core::schema::{AttributeSchema, AttributeType, ResourceSchema};

use crate::maps::models::SkuName;
use crate::maps::validate;
use crate::tags::tags_attribute;
use crate::validation::resource_group_name_attribute;

/// Fully qualified schema type, as written in the DSL
pub const SCHEMA_TYPE: &str = "azurerm.maps_account";

/// Allowed SKU tiers
pub fn sku_name_type() -> AttributeType {
    AttributeType::Enum {
        name: SkuName::TYPE_NAME.to_string(),
        variants: SkuName::ALL.iter().map(|s| s.to_string()).collect(),
        namespace: Some(SCHEMA_TYPE.to_string()),
    }
}

/// Returns the schema for Maps accounts
pub fn maps_account_schema() -> ResourceSchema {
    ResourceSchema::new(SCHEMA_TYPE)
        .with_description("An Azure Maps account")
        .attribute(
            AttributeSchema::new("name", validate::account_name())
                .required()
                .force_new()
                .with_description("The name of the Maps account")
                .with_provider_name("name"),
        )
        .attribute(resource_group_name_attribute())
        .attribute(
            AttributeSchema::new("sku_name", sku_name_type())
                .required()
                .force_new()
                .with_description("The SKU of the Maps account: S0, S1 or G2")
                .with_provider_name("sku.name"),
        )
        .attribute(tags_attribute())
        .attribute(
            AttributeSchema::new("x_ms_client_id", AttributeType::String)
                .computed()
                .with_description("Unique identifier sent as the x-ms-client-id header")
                .with_provider_name("properties.uniqueId"),
        )
        .attribute(
            AttributeSchema::new("primary_access_key", AttributeType::String)
                .computed()
                .sensitive()
                .with_description("The primary key used to authenticate against the Maps REST APIs")
                .with_provider_name("primaryKey"),
        )
        .attribute(
            AttributeSchema::new("secondary_access_key", AttributeType::String)
                .computed()
                .sensitive()
                .with_description("The secondary key used to authenticate against the Maps REST APIs")
                .with_provider_name("secondaryKey"),
        )
}
