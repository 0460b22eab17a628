//! Azure Maps account wire types (API version 2021-02-01)

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use carina_core::schema::resolve_enum_value;
use serde::{Deserialize, Serialize};

use crate::maps::schema::SCHEMA_TYPE;

/// Pricing tier of a Maps account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SkuName {
    S0,
    S1,
    G2,
}

impl SkuName {
    pub const ALL: [SkuName; 3] = [SkuName::S0, SkuName::S1, SkuName::G2];

    /// Type name used by the DSL enum form (`SkuName.S0`)
    pub const TYPE_NAME: &'static str = "SkuName";

    pub fn as_str(&self) -> &'static str {
        match self {
            SkuName::S0 => "S0",
            SkuName::S1 => "S1",
            SkuName::G2 => "G2",
        }
    }
}

impl fmt::Display for SkuName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SkuName {
    type Err = String;

    /// Accepts "S0", "SkuName.S0" and "azurerm.maps_account.SkuName.S0"
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = resolve_enum_value(s, Self::TYPE_NAME, Some(SCHEMA_TYPE));
        SkuName::ALL
            .into_iter()
            .find(|sku| sku.as_str() == raw)
            .ok_or_else(|| format!("unknown sku {:?}, expected one of: S0, S1, G2", s))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sku {
    /// Kept as a string so tiers added later still deserialize
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tier: Option<String>,
}

impl From<SkuName> for Sku {
    fn from(name: SkuName) -> Self {
        Self {
            name: name.as_str().to_string(),
            tier: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapsAccountProperties {
    /// Unique identifier sent as the `x-ms-client-id` header
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unique_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disable_local_auth: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provisioning_state: Option<String>,
}

/// A Maps account as returned by, and submitted to, ARM
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapsAccount {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub resource_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sku: Option<Sku>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<HashMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<MapsAccountProperties>,
}

/// Response of the `listKeys` action
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapsAccountKeys {
    #[serde(default)]
    pub primary_key: Option<String>,
    #[serde(default)]
    pub secondary_key: Option<String>,
    #[serde(default)]
    pub primary_key_last_updated: Option<String>,
    #[serde(default)]
    pub secondary_key_last_updated: Option<String>,
}
