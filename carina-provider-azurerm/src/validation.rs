//! Validation of Azure-wide attribute formats

use std::sync::LazyLock;

use carina_core::resource::Value;
use carina_core::schema::{AttributeSchema, AttributeType};
use regex::Regex;

/// Letters and digits are ASCII only
static RESOURCE_GROUP_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[-A-Za-z0-9_.()]+$").expect("valid resource group regex"));

/// Validate a resource group name
///
/// 1-90 characters of ASCII letters, digits, `-`, `_`, `.`, `(` and `)`, not ending in `.`.
pub fn validate_resource_group_name(name: &str) -> Result<(), String> {
    let len = name.chars().count();
    if len == 0 || len > 90 {
        return Err(format!(
            "resource group name {:?} must be between 1 and 90 characters",
            name
        ));
    }
    if !RESOURCE_GROUP_NAME.is_match(name) {
        return Err(format!(
            "resource group name {:?} may only contain alphanumeric characters, dash, \
             underscores, parentheses and periods",
            name
        ));
    }
    if name.ends_with('.') {
        return Err(format!(
            "resource group name {:?} cannot end with a period",
            name
        ));
    }
    Ok(())
}

/// Resource group name type
pub fn resource_group_name_type() -> AttributeType {
    AttributeType::Custom {
        name: "ResourceGroupName".to_string(),
        base: Box::new(AttributeType::String),
        validate: |value| match value {
            Value::String(s) => validate_resource_group_name(s),
            _ => Err("Expected string".to_string()),
        },
    }
}

/// Required, force-new `resource_group_name` attribute
pub fn resource_group_name_attribute() -> AttributeSchema {
    AttributeSchema::new("resource_group_name", resource_group_name_type())
        .required()
        .force_new()
        .with_description("The name of the resource group in which to create the resource")
}
