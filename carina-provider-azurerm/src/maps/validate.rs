//! Maps account attribute validation

use std::sync::LazyLock;

use carina_core::resource::Value;
use carina_core::schema::AttributeType;
use regex::Regex;

static ACCOUNT_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9][A-Za-z0-9._-]+$").expect("valid account name regex"));

/// Validate a Maps account name
pub fn validate_account_name(name: &str) -> Result<(), String> {
    if ACCOUNT_NAME.is_match(name) {
        Ok(())
    } else {
        Err(format!(
            "account name {:?}: the first character must be a letter or number, followed by \
             at least one letter, number, underscore, hyphen or period",
            name
        ))
    }
}

/// Maps account name type
pub fn account_name() -> AttributeType {
    AttributeType::Custom {
        name: "MapsAccountName".to_string(),
        base: Box::new(AttributeType::String),
        validate: |value| match value {
            Value::String(s) => validate_account_name(s),
            _ => Err("Expected string".to_string()),
        },
    }
}
