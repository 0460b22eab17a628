//! Tag helpers shared by Azure resources
//!
//! Carina tags are a `Value::Map` of strings; ARM tags are a JSON object of
//! strings.

use std::collections::HashMap;

use carina_core::resource::Value;
use carina_core::schema::{AttributeSchema, AttributeType};

const MAX_TAGS: usize = 50;
const MAX_KEY_LENGTH: usize = 512;
const MAX_VALUE_LENGTH: usize = 256;

/// Tag map type with Azure's count and length limits
pub fn tags_type() -> AttributeType {
    AttributeType::Custom {
        name: "Tags".to_string(),
        base: Box::new(AttributeType::Map(Box::new(AttributeType::String))),
        validate: |value| match value {
            Value::Map(map) => validate_tags(map),
            _ => Err("Expected map".to_string()),
        },
    }
}

/// Optional `tags` attribute
pub fn tags_attribute() -> AttributeSchema {
    AttributeSchema::new("tags", tags_type())
        .with_description("A mapping of tags to assign to the resource")
        .with_provider_name("tags")
}

fn validate_tags(map: &HashMap<String, Value>) -> Result<(), String> {
    if map.len() > MAX_TAGS {
        return Err(format!(
            "a maximum of {} tags can be applied to each resource, got {}",
            MAX_TAGS,
            map.len()
        ));
    }

    let mut keys: Vec<&String> = map.keys().collect();
    keys.sort();
    for key in keys {
        if key.chars().count() > MAX_KEY_LENGTH {
            return Err(format!(
                "the maximum length for a tag key is {} characters: {:?}",
                MAX_KEY_LENGTH, key
            ));
        }
        if let Some(Value::String(v)) = map.get(key)
            && v.chars().count() > MAX_VALUE_LENGTH
        {
            return Err(format!(
                "the maximum length for a tag value is {} characters: {:?}",
                MAX_VALUE_LENGTH, key
            ));
        }
    }
    Ok(())
}

/// Convert DSL tags into the ARM representation
pub fn expand(tags: Option<&Value>) -> HashMap<String, String> {
    let mut expanded = HashMap::new();
    if let Some(Value::Map(map)) = tags {
        for (key, value) in map {
            if let Value::String(v) = value {
                expanded.insert(key.clone(), v.clone());
            }
        }
    }
    expanded
}

/// Convert ARM tags into a DSL map; missing tags become an empty map
pub fn flatten(tags: Option<&HashMap<String, String>>) -> Value {
    let map = tags
        .map(|tags| {
            tags.iter()
                .map(|(k, v)| (k.clone(), Value::String(v.clone())))
                .collect()
        })
        .unwrap_or_default();
    Value::Map(map)
}
