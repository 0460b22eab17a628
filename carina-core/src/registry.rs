//! Registry - Resource handlers composed into a provider at startup

use std::collections::HashMap;

use log::warn;

use crate::provider::{ProviderError, ProviderResult, ResourceHandler};
use crate::schema::ResourceSchema;
use crate::timeouts::ResourceTimeouts;

struct Entry {
    handler: Box<dyn ResourceHandler>,
    timeouts: ResourceTimeouts,
}

/// Lookup table from resource type name to its handler
#[derive(Default)]
pub struct ResourceRegistry {
    entries: HashMap<&'static str, Entry>,
}

impl ResourceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler using its declared timeouts
    ///
    /// A handler registered under an existing name replaces the previous one.
    pub fn register(&mut self, handler: Box<dyn ResourceHandler>) {
        let timeouts = handler.timeouts();
        let name = handler.name();
        if self.entries.insert(name, Entry { handler, timeouts }).is_some() {
            warn!("Replacing previously registered handler for {}", name);
        }
    }

    pub fn with_handler(mut self, handler: Box<dyn ResourceHandler>) -> Self {
        self.register(handler);
        self
    }

    /// Override the timeouts of a registered resource type
    ///
    /// Returns false when no handler is registered under `resource_type`.
    pub fn set_timeouts(&mut self, resource_type: &str, timeouts: ResourceTimeouts) -> bool {
        match self.entries.get_mut(resource_type) {
            Some(entry) => {
                entry.timeouts = timeouts;
                true
            }
            None => false,
        }
    }

    pub fn get(&self, resource_type: &str) -> ProviderResult<&dyn ResourceHandler> {
        self.entries
            .get(resource_type)
            .map(|e| e.handler.as_ref())
            .ok_or_else(|| ProviderError::unknown_resource_type(resource_type))
    }

    pub fn timeouts(&self, resource_type: &str) -> ResourceTimeouts {
        self.entries
            .get(resource_type)
            .map(|e| e.timeouts)
            .unwrap_or_default()
    }

    /// Registered resource type names, sorted
    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<&'static str> = self.entries.keys().copied().collect();
        names.sort_unstable();
        names
    }

    pub fn schemas(&self) -> Vec<ResourceSchema> {
        self.names()
            .into_iter()
            .filter_map(|name| self.entries.get(name))
            .map(|e| e.handler.schema())
            .collect()
    }
}
