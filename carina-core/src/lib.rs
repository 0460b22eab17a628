//! Carina Core
//!
//! Provider contract shared by Carina providers: the resource model,
//! attribute schemas, lifecycle traits, handler registry and operation timeouts.

pub mod provider;
pub mod registry;
pub mod resource;
pub mod schema;
pub mod timeouts;
