//! Azure Maps (`Microsoft.Maps`) resources

pub mod client;
pub mod models;
pub mod parse;
pub mod resource;
pub mod schema;
pub mod validate;

pub use client::{ArmMapsAccountsClient, MapsAccountsClient};
pub use parse::AccountId;
pub use resource::{MapsAccountConfig, MapsAccountResource};
