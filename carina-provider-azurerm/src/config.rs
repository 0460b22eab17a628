//! Provider configuration
//!
//! Settings can be given explicitly or read from the `ARM_*` environment
//! variables used by other Azure tooling.

use std::fmt;
use std::time::Duration;

use crate::error::{AzureError, AzureResult};

pub const DEFAULT_RESOURCE_MANAGER_ENDPOINT: &str = "https://management.azure.com";
pub const DEFAULT_AUTHORITY_HOST: &str = "https://login.microsoftonline.com";
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// How the provider authenticates against Azure Resource Manager
#[derive(Clone, PartialEq, Eq)]
pub enum Credentials {
    /// Service principal with a client secret (OAuth2 client-credentials grant)
    ClientSecret {
        tenant_id: String,
        client_id: String,
        client_secret: String,
    },
    /// Pre-acquired bearer token
    AccessToken(String),
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Credentials::ClientSecret {
                tenant_id,
                client_id,
                ..
            } => f
                .debug_struct("ClientSecret")
                .field("tenant_id", tenant_id)
                .field("client_id", client_id)
                .field("client_secret", &"<redacted>")
                .finish(),
            Credentials::AccessToken(_) => f.write_str("AccessToken(<redacted>)"),
        }
    }
}

/// Azure provider configuration
#[derive(Debug, Clone)]
pub struct AzureConfig {
    pub subscription_id: String,
    pub credentials: Credentials,
    pub resource_manager_endpoint: String,
    pub authority_host: String,
    pub request_timeout: Duration,
    pub max_retries: u32,
}

impl AzureConfig {
    pub fn new(subscription_id: impl Into<String>, credentials: Credentials) -> Self {
        Self {
            subscription_id: subscription_id.into(),
            credentials,
            resource_manager_endpoint: DEFAULT_RESOURCE_MANAGER_ENDPOINT.to_string(),
            authority_host: DEFAULT_AUTHORITY_HOST.to_string(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            max_retries: DEFAULT_MAX_RETRIES,
        }
    }

    /// Create AzureConfig from environment variables
    pub fn from_env() -> AzureResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Create AzureConfig from an arbitrary variable source
    ///
    /// `ARM_ACCESS_TOKEN` takes precedence over the client secret triple.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> AzureResult<Self> {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let require = |key: &str| {
            var(key).ok_or_else(|| AzureError::Config(format!("{} must be set", key)))
        };

        let subscription_id = require("ARM_SUBSCRIPTION_ID")?;
        let credentials = match var("ARM_ACCESS_TOKEN") {
            Some(token) => Credentials::AccessToken(token),
            None => Credentials::ClientSecret {
                tenant_id: require("ARM_TENANT_ID")?,
                client_id: require("ARM_CLIENT_ID")?,
                client_secret: require("ARM_CLIENT_SECRET")?,
            },
        };

        let mut config = Self::new(subscription_id, credentials);
        if let Some(endpoint) = var("ARM_RESOURCE_MANAGER_ENDPOINT") {
            config = config.with_resource_manager_endpoint(endpoint);
        }
        if let Some(host) = var("ARM_AUTHORITY_HOST") {
            config = config.with_authority_host(host);
        }
        Ok(config)
    }

    pub fn with_resource_manager_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.resource_manager_endpoint = endpoint.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_authority_host(mut self, host: impl Into<String>) -> Self {
        self.authority_host = host.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }
}
