//! HTTP client for the Azure Resource Manager API
//!
//! Handles bearer-token injection and caching, retries of throttled and
//! transient failures with exponential backoff, and ARM error extraction.

use std::time::Duration;

use chrono::Utc;
use log::{debug, warn};
use reqwest::header::RETRY_AFTER;
use reqwest::{Method, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::sync::Mutex;

use crate::auth::{AccessToken, acquire_token, scope_for};
use crate::config::AzureConfig;
use crate::error::{AzureError, AzureResult, should_retry};

/// Base delay between retries (doubled each attempt)
const BASE_DELAY_MS: u64 = 500;
/// Upper bound for the computed backoff
const MAX_BACKOFF_MS: u64 = 60_000;
/// Upper bound for a server supplied Retry-After
const MAX_RETRY_AFTER_SECS: u64 = 60;

/// Authenticated ARM client shared by all resource handlers
pub struct ArmClient {
    http: reqwest::Client,
    config: AzureConfig,
    token: Mutex<Option<AccessToken>>,
}

impl ArmClient {
    pub fn new(config: AzureConfig) -> AzureResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;
        Ok(Self {
            http,
            config,
            token: Mutex::new(None),
        })
    }

    pub fn subscription_id(&self) -> &str {
        &self.config.subscription_id
    }

    /// Full URL for a resource path, e.g. `/subscriptions/.../accounts/x`
    pub fn url(&self, path: &str, api_version: &str) -> String {
        format!(
            "{}{}?api-version={}",
            self.config.resource_manager_endpoint, path, api_version
        )
    }

    pub async fn get<T: DeserializeOwned>(&self, url: &str) -> AzureResult<T> {
        let response = self.send(Method::GET, url, None).await?;
        Ok(response.json::<T>().await?)
    }

    pub async fn put<B: Serialize, T: DeserializeOwned>(&self, url: &str, body: &B) -> AzureResult<T> {
        let body = serde_json::to_value(body)?;
        let response = self.send(Method::PUT, url, Some(&body)).await?;
        Ok(response.json::<T>().await?)
    }

    pub async fn post<T: DeserializeOwned>(&self, url: &str) -> AzureResult<T> {
        let response = self.send(Method::POST, url, None).await?;
        Ok(response.json::<T>().await?)
    }

    /// DELETE a resource; both 200 and 204 count as success
    pub async fn delete(&self, url: &str) -> AzureResult<()> {
        self.send(Method::DELETE, url, None).await?;
        Ok(())
    }

    async fn bearer_token(&self) -> AzureResult<String> {
        let mut cached = self.token.lock().await;
        if let Some(token) = cached.as_ref()
            && !token.is_expiring(Utc::now())
        {
            return Ok(token.token.clone());
        }

        let scope = scope_for(&self.config.resource_manager_endpoint);
        let token = acquire_token(
            &self.http,
            &self.config.credentials,
            &self.config.authority_host,
            &scope,
        )
        .await?;
        let value = token.token.clone();
        *cached = Some(token);
        Ok(value)
    }

    async fn send(
        &self,
        method: Method,
        url: &str,
        body: Option<&serde_json::Value>,
    ) -> AzureResult<reqwest::Response> {
        let max_retries = self.config.max_retries;
        let mut attempt = 0;

        loop {
            let token = self.bearer_token().await?;
            debug!("Azure {} {}", method, url);

            let mut request = self.http.request(method.clone(), url).bearer_auth(&token);
            request = match body {
                Some(body) => request.json(body),
                // ARM rejects POST actions such as listKeys without a Content-Length
                None if method == Method::POST => request.body(""),
                None => request,
            };

            let result = request.send().await;
            let (error, retry_after) = match result {
                Ok(response) if response.status().is_success() => return Ok(response),
                Ok(response) => {
                    let status = response.status();
                    let retry_after = retry_after_delay(&response);
                    if status == StatusCode::UNAUTHORIZED {
                        self.token.lock().await.take();
                    }
                    let text = response.text().await.unwrap_or_default();
                    (AzureError::from_response(status.as_u16(), &text), retry_after)
                }
                Err(e) => (AzureError::Http(e), None),
            };

            if attempt >= max_retries || !error.is_retryable() {
                return Err(error);
            }

            let delay = retry_after.unwrap_or_else(|| backoff_delay(attempt));
            warn!(
                "Azure {} {} failed ({}), retrying in {}ms",
                method,
                url,
                error,
                delay.as_millis()
            );
            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }
}

fn backoff_delay(attempt: u32) -> Duration {
    let delay = 2u64
        .checked_pow(attempt)
        .and_then(|factor| factor.checked_mul(BASE_DELAY_MS))
        .unwrap_or(MAX_BACKOFF_MS);
    Duration::from_millis(delay.min(MAX_BACKOFF_MS))
}

fn retry_after_delay(response: &reqwest::Response) -> Option<Duration> {
    if !should_retry(response.status().as_u16()) {
        return None;
    }
    response
        .headers()
        .get(RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok())
        .map(|secs| Duration::from_secs(secs.min(MAX_RETRY_AFTER_SECS)))
}
