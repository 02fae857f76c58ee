//! Typed client for the Sale Tracker backend.
//!
//! Every operation maps one-to-one onto a backend route and goes through
//! the request bridge, which attaches the cached identity without ever
//! triggering a fresh resolution. Transport and HTTP failures are
//! normalized into [`ApiError`]; nothing is retried.

#![deny(missing_docs)]

mod bridge;
mod error;
mod models;

use std::sync::Arc;

use config::Config;
use http::HeaderMap;
use identity::IdentityContext;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use url::Url;

pub use bridge::{AuthHeaderPayload, IDENTITY_HEADER, apply_identity};
pub use error::ApiError;
pub use models::{
    DashboardData, DashboardStats, Health, Platform, RecentSale, SaleCreate, SaleItem, SaleUpdate, UserInfo,
};

/// Result alias for API operations.
pub type Result<T> = std::result::Result<T, ApiError>;

/// Client for the Sale Tracker backend.
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
    identity: Arc<IdentityContext>,
}

impl ApiClient {
    /// Build a client over the configured base address, sharing the given
    /// identity context with the rest of the application.
    pub fn new(config: &Config, identity: Arc<IdentityContext>) -> anyhow::Result<Self> {
        let mut builder = reqwest::Client::builder();

        if let Some(timeout) = config.api.timeout {
            builder = builder.timeout(timeout);
        }

        let http = builder
            .build()
            .map_err(|e| anyhow::anyhow!("failed to build HTTP client: {e}"))?;

        Ok(Self {
            http,
            base_url: config.api.base_url.clone(),
            identity,
        })
    }

    /// All sales of the authenticated user.
    pub async fn sales(&self) -> Result<Vec<SaleItem>> {
        let builder = self.http.get(self.endpoint("/api/sales/")?);
        Self::require(self.execute(builder).await?)
    }

    /// Record a new sale.
    pub async fn create_sale(&self, sale: &SaleCreate) -> Result<SaleItem> {
        let builder = self.http.post(self.endpoint("/api/sales/")?).json(sale);
        Self::require(self.execute(builder).await?)
    }

    /// A single sale by identifier.
    pub async fn sale(&self, id: &str) -> Result<SaleItem> {
        let builder = self.http.get(self.endpoint(&format!("/api/sales/{id}"))?);
        Self::require(self.execute(builder).await?)
    }

    /// Update an existing sale.
    pub async fn update_sale(&self, id: &str, update: &SaleUpdate) -> Result<SaleItem> {
        let builder = self.http.put(self.endpoint(&format!("/api/sales/{id}"))?).json(update);
        Self::require(self.execute(builder).await?)
    }

    /// Delete a sale. Success carries no body.
    pub async fn delete_sale(&self, id: &str) -> Result<()> {
        let builder = self.http.delete(self.endpoint(&format!("/api/sales/{id}"))?);
        self.execute::<serde_json::Value>(builder).await.map(|_| ())
    }

    /// Aggregate dashboard statistics.
    pub async fn dashboard_stats(&self) -> Result<DashboardStats> {
        let builder = self.http.get(self.endpoint("/api/dashboard/stats")?);
        Self::require(self.execute(builder).await?)
    }

    /// The most recent sales. The backend defaults to five and caps the
    /// limit at twenty; the value is passed through verbatim.
    pub async fn recent_sales(&self, limit: Option<u32>) -> Result<Vec<RecentSale>> {
        let mut builder = self.http.get(self.endpoint("/api/dashboard/recent")?);

        if let Some(limit) = limit {
            builder = builder.query(&[("limit", limit)]);
        }

        Self::require(self.execute(builder).await?)
    }

    /// The combined dashboard payload: statistics plus recent sales.
    pub async fn dashboard(&self) -> Result<DashboardData> {
        let builder = self.http.get(self.endpoint("/api/dashboard/")?);
        Self::require(self.execute(builder).await?)
    }

    /// Current-user information as the backend sees it.
    pub async fn current_user(&self) -> Result<UserInfo> {
        let builder = self.http.get(self.endpoint("/api/user")?);
        Self::require(self.execute(builder).await?)
    }

    /// Backend liveness. Not identity-gated.
    pub async fn health(&self) -> Result<Health> {
        let builder = self.http.get(self.endpoint("/health")?);
        Self::require(self.execute(builder).await?)
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .map_err(|e| ApiError::Transport(format!("invalid request address '{path}': {e}")))
    }

    /// Issue one request through the bridge and normalize the outcome.
    ///
    /// `Ok(None)` is a success without content; typed operations decide
    /// whether that satisfies their contract.
    async fn execute<T: DeserializeOwned>(&self, builder: reqwest::RequestBuilder) -> Result<Option<T>> {
        let mut headers = HeaderMap::new();
        apply_identity(&mut headers, self.identity.current().as_ref());

        let response = builder
            .headers(headers)
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();

            return Err(ApiError::Http {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or("unknown status").to_string(),
                body,
            });
        }

        if status == StatusCode::NO_CONTENT {
            return Ok(None);
        }

        let text = response
            .text()
            .await
            .map_err(|e| ApiError::Transport(format!("failed to read response body: {e}")))?;

        match serde_json::from_str(&text) {
            Ok(value) => Ok(Some(value)),
            Err(e) => {
                log::debug!("malformed response body: {e}");
                Err(ApiError::Malformed(e.to_string()))
            }
        }
    }

    fn require<T>(response: Option<T>) -> Result<T> {
        response.ok_or_else(|| ApiError::Malformed("server returned no content".to_string()))
    }
}
