//! Message broker transports for published composites.

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use url::Url;

use crate::aggregate::CompositeResult;
use crate::config::PublishConfig;

/// Errors reported by a publish attempt.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PublishError {
    /// The broker could not be reached or failed mid-request.
    #[error("broker error: {0}")]
    Broker(String),

    /// The broker answered with a non-success status.
    #[error("broker rejected publish with {status}: {body}")]
    Rejected { status: u16, body: String },

    /// The publish task ended without reporting.
    #[error("publish task dropped before completing")]
    Dropped,

    /// The sink was closed during shutdown.
    #[error("publish sink is closed")]
    Closed,
}

/// Transport that delivers one composite to the messaging endpoint.
#[async_trait]
pub trait MessageBroker: Send + Sync {
    async fn send(&self, composite: &CompositeResult) -> Result<(), PublishError>;
}

/// Broker that POSTs the composite JSON to an HTTP endpoint.
#[derive(Debug, Clone)]
pub struct HttpBroker {
    http: reqwest::Client,
    endpoint: Url,
}

impl HttpBroker {
    pub fn new(config: &PublishConfig) -> Result<Self, PublishError> {
        let endpoint = Url::parse(&config.endpoint)
            .map_err(|e| PublishError::Broker(format!("invalid endpoint '{}': {}", config.endpoint, e)))?;
        let http = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .no_proxy()
            .build()
            .map_err(|e| PublishError::Broker(e.to_string()))?;

        Ok(Self { http, endpoint })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl MessageBroker for HttpBroker {
    async fn send(&self, composite: &CompositeResult) -> Result<(), PublishError> {
        let response = self
            .http
            .post(self.endpoint.clone())
            .json(composite)
            .send()
            .await
            .map_err(|e| PublishError::Broker(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let body = response.text().await.unwrap_or_default();
        Err(PublishError::Rejected {
            status: status.as_u16(),
            body,
        })
    }
}
