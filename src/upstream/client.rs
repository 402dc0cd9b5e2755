//! HTTP client for the noun and adjective services.
//!
//! # Responsibilities
//! - Build one request per call against the dependency's base URL
//! - Enforce the client-level per-request timeout
//! - Map status >= 400 to `DependencyError::Http`
//!
//! Retries are not done here; the circuit breaker owns them.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use url::Url;

use crate::config::{EndpointConfig, ProxyOptions, ServiceConfig};
use crate::observability::metrics;
use crate::upstream::types::{DependencyError, DependencyKind, DependencyResult};

/// Something that can produce a word for a dependency kind.
#[async_trait]
pub trait WordSource: Send + Sync {
    async fn fetch_word(&self, kind: DependencyKind) -> DependencyResult<String>;
}

/// Client performing single outbound requests to a named dependency.
#[derive(Debug, Clone)]
pub struct DependencyClient {
    http: reqwest::Client,
    noun_url: Url,
    adjective_url: Url,
    timeout_ms: u64,
}

impl DependencyClient {
    /// Create a client from the service configuration.
    pub fn new(config: &ServiceConfig) -> DependencyResult<Self> {
        let timeout_ms = config.client.timeout_ms;
        let mut builder = reqwest::Client::builder().timeout(Duration::from_millis(timeout_ms));

        builder = match &config.proxy {
            Some(options) => builder.proxy(build_proxy(options)?),
            None => builder.no_proxy(),
        };

        let http = builder
            .build()
            .map_err(|e| DependencyError::Transport(e.to_string()))?;

        Ok(Self {
            http,
            noun_url: base_url(&config.noun)?,
            adjective_url: base_url(&config.adjective)?,
            timeout_ms,
        })
    }

    /// Full URL for a dependency kind.
    pub fn url_for(&self, kind: DependencyKind) -> DependencyResult<Url> {
        let base = match kind {
            DependencyKind::Noun => &self.noun_url,
            DependencyKind::Adjective => &self.adjective_url,
        };
        base.join(kind.path())
            .map_err(|e| DependencyError::InvalidEndpoint(e.to_string()))
    }

    /// Perform one GET against the dependency and return its JSON body.
    pub async fn fetch(&self, kind: DependencyKind) -> DependencyResult<Value> {
        let url = self.url_for(kind)?;
        let result = self.send(url).await;

        match &result {
            Ok(_) => metrics::record_dependency_request(kind, "success"),
            Err(e) => {
                tracing::error!(dependency = %kind, error = %e, "REST request failed");
                metrics::record_dependency_request(kind, "error");
            }
        }
        result
    }

    async fn send(&self, url: Url) -> DependencyResult<Value> {
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| DependencyError::from_reqwest(e, self.timeout_ms))?;

        let status = response.status();
        if status.as_u16() >= 400 {
            let status_message = reason_phrase(&response);
            let body = response
                .text()
                .await
                .map_err(|e| DependencyError::from_reqwest(e, self.timeout_ms))?;
            return Err(DependencyError::Http {
                status: status.as_u16(),
                status_message,
                body,
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| DependencyError::from_reqwest(e, self.timeout_ms))?;
        serde_json::from_slice(&bytes).map_err(|e| DependencyError::Decode(e.to_string()))
    }
}

#[async_trait]
impl WordSource for DependencyClient {
    async fn fetch_word(&self, kind: DependencyKind) -> DependencyResult<String> {
        let body = self.fetch(kind).await?;
        extract_word(kind, &body)
    }
}

/// Pull the word out of a dependency response body.
pub fn extract_word(kind: DependencyKind, body: &Value) -> DependencyResult<String> {
    body.get(kind.field())
        .and_then(Value::as_str)
        .map(str::to_owned)
        .ok_or(DependencyError::MissingField {
            kind,
            field: kind.field(),
        })
}

/// Reason phrase as sent by the server, else the canonical one for the status.
fn reason_phrase(response: &reqwest::Response) -> String {
    response
        .extensions()
        .get::<hyper::ext::ReasonPhrase>()
        .and_then(|reason| std::str::from_utf8(reason.as_bytes()).ok())
        .or_else(|| response.status().canonical_reason())
        .unwrap_or_default()
        .to_string()
}

fn base_url(endpoint: &EndpointConfig) -> DependencyResult<Url> {
    Url::parse(&format!("http://{}:{}", endpoint.host, endpoint.port))
        .map_err(|e| DependencyError::InvalidEndpoint(format!("{}:{}: {}", endpoint.host, endpoint.port, e)))
}

fn build_proxy(options: &ProxyOptions) -> DependencyResult<reqwest::Proxy> {
    let proxy = reqwest::Proxy::all(format!("http://{}:{}", options.host, options.port))
        .map_err(|e| DependencyError::InvalidEndpoint(e.to_string()))?;

    Ok(match (&options.username, &options.password) {
        (Some(user), Some(pass)) => proxy.basic_auth(user, pass),
        (Some(user), None) => proxy.basic_auth(user, ""),
        _ => proxy,
    })
}
