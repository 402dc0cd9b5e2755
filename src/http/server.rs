//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum router with the insult and health handlers
//! - Wire up middleware (request ID, tracing, request timeout)
//! - Serve on a bound listener until shutdown is signalled
//! - Close the publish connection once in-flight requests drain

use std::time::Duration;

use axum::{
    body::Body,
    extract::State,
    http::{HeaderMap, Request, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use tokio::net::TcpListener;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::ServiceConfig;
use crate::http::request::{RequestIdExt, RequestIdLayer};
use crate::lifecycle::ShutdownListener;
use crate::service::InsultService;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub service: InsultService,
}

/// HTTP front end of the insult service.
pub struct HttpServer {
    router: Router,
    config: ServiceConfig,
    service: InsultService,
}

impl HttpServer {
    pub fn new(config: ServiceConfig, service: InsultService) -> Self {
        let state = AppState {
            service: service.clone(),
        };
        let router = Self::build_router(&config, state);
        Self {
            router,
            config,
            service,
        }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &ServiceConfig, state: AppState) -> Router {
        Router::new()
            .route("/api/v1/insult", get(get_insult).post(post_insult))
            .route("/health", get(health))
            .with_state(state)
            .layer(TimeoutLayer::new(Duration::from_secs(config.listener.request_timeout_secs)))
            .layer(TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                tracing::info_span!(
                    "request",
                    method = %request.method(),
                    path = %request.uri().path(),
                    request_id = %request.headers().request_id(),
                )
            }))
            .layer(RequestIdLayer)
    }

    /// Serve until `shutdown` fires, then drain and close the publish sink.
    pub async fn run(self, listener: TcpListener, mut shutdown: ShutdownListener) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        self.service.shutdown();
        tracing::info!("HTTP server stopped");
        Ok(())
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }
}

async fn get_insult(State(state): State<AppState>) -> Response {
    match state.service.get_composite().await {
        Ok(composite) => Json(composite).into_response(),
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response(),
    }
}

/// Compose, answer the caller, and publish in the background.
async fn post_insult(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let composite = match state.service.get_composite().await {
        Ok(composite) => composite,
        Err(e) => return (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response(),
    };

    let handle = state.service.publish(composite.clone());
    let request_id = headers.request_id().to_string();
    tokio::spawn(async move {
        match handle.outcome().await {
            Ok(()) => tracing::info!(request_id = %request_id, "Composite published"),
            Err(e) => tracing::warn!(request_id = %request_id, error = %e, "Composite not published"),
        }
    });

    Json(composite).into_response()
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.service.check())
}
