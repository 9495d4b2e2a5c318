//! Axum router and listener for the inquiry relay.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::Router;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json};
use axum::routing::{get, post};
use metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusHandle;
use serde_json::{Value, json};
use tokio::task::JoinHandle;
use tower_http::cors::CorsLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use crate::config::ServerConfig;
use crate::error::{ApiError, EMAIL_REQUIRED};
use crate::health::{self, HealthResponse};
use crate::inquiry::{InquiryRequest, InquiryRouting, compose};
use crate::mail::MailTransport;
use crate::metrics::{INQUIRIES_TOTAL, INQUIRY_SEND_DURATION_SECONDS};
use crate::shutdown::{DrainOutcome, ShutdownCoordinator};

/// Shared state accessible from Axum handlers.
#[derive(Clone)]
pub struct AppState {
    /// Delivers inquiry mails.
    pub mailer: Arc<dyn MailTransport>,
    /// Sender and recipient of inquiry mails.
    pub routing: Arc<InquiryRouting>,
    /// When the server started.
    pub start_time: Instant,
    /// Prometheus handle for `/metrics`; absent when no recorder is installed.
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    /// State without a metrics recorder.
    pub fn new(mailer: Arc<dyn MailTransport>, routing: InquiryRouting) -> Self {
        Self {
            mailer,
            routing: Arc::new(routing),
            start_time: Instant::now(),
            metrics: None,
        }
    }

    /// Serve `/metrics` from `handle`.
    #[must_use]
    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }
}

/// Build the router: API routes, then the static site for everything else.
pub fn build_router(state: AppState, config: &ServerConfig) -> Router {
    Router::new()
        .route("/api/inquiry", post(inquiry_handler))
        .route("/health", get(health_handler))
        .route("/metrics", get(metrics_handler))
        .fallback_service(ServeDir::new(&config.site_root))
        .with_state(state)
        .layer(RequestBodyLimitLayer::new(config.max_body_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// Bind and serve in a background task.
pub async fn start(config: ServerConfig, state: AppState) -> Result<ServerHandle, std::io::Error> {
    let router = build_router(state, &config);
    let listener = tokio::net::TcpListener::bind((config.host.as_str(), config.port)).await?;
    let local_addr = listener.local_addr()?;

    info!(
        addr = %local_addr,
        site_root = %config.site_root.display(),
        "inquiry relay listening"
    );

    let shutdown = Arc::new(ShutdownCoordinator::default());
    let token = shutdown.token();
    let server = tokio::spawn(async move {
        let result = axum::serve(listener, router)
            .with_graceful_shutdown(async move { token.cancelled().await })
            .await;
        if let Err(e) = result {
            error!(error = %e, "relay server stopped with error");
        }
    });

    Ok(ServerHandle {
        local_addr,
        shutdown,
        server,
    })
}

/// Handle returned by [`start`].
pub struct ServerHandle {
    local_addr: SocketAddr,
    shutdown: Arc<ShutdownCoordinator>,
    server: JoinHandle<()>,
}

impl ServerHandle {
    /// Address actually bound.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Port actually bound.
    pub fn port(&self) -> u16 {
        self.local_addr.port()
    }

    /// The shutdown coordinator.
    pub fn shutdown(&self) -> &Arc<ShutdownCoordinator> {
        &self.shutdown
    }

    /// Stop accepting connections and wait for in-flight requests.
    pub async fn stop(self) -> DrainOutcome {
        let outcome = self.shutdown.drain(self.server).await;
        info!(?outcome, "inquiry relay stopped");
        outcome
    }
}

/// POST /api/inquiry
async fn inquiry_handler(State(state): State<AppState>, body: Bytes) -> Result<Json<Value>, ApiError> {
    let request = InquiryRequest::from_body(&body);
    if !request.has_email() {
        counter!(INQUIRIES_TOTAL, "outcome" => "rejected").increment(1);
        warn!("inquiry rejected: email missing");
        return Err(ApiError::Validation(EMAIL_REQUIRED));
    }

    let mail = compose(&request, &state.routing);
    let started = Instant::now();
    let result = state.mailer.send(&mail).await;
    histogram!(INQUIRY_SEND_DURATION_SECONDS).record(started.elapsed().as_secs_f64());

    match result {
        Ok(()) => {
            counter!(INQUIRIES_TOTAL, "outcome" => "sent").increment(1);
            info!(to = %mail.to, subject = %mail.subject, "inquiry forwarded");
            Ok(Json(json!({ "ok": true })))
        }
        Err(e) => {
            counter!(INQUIRIES_TOTAL, "outcome" => "failed").increment(1);
            error!(error = %e, "inquiry send error");
            Err(ApiError::Delivery(e))
        }
    }
}

/// GET /health
async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(health::health_check(state.start_time, &state.routing))
}

/// GET /metrics
async fn metrics_handler(State(state): State<AppState>) -> impl IntoResponse {
    match &state.metrics {
        Some(handle) => (StatusCode::OK, crate::metrics::render(handle)),
        None => (StatusCode::NOT_FOUND, String::new()),
    }
}
