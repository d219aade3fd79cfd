//! HTTP 路由

use std::sync::Arc;

use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{MethodRouter, get, post},
};
use metrics_exporter_prometheus::PrometheusHandle;
use otp_errors::{AppError, ValidationError};
use otp_telemetry::{HealthCheck, HealthStatus};
use serde::Serialize;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::api::response::{OtpResponse, to_response};
use crate::application::SendOtpHandler;
use crate::domain::OtpRequest;

/// 路由共享状态，启动后只读
#[derive(Clone)]
pub struct AppState {
    handler: Arc<SendOtpHandler>,
    metrics: Option<PrometheusHandle>,
}

impl AppState {
    pub fn new(handler: SendOtpHandler) -> Self {
        Self {
            handler: Arc::new(handler),
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, metrics: Option<PrometheusHandle>) -> Self {
        self.metrics = metrics;
        self
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", send_otp_route())
        .route("/api/send-otp", send_otp_route())
        .route("/health", get(health_check))
        .route("/metrics", get(render_metrics))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// 仅接受 POST，OPTIONS 为空操作，其余方法返回 405
fn send_otp_route() -> MethodRouter<AppState> {
    post(send_otp).options(preflight).fallback(method_not_allowed)
}

async fn send_otp(State(state): State<AppState>, body: Bytes) -> Response {
    let outcome = match parse_request(&body) {
        Ok(request) => state.handler.handle(&request).await,
        Err(e) => Err(AppError::from(e)),
    };

    let (status, body) = to_response(&outcome);
    (status, Json(body)).into_response()
}

/// 空请求体视为所有字段缺失
fn parse_request(body: &[u8]) -> Result<OtpRequest, ValidationError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(OtpRequest::default());
    }

    serde_json::from_slice(body).map_err(|e| ValidationError::MalformedBody(e.to_string()))
}

async fn preflight() -> StatusCode {
    StatusCode::OK
}

async fn method_not_allowed() -> Response {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(OtpResponse::failure("Method not allowed", "method_not_allowed")),
    )
        .into_response()
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub checks: Vec<HealthCheck>,
}

async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let mut health = HealthStatus::new();
    let configured = state.handler.is_configured();
    health.add_check(
        "email",
        configured,
        (!configured).then(|| "Email credentials are not configured".to_string()),
    );

    let status = if health.healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status,
        Json(HealthResponse {
            status: if health.healthy { "healthy" } else { "unhealthy" }.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            checks: health.checks,
        }),
    )
}

async fn render_metrics(State(state): State<AppState>) -> Response {
    match &state.metrics {
        Some(handle) => handle.render().into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}
