use axum::{extract::State, http::header, response::IntoResponse};
use posbridge_order::SyncError;
use prometheus::{Encoder, IntCounterVec, Opts, Registry, TextEncoder};

use crate::state::AppState;

pub struct Metrics {
    registry: Registry,
    pos_calls: IntCounterVec,
    webhooks: IntCounterVec,
}

impl Metrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let pos_calls = IntCounterVec::new(
            Opts::new("posbridge_pos_calls_total", "Vendor POS operations by outcome"),
            &["operation", "outcome"],
        )?;
        let webhooks = IntCounterVec::new(
            Opts::new("posbridge_webhooks_total", "Inbound POS callbacks by outcome"),
            &["outcome"],
        )?;

        registry.register(Box::new(pos_calls.clone()))?;
        registry.register(Box::new(webhooks.clone()))?;

        Ok(Self { registry, pos_calls, webhooks })
    }

    pub fn observe_pos<T>(&self, operation: &str, result: &Result<T, SyncError>) {
        self.pos_calls
            .with_label_values(&[operation, outcome(result)])
            .inc();
    }

    pub fn observe_webhook<T>(&self, result: &Result<T, SyncError>) {
        self.webhooks.with_label_values(&[outcome(result)]).inc();
    }

    pub fn render(&self) -> Result<String, prometheus::Error> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }
}

fn outcome<T>(result: &Result<T, SyncError>) -> &'static str {
    match result {
        Ok(_) => "success",
        Err(SyncError::Pos(e)) if e.is_transport() => "transport_error",
        Err(SyncError::Pos(_)) => "vendor_error",
        Err(SyncError::Signature(_)) => "unauthenticated",
        Err(SyncError::Repository(_)) => "internal_error",
        Err(_) => "rejected",
    }
}

/// GET /metrics
pub async fn render(State(state): State<AppState>) -> impl IntoResponse {
    match state.metrics.render() {
        Ok(body) => (
            axum::http::StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            body,
        ),
        Err(e) => {
            tracing::error!("Failed to encode metrics: {}", e);
            (
                axum::http::StatusCode::INTERNAL_SERVER_ERROR,
                [(header::CONTENT_TYPE, "text/plain")],
                String::new(),
            )
        }
    }
}
