//! Operational HTTP endpoints.
//!
//! - `/metrics` : Prometheus text format, collected on every request

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use prometheus::{Encoder, TextEncoder};

use cmd_exporter_core::error::{ExporterError, Result};

use crate::app_state::AppState;

/// Runs every configured command before responding. Command failures are
/// reported in the gauges; only internal failures produce a 500.
pub async fn metrics(State(state): State<AppState>) -> Response {
    match render(state).await {
        Ok((content_type, body)) => {
            (StatusCode::OK, [(header::CONTENT_TYPE, content_type)], body).into_response()
        }
        Err(e) => {
            tracing::error!(code = e.code().as_str(), error = %e, "scrape failed");
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}

/// Gather on a blocking thread: child processes block until they exit.
pub async fn render(state: AppState) -> Result<(String, Vec<u8>)> {
    let families = tokio::task::spawn_blocking(move || state.registry().gather())
        .await
        .map_err(|e| ExporterError::Internal(format!("collect task failed: {e}")))?;

    let encoder = TextEncoder::new();
    let mut body = Vec::new();
    encoder
        .encode(&families, &mut body)
        .map_err(|e| ExporterError::Metrics(format!("encode failed: {e}")))?;
    Ok((encoder.format_type().to_string(), body))
}
