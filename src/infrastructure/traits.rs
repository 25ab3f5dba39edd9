//! Upstream I/O boundary traits
//!
//! The chart service is abstracted behind a trait so the request
//! orchestrator and the chart pipeline can be tested with scripted
//! implementations instead of a live network.

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

/// A raw upstream reply: JSON for data endpoints, text for endpoints that
/// return bare SVG markup.
#[derive(Debug, Clone)]
pub enum UpstreamResponse {
    Json(Value),
    Text(String),
}

impl UpstreamResponse {
    pub fn as_json(&self) -> Option<&Value> {
        match self {
            UpstreamResponse::Json(v) => Some(v),
            UpstreamResponse::Text(_) => None,
        }
    }

    /// Extract embedded SVG markup: either the raw text body, or the
    /// `svg`/`chart` field of a JSON envelope.
    pub fn into_svg(self) -> Option<String> {
        match self {
            UpstreamResponse::Text(t) => {
                let trimmed = t.trim();
                if trimmed.starts_with('{') {
                    if let Ok(v) = serde_json::from_str::<Value>(trimmed) {
                        return envelope_svg(&v);
                    }
                }
                t.contains("<svg").then_some(t)
            }
            UpstreamResponse::Json(v) => envelope_svg(&v),
        }
    }
}

fn envelope_svg(v: &Value) -> Option<String> {
    v.get("svg")
        .or_else(|| v.get("chart"))
        .and_then(Value::as_str)
        .map(str::to_string)
}

/// Failure talking to the upstream chart service.
#[derive(Error, Debug)]
pub enum UpstreamError {
    #[error("transport failure: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("upstream returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("upstream reported an error response: {body}")]
    ErrorBody { body: String },
}

impl UpstreamError {
    /// Whether the next payload variant should be attempted.
    ///
    /// Server errors (500), validation rejections (422), transport drops
    /// and semantically failed bodies are worth retrying with a reduced
    /// payload; client/auth errors are not.
    pub fn is_retryable(&self) -> bool {
        match self {
            UpstreamError::Transport(_) => true,
            UpstreamError::Status { status, .. } => matches!(status, 500 | 422),
            UpstreamError::ErrorBody { .. } => true,
        }
    }
}

pub type UpstreamResult<T> = Result<T, UpstreamError>;

/// Upstream chart-calculation service boundary.
#[async_trait]
pub trait ChartService: Send + Sync {
    /// POST a JSON payload to an endpoint path (e.g. `/natal-aspects-data`).
    async fn post(&self, path: &str, payload: &Value) -> UpstreamResult<UpstreamResponse>;
}
