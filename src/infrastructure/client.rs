//! HTTP implementation of the chart service boundary

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use serde_json::Value;
use tracing::{debug, instrument};

use super::traits::{ChartService, UpstreamResponse, UpstreamResult};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// How much of an error body to keep for diagnostics.
const BODY_SNIPPET_LEN: usize = 300;

pub struct HttpChartService {
    client: reqwest::Client,
    base_url: String,
}

impl HttpChartService {
    pub fn new(base_url: &str) -> UpstreamResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

#[async_trait]
impl ChartService for HttpChartService {
    #[instrument(skip(self, payload))]
    async fn post(&self, path: &str, payload: &Value) -> UpstreamResult<UpstreamResponse> {
        let url = self.url(path);
        let response = self.client.post(&url).json(payload).send().await?;
        let status = response.status();
        let json_typed = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|ct| ct.contains("json"))
            .unwrap_or(false);
        let body = response.text().await?;
        debug!("{url} answered {status} ({} bytes)", body.len());

        if !status.is_success() {
            return Err(super::traits::UpstreamError::Status {
                status: status.as_u16(),
                body: snippet(&body),
            });
        }
        if json_typed || body.trim_start().starts_with(['{', '[']) {
            if let Ok(v) = serde_json::from_str::<Value>(&body) {
                return Ok(UpstreamResponse::Json(v));
            }
        }
        Ok(UpstreamResponse::Text(body))
    }
}

fn snippet(body: &str) -> String {
    let trimmed = body.trim();
    match trimmed.char_indices().nth(BODY_SNIPPET_LEN) {
        Some((i, _)) => format!("{}…", &trimmed[..i]),
        None => trimmed.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_joining_normalizes_slashes() {
        let svc = HttpChartService::new("http://localhost:8000/api/v4/").unwrap();
        assert_eq!(svc.url("/birth-chart"), "http://localhost:8000/api/v4/birth-chart");
        assert_eq!(svc.url("houses"), "http://localhost:8000/api/v4/houses");
    }

    #[test]
    fn snippet_truncates_long_bodies() {
        let long = "x".repeat(1000);
        let s = snippet(&long);
        assert!(s.chars().count() <= BODY_SNIPPET_LEN + 1);
        assert!(s.ends_with('…'));
        assert_eq!(snippet("short"), "short");
    }
}
