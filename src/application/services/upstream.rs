//! Resilient upstream requests
//!
//! Older deployments of the chart service reject payloads carrying points
//! or fields they predate. Each request is therefore retried through an
//! ordered ladder of progressively reduced payload variants, every variant
//! built on a fresh clone so reductions never compound or leak into the
//! caller's payload.

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, warn};

use crate::infrastructure::traits::{ChartService, UpstreamError, UpstreamResponse, UpstreamResult};

/// Points dropped by the first reduction step: the newest addition to the
/// canonical set, unknown to most older deployments.
const FIRST_DROP: [&str; 1] = ["Mean_South_Node"];

/// Points dropped by the second reduction step. Independent of the first:
/// a deployment that knows the south node but not these still gets it.
const SECOND_DROP: [&str; 2] = ["Chiron", "Mean_Lilith"];

#[derive(Clone)]
pub struct ResilientClient {
    service: Arc<dyn ChartService>,
}

impl ResilientClient {
    pub fn new(service: Arc<dyn ChartService>) -> Self {
        Self { service }
    }

    /// POST through the variant ladder. Returns the first acceptable
    /// response; a non-retryable failure or ladder exhaustion yields the
    /// last error observed.
    pub async fn post(&self, path: &str, payload: &Value) -> UpstreamResult<UpstreamResponse> {
        let variants = payload_variants(payload);
        let total = variants.len();
        let mut last_err = None;
        for (i, variant) in variants.into_iter().enumerate() {
            if i > 0 {
                debug!("retrying {path} with payload variant {}/{total}", i + 1);
            }
            match self.service.post(path, &variant).await {
                Ok(response) => match semantic_error(&response) {
                    None => return Ok(response),
                    Some(body) => {
                        warn!("{path} answered with an error body, trying next variant");
                        last_err = Some(UpstreamError::ErrorBody { body });
                    }
                },
                Err(e) if e.is_retryable() => {
                    warn!("{path} failed ({e}), trying next variant");
                    last_err = Some(e);
                }
                Err(e) => return Err(e),
            }
        }
        Err(last_err.unwrap_or(UpstreamError::ErrorBody {
            body: "no payload variant produced".into(),
        }))
    }
}

/// The ordered reduction ladder: full payload first, then progressively
/// fewer requested points, then without the optional subject fields newer
/// deployments introduced. Every variant is an independent clone of the
/// original payload.
pub fn payload_variants(payload: &Value) -> Vec<Value> {
    let mut variants = vec![payload.clone()];
    if let Some(v) = drop_points(payload, &FIRST_DROP) {
        variants.push(v);
    }
    if let Some(v) = drop_points(payload, &SECOND_DROP) {
        variants.push(v);
    }
    if payload.get("active_points").is_some() {
        let mut v = payload.clone();
        if let Some(m) = v.as_object_mut() {
            m.remove("active_points");
        }
        variants.push(v);
    }
    if let Some(v) = drop_subject_field(payload, "house_system") {
        variants.push(v);
    }
    if let Some(v) = drop_subject_field(payload, "geonames_username") {
        variants.push(v);
    }
    variants
}

/// Clone the payload with the named points removed from `active_points`.
/// `None` when the payload carries no such list or nothing would change.
fn drop_points(payload: &Value, names: &[&str]) -> Option<Value> {
    let points = payload.get("active_points")?.as_array()?;
    let kept: Vec<Value> = points
        .iter()
        .filter(|p| p.as_str().map(|s| !names.contains(&s)).unwrap_or(true))
        .cloned()
        .collect();
    if kept.len() == points.len() {
        return None;
    }
    let mut variant = payload.clone();
    variant["active_points"] = Value::Array(kept);
    Some(variant)
}

/// Clone the payload with one optional field removed from `subject`.
fn drop_subject_field(payload: &Value, field: &str) -> Option<Value> {
    payload.get("subject")?.get(field)?;
    let mut variant = payload.clone();
    if let Some(subject) = variant.get_mut("subject").and_then(Value::as_object_mut) {
        subject.remove(field);
    }
    Some(variant)
}

/// Detect an error reported inside an HTTP-200 body: a `status` of
/// `KO`/`ERROR`, or an explicit `error` field.
fn semantic_error(response: &UpstreamResponse) -> Option<String> {
    let v = response.as_json()?;
    let status_err = v
        .get("status")
        .and_then(Value::as_str)
        .map(|s| s.eq_ignore_ascii_case("KO") || s.eq_ignore_ascii_case("ERROR"))
        .unwrap_or(false);
    if status_err || v.get("error").map(|e| !e.is_null()).unwrap_or(false) {
        return Some(v.to_string());
    }
    None
}
