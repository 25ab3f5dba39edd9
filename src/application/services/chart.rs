//! Chart generation pipeline
//!
//! Orchestrates the upstream calls for one chart: the wheel rendering and
//! the aspect data are required and abort the generation on failure; the
//! auxiliary position and house lookups only enrich the report and their
//! failures are swallowed. All resolution state (registry, longitudes,
//! cusp ring) is scoped to the single request.

use std::collections::HashMap;

use serde_json::{json, Value};
use tracing::{debug, instrument, warn};

use crate::domain::{CuspRing, Language, PointId, Subject};

use super::super::error::{ApplicationError, ApplicationResult};
use super::houses::DEFAULT_CUSP_EPSILON;
use super::registry::PointRegistry;
use super::report::{ChartReport, ReportAssembler};
use super::upstream::ResilientClient;

/// Required endpoints.
const WHEEL_ENDPOINT: &str = "/birth-chart";
const ASPECTS_ENDPOINT: &str = "/natal-aspects-data";

/// Auxiliary endpoints, tried in order until one answers. Deployments
/// differ in which of these they expose.
const POSITION_ENDPOINTS: [&str; 5] =
    ["/natal-positions", "/positions", "/natal-points", "/points", "/chart-data"];
const HOUSE_ENDPOINTS: [&str; 6] = [
    "/natal-houses",
    "/houses",
    "/natal-chart-data",
    "/natal-positions",
    "/chart-data",
    "/natal-aspects-data",
];

/// Everything one generation produces.
#[derive(Debug, Clone)]
pub struct GeneratedChart {
    pub report: ChartReport,
    pub wheel_svg: String,
}

/// Rendering and calculation options forwarded upstream.
#[derive(Debug, Clone)]
pub struct ChartOptions {
    pub language: Language,
    pub theme: String,
    pub cusp_epsilon: f64,
}

impl Default for ChartOptions {
    fn default() -> Self {
        Self {
            language: Language::default(),
            theme: "light".into(),
            cusp_epsilon: DEFAULT_CUSP_EPSILON,
        }
    }
}

pub struct ChartGenerator {
    client: ResilientClient,
    assembler: ReportAssembler,
    options: ChartOptions,
}

impl ChartGenerator {
    pub fn new(client: ResilientClient, options: ChartOptions) -> Self {
        let assembler = ReportAssembler::new(options.language, options.cusp_epsilon);
        Self {
            client,
            assembler,
            options,
        }
    }

    /// Generate a complete chart for one subject.
    #[instrument(skip(self, subject), fields(name = %subject.name))]
    pub async fn generate(&self, subject: &Subject) -> ApplicationResult<GeneratedChart> {
        let mut registry = PointRegistry::new();
        let mut longitudes: HashMap<PointId, f64> = HashMap::new();
        let mut ring: Option<CuspRing> = None;

        // Wheel first: without it there is nothing to show.
        let wheel = self
            .client
            .post(WHEEL_ENDPOINT, &self.wheel_payload(subject)?)
            .await
            .map_err(|e| ApplicationError::upstream("rendering the chart wheel", e))?;
        if let Some(v) = wheel.as_json().cloned() {
            self.harvest(&v, &mut registry, &mut longitudes, &mut ring);
        }
        let wheel_svg = wheel.into_svg().ok_or_else(|| ApplicationError::MissingData {
            what: "SVG markup in the wheel response".into(),
        })?;

        let aspects_response = self
            .client
            .post(ASPECTS_ENDPOINT, &self.data_payload(subject)?)
            .await
            .map_err(|e| ApplicationError::upstream("fetching aspect data", e))?;
        let aspect_records: Vec<Value> = aspects_response
            .as_json()
            .map(|v| ReportAssembler::aspect_records(v).to_vec())
            .unwrap_or_default();
        if let Some(v) = aspects_response.as_json() {
            self.harvest(v, &mut registry, &mut longitudes, &mut ring);
        }

        self.fetch_positions(subject, &mut registry, &mut longitudes, &mut ring)
            .await;
        if ring.is_none() || !longitudes.contains_key(&PointId::Ascendant) {
            self.fetch_houses(subject, &mut registry, &mut longitudes, &mut ring)
                .await;
        }
        self.assembler
            .backfill_from_aspects(&aspect_records, &registry, &mut longitudes);

        let aspects = self.assembler.resolve_aspects(&aspect_records, &registry);
        let report = self.assembler.assemble(&longitudes, ring, aspects);
        Ok(GeneratedChart { report, wheel_svg })
    }

    /// Pull longitudes and a cusp ring out of any JSON response seen.
    fn harvest(
        &self,
        response: &Value,
        registry: &mut PointRegistry,
        longitudes: &mut HashMap<PointId, f64>,
        ring: &mut Option<CuspRing>,
    ) {
        self.assembler.collect_longitudes(response, registry, longitudes);
        if ring.is_none() {
            *ring = self
                .assembler
                .house_resolver()
                .extract_cusps_from_response(response);
            if ring.is_some() {
                debug!("extracted a cusp ring");
            }
        }
    }

    async fn fetch_positions(
        &self,
        subject: &Subject,
        registry: &mut PointRegistry,
        longitudes: &mut HashMap<PointId, f64>,
        ring: &mut Option<CuspRing>,
    ) {
        let Ok(mut payload) = self.data_payload(subject) else {
            return;
        };
        let classics: Vec<&str> = PointId::CLASSIC_PLANETS
            .iter()
            .map(PointId::canonical_name)
            .collect();
        payload["active_points"] = json!(classics);
        for endpoint in POSITION_ENDPOINTS {
            match self.client.post(endpoint, &payload).await {
                Ok(resp) => {
                    if let Some(v) = resp.as_json() {
                        self.harvest(v, registry, longitudes, ring);
                    }
                    return;
                }
                Err(e) => warn!("position lookup via {endpoint} failed: {e}"),
            }
        }
    }

    /// Dedicated house/angle lookup, requesting only the two chart angles.
    async fn fetch_houses(
        &self,
        subject: &Subject,
        registry: &mut PointRegistry,
        longitudes: &mut HashMap<PointId, f64>,
        ring: &mut Option<CuspRing>,
    ) {
        let Ok(mut payload) = self.data_payload(subject) else {
            return;
        };
        payload["active_points"] = json!(["Ascendant", "Medium_Coeli"]);
        for endpoint in HOUSE_ENDPOINTS {
            match self.client.post(endpoint, &payload).await {
                Ok(resp) => {
                    if let Some(v) = resp.as_json() {
                        self.harvest(v, registry, longitudes, ring);
                    }
                    return;
                }
                Err(e) => warn!("house lookup via {endpoint} failed: {e}"),
            }
        }
    }

    fn wheel_payload(&self, subject: &Subject) -> ApplicationResult<Value> {
        let mut payload = self.data_payload(subject)?;
        // different upstream versions read the theme under different keys
        payload["theme"] = json!(self.options.theme);
        payload["style"] = json!(self.options.theme);
        payload["chart_theme"] = json!(self.options.theme);
        Ok(payload)
    }

    fn data_payload(&self, subject: &Subject) -> ApplicationResult<Value> {
        let subject = serde_json::to_value(subject).map_err(|e| ApplicationError::InvalidSubject {
            message: e.to_string(),
        })?;
        let active: Vec<&str> = PointId::CANONICAL_ORDER
            .iter()
            .map(PointId::canonical_name)
            .collect();
        Ok(json!({
            "subject": subject,
            "language": self.options.language.code(),
            "active_points": active,
        }))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use serde_json::json;

    use crate::infrastructure::traits::{
        ChartService, UpstreamError, UpstreamResponse, UpstreamResult,
    };

    use super::*;

    /// Routes each endpoint to a fixed reply and records the paths called.
    struct RoutedService {
        routes: Vec<(&'static str, UpstreamResult<UpstreamResponse>)>,
        calls: Mutex<Vec<String>>,
    }

    impl RoutedService {
        fn new(routes: Vec<(&'static str, UpstreamResult<UpstreamResponse>)>) -> Self {
            Self {
                routes,
                calls: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl ChartService for RoutedService {
        async fn post(&self, path: &str, _payload: &Value) -> UpstreamResult<UpstreamResponse> {
            self.calls.lock().unwrap().push(path.to_string());
            for (route, reply) in &self.routes {
                if *route == path {
                    return match reply {
                        Ok(r) => Ok(r.clone()),
                        Err(_) => Err(UpstreamError::Status {
                            status: 503,
                            body: "scripted failure".into(),
                        }),
                    };
                }
            }
            Err(UpstreamError::Status {
                status: 404,
                body: "no route".into(),
            })
        }
    }

    fn subject() -> Subject {
        Subject {
            name: "Test".into(),
            year: 1990,
            month: 6,
            day: 15,
            hour: 12,
            minute: 30,
            city: "Madrid".into(),
            nation: Some("ES".into()),
            zodiac_type: "Tropic".into(),
            house_system: Some("P".into()),
            geonames_username: None,
        }
    }

    fn generator(service: RoutedService) -> ChartGenerator {
        let options = ChartOptions {
            language: Language::En,
            ..ChartOptions::default()
        };
        ChartGenerator::new(ResilientClient::new(Arc::new(service)), options)
    }

    fn wheel_ok() -> (&'static str, UpstreamResult<UpstreamResponse>) {
        (
            WHEEL_ENDPOINT,
            Ok(UpstreamResponse::Text("<svg>wheel</svg>".into())),
        )
    }

    #[tokio::test]
    async fn full_pipeline_produces_svg_and_tables() {
        let cusps: Vec<f64> = (0..12).map(|i| i as f64 * 30.0).collect();
        let service = RoutedService::new(vec![
            wheel_ok(),
            (
                ASPECTS_ENDPOINT,
                Ok(UpstreamResponse::Json(json!({"aspects": [{
                    "type": "square",
                    "p1_name": "Sun", "p1_abs_pos": 10.0,
                    "p2_name": "Moon", "p2_abs_pos": 101.5,
                }]}))),
            ),
            (
                "/natal-positions",
                Ok(UpstreamResponse::Json(json!({
                    "points": [
                        {"name": "Sun", "longitude": 10.0},
                        {"name": "Ascendant", "longitude": 2.0},
                    ],
                    "house_cusps": cusps,
                }))),
            ),
        ]);
        let chart = generator(service).generate(&subject()).await.unwrap();
        assert!(chart.wheel_svg.contains("<svg"));
        assert_eq!(chart.report.cusps.len(), 12);
        assert_eq!(chart.report.points[0].house, Some(1));
        assert_eq!(chart.report.aspects.len(), 1);
        // Moon longitude came from the aspect record backfill
        assert_eq!(chart.report.points[1].longitude(), Some(101.5));
    }

    #[tokio::test]
    async fn wheel_failure_aborts_generation() {
        let service = RoutedService::new(vec![(
            WHEEL_ENDPOINT,
            Err(UpstreamError::ErrorBody { body: String::new() }),
        )]);
        let err = generator(service).generate(&subject()).await.unwrap_err();
        assert!(matches!(err, ApplicationError::Upstream { .. }));
    }

    #[tokio::test]
    async fn aspect_failure_aborts_generation() {
        let service = RoutedService::new(vec![wheel_ok()]);
        let err = generator(service).generate(&subject()).await.unwrap_err();
        assert!(matches!(err, ApplicationError::Upstream { .. }));
    }

    #[tokio::test]
    async fn auxiliary_failures_are_swallowed() {
        let service = RoutedService::new(vec![
            wheel_ok(),
            (
                ASPECTS_ENDPOINT,
                Ok(UpstreamResponse::Json(json!({"aspects": []}))),
            ),
        ]);
        let chart = generator(service).generate(&subject()).await.unwrap();
        // no positions, no houses: the report still exists, just unplaced
        assert!(chart.report.points.iter().all(|p| p.longitude().is_none()));
        assert!(chart.report.cusps.is_empty());
    }

    #[tokio::test]
    async fn wheel_without_svg_is_missing_data() {
        let service = RoutedService::new(vec![(
            WHEEL_ENDPOINT,
            Ok(UpstreamResponse::Json(json!({"status": "OK"}))),
        )]);
        let err = generator(service).generate(&subject()).await.unwrap_err();
        assert!(matches!(err, ApplicationError::MissingData { .. }));
    }
}
