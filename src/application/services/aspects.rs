//! Aspect resolution
//!
//! Normalizes an aspect record's type, endpoints and geometry into a
//! canonical [`Aspect`]. Aspects touching the true lunar node are discarded
//! outright; unmatched types survive with their raw label but no orb.

use serde_json::Value;
use tracing::debug;

use crate::domain::{Aspect, AspectKind, AspectType, Language, PointId};

use super::geometry;
use super::normalize::fold_key;
use super::registry::PointRegistry;

/// Raw type fields tried on an aspect record.
const TYPE_FIELDS: [&str; 3] = ["type", "aspect", "kind"];

/// Explicit separation fields, tried before deriving from longitudes.
const SEPARATION_FIELDS: [&str; 6] = ["separation", "sep", "sep_deg", "angle", "angle_deg", "aspect_angle"];

/// Upstream-provided orb fields, used verbatim when no separation exists.
const ORB_FIELDS: [&str; 7] = ["orbit", "diff", "difference", "delta", "error", "deg_diff", "exactness"];

/// Endpoint identifier fields, covering index-, prefix- and role-based
/// naming across upstream versions.
const ENDPOINT_A_FIELDS: [&str; 6] = ["p1_name", "point_1", "point1", "p1", "object1", "planet1"];
const ENDPOINT_B_FIELDS: [&str; 6] = ["p2_name", "point_2", "point2", "p2", "object2", "planet2"];

/// Per-endpoint flat longitude fields embedded in the aspect record.
const LON_A_FIELDS: [&str; 6] = ["p1_abs_pos", "p1_abs_long", "p1_abs_longitude", "p1_longitude", "p1_lon", "p1_long"];
const LON_B_FIELDS: [&str; 6] = ["p2_abs_pos", "p2_abs_long", "p2_abs_longitude", "p2_longitude", "p2_lon", "p2_long"];

/// Nested sub-objects that may carry an endpoint's longitude.
const NESTED_A_FIELDS: [&str; 5] = ["p1", "first", "from", "object1", "point1"];
const NESTED_B_FIELDS: [&str; 5] = ["p2", "second", "to", "object2", "point2"];

#[derive(Debug, Clone)]
pub struct AspectResolver {
    lang: Language,
}

impl AspectResolver {
    pub fn new(lang: Language) -> Self {
        Self { lang }
    }

    /// Resolve a raw aspect record. Returns `None` when the aspect must be
    /// discarded: no endpoints at all, or the true node on either side.
    pub fn resolve(&self, raw: &Value, registry: &PointRegistry) -> Option<Aspect> {
        let point_a = endpoint(raw, &ENDPOINT_A_FIELDS, registry)?;
        let point_b = endpoint(raw, &ENDPOINT_B_FIELDS, registry)?;
        if point_a == PointId::TrueNode || point_b == PointId::TrueNode {
            debug!("discarding true-node aspect {point_a:?} / {point_b:?}");
            return None;
        }

        let kind = TYPE_FIELDS
            .iter()
            .filter_map(|f| raw.get(*f))
            .filter_map(Value::as_str)
            .map(normalize_type)
            .next()
            .unwrap_or_else(|| AspectType::Other(String::new()));

        let separation = explicit_separation(raw).or_else(|| {
            let la = endpoint_longitude(raw, &LON_A_FIELDS, &NESTED_A_FIELDS)?;
            let lb = endpoint_longitude(raw, &LON_B_FIELDS, &NESTED_B_FIELDS)?;
            Some(circular_separation(la, lb))
        });

        let orb = match (separation, kind.exact_angle()) {
            (Some(sep), Some(exact)) => Some((sep - exact).abs()),
            // no derivable separation: fall back to an upstream orb field
            _ => separation
                .is_none()
                .then(|| ORB_FIELDS.iter().filter_map(|f| raw.get(*f)).find_map(geometry::parse_angle))
                .flatten(),
        };

        let label_a = point_a.label(self.lang);
        let label_b = point_b.label(self.lang);
        Some(Aspect {
            kind,
            point_a,
            point_b,
            label_a,
            label_b,
            separation,
            orb,
        })
    }
}

/// Circular separation between two longitudes: `min(|Δ|, 360 − |Δ|)`,
/// guaranteed in `[0,180]`.
pub fn circular_separation(a: f64, b: f64) -> f64 {
    ((a - b + 540.0).rem_euclid(360.0) - 180.0).abs()
}

/// Normalize a raw aspect type to one of the 17 canonical kinds, or carry
/// the folded raw text through for display.
pub fn normalize_type(raw: &str) -> AspectType {
    let key = fold_key(raw);
    let canonical = match key.as_str() {
        "conjuncion" | "conj" => "conjunction",
        "oposicion" | "opp" => "opposition",
        "cuadratura" | "sq" => "square",
        "trigono" | "tri" => "trine",
        "sextil" | "sex" => "sextile",
        "quincuncio" | "inconjunct" | "inconjuncto" => "quincunx",
        "semisextil" => "semisextile",
        "semicuadratura" | "semi_square" => "semisquare",
        "sesquicuadratura" | "sesqui_square" => "sesquiquadrate",
        "quintil" => "quintile",
        "biquintil" => "biquintile",
        "novil" => "novile",
        "binovil" => "binovile",
        "septil" => "septile",
        "biseptil" => "biseptile",
        "triseptil" => "triseptile",
        "undecil" => "undecile",
        other => other,
    };
    AspectKind::ALL
        .iter()
        .find(|k| k.key() == canonical)
        .map(|k| AspectType::Known(*k))
        .unwrap_or(AspectType::Other(key))
}

fn endpoint(raw: &Value, fields: &[&str], registry: &PointRegistry) -> Option<PointId> {
    fields
        .iter()
        .filter_map(|f| raw.get(*f))
        .find_map(|v| registry.resolve(v))
}

fn endpoint_longitude(raw: &Value, flat: &[&str], nested: &[&str]) -> Option<f64> {
    let direct = flat.iter().filter_map(|f| raw.get(*f)).find_map(geometry::parse_angle);
    direct.or_else(|| {
        nested
            .iter()
            .filter_map(|f| raw.get(*f))
            .find_map(geometry::longitude_of)
    })
}

fn explicit_separation(raw: &Value) -> Option<f64> {
    SEPARATION_FIELDS
        .iter()
        .filter_map(|f| raw.get(*f))
        .find_map(geometry::parse_angle)
        .map(f64::abs)
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use serde_json::json;

    use super::*;

    fn resolver() -> AspectResolver {
        AspectResolver::new(Language::En)
    }

    #[rstest]
    #[case("square", AspectKind::Square)]
    #[case("Cuadratura", AspectKind::Square)]
    #[case("Trígono", AspectKind::Trine)]
    #[case("OPOSICIÓN", AspectKind::Opposition)]
    #[case("inconjunct", AspectKind::Quincunx)]
    #[case("semi-square", AspectKind::Semisquare)]
    #[case("sesquiquadrate", AspectKind::Sesquiquadrate)]
    #[case("undécil", AspectKind::Undecile)]
    fn types_normalize_to_canonical_kinds(#[case] raw: &str, #[case] expected: AspectKind) {
        assert_eq!(normalize_type(raw), AspectType::Known(expected));
    }

    #[rstest]
    fn unmatched_type_passes_through_without_angle() {
        let t = normalize_type("Grand Mystery");
        assert_eq!(t, AspectType::Other("grand_mystery".into()));
        assert_eq!(t.exact_angle(), None);
        assert_eq!(t.label(Language::En), "Grand mystery");
    }

    #[rstest]
    fn spec_square_scenario_resolves() {
        let raw = json!({
            "type": "square",
            "p1_name": "Sun",
            "p2_name": "Moon",
            "p1_abs_pos": 10.0,
            "p2_abs_pos": 101.5,
        });
        let aspect = resolver().resolve(&raw, &PointRegistry::new()).unwrap();
        assert_eq!(aspect.kind, AspectType::Known(AspectKind::Square));
        assert!((aspect.separation.unwrap() - 91.5).abs() < 1e-9);
        assert!((aspect.orb.unwrap() - 1.5).abs() < 1e-9);
    }

    #[rstest]
    fn explicit_separation_wins_over_longitudes() {
        let raw = json!({
            "type": "trine",
            "point_1": "Venus",
            "point_2": "Mars",
            "separation": -118.0,
            "p1_abs_pos": 0.0,
            "p2_abs_pos": 90.0,
        });
        let aspect = resolver().resolve(&raw, &PointRegistry::new()).unwrap();
        assert_eq!(aspect.separation, Some(118.0));
        assert!((aspect.orb.unwrap() - 2.0).abs() < 1e-9);
    }

    #[rstest]
    fn upstream_orb_used_when_separation_unavailable() {
        let raw = json!({
            "type": "sextile",
            "p1": "Mercury",
            "p2": "Jupiter",
            "orbit": 3.25,
        });
        let aspect = resolver().resolve(&raw, &PointRegistry::new()).unwrap();
        assert_eq!(aspect.separation, None);
        assert_eq!(aspect.orb, Some(3.25));
    }

    #[rstest]
    fn nested_endpoint_objects_supply_longitudes() {
        let raw = json!({
            "type": "opposition",
            "object1": {"name": "Sun", "longitude": 10.0},
            "object2": {"name": "Saturn", "longitude": 189.0},
        });
        let aspect = resolver().resolve(&raw, &PointRegistry::new()).unwrap();
        assert!((aspect.separation.unwrap() - 179.0).abs() < 1e-9);
        assert!((aspect.orb.unwrap() - 1.0).abs() < 1e-9);
    }

    #[rstest]
    fn true_node_aspects_are_discarded() {
        let raw = json!({
            "type": "conjunction",
            "p1_name": "True_Node",
            "p2_name": "Sun",
            "p1_abs_pos": 100.0,
            "p2_abs_pos": 101.0,
        });
        assert!(resolver().resolve(&raw, &PointRegistry::new()).is_none());
    }

    #[rstest]
    fn orb_is_symmetric_in_endpoints() {
        let forward = json!({
            "type": "square", "p1_name": "Sun", "p2_name": "Moon",
            "p1_abs_pos": 350.0, "p2_abs_pos": 82.0,
        });
        let backward = json!({
            "type": "square", "p1_name": "Moon", "p2_name": "Sun",
            "p1_abs_pos": 82.0, "p2_abs_pos": 350.0,
        });
        let reg = PointRegistry::new();
        let a = resolver().resolve(&forward, &reg).unwrap();
        let b = resolver().resolve(&backward, &reg).unwrap();
        assert_eq!(a.orb, b.orb);
        assert_eq!(a.separation, b.separation);
    }

    #[rstest]
    #[case(0.0, 0.0, 0.0)]
    #[case(10.0, 101.5, 91.5)]
    #[case(350.0, 10.0, 20.0)]
    #[case(0.0, 180.0, 180.0)]
    fn circular_separation_stays_in_range(#[case] a: f64, #[case] b: f64, #[case] expected: f64) {
        let got = circular_separation(a, b);
        assert!((got - expected).abs() < 1e-9);
        assert!((0.0..=180.0).contains(&got));
    }
}
