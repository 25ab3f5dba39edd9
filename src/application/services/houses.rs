//! House resolution
//!
//! Extracts a 12-cusp ring from variably shaped payloads, realigns it to a
//! known Ascendant, and assigns longitudes to houses — by cusp arcs when a
//! valid ring exists, by whole-sign otherwise, and never by guessing.

use serde_json::Value;
use tracing::debug;

use crate::domain::{sign_index, wrap360, CuspRing};

use super::geometry;

/// Default cusp-boundary tie-break width: one arc-minute. An empirical
/// choice, hence configurable rather than baked in.
pub const DEFAULT_CUSP_EPSILON: f64 = 1.0 / 60.0;

/// Containers probed for a houses payload inside a full response.
const CONTAINER_FIELDS: [&str; 4] = ["house_cusps", "houses", "cusps", "houses_cusps"];

#[derive(Debug, Clone)]
pub struct HouseResolver {
    /// Absolute-degree tolerance at cusp boundaries.
    pub epsilon: f64,
}

impl Default for HouseResolver {
    fn default() -> Self {
        Self {
            epsilon: DEFAULT_CUSP_EPSILON,
        }
    }
}

impl HouseResolver {
    pub fn new(epsilon: f64) -> Self {
        Self { epsilon }
    }

    /// Search a full chart-data response for a valid cusp ring: the known
    /// container fields at top level, under `data`, under `chart`, and
    /// finally the response root itself.
    pub fn extract_cusps_from_response(&self, response: &Value) -> Option<CuspRing> {
        let scopes = [Some(response), response.get("data"), response.get("chart")];
        for scope in scopes.into_iter().flatten() {
            for field in CONTAINER_FIELDS {
                if let Some(ring) = scope.get(field).and_then(|c| self.extract_cusps(c)) {
                    return Some(ring);
                }
            }
        }
        self.extract_cusps(response)
    }

    /// Extract 12 cusp longitudes from one houses container. Three shapes
    /// are accepted: an ordered sequence, a keyed mapping, or a sequence of
    /// self-numbered records. All-or-nothing: a partial set is invalid and
    /// the caller must fall back to whole-sign assignment.
    pub fn extract_cusps(&self, container: &Value) -> Option<CuspRing> {
        let longitudes = match container {
            // self-numbered records may arrive out of order, so they take
            // precedence over positional reading
            Value::Array(items) => self_numbered_cusps(items).or_else(|| {
                (items.len() >= 12).then(|| ordered_cusps(items)).flatten()
            }),
            Value::Object(_) => keyed_cusps(container),
            _ => None,
        }?;
        match CuspRing::new(longitudes) {
            Ok(ring) => Some(ring),
            Err(e) => {
                debug!("rejecting cusp ring: {e}");
                None
            }
        }
    }

    /// Rotate a ring so that cusp 1 is the cusp circularly closest to the
    /// Ascendant, compensating for payloads that do not anchor cusp 1 there.
    pub fn align_to_ascendant(&self, ring: &mut CuspRing, ascendant: f64) {
        let offset = ring
            .as_array()
            .iter()
            .enumerate()
            .min_by(|(_, a), (_, b)| {
                circular_distance(**a, ascendant)
                    .partial_cmp(&circular_distance(**b, ascendant))
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .map(|(i, _)| i)
            .unwrap_or(0);
        if offset != 0 {
            debug!("rotating cusp ring by {offset} to realign cusp 1 with the Ascendant");
            ring.rotate(offset);
        }
    }

    /// House number (1..=12) of a longitude within a valid cusp ring.
    ///
    /// A longitude on a cusp belongs to the house *starting* there; one
    /// within epsilon below the next cusp is pulled into the next house so
    /// floating-point noise cannot misclassify a boundary position.
    pub fn house_by_cusps(&self, lon: f64, ring: &CuspRing) -> u8 {
        let l = wrap360(lon);
        let cusps = ring.as_array();
        for i in 0..12 {
            let start = cusps[i];
            let end = cusps[(i + 1) % 12];
            let arc = wrap360(end - start);
            let dx = wrap360(l - start);
            if dx < arc {
                if arc - dx <= self.epsilon {
                    return ((i + 1) % 12) as u8 + 1;
                }
                return i as u8 + 1;
            }
        }
        // valid rings partition the circle, so one arc always matched
        12
    }

    /// Whole-sign house of a longitude, anchored at the Ascendant's sign.
    pub fn whole_sign_house(lon: f64, ascendant: f64) -> u8 {
        let delta = sign_index(lon) as i32 - sign_index(ascendant) as i32;
        (delta.rem_euclid(12) + 1) as u8
    }

    /// Assign a house: cusp-arc when a ring is available, whole-sign when
    /// only the Ascendant is known, `None` when neither applies.
    pub fn house_of(&self, lon: f64, ring: Option<&CuspRing>, ascendant: Option<f64>) -> Option<u8> {
        if !lon.is_finite() {
            return None;
        }
        if let Some(ring) = ring {
            return Some(self.house_by_cusps(lon, ring));
        }
        ascendant
            .filter(|a| a.is_finite())
            .map(|a| Self::whole_sign_house(lon, a))
    }
}

fn circular_distance(a: f64, b: f64) -> f64 {
    let d = wrap360(a - b);
    d.min(360.0 - d)
}

fn ordered_cusps(items: &[Value]) -> Option<[f64; 12]> {
    let mut out = [f64::NAN; 12];
    for (i, slot) in out.iter_mut().enumerate() {
        *slot = geometry::longitude_of(&items[i])?;
    }
    Some(out)
}

/// Sequence of records each declaring its own house number.
fn self_numbered_cusps(items: &[Value]) -> Option<[f64; 12]> {
    let mut out = [f64::NAN; 12];
    let mut filled = 0;
    for item in items {
        let number = item
            .get("number")
            .or_else(|| item.get("house"))
            .or_else(|| item.get("index"))
            .and_then(Value::as_u64);
        if let (Some(n @ 1..=12), Some(lon)) = (number, geometry::longitude_of(item)) {
            if out[n as usize - 1].is_nan() {
                filled += 1;
            }
            out[n as usize - 1] = lon;
        }
    }
    (filled == 12).then_some(out)
}

/// Keyed mapping using any of the known key conventions for house 1..=12.
fn keyed_cusps(container: &Value) -> Option<[f64; 12]> {
    let mut out = [f64::NAN; 12];
    for (i, slot) in out.iter_mut().enumerate() {
        let n = i + 1;
        let keys = [
            format!("{n}"),
            format!("cusp{n}"),
            format!("cusp_{n}"),
            format!("house{n}"),
            format!("house_{n}"),
            format!("H{n}"),
            format!("House{n}"),
            format!("house_{n:02}"),
        ];
        *slot = keys
            .iter()
            .filter_map(|k| container.get(k))
            .find_map(geometry::longitude_of)?;
    }
    Some(out)
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use serde_json::json;

    use super::*;

    fn whole_sign_ring() -> CuspRing {
        let mut lons = [0.0; 12];
        for (i, l) in lons.iter_mut().enumerate() {
            *l = i as f64 * 30.0;
        }
        CuspRing::new(lons).unwrap()
    }

    #[rstest]
    fn ordered_array_of_numbers_extracts() {
        let payload = json!([0, 30, 60, 90, 120, 150, 180, 210, 240, 270, 300, 330]);
        let ring = HouseResolver::default().extract_cusps(&payload).unwrap();
        assert_eq!(ring.cusp(4).unwrap(), 90.0);
    }

    #[rstest]
    #[case("cusp_")]
    #[case("house")]
    #[case("H")]
    fn keyed_mapping_extracts(#[case] prefix: &str) {
        let mut map = serde_json::Map::new();
        for n in 1..=12 {
            map.insert(format!("{prefix}{n}"), json!((n - 1) as f64 * 30.0));
        }
        let ring = HouseResolver::default().extract_cusps(&Value::Object(map)).unwrap();
        assert_eq!(ring.cusp(1).unwrap(), 0.0);
        assert_eq!(ring.cusp(12).unwrap(), 330.0);
    }

    #[rstest]
    fn self_numbered_records_extract() {
        let items: Vec<Value> = (1..=12)
            .map(|n| json!({"house": n, "longitude": (n - 1) as f64 * 30.0 + 5.0}))
            .collect();
        let ring = HouseResolver::default().extract_cusps(&json!(items)).unwrap();
        assert_eq!(ring.cusp(2).unwrap(), 35.0);
    }

    #[rstest]
    fn partial_ring_is_entirely_invalid() {
        let payload = json!({"cusp1": 0.0, "cusp2": 30.0});
        assert!(HouseResolver::default().extract_cusps(&payload).is_none());
    }

    #[rstest]
    fn response_containers_are_searched() {
        let cusps: Vec<f64> = (0..12).map(|i| i as f64 * 30.0).collect();
        let resolver = HouseResolver::default();
        assert!(resolver
            .extract_cusps_from_response(&json!({"data": {"houses": cusps}}))
            .is_some());
        let mut root = serde_json::Map::new();
        for n in 1..=12 {
            root.insert(format!("{n}"), json!((n - 1) as f64 * 30.0));
        }
        assert!(resolver
            .extract_cusps_from_response(&Value::Object(root))
            .is_some());
    }

    #[rstest]
    fn every_longitude_maps_to_exactly_one_house() {
        let resolver = HouseResolver::default();
        let ring = whole_sign_ring();
        let mut l = 0.05;
        while l < 360.0 {
            let h = resolver.house_by_cusps(l, &ring);
            assert!((1..=12).contains(&h), "lon {l} -> house {h}");
            assert_eq!(h as usize, sign_index(l) + 1);
            l += 0.7;
        }
    }

    #[rstest]
    fn boundary_belongs_to_starting_house() {
        let resolver = HouseResolver::default();
        let ring = whole_sign_ring();
        assert_eq!(resolver.house_by_cusps(30.0, &ring), 2);
        // just below the next cusp, inside epsilon: pulled forward
        assert_eq!(resolver.house_by_cusps(59.9999, &ring), 3);
        // comfortably inside the arc
        assert_eq!(resolver.house_by_cusps(59.9, &ring), 2);
    }

    #[rstest]
    fn whole_sign_agrees_with_cusps_for_whole_sign_ring() {
        let resolver = HouseResolver::default();
        let ring = whole_sign_ring();
        // Ascendant at 5° puts cusp 1 in Aries for both methods
        let asc = 5.0;
        let mut l = 0.3;
        while l < 360.0 {
            assert_eq!(
                resolver.house_by_cusps(l, &ring),
                HouseResolver::whole_sign_house(l, asc),
                "disagreement at {l}"
            );
            l += 1.1;
        }
        assert_eq!(resolver.house_by_cusps(35.0, &ring), 2);
        assert_eq!(HouseResolver::whole_sign_house(35.0, asc), 2);
    }

    #[rstest]
    fn alignment_rotates_closest_cusp_to_front() {
        let resolver = HouseResolver::default();
        let mut lons = [0.0; 12];
        for (i, l) in lons.iter_mut().enumerate() {
            *l = i as f64 * 30.0 + 12.0;
        }
        let mut ring = CuspRing::new(lons).unwrap();
        // Ascendant near what the payload listed as cusp 5
        resolver.align_to_ascendant(&mut ring, 133.0);
        assert_eq!(ring.cusp(1).unwrap(), 132.0);
    }

    #[rstest]
    fn no_ring_and_no_ascendant_is_unknown() {
        let resolver = HouseResolver::default();
        assert_eq!(resolver.house_of(100.0, None, None), None);
        assert_eq!(resolver.house_of(100.0, None, Some(5.0)), Some(4));
    }
}
