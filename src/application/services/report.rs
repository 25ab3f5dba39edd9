//! Chart report assembly
//!
//! Folds resolved longitudes, houses and aspects into the display tables:
//! planetary positions, house cusps, aspect list, and the element/modality
//! distribution over the ten classical planets.

use std::collections::HashMap;

use itertools::Itertools;
use serde_json::Value;
use tracing::debug;

use crate::domain::{
    Aspect, CelestialPoint, CuspRing, Element, HouseCusp, Language, Modality, PointId, Sign,
};

use super::aspects::AspectResolver;
use super::geometry;
use super::houses::HouseResolver;
use super::registry::PointRegistry;

/// Containers probed for the list of point records in a full response.
const POINT_CONTAINERS: [&str; 2] = ["points", "planets"];

/// Containers probed for the list of aspect records.
const ASPECT_CONTAINERS: [&str; 2] = ["aspects", "natal_aspects"];

/// The assembled chart: everything the renderers need, fully resolved.
#[derive(Debug, Clone)]
pub struct ChartReport {
    pub language: Language,
    /// The ten classical planets in canonical order, followed by any
    /// unrecognized points the response carried. Points whose longitude
    /// never arrived keep `None` and render as unknown, not as 0°.
    pub points: Vec<CelestialPoint>,
    /// Empty when no valid cusp ring was found.
    pub cusps: Vec<HouseCusp>,
    pub ascendant: Option<f64>,
    pub aspects: Vec<Aspect>,
    /// Element distribution over placed classical planets, in percent.
    pub elements: Vec<(Element, u32)>,
    /// Modality distribution over placed classical planets, in percent.
    pub modalities: Vec<(Modality, u32)>,
}

#[derive(Debug, Clone)]
pub struct ReportAssembler {
    lang: Language,
    houses: HouseResolver,
    aspects: AspectResolver,
}

impl ReportAssembler {
    pub fn new(lang: Language, cusp_epsilon: f64) -> Self {
        Self {
            lang,
            houses: HouseResolver::new(cusp_epsilon),
            aspects: AspectResolver::new(lang),
        }
    }

    pub fn house_resolver(&self) -> &HouseResolver {
        &self.houses
    }

    /// Locate the list of point records in a response: the known containers
    /// at top level or under `data`, or the response root when it is itself
    /// an array.
    pub fn point_records<'a>(response: &'a Value) -> Option<&'a [Value]> {
        let scopes = [Some(response), response.get("data")];
        for scope in scopes.into_iter().flatten() {
            for field in POINT_CONTAINERS {
                if let Some(Value::Array(items)) = scope.get(field) {
                    return Some(items);
                }
            }
        }
        response.as_array().map(Vec::as_slice)
    }

    /// Locate the list of aspect records in a response.
    pub fn aspect_records<'a>(response: &'a Value) -> &'a [Value] {
        let scopes = [Some(response), response.get("data")];
        for scope in scopes.into_iter().flatten() {
            for field in ASPECT_CONTAINERS {
                if let Some(Value::Array(items)) = scope.get(field) {
                    return items;
                }
            }
        }
        response.as_array().map(Vec::as_slice).unwrap_or(&[])
    }

    /// Scan a response's point records into the longitude map, teaching the
    /// registry every label seen. First finite longitude per point wins;
    /// true-node records are dropped.
    pub fn collect_longitudes(
        &self,
        response: &Value,
        registry: &mut PointRegistry,
        longitudes: &mut HashMap<PointId, f64>,
    ) {
        let Some(records) = Self::point_records(response) else {
            return;
        };
        for record in records {
            let Some(id) = registry.observe(record) else {
                continue;
            };
            if id == PointId::TrueNode {
                continue;
            }
            if let Some(lon) = geometry::longitude_of(record) {
                longitudes.entry(id).or_insert(lon);
            }
        }
    }

    /// Backfill longitudes from aspect endpoints: aspect records carry the
    /// endpoints' absolute positions, which can stand in for a missing or
    /// failed positions response. Never overwrites a known longitude.
    pub fn backfill_from_aspects(
        &self,
        records: &[Value],
        registry: &PointRegistry,
        longitudes: &mut HashMap<PointId, f64>,
    ) {
        for record in records {
            for (name_fields, lon_fields, nested) in [
                (ENDPOINT_A_NAMES, LON_A_FIELDS, NESTED_A),
                (ENDPOINT_B_NAMES, LON_B_FIELDS, NESTED_B),
            ] {
                let id = name_fields
                    .iter()
                    .filter_map(|f| record.get(*f))
                    .find_map(|v| registry.resolve(v));
                let Some(id) = id else { continue };
                if id == PointId::TrueNode || longitudes.contains_key(&id) {
                    continue;
                }
                let lon = lon_fields
                    .iter()
                    .filter_map(|f| record.get(*f))
                    .find_map(geometry::parse_angle)
                    .map(crate::domain::wrap360)
                    .or_else(|| {
                        nested
                            .iter()
                            .filter_map(|f| record.get(*f))
                            .find_map(geometry::longitude_of)
                    });
                if let Some(lon) = lon {
                    debug!("backfilled {} from an aspect record", id.canonical_name());
                    longitudes.insert(id, lon);
                }
            }
        }
    }

    /// Resolve every usable aspect record, dropping the rest.
    pub fn resolve_aspects(&self, records: &[Value], registry: &PointRegistry) -> Vec<Aspect> {
        records
            .iter()
            .filter_map(|r| self.aspects.resolve(r, registry))
            .collect()
    }

    /// Assemble the final report from resolved inputs. The cusp ring, when
    /// present, is realigned to the Ascendant before any house assignment.
    pub fn assemble(
        &self,
        longitudes: &HashMap<PointId, f64>,
        mut ring: Option<CuspRing>,
        aspects: Vec<Aspect>,
    ) -> ChartReport {
        let ascendant = longitudes
            .get(&PointId::Ascendant)
            .copied()
            .or_else(|| ring.as_ref().and_then(|r| r.cusp(1).ok()));
        if let (Some(ring), Some(asc)) = (ring.as_mut(), ascendant) {
            self.houses.align_to_ascendant(ring, asc);
        }

        let mut points = Vec::with_capacity(PointId::CLASSIC_PLANETS.len());
        for id in PointId::CLASSIC_PLANETS {
            let mut point = CelestialPoint::new(id.clone(), self.lang);
            if let Some(&lon) = longitudes.get(&id) {
                point.fill_longitude(lon);
                point.house = self.houses.house_of(lon, ring.as_ref(), ascendant);
            }
            points.push(point);
        }

        // statistics cover the classical planets only
        let placed_signs: Vec<Sign> = points
            .iter()
            .filter_map(CelestialPoint::longitude)
            .map(Sign::from_longitude)
            .collect();
        let elements = distribution(&placed_signs, &Element::ALL, |s| s.element());
        let modalities = distribution(&placed_signs, &Modality::ALL, |s| s.modality());

        // unrecognized points are still shown, after the classical ones
        let mut extras: Vec<&PointId> = longitudes
            .keys()
            .filter(|id| matches!(id, PointId::Other(_)))
            .collect();
        extras.sort_by(|a, b| a.canonical_name().cmp(b.canonical_name()));
        for id in extras {
            let mut point = CelestialPoint::new(id.clone(), self.lang);
            if let Some(&lon) = longitudes.get(id) {
                point.fill_longitude(lon);
                point.house = self.houses.house_of(lon, ring.as_ref(), ascendant);
            }
            points.push(point);
        }

        ChartReport {
            language: self.lang,
            points,
            cusps: ring.as_ref().map(|r| r.iter().collect()).unwrap_or_default(),
            ascendant,
            aspects,
            elements,
            modalities,
        }
    }
}

/// Percentage distribution of placed signs over a category, rounded to the
/// nearest whole percent. Empty input yields all zeros.
fn distribution<C: Copy + PartialEq>(
    signs: &[Sign],
    categories: &[C],
    of: impl Fn(&Sign) -> C,
) -> Vec<(C, u32)> {
    let total = signs.len();
    let counts = signs.iter().map(&of).counts_by(|c| {
        categories
            .iter()
            .position(|k| *k == c)
            .unwrap_or(categories.len())
    });
    categories
        .iter()
        .enumerate()
        .map(|(i, &cat)| {
            let n = counts.get(&i).copied().unwrap_or(0);
            let pct = if total == 0 {
                0
            } else {
                ((n as f64) * 100.0 / total as f64).round() as u32
            };
            (cat, pct)
        })
        .collect()
}

// Aspect endpoint fields, duplicated here for backfilling: the aspect
// resolver keeps its own copies because it also validates both endpoints.
const ENDPOINT_A_NAMES: [&str; 6] = ["p1_name", "point_1", "point1", "p1", "object1", "planet1"];
const ENDPOINT_B_NAMES: [&str; 6] = ["p2_name", "point_2", "point2", "p2", "object2", "planet2"];
const LON_A_FIELDS: [&str; 6] = ["p1_abs_pos", "p1_abs_long", "p1_abs_longitude", "p1_longitude", "p1_lon", "p1_long"];
const LON_B_FIELDS: [&str; 6] = ["p2_abs_pos", "p2_abs_long", "p2_abs_longitude", "p2_longitude", "p2_lon", "p2_long"];
const NESTED_A: [&str; 5] = ["p1", "first", "from", "object1", "point1"];
const NESTED_B: [&str; 5] = ["p2", "second", "to", "object2", "point2"];

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use serde_json::json;

    use super::*;

    fn assembler() -> ReportAssembler {
        ReportAssembler::new(Language::En, super::super::houses::DEFAULT_CUSP_EPSILON)
    }

    fn whole_sign_ring() -> CuspRing {
        let mut lons = [0.0; 12];
        for (i, l) in lons.iter_mut().enumerate() {
            *l = i as f64 * 30.0;
        }
        CuspRing::new(lons).unwrap()
    }

    #[rstest]
    fn point_records_found_in_known_containers() {
        let nested = json!({"data": {"planets": [{"name": "Sun"}]}});
        assert_eq!(ReportAssembler::point_records(&nested).unwrap().len(), 1);
        let root = json!([{"name": "Moon"}]);
        assert_eq!(ReportAssembler::point_records(&root).unwrap().len(), 1);
        assert!(ReportAssembler::point_records(&json!({"other": 1})).is_none());
    }

    #[rstest]
    fn collect_keeps_first_longitude_and_drops_true_node() {
        let asm = assembler();
        let mut reg = PointRegistry::new();
        let mut lons = HashMap::new();
        let response = json!({"points": [
            {"name": "Sun", "longitude": 10.0},
            {"name": "Sol", "longitude": 99.0},
            {"name": "True_Node", "longitude": 50.0},
        ]});
        asm.collect_longitudes(&response, &mut reg, &mut lons);
        assert_eq!(lons.get(&PointId::Sun), Some(&10.0));
        assert!(!lons.contains_key(&PointId::TrueNode));
    }

    #[rstest]
    fn aspects_backfill_missing_longitudes_only() {
        let asm = assembler();
        let reg = PointRegistry::new();
        let mut lons = HashMap::from([(PointId::Sun, 10.0)]);
        let records = vec![json!({
            "type": "square",
            "p1_name": "Sun", "p1_abs_pos": 77.0,
            "p2_name": "Moon", "p2_abs_pos": 101.5,
        })];
        asm.backfill_from_aspects(&records, &reg, &mut lons);
        assert_eq!(lons.get(&PointId::Sun), Some(&10.0));
        assert_eq!(lons.get(&PointId::Moon), Some(&101.5));
    }

    #[rstest]
    fn assemble_assigns_houses_and_keeps_unplaced_points_unknown() {
        let asm = assembler();
        let lons = HashMap::from([
            (PointId::Sun, 35.0),
            (PointId::Moon, 190.0),
            (PointId::Ascendant, 2.0),
        ]);
        let report = asm.assemble(&lons, Some(whole_sign_ring()), Vec::new());
        assert_eq!(report.points.len(), 10);
        let sun = &report.points[0];
        assert_eq!(sun.house, Some(2));
        assert_eq!(sun.longitude(), Some(35.0));
        // Mercury never arrived
        assert_eq!(report.points[2].longitude(), None);
        assert_eq!(report.points[2].house, None);
        assert_eq!(report.cusps.len(), 12);
    }

    #[rstest]
    fn assemble_falls_back_to_whole_sign_without_ring() {
        let asm = assembler();
        let lons = HashMap::from([(PointId::Sun, 100.0), (PointId::Ascendant, 5.0)]);
        let report = asm.assemble(&lons, None, Vec::new());
        assert!(report.cusps.is_empty());
        assert_eq!(report.points[0].house, Some(4));
    }

    #[rstest]
    fn assemble_ring_is_realigned_to_ascendant() {
        let asm = assembler();
        let mut lons_arr = [0.0; 12];
        for (i, l) in lons_arr.iter_mut().enumerate() {
            *l = i as f64 * 30.0 + 12.0;
        }
        let ring = CuspRing::new(lons_arr).unwrap();
        // payload listed cusp 5 where the Ascendant actually is
        let lons = HashMap::from([(PointId::Ascendant, 133.0), (PointId::Sun, 140.0)]);
        let report = asm.assemble(&lons, Some(ring), Vec::new());
        assert_eq!(report.cusps[0].longitude, 132.0);
        assert_eq!(report.points[0].house, Some(1));
    }

    #[rstest]
    fn distributions_round_to_whole_percent() {
        let asm = assembler();
        // three placed planets: Aries (Fire), Cancer (Water), Gemini (Air)
        let lons = HashMap::from([
            (PointId::Sun, 10.0),
            (PointId::Moon, 100.0),
            (PointId::Mercury, 70.0),
        ]);
        let report = asm.assemble(&lons, None, Vec::new());
        let fire = report.elements.iter().find(|(e, _)| *e == Element::Fire).unwrap();
        assert_eq!(fire.1, 33);
        let earth = report.elements.iter().find(|(e, _)| *e == Element::Earth).unwrap();
        assert_eq!(earth.1, 0);
        let cardinal = report
            .modalities
            .iter()
            .find(|(m, _)| *m == Modality::Cardinal)
            .unwrap();
        assert_eq!(cardinal.1, 67);
    }

    #[rstest]
    fn unrecognized_points_are_listed_but_not_counted() {
        let asm = assembler();
        let lons = HashMap::from([
            (PointId::Sun, 10.0),
            (PointId::Other("Part_of_Fortune".into()), 200.0),
        ]);
        let report = asm.assemble(&lons, None, Vec::new());
        assert_eq!(report.points.len(), 11);
        let extra = report.points.last().unwrap();
        assert_eq!(extra.label, "Part of Fortune");
        assert_eq!(extra.longitude(), Some(200.0));
        // only the Sun counts toward the element split
        let fire = report.elements.iter().find(|(e, _)| *e == Element::Fire).unwrap();
        assert_eq!(fire.1, 100);
    }

    #[rstest]
    fn empty_chart_has_zeroed_distributions() {
        let report = assembler().assemble(&HashMap::new(), None, Vec::new());
        assert!(report.elements.iter().all(|(_, pct)| *pct == 0));
        assert!(report.modalities.iter().all(|(_, pct)| *pct == 0));
        assert_eq!(report.ascendant, None);
    }
}
