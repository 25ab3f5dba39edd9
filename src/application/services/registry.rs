//! Canonical point registry
//!
//! Maps every accepted spelling, index or symbol of a celestial point onto
//! one [`PointId`]. A registry instance is request-scoped: aliases harvested
//! from one response never leak into another request (concurrent chart
//! generations each build their own registry).

use std::collections::HashMap;

use serde_json::Value;
use tracing::debug;

use crate::domain::PointId;

use super::normalize::fold_key;

/// Object fields probed, in order, when a point reference arrives as a
/// nested record instead of a plain name or index.
const NAME_FIELDS: [&str; 6] = ["name", "point", "id", "code", "symbol", "label"];

/// Literal numeric codes some upstream versions use for chart angles.
/// Matched before any ordinal interpretation.
const ANGLE_CODES: [(i64, PointId); 4] = [
    (1000, PointId::Ascendant),
    (1001, PointId::MediumCoeli),
    (1002, PointId::Descendant),
    (1003, PointId::ImumCoeli),
];

#[derive(Debug, Default)]
pub struct PointRegistry {
    /// Response-local aliases learned while scanning the current response.
    learned: HashMap<String, PointId>,
}

impl PointRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve an arbitrarily shaped point reference.
    ///
    /// Strings and numbers resolve directly; objects are probed for the
    /// first usable name-bearing field. Returns `None` only when no usable
    /// field exists at all — an unmatched but present name still resolves,
    /// to [`PointId::Other`].
    pub fn resolve(&self, raw: &Value) -> Option<PointId> {
        match raw {
            Value::String(s) if !s.trim().is_empty() => Some(self.resolve_name(s)),
            Value::Number(n) => {
                let idx = n.as_i64().or_else(|| {
                    n.as_f64()
                        .filter(|f| f.is_finite() && f.fract() == 0.0)
                        .map(|f| f as i64)
                })?;
                Some(
                    self.resolve_index(idx)
                        .unwrap_or_else(|| PointId::Other(idx.to_string())),
                )
            }
            Value::Object(map) => NAME_FIELDS
                .iter()
                .filter_map(|f| map.get(*f))
                .find_map(|v| self.resolve(v)),
            _ => None,
        }
    }

    /// Resolve a textual point name. Digit strings take the numeric path;
    /// everything else is folded and looked up against learned aliases
    /// first, then the static table. Unmatched names pass through as
    /// [`PointId::Other`] so callers can still display them.
    pub fn resolve_name(&self, raw: &str) -> PointId {
        let trimmed = raw.trim();
        if let Ok(idx) = trimmed.parse::<i64>() {
            if let Some(id) = self.resolve_index(idx) {
                return id;
            }
            return PointId::Other(trimmed.to_string());
        }
        let key = fold_key(trimmed);
        if let Some(id) = self.learned.get(&key) {
            return id.clone();
        }
        static_alias(&key).unwrap_or_else(|| PointId::Other(trimmed.to_string()))
    }

    /// Resolve a numeric point reference: literal angle codes first, then
    /// 1-based position in the canonical order, with 0 accepted as the
    /// 0-based first entry.
    pub fn resolve_index(&self, idx: i64) -> Option<PointId> {
        if let Some((_, id)) = ANGLE_CODES.iter().find(|(code, _)| *code == idx) {
            return Some(id.clone());
        }
        match idx {
            1..=16 => Some(PointId::CANONICAL_ORDER[idx as usize - 1].clone()),
            0 => Some(PointId::CANONICAL_ORDER[0].clone()),
            _ => None,
        }
    }

    /// Register a response-local alias.
    pub fn learn(&mut self, alias: &str, id: PointId) {
        let key = fold_key(alias);
        if key.is_empty() {
            return;
        }
        if static_alias(&key).is_none() && !self.learned.contains_key(&key) {
            debug!("learned alias {key:?} -> {}", id.canonical_name());
            self.learned.insert(key, id);
        }
    }

    /// Resolve a point record and harvest its other labels as aliases, so a
    /// synonym seen once resolves consistently for the rest of the response.
    pub fn observe(&mut self, record: &Value) -> Option<PointId> {
        let id = self.resolve(record)?;
        if let Value::Object(map) = record {
            for field in NAME_FIELDS {
                if let Some(Value::String(s)) = map.get(field) {
                    if s.trim().parse::<i64>().is_err() {
                        self.learn(s, id.clone());
                    }
                }
            }
        }
        Some(id)
    }
}

/// Static alias table: canonical English identifiers, Spanish names, and
/// the short angle abbreviations, all in folded-key form.
fn static_alias(key: &str) -> Option<PointId> {
    use PointId::*;
    let id = match key {
        "sun" | "sol" => Sun,
        "moon" | "luna" => Moon,
        "mercury" | "mercurio" => Mercury,
        "venus" => Venus,
        "mars" | "marte" => Mars,
        "jupiter" => Jupiter,
        "saturn" | "saturno" => Saturn,
        "uranus" | "urano" => Uranus,
        "neptune" | "neptuno" => Neptune,
        "pluto" | "pluton" => Pluto,
        "ascendant" | "ascendente" | "asc" | "as" => Ascendant,
        "medium_coeli" | "midheaven" | "medio_cielo" | "mediocielo" | "mc" => MediumCoeli,
        "mean_node" | "north_node" | "nodo_norte" | "nn" => MeanNode,
        "mean_south_node" | "south_node" | "nodo_sur" | "sn" => MeanSouthNode,
        "chiron" | "quiron" => Chiron,
        "mean_lilith" | "lilith" | "lilith_media" | "lilith_mean" => MeanLilith,
        "descendant" | "descendente" | "dsc" | "desc" | "dc" => Descendant,
        "imum_coeli" | "fondo_del_cielo" | "ic" => ImumCoeli,
        "true_node" | "nodo_verdadero" => TrueNode,
        _ => return None,
    };
    Some(id)
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use serde_json::json;

    use super::*;

    #[rstest]
    #[case("Sun", PointId::Sun)]
    #[case("sol", PointId::Sun)]
    #[case("LUNA", PointId::Moon)]
    #[case("Júpiter", PointId::Jupiter)]
    #[case("Plutón", PointId::Pluto)]
    #[case("asc", PointId::Ascendant)]
    #[case("Medio Cielo", PointId::MediumCoeli)]
    #[case("midheaven", PointId::MediumCoeli)]
    #[case("nodo_norte", PointId::MeanNode)]
    #[case("Lilith (media)", PointId::MeanLilith)]
    #[case("True_Node", PointId::TrueNode)]
    fn aliases_resolve_to_canonical_id(#[case] raw: &str, #[case] expected: PointId) {
        let reg = PointRegistry::new();
        assert_eq!(reg.resolve_name(raw), expected);
    }

    #[rstest]
    #[case(0, PointId::Sun)]
    #[case(1, PointId::Sun)]
    #[case(2, PointId::Moon)]
    #[case(16, PointId::MeanLilith)]
    #[case(1000, PointId::Ascendant)]
    #[case(1001, PointId::MediumCoeli)]
    fn numeric_references_resolve(#[case] idx: i64, #[case] expected: PointId) {
        let reg = PointRegistry::new();
        assert_eq!(reg.resolve_index(idx), Some(expected));
    }

    #[rstest]
    fn out_of_range_index_passes_through_as_opaque() {
        let reg = PointRegistry::new();
        assert_eq!(reg.resolve_name("42"), PointId::Other("42".into()));
    }

    #[rstest]
    fn unknown_name_passes_through_as_opaque() {
        let reg = PointRegistry::new();
        assert_eq!(
            reg.resolve_name("Part of Fortune"),
            PointId::Other("Part of Fortune".into())
        );
    }

    #[rstest]
    fn object_references_probe_name_fields() {
        let reg = PointRegistry::new();
        assert_eq!(reg.resolve(&json!({"name": "Marte"})), Some(PointId::Mars));
        assert_eq!(
            reg.resolve(&json!({"id": 2, "extra": true})),
            Some(PointId::Moon)
        );
        assert_eq!(reg.resolve(&json!({"code": {"symbol": "MC"}})), Some(PointId::MediumCoeli));
        assert_eq!(reg.resolve(&json!(null)), None);
    }

    #[rstest]
    fn observed_labels_resolve_for_rest_of_response() {
        let mut reg = PointRegistry::new();
        let record = json!({"name": "Saturn", "label": "El Anillado"});
        assert_eq!(reg.observe(&record), Some(PointId::Saturn));
        // the response-local label now resolves on its own
        assert_eq!(reg.resolve_name("el anillado"), PointId::Saturn);
    }

    #[rstest]
    fn learned_aliases_never_shadow_static_table() {
        let mut reg = PointRegistry::new();
        reg.learn("sol", PointId::Pluto);
        assert_eq!(reg.resolve_name("Sol"), PointId::Sun);
    }
}
