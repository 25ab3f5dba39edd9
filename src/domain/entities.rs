//! Domain entities: canonical points, cusp rings, aspects, subjects

use serde::{Deserialize, Serialize};

use super::error::DomainError;
use super::zodiac::wrap360;

/// Display language for labels. The upstream service receives the same
/// code in the `language` payload field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Language {
    En,
    #[default]
    Es,
}

impl Language {
    /// Wire code sent upstream (`"EN"` / `"ES"`).
    pub fn code(&self) -> &'static str {
        match self {
            Language::En => "EN",
            Language::Es => "ES",
        }
    }

    pub fn from_code(code: &str) -> Language {
        match code.trim().to_ascii_uppercase().as_str() {
            "EN" => Language::En,
            _ => Language::Es,
        }
    }
}

/// Canonical identity of a celestial point or chart angle.
///
/// The first 16 variants form the canonical request order (see
/// [`PointId::CANONICAL_ORDER`]). `Descendant`, `ImumCoeli` and `TrueNode`
/// are recognized on input but never requested; the true node is excluded
/// from every derived table. Anything else is carried verbatim as `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PointId {
    Sun,
    Moon,
    Mercury,
    Venus,
    Mars,
    Jupiter,
    Saturn,
    Uranus,
    Neptune,
    Pluto,
    Ascendant,
    MediumCoeli,
    MeanNode,
    MeanSouthNode,
    Chiron,
    MeanLilith,
    Descendant,
    ImumCoeli,
    TrueNode,
    Other(String),
}

impl PointId {
    /// The 16 points sent as `active_points` on every upstream request,
    /// in canonical order. Ordinal point references index into this list.
    pub const CANONICAL_ORDER: [PointId; 16] = [
        PointId::Sun,
        PointId::Moon,
        PointId::Mercury,
        PointId::Venus,
        PointId::Mars,
        PointId::Jupiter,
        PointId::Saturn,
        PointId::Uranus,
        PointId::Neptune,
        PointId::Pluto,
        PointId::Ascendant,
        PointId::MediumCoeli,
        PointId::MeanNode,
        PointId::MeanSouthNode,
        PointId::Chiron,
        PointId::MeanLilith,
    ];

    /// The 10 classical planets/luminaries used for the positions table
    /// and the element/modality summaries.
    pub const CLASSIC_PLANETS: [PointId; 10] = [
        PointId::Sun,
        PointId::Moon,
        PointId::Mercury,
        PointId::Venus,
        PointId::Mars,
        PointId::Jupiter,
        PointId::Saturn,
        PointId::Uranus,
        PointId::Neptune,
        PointId::Pluto,
    ];

    /// Stable wire identifier, as the upstream service spells it.
    pub fn canonical_name(&self) -> &str {
        match self {
            PointId::Sun => "Sun",
            PointId::Moon => "Moon",
            PointId::Mercury => "Mercury",
            PointId::Venus => "Venus",
            PointId::Mars => "Mars",
            PointId::Jupiter => "Jupiter",
            PointId::Saturn => "Saturn",
            PointId::Uranus => "Uranus",
            PointId::Neptune => "Neptune",
            PointId::Pluto => "Pluto",
            PointId::Ascendant => "Ascendant",
            PointId::MediumCoeli => "Medium_Coeli",
            PointId::MeanNode => "Mean_Node",
            PointId::MeanSouthNode => "Mean_South_Node",
            PointId::Chiron => "Chiron",
            PointId::MeanLilith => "Mean_Lilith",
            PointId::Descendant => "Descendant",
            PointId::ImumCoeli => "Imum_Coeli",
            PointId::TrueNode => "True_Node",
            PointId::Other(raw) => raw.as_str(),
        }
    }

    /// Human-readable label in the requested language. Unknown points fall
    /// back to their raw name with underscores replaced by spaces.
    pub fn label(&self, lang: Language) -> String {
        let known = match (self, lang) {
            (PointId::Other(_), _) => None,
            (p, Language::En) => Some(match p {
                PointId::MediumCoeli => "Midheaven",
                PointId::MeanNode => "North Node",
                PointId::MeanSouthNode => "South Node",
                PointId::MeanLilith => "Lilith (mean)",
                PointId::ImumCoeli => "Imum Coeli",
                PointId::TrueNode => "True Node",
                other => other.canonical_name(),
            }),
            (p, Language::Es) => Some(match p {
                PointId::Sun => "Sol",
                PointId::Moon => "Luna",
                PointId::Mercury => "Mercurio",
                PointId::Venus => "Venus",
                PointId::Mars => "Marte",
                PointId::Jupiter => "Júpiter",
                PointId::Saturn => "Saturno",
                PointId::Uranus => "Urano",
                PointId::Neptune => "Neptuno",
                PointId::Pluto => "Plutón",
                PointId::Ascendant => "Ascendente",
                PointId::MediumCoeli => "Medio Cielo",
                PointId::MeanNode => "Nodo Norte",
                PointId::MeanSouthNode => "Nodo Sur",
                PointId::Chiron => "Quirón",
                PointId::MeanLilith => "Lilith (media)",
                PointId::Descendant => "Descendente",
                PointId::ImumCoeli => "Fondo del Cielo",
                PointId::TrueNode => "Nodo Verdadero",
                PointId::Other(_) => unreachable!(),
            }),
        };
        match known {
            Some(l) => l.to_string(),
            None => self.canonical_name().replace('_', " "),
        }
    }

    /// Whether this id is in the canonical 16-point request set.
    pub fn is_canonical(&self) -> bool {
        PointId::CANONICAL_ORDER.contains(self)
    }
}

/// A resolved celestial point or angle.
///
/// Canonical identity is immutable once resolved. The longitude is filled
/// from whichever source yields a finite value first; later sources never
/// overwrite it.
#[derive(Debug, Clone, PartialEq)]
pub struct CelestialPoint {
    pub id: PointId,
    pub label: String,
    longitude: Option<f64>,
    pub house: Option<u8>,
}

impl CelestialPoint {
    pub fn new(id: PointId, lang: Language) -> Self {
        let label = id.label(lang);
        Self {
            id,
            label,
            longitude: None,
            house: None,
        }
    }

    pub fn longitude(&self) -> Option<f64> {
        self.longitude
    }

    /// Record a longitude if none is known yet. First finite value wins;
    /// non-finite candidates and later values are ignored.
    pub fn fill_longitude(&mut self, lon: f64) {
        if self.longitude.is_none() && lon.is_finite() {
            self.longitude = Some(wrap360(lon));
        }
    }
}

/// A single house cusp: the longitude where a house begins.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HouseCusp {
    pub number: u8,
    pub longitude: f64,
}

/// A validated ring of 12 house cusps.
///
/// Invariant: all longitudes are finite, wrapped into `[0,360)`, every
/// consecutive arc (cusp n → cusp n+1, wrapping 12 → 1) is strictly
/// positive, and the 12 arcs sum to exactly 360°, so they tile the full
/// circle with no gap or double cover. Partial rings are rejected outright;
/// callers fall back to whole-sign assignment instead.
#[derive(Debug, Clone, PartialEq)]
pub struct CuspRing {
    cusps: [f64; 12],
}

impl CuspRing {
    pub fn new(longitudes: [f64; 12]) -> Result<Self, DomainError> {
        let finite = longitudes.iter().filter(|l| l.is_finite()).count();
        if finite != 12 {
            return Err(DomainError::IncompleteCuspRing { found: finite });
        }
        let cusps = longitudes.map(wrap360);
        let mut total = 0.0;
        for i in 0..12 {
            let arc = wrap360(cusps[(i + 1) % 12] - cusps[i]);
            if arc <= 0.0 {
                return Err(DomainError::DegenerateCuspArc { cusp: i as u8 + 1 });
            }
            total += arc;
        }
        // a non-monotonic ring winds the circle more than once
        if (total - 360.0).abs() > 1e-6 {
            return Err(DomainError::OverwoundCuspRing { total });
        }
        Ok(Self { cusps })
    }

    /// Longitude of cusp `number` (1..=12).
    pub fn cusp(&self, number: u8) -> Result<f64, DomainError> {
        if !(1..=12).contains(&number) {
            return Err(DomainError::HouseOutOfRange(number));
        }
        Ok(self.cusps[number as usize - 1])
    }

    /// Cyclically rotate the ring so the cusp at `offset` becomes cusp 1.
    pub fn rotate(&mut self, offset: usize) {
        self.cusps.rotate_left(offset % 12);
    }

    pub fn iter(&self) -> impl Iterator<Item = HouseCusp> + '_ {
        self.cusps.iter().enumerate().map(|(i, &longitude)| HouseCusp {
            number: i as u8 + 1,
            longitude,
        })
    }

    pub fn as_array(&self) -> &[f64; 12] {
        &self.cusps
    }
}

/// Normalized aspect type: one of the 17 recognized kinds, or the folded
/// raw text of an unrecognized one (shown as-is, orb not computable).
#[derive(Debug, Clone, PartialEq)]
pub enum AspectType {
    Known(AspectKind),
    Other(String),
}

impl AspectType {
    pub fn exact_angle(&self) -> Option<f64> {
        match self {
            AspectType::Known(kind) => Some(kind.exact_angle()),
            AspectType::Other(_) => None,
        }
    }

    /// Display label; unrecognized types are shown capitalized.
    pub fn label(&self, lang: Language) -> String {
        match self {
            AspectType::Known(kind) => kind.label(lang).to_string(),
            AspectType::Other(raw) => {
                let mut chars = raw.replace('_', " ").chars().collect::<Vec<_>>();
                if let Some(first) = chars.first_mut() {
                    *first = first.to_ascii_uppercase();
                }
                chars.into_iter().collect()
            }
        }
    }
}

/// The 17 recognized aspect kinds, each with a fixed exact angle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AspectKind {
    Conjunction,
    Opposition,
    Square,
    Trine,
    Sextile,
    Quincunx,
    Semisextile,
    Semisquare,
    Sesquiquadrate,
    Quintile,
    Biquintile,
    Novile,
    Binovile,
    Septile,
    Biseptile,
    Triseptile,
    Undecile,
}

impl AspectKind {
    pub const ALL: [AspectKind; 17] = [
        AspectKind::Conjunction,
        AspectKind::Opposition,
        AspectKind::Square,
        AspectKind::Trine,
        AspectKind::Sextile,
        AspectKind::Quincunx,
        AspectKind::Semisextile,
        AspectKind::Semisquare,
        AspectKind::Sesquiquadrate,
        AspectKind::Quintile,
        AspectKind::Biquintile,
        AspectKind::Novile,
        AspectKind::Binovile,
        AspectKind::Septile,
        AspectKind::Biseptile,
        AspectKind::Triseptile,
        AspectKind::Undecile,
    ];

    /// Theoretically exact angular separation for this aspect, in degrees.
    pub fn exact_angle(&self) -> f64 {
        match self {
            AspectKind::Conjunction => 0.0,
            AspectKind::Opposition => 180.0,
            AspectKind::Square => 90.0,
            AspectKind::Trine => 120.0,
            AspectKind::Sextile => 60.0,
            AspectKind::Quincunx => 150.0,
            AspectKind::Semisextile => 30.0,
            AspectKind::Semisquare => 45.0,
            AspectKind::Sesquiquadrate => 135.0,
            AspectKind::Quintile => 72.0,
            AspectKind::Biquintile => 144.0,
            AspectKind::Novile => 40.0,
            AspectKind::Binovile => 80.0,
            AspectKind::Septile => 51.4286,
            AspectKind::Biseptile => 102.8571,
            AspectKind::Triseptile => 154.2857,
            AspectKind::Undecile => 32.7273,
        }
    }

    /// Canonical lookup key (lowercase English).
    pub fn key(&self) -> &'static str {
        match self {
            AspectKind::Conjunction => "conjunction",
            AspectKind::Opposition => "opposition",
            AspectKind::Square => "square",
            AspectKind::Trine => "trine",
            AspectKind::Sextile => "sextile",
            AspectKind::Quincunx => "quincunx",
            AspectKind::Semisextile => "semisextile",
            AspectKind::Semisquare => "semisquare",
            AspectKind::Sesquiquadrate => "sesquiquadrate",
            AspectKind::Quintile => "quintile",
            AspectKind::Biquintile => "biquintile",
            AspectKind::Novile => "novile",
            AspectKind::Binovile => "binovile",
            AspectKind::Septile => "septile",
            AspectKind::Biseptile => "biseptile",
            AspectKind::Triseptile => "triseptile",
            AspectKind::Undecile => "undecile",
        }
    }

    pub fn label(&self, lang: Language) -> &'static str {
        match lang {
            Language::En => match self {
                AspectKind::Conjunction => "Conjunction",
                AspectKind::Opposition => "Opposition",
                AspectKind::Square => "Square",
                AspectKind::Trine => "Trine",
                AspectKind::Sextile => "Sextile",
                AspectKind::Quincunx => "Quincunx",
                AspectKind::Semisextile => "Semisextile",
                AspectKind::Semisquare => "Semisquare",
                AspectKind::Sesquiquadrate => "Sesquiquadrate",
                AspectKind::Quintile => "Quintile",
                AspectKind::Biquintile => "Biquintile",
                AspectKind::Novile => "Novile",
                AspectKind::Binovile => "Binovile",
                AspectKind::Septile => "Septile",
                AspectKind::Biseptile => "Biseptile",
                AspectKind::Triseptile => "Triseptile",
                AspectKind::Undecile => "Undecile",
            },
            Language::Es => match self {
                AspectKind::Conjunction => "Conjunción",
                AspectKind::Opposition => "Oposición",
                AspectKind::Square => "Cuadratura",
                AspectKind::Trine => "Trígono",
                AspectKind::Sextile => "Sextil",
                AspectKind::Quincunx => "Quincuncio",
                AspectKind::Semisextile => "Semisextil",
                AspectKind::Semisquare => "Semicuadratura",
                AspectKind::Sesquiquadrate => "Sesquicuadratura",
                AspectKind::Quintile => "Quintil",
                AspectKind::Biquintile => "Biquintil",
                AspectKind::Novile => "Novil",
                AspectKind::Binovile => "Binovil",
                AspectKind::Septile => "Septil",
                AspectKind::Biseptile => "Biseptil",
                AspectKind::Triseptile => "Triseptil",
                AspectKind::Undecile => "Undécil",
            },
        }
    }
}

/// A resolved aspect between two points.
#[derive(Debug, Clone, PartialEq)]
pub struct Aspect {
    pub kind: AspectType,
    pub point_a: PointId,
    pub point_b: PointId,
    pub label_a: String,
    pub label_b: String,
    /// Angular separation between the endpoints, degrees in `[0,180]`.
    pub separation: Option<f64>,
    /// Absolute deviation from the aspect's exact angle.
    pub orb: Option<f64>,
}

/// Opaque birth-data record, constructed upstream of the resolution core
/// and forwarded verbatim to the chart service. Never mutated here; the
/// request orchestrator drops optional fields only on fresh JSON copies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subject {
    pub name: String,
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub hour: u32,
    pub minute: u32,
    pub city: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nation: Option<String>,
    pub zodiac_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub house_system: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub geonames_username: Option<String>,
}
