//! Zodiac tables: signs, elements, modalities, degree formatting

use super::entities::Language;

/// Normalize any angle into `[0, 360)`. Negative inputs wrap forward.
pub fn wrap360(x: f64) -> f64 {
    x.rem_euclid(360.0)
}

/// Zero-based sign index of an ecliptic longitude (0 = Aries .. 11 = Pisces).
pub fn sign_index(lon: f64) -> usize {
    (wrap360(lon) / 30.0).floor() as usize % 12
}

/// Format a degree value as `D°MM'`, rounding the fractional part to the
/// nearest arc-minute and carrying a 60-minute rollover into the degrees.
pub fn fmt_deg_min(x: f64) -> String {
    let d = x.floor();
    let m = ((x - d) * 60.0).round();
    let (d, m) = if m >= 60.0 { (d + 1.0, 0.0) } else { (d, m) };
    format!("{}°{:02}'", d as i64, m as i64)
}

/// Format a longitude as degrees within its sign, `D°MM'`.
pub fn fmt_deg_in_sign(lon: f64) -> String {
    fmt_deg_min(wrap360(lon) % 30.0)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sign {
    Aries,
    Taurus,
    Gemini,
    Cancer,
    Leo,
    Virgo,
    Libra,
    Scorpio,
    Sagittarius,
    Capricorn,
    Aquarius,
    Pisces,
}

impl Sign {
    pub const ALL: [Sign; 12] = [
        Sign::Aries,
        Sign::Taurus,
        Sign::Gemini,
        Sign::Cancer,
        Sign::Leo,
        Sign::Virgo,
        Sign::Libra,
        Sign::Scorpio,
        Sign::Sagittarius,
        Sign::Capricorn,
        Sign::Aquarius,
        Sign::Pisces,
    ];

    pub fn from_longitude(lon: f64) -> Sign {
        Sign::ALL[sign_index(lon)]
    }

    pub fn index(&self) -> usize {
        Sign::ALL.iter().position(|s| s == self).unwrap_or(0)
    }

    pub fn element(&self) -> Element {
        match self.index() % 4 {
            0 => Element::Fire,
            1 => Element::Earth,
            2 => Element::Air,
            _ => Element::Water,
        }
    }

    pub fn modality(&self) -> Modality {
        match self.index() % 3 {
            0 => Modality::Cardinal,
            1 => Modality::Fixed,
            _ => Modality::Mutable,
        }
    }

    pub fn label(&self, lang: Language) -> &'static str {
        match lang {
            Language::En => match self {
                Sign::Aries => "Aries",
                Sign::Taurus => "Taurus",
                Sign::Gemini => "Gemini",
                Sign::Cancer => "Cancer",
                Sign::Leo => "Leo",
                Sign::Virgo => "Virgo",
                Sign::Libra => "Libra",
                Sign::Scorpio => "Scorpio",
                Sign::Sagittarius => "Sagittarius",
                Sign::Capricorn => "Capricorn",
                Sign::Aquarius => "Aquarius",
                Sign::Pisces => "Pisces",
            },
            Language::Es => match self {
                Sign::Aries => "Aries",
                Sign::Taurus => "Tauro",
                Sign::Gemini => "Géminis",
                Sign::Cancer => "Cáncer",
                Sign::Leo => "Leo",
                Sign::Virgo => "Virgo",
                Sign::Libra => "Libra",
                Sign::Scorpio => "Escorpio",
                Sign::Sagittarius => "Sagitario",
                Sign::Capricorn => "Capricornio",
                Sign::Aquarius => "Acuario",
                Sign::Pisces => "Piscis",
            },
        }
    }
}

/// Classical element of a sign.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Element {
    Fire,
    Earth,
    Air,
    Water,
}

impl Element {
    pub const ALL: [Element; 4] = [Element::Fire, Element::Earth, Element::Air, Element::Water];

    pub fn label(&self, lang: Language) -> &'static str {
        match lang {
            Language::En => match self {
                Element::Fire => "Fire",
                Element::Earth => "Earth",
                Element::Air => "Air",
                Element::Water => "Water",
            },
            Language::Es => match self {
                Element::Fire => "Fuego",
                Element::Earth => "Tierra",
                Element::Air => "Aire",
                Element::Water => "Agua",
            },
        }
    }
}

/// Modality (quadruplicity) of a sign.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Modality {
    Cardinal,
    Fixed,
    Mutable,
}

impl Modality {
    pub const ALL: [Modality; 3] = [Modality::Cardinal, Modality::Fixed, Modality::Mutable];

    pub fn label(&self, lang: Language) -> &'static str {
        match lang {
            Language::En => match self {
                Modality::Cardinal => "Cardinal",
                Modality::Fixed => "Fixed",
                Modality::Mutable => "Mutable",
            },
            Language::Es => match self {
                Modality::Cardinal => "Cardinal",
                Modality::Fixed => "Fijo",
                Modality::Mutable => "Mutable",
            },
        }
    }
}
