//! Domain layer: chart entities and zodiac tables
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod entities;
pub mod error;
pub mod zodiac;

pub use entities::*;
pub use error::{DomainError, DomainResult};
pub use zodiac::{fmt_deg_in_sign, fmt_deg_min, sign_index, wrap360, Element, Modality, Sign};
