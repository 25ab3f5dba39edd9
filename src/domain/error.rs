//! Domain-level errors (no external dependencies)

use thiserror::Error;

/// Domain errors represent violations of chart-model invariants.
/// These are independent of transport and presentation concerns.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    #[error("cusp ring must contain 12 finite longitudes, got {found}")]
    IncompleteCuspRing { found: usize },

    #[error("cusp ring has a degenerate arc starting at cusp {cusp}")]
    DegenerateCuspArc { cusp: u8 },

    #[error("cusp ring arcs wind {total}° around the circle, expected 360°")]
    OverwoundCuspRing { total: f64 },

    #[error("house number out of range: {0} (expected 1..=12)")]
    HouseOutOfRange(u8),
}

pub type DomainResult<T> = Result<T, DomainError>;
