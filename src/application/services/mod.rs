//! Application services
//!
//! Concrete resolution and orchestration services. Services depend on the
//! upstream I/O boundary trait (ChartService) but are themselves concrete
//! structs, not traits.

mod aspects;
mod chart;
pub mod geometry;
mod houses;
mod normalize;
mod registry;
mod report;
mod upstream;

pub use aspects::{circular_separation, normalize_type, AspectResolver};
pub use chart::{ChartGenerator, ChartOptions, GeneratedChart};
pub use houses::{HouseResolver, DEFAULT_CUSP_EPSILON};
pub use normalize::fold_key;
pub use registry::PointRegistry;
pub use report::{ChartReport, ReportAssembler};
pub use upstream::{payload_variants, ResilientClient};
