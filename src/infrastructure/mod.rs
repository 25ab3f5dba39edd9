//! Infrastructure layer: upstream HTTP implementation
//!
//! This layer implements the upstream I/O boundary trait over reqwest.

pub mod client;
pub mod error;
pub mod traits;

pub use client::HttpChartService;
pub use error::{InfraError, InfraResult};
