//! Application layer: resolution services and the chart pipeline
//!
//! This layer orchestrates domain logic and depends on the upstream I/O
//! boundary trait.

pub mod error;
pub mod services;

pub use error::{ApplicationError, ApplicationResult};
