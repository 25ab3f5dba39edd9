//! Natal chart data normalization core
//!
//! Resolves the variably shaped payloads of the upstream chart service into
//! canonical points, houses and aspects, and renders them for the terminal.
//! Layered: domain (pure types and invariants), application (resolution
//! services and the chart pipeline), infrastructure (HTTP), cli.

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;
