//! Metric names for the gateway core, plus re-exported `metrics` facade macros.
//!
//! Exporters (Prometheus endpoint, recorder setup) live outside the core;
//! crates record through the facade behind their optional `metrics` feature.

pub mod definitions;

pub use definitions::*;

// Re-export metrics macros for convenience
pub use metrics::{counter, gauge, histogram};
