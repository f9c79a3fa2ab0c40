//! Quiz submission pipeline.
//!
//! store → renderer → evaluator → recorder → exporter. Every step takes an
//! explicit `&mut SqliteConnection` owned by the calling request, either a
//! pooled connection or an open transaction.

pub mod evaluator;
pub mod exporter;
pub mod recorder;
pub mod renderer;
pub mod store;
