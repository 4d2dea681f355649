//! `navguard-path` – validated, cached path generation.
//!
//! The single gate every path request passes through before an agent moves:
//! raw route computation wrapped in staged validation, plus a shared
//! bounded cache so near-identical requests reuse prior work.
//!
//! # Modules
//!
//! - [`cache`] – [`PathCache`][cache::PathCache]: bounded LRU with
//!   per-entry TTL, quantized endpoint keys, and hit/miss/insertion/
//!   eviction counters for dashboards.
//! - [`generator`] – [`ValidatedPathGenerator`][generator::ValidatedPathGenerator]:
//!   the short-circuiting pipeline (destination checks → raw primitive →
//!   collision segments → liquid segments) gated by
//!   [`ValidationLevel`][navguard_types::ValidationLevel], with collinear
//!   waypoint simplification and swim annotation.

pub mod cache;
pub mod generator;

pub use cache::{CachedPath, PathCache, PathCacheConfig, PathCacheKey, PathCacheStats};
pub use generator::{ValidatedPath, ValidatedPathGenerator, simplify_path};
