//! folio-core - Core library for the Folio portfolio service
//!
//! This crate turns an owner's repositories on a source-hosting service into
//! derived project intelligence:
//!
//! - **client**: Typed, fail-soft access to the upstream REST API
//! - **cache**: In-memory TTL cache with lazy expiry and a periodic sweep
//! - **enrichment**: Activity status, velocity, activity graph, stack detection
//! - **orchestrator**: Cache-backed aggregation and portfolio rollups
//! - **config**: Client configuration

pub mod cache;
pub mod client;
pub mod config;
pub mod enrichment;
pub mod error;
pub mod orchestrator;
pub mod types;

// Re-export commonly used types
pub use cache::{CacheStats, CacheTtl, TtlCache};
pub use client::{GitHubClient, HostingApi, MockHostingApi};
pub use config::ClientConfig;
pub use error::{Error, Result};
pub use orchestrator::Aggregator;
