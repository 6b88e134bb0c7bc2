//! Headroom Scorer - Cluster resource availability scoring
//!
//! This crate provides:
//! - Allocatable aggregation over schedulable nodes
//! - Request aggregation (container sum, init-container max, overhead, defaults)
//! - Linear-with-saturation score normalization
//! - Snapshot providers (in-memory, manifest file, API server)

pub mod allocatable;
pub mod config;
pub mod error;
pub mod normalize;
pub mod provider;
pub mod request;
pub mod scorer;

// Re-export commonly used types
pub use config::{CpuGranularity, ScoringConfig};
pub use error::{Result, ScorerError};
pub use normalize::ScoreScale;
pub use provider::{ApiSnapshot, ManifestSnapshot, SnapshotProvider, StaticSnapshot};
pub use scorer::{
    default_dimensions, score_snapshot, ClusterScorer, DimensionScore, PlacementScore,
    ScoreReport,
};
