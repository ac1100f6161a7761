//! # Farm Stats SDK
//!
//! A Rust library computing per-pool statistics (APR, APY, TVL, reward
//! multiplier and vault fee) for the pools of a yield farm. Inputs come from
//! several slow, independent sources which are queried concurrently and
//! reconciled by asset token.
//!
//! ## Overview
//!
//! - **Sources**: on-chain pool registry, staking ledger, protocol and
//!   governance configuration, plus an off-chain statistics service
//! - **Derivation**: pure per-token computation of a [`types::PairStat`]
//! - **Aggregation**: concurrent fan-out to every source, merge by token,
//!   all-or-nothing failure at the top level
//!
//! ## Architecture
//!
//! ### Source Layer
//! [`stat_source`] defines one trait per collaborator; [`sources`] implements
//! them over the LCD smart-query endpoint and the GraphQL statistics service.
//!
//! ### Derivation Layer
//! [`pair_stat`] holds the formulas and the explicit derivation context.
//!
//! ### Aggregation Layer
//! [`aggregator`] orchestrates a single computation; [`farm_info`] exposes the
//! farm-level service built from [`settings`].

// Core Types
/// Data model shared by every layer
pub mod types;
/// Source traits and errors
pub mod stat_source;

// Sources
/// LCD and GraphQL clients
pub mod sources;

// Derivation & Aggregation
/// Pure PairStat derivation
pub mod pair_stat;
/// Concurrent pair stats aggregation
pub mod aggregator;
/// Farm-level service
pub mod farm_info;

// Infrastructure
/// Metrics and observability
pub mod metrics;
/// Configuration management
pub mod settings;

// Re-exports for convenience
pub use aggregator::PairStatAggregator;
pub use farm_info::{FarmInfoService, MirrorFarmInfo};
pub use settings::Settings;
pub use stat_source::SourceError;
pub use types::PairStat;
