//! # StatSource Traits
//!
//! This module defines the request/response seams the aggregator reads from.
//! Every source is an independent collaborator: calls are idempotent, have no
//! side effects, and either return a typed response or fail with a
//! [`SourceError`]. No source retries; a failure is surfaced to the caller.
//!
//! ## Sources
//!
//! - [`PoolRegistry`]: pools registered in the farm with their weights
//! - [`StakingLedger`]: bonded amounts per asset for a staker
//! - [`ProtocolConfigSource`]: protocol fee parameters
//! - [`GovernanceSource`]: governance config and vault weights
//! - [`ExternalStatsSource`]: off-chain APR figures
//!
//! ## Example
//!
//! ```rust,no_run
//! use farm_stats_sdk::stat_source::{PoolRegistry, SourceError};
//! use farm_stats_sdk::types::Pool;
//! use async_trait::async_trait;
//!
//! struct FixedRegistry(Vec<Pool>);
//!
//! #[async_trait]
//! impl PoolRegistry for FixedRegistry {
//!     async fn pools(&self) -> Result<Vec<Pool>, SourceError> {
//!         Ok(self.0.clone())
//!     }
//! }
//! ```

use crate::types::{
    ExternalAssetStat, GovernanceConfig, GovernanceStat, GovernanceVault, Pool,
    ProtocolFeeConfig, RewardInfo,
};
use async_trait::async_trait;

/// Failure of a single source call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SourceError {
    /// Transport, timeout or protocol failure while calling the source.
    #[error("Source {name} unavailable: {reason}")]
    SourceUnavailable { name: &'static str, reason: String },
    /// The source answered but a required field was missing or unreadable.
    #[error("Malformed response from {name}: {field}")]
    MalformedResponse { name: &'static str, field: String },
}

impl SourceError {
    pub fn unavailable(name: &'static str, reason: impl ToString) -> Self {
        SourceError::SourceUnavailable {
            name,
            reason: reason.to_string(),
        }
    }

    pub fn malformed(name: &'static str, field: impl ToString) -> Self {
        SourceError::MalformedResponse {
            name,
            field: field.to_string(),
        }
    }

    /// Name of the source that failed.
    pub fn source_name(&self) -> &'static str {
        match self {
            SourceError::SourceUnavailable { name, .. } => name,
            SourceError::MalformedResponse { name, .. } => name,
        }
    }
}

/// Registry of pools in the farm.
#[async_trait]
pub trait PoolRegistry: Send + Sync {
    /// Lists every registered pool, in registry order. No pagination.
    async fn pools(&self) -> Result<Vec<Pool>, SourceError>;
}

/// Staking reward ledger of the underlying protocol.
#[async_trait]
pub trait StakingLedger: Send + Sync {
    /// Returns one entry per asset the given staker has bonded.
    ///
    /// # Parameters
    ///
    /// - `staker`: address whose positions are listed (the farm itself for
    ///   pair statistics)
    async fn reward_infos(&self, staker: &str) -> Result<Vec<RewardInfo>, SourceError>;
}

/// On-chain protocol configuration.
#[async_trait]
pub trait ProtocolConfigSource: Send + Sync {
    async fn protocol_config(&self) -> Result<ProtocolFeeConfig, SourceError>;
}

/// Governance contract owning the warchest ratio and the vault weights.
#[async_trait]
pub trait GovernanceSource: Send + Sync {
    async fn config(&self) -> Result<GovernanceConfig, SourceError>;

    /// Lists every vault registered in governance with its weight.
    async fn vaults(&self) -> Result<Vec<GovernanceVault>, SourceError>;
}

/// Off-chain statistics service.
#[async_trait]
pub trait ExternalStatsSource: Send + Sync {
    /// Global governance APR, shared by every pool of the farm.
    async fn governance_stat(&self) -> Result<GovernanceStat, SourceError>;

    /// Per-asset pool APR figures. Assets without a published APR report 0.
    async fn asset_stats(&self) -> Result<Vec<ExternalAssetStat>, SourceError>;
}
