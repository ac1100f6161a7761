//! # Pair Stats Aggregator
//!
//! The `PairStatAggregator` fans out to every stat source at once, reconciles
//! the answers by asset token and derives one [`PairStat`] per token.
//!
//! ## Pipeline
//!
//! 1. **Fan-out**: staking ledger, protocol config, governance config,
//!    governance vaults, governance APR and per-asset APR are all issued
//!    together. The first failure cancels the rest and fails the call.
//! 2. **Context**: pool weights are summed once, the farm's own vault weight
//!    and the global farm APR are resolved into a [`DerivationContext`].
//! 3. **Seed**: every asset reported by the external stats gets a base record.
//! 4. **TVL fold**: every bonded asset with a liquidity snapshot gets its TVL
//!    and vault fee, in parallel across tokens.
//!
//! Tokens without a liquidity snapshot, without a native-currency leg, with
//! an empty pair or with amounts beyond `Decimal` range are skipped (logged
//! and counted), never escalated.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use farm_stats_sdk::aggregator::PairStatAggregator;
//!
//! let aggregator = PairStatAggregator::new(
//!     farm_address,
//!     "uusd",
//!     staking,
//!     protocol_config,
//!     governance,
//!     external_stats,
//! );
//! let stats = aggregator.compute_pair_stats(&pools, &liquidity).await?;
//! ```

use crate::metrics;
use crate::pair_stat::{community_fee_rate, compute_tvl, vault_fee, DerivationContext};
use crate::stat_source::{
    ExternalStatsSource, GovernanceSource, ProtocolConfigSource, SourceError, StakingLedger,
};
use crate::types::conversions::{amount_to_decimal, decimal_to_f64};
use crate::types::{GovernanceVault, PairStat, Pool, PoolLiquidity};
use dashmap::DashMap;
use log::{debug, info, warn};
use rayon::prelude::*;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

/// Why a bonded token got no TVL / vault fee.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SkipReason {
    MissingLiquidity,
    MissingNativeLeg,
    ZeroTotalShare,
    Unrepresentable,
}

impl SkipReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            SkipReason::MissingLiquidity => "missing_liquidity",
            SkipReason::MissingNativeLeg => "missing_native_leg",
            SkipReason::ZeroTotalShare => "zero_total_share",
            SkipReason::Unrepresentable => "unrepresentable",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TokenOutcome {
    Updated,
    Skipped(SkipReason),
}

/// Computes per-pool statistics from the stat sources.
///
/// Holds no mutable state: every call builds its working map from scratch, so
/// identical source answers yield identical output.
pub struct PairStatAggregator {
    farm_address: String,
    native_denom: String,
    staking: Arc<dyn StakingLedger>,
    protocol: Arc<dyn ProtocolConfigSource>,
    governance: Arc<dyn GovernanceSource>,
    external: Arc<dyn ExternalStatsSource>,
}

impl PairStatAggregator {
    pub fn new(
        farm_address: impl Into<String>,
        native_denom: impl Into<String>,
        staking: Arc<dyn StakingLedger>,
        protocol: Arc<dyn ProtocolConfigSource>,
        governance: Arc<dyn GovernanceSource>,
        external: Arc<dyn ExternalStatsSource>,
    ) -> Self {
        Self {
            farm_address: farm_address.into(),
            native_denom: native_denom.into(),
            staking,
            protocol,
            governance,
            external,
        }
    }

    pub fn farm_address(&self) -> &str {
        &self.farm_address
    }

    /// Computes the [`PairStat`] of every known token.
    ///
    /// # Parameters
    ///
    /// - `pools`: farm pool registry keyed by asset token
    /// - `liquidity`: pair liquidity snapshots keyed by asset token
    ///
    /// # Errors
    ///
    /// Returns the first [`SourceError`] raised by any of the six source
    /// calls. No partial map is returned in that case.
    pub async fn compute_pair_stats(
        &self,
        pools: &HashMap<String, Pool>,
        liquidity: &HashMap<String, PoolLiquidity>,
    ) -> Result<HashMap<String, PairStat>, SourceError> {
        let start = Instant::now();

        let (reward_infos, protocol_config, gov_config, gov_vaults, gov_stat, asset_stats) = tokio::try_join!(
            timed("staking_ledger", self.staking.reward_infos(&self.farm_address)),
            timed("protocol_config", self.protocol.protocol_config()),
            timed("governance_config", self.governance.config()),
            timed("governance_vaults", self.governance.vaults()),
            timed("governance_apr", self.external.governance_stat()),
            timed("asset_stats", self.external.asset_stats()),
        )?;

        let gov_weight = farm_vault_weight(&gov_vaults, &self.farm_address);
        let ctx = DerivationContext::new(pools, gov_weight, gov_stat.gov_apr);
        debug!(
            "Derivation context: total_weight={} gov_weight={} farm_apr={}",
            ctx.total_weight, ctx.gov_weight, ctx.farm_apr
        );

        let stats: DashMap<String, PairStat> = DashMap::with_capacity(asset_stats.len());
        for asset in &asset_stats {
            stats.insert(asset.token.clone(), ctx.create_pair_stat(asset.pool_apr, &asset.token));
        }

        let fee_rate = community_fee_rate(protocol_config.community_fee_rate, gov_config.warchest_ratio)
            .map_err(|e| SourceError::malformed("protocol_config", e))?;

        // Una entrada por token: la última gana
        let bonded: HashMap<&str, u128> = reward_infos
            .iter()
            .map(|info| (info.asset_token.as_str(), info.bond_amount))
            .collect();

        let outcomes: Vec<TokenOutcome> = bonded
            .par_iter()
            .map(|(token, bond_amount)| {
                self.apply_bonded(&stats, &ctx, liquidity, token, *bond_amount, fee_rate)
            })
            .collect();

        let updated = outcomes.iter().filter(|o| **o == TokenOutcome::Updated).count();
        let skipped = outcomes.len() - updated;

        let result: HashMap<String, PairStat> = stats.into_iter().collect();
        let elapsed = start.elapsed();
        metrics::record_aggregation(elapsed, result.len());
        info!(
            "Computed {} pair stats ({} with TVL, {} skipped) in {:?}",
            result.len(),
            updated,
            skipped,
            elapsed
        );
        Ok(result)
    }

    /// TVL then vault fee for one token. Only this task touches `token`.
    fn apply_bonded(
        &self,
        stats: &DashMap<String, PairStat>,
        ctx: &DerivationContext<'_>,
        liquidity: &HashMap<String, PoolLiquidity>,
        token: &str,
        bond_amount: u128,
        fee_rate: f64,
    ) -> TokenOutcome {
        let outcome = match derive_tvl(liquidity.get(token), &self.native_denom, bond_amount) {
            Ok((tvl, tvl_value)) => {
                let mut pair = stats
                    .entry(token.to_string())
                    .or_insert_with(|| ctx.create_pair_stat(0.0, token));
                pair.tvl = tvl;
                pair.vault_fee = vault_fee(tvl_value, pair.pool_apr, fee_rate);
                TokenOutcome::Updated
            }
            Err(reason) => TokenOutcome::Skipped(reason),
        };

        if let TokenOutcome::Skipped(reason) = outcome {
            warn!("Skipping TVL for {}: {}", token, reason.as_str());
            metrics::increment_skipped_token(reason.as_str());
        }
        outcome
    }
}

fn derive_tvl(
    snapshot: Option<&PoolLiquidity>,
    native_denom: &str,
    bond_amount: u128,
) -> Result<(Decimal, f64), SkipReason> {
    let snapshot = snapshot.ok_or(SkipReason::MissingLiquidity)?;
    let native_reserve = snapshot
        .native_reserve(native_denom)
        .ok_or(SkipReason::MissingNativeLeg)?;
    if snapshot.total_share == 0 {
        return Err(SkipReason::ZeroTotalShare);
    }
    let to_decimal = |amount: u128| amount_to_decimal(amount).map_err(|_| SkipReason::Unrepresentable);
    let tvl = compute_tvl(
        to_decimal(native_reserve)?,
        to_decimal(bond_amount)?,
        to_decimal(snapshot.total_share)?,
    )
    .ok_or(SkipReason::Unrepresentable)?;
    let tvl_value = decimal_to_f64(tvl).map_err(|_| SkipReason::Unrepresentable)?;
    Ok((tvl, tvl_value))
}

/// Weight of the vault registered under `farm_address`, 0 when absent.
pub fn farm_vault_weight(vaults: &[GovernanceVault], farm_address: &str) -> f64 {
    vaults
        .iter()
        .find(|vault| vault.address == farm_address)
        .map(|vault| vault.weight)
        .unwrap_or(0.0)
}

async fn timed<T, F>(name: &'static str, call: F) -> Result<T, SourceError>
where
    F: Future<Output = Result<T, SourceError>>,
{
    let start = Instant::now();
    let result = call.await;
    let elapsed = start.elapsed();
    metrics::record_source_latency(name, elapsed);
    match &result {
        Ok(_) => debug!("{} resolved in {:?}", name, elapsed),
        Err(e) => {
            let kind = match e {
                SourceError::SourceUnavailable { .. } => "unavailable",
                SourceError::MalformedResponse { .. } => "malformed",
            };
            metrics::increment_source_failure(name, kind);
            warn!("{} failed after {:?}: {}", name, elapsed, e);
        }
    }
    result
}
