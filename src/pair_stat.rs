//! # PairStat Builder
//!
//! Pure derivation of [`PairStat`] records. Nothing here performs I/O; the
//! aggregator resolves every shared input first and passes it in through a
//! [`DerivationContext`].
//!
//! ## Formulas
//!
//! - `poolApy = (poolApr / 365 + 1)^365 - 1` (daily compounding)
//! - `multiplier = govWeight * pool.weight / totalWeight`, 0 when the pool is
//!   unknown or `totalWeight` is 0
//! - `tvl = nativeReserve * bondAmount * 2 / totalShare`
//! - `communityFeeRate = communityFee * (1 - warchestRatio)`
//! - `vaultFee = tvl * poolApr * communityFeeRate`

use crate::types::conversions::{decimal_to_f64, ConversionError};
use crate::types::{PairStat, Pool};
use rust_decimal::Decimal;
use std::collections::HashMap;

const DAYS_PER_YEAR: i32 = 365;

/// Shared inputs of every per-token derivation within one aggregation.
#[derive(Debug, Clone)]
pub struct DerivationContext<'a> {
    pub pools: &'a HashMap<String, Pool>,
    pub total_weight: f64,
    pub gov_weight: f64,
    pub farm_apr: f64,
}

impl<'a> DerivationContext<'a> {
    /// Builds the context, summing pool weights once up front.
    pub fn new(pools: &'a HashMap<String, Pool>, gov_weight: f64, farm_apr: f64) -> Self {
        Self {
            pools,
            total_weight: total_weight(pools),
            gov_weight,
            farm_apr,
        }
    }

    pub fn multiplier(&self, token: &str) -> f64 {
        match self.pools.get(token) {
            Some(pool) if self.total_weight > 0.0 => {
                self.gov_weight * pool.weight / self.total_weight
            }
            _ => 0.0,
        }
    }

    /// Base record for `token`; `tvl` and `vault_fee` start at zero.
    pub fn create_pair_stat(&self, pool_apr: f64, token: &str) -> PairStat {
        PairStat {
            pool_apr,
            pool_apy: pool_apy(pool_apr),
            farm_apr: self.farm_apr,
            tvl: Decimal::ZERO,
            multiplier: self.multiplier(token),
            vault_fee: 0.0,
        }
    }
}

pub fn total_weight(pools: &HashMap<String, Pool>) -> f64 {
    pools.values().map(|pool| pool.weight).sum()
}

pub fn pool_apy(pool_apr: f64) -> f64 {
    (pool_apr / DAYS_PER_YEAR as f64 + 1.0).powi(DAYS_PER_YEAR) - 1.0
}

/// Value of the bonded LP shares in the native currency.
///
/// Both legs of the pair are counted, hence the factor 2. Returns `None` when
/// `total_share` is zero or the result does not fit a `Decimal`.
pub fn compute_tvl(native_reserve: Decimal, bond_amount: Decimal, total_share: Decimal) -> Option<Decimal> {
    if total_share.is_zero() {
        return None;
    }
    let two = Decimal::TWO;
    native_reserve
        .checked_mul(bond_amount)
        .and_then(|v| v.checked_mul(two))
        .and_then(|v| v.checked_div(total_share))
        .or_else(|| {
            // reserve * bond overflowed; divide first and accept the rounding
            bond_amount
                .checked_mul(two)
                .and_then(|v| v.checked_div(total_share))
                .and_then(|ratio| native_reserve.checked_mul(ratio))
        })
}

pub fn community_fee_rate(community_fee: Decimal, warchest_ratio: Decimal) -> Result<f64, ConversionError> {
    Ok(decimal_to_f64(community_fee)? * (1.0 - decimal_to_f64(warchest_ratio)?))
}

pub fn vault_fee(tvl: f64, pool_apr: f64, community_fee_rate: f64) -> f64 {
    tvl * pool_apr * community_fee_rate
}
