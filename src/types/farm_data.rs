use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// Cantidades on-chain (Uint128) viajan como strings decimales
mod uint128_serde {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(amount: &u128, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&amount.to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<u128, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.trim().parse().map_err(serde::de::Error::custom)
    }
}

/// A pool registered in the farm, keyed by its underlying asset token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pool {
    #[serde(alias = "asset_token")]
    pub token: String,
    /// Registry weight, a share of the farm's reward emission
    pub weight: f64,
}

/// Bonded position of one staker in one asset pool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RewardInfo {
    pub asset_token: String,
    #[serde(with = "uint128_serde")]
    pub bond_amount: u128,
}

/// Reward position of an individual user in the farm contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FarmRewardInfo {
    pub asset_token: String,
    #[serde(default, with = "uint128_serde")]
    pub bond_amount: u128,
    #[serde(default, with = "uint128_serde")]
    pub pending_farm_reward: u128,
    #[serde(default, with = "uint128_serde")]
    pub pending_spec_reward: u128,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetInfo {
    Token { contract_addr: String },
    NativeToken { denom: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoolAsset {
    pub info: AssetInfo,
    #[serde(with = "uint128_serde")]
    pub amount: u128,
}

/// Liquidity snapshot of an AMM pair (`{pool:{}}` response).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoolLiquidity {
    pub assets: Vec<PoolAsset>,
    #[serde(with = "uint128_serde")]
    pub total_share: u128,
}

impl PoolLiquidity {
    /// Reserve of the native-currency leg, if the pair has one.
    pub fn native_reserve(&self, denom: &str) -> Option<u128> {
        self.assets.iter().find_map(|asset| match &asset.info {
            AssetInfo::NativeToken { denom: d } if d == denom => Some(asset.amount),
            _ => None,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProtocolFeeConfig {
    #[serde(alias = "community_fee")]
    pub community_fee_rate: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GovernanceConfig {
    pub warchest_ratio: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GovernanceVault {
    pub address: String,
    pub weight: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExternalAssetStat {
    pub token: String,
    pub pool_apr: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GovernanceStat {
    pub gov_apr: f64,
}

/// Derived statistics of one pool.
///
/// Rates are fractions (0.1 = 10%). `tvl` is denominated in the native
/// currency's smallest unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PairStat {
    pub pool_apr: f64,
    pub pool_apy: f64,
    pub farm_apr: f64,
    pub tvl: Decimal,
    pub multiplier: f64,
    pub vault_fee: f64,
}

/// Keys a pool registry listing by asset token. Later duplicates replace earlier ones.
pub fn pools_by_token(items: Vec<Pool>) -> HashMap<String, Pool> {
    items
        .into_iter()
        .map(|pool| (pool.token.clone(), pool))
        .collect()
}
