//! Common types shared by the sources, the derivation and the aggregator.

pub mod conversions;
pub mod farm_data;

pub use farm_data::{
    pools_by_token, AssetInfo, ExternalAssetStat, FarmRewardInfo, GovernanceConfig,
    GovernanceStat, GovernanceVault, PairStat, Pool, PoolAsset, PoolLiquidity,
    ProtocolFeeConfig, RewardInfo,
};
