//! On-chain clients of the Mirror farm, the Mirror staking contract and the
//! farm-side governance contract, all over [`LcdClient`].

use crate::sources::lcd::LcdClient;
use crate::stat_source::{
    GovernanceSource, PoolRegistry, ProtocolConfigSource, SourceError, StakingLedger,
};
use crate::types::{
    FarmRewardInfo, GovernanceConfig, GovernanceVault, Pool, PoolLiquidity, ProtocolFeeConfig,
    RewardInfo,
};
use async_trait::async_trait;
use futures::future::try_join_all;
use log::debug;
use serde::Deserialize;
use serde_json::json;
use std::collections::HashMap;

#[derive(Debug, Deserialize)]
struct PoolsResponse {
    pools: Vec<Pool>,
}

#[derive(Debug, Deserialize)]
struct RewardInfoResponse<T> {
    reward_infos: Vec<T>,
}

#[derive(Debug, Deserialize)]
struct VaultsResponse {
    vaults: Vec<GovernanceVault>,
}

/// The farm contract: pool registry, fee config and per-user rewards.
#[derive(Debug, Clone)]
pub struct MirrorFarmClient {
    lcd: LcdClient,
    contract: String,
}

impl MirrorFarmClient {
    pub fn new(lcd: LcdClient, contract: impl Into<String>) -> Self {
        Self {
            lcd,
            contract: contract.into(),
        }
    }

    pub fn contract(&self) -> &str {
        &self.contract
    }

    /// Reward positions of `owner` in the farm.
    pub async fn reward_info(&self, owner: &str) -> Result<Vec<FarmRewardInfo>, SourceError> {
        let msg = json!({ "reward_info": { "staker_addr": owner } });
        let res: RewardInfoResponse<FarmRewardInfo> =
            self.lcd.query("farm_reward_info", &self.contract, &msg).await?;
        Ok(res.reward_infos)
    }
}

#[async_trait]
impl PoolRegistry for MirrorFarmClient {
    async fn pools(&self) -> Result<Vec<Pool>, SourceError> {
        let res: PoolsResponse = self
            .lcd
            .query("pool_registry", &self.contract, &json!({ "pools": {} }))
            .await?;
        Ok(res.pools)
    }
}

#[async_trait]
impl ProtocolConfigSource for MirrorFarmClient {
    async fn protocol_config(&self) -> Result<ProtocolFeeConfig, SourceError> {
        self.lcd
            .query("protocol_config", &self.contract, &json!({ "config": {} }))
            .await
    }
}

#[derive(Debug, Clone)]
pub struct MirrorStakingClient {
    lcd: LcdClient,
    contract: String,
}

impl MirrorStakingClient {
    pub fn new(lcd: LcdClient, contract: impl Into<String>) -> Self {
        Self {
            lcd,
            contract: contract.into(),
        }
    }
}

#[async_trait]
impl StakingLedger for MirrorStakingClient {
    async fn reward_infos(&self, staker: &str) -> Result<Vec<RewardInfo>, SourceError> {
        let msg = json!({ "reward_info": { "staker_addr": staker } });
        let res: RewardInfoResponse<RewardInfo> =
            self.lcd.query("staking_ledger", &self.contract, &msg).await?;
        Ok(res.reward_infos)
    }
}

#[derive(Debug, Clone)]
pub struct GovClient {
    lcd: LcdClient,
    contract: String,
}

impl GovClient {
    pub fn new(lcd: LcdClient, contract: impl Into<String>) -> Self {
        Self {
            lcd,
            contract: contract.into(),
        }
    }
}

#[async_trait]
impl GovernanceSource for GovClient {
    async fn config(&self) -> Result<GovernanceConfig, SourceError> {
        self.lcd
            .query("governance_config", &self.contract, &json!({ "config": {} }))
            .await
    }

    async fn vaults(&self) -> Result<Vec<GovernanceVault>, SourceError> {
        let res: VaultsResponse = self
            .lcd
            .query("governance_vaults", &self.contract, &json!({ "vaults": {} }))
            .await?;
        Ok(res.vaults)
    }
}

/// Fetches the `{pool:{}}` snapshot of every pair concurrently.
///
/// `pairs` maps asset token to pair contract; the result is keyed by asset
/// token. Any failing pair fails the whole call.
pub async fn query_pool_liquidity(
    lcd: &LcdClient,
    pairs: &HashMap<String, String>,
) -> Result<HashMap<String, PoolLiquidity>, SourceError> {
    let tasks = pairs.iter().map(|(token, pair)| async move {
        let snapshot: PoolLiquidity = lcd.query("pair_pool", pair, &json!({ "pool": {} })).await?;
        Ok::<_, SourceError>((token.clone(), snapshot))
    });
    let snapshots = try_join_all(tasks).await?;
    debug!("Fetched {} pair liquidity snapshots", snapshots.len());
    Ok(snapshots.into_iter().collect())
}
