//! # Farm Info Service
//!
//! Per-farm entry point used by callers: identity of the farm, its pool
//! registry, the aggregated pair statistics and per-user rewards.

use crate::aggregator::PairStatAggregator;
use crate::settings::Settings;
use crate::sources::lcd::LcdClientError;
use crate::sources::{
    query_pool_liquidity, GovClient, LcdClient, MirrorFarmClient, MirrorGraphClient,
    MirrorStakingClient,
};
use crate::stat_source::{PoolRegistry, SourceError};
use crate::types::{FarmRewardInfo, PairStat, Pool, PoolLiquidity};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

/// A yield farm whose pools can be listed and scored.
#[async_trait]
pub trait FarmInfoService: Send + Sync {
    /// Display name of the farm (e.g. "Mirror").
    fn farm_name(&self) -> &str;

    /// Symbol of the token the farm rewards in.
    fn token_symbol(&self) -> &str;

    fn farm_contract(&self) -> &str;

    async fn query_pool_items(&self) -> Result<Vec<Pool>, SourceError>;

    /// See [`PairStatAggregator::compute_pair_stats`].
    async fn query_pair_stats(
        &self,
        pools: &HashMap<String, Pool>,
        liquidity: &HashMap<String, PoolLiquidity>,
    ) -> Result<HashMap<String, PairStat>, SourceError>;

    /// Reward positions of `owner` in this farm.
    async fn query_rewards(&self, owner: &str) -> Result<Vec<FarmRewardInfo>, SourceError>;
}

#[derive(Debug, thiserror::Error)]
pub enum FarmInfoError {
    #[error(transparent)]
    Lcd(#[from] LcdClientError),
    #[error("Failed to create GraphQL client: {0}")]
    Graph(#[from] reqwest::Error),
}

/// Mirror farm wired to the LCD and the Mirror statistics service.
pub struct MirrorFarmInfo {
    name: String,
    token_symbol: String,
    lcd: LcdClient,
    farm: Arc<MirrorFarmClient>,
    aggregator: PairStatAggregator,
}

impl MirrorFarmInfo {
    pub fn from_settings(settings: &Settings) -> Result<Self, FarmInfoError> {
        let timeout = Duration::from_millis(settings.endpoints.request_timeout_ms);
        let lcd = LcdClient::new(&settings.endpoints.lcd_url, timeout)?;
        let graph = MirrorGraphClient::new(
            settings.endpoints.graph_url.clone(),
            settings.endpoints.network.clone(),
            timeout,
        )?;

        let farm = Arc::new(MirrorFarmClient::new(lcd.clone(), settings.farm.address.clone()));
        let staking = Arc::new(MirrorStakingClient::new(
            lcd.clone(),
            settings.contracts.mirror_staking.clone(),
        ));
        let gov = Arc::new(GovClient::new(lcd.clone(), settings.contracts.gov.clone()));

        let aggregator = PairStatAggregator::new(
            settings.farm.address.clone(),
            settings.liquidity.native_denom.clone(),
            staking,
            farm.clone(),
            gov,
            Arc::new(graph),
        );

        Ok(Self {
            name: settings.farm.name.clone(),
            token_symbol: settings.farm.token_symbol.clone(),
            lcd,
            farm,
            aggregator,
        })
    }

    /// Liquidity snapshots of the given pairs (asset token -> pair contract).
    pub async fn query_pool_liquidity(
        &self,
        pairs: &HashMap<String, String>,
    ) -> Result<HashMap<String, PoolLiquidity>, SourceError> {
        query_pool_liquidity(&self.lcd, pairs).await
    }
}

#[async_trait]
impl FarmInfoService for MirrorFarmInfo {
    fn farm_name(&self) -> &str {
        &self.name
    }

    fn token_symbol(&self) -> &str {
        &self.token_symbol
    }

    fn farm_contract(&self) -> &str {
        self.farm.contract()
    }

    async fn query_pool_items(&self) -> Result<Vec<Pool>, SourceError> {
        self.farm.pools().await
    }

    async fn query_pair_stats(
        &self,
        pools: &HashMap<String, Pool>,
        liquidity: &HashMap<String, PoolLiquidity>,
    ) -> Result<HashMap<String, PairStat>, SourceError> {
        self.aggregator.compute_pair_stats(pools, liquidity).await
    }

    async fn query_rewards(&self, owner: &str) -> Result<Vec<FarmRewardInfo>, SourceError> {
        self.farm.reward_info(owner).await
    }
}
