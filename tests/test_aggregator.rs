//! Integration tests for the pair stats aggregator
//!
//! Tests cover:
//! - Multiplier, APY, TVL and vault fee derivation
//! - Tokens missing from pools, liquidity or external stats
//! - All-or-nothing failure when a source fails
//! - Concurrent issue of every source call
//!
//! Sources are in-memory mocks; no network access.

use async_trait::async_trait;
use farm_stats_sdk::aggregator::PairStatAggregator;
use farm_stats_sdk::stat_source::{
    ExternalStatsSource, GovernanceSource, ProtocolConfigSource, SourceError, StakingLedger,
};
use farm_stats_sdk::types::{
    AssetInfo, ExternalAssetStat, GovernanceConfig, GovernanceStat, GovernanceVault, Pool,
    PoolAsset, PoolLiquidity, ProtocolFeeConfig, RewardInfo,
};
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::str::FromStr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Barrier;

const FARM: &str = "terra1farm";
const TOKEN_X: &str = "terra1tokenx";
const TOKEN_Y: &str = "terra1tokeny";

#[derive(Clone, Copy, PartialEq)]
enum Failing {
    None,
    Staking,
    ProtocolConfig,
    GovernanceConfig,
    Vaults,
    GovApr,
    AssetStats,
}

struct MockSources {
    reward_infos: Vec<RewardInfo>,
    community_fee: Decimal,
    warchest_ratio: Decimal,
    vaults: Vec<GovernanceVault>,
    gov_apr: f64,
    asset_stats: Vec<ExternalAssetStat>,
    failing: Failing,
    malformed: bool,
    barrier: Option<Barrier>,
    calls: AtomicUsize,
}

impl MockSources {
    fn new() -> Self {
        Self {
            reward_infos: vec![],
            community_fee: dec("0.02"),
            warchest_ratio: dec("0.5"),
            vaults: vec![
                GovernanceVault { address: "terra1othervault".into(), weight: 9.0 },
                GovernanceVault { address: FARM.into(), weight: 5.0 },
            ],
            gov_apr: 0.42,
            asset_stats: vec![],
            failing: Failing::None,
            malformed: false,
            barrier: None,
            calls: AtomicUsize::new(0),
        }
    }

    async fn enter(&self, which: Failing, name: &'static str) -> Result<(), SourceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(barrier) = &self.barrier {
            barrier.wait().await;
        }
        if self.failing == which {
            if self.malformed {
                return Err(SourceError::malformed(name, "result"));
            }
            return Err(SourceError::unavailable(name, "connection refused"));
        }
        Ok(())
    }
}

#[async_trait]
impl StakingLedger for MockSources {
    async fn reward_infos(&self, staker: &str) -> Result<Vec<RewardInfo>, SourceError> {
        assert_eq!(staker, FARM, "staking ledger must be queried for the farm itself");
        self.enter(Failing::Staking, "staking_ledger").await?;
        Ok(self.reward_infos.clone())
    }
}

#[async_trait]
impl ProtocolConfigSource for MockSources {
    async fn protocol_config(&self) -> Result<ProtocolFeeConfig, SourceError> {
        self.enter(Failing::ProtocolConfig, "protocol_config").await?;
        Ok(ProtocolFeeConfig { community_fee_rate: self.community_fee })
    }
}

#[async_trait]
impl GovernanceSource for MockSources {
    async fn config(&self) -> Result<GovernanceConfig, SourceError> {
        self.enter(Failing::GovernanceConfig, "governance_config").await?;
        Ok(GovernanceConfig { warchest_ratio: self.warchest_ratio })
    }

    async fn vaults(&self) -> Result<Vec<GovernanceVault>, SourceError> {
        self.enter(Failing::Vaults, "governance_vaults").await?;
        Ok(self.vaults.clone())
    }
}

#[async_trait]
impl ExternalStatsSource for MockSources {
    async fn governance_stat(&self) -> Result<GovernanceStat, SourceError> {
        self.enter(Failing::GovApr, "governance_apr").await?;
        Ok(GovernanceStat { gov_apr: self.gov_apr })
    }

    async fn asset_stats(&self) -> Result<Vec<ExternalAssetStat>, SourceError> {
        self.enter(Failing::AssetStats, "asset_stats").await?;
        Ok(self.asset_stats.clone())
    }
}

fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn aggregator(sources: Arc<MockSources>) -> PairStatAggregator {
    PairStatAggregator::new(
        FARM,
        "uusd",
        sources.clone(),
        sources.clone(),
        sources.clone(),
        sources,
    )
}

fn pools(entries: &[(&str, f64)]) -> HashMap<String, Pool> {
    entries
        .iter()
        .map(|(token, weight)| (token.to_string(), Pool { token: token.to_string(), weight: *weight }))
        .collect()
}

fn liquidity(token: &str, native_reserve: u128, total_share: u128) -> (String, PoolLiquidity) {
    (
        token.to_string(),
        PoolLiquidity {
            assets: vec![
                PoolAsset {
                    info: AssetInfo::Token { contract_addr: token.to_string() },
                    amount: 777,
                },
                PoolAsset {
                    info: AssetInfo::NativeToken { denom: "uusd".to_string() },
                    amount: native_reserve,
                },
            ],
            total_share,
        },
    )
}

fn apr(token: &str, pool_apr: f64) -> ExternalAssetStat {
    ExternalAssetStat { token: token.to_string(), pool_apr }
}

fn bonded(token: &str, amount: u128) -> RewardInfo {
    RewardInfo { asset_token: token.to_string(), bond_amount: amount }
}

/// Seeded token gets multiplier and APY from its external APR, zero TVL
#[tokio::test]
async fn test_multiplier_and_apy_from_seed() {
    let mut sources = MockSources::new();
    sources.asset_stats = vec![apr(TOKEN_X, 0.1)];
    let agg = aggregator(Arc::new(sources));

    let stats = agg
        .compute_pair_stats(&pools(&[(TOKEN_X, 10.0)]), &HashMap::new())
        .await
        .unwrap();

    let x = &stats[TOKEN_X];
    assert_eq!(x.multiplier, 5.0, "5 * 10 / 10");
    assert!((x.pool_apy - 0.10516).abs() < 1e-5, "apy = {}", x.pool_apy);
    assert_eq!(x.pool_apr, 0.1);
    assert_eq!(x.farm_apr, 0.42, "farm APR is the global governance APR");
    assert_eq!(x.tvl, Decimal::ZERO);
    assert_eq!(x.vault_fee, 0.0);
}

/// Bonded token with a liquidity snapshot gets TVL and vault fee
#[tokio::test]
async fn test_tvl_and_vault_fee() {
    let mut sources = MockSources::new();
    sources.asset_stats = vec![apr(TOKEN_X, 0.1)];
    sources.reward_infos = vec![bonded(TOKEN_X, 1000)];
    let agg = aggregator(Arc::new(sources));

    let liquidity: HashMap<_, _> = [liquidity(TOKEN_X, 500, 2000)].into_iter().collect();
    let stats = agg
        .compute_pair_stats(&pools(&[(TOKEN_X, 10.0)]), &liquidity)
        .await
        .unwrap();

    let x = &stats[TOKEN_X];
    assert_eq!(x.tvl, Decimal::from(500), "500 * 1000 * 2 / 2000");
    assert!((x.vault_fee - 0.5).abs() < 1e-9, "vault fee = {}", x.vault_fee);
}

/// Bonded token unknown to the external stats is created with APR 0
#[tokio::test]
async fn test_bonded_token_without_external_stat() {
    let mut sources = MockSources::new();
    sources.reward_infos = vec![bonded(TOKEN_Y, 300)];
    let agg = aggregator(Arc::new(sources));

    let liquidity: HashMap<_, _> = [liquidity(TOKEN_Y, 1000, 600)].into_iter().collect();
    let stats = agg
        .compute_pair_stats(&pools(&[(TOKEN_X, 1.0), (TOKEN_Y, 3.0)]), &liquidity)
        .await
        .unwrap();

    let y = &stats[TOKEN_Y];
    assert_eq!(y.pool_apr, 0.0);
    assert_eq!(y.pool_apy, 0.0);
    assert_eq!(y.tvl, Decimal::from(1000));
    assert_eq!(y.vault_fee, 0.0);
    assert_eq!(y.multiplier, 3.75, "5 * 3 / 4");
    assert!(!stats.contains_key(TOKEN_X));
}

/// Pooled token without reward info keeps a zero TVL, or gets no entry at all
#[tokio::test]
async fn test_pool_without_reward_info() {
    let mut sources = MockSources::new();
    sources.asset_stats = vec![apr(TOKEN_X, 0.2)];
    let agg = aggregator(Arc::new(sources));

    let liquidity: HashMap<_, _> = [liquidity(TOKEN_X, 500, 2000), liquidity(TOKEN_Y, 500, 2000)]
        .into_iter()
        .collect();
    let stats = agg
        .compute_pair_stats(&pools(&[(TOKEN_X, 1.0), (TOKEN_Y, 1.0)]), &liquidity)
        .await
        .unwrap();

    assert_eq!(stats.len(), 1);
    assert_eq!(stats[TOKEN_X].tvl, Decimal::ZERO);
    assert_eq!(stats[TOKEN_X].vault_fee, 0.0);
    assert!(!stats.contains_key(TOKEN_Y), "no seed and no reward info => no entry");
}

/// Missing liquidity snapshot or native leg is a soft skip
#[tokio::test]
async fn test_missing_liquidity_is_skipped() {
    let mut sources = MockSources::new();
    sources.asset_stats = vec![apr(TOKEN_X, 0.1)];
    sources.reward_infos = vec![bonded(TOKEN_X, 1000), bonded(TOKEN_Y, 1000)];
    let agg = aggregator(Arc::new(sources));

    let (_, mut no_native) = liquidity(TOKEN_X, 500, 2000);
    no_native.assets.retain(|a| !matches!(a.info, AssetInfo::NativeToken { .. }));
    let liquidity: HashMap<_, _> = [(TOKEN_X.to_string(), no_native)].into_iter().collect();

    let stats = agg
        .compute_pair_stats(&pools(&[(TOKEN_X, 1.0)]), &liquidity)
        .await
        .unwrap();

    assert_eq!(stats.len(), 1);
    assert_eq!(stats[TOKEN_X].tvl, Decimal::ZERO);
    assert!(!stats.contains_key(TOKEN_Y), "no liquidity snapshot => token skipped");
}

/// Zero total weight never divides by zero
#[tokio::test]
async fn test_zero_total_weight() {
    let mut sources = MockSources::new();
    sources.asset_stats = vec![apr(TOKEN_X, 0.1), apr(TOKEN_Y, 0.3)];
    let agg = aggregator(Arc::new(sources));

    for pools in [pools(&[(TOKEN_X, 0.0), (TOKEN_Y, 0.0)]), HashMap::new()] {
        let stats = agg.compute_pair_stats(&pools, &HashMap::new()).await.unwrap();
        assert_eq!(stats.len(), 2);
        for stat in stats.values() {
            assert_eq!(stat.multiplier, 0.0);
            assert!(stat.pool_apy.is_finite());
        }
    }
}

/// Farm vault absent from governance => multiplier 0
#[tokio::test]
async fn test_missing_farm_vault() {
    let mut sources = MockSources::new();
    sources.vaults.retain(|v| v.address != FARM);
    sources.asset_stats = vec![apr(TOKEN_X, 0.1)];
    let agg = aggregator(Arc::new(sources));

    let stats = agg
        .compute_pair_stats(&pools(&[(TOKEN_X, 10.0)]), &HashMap::new())
        .await
        .unwrap();
    assert_eq!(stats[TOKEN_X].multiplier, 0.0);
}

/// Any failing source fails the whole computation
#[tokio::test]
async fn test_any_source_failure_fails_call() {
    let cases = [
        (Failing::Staking, "staking_ledger"),
        (Failing::ProtocolConfig, "protocol_config"),
        (Failing::GovernanceConfig, "governance_config"),
        (Failing::Vaults, "governance_vaults"),
        (Failing::GovApr, "governance_apr"),
        (Failing::AssetStats, "asset_stats"),
    ];
    for (failing, name) in cases {
        let mut sources = MockSources::new();
        sources.asset_stats = vec![apr(TOKEN_X, 0.1)];
        sources.reward_infos = vec![bonded(TOKEN_X, 1000)];
        sources.failing = failing;
        let agg = aggregator(Arc::new(sources));

        let liquidity: HashMap<_, _> = [liquidity(TOKEN_X, 500, 2000)].into_iter().collect();
        let err = agg
            .compute_pair_stats(&pools(&[(TOKEN_X, 10.0)]), &liquidity)
            .await
            .unwrap_err();
        assert_eq!(err, SourceError::unavailable(name, "connection refused"));
        assert_eq!(err.source_name(), name);
    }
}

/// A malformed answer reaches the caller unchanged
#[tokio::test]
async fn test_malformed_response_fails_call() {
    for (failing, name) in [(Failing::Staking, "staking_ledger"), (Failing::AssetStats, "asset_stats")] {
        let mut sources = MockSources::new();
        sources.asset_stats = vec![apr(TOKEN_X, 0.1)];
        sources.failing = failing;
        sources.malformed = true;
        let agg = aggregator(Arc::new(sources));

        let err = agg
            .compute_pair_stats(&pools(&[(TOKEN_X, 10.0)]), &HashMap::new())
            .await
            .unwrap_err();
        assert_eq!(err, SourceError::malformed(name, "result"));
        assert!(matches!(err, SourceError::MalformedResponse { .. }));
    }
}

/// Amounts beyond Decimal range skip only their own token
#[tokio::test]
async fn test_oversized_amount_skips_token() {
    let huge: u128 = "340282366920938463463374607431768211455".parse().unwrap();
    let mut sources = MockSources::new();
    sources.asset_stats = vec![apr(TOKEN_X, 0.1), apr(TOKEN_Y, 0.2)];
    sources.reward_infos = vec![bonded(TOKEN_X, 1000), bonded(TOKEN_Y, huge)];
    let agg = aggregator(Arc::new(sources));

    let liquidity: HashMap<_, _> = [liquidity(TOKEN_X, 500, 2000), liquidity(TOKEN_Y, 500, 2000)]
        .into_iter()
        .collect();
    let stats = agg
        .compute_pair_stats(&pools(&[(TOKEN_X, 1.0), (TOKEN_Y, 1.0)]), &liquidity)
        .await
        .unwrap();

    assert_eq!(stats[TOKEN_X].tvl, Decimal::from(500));
    assert_eq!(stats[TOKEN_Y].tvl, Decimal::ZERO);
    assert_eq!(stats[TOKEN_Y].vault_fee, 0.0);
    assert_eq!(stats[TOKEN_Y].pool_apr, 0.2);

    // 1e29 total share does not fit a Decimal either
    let huge_share: HashMap<_, _> = [self::liquidity(TOKEN_X, 500, 10u128.pow(29))].into_iter().collect();
    let stats = agg
        .compute_pair_stats(&pools(&[(TOKEN_X, 1.0)]), &huge_share)
        .await
        .unwrap();
    assert_eq!(stats[TOKEN_X].tvl, Decimal::ZERO);
}

/// All six calls are in flight at the same time: a six-party barrier only opens if none waits on another
#[tokio::test]
async fn test_sources_are_queried_concurrently() {
    let mut sources = MockSources::new();
    sources.asset_stats = vec![apr(TOKEN_X, 0.1)];
    sources.barrier = Some(Barrier::new(6));
    let sources = Arc::new(sources);
    let agg = aggregator(sources.clone());

    let pools = pools(&[(TOKEN_X, 10.0)]);
    let stats = tokio::time::timeout(
        Duration::from_secs(5),
        agg.compute_pair_stats(&pools, &HashMap::new()),
    )
    .await
    .expect("source calls were serialized")
    .unwrap();

    assert_eq!(stats.len(), 1);
    assert_eq!(sources.calls.load(Ordering::SeqCst), 6);
}

/// Same inputs, same output
#[tokio::test]
async fn test_idempotent() {
    let mut sources = MockSources::new();
    sources.asset_stats = vec![apr(TOKEN_X, 0.1), apr(TOKEN_Y, 0.25)];
    sources.reward_infos = vec![bonded(TOKEN_X, 1000), bonded(TOKEN_Y, 40)];
    let agg = aggregator(Arc::new(sources));

    let pools = pools(&[(TOKEN_X, 2.0), (TOKEN_Y, 7.0)]);
    let liquidity: HashMap<_, _> = [liquidity(TOKEN_X, 500, 2000), liquidity(TOKEN_Y, 90, 30)]
        .into_iter()
        .collect();

    let first = agg.compute_pair_stats(&pools, &liquidity).await.unwrap();
    let second = agg.compute_pair_stats(&pools, &liquidity).await.unwrap();
    assert_eq!(first, second);
    assert_eq!(first[TOKEN_Y].tvl, Decimal::from(240));
}

/// Duplicate reward infos for one token: the last entry wins
#[tokio::test]
async fn test_duplicate_reward_info_last_wins() {
    let mut sources = MockSources::new();
    sources.reward_infos = vec![bonded(TOKEN_X, 1000), bonded(TOKEN_X, 2000)];
    let agg = aggregator(Arc::new(sources));

    let liquidity: HashMap<_, _> = [liquidity(TOKEN_X, 500, 2000)].into_iter().collect();
    let stats = agg
        .compute_pair_stats(&pools(&[(TOKEN_X, 1.0)]), &liquidity)
        .await
        .unwrap();
    assert_eq!(stats[TOKEN_X].tvl, Decimal::from(1000));
}
