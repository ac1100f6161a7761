//! # Basic SDK Setup Example
//!
//! This example demonstrates how to wire the Farm Stats SDK by hand:
//! - Settings configuration
//! - LCD and GraphQL clients
//! - Stat source clients
//! - Pair stats aggregation
//!
//! ## Prerequisites
//!
//! - A `Config.toml` in the working directory (see the repository root)
//! - Network access to the configured LCD and GraphQL endpoints
//!
//! ## Usage
//!
//! ```bash
//! cargo run --example basic_setup
//! ```

use anyhow::Result;
use farm_stats_sdk::{
    aggregator::PairStatAggregator,
    settings::Settings,
    sources::{
        query_pool_liquidity, GovClient, LcdClient, MirrorFarmClient, MirrorGraphClient,
        MirrorStakingClient,
    },
    stat_source::PoolRegistry,
    types::pools_by_token,
};
use std::sync::Arc;
use std::time::Duration;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    env_logger::init();

    println!("🚀 Initializing Farm Stats SDK...");

    // 1. Load settings from config file or environment
    let settings = Settings::new()?;
    println!("✅ Settings loaded");

    // 2. Transport clients
    let timeout = Duration::from_millis(settings.endpoints.request_timeout_ms);
    let lcd = LcdClient::new(&settings.endpoints.lcd_url, timeout)?;
    let graph = MirrorGraphClient::new(
        settings.endpoints.graph_url.clone(),
        settings.endpoints.network.clone(),
        timeout,
    )?;
    println!("✅ LCD and GraphQL clients created");

    // 3. Stat sources
    let farm = Arc::new(MirrorFarmClient::new(lcd.clone(), settings.farm.address.clone()));
    let staking = Arc::new(MirrorStakingClient::new(lcd.clone(), settings.contracts.mirror_staking.clone()));
    let gov = Arc::new(GovClient::new(lcd.clone(), settings.contracts.gov.clone()));
    println!("✅ Stat sources created");

    // 4. Aggregator
    let aggregator = PairStatAggregator::new(
        settings.farm.address.clone(),
        settings.liquidity.native_denom.clone(),
        staking,
        farm.clone(),
        gov,
        Arc::new(graph),
    );

    // 5. Caller-side inputs: registry and liquidity snapshots
    let pools = pools_by_token(farm.pools().await?);
    let liquidity = query_pool_liquidity(&lcd, &settings.liquidity.pairs).await?;
    println!("✅ {} pools, {} liquidity snapshots", pools.len(), liquidity.len());

    // 6. Aggregate
    let stats = aggregator.compute_pair_stats(&pools, &liquidity).await?;
    for (token, stat) in &stats {
        println!(
            "  {}  apr={:.4} apy={:.4} tvl={} multiplier={:.4}",
            token, stat.pool_apr, stat.pool_apy, stat.tvl, stat.multiplier
        );
    }

    println!("\n🎉 Done: {} pair stats", stats.len());
    Ok(())
}
