//! # Pair Stats CLI
//!
//! One-shot computation of the farm's pair statistics.
//!
//! ## Overview
//!
//! This binary:
//! - Loads `Config.toml` (or `--config`) and `.env` overrides
//! - Lists the farm's pools from the registry
//! - Loads liquidity snapshots from `--liquidity` or queries the configured pairs
//! - Runs the aggregation and prints the result
//!
//! ## Usage
//!
//! ```bash
//! RUST_LOG=info cargo run --bin pair_stats -- --format table
//! ```

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use farm_stats_sdk::{
    metrics,
    settings::Settings,
    types::{pools_by_token, PairStat, PoolLiquidity},
    FarmInfoService, MirrorFarmInfo,
};
use log::info;
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::PathBuf;
use std::time::Instant;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Json,
    Table,
}

#[derive(Debug, Parser)]
#[command(name = "pair_stats", about = "Compute APR/APY/TVL statistics for every farm pool")]
struct Args {
    /// Settings file (defaults to ./Config.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// JSON file with liquidity snapshots keyed by asset token
    #[arg(long)]
    liquidity: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
    format: OutputFormat,

    /// Also list the reward positions of this address
    #[arg(long)]
    rewards_of: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    env_logger::init();

    #[cfg(feature = "observability")]
    metrics_exporter_prometheus::PrometheusBuilder::new()
        .install()
        .context("Failed to install Prometheus exporter")?;
    metrics::describe_metrics();

    let args = Args::parse();

    let settings = match &args.config {
        Some(path) => Settings::from_path(path)?,
        None => Settings::new()?,
    };
    info!("Settings loaded for farm {}", settings.farm.address);

    let farm = MirrorFarmInfo::from_settings(&settings)?;
    let start = Instant::now();

    let pools = pools_by_token(farm.query_pool_items().await?);
    info!("{} farm: {} pools in registry", farm.farm_name(), pools.len());

    let liquidity: HashMap<String, PoolLiquidity> = match &args.liquidity {
        Some(path) => {
            let raw = fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            serde_json::from_str(&raw).context("Failed to parse liquidity snapshots")?
        }
        None => farm.query_pool_liquidity(&settings.liquidity.pairs).await?,
    };

    let stats = farm.query_pair_stats(&pools, &liquidity).await?;
    info!("Pair stats ready in {:?}", start.elapsed());

    // Orden estable para la salida
    let ordered: BTreeMap<&String, &PairStat> = stats.iter().collect();
    match args.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&ordered)?),
        OutputFormat::Table => print_table(farm.token_symbol(), &ordered),
    }

    if let Some(owner) = &args.rewards_of {
        let rewards = farm.query_rewards(owner).await?;
        println!("\nRewards of {} ({} positions):", owner, rewards.len());
        for reward in rewards {
            println!(
                "  {}  bond={}  pending_{}={}  pending_spec={}",
                reward.asset_token,
                reward.bond_amount,
                farm.token_symbol().to_lowercase(),
                reward.pending_farm_reward,
                reward.pending_spec_reward
            );
        }
    }

    Ok(())
}

fn print_table(token_symbol: &str, stats: &BTreeMap<&String, &PairStat>) {
    println!(
        "{:<46} {:>9} {:>9} {:>9} {:>20} {:>10} {:>12}",
        "asset token", "pool APR", "pool APY", format!("{} APR", token_symbol), "TVL", "multiplier", "vault fee"
    );
    for (token, stat) in stats {
        println!(
            "{:<46} {:>8.2}% {:>8.2}% {:>8.2}% {:>20} {:>10.4} {:>12.2}",
            token,
            stat.pool_apr * 100.0,
            stat.pool_apy * 100.0,
            stat.farm_apr * 100.0,
            stat.tvl,
            stat.multiplier,
            stat.vault_fee
        );
    }
}
