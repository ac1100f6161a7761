// src/sources/mirror_graph.rs

use crate::stat_source::{ExternalStatsSource, SourceError};
use crate::types::conversions::parse_fraction;
use crate::types::{ExternalAssetStat, GovernanceStat};
use async_trait::async_trait;
use log::{debug, warn};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;

const GOV_STAT_QUERY: &str = r#"query statistic($network: Network) {
  statistic(network: $network) {
    govAPR
  }
}"#;

const ASSETS_QUERY: &str = r#"query assets {
  assets {
    token
    statistic {
      apr { long }
    }
  }
}"#;

const GOV_STAT_SOURCE: &str = "governance_apr";
const ASSETS_SOURCE: &str = "asset_stats";

#[derive(Debug, Deserialize)]
struct GraphResponse<T> {
    data: Option<T>,
    #[serde(default)]
    errors: Vec<GraphError>,
}

#[derive(Debug, Deserialize)]
struct GraphError {
    message: String,
}

#[derive(Debug, Deserialize)]
struct StatisticData {
    statistic: Option<GovStatistic>,
}

#[derive(Debug, Deserialize)]
struct GovStatistic {
    #[serde(rename = "govAPR")]
    gov_apr: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct AssetsData {
    assets: Vec<AssetEntry>,
}

#[derive(Debug, Deserialize)]
struct AssetEntry {
    token: String,
    statistic: Option<AssetStatistic>,
}

#[derive(Debug, Deserialize)]
struct AssetStatistic {
    apr: Option<AprFigure>,
}

#[derive(Debug, Deserialize)]
struct AprFigure {
    long: Option<Value>,
}

/// GraphQL client of the Mirror statistics service.
#[derive(Debug, Clone)]
pub struct MirrorGraphClient {
    url: String,
    network: String,
    client: reqwest::Client,
}

impl MirrorGraphClient {
    pub fn new(url: impl Into<String>, network: impl Into<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            url: url.into(),
            network: network.into(),
            client,
        })
    }

    async fn post<T: DeserializeOwned>(&self, name: &'static str, query: &str, variables: Value) -> Result<GraphResponse<T>, SourceError> {
        let body = json!({ "query": query, "variables": variables });
        let response = self
            .client
            .post(&self.url)
            .json(&body)
            .send()
            .await
            .map_err(|e| SourceError::unavailable(name, format!("HTTP request failed: {}", e)))?;
        if !response.status().is_success() {
            return Err(SourceError::unavailable(name, format!("HTTP error: {}", response.status())));
        }
        response
            .json()
            .await
            .map_err(|e| SourceError::malformed(name, format!("JSON parse failed: {}", e)))
    }
}

#[async_trait]
impl ExternalStatsSource for MirrorGraphClient {
    async fn governance_stat(&self) -> Result<GovernanceStat, SourceError> {
        let res = self
            .post(GOV_STAT_SOURCE, GOV_STAT_QUERY, json!({ "network": self.network }))
            .await?;
        governance_stat_from(res)
    }

    async fn asset_stats(&self) -> Result<Vec<ExternalAssetStat>, SourceError> {
        let res = self.post(ASSETS_SOURCE, ASSETS_QUERY, json!({})).await?;
        asset_stats_from(res)
    }
}

fn data_of<T>(name: &'static str, res: GraphResponse<T>) -> Result<T, SourceError> {
    match res.data {
        Some(data) => {
            if !res.errors.is_empty() {
                warn!("{} returned data with {} GraphQL errors", name, res.errors.len());
            }
            Ok(data)
        }
        None if !res.errors.is_empty() => {
            let messages: Vec<&str> = res.errors.iter().map(|e| e.message.as_str()).collect();
            Err(SourceError::unavailable(name, messages.join("; ")))
        }
        None => Err(SourceError::malformed(name, "data")),
    }
}

// Acepta "0.35" o 0.35
fn fraction_from_value(value: &Value) -> Option<f64> {
    match value {
        Value::String(s) if s.trim().is_empty() => Some(0.0),
        Value::String(s) => parse_fraction(s).ok(),
        Value::Number(n) => n.as_f64(),
        Value::Null => Some(0.0),
        _ => None,
    }
}

fn governance_stat_from(res: GraphResponse<StatisticData>) -> Result<GovernanceStat, SourceError> {
    let data = data_of(GOV_STAT_SOURCE, res)?;
    let raw = data
        .statistic
        .and_then(|s| s.gov_apr)
        .ok_or_else(|| SourceError::malformed(GOV_STAT_SOURCE, "statistic.govAPR"))?;
    match raw {
        Value::Null => Err(SourceError::malformed(GOV_STAT_SOURCE, "statistic.govAPR")),
        other => {
            let gov_apr = fraction_from_value(&other)
                .ok_or_else(|| SourceError::malformed(GOV_STAT_SOURCE, format!("statistic.govAPR = {}", other)))?;
            Ok(GovernanceStat { gov_apr })
        }
    }
}

fn asset_stats_from(res: GraphResponse<AssetsData>) -> Result<Vec<ExternalAssetStat>, SourceError> {
    let data = data_of(ASSETS_SOURCE, res)?;
    let mut stats = Vec::with_capacity(data.assets.len());
    for asset in data.assets {
        let statistic = asset
            .statistic
            .ok_or_else(|| SourceError::malformed(ASSETS_SOURCE, format!("assets[{}].statistic", asset.token)))?;
        // Sin APR publicado => 0
        let pool_apr = match statistic.apr.and_then(|apr| apr.long) {
            Some(long) => fraction_from_value(&long).ok_or_else(|| {
                SourceError::malformed(ASSETS_SOURCE, format!("assets[{}].statistic.apr.long = {}", asset.token, long))
            })?,
            None => 0.0,
        };
        stats.push(ExternalAssetStat {
            token: asset.token,
            pool_apr,
        });
    }
    debug!("Parsed {} asset stats", stats.len());
    Ok(stats)
}
