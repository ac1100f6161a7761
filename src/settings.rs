use config::{Config, ConfigError, File};
use serde::Deserialize;
use serde_json;
use std::collections::HashMap;
use std::env;
use std::path::Path;

#[derive(Debug, Deserialize, Clone)]
pub struct Farm {
    #[serde(default = "default_farm_name")]
    pub name: String,
    #[serde(default = "default_token_symbol")]
    pub token_symbol: String,
    /// This farm's own contract address: staker of record and governance vault key
    pub address: String,
    #[serde(default)]
    pub reward_token: Option<String>,
}

fn default_farm_name() -> String {
    "Mirror".to_string()
}
fn default_token_symbol() -> String {
    "MIR".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct Contracts {
    pub mirror_staking: String,
    #[serde(default)]
    pub mirror_gov: Option<String>,
    /// Governance contract holding the vault weights and warchest ratio
    pub gov: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct Endpoints {
    #[serde(default = "default_lcd_url")]
    pub lcd_url: String,
    #[serde(default = "default_graph_url")]
    pub graph_url: String,
    #[serde(default = "default_network")]
    pub network: String,
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

fn default_lcd_url() -> String {
    "https://lcd.terra.dev".to_string()
}
fn default_graph_url() -> String {
    "https://graph.mirror.finance/graphql".to_string()
}
fn default_network() -> String {
    "TERRA".to_string()
}
fn default_request_timeout_ms() -> u64 {
    10_000
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            lcd_url: default_lcd_url(),
            graph_url: default_graph_url(),
            network: default_network(),
            request_timeout_ms: default_request_timeout_ms(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct Liquidity {
    #[serde(default = "default_native_denom")]
    pub native_denom: String,
    /// asset token -> AMM pair contract
    #[serde(default)]
    pub pairs: HashMap<String, String>,
}

fn default_native_denom() -> String {
    "uusd".to_string()
}

impl Default for Liquidity {
    fn default() -> Self {
        Self {
            native_denom: default_native_denom(),
            pairs: HashMap::new(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub farm: Farm,
    pub contracts: Contracts,
    #[serde(default)]
    pub endpoints: Endpoints,
    #[serde(default)]
    pub liquidity: Liquidity,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        Self::load(File::with_name("Config.toml"))
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::load(File::from(path.as_ref()))
    }

    fn load<S>(source: S) -> Result<Self, ConfigError>
    where
        S: config::Source + Send + Sync + 'static,
    {
        let s = Config::builder().add_source(source).build()?;
        let mut settings: Self = s.try_deserialize()?;
        apply_env_overrides(&mut settings)?;
        Ok(settings)
    }
}

fn apply_env_overrides(settings: &mut Settings) -> Result<(), ConfigError> {
    if let Some(url) = non_empty_env("FARM_STATS_LCD_URL") {
        settings.endpoints.lcd_url = url;
    }
    if let Some(url) = non_empty_env("FARM_STATS_GRAPH_URL") {
        settings.endpoints.graph_url = url;
    }
    if let Some(address) = non_empty_env("FARM_STATS_FARM_ADDRESS") {
        settings.farm.address = address;
    }

    // JSON: { asset_token: pair_contract }
    if let Some(raw_pairs) = non_empty_env("FARM_STATS_PAIRS") {
        let map = serde_json::from_str::<HashMap<String, String>>(&raw_pairs).map_err(|e| {
            ConfigError::Message(format!("Failed to parse FARM_STATS_PAIRS as JSON: {}", e))
        })?;
        for (token, pair) in map {
            if !token.trim().is_empty() && !pair.trim().is_empty() {
                settings.liquidity.pairs.insert(token, pair);
            }
        }
    }

    if settings.farm.address.trim().is_empty() {
        return Err(ConfigError::Message("farm.address must not be empty".to_string()));
    }
    Ok(())
}

fn non_empty_env(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
