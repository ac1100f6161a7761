// src/sources/lcd.rs

use crate::stat_source::SourceError;
use log::debug;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use url::Url;

/// Smart-contract query transport over the LCD REST endpoint.
///
/// Each query is a `GET {lcd}/wasm/contracts/{contract}/store?query_msg={json}`
/// whose response is wrapped as `{ "height": "...", "result": { ... } }`.
#[derive(Debug, Clone)]
pub struct LcdClient {
    base_url: Url,
    client: reqwest::Client,
}

impl LcdClient {
    pub fn new(lcd_url: &str, timeout: Duration) -> Result<Self, LcdClientError> {
        // join() reemplaza el último segmento si falta el '/' final
        let normalized = if lcd_url.ends_with('/') {
            lcd_url.to_string()
        } else {
            format!("{}/", lcd_url)
        };
        let base_url = Url::parse(&normalized).map_err(|e| LcdClientError::InvalidUrl(e.to_string()))?;
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LcdClientError::Http(e.to_string()))?;
        Ok(Self { base_url, client })
    }

    pub fn store_url(&self, contract: &str, query_msg: &str) -> Result<Url, url::ParseError> {
        let mut url = self
            .base_url
            .join(&format!("wasm/contracts/{}/store", contract))?;
        url.query_pairs_mut().append_pair("query_msg", query_msg);
        Ok(url)
    }

    /// Runs `msg` against `contract` and decodes the `result` payload as `R`.
    ///
    /// `name` labels the source in errors and logs.
    pub async fn query<Q, R>(&self, name: &'static str, contract: &str, msg: &Q) -> Result<R, SourceError>
    where
        Q: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let query_msg = serde_json::to_string(msg).map_err(|e| SourceError::unavailable(name, e))?;
        let url = self
            .store_url(contract, &query_msg)
            .map_err(|e| SourceError::unavailable(name, e))?;
        debug!("LCD query {} -> {} {}", name, contract, query_msg);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| SourceError::unavailable(name, format!("HTTP request failed: {}", e)))?;
        if !response.status().is_success() {
            return Err(SourceError::unavailable(name, format!("HTTP error: {}", response.status())));
        }
        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| SourceError::malformed(name, format!("JSON parse failed: {}", e)))?;

        decode_result(name, body)
    }
}

pub(crate) fn decode_result<R: DeserializeOwned>(name: &'static str, mut body: serde_json::Value) -> Result<R, SourceError> {
    let result = body
        .get_mut("result")
        .map(serde_json::Value::take)
        .ok_or_else(|| SourceError::malformed(name, "result"))?;
    serde_json::from_value(result).map_err(|e| SourceError::malformed(name, e))
}

#[derive(Debug, thiserror::Error)]
pub enum LcdClientError {
    #[error("Invalid LCD url: {0}")]
    InvalidUrl(String),
    #[error("Failed to create HTTP client: {0}")]
    Http(String),
}
