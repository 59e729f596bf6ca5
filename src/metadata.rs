//! Client for the asset metadata service (`POST /info`, `POST /prices`).
//!
//! The service is best-effort: any transport error or non-2xx response
//! degrades to an empty result so the account view never blocks on it.

use anyhow::{Context, Result};
use reqwest::Client;
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::{Map, Value};
use std::time::Duration;
use tracing::{debug, warn};

const REQUEST_TIMEOUT_SECS: u64 = 10;

/// Asset metadata record keyed by symbol.
///
/// At most one of the precision fields is authoritative, see [`AssetInfo::exponent`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AssetInfo {
    pub symbol: String,
    pub name: Option<String>,
    pub atomic_resolution: Option<i32>,
    pub denom_exponent: Option<i32>,
    pub decimals: Option<i32>,
}

impl AssetInfo {
    pub fn from_json(symbol: &str, value: &Value) -> Self {
        let int_field = |keys: &[&str]| keys.iter().find_map(|k| value.get(*k).and_then(as_i32));

        Self {
            symbol: symbol.to_string(),
            name: value.get("name").and_then(Value::as_str).map(String::from),
            atomic_resolution: int_field(&["atomicResolution", "atomic_resolution"]),
            denom_exponent: int_field(&["denomExponent", "denom_exponent"]),
            decimals: int_field(&["decimals"]),
        }
    }

    /// Decimal exponent by fixed precedence: atomicResolution > denomExponent > decimals.
    /// dYdX stores resolutions as negative powers of ten, so the magnitude is used.
    pub fn exponent(&self) -> Option<u32> {
        self.atomic_resolution
            .or(self.denom_exponent)
            .or(self.decimals)
            .map(i32::unsigned_abs)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AssetPrice {
    pub symbol: String,
    pub price: Option<Decimal>,
    pub percent_change_24h: Option<Decimal>,
}

impl AssetPrice {
    pub fn from_json(symbol: &str, value: &Value) -> Self {
        let dec_field = |key: &str| value.get(key).and_then(as_decimal);

        Self {
            symbol: symbol.to_string(),
            price: dec_field("price"),
            percent_change_24h: dec_field("percent_change_24h"),
        }
    }
}

#[derive(Serialize)]
struct AssetsRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    assets: Option<&'a [String]>,
}

#[derive(Clone)]
pub struct MetadataClient {
    client: Client,
    base_url: String,
}

impl MetadataClient {
    pub fn new(base_url: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .context("Failed to create metadata HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Fetch asset info for the given symbols (all known assets when `None`)
    pub async fn info(&self, assets: Option<&[String]>) -> Vec<AssetInfo> {
        self.post("info", assets)
            .await
            .map(|records| parse_info_records(&records))
            .unwrap_or_default()
    }

    pub async fn prices(&self, assets: Option<&[String]>) -> Vec<AssetPrice> {
        self.post("prices", assets)
            .await
            .map(|records| {
                records
                    .iter()
                    .map(|(symbol, value)| AssetPrice::from_json(symbol, value))
                    .collect()
            })
            .unwrap_or_default()
    }

    async fn post(&self, path: &str, assets: Option<&[String]>) -> Option<Map<String, Value>> {
        let url = format!("{}/{path}", self.base_url);
        let body = AssetsRequest { assets };

        let response = match self.client.post(&url).json(&body).send().await {
            Ok(r) => r,
            Err(e) => {
                warn!(%url, error = %e, "metadata request failed");
                return None;
            }
        };

        let status = response.status().as_u16();
        let text = match response.text().await {
            Ok(t) => t,
            Err(e) => {
                warn!(%url, error = %e, "metadata response unreadable");
                return None;
            }
        };

        let records = parse_records(status, &text);
        if records.is_none() {
            warn!(%url, status, "metadata response rejected");
        } else {
            debug!(%url, "metadata response ok");
        }
        records
    }
}

/// Interpret a metadata response body. Non-2xx or non-object bodies yield `None`.
pub fn parse_records(status: u16, body: &str) -> Option<Map<String, Value>> {
    if !(200..300).contains(&status) {
        return None;
    }
    match serde_json::from_str::<Value>(body).ok()? {
        Value::Object(map) => Some(map),
        _ => None,
    }
}

/// Converts symbol-keyed records to [`AssetInfo`]s, keeping response order
pub fn parse_info_records(records: &Map<String, Value>) -> Vec<AssetInfo> {
    records
        .iter()
        .filter(|(_, value)| value.is_object())
        .map(|(symbol, value)| AssetInfo::from_json(symbol, value))
        .collect()
}

fn as_i32(value: &Value) -> Option<i32> {
    match value {
        Value::Number(n) => n.as_i64().and_then(|v| i32::try_from(v).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn as_decimal(value: &Value) -> Option<Decimal> {
    let text = match value {
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.trim().to_string(),
        _ => return None,
    };
    text.parse::<Decimal>()
        .ok()
        .or_else(|| Decimal::from_scientific(&text).ok())
}
