//! Client for the dYdX indexer REST API.
//!
//! A 404 means the address has never been used on the exchange and is
//! reported as an empty result, not an error.

use anyhow::{Context, Result};
use reqwest::Client;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::{debug, warn};

use crate::error::ExplorerError;

const REQUEST_TIMEOUT_SECS: u64 = 10;
const SERVICE: &str = "indexer";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PositionSide {
    Long,
    Short,
}

impl PositionSide {
    pub fn as_str(&self) -> &'static str {
        match self {
            PositionSide::Long => "LONG",
            PositionSide::Short => "SHORT",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PositionStatus {
    Open,
    Closed,
}

impl PositionStatus {
    pub fn as_query(&self) -> &'static str {
        match self {
            PositionStatus::Open => "OPEN",
            PositionStatus::Closed => "CLOSED",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetPosition {
    pub symbol: String,
    pub side: PositionSide,
    pub size: String,
    #[serde(default)]
    pub asset_id: String,
    #[serde(default)]
    pub subaccount_number: u32,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerpetualPosition {
    pub market: String,
    pub side: PositionSide,
    pub size: String,
    #[serde(default)]
    pub entry_price: Option<String>,
    #[serde(default)]
    pub unrealized_pnl: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subaccount {
    pub address: String,
    pub subaccount_number: u32,
    #[serde(default)]
    pub equity: String,
    #[serde(default)]
    pub free_collateral: String,
    #[serde(default)]
    pub margin_enabled: bool,
    #[serde(default)]
    pub asset_positions: BTreeMap<String, AssetPosition>,
    #[serde(default)]
    pub open_perpetual_positions: BTreeMap<String, PerpetualPosition>,
}

/// A parent subaccount with its children. Empty for unused addresses.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParentSubaccount {
    pub equity: Option<String>,
    pub free_collateral: Option<String>,
    pub subaccounts: Vec<Subaccount>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ParentSubaccountResponse {
    subaccount: ParentSubaccountRecord,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ParentSubaccountRecord {
    #[serde(default)]
    equity: Option<String>,
    #[serde(default)]
    free_collateral: Option<String>,
    #[serde(default)]
    child_subaccounts: Vec<Subaccount>,
}

#[derive(Deserialize)]
struct AssetPositionsResponse {
    #[serde(default)]
    positions: Vec<AssetPosition>,
}

#[derive(Clone)]
pub struct IndexerClient {
    client: Client,
    base_url: String,
}

impl IndexerClient {
    pub fn new(base_url: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .context("Failed to create indexer HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub async fn parent_subaccount(
        &self,
        address: &str,
        parent_number: u32,
    ) -> Result<ParentSubaccount> {
        let url = format!(
            "{}/v4/addresses/{address}/parentSubaccountNumber/{parent_number}",
            self.base_url
        );
        let (status, body) = self.get(&url).await?;
        parse_parent_subaccount(status, &body)
            .with_context(|| format!("Failed to load subaccounts for {address}"))
    }

    pub async fn asset_positions(
        &self,
        address: &str,
        subaccount_number: u32,
        status: PositionStatus,
    ) -> Result<Vec<AssetPosition>> {
        let url = format!(
            "{}/v4/addresses/{address}/subaccounts/{subaccount_number}/asset-positions?status={}",
            self.base_url,
            status.as_query()
        );
        let (code, body) = self.get(&url).await?;
        parse_asset_positions(code, &body).with_context(|| {
            format!("Failed to load asset positions for {address}/{subaccount_number}")
        })
    }

    async fn get(&self, url: &str) -> Result<(u16, String)> {
        debug!(%url, "indexer request");
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| ExplorerError::Collaborator {
                service: SERVICE,
                reason: e.to_string(),
            })?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(|e| ExplorerError::Collaborator {
            service: SERVICE,
            reason: e.to_string(),
        })?;
        Ok((status, body))
    }
}

fn check_status(status: u16, body: &str) -> Result<bool> {
    match status {
        404 => Ok(false),
        200..=299 => Ok(true),
        _ => {
            warn!(status, "indexer returned error status");
            Err(ExplorerError::Collaborator {
                service: SERVICE,
                reason: format!("HTTP {status}: {}", body.chars().take(200).collect::<String>()),
            }
            .into())
        }
    }
}

pub fn parse_parent_subaccount(status: u16, body: &str) -> Result<ParentSubaccount> {
    if !check_status(status, body)? {
        return Ok(ParentSubaccount::default());
    }

    let response: ParentSubaccountResponse = serde_json::from_str(body)
        .map_err(|e| ExplorerError::Decode(format!("parent subaccount: {e}")))?;

    let mut subaccounts = response.subaccount.child_subaccounts;
    subaccounts.sort_by_key(|s| s.subaccount_number);

    Ok(ParentSubaccount {
        equity: response.subaccount.equity,
        free_collateral: response.subaccount.free_collateral,
        subaccounts,
    })
}

pub fn parse_asset_positions(status: u16, body: &str) -> Result<Vec<AssetPosition>> {
    if !check_status(status, body)? {
        return Ok(Vec::new());
    }

    let response: AssetPositionsResponse = serde_json::from_str(body)
        .map_err(|e| ExplorerError::Decode(format!("asset positions: {e}")))?;
    Ok(response.positions)
}
