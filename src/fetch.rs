//! Data loading behind each search. These run inside spawned tasks and only
//! touch the clients they are handed.

use anyhow::{Context, Result};
use tracing::{debug, warn};

use crate::app::AccountData;
use crate::indexer::{AssetPosition, IndexerClient, PositionStatus};
use crate::metadata::MetadataClient;
use crate::rpc::decode::{decode_block_txs, decode_tx, DecodedTx};
use crate::rpc::{query, BlockInfo, ChainRpc, TxRecord};

/// Subaccounts are grouped under parent 0
const PARENT_SUBACCOUNT: u32 = 0;

/// A block with its decoded transactions and the number that failed to decode
pub type BlockData = (BlockInfo, Vec<DecodedTx>, usize);

/// `None` loads the chain tip
pub async fn fetch_block(rpc: &dyn ChainRpc, height: Option<u64>) -> Result<BlockData> {
    let info = match height {
        Some(h) => rpc
            .block(Some(h))
            .await
            .with_context(|| format!("Failed to fetch block {h}"))?,
        None => rpc.block(None).await.context("Failed to fetch latest block")?,
    };

    let (decoded, failed) = decode_block_txs(&info.txs);
    if failed > 0 {
        warn!(height = info.height, failed, "undecodable transactions in block");
    }
    Ok((info, decoded, failed))
}

/// The tx record and, when the envelope decodes, its messages
pub async fn fetch_tx(rpc: &dyn ChainRpc, hash: &str) -> Result<(TxRecord, Option<DecodedTx>)> {
    let record = rpc
        .tx(hash)
        .await
        .with_context(|| format!("Failed to fetch transaction {hash}"))?;

    let decoded = match decode_tx(&record.raw) {
        Ok(decoded) => Some(decoded),
        Err(e) => {
            warn!(hash, error = %e, "transaction body not decodable");
            None
        }
    };
    Ok((record, decoded))
}

/// Chain account data is required; indexer and metadata data are best effort
pub async fn fetch_account(
    rpc: &dyn ChainRpc,
    indexer: &IndexerClient,
    metadata: &MetadataClient,
    address: &str,
) -> Result<AccountData> {
    let overview = query::account_overview(rpc, address)
        .await
        .with_context(|| format!("Failed to fetch account {address}"))?;

    let (parent, assets) = tokio::join!(
        indexer.parent_subaccount(address, PARENT_SUBACCOUNT),
        metadata.info(None)
    );
    let parent = parent.unwrap_or_else(|e| {
        warn!(address, error = %format!("{e:#}"), "indexer unavailable");
        Default::default()
    });

    let mut positions: Vec<AssetPosition> = Vec::new();
    for sub in &parent.subaccounts {
        let number = sub.subaccount_number;
        match indexer
            .asset_positions(address, number, PositionStatus::Open)
            .await
        {
            Ok(found) => positions.extend(found.into_iter().map(|mut p| {
                p.subaccount_number = number;
                p
            })),
            Err(e) => {
                warn!(address, number, error = %format!("{e:#}"), "falling back to embedded positions");
                positions.extend(sub.asset_positions.values().cloned().map(|mut p| {
                    p.subaccount_number = number;
                    p
                }));
            }
        }
    }

    let symbols: Vec<String> = positions.iter().map(|p| p.symbol.clone()).collect();
    let prices = if symbols.is_empty() {
        Vec::new()
    } else {
        metadata.prices(Some(&symbols)).await
    };

    debug!(
        address,
        subaccounts = parent.subaccounts.len(),
        positions = positions.len(),
        assets = assets.len(),
        "account loaded"
    );

    Ok(AccountData {
        overview,
        parent,
        positions,
        assets,
        prices,
    })
}
