use serde_json::Value;
use std::collections::BTreeMap;

use super::helper::*;

// ============================================================================
// Data Types
// ============================================================================

#[derive(Debug, Clone, PartialEq, Default)]
pub struct NodeStatus {
    pub network: String,
    pub version: String,
    pub moniker: String,
    pub latest_block_height: u64,
    pub latest_block_time: String,
    pub catching_up: bool,
}

impl NodeStatus {
    /// Parse the `result` object of a `status` call
    pub fn from_json(result: &Value) -> Option<Self> {
        let node_info = result.get("node_info")?;
        let sync_info = result.get("sync_info")?;

        Some(Self {
            network: json_str(node_info, "network"),
            version: json_str(node_info, "version"),
            moniker: json_str(node_info, "moniker"),
            latest_block_height: json_u64(sync_info.get("latest_block_height")?)?,
            latest_block_time: json_str(sync_info, "latest_block_time"),
            catching_up: sync_info
                .get("catching_up")
                .and_then(Value::as_bool)
                .unwrap_or(false),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct BlockInfo {
    pub height: u64,
    pub hash: Option<String>,
    pub chain_id: String,
    pub time: String,
    pub proposer: String,
    pub app_hash: String,
    pub signatures: usize,
    /// Raw tx bytes as included in the block
    pub txs: Vec<Vec<u8>>,
}

impl BlockInfo {
    /// Parse a `block` object plus the optional sibling `block_id`.
    /// Used for both the `block` call and `NewBlock` events.
    pub fn from_json(block: &Value, block_id: Option<&Value>) -> Option<Self> {
        let header = block.get("header")?;

        let txs = block
            .get("data")
            .and_then(|d| d.get("txs"))
            .and_then(Value::as_array)
            .map(|txs| {
                txs.iter()
                    .filter_map(Value::as_str)
                    .filter_map(|s| decode_base64(s).ok())
                    .collect()
            })
            .unwrap_or_default();

        let signatures = block
            .get("last_commit")
            .and_then(|c| c.get("signatures"))
            .and_then(Value::as_array)
            .map(|s| s.len())
            .unwrap_or(0);

        Some(Self {
            height: json_u64(header.get("height")?)?,
            hash: block_id
                .and_then(|id| id.get("hash"))
                .and_then(Value::as_str)
                .filter(|h| !h.is_empty())
                .map(String::from),
            chain_id: json_str(header, "chain_id"),
            time: json_str(header, "time"),
            proposer: json_str(header, "proposer_address"),
            app_hash: json_str(header, "app_hash"),
            signatures,
            txs,
        })
    }

    pub fn tx_count(&self) -> usize {
        self.txs.len()
    }
}

/// A transaction as returned by the `tx` call or a `Tx` event
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TxRecord {
    pub hash: String,
    pub height: u64,
    pub index: u32,
    pub code: u32,
    pub codespace: String,
    pub log: String,
    pub gas_wanted: u64,
    pub gas_used: u64,
    pub raw: Vec<u8>,
}

impl TxRecord {
    /// Parse the `result` object of a `tx` call
    pub fn from_tx_result(result: &Value) -> Option<Self> {
        let raw = decode_base64(result.get("tx")?.as_str()?).ok()?;
        let exec = result.get("tx_result").unwrap_or(&Value::Null);

        Some(Self {
            hash: result
                .get("hash")
                .and_then(Value::as_str)
                .map(str::to_uppercase)
                .unwrap_or_else(|| tx_hash(&raw)),
            height: result.get("height").and_then(json_u64).unwrap_or(0),
            index: result.get("index").and_then(json_u64).unwrap_or(0) as u32,
            code: exec.get("code").and_then(json_u64).unwrap_or(0) as u32,
            codespace: json_str(exec, "codespace"),
            log: json_str(exec, "log"),
            gas_wanted: exec.get("gas_wanted").and_then(json_u64).unwrap_or(0),
            gas_used: exec.get("gas_used").and_then(json_u64).unwrap_or(0),
            raw,
        })
    }

    /// Parse the `value` of a `tendermint/event/Tx` event
    pub fn from_event(value: &Value) -> Option<Self> {
        let tx_result = value.get("TxResult")?;
        let raw = decode_base64(tx_result.get("tx")?.as_str()?).ok()?;
        let exec = tx_result.get("result").unwrap_or(&Value::Null);

        Some(Self {
            hash: tx_hash(&raw),
            height: tx_result.get("height").and_then(json_u64).unwrap_or(0),
            index: tx_result.get("index").and_then(json_u64).unwrap_or(0) as u32,
            code: exec.get("code").and_then(json_u64).unwrap_or(0) as u32,
            codespace: json_str(exec, "codespace"),
            log: json_str(exec, "log"),
            gas_wanted: exec.get("gas_wanted").and_then(json_u64).unwrap_or(0),
            gas_used: exec.get("gas_used").and_then(json_u64).unwrap_or(0),
            raw,
        })
    }

    pub fn is_success(&self) -> bool {
        self.code == 0
    }
}

/// Streams delivered over websocket subscriptions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StreamKind {
    NewBlock,
    Tx,
}

impl StreamKind {
    pub fn query(&self) -> &'static str {
        match self {
            StreamKind::NewBlock => "tm.event='NewBlock'",
            StreamKind::Tx => "tm.event='Tx'",
        }
    }

    pub fn from_query(query: &str) -> Option<Self> {
        [StreamKind::NewBlock, StreamKind::Tx]
            .into_iter()
            .find(|k| k.query() == query)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ChainEvent {
    NewBlock(BlockInfo),
    Tx(TxRecord),
}

impl ChainEvent {
    /// Parse the `data` object of a subscription notification
    pub fn from_json(kind: StreamKind, data: &Value) -> Option<Self> {
        let value = data.get("value")?;
        match kind {
            StreamKind::NewBlock => {
                BlockInfo::from_json(value.get("block")?, value.get("block_id"))
                    .map(ChainEvent::NewBlock)
            }
            StreamKind::Tx => TxRecord::from_event(value).map(ChainEvent::Tx),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Coin {
    pub denom: String,
    pub amount: String,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Account {
    pub address: String,
    pub account_number: u64,
    pub sequence: u64,
    pub pub_key_type: Option<String>,
    /// Set for module accounts
    pub module_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Delegation {
    pub validator_address: String,
    pub shares: String,
    pub balance: Option<Coin>,
}

/// Everything the account screen needs from the chain
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AccountOverview {
    pub address: String,
    /// `None` for addresses the chain has never seen
    pub account: Option<Account>,
    pub balances: Vec<Coin>,
    pub delegations: Vec<Delegation>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ParamsModule {
    Staking,
    Mint,
    Distribution,
    Slashing,
    Governance,
}

impl ParamsModule {
    pub const ALL: [ParamsModule; 5] = [
        ParamsModule::Staking,
        ParamsModule::Mint,
        ParamsModule::Distribution,
        ParamsModule::Slashing,
        ParamsModule::Governance,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ParamsModule::Staking => "staking",
            ParamsModule::Mint => "mint",
            ParamsModule::Distribution => "distribution",
            ParamsModule::Slashing => "slashing",
            ParamsModule::Governance => "gov",
        }
    }
}

/// Connection-scoped parameter cache
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ChainParams {
    entries: BTreeMap<ParamsModule, Vec<(String, String)>>,
}

impl ChainParams {
    pub fn insert(&mut self, module: ParamsModule, values: Vec<(String, String)>) {
        self.entries.insert(module, values);
    }

    pub fn get(&self, module: ParamsModule) -> Option<&[(String, String)]> {
        self.entries.get(&module).map(Vec::as_slice)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}
