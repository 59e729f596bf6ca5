//! Connection lifecycle and live chain state.
//!
//! A [`Session`] owns at most one RPC client and exactly one block and one
//! tx subscription while connected. Every connect tears the previous
//! connection down first, so reconnecting never leaks a subscription.

use anyhow::{anyhow, Result};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::rpc::{
    query, BlockInfo, ChainEvent, ChainParams, ChainRpc, Connector, NodeStatus, ParamsModule,
    StreamKind, Subscription, SubscriptionStatus, TxRecord,
};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Chain data accumulated from the subscriptions of one connection
#[derive(Debug, Clone, Default)]
pub struct ChainState {
    pub node: Option<NodeStatus>,
    pub latest_block: Option<BlockInfo>,
    pub latest_tx: Option<TxRecord>,
    /// Append-only for the life of a connection, newest last
    pub blocks: Vec<BlockInfo>,
    /// Append-only for the life of a connection, newest last
    pub txs: Vec<TxRecord>,
    pub params: ChainParams,
}

impl ChainState {
    /// Forget everything learned from the previous connection
    pub fn reset_on_connect(&mut self) {
        *self = ChainState::default();
    }

    pub fn push_block(&mut self, block: BlockInfo) {
        self.blocks.push(block.clone());
        self.latest_block = Some(block);
    }

    pub fn push_tx(&mut self, tx: TxRecord) {
        self.txs.push(tx.clone());
        self.latest_tx = Some(tx);
    }

    pub fn latest_height(&self) -> Option<u64> {
        self.latest_block
            .as_ref()
            .map(|b| b.height)
            .or_else(|| self.node.as_ref().map(|n| n.latest_block_height))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ConnectionResult {
    Connected(NodeStatus),
    Failed(String),
}

pub struct Session {
    connector: Arc<dyn Connector>,
    client: Option<Arc<dyn ChainRpc>>,
    address: Option<String>,
    block_sub: Option<Subscription>,
    tx_sub: Option<Subscription>,
    connection_error: bool,
    pub state: ChainState,
}

impl Session {
    pub fn new(connector: Arc<dyn Connector>) -> Self {
        Self {
            connector,
            client: None,
            address: None,
            block_sub: None,
            tx_sub: None,
            connection_error: false,
            state: ChainState::default(),
        }
    }

    /// Connect to `address`, replacing any existing connection.
    ///
    /// The endpoint is validated with a `status` call before the old
    /// connection is torn down. Any failure leaves the session
    /// disconnected with the error flag set.
    pub async fn connect(&mut self, address: &str) -> ConnectionResult {
        info!(address, "connecting");

        let (client, status) = match self.validate(address).await {
            Ok(v) => v,
            Err(e) => {
                warn!(address, error = %format!("{e:#}"), "endpoint validation failed");
                self.teardown().await;
                self.connection_error = true;
                return ConnectionResult::Failed(format!("{e:#}"));
            }
        };

        self.teardown().await;
        self.state.reset_on_connect();
        self.client = Some(client.clone());
        self.address = Some(address.to_string());

        match self.subscribe_all(client.as_ref()).await {
            Ok((blocks, txs)) => {
                self.block_sub = Some(blocks);
                self.tx_sub = Some(txs);
            }
            Err(e) => {
                warn!(address, error = %format!("{e:#}"), "subscription setup failed");
                self.teardown().await;
                self.connection_error = true;
                return ConnectionResult::Failed(format!("{e:#}"));
            }
        }

        info!(
            address,
            network = %status.network,
            height = status.latest_block_height,
            "connected"
        );
        self.state.node = Some(status.clone());
        self.connection_error = false;
        ConnectionResult::Connected(status)
    }

    async fn validate(&self, address: &str) -> Result<(Arc<dyn ChainRpc>, NodeStatus)> {
        timeout(CONNECT_TIMEOUT, self.open_checked(address))
            .await
            .map_err(|_| anyhow!("Timed out connecting to {address}"))?
    }

    async fn open_checked(&self, address: &str) -> Result<(Arc<dyn ChainRpc>, NodeStatus)> {
        let client = self.connector.connect(address).await?;
        match client.status().await {
            Ok(status) => Ok((client, status)),
            Err(e) => {
                client.close().await;
                Err(e)
            }
        }
    }

    /// Both subscriptions or neither
    async fn subscribe_all(&self, client: &dyn ChainRpc) -> Result<(Subscription, Subscription)> {
        let blocks = client.subscribe(StreamKind::NewBlock).await?;
        let txs = client.subscribe(StreamKind::Tx).await?;
        Ok((blocks, txs))
    }

    /// Release subscriptions and close the client. Idempotent.
    pub async fn disconnect(&mut self) {
        self.teardown().await;
        self.connection_error = false;
    }

    async fn teardown(&mut self) {
        for sub in [self.block_sub.take(), self.tx_sub.take()].into_iter().flatten() {
            sub.unsubscribe();
        }
        if let Some(client) = self.client.take() {
            client.close().await;
        }
        if let Some(address) = self.address.take() {
            info!(address, "disconnected");
        }
    }

    /// Apply every buffered subscription event without waiting.
    /// Returns how many events were applied.
    pub fn drain_events(&mut self) -> usize {
        let mut applied = 0;
        for sub in [self.block_sub.as_mut(), self.tx_sub.as_mut()]
            .into_iter()
            .flatten()
        {
            let mut count = 0;
            while let Some(event) = sub.try_next() {
                match event {
                    ChainEvent::NewBlock(block) => self.state.push_block(block),
                    ChainEvent::Tx(tx) => self.state.push_tx(tx),
                }
                count += 1;
            }
            if count > 0 {
                debug!(stream = sub.kind().query(), count, "events applied");
            }
            applied += count;
        }
        applied
    }

    /// Fill the parameter cache. Modules that fail to load are skipped.
    pub async fn load_params(&mut self) -> Result<()> {
        let client = self.client().ok_or(crate::error::ExplorerError::NotConnected)?;
        for module in ParamsModule::ALL {
            match query::params(client.as_ref(), module).await {
                Ok(values) => self.state.params.insert(module, values),
                Err(e) => warn!(module = module.as_str(), error = %format!("{e:#}"), "params unavailable"),
            }
        }
        Ok(())
    }

    pub fn client(&self) -> Option<Arc<dyn ChainRpc>> {
        self.client.clone()
    }

    pub fn is_connected(&self) -> bool {
        self.client.is_some()
    }

    pub fn connection_error(&self) -> bool {
        self.connection_error
    }

    pub fn address(&self) -> Option<&str> {
        self.address.as_deref()
    }

    pub fn subscription_status(&self, kind: StreamKind) -> Option<SubscriptionStatus> {
        match kind {
            StreamKind::NewBlock => self.block_sub.as_ref().map(Subscription::status),
            StreamKind::Tx => self.tx_sub.as_ref().map(Subscription::status),
        }
    }
}
