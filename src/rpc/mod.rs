mod helper;
mod types;

pub mod decode;
pub mod query;
pub mod ws;

pub use helper::{is_retryable, to_ws_url, tx_hash};
pub use types::*;
pub use ws::{WsClient, WsConnector};

use anyhow::Result;
use async_trait::async_trait;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;

/// Request/response and streaming access to a CometBFT node
#[async_trait]
pub trait ChainRpc: Send + Sync {
    async fn status(&self) -> Result<NodeStatus>;

    /// `None` fetches the latest block
    async fn block(&self, height: Option<u64>) -> Result<BlockInfo>;

    /// `hash` is hex, with or without `0x`
    async fn tx(&self, hash: &str) -> Result<TxRecord>;

    /// Raw ABCI query; returns the response value bytes
    async fn abci_query(&self, path: &str, data: Vec<u8>) -> Result<Vec<u8>>;

    async fn subscribe(&self, kind: StreamKind) -> Result<Subscription>;

    /// Shut the transport down. Outstanding subscriptions stop receiving.
    async fn close(&self);
}

/// Opens a client for a node address
#[async_trait]
pub trait Connector: Send + Sync {
    async fn connect(&self, address: &str) -> Result<Arc<dyn ChainRpc>>;
}

/// Shared view of whether a subscription is still live
#[derive(Debug, Clone)]
pub struct SubscriptionStatus(Arc<AtomicBool>);

impl SubscriptionStatus {
    pub fn is_active(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Owned handle to one event stream.
///
/// Dropping the handle unsubscribes: the release hook runs exactly once
/// and the shared status flips to inactive.
pub struct Subscription {
    kind: StreamKind,
    events: mpsc::UnboundedReceiver<ChainEvent>,
    active: Arc<AtomicBool>,
    release: Option<Box<dyn FnOnce() + Send>>,
}

impl Subscription {
    pub fn new(
        kind: StreamKind,
        events: mpsc::UnboundedReceiver<ChainEvent>,
        release: impl FnOnce() + Send + 'static,
    ) -> Self {
        Self {
            kind,
            events,
            active: Arc::new(AtomicBool::new(true)),
            release: Some(Box::new(release)),
        }
    }

    pub fn kind(&self) -> StreamKind {
        self.kind
    }

    pub fn status(&self) -> SubscriptionStatus {
        SubscriptionStatus(self.active.clone())
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    /// Next buffered event without waiting
    pub fn try_next(&mut self) -> Option<ChainEvent> {
        self.events.try_recv().ok()
    }

    pub fn unsubscribe(self) {
        drop(self);
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.active.store(false, Ordering::SeqCst);
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("kind", &self.kind)
            .field("active", &self.is_active())
            .finish()
    }
}
