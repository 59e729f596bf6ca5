//! dyex - Terminal Explorer for dYdX
//!
//! A terminal-based explorer for the dYdX v4 Cosmos chain: blocks,
//! transactions and accounts over Tendermint RPC, with subaccount positions
//! from the indexer and asset precision from the metadata service.

pub mod app;
pub mod config;
pub mod error;
pub mod fetch;
pub mod indexer;
pub mod logging;
pub mod metadata;
pub mod pagination;
pub mod precision;
pub mod rpc;
pub mod search;
pub mod session;
pub mod ui;

// Re-export commonly used types
pub use app::{AccountResult, App, BlockResult, NavLink, Screen, TxResult};
pub use config::Config;
pub use error::ExplorerError;
pub use precision::{normalize_amount, NormalizedAmount, PrecisionMap};
pub use session::{ConnectionResult, Session};
