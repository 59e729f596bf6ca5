use thiserror::Error;

/// Failure categories surfaced to the UI.
///
/// Everything here is recoverable: connection errors become a retryable
/// screen, decode errors drop the offending item, collaborator errors
/// degrade to an empty result.
#[derive(Debug, Error)]
pub enum ExplorerError {
    /// Endpoint unreachable, validation failed, or subscription setup failed
    #[error("Connection failed: {0}")]
    Connection(String),

    /// RPC returned an error object or an unexpected payload
    #[error("RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    /// ABCI query returned a non-zero code
    #[error("Query {path} failed (code {code}): {log}")]
    Query { path: String, code: u32, log: String },

    /// Protobuf or JSON payload could not be decoded
    #[error("Decode error: {0}")]
    Decode(String),

    /// Indexer or metadata service failure
    #[error("{service} request failed: {reason}")]
    Collaborator {
        service: &'static str,
        reason: String,
    },

    #[error("Not connected to an RPC endpoint")]
    NotConnected,
}

impl From<prost::DecodeError> for ExplorerError {
    fn from(err: prost::DecodeError) -> Self {
        ExplorerError::Decode(err.to_string())
    }
}
