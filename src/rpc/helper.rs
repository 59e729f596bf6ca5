use anyhow::{anyhow, Result};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde_json::Value;
use sha2::{Digest, Sha256};

// ============================================================================
// Helper Functions
// ============================================================================

/// Map a user-entered node address onto the websocket RPC endpoint.
///
/// `http(s)://` becomes `ws(s)://`, a bare `host:port` gets `ws://`, and
/// `/websocket` is appended when no path is given.
pub fn to_ws_url(address: &str) -> Result<String> {
    let address = address.trim();
    if address.is_empty() {
        return Err(anyhow!("RPC address is empty"));
    }

    let (scheme, rest) = match address.split_once("://") {
        Some(("http", rest)) | Some(("ws", rest)) => ("ws", rest),
        Some(("https", rest)) | Some(("wss", rest)) => ("wss", rest),
        Some((other, _)) => return Err(anyhow!("Unsupported RPC scheme: {other}")),
        None => ("ws", address),
    };
    let rest = rest.trim_end_matches('/');

    if rest.is_empty() || rest.starts_with('/') {
        return Err(anyhow!("RPC address has no host: {address}"));
    }

    if rest.contains('/') {
        Ok(format!("{scheme}://{rest}"))
    } else {
        Ok(format!("{scheme}://{rest}/websocket"))
    }
}

/// CometBFT tx hash: upper-hex SHA-256 of the raw tx bytes
pub fn tx_hash(raw: &[u8]) -> String {
    hex::encode_upper(Sha256::digest(raw))
}

pub fn decode_base64(s: &str) -> Result<Vec<u8>> {
    STANDARD
        .decode(s.trim())
        .map_err(|e| anyhow!("Invalid base64: {e}"))
}

pub fn encode_base64(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

/// Numbers arrive both as JSON numbers and as decimal strings
pub fn json_u64(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

pub fn json_str(value: &Value, key: &str) -> String {
    value
        .get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

/// Transient failures worth another attempt
pub fn is_retryable(error: &str) -> bool {
    let lower = error.to_lowercase();
    lower.contains("rate")
        || lower.contains("429")
        || lower.contains("too many")
        || lower.contains("timeout")
        || lower.contains("timed out")
        || lower.contains("temporarily")
        || lower.contains("unavailable")
        || lower.contains("502")
        || lower.contains("503")
        || lower.contains("504")
}
