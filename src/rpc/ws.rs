//! JSON-RPC over the CometBFT `/websocket` endpoint.
//!
//! One socket carries both request/response traffic and subscription
//! notifications. A reader task routes replies to waiting callers by
//! request id and notifications to subscribers by query.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::{sleep, timeout};
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, info, warn};

use super::helper::{encode_base64, is_retryable, json_str, json_u64, to_ws_url};
use super::{
    BlockInfo, ChainEvent, ChainRpc, Connector, NodeStatus, StreamKind, Subscription, TxRecord,
};
use crate::error::ExplorerError;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

type Reply = std::result::Result<Value, ExplorerError>;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// State shared between the client, its reader task and subscription handles
struct Shared {
    outgoing: mpsc::UnboundedSender<Message>,
    pending: Mutex<HashMap<u64, oneshot::Sender<Reply>>>,
    routes: Mutex<HashMap<StreamKind, mpsc::UnboundedSender<ChainEvent>>>,
    next_id: AtomicU64,
}

impl Shared {
    fn new(outgoing: mpsc::UnboundedSender<Message>) -> Self {
        Self {
            outgoing,
            pending: Mutex::new(HashMap::new()),
            routes: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(1),
        }
    }

    fn next_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::SeqCst)
    }

    fn send_frame(&self, id: u64, method: &str, params: Value) -> Result<()> {
        let frame = json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params,
        });
        self.outgoing
            .send(Message::Text(frame.to_string().into()))
            .map_err(|_| ExplorerError::Connection("websocket writer stopped".into()).into())
    }

    /// Route one inbound text frame
    fn dispatch(&self, text: &str) {
        let Ok(msg) = serde_json::from_str::<Value>(text) else {
            debug!("ignoring non-JSON frame");
            return;
        };

        if let Some(id) = msg.get("id").and_then(Value::as_u64) {
            if let Some(waiter) = lock(&self.pending).remove(&id) {
                let _ = waiter.send(parse_reply(&msg));
                return;
            }
        }

        let Some(result) = msg.get("result") else {
            return;
        };
        let (Some(query), Some(data)) = (
            result.get("query").and_then(Value::as_str),
            result.get("data"),
        ) else {
            return;
        };
        let Some(kind) = StreamKind::from_query(query) else {
            debug!(query, "event for unknown query");
            return;
        };
        let Some(event) = ChainEvent::from_json(kind, data) else {
            warn!(query, "dropping unparseable event");
            return;
        };

        let mut routes = lock(&self.routes);
        if let Some(route) = routes.get(&kind) {
            if route.send(event).is_err() {
                routes.remove(&kind);
            }
        }
    }

    /// Stop routing `kind` and tell the node. The reply is not awaited.
    fn unsubscribe(&self, kind: StreamKind) {
        lock(&self.routes).remove(&kind);
        let id = self.next_id();
        match self.send_frame(id, "unsubscribe", json!({ "query": kind.query() })) {
            Ok(()) => debug!(query = kind.query(), "unsubscribed"),
            Err(e) => debug!(query = kind.query(), error = %e, "unsubscribe not sent"),
        }
    }

    /// Fail every waiting request and end every event stream
    fn fail_all(&self, reason: &str) {
        for (_, waiter) in lock(&self.pending).drain() {
            let _ = waiter.send(Err(ExplorerError::Connection(reason.to_string())));
        }
        lock(&self.routes).clear();
    }
}

fn parse_reply(msg: &Value) -> Reply {
    if let Some(err) = msg.get("error") {
        let code = err.get("code").and_then(Value::as_i64).unwrap_or(0);
        let message = json_str(err, "message");
        let data = json_str(err, "data");
        return Err(ExplorerError::Rpc {
            code,
            message: if data.is_empty() {
                message
            } else {
                format!("{message}: {data}")
            },
        });
    }
    Ok(msg.get("result").cloned().unwrap_or(Value::Null))
}

/// Websocket client with retry logic for transient failures
pub struct WsClient {
    url: String,
    shared: Arc<Shared>,
    reader: JoinHandle<()>,
    writer: JoinHandle<()>,
    max_retries: u32,
    base_delay: Duration,
}

impl WsClient {
    pub async fn connect(address: &str) -> Result<Self> {
        let url = to_ws_url(address)?;
        info!(%url, "opening websocket");

        let (stream, _) = tokio_tungstenite::connect_async(url.as_str())
            .await
            .map_err(|e| ExplorerError::Connection(format!("{url}: {e}")))?;
        let (mut write, mut read) = stream.split();

        let (outgoing, mut outgoing_rx) = mpsc::unbounded_channel::<Message>();
        let shared = Arc::new(Shared::new(outgoing));

        let writer = tokio::spawn(async move {
            while let Some(msg) = outgoing_rx.recv().await {
                let closing = matches!(msg, Message::Close(_));
                if let Err(e) = write.send(msg).await {
                    warn!(error = %e, "websocket write failed");
                    break;
                }
                if closing {
                    break;
                }
            }
        });

        let reader_shared = shared.clone();
        let reader = tokio::spawn(async move {
            while let Some(msg) = read.next().await {
                match msg {
                    Ok(Message::Text(text)) => reader_shared.dispatch(text.as_str()),
                    Ok(Message::Ping(payload)) => {
                        let _ = reader_shared.outgoing.send(Message::Pong(payload));
                    }
                    Ok(Message::Close(frame)) => {
                        info!(?frame, "websocket closed by node");
                        break;
                    }
                    Ok(_) => {}
                    Err(e) => {
                        warn!(error = %e, "websocket read failed");
                        break;
                    }
                }
            }
            reader_shared.fail_all("connection closed");
        });

        Ok(Self {
            url,
            shared,
            reader,
            writer,
            max_retries: 2,
            base_delay: Duration::from_millis(500),
        })
    }

    async fn request(&self, method: &str, params: Value) -> Result<Value> {
        let id = self.shared.next_id();
        let (reply_tx, reply_rx) = oneshot::channel();
        lock(&self.shared.pending).insert(id, reply_tx);

        if let Err(e) = self.shared.send_frame(id, method, params) {
            lock(&self.shared.pending).remove(&id);
            return Err(e);
        }
        debug!(method, id, "rpc request");

        match timeout(REQUEST_TIMEOUT, reply_rx).await {
            Ok(Ok(reply)) => Ok(reply?),
            Ok(Err(_)) => Err(ExplorerError::Connection("connection closed".into()).into()),
            Err(_) => {
                lock(&self.shared.pending).remove(&id);
                Err(ExplorerError::Connection(format!("{method} request timed out")).into())
            }
        }
    }

    async fn with_retry<T, F, Fut>(&self, operation: F) -> Result<T>
    where
        F: Fn() -> Fut,
        Fut: std::future::Future<Output = Result<T>>,
    {
        let mut attempt = 0;
        loop {
            match operation().await {
                Ok(result) => return Ok(result),
                Err(e) if attempt < self.max_retries && is_retryable(&format!("{e:#}")) => {
                    let delay = self.base_delay * 2_u32.pow(attempt);
                    debug!(attempt, ?delay, error = %e, "retrying rpc request");
                    sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

#[async_trait]
impl ChainRpc for WsClient {
    async fn status(&self) -> Result<NodeStatus> {
        let result = self
            .with_retry(|| self.request("status", json!({})))
            .await?;
        NodeStatus::from_json(&result)
            .ok_or_else(|| ExplorerError::Decode("malformed status response".into()).into())
    }

    async fn block(&self, height: Option<u64>) -> Result<BlockInfo> {
        let params = match height {
            Some(h) => json!({ "height": h.to_string() }),
            None => json!({}),
        };
        let result = self
            .with_retry(|| self.request("block", params.clone()))
            .await?;
        result
            .get("block")
            .and_then(|b| BlockInfo::from_json(b, result.get("block_id")))
            .ok_or_else(|| ExplorerError::Decode("malformed block response".into()).into())
    }

    async fn tx(&self, hash: &str) -> Result<TxRecord> {
        let hex_hash = hash.trim().trim_start_matches("0x");
        let bytes = hex::decode(hex_hash).map_err(|e| anyhow!("Invalid tx hash: {e}"))?;
        let params = json!({ "hash": encode_base64(&bytes), "prove": false });

        let result = self
            .with_retry(|| self.request("tx", params.clone()))
            .await?;
        TxRecord::from_tx_result(&result)
            .ok_or_else(|| ExplorerError::Decode("malformed tx response".into()).into())
    }

    async fn abci_query(&self, path: &str, data: Vec<u8>) -> Result<Vec<u8>> {
        let params = json!({
            "path": path,
            "data": hex::encode(&data),
            "height": "0",
            "prove": false,
        });
        let result = self
            .with_retry(|| self.request("abci_query", params.clone()))
            .await?;
        parse_abci_response(path, &result)
    }

    async fn subscribe(&self, kind: StreamKind) -> Result<Subscription> {
        let (tx, rx) = mpsc::unbounded_channel();
        lock(&self.shared.routes).insert(kind, tx);

        if let Err(e) = self
            .request("subscribe", json!({ "query": kind.query() }))
            .await
        {
            lock(&self.shared.routes).remove(&kind);
            return Err(e);
        }
        info!(query = kind.query(), "subscribed");

        let shared = self.shared.clone();
        Ok(Subscription::new(kind, rx, move || shared.unsubscribe(kind)))
    }

    async fn close(&self) {
        info!(url = %self.url, "closing websocket");
        let _ = self.shared.outgoing.send(Message::Close(None));
        self.shared.fail_all("client closed");
        self.reader.abort();
    }
}

impl Drop for WsClient {
    fn drop(&mut self) {
        self.reader.abort();
        self.writer.abort();
    }
}

/// Unwrap `result.response` of an `abci_query` reply
fn parse_abci_response(path: &str, result: &Value) -> Result<Vec<u8>> {
    let response = result
        .get("response")
        .ok_or_else(|| ExplorerError::Decode("abci_query reply has no response".into()))?;

    let code = response.get("code").and_then(json_u64).unwrap_or(0) as u32;
    if code != 0 {
        return Err(ExplorerError::Query {
            path: path.to_string(),
            code,
            log: json_str(response, "log"),
        }
        .into());
    }

    match response.get("value").and_then(Value::as_str) {
        Some(value) => super::helper::decode_base64(value),
        None => Ok(Vec::new()),
    }
}

/// Opens [`WsClient`] connections
#[derive(Debug, Clone, Copy, Default)]
pub struct WsConnector;

#[async_trait]
impl Connector for WsConnector {
    async fn connect(&self, address: &str) -> Result<Arc<dyn ChainRpc>> {
        let client = WsClient::connect(address).await?;
        Ok(Arc::new(client))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shared() -> (Arc<Shared>, mpsc::UnboundedReceiver<Message>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Arc::new(Shared::new(tx)), rx)
    }

    fn frame_json(msg: Message) -> Value {
        match msg {
            Message::Text(text) => serde_json::from_str(text.as_str()).unwrap(),
            other => panic!("Expected text frame, got {other:?}"),
        }
    }

    // ==================== dispatch tests ====================

    #[test]
    fn test_reply_routed_by_id() {
        let (shared, _rx) = shared();
        let (tx, mut rx) = oneshot::channel();
        lock(&shared.pending).insert(7, tx);

        shared.dispatch(r#"{"jsonrpc":"2.0","id":7,"result":{"ok":true}}"#);

        let reply = rx.try_recv().unwrap().unwrap();
        assert_eq!(reply["ok"], true);
        assert!(lock(&shared.pending).is_empty());
    }

    #[test]
    fn test_error_reply_maps_to_rpc_error() {
        let (shared, _rx) = shared();
        let (tx, mut rx) = oneshot::channel();
        lock(&shared.pending).insert(2, tx);

        shared.dispatch(
            r#"{"jsonrpc":"2.0","id":2,"error":{"code":-32603,"message":"Internal error","data":"tx not found"}}"#,
        );

        let err = rx.try_recv().unwrap().unwrap_err();
        assert!(matches!(
            err,
            ExplorerError::Rpc { code: -32603, ref message } if message == "Internal error: tx not found"
        ));
    }

    #[test]
    fn test_event_routed_by_query() {
        let (shared, _rx) = shared();
        let (tx, mut events) = mpsc::unbounded_channel();
        lock(&shared.routes).insert(StreamKind::NewBlock, tx);

        shared.dispatch(
            r#"{"jsonrpc":"2.0","id":"1#event","result":{"query":"tm.event='NewBlock'","data":{"type":"tendermint/event/NewBlock","value":{"block":{"header":{"height":"12"}}}}}}"#,
        );

        assert!(matches!(events.try_recv(), Ok(ChainEvent::NewBlock(b)) if b.height == 12));
    }

    #[test]
    fn test_event_without_route_is_ignored() {
        let (shared, _rx) = shared();
        shared.dispatch(
            r#"{"jsonrpc":"2.0","id":"1#event","result":{"query":"tm.event='Tx'","data":{"value":{}}}}"#,
        );
        shared.dispatch("not json");
        assert!(lock(&shared.routes).is_empty());
    }

    #[test]
    fn test_unsubscribe_removes_route_and_sends_frame() {
        let (shared, mut outgoing) = shared();
        let (tx, _events) = mpsc::unbounded_channel();
        lock(&shared.routes).insert(StreamKind::Tx, tx);

        shared.unsubscribe(StreamKind::Tx);

        assert!(lock(&shared.routes).is_empty());
        let frame = frame_json(outgoing.try_recv().unwrap());
        assert_eq!(frame["method"], "unsubscribe");
        assert_eq!(frame["params"]["query"], "tm.event='Tx'");
    }

    #[test]
    fn test_fail_all_ends_waiters_and_streams() {
        let (shared, _rx) = shared();
        let (tx, mut waiter) = oneshot::channel();
        lock(&shared.pending).insert(1, tx);
        let (route, mut events) = mpsc::unbounded_channel();
        lock(&shared.routes).insert(StreamKind::NewBlock, route);

        shared.fail_all("connection closed");

        assert!(matches!(
            waiter.try_recv(),
            Ok(Err(ExplorerError::Connection(_)))
        ));
        assert!(events.try_recv().is_err());
    }

    // ==================== abci tests ====================

    #[test]
    fn test_abci_response_value() {
        let result = json!({"response": {"code": 0, "value": "AQID"}});
        assert_eq!(parse_abci_response("/p", &result).unwrap(), vec![1, 2, 3]);

        let empty = json!({"response": {"code": 0, "value": null}});
        assert!(parse_abci_response("/p", &empty).unwrap().is_empty());
    }

    #[test]
    fn test_abci_nonzero_code_is_query_error() {
        let result = json!({"response": {"code": 22, "log": "key not found"}});
        let err = parse_abci_response("/cosmos.auth.v1beta1.Query/Account", &result).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ExplorerError>(),
            Some(ExplorerError::Query { code: 22, .. })
        ));
    }
}
