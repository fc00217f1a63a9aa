//! # JSON-RPC Chain Client
//!
//! `ChainClient` over an Ethereum node: `eth_blockNumber` and `eth_getLogs`
//! on HTTP, `eth_subscribe("logs")` on WebSocket. Only what the listener
//! needs; no general client surface.

use alloy_primitives::{Address, Bytes, B256};
use async_trait::async_trait;
use cn_03_event_ingestion::{ChainClient, IngestionError, LogSubscription, RawLog};
use futures_util::{SinkExt, Stream, StreamExt};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::{Error as WsError, Message};
use tokio_tungstenite::connect_async;
use tracing::{debug, info, warn};

/// Live log buffer between the socket reader and the listener.
const SUBSCRIPTION_BUFFER: usize = 256;

type LiveSender = mpsc::Sender<Result<RawLog, IngestionError>>;

#[derive(Debug, Deserialize)]
struct RpcErrorBody {
    code: i64,
    message: String,
}

#[derive(Debug, Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<RpcErrorBody>,
}

impl RpcResponse {
    fn into_result(self, method: &str) -> Result<Value, IngestionError> {
        if let Some(err) = self.error {
            return Err(IngestionError::Rpc(format!(
                "{method} failed with {}: {}",
                err.code, err.message
            )));
        }
        self.result
            .ok_or_else(|| IngestionError::Rpc(format!("{method} returned no result")))
    }
}

/// Frame received on the subscription socket: a reply or a notification.
#[derive(Debug, Deserialize)]
struct WsFrame {
    #[serde(default)]
    id: Option<u64>,
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<RpcErrorBody>,
    #[serde(default)]
    params: Option<NotificationParams>,
}

#[derive(Debug, Deserialize)]
struct NotificationParams {
    subscription: String,
    result: Value,
}

/// Log object as returned by `eth_getLogs` and log notifications.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RpcLog {
    address: Address,
    topics: Vec<B256>,
    data: Bytes,
    block_number: Option<String>,
    log_index: Option<String>,
    transaction_hash: Option<B256>,
    #[serde(default)]
    removed: bool,
}

impl RpcLog {
    /// `None` for logs the node retracted in a reorg.
    fn into_raw(self) -> Result<Option<RawLog>, IngestionError> {
        if self.removed {
            return Ok(None);
        }
        let block_number = self
            .block_number
            .as_deref()
            .ok_or_else(|| IngestionError::Rpc("log without blockNumber".to_string()))
            .and_then(parse_quantity)?;
        let log_index = self
            .log_index
            .as_deref()
            .ok_or_else(|| IngestionError::Rpc("log without logIndex".to_string()))
            .and_then(parse_quantity)?;

        Ok(Some(RawLog {
            address: self.address,
            topics: self.topics,
            data: self.data,
            block_number,
            log_index,
            transaction_hash: self.transaction_hash.unwrap_or_default(),
        }))
    }
}

/// Parse a `0x`-prefixed hex quantity.
pub fn parse_quantity(raw: &str) -> Result<u64, IngestionError> {
    let digits = raw
        .strip_prefix("0x")
        .or_else(|| raw.strip_prefix("0X"))
        .ok_or_else(|| IngestionError::Rpc(format!("quantity {raw:?} is not 0x-prefixed")))?;
    u64::from_str_radix(digits, 16)
        .map_err(|e| IngestionError::Rpc(format!("invalid quantity {raw:?}: {e}")))
}

fn parse_notification(text: &str, subscription: &str) -> Result<Option<RawLog>, IngestionError> {
    let frame: WsFrame = serde_json::from_str(text)
        .map_err(|e| IngestionError::Subscription(format!("malformed frame: {e}")))?;
    let Some(params) = frame.params else {
        return Ok(None);
    };
    if params.subscription != subscription {
        return Ok(None);
    }
    let log: RpcLog = serde_json::from_value(params.result)
        .map_err(|e| IngestionError::Subscription(format!("malformed log: {e}")))?;
    log.into_raw()
}

/// Chain client over HTTP and WebSocket JSON-RPC endpoints.
pub struct RpcChainClient {
    http: reqwest::Client,
    rpc_url: String,
    ws_url: String,
    request_id: AtomicU64,
}

impl RpcChainClient {
    /// Build the HTTP client. No connection is made until the first call.
    pub fn new(rpc_url: impl Into<String>, ws_url: impl Into<String>) -> Result<Self, IngestionError> {
        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| IngestionError::Rpc(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            http,
            rpc_url: rpc_url.into(),
            ws_url: ws_url.into(),
            request_id: AtomicU64::new(1),
        })
    }

    fn next_id(&self) -> u64 {
        self.request_id.fetch_add(1, Ordering::Relaxed)
    }

    async fn call(&self, method: &'static str, params: Value) -> Result<Value, IngestionError> {
        let request = json!({
            "jsonrpc": "2.0",
            "id": self.next_id(),
            "method": method,
            "params": params,
        });

        let response: RpcResponse = self
            .http
            .post(&self.rpc_url)
            .json(&request)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|e| IngestionError::Rpc(format!("{method}: {e}")))?
            .json()
            .await
            .map_err(|e| IngestionError::Rpc(format!("{method}: invalid response: {e}")))?;

        response.into_result(method)
    }
}

#[async_trait]
impl ChainClient for RpcChainClient {
    async fn block_number(&self) -> Result<u64, IngestionError> {
        let result = self.call("eth_blockNumber", json!([])).await?;
        let raw = result
            .as_str()
            .ok_or_else(|| IngestionError::Rpc("eth_blockNumber result is not a string".to_string()))?;
        parse_quantity(raw)
    }

    async fn filter_logs(
        &self,
        contract: Address,
        from_block: u64,
        to_block: u64,
    ) -> Result<Vec<RawLog>, IngestionError> {
        let result = self
            .call(
                "eth_getLogs",
                json!([{
                    "address": contract,
                    "fromBlock": format!("{from_block:#x}"),
                    "toBlock": format!("{to_block:#x}"),
                }]),
            )
            .await?;

        let logs: Vec<RpcLog> = serde_json::from_value(result)
            .map_err(|e| IngestionError::Rpc(format!("eth_getLogs: malformed logs: {e}")))?;

        let mut out = Vec::with_capacity(logs.len());
        for log in logs {
            if let Some(raw) = log.into_raw()? {
                out.push(raw);
            }
        }
        debug!(
            contract = %contract,
            from_block,
            to_block,
            count = out.len(),
            "eth_getLogs returned"
        );
        Ok(out)
    }

    async fn subscribe_logs(&self, contract: Address) -> Result<LogSubscription, IngestionError> {
        let subscription_error = |e: WsError| IngestionError::Subscription(e.to_string());

        let (socket, _) = connect_async(self.ws_url.as_str())
            .await
            .map_err(subscription_error)?;
        let (mut write, mut read) = socket.split();

        let id = self.next_id();
        let request = json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": "eth_subscribe",
            "params": ["logs", { "address": contract }],
        });
        write
            .send(Message::Text(request.to_string().into()))
            .await
            .map_err(subscription_error)?;

        let subscription = loop {
            let text = match read.next().await {
                Some(Ok(Message::Text(text))) => text,
                Some(Ok(Message::Close(_))) | None => {
                    return Err(IngestionError::Subscription(
                        "socket closed before eth_subscribe reply".to_string(),
                    ))
                }
                Some(Ok(_)) => continue,
                Some(Err(e)) => return Err(subscription_error(e)),
            };
            let Ok(frame) = serde_json::from_str::<WsFrame>(text.as_str()) else {
                continue;
            };
            if frame.id != Some(id) {
                continue;
            }
            if let Some(err) = frame.error {
                return Err(IngestionError::Subscription(format!(
                    "eth_subscribe failed with {}: {}",
                    err.code, err.message
                )));
            }
            match frame.result.as_ref().and_then(Value::as_str) {
                Some(sub) => break sub.to_string(),
                None => {
                    return Err(IngestionError::Subscription(
                        "eth_subscribe returned no subscription id".to_string(),
                    ))
                }
            }
        };

        info!(contract = %contract, subscription = %subscription, "Log subscription confirmed");

        let (tx, rx) = mpsc::channel(SUBSCRIPTION_BUFFER);
        tokio::spawn(async move {
            forward_notifications(read, subscription, tx).await;
            drop(write);
        });
        Ok(LogSubscription::new(rx))
    }
}

/// Pump log notifications into the subscription channel until the socket
/// ends or the listener drops its side.
async fn forward_notifications<R>(mut read: R, subscription: String, tx: LiveSender)
where
    R: Stream<Item = Result<Message, WsError>> + Unpin,
{
    loop {
        let next = tokio::select! {
            _ = tx.closed() => return,
            next = read.next() => next,
        };
        match next {
            Some(Ok(Message::Text(text))) => match parse_notification(text.as_str(), &subscription) {
                Ok(Some(log)) => {
                    if tx.send(Ok(log)).await.is_err() {
                        return;
                    }
                }
                Ok(None) => {}
                Err(e) => warn!(subscription = %subscription, error = %e, "Dropping notification"),
            },
            Some(Ok(Message::Close(_))) | None => {
                debug!(subscription = %subscription, "Subscription socket closed");
                return;
            }
            Some(Ok(_)) => {}
            Some(Err(e)) => {
                let _ = tx
                    .send(Err(IngestionError::Subscription(e.to_string())))
                    .await;
                return;
            }
        }
    }
}
