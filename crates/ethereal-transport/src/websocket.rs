//! Correlated WebSocket JSON-RPC transport.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use ethereal_primitives::{Error, Result};
use futures_util::{SinkExt, StreamExt};
use parking_lot::Mutex;
use serde_json::Value;
use tokio::net::TcpStream;
use tokio::sync::{mpsc, oneshot};
use tokio::time::timeout;
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};

use crate::jsonrpc::{encode_request, parse_frame, Frame, RawResponse};
use crate::slot_table::SlotTable;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

const DEFAULT_SLOT_CAPACITY: usize = 65_536;
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
const RECONNECT_BASE: Duration = Duration::from_millis(200);
const RECONNECT_MAX: Duration = Duration::from_secs(10);

/// Whether the provider owns the lifetime of its background I/O; only an
/// owned runtime is ever shut down by `close()`.
enum IoOwnership {
    Ambient,
    Owned(tokio::runtime::Runtime),
}

struct Registered {
    method: String,
    params: Value,
    sink: mpsc::UnboundedSender<Value>,
}

struct Inner {
    url: String,
    slots: SlotTable,
    outbound: Mutex<Option<mpsc::UnboundedSender<WsMessage>>>,
    subscriptions: Mutex<std::collections::HashMap<String, Registered>>,
    closed: AtomicBool,
    generation: AtomicU64,
    default_timeout: Duration,
    ownership: Mutex<Option<IoOwnership>>,
}

/// A single WebSocket connection to a node, with request/response
/// correlation, subscription routing, and reconnect-with-resubscribe.
#[derive(Clone)]
pub struct WsProvider {
    inner: Arc<Inner>,
}

/// A live subscription's notification stream.
pub struct Subscription {
    pub id: String,
    receiver: mpsc::UnboundedReceiver<Value>,
}

impl Subscription {
    pub async fn next(&mut self) -> Option<Value> {
        self.receiver.recv().await
    }
}

impl WsProvider {
    /// Connects using the ambient Tokio runtime; `close()` will not shut
    /// down any runtime, since none was created here.
    pub async fn connect(url: impl Into<String>) -> Result<Self> {
        Self::connect_inner(url.into()).await
    }

    /// Connects using a runtime the provider creates and therefore owns;
    /// `close()` shuts that runtime down. Use this only when the caller is
    /// not already inside a Tokio context. The reactor and producer tasks
    /// run on this same runtime, so it must outlive the provider.
    pub fn connect_with_owned_runtime(url: impl Into<String>) -> Result<Self> {
        let runtime = tokio::runtime::Runtime::new()
            .map_err(|e| Error::Io(format!("failed to start owned runtime: {e}")))?;
        let url = url.into();
        let provider = runtime.block_on(Self::connect_inner(url))?;
        *provider.inner.ownership.lock() = Some(IoOwnership::Owned(runtime));
        Ok(provider)
    }

    async fn connect_inner(url: String) -> Result<Self> {
        let inner = Arc::new(Inner {
            url: url.clone(),
            slots: SlotTable::new(DEFAULT_SLOT_CAPACITY),
            outbound: Mutex::new(None),
            subscriptions: Mutex::new(std::collections::HashMap::new()),
            closed: AtomicBool::new(false),
            generation: AtomicU64::new(0),
            default_timeout: DEFAULT_TIMEOUT,
            ownership: Mutex::new(Some(IoOwnership::Ambient)),
        });
        establish(inner.clone()).await?;
        Ok(WsProvider { inner })
    }

    /// Sends a request and blocks until the response arrives or the
    /// provider's default timeout expires.
    pub async fn send(&self, method: &str, params: Value) -> Result<Value> {
        self.send_with_timeout(method, params, self.inner.default_timeout)
            .await
    }

    pub async fn send_with_timeout(
        &self,
        method: &str,
        params: Value,
        request_timeout: Duration,
    ) -> Result<Value> {
        if self.inner.closed.load(Ordering::Acquire) {
            return Err(Error::Closed);
        }
        let id = self.inner.slots.next_id();
        let rx = self.inner.slots.acquire(id)?;
        let frame = encode_request(id, method, &params);
        self.enqueue(WsMessage::Text(frame))?;

        match timeout(request_timeout, rx).await {
            Ok(Ok(Ok(response))) => response.into_result(),
            Ok(Ok(Err(e))) => Err(e),
            Ok(Err(_)) => Err(Error::ConnectionLost),
            Err(_) => {
                self.inner.slots.release_if_current(id);
                Err(Error::Timeout)
            }
        }
    }

    /// Submits a request without waiting; the returned receiver completes
    /// when the response arrives or the request is failed.
    pub fn send_async(
        &self,
        method: &str,
        params: Value,
    ) -> Result<oneshot::Receiver<std::result::Result<RawResponse, Error>>> {
        if self.inner.closed.load(Ordering::Acquire) {
            return Err(Error::Closed);
        }
        let id = self.inner.slots.next_id();
        let rx = self.inner.slots.acquire(id)?;
        let frame = encode_request(id, method, &params);
        self.enqueue(WsMessage::Text(frame))?;
        Ok(rx)
    }

    /// Opens a subscription (`eth_subscribe`), returning a handle whose
    /// `next()` yields notifications; on reconnect the subscription is
    /// silently re-registered under a fresh server-side id.
    pub async fn subscribe(&self, params: Value) -> Result<Subscription> {
        let result = self.send("eth_subscribe", params.clone()).await?;
        let server_id = result
            .as_str()
            .ok_or_else(|| Error::Malformed("eth_subscribe did not return a subscription id".to_string()))?
            .to_string();
        let (tx, rx) = mpsc::unbounded_channel();
        self.inner.subscriptions.lock().insert(
            server_id.clone(),
            Registered {
                method: "eth_subscribe".to_string(),
                params,
                sink: tx,
            },
        );
        Ok(Subscription {
            id: server_id,
            receiver: rx,
        })
    }

    fn enqueue(&self, message: WsMessage) -> Result<()> {
        let guard = self.inner.outbound.lock();
        match guard.as_ref() {
            Some(tx) => tx.send(message).map_err(|_| Error::ConnectionLost),
            None => Err(Error::ConnectionLost),
        }
    }

    /// Idempotent: completes every outstanding handle with `Closed`, drains
    /// the producer, stops the reactor, and shuts down an owned runtime (if
    /// any). Never touches a runtime the caller supplied.
    pub async fn close(&self) {
        if self.inner.closed.swap(true, Ordering::AcqRel) {
            return;
        }
        self.inner.slots.fail_all(|| Error::Closed);
        if let Some(tx) = self.inner.outbound.lock().take() {
            drop(tx);
        }
        // bounded grace period for the producer to drain in-flight writes
        tokio::time::sleep(Duration::from_millis(50)).await;
        if let Some(IoOwnership::Owned(runtime)) = self.inner.ownership.lock().take() {
            // `shutdown_background` returns immediately instead of joining
            // worker threads, which would deadlock when `close()` runs on
            // a task driven by this same runtime.
            runtime.shutdown_background();
        }
    }

    pub fn orphaned_responses(&self) -> u64 {
        self.inner.slots.orphaned_responses()
    }
}

async fn establish(inner: Arc<Inner>) -> Result<()> {
    let (stream, _response) = tokio_tungstenite::connect_async(&inner.url)
        .await
        .map_err(|e| Error::Io(format!("websocket connect failed: {e}")))?;
    spawn_io_tasks(inner, stream);
    Ok(())
}

fn spawn_io_tasks(inner: Arc<Inner>, stream: WsStream) {
    let (mut write, mut read) = stream.split();
    let (tx, mut rx) = mpsc::unbounded_channel::<WsMessage>();
    *inner.outbound.lock() = Some(tx);
    let generation = inner.generation.load(Ordering::Acquire);

    // producer: drains the outbound queue onto the socket
    tokio::spawn(async move {
        while let Some(message) = rx.recv().await {
            if write.send(message).await.is_err() {
                break;
            }
        }
    });

    // reactor: the single task that owns the read half
    tokio::spawn(async move {
        loop {
            match read.next().await {
                Some(Ok(WsMessage::Text(text))) => dispatch(&inner, &text),
                Some(Ok(WsMessage::Close(_))) | None => {
                    on_disconnect(&inner, generation).await;
                    break;
                }
                Some(Ok(_)) => continue,
                Some(Err(_)) => {
                    on_disconnect(&inner, generation).await;
                    break;
                }
            }
        }
    });
}

fn dispatch(inner: &Arc<Inner>, text: &str) {
    let frame = match parse_frame(text) {
        Ok(frame) => frame,
        Err(e) => {
            tracing::debug!(error = %e, "dropping unparsable frame");
            return;
        }
    };
    match frame {
        Frame::Response { id, response } => {
            inner.slots.complete(id, response);
        }
        Frame::Notification { subscription, result } => {
            let subs = inner.subscriptions.lock();
            if let Some(registered) = subs.get(&subscription) {
                let _ = registered.sink.send(result);
            }
        }
    }
}

async fn on_disconnect(inner: &Arc<Inner>, generation: u64) {
    if inner.closed.load(Ordering::Acquire) {
        return;
    }
    // stale reactor from a previous generation; a newer one already owns reconnection
    if inner.generation.load(Ordering::Acquire) != generation {
        return;
    }
    inner.slots.fail_all(|| Error::ConnectionLost);
    *inner.outbound.lock() = None;
    inner.generation.fetch_add(1, Ordering::AcqRel);
    reconnect_with_backoff(inner.clone()).await;
}

async fn reconnect_with_backoff(inner: Arc<Inner>) {
    let mut delay = RECONNECT_BASE;
    loop {
        if inner.closed.load(Ordering::Acquire) {
            return;
        }
        match tokio_tungstenite::connect_async(&inner.url).await {
            Ok((stream, _)) => {
                spawn_io_tasks(inner.clone(), stream);
                resubscribe(&inner).await;
                return;
            }
            Err(e) => {
                tracing::warn!(error = %e, delay_ms = delay.as_millis() as u64, "reconnect attempt failed");
                tokio::time::sleep(delay).await;
                delay = (delay * 2).min(RECONNECT_MAX);
            }
        }
    }
}

async fn resubscribe(inner: &Arc<Inner>) {
    let previous: Vec<(String, Registered)> = {
        let mut subs = inner.subscriptions.lock();
        subs.drain().collect()
    };
    for (_old_id, registered) in previous {
        let id = inner.slots.next_id();
        let rx = match inner.slots.acquire(id) {
            Ok(rx) => rx,
            Err(_) => continue,
        };
        let frame = encode_request(id, &registered.method, &registered.params);
        if let Some(tx) = inner.outbound.lock().as_ref() {
            let _ = tx.send(WsMessage::Text(frame));
        }
        if let Ok(Ok(response)) = rx.await {
            if let Ok(Value::String(new_id)) = response.into_result() {
                inner.subscriptions.lock().insert(
                    new_id,
                    Registered {
                        method: registered.method,
                        params: registered.params,
                        sink: registered.sink,
                    },
                );
            }
        }
    }
}
