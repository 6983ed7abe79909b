//! Plain HTTP JSON-RPC transport.
//!
//! No slot-table backpressure here: concurrency is bounded by `reqwest`'s
//! own connection pool, plus an optional caller-configured semaphore for
//! callers who want an explicit cap on in-flight requests.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use ethereal_primitives::{Error, Result};
use serde_json::Value;
use tokio::sync::Semaphore;

use crate::jsonrpc::{encode_request, RawResponse};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// A plain request/response HTTP JSON-RPC client. Cheap to clone: the
/// underlying `reqwest::Client` is itself a cheap `Arc` handle.
#[derive(Clone)]
pub struct HttpProvider {
    client: reqwest::Client,
    url: String,
    next_id: Arc<AtomicU64>,
    concurrency: Option<Arc<Semaphore>>,
}

impl HttpProvider {
    pub fn new(url: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .map_err(|e| Error::Io(format!("failed to build http client: {e}")))?;
        Ok(HttpProvider {
            client,
            url: url.into(),
            next_id: Arc::new(AtomicU64::new(1)),
            concurrency: None,
        })
    }

    /// Caps the number of requests this provider has in flight at once.
    /// Opt-in: by default requests are bounded only by `reqwest`'s pool.
    pub fn with_max_concurrency(mut self, max: usize) -> Self {
        self.concurrency = Some(Arc::new(Semaphore::new(max)));
        self
    }

    pub async fn send(&self, method: &str, params: Value) -> Result<Value> {
        let _permit = match &self.concurrency {
            Some(semaphore) => Some(
                semaphore
                    .clone()
                    .acquire_owned()
                    .await
                    .map_err(|_| Error::Closed)?,
            ),
            None => None,
        };

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let body = encode_request(id, method, &params);

        let response = self
            .client
            .post(&self.url)
            .header("content-type", "application/json")
            .body(body)
            .send()
            .await
            .map_err(|e| Error::Io(format!("http request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(Error::Io(format!(
                "http request failed with status {}",
                response.status()
            )));
        }

        let text = response
            .text()
            .await
            .map_err(|e| Error::Io(format!("failed to read http response body: {e}")))?;
        let raw: RawResponse = parse_http_body(&text)?;
        raw.into_result()
    }
}

fn parse_http_body(text: &str) -> Result<RawResponse> {
    let value: Value = serde_json::from_str(text)
        .map_err(|e| Error::Malformed(format!("invalid JSON-RPC response body: {e}")))?;
    let error = value.get("error").map(|e| ethereal_primitives::error::RpcError {
        code: e.get("code").and_then(Value::as_i64).unwrap_or(0),
        message: e
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        data: e
            .get("data")
            .map(|d| d.as_str().map(str::to_string).unwrap_or_else(|| d.to_string())),
    });
    Ok(RawResponse {
        result: value.get("result").cloned(),
        error,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_success_body() {
        let raw = parse_http_body(r#"{"jsonrpc":"2.0","id":1,"result":"0x1"}"#).unwrap();
        assert_eq!(raw.result, Some(Value::String("0x1".to_string())));
        assert!(raw.error.is_none());
    }

    #[test]
    fn parses_an_error_body() {
        let raw = parse_http_body(
            r#"{"jsonrpc":"2.0","id":1,"error":{"code":-32000,"message":"execution reverted","data":"0x"}}"#,
        )
        .unwrap();
        let error = raw.error.unwrap();
        assert_eq!(error.code, -32000);
        assert_eq!(error.data.as_deref(), Some("0x"));
    }
}
