//! Wire format: request encoding and response/notification parsing.

use std::fmt::Write as _;

use ethereal_primitives::error::RpcError;
use ethereal_primitives::{Error, Result};
use serde::Deserialize;
use serde_json::Value;

/// Writes `{"jsonrpc":"2.0","method":"<m>","params":<p>,"id":<n>}` directly
/// onto a string buffer, without building an intermediate `serde_json::Value`
/// object graph for the envelope (`params` itself is already a `Value` the
/// caller assembled from request-specific types).
pub fn encode_request(id: u64, method: &str, params: &Value) -> String {
    let mut out = String::with_capacity(64 + method.len());
    out.push_str(r#"{"jsonrpc":"2.0","method":""#);
    out.push_str(method);
    out.push_str(r#"","params":"#);
    // `to_string` on a `Value` does not allocate an extra graph; it walks
    // the one the caller already built.
    let _ = write!(out, "{params}");
    out.push_str(r#","id":"#);
    let _ = write!(out, "{id}");
    out.push('}');
    out
}

/// A parsed inbound JSON-RPC frame: either a correlated response or an
/// uncorrelated subscription notification.
pub enum Frame {
    Response { id: u64, response: RawResponse },
    Notification { subscription: String, result: Value },
}

/// The envelope carried through the slot table to a waiting caller.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub result: Option<Value>,
    pub error: Option<RpcError>,
}

impl RawResponse {
    pub fn result(value: Value) -> Self {
        RawResponse {
            result: Some(value),
            error: None,
        }
    }

    pub fn into_result(self) -> Result<Value> {
        match (self.result, self.error) {
            (_, Some(error)) => Err(Error::Rpc(error)),
            (Some(result), None) => Ok(result),
            (None, None) => Ok(Value::Null),
        }
    }
}

#[derive(Deserialize)]
struct WireFrame {
    id: Option<IdOrNull>,
    method: Option<String>,
    params: Option<Value>,
    result: Option<Value>,
    error: Option<WireError>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum IdOrNull {
    Number(u64),
    Other(Value),
}

#[derive(Deserialize)]
struct WireError {
    code: i64,
    message: String,
    data: Option<Value>,
}

/// Parses one inbound text frame per the deserialization rules: presence of
/// `id` marks a response; `method` + `params` with no `id` marks a
/// subscription notification carrying `params.subscription`.
pub fn parse_frame(text: &str) -> Result<Frame> {
    let wire: WireFrame = serde_json::from_str(text)
        .map_err(|e| Error::Malformed(format!("invalid JSON-RPC frame: {e}")))?;

    if let Some(IdOrNull::Number(id)) = wire.id {
        let error = wire.error.map(|e| RpcError {
            code: e.code,
            message: e.message,
            data: e.data.map(|d| d.as_str().map(str::to_string).unwrap_or_else(|| d.to_string())),
        });
        return Ok(Frame::Response {
            id,
            response: RawResponse {
                result: wire.result,
                error,
            },
        });
    }

    if let Some(method) = wire.method {
        if method == "eth_subscription" {
            let params = wire.params.ok_or_else(|| {
                Error::Malformed("subscription notification missing params".to_string())
            })?;
            let subscription = params
                .get("subscription")
                .and_then(Value::as_str)
                .ok_or_else(|| {
                    Error::Malformed("subscription notification missing params.subscription".to_string())
                })?
                .to_string();
            let result = params
                .get("result")
                .cloned()
                .unwrap_or(Value::Null);
            return Ok(Frame::Notification {
                subscription,
                result,
            });
        }
    }

    Err(Error::Malformed(format!(
        "frame is neither a response nor a subscription notification: {text}"
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_request_envelope() {
        let encoded = encode_request(7, "eth_chainId", &serde_json::json!([]));
        let value: Value = serde_json::from_str(&encoded).unwrap();
        assert_eq!(value["jsonrpc"], "2.0");
        assert_eq!(value["method"], "eth_chainId");
        assert_eq!(value["id"], 7);
        assert_eq!(value["params"], serde_json::json!([]));
    }

    #[test]
    fn parses_success_response() {
        let frame = parse_frame(r#"{"jsonrpc":"2.0","id":3,"result":"0x1"}"#).unwrap();
        match frame {
            Frame::Response { id, response } => {
                assert_eq!(id, 3);
                assert_eq!(response.result, Some(Value::String("0x1".to_string())));
            }
            _ => panic!("expected a response frame"),
        }
    }

    #[test]
    fn parses_error_response() {
        let frame = parse_frame(
            r#"{"jsonrpc":"2.0","id":3,"error":{"code":-32000,"message":"execution reverted"}}"#,
        )
        .unwrap();
        match frame {
            Frame::Response { response, .. } => {
                assert_eq!(response.error.unwrap().code, -32000);
            }
            _ => panic!("expected a response frame"),
        }
    }

    #[test]
    fn parses_subscription_notification() {
        let frame = parse_frame(
            r#"{"jsonrpc":"2.0","method":"eth_subscription","params":{"subscription":"0xabc","result":{"foo":1}}}"#,
        )
        .unwrap();
        match frame {
            Frame::Notification { subscription, result } => {
                assert_eq!(subscription, "0xabc");
                assert_eq!(result["foo"], 1);
            }
            _ => panic!("expected a notification frame"),
        }
    }
}
