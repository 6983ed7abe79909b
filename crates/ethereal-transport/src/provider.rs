//! A transport-agnostic facade so `ethereal-client` can talk to either an
//! HTTP or a WebSocket node without branching on the connection kind.

use ethereal_primitives::Result;
use serde_json::Value;

use crate::http::HttpProvider;
use crate::websocket::WsProvider;

/// Either connection kind, behind one call surface.
#[derive(Clone)]
pub enum Provider {
    Http(HttpProvider),
    Ws(WsProvider),
}

impl Provider {
    pub async fn request(&self, method: &str, params: Value) -> Result<Value> {
        match self {
            Provider::Http(http) => http.send(method, params).await,
            Provider::Ws(ws) => ws.send(method, params).await,
        }
    }
}

impl From<HttpProvider> for Provider {
    fn from(http: HttpProvider) -> Self {
        Provider::Http(http)
    }
}

impl From<WsProvider> for Provider {
    fn from(ws: WsProvider) -> Self {
        Provider::Ws(ws)
    }
}
