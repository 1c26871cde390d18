//! HTTP Call Server Adapter
//!
//! Serves a [`CallHandler`] over HTTP with axum, the receiving half of
//! [`HttpTransport`](super::HttpTransport):
//!
//! | Route | Method | Body |
//! |-------|--------|------|
//! | `/shipping` | GET, params in query | status document (JSON) |
//! | `/metrics` | GET | Prometheus text |
//! | `/health` | GET | `ok` |
//!
//! The caller address handed to the handler is the [`ORIGIN_HEADER`] value
//! when present, otherwise `http://<socket address>`.

use super::http_transport::ORIGIN_HEADER;
use crate::ports::inbound::CallHandler;
use axum::extract::{ConnectInfo, Query, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use std::collections::HashMap;
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tower_http::trace::TraceLayer;
use tracing::{debug, info, warn};

/// Path remote calls are served on.
pub const SHIPPING_PATH: &str = "/shipping";

#[derive(Clone)]
struct ServerState {
    handler: Arc<dyn CallHandler>,
}

/// Router serving `handler`. Needs connect info, see [`HttpCallServer::serve`].
pub fn call_router(handler: Arc<dyn CallHandler>) -> Router {
    Router::new()
        .route(SHIPPING_PATH, get(handle_remote_call))
        .route("/metrics", get(serve_metrics))
        .route("/health", get(health_check))
        .layer(TraceLayer::new_for_http())
        .with_state(ServerState { handler })
}

async fn handle_remote_call(
    State(state): State<ServerState>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let caller = caller_address(&headers, peer);
    debug!(caller = %caller, "Remote call received");

    let reply = state.handler.handle_call(&caller, &params);
    match reply.to_json() {
        Ok(body) => ([(header::CONTENT_TYPE, "application/json")], body).into_response(),
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response(),
    }
}

async fn serve_metrics() -> Response {
    match fl_telemetry::encode_metrics() {
        Ok(text) => ([(header::CONTENT_TYPE, "text/plain; version=0.0.4")], text).into_response(),
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response(),
    }
}

async fn health_check() -> &'static str {
    "ok"
}

fn caller_address(headers: &HeaderMap, peer: SocketAddr) -> String {
    headers
        .get(ORIGIN_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| format!("http://{}", peer))
}

/// A running call server.
pub struct HttpCallServer {
    local_addr: SocketAddr,
    shutdown_tx: Option<oneshot::Sender<()>>,
    task: JoinHandle<io::Result<()>>,
}

impl HttpCallServer {
    /// Bind `addr` and start serving.
    pub async fn bind(addr: &str, handler: Arc<dyn CallHandler>) -> io::Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        Self::serve(listener, handler)
    }

    /// Start serving on an already bound listener.
    ///
    /// Must be called inside a tokio runtime.
    pub fn serve(listener: TcpListener, handler: Arc<dyn CallHandler>) -> io::Result<Self> {
        let local_addr = listener.local_addr()?;
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let app = call_router(handler).into_make_service_with_connect_info::<SocketAddr>();

        let task = tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    let _ = shutdown_rx.await;
                })
                .await
        });

        info!(addr = %local_addr, path = SHIPPING_PATH, "Shipping call server listening");
        Ok(Self {
            local_addr,
            shutdown_tx: Some(shutdown_tx),
            task,
        })
    }

    /// Bound socket address.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Address peers should configure for this node.
    pub fn url(&self) -> String {
        format!("http://{}{}", self.local_addr, SHIPPING_PATH)
    }

    /// Stop accepting calls and wait for in-flight ones to finish.
    pub async fn shutdown(mut self) -> io::Result<()> {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }

        match self.task.await {
            Ok(result) => result,
            Err(e) => {
                warn!(error = %e, "Call server task ended abnormally");
                Err(io::Error::other(e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::HttpTransport;
    use crate::algorithms::exchange::{evaluate_reply, RemoteReply};
    use crate::domain::ShippingConfig;
    use crate::ports::outbound::RemoteTransport;

    struct Echo;

    impl CallHandler for Echo {
        fn handle_call(&self, caller: &str, params: &HashMap<String, String>) -> RemoteReply {
            let call = params.get("call").cloned().unwrap_or_default();
            RemoteReply::ok(format!("{} from {}", call, caller))
        }
    }

    async fn echo_server() -> HttpCallServer {
        HttpCallServer::bind("127.0.0.1:0", Arc::new(Echo)).await.unwrap()
    }

    fn transport(public_address: Option<&str>) -> HttpTransport {
        HttpTransport::new(&ShippingConfig {
            public_address: public_address.map(str::to_string),
            ..ShippingConfig::default()
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_call_uses_origin_header() {
        let server = echo_server().await;
        let params = vec![("call".to_string(), "ping".to_string())];

        let body = transport(Some("http://dock-a.example/shipping"))
            .call(&server.url(), &params)
            .await;

        let reply = evaluate_reply(body).unwrap();
        assert_eq!(reply.response, "ping from http://dock-a.example/shipping");
        server.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_call_without_header_uses_socket_address() {
        let server = echo_server().await;
        let params = vec![("call".to_string(), "ping".to_string())];

        let body = transport(None).call(&server.url(), &params).await;

        let reply = evaluate_reply(body).unwrap();
        assert!(reply.response.starts_with("ping from http://127.0.0.1:"));
        server.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_metrics_and_health_routes() {
        let _ = fl_telemetry::register_metrics();
        fl_telemetry::SHIPMENTS_SENT.inc();
        let server = echo_server().await;
        let client = reqwest::Client::new();
        let base = format!("http://{}", server.local_addr());

        let metrics = client
            .get(format!("{}/metrics", base))
            .send()
            .await
            .unwrap()
            .text()
            .await
            .unwrap();
        assert!(metrics.contains("fl_shipping_shipments_sent_total"));

        let health = client
            .get(format!("{}/health", base))
            .send()
            .await
            .unwrap()
            .text()
            .await
            .unwrap();
        assert_eq!(health, "ok");
        server.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_shutdown_stops_answering() {
        let server = echo_server().await;
        let url = server.url();
        server.shutdown().await.unwrap();

        let config = ShippingConfig {
            request_timeout_secs: 1,
            connect_timeout_secs: 1,
            ..ShippingConfig::default()
        };
        let body = HttpTransport::new(&config).unwrap().call(&url, &[]).await;
        assert!(body.is_none());
    }
}
