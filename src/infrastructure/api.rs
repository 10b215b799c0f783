//! API server
//!
//! Serves the market-data endpoints (validate, quote, status) and the
//! WebSocket broadcast channel. Quote and validate are thin synchronous
//! wrappers over the quote source; the WebSocket side registers
//! subscribers that the relay's broadcaster feeds.

use axum::{
    extract::ws::{Message, WebSocket, WebSocketUpgrade},
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use futures_util::{SinkExt, StreamExt};
use serde::Serialize;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::mpsc;
use tower_http::cors::CorsLayer;

use crate::core::{PriceQuote, Symbol};
use crate::infrastructure::metrics::MetricsCollector;
use crate::relay::{SubscriberId, SubscriberRegistry};
use crate::upstream::{QuoteClient, QuoteError, QuoteSource};
use crate::RelayError;

/// Relay status DTO for /api/market-data/status
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusDto {
    pub cycles: u64,
    pub quotes_fetched: u64,
    pub fetch_failures: u64,
    pub broadcasts: u64,
    pub frames_delivered: u64,
    pub subscribers: usize,
    /// Milliseconds since the last broadcast, capped at 10s
    pub staleness_ms: u64,
    pub uptime_seconds: u64,
}

/// DTO for the validate endpoint (field names match the original
/// public contract)
#[derive(Debug, Serialize)]
pub struct ValidationDto {
    pub symbol: String,
    #[serde(rename = "isValid")]
    pub is_valid: bool,
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub source: QuoteClient,
    pub registry: Arc<SubscriberRegistry>,
    pub metrics: Arc<MetricsCollector>,
    /// Frame buffer per subscriber before it is considered too slow
    pub subscriber_buffer: usize,
}

/// Start the API server
pub async fn start_server(state: AppState, port: u16) -> Result<(), RelayError> {
    let app = Router::new()
        // Health check
        .route("/", get(root_status))
        // Market data endpoints
        .route("/api/market-data/validate/:symbol", get(validate_symbol))
        .route("/api/market-data/quote/:symbol", get(get_quote))
        .route("/api/market-data/status", get(get_status))
        // Broadcast channel
        .route("/ws", get(ws_handler))
        // Middleware
        .layer(CorsLayer::permissive())
        .with_state(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("API server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(RelayError::Io)?;

    axum::serve(listener, app).await.map_err(RelayError::Io)?;

    Ok(())
}

/// Handler for / - liveness check
async fn root_status() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "market-relay is running" }))
}

/// Handler for /api/market-data/validate/:symbol
async fn validate_symbol(
    State(state): State<AppState>,
    Path(raw): Path<String>,
) -> Result<Json<ValidationDto>, ApiError> {
    let symbol = Symbol::new(&raw).map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let is_valid = state
        .source
        .validate(&symbol)
        .await
        .map_err(|e| ApiError::Unavailable(e.to_string()))?;

    Ok(Json(ValidationDto {
        symbol: symbol.to_string(),
        is_valid,
    }))
}

/// Handler for /api/market-data/quote/:symbol
async fn get_quote(
    State(state): State<AppState>,
    Path(raw): Path<String>,
) -> Result<Json<PriceQuote>, ApiError> {
    let symbol = Symbol::new(&raw).map_err(|e| ApiError::BadRequest(e.to_string()))?;

    match state.source.fetch_quote(&symbol).await {
        Ok(quote) => Ok(Json(quote)),
        Err(QuoteError::NotFound(_)) => Err(ApiError::NotFound(format!(
            "Invalid ticker: price not found for symbol: {}",
            symbol
        ))),
        Err(e) => Err(ApiError::Unavailable(e.to_string())),
    }
}

/// Handler for /api/market-data/status
async fn get_status(State(state): State<AppState>) -> Json<StatusDto> {
    let snapshot = state.metrics.snapshot();
    Json(StatusDto {
        cycles: snapshot.cycles,
        quotes_fetched: snapshot.quotes_fetched,
        fetch_failures: snapshot.fetch_failures,
        broadcasts: snapshot.broadcasts,
        frames_delivered: snapshot.frames_delivered,
        subscribers: state.registry.len(),
        staleness_ms: state.metrics.broadcast_staleness_ms(),
        uptime_seconds: snapshot.uptime_seconds,
    })
}

/// Handler for /ws - subscriber connections
async fn ws_handler(State(state): State<AppState>, ws: WebSocketUpgrade) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_subscriber(socket, state))
}

/// Pump broadcast frames into one subscriber's socket.
///
/// The subscriber is registered for the lifetime of this task and
/// unregistered on any exit path: client close, write error, or the
/// broadcaster pruning the channel.
async fn handle_subscriber(socket: WebSocket, state: AppState) {
    let id = SubscriberId::new();
    let (tx, mut rx) = mpsc::channel(state.subscriber_buffer.max(1));
    state.registry.add(id, tx);
    state.metrics.subscriber_connected();
    tracing::info!("Subscriber {} connected", id);

    let (mut sink, mut stream) = socket.split();

    loop {
        tokio::select! {
            frame = rx.recv() => {
                match frame {
                    Some(frame) => {
                        if sink.send(Message::Text(frame.to_string())).await.is_err() {
                            break;
                        }
                    }
                    // Channel gone means the broadcaster pruned us
                    None => break,
                }
            }
            incoming = stream.next() => {
                match incoming {
                    Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                    // No client protocol beyond connect/disconnect
                    Some(Ok(_)) => {}
                }
            }
        }
    }

    state.registry.remove(id);
    state.metrics.subscriber_disconnected();
    tracing::info!("Subscriber {} disconnected", id);
}

/// Synchronous endpoint errors, mapped to HTTP statuses
#[derive(Debug)]
enum ApiError {
    /// Malformed symbol in the request path
    BadRequest(String),
    /// Quote source does not know the symbol
    NotFound(String),
    /// Quote source unreachable or erroring; retryable by the caller
    Unavailable(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, detail) = match self {
            ApiError::BadRequest(detail) => (StatusCode::BAD_REQUEST, detail),
            ApiError::NotFound(detail) => (StatusCode::NOT_FOUND, detail),
            ApiError::Unavailable(detail) => (StatusCode::SERVICE_UNAVAILABLE, detail),
        };
        (status, Json(serde_json::json!({ "detail": detail }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_status_mapping() {
        let bad = ApiError::BadRequest("empty symbol".to_string()).into_response();
        assert_eq!(bad.status(), StatusCode::BAD_REQUEST);

        let missing = ApiError::NotFound("no such ticker".to_string()).into_response();
        assert_eq!(missing.status(), StatusCode::NOT_FOUND);

        let down = ApiError::Unavailable("connect timeout".to_string()).into_response();
        assert_eq!(down.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn test_validation_dto_wire_shape() {
        let dto = ValidationDto {
            symbol: "AAPL".to_string(),
            is_valid: true,
        };
        let json = serde_json::to_string(&dto).unwrap();
        assert_eq!(json, r#"{"symbol":"AAPL","isValid":true}"#);
    }

    #[test]
    fn test_status_dto_wire_shape() {
        let dto = StatusDto {
            cycles: 1,
            quotes_fetched: 2,
            fetch_failures: 0,
            broadcasts: 1,
            frames_delivered: 3,
            subscribers: 3,
            staleness_ms: 120,
            uptime_seconds: 60,
        };
        let value: serde_json::Value =
            serde_json::from_str(&serde_json::to_string(&dto).unwrap()).unwrap();
        assert_eq!(value["quotesFetched"], 2);
        assert_eq!(value["uptimeSeconds"], 60);
        assert_eq!(value["subscribers"], 3);
    }

    #[test]
    fn test_router_builds() {
        let state = AppState {
            source: QuoteClient::new("http://localhost:1", std::time::Duration::from_secs(1)),
            registry: Arc::new(SubscriberRegistry::new()),
            metrics: Arc::new(MetricsCollector::new()),
            subscriber_buffer: 8,
        };
        let _router: Router = Router::new()
            .route("/api/market-data/quote/:symbol", get(get_quote))
            .with_state(state);
    }
}
