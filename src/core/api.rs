//! HTTP + WebSocket API for the coordinator
//!
//! Endpoints:
//! - GET  /health - Health check
//! - GET  /state - System snapshot and operating mode
//! - GET  /components/{id} - One component level
//! - POST /components - Register a component
//! - PUT  /components/{id} - Set a component level
//! - PUT  /strategy - Switch aggregation strategy
//! - POST /harmonize - Set every component
//! - POST /emergency - Reset every component to the baseline
//! - GET  /audit - Audit log
//! - WS   /ws - Snapshot after every mutation
//!
//! One coordinator sits behind a mutex, so mutations never interleave.

use axum::{
    extract::{Path, State, WebSocketUpgrade, ws::{Message, WebSocket}},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post, put},
    Router,
};
use futures_util::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::{broadcast, Mutex};
use tracing::{debug, info};

use crate::BASELINE;
use crate::core::SafetyCoordinator;
use crate::core::command::{is_valid_component_id, DEFAULT_EMERGENCY_REASON};
use crate::types::{
    AggregationStrategy, AuditEntry, OperatingMode, SafetyError, SeverityBucket, SystemSnapshot,
};

/// Capacity of the live update channel
const UPDATE_CHANNEL_CAPACITY: usize = 100;

/// App state
pub struct AppState {
    pub coordinator: Mutex<SafetyCoordinator>,
    pub update_tx: broadcast::Sender<SystemSnapshot>,
}

/// Error body
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

/// Errors mapped onto HTTP
#[derive(Debug)]
pub enum ApiError {
    Safety(SafetyError),
    InvalidComponentId(String),
}

impl From<SafetyError> for ApiError {
    fn from(err: SafetyError) -> Self {
        Self::Safety(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error, message) = match self {
            ApiError::Safety(err) => {
                let status = match &err {
                    SafetyError::UnknownComponent(_) => StatusCode::NOT_FOUND,
                    SafetyError::DuplicateComponent(_) => StatusCode::CONFLICT,
                    SafetyError::NoComponentsRegistered => StatusCode::CONFLICT,
                    SafetyError::InvalidLevel(_) => StatusCode::UNPROCESSABLE_ENTITY,
                };
                (status, err.kind(), err.to_string())
            }
            ApiError::InvalidComponentId(id) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "InvalidComponentId",
                format!("'{}' is not a valid component id", id),
            ),
        };
        let body = ErrorResponse {
            error: error.to_string(),
            message,
        };
        (status, Json(body)).into_response()
    }
}

/// Health response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub components: usize,
}

/// State response
#[derive(Debug, Serialize)]
pub struct StateResponse {
    #[serde(flatten)]
    pub snapshot: SystemSnapshot,
    pub operating_mode: &'static OperatingMode,
}

/// Component response
#[derive(Debug, Serialize)]
pub struct ComponentResponse {
    pub component_id: String,
    pub level: f64,
}

/// Register component request
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub id: String,
    pub level: Option<f64>,
}

/// Set level request
#[derive(Debug, Deserialize)]
pub struct SetLevelRequest {
    pub level: f64,
}

/// Strategy request
#[derive(Debug, Deserialize)]
pub struct StrategyRequest {
    pub strategy: AggregationStrategy,
}

/// Harmonize request
#[derive(Debug, Deserialize)]
pub struct HarmonizeRequest {
    pub level: f64,
}

/// Emergency request
#[derive(Debug, Default, Deserialize)]
pub struct EmergencyRequest {
    pub reason: Option<String>,
}

/// Result of any mutation
#[derive(Debug, Serialize)]
pub struct MutationResponse {
    pub bucket: SeverityBucket,
    pub system_level: f64,
    pub emergency_active: bool,
}

/// Create the API router
pub fn create_router(coordinator: SafetyCoordinator) -> Router {
    let (update_tx, _) = broadcast::channel(UPDATE_CHANNEL_CAPACITY);
    let state = Arc::new(AppState {
        coordinator: Mutex::new(coordinator),
        update_tx,
    });

    Router::new()
        .route("/health", get(health))
        .route("/state", get(get_state))
        .route("/components", post(register_component))
        .route("/components/:id", get(get_component).put(set_component))
        .route("/strategy", put(set_strategy))
        .route("/harmonize", post(harmonize))
        .route("/emergency", post(emergency))
        .route("/audit", get(get_audit))
        .route("/ws", get(websocket_handler))
        .with_state(state)
}

/// Health check endpoint
async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let coordinator = state.coordinator.lock().await;
    Json(HealthResponse {
        status: "ok".to_string(),
        version: crate::VERSION.to_string(),
        components: coordinator.registry().len(),
    })
}

/// Current snapshot
async fn get_state(State(state): State<Arc<AppState>>) -> Result<Json<StateResponse>, ApiError> {
    let coordinator = state.coordinator.lock().await;
    let snapshot = coordinator.snapshot()?;
    let operating_mode = snapshot.bucket.operating_mode();
    Ok(Json(StateResponse { snapshot, operating_mode }))
}

/// One component
async fn get_component(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ComponentResponse>, ApiError> {
    let coordinator = state.coordinator.lock().await;
    let level = coordinator.get_level(&id)?;
    Ok(Json(ComponentResponse { component_id: id, level }))
}

/// Register a component
async fn register_component(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<MutationResponse>), ApiError> {
    if !is_valid_component_id(&req.id) {
        return Err(ApiError::InvalidComponentId(req.id));
    }
    let mut coordinator = state.coordinator.lock().await;
    coordinator.register_component(req.id, req.level.unwrap_or(BASELINE))?;
    Ok((StatusCode::CREATED, Json(publish(&state, &coordinator)?)))
}

/// Set one component
async fn set_component(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<SetLevelRequest>,
) -> Result<Json<MutationResponse>, ApiError> {
    let mut coordinator = state.coordinator.lock().await;
    coordinator.set_component_safety(&id, req.level)?;
    Ok(Json(publish(&state, &coordinator)?))
}

/// Switch strategy
async fn set_strategy(
    State(state): State<Arc<AppState>>,
    Json(req): Json<StrategyRequest>,
) -> Result<Json<MutationResponse>, ApiError> {
    let mut coordinator = state.coordinator.lock().await;
    coordinator.set_strategy(req.strategy)?;
    Ok(Json(publish(&state, &coordinator)?))
}

/// Set every component
async fn harmonize(
    State(state): State<Arc<AppState>>,
    Json(req): Json<HarmonizeRequest>,
) -> Result<Json<MutationResponse>, ApiError> {
    let mut coordinator = state.coordinator.lock().await;
    coordinator.harmonize_all(req.level)?;
    Ok(Json(publish(&state, &coordinator)?))
}

/// Emergency reset
async fn emergency(
    State(state): State<Arc<AppState>>,
    Json(req): Json<EmergencyRequest>,
) -> Result<Json<MutationResponse>, ApiError> {
    let reason = req.reason.unwrap_or_else(|| DEFAULT_EMERGENCY_REASON.to_string());
    let mut coordinator = state.coordinator.lock().await;
    coordinator.emergency_stabilize(&reason)?;
    Ok(Json(publish(&state, &coordinator)?))
}

/// Audit log, oldest first
async fn get_audit(State(state): State<Arc<AppState>>) -> Json<Vec<AuditEntry>> {
    let coordinator = state.coordinator.lock().await;
    Json(coordinator.audit_log().entries().cloned().collect())
}

/// Broadcast the post-mutation snapshot and build the response.
/// Called with the coordinator still locked so updates go out in order.
fn publish(state: &AppState, coordinator: &SafetyCoordinator) -> Result<MutationResponse, SafetyError> {
    let snapshot = coordinator.snapshot()?;
    let response = MutationResponse {
        bucket: snapshot.bucket,
        system_level: snapshot.system_level,
        emergency_active: snapshot.emergency_active,
    };
    // no subscribers is fine
    let _ = state.update_tx.send(snapshot);
    Ok(response)
}

/// WebSocket handler for live updates
async fn websocket_handler(
    State(state): State<Arc<AppState>>,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    let rx = state.update_tx.subscribe();
    ws.on_upgrade(move |socket| handle_websocket(socket, rx))
}

/// Forward snapshots until either side goes away
async fn handle_websocket(socket: WebSocket, mut rx: broadcast::Receiver<SystemSnapshot>) {
    let (mut sender, mut receiver) = socket.split();
    debug!("websocket subscriber connected");

    loop {
        tokio::select! {
            update = rx.recv() => {
                let snapshot = match update {
                    Ok(snapshot) => snapshot,
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        debug!(skipped, "websocket subscriber lagged");
                        continue;
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                };
                let json = match serde_json::to_string(&snapshot) {
                    Ok(json) => json,
                    Err(_) => continue,
                };
                if sender.send(Message::Text(json)).await.is_err() {
                    break;
                }
            }
            incoming = receiver.next() => {
                match incoming {
                    Some(Ok(Message::Close(_))) | None | Some(Err(_)) => break,
                    Some(Ok(_)) => {}
                }
            }
        }
    }
    debug!("websocket subscriber disconnected");
}

/// Run the API server
pub async fn run_server(addr: &str, coordinator: SafetyCoordinator) -> std::io::Result<()> {
    let router = create_router(coordinator);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "harmony API listening");
    println!("Harmony API running on {}", addr);
    println!("  GET  /health            - Health check");
    println!("  GET  /state             - System snapshot");
    println!("  GET  /components/:id    - Component level");
    println!("  POST /components        - Register component");
    println!("  PUT  /components/:id    - Set component level");
    println!("  PUT  /strategy          - Switch strategy");
    println!("  POST /harmonize         - Set every component");
    println!("  POST /emergency         - Reset to baseline");
    println!("  GET  /audit             - Audit log");
    println!("  WS   /ws                - Live updates");
    axum::serve(listener, router).await?;
    Ok(())
}
