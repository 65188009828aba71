//! HTTP Server and Coordinator Wiring
//!
//! Owns process startup: builds the API client, spawns the three tier
//! coordinators, and serves the entity API.
//!
//! # Endpoints
//!
//! - `GET /` - HTML landing page
//! - `GET /health` - per-tier health; 503 until the system tier has a
//!   snapshot, or while re-authentication is required
//! - `GET /api/entities` - every projected entity state
//! - `GET /api/system` / `/api/storage` / `/api/infrastructure` - the raw
//!   tier snapshot (404 before the tier's first successful cycle)
//! - `POST /api/docker/{id}/{start|stop}`
//! - `POST /api/vm/{id}/{start|stop|pause|resume}`
//! - `POST /api/array/{start|stop}`
//! - `POST /api/parity/{start|pause|resume|cancel}?correct=true`
//!
//! Actions go straight to the client; the owning tier's next poll reflects
//! their effect.

use crate::config::Config;
use crate::coordinator::{
    self, infrastructure, storage, system, InfraSnapshot, SnapshotReceiver, StorageSnapshot,
    SystemSnapshot, TierHealth,
};
use crate::entity::{self, control};
use crate::error::UnraidError;
use crate::unraid::UnraidClient;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{info, warn};

#[derive(Clone)]
struct AppState {
    client: Arc<UnraidClient>,
    ups: crate::config::UpsConfig,
    system_rx: SnapshotReceiver<SystemSnapshot>,
    storage_rx: SnapshotReceiver<StorageSnapshot>,
    infra_rx: SnapshotReceiver<InfraSnapshot>,
    system_health: watch::Receiver<TierHealth>,
    storage_health: watch::Receiver<TierHealth>,
    infra_health: watch::Receiver<TierHealth>,
}

/// One client per coordinator tier; sessions are never shared across tiers.
pub fn tier_clients(
    config: &crate::config::UnraidConfig,
) -> crate::error::Result<[Arc<UnraidClient>; 3]> {
    Ok([
        Arc::new(UnraidClient::new(config)?),
        Arc::new(UnraidClient::new(config)?),
        Arc::new(UnraidClient::new(config)?),
    ])
}

pub async fn start(config: Config) -> anyhow::Result<()> {
    // The action handlers get their own client too.
    let client = Arc::new(UnraidClient::new(&config.unraid)?);
    let [system_client, storage_client, infra_client] = tier_clients(&config.unraid)?;

    // Fail fast on servers the schema does not cover; transient connection
    // problems are fine here, the coordinators will keep retrying.
    match client.validate_connection().await {
        Ok(server) => info!(
            hostname = %server.name,
            version = server.version.as_deref().unwrap_or("unknown"),
            "connected to Unraid server"
        ),
        Err(err @ UnraidError::IncompatibleVersion { .. }) => return Err(err.into()),
        Err(err) => warn!("initial connection check failed, polling anyway: {err}"),
    }

    let (system_tx, system_rx) = watch::channel(None);
    let (storage_tx, storage_rx) = watch::channel(None);
    let (infra_tx, infra_rx) = watch::channel(None);
    let (system_health_tx, system_health) = watch::channel(TierHealth::pending());
    let (storage_health_tx, storage_health) = watch::channel(TierHealth::pending());
    let (infra_health_tx, infra_health) = watch::channel(TierHealth::pending());

    tokio::spawn(coordinator::run_tier(
        "system",
        Duration::from_secs(config.poll.system_interval_seconds),
        system_tx,
        system_health_tx,
        move || {
            let client = system_client.clone();
            async move { system::poll(client.as_ref()).await }
        },
    ));

    tokio::spawn(coordinator::run_tier(
        "storage",
        Duration::from_secs(config.poll.storage_interval_seconds),
        storage_tx,
        storage_health_tx,
        move || {
            let client = storage_client.clone();
            async move { storage::poll(client.as_ref()).await }
        },
    ));

    tokio::spawn(coordinator::run_tier(
        "infrastructure",
        Duration::from_secs(config.poll.infrastructure_interval_seconds),
        infra_tx,
        infra_health_tx,
        move || {
            let client = infra_client.clone();
            async move { infrastructure::poll(client.as_ref()).await }
        },
    ));

    let state = AppState {
        client,
        ups: config.ups.clone(),
        system_rx,
        storage_rx,
        infra_rx,
        system_health,
        storage_health,
        infra_health,
    };

    let app = Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_handler))
        .route("/api/entities", get(entities_handler))
        .route("/api/system", get(system_snapshot_handler))
        .route("/api/storage", get(storage_snapshot_handler))
        .route("/api/infrastructure", get(infra_snapshot_handler))
        .route("/api/docker/{id}/{action}", post(container_action_handler))
        .route("/api/vm/{id}/{action}", post(vm_action_handler))
        .route("/api/array/{action}", post(array_action_handler))
        .route("/api/parity/{action}", post(parity_action_handler))
        .with_state(state);

    let addr = format!("{}:{}", config.server.addr, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!("Entity API listening on {}", addr);
    info!("Entities available at http://{}/api/entities", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

async fn root_handler() -> impl IntoResponse {
    axum::response::Html(
        r#"<html>
<head><title>Unraid Monitor</title></head>
<body>
<h1>Unraid Monitor</h1>
<p><a href="/api/entities">Entities</a></p>
<p><a href="/health">Health</a></p>
</body>
</html>"#,
    )
}

/// Status for `/health`: healthy only once the system tier has published a
/// snapshot and no tier is waiting on new credentials. Credential problems
/// are the server's, not the caller's, so they read as unavailable too.
pub fn health_status(auth_required: bool, has_system_snapshot: bool) -> StatusCode {
    if !auth_required && has_system_snapshot {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}

async fn health_handler(State(state): State<AppState>) -> Response {
    let system = state.system_health.borrow().clone();
    let storage = state.storage_health.borrow().clone();
    let infrastructure = state.infra_health.borrow().clone();

    let auth_required =
        system.auth_required || storage.auth_required || infrastructure.auth_required;
    let has_system_snapshot = state.system_rx.borrow().is_some();

    let status = health_status(auth_required, has_system_snapshot);

    let body = json!({
        "status": if status == StatusCode::OK { "ok" } else { "unavailable" },
        "auth_required": auth_required,
        "tiers": {
            "system": system,
            "storage": storage,
            "infrastructure": infrastructure,
        },
    });
    (status, Json(body)).into_response()
}

async fn entities_handler(State(state): State<AppState>) -> Response {
    let system = state.system_rx.borrow().clone();
    let storage = state.storage_rx.borrow().clone();
    let infra = state.infra_rx.borrow().clone();

    let entities = entity::project_all(
        system.as_deref(),
        storage.as_deref(),
        infra.as_deref(),
        &state.ups,
    );
    Json(entities).into_response()
}

fn snapshot_response<S: serde::Serialize>(snapshot: Option<Arc<S>>) -> Response {
    match snapshot {
        Some(snapshot) => Json(snapshot.as_ref()).into_response(),
        None => (StatusCode::NOT_FOUND, "no snapshot yet").into_response(),
    }
}

async fn system_snapshot_handler(State(state): State<AppState>) -> Response {
    snapshot_response(state.system_rx.borrow().clone())
}

async fn storage_snapshot_handler(State(state): State<AppState>) -> Response {
    snapshot_response(state.storage_rx.borrow().clone())
}

async fn infra_snapshot_handler(State(state): State<AppState>) -> Response {
    snapshot_response(state.infra_rx.borrow().clone())
}

/// Map a client error onto an HTTP status for the action endpoints.
fn action_status(err: &UnraidError) -> StatusCode {
    match err {
        UnraidError::Auth(_) => StatusCode::UNAUTHORIZED,
        UnraidError::Connection(_)
        | UnraidError::Timeout { .. }
        | UnraidError::Ssl(_)
        | UnraidError::Api(_)
        | UnraidError::Deserialization(_) => StatusCode::BAD_GATEWAY,
        UnraidError::Config(_) => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn action_response(result: crate::error::Result<()>) -> Response {
    match result {
        Ok(()) => Json(json!({ "ok": true })).into_response(),
        Err(err) => {
            warn!("action failed: {err}");
            (action_status(&err), Json(json!({ "ok": false, "error": err.to_string() })))
                .into_response()
        }
    }
}

async fn container_action_handler(
    State(state): State<AppState>,
    Path((id, action)): Path<(String, String)>,
) -> Response {
    let action = match action.parse() {
        Ok(action) => action,
        Err(err) => return action_response(Err(err)),
    };
    action_response(control::run_container_action(&state.client, &id, action).await)
}

async fn vm_action_handler(
    State(state): State<AppState>,
    Path((id, action)): Path<(String, String)>,
) -> Response {
    let action = match action.parse() {
        Ok(action) => action,
        Err(err) => return action_response(Err(err)),
    };
    action_response(control::run_vm_action(&state.client, &id, action).await)
}

async fn array_action_handler(
    State(state): State<AppState>,
    Path(action): Path<String>,
) -> Response {
    let action = match action.parse() {
        Ok(action) => action,
        Err(err) => return action_response(Err(err)),
    };
    action_response(control::run_array_action(&state.client, action).await)
}

#[derive(Debug, Deserialize)]
struct ParityParams {
    /// Write corrections while checking (start only).
    #[serde(default)]
    correct: bool,
}

async fn parity_action_handler(
    State(state): State<AppState>,
    Path(action): Path<String>,
    Query(params): Query<ParityParams>,
) -> Response {
    let action = match action.parse() {
        Ok(action) => action,
        Err(err) => return action_response(Err(err)),
    };
    action_response(control::run_parity_action(&state.client, action, params.correct).await)
}
