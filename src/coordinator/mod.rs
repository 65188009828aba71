//! Tiered Poll Coordinators
//!
//! Three independent coordinators poll the Unraid API on different cadences:
//!
//! - **System** (30s): identity, cpu/memory, notifications, containers, vms, UPS
//! - **Storage** (300s): array, shares, parity history
//! - **Infrastructure** (900s): services, registration, cloud, vars, plugins
//!
//! Each poll cycle fetches its *required* resources first (any failure aborts
//! the cycle) and then its *optional* resources, each inside an isolated
//! failure boundary that substitutes the documented empty default. A cycle
//! that completes publishes an immutable snapshot over a `watch` channel;
//! a cycle that aborts publishes nothing, so subscribers keep reading the
//! previous snapshot.
//!
//! # Error Handling
//!
//! Required failures are classified into exactly one [`FailureKind`] and
//! recorded in the tier's [`TierHealth`]. Authentication failures are special
//! everywhere: they mean the session is invalid, so even an optional fetch
//! propagates them instead of degrading.

pub mod infrastructure;
pub mod storage;
pub mod system;

pub use infrastructure::InfraSnapshot;
pub use storage::StorageSnapshot;
pub use system::SystemSnapshot;

use crate::error::UnraidError;
use serde::Serialize;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

/// Outward classification of a failed poll cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// API key rejected; retrying without new credentials is pointless.
    Auth,
    /// Connection, timeout, or TLS failure; transient, retried next tick.
    Connection,
    /// The server answered but the response was an error or unparseable.
    Api,
    /// Anything the taxonomy does not cover.
    Unexpected,
}

/// A failed poll cycle: one kind plus a message naming the resource that
/// broke the cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PollError {
    pub kind: FailureKind,
    pub message: String,
}

impl PollError {
    /// Fold a client error into the four outward kinds.
    pub fn classify(resource: &str, err: UnraidError) -> Self {
        let kind = match &err {
            UnraidError::Auth(_) => FailureKind::Auth,
            UnraidError::Connection(_)
            | UnraidError::Timeout { .. }
            | UnraidError::Ssl(_)
            | UnraidError::Io(_) => FailureKind::Connection,
            UnraidError::Api(_)
            | UnraidError::IncompatibleVersion { .. }
            | UnraidError::Deserialization(_) => FailureKind::Api,
            UnraidError::Config(_) | UnraidError::Server(_) => FailureKind::Unexpected,
        };
        PollError {
            kind,
            message: format!("failed to fetch {resource}: {err}"),
        }
    }
}

impl std::fmt::Display for PollError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

/// Fetch a resource the snapshot cannot exist without. Any error aborts the
/// cycle with a classified failure.
pub async fn fetch_required<T, Fut>(
    resource: &str,
    fut: Fut,
) -> std::result::Result<T, PollError>
where
    Fut: Future<Output = crate::error::Result<T>>,
{
    fut.await.map_err(|err| PollError::classify(resource, err))
}

/// Fetch a resource the snapshot can live without.
///
/// Failures degrade to `default` and are logged at debug level, except
/// authentication failures: those indicate the whole session is invalid, not
/// just this field, and abort the cycle like a required failure would.
/// Each call is independent; one degraded field never affects another.
pub async fn fetch_optional<T, Fut>(
    resource: &str,
    fut: Fut,
    default: T,
) -> std::result::Result<T, PollError>
where
    Fut: Future<Output = crate::error::Result<T>>,
{
    match fut.await {
        Ok(value) => Ok(value),
        Err(err) if err.is_auth() => Err(PollError::classify(resource, err)),
        Err(err) => {
            debug!(resource, error = %err, "optional fetch failed, using default");
            Ok(default)
        }
    }
}

/// Health of one tier, published alongside its snapshots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TierHealth {
    /// True once the most recent cycle succeeded.
    pub available: bool,
    /// True while the last failure was an authentication failure; cleared
    /// only by a successful cycle (i.e. new credentials).
    pub auth_required: bool,
    pub consecutive_failures: u32,
    pub last_failure: Option<PollError>,
}

impl TierHealth {
    /// Initial state: nothing fetched yet.
    pub fn pending() -> Self {
        Self {
            available: false,
            auth_required: false,
            consecutive_failures: 0,
            last_failure: None,
        }
    }

    fn healthy() -> Self {
        Self {
            available: true,
            auth_required: false,
            consecutive_failures: 0,
            last_failure: None,
        }
    }

    fn failed(previous: &TierHealth, err: PollError) -> Self {
        Self {
            available: false,
            auth_required: err.kind == FailureKind::Auth,
            consecutive_failures: previous.consecutive_failures.saturating_add(1),
            last_failure: Some(err),
        }
    }
}

/// The current snapshot of a tier, absent until the first successful cycle.
pub type SnapshotReceiver<S> = watch::Receiver<Option<Arc<S>>>;

/// Drive one tier: tick, poll, publish.
///
/// Every failed cycle is treated as transient and retried at the next fixed
/// tick; there is no backoff. Auth failures are logged at error level and
/// flagged in [`TierHealth`] so the HTTP surface can demand new credentials
/// instead of silently retrying forever. The loop exits when all snapshot
/// subscribers are gone.
pub async fn run_tier<S, F, Fut>(
    tier: &'static str,
    interval: Duration,
    snapshot_tx: watch::Sender<Option<Arc<S>>>,
    health_tx: watch::Sender<TierHealth>,
    mut poll: F,
) where
    S: Send + Sync + 'static,
    F: FnMut() -> Fut,
    Fut: Future<Output = std::result::Result<S, PollError>>,
{
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    let mut previously_unavailable = false;

    loop {
        ticker.tick().await;

        match poll().await {
            Ok(snapshot) => {
                if previously_unavailable {
                    info!(tier, "poll recovered, publishing fresh snapshot");
                    previously_unavailable = false;
                }
                if snapshot_tx.send(Some(Arc::new(snapshot))).is_err() {
                    debug!(tier, "all subscribers gone, stopping coordinator");
                    return;
                }
                health_tx.send_replace(TierHealth::healthy());
            }
            Err(err) => {
                previously_unavailable = true;
                match err.kind {
                    FailureKind::Auth => {
                        error!(tier, "{} (re-authentication required)", err.message)
                    }
                    _ => warn!(tier, kind = ?err.kind, "{}", err.message),
                }
                let next = TierHealth::failed(&health_tx.borrow(), err);
                health_tx.send_replace(next);
                if snapshot_tx.is_closed() {
                    return;
                }
            }
        }
    }
}
