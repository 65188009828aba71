//! Unraid API Type Definitions
//!
//! Rust struct definitions for the slices of the Unraid GraphQL schema this
//! monitor queries. Field names follow the schema's camelCase via serde.
//!
//! # Design Notes
//!
//! - **Optional Fields**: most fields are `Option<T>` because the API omits
//!   or nulls them depending on server version and hardware.
//! - **Serde Defaults**: `#[serde(default)]` is used extensively so a partial
//!   server response still deserializes; entity projections turn absent
//!   fields into an explicit unknown value rather than a fake zero.
//! - **PartialEq**: snapshots are compared field-wise in tests (idempotent
//!   polling), so every resource type derives it.

use serde::{Deserialize, Serialize};

/// GraphQL request envelope sent to `/graphql`.
#[derive(Debug, Serialize)]
pub struct GraphqlRequest {
    pub query: &'static str,
    #[serde(skip_serializing_if = "serde_json::Value::is_null")]
    pub variables: serde_json::Value,
}

/// GraphQL response envelope.
#[derive(Debug, Deserialize)]
pub struct GraphqlResponse {
    #[serde(default)]
    pub data: Option<serde_json::Value>,
    #[serde(default)]
    pub errors: Vec<GraphqlError>,
}

#[derive(Debug, Deserialize)]
pub struct GraphqlError {
    pub message: String,
}

/// Server identity from the `info` query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerInfo {
    pub name: String,
    #[serde(default)]
    pub guid: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub uptime_seconds: Option<f64>,
}

/// CPU and memory metrics from the `metrics` query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct SystemMetrics {
    #[serde(default)]
    pub cpu: Option<CpuMetrics>,
    #[serde(default)]
    pub memory: Option<MemoryMetrics>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CpuMetrics {
    #[serde(default)]
    pub percent_total: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct MemoryMetrics {
    #[serde(default)]
    pub total: Option<u64>,
    #[serde(default)]
    pub free: Option<u64>,
    /// Free plus reclaimable cache/buffers; the basis for "used".
    #[serde(default)]
    pub available: Option<u64>,
    #[serde(default)]
    pub percent_total: Option<f64>,
}

/// Docker container from the `docker { containers }` query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DockerContainer {
    pub id: String,
    #[serde(default)]
    pub names: Vec<String>,
    #[serde(default)]
    pub image: Option<String>,
    /// "RUNNING", "EXITED", ...
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub auto_start: bool,
}

impl DockerContainer {
    /// Display name: first name with the leading slash Docker prepends
    /// stripped, falling back to the id.
    pub fn display_name(&self) -> &str {
        self.names
            .first()
            .map(|n| n.trim_start_matches('/'))
            .filter(|n| !n.is_empty())
            .unwrap_or(&self.id)
    }

    pub fn is_running(&self) -> Option<bool> {
        self.state
            .as_deref()
            .map(|s| s.eq_ignore_ascii_case("running"))
    }
}

/// Virtual machine from the `vms { domain }` query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VirtualMachine {
    pub uuid: String,
    #[serde(default)]
    pub name: Option<String>,
    /// "RUNNING", "PAUSED", "SHUTOFF", ...
    #[serde(default)]
    pub state: Option<String>,
}

impl VirtualMachine {
    pub fn is_running(&self) -> Option<bool> {
        self.state
            .as_deref()
            .map(|s| s.eq_ignore_ascii_case("running"))
    }
}

/// UPS device from the `upsDevices` query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpsDevice {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    /// "ONLINE", "ONBATT", ...
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub battery: Option<UpsBattery>,
    #[serde(default)]
    pub power: Option<UpsPower>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpsBattery {
    #[serde(default)]
    pub charge_level: Option<f64>,
    /// Seconds of runtime remaining at current load.
    #[serde(default)]
    pub estimated_runtime: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpsPower {
    #[serde(default)]
    pub load_percentage: Option<f64>,
}

/// Notification counts from the `notifications { overview }` query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct NotificationOverview {
    #[serde(default)]
    pub unread: NotificationCounts,
    #[serde(default)]
    pub archive: NotificationCounts,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct NotificationCounts {
    #[serde(default)]
    pub info: i64,
    #[serde(default)]
    pub warning: i64,
    #[serde(default)]
    pub alert: i64,
    #[serde(default)]
    pub total: i64,
}

/// Array state, capacity, and member disks from the `array` query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ArrayStatus {
    /// "STARTED", "STOPPED", ...
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub capacity: Option<ArrayCapacity>,
    #[serde(default)]
    pub parities: Vec<ArrayDisk>,
    #[serde(default)]
    pub disks: Vec<ArrayDisk>,
    #[serde(default)]
    pub caches: Vec<ArrayDisk>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ArrayCapacity {
    #[serde(default)]
    pub kilobytes: SizeCounts,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct SizeCounts {
    #[serde(default)]
    pub free: Option<u64>,
    #[serde(default)]
    pub used: Option<u64>,
    #[serde(default)]
    pub total: Option<u64>,
}

/// A single array member (data disk, parity disk, or cache device).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArrayDisk {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub device: Option<String>,
    /// KiB.
    #[serde(default)]
    pub size: Option<u64>,
    /// "DISK_OK", "DISK_DSBL", "DISK_INVALID", ...
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub temp: Option<f64>,
    #[serde(default)]
    pub num_errors: Option<u64>,
    #[serde(default)]
    pub fs_size: Option<u64>,
    #[serde(default)]
    pub fs_free: Option<u64>,
    #[serde(default)]
    pub fs_used: Option<u64>,
}

pub const DISK_STATUS_OK: &str = "DISK_OK";

/// User share from the `shares` query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Share {
    pub name: String,
    /// KiB.
    #[serde(default)]
    pub free: Option<u64>,
    #[serde(default)]
    pub used: Option<u64>,
    #[serde(default)]
    pub size: Option<u64>,
    #[serde(default)]
    pub comment: Option<String>,
}

/// One parity-check record (current or historical).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ParityCheck {
    #[serde(default)]
    pub date: Option<String>,
    /// Seconds.
    #[serde(default)]
    pub duration: Option<u64>,
    #[serde(default)]
    pub speed: Option<String>,
    /// "RUNNING", "PAUSED", "COMPLETED", "FAILED", "CANCELLED", ...
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub errors: Option<u64>,
    /// Percent complete while running.
    #[serde(default)]
    pub progress: Option<f64>,
}

pub const PARITY_STATUS_FAILED: &str = "FAILED";
pub const PARITY_STATUS_RUNNING: &str = "RUNNING";
pub const PARITY_STATUS_PAUSED: &str = "PAUSED";
pub const ARRAY_STATE_STARTED: &str = "STARTED";

/// System service from the `services` query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceInfo {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub online: Option<bool>,
    #[serde(default)]
    pub uptime: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
}

/// License registration from the `registration` query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Registration {
    #[serde(rename = "type", default)]
    pub license_type: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub expiration: Option<String>,
}

/// Unraid Connect cloud status from the `cloud` query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct CloudStatus {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub relay_status: Option<String>,
}

/// Remote-access configuration from the `connect` query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct RemoteAccess {
    #[serde(default)]
    pub enabled: Option<bool>,
    #[serde(default)]
    pub accessible: Option<bool>,
}

/// Selected system variables from the `vars` query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct SystemVars {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub timezone: Option<String>,
    #[serde(default)]
    pub security: Option<String>,
    #[serde(default)]
    pub workgroup: Option<String>,
    #[serde(default)]
    pub shutdown_timeout: Option<u64>,
}

/// Installed plugin from the `plugins` query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PluginInfo {
    pub name: String,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub has_update: bool,
}
