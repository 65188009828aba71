//! System Tier (30s)
//!
//! The fast tier: server identity, cpu/memory metrics, and notification
//! counts are required; containers, vms, and UPS devices degrade to empty
//! lists when their subsystems are unreachable (e.g. the Docker daemon is
//! down while the server itself is fine).

use super::{fetch_optional, fetch_required, PollError};
use crate::unraid::types::*;
use crate::unraid::UnraidApi;
use serde::Serialize;

/// One successful system-tier cycle. Immutable once published.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SystemSnapshot {
    pub server_info: ServerInfo,
    pub metrics: SystemMetrics,
    pub notifications: NotificationOverview,
    pub containers: Vec<DockerContainer>,
    pub vms: Vec<VirtualMachine>,
    pub ups_devices: Vec<UpsDevice>,
    /// Convenience copy of `notifications.unread.total`.
    pub unread_count: i64,
}

pub async fn poll<C: UnraidApi>(client: &C) -> Result<SystemSnapshot, PollError> {
    let server_info = fetch_required("server info", client.server_info()).await?;
    let metrics = fetch_required("system metrics", client.system_metrics()).await?;
    let notifications =
        fetch_required("notification overview", client.notifications_overview()).await?;

    let containers =
        fetch_optional("docker containers", client.docker_containers(), Vec::new()).await?;
    let vms = fetch_optional("virtual machines", client.virtual_machines(), Vec::new()).await?;
    let ups_devices = fetch_optional("ups devices", client.ups_devices(), Vec::new()).await?;

    let unread_count = notifications.unread.total;
    Ok(SystemSnapshot {
        server_info,
        metrics,
        notifications,
        containers,
        vms,
        ups_devices,
        unread_count,
    })
}
