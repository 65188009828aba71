//! Infrastructure Tier (900s)
//!
//! Best-effort aggregate of slow-changing state. Every field is optional, so
//! a cycle only fails outright on an authentication error (which
//! `fetch_optional` always propagates).

use super::{fetch_optional, PollError};
use crate::unraid::types::*;
use crate::unraid::UnraidApi;
use serde::Serialize;

/// One infrastructure-tier cycle. Immutable once published.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InfraSnapshot {
    pub services: Vec<ServiceInfo>,
    pub registration: Option<Registration>,
    pub cloud: Option<CloudStatus>,
    pub remote_access: Option<RemoteAccess>,
    pub vars: Option<SystemVars>,
    pub plugins: Vec<PluginInfo>,
}

pub async fn poll<C: UnraidApi>(client: &C) -> Result<InfraSnapshot, PollError> {
    let services = fetch_optional("services", client.services(), Vec::new()).await?;
    let registration = fetch_optional(
        "registration",
        async { client.registration().await.map(Some) },
        None,
    )
    .await?;
    let cloud = fetch_optional(
        "cloud status",
        async { client.cloud_status().await.map(Some) },
        None,
    )
    .await?;
    let remote_access = fetch_optional(
        "remote access",
        async { client.remote_access().await.map(Some) },
        None,
    )
    .await?;
    let vars = fetch_optional(
        "system vars",
        async { client.system_vars().await.map(Some) },
        None,
    )
    .await?;
    let plugins = fetch_optional("plugins", client.plugins(), Vec::new()).await?;

    Ok(InfraSnapshot {
        services,
        registration,
        cloud,
        remote_access,
        vars,
        plugins,
    })
}
