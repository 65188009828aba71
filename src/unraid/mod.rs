//! Unraid GraphQL client and API type definitions.
//!
//! [`UnraidClient`] is the concrete HTTP client. Coordinators depend on the
//! [`UnraidApi`] trait instead so their poll logic can be exercised against a
//! stub in tests. Mutations (container/vm/array/parity control) live directly
//! on [`UnraidClient`]; they are one-shot actions outside the poll path.

pub mod client;
pub mod detect;
pub mod types;

pub use client::UnraidClient;

use crate::error::Result;
use std::future::Future;
use types::*;

/// Read surface of the Unraid API, one method per logical resource.
///
/// Every method performs one authenticated GraphQL query and returns the
/// typed result. Implementations must not retry internally; the coordinators
/// own the retry cadence.
pub trait UnraidApi: Send + Sync {
    fn server_info(&self) -> impl Future<Output = Result<ServerInfo>> + Send;
    fn system_metrics(&self) -> impl Future<Output = Result<SystemMetrics>> + Send;
    fn notifications_overview(&self) -> impl Future<Output = Result<NotificationOverview>> + Send;
    fn docker_containers(&self) -> impl Future<Output = Result<Vec<DockerContainer>>> + Send;
    fn virtual_machines(&self) -> impl Future<Output = Result<Vec<VirtualMachine>>> + Send;
    fn ups_devices(&self) -> impl Future<Output = Result<Vec<UpsDevice>>> + Send;
    fn array_status(&self) -> impl Future<Output = Result<ArrayStatus>> + Send;
    fn shares(&self) -> impl Future<Output = Result<Vec<Share>>> + Send;
    fn parity_history(&self) -> impl Future<Output = Result<Vec<ParityCheck>>> + Send;
    fn services(&self) -> impl Future<Output = Result<Vec<ServiceInfo>>> + Send;
    fn registration(&self) -> impl Future<Output = Result<Registration>> + Send;
    fn cloud_status(&self) -> impl Future<Output = Result<CloudStatus>> + Send;
    fn remote_access(&self) -> impl Future<Output = Result<RemoteAccess>> + Send;
    fn system_vars(&self) -> impl Future<Output = Result<SystemVars>> + Send;
    fn plugins(&self) -> impl Future<Output = Result<Vec<PluginInfo>>> + Send;
}
