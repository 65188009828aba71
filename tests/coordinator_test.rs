//! Coordinator behavior: required vs optional classification, partial-failure
//! aggregation, and the publish/retain contract of the tier loop.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::watch;
use unraid_monitor::coordinator::{
    self, infrastructure, storage, system, FailureKind, PollError, StorageSnapshot,
    SystemSnapshot, TierHealth,
};
use unraid_monitor::error::{Result, UnraidError};
use unraid_monitor::unraid::types::*;
use unraid_monitor::unraid::UnraidApi;

/// How a stubbed resource should fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Failure {
    Auth,
    Connection,
    Timeout,
    Api,
}

impl Failure {
    fn to_error(self) -> UnraidError {
        match self {
            Failure::Auth => UnraidError::Auth("api key rejected".into()),
            Failure::Connection => UnraidError::Connection("connection refused".into()),
            Failure::Timeout => UnraidError::Timeout { timeout_secs: 30 },
            Failure::Api => UnraidError::Api("malformed response".into()),
        }
    }
}

fn outcome<T>(failure: Option<Failure>, ok: T) -> Result<T> {
    match failure {
        Some(failure) => Err(failure.to_error()),
        None => Ok(ok),
    }
}

/// Stub API: healthy by default, individual resources fail on demand.
#[derive(Default)]
struct StubApi {
    fail_server_info: Option<Failure>,
    fail_metrics: Option<Failure>,
    fail_notifications: Option<Failure>,
    fail_containers: Option<Failure>,
    fail_vms: Option<Failure>,
    fail_ups: Option<Failure>,
    fail_array: Option<Failure>,
    fail_shares: Option<Failure>,
    fail_parity: Option<Failure>,
    fail_services: Option<Failure>,
    fail_registration: Option<Failure>,
    fail_cloud: Option<Failure>,
    fail_remote_access: Option<Failure>,
    fail_vars: Option<Failure>,
    fail_plugins: Option<Failure>,
}

fn sample_server_info() -> ServerInfo {
    ServerInfo {
        name: "tower".into(),
        guid: Some("a1b2c3d4-0000-1111-2222-333344445555".into()),
        version: Some("7.0.0".into()),
        uptime_seconds: Some(86400.0),
    }
}

fn sample_metrics() -> SystemMetrics {
    SystemMetrics {
        cpu: Some(CpuMetrics {
            percent_total: Some(12.5),
        }),
        memory: Some(MemoryMetrics {
            total: Some(17_179_869_184),
            free: Some(2_147_483_648),
            available: Some(8_589_934_592),
            percent_total: Some(50.0),
        }),
    }
}

fn sample_notifications() -> NotificationOverview {
    NotificationOverview {
        unread: NotificationCounts {
            info: 2,
            warning: 1,
            alert: 0,
            total: 3,
        },
        archive: NotificationCounts::default(),
    }
}

fn sample_containers() -> Vec<DockerContainer> {
    vec![DockerContainer {
        id: "abc123".into(),
        names: vec!["/plex".into()],
        image: Some("plexinc/pms-docker".into()),
        state: Some("RUNNING".into()),
        status: Some("Up 3 days".into()),
        auto_start: true,
    }]
}

fn sample_vms() -> Vec<VirtualMachine> {
    vec![VirtualMachine {
        uuid: "vm-1".into(),
        name: Some("win11".into()),
        state: Some("SHUTOFF".into()),
    }]
}

fn sample_array() -> ArrayStatus {
    ArrayStatus {
        state: Some("STARTED".into()),
        capacity: Some(ArrayCapacity {
            kilobytes: SizeCounts {
                free: Some(1_000_000),
                used: Some(3_000_000),
                total: Some(4_000_000),
            },
        }),
        parities: vec![ArrayDisk {
            id: "parity".into(),
            name: Some("parity".into()),
            device: Some("sda".into()),
            size: Some(4_000_000),
            status: Some("DISK_OK".into()),
            temp: Some(34.0),
            num_errors: Some(0),
            fs_size: None,
            fs_free: None,
            fs_used: None,
        }],
        disks: vec![ArrayDisk {
            id: "disk1".into(),
            name: Some("disk1".into()),
            device: Some("sdb".into()),
            size: Some(4_000_000),
            status: Some("DISK_OK".into()),
            temp: Some(36.0),
            num_errors: Some(0),
            fs_size: Some(4_000_000),
            fs_free: Some(1_000_000),
            fs_used: Some(3_000_000),
        }],
        caches: vec![],
    }
}

fn sample_shares() -> Vec<Share> {
    vec![Share {
        name: "appdata".into(),
        free: Some(500_000),
        used: Some(100_000),
        size: Some(600_000),
        comment: None,
    }]
}

fn sample_parity_history() -> Vec<ParityCheck> {
    vec![ParityCheck {
        date: Some("2026-08-01T04:00:00Z".into()),
        duration: Some(28_800),
        speed: Some("150 MB/s".into()),
        status: Some("COMPLETED".into()),
        errors: Some(0),
        progress: None,
    }]
}

fn sample_services() -> Vec<ServiceInfo> {
    vec![ServiceInfo {
        id: "svc-1".into(),
        name: Some("unraid-api".into()),
        online: Some(true),
        uptime: Some("PT72H".into()),
        version: Some("4.2.0".into()),
    }]
}

impl UnraidApi for StubApi {
    async fn server_info(&self) -> Result<ServerInfo> {
        outcome(self.fail_server_info, sample_server_info())
    }

    async fn system_metrics(&self) -> Result<SystemMetrics> {
        outcome(self.fail_metrics, sample_metrics())
    }

    async fn notifications_overview(&self) -> Result<NotificationOverview> {
        outcome(self.fail_notifications, sample_notifications())
    }

    async fn docker_containers(&self) -> Result<Vec<DockerContainer>> {
        outcome(self.fail_containers, sample_containers())
    }

    async fn virtual_machines(&self) -> Result<Vec<VirtualMachine>> {
        outcome(self.fail_vms, sample_vms())
    }

    async fn ups_devices(&self) -> Result<Vec<UpsDevice>> {
        outcome(self.fail_ups, vec![])
    }

    async fn array_status(&self) -> Result<ArrayStatus> {
        outcome(self.fail_array, sample_array())
    }

    async fn shares(&self) -> Result<Vec<Share>> {
        outcome(self.fail_shares, sample_shares())
    }

    async fn parity_history(&self) -> Result<Vec<ParityCheck>> {
        outcome(self.fail_parity, sample_parity_history())
    }

    async fn services(&self) -> Result<Vec<ServiceInfo>> {
        outcome(self.fail_services, sample_services())
    }

    async fn registration(&self) -> Result<Registration> {
        outcome(
            self.fail_registration,
            Registration {
                license_type: Some("PRO".into()),
                state: Some("EGUID".into()),
                expiration: None,
            },
        )
    }

    async fn cloud_status(&self) -> Result<CloudStatus> {
        outcome(self.fail_cloud, CloudStatus::default())
    }

    async fn remote_access(&self) -> Result<RemoteAccess> {
        outcome(self.fail_remote_access, RemoteAccess::default())
    }

    async fn system_vars(&self) -> Result<SystemVars> {
        outcome(self.fail_vars, SystemVars::default())
    }

    async fn plugins(&self) -> Result<Vec<PluginInfo>> {
        outcome(self.fail_plugins, vec![])
    }
}

#[tokio::test]
async fn system_poll_aggregates_all_resources() {
    let snapshot = system::poll(&StubApi::default()).await.unwrap();

    assert_eq!(snapshot.server_info.name, "tower");
    assert_eq!(snapshot.containers.len(), 1);
    assert_eq!(snapshot.vms.len(), 1);
    assert_eq!(snapshot.unread_count, 3);
}

#[tokio::test]
async fn optional_docker_failure_degrades_to_empty() {
    // Docker daemon unreachable, everything else healthy: the cycle must
    // still publish with containers defaulted to empty.
    let api = StubApi {
        fail_containers: Some(Failure::Connection),
        ..Default::default()
    };

    let snapshot = system::poll(&api).await.unwrap();

    assert!(snapshot.containers.is_empty());
    assert_eq!(snapshot.server_info.name, "tower");
    assert_eq!(snapshot.vms.len(), 1);
    assert_eq!(snapshot.unread_count, 3);
}

#[tokio::test]
async fn optional_failures_are_independent() {
    let api = StubApi {
        fail_containers: Some(Failure::Api),
        fail_ups: Some(Failure::Connection),
        ..Default::default()
    };

    let snapshot = system::poll(&api).await.unwrap();

    assert!(snapshot.containers.is_empty());
    assert!(snapshot.ups_devices.is_empty());
    // The vm fetch sits between the two failed ones and must be unaffected.
    assert_eq!(snapshot.vms.len(), 1);
}

#[tokio::test]
async fn required_metrics_failure_aborts_system_cycle() {
    let api = StubApi {
        fail_metrics: Some(Failure::Api),
        ..Default::default()
    };

    let err = system::poll(&api).await.unwrap_err();
    assert_eq!(err.kind, FailureKind::Api);
    assert!(err.message.contains("system metrics"));
}

#[tokio::test]
async fn auth_failure_on_optional_resource_propagates() {
    let api = StubApi {
        fail_ups: Some(Failure::Auth),
        ..Default::default()
    };

    let err = system::poll(&api).await.unwrap_err();
    assert_eq!(err.kind, FailureKind::Auth);
}

#[tokio::test]
async fn storage_array_timeout_aborts_cycle_as_connection_failure() {
    let api = StubApi {
        fail_array: Some(Failure::Timeout),
        ..Default::default()
    };

    let err = storage::poll(&api).await.unwrap_err();
    assert_eq!(err.kind, FailureKind::Connection);
    assert!(err.message.contains("array status"));
}

#[tokio::test]
async fn broken_share_data_does_not_block_array_reporting() {
    let api = StubApi {
        fail_shares: Some(Failure::Api),
        ..Default::default()
    };

    let snapshot = storage::poll(&api).await.unwrap();

    assert!(snapshot.shares.is_empty());
    assert_eq!(snapshot.array.disks.len(), 1);
    assert_eq!(snapshot.parity_history.len(), 1);
    // Disk lookup spans data, parity, and cache members.
    assert!(snapshot.disk_by_id("disk1").is_some());
    assert!(snapshot.disk_by_id("parity").is_some());
    assert!(snapshot.disk_by_id("missing").is_none());
}

#[tokio::test]
async fn infrastructure_tolerates_every_non_auth_failure() {
    let api = StubApi {
        fail_services: Some(Failure::Api),
        fail_registration: Some(Failure::Connection),
        fail_cloud: Some(Failure::Timeout),
        fail_remote_access: Some(Failure::Api),
        fail_vars: Some(Failure::Connection),
        fail_plugins: Some(Failure::Api),
        ..Default::default()
    };

    let snapshot = infrastructure::poll(&api).await.unwrap();

    assert!(snapshot.services.is_empty());
    assert!(snapshot.registration.is_none());
    assert!(snapshot.cloud.is_none());
    assert!(snapshot.remote_access.is_none());
    assert!(snapshot.vars.is_none());
    assert!(snapshot.plugins.is_empty());
}

#[tokio::test]
async fn infrastructure_auth_failure_still_propagates() {
    let api = StubApi {
        fail_plugins: Some(Failure::Auth),
        ..Default::default()
    };

    let err = infrastructure::poll(&api).await.unwrap_err();
    assert_eq!(err.kind, FailureKind::Auth);
}

#[tokio::test]
async fn polling_twice_with_identical_data_is_idempotent() {
    let api = StubApi::default();

    let first = system::poll(&api).await.unwrap();
    let second = system::poll(&api).await.unwrap();
    assert_eq!(first, second);

    let first = storage::poll(&api).await.unwrap();
    let second = storage::poll(&api).await.unwrap();
    assert_eq!(first, second);
}

#[tokio::test(start_paused = true)]
async fn tier_loop_retains_previous_snapshot_across_failures() {
    // Scripted outcomes: success, connection failure, success.
    let script: Arc<Mutex<VecDeque<std::result::Result<StorageSnapshot, PollError>>>> =
        Arc::new(Mutex::new(VecDeque::from([
            Ok(StorageSnapshot {
                array: sample_array(),
                shares: sample_shares(),
                parity_history: vec![],
            }),
            Err(PollError::classify(
                "array status",
                UnraidError::Connection("connection refused".into()),
            )),
            Ok(StorageSnapshot {
                array: sample_array(),
                shares: vec![],
                parity_history: sample_parity_history(),
            }),
        ])));

    let (snapshot_tx, snapshot_rx) = watch::channel(None);
    let (health_tx, mut health_rx) = watch::channel(TierHealth::pending());

    let poll_script = script.clone();
    tokio::spawn(coordinator::run_tier(
        "storage",
        Duration::from_secs(300),
        snapshot_tx,
        health_tx,
        move || {
            let script = poll_script.clone();
            async move {
                script.lock().unwrap().pop_front().unwrap_or_else(|| {
                    Err(PollError::classify(
                        "array status",
                        UnraidError::Connection("script exhausted".into()),
                    ))
                })
            }
        },
    ));

    // Cycle 1: success publishes a snapshot.
    health_rx.changed().await.unwrap();
    assert!(health_rx.borrow().available);
    let first = snapshot_rx.borrow().clone().expect("first snapshot");
    assert_eq!(first.shares.len(), 1);

    // Cycle 2: failure publishes nothing; the first snapshot stays current.
    health_rx.changed().await.unwrap();
    {
        let health = health_rx.borrow().clone();
        assert!(!health.available);
        assert_eq!(health.consecutive_failures, 1);
        assert_eq!(
            health.last_failure.as_ref().map(|f| f.kind),
            Some(FailureKind::Connection)
        );
    }
    let retained = snapshot_rx.borrow().clone().expect("retained snapshot");
    assert_eq!(*retained, *first);

    // Cycle 3: recovery publishes a fresh snapshot and clears the failure.
    health_rx.changed().await.unwrap();
    {
        let health = health_rx.borrow().clone();
        assert!(health.available);
        assert_eq!(health.consecutive_failures, 0);
        assert!(health.last_failure.is_none());
    }
    let fresh = snapshot_rx.borrow().clone().expect("fresh snapshot");
    assert!(fresh.shares.is_empty());
    assert_eq!(fresh.parity_history.len(), 1);
}

#[tokio::test(start_paused = true)]
async fn tier_loop_flags_auth_failures_for_reauthentication() {
    let (snapshot_tx, _snapshot_rx) = watch::channel::<Option<Arc<SystemSnapshot>>>(None);
    let (health_tx, mut health_rx) = watch::channel(TierHealth::pending());

    tokio::spawn(coordinator::run_tier(
        "system",
        Duration::from_secs(30),
        snapshot_tx,
        health_tx,
        move || async move {
            Err::<SystemSnapshot, _>(PollError::classify(
                "server info",
                UnraidError::Auth("api key rejected".into()),
            ))
        },
    ));

    health_rx.changed().await.unwrap();
    let health = health_rx.borrow().clone();
    assert!(health.auth_required);
    assert!(!health.available);

    // Auth failures keep being retried at the fixed cadence, counting up.
    health_rx.changed().await.unwrap();
    assert_eq!(health_rx.borrow().consecutive_failures, 2);
}
