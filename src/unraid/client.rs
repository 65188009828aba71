//! Unraid GraphQL API Client
//!
//! Speaks GraphQL over HTTP(S) to the Unraid API plugin's `/graphql`
//! endpoint, authenticating every request with the `x-api-key` header.
//!
//! # Error Mapping
//!
//! - HTTP 401/403 → [`UnraidError::Auth`]
//! - transport failures → [`UnraidError::Connection`] / [`Timeout`] / [`Ssl`]
//! - GraphQL `errors` array → [`UnraidError::Api`] (or `Auth` when the
//!   message names the API key)
//! - missing/unparseable payload → [`UnraidError::Deserialization`]
//!
//! [`Timeout`]: UnraidError::Timeout
//! [`Ssl`]: UnraidError::Ssl

use crate::config::UnraidConfig;
use crate::error::{Result, UnraidError};
use crate::unraid::types::*;
use crate::unraid::UnraidApi;
use secrecy::ExposeSecret;
use serde_json::json;

/// Oldest Unraid API release whose schema this client understands.
pub const MIN_API_VERSION: &str = "4.0.0";

const QUERY_SERVER_INFO: &str = r#"query {
  info {
    os { hostname uptimeSeconds }
    machineId
    versions { unraid }
  }
}"#;

const QUERY_METRICS: &str = r#"query {
  metrics {
    cpu { percentTotal }
    memory { total free available percentTotal }
  }
}"#;

const QUERY_NOTIFICATIONS: &str = r#"query {
  notifications {
    overview {
      unread { info warning alert total }
      archive { info warning alert total }
    }
  }
}"#;

const QUERY_CONTAINERS: &str = r#"query {
  docker {
    containers { id names image state status autoStart }
  }
}"#;

const QUERY_VMS: &str = r#"query {
  vms {
    domain { uuid name state }
  }
}"#;

const QUERY_UPS_DEVICES: &str = r#"query {
  upsDevices {
    id name model status
    battery { chargeLevel estimatedRuntime }
    power { loadPercentage }
  }
}"#;

const QUERY_ARRAY: &str = r#"query {
  array {
    state
    capacity { kilobytes { free used total } }
    parities { id name device size status temp numErrors }
    disks { id name device size status temp numErrors fsSize fsFree fsUsed }
    caches { id name device size status temp numErrors fsSize fsFree fsUsed }
  }
}"#;

const QUERY_SHARES: &str = r#"query {
  shares { name free used size comment }
}"#;

const QUERY_PARITY_HISTORY: &str = r#"query {
  parityHistory { date duration speed status errors progress }
}"#;

const QUERY_SERVICES: &str = r#"query {
  services { id name online uptime version }
}"#;

const QUERY_REGISTRATION: &str = r#"query {
  registration { type state expiration }
}"#;

const QUERY_CLOUD: &str = r#"query {
  cloud { error status relayStatus }
}"#;

const QUERY_REMOTE_ACCESS: &str = r#"query {
  connect { enabled accessible }
}"#;

const QUERY_VARS: &str = r#"query {
  vars { name timezone security workgroup shutdownTimeout }
}"#;

const QUERY_PLUGINS: &str = r#"query {
  plugins { name version hasUpdate }
}"#;

const MUTATION_DOCKER_START: &str = r#"mutation ($id: PrefixedID!) {
  docker { start(id: $id) { id } }
}"#;

const MUTATION_DOCKER_STOP: &str = r#"mutation ($id: PrefixedID!) {
  docker { stop(id: $id) { id } }
}"#;

const MUTATION_VM_START: &str = r#"mutation ($id: PrefixedID!) {
  vm { start(id: $id) }
}"#;

const MUTATION_VM_STOP: &str = r#"mutation ($id: PrefixedID!) {
  vm { stop(id: $id) }
}"#;

const MUTATION_VM_PAUSE: &str = r#"mutation ($id: PrefixedID!) {
  vm { pause(id: $id) }
}"#;

const MUTATION_VM_RESUME: &str = r#"mutation ($id: PrefixedID!) {
  vm { resume(id: $id) }
}"#;

const MUTATION_ARRAY_START: &str = r#"mutation {
  array { setState(input: { desiredState: START }) { state } }
}"#;

const MUTATION_ARRAY_STOP: &str = r#"mutation {
  array { setState(input: { desiredState: STOP }) { state } }
}"#;

const MUTATION_PARITY_START: &str = r#"mutation ($correct: Boolean) {
  parityCheck { start(correct: $correct) }
}"#;

const MUTATION_PARITY_PAUSE: &str = r#"mutation {
  parityCheck { pause }
}"#;

const MUTATION_PARITY_RESUME: &str = r#"mutation {
  parityCheck { resume }
}"#;

const MUTATION_PARITY_CANCEL: &str = r#"mutation {
  parityCheck { cancel }
}"#;

/// Client for the Unraid GraphQL API.
///
/// Thin and stateless beyond the connection pool: no caching, no retries.
/// Safe to share across tasks behind an `Arc`.
pub struct UnraidClient {
    http: reqwest::Client,
    endpoint: String,
    api_key: secrecy::SecretString,
    timeout_secs: u64,
}

impl UnraidClient {
    pub fn new(config: &UnraidConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_seconds))
            .user_agent(concat!("unraid-monitor/", env!("CARGO_PKG_VERSION")));

        if !config.verify_ssl {
            builder = builder.danger_accept_invalid_certs(true);
        }

        let http = builder
            .build()
            .map_err(|e| UnraidError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            endpoint: config.endpoint(),
            api_key: config.api_key.clone(),
            timeout_secs: config.timeout_seconds,
        })
    }

    /// Fetch server info and reject servers older than [`MIN_API_VERSION`].
    pub async fn validate_connection(&self) -> Result<ServerInfo> {
        let info = self.server_info().await?;
        if let Some(version) = info.version.as_deref() {
            if version_lt(version, MIN_API_VERSION) {
                return Err(UnraidError::IncompatibleVersion {
                    actual: version.to_string(),
                    minimum: MIN_API_VERSION.to_string(),
                });
            }
        }
        Ok(info)
    }

    /// Execute one GraphQL operation and extract the value at `path` within
    /// the `data` object.
    async fn execute_query<T>(
        &self,
        query: &'static str,
        variables: serde_json::Value,
        path: &[&str],
    ) -> Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        let request = GraphqlRequest { query, variables };

        let response = self
            .http
            .post(&self.endpoint)
            .header("x-api-key", self.api_key.expose_secret())
            .json(&request)
            .send()
            .await
            .map_err(|e| UnraidError::from_transport(e, self.timeout_secs))?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN
        {
            return Err(UnraidError::Auth(format!(
                "server rejected API key (HTTP {status})"
            )));
        }
        if !status.is_success() {
            return Err(UnraidError::Api(format!("HTTP {status} from {}", self.endpoint)));
        }

        let envelope: GraphqlResponse = response
            .json()
            .await
            .map_err(|e| UnraidError::Deserialization(e.to_string()))?;

        if !envelope.errors.is_empty() {
            let message = envelope
                .errors
                .iter()
                .map(|e| e.message.as_str())
                .collect::<Vec<_>>()
                .join("; ");
            let lowered = message.to_ascii_lowercase();
            if lowered.contains("api key") || lowered.contains("unauthorized") {
                return Err(UnraidError::Auth(message));
            }
            return Err(UnraidError::Api(message));
        }

        let mut value = envelope
            .data
            .ok_or_else(|| UnraidError::Deserialization("response has no data".to_string()))?;
        for key in path {
            value = value
                .get_mut(*key)
                .map(serde_json::Value::take)
                .ok_or_else(|| {
                    UnraidError::Deserialization(format!("missing field '{key}' in response"))
                })?;
        }

        serde_json::from_value(value).map_err(|e| UnraidError::Deserialization(e.to_string()))
    }

    /// Execute a mutation, discarding the payload. GraphQL-level errors still
    /// surface through the shared envelope handling.
    async fn execute_mutation(
        &self,
        mutation: &'static str,
        variables: serde_json::Value,
    ) -> Result<()> {
        let _: serde_json::Value = self.execute_query(mutation, variables, &[]).await?;
        Ok(())
    }

    pub async fn start_container(&self, id: &str) -> Result<()> {
        self.execute_mutation(MUTATION_DOCKER_START, json!({ "id": id }))
            .await
    }

    pub async fn stop_container(&self, id: &str) -> Result<()> {
        self.execute_mutation(MUTATION_DOCKER_STOP, json!({ "id": id }))
            .await
    }

    pub async fn start_vm(&self, id: &str) -> Result<()> {
        self.execute_mutation(MUTATION_VM_START, json!({ "id": id }))
            .await
    }

    pub async fn stop_vm(&self, id: &str) -> Result<()> {
        self.execute_mutation(MUTATION_VM_STOP, json!({ "id": id }))
            .await
    }

    pub async fn pause_vm(&self, id: &str) -> Result<()> {
        self.execute_mutation(MUTATION_VM_PAUSE, json!({ "id": id }))
            .await
    }

    pub async fn resume_vm(&self, id: &str) -> Result<()> {
        self.execute_mutation(MUTATION_VM_RESUME, json!({ "id": id }))
            .await
    }

    pub async fn start_array(&self) -> Result<()> {
        self.execute_mutation(MUTATION_ARRAY_START, serde_json::Value::Null)
            .await
    }

    pub async fn stop_array(&self) -> Result<()> {
        self.execute_mutation(MUTATION_ARRAY_STOP, serde_json::Value::Null)
            .await
    }

    pub async fn start_parity_check(&self, correct: bool) -> Result<()> {
        self.execute_mutation(MUTATION_PARITY_START, json!({ "correct": correct }))
            .await
    }

    pub async fn pause_parity_check(&self) -> Result<()> {
        self.execute_mutation(MUTATION_PARITY_PAUSE, serde_json::Value::Null)
            .await
    }

    pub async fn resume_parity_check(&self) -> Result<()> {
        self.execute_mutation(MUTATION_PARITY_RESUME, serde_json::Value::Null)
            .await
    }

    pub async fn cancel_parity_check(&self) -> Result<()> {
        self.execute_mutation(MUTATION_PARITY_CANCEL, serde_json::Value::Null)
            .await
    }
}

impl UnraidApi for UnraidClient {
    async fn server_info(&self) -> Result<ServerInfo> {
        // The identity fields live under different parents in the schema;
        // flatten them into one struct here.
        let raw: serde_json::Value = self
            .execute_query(QUERY_SERVER_INFO, serde_json::Value::Null, &["info"])
            .await?;

        let name = raw
            .pointer("/os/hostname")
            .and_then(|v| v.as_str())
            .unwrap_or("unraid")
            .to_string();
        Ok(ServerInfo {
            name,
            guid: raw
                .get("machineId")
                .and_then(|v| v.as_str())
                .map(str::to_string),
            version: raw
                .pointer("/versions/unraid")
                .and_then(|v| v.as_str())
                .map(str::to_string),
            uptime_seconds: raw.pointer("/os/uptimeSeconds").and_then(|v| v.as_f64()),
        })
    }

    async fn system_metrics(&self) -> Result<SystemMetrics> {
        self.execute_query(QUERY_METRICS, serde_json::Value::Null, &["metrics"])
            .await
    }

    async fn notifications_overview(&self) -> Result<NotificationOverview> {
        self.execute_query(
            QUERY_NOTIFICATIONS,
            serde_json::Value::Null,
            &["notifications", "overview"],
        )
        .await
    }

    async fn docker_containers(&self) -> Result<Vec<DockerContainer>> {
        self.execute_query(
            QUERY_CONTAINERS,
            serde_json::Value::Null,
            &["docker", "containers"],
        )
        .await
    }

    async fn virtual_machines(&self) -> Result<Vec<VirtualMachine>> {
        self.execute_query(QUERY_VMS, serde_json::Value::Null, &["vms", "domain"])
            .await
    }

    async fn ups_devices(&self) -> Result<Vec<UpsDevice>> {
        self.execute_query(QUERY_UPS_DEVICES, serde_json::Value::Null, &["upsDevices"])
            .await
    }

    async fn array_status(&self) -> Result<ArrayStatus> {
        self.execute_query(QUERY_ARRAY, serde_json::Value::Null, &["array"])
            .await
    }

    async fn shares(&self) -> Result<Vec<Share>> {
        self.execute_query(QUERY_SHARES, serde_json::Value::Null, &["shares"])
            .await
    }

    async fn parity_history(&self) -> Result<Vec<ParityCheck>> {
        self.execute_query(
            QUERY_PARITY_HISTORY,
            serde_json::Value::Null,
            &["parityHistory"],
        )
        .await
    }

    async fn services(&self) -> Result<Vec<ServiceInfo>> {
        self.execute_query(QUERY_SERVICES, serde_json::Value::Null, &["services"])
            .await
    }

    async fn registration(&self) -> Result<Registration> {
        self.execute_query(
            QUERY_REGISTRATION,
            serde_json::Value::Null,
            &["registration"],
        )
        .await
    }

    async fn cloud_status(&self) -> Result<CloudStatus> {
        self.execute_query(QUERY_CLOUD, serde_json::Value::Null, &["cloud"])
            .await
    }

    async fn remote_access(&self) -> Result<RemoteAccess> {
        self.execute_query(QUERY_REMOTE_ACCESS, serde_json::Value::Null, &["connect"])
            .await
    }

    async fn system_vars(&self) -> Result<SystemVars> {
        self.execute_query(QUERY_VARS, serde_json::Value::Null, &["vars"])
            .await
    }

    async fn plugins(&self) -> Result<Vec<PluginInfo>> {
        self.execute_query(QUERY_PLUGINS, serde_json::Value::Null, &["plugins"])
            .await
    }
}

/// Lexicographic-by-component version compare; non-numeric components
/// compare as zero.
pub fn version_lt(actual: &str, minimum: &str) -> bool {
    let parse = |s: &str| -> Vec<u64> {
        s.split('.')
            .map(|part| {
                part.chars()
                    .take_while(|c| c.is_ascii_digit())
                    .collect::<String>()
                    .parse()
                    .unwrap_or(0)
            })
            .collect()
    };
    let a = parse(actual);
    let b = parse(minimum);
    for i in 0..a.len().max(b.len()) {
        let x = a.get(i).copied().unwrap_or(0);
        let y = b.get(i).copied().unwrap_or(0);
        if x != y {
            return x < y;
        }
    }
    false
}
