//! Connection Detection
//!
//! Validates a host/port/API-key triple before the monitor starts polling,
//! auto-detecting the transport the server actually speaks:
//!
//! 1. HTTPS with certificate verification
//! 2. HTTPS accepting the self-signed certificate most Unraid boxes carry
//! 3. plain HTTP
//!
//! The first combination that answers the `info` query wins. The probe also
//! resolves a stable unique id for the server: normally the hardware GUID,
//! but some motherboards ship a well-known placeholder GUID shared by every
//! board of that model, in which case the GUID alone would collide across
//! servers and we append the hostname.

use crate::config::UnraidConfig;
use crate::error::{Result, UnraidError};
use crate::unraid::UnraidClient;
use secrecy::SecretString;
use tracing::{debug, info};

/// Placeholder hardware GUIDs seen in the wild on boards that never got a
/// unique value burned in.
const PLACEHOLDER_GUIDS: &[&str] = &[
    "00000000-0000-0000-0000-000000000000",
    "03000200-0400-0500-0006-000700080009",
    "12345678-1234-1234-1234-123456789012",
];

/// Result of a successful probe: the transport that worked plus the server's
/// identity.
#[derive(Debug, Clone)]
pub struct ConnectionProfile {
    pub use_tls: bool,
    pub verify_ssl: bool,
    pub hostname: String,
    pub version: Option<String>,
    /// Stable unique id for this server.
    pub unique_id: String,
}

/// Probe the server, returning the first transport mode that works.
///
/// Authentication and version-incompatibility errors abort immediately: a
/// bad API key or an old server will fail identically on every transport.
pub async fn detect_connection(
    host: &str,
    port: Option<u16>,
    api_key: SecretString,
    timeout_seconds: u64,
) -> Result<ConnectionProfile> {
    let modes: &[(bool, bool)] = &[(true, true), (true, false), (false, false)];

    let mut last_err = None;
    for &(use_tls, verify_ssl) in modes {
        let config = UnraidConfig {
            host: host.to_string(),
            port,
            api_key: api_key.clone(),
            use_tls,
            verify_ssl,
            timeout_seconds,
        };
        debug!(host, use_tls, verify_ssl, "probing Unraid endpoint");

        let client = UnraidClient::new(&config)?;
        match client.validate_connection().await {
            Ok(server) => {
                let unique_id = unique_server_id(server.guid.as_deref(), &server.name);
                info!(
                    host,
                    use_tls, verify_ssl, unique_id, "detected working Unraid connection"
                );
                return Ok(ConnectionProfile {
                    use_tls,
                    verify_ssl,
                    hostname: server.name,
                    version: server.version,
                    unique_id,
                });
            }
            Err(err @ (UnraidError::Auth(_) | UnraidError::IncompatibleVersion { .. })) => {
                return Err(err);
            }
            Err(err) => {
                debug!(host, use_tls, verify_ssl, error = %err, "probe failed");
                last_err = Some(err);
            }
        }
    }

    Err(last_err.unwrap_or_else(|| {
        UnraidError::Connection(format!("no working transport found for {host}"))
    }))
}

/// Stable unique id: the hardware GUID, or GUID+hostname when the GUID is a
/// known placeholder, or the hostname when there is no GUID at all.
pub fn unique_server_id(guid: Option<&str>, hostname: &str) -> String {
    match guid {
        Some(guid) if PLACEHOLDER_GUIDS.contains(&guid) => format!("{guid}-{hostname}"),
        Some(guid) => guid.to_string(),
        None => hostname.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::unique_server_id;

    #[test]
    fn real_guid_used_directly() {
        assert_eq!(
            unique_server_id(Some("a1b2c3d4-0000-1111-2222-333344445555"), "tower"),
            "a1b2c3d4-0000-1111-2222-333344445555"
        );
    }

    #[test]
    fn placeholder_guid_gets_hostname_suffix() {
        assert_eq!(
            unique_server_id(Some("00000000-0000-0000-0000-000000000000"), "tower"),
            "00000000-0000-0000-0000-000000000000-tower"
        );
    }

    #[test]
    fn missing_guid_falls_back_to_hostname() {
        assert_eq!(unique_server_id(None, "tower"), "tower");
    }
}
