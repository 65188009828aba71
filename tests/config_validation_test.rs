//! Configuration defaults and endpoint derivation.

use secrecy::SecretString;
use unraid_monitor::config::{Config, PollConfig, UnraidConfig};

fn parse(toml: &str) -> Config {
    config::Config::builder()
        .add_source(config::File::from_str(toml, config::FileFormat::Toml))
        .build()
        .unwrap()
        .try_deserialize()
        .unwrap()
}

#[test]
fn minimal_config_gets_documented_defaults() {
    let config = parse(
        r#"
        [unraid]
        host = "tower.local"
        api_key = "secret"
        "#,
    );

    assert!(config.unraid.use_tls);
    assert!(!config.unraid.verify_ssl);
    assert_eq!(config.unraid.timeout_seconds, 30);
    assert_eq!(config.poll.system_interval_seconds, 30);
    assert_eq!(config.poll.storage_interval_seconds, 300);
    assert_eq!(config.poll.infrastructure_interval_seconds, 900);
    assert_eq!(config.server.addr, "0.0.0.0");
    assert_eq!(config.server.port, 9630);
    assert!(config.ups.nominal_power_watts.is_none());
    assert!(config.ups.battery_capacity_ah.is_none());
}

#[test]
fn explicit_values_override_defaults() {
    let config = parse(
        r#"
        [unraid]
        host = "tower.local"
        api_key = "secret"
        use_tls = false
        port = 8080

        [poll]
        system_interval_seconds = 10

        [ups]
        nominal_power_watts = 600.0
        "#,
    );

    assert!(!config.unraid.use_tls);
    assert_eq!(config.unraid.port, Some(8080));
    assert_eq!(config.poll.system_interval_seconds, 10);
    assert_eq!(config.poll.storage_interval_seconds, 300);
    assert_eq!(config.ups.nominal_power_watts, Some(600.0));
}

#[test]
fn endpoint_follows_tls_and_port() {
    let mut unraid = UnraidConfig {
        host: "tower.local".into(),
        port: None,
        api_key: SecretString::from("secret"),
        use_tls: true,
        verify_ssl: false,
        timeout_seconds: 30,
    };
    assert_eq!(unraid.endpoint(), "https://tower.local:443/graphql");

    unraid.use_tls = false;
    assert_eq!(unraid.endpoint(), "http://tower.local:80/graphql");

    unraid.port = Some(8080);
    assert_eq!(unraid.endpoint(), "http://tower.local:8080/graphql");
}

#[test]
fn poll_defaults_match_tier_cadence() {
    let poll = PollConfig::default();
    assert_eq!(poll.system_interval_seconds, 30);
    assert_eq!(poll.storage_interval_seconds, 300);
    assert_eq!(poll.infrastructure_interval_seconds, 900);
}
