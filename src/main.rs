use anyhow::Result;
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use unraid_monitor::{config::Config, server, unraid::detect};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/Default.toml")]
    config: String,

    /// Unraid host (overrides config)
    #[arg(long, env = "UNRAID_HOST")]
    unraid_host: Option<String>,

    /// Unraid API key (overrides config)
    #[arg(long, env = "UNRAID_API_KEY")]
    unraid_api_key: Option<String>,

    /// Probe the server and auto-detect TLS mode before starting
    #[arg(long, default_value_t = false)]
    detect_tls: bool,

    /// Port to listen on
    #[arg(short, long, env = "MONITOR_PORT", default_value = "9630")]
    port: u16,

    /// Address to bind to
    #[arg(short, long, env = "MONITOR_ADDR", default_value = "0.0.0.0")]
    addr: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Unraid Monitor v{}", env!("CARGO_PKG_VERSION"));

    // Parse CLI arguments
    let args = Args::parse();

    // Load configuration
    let mut config = Config::load(&args.config)?;

    // Override with CLI arguments if provided
    if let Some(host) = args.unraid_host {
        config.unraid.host = host;
    }
    if let Some(api_key) = args.unraid_api_key {
        config.unraid.api_key = secrecy::SecretString::new(api_key.into());
    }
    config.server.port = args.port;
    config.server.addr = args.addr;

    if args.detect_tls {
        let profile = detect::detect_connection(
            &config.unraid.host,
            config.unraid.port,
            config.unraid.api_key.clone(),
            config.unraid.timeout_seconds,
        )
        .await?;
        info!(
            hostname = %profile.hostname,
            unique_id = %profile.unique_id,
            use_tls = profile.use_tls,
            verify_ssl = profile.verify_ssl,
            "connection detection complete"
        );
        config.unraid.use_tls = profile.use_tls;
        config.unraid.verify_ssl = profile.verify_ssl;
    }

    info!("Configuration loaded successfully");
    info!("Unraid host: {}", config.unraid.host);
    info!(
        "Entity API: http://{}:{}/api/entities",
        config.server.addr, config.server.port
    );

    // Start the coordinators and the entity API
    if let Err(e) = server::start(config).await {
        error!("Server error: {}", e);
        std::process::exit(1);
    }

    Ok(())
}
