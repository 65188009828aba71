use thiserror::Error;

/// Error taxonomy for the Unraid API client.
///
/// Coordinators fold every variant into one of four outward failure kinds
/// (auth / connection / api / unexpected); see `coordinator::PollError`.
#[derive(Debug, Error)]
pub enum UnraidError {
    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    #[error("TLS error: {0}")]
    Ssl(String),

    #[error("Unsupported Unraid API version {actual} (minimum supported is {minimum})")]
    IncompatibleVersion { actual: String, minimum: String },

    #[error("Unraid API error: {0}")]
    Api(String),

    #[error("Deserialization error: {0}")]
    Deserialization(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("HTTP server error: {0}")]
    Server(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl UnraidError {
    /// Map a transport-level reqwest failure onto the taxonomy.
    ///
    /// reqwest lumps TLS, DNS, connect, and timeout failures into one opaque
    /// error type; we split them back apart so the coordinators can classify.
    pub fn from_transport(err: reqwest::Error, timeout_secs: u64) -> Self {
        if err.is_timeout() {
            return UnraidError::Timeout { timeout_secs };
        }
        let detail = err.to_string();
        // reqwest has no is_tls(); certificate failures surface as connect
        // errors whose message names the certificate.
        if detail.contains("certificate") || detail.contains("tls") || detail.contains("ssl") {
            return UnraidError::Ssl(detail);
        }
        if err.is_connect() {
            return UnraidError::Connection(detail);
        }
        UnraidError::Api(detail)
    }

    /// True when the whole session is invalid, not just one query.
    pub fn is_auth(&self) -> bool {
        matches!(self, UnraidError::Auth(_))
    }
}

pub type Result<T> = std::result::Result<T, UnraidError>;
