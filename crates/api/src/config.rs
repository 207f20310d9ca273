/// Server configuration loaded from environment variables.
///
/// All fields have defaults suitable for local development.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `8080`).
    pub port: u16,
    /// HTTP request timeout in seconds for protocol routes (default: `30`).
    /// The event stream is exempt: it is expected to outlive any timeout.
    pub request_timeout_secs: u64,
    /// Idle keepalive interval for the event stream in seconds
    /// (default: `15`).
    pub sse_keepalive_secs: u64,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default   |
    /// |------------------------|-----------|
    /// | `HOST`                 | `0.0.0.0` |
    /// | `PORT`                 | `8080`    |
    /// | `REQUEST_TIMEOUT_SECS` | `30`      |
    /// | `SSE_KEEPALIVE_SECS`   | `15`      |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "8080".into())
            .parse()
            .expect("PORT must be a valid u16");

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let sse_keepalive_secs: u64 = std::env::var("SSE_KEEPALIVE_SECS")
            .unwrap_or_else(|_| "15".into())
            .parse()
            .expect("SSE_KEEPALIVE_SECS must be a valid u64");

        Self {
            host,
            port,
            request_timeout_secs,
            sse_keepalive_secs,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 8080,
            request_timeout_secs: 30,
            sse_keepalive_secs: 15,
        }
    }
}
