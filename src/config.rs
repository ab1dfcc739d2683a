use std::net::SocketAddr;
use std::time::Duration;

/// Application-level constants
pub const APP_NAME: &str = "Insightflow";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Inactivity window after which a session expires.
pub const SESSION_TTL: Duration = Duration::from_secs(30 * 60);

/// Default log filter when RUST_LOG is not set.
pub fn default_log_filter() -> &'static str {
    "insightflow=info,tower_http=warn"
}

/// Runtime configuration, read from the environment with defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Address the API server binds to.
    pub bind_addr: SocketAddr,
    /// Base URL of the Ollama-compatible model server.
    pub llm_base_url: String,
    /// Per-request timeout for model calls, in seconds.
    pub llm_timeout_secs: u64,
    /// Session inactivity window.
    pub session_ttl: Duration,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            bind_addr: env_parsed("INSIGHTFLOW_BIND", SocketAddr::from(([127, 0, 0, 1], 8080))),
            llm_base_url: std::env::var("INSIGHTFLOW_LLM_URL")
                .unwrap_or_else(|_| "http://localhost:11434".to_string()),
            llm_timeout_secs: env_parsed("INSIGHTFLOW_LLM_TIMEOUT_SECS", 300),
            session_ttl: Duration::from_secs(env_parsed(
                "INSIGHTFLOW_SESSION_TTL_SECS",
                SESSION_TTL.as_secs(),
            )),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 8080)),
            llm_base_url: "http://localhost:11434".to_string(),
            llm_timeout_secs: 300,
            session_ttl: SESSION_TTL,
        }
    }
}

fn env_parsed<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
