use std::{env, path::PathBuf, time::Duration};

/// AppConfig
///
/// Holds the client's configuration. Immutable once loaded and shared by every
/// component (ApiClient, session stores, storage selection) through the `Portal` state.
#[derive(Clone, Debug)]
pub struct AppConfig {
    // Base URL every API path is joined onto (e.g. "https://api.example.com/api").
    pub api_base_url: String,
    // When set, sessions survive restarts in a JSON file at this path.
    pub session_store_path: Option<PathBuf>,
    // Upper bound on a single API call.
    pub request_timeout: Duration,
    // Runtime environment marker. Controls log format and fail-fast behaviour.
    pub env: Env,
}

/// Env
///
/// Runtime context: pretty logs and lenient defaults locally, JSON logs and
/// mandatory settings in production.
#[derive(Clone, PartialEq, Debug)]
pub enum Env {
    Local,
    Production,
}

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8000/api";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

impl Default for AppConfig {
    /// default
    ///
    /// Safe, non-panicking values for tests and scaffolding. Sessions are kept
    /// in memory only.
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            session_store_path: None,
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            env: Env::Local,
        }
    }
}

impl AppConfig {
    /// load
    ///
    /// Reads the configuration from environment variables, after loading a
    /// `.env` file from the working directory (or a parent) if there is one.
    /// Variables already set in the process take precedence over the file.
    ///
    /// # Panics
    /// Panics in production when `API_BASE_URL` is not set. A client pointed at the
    /// wrong backend would leak bearer tokens to it, so startup is refused instead.
    pub fn load() -> Self {
        dotenv::dotenv().ok();

        let env_str = env::var("APP_ENV").unwrap_or_else(|_| "local".to_string());
        let env = match env_str.as_str() {
            "production" => Env::Production,
            _ => Env::Local,
        };

        let api_base_url = match env {
            Env::Production => {
                env::var("API_BASE_URL").expect("FATAL: API_BASE_URL must be set in production.")
            }
            Env::Local => {
                env::var("API_BASE_URL").unwrap_or_else(|_| DEFAULT_API_BASE_URL.to_string())
            }
        };

        let session_store_path = env::var("SESSION_STORE_PATH")
            .ok()
            .filter(|path| !path.trim().is_empty())
            .map(PathBuf::from);

        // A malformed value falls back to the default rather than aborting startup.
        let request_timeout = env::var("API_TIMEOUT_SECS")
            .ok()
            .and_then(|secs| secs.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(Duration::from_secs(DEFAULT_TIMEOUT_SECS));

        Self {
            api_base_url: api_base_url.trim_end_matches('/').to_string(),
            session_store_path,
            request_timeout,
            env,
        }
    }
}
