//! Client configuration.

use std::path::PathBuf;

pub const DEFAULT_API_URL: &str = "http://localhost:8000/";

#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Backend root; API paths are joined onto it.
    pub api_url: String,
    /// Bearer token identifying the user. `None` means not signed in.
    pub access_token: Option<String>,
    /// Directory holding the draft store file. `None` uses the platform config dir.
    pub session_dir: Option<PathBuf>,
    /// Directory with catalog JSON files. `None` uses the embedded catalog.
    pub catalog_dir: Option<PathBuf>,
    /// Send the wizard session id as an idempotency key when finalizing.
    /// Off by default: repeated finalize creates repeated trips.
    pub idempotent_finalize: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            access_token: None,
            session_dir: None,
            catalog_dir: None,
            idempotent_finalize: false,
        }
    }
}

impl ClientConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let api_url = std::env::var("TRIP_PLANNER_API_URL")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or(defaults.api_url);

        let access_token = std::env::var("TRIP_PLANNER_ACCESS_TOKEN")
            .ok()
            .filter(|s| !s.trim().is_empty());

        let session_dir = std::env::var_os("TRIP_PLANNER_SESSION_DIR").map(PathBuf::from);
        let catalog_dir = std::env::var_os("TRIP_PLANNER_CATALOG_DIR").map(PathBuf::from);

        let idempotent_finalize = std::env::var("TRIP_PLANNER_IDEMPOTENT_FINALIZE")
            .map(|v| parse_flag(&v))
            .unwrap_or(false);

        Self {
            api_url,
            access_token,
            session_dir,
            catalog_dir,
            idempotent_finalize,
        }
    }
}

fn parse_flag(raw: &str) -> bool {
    matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
