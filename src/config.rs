use anyhow::{anyhow, Context, Result};
use clap::Args;
use std::path::PathBuf;
use std::time::Duration;

use crate::api::{ApiClient, DEFAULT_API_BASE_URL, DEFAULT_ORIGIN};
use crate::session::SessionStore;

const LOG_FILE: &str = "fraudfinder.log";

/// Connection and storage settings shared by every subcommand.
#[derive(Debug, Clone, Args)]
pub struct Settings {
    /// Base URL of the backend API
    #[arg(long, env = "FRAUDFINDER_API_URL", default_value = DEFAULT_API_BASE_URL, global = true)]
    pub api_url: String,

    /// Host root used for the /api/analyze, /api/ml_recommend and /api/logout calls
    #[arg(long, env = "FRAUDFINDER_ORIGIN", default_value = DEFAULT_ORIGIN, global = true)]
    pub origin: String,

    /// Where the session file and TUI log live
    #[arg(long, env = "FRAUDFINDER_DATA_DIR", global = true)]
    pub data_dir: Option<PathBuf>,

    /// Hours a stored login stays valid
    #[arg(long, env = "FRAUDFINDER_SESSION_HOURS", default_value_t = 168, global = true)]
    pub session_hours: u32,

    /// Per-request timeout in seconds (no timeout when unset)
    #[arg(long, env = "FRAUDFINDER_TIMEOUT_SECS", global = true)]
    pub timeout_secs: Option<u64>,

    /// Log filter, e.g. "info" or "fraudfinder=debug"
    #[arg(long = "log", env = "RUST_LOG", default_value = "info", global = true)]
    pub log_filter: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub api_url: String,
    pub origin: String,
    pub data_dir: PathBuf,
    pub session_max_age: chrono::Duration,
    pub timeout: Option<Duration>,
    pub log_filter: String,
}

impl Config {
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        if settings.session_hours == 0 {
            return Err(anyhow!("--session-hours must be at least 1"));
        }
        if settings.timeout_secs == Some(0) {
            return Err(anyhow!("--timeout-secs must be at least 1 when set"));
        }

        Ok(Self {
            api_url: settings.api_url.clone(),
            origin: settings.origin.clone(),
            data_dir: settings.data_dir.clone().unwrap_or_else(Self::default_data_dir),
            session_max_age: chrono::Duration::hours(i64::from(settings.session_hours)),
            timeout: settings.timeout_secs.map(Duration::from_secs),
            log_filter: settings.log_filter.clone(),
        })
    }

    fn default_data_dir() -> PathBuf {
        // Use XDG data directory or fallback
        if let Some(proj_dirs) = directories::ProjectDirs::from("", "", "fraudfinder") {
            proj_dirs.data_dir().to_path_buf()
        } else {
            PathBuf::from(".")
        }
    }

    pub fn api_client(&self) -> Result<ApiClient> {
        ApiClient::new(&self.api_url, &self.origin, self.timeout)
            .with_context(|| format!("Failed to set up API client for {}", self.api_url))
    }

    pub fn session_store(&self) -> SessionStore {
        SessionStore::open(&self.data_dir)
    }

    pub fn log_path(&self) -> PathBuf {
        self.data_dir.join(LOG_FILE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> Settings {
        Settings {
            api_url: DEFAULT_API_BASE_URL.to_string(),
            origin: DEFAULT_ORIGIN.to_string(),
            data_dir: Some(PathBuf::from("/tmp/ff-test")),
            session_hours: 24,
            timeout_secs: None,
            log_filter: "info".to_string(),
        }
    }

    #[test]
    fn test_from_settings() {
        let config = Config::from_settings(&settings()).unwrap();
        assert_eq!(config.session_max_age, chrono::Duration::hours(24));
        assert_eq!(config.timeout, None);
        assert_eq!(config.log_path(), PathBuf::from("/tmp/ff-test/fraudfinder.log"));
        assert_eq!(
            config.session_store().path(),
            std::path::Path::new("/tmp/ff-test/session.json")
        );
    }

    #[test]
    fn test_rejects_zero_values() {
        let mut zero_hours = settings();
        zero_hours.session_hours = 0;
        assert!(Config::from_settings(&zero_hours).is_err());

        let mut zero_timeout = settings();
        zero_timeout.timeout_secs = Some(0);
        assert!(Config::from_settings(&zero_timeout).is_err());
    }

    #[test]
    fn test_bad_api_url_fails_client_setup() {
        let mut bad = settings();
        bad.api_url = "localhost:5000".to_string();
        let config = Config::from_settings(&bad).unwrap();
        let err = config.api_client().unwrap_err();
        assert!(format!("{err:#}").contains("must start with http"));
    }
}
