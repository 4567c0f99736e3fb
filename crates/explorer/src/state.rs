use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use common::servers::{RecentServers, ServersError};
use common::ContentMode;

pub const APP_NAME: &str = "zkview";
pub const CONFIG_FILE_NAME: &str = "config.toml";
pub const SERVERS_FILE_NAME: &str = "servers.txt";

/// Settings persisted in `config.toml`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Session timeout handed to the remote client
    pub session_timeout_ms: u64,
    /// How long to wait for the initial connection
    pub connection_timeout_ms: u64,
    /// Auto-expand children literally named `/`
    pub legacy_bootstrap_root: bool,
    /// Default render mode for node values
    pub value_mode: ContentMode,
    /// Default render mode for node paths
    pub path_mode: ContentMode,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            session_timeout_ms: 10_000,
            connection_timeout_ms: 5_000,
            legacy_bootstrap_root: false,
            value_mode: ContentMode::Auto,
            path_mode: ContentMode::Auto,
        }
    }
}

impl AppConfig {
    pub fn session_timeout(&self) -> Duration {
        Duration::from_millis(self.session_timeout_ms)
    }

    pub fn connection_timeout(&self) -> Duration {
        Duration::from_millis(self.connection_timeout_ms)
    }
}

/// Resolved state directory plus the config loaded from it
#[derive(Debug, Clone)]
pub struct AppState {
    pub zkview_dir: PathBuf,
    pub config_path: PathBuf,
    pub servers_path: PathBuf,
    pub config: AppConfig,
}

impl AppState {
    /// The state directory: `custom` if given, else `~/.zkview`
    pub fn zkview_dir(custom: Option<PathBuf>) -> Result<PathBuf, StateError> {
        match custom {
            Some(path) => Ok(path),
            None => dirs::home_dir()
                .map(|home| home.join(format!(".{}", APP_NAME)))
                .ok_or(StateError::NoHomeDirectory),
        }
    }

    /// Create the state directory and write `config` (or the defaults).
    ///
    /// Fails if a config already exists there.
    pub fn init(custom: Option<PathBuf>, config: Option<AppConfig>) -> Result<Self, StateError> {
        let zkview_dir = Self::zkview_dir(custom)?;
        let config_path = zkview_dir.join(CONFIG_FILE_NAME);
        if config_path.exists() {
            return Err(StateError::AlreadyInitialized(zkview_dir));
        }

        fs::create_dir_all(&zkview_dir)?;
        let config = config.unwrap_or_default();
        fs::write(&config_path, toml::to_string_pretty(&config)?)?;
        tracing::info!(path = %config_path.display(), "Wrote config");

        Ok(Self {
            servers_path: zkview_dir.join(SERVERS_FILE_NAME),
            zkview_dir,
            config_path,
            config,
        })
    }

    /// Load state from the directory, using default settings when no
    /// config has been written yet
    pub fn load(custom: Option<PathBuf>) -> Result<Self, StateError> {
        let zkview_dir = Self::zkview_dir(custom)?;
        let config_path = zkview_dir.join(CONFIG_FILE_NAME);

        let config = if config_path.exists() {
            let text = fs::read_to_string(&config_path)?;
            toml::from_str(&text)?
        } else {
            tracing::debug!(path = %config_path.display(), "No config found, using defaults");
            AppConfig::default()
        };

        Ok(Self {
            servers_path: zkview_dir.join(SERVERS_FILE_NAME),
            zkview_dir,
            config_path,
            config,
        })
    }

    /// Read the recent-server list; an unreadable file falls back to the
    /// default list
    pub fn load_servers(&self) -> RecentServers {
        match RecentServers::load(&self.servers_path) {
            Ok(servers) => servers,
            Err(e) => {
                tracing::warn!(error = %e, "Ignoring unreadable server list");
                RecentServers::default()
            }
        }
    }

    pub fn save_servers(&self, servers: &RecentServers) -> Result<(), StateError> {
        ensure_dir(&self.zkview_dir)?;
        servers.save(&self.servers_path)?;
        Ok(())
    }
}

fn ensure_dir(dir: &Path) -> Result<(), StateError> {
    if !dir.exists() {
        fs::create_dir_all(dir)?;
    }
    Ok(())
}

#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("could not determine home directory")]
    NoHomeDirectory,
    #[error("already initialized at {}", .0.display())]
    AlreadyInitialized(PathBuf),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid config: {0}")]
    ConfigParse(#[from] toml::de::Error),
    #[error("failed to serialize config: {0}")]
    ConfigSerialize(#[from] toml::ser::Error),
    #[error(transparent)]
    Servers(#[from] ServersError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_without_config_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let state = AppState::load(Some(dir.path().to_path_buf())).unwrap();
        assert_eq!(state.config, AppConfig::default());
        assert_eq!(state.servers_path, dir.path().join(SERVERS_FILE_NAME));
    }

    #[test]
    fn test_init_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("state");
        let config = AppConfig {
            session_timeout_ms: 3_000,
            legacy_bootstrap_root: true,
            value_mode: ContentMode::Json,
            ..Default::default()
        };

        let created = AppState::init(Some(root.clone()), Some(config.clone())).unwrap();
        assert!(created.config_path.exists());

        let loaded = AppState::load(Some(root)).unwrap();
        assert_eq!(loaded.config, config);
        assert_eq!(loaded.config.session_timeout(), Duration::from_secs(3));
    }

    #[test]
    fn test_init_twice_fails() {
        let dir = tempfile::tempdir().unwrap();
        AppState::init(Some(dir.path().to_path_buf()), None).unwrap();
        let err = AppState::init(Some(dir.path().to_path_buf()), None).unwrap_err();
        assert!(matches!(err, StateError::AlreadyInitialized(_)));
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join(CONFIG_FILE_NAME),
            "path_mode = \"raw\"\nconnection_timeout_ms = 750\n",
        )
        .unwrap();

        let state = AppState::load(Some(dir.path().to_path_buf())).unwrap();
        assert_eq!(state.config.path_mode, ContentMode::Raw);
        assert_eq!(state.config.value_mode, ContentMode::Auto);
        assert_eq!(state.config.connection_timeout_ms, 750);
        assert_eq!(state.config.session_timeout_ms, 10_000);
    }

    #[test]
    fn test_invalid_config() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(CONFIG_FILE_NAME), "value_mode = \"xml\"").unwrap();
        let err = AppState::load(Some(dir.path().to_path_buf())).unwrap_err();
        assert!(matches!(err, StateError::ConfigParse(_)));
    }

    #[test]
    fn test_save_servers_creates_dir() {
        let dir = tempfile::tempdir().unwrap();
        let state = AppState::load(Some(dir.path().join("fresh"))).unwrap();

        let mut servers = state.load_servers();
        servers.promote("zk1");
        state.save_servers(&servers).unwrap();

        assert_eq!(state.load_servers().most_recent(), Some("zk1:2181"));
    }
}
