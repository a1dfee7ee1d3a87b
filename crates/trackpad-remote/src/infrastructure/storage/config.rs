//! TOML-based configuration persistence for the trackpad remote.
//!
//! Reads and writes [`AppConfig`] at the platform-appropriate location:
//! - Windows:  `%APPDATA%\trackpad-remote\config.toml`
//! - Linux:    `~/.config/trackpad-remote/config.toml`
//! - macOS:    `~/Library/Application Support/trackpad-remote/config.toml`
//!
//! Example:
//!
//! ```toml
//! log_level = "debug"
//!
//! [server]
//! url = "http://192.168.1.20:51273"
//! http_only = false
//!
//! [input]
//! mode = "raw"
//!
//! [gesture]
//! sensitivity = 8.0
//! tap_timeout_ms = 180
//! ```
//!
//! Every field has a serde default, so a missing file, a missing section or a
//! missing key all fall back to the built-in value.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use trackpad_core::GestureConfig;

use crate::domain::InputMode;
use crate::infrastructure::transport::{
    HttpFallbackConfig, SocketChannelConfig, DEFAULT_EXECUTOR_URL,
};

/// Error type for configuration file operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The platform config directory could not be determined.
    #[error("could not determine platform config directory")]
    NoPlatformConfigDir,

    /// A file system I/O error occurred.
    #[error("I/O error accessing config at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The TOML content could not be parsed.
    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    /// The config could not be serialized to TOML.
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

// ── Config schema types ───────────────────────────────────────────────────────

/// Top-level configuration stored on disk.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AppConfig {
    /// `tracing` level used when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub input: InputConfig,
    #[serde(default)]
    pub gesture: GestureConfig,
}

/// Where the remote executor lives and how hard to try reaching it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServerConfig {
    /// Executor base URL; the channel URL is derived from it.
    #[serde(default = "default_url")]
    pub url: String,
    /// Skip the channel and send everything over HTTP.
    #[serde(default)]
    pub http_only: bool,
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
    #[serde(default = "default_reconnect_attempts")]
    pub reconnect_attempts: u32,
    #[serde(default = "default_reconnect_delay_ms")]
    pub reconnect_delay_ms: u64,
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
    /// In-flight fallback requests a capped category may exceed.
    #[serde(default = "default_max_in_flight")]
    pub max_in_flight: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InputConfig {
    #[serde(default)]
    pub mode: InputMode,
    /// Snapshot interval of the raw stream (one display frame).
    #[serde(default = "default_stream_interval_ms")]
    pub stream_interval_ms: u64,
}

// ── Default helpers ───────────────────────────────────────────────────────────

fn default_log_level() -> String {
    "info".to_string()
}
fn default_url() -> String {
    DEFAULT_EXECUTOR_URL.to_string()
}
fn default_connect_timeout_ms() -> u64 {
    2000
}
fn default_reconnect_attempts() -> u32 {
    5
}
fn default_reconnect_delay_ms() -> u64 {
    1000
}
fn default_request_timeout_ms() -> u64 {
    2000
}
fn default_max_in_flight() -> usize {
    5
}
fn default_stream_interval_ms() -> u64 {
    16
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            server: ServerConfig::default(),
            input: InputConfig::default(),
            gesture: GestureConfig::default(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            http_only: false,
            connect_timeout_ms: default_connect_timeout_ms(),
            reconnect_attempts: default_reconnect_attempts(),
            reconnect_delay_ms: default_reconnect_delay_ms(),
            request_timeout_ms: default_request_timeout_ms(),
            max_in_flight: default_max_in_flight(),
        }
    }
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            mode: InputMode::default(),
            stream_interval_ms: default_stream_interval_ms(),
        }
    }
}

impl AppConfig {
    /// The gesture tunables with every value passed through its clamping
    /// setter, so hand-edited files cannot produce out-of-range values.
    pub fn clamped_gesture(&self) -> GestureConfig {
        let g = &self.gesture;
        let mut cfg = GestureConfig::default();
        cfg.set_sensitivity(g.sensitivity);
        cfg.set_move_threshold(g.move_threshold);
        cfg.set_scroll_sensitivity(g.scroll_sensitivity);
        cfg.set_scroll_batch_threshold(g.scroll_batch_threshold);
        cfg.set_tap_distance(g.tap_distance);
        cfg.set_tap_timeout_ms(g.tap_timeout_ms);
        cfg.set_move_throttle_ms(g.move_throttle_ms);
        cfg.set_swipe_distance(g.swipe_distance);
        cfg.set_coordinate_scale(g.coordinate_scale);
        cfg.set_double_tap_interval_ms(g.double_tap_interval_ms);
        cfg.set_drag_hold_ms(g.drag_hold_ms);
        cfg
    }

    pub fn socket_channel(&self) -> SocketChannelConfig {
        SocketChannelConfig {
            url: self.server.url.clone(),
            connect_timeout: Duration::from_millis(self.server.connect_timeout_ms),
            reconnect_attempts: self.server.reconnect_attempts,
            reconnect_delay: Duration::from_millis(self.server.reconnect_delay_ms),
        }
    }

    pub fn http_fallback(&self) -> HttpFallbackConfig {
        HttpFallbackConfig {
            base_url: self.server.url.clone(),
            request_timeout: Duration::from_millis(self.server.request_timeout_ms),
            max_in_flight: self.server.max_in_flight,
        }
    }
}

// ── Config repository ─────────────────────────────────────────────────────────

/// Determines the platform-appropriate directory for the config file.
///
/// # Errors
///
/// Returns [`ConfigError::NoPlatformConfigDir`] when the platform config base
/// directory cannot be determined from the environment.
pub fn config_dir() -> Result<PathBuf, ConfigError> {
    platform_config_dir().ok_or(ConfigError::NoPlatformConfigDir)
}

pub fn config_file_path() -> Result<PathBuf, ConfigError> {
    Ok(config_dir()?.join("config.toml"))
}

/// Loads the config from the default location.
///
/// # Errors
///
/// See [`load_config_from`].
pub fn load_config() -> Result<AppConfig, ConfigError> {
    load_config_from(&config_file_path()?)
}

/// Loads `AppConfig` from `path`, returning `AppConfig::default()` if the
/// file does not exist.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system errors other than "not found",
/// and [`ConfigError::Parse`] if the TOML is malformed.
pub fn load_config_from(path: &Path) -> Result<AppConfig, ConfigError> {
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(toml::from_str(&content)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(AppConfig::default()),
        Err(e) => Err(ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        }),
    }
}

pub fn save_config(config: &AppConfig) -> Result<(), ConfigError> {
    save_config_to(config, &config_file_path()?)
}

/// Persists `config` to `path`, creating parent directories as needed.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system failures or
/// [`ConfigError::Serialize`] if serialization fails.
pub fn save_config_to(config: &AppConfig, path: &Path) -> Result<(), ConfigError> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir).map_err(|source| ConfigError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
    }

    let content = toml::to_string_pretty(config)?;
    std::fs::write(path, content).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn platform_config_dir() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        std::env::var_os("APPDATA").map(|p| PathBuf::from(p).join("trackpad-remote"))
    }

    #[cfg(target_os = "linux")]
    {
        let base = std::env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".config")))?;
        Some(base.join("trackpad-remote"))
    }

    #[cfg(target_os = "macos")]
    {
        std::env::var_os("HOME").map(|h| {
            PathBuf::from(h)
                .join("Library")
                .join("Application Support")
                .join("trackpad-remote")
        })
    }

    #[cfg(not(any(target_os = "windows", target_os = "linux", target_os = "macos")))]
    {
        None
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_config_default_targets_local_executor() {
        // Arrange / Act
        let cfg = AppConfig::default();

        // Assert
        assert_eq!(cfg.server.url, "http://127.0.0.1:51273");
        assert!(!cfg.server.http_only);
        assert_eq!(cfg.server.reconnect_attempts, 5);
        assert_eq!(cfg.server.max_in_flight, 5);
        assert_eq!(cfg.input.mode, InputMode::Gestures);
        assert_eq!(cfg.log_level, "info");
    }

    #[test]
    fn test_transport_defaults_share_the_executor_port() {
        assert_eq!(SocketChannelConfig::default().url, "http://127.0.0.1:51273");
        assert_eq!(HttpFallbackConfig::default().base_url, "http://127.0.0.1:51273");
    }

    #[test]
    fn test_empty_file_yields_defaults() {
        let cfg: AppConfig = toml::from_str("").unwrap();
        assert_eq!(cfg, AppConfig::default());
    }

    #[test]
    fn test_partial_gesture_section_keeps_other_defaults() {
        // Arrange
        let text = r#"
            [gesture]
            sensitivity = 9.0

            [input]
            mode = "raw"
        "#;

        // Act
        let cfg: AppConfig = toml::from_str(text).unwrap();

        // Assert
        assert_eq!(cfg.gesture.sensitivity, 9.0);
        assert_eq!(cfg.gesture.move_threshold, 0.35);
        assert_eq!(cfg.gesture.tap_timeout_ms, 200);
        assert_eq!(cfg.input.mode, InputMode::Raw);
        assert_eq!(cfg.input.stream_interval_ms, 16);
    }

    #[test]
    fn test_clamped_gesture_repairs_out_of_range_values() {
        let mut cfg = AppConfig::default();
        cfg.gesture.sensitivity = -4.0;
        cfg.gesture.tap_distance = -1.0;

        let gesture = cfg.clamped_gesture();

        assert!(gesture.sensitivity > 0.0);
        assert!(gesture.tap_distance >= 0.0);
        assert_eq!(gesture.move_threshold, 0.35);
    }

    #[test]
    fn test_transport_configs_follow_server_section() {
        let mut cfg = AppConfig::default();
        cfg.server.url = "http://10.1.1.1:8080".into();
        cfg.server.connect_timeout_ms = 500;
        cfg.server.request_timeout_ms = 750;

        let socket = cfg.socket_channel();
        let http = cfg.http_fallback();

        assert_eq!(socket.url, "http://10.1.1.1:8080");
        assert_eq!(socket.connect_timeout, Duration::from_millis(500));
        assert_eq!(http.request_timeout, Duration::from_millis(750));
    }

    #[test]
    fn test_missing_file_loads_defaults() {
        let path = std::env::temp_dir()
            .join(format!("trackpad-remote-missing-{}", uuid::Uuid::new_v4()))
            .join("config.toml");

        assert_eq!(load_config_from(&path).unwrap(), AppConfig::default());
    }

    #[test]
    fn test_save_then_load_preserves_edits() {
        // Arrange
        let dir = std::env::temp_dir().join(format!("trackpad-remote-{}", uuid::Uuid::new_v4()));
        let path = dir.join("nested").join("config.toml");
        let mut cfg = AppConfig::default();
        cfg.server.http_only = true;
        cfg.gesture.set_scroll_sensitivity(12.0);

        // Act
        save_config_to(&cfg, &path).unwrap();
        let loaded = load_config_from(&path).unwrap();

        // Assert
        assert_eq!(loaded, cfg);
        let _ = std::fs::remove_dir_all(dir);
    }

    #[test]
    fn test_malformed_toml_is_a_parse_error() {
        assert!(matches!(
            toml::from_str::<AppConfig>("server = 3").map_err(ConfigError::from),
            Err(ConfigError::Parse(_))
        ));
    }
}
