//! trackpad-remote: phone trackpad gestures to a remote executor.
//!
//! Reads already-acquired pointer, touch, keyboard and button events as JSON
//! lines, interprets them with the gesture engine, and delivers the resulting
//! commands over a Socket.IO-compatible WebSocket channel, falling back to one
//! HTTP `POST` per command while the channel is down.
//!
//! # Usage
//!
//! ```text
//! trackpad-remote [OPTIONS]
//!
//! Options:
//!   --config <FILE>         Config file [default: platform config dir]
//!   --server <URL>          Executor base URL
//!   --mode <MODE>           gestures | raw
//!   --sensitivity <F>       Pointer sensitivity multiplier
//!   --http-only             Never open the channel
//!   --input <FILE>          Read input lines from FILE instead of stdin
//!   --save-config           Write the resolved config back and exit
//! ```
//!
//! # Environment variable overrides
//!
//! | Variable                   | Flag            |
//! |----------------------------|-----------------|
//! | `TRACKPAD_CONFIG`          | `--config`      |
//! | `TRACKPAD_SERVER`          | `--server`      |
//! | `TRACKPAD_MODE`            | `--mode`        |
//! | `TRACKPAD_SENSITIVITY`     | `--sensitivity` |
//! | `TRACKPAD_HTTP_ONLY`       | `--http-only`   |
//! | `TRACKPAD_INPUT`           | `--input`       |
//!
//! `RUST_LOG` takes precedence over the configured `log_level`.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tokio::io::{AsyncBufRead, BufReader};
use tokio::sync::mpsc;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use trackpad_remote::application::dispatch::{CommandDispatcher, Transport};
use trackpad_remote::application::session::TrackpadSession;
use trackpad_remote::domain::{InputLine, InputMode};
use trackpad_remote::infrastructure::input_source::read_input_lines;
use trackpad_remote::infrastructure::storage::config::{self, AppConfig, ConfigError};
use trackpad_remote::infrastructure::transport::{
    FailoverTransport, HealthReporter, HttpFallback, SocketChannel,
};

// ── CLI argument definitions ──────────────────────────────────────────────────

#[derive(Debug, Parser)]
#[command(
    name = "trackpad-remote",
    about = "Phone trackpad gestures to a remote executor over WebSocket with HTTP fallback",
    version
)]
struct Cli {
    /// Path of the TOML config file.
    #[arg(long, env = "TRACKPAD_CONFIG")]
    config: Option<PathBuf>,

    /// Executor base URL, e.g. `http://192.168.1.20:51273`.
    #[arg(long, env = "TRACKPAD_SERVER")]
    server: Option<String>,

    /// How contact input is interpreted.
    #[arg(long, value_enum, env = "TRACKPAD_MODE")]
    mode: Option<InputMode>,

    /// Pointer sensitivity multiplier (clamped to the supported range).
    #[arg(long, env = "TRACKPAD_SENSITIVITY")]
    sensitivity: Option<f64>,

    /// Send everything over HTTP; never open the channel.
    #[arg(long, env = "TRACKPAD_HTTP_ONLY")]
    http_only: bool,

    /// Read input lines from this file instead of stdin.
    #[arg(long, env = "TRACKPAD_INPUT")]
    input: Option<PathBuf>,

    /// Write the resolved config (file plus overrides) to the config file and
    /// exit.
    #[arg(long)]
    save_config: bool,
}

impl Cli {
    /// Loads the config file and applies the command-line overrides.
    fn resolve_config(&self) -> anyhow::Result<AppConfig> {
        let mut cfg = match &self.config {
            Some(path) => config::load_config_from(path)
                .with_context(|| format!("failed to load config from {}", path.display()))?,
            None => match config::load_config() {
                Err(ConfigError::NoPlatformConfigDir) => AppConfig::default(),
                other => other.context("failed to load config")?,
            },
        };

        if let Some(server) = &self.server {
            cfg.server.url = server.clone();
        }
        if let Some(mode) = self.mode {
            cfg.input.mode = mode;
        }
        if let Some(sensitivity) = self.sensitivity {
            cfg.gesture.sensitivity = sensitivity;
        }
        if self.http_only {
            cfg.server.http_only = true;
        }
        Ok(cfg)
    }

    /// Persists `cfg` to `--config`, or to the platform config file.
    fn save_resolved(&self, cfg: &AppConfig) -> anyhow::Result<PathBuf> {
        match &self.config {
            Some(path) => {
                config::save_config_to(cfg, path)
                    .with_context(|| format!("failed to save config to {}", path.display()))?;
                Ok(path.clone())
            }
            None => {
                config::save_config(cfg).context("failed to save config")?;
                Ok(config::config_file_path()?)
            }
        }
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let cfg = cli.resolve_config()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cfg.log_level)),
        )
        .init();

    if cli.save_config {
        let path = cli.save_resolved(&cfg)?;
        info!(path = %path.display(), "config saved");
        return Ok(());
    }

    info!(
        server = %cfg.server.url,
        mode = %cfg.input.mode,
        http_only = cfg.server.http_only,
        "trackpad remote starting"
    );

    // ── Transports ────────────────────────────────────────────────────────────
    let (health, mut health_rx) = HealthReporter::new();
    let http = Arc::new(
        HttpFallback::new(cfg.http_fallback(), health.clone())
            .context("invalid HTTP fallback configuration")?,
    );
    let pending = Arc::clone(http.pending());

    let channel: Option<Arc<dyn Transport>> = if cfg.server.http_only {
        None
    } else {
        let channel: Arc<dyn Transport> = Arc::new(
            SocketChannel::spawn(cfg.socket_channel(), health.clone())
                .context("invalid channel configuration")?,
        );
        Some(channel)
    };
    let transport = Arc::new(FailoverTransport::new(channel, http));

    let mut session = TrackpadSession::new(
        cfg.clamped_gesture(),
        cfg.input.mode,
        CommandDispatcher::new(transport),
    );

    // ── Input reader ──────────────────────────────────────────────────────────
    let source: Box<dyn AsyncBufRead + Unpin + Send> = match &cli.input {
        Some(path) => {
            let file = tokio::fs::File::open(path)
                .await
                .with_context(|| format!("failed to open input {}", path.display()))?;
            Box::new(BufReader::new(file))
        }
        None => Box::new(BufReader::new(tokio::io::stdin())),
    };
    let (line_tx, mut line_rx) = mpsc::channel::<InputLine>(256);
    tokio::spawn(async move {
        match read_input_lines(source, line_tx).await {
            Ok(n) => info!(lines = n, "input exhausted"),
            Err(e) => warn!("input reader stopped: {e}"),
        }
    });

    // ── Main loop ─────────────────────────────────────────────────────────────
    let mut ticker = time::interval(Duration::from_millis(cfg.input.stream_interval_ms.max(1)));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);
    let mut health_open = true;

    loop {
        tokio::select! {
            line = line_rx.recv() => match line {
                Some(line) => session.handle_line(line),
                None => break,
            },
            _ = ticker.tick(), if session.is_streaming() => {
                session.stream_tick();
            }
            changed = health_rx.changed(), if health_open => {
                if changed.is_ok() {
                    let state = *health_rx.borrow_and_update();
                    info!(health = %state, tint = state.tint(), "connectivity changed");
                } else {
                    health_open = false;
                }
            }
            result = &mut ctrl_c => {
                if let Err(e) = result {
                    warn!("failed to listen for Ctrl+C: {e}");
                }
                info!("received Ctrl+C, shutting down");
                break;
            }
        }
    }

    // Let in-flight fallback requests finish, bounded by the request timeout.
    let deadline = Instant::now() + Duration::from_millis(cfg.server.request_timeout_ms);
    while pending.total() > 0 && Instant::now() < deadline {
        time::sleep(Duration::from_millis(10)).await;
    }

    info!(health = %health.current(), "trackpad remote stopped");
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_without_flags_overrides_nothing() {
        // Arrange
        let cli = Cli::parse_from(["trackpad-remote"]);

        // Assert
        assert!(cli.server.is_none());
        assert!(cli.mode.is_none());
        assert!(cli.sensitivity.is_none());
        assert!(!cli.http_only);
    }

    #[test]
    fn test_cli_mode_accepts_raw() {
        let cli = Cli::parse_from(["trackpad-remote", "--mode", "raw"]);
        assert_eq!(cli.mode, Some(InputMode::Raw));
    }

    #[test]
    fn test_cli_rejects_unknown_mode() {
        assert!(Cli::try_parse_from(["trackpad-remote", "--mode", "joystick"]).is_err());
    }

    #[test]
    fn test_overrides_are_applied_over_the_config_file() {
        // Arrange: point --config at a file that does not exist (defaults)
        let missing = std::env::temp_dir().join("trackpad-remote-cli-test-missing.toml");
        let cli = Cli::parse_from([
            "trackpad-remote",
            "--config",
            missing.to_str().unwrap(),
            "--server",
            "http://10.0.0.9:51273",
            "--mode",
            "raw",
            "--sensitivity",
            "9",
            "--http-only",
        ]);

        // Act
        let cfg = cli.resolve_config().unwrap();

        // Assert
        assert_eq!(cfg.server.url, "http://10.0.0.9:51273");
        assert_eq!(cfg.input.mode, InputMode::Raw);
        assert_eq!(cfg.gesture.sensitivity, 9.0);
        assert!(cfg.server.http_only);
    }

    #[test]
    fn test_save_config_writes_overrides_to_the_given_file() {
        // Arrange
        let path = std::env::temp_dir().join(format!(
            "trackpad-remote-save-{}.toml",
            uuid::Uuid::new_v4()
        ));
        let cli = Cli::parse_from([
            "trackpad-remote",
            "--config",
            path.to_str().unwrap(),
            "--mode",
            "raw",
            "--save-config",
        ]);
        let cfg = cli.resolve_config().unwrap();

        // Act
        let written = cli.save_resolved(&cfg).unwrap();

        // Assert
        assert!(cli.save_config);
        assert_eq!(written, path);
        assert_eq!(config::load_config_from(&path).unwrap().input.mode, InputMode::Raw);
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn test_config_file_values_survive_when_no_flag_is_given() {
        let path = std::env::temp_dir().join(format!(
            "trackpad-remote-cli-{}.toml",
            uuid::Uuid::new_v4()
        ));
        std::fs::write(&path, "[server]\nurl = \"http://host:7000\"\n").unwrap();
        let cli = Cli::parse_from(["trackpad-remote", "--config", path.to_str().unwrap()]);

        let cfg = cli.resolve_config().unwrap();

        assert_eq!(cfg.server.url, "http://host:7000");
        let _ = std::fs::remove_file(path);
    }
}
