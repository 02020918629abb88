//! Configuration loader for EchoTwin.
//!
//! Reads `config.toml` from the data directory (`~/.echotwin/` in production)
//! and deserializes it into [`TwinConfig`]. Falls back to defaults when the
//! file is missing or malformed.

use std::path::Path;

use echotwin_types::config::TwinConfig;

pub const CONFIG_FILE: &str = "config.toml";

/// Load configuration from `{data_dir}/config.toml`.
///
/// - Missing file: [`TwinConfig::default()`].
/// - Unreadable or unparsable file: a warning, then the default.
pub async fn load_twin_config(data_dir: &Path) -> TwinConfig {
    let config_path = data_dir.join(CONFIG_FILE);

    let content = match tokio::fs::read_to_string(&config_path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No config.toml found at {}, using defaults", config_path.display());
            return TwinConfig::default();
        }
        Err(err) => {
            tracing::warn!("Failed to read {}: {err}, using defaults", config_path.display());
            return TwinConfig::default();
        }
    };

    match toml::from_str::<TwinConfig>(&content) {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!(
                "Failed to parse {}: {err}, using defaults",
                config_path.display()
            );
            TwinConfig::default()
        }
    }
}

/// Apply the `PORT` environment override used by hosting platforms.
pub fn apply_port_override(config: &mut TwinConfig, port: Option<&str>) {
    let Some(raw) = port else {
        return;
    };
    match raw.trim().parse::<u16>() {
        Ok(port) => config.server.port = port,
        Err(_) => tracing::warn!(value = %raw, "ignoring invalid PORT override"),
    }
}
