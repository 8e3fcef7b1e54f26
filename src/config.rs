use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Load environment variables from .env file with robust parsing.
/// Handles values with spaces without requiring quotes.
pub fn load_dotenv() {
    load_dotenv_from(Path::new(".env"));
}

fn load_dotenv_from(env_path: &Path) {
    if !env_path.exists() {
        return;
    }

    let content = match fs::read_to_string(env_path) {
        Ok(c) => c,
        Err(_) => return,
    };

    for (key, value) in parse_dotenv(&content) {
        // Only set if not already set (env vars take precedence)
        if std::env::var(key).is_err() {
            // SAFETY: We're single-threaded at this point (called before any async runtime)
            unsafe { std::env::set_var(key, value) };
        }
    }
}

/// Split `.env` content into key/value pairs, skipping blanks and comments.
fn parse_dotenv(content: &str) -> Vec<(&str, &str)> {
    let mut pairs = Vec::new();

    for line in content.lines() {
        let line = line.trim();

        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        // Find the first '=' and split there
        if let Some(eq_pos) = line.find('=') {
            let key = line[..eq_pos].trim();
            let mut value = line[eq_pos + 1..].trim();

            // Remove surrounding quotes if present
            if value.len() >= 2
                && ((value.starts_with('"') && value.ends_with('"'))
                    || (value.starts_with('\'') && value.ends_with('\'')))
            {
                value = &value[1..value.len() - 1];
            }

            pairs.push((key, value));
        }
    }

    pairs
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub remote: RemoteConfig,
    pub panel: PanelConfig,
}

/// Where the device backend lives and the resource path of each exchange.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteConfig {
    pub base_url: String,
    pub status_path: String,
    pub mode_path: String,
    pub fan_path: String,
    pub pump_path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PanelConfig {
    pub name: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            remote: RemoteConfig {
                base_url: "http://127.0.0.1:8080/api".to_string(),
                status_path: "status".to_string(),
                mode_path: "mode".to_string(),
                fan_path: "fan".to_string(),
                pump_path: "pump".to_string(),
            },
            panel: PanelConfig {
                name: "Control Panel".to_string(),
            },
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(url) = std::env::var("CONTROL_API_URL") {
            config.remote.base_url = url;
        }
        if let Ok(path) = std::env::var("CONTROL_STATUS_PATH") {
            config.remote.status_path = path;
        }
        if let Ok(path) = std::env::var("CONTROL_MODE_PATH") {
            config.remote.mode_path = path;
        }
        if let Ok(path) = std::env::var("CONTROL_FAN_PATH") {
            config.remote.fan_path = path;
        }
        if let Ok(path) = std::env::var("CONTROL_PUMP_PATH") {
            config.remote.pump_path = path;
        }
        if let Ok(name) = std::env::var("PANEL_NAME") {
            config.panel.name = name;
        }

        config
    }
}
