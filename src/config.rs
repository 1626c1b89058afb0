use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{ClientError, Result};

pub const DEFAULT_CONFIG_PATH: &str = "config/client.json";
pub const API_URL_ENV: &str = "CHAT_API_URL";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Endpoint root shared by the HTTP API and the real-time channel.
    pub api_url: String,
    pub data_dir: PathBuf,
    pub reconnect_delay_ms: u64,
    pub search_debounce_ms: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_url: "http://localhost:8000".to_string(),
            data_dir: PathBuf::from("data"),
            reconnect_delay_ms: 2_000,
            search_debounce_ms: 300,
        }
    }
}

impl AppConfig {
    /// Parsed endpoint root.
    pub fn api_root(&self) -> Result<Url> {
        Ok(Url::parse(&self.api_url)?)
    }

    /// Socket.IO endpoint derived from the endpoint root.
    pub fn socket_url(&self) -> Result<Url> {
        socket_url_for(&self.api_root()?)
    }

    pub fn session_db_path(&self) -> PathBuf {
        self.data_dir.join("session.db")
    }

    /// Applies `CHAT_API_URL` when it is set and non-empty.
    pub fn apply_env(&mut self) {
        if let Ok(url) = std::env::var(API_URL_ENV) {
            if !url.trim().is_empty() {
                self.api_url = url.trim().to_string();
            }
        }
    }
}

/// `root` extended by `segments`, keeping any path prefix of the root.
pub fn endpoint_url(root: &Url, segments: &[&str]) -> Result<Url> {
    let mut url = root.clone();
    url.path_segments_mut()
        .map_err(|_| ClientError::Protocol(format!("{root} cannot be a base")))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

pub fn socket_url_for(root: &Url) -> Result<Url> {
    let mut url = endpoint_url(root, &["socket.io", ""])?;
    let scheme = if root.scheme() == "https" { "wss" } else { "ws" };
    // http(s) -> ws(s) is always accepted by `Url`
    let _ = url.set_scheme(scheme);
    url.query_pairs_mut()
        .append_pair("EIO", "4")
        .append_pair("transport", "websocket");
    Ok(url)
}

pub fn load_config(path: &str) -> AppConfig {
    let path = Path::new(path);
    match fs::read_to_string(path) {
        Ok(content) => match serde_json::from_str::<AppConfig>(&content) {
            Ok(config) => config,
            Err(err) => {
                log::warn!("Failed to parse config file {}: {err}", path.display());
                AppConfig::default()
            }
        },
        Err(err) => {
            log::info!(
                "Config file {} not found ({err}); using defaults",
                path.display()
            );
            AppConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn socket_url_follows_scheme() {
        let plain = socket_url_for(&Url::parse("http://localhost:8000").unwrap()).unwrap();
        assert_eq!(
            plain.as_str(),
            "ws://localhost:8000/socket.io/?EIO=4&transport=websocket"
        );

        let secure = socket_url_for(&Url::parse("https://chat.example.com/").unwrap()).unwrap();
        assert!(secure.as_str().starts_with("wss://chat.example.com/socket.io/"));
    }

    #[test]
    fn socket_url_keeps_root_prefix() {
        let prefixed = socket_url_for(&Url::parse("https://host.example/api").unwrap()).unwrap();
        assert_eq!(
            prefixed.as_str(),
            "wss://host.example/api/socket.io/?EIO=4&transport=websocket"
        );
    }

    #[test]
    fn partial_config_keeps_defaults() {
        let config: AppConfig = serde_json::from_str(r#"{"api_url": "http://10.0.0.2:9000"}"#).unwrap();
        assert_eq!(config.api_url, "http://10.0.0.2:9000");
        assert_eq!(config.search_debounce_ms, 300);
    }

    #[test]
    fn missing_file_uses_defaults() {
        let config = load_config("/definitely/not/here.json");
        assert_eq!(config.api_url, AppConfig::default().api_url);
    }
}
