use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::common::{Identity, UserRole};
use crate::network::api::DEFAULT_BASE_URL;

pub const DEFAULT_CONFIG_PATH: &str = "config/ayurtrace.json";
pub const DEFAULT_LOCATION: &str = "India";

/// Optional colour overrides. Anything left out uses the built-in palette.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThemeConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_green: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accent: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub card_background: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dark_text: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_base_url")]
    pub backend_base_url: String,
    #[serde(default)]
    pub role: UserRole,
    #[serde(default)]
    pub email: Option<String>,
    /// Sent with every producer advice query.
    #[serde(default = "default_location")]
    pub location_name: String,
    #[serde(default)]
    pub dark_mode: bool,
    #[serde(default)]
    pub theme: ThemeConfig,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_location() -> String {
    DEFAULT_LOCATION.to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            backend_base_url: default_base_url(),
            role: UserRole::default(),
            email: None,
            location_name: default_location(),
            dark_mode: false,
            theme: ThemeConfig::default(),
        }
    }
}

impl AppConfig {
    pub fn identity(&self) -> Identity {
        Identity {
            role: self.role,
            email: self.email.clone(),
        }
    }
}

pub fn load_config(path: &str) -> AppConfig {
    let path = Path::new(path);
    match fs::read_to_string(path) {
        Ok(content) => match serde_json::from_str::<AppConfig>(&content) {
            Ok(config) => {
                log::info!("Loaded config from {}", path.display());
                config
            }
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

pub fn save_config(path: &str, config: &AppConfig) -> std::io::Result<()> {
    if let Some(parent) = Path::new(path).parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let json = serde_json::to_string_pretty(config)?;
    fs::write(path, json)
}
