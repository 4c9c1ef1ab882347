/// Startup configuration resolved from the environment.
///
/// Everything here is read once in `main` and then passed down
/// explicitly; nothing below this module reads the environment.
use std::path::PathBuf;

use crate::state::settings::Credential;

/// Gemini model that accepts an image and returns an edited image.
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash-image";

/// Public Generative Language API host.
pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com";

/// Environment variables checked, in order, for a fallback credential.
pub const FALLBACK_KEY_VARS: [&str; 2] = ["GEMINI_API_KEY", "API_KEY"];

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Model identifier sent in the request path
    pub model: String,
    /// Base URL of the Generative Language API (no trailing slash)
    pub api_base: String,
    /// Credential injected by the environment, used when the user saved none
    pub fallback_credential: Option<Credential>,
    /// Where the user credential is persisted
    pub settings_path: Option<PathBuf>,
}

impl AppConfig {
    /// Resolve the configuration from the process environment.
    pub fn from_env() -> Self {
        Self::resolve(|name| std::env::var(name).ok(), default_settings_path())
    }

    /// Resolve the configuration from an arbitrary variable lookup.
    pub fn resolve(
        lookup: impl Fn(&str) -> Option<String>,
        settings_path: Option<PathBuf>,
    ) -> Self {
        let model = lookup("WATERMARK_REMOVER_MODEL")
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());

        let api_base = lookup("WATERMARK_REMOVER_API_BASE")
            .filter(|b| !b.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_API_BASE.to_string())
            .trim_end_matches('/')
            .to_string();

        let fallback_credential = FALLBACK_KEY_VARS
            .iter()
            .find_map(|name| lookup(name).and_then(Credential::new));

        AppConfig {
            model,
            api_base,
            fallback_credential,
            settings_path,
        }
    }
}

/// Get the path where the settings file should be stored
///
/// - Linux: ~/.config/watermark-remover/settings.json
/// - macOS: ~/Library/Application Support/watermark-remover/settings.json
/// - Windows: %APPDATA%\watermark-remover\settings.json
pub fn default_settings_path() -> Option<PathBuf> {
    let mut path = dirs::config_dir().or_else(dirs::home_dir)?;
    path.push("watermark-remover");
    path.push("settings.json");
    Some(path)
}
