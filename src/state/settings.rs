/// Credential persistence and the settings dialog edit buffer.
///
/// The credential is stored as a single JSON field so the file stays
/// readable and hand-editable:
///
/// ```json
/// { "gemini_api_key": "AIzaSy..." }
/// ```
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Fixed field name the credential is stored under.
pub const CREDENTIAL_KEY: &str = "gemini_api_key";

/// Errors raised while loading or saving settings
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    /// No config or home directory could be determined for this user.
    #[error("could not determine a settings directory")]
    NoConfigDir,

    #[error("settings I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("settings file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// The secret token authorizing calls to the Gemini API.
///
/// Always trimmed and non-empty. `Debug` never prints the secret.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    /// Wrap a raw value; blank input yields `None`.
    pub fn new(raw: impl AsRef<str>) -> Option<Self> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Credential(trimmed.to_string()))
        }
    }

    /// The secret itself, for the request header.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(****)")
    }
}

/// Persistence port for the user credential
pub trait KeyStore {
    /// Read the stored credential, if any.
    fn load(&self) -> Result<Option<String>, SettingsError>;
    /// Overwrite the stored credential. An empty string clears it.
    fn save(&self, value: &str) -> Result<(), SettingsError>;
}

/// On-disk layout of the settings file
#[derive(Serialize, Deserialize, Debug, Default, Clone, PartialEq)]
struct StoredSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    gemini_api_key: Option<String>,
}

/// Key store backed by a JSON file in the user's config directory.
#[derive(Debug, Clone)]
pub struct FileKeyStore {
    path: PathBuf,
}

impl FileKeyStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Get the path to the settings file
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl KeyStore for FileKeyStore {
    fn load(&self) -> Result<Option<String>, SettingsError> {
        let json = match std::fs::read_to_string(&self.path) {
            Ok(json) => json,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No settings file at {}", self.path.display());
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };

        let stored: StoredSettings = serde_json::from_str(&json)?;
        debug!("Read {} from {}", CREDENTIAL_KEY, self.path.display());
        Ok(stored.gemini_api_key.filter(|k| !k.trim().is_empty()))
    }

    fn save(&self, value: &str) -> Result<(), SettingsError> {
        // Ensure the parent directory exists
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let trimmed = value.trim();
        let stored = StoredSettings {
            gemini_api_key: (!trimmed.is_empty()).then(|| trimmed.to_string()),
        };
        std::fs::write(&self.path, serde_json::to_string_pretty(&stored)?)?;

        info!("💾 Settings saved to {}", self.path.display());
        Ok(())
    }
}

/// Key store that lives only in memory.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct MemoryKeyStore {
    value: std::sync::Mutex<Option<String>>,
}

#[cfg(test)]
impl MemoryKeyStore {
    pub fn with_value(value: &str) -> Self {
        Self {
            value: std::sync::Mutex::new(Some(value.to_string())),
        }
    }
}

#[cfg(test)]
impl KeyStore for MemoryKeyStore {
    fn load(&self) -> Result<Option<String>, SettingsError> {
        Ok(self.value.lock().map(|v| v.clone()).unwrap_or_default())
    }

    fn save(&self, value: &str) -> Result<(), SettingsError> {
        if let Ok(mut slot) = self.value.lock() {
            *slot = (!value.trim().is_empty()).then(|| value.trim().to_string());
        }
        Ok(())
    }
}

/// The credentials known to the running app.
#[derive(Debug, Clone, Default)]
pub struct Credentials {
    /// Saved by the user through the settings dialog
    pub user: Option<Credential>,
    /// Injected by the environment
    pub fallback: Option<Credential>,
}

impl Credentials {
    /// Load the user credential from `store`, keeping `fallback` as the
    /// second choice.
    pub fn load(store: &dyn KeyStore, fallback: Option<Credential>) -> Result<Self, SettingsError> {
        let user = store.load()?.and_then(Credential::new);
        Ok(Self { user, fallback })
    }

    /// User credential first, then the environment fallback.
    pub fn effective(&self) -> Option<&Credential> {
        self.user.as_ref().or(self.fallback.as_ref())
    }

    /// Persist a new user credential and make it effective.
    pub fn update(&mut self, store: &dyn KeyStore, value: &str) -> Result<(), SettingsError> {
        store.save(value)?;
        self.user = Credential::new(value);
        Ok(())
    }

    /// Whether the user saved a credential of their own.
    pub fn has_user_key(&self) -> bool {
        self.user.is_some()
    }
}

/// Edit buffer behind the settings modal.
#[derive(Debug, Default)]
pub struct SettingsDialog {
    open: bool,
    buffer: String,
}

impl SettingsDialog {
    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    /// Open the dialog pre-filled with the saved credential.
    pub fn open(&mut self, current: Option<&Credential>) {
        self.buffer = current.map(|c| c.expose().to_string()).unwrap_or_default();
        self.open = true;
    }

    pub fn edit(&mut self, text: String) {
        self.buffer = text;
    }

    /// Close and hand back the buffer for persistence.
    pub fn save(&mut self) -> String {
        self.open = false;
        std::mem::take(&mut self.buffer)
    }

    /// Close without saving; the edit is discarded.
    pub fn close(&mut self) {
        self.open = false;
        self.buffer.clear();
    }
}
