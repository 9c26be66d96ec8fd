// Jobboard Settings Engine
// Loads, saves, updates and resets the client settings file.
// Settings live as JSON at the platform config path; environment variables
// override a few values at runtime without being written back.

use std::fs;
use std::path::Path;

use tracing::{debug, info, warn};

use crate::platform;
use crate::types::errors::SettingsError;
use crate::types::settings::{ClientSettings, PaymentMode};

/// Overrides `api.base_url`.
pub const ENV_API_URL: &str = "JOBBOARD_API_URL";
/// Overrides `payment.mode` (`mock` or `live`).
pub const ENV_PAYMENT_MODE: &str = "JOBBOARD_PAYMENT_MODE";
/// Overrides the directory of the preference database.
pub const ENV_DATA_DIR: &str = "JOBBOARD_DATA_DIR";

/// Persisted client settings.
pub trait SettingsEngineTrait {
    fn load(&mut self) -> Result<ClientSettings, SettingsError>;
    fn save(&self) -> Result<(), SettingsError>;
    fn get_settings(&self) -> &ClientSettings;
    fn effective_settings(&self) -> ClientSettings;
    fn set_value(&mut self, key: &str, value: serde_json::Value) -> Result<(), SettingsError>;
    fn reset(&mut self) -> Result<(), SettingsError>;
    fn get_config_path(&self) -> &str;
}

/// Settings engine that persists settings as JSON on disk.
pub struct SettingsEngine {
    config_path: String,
    settings: ClientSettings,
}

impl SettingsEngine {
    /// Creates an engine for `path_override`, or for `settings.json` in the
    /// platform config directory.
    pub fn new(path_override: Option<String>) -> Self {
        let config_path = path_override.unwrap_or_else(|| {
            platform::get_config_dir()
                .join("settings.json")
                .to_string_lossy()
                .to_string()
        });

        Self {
            config_path,
            settings: ClientSettings::default(),
        }
    }
}

/// Applies environment overrides using `lookup` to read variables.
pub fn apply_overrides<F>(mut settings: ClientSettings, lookup: F) -> ClientSettings
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(url) = lookup(ENV_API_URL).filter(|u| !u.trim().is_empty()) {
        settings.api.base_url = url.trim().trim_end_matches('/').to_string();
    }
    if let Some(mode) = lookup(ENV_PAYMENT_MODE) {
        match mode.trim().to_lowercase().as_str() {
            "mock" => settings.payment.mode = PaymentMode::Mock,
            "live" => settings.payment.mode = PaymentMode::Live,
            other => warn!(value = other, "ignoring unknown {}", ENV_PAYMENT_MODE),
        }
    }
    if let Some(dir) = lookup(ENV_DATA_DIR).filter(|d| !d.trim().is_empty()) {
        settings.storage.preferences_db = Some(
            Path::new(dir.trim())
                .join("preferences.db")
                .to_string_lossy()
                .to_string(),
        );
    }
    settings
}

/// Replaces the value at dot path `key` inside `doc`.
///
/// Only existing keys can be set; unknown sections and fields are rejected
/// rather than silently added.
fn set_path(doc: &mut serde_json::Value, key: &str, value: serde_json::Value) -> Result<(), SettingsError> {
    let unknown = || SettingsError::InvalidKey(format!("no setting named '{}'", key));
    let mut segments = key.split('.').peekable();
    let mut node = doc;
    while let Some(segment) = segments.next() {
        let map = node.as_object_mut().ok_or_else(unknown)?;
        if segments.peek().is_none() {
            let slot = map.get_mut(segment).ok_or_else(unknown)?;
            *slot = value;
            return Ok(());
        }
        node = map.get_mut(segment).ok_or_else(unknown)?;
    }
    Err(unknown())
}

impl SettingsEngineTrait for SettingsEngine {
    /// Reads the settings file. A missing file yields the defaults; a
    /// malformed one is an error and leaves the engine on its previous values.
    fn load(&mut self) -> Result<ClientSettings, SettingsError> {
        let path = Path::new(&self.config_path);
        if !path.exists() {
            self.settings = ClientSettings::default();
            return Ok(self.settings.clone());
        }

        let raw = fs::read_to_string(path)
            .map_err(|e| SettingsError::IoError(format!("reading {}: {}", self.config_path, e)))?;
        self.settings = serde_json::from_str(&raw)
            .map_err(|e| SettingsError::SerializationError(format!("{} is not valid settings: {}", self.config_path, e)))?;
        debug!(path = %self.config_path, "settings loaded");
        Ok(self.settings.clone())
    }

    /// Writes the settings file, creating its directory on first save.
    fn save(&self) -> Result<(), SettingsError> {
        let path = Path::new(&self.config_path);
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)
                .map_err(|e| SettingsError::IoError(format!("creating {}: {}", dir.display(), e)))?;
        }
        let body = serde_json::to_string_pretty(&self.settings)
            .map_err(|e| SettingsError::SerializationError(e.to_string()))?;
        fs::write(path, body).map_err(|e| SettingsError::IoError(format!("writing {}: {}", self.config_path, e)))
    }

    fn get_settings(&self) -> &ClientSettings {
        &self.settings
    }

    /// Settings as the running client should use them: the file contents
    /// with process environment overrides applied.
    fn effective_settings(&self) -> ClientSettings {
        apply_overrides(self.settings.clone(), |name| std::env::var(name).ok())
    }

    /// Updates one setting by dot path (e.g. `views.jobs_page_size`) and saves.
    ///
    /// The whole document is deserialized again, so a value of the wrong
    /// type is rejected before anything is written.
    fn set_value(&mut self, key: &str, value: serde_json::Value) -> Result<(), SettingsError> {
        if key.trim().is_empty() {
            return Err(SettingsError::InvalidKey("empty key".to_string()));
        }
        let mut doc =
            serde_json::to_value(&self.settings).map_err(|e| SettingsError::SerializationError(e.to_string()))?;
        set_path(&mut doc, key, value)?;
        self.settings = serde_json::from_value(doc)
            .map_err(|e| SettingsError::InvalidValue(format!("{}: {}", key, e)))?;
        info!(key, "setting changed");
        self.save()
    }

    /// Restores factory defaults and saves.
    fn reset(&mut self) -> Result<(), SettingsError> {
        self.settings = ClientSettings::default();
        self.save()
    }

    fn get_config_path(&self) -> &str {
        &self.config_path
    }
}
