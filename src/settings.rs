//! Stored option defaults.
//!
//! Settings are loaded once per conversion and only supply defaults:
//! options passed explicitly to a conversion always win.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};

use crate::css::CssStrategy;
use crate::error::{Error, Result};

/// Persisted defaults, stored as camelCase JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StoredSettings {
    pub typescript: bool,
    pub component_name: Option<String>,
    pub css_strategy: CssStrategy,
    pub extract_styles: bool,
    pub class_name: bool,
    pub download_assets: bool,
    pub base_url: Option<String>,
    pub project_name: Option<String>,
    pub integrity: bool,
    pub indent: usize,
}

impl Default for StoredSettings {
    fn default() -> Self {
        Self {
            typescript: false,
            component_name: None,
            css_strategy: CssStrategy::default(),
            extract_styles: true,
            class_name: true,
            download_assets: true,
            base_url: None,
            project_name: None,
            integrity: false,
            indent: 2,
        }
    }
}

/// Where settings live.
pub trait SettingsStore {
    fn load(&self) -> Result<StoredSettings>;
    fn save(&self, settings: &StoredSettings) -> Result<()>;
}

/// Settings in a JSON file. A missing file yields the defaults.
#[derive(Debug, Clone)]
pub struct JsonFileSettings {
    path: PathBuf,
}

impl JsonFileSettings {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SettingsStore for JsonFileSettings {
    fn load(&self) -> Result<StoredSettings> {
        if !self.path.exists() {
            return Ok(StoredSettings::default());
        }
        let content = std::fs::read_to_string(&self.path)?;
        serde_json::from_str(&content).map_err(|e| {
            Error::Settings(format!(
                "failed to parse settings file {}: {e}",
                self.path.display()
            ))
        })
    }

    fn save(&self, settings: &StoredSettings) -> Result<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        let mut json = serde_json::to_string_pretty(settings)?;
        json.push('\n');
        std::fs::write(&self.path, json)?;
        Ok(())
    }
}

/// In-memory settings, for tests and embedders without a filesystem.
#[derive(Debug, Default)]
pub struct MemorySettings {
    settings: Mutex<StoredSettings>,
}

impl MemorySettings {
    pub fn new(settings: StoredSettings) -> Self {
        Self {
            settings: Mutex::new(settings),
        }
    }
}

impl SettingsStore for MemorySettings {
    fn load(&self) -> Result<StoredSettings> {
        self.settings
            .lock()
            .map(|s| s.clone())
            .map_err(|_| Error::Settings("settings lock poisoned".to_string()))
    }

    fn save(&self, settings: &StoredSettings) -> Result<()> {
        let mut guard = self
            .settings
            .lock()
            .map_err(|_| Error::Settings("settings lock poisoned".to_string()))?;
        *guard = settings.clone();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields_take_defaults() {
        let settings: StoredSettings =
            serde_json::from_str(r#"{"typescript": true, "cssStrategy": "tailwind"}"#).unwrap();
        assert!(settings.typescript);
        assert_eq!(settings.css_strategy, CssStrategy::Tailwind);
        assert!(settings.extract_styles);
        assert_eq!(settings.indent, 2);
    }

    #[test]
    fn test_memory_round_trip() {
        let store = MemorySettings::default();
        let mut settings = store.load().unwrap();
        settings.component_name = Some("Landing".into());
        store.save(&settings).unwrap();
        assert_eq!(store.load().unwrap().component_name.as_deref(), Some("Landing"));
    }
}
