//! Persisted settings: built-in module flags and custom module definitions.
//!
//! Two named records are persisted: `defaultModules` (enable flags for the
//! built-in transforms) and `customModules` (an ordered list of
//! user-authored module specs). The on-disk shape is camelCase JSON with
//! `"onLoad"`-style lifecycle tags, compatible with records synced from
//! browser extension storage. Settings are read exactly once per page
//! session; edits made by the settings UI only affect sessions attached
//! afterwards.

use std::cell::RefCell;
use std::fs;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::error::{PagemendError, PagemendResult};
use crate::modules::LifecycleEvent;

/// Enable flags for the built-in transforms. Absent fields default to
/// enabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DefaultModules {
    pub normalize_text_enabled: bool,
    pub viewport_fix_enabled: bool,
}

impl Default for DefaultModules {
    fn default() -> Self {
        Self {
            normalize_text_enabled: true,
            viewport_fix_enabled: true,
        }
    }
}

/// A user-authored module: a named snippet of Rhai source bound to a
/// lifecycle event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomModuleSpec {
    pub name: String,
    /// Lifecycle tag, persisted as `"onLoad"` / `"onNodeAdded"` /
    /// `"onCharacterDataChange"`.
    #[serde(rename = "type")]
    pub event: LifecycleEvent,
    pub code: String,
    pub id: String,
}

impl CustomModuleSpec {
    /// Create a spec the way the settings UI does on form submission,
    /// generating a `custom_<millis>` id.
    pub fn new(name: impl Into<String>, event: LifecycleEvent, code: impl Into<String>) -> Self {
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or(0);
        Self {
            name: name.into(),
            event,
            code: code.into(),
            id: format!("custom_{millis}"),
        }
    }
}

/// The full persisted settings record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    pub default_modules: DefaultModules,
    pub custom_modules: Vec<CustomModuleSpec>,
}

impl Settings {
    /// Append a custom module, as the settings UI does on form submission.
    pub fn add_custom_module(&mut self, spec: CustomModuleSpec) {
        self.custom_modules.push(spec);
    }

    /// Remove the custom module at `index`, preserving the relative order
    /// of the remaining entries. Returns the removed spec, or `None` if
    /// the index is out of range.
    pub fn remove_custom_module(&mut self, index: usize) -> Option<CustomModuleSpec> {
        if index < self.custom_modules.len() {
            Some(self.custom_modules.remove(index))
        } else {
            None
        }
    }
}

/// Persistence seam for [`Settings`].
///
/// The content pipeline calls `load` once at session attach; `save` is the
/// settings UI's path.
pub trait SettingsStore {
    fn load(&self) -> PagemendResult<Settings>;
    fn save(&self, settings: &Settings) -> PagemendResult<()>;
}

/// Settings store backed by a single JSON file.
pub struct JsonSettingsStore {
    path: PathBuf,
}

impl JsonSettingsStore {
    /// Create a store reading and writing `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at the platform default location
    /// (`<config dir>/pagemend/settings.json`).
    pub fn at_default_path() -> PagemendResult<Self> {
        let base = dirs::config_dir()
            .ok_or_else(|| PagemendError::Settings("no config directory available".to_string()))?;
        Ok(Self::new(base.join("pagemend").join("settings.json")))
    }

    /// Install-time onboarding: write the default record if none exists
    /// yet. Leaves an existing file untouched.
    pub fn seed_defaults(&self) -> PagemendResult<()> {
        if !self.path.exists() {
            self.save(&Settings::default())?;
        }
        Ok(())
    }
}

impl SettingsStore for JsonSettingsStore {
    fn load(&self) -> PagemendResult<Settings> {
        if !self.path.exists() {
            return Ok(Settings::default());
        }
        let contents = fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&contents)?)
    }

    fn save(&self, settings: &Settings) -> PagemendResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(settings)?;
        fs::write(&self.path, contents)?;
        Ok(())
    }
}

/// In-memory settings store, for tests and embedding hosts without a
/// persistence layer.
pub struct MemorySettingsStore {
    inner: RefCell<Settings>,
}

impl MemorySettingsStore {
    pub fn new(settings: Settings) -> Self {
        Self {
            inner: RefCell::new(settings),
        }
    }
}

impl Default for MemorySettingsStore {
    fn default() -> Self {
        Self::new(Settings::default())
    }
}

impl SettingsStore for MemorySettingsStore {
    fn load(&self) -> PagemendResult<Settings> {
        Ok(self.inner.borrow().clone())
    }

    fn save(&self, settings: &Settings) -> PagemendResult<()> {
        *self.inner.borrow_mut() = settings.clone();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_enable_both_builtins() {
        let settings = Settings::default();
        assert!(settings.default_modules.normalize_text_enabled);
        assert!(settings.default_modules.viewport_fix_enabled);
        assert!(settings.custom_modules.is_empty());
    }

    #[test]
    fn test_camel_case_record_shape_loads() {
        let raw = r#"{
            "defaultModules": { "normalizeTextEnabled": false, "viewportFixEnabled": true },
            "customModules": [
                { "name": "banner", "type": "onLoad", "code": "1 + 1", "id": "custom_1700000000000" }
            ]
        }"#;
        let settings: Settings = serde_json::from_str(raw).unwrap();
        assert!(!settings.default_modules.normalize_text_enabled);
        assert!(settings.default_modules.viewport_fix_enabled);
        assert_eq!(settings.custom_modules.len(), 1);
        assert_eq!(settings.custom_modules[0].event, LifecycleEvent::PageReady);
    }

    #[test]
    fn test_absent_keys_mean_defaults() {
        let settings: Settings = serde_json::from_str("{}").unwrap();
        assert_eq!(settings, Settings::default());

        let partial: Settings =
            serde_json::from_str(r#"{ "defaultModules": { "viewportFixEnabled": false } }"#)
                .unwrap();
        assert!(partial.default_modules.normalize_text_enabled);
        assert!(!partial.default_modules.viewport_fix_enabled);
    }

    #[test]
    fn test_remove_by_index_preserves_order() {
        let mut settings = Settings::default();
        for name in ["a", "b", "c", "d"] {
            settings.add_custom_module(CustomModuleSpec::new(
                name,
                LifecycleEvent::NodeAdded,
                "()",
            ));
        }

        let removed = settings.remove_custom_module(1).unwrap();
        assert_eq!(removed.name, "b");
        let names: Vec<_> = settings.custom_modules.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["a", "c", "d"]);

        // Out-of-range delete is a no-op.
        assert!(settings.remove_custom_module(10).is_none());
        assert_eq!(settings.custom_modules.len(), 3);
    }

    #[test]
    fn test_json_store_round_trip() {
        let dir = TempDir::new().unwrap();
        let store = JsonSettingsStore::new(dir.path().join("settings.json"));

        let mut settings = Settings::default();
        settings.default_modules.normalize_text_enabled = false;
        settings.add_custom_module(CustomModuleSpec::new(
            "greeter",
            LifecycleEvent::CharacterDataChanged,
            r#"set_text(node, "hi")"#,
        ));
        store.save(&settings).unwrap();

        let loaded = store.load().unwrap();
        assert_eq!(loaded, settings);
    }

    #[test]
    fn test_json_store_missing_file_yields_defaults() {
        let dir = TempDir::new().unwrap();
        let store = JsonSettingsStore::new(dir.path().join("missing.json"));
        assert_eq!(store.load().unwrap(), Settings::default());
    }

    #[test]
    fn test_seed_defaults_writes_once() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.json");
        let store = JsonSettingsStore::new(&path);

        store.seed_defaults().unwrap();
        assert!(path.exists());

        // A later seed must not clobber user edits.
        let mut edited = Settings::default();
        edited.default_modules.viewport_fix_enabled = false;
        store.save(&edited).unwrap();
        store.seed_defaults().unwrap();
        assert_eq!(store.load().unwrap(), edited);
    }
}
