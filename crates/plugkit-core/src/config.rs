//! Per-plugin configuration persistence.
//!
//! A plugin registers named items, each with a saver closure (reads the
//! live value) and a loader closure (writes a restored value back).
//! Saving is strict; loading is deliberately lenient so a stale,
//! missing, or hand-mangled config file never prevents a plugin from
//! starting.

use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::debug;

use crate::error::ConfigError;
use crate::param::ValueMap;

/// Closure that snapshots a live value for persistence.
pub type ConfigSaver = Box<dyn Fn() -> Value>;
/// Closure that applies a restored value.
pub type ConfigLoader = Box<dyn Fn(Value)>;

struct ConfigItem {
    key: String,
    saver: ConfigSaver,
    loader: ConfigLoader,
    default: Value,
}

/// A keyed snapshot store persisted as a pretty-printed JSON object.
#[derive(Default)]
pub struct PluginConfig {
    path: Option<PathBuf>,
    items: Vec<ConfigItem>,
}

impl PluginConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// The conventional config location for a plugin:
    /// `{user-data}/plugkit/{collection}-{name}.cfg`. `None` when the
    /// platform exposes no user-data directory.
    pub fn standard_path(collection: &str, name: &str) -> Option<PathBuf> {
        dirs::data_dir().map(|base| base.join("plugkit").join(format!("{collection}-{name}.cfg")))
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn set_path(&mut self, path: impl Into<PathBuf>) {
        self.path = Some(path.into());
    }

    /// Register an item. Re-registering a key replaces the previous
    /// saver/loader pair.
    pub fn add_item(&mut self, key: &str, saver: ConfigSaver, loader: ConfigLoader, default: Value) {
        let item = ConfigItem {
            key: key.to_string(),
            saver,
            loader,
            default,
        };
        match self.items.iter_mut().find(|i| i.key == item.key) {
            Some(existing) => *existing = item,
            None => self.items.push(item),
        }
    }

    /// Feed every item's loader from the config file.
    ///
    /// Missing file, unreadable contents, malformed JSON, and absent
    /// keys all resolve to each item's default. Never errors.
    pub fn load(&self) {
        let stored: ValueMap = self
            .path
            .as_deref()
            .and_then(|path| std::fs::read_to_string(path).ok())
            .and_then(|text| serde_json::from_str::<ValueMap>(&text).ok())
            .unwrap_or_default();
        if stored.is_empty() {
            debug!(path = ?self.path, "no stored config, applying defaults");
        }
        for item in &self.items {
            let value = stored
                .get(&item.key)
                .cloned()
                .unwrap_or_else(|| item.default.clone());
            (item.loader)(value);
        }
    }

    /// Snapshot every item through its saver and write the result.
    pub fn save(&self) -> Result<(), ConfigError> {
        let path = self.path.as_deref().ok_or(ConfigError::PathNotSet)?;
        if path.is_dir() {
            return Err(ConfigError::PathIsDirectory(path.to_path_buf()));
        }
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let snapshot: ValueMap = self
            .items
            .iter()
            .map(|item| (item.key.clone(), (item.saver)()))
            .collect();
        let text = serde_json::to_string_pretty(&Value::Object(snapshot))?;
        std::fs::write(path, text)?;
        debug!(path = %path.display(), "saved plugin config");
        Ok(())
    }
}

impl std::fmt::Debug for PluginConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginConfig")
            .field("path", &self.path)
            .field("items", &self.items.iter().map(|i| &i.key).collect::<Vec<_>>())
            .finish()
    }
}
