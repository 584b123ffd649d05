//! High-level configuration structure for Sift.
//!
//! This module provides the main `SiftConfig` struct plus file-based
//! discovery. Library users can construct a config programmatically with
//! [`SiftConfig::from_value`]; the CLI loads one from `sift.toml` or the
//! `"sift"` field of `package.json`.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::entries::{discover_entries, EntryMap, EntrySpec};
use crate::error::{ConfigError, Result};

/// How the external-specifier log treats repeated specifiers.
///
/// Duplicate entries are load-bearing for diagnostics (a rough
/// usage-frequency signal), so the default keeps them. `Set` collapses
/// duplicates at insertion for consumers that only want membership.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExternalLogPolicy {
    #[default]
    Multiset,
    Set,
}

/// The entry set named by `main`: either a single path or a full map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MainEntry {
    Path(String),
    Map(EntryMap),
}

impl Default for MainEntry {
    fn default() -> Self {
        MainEntry::Map(EntryMap::new())
    }
}

impl MainEntry {
    /// Promote to an entry map. A bare path becomes the `main` entry.
    pub fn to_entry_map(&self) -> EntryMap {
        match self {
            MainEntry::Map(map) => map.clone(),
            MainEntry::Path(path) => {
                let mut map = EntryMap::new();
                map.insert("main".to_string(), path.clone());
                map
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            MainEntry::Map(map) => map.is_empty(),
            MainEntry::Path(path) => path.is_empty(),
        }
    }
}

/// Per-profile execution toggles.
///
/// Both canonical profiles stay fully specified in the generated pipeline
/// descriptors; these flags only decide which of them are executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TargetToggles {
    pub modern: bool,
    pub legacy: bool,
}

impl Default for TargetToggles {
    fn default() -> Self {
        Self {
            modern: true,
            legacy: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SiftConfig {
    /// When true, `main` is used directly as the entry map and
    /// `entry_files` is ignored.
    pub use_main: bool,

    /// Static entry set used when `use_main` is true.
    pub main: MainEntry,

    /// Declarative entry patterns driving entry discovery.
    pub entry_files: Vec<EntrySpec>,

    /// Ordered allowlist of specifier prefixes to resolve into the bundle.
    /// Everything else that is not a relative path is deferred to the
    /// runtime import map.
    pub bundle_dependencies: Vec<String>,

    /// Duplicate handling for the external-specifier log.
    pub external_log_policy: ExternalLogPolicy,

    /// Importer-path substring marking a legacy vendored-dependency
    /// location, where unresolved bare specifiers get a `.js` extension
    /// synthesized.
    pub legacy_vendor_marker: String,

    /// Which target profiles to execute.
    pub targets: TargetToggles,
}

impl Default for SiftConfig {
    fn default() -> Self {
        Self {
            use_main: false,
            main: MainEntry::default(),
            entry_files: Vec::new(),
            bundle_dependencies: Vec::new(),
            external_log_policy: ExternalLogPolicy::default(),
            legacy_vendor_marker: "bower_components".to_string(),
            targets: TargetToggles::default(),
        }
    }
}

impl SiftConfig {
    /// Create from a `serde_json::Value` (for programmatic config).
    ///
    /// # Example
    ///
    /// ```
    /// use sift_config::SiftConfig;
    /// use serde_json::json;
    ///
    /// let config = SiftConfig::from_value(json!({
    ///     "entryFiles": [{ "glob": "/**/*.js", "root": "src" }],
    ///     "bundleDependencies": ["pkg"]
    /// })).unwrap();
    /// assert_eq!(config.bundle_dependencies, vec!["pkg"]);
    /// ```
    pub fn from_value(value: Value) -> Result<Self> {
        serde_json::from_value(value).map_err(|e| ConfigError::InvalidValue {
            field: "config".to_string(),
            hint: Some(e.to_string()),
        })
    }

    /// Produce the entry map this config describes.
    ///
    /// Uses `main` directly when `use_main` is set (or when no entry
    /// patterns are configured); otherwise runs entry discovery over
    /// `entry_files`.
    pub async fn resolve_entries(&self) -> Result<EntryMap> {
        if self.use_main || self.entry_files.is_empty() {
            return Ok(self.main.to_entry_map());
        }
        discover_entries(&self.entry_files).await
    }
}

/// File-based configuration discovery.
///
/// Searches for a Sift configuration in conventional locations. This is
/// primarily for CLI use - library users should use
/// [`SiftConfig::from_value`] directly.
pub struct ConfigDiscovery {
    root: PathBuf,
}

impl ConfigDiscovery {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Find a config file in the root directory.
    ///
    /// Searches in this order:
    /// 1. TOML config: sift.toml
    /// 2. package.json (sift field, or package main as fallback entry)
    pub fn find(&self) -> Option<PathBuf> {
        let toml_path = self.root.join("sift.toml");
        if toml_path.exists() {
            return Some(toml_path);
        }

        let pkg_path = self.root.join("package.json");
        if pkg_path.exists() {
            return Some(pkg_path);
        }

        None
    }

    /// Load config from the discovered file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::NotFound` if no config file is found.
    pub fn load(&self) -> Result<SiftConfig> {
        let path = self.find().ok_or(ConfigError::NotFound)?;
        self.load_from(&path)
    }

    fn load_from(&self, path: &Path) -> Result<SiftConfig> {
        if path.file_name() == Some(std::ffi::OsStr::new("package.json")) {
            return self.load_from_package_json(path);
        }

        let content = fs::read_to_string(path)?;

        let toml_val: toml::Value =
            toml::from_str(&content).map_err(|e| ConfigError::InvalidValue {
                field: "toml".to_string(),
                hint: Some(format!("Invalid TOML syntax: {e}")),
            })?;

        let value = serde_json::to_value(toml_val).map_err(|e| ConfigError::InvalidValue {
            field: "toml".to_string(),
            hint: Some(format!("TOML to JSON conversion failed: {e}")),
        })?;

        SiftConfig::from_value(value)
    }

    /// Load from package.json: the `"sift"` field when present, falling
    /// back to a use-main config driven by the package `"main"` field.
    fn load_from_package_json(&self, path: &Path) -> Result<SiftConfig> {
        let content = fs::read_to_string(path)?;

        let parsed: Value =
            serde_json::from_str(&content).map_err(|e| ConfigError::InvalidValue {
                field: "package.json".to_string(),
                hint: Some(format!("Invalid JSON: {e}")),
            })?;

        let mut config = match parsed.get("sift") {
            Some(value) if !value.is_null() => SiftConfig::from_value(value.clone())?,
            _ => SiftConfig::default(),
        };

        // A config with no entry patterns falls back to the package main.
        if config.entry_files.is_empty() {
            config.use_main = true;
            if config.main.is_empty() {
                if let Some(main) = parsed.get("main").and_then(Value::as_str) {
                    config.main = MainEntry::Path(main.to_string());
                }
            }
        }

        Ok(config)
    }
}
