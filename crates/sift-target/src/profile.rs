//! Target profiles: named output-format + downleveling-target
//! configurations.
//!
//! Two canonical profiles always exist in the schema. `modern` emits native
//! ES modules downleveled for recent engines; `legacy` emits SystemJS
//! modules against a fixed old baseline. Only profiles explicitly enabled
//! are executed; a disabled profile stays fully specified as inert
//! configuration so re-enabling it is a toggle, not a redesign.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use sift_config::TargetToggles;

/// Output module format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModuleFormat {
    /// Native ES modules, for modern engines.
    Es,
    /// SystemJS modules, for the legacy compatibility target.
    System,
}

impl ModuleFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModuleFormat::Es => "es",
            ModuleFormat::System => "system",
        }
    }
}

/// One named target profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetProfile {
    pub name: String,
    pub legacy: bool,
    /// Per-profile artifact directory, already including the profile's
    /// subdirectory below the build output root.
    pub output_dir: PathBuf,
    pub module_format: ModuleFormat,
    /// Engine baselines handed to the downleveling transpile stage.
    pub transpile_targets: Vec<String>,
    /// Whether this profile's build is executed.
    pub enabled: bool,
}

impl TargetProfile {
    /// The canonical modern profile: ES modules for recent engines,
    /// written under `<outdir>/module`. Enabled by default.
    pub fn modern(outdir: impl AsRef<Path>) -> Self {
        Self {
            name: "modern".to_string(),
            legacy: false,
            output_dir: outdir.as_ref().join("module"),
            module_format: ModuleFormat::Es,
            transpile_targets: vec!["last 2 Chrome major versions".to_string()],
            enabled: true,
        }
    }

    /// The canonical legacy profile: SystemJS modules against the old
    /// fixed baseline, written under `<outdir>/nomodule`. Disabled by
    /// default but fully specified.
    pub fn legacy(outdir: impl AsRef<Path>) -> Self {
        Self {
            name: "legacy".to_string(),
            legacy: true,
            output_dir: outdir.as_ref().join("nomodule"),
            module_format: ModuleFormat::System,
            transpile_targets: vec!["ie 11".to_string()],
            enabled: false,
        }
    }

    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Both canonical profiles with their execution toggles applied.
    pub fn canonical(outdir: impl AsRef<Path>, toggles: TargetToggles) -> Vec<Self> {
        vec![
            Self::modern(&outdir).enabled(toggles.modern),
            Self::legacy(&outdir).enabled(toggles.legacy),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn modern_profile_defaults() {
        let profile = TargetProfile::modern("dist");
        assert_eq!(profile.name, "modern");
        assert!(!profile.legacy);
        assert!(profile.enabled);
        assert_eq!(profile.module_format, ModuleFormat::Es);
        assert_eq!(profile.output_dir, PathBuf::from("dist/module"));
    }

    #[test]
    fn legacy_profile_is_fully_specified_but_disabled() {
        let profile = TargetProfile::legacy("dist");
        assert!(!profile.enabled);
        assert!(profile.legacy);
        assert_eq!(profile.module_format, ModuleFormat::System);
        assert_eq!(profile.transpile_targets, vec!["ie 11"]);
        assert_eq!(profile.output_dir, PathBuf::from("dist/nomodule"));
    }

    #[test]
    fn canonical_applies_toggles() {
        let toggles = TargetToggles {
            modern: true,
            legacy: true,
        };
        let profiles = TargetProfile::canonical("dist", toggles);
        assert_eq!(profiles.len(), 2);
        assert!(profiles.iter().all(|p| p.enabled));
    }
}
