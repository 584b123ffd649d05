//! Pipeline descriptors: per-profile stage lists for the bundling engine.
//!
//! Stage order is significant and fixed: source-level pattern substitution
//! runs before import analysis, selective import resolution before the
//! downleveling transpile, and minification (when enabled for production)
//! always comes last.

use serde::{Deserialize, Serialize};
use sift_config::EntryMap;

use crate::profile::{ModuleFormat, TargetProfile};

/// One stage of a profile's build pipeline, in execution order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "stage", rename_all = "kebab-case")]
pub enum Stage {
    /// Source-level pattern substitution, applied before import analysis.
    /// Pairs of (regex pattern, replacement), applied in order.
    Replace { patterns: Vec<(String, String)> },
    /// Selective import resolution: scan, classify, rewrite.
    ResolveImports,
    /// Language downleveling against the profile's engine baselines.
    Transpile { targets: Vec<String> },
    /// Production-only minification.
    Minify,
}

/// Output options consumed by the bundling engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputOptions {
    pub dir: std::path::PathBuf,
    /// Artifact naming template, one file per entry name.
    pub entry_file_names: String,
    pub module_format: ModuleFormat,
    pub sourcemap: bool,
}

/// Everything the bundling engine needs to build one target profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineDescriptor {
    pub profile: String,
    /// Disabled profiles are still emitted, fully specified, as inert
    /// configuration; execution filters on this flag.
    pub enabled: bool,
    pub input: EntryMap,
    pub output: OutputOptions,
    pub stages: Vec<Stage>,
}

/// Builds one pipeline descriptor per target profile.
#[derive(Debug, Clone, Default)]
pub struct TargetGenerator {
    profiles: Vec<TargetProfile>,
    replace_patterns: Vec<(String, String)>,
    production: bool,
    sourcemap: bool,
}

impl TargetGenerator {
    pub fn new(profiles: Vec<TargetProfile>) -> Self {
        Self {
            profiles,
            replace_patterns: Vec::new(),
            production: false,
            sourcemap: false,
        }
    }

    /// Externally supplied pattern list for the substitution stage.
    pub fn replace_patterns(mut self, patterns: Vec<(String, String)>) -> Self {
        self.replace_patterns = patterns;
        self
    }

    /// Gate the minification stage.
    pub fn production(mut self, production: bool) -> Self {
        self.production = production;
        self
    }

    pub fn sourcemap(mut self, sourcemap: bool) -> Self {
        self.sourcemap = sourcemap;
        self
    }

    /// Emit one descriptor per profile, enabled or not, over the given
    /// entry set.
    pub fn generate(&self, entries: &EntryMap) -> Vec<PipelineDescriptor> {
        self.profiles
            .iter()
            .map(|profile| {
                let mut stages = vec![
                    Stage::Replace {
                        patterns: self.replace_patterns.clone(),
                    },
                    Stage::ResolveImports,
                    Stage::Transpile {
                        targets: profile.transpile_targets.clone(),
                    },
                ];
                if self.production {
                    stages.push(Stage::Minify);
                }

                PipelineDescriptor {
                    profile: profile.name.clone(),
                    enabled: profile.enabled,
                    input: entries.clone(),
                    output: OutputOptions {
                        dir: profile.output_dir.clone(),
                        entry_file_names: "[name].js".to_string(),
                        module_format: profile.module_format,
                        sourcemap: self.sourcemap,
                    },
                    stages,
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sift_config::TargetToggles;

    fn entries() -> EntryMap {
        let mut map = EntryMap::new();
        map.insert("/app".to_string(), "src/app.js".to_string());
        map
    }

    #[test]
    fn stage_order_is_fixed() {
        let generator = TargetGenerator::new(vec![TargetProfile::modern("dist")])
            .replace_patterns(vec![("__ENV__".to_string(), "production".to_string())]);

        let descriptors = generator.generate(&entries());
        assert_eq!(descriptors.len(), 1);

        let stages = &descriptors[0].stages;
        assert!(matches!(stages[0], Stage::Replace { .. }));
        assert!(matches!(stages[1], Stage::ResolveImports));
        assert!(matches!(stages[2], Stage::Transpile { .. }));
        assert_eq!(stages.len(), 3);
    }

    #[test]
    fn minify_stage_is_gated_on_production() {
        let generator = TargetGenerator::new(vec![TargetProfile::modern("dist")]).production(true);
        let descriptors = generator.generate(&entries());
        assert!(matches!(descriptors[0].stages.last(), Some(Stage::Minify)));
    }

    #[test]
    fn disabled_profile_is_emitted_fully_specified() {
        let profiles = TargetProfile::canonical("dist", TargetToggles::default());
        let descriptors = TargetGenerator::new(profiles).generate(&entries());

        assert_eq!(descriptors.len(), 2);
        let legacy = &descriptors[1];
        assert!(!legacy.enabled);
        assert_eq!(legacy.profile, "legacy");
        assert_eq!(legacy.output.module_format, ModuleFormat::System);
        assert!(matches!(
            &legacy.stages[2],
            Stage::Transpile { targets } if targets == &vec!["ie 11".to_string()]
        ));
    }

    #[test]
    fn descriptor_carries_the_entry_set_and_naming_template() {
        let generator = TargetGenerator::new(vec![TargetProfile::modern("dist")]);
        let descriptor = &generator.generate(&entries())[0];
        assert_eq!(descriptor.input, entries());
        assert_eq!(descriptor.output.entry_file_names, "[name].js");
        assert!(!descriptor.output.sourcemap);
    }
}
