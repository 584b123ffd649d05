//! Profile build runner.
//!
//! Executes the enabled pipeline descriptors against their entry sets. The
//! transpile and minify stages are opaque seams consuming configuration;
//! identity implementations are provided for setups that wire in an
//! external toolchain elsewhere. Each profile build gets its own fresh
//! resolution context, and artifacts are staged in memory so a fatal stage
//! failure writes nothing.

use std::path::PathBuf;
use std::sync::Arc;

use sift_config::{ExternalLogPolicy, SiftConfig};
use sift_resolve::{
    Allowlist, ModuleResolver, PatternReplace, ResolutionPolicy, RewriteEngine, RunContext,
    RunReport, DEFAULT_LEGACY_VENDOR_MARKER,
};

use crate::error::{Result, TargetError};
use crate::pipeline::{PipelineDescriptor, Stage};

/// Language-downleveling stage, treated as opaque.
pub trait TranspileStage: Send + Sync {
    fn apply(&self, code: &str, targets: &[String]) -> anyhow::Result<String>;
}

/// Minification stage, treated as opaque.
pub trait MinifyStage: Send + Sync {
    fn apply(&self, code: &str) -> anyhow::Result<String>;
}

/// Pass-through transpile stage.
pub struct IdentityTranspile;

impl TranspileStage for IdentityTranspile {
    fn apply(&self, code: &str, _targets: &[String]) -> anyhow::Result<String> {
        Ok(code.to_string())
    }
}

/// Pass-through minify stage.
pub struct IdentityMinify;

impl MinifyStage for IdentityMinify {
    fn apply(&self, code: &str) -> anyhow::Result<String> {
        Ok(code.to_string())
    }
}

/// Result of one executed profile build.
#[derive(Debug)]
pub struct ProfileOutcome {
    pub profile: String,
    /// Artifact paths, one file per entry name.
    pub artifacts: Vec<PathBuf>,
    /// The profile run's diagnostic report.
    pub report: RunReport,
}

/// Executes pipeline descriptors profile by profile.
pub struct BuildRunner {
    resolver: Arc<dyn ModuleResolver>,
    transpile: Arc<dyn TranspileStage>,
    minify: Arc<dyn MinifyStage>,
    allowlist: Allowlist,
    external_log_policy: ExternalLogPolicy,
    legacy_vendor_marker: String,
}

impl BuildRunner {
    pub fn new(resolver: Arc<dyn ModuleResolver>) -> Self {
        Self {
            resolver,
            transpile: Arc::new(IdentityTranspile),
            minify: Arc::new(IdentityMinify),
            allowlist: Allowlist::default(),
            external_log_policy: ExternalLogPolicy::default(),
            legacy_vendor_marker: DEFAULT_LEGACY_VENDOR_MARKER.to_string(),
        }
    }

    /// Configure the runner from a loaded config: allowlist, external log
    /// policy and the vendored-dependency marker.
    pub fn from_config(config: &SiftConfig, resolver: Arc<dyn ModuleResolver>) -> Self {
        Self::new(resolver)
            .allowlist(Allowlist::new(config.bundle_dependencies.iter().cloned()))
            .external_log_policy(config.external_log_policy)
            .legacy_vendor_marker(config.legacy_vendor_marker.clone())
    }

    pub fn allowlist(mut self, allowlist: Allowlist) -> Self {
        self.allowlist = allowlist;
        self
    }

    pub fn external_log_policy(mut self, policy: ExternalLogPolicy) -> Self {
        self.external_log_policy = policy;
        self
    }

    pub fn legacy_vendor_marker(mut self, marker: impl Into<String>) -> Self {
        self.legacy_vendor_marker = marker.into();
        self
    }

    pub fn transpile(mut self, stage: Arc<dyn TranspileStage>) -> Self {
        self.transpile = stage;
        self
    }

    pub fn minify(mut self, stage: Arc<dyn MinifyStage>) -> Self {
        self.minify = stage;
        self
    }

    /// Execute every enabled descriptor, in order.
    ///
    /// A fatal error unwinds the run and must surface to the invoking
    /// process as a non-zero outcome. Disabled profiles are skipped without
    /// writing artifacts.
    pub async fn run(&self, descriptors: &[PipelineDescriptor]) -> Result<Vec<ProfileOutcome>> {
        let mut outcomes = Vec::new();
        for descriptor in descriptors {
            if !descriptor.enabled {
                tracing::debug!(profile = %descriptor.profile, "profile disabled, skipping");
                continue;
            }
            outcomes.push(self.run_profile(descriptor).await?);
        }
        Ok(outcomes)
    }

    async fn run_profile(&self, descriptor: &PipelineDescriptor) -> Result<ProfileOutcome> {
        tracing::info!(profile = %descriptor.profile, "building target profile");

        // Fresh context per profile build: resolution state must never be
        // shared across independent invocations.
        let ctx = RunContext::new(self.external_log_policy);
        let policy = ResolutionPolicy::new(
            self.allowlist.clone(),
            Arc::clone(&self.resolver),
            ctx.clone(),
        );
        let engine = RewriteEngine::new(policy)
            .with_legacy_vendor_marker(self.legacy_vendor_marker.clone());

        let stages = self.compile_stages(descriptor)?;

        // Stage outputs in memory; write only after every entry succeeds so
        // a fatal transpile/minify failure leaves no partial artifact.
        let mut staged: Vec<(PathBuf, String)> = Vec::new();
        for (name, path) in &descriptor.input {
            let mut code = tokio::fs::read_to_string(path).await?;
            for stage in &stages {
                code = self
                    .apply_stage(stage, code, path, &engine, &descriptor.profile)
                    .await?;
            }
            staged.push((artifact_path(descriptor, name), code));
        }

        let mut artifacts = Vec::with_capacity(staged.len());
        for (path, code) in staged {
            if let Some(parent) = path.parent() {
                tokio::fs::create_dir_all(parent).await?;
            }
            tokio::fs::write(&path, code).await?;
            artifacts.push(path);
        }

        Ok(ProfileOutcome {
            profile: descriptor.profile.clone(),
            artifacts,
            report: ctx.finalize(),
        })
    }

    fn compile_stages(&self, descriptor: &PipelineDescriptor) -> Result<Vec<CompiledStage>> {
        descriptor
            .stages
            .iter()
            .map(|stage| {
                Ok(match stage {
                    Stage::Replace { patterns } => {
                        CompiledStage::Replace(PatternReplace::new(patterns.clone())?)
                    }
                    Stage::ResolveImports => CompiledStage::Resolve,
                    Stage::Transpile { targets } => CompiledStage::Transpile(targets.clone()),
                    Stage::Minify => CompiledStage::Minify,
                })
            })
            .collect()
    }

    async fn apply_stage(
        &self,
        stage: &CompiledStage,
        code: String,
        importer: &str,
        engine: &RewriteEngine,
        profile: &str,
    ) -> Result<String> {
        match stage {
            CompiledStage::Replace(replace) => Ok(replace.apply(&code)),
            CompiledStage::Resolve => Ok(engine.rewrite(&code, Some(importer)).await),
            CompiledStage::Transpile(targets) => {
                self.transpile
                    .apply(&code, targets)
                    .map_err(|e| TargetError::Transpile {
                        profile: profile.to_string(),
                        message: e.to_string(),
                    })
            }
            CompiledStage::Minify => {
                self.minify.apply(&code).map_err(|e| TargetError::Minify {
                    profile: profile.to_string(),
                    message: e.to_string(),
                })
            }
        }
    }
}

enum CompiledStage {
    Replace(PatternReplace),
    Resolve,
    Transpile(Vec<String>),
    Minify,
}

/// Artifact path for one entry: the naming template with `[name]`
/// substituted, below the profile's output directory. Entry names keep
/// their separators below that directory.
fn artifact_path(descriptor: &PipelineDescriptor, name: &str) -> PathBuf {
    let file = descriptor
        .output
        .entry_file_names
        .replace("[name]", name.trim_start_matches('/'));
    descriptor.output.dir.join(file)
}
