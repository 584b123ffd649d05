//! Bundler plugin lifecycle, decoupled from any third-party plugin
//! contract.
//!
//! The external bundling engine drives three hooks per run: a pre-transform
//! text rewrite, module-id resolution, and an end-of-build report. Stage
//! implementations here are what the build target generator wires into a
//! pipeline descriptor.

use async_trait::async_trait;

use regex::Regex;

use crate::context::RunReport;
use crate::error::{ResolveError, Result};
use crate::policy::ResolutionRecord;
use crate::rewrite::RewriteEngine;

/// The three-stage plugin lifecycle.
///
/// * `preprocess` rewrites a unit's text before the engine analyzes it;
/// * `resolve` classifies one specifier during module resolution
///   (`Ok(None)` defers to the engine's own resolution);
/// * `finalize` surfaces the hook's end-of-run diagnostics.
#[async_trait]
pub trait BundlerHooks: Send + Sync {
    async fn preprocess(&self, text: &str, importer: Option<&str>) -> anyhow::Result<String> {
        let _ = importer;
        Ok(text.to_string())
    }

    async fn resolve(
        &self,
        specifier: &str,
        importer: Option<&str>,
    ) -> anyhow::Result<Option<ResolutionRecord>> {
        let _ = (specifier, importer);
        Ok(None)
    }

    fn finalize(&self) -> RunReport {
        RunReport::default()
    }
}

/// Source-level pattern substitution, applied before import analysis.
///
/// Patterns are applied in declaration order; each is a regex paired with
/// its replacement text.
#[derive(Debug)]
pub struct PatternReplace {
    patterns: Vec<(Regex, String)>,
}

impl PatternReplace {
    pub fn new(pairs: impl IntoIterator<Item = (String, String)>) -> Result<Self> {
        let mut patterns = Vec::new();
        for (pattern, replacement) in pairs {
            let regex = Regex::new(&pattern).map_err(|e| ResolveError::InvalidPattern {
                pattern: pattern.clone(),
                message: e.to_string(),
            })?;
            patterns.push((regex, replacement));
        }
        Ok(Self { patterns })
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Apply every substitution in declaration order.
    pub fn apply(&self, text: &str) -> String {
        let mut out = text.to_string();
        for (regex, replacement) in &self.patterns {
            out = regex.replace_all(&out, replacement.as_str()).into_owned();
        }
        out
    }
}

#[async_trait]
impl BundlerHooks for PatternReplace {
    async fn preprocess(&self, text: &str, _importer: Option<&str>) -> anyhow::Result<String> {
        Ok(self.apply(text))
    }
}

/// The selective import resolution engine exposed through the plugin
/// lifecycle: `preprocess` rewrites import statements, `resolve` classifies
/// specifiers, `finalize` reports the run's resolved map and external log.
pub struct SelectiveImportRewriter {
    engine: RewriteEngine,
}

impl SelectiveImportRewriter {
    pub fn new(engine: RewriteEngine) -> Self {
        Self { engine }
    }

    pub fn engine(&self) -> &RewriteEngine {
        &self.engine
    }
}

#[async_trait]
impl BundlerHooks for SelectiveImportRewriter {
    async fn preprocess(&self, text: &str, importer: Option<&str>) -> anyhow::Result<String> {
        Ok(self.engine.rewrite(text, importer).await)
    }

    async fn resolve(
        &self,
        specifier: &str,
        importer: Option<&str>,
    ) -> anyhow::Result<Option<ResolutionRecord>> {
        Ok(Some(self.engine.policy().classify(specifier, importer).await))
    }

    fn finalize(&self) -> RunReport {
        self.engine.policy().context().finalize()
    }
}
