//! Resolution policy: classify each specifier and decide its fate.
//!
//! The classification of a specifier is a pure function of the specifier
//! text, whether it is relative (or comes from an entry module), and the
//! configured allowlist. It never depends on resolution order across files.

use std::sync::Arc;

use async_trait::async_trait;

use crate::context::RunContext;

/// How a specifier was classified.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// Relative (or entry-module) specifier: always resolved; failure is a
    /// soft diagnostic, never fatal.
    Relative,
    /// Bare specifier matched by the allowlist: resolved into the bundle.
    Bundled,
    /// Bare specifier left untouched for the runtime import map.
    External,
}

/// Result of classifying and resolving one specifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolutionRecord {
    pub specifier: String,
    pub resolved: Option<String>,
    pub classification: Classification,
}

/// External module resolver, treated as a black box.
///
/// `Ok(None)` means the resolver had no answer; `Err` means it failed
/// outright. Both are handled at the per-specifier boundary and never abort
/// a batch.
#[async_trait]
pub trait ModuleResolver: Send + Sync {
    async fn resolve_id(
        &self,
        specifier: &str,
        importer: Option<&str>,
    ) -> anyhow::Result<Option<String>>;
}

/// Ordered list of specifier prefixes to resolve into the bundle.
///
/// List order is significant: the first matching prefix wins.
#[derive(Debug, Clone, Default)]
pub struct Allowlist {
    prefixes: Vec<String>,
}

impl Allowlist {
    pub fn new(prefixes: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            prefixes: prefixes.into_iter().map(Into::into).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.prefixes.is_empty()
    }

    /// First prefix (in declaration order) the specifier starts with.
    pub fn first_match(&self, specifier: &str) -> Option<&str> {
        self.prefixes
            .iter()
            .find(|prefix| specifier.starts_with(prefix.as_str()))
            .map(String::as_str)
    }
}

fn is_relative(specifier: &str) -> bool {
    specifier.starts_with("./") || specifier.starts_with("../") || specifier.starts_with('/')
}

/// Per-run classification and resolution of import specifiers.
pub struct ResolutionPolicy {
    allowlist: Allowlist,
    resolver: Arc<dyn ModuleResolver>,
    ctx: RunContext,
}

impl ResolutionPolicy {
    pub fn new(allowlist: Allowlist, resolver: Arc<dyn ModuleResolver>, ctx: RunContext) -> Self {
        Self {
            allowlist,
            resolver,
            ctx,
        }
    }

    pub fn context(&self) -> &RunContext {
        &self.ctx
    }

    /// Classify one specifier, in fixed priority order:
    ///
    /// 1. relative specifiers (and entry modules, which have no importer)
    ///    always go to the resolver; an unresolved one is kept as-is with a
    ///    soft diagnostic;
    /// 2. allowlisted bare specifiers go to the resolver and are recorded
    ///    in the run's resolved map on success;
    /// 3. everything else is logged as external and left untouched.
    pub async fn classify(&self, specifier: &str, importer: Option<&str>) -> ResolutionRecord {
        if is_relative(specifier) || importer.is_none() {
            let resolved = self.resolve_soft(specifier, importer).await;
            return ResolutionRecord {
                specifier: specifier.to_string(),
                resolved,
                classification: Classification::Relative,
            };
        }

        if self.allowlist.first_match(specifier).is_some() {
            let resolved = self.resolve_soft(specifier, importer).await;
            if let Some(path) = &resolved {
                self.ctx.record_resolved(specifier, path);
            }
            return ResolutionRecord {
                specifier: specifier.to_string(),
                resolved,
                classification: Classification::Bundled,
            };
        }

        self.ctx.log_external(specifier);
        ResolutionRecord {
            specifier: specifier.to_string(),
            resolved: None,
            classification: Classification::External,
        }
    }

    /// Invoke the resolver, converting any failure into a soft diagnostic.
    async fn resolve_soft(&self, specifier: &str, importer: Option<&str>) -> Option<String> {
        match self.resolver.resolve_id(specifier, importer).await {
            Ok(Some(resolved)) => Some(resolved),
            Ok(None) => {
                let message = format!(
                    "cannot resolve {specifier} from {}; it may be covered by the import map",
                    importer.unwrap_or("<entry>")
                );
                tracing::info!("{message}");
                self.ctx.record_warning(message);
                None
            }
            Err(error) => {
                let message = format!(
                    "resolver failed for {specifier} from {}: {error}",
                    importer.unwrap_or("<entry>")
                );
                tracing::warn!("{message}");
                self.ctx.record_warning(message);
                None
            }
        }
    }
}
