//! # sift-resolve
//!
//! Selective import resolution engine for the Sift bundler front-end.
//!
//! Given the text of one compilation unit, this crate finds its import
//! statements with a bounded tokenizer, classifies every specifier
//! (relative, allowlisted-into-the-bundle, or external to be covered by a
//! runtime import map), resolves the bundled ones concurrently, and
//! substitutes the results back in source order.
//!
//! ```no_run
//! use std::sync::Arc;
//! use sift_resolve::{Allowlist, ModuleResolver, ResolutionPolicy, RewriteEngine, RunContext};
//!
//! # async fn example(resolver: Arc<dyn ModuleResolver>) {
//! let ctx = RunContext::default();
//! let policy = ResolutionPolicy::new(Allowlist::new(["pkg"]), resolver, ctx);
//! let engine = RewriteEngine::new(policy);
//!
//! let rewritten = engine
//!     .rewrite("import x from \"pkg/sub\";", Some("src/index.js"))
//!     .await;
//! println!("{}", engine.policy().context().finalize());
//! # }
//! ```

pub mod context;
pub mod error;
pub mod plugin;
pub mod policy;
pub mod rewrite;
pub mod scanner;

#[cfg(test)]
pub(crate) mod testing;

pub use context::{RunContext, RunReport};
pub use error::{ResolveError, Result};
pub use plugin::{BundlerHooks, PatternReplace, SelectiveImportRewriter};
pub use policy::{Allowlist, Classification, ModuleResolver, ResolutionPolicy, ResolutionRecord};
pub use rewrite::{RewriteEngine, DEFAULT_LEGACY_VENDOR_MARKER};
pub use scanner::{scan_imports, ImportMatch};
