//! Rewrite engine: concurrent per-file import resolution and substitution.
//!
//! All import matches found in one compilation unit are classified
//! concurrently, and the engine waits for every one of them to settle
//! before touching the text. Substitution is driven by an index-keyed
//! result array, never by specifier value: two matches with identical
//! specifier text each occupy their own slot, and the rewritten text always
//! preserves the original left-to-right order of the source regardless of
//! which resolution settles first.

use std::sync::LazyLock;

use futures::future::join_all;
use regex::Regex;

use crate::policy::{Classification, ResolutionPolicy, ResolutionRecord};
use crate::scanner::{scan_imports, ImportMatch};

/// Specifiers already shaped like an extensioned path are left alone
/// entirely: no resolution, no classification.
static EXTENSIONED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\w/@.\-]+\.js$").unwrap());

pub const DEFAULT_LEGACY_VENDOR_MARKER: &str = "bower_components";

/// Rewrites the import specifiers of one compilation unit at a time.
pub struct RewriteEngine {
    policy: ResolutionPolicy,
    legacy_vendor_marker: String,
}

impl RewriteEngine {
    pub fn new(policy: ResolutionPolicy) -> Self {
        Self {
            policy,
            legacy_vendor_marker: DEFAULT_LEGACY_VENDOR_MARKER.to_string(),
        }
    }

    /// Override the importer-path substring that marks a legacy vendored
    /// dependency location.
    pub fn with_legacy_vendor_marker(mut self, marker: impl Into<String>) -> Self {
        self.legacy_vendor_marker = marker.into();
        self
    }

    pub fn policy(&self) -> &ResolutionPolicy {
        &self.policy
    }

    /// Rewrite every import statement in `text`.
    ///
    /// `importer` is the unit's own path; `None` marks an entry module.
    /// Resolution failures surface as soft diagnostics on the run context
    /// and leave the affected specifier unchanged; they never abort the
    /// batch.
    pub async fn rewrite(&self, text: &str, importer: Option<&str>) -> String {
        let matches = scan_imports(text);
        if matches.is_empty() {
            return text.to_string();
        }

        let pending: Vec<&ImportMatch> = matches
            .iter()
            .filter(|m| !EXTENSIONED.is_match(&m.specifier))
            .collect();

        // Resolve all, then substitute by slot. join_all drives every
        // classification concurrently but yields results in dispatch
        // order, which is then keyed back by positional index.
        let records = join_all(
            pending
                .iter()
                .map(|m| self.policy.classify(&m.specifier, importer)),
        )
        .await;

        let mut replacements: Vec<Option<String>> = vec![None; matches.len()];
        for (m, record) in pending.iter().zip(records) {
            replacements[m.index] = self.replacement(&record, importer);
        }

        let mut out = String::with_capacity(text.len());
        let mut cursor = 0;
        for m in &matches {
            if let Some(new_specifier) = &replacements[m.index] {
                out.push_str(&text[cursor..m.spec_span.start]);
                out.push_str(new_specifier);
                cursor = m.spec_span.end;
            }
        }
        out.push_str(&text[cursor..]);
        out
    }

    /// Replacement text for one settled record, or `None` to keep the
    /// original specifier bytes.
    fn replacement(&self, record: &ResolutionRecord, importer: Option<&str>) -> Option<String> {
        match record.classification {
            // Soft-fail keeps the original text.
            Classification::Relative => record.resolved.clone(),
            Classification::Bundled => match &record.resolved {
                // The rewritten specifier starts at the first occurrence of
                // the original specifier inside the resolved path.
                Some(resolved) => Some(match resolved.find(&record.specifier) {
                    Some(at) => resolved[at..].to_string(),
                    None => resolved.clone(),
                }),
                // Legacy vendored trees ship bare extensionless imports;
                // synthesize the extension rather than leaving them bare.
                None => importer
                    .filter(|imp| {
                        !self.legacy_vendor_marker.is_empty()
                            && imp.contains(&self.legacy_vendor_marker)
                    })
                    .map(|_| format!("{}.js", record.specifier)),
            },
            Classification::External => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    use async_trait::async_trait;

    use crate::context::RunContext;
    use crate::policy::{Allowlist, ModuleResolver};
    use crate::testing::MapResolver;

    fn engine(allowlist: &[&str], resolver: impl ModuleResolver + 'static) -> RewriteEngine {
        let policy = ResolutionPolicy::new(
            Allowlist::new(allowlist.iter().copied()),
            Arc::new(resolver),
            RunContext::default(),
        );
        RewriteEngine::new(policy)
    }

    #[tokio::test]
    async fn end_to_end_scenario() {
        let engine = engine(
            &["pkg"],
            MapResolver::new(&[
                ("./a", "./a.js"),
                ("pkg/deep", "/abs/node_modules/pkg/deep/index.js"),
            ]),
        );

        let input = "import a from \"./a\"; import b from \"lodash\"; import c from \"pkg/deep\";";
        let output = engine.rewrite(input, Some("src/index.js")).await;
        assert_eq!(
            output,
            "import a from \"./a.js\"; import b from \"lodash\"; import c from \"pkg/deep/index.js\";"
        );

        let report = engine.policy().context().finalize();
        assert_eq!(report.externals, vec!["lodash"]);
        assert_eq!(
            report.resolved.get("pkg/deep").map(String::as_str),
            Some("/abs/node_modules/pkg/deep/index.js")
        );
    }

    #[tokio::test]
    async fn external_specifiers_stay_byte_identical() {
        let engine = engine(&["pkg"], MapResolver::new(&[]));
        let input = "import { merge } from 'lodash';\nimport rx from \"rxjs\";\n";
        let output = engine.rewrite(input, Some("src/index.js")).await;
        assert_eq!(output, input);
        assert_eq!(
            engine.policy().context().finalize().externals,
            vec!["lodash", "rxjs"]
        );
    }

    #[tokio::test]
    async fn extensioned_specifiers_are_skipped_entirely() {
        let engine = engine(&["pkg"], MapResolver::new(&[]));
        let input = "import helpers from 'pkg/helpers.js';\n";
        let output = engine.rewrite(input, Some("src/index.js")).await;
        assert_eq!(output, input);

        // Skipped means skipped: no resolution, no diagnostics.
        assert!(engine.policy().context().finalize().is_empty());
    }

    #[tokio::test]
    async fn unresolved_relative_keeps_original_text() {
        let engine = engine(&[], MapResolver::new(&[]));
        let input = "import a from './missing';\n";
        let output = engine.rewrite(input, Some("src/index.js")).await;
        assert_eq!(output, input);
        assert_eq!(engine.policy().context().finalize().warnings.len(), 1);
    }

    #[tokio::test]
    async fn legacy_vendored_importer_gets_synthesized_extension() {
        let engine = engine(&["jquery"], MapResolver::new(&[]));
        let input = "import $ from 'jquery';\n";

        let vendored = "web/bower_components/widget/widget.js";
        let output = engine.rewrite(input, Some(vendored)).await;
        assert_eq!(output, "import $ from 'jquery.js';\n");

        // Outside the vendored tree the specifier stays untouched.
        let output = engine.rewrite(input, Some("src/index.js")).await;
        assert_eq!(output, input);
    }

    #[tokio::test]
    async fn resolver_failure_does_not_abort_the_batch() {
        let engine = engine(
            &["pkg"],
            MapResolver::new(&[("./b", "./b.js")]).failing_on("pkg/boom"),
        );
        let input = "import a from 'pkg/boom';\nimport b from './b';\n";
        let output = engine.rewrite(input, Some("src/index.js")).await;
        assert_eq!(output, "import a from 'pkg/boom';\nimport b from './b.js';\n");
    }

    /// Resolver that completes later for earlier matches: the k-th call
    /// sleeps longer than the (N-k)-th, inverting completion order.
    struct InvertedDelayResolver {
        delays: std::sync::Mutex<Vec<u64>>,
    }

    impl InvertedDelayResolver {
        fn new(delays: Vec<u64>) -> Self {
            Self {
                delays: std::sync::Mutex::new(delays),
            }
        }
    }

    #[async_trait]
    impl ModuleResolver for InvertedDelayResolver {
        async fn resolve_id(
            &self,
            specifier: &str,
            _importer: Option<&str>,
        ) -> anyhow::Result<Option<String>> {
            let delay = { self.delays.lock().unwrap().pop().unwrap_or(0) };
            tokio::time::sleep(Duration::from_millis(delay)).await;
            Ok(Some(format!("{specifier}.js")))
        }
    }

    #[tokio::test]
    async fn output_order_is_insensitive_to_completion_order() {
        let input = "import a from './a';\nimport b from './b';\nimport c from './c';\n";
        let expected = "import a from './a.js';\nimport b from './b.js';\nimport c from './c.js';\n";

        // First call sleeps longest, so matches settle in reverse order.
        let adversarial = engine(&[], InvertedDelayResolver::new(vec![5, 25, 50]));
        let reversed = adversarial.rewrite(input, Some("src/index.js")).await;

        let orderly = engine(&[], InvertedDelayResolver::new(vec![0, 0, 0]));
        let in_order = orderly.rewrite(input, Some("src/index.js")).await;

        assert_eq!(reversed, expected);
        assert_eq!(reversed, in_order);
    }

    #[tokio::test]
    async fn duplicate_specifier_text_fills_each_slot() {
        let engine = engine(&[], MapResolver::new(&[("./dup", "./dup.js")]));
        let input = "import a from './dup';\nimport b from './dup';\n";
        let output = engine.rewrite(input, Some("src/index.js")).await;
        assert_eq!(output, "import a from './dup.js';\nimport b from './dup.js';\n");
    }

    #[tokio::test]
    async fn text_without_imports_passes_through() {
        let engine = engine(&[], MapResolver::new(&[]));
        let input = "export const answer = 42;\n";
        assert_eq!(engine.rewrite(input, Some("src/a.js")).await, input);
    }
}
