//! Run-scoped resolution state.
//!
//! A [`RunContext`] owns the resolved-specifier map and the
//! external-specifier log for exactly one build invocation. It is created
//! per run and passed into every stage that needs it (constructor
//! injection): sharing one context across independent build invocations is
//! a correctness violation, since diagnostics from one run would leak into
//! the next.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, Mutex};

use sift_config::ExternalLogPolicy;

#[derive(Debug, Default)]
struct RunState {
    resolved: BTreeMap<String, String>,
    externals: Vec<String>,
    warnings: Vec<String>,
}

/// Shared mutable state for one build invocation.
///
/// Cloning is cheap and shares the underlying state, so the same context
/// can be handed to every concurrently processed file within a run. Both
/// collections are write-only during the run and read out once via
/// [`RunContext::finalize`].
#[derive(Debug, Clone)]
pub struct RunContext {
    policy: ExternalLogPolicy,
    state: Arc<Mutex<RunState>>,
}

impl RunContext {
    pub fn new(policy: ExternalLogPolicy) -> Self {
        Self {
            policy,
            state: Arc::new(Mutex::new(RunState::default())),
        }
    }

    /// Record a successfully resolved bundled specifier. The last writer
    /// for a given specifier wins across the whole run.
    pub fn record_resolved(&self, specifier: &str, resolved: &str) {
        let mut state = self.state.lock().unwrap();
        state
            .resolved
            .insert(specifier.to_string(), resolved.to_string());
    }

    /// Append a specifier to the external log.
    ///
    /// Under the default multiset policy duplicates are kept; they double
    /// as a usage-frequency signal in the end-of-run report.
    pub fn log_external(&self, specifier: &str) {
        let mut state = self.state.lock().unwrap();
        if self.policy == ExternalLogPolicy::Set
            && state.externals.iter().any(|s| s == specifier)
        {
            return;
        }
        state.externals.push(specifier.to_string());
    }

    /// Record a soft resolution warning. Warnings accumulate; they never
    /// unwind the run.
    pub fn record_warning(&self, message: String) {
        let mut state = self.state.lock().unwrap();
        state.warnings.push(message);
    }

    /// Surface the run's diagnostics once, at end of run.
    pub fn finalize(&self) -> RunReport {
        let state = self.state.lock().unwrap();
        RunReport {
            resolved: state.resolved.clone(),
            externals: state.externals.clone(),
            warnings: state.warnings.clone(),
        }
    }
}

impl Default for RunContext {
    fn default() -> Self {
        Self::new(ExternalLogPolicy::default())
    }
}

/// End-of-run diagnostic report: the resolved bare-import map and the
/// external-specifier log. Printed for operator visibility; nothing in the
/// core consumes it further.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    pub resolved: BTreeMap<String, String>,
    pub externals: Vec<String>,
    pub warnings: Vec<String>,
}

impl RunReport {
    pub fn is_empty(&self) -> bool {
        self.resolved.is_empty() && self.externals.is_empty() && self.warnings.is_empty()
    }

    /// Merge another report into this one (used when aggregating per-file
    /// reports from hook implementations that keep their own context).
    pub fn merge(&mut self, other: RunReport) {
        self.resolved.extend(other.resolved);
        self.externals.extend(other.externals);
        self.warnings.extend(other.warnings);
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.resolved.is_empty() {
            writeln!(f, "Resolved bare imports:")?;
            for (specifier, path) in &self.resolved {
                writeln!(f, "\t\"{specifier}\": \"{path}\"")?;
            }
        }
        if !self.externals.is_empty() {
            writeln!(f, "External dependencies:")?;
            for specifier in &self.externals {
                writeln!(f, "\t{specifier}")?;
            }
        }
        if !self.warnings.is_empty() {
            writeln!(f, "Resolution warnings:")?;
            for warning in &self.warnings {
                writeln!(f, "\t{warning}")?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolved_map_is_last_writer_wins() {
        let ctx = RunContext::default();
        ctx.record_resolved("pkg", "/a/node_modules/pkg/index.js");
        ctx.record_resolved("pkg", "/b/node_modules/pkg/index.js");

        let report = ctx.finalize();
        assert_eq!(
            report.resolved.get("pkg").map(String::as_str),
            Some("/b/node_modules/pkg/index.js")
        );
    }

    #[test]
    fn multiset_policy_keeps_duplicates() {
        let ctx = RunContext::new(ExternalLogPolicy::Multiset);
        ctx.log_external("lodash");
        ctx.log_external("lodash");
        ctx.log_external("rxjs");

        assert_eq!(ctx.finalize().externals, vec!["lodash", "lodash", "rxjs"]);
    }

    #[test]
    fn set_policy_collapses_duplicates() {
        let ctx = RunContext::new(ExternalLogPolicy::Set);
        ctx.log_external("lodash");
        ctx.log_external("lodash");
        ctx.log_external("rxjs");

        assert_eq!(ctx.finalize().externals, vec!["lodash", "rxjs"]);
    }

    #[test]
    fn clones_share_state_within_one_run() {
        let ctx = RunContext::default();
        let shared = ctx.clone();
        shared.log_external("lodash");
        assert_eq!(ctx.finalize().externals, vec!["lodash"]);
    }

    #[test]
    fn separate_contexts_do_not_share_state() {
        let first = RunContext::default();
        first.log_external("lodash");

        let second = RunContext::default();
        assert!(second.finalize().externals.is_empty());
    }

    #[test]
    fn report_display_lists_both_sections() {
        let ctx = RunContext::default();
        ctx.record_resolved("pkg/sub", "pkg/sub/index.js");
        ctx.log_external("lodash");

        let printed = ctx.finalize().to_string();
        assert!(printed.contains("Resolved bare imports:"));
        assert!(printed.contains("\t\"pkg/sub\": \"pkg/sub/index.js\""));
        assert!(printed.contains("External dependencies:"));
        assert!(printed.contains("\tlodash"));
    }
}
