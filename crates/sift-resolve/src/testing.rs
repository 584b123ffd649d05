//! Shared test doubles for the crate's unit tests.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::policy::ModuleResolver;

/// Table-driven resolver.
pub(crate) struct MapResolver {
    entries: HashMap<String, String>,
    fail_on: Vec<String>,
}

impl MapResolver {
    pub(crate) fn new(entries: &[(&str, &str)]) -> Self {
        Self {
            entries: entries
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            fail_on: Vec::new(),
        }
    }

    pub(crate) fn failing_on(mut self, specifier: &str) -> Self {
        self.fail_on.push(specifier.to_string());
        self
    }
}

#[async_trait]
impl ModuleResolver for MapResolver {
    async fn resolve_id(
        &self,
        specifier: &str,
        _importer: Option<&str>,
    ) -> anyhow::Result<Option<String>> {
        if self.fail_on.iter().any(|s| s == specifier) {
            anyhow::bail!("resolver exploded on {specifier}");
        }
        Ok(self.entries.get(specifier).cloned())
    }
}
