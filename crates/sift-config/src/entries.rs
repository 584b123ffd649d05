//! Entry discovery: expanding declarative entry patterns into an entry map.
//!
//! Each [`EntrySpec`] pairs a glob pattern with the root it is expanded
//! under. The logical entry name for a matched file is the substring between
//! the root marker and the `.js` extension marker, so `src/pages/home.js`
//! under root `src` becomes the entry `/pages/home`.

use std::collections::BTreeMap;
use std::path::Path;

use globset::GlobBuilder;
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};

/// Mapping from logical entry name to source file path.
///
/// Ordered so that descriptor output and diagnostic printing are
/// deterministic across runs.
pub type EntryMap = BTreeMap<String, String>;

/// One declarative entry pattern.
///
/// The effective glob is `root` + `pattern`, e.g. root `"src"` with pattern
/// `"/**/*.js"` expands `src/**/*.js`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntrySpec {
    /// Glob pattern appended to `root`.
    #[serde(rename = "glob")]
    pub pattern: String,
    /// Directory the pattern is rooted at. Also the marker stripped from
    /// matched paths when deriving entry names.
    pub root: String,
}

impl EntrySpec {
    pub fn new(pattern: impl Into<String>, root: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            root: root.into(),
        }
    }
}

/// Expand a list of entry specs into a single entry map.
///
/// Specs are expanded concurrently, then merged in declaration order: on a
/// key collision the later-declared pattern's match wins. A spec that
/// matches nothing contributes an empty partial map, which is not an error.
///
/// # Errors
///
/// Returns [`ConfigError::Discovery`] if a pattern fails to compile or the
/// filesystem walk fails. Discovery errors are fatal: they abort target
/// generation entirely.
pub async fn discover_entries(specs: &[EntrySpec]) -> Result<EntryMap> {
    let partials = futures::future::try_join_all(specs.iter().map(expand_spec)).await?;

    let mut entries = EntryMap::new();
    for partial in partials {
        // Declaration order: later patterns overwrite earlier keys.
        entries.extend(partial);
    }
    Ok(entries)
}

/// Expand one spec into its partial entry map.
async fn expand_spec(spec: &EntrySpec) -> Result<EntryMap> {
    let full_pattern = format!("{}{}", spec.root, spec.pattern);

    let discovery_err = |message: String| ConfigError::Discovery {
        pattern: full_pattern.clone(),
        message,
    };

    let matcher = GlobBuilder::new(&full_pattern)
        .build()
        .map_err(|e| discovery_err(e.to_string()))?
        .compile_matcher();

    let mut entries = EntryMap::new();

    // A missing root is an empty match set, not a failure.
    let root = Path::new(&spec.root);
    if tokio::fs::metadata(root).await.is_err() {
        tracing::debug!(root = %spec.root, "entry root does not exist, no matches");
        return Ok(entries);
    }

    let mut pending = vec![root.to_path_buf()];
    while let Some(dir) = pending.pop() {
        let mut read_dir = tokio::fs::read_dir(&dir)
            .await
            .map_err(|e| discovery_err(format!("{}: {e}", dir.display())))?;

        while let Some(item) = read_dir
            .next_entry()
            .await
            .map_err(|e| discovery_err(format!("{}: {e}", dir.display())))?
        {
            let file_type = item
                .file_type()
                .await
                .map_err(|e| discovery_err(format!("{}: {e}", item.path().display())))?;

            let path = item.path();
            if file_type.is_dir() {
                pending.push(path);
            } else if matcher.is_match(&path) {
                let text = path.to_string_lossy().into_owned();
                if let Some(key) = entry_key(&text, &spec.root) {
                    tracing::debug!(entry = %key, path = %text, "discovered entry");
                    entries.insert(key, text);
                }
            }
        }
    }

    Ok(entries)
}

/// Derive the logical entry name from a matched path: the substring between
/// the first occurrence of the root marker and the first `.js` extension
/// marker.
fn entry_key(path: &str, root: &str) -> Option<String> {
    let start = path.find(root)? + root.len();
    let end = path.find(".js")?;
    if end < start {
        return None;
    }
    Some(path[start..end].to_string())
}
