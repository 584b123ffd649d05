//! Default filesystem module resolver.
//!
//! A deliberately small stand-in for a full node-resolution algorithm:
//! relative specifiers resolve against the importer's directory with the
//! usual extension and index fallbacks, bare specifiers walk `node_modules`
//! directories upward from the importer. Anything it cannot answer returns
//! `Ok(None)` so the resolution policy can apply its soft-fail and
//! import-map rules.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use path_clean::PathClean;
use serde_json::Value;
use sift_resolve::ModuleResolver;

pub struct FsResolver {
    root: PathBuf,
}

impl FsResolver {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Try a path as a module file: exact, with `.js`, then `/index.js`,
    /// then a `package.json` main field.
    async fn try_module(&self, candidate: &Path) -> Option<PathBuf> {
        let exact = candidate.clean();
        if is_file(&exact).await {
            return Some(exact);
        }

        let with_ext = PathBuf::from(format!("{}.js", exact.display()));
        if is_file(&with_ext).await {
            return Some(with_ext);
        }

        if let Some(main) = self.package_main(&exact).await {
            return Some(main);
        }

        let index = exact.join("index.js");
        if is_file(&index).await {
            return Some(index);
        }

        None
    }

    async fn package_main(&self, dir: &Path) -> Option<PathBuf> {
        let manifest = dir.join("package.json");
        let content = tokio::fs::read_to_string(&manifest).await.ok()?;
        let parsed: Value = serde_json::from_str(&content).ok()?;
        let main = parsed.get("main")?.as_str()?;
        let path = dir.join(main).clean();
        is_file(&path).await.then_some(path)
    }
}

async fn is_file(path: &Path) -> bool {
    tokio::fs::metadata(path)
        .await
        .map(|m| m.is_file())
        .unwrap_or(false)
}

#[async_trait]
impl ModuleResolver for FsResolver {
    async fn resolve_id(
        &self,
        specifier: &str,
        importer: Option<&str>,
    ) -> anyhow::Result<Option<String>> {
        let importer_dir = importer
            .and_then(|i| Path::new(i).parent())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.root.clone());

        let found = if specifier.starts_with("./") || specifier.starts_with("../") {
            self.try_module(&importer_dir.join(specifier)).await
        } else if let Some(rooted) = specifier.strip_prefix('/') {
            self.try_module(&self.root.join(rooted)).await
        } else {
            // Bare specifier: walk node_modules upward from the importer.
            let mut found = None;
            for dir in importer_dir.ancestors() {
                let candidate = dir.join("node_modules").join(specifier);
                if let Some(path) = self.try_module(&candidate).await {
                    found = Some(path);
                    break;
                }
                if dir == self.root {
                    break;
                }
            }
            found
        };

        Ok(found.map(|p| p.to_string_lossy().into_owned()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn project() -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("src")).unwrap();
        fs::write(dir.path().join("src/util.js"), "export {};\n").unwrap();

        let pkg = dir.path().join("node_modules/pkg");
        fs::create_dir_all(pkg.join("sub")).unwrap();
        fs::write(pkg.join("sub/index.js"), "export {};\n").unwrap();
        fs::write(pkg.join("main.js"), "export {};\n").unwrap();
        fs::write(pkg.join("package.json"), r#"{ "main": "main.js" }"#).unwrap();
        dir
    }

    #[tokio::test]
    async fn resolves_relative_specifier_with_extension_fallback() {
        let dir = project();
        let resolver = FsResolver::new(dir.path());
        let importer = dir.path().join("src/index.js");

        let resolved = resolver
            .resolve_id("./util", Some(&importer.to_string_lossy()))
            .await
            .unwrap()
            .unwrap();
        assert!(resolved.ends_with("src/util.js"));
    }

    #[tokio::test]
    async fn resolves_bare_specifier_through_node_modules() {
        let dir = project();
        let resolver = FsResolver::new(dir.path());
        let importer = dir.path().join("src/index.js");

        let resolved = resolver
            .resolve_id("pkg/sub", Some(&importer.to_string_lossy()))
            .await
            .unwrap()
            .unwrap();
        assert!(resolved.ends_with("node_modules/pkg/sub/index.js"));
    }

    #[tokio::test]
    async fn resolves_package_main_field() {
        let dir = project();
        let resolver = FsResolver::new(dir.path());
        let importer = dir.path().join("src/index.js");

        let resolved = resolver
            .resolve_id("pkg", Some(&importer.to_string_lossy()))
            .await
            .unwrap()
            .unwrap();
        assert!(resolved.ends_with("node_modules/pkg/main.js"));
    }

    #[tokio::test]
    async fn unknown_specifier_resolves_to_none() {
        let dir = project();
        let resolver = FsResolver::new(dir.path());
        let result = resolver.resolve_id("lodash", None).await.unwrap();
        assert_eq!(result, None);
    }
}
