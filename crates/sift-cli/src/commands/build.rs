//! The `sift build` command: load config, discover entries, generate the
//! pipeline descriptors and execute the enabled profiles.

use std::sync::Arc;

use anyhow::Context;
use sift_config::{ConfigDiscovery, EntrySpec, TargetToggles};
use sift_target::{BuildRunner, TargetGenerator, TargetProfile};

use crate::cli::BuildArgs;
use crate::resolver::FsResolver;

pub async fn execute(args: BuildArgs) -> anyhow::Result<()> {
    let root = match args.root {
        Some(root) => root,
        None => std::env::current_dir()?,
    };

    let config = ConfigDiscovery::new(&root)
        .load()
        .with_context(|| format!("loading sift config from {}", root.display()))?;

    // Entry roots in config are relative to the package root.
    let entry_specs: Vec<EntrySpec> = config
        .entry_files
        .iter()
        .map(|spec| EntrySpec {
            pattern: spec.pattern.clone(),
            root: root.join(&spec.root).to_string_lossy().into_owned(),
        })
        .collect();

    let entries = if config.use_main || entry_specs.is_empty() {
        // Main entry paths are package-root-relative too.
        config
            .main
            .to_entry_map()
            .into_iter()
            .map(|(name, path)| (name, root.join(path).to_string_lossy().into_owned()))
            .collect()
    } else {
        sift_config::discover_entries(&entry_specs).await?
    };
    tracing::info!("discovered {} entries", entries.len());

    let toggles = toggles_for(&config.targets, &args.profiles);
    let profiles = TargetProfile::canonical(root.join(&args.out_dir), toggles);

    let descriptors = TargetGenerator::new(profiles)
        .production(args.production)
        .sourcemap(args.sourcemap)
        .generate(&entries);

    if args.dry_run {
        println!("{}", serde_json::to_string_pretty(&descriptors)?);
        return Ok(());
    }

    let runner = BuildRunner::from_config(&config, Arc::new(FsResolver::new(&root)));
    let outcomes = runner.run(&descriptors).await?;

    for outcome in &outcomes {
        println!(
            "[sift] profile {}: wrote {} files",
            outcome.profile,
            outcome.artifacts.len()
        );
        if !outcome.report.is_empty() {
            print!("{}", outcome.report);
        }
    }

    Ok(())
}

/// CLI `--profile` flags override the config's target toggles entirely.
fn toggles_for(configured: &TargetToggles, flags: &[String]) -> TargetToggles {
    if flags.is_empty() {
        return *configured;
    }
    TargetToggles {
        modern: flags.iter().any(|p| p == "modern"),
        legacy: flags.iter().any(|p| p == "legacy"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    #[tokio::test]
    async fn use_main_entries_resolve_against_the_package_root() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("package.json"),
            r#"{ "name": "demo", "main": "index.js" }"#,
        )
        .unwrap();
        fs::write(dir.path().join("index.js"), "export {};\n").unwrap();

        execute(BuildArgs {
            root: Some(dir.path().to_path_buf()),
            out_dir: PathBuf::from("dist"),
            production: false,
            sourcemap: false,
            profiles: Vec::new(),
            dry_run: false,
        })
        .await
        .unwrap();

        assert!(dir.path().join("dist/module/main.js").exists());
    }

    #[test]
    fn profile_flags_override_config_toggles() {
        let configured = TargetToggles {
            modern: true,
            legacy: false,
        };

        let unchanged = toggles_for(&configured, &[]);
        assert!(unchanged.modern && !unchanged.legacy);

        let overridden = toggles_for(&configured, &["legacy".to_string()]);
        assert!(!overridden.modern && overridden.legacy);
    }
}
