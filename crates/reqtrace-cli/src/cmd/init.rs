use anyhow::Context;
use reqtrace_core::{config::Config, io, paths};
use std::path::Path;

pub fn run(root: &Path) -> anyhow::Result<()> {
    println!("Initializing requirement tracing in: {}", root.display());

    // 1. Create .reqtrace directory structure
    let dirs = [paths::reqtrace_dir(root), paths::matrices_dir(root)];
    for p in &dirs {
        io::ensure_dir(p).with_context(|| format!("failed to create {}", p.display()))?;
    }

    // 2. Write config.yaml if missing
    let config_path = paths::config_path(root);
    if !config_path.exists() {
        let cfg = Config::new();
        cfg.save(root).context("failed to write config.yaml")?;
        println!("  created: {}", paths::CONFIG_FILE);
    } else {
        println!("  exists:  {}", paths::CONFIG_FILE);
    }

    // 3. Write the requirement catalog template if missing
    let catalog_path = paths::catalog_path(root);
    let created = io::write_if_missing(&catalog_path, CATALOG_TEMPLATE.as_bytes())
        .context("failed to write requirements.yaml")?;
    if created {
        println!("  created: {}", paths::CATALOG_FILE);
    } else {
        println!("  exists:  {}", paths::CATALOG_FILE);
    }

    println!("\nRequirement tracing initialized.");
    println!("Next: reqtrace scan");

    Ok(())
}

/// Seed catalog written by `init`. Entries listed here get an empty matrix
/// row on every scan, so unimplemented requirements surface as gaps instead
/// of vanishing.
const CATALOG_TEMPLATE: &str = r#"# Authored requirement catalog.
#
# Every id listed here is seeded into each scanned matrix, so a requirement
# nothing references yet still shows up in gap reports.
#
# requirements:
#   - id: REQ-AUTH-001
#     title: Sessions expire after 24 hours
requirements: []
"#;
