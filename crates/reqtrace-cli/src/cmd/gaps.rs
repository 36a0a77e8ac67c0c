use crate::cmd::{check::print_report, scan::default_feature_id};
use crate::output::print_json;
use anyhow::Context;
use reqtrace_core::{config::Config, gaps, store::MatrixStore};
use std::path::Path;

/// Report gaps for a stored matrix. Exits 1 when gaps exist.
pub fn run(root: &Path, name: Option<&str>, commits: bool, json: bool) -> anyhow::Result<()> {
    let config = Config::load(root).context("failed to load config")?;
    let store = MatrixStore::new(config.storage_dir(root));

    let name = name
        .map(str::to_string)
        .unwrap_or_else(|| default_feature_id(root));
    let matrix = store
        .load(&name)
        .context("failed to load matrix")?
        .with_context(|| format!("no stored matrix for '{name}'; run 'reqtrace scan' first"))?;

    let gaps = if commits {
        gaps::detect_with_commit_gaps(&matrix)
    } else {
        gaps::detect(&matrix)
    };

    if json {
        let value = serde_json::json!({
            "matrix": name,
            "generatedAt": matrix.generated_at,
            "summary": matrix.summary,
            "gaps": gaps,
        });
        print_json(&value)?;
    } else {
        print_report(&matrix.summary, &gaps);
    }

    if !gaps.is_empty() {
        std::process::exit(1);
    }
    Ok(())
}
