use crate::output::print_json;
use anyhow::Context;
use reqtrace_core::{
    catalog::Catalog,
    config::Config,
    hit::Hit,
    matrix,
    scan::{scan_commits, scan_tree},
    store::MatrixStore,
    types::{ArtifactKind, SourceKind},
};
use std::path::Path;

/// Feature id a matrix is stored under when none is given: the project
/// directory name.
pub fn default_feature_id(root: &Path) -> String {
    root.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "project".to_string())
}

/// Scan every configured source. Tree hits come back relative to the
/// configured subtree, so they are re-anchored at the project root here
/// (`auth.rs` under the `src` root becomes `src/auth.rs`).
pub fn collect_hits(root: &Path, config: &Config, include_commits: bool) -> Vec<Hit> {
    let mut hits = Vec::new();

    for kind in ArtifactKind::all() {
        let scan_cfg = config.scan_config(*kind);
        for subtree in &config.rule(*kind).roots {
            let prefix = subtree.trim_end_matches('/');
            for mut hit in scan_tree(&root.join(subtree), *kind, &scan_cfg) {
                if let Hit::File(f) = &mut hit {
                    if !prefix.is_empty() && prefix != "." {
                        f.path = format!("{prefix}/{}", f.path);
                    }
                }
                hits.push(hit);
            }
        }
    }

    if include_commits {
        hits.extend(scan_commits(root, config.scan.commit_limit));
    }

    hits
}

fn count_by_source(hits: &[Hit]) -> (usize, usize, usize, usize) {
    let mut counts = (0, 0, 0, 0);
    for hit in hits {
        match hit.source_kind() {
            SourceKind::Design => counts.0 += 1,
            SourceKind::Code => counts.1 += 1,
            SourceKind::Test => counts.2 += 1,
            SourceKind::Commit => counts.3 += 1,
        }
    }
    counts
}

pub fn run(root: &Path, feature: Option<&str>, no_commits: bool, json: bool) -> anyhow::Result<()> {
    let config = Config::load(root).context("failed to load config")?;
    let feature_id = feature
        .map(str::to_string)
        .unwrap_or_else(|| default_feature_id(root));

    let hits = collect_hits(root, &config, !no_commits);
    let (design, code, tests, commits) = count_by_source(&hits);

    let seed = Catalog::load(root)
        .context("failed to read requirement catalog")?
        .map(|c| c.seed_matrix());
    let matrix = matrix::build(hits, seed);

    let store = MatrixStore::new(config.storage_dir(root));
    let path = store
        .save(&feature_id, &matrix)
        .context("failed to save matrix")?;
    let saved = match path.file_name() {
        Some(name) => format!("{}/{}", config.storage.dir, name.to_string_lossy()),
        None => path.display().to_string(),
    };

    if json {
        let value = serde_json::json!({
            "feature": feature_id,
            "path": saved,
            "hits": {
                "design": design,
                "code": code,
                "tests": tests,
                "commits": commits,
            },
            "summary": matrix.summary,
        });
        return print_json(&value);
    }

    println!(
        "Scanned {} hits (design {design}, code {code}, tests {tests}, commits {commits})",
        design + code + tests + commits,
    );
    println!(
        "Requirements: {} total, {} fully linked, coverage {}%",
        matrix.summary.total_requirements,
        matrix.summary.fully_linked,
        matrix.summary.coverage_percentage,
    );
    println!("Saved: {saved}");
    Ok(())
}
