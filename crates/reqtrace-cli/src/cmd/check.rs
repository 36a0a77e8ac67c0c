use crate::cmd::scan::collect_hits;
use crate::output::{print_json, print_table};
use anyhow::Context;
use reqtrace_core::{
    catalog::Catalog,
    config::Config,
    gaps::{self, Gap},
    matrix,
};
use std::path::Path;

/// Scan and report gaps without persisting anything. Exits 1 when gaps
/// exist, so CI can gate on traceability.
pub fn run(root: &Path, commits: bool, json: bool) -> anyhow::Result<()> {
    let config = Config::load(root).context("failed to load config")?;

    let hits = collect_hits(root, &config, commits);
    let seed = Catalog::load(root)
        .context("failed to read requirement catalog")?
        .map(|c| c.seed_matrix());
    let matrix = matrix::build(hits, seed);

    let gaps = if commits {
        gaps::detect_with_commit_gaps(&matrix)
    } else {
        gaps::detect(&matrix)
    };

    if json {
        let value = serde_json::json!({
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

pub fn print_report(summary: &reqtrace_core::gaps::Summary, gaps: &[Gap]) {
    if gaps.is_empty() {
        println!(
            "No gaps. {} requirement(s), coverage {}%.",
            summary.total_requirements, summary.coverage_percentage,
        );
        return;
    }

    let rows: Vec<Vec<String>> = gaps
        .iter()
        .map(|g| {
            vec![
                g.requirement_id.clone(),
                g.kind.to_string(),
                g.severity.to_string(),
                g.suggestion.clone(),
            ]
        })
        .collect();
    print_table(&["REQUIREMENT", "GAP", "SEVERITY", "SUGGESTION"], &rows);

    let critical = gaps
        .iter()
        .filter(|g| g.severity == reqtrace_core::types::Severity::Critical)
        .count();
    println!(
        "\n{} gap(s), {} critical. Coverage {}%.",
        gaps.len(),
        critical,
        summary.coverage_percentage,
    );
}
