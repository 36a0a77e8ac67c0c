use crate::error::Result;
use crate::matrix::{LinkBucket, TraceMatrix};
use std::fmt::Write;

// ---------------------------------------------------------------------------
// JSON
// ---------------------------------------------------------------------------

/// Pretty-printed JSON with fields in on-disk order: `version`,
/// `generatedAt`, `requirements`, `summary`. Requirement keys come out
/// sorted, so two renderings of the same matrix are byte-identical.
pub fn to_json(matrix: &TraceMatrix) -> Result<String> {
    Ok(serde_json::to_string_pretty(matrix)?)
}

// ---------------------------------------------------------------------------
// Markdown
// ---------------------------------------------------------------------------

fn mark(present: bool) -> &'static str {
    if present {
        "✅"
    } else {
        "❌"
    }
}

fn push_links(out: &mut String, label: &str, bucket: &LinkBucket) {
    let file_lines = |out: &mut String, name: &str, refs: &[crate::matrix::FileRef]| {
        for r in refs {
            match r.line {
                Some(line) => {
                    let _ = writeln!(out, "- {name}: `{}:{line}`", r.path);
                }
                None => {
                    let _ = writeln!(out, "- {name}: `{}`", r.path);
                }
            }
        }
    };
    let _ = writeln!(out, "### {label}");
    out.push('\n');
    if bucket.is_empty() {
        out.push_str("_No links recorded._\n\n");
        return;
    }
    file_lines(out, "design", &bucket.design);
    file_lines(out, "code", &bucket.code);
    file_lines(out, "tests", &bucket.tests);
    for c in &bucket.commits {
        let _ = writeln!(out, "- commit: `{}` {}", c.hash, c.message);
    }
    out.push('\n');
}

/// Render the matrix as a standalone Markdown report: summary table,
/// per-requirement presence table, and a details section with every link.
pub fn to_markdown(matrix: &TraceMatrix) -> String {
    let mut out = String::new();
    out.push_str("# Traceability Matrix\n\n");
    let _ = writeln!(
        out,
        "Generated {} (version {})",
        matrix.generated_at.format("%Y-%m-%d %H:%M UTC"),
        matrix.version
    );
    out.push('\n');

    let s = &matrix.summary;
    out.push_str("## Summary\n\n");
    out.push_str("| Metric | Value |\n|--------|-------|\n");
    let _ = writeln!(out, "| Total requirements | {} |", s.total_requirements);
    let _ = writeln!(out, "| With design | {} |", s.with_design);
    let _ = writeln!(out, "| With code | {} |", s.with_code);
    let _ = writeln!(out, "| With tests | {} |", s.with_tests);
    let _ = writeln!(out, "| Linked requirements | {} |", s.linked_requirements);
    let _ = writeln!(out, "| Fully linked | {} |", s.fully_linked);
    let _ = writeln!(out, "| Gaps | {} |", s.gaps);
    let _ = writeln!(out, "| Coverage | {}% |", s.coverage_percentage);
    out.push('\n');

    out.push_str("## Requirements\n\n");
    out.push_str("| Requirement | Design | Code | Tests | Commits |\n");
    out.push_str("|-------------|--------|------|-------|---------|\n");
    for (id, bucket) in &matrix.requirements {
        let _ = writeln!(
            out,
            "| {id} | {} | {} | {} | {} |",
            mark(!bucket.design.is_empty()),
            mark(!bucket.code.is_empty()),
            mark(!bucket.tests.is_empty()),
            mark(!bucket.commits.is_empty()),
        );
    }
    out.push('\n');

    out.push_str("## Details\n\n");
    for (id, bucket) in &matrix.requirements {
        push_links(&mut out, id, bucket);
    }
    out
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
