use crate::matrix::{LinkBucket, TraceMatrix};
use crate::types::{ArtifactKind, GapKind, Severity};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ---------------------------------------------------------------------------
// Summary
// ---------------------------------------------------------------------------

/// Aggregate figures over a matrix, recomputed on every build, save, and
/// merge. Coverage counts only fully linked requirements (design, code, and
/// tests all present); `linked_requirements` is the looser any-of-three count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub total_requirements: u32,
    pub with_design: u32,
    pub with_code: u32,
    pub with_tests: u32,
    pub linked_requirements: u32,
    pub fully_linked: u32,
    pub gaps: u32,
    pub coverage_percentage: u32,
}

/// Pure over the requirement map: commits and matrix metadata do not
/// influence any summary figure.
pub fn summarize(requirements: &BTreeMap<String, LinkBucket>) -> Summary {
    let total = requirements.len() as u32;
    let mut with_design = 0u32;
    let mut with_code = 0u32;
    let mut with_tests = 0u32;
    let mut linked = 0u32;
    let mut fully = 0u32;
    let mut gaps = 0u32;
    for bucket in requirements.values() {
        let d = bucket.has(ArtifactKind::Design);
        let c = bucket.has(ArtifactKind::Code);
        let t = bucket.has(ArtifactKind::Test);
        if d {
            with_design += 1;
        }
        if c {
            with_code += 1;
        }
        if t {
            with_tests += 1;
        }
        if d || c || t {
            linked += 1;
        }
        if d && c && t {
            fully += 1;
        }
        gaps += 3 - (u32::from(d) + u32::from(c) + u32::from(t));
    }
    let coverage_percentage = if total == 0 {
        100
    } else {
        ((f64::from(fully) / f64::from(total)) * 100.0).round() as u32
    };
    Summary {
        total_requirements: total,
        with_design,
        with_code,
        with_tests,
        linked_requirements: linked,
        fully_linked: fully,
        gaps,
        coverage_percentage,
    }
}

// ---------------------------------------------------------------------------
// Gap detection
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Gap {
    pub requirement_id: String,
    pub kind: GapKind,
    pub severity: Severity,
    pub suggestion: String,
}

/// Default remediation text per gap kind. Callers wanting different wording
/// can rewrite `suggestion` on the returned gaps.
pub fn suggestion_for(kind: GapKind) -> &'static str {
    match kind {
        GapKind::NoTest => "add a test that references this requirement id",
        GapKind::NoCode => "implement the requirement and tag the code with its id",
        GapKind::NoDesign => "document the requirement in a design file",
        GapKind::NoCommit => "reference the requirement id in a commit message",
    }
}

fn detect_inner(matrix: &TraceMatrix, include_commits: bool) -> Vec<Gap> {
    let mut gaps = Vec::new();
    let mut push = |id: &str, kind: GapKind| {
        gaps.push(Gap {
            requirement_id: id.to_string(),
            kind,
            severity: kind.severity(),
            suggestion: suggestion_for(kind).to_string(),
        });
    };
    for (id, bucket) in &matrix.requirements {
        if !bucket.has(ArtifactKind::Design) {
            push(id, GapKind::NoDesign);
        }
        if !bucket.has(ArtifactKind::Code) {
            push(id, GapKind::NoCode);
        }
        if !bucket.has(ArtifactKind::Test) {
            push(id, GapKind::NoTest);
        }
        if include_commits && !bucket.has_commits() {
            push(id, GapKind::NoCommit);
        }
    }
    // Stable sort: equal severities stay in matrix key order.
    gaps.sort_by_key(|g| g.severity);
    gaps
}

/// One gap per empty bucket among design, code, and tests, critical first.
pub fn detect(matrix: &TraceMatrix) -> Vec<Gap> {
    detect_inner(matrix, false)
}

/// As [`detect`], plus a low-severity gap for requirements no commit
/// mentions. Commit absence is advisory and never escalates.
pub fn detect_with_commit_gaps(matrix: &TraceMatrix) -> Vec<Gap> {
    detect_inner(matrix, true)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
