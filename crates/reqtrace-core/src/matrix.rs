use crate::gaps::{summarize, Summary};
use crate::hit::Hit;
use crate::types::ArtifactKind;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const DEFAULT_VERSION: &str = "1.0";

// ---------------------------------------------------------------------------
// Link references
// ---------------------------------------------------------------------------

/// File evidence as persisted in a matrix. Scan-time detail (snippet,
/// timestamp) is dropped; merge equality is by `path` alone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRef {
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,
}

/// Commit evidence as persisted in a matrix; merge equality is by `hash`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitRef {
    pub hash: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
}

// ---------------------------------------------------------------------------
// LinkBucket
// ---------------------------------------------------------------------------

/// The four evidence lists kept per requirement, in discovery order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkBucket {
    #[serde(default)]
    pub design: Vec<FileRef>,
    #[serde(default)]
    pub code: Vec<FileRef>,
    #[serde(default)]
    pub tests: Vec<FileRef>,
    #[serde(default)]
    pub commits: Vec<CommitRef>,
}

impl LinkBucket {
    pub fn has(&self, kind: ArtifactKind) -> bool {
        match kind {
            ArtifactKind::Design => !self.design.is_empty(),
            ArtifactKind::Code => !self.code.is_empty(),
            ArtifactKind::Test => !self.tests.is_empty(),
        }
    }

    pub fn has_commits(&self) -> bool {
        !self.commits.is_empty()
    }

    pub fn is_empty(&self) -> bool {
        self.design.is_empty()
            && self.code.is_empty()
            && self.tests.is_empty()
            && self.commits.is_empty()
    }
}

// ---------------------------------------------------------------------------
// TraceMatrix
// ---------------------------------------------------------------------------

/// The traceability matrix: requirement id to evidence, plus metadata.
///
/// `requirements` is a `BTreeMap` so key iteration, serialization, and the
/// gap detector's tie-breaking are all deterministic. Once built, a matrix is
/// treated as an immutable value; every update path produces a new one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TraceMatrix {
    pub version: String,
    pub generated_at: DateTime<Utc>,
    pub requirements: BTreeMap<String, LinkBucket>,
    pub summary: Summary,
}

impl TraceMatrix {
    pub fn empty() -> Self {
        let requirements = BTreeMap::new();
        let summary = summarize(&requirements);
        Self {
            version: DEFAULT_VERSION.to_string(),
            generated_at: Utc::now(),
            requirements,
            summary,
        }
    }

    pub fn bucket(&self, id: &str) -> Option<&LinkBucket> {
        self.requirements.get(id)
    }
}

// ---------------------------------------------------------------------------
// MatrixBuilder
// ---------------------------------------------------------------------------

/// Folds hit streams into a matrix. The builder owns the in-flight map;
/// `finish` stamps the timestamp and computes the summary.
///
/// Hits are appended without deduplication: the same requirement on two
/// lines is two pieces of evidence. Only [`crate::store::merge`] dedups.
#[derive(Debug)]
pub struct MatrixBuilder {
    version: String,
    requirements: BTreeMap<String, LinkBucket>,
}

impl MatrixBuilder {
    pub fn new() -> Self {
        Self {
            version: DEFAULT_VERSION.to_string(),
            requirements: BTreeMap::new(),
        }
    }

    /// Start from an existing matrix, keeping its version and rows. Rows with
    /// empty buckets (authored catalogs) are preserved as-is.
    pub fn seeded(seed: TraceMatrix) -> Self {
        Self {
            version: seed.version,
            requirements: seed.requirements,
        }
    }

    pub fn push(&mut self, hit: Hit) {
        match hit {
            Hit::File(f) => {
                let bucket = self.requirements.entry(f.requirement_id).or_default();
                let entry = FileRef {
                    path: f.path,
                    line: Some(f.line),
                };
                match f.kind {
                    ArtifactKind::Design => bucket.design.push(entry),
                    ArtifactKind::Code => bucket.code.push(entry),
                    ArtifactKind::Test => bucket.tests.push(entry),
                }
            }
            Hit::Commit(c) => {
                self.requirements
                    .entry(c.requirement_id)
                    .or_default()
                    .commits
                    .push(CommitRef {
                        hash: c.hash,
                        message: c.subject,
                        date: c.date,
                    });
            }
        }
    }

    pub fn extend(&mut self, hits: impl IntoIterator<Item = Hit>) {
        for hit in hits {
            self.push(hit);
        }
    }

    pub fn finish(self) -> TraceMatrix {
        let summary = summarize(&self.requirements);
        TraceMatrix {
            version: self.version,
            generated_at: Utc::now(),
            requirements: self.requirements,
            summary,
        }
    }
}

impl Default for MatrixBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// One-shot fold of a hit stream, optionally on top of a seed matrix.
pub fn build(hits: impl IntoIterator<Item = Hit>, seed: Option<TraceMatrix>) -> TraceMatrix {
    let mut builder = match seed {
        Some(m) => MatrixBuilder::seeded(m),
        None => MatrixBuilder::new(),
    };
    builder.extend(hits);
    builder.finish()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hit::{CommitHit, FileHit};

    fn file_hit(id: &str, kind: ArtifactKind, path: &str, line: u32) -> Hit {
        Hit::File(FileHit {
            requirement_id: id.to_string(),
            kind,
            path: path.to_string(),
            line,
            snippet: format!("// {id}"),
            found_at: Utc::now(),
        })
    }

    fn commit_hit(id: &str, hash: &str, subject: &str) -> Hit {
        Hit::Commit(CommitHit {
            requirement_id: id.to_string(),
            hash: hash.to_string(),
            subject: subject.to_string(),
            date: Some("2025-01-02".to_string()),
            found_at: Utc::now(),
        })
    }

    #[test]
    fn folds_hits_into_buckets() {
        let hits = vec![
            file_hit("REQ-001-001", ArtifactKind::Code, "src/a.js", 1),
            file_hit("IMP-6.2-002-01", ArtifactKind::Code, "src/a.js", 2),
            file_hit("REQ-001-001", ArtifactKind::Test, "tests/a.test.js", 1),
        ];
        let m = build(hits, None);
        let keys: Vec<&str> = m.requirements.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["IMP-6.2-002-01", "REQ-001-001"]);
        let req = m.bucket("REQ-001-001").unwrap();
        assert_eq!(req.code.len(), 1);
        assert_eq!(req.tests.len(), 1);
        assert_eq!(req.code[0].path, "src/a.js");
        assert_eq!(req.code[0].line, Some(1));
        let imp = m.bucket("IMP-6.2-002-01").unwrap();
        assert!(imp.tests.is_empty());
        assert_eq!(imp.code.len(), 1);
    }

    #[test]
    fn routes_each_kind_to_its_bucket() {
        let hits = vec![
            file_hit("FEAT-001", ArtifactKind::Design, "docs/d.md", 1),
            file_hit("FEAT-001", ArtifactKind::Code, "src/f.rs", 2),
            file_hit("FEAT-001", ArtifactKind::Test, "tests/f.rs", 3),
            commit_hit("FEAT-001", "abc1234", "feat: FEAT-001"),
        ];
        let m = build(hits, None);
        let b = m.bucket("FEAT-001").unwrap();
        assert!(b.has(ArtifactKind::Design));
        assert!(b.has(ArtifactKind::Code));
        assert!(b.has(ArtifactKind::Test));
        assert!(b.has_commits());
        assert_eq!(b.commits[0].hash, "abc1234");
        assert_eq!(b.commits[0].message, "feat: FEAT-001");
    }

    #[test]
    fn appends_without_dedup() {
        let hits = vec![
            file_hit("REQ-AUTH-001", ArtifactKind::Code, "src/a.rs", 3),
            file_hit("REQ-AUTH-001", ArtifactKind::Code, "src/a.rs", 9),
        ];
        let m = build(hits, None);
        assert_eq!(m.bucket("REQ-AUTH-001").unwrap().code.len(), 2);
    }

    #[test]
    fn empty_stream_keeps_seed_rows() {
        let mut seed = TraceMatrix::empty();
        seed.requirements
            .insert("REQ-AUTH-001".to_string(), LinkBucket::default());
        let m = build(Vec::new(), Some(seed));
        assert_eq!(m.requirements.len(), 1);
        assert!(m.bucket("REQ-AUTH-001").unwrap().is_empty());
        assert_eq!(m.summary.total_requirements, 1);
        assert_eq!(m.summary.coverage_percentage, 0);
    }

    #[test]
    fn builder_creates_no_phantom_rows() {
        let m = build(Vec::new(), None);
        assert!(m.requirements.is_empty());
        assert_eq!(m.summary.total_requirements, 0);
        assert_eq!(m.summary.coverage_percentage, 100);
    }

    #[test]
    fn seeded_version_is_kept() {
        let mut seed = TraceMatrix::empty();
        seed.version = "2.3".to_string();
        let m = build(Vec::new(), Some(seed));
        assert_eq!(m.version, "2.3");
        assert_eq!(build(Vec::new(), None).version, DEFAULT_VERSION);
    }

    #[test]
    fn split_streams_union_to_the_same_keys() {
        let x = vec![
            file_hit("REQ-AUTH-001", ArtifactKind::Code, "src/a.rs", 1),
            file_hit("FEAT-001", ArtifactKind::Design, "docs/d.md", 1),
        ];
        let y = vec![
            file_hit("REQ-AUTH-001", ArtifactKind::Test, "tests/a.rs", 1),
            file_hit("TASK-001", ArtifactKind::Code, "src/t.rs", 1),
        ];
        let combined = build(x.iter().cloned().chain(y.iter().cloned()), None);
        let separate_x = build(x, None);
        let separate_y = build(y, None);
        let mut union: Vec<&String> = separate_x
            .requirements
            .keys()
            .chain(separate_y.requirements.keys())
            .collect();
        union.sort();
        union.dedup();
        let combined_keys: Vec<&String> = combined.requirements.keys().collect();
        assert_eq!(combined_keys, union);
        // Buckets concatenate in stream order.
        let b = combined.bucket("REQ-AUTH-001").unwrap();
        assert_eq!(b.code.len(), 1);
        assert_eq!(b.tests.len(), 1);
    }
}
