//! Matrix persistence.
//!
//! Matrices live as YAML files named `<feature-id>-<YYYY-MM-DD>.yaml` (UTC
//! date) under one directory, usually `.reqtrace/matrices/`. Files are never
//! rewritten in place except by a same-day save; history accumulates as new
//! files, and `load` by feature id resolves the lexically latest one.

use crate::error::{Result, TraceError};
use crate::gaps::summarize;
use crate::matrix::{CommitRef, FileRef, LinkBucket, TraceMatrix};
use crate::paths;
use chrono::Utc;
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// MatrixStore
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct MatrixStore {
    dir: PathBuf,
}

impl MatrixStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Recompute the summary and write `<feature_id>-<date>.yaml` atomically.
    /// Saving twice on one UTC day overwrites. Returns the absolute path.
    pub fn save(&self, feature_id: &str, matrix: &TraceMatrix) -> Result<PathBuf> {
        paths::validate_feature_id(feature_id)?;
        let mut out = matrix.clone();
        out.summary = summarize(&out.requirements);
        let name = format!("{}-{}.yaml", feature_id, Utc::now().format("%Y-%m-%d"));
        let path = self.dir.join(name);
        let data = serde_yaml::to_string(&out)?;
        crate::io::atomic_write(&path, data.as_bytes())?;
        Ok(std::fs::canonicalize(&path)?)
    }

    /// Load by bare filename (`feature-2025-01-02.yaml`) or by feature id,
    /// in which case the lexically latest dated file for that feature wins.
    ///
    /// A missing file and an unparsable file both come back as `None`; the
    /// latter is logged, so a corrupt matrix cannot fail a scan.
    pub fn load(&self, name: &str) -> Result<Option<TraceMatrix>> {
        if name.ends_with(".yaml") || name.ends_with(".yml") {
            return Ok(self.read_matrix(&self.dir.join(name)));
        }
        self.load_latest(name)
    }

    pub fn load_latest(&self, feature_id: &str) -> Result<Option<TraceMatrix>> {
        let latest = self
            .list(None)
            .into_iter()
            .filter(|n| {
                let stem = n
                    .strip_suffix(".yaml")
                    .or_else(|| n.strip_suffix(".yml"))
                    .unwrap_or(n);
                feature_part(stem) == feature_id
            })
            .next_back();
        match latest {
            Some(name) => Ok(self.read_matrix(&self.dir.join(name))),
            None => Ok(None),
        }
    }

    /// Leaf names of stored matrix files, sorted, optionally filtered by a
    /// plain prefix match. An unreadable directory lists as empty.
    pub fn list(&self, prefix: Option<&str>) -> Vec<String> {
        let entries = match std::fs::read_dir(&self.dir) {
            Ok(e) => e,
            Err(_) => return Vec::new(),
        };
        let mut names = Vec::new();
        for entry in entries.flatten() {
            if !entry.file_type().map(|t| t.is_file()).unwrap_or(false) {
                continue;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            if !(name.ends_with(".yaml") || name.ends_with(".yml")) {
                continue;
            }
            if let Some(p) = prefix {
                if !name.starts_with(p) {
                    continue;
                }
            }
            names.push(name);
        }
        names.sort();
        names
    }

    pub fn delete(&self, name: &str) -> Result<()> {
        let path = self.dir.join(name);
        if !path.exists() {
            return Err(TraceError::MatrixNotFound(name.to_string()));
        }
        std::fs::remove_file(&path)?;
        Ok(())
    }

    fn read_matrix(&self, path: &Path) -> Option<TraceMatrix> {
        let data = std::fs::read_to_string(path).ok()?;
        match serde_yaml::from_str(&data) {
            Ok(m) => Some(m),
            Err(e) => {
                tracing::warn!(path = %path.display(), "malformed matrix file: {e}");
                None
            }
        }
    }
}

/// Feature part of a `<feature>-<YYYY-MM-DD>` stem. Stems without a
/// well-formed date suffix come back whole, so hand-named files still load
/// by their full stem. Feature ids may contain hyphens, which is why a plain
/// prefix match is not enough: `auth` must not claim `auth-flow-2025-01-02`.
fn feature_part(stem: &str) -> &str {
    let n = stem.len();
    if n > 11 && stem.is_char_boundary(n - 11) {
        let (head, tail) = stem.split_at(n - 11);
        let dated = tail
            .bytes()
            .enumerate()
            .all(|(i, b)| match i {
                0 | 5 | 8 => b == b'-',
                _ => b.is_ascii_digit(),
            });
        if dated {
            return head;
        }
    }
    stem
}

// ---------------------------------------------------------------------------
// Merge
// ---------------------------------------------------------------------------

fn dedup_file_refs(a: &[FileRef], b: &[FileRef]) -> Vec<FileRef> {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut out = Vec::new();
    for r in a.iter().chain(b) {
        if seen.insert(r.path.as_str()) {
            out.push(r.clone());
        }
    }
    out
}

fn dedup_commit_refs(a: &[CommitRef], b: &[CommitRef]) -> Vec<CommitRef> {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut out = Vec::new();
    for r in a.iter().chain(b) {
        if seen.insert(r.hash.as_str()) {
            out.push(r.clone());
        }
    }
    out
}

fn merge_buckets(a: &LinkBucket, b: &LinkBucket) -> LinkBucket {
    LinkBucket {
        design: dedup_file_refs(&a.design, &b.design),
        code: dedup_file_refs(&a.code, &b.code),
        tests: dedup_file_refs(&a.tests, &b.tests),
        commits: dedup_commit_refs(&a.commits, &b.commits),
    }
}

/// Combine two matrices. Keys union; shared keys concatenate buckets with
/// `a`'s entries first and deduplicate file entries by path, commit entries
/// by hash. `version` comes from `b`, the newer side by convention. Inputs
/// are untouched.
pub fn merge(a: &TraceMatrix, b: &TraceMatrix) -> TraceMatrix {
    let mut requirements: BTreeMap<String, LinkBucket> = BTreeMap::new();
    for (id, bucket_a) in &a.requirements {
        let merged = match b.requirements.get(id) {
            Some(bucket_b) => merge_buckets(bucket_a, bucket_b),
            None => bucket_a.clone(),
        };
        requirements.insert(id.clone(), merged);
    }
    for (id, bucket_b) in &b.requirements {
        if !a.requirements.contains_key(id) {
            requirements.insert(id.clone(), bucket_b.clone());
        }
    }
    let summary = summarize(&requirements);
    TraceMatrix {
        version: b.version.clone(),
        generated_at: Utc::now(),
        requirements,
        summary,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
