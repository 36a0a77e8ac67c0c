//! Artifact scanning.
//!
//! `scan_tree` walks a filesystem subtree and emits a [`Hit`] for every
//! requirement id sighted in an admitted file. `scan_commits` does the same
//! over recent commit subjects. Both are non-failing: unreadable paths,
//! binary files, and missing git all degrade to an empty contribution, so a
//! noisy repository still yields a partial but correct hit stream.

use crate::hit::{CommitHit, FileHit, Hit};
use crate::id;
use crate::types::ArtifactKind;
use chrono::Utc;
use std::path::Path;
use std::process::Command;
use walkdir::{DirEntry, WalkDir};

pub const DEFAULT_COMMIT_LIMIT: usize = 100;

const SNIPPET_MAX: usize = 100;

// ---------------------------------------------------------------------------
// ScanConfig
// ---------------------------------------------------------------------------

/// File admission rules for one tree scan. Globs support `*` and literal
/// characters only and are matched against leaf names, never full paths.
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Empty means admit every file.
    pub include_globs: Vec<String>,
    /// Checked before the include list.
    pub exclude_globs: Vec<String>,
    /// Directory names never descended into. Dot-directories are always
    /// skipped regardless of this list.
    pub excluded_dir_names: Vec<String>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            include_globs: Vec::new(),
            exclude_globs: Vec::new(),
            excluded_dir_names: vec!["node_modules".to_string()],
        }
    }
}

// ---------------------------------------------------------------------------
// Leaf-name globs
// ---------------------------------------------------------------------------

/// `*`-only wildcard match, the classic two-cursor walk with backtracking to
/// the most recent star.
fn glob_match(pattern: &str, name: &str) -> bool {
    let p: Vec<char> = pattern.chars().collect();
    let n: Vec<char> = name.chars().collect();
    let (mut pi, mut ni) = (0usize, 0usize);
    let mut star: Option<usize> = None;
    let mut mark = 0usize;
    while ni < n.len() {
        if pi < p.len() && p[pi] == '*' {
            star = Some(pi);
            mark = ni;
            pi += 1;
        } else if pi < p.len() && p[pi] == n[ni] {
            pi += 1;
            ni += 1;
        } else if let Some(s) = star {
            pi = s + 1;
            mark += 1;
            ni = mark;
        } else {
            return false;
        }
    }
    while pi < p.len() && p[pi] == '*' {
        pi += 1;
    }
    pi == p.len()
}

fn admitted(name: &str, cfg: &ScanConfig) -> bool {
    if cfg.exclude_globs.iter().any(|g| glob_match(g, name)) {
        return false;
    }
    cfg.include_globs.is_empty() || cfg.include_globs.iter().any(|g| glob_match(g, name))
}

// ---------------------------------------------------------------------------
// Tree scan
// ---------------------------------------------------------------------------

fn keep_entry(entry: &DirEntry, excluded: &[String]) -> bool {
    if entry.depth() == 0 || !entry.file_type().is_dir() {
        return true;
    }
    let name = entry.file_name().to_string_lossy();
    !name.starts_with('.') && !excluded.iter().any(|d| d.as_str() == name)
}

fn rel_path(root: &Path, path: &Path) -> String {
    let rel = path.strip_prefix(root).unwrap_or(path);
    rel.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

fn snippet_of(line: &str) -> String {
    line.trim().chars().take(SNIPPET_MAX).collect()
}

/// Walk `root` depth-first with siblings in file-name order, so repeated
/// scans of an unchanged tree yield identical hit sequences.
pub fn scan_tree(root: &Path, kind: ArtifactKind, cfg: &ScanConfig) -> Vec<Hit> {
    let mut hits = Vec::new();
    let walker = WalkDir::new(root)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| keep_entry(e, &cfg.excluded_dir_names));
    for entry in walker.flatten() {
        if !entry.file_type().is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy();
        if !admitted(&name, cfg) {
            continue;
        }
        let content = match std::fs::read_to_string(entry.path()) {
            Ok(c) => c,
            Err(e) => {
                tracing::debug!(path = %entry.path().display(), "skipping file: {e}");
                continue;
            }
        };
        let path = rel_path(root, entry.path());
        let found_at = Utc::now();
        for (idx, line) in content.lines().enumerate() {
            for m in id::recognize(line) {
                hits.push(Hit::File(FileHit {
                    requirement_id: m.id.to_string(),
                    kind,
                    path: path.clone(),
                    line: (idx + 1) as u32,
                    snippet: snippet_of(line),
                    found_at,
                }));
            }
        }
    }
    hits
}

// ---------------------------------------------------------------------------
// Commit scan
// ---------------------------------------------------------------------------

/// One record from `git log`, id-bearing or not.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitInfo {
    /// Short (7-character) hash.
    pub hash: String,
    pub subject: String,
    pub date: Option<String>,
}

/// Enumerate the most recent `limit` commits, newest first.
///
/// Missing git, a non-repository root, or a failing invocation all yield an
/// empty stream rather than an error.
pub fn list_commits(root: &Path, limit: usize) -> Vec<CommitInfo> {
    let output = match Command::new("git")
        .arg("log")
        .arg(format!("-{limit}"))
        .arg("--format=%H|%s|%ad|%ae")
        .arg("--date=short")
        .current_dir(root)
        .output()
    {
        Ok(o) => o,
        Err(e) => {
            tracing::debug!("git unavailable: {e}");
            return Vec::new();
        }
    };
    if !output.status.success() {
        tracing::debug!("git log exited with {}; treating commit stream as empty", output.status);
        return Vec::new();
    }
    let stdout = String::from_utf8_lossy(&output.stdout);
    let mut commits = Vec::new();
    for line in stdout.lines() {
        let mut parts = line.splitn(4, '|');
        let (Some(hash), Some(subject)) = (parts.next(), parts.next()) else {
            continue;
        };
        if hash.is_empty() {
            continue;
        }
        let date = parts.next().filter(|d| !d.is_empty()).map(str::to_string);
        commits.push(CommitInfo {
            hash: hash.chars().take(7).collect(),
            subject: subject.to_string(),
            date,
        });
    }
    commits
}

/// Scan the subjects of the most recent `limit` commits, newest first.
/// Subjects naming no requirement contribute nothing.
pub fn scan_commits(root: &Path, limit: usize) -> Vec<Hit> {
    let found_at = Utc::now();
    let mut hits = Vec::new();
    for commit in list_commits(root, limit) {
        for m in id::recognize(&commit.subject) {
            hits.push(Hit::Commit(CommitHit {
                requirement_id: m.id.to_string(),
                hash: commit.hash.clone(),
                subject: commit.subject.clone(),
                date: commit.date.clone(),
                found_at,
            }));
        }
    }
    hits
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(dir: &TempDir, rel: &str, content: &str) {
        let path = dir.path().join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, content).unwrap();
    }

    fn file_hits(hits: &[Hit]) -> Vec<&FileHit> {
        hits.iter()
            .map(|h| match h {
                Hit::File(f) => f,
                Hit::Commit(_) => panic!("expected file hit"),
            })
            .collect()
    }

    #[test]
    fn glob_star_semantics() {
        assert!(glob_match("*", "anything"));
        assert!(glob_match("*.md", "design.md"));
        assert!(!glob_match("*.md", "design.mdx"));
        assert!(glob_match("a*b", "ab"));
        assert!(glob_match("a*b", "a-very-long-b"));
        assert!(!glob_match("a*b", "a-very-long-c"));
        assert!(glob_match("*test*", "my_test_file.js"));
        assert!(glob_match("literal.txt", "literal.txt"));
        assert!(!glob_match("literal.txt", "other.txt"));
        assert!(glob_match("*.test.js", "a.test.js"));
    }

    #[test]
    fn scans_code_file_line_by_line() {
        let dir = TempDir::new().unwrap();
        write(&dir, "src/a.js", "// REQ-001-001 done\n// IMP-6.2-002-01\n");
        let hits = scan_tree(dir.path(), ArtifactKind::Code, &ScanConfig::default());
        let hits = file_hits(&hits);
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].requirement_id, "REQ-001-001");
        assert_eq!(hits[0].kind, ArtifactKind::Code);
        assert_eq!(hits[0].path, "src/a.js");
        assert_eq!(hits[0].line, 1);
        assert_eq!(hits[0].snippet, "// REQ-001-001 done");
        assert_eq!(hits[1].requirement_id, "IMP-6.2-002-01");
        assert_eq!(hits[1].line, 2);
    }

    #[test]
    fn traversal_is_sorted_by_name() {
        let dir = TempDir::new().unwrap();
        write(&dir, "zz.md", "REQ-AUTH-002\n");
        write(&dir, "aa.md", "REQ-AUTH-001\n");
        let hits = scan_tree(dir.path(), ArtifactKind::Design, &ScanConfig::default());
        let ids: Vec<&str> = hits.iter().map(|h| h.requirement_id()).collect();
        assert_eq!(ids, vec!["REQ-AUTH-001", "REQ-AUTH-002"]);
    }

    #[test]
    fn two_scans_of_same_tree_agree() {
        let dir = TempDir::new().unwrap();
        write(&dir, "a/one.md", "REQ-AUTH-001\n");
        write(&dir, "b/two.md", "FEAT-001 and TASK-002\n");
        let cfg = ScanConfig::default();
        let first = scan_tree(dir.path(), ArtifactKind::Design, &cfg);
        let second = scan_tree(dir.path(), ArtifactKind::Design, &cfg);
        let strip = |hits: &[Hit]| -> Vec<(String, String)> {
            file_hits(hits)
                .iter()
                .map(|f| (f.requirement_id.clone(), f.path.clone()))
                .collect()
        };
        assert_eq!(strip(&first), strip(&second));
    }

    #[test]
    fn skips_excluded_and_hidden_directories() {
        let dir = TempDir::new().unwrap();
        write(&dir, "node_modules/pkg/x.md", "REQ-AUTH-001\n");
        write(&dir, ".hidden/y.md", "REQ-AUTH-002\n");
        write(&dir, "dist/z.md", "REQ-AUTH-003\n");
        write(&dir, "docs/ok.md", "REQ-AUTH-004\n");
        let cfg = ScanConfig {
            excluded_dir_names: vec!["node_modules".into(), "dist".into()],
            ..Default::default()
        };
        let hits = scan_tree(dir.path(), ArtifactKind::Design, &cfg);
        let ids: Vec<&str> = hits.iter().map(|h| h.requirement_id()).collect();
        assert_eq!(ids, vec!["REQ-AUTH-004"]);
    }

    #[test]
    fn include_globs_filter_leaf_names() {
        let dir = TempDir::new().unwrap();
        write(&dir, "a.md", "REQ-AUTH-001\n");
        write(&dir, "a.txt", "REQ-AUTH-002\n");
        let cfg = ScanConfig {
            include_globs: vec!["*.md".into()],
            ..Default::default()
        };
        let hits = scan_tree(dir.path(), ArtifactKind::Design, &cfg);
        let ids: Vec<&str> = hits.iter().map(|h| h.requirement_id()).collect();
        assert_eq!(ids, vec!["REQ-AUTH-001"]);
    }

    #[test]
    fn exclude_globs_win_over_include() {
        let dir = TempDir::new().unwrap();
        write(&dir, "keep.md", "REQ-AUTH-001\n");
        write(&dir, "skip-gen.md", "REQ-AUTH-002\n");
        let cfg = ScanConfig {
            include_globs: vec!["*.md".into()],
            exclude_globs: vec!["*gen*".into()],
            ..Default::default()
        };
        let hits = scan_tree(dir.path(), ArtifactKind::Design, &cfg);
        let ids: Vec<&str> = hits.iter().map(|h| h.requirement_id()).collect();
        assert_eq!(ids, vec!["REQ-AUTH-001"]);
    }

    #[test]
    fn binary_file_contributes_nothing() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("junk.bin"), [0xff, 0xfe, 0x00, b'R', 0x80]).unwrap();
        let hits = scan_tree(dir.path(), ArtifactKind::Code, &ScanConfig::default());
        assert!(hits.is_empty());
    }

    #[test]
    fn missing_root_yields_empty() {
        let dir = TempDir::new().unwrap();
        let hits = scan_tree(
            &dir.path().join("does-not-exist"),
            ArtifactKind::Code,
            &ScanConfig::default(),
        );
        assert!(hits.is_empty());
    }

    #[test]
    fn snippet_trimmed_and_capped() {
        let dir = TempDir::new().unwrap();
        let long = format!("   REQ-AUTH-001 {}   \n", "x".repeat(200));
        write(&dir, "a.md", &long);
        let hits = scan_tree(dir.path(), ArtifactKind::Design, &ScanConfig::default());
        let hits = file_hits(&hits);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].snippet.chars().count(), 100);
        assert!(hits[0].snippet.starts_with("REQ-AUTH-001"));
    }

    #[test]
    fn line_numbers_are_one_based() {
        let dir = TempDir::new().unwrap();
        write(&dir, "a.md", "nothing\nnothing\nREQ-AUTH-001\n");
        let hits = scan_tree(dir.path(), ArtifactKind::Design, &ScanConfig::default());
        assert_eq!(file_hits(&hits)[0].line, 3);
    }

    // -----------------------------------------------------------------------
    // Commit scanning (skipped when git is unavailable)
    // -----------------------------------------------------------------------

    fn git(dir: &Path, args: &[&str]) -> bool {
        Command::new("git")
            .args(args)
            .current_dir(dir)
            .output()
            .map(|o| o.status.success())
            .unwrap_or(false)
    }

    fn init_repo(dir: &Path) -> bool {
        git(dir, &["init", "-q"])
            && git(dir, &["config", "user.email", "test@example.com"])
            && git(dir, &["config", "user.name", "Test"])
    }

    fn commit(dir: &Path, subject: &str) -> bool {
        git(dir, &["commit", "-q", "--allow-empty", "-m", subject])
    }

    #[test]
    fn commit_subjects_are_scanned_newest_first() {
        let dir = TempDir::new().unwrap();
        if !init_repo(dir.path()) {
            return;
        }
        assert!(commit(dir.path(), "feat: REQ-AUTH-001 add login"));
        assert!(commit(dir.path(), "chore: tidy imports"));
        assert!(commit(dir.path(), "fix: FEAT-002 session expiry"));
        let hits = scan_commits(dir.path(), DEFAULT_COMMIT_LIMIT);
        assert_eq!(hits.len(), 2);
        let Hit::Commit(first) = &hits[0] else {
            panic!("expected commit hit");
        };
        assert_eq!(first.requirement_id, "FEAT-002");
        assert_eq!(first.hash.len(), 7);
        assert_eq!(first.subject, "fix: FEAT-002 session expiry");
        assert!(first.date.is_some());
        assert_eq!(hits[1].requirement_id(), "REQ-AUTH-001");
    }

    #[test]
    fn list_commits_keeps_subjects_without_ids() {
        let dir = TempDir::new().unwrap();
        if !init_repo(dir.path()) {
            return;
        }
        assert!(commit(dir.path(), "chore: tidy imports"));
        assert!(commit(dir.path(), "feat: REQ-AUTH-001 add login"));
        let commits = list_commits(dir.path(), DEFAULT_COMMIT_LIMIT);
        assert_eq!(commits.len(), 2);
        assert_eq!(commits[0].subject, "feat: REQ-AUTH-001 add login");
        assert_eq!(commits[1].subject, "chore: tidy imports");
        assert_eq!(commits[0].hash.len(), 7);
    }

    #[test]
    fn commit_limit_bounds_history() {
        let dir = TempDir::new().unwrap();
        if !init_repo(dir.path()) {
            return;
        }
        assert!(commit(dir.path(), "TASK-001 oldest"));
        assert!(commit(dir.path(), "TASK-002 newest"));
        let hits = scan_commits(dir.path(), 1);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].requirement_id(), "TASK-002");
    }

    #[test]
    fn non_repository_yields_empty_commit_stream() {
        let dir = TempDir::new().unwrap();
        let hits = scan_commits(dir.path(), DEFAULT_COMMIT_LIMIT);
        assert!(hits.is_empty());
    }
}
