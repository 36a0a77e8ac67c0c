use crate::types::{ArtifactKind, SourceKind};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// FileHit
// ---------------------------------------------------------------------------

/// A requirement id sighted in a scanned file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileHit {
    pub requirement_id: String,
    pub kind: ArtifactKind,
    /// Path relative to the scan root, `/`-separated on every platform.
    pub path: String,
    /// 1-based line number.
    pub line: u32,
    /// The containing line, trimmed and capped at 100 characters.
    pub snippet: String,
    pub found_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// CommitHit
// ---------------------------------------------------------------------------

/// A requirement id sighted in a commit subject line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitHit {
    pub requirement_id: String,
    /// Short (7-character) commit hash.
    pub hash: String,
    /// Full subject line, untruncated.
    pub subject: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    pub found_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Hit
// ---------------------------------------------------------------------------

/// One piece of traceability evidence. File and commit evidence carry
/// different fields, so the two arms stay separate types instead of a flat
/// struct full of options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum Hit {
    File(FileHit),
    Commit(CommitHit),
}

impl Hit {
    pub fn requirement_id(&self) -> &str {
        match self {
            Hit::File(h) => &h.requirement_id,
            Hit::Commit(h) => &h.requirement_id,
        }
    }

    pub fn source_kind(&self) -> SourceKind {
        match self {
            Hit::File(h) => h.kind.into(),
            Hit::Commit(_) => SourceKind::Commit,
        }
    }
}

impl fmt::Display for Hit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Hit::File(h) => write!(f, "{} @ {}:{}", h.requirement_id, h.path, h.line),
            Hit::Commit(h) => write!(f, "{} @ commit {}", h.requirement_id, h.hash),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hit_requirement_id_covers_both_arms() {
        let file = Hit::File(FileHit {
            requirement_id: "REQ-AUTH-001".into(),
            kind: ArtifactKind::Code,
            path: "src/auth.rs".into(),
            line: 42,
            snippet: "// REQ-AUTH-001: session token".into(),
            found_at: Utc::now(),
        });
        let commit = Hit::Commit(CommitHit {
            requirement_id: "FEAT-001".into(),
            hash: "abc1234".into(),
            subject: "feat: FEAT-001 login flow".into(),
            date: Some("2025-03-01".into()),
            found_at: Utc::now(),
        });
        assert_eq!(file.requirement_id(), "REQ-AUTH-001");
        assert_eq!(commit.requirement_id(), "FEAT-001");
        assert_eq!(file.source_kind(), SourceKind::Code);
        assert_eq!(commit.source_kind(), SourceKind::Commit);
    }

    #[test]
    fn hit_serializes_with_source_tag() {
        let hit = Hit::Commit(CommitHit {
            requirement_id: "TASK-003".into(),
            hash: "deadbee".into(),
            subject: "TASK-003 wire up config".into(),
            date: None,
            found_at: Utc::now(),
        });
        let yaml = serde_yaml::to_string(&hit).unwrap();
        assert!(yaml.contains("source: commit"));
        assert!(!yaml.contains("date"));
    }
}
