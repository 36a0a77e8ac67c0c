//! Requirement-id recognition.
//!
//! Four id shapes are recognized anywhere in free text:
//! ```text
//! REQ-AUTH-001        requirement  (domain segment + 3-digit number)
//! IMP-6.2-001         implementation unit (section + number)
//! IMP-6.2-001-04      implementation sub-unit (2-digit suffix)
//! FEAT-002 / TASK-007 feature and task references
//! ```
//! A candidate only counts when it is a whole token: ids embedded in a longer
//! alphanumeric-or-hyphen run (`REQ-AUTH-0012`, `TASK-001-01`) are rejected.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

// ---------------------------------------------------------------------------
// IdShape
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdShape {
    Requirement,
    Implementation,
    Feature,
    Task,
}

impl IdShape {
    pub fn as_str(self) -> &'static str {
        match self {
            IdShape::Requirement => "requirement",
            IdShape::Implementation => "implementation",
            IdShape::Feature => "feature",
            IdShape::Task => "task",
        }
    }
}

impl fmt::Display for IdShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Patterns
// ---------------------------------------------------------------------------

static REQ_RE: OnceLock<Regex> = OnceLock::new();
static IMP_RE: OnceLock<Regex> = OnceLock::new();
static FEAT_RE: OnceLock<Regex> = OnceLock::new();
static TASK_RE: OnceLock<Regex> = OnceLock::new();

fn req_re() -> &'static Regex {
    REQ_RE.get_or_init(|| Regex::new(r"REQ-[A-Z0-9]+-[0-9]{3}").unwrap())
}

fn imp_re() -> &'static Regex {
    // Greedy optional suffix: IMP-6.2-001-04 matches whole, never as IMP-6.2-001.
    IMP_RE.get_or_init(|| Regex::new(r"IMP-[0-9]+\.[0-9]+-[0-9]{3}(?:-[0-9]{2})?").unwrap())
}

fn feat_re() -> &'static Regex {
    FEAT_RE.get_or_init(|| Regex::new(r"FEAT-[0-9]{3}").unwrap())
}

fn task_re() -> &'static Regex {
    TASK_RE.get_or_init(|| Regex::new(r"TASK-[0-9]{3}").unwrap())
}

fn patterns() -> [(&'static Regex, IdShape); 4] {
    [
        (req_re(), IdShape::Requirement),
        (imp_re(), IdShape::Implementation),
        (feat_re(), IdShape::Feature),
        (task_re(), IdShape::Task),
    ]
}

// ---------------------------------------------------------------------------
// Recognition
// ---------------------------------------------------------------------------

/// One recognized id, borrowing from the scanned text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdMatch<'a> {
    pub id: &'a str,
    pub shape: IdShape,
    /// Byte offset of the first character within the scanned text.
    pub offset: usize,
}

/// The regex crate has no lookaround, so the whole-token rule is enforced by
/// hand: a match is dropped when the byte on either side belongs to the same
/// alphanumeric-or-hyphen run.
fn is_token_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'-'
}

fn whole_token(text: &str, start: usize, end: usize) -> bool {
    let bytes = text.as_bytes();
    if start > 0 && is_token_byte(bytes[start - 1]) {
        return false;
    }
    if end < bytes.len() && is_token_byte(bytes[end]) {
        return false;
    }
    true
}

/// Find every whole-token requirement id in `text`, ordered by byte offset.
///
/// Candidates rejected by the whole-token rule cannot shadow valid ids: any
/// candidate starting inside a rejected one is preceded by a token byte and
/// would be rejected itself.
pub fn recognize(text: &str) -> Vec<IdMatch<'_>> {
    let mut out = Vec::new();
    for (re, shape) in patterns() {
        for m in re.find_iter(text) {
            if whole_token(text, m.start(), m.end()) {
                out.push(IdMatch {
                    id: m.as_str(),
                    shape,
                    offset: m.start(),
                });
            }
        }
    }
    out.sort_by_key(|m| m.offset);
    out.dedup_by_key(|m| (m.offset, m.id));
    out
}

/// Whether `s` is exactly one requirement id, nothing more.
pub fn shape_of(s: &str) -> Option<IdShape> {
    for (re, shape) in patterns() {
        if let Some(m) = re.find(s) {
            if m.start() == 0 && m.end() == s.len() {
                return Some(shape);
            }
        }
    }
    None
}

pub fn is_requirement_id(s: &str) -> bool {
    shape_of(s).is_some()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(text: &str) -> Vec<&str> {
        recognize(text).into_iter().map(|m| m.id).collect()
    }

    #[test]
    fn recognizes_each_shape() {
        assert_eq!(ids("see REQ-AUTH-001."), vec!["REQ-AUTH-001"]);
        assert_eq!(ids("IMP-6.2-001 done"), vec!["IMP-6.2-001"]);
        assert_eq!(ids("FEAT-002:"), vec!["FEAT-002"]);
        assert_eq!(ids("(TASK-007)"), vec!["TASK-007"]);
    }

    #[test]
    fn req_domain_allows_digits() {
        assert_eq!(ids("REQ-OAUTH2-001"), vec!["REQ-OAUTH2-001"]);
    }

    #[test]
    fn imp_sub_unit_matches_greedily() {
        let m = recognize("fixes IMP-6.2-001-04 fully");
        assert_eq!(m.len(), 1);
        assert_eq!(m[0].id, "IMP-6.2-001-04");
        assert_eq!(m[0].shape, IdShape::Implementation);
    }

    #[test]
    fn embedded_ids_rejected() {
        // Longer digit run: REQ-AUTH-001 must not surface from REQ-AUTH-0012.
        assert!(ids("REQ-AUTH-0012").is_empty());
        // TASK has no sub-unit grammar, so the trailing -01 disqualifies it.
        assert!(ids("TASK-001-01").is_empty());
        // Leading token characters disqualify too.
        assert!(ids("XREQ-AUTH-001").is_empty());
        assert!(ids("pre-REQ-AUTH-001").is_empty());
    }

    #[test]
    fn one_digit_imp_suffix_rejects_whole_candidate() {
        // -0X is not a valid sub-unit, which leaves IMP-6.2-001 embedded.
        assert!(ids("IMP-6.2-001-0x").is_empty());
    }

    #[test]
    fn underscore_and_punctuation_are_boundaries() {
        assert_eq!(ids("REQ-AUTH-001_v2"), vec!["REQ-AUTH-001"]);
        assert_eq!(ids("`REQ-AUTH-001`"), vec!["REQ-AUTH-001"]);
        assert_eq!(ids("REQ-AUTH-001,FEAT-001"), vec!["REQ-AUTH-001", "FEAT-001"]);
    }

    #[test]
    fn string_edges_are_boundaries() {
        assert_eq!(ids("REQ-AUTH-001"), vec!["REQ-AUTH-001"]);
        assert_eq!(ids("FEAT-123"), vec!["FEAT-123"]);
    }

    #[test]
    fn matches_ordered_by_offset() {
        let text = "TASK-002 before REQ-AUTH-001 and FEAT-003";
        let offsets: Vec<usize> = recognize(text).iter().map(|m| m.offset).collect();
        assert_eq!(ids(text), vec!["TASK-002", "REQ-AUTH-001", "FEAT-003"]);
        assert!(offsets.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn repeated_id_yields_both_occurrences() {
        assert_eq!(
            ids("REQ-AUTH-001 then REQ-AUTH-001 again"),
            vec!["REQ-AUTH-001", "REQ-AUTH-001"]
        );
    }

    #[test]
    fn non_ascii_neighbors_are_boundaries() {
        assert_eq!(ids("参照REQ-AUTH-001。"), vec!["REQ-AUTH-001"]);
    }

    #[test]
    fn shape_of_is_anchored() {
        assert_eq!(shape_of("REQ-AUTH-001"), Some(IdShape::Requirement));
        assert_eq!(shape_of("IMP-6.2-001-04"), Some(IdShape::Implementation));
        assert_eq!(shape_of("FEAT-001"), Some(IdShape::Feature));
        assert_eq!(shape_of("TASK-001"), Some(IdShape::Task));
        assert_eq!(shape_of("REQ-AUTH-001 "), None);
        assert_eq!(shape_of("xREQ-AUTH-001"), None);
        assert!(!is_requirement_id("REQ-auth-001"));
    }

    #[test]
    fn lowercase_prefixes_do_not_match() {
        assert!(ids("req-auth-001 feat-001").is_empty());
    }
}
