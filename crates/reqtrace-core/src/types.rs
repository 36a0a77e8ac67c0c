use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// ArtifactKind
// ---------------------------------------------------------------------------

/// The artifact categories a requirement links to. Commits are evidence too,
/// but they come from git history rather than a tree scan, so they are not a
/// kind of file artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    Design,
    Code,
    Test,
}

impl ArtifactKind {
    pub fn all() -> &'static [ArtifactKind] {
        &[ArtifactKind::Design, ArtifactKind::Code, ArtifactKind::Test]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ArtifactKind::Design => "design",
            ArtifactKind::Code => "code",
            ArtifactKind::Test => "test",
        }
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ArtifactKind {
    type Err = crate::error::TraceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "design" => Ok(ArtifactKind::Design),
            "code" => Ok(ArtifactKind::Code),
            "test" | "tests" => Ok(ArtifactKind::Test),
            _ => Err(crate::error::TraceError::InvalidArtifactKind(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// SourceKind
// ---------------------------------------------------------------------------

/// Where a hit came from: one of the three file artifact kinds, or git
/// history. The flat view of [`ArtifactKind`] plus commits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    Design,
    Code,
    Test,
    Commit,
}

impl SourceKind {
    pub fn as_str(self) -> &'static str {
        match self {
            SourceKind::Design => "design",
            SourceKind::Code => "code",
            SourceKind::Test => "test",
            SourceKind::Commit => "commit",
        }
    }
}

impl From<ArtifactKind> for SourceKind {
    fn from(kind: ArtifactKind) -> Self {
        match kind {
            ArtifactKind::Design => SourceKind::Design,
            ArtifactKind::Code => SourceKind::Code,
            ArtifactKind::Test => SourceKind::Test,
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Severity
// ---------------------------------------------------------------------------

/// Gap severity. Declaration order is significance order, so an ascending
/// sort puts critical gaps first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Critical,
    High,
    Medium,
    Low,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Critical => "critical",
            Severity::High => "high",
            Severity::Medium => "medium",
            Severity::Low => "low",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Severity {
    type Err = crate::error::TraceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "critical" => Ok(Severity::Critical),
            "high" => Ok(Severity::High),
            "medium" => Ok(Severity::Medium),
            "low" => Ok(Severity::Low),
            _ => Err(crate::error::TraceError::InvalidSeverity(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// GapKind
// ---------------------------------------------------------------------------

/// What is missing for a requirement. Each kind maps to a fixed severity:
/// untested code is the riskiest state, an unimplemented requirement the
/// next, missing design a documentation debt, and missing commits advisory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GapKind {
    NoTest,
    NoCode,
    NoDesign,
    NoCommit,
}

impl GapKind {
    pub fn severity(self) -> Severity {
        match self {
            GapKind::NoTest => Severity::Critical,
            GapKind::NoCode => Severity::High,
            GapKind::NoDesign => Severity::Medium,
            GapKind::NoCommit => Severity::Low,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            GapKind::NoTest => "no_test",
            GapKind::NoCode => "no_code",
            GapKind::NoDesign => "no_design",
            GapKind::NoCommit => "no_commit",
        }
    }

    pub fn describe(self) -> &'static str {
        match self {
            GapKind::NoTest => "implemented but not verified by any test",
            GapKind::NoCode => "specified but no implementation found",
            GapKind::NoDesign => "no design document mentions this requirement",
            GapKind::NoCommit => "no commit references this requirement",
        }
    }
}

impl fmt::Display for GapKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_ordering() {
        assert!(Severity::Critical < Severity::High);
        assert!(Severity::High < Severity::Medium);
        assert!(Severity::Medium < Severity::Low);
    }

    #[test]
    fn severity_roundtrip() {
        use std::str::FromStr;
        for s in ["critical", "high", "medium", "low"] {
            let sev = Severity::from_str(s).unwrap();
            assert_eq!(sev.as_str(), s);
        }
        assert!(Severity::from_str("urgent").is_err());
    }

    #[test]
    fn artifact_kind_roundtrip() {
        use std::str::FromStr;
        for kind in ArtifactKind::all() {
            let parsed = ArtifactKind::from_str(kind.as_str()).unwrap();
            assert_eq!(*kind, parsed);
        }
        // Plural accepted for the common CLI spelling.
        assert_eq!(ArtifactKind::from_str("tests").unwrap(), ArtifactKind::Test);
    }

    #[test]
    fn source_kind_covers_artifact_kinds() {
        for kind in ArtifactKind::all() {
            let source: SourceKind = (*kind).into();
            assert_eq!(source.as_str(), kind.as_str());
        }
        assert_eq!(SourceKind::Commit.as_str(), "commit");
    }

    #[test]
    fn gap_kind_severity_mapping() {
        assert_eq!(GapKind::NoTest.severity(), Severity::Critical);
        assert_eq!(GapKind::NoCode.severity(), Severity::High);
        assert_eq!(GapKind::NoDesign.severity(), Severity::Medium);
        assert_eq!(GapKind::NoCommit.severity(), Severity::Low);
    }
}
