use crate::error::{Result, TraceError};
use crate::paths;
use crate::scan::{ScanConfig, DEFAULT_COMMIT_LIMIT};
use crate::types::ArtifactKind;
use serde::{Deserialize, Serialize};
use std::path::Path;

// ---------------------------------------------------------------------------
// KindRule
// ---------------------------------------------------------------------------

/// Where to look for one artifact kind and which leaf names count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KindRule {
    #[serde(default)]
    pub roots: Vec<String>,
    /// Leaf-name globs; empty admits every file under the roots.
    #[serde(default)]
    pub include: Vec<String>,
    #[serde(default)]
    pub exclude: Vec<String>,
}

fn default_design_rule() -> KindRule {
    KindRule {
        roots: vec!["docs".to_string()],
        include: vec!["*.md".to_string()],
        exclude: Vec::new(),
    }
}

fn default_code_rule() -> KindRule {
    KindRule {
        roots: vec!["src".to_string()],
        include: Vec::new(),
        exclude: Vec::new(),
    }
}

fn default_tests_rule() -> KindRule {
    KindRule {
        roots: vec!["tests".to_string()],
        include: Vec::new(),
        exclude: Vec::new(),
    }
}

// ---------------------------------------------------------------------------
// ScanSection
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanSection {
    #[serde(default = "default_design_rule")]
    pub design: KindRule,
    #[serde(default = "default_code_rule")]
    pub code: KindRule,
    #[serde(default = "default_tests_rule")]
    pub tests: KindRule,
    #[serde(default = "default_excluded_dirs")]
    pub excluded_dirs: Vec<String>,
    #[serde(default = "default_commit_limit")]
    pub commit_limit: usize,
}

fn default_excluded_dirs() -> Vec<String> {
    ["node_modules", "target", "dist", "build", "vendor"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_commit_limit() -> usize {
    DEFAULT_COMMIT_LIMIT
}

impl Default for ScanSection {
    fn default() -> Self {
        Self {
            design: default_design_rule(),
            code: default_code_rule(),
            tests: default_tests_rule(),
            excluded_dirs: default_excluded_dirs(),
            commit_limit: default_commit_limit(),
        }
    }
}

// ---------------------------------------------------------------------------
// StorageSection
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageSection {
    #[serde(default = "default_storage_dir")]
    pub dir: String,
}

fn default_storage_dir() -> String {
    paths::MATRICES_DIR.to_string()
}

impl Default for StorageSection {
    fn default() -> Self {
        Self {
            dir: default_storage_dir(),
        }
    }
}

// ---------------------------------------------------------------------------
// Config (top-level)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub scan: ScanSection,
    #[serde(default)]
    pub storage: StorageSection,
}

fn default_version() -> u32 {
    1
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    pub fn new() -> Self {
        Self {
            version: 1,
            scan: ScanSection::default(),
            storage: StorageSection::default(),
        }
    }

    pub fn load(root: &Path) -> Result<Self> {
        let path = paths::config_path(root);
        if !path.exists() {
            return Err(TraceError::NotInitialized);
        }
        let data = std::fs::read_to_string(&path)?;
        let cfg: Config = serde_yaml::from_str(&data)?;
        Ok(cfg)
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        let path = paths::config_path(root);
        let data = serde_yaml::to_string(self)?;
        crate::io::atomic_write(&path, data.as_bytes())
    }

    pub fn rule(&self, kind: ArtifactKind) -> &KindRule {
        match kind {
            ArtifactKind::Design => &self.scan.design,
            ArtifactKind::Code => &self.scan.code,
            ArtifactKind::Test => &self.scan.tests,
        }
    }

    /// Walker options for one kind: the kind's globs plus the shared
    /// excluded-directory names.
    pub fn scan_config(&self, kind: ArtifactKind) -> ScanConfig {
        let rule = self.rule(kind);
        ScanConfig {
            include_globs: rule.include.clone(),
            exclude_globs: rule.exclude.clone(),
            excluded_dir_names: self.scan.excluded_dirs.clone(),
        }
    }

    pub fn storage_dir(&self, root: &Path) -> std::path::PathBuf {
        root.join(&self.storage.dir)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
