use crate::error::{Result, TraceError};
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// Directory constants
// ---------------------------------------------------------------------------

pub const REQTRACE_DIR: &str = ".reqtrace";
pub const MATRICES_DIR: &str = ".reqtrace/matrices";

pub const CONFIG_FILE: &str = ".reqtrace/config.yaml";
pub const CATALOG_FILE: &str = ".reqtrace/requirements.yaml";

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

pub fn reqtrace_dir(root: &Path) -> PathBuf {
    root.join(REQTRACE_DIR)
}

pub fn matrices_dir(root: &Path) -> PathBuf {
    root.join(MATRICES_DIR)
}

pub fn config_path(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE)
}

pub fn catalog_path(root: &Path) -> PathBuf {
    root.join(CATALOG_FILE)
}

// ---------------------------------------------------------------------------
// Feature-id validation
// ---------------------------------------------------------------------------

/// Matrix files are named `<feature-id>-<date>.yaml`, so a feature id must
/// stay a single path component.
pub fn validate_feature_id(id: &str) -> Result<()> {
    if id.is_empty() || id.contains('/') || id.contains('\\') {
        return Err(TraceError::InvalidFeatureId(id.to_string()));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
