use crate::error::Result;
use crate::gaps::summarize;
use crate::id;
use crate::matrix::{LinkBucket, TraceMatrix, DEFAULT_VERSION};
use crate::paths;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

/// One authored requirement. Only the id matters to the engine; the title is
/// for humans reading the file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

/// The optional `.reqtrace/requirements.yaml` file. Requirements listed here
/// appear in every scanned matrix even before any artifact mentions them,
/// which is how never-started work shows up as gaps.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    pub requirements: Vec<CatalogEntry>,
}

impl Catalog {
    /// `Ok(None)` when the project has no catalog; a present but unparsable
    /// catalog is an error, since it is a hand-authored file.
    pub fn load(root: &Path) -> Result<Option<Self>> {
        let path = paths::catalog_path(root);
        if !path.exists() {
            return Ok(None);
        }
        let data = std::fs::read_to_string(&path)?;
        let catalog: Catalog = serde_yaml::from_str(&data)?;
        Ok(Some(catalog))
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        let path = paths::catalog_path(root);
        let data = serde_yaml::to_string(self)?;
        crate::io::atomic_write(&path, data.as_bytes())
    }

    /// A matrix with one empty row per catalogued requirement, ready to seed
    /// a build. Entries that do not parse as a requirement id are dropped
    /// with a warning rather than polluting the matrix.
    pub fn seed_matrix(&self) -> TraceMatrix {
        let mut requirements: BTreeMap<String, LinkBucket> = BTreeMap::new();
        for entry in &self.requirements {
            if !id::is_requirement_id(&entry.id) {
                tracing::warn!(id = %entry.id, "catalog entry is not a recognized requirement id");
                continue;
            }
            requirements.entry(entry.id.clone()).or_default();
        }
        let summary = summarize(&requirements);
        TraceMatrix {
            version: DEFAULT_VERSION.to_string(),
            generated_at: Utc::now(),
            requirements,
            summary,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
