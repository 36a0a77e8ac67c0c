use reqtrace_core::paths;
use std::path::{Path, PathBuf};

/// Resolve the project root directory.
///
/// Priority:
/// 1. `--root` flag / `REQTRACE_ROOT` env var (passed in as `explicit`)
/// 2. Nearest ancestor of `cwd` containing `.reqtrace/`
/// 3. Nearest ancestor of `cwd` containing `.git/`
/// 4. `cwd` itself
pub fn resolve_root(explicit: Option<&Path>) -> PathBuf {
    if let Some(p) = explicit {
        return p.to_path_buf();
    }

    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    find_up(&cwd, paths::REQTRACE_DIR)
        .or_else(|| find_up(&cwd, ".git"))
        .unwrap_or(cwd)
}

/// Nearest ancestor of `start` (inclusive) containing `marker` as a directory.
fn find_up(start: &Path, marker: &str) -> Option<PathBuf> {
    start
        .ancestors()
        .find(|dir| dir.join(marker).is_dir())
        .map(Path::to_path_buf)
}
