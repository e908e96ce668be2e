//! File gathering and shared IO helpers.
//!
//! Both tree-wide passes (convert, imports) enumerate files the same way:
//! recursively under the app directory, filtered by extension, sorted for
//! deterministic output.

use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Subdirectory of the repo root that holds the migratable source tree.
pub const APP_DIR: &str = "app";

/// Directories to skip at any depth (dependency/VCS directories).
const ALWAYS_SKIP_DIRS: &[&str] = &["node_modules", ".git", ".svn", ".hg"];

/// A file whose read or write failed; the pass continues without it.
#[derive(Debug, Clone, Serialize)]
pub struct FileFailure {
    /// Repo-relative path.
    pub file: String,
    pub error: String,
}

/// Resolve and validate the app tree under a repo root.
/// A missing app directory is fatal before any file is touched.
pub fn resolve_app_root(root: &Path) -> Result<PathBuf> {
    let app_root = root.join(APP_DIR);
    if !app_root.is_dir() {
        return Err(Error::source_root_not_found(&app_root));
    }
    Ok(app_root)
}

/// Recursively gather files under `dir` with one of the given extensions,
/// sorted by path.
pub fn gather_files(dir: &Path, extensions: &[&str]) -> Vec<PathBuf> {
    let mut files = Vec::new();
    walk_recursive(dir, extensions, &mut files);
    files.sort();
    files
}

fn walk_recursive(dir: &Path, extensions: &[&str], files: &mut Vec<PathBuf>) {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return;
    };

    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default();
            if ALWAYS_SKIP_DIRS.contains(&name.as_str()) {
                continue;
            }
            walk_recursive(&path, extensions, files);
        } else if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
            if extensions.contains(&ext) {
                files.push(path);
            }
        }
    }
}

/// Path relative to `root` for reporting (falls back to the full path).
pub fn relative_to(path: &Path, root: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .to_string_lossy()
        .to_string()
}

pub fn read_file(path: &Path) -> Result<String> {
    std::fs::read_to_string(path)
        .map_err(|e| Error::internal_io(e.to_string(), Some(format!("read {}", path.display()))))
}

pub fn write_file(path: &Path, content: &str) -> Result<()> {
    std::fs::write(path, content)
        .map_err(|e| Error::internal_io(e.to_string(), Some(format!("write {}", path.display()))))
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gather_files_filters_and_sorts() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("b")).unwrap();
        std::fs::write(dir.path().join("b/inner.js"), "x").unwrap();
        std::fs::write(dir.path().join("a.js"), "x").unwrap();
        std::fs::write(dir.path().join("notes.md"), "x").unwrap();

        let files = gather_files(dir.path(), &["js"]);
        let names: Vec<String> = files
            .iter()
            .map(|f| relative_to(f, dir.path()))
            .collect();

        assert_eq!(names, vec!["a.js".to_string(), "b/inner.js".to_string()]);
    }

    #[test]
    fn gather_files_skips_node_modules() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("node_modules/pkg")).unwrap();
        std::fs::write(dir.path().join("node_modules/pkg/index.js"), "x").unwrap();
        std::fs::write(dir.path().join("main.js"), "x").unwrap();

        let files = gather_files(dir.path(), &["js"]);
        assert_eq!(files.len(), 1);
        assert!(files[0].ends_with("main.js"));
    }

    #[test]
    fn resolve_app_root_requires_directory() {
        let dir = tempfile::tempdir().unwrap();

        let err = resolve_app_root(dir.path()).unwrap_err();
        assert_eq!(err.code, crate::ErrorCode::SourceRootNotFound);

        std::fs::create_dir_all(dir.path().join(APP_DIR)).unwrap();
        let app_root = resolve_app_root(dir.path()).unwrap();
        assert!(app_root.ends_with(APP_DIR));
    }
}
