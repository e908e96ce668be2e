//! Reference rewriter: strip `.js` from local import specifiers.
//!
//! TypeScript resolves extensionless specifiers, so after conversion every
//! `'./foo.js'` style reference in the tree must lose its suffix. Four
//! reference shapes are rewritten; everything around the suffix survives
//! character for character.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::error::Result;
use crate::files::{self, FileFailure};

// Reference shapes, applied in this order. The suffix must sit immediately
// before the closing quote, and specifiers with a `?` (query-style imports)
// are never touched. Each rewrite drops group 3 and keeps the rest.
static FROM_SPECIFIER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(from\s+['"])([^'"?]+?)(\.js)(['"])"#).unwrap());
static IMPORT_FROM_SPECIFIER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(import\s+[^;]+?\s+from\s+['"])([^'"?]+?)(\.js)(['"])"#).unwrap());
static REQUIRE_CALL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(require\(\s*['"])([^'"?]+?)(\.js)(['"]\s*\))"#).unwrap());
static DYNAMIC_IMPORT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(import\(\s*['"])([^'"?]+?)(\.js)(['"]\s*\))"#).unwrap());

// ============================================================================
// Types
// ============================================================================

/// Per-file rewrite record.
#[derive(Debug, Clone, Serialize)]
pub struct FileRewrite {
    /// Repo-relative path.
    pub file: String,
    pub replacements: usize,
}

/// A planned write-back for one rewritten file.
#[derive(Debug, Clone)]
struct PlannedWrite {
    path: PathBuf,
    file_rel: String,
    new_content: String,
}

/// Result of one rewrite pass over the app tree.
#[derive(Debug, Clone, Serialize)]
pub struct RewriteResult {
    pub edits: Vec<FileRewrite>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<FileFailure>,
    pub files_scanned: usize,
    /// Files rewritten (planned writes until `applied`).
    pub files_updated: usize,
    pub total_replacements: usize,
    /// Whether changes were written to disk.
    pub applied: bool,
    #[serde(skip)]
    writes: Vec<PlannedWrite>,
}

// ============================================================================
// Rewriting
// ============================================================================

/// Cheap pre-check: every rewritable reference ends `.js` right before a
/// quote, so a file without that byte sequence cannot match.
pub fn has_js_references(content: &str) -> bool {
    content.contains(".js'") || content.contains(".js\"")
}

/// Strip `.js` suffixes from all four reference shapes. Returns the new
/// content and the number of references rewritten.
pub fn strip_js_suffixes(content: &str) -> (String, usize) {
    let mut text = content.to_string();
    let mut replacements = 0;

    for pattern in [
        &*FROM_SPECIFIER,
        &*IMPORT_FROM_SPECIFIER,
        &*REQUIRE_CALL,
        &*DYNAMIC_IMPORT,
    ] {
        let count = pattern.find_iter(&text).count();
        if count == 0 {
            continue;
        }
        replacements += count;
        text = pattern.replace_all(&text, "${1}${2}${4}").into_owned();
    }

    (text, replacements)
}

/// Scan `.ts`/`.tsx` files under `root` and plan every rewrite. Nothing is
/// written. Per-file read failures are recorded and the scan continues.
pub fn generate_rewrites(root: &Path) -> Result<RewriteResult> {
    let app_root = files::resolve_app_root(root)?;
    log_status!("imports", "Scanning {} for .js specifiers...", app_root.display());

    let sources = files::gather_files(&app_root, &["ts", "tsx"]);

    let mut result = RewriteResult {
        edits: Vec::new(),
        failures: Vec::new(),
        files_scanned: 0,
        files_updated: 0,
        total_replacements: 0,
        applied: false,
        writes: Vec::new(),
    };

    for path in &sources {
        let file_rel = files::relative_to(path, root);
        result.files_scanned += 1;

        let content = match files::read_file(path) {
            Ok(content) => content,
            Err(e) => {
                log_status!("imports", "Failed to read {}: {}", file_rel, e);
                result.failures.push(FileFailure {
                    file: file_rel,
                    error: e.to_string(),
                });
                continue;
            }
        };

        if !has_js_references(&content) {
            continue;
        }

        let (new_content, replacements) = strip_js_suffixes(&content);
        if replacements == 0 {
            continue;
        }

        result.total_replacements += replacements;
        result.edits.push(FileRewrite {
            file: file_rel.clone(),
            replacements,
        });
        result.writes.push(PlannedWrite {
            path: path.clone(),
            file_rel,
            new_content,
        });
    }

    result.files_updated = result.edits.len();
    Ok(result)
}

/// Write planned rewrites back to disk. Write failures are recorded per
/// file and skipped; `files_updated` ends up as the number actually written.
pub fn apply_rewrites(result: &mut RewriteResult) {
    let mut applied = 0;

    for write in &result.writes {
        if let Err(e) = std::fs::write(&write.path, &write.new_content) {
            log_status!("imports", "Failed to write {}: {}", write.file_rel, e);
            result.failures.push(FileFailure {
                file: write.file_rel.clone(),
                error: e.to_string(),
            });
            continue;
        }
        log_status!("imports", "Updated {}", write.file_rel);
        applied += 1;
    }

    result.files_updated = applied;
    result.applied = true;
}

// ============================================================================
// Tests
// ============================================================================
