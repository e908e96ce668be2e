//! Conversion engine: move a JavaScript tree onto TypeScript file types.
//!
//! For every `.js` file under the app tree, this pass:
//! 1. Classifies it as `.ts` or `.tsx` (directory placement first, then JSX
//!    signatures in the content)
//! 2. Prepends a `// @ts-nocheck` banner unless one is already present
//! 3. Moves the file to the new extension, skipping any file whose target
//!    already exists on disk
//!
//! Detection and mutation are separate steps: `generate_conversions` only
//! reads, `apply_conversions` writes the planned moves.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::error::Result;
use crate::files::{self, FileFailure};

/// Path segments (relative to the app root) that always classify as `.tsx`.
const FORCE_TSX_SEGMENTS: &[&str] = &["components", "screens", "templates"];

/// Banner disabling type checking on freshly converted files.
const TS_NOCHECK_BANNER: &str = "// @ts-nocheck\n\n";

// JSX signatures. Tag names start with a letter; any one match classifies
// the file as `.tsx`.
static CLOSING_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"</\s*[A-Za-z][A-Za-z0-9]*(\s|>)").unwrap());
static SELF_CLOSING_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<\s*[A-Za-z][A-Za-z0-9]*(\s[^>]*?)?/>").unwrap());
static OPEN_TAG_WITH_ATTRS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<\s*[A-Za-z][A-Za-z0-9]*\s[^>]*>").unwrap());

// ============================================================================
// Types
// ============================================================================

/// Extension a source file converts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetExt {
    Ts,
    Tsx,
}

impl TargetExt {
    pub fn as_str(&self) -> &'static str {
        match self {
            TargetExt::Ts => "ts",
            TargetExt::Tsx => "tsx",
        }
    }
}

/// Per-file outcome of a conversion pass.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum FileOutcome {
    /// File moves to the target extension.
    Converted {
        from: String,
        to: String,
        target: TargetExt,
    },
    /// Target already exists on disk; the source is left untouched.
    Skipped { from: String, to: String },
    /// Name does not end in `.js` (backup artifacts and the like).
    NotApplicable { file: String },
}

/// A planned file move with its rewritten content.
#[derive(Debug, Clone)]
struct PlannedMove {
    from: PathBuf,
    to: PathBuf,
    from_rel: String,
    to_rel: String,
    new_content: String,
}

/// Result of one conversion pass over the app tree.
#[derive(Debug, Clone, Serialize)]
pub struct ConvertResult {
    pub files: Vec<FileOutcome>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<FileFailure>,
    /// Files moved (planned moves until `applied`).
    pub converted: usize,
    pub skipped: usize,
    pub not_applicable: usize,
    /// Whether changes were written to disk.
    pub applied: bool,
    #[serde(skip)]
    moves: Vec<PlannedMove>,
}

// ============================================================================
// Classification
// ============================================================================

/// Decide the target extension for one file. Directory placement wins over
/// content sniffing: anything under a forced segment is presentation code.
pub fn classify(relative: &Path, content: &str) -> TargetExt {
    for segment in relative.iter() {
        let segment = segment.to_string_lossy();
        if FORCE_TSX_SEGMENTS.contains(&segment.as_ref()) {
            return TargetExt::Tsx;
        }
    }
    if looks_like_jsx(content) {
        return TargetExt::Tsx;
    }
    TargetExt::Ts
}

fn looks_like_jsx(content: &str) -> bool {
    CLOSING_TAG.is_match(content)
        || SELF_CLOSING_TAG.is_match(content)
        || OPEN_TAG_WITH_ATTRS.is_match(content)
}

/// Prepend the banner unless the content already carries one. Both comment
/// styles count, so reruns never stack banners.
pub fn ensure_banner(content: &str) -> String {
    let stripped = content.trim_start();
    if stripped.starts_with("// @ts-nocheck") || stripped.starts_with("/* @ts-nocheck") {
        return content.to_string();
    }
    format!("{}{}", TS_NOCHECK_BANNER, content)
}

// ============================================================================
// Plan and apply
// ============================================================================

/// Scan the app tree under `root` and plan every conversion. Nothing is
/// written. Per-file read failures are recorded and the scan continues.
pub fn generate_conversions(root: &Path) -> Result<ConvertResult> {
    let app_root = files::resolve_app_root(root)?;
    log_status!("convert", "Scanning {} for .js sources...", app_root.display());

    let sources = files::gather_files(&app_root, &["js"]);

    let mut result = ConvertResult {
        files: Vec::new(),
        failures: Vec::new(),
        converted: 0,
        skipped: 0,
        not_applicable: 0,
        applied: false,
        moves: Vec::new(),
    };

    for path in &sources {
        let from_rel = files::relative_to(path, root);

        let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
        if !name.ends_with(".js") {
            result.not_applicable += 1;
            result.files.push(FileOutcome::NotApplicable { file: from_rel });
            continue;
        }

        let content = match files::read_file(path) {
            Ok(content) => content,
            Err(e) => {
                log_status!("convert", "Failed to read {}: {}", from_rel, e);
                result.failures.push(FileFailure {
                    file: from_rel,
                    error: e.to_string(),
                });
                continue;
            }
        };

        let rel_to_app = path.strip_prefix(&app_root).unwrap_or(path);
        let target_ext = classify(rel_to_app, &content);
        let target = path.with_extension(target_ext.as_str());
        let to_rel = files::relative_to(&target, root);

        if target.exists() {
            log_status!("convert", "Skip {} (target {} exists)", from_rel, to_rel);
            result.skipped += 1;
            result.files.push(FileOutcome::Skipped {
                from: from_rel,
                to: to_rel,
            });
            continue;
        }

        result.converted += 1;
        result.moves.push(PlannedMove {
            from: path.clone(),
            to: target,
            from_rel: from_rel.clone(),
            to_rel: to_rel.clone(),
            new_content: ensure_banner(&content),
        });
        result.files.push(FileOutcome::Converted {
            from: from_rel,
            to: to_rel,
            target: target_ext,
        });
    }

    Ok(result)
}

/// Apply planned conversions to disk: write the new path, then remove the
/// original. A failed move is recorded per file and skipped, and its
/// `Converted` record is dropped; `converted` ends up as the number of
/// files actually moved.
pub fn apply_conversions(result: &mut ConvertResult) {
    let mut applied = 0;
    let mut failed: Vec<String> = Vec::new();

    for mv in &result.moves {
        if let Err(e) = std::fs::write(&mv.to, &mv.new_content) {
            log_status!("convert", "Failed to write {}: {}", mv.to_rel, e);
            result.failures.push(FileFailure {
                file: mv.to_rel.clone(),
                error: e.to_string(),
            });
            failed.push(mv.from_rel.clone());
            continue;
        }
        if let Err(e) = std::fs::remove_file(&mv.from) {
            log_status!("convert", "Failed to remove {}: {}", mv.from_rel, e);
            result.failures.push(FileFailure {
                file: mv.from_rel.clone(),
                error: e.to_string(),
            });
            failed.push(mv.from_rel.clone());
            continue;
        }
        log_status!("convert", "Renamed {} -> {}", mv.from_rel, mv.to_rel);
        applied += 1;
    }

    if !failed.is_empty() {
        result
            .files
            .retain(|o| !matches!(o, FileOutcome::Converted { from, .. } if failed.contains(from)));
    }

    result.converted = applied;
    result.applied = true;
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_forces_tsx_for_presentation_dirs() {
        assert_eq!(
            classify(Path::new("components/Button.js"), "module.exports = 1;"),
            TargetExt::Tsx
        );
        assert_eq!(
            classify(Path::new("screens/settings/Index.js"), "export default 1;"),
            TargetExt::Tsx
        );
        assert_eq!(
            classify(Path::new("templates/card.js"), "export default 1;"),
            TargetExt::Tsx
        );
    }

    #[test]
    fn classify_detects_closing_tag() {
        let content = "export default () => <View>hello</View>;";
        assert_eq!(classify(Path::new("util/hello.js"), content), TargetExt::Tsx);
    }

    #[test]
    fn classify_detects_self_closing_tag() {
        let content = "const spinner = <ActivityIndicator size=\"small\" />;";
        assert_eq!(classify(Path::new("util/spin.js"), content), TargetExt::Tsx);
    }

    #[test]
    fn classify_detects_open_tag_with_attrs() {
        let content = "return <Pressable onPress={save}>;";
        assert_eq!(classify(Path::new("util/press.js"), content), TargetExt::Tsx);
    }

    #[test]
    fn classify_plain_module_is_ts() {
        let content = "const sum = (a, b) => a + b;\nmodule.exports = { sum };\n";
        assert_eq!(classify(Path::new("util/math.js"), content), TargetExt::Ts);
    }

    #[test]
    fn ensure_banner_prepends_once() {
        let banner_applied = ensure_banner("const a = 1;\n");
        assert_eq!(banner_applied, "// @ts-nocheck\n\nconst a = 1;\n");
        assert_eq!(ensure_banner(&banner_applied), banner_applied);
    }

    #[test]
    fn ensure_banner_respects_block_comment() {
        let content = "/* @ts-nocheck */\nconst a = 1;\n";
        assert_eq!(ensure_banner(content), content);
    }

    #[test]
    fn ensure_banner_sees_through_leading_whitespace() {
        let content = "\n\n// @ts-nocheck\nconst a = 1;\n";
        assert_eq!(ensure_banner(content), content);
    }

    #[test]
    fn generate_is_dry_run() {
        let dir = tempfile::tempdir().unwrap();
        let app = dir.path().join("app/components");
        std::fs::create_dir_all(&app).unwrap();
        std::fs::write(app.join("Button.js"), "module.exports = 1;\n").unwrap();

        let result = generate_conversions(dir.path()).unwrap();
        assert_eq!(result.converted, 1);
        assert!(!result.applied);

        // Nothing moved yet
        assert!(app.join("Button.js").exists());
        assert!(!app.join("Button.tsx").exists());
    }

    #[test]
    fn apply_moves_files_with_banner() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("app/components")).unwrap();
        std::fs::create_dir_all(dir.path().join("app/util")).unwrap();
        std::fs::write(
            dir.path().join("app/components/Button.js"),
            "module.exports = 1;\n",
        )
        .unwrap();
        std::fs::write(dir.path().join("app/util/math.js"), "const a = 1;\n").unwrap();

        let mut result = generate_conversions(dir.path()).unwrap();
        apply_conversions(&mut result);

        assert!(result.applied);
        assert_eq!(result.converted, 2);
        assert!(!dir.path().join("app/components/Button.js").exists());
        assert!(!dir.path().join("app/util/math.js").exists());

        let button = std::fs::read_to_string(dir.path().join("app/components/Button.tsx")).unwrap();
        assert_eq!(button, "// @ts-nocheck\n\nmodule.exports = 1;\n");
        let math = std::fs::read_to_string(dir.path().join("app/util/math.ts")).unwrap();
        assert_eq!(math, "// @ts-nocheck\n\nconst a = 1;\n");
    }

    #[cfg(unix)]
    #[test]
    fn non_utf8_name_is_not_applicable() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("app")).unwrap();
        // The walker sees extension "js", but the full name is not valid UTF-8.
        let odd = dir.path().join("app").join(OsStr::from_bytes(b"\x80bad.js"));
        std::fs::write(&odd, "const a = 1;\n").unwrap();
        std::fs::write(dir.path().join("app/good.js"), "const b = 2;\n").unwrap();

        let mut result = generate_conversions(dir.path()).unwrap();
        assert_eq!(result.not_applicable, 1);
        assert_eq!(result.converted, 1);

        apply_conversions(&mut result);
        assert_eq!(std::fs::read_to_string(&odd).unwrap(), "const a = 1;\n");
        assert!(dir.path().join("app/good.ts").exists());
    }

    #[test]
    fn collision_skips_without_touching_either_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("app")).unwrap();
        std::fs::write(dir.path().join("app/x.js"), "old\n").unwrap();
        std::fs::write(dir.path().join("app/x.ts"), "new\n").unwrap();

        let mut result = generate_conversions(dir.path()).unwrap();
        assert_eq!(result.skipped, 1);
        assert_eq!(result.converted, 0);

        apply_conversions(&mut result);
        assert_eq!(
            std::fs::read_to_string(dir.path().join("app/x.js")).unwrap(),
            "old\n"
        );
        assert_eq!(
            std::fs::read_to_string(dir.path().join("app/x.ts")).unwrap(),
            "new\n"
        );
    }

    #[test]
    fn failed_move_drops_its_outcome_record() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("app")).unwrap();
        std::fs::write(dir.path().join("app/a.js"), "const a = 1;\n").unwrap();
        std::fs::write(dir.path().join("app/b.js"), "const b = 2;\n").unwrap();

        let mut result = generate_conversions(dir.path()).unwrap();
        assert_eq!(result.converted, 2);
        // Break the first planned move: its target directory does not exist.
        result.moves[0].to = dir.path().join("app/missing/a.ts");

        apply_conversions(&mut result);

        assert_eq!(result.converted, 1);
        assert_eq!(result.failures.len(), 1);
        assert_eq!(result.files.len(), 1);
        match &result.files[0] {
            FileOutcome::Converted { from, to, .. } => {
                assert_eq!(from, "app/b.js");
                assert_eq!(to, "app/b.ts");
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
        // The failed source file is untouched.
        assert!(dir.path().join("app/a.js").exists());
        assert!(dir.path().join("app/b.ts").exists());
    }

    #[test]
    fn rerun_after_apply_finds_nothing() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("app")).unwrap();
        std::fs::write(dir.path().join("app/a.js"), "const a = 1;\n").unwrap();

        let mut first = generate_conversions(dir.path()).unwrap();
        apply_conversions(&mut first);
        assert_eq!(first.converted, 1);

        let second = generate_conversions(dir.path()).unwrap();
        assert_eq!(second.converted, 0);
        assert_eq!(second.skipped, 0);
        assert_eq!(second.files.len(), 0);
    }

    #[test]
    fn missing_app_dir_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let err = generate_conversions(dir.path()).unwrap_err();
        assert_eq!(err.code, crate::ErrorCode::SourceRootNotFound);
    }
}
