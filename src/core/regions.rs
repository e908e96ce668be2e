//! Region excision: locate and delete labeled line regions from a file.
//!
//! Each region is found by scanning for a start marker line, then closed by
//! one of three end conditions:
//! - `literal`: a fixed text fragment on a later line
//! - `guarded`: a fixed text fragment, accepted only once a guard fragment
//!   has appeared in the region body
//! - `balanced`: delimiter counting returns to depth zero
//!
//! Located regions are sorted and removed in a single retain pass, so every
//! untouched line survives byte for byte. A start marker whose end condition
//! is never satisfied is a hard error; a region whose start marker never
//! appears is reported and skipped.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::files;

// ============================================================================
// Types
// ============================================================================

/// How a region, once its start marker is found, is closed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EndCondition {
    /// The first later line containing `text` closes the region.
    Literal { text: String },
    /// As `literal`, but a candidate line only closes the region once
    /// `guard` has appeared in the body (start line through the candidate
    /// line, concatenated).
    Guarded { text: String, guard: String },
    /// Per-line `open`/`close` counting starts on the start line; the first
    /// later line where the running count returns to zero closes the region.
    Balanced { open: char, close: char },
}

impl EndCondition {
    pub fn kind(&self) -> &'static str {
        match self {
            EndCondition::Literal { .. } => "literal",
            EndCondition::Guarded { .. } => "guarded",
            EndCondition::Balanced { .. } => "balanced",
        }
    }
}

/// One region to locate and excise.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegionSpec {
    /// Human-readable name used in reports and logs.
    pub label: String,
    /// Text fragment identifying the start line.
    pub start: String,
    pub end: EndCondition,
}

impl RegionSpec {
    /// Reject markers that would match every line, and delimiter pairs that
    /// can never change the depth.
    pub fn validate(&self) -> Result<()> {
        if self.start.is_empty() {
            return Err(Error::validation_invalid_argument(
                "start",
                format!("Region '{}' has an empty start marker", self.label),
            ));
        }
        match &self.end {
            EndCondition::Literal { text } | EndCondition::Guarded { text, .. }
                if text.is_empty() =>
            {
                Err(Error::validation_invalid_argument(
                    "end.text",
                    format!("Region '{}' has an empty end marker", self.label),
                ))
            }
            EndCondition::Guarded { guard, .. } if guard.is_empty() => {
                Err(Error::validation_invalid_argument(
                    "end.guard",
                    format!("Region '{}' has an empty guard", self.label),
                ))
            }
            EndCondition::Balanced { open, close } if open == close => {
                Err(Error::validation_invalid_argument(
                    "end",
                    format!("Region '{}' uses the same open and close delimiter", self.label),
                ))
            }
            _ => Ok(()),
        }
    }
}

/// A located region as a half-open line interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineRange {
    pub start: usize,
    pub end: usize,
}

/// Helper for `skip_serializing_if` on zero-value usize fields.
fn is_zero(v: &usize) -> bool {
    *v == 0
}

/// Per-region location report.
#[derive(Debug, Clone, Serialize)]
pub struct RegionReport {
    pub label: String,
    pub found: bool,
    /// 1-based inclusive line numbers when found.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_line: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_line: Option<usize>,
    #[serde(skip_serializing_if = "is_zero")]
    pub lines_removed: usize,
}

/// Planned excision over one file's content.
#[derive(Debug, Clone)]
pub struct Excision {
    pub reports: Vec<RegionReport>,
    /// Located intervals, sorted by start.
    pub ranges: Vec<LineRange>,
    pub new_content: String,
    pub original_lines: usize,
    pub remaining_lines: usize,
}

/// Result of an excision pass over one file.
#[derive(Debug, Clone, Serialize)]
pub struct ExciseResult {
    pub file: String,
    pub regions: Vec<RegionReport>,
    pub regions_found: usize,
    pub original_lines: usize,
    pub remaining_lines: usize,
    pub lines_removed: usize,
    /// Whether changes were written to disk.
    pub applied: bool,
    #[serde(skip)]
    path: PathBuf,
    #[serde(skip)]
    new_content: String,
}

// ============================================================================
// Locator state machine
// ============================================================================

/// Scan state for a single region.
#[derive(Debug)]
enum ScanState {
    SearchingStart,
    SearchingEnd { start: usize },
    Done(LineRange),
}

/// Per-variant end-condition state, fed one line at a time.
enum EndPredicate<'a> {
    Literal {
        text: &'a str,
    },
    Guarded {
        text: &'a str,
        guard: &'a str,
        guard_seen: bool,
        body: String,
    },
    Balanced {
        open: char,
        close: char,
        depth: i64,
    },
}

impl<'a> EndPredicate<'a> {
    fn new(cond: &'a EndCondition) -> Self {
        match cond {
            EndCondition::Literal { text } => EndPredicate::Literal { text: text.as_str() },
            EndCondition::Guarded { text, guard } => EndPredicate::Guarded {
                text: text.as_str(),
                guard: guard.as_str(),
                guard_seen: false,
                body: String::new(),
            },
            EndCondition::Balanced { open, close } => EndPredicate::Balanced {
                open: *open,
                close: *close,
                depth: 0,
            },
        }
    }

    /// Feed one line; `at_start` marks the line carrying the start marker.
    /// Returns true when this line closes the region.
    fn observe(&mut self, line: &str, at_start: bool) -> bool {
        match self {
            EndPredicate::Literal { text } => !at_start && line.contains(*text),
            EndPredicate::Guarded {
                text,
                guard,
                guard_seen,
                body,
            } => {
                if !*guard_seen {
                    body.push_str(line);
                    if body.contains(*guard) {
                        *guard_seen = true;
                    }
                }
                !at_start && *guard_seen && line.contains(*text)
            }
            EndPredicate::Balanced { open, close, depth } => {
                *depth += count_char(line, *open) as i64 - count_char(line, *close) as i64;
                !at_start && *depth == 0
            }
        }
    }
}

fn count_char(line: &str, c: char) -> usize {
    line.chars().filter(|&ch| ch == c).count()
}

/// Locate one region in `lines`. `Ok(None)` when the start marker never
/// appears; an error when the start is found but the end condition is never
/// satisfied before the file runs out.
pub fn locate_region(lines: &[&str], spec: &RegionSpec, file: &str) -> Result<Option<LineRange>> {
    let mut predicate = EndPredicate::new(&spec.end);
    let mut state = ScanState::SearchingStart;

    for (i, line) in lines.iter().enumerate() {
        state = match state {
            ScanState::SearchingStart => {
                if line.contains(&spec.start) {
                    predicate.observe(line, true);
                    ScanState::SearchingEnd { start: i }
                } else {
                    ScanState::SearchingStart
                }
            }
            ScanState::SearchingEnd { start } => {
                if predicate.observe(line, false) {
                    ScanState::Done(LineRange { start, end: i + 1 })
                } else {
                    ScanState::SearchingEnd { start }
                }
            }
            done @ ScanState::Done(_) => done,
        };
        if matches!(state, ScanState::Done(_)) {
            break;
        }
    }

    match state {
        ScanState::SearchingStart => Ok(None),
        ScanState::SearchingEnd { start } => Err(Error::region_unterminated(
            &spec.label,
            file,
            start + 1,
            spec.end.kind(),
        )),
        ScanState::Done(range) => Ok(Some(range)),
    }
}

// ============================================================================
// Excision
// ============================================================================

/// Locate every region of `plan` in `content` and build the retained output.
/// Splitting on `\n` keeps `\r` and the trailing-newline structure intact,
/// so retained lines round-trip byte for byte.
pub fn excise_content(content: &str, plan: &[RegionSpec], file: &str) -> Result<Excision> {
    let lines: Vec<&str> = content.split('\n').collect();

    let mut reports = Vec::new();
    let mut ranges: Vec<LineRange> = Vec::new();

    for spec in plan {
        spec.validate()?;
        match locate_region(&lines, spec, file)? {
            Some(range) => {
                log_status!(
                    "excise",
                    "Found {}: lines {}-{}",
                    spec.label,
                    range.start + 1,
                    range.end
                );
                reports.push(RegionReport {
                    label: spec.label.clone(),
                    found: true,
                    start_line: Some(range.start + 1),
                    end_line: Some(range.end),
                    lines_removed: range.end - range.start,
                });
                ranges.push(range);
            }
            None => {
                log_status!("excise", "No match for {}", spec.label);
                reports.push(RegionReport {
                    label: spec.label.clone(),
                    found: false,
                    start_line: None,
                    end_line: None,
                    lines_removed: 0,
                });
            }
        }
    }

    ranges.sort_by_key(|r| r.start);

    // Retain pass: a line survives unless some interval covers it, which
    // also collapses overlapping intervals.
    let retained: Vec<&str> = lines
        .iter()
        .enumerate()
        .filter(|(i, _)| !ranges.iter().any(|r| r.start <= *i && *i < r.end))
        .map(|(_, line)| *line)
        .collect();

    let remaining_lines = retained.len();
    Ok(Excision {
        reports,
        ranges,
        new_content: retained.join("\n"),
        original_lines: lines.len(),
        remaining_lines,
    })
}

/// Read `path`, locate every region of `plan`, and plan the excision.
/// Nothing is written.
pub fn generate_excision(path: &Path, plan: &[RegionSpec]) -> Result<ExciseResult> {
    if plan.is_empty() {
        return Err(Error::validation_invalid_argument(
            "plan",
            "Plan contains no regions",
        ));
    }
    if !path.is_file() {
        return Err(Error::source_file_not_found(path));
    }

    let file = path.display().to_string();
    let content = files::read_file(path)?;
    let excision = excise_content(&content, plan, &file)?;

    let regions_found = excision.reports.iter().filter(|r| r.found).count();
    let lines_removed = excision.original_lines - excision.remaining_lines;

    Ok(ExciseResult {
        file,
        regions: excision.reports,
        regions_found,
        original_lines: excision.original_lines,
        remaining_lines: excision.remaining_lines,
        lines_removed,
        applied: false,
        path: path.to_path_buf(),
        new_content: excision.new_content,
    })
}

/// Write the excised content back to disk.
pub fn apply_excision(result: &mut ExciseResult) -> Result<()> {
    files::write_file(&result.path, &result.new_content)?;
    log_status!(
        "excise",
        "Removed {} line(s) from {}",
        result.lines_removed,
        result.file
    );
    result.applied = true;
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================
