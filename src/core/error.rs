use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    ValidationInvalidArgument,
    ValidationInvalidJson,

    SourceRootNotFound,
    SourceFileNotFound,

    ExciseRegionUnterminated,

    InternalIoError,
    InternalJsonError,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::ValidationInvalidArgument => "validation.invalid_argument",
            ErrorCode::ValidationInvalidJson => "validation.invalid_json",

            ErrorCode::SourceRootNotFound => "source.root_not_found",
            ErrorCode::SourceFileNotFound => "source.file_not_found",

            ErrorCode::ExciseRegionUnterminated => "excise.region_unterminated",

            ErrorCode::InternalIoError => "internal.io_error",
            ErrorCode::InternalJsonError => "internal.json_error",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hint {
    pub message: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvalidArgumentDetails {
    pub field: String,
    pub problem: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PathDetails {
    pub path: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionUnterminatedDetails {
    pub label: String,
    pub file: String,
    pub start_line: usize,
    pub end_kind: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InternalIoErrorDetails {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InternalJsonErrorDetails {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Error {
    pub code: ErrorCode,
    pub message: String,
    pub details: Value,
    pub hints: Vec<Hint>,
    pub retryable: Option<bool>,
}

pub type Result<T> = std::result::Result<T, Error>;

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for Error {}

impl Error {
    pub fn new(code: ErrorCode, message: impl Into<String>, details: Value) -> Self {
        Self {
            code,
            message: message.into(),
            details,
            hints: Vec::new(),
            retryable: None,
        }
    }

    pub fn validation_invalid_argument(
        field: impl Into<String>,
        problem: impl Into<String>,
    ) -> Self {
        let details = serde_json::to_value(InvalidArgumentDetails {
            field: field.into(),
            problem: problem.into(),
        })
        .unwrap_or_else(|_| Value::Object(serde_json::Map::new()));

        Self::new(
            ErrorCode::ValidationInvalidArgument,
            "Invalid argument",
            details,
        )
    }

    pub fn validation_invalid_json(err: serde_json::Error, context: Option<String>) -> Self {
        let details = serde_json::json!({
            "error": err.to_string(),
            "context": context,
        });

        Self::new(ErrorCode::ValidationInvalidJson, "Invalid JSON", details)
    }

    pub fn source_root_not_found(path: &Path) -> Self {
        let details = serde_json::to_value(PathDetails {
            path: path.display().to_string(),
        })
        .unwrap_or_else(|_| Value::Object(serde_json::Map::new()));

        Self::new(
            ErrorCode::SourceRootNotFound,
            "App directory not found",
            details,
        )
        .with_hint("Run from the repository root or pass --root <dir>")
    }

    pub fn source_file_not_found(path: &Path) -> Self {
        let details = serde_json::to_value(PathDetails {
            path: path.display().to_string(),
        })
        .unwrap_or_else(|_| Value::Object(serde_json::Map::new()));

        Self::new(ErrorCode::SourceFileNotFound, "File not found", details)
    }

    pub fn region_unterminated(
        label: impl Into<String>,
        file: impl Into<String>,
        start_line: usize,
        end_kind: impl Into<String>,
    ) -> Self {
        let label = label.into();
        let details = serde_json::to_value(RegionUnterminatedDetails {
            label: label.clone(),
            file: file.into(),
            start_line,
            end_kind: end_kind.into(),
        })
        .unwrap_or_else(|_| Value::Object(serde_json::Map::new()));

        Self::new(
            ErrorCode::ExciseRegionUnterminated,
            format!("Region '{}' starts at line {} but never ends", label, start_line),
            details,
        )
        .with_hint("Check that the end marker still exists below the start marker")
    }

    pub fn internal_io(error: impl Into<String>, context: Option<String>) -> Self {
        let details = serde_json::to_value(InternalIoErrorDetails {
            error: error.into(),
            context,
        })
        .unwrap_or_else(|_| Value::Object(serde_json::Map::new()));

        Self::new(ErrorCode::InternalIoError, "IO error", details)
    }

    pub fn internal_json(error: impl Into<String>, context: Option<String>) -> Self {
        let details = serde_json::to_value(InternalJsonErrorDetails {
            error: error.into(),
            context,
        })
        .unwrap_or_else(|_| Value::Object(serde_json::Map::new()));

        Self::new(ErrorCode::InternalJsonError, "JSON error", details)
    }

    pub fn with_hint(mut self, message: impl Into<String>) -> Self {
        self.hints.push(Hint {
            message: message.into(),
        });
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_codes_are_dotted_strings() {
        assert_eq!(
            ErrorCode::ValidationInvalidArgument.as_str(),
            "validation.invalid_argument"
        );
        assert_eq!(ErrorCode::SourceRootNotFound.as_str(), "source.root_not_found");
        assert_eq!(
            ErrorCode::ExciseRegionUnterminated.as_str(),
            "excise.region_unterminated"
        );
    }

    #[test]
    fn region_unterminated_carries_location() {
        let err = Error::region_unterminated("focus listener", "app/App.tsx", 216, "balanced");
        assert_eq!(err.code, ErrorCode::ExciseRegionUnterminated);
        assert_eq!(err.details["label"], "focus listener");
        assert_eq!(err.details["startLine"], 216);
        assert!(!err.hints.is_empty());
    }

    #[test]
    fn with_hint_accumulates() {
        let err = Error::validation_invalid_argument("plan", "empty")
            .with_hint("first")
            .with_hint("second");
        assert_eq!(err.hints.len(), 2);
    }
}
