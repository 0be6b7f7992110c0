//! Diagnostic types and error reporting

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

pub type ValidateResult<T> = Result<T, ValidateError>;

/// A diagnostic message from the validator.
///
/// `line` is 1-based; 0 means the diagnostic applies to the file as a whole.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Diagnostic {
    pub level: DiagnosticLevel,
    pub message: String,
    pub file: PathBuf,
    pub line: usize,
    pub rule: String,
    pub suggestion: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DiagnosticLevel {
    Error,
    Warning,
}

impl Diagnostic {
    pub fn error(file: PathBuf, line: usize, rule: &str, message: String) -> Self {
        Self {
            level: DiagnosticLevel::Error,
            message,
            file,
            line,
            rule: rule.to_string(),
            suggestion: None,
        }
    }

    pub fn warning(file: PathBuf, line: usize, rule: &str, message: String) -> Self {
        Self {
            level: DiagnosticLevel::Warning,
            message,
            file,
            line,
            rule: rule.to_string(),
            suggestion: None,
        }
    }

    pub fn with_suggestion(mut self, suggestion: String) -> Self {
        self.suggestion = Some(suggestion);
        self
    }
}

/// Validator errors
#[derive(Error, Debug)]
pub enum ValidateError {
    #[error("failed to read file: {path}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("refusing to read symlink: {path}")]
    FileSymlink { path: PathBuf },

    #[error("not a regular file: {path}")]
    FileNotRegular { path: PathBuf },

    #[error("file too large: {path} ({size} bytes, limit {limit})")]
    FileTooBig { path: PathBuf, size: u64, limit: u64 },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
