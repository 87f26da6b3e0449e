//! Error types for TOSCA data type generation

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Result type for generation operations
pub type Result<T> = std::result::Result<T, CodegenError>;

/// Which option list a malformed pattern came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternKind {
    Include,
    Exclude,
    NameMapping,
}

impl fmt::Display for PatternKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PatternKind::Include => write!(f, "include"),
            PatternKind::Exclude => write!(f, "exclude"),
            PatternKind::NameMapping => write!(f, "name mapping"),
        }
    }
}

/// Generation errors
///
/// Every variant is terminal for the current run.
#[derive(Error, Debug)]
pub enum CodegenError {
    #[error("TOSCA definition not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("Failed to read TOSCA definition {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse TOSCA definition {}: {message}", path.display())]
    Decode { path: PathBuf, message: String },

    #[error("Invalid {kind} pattern {pattern:?}: {source}")]
    InvalidPattern {
        kind: PatternKind,
        pattern: String,
        source: regex::Error,
    },

    #[error("Failed to generate file, templating failed: {0}")]
    Template(String),

    #[error("Failed to format generated file: {0}")]
    Format(#[from] syn::Error),

    #[error("Failed to write generated content: {0}")]
    Write(#[source] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Configuration error: {0}")]
    Settings(#[from] config_crate::ConfigError),
}

impl CodegenError {
    /// Short machine-friendly name of the error kind
    pub fn kind(&self) -> &'static str {
        match self {
            CodegenError::NotFound { .. } => "NotFound",
            CodegenError::Read { .. } => "ReadError",
            CodegenError::Decode { .. } => "DecodeError",
            CodegenError::InvalidPattern { .. } => "InvalidPattern",
            CodegenError::Template(_) => "TemplateError",
            CodegenError::Format(_) => "FormatError",
            CodegenError::Write(_) => "WriteError",
            CodegenError::Config(_) | CodegenError::Settings(_) => "ConfigError",
        }
    }
}
