//! Generation Options
//!
//! Immutable once a run starts. Filtering and renaming patterns are kept as
//! raw strings here and compiled by [`super::names::NamePolicy`].

use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

// =============================================================================
// Name Mappings
// =============================================================================

/// One rename rule applied to fully qualified data type names.
///
/// `replacement` may reference capture groups (`$1`, `${1}`, `${name}`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NameMapping {
    pub pattern: String,
    pub replacement: String,
}

impl NameMapping {
    pub fn new(pattern: impl Into<String>, replacement: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            replacement: replacement.into(),
        }
    }

    /// Parse a `PATTERN=REPLACEMENT` pair, splitting on the last `=`.
    ///
    /// Patterns may contain `=`; replacements may not.
    pub fn parse_pair(s: &str) -> Result<Self, String> {
        match s.rsplit_once('=') {
            Some((pattern, replacement)) if !pattern.is_empty() => {
                Ok(Self::new(pattern, replacement))
            }
            _ => Err(format!("expected PATTERN=REPLACEMENT, got {:?}", s)),
        }
    }
}

// =============================================================================
// Output Target
// =============================================================================

/// Where generated content goes
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputTarget {
    #[default]
    Stdout,
    File(PathBuf),
}

impl OutputTarget {
    /// Open the sink. Files are created or truncated.
    pub fn open(&self) -> io::Result<Box<dyn Write>> {
        match self {
            OutputTarget::Stdout => Ok(Box::new(io::stdout())),
            OutputTarget::File(path) => {
                let file = OpenOptions::new()
                    .write(true)
                    .create(true)
                    .truncate(true)
                    .open(path)?;
                Ok(Box::new(file))
            }
        }
    }

    pub fn path(&self) -> Option<&PathBuf> {
        match self {
            OutputTarget::Stdout => None,
            OutputTarget::File(path) => Some(path),
        }
    }
}

// =============================================================================
// Emit Format
// =============================================================================

/// What a run writes: Rust source, or the intermediate model as JSON
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmitFormat {
    #[default]
    Rust,
    Model,
}

impl FromStr for EmitFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "rust" | "rs" => Ok(EmitFormat::Rust),
            "model" | "json" => Ok(EmitFormat::Model),
            _ => Err(format!("unknown emit format {:?} (expected rust or model)", s)),
        }
    }
}

// =============================================================================
// Options
// =============================================================================

/// Options controlling a generation run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Options {
    /// Module name for the generated header. Resolved from the output file or
    /// the current crate when unset.
    pub package: Option<String>,

    /// Only data types matching at least one of these are generated.
    /// Takes precedence over `exclude_patterns`.
    pub include_patterns: Vec<String>,

    /// Data types matching any of these are skipped (ignored when
    /// `include_patterns` is not empty).
    pub exclude_patterns: Vec<String>,

    /// Rename rules, applied in order, each on the previous one's output
    pub name_mappings: Vec<NameMapping>,

    /// Append the TOSCA builtin records (Range, ScalarUnit..., Version)
    pub generate_builtin_types: bool,

    pub output: OutputTarget,
}

impl Options {
    pub fn with_package(mut self, package: impl Into<String>) -> Self {
        self.package = Some(package.into());
        self
    }

    pub fn with_include_patterns<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.include_patterns = patterns.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_exclude_patterns<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude_patterns = patterns.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_name_mapping(
        mut self,
        pattern: impl Into<String>,
        replacement: impl Into<String>,
    ) -> Self {
        self.name_mappings.push(NameMapping::new(pattern, replacement));
        self
    }

    pub fn with_builtin_types(mut self, generate: bool) -> Self {
        self.generate_builtin_types = generate;
        self
    }

    pub fn with_output(mut self, output: OutputTarget) -> Self {
        self.output = output;
        self
    }
}
