//! Name Policy and Identifier Conversion
//!
//! - Include/exclude filtering of fully qualified data type names
//! - Ordered rename rules
//! - Conversion of arbitrary TOSCA names into exported Rust identifiers
//!
//! All patterns are compiled once, up front, so a malformed pattern fails the
//! run before any data type is looked at.

use regex::Regex;

use super::config::Options;
use crate::error::{CodegenError, PatternKind, Result};

// =============================================================================
// Identifier Conversion
// =============================================================================

/// Prefix for names that do not start with a letter
const ESCAPE_MARKER: char = 'X';

/// Initialisms kept fully upper-case in identifiers (`user_id` -> `UserID`)
const COMMON_INITIALISMS: &[&str] = &[
    "ACL", "API", "ASCII", "CPU", "CSS", "DNS", "EOF", "GUID", "HTML", "HTTP", "HTTPS", "ID",
    "IP", "JSON", "LHS", "QPS", "RAM", "RHS", "RPC", "SLA", "SMTP", "SQL", "SSH", "TCP", "TLS",
    "TTL", "UDP", "UI", "UID", "UUID", "URI", "URL", "UTF8", "VM", "XML", "XMPP", "XSRF", "XSS",
];

/// Convert any TOSCA name into an exported PascalCase identifier.
///
/// Characters that are neither letters nor ASCII digits become word
/// boundaries. A name that does not start with a letter gets the `X` marker,
/// keeping a leading digit (`1_number` -> `X1Number`).
pub fn to_identifier(name: &str) -> String {
    let mut normalized = String::with_capacity(name.len() + 1);
    for (i, c) in name.chars().enumerate() {
        if i == 0 && !c.is_alphabetic() {
            normalized.push(ESCAPE_MARKER);
            if c.is_ascii_digit() {
                normalized.push(c);
            }
        } else if !c.is_alphabetic() && !c.is_ascii_digit() {
            normalized.push('_');
        } else {
            normalized.push(c);
        }
    }
    snake_to_pascal(&normalized)
}

/// Capitalize each `_`-delimited segment and concatenate
fn snake_to_pascal(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for word in s.split('_') {
        result.push_str(&case_word(word));
    }
    result
}

fn case_word(word: &str) -> String {
    let upper = word.to_uppercase();
    if COMMON_INITIALISMS.contains(&upper.as_str()) {
        return upper;
    }
    let mut chars = word.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first.to_uppercase().chain(chars).collect(),
    }
}

// =============================================================================
// Name Policy
// =============================================================================

/// Compiled include/exclude filters and rename rules
#[derive(Debug, Clone, Default)]
pub struct NamePolicy {
    include: Vec<Regex>,
    exclude: Vec<Regex>,
    mappings: Vec<(Regex, String)>,
}

impl NamePolicy {
    /// Compile raw patterns.
    ///
    /// Fails with `InvalidPattern` naming the first malformed pattern.
    pub fn new(
        include_patterns: &[String],
        exclude_patterns: &[String],
        name_mappings: &[(String, String)],
    ) -> Result<Self> {
        let include = compile_all(include_patterns, PatternKind::Include)?;
        let exclude = compile_all(exclude_patterns, PatternKind::Exclude)?;
        let mappings = name_mappings
            .iter()
            .map(|(pattern, replacement)| {
                compile(pattern, PatternKind::NameMapping).map(|re| (re, replacement.clone()))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            include,
            exclude,
            mappings,
        })
    }

    pub fn from_options(options: &Options) -> Result<Self> {
        let mappings: Vec<(String, String)> = options
            .name_mappings
            .iter()
            .map(|m| (m.pattern.clone(), m.replacement.clone()))
            .collect();
        Self::new(&options.include_patterns, &options.exclude_patterns, &mappings)
    }

    /// Should a data type with this fully qualified name be generated?
    ///
    /// Matching is unanchored. Include patterns, when present, decide alone.
    pub fn is_included(&self, fq_name: &str) -> bool {
        if !self.include.is_empty() {
            return self.include.iter().any(|re| re.is_match(fq_name));
        }
        !self.exclude.iter().any(|re| re.is_match(fq_name))
    }

    /// Apply rename rules in order, each on the previous result
    pub fn rename(&self, fq_name: &str) -> String {
        let mut name = fq_name.to_string();
        for (re, replacement) in &self.mappings {
            name = re.replace_all(&name, replacement.as_str()).into_owned();
        }
        name
    }

    /// Struct identifier for a fully qualified data type name: rename, keep
    /// the last `.` segment, convert to an identifier.
    ///
    /// `Self` and the empty name are not usable as type names and get the
    /// escape marker (`ns.self` -> `XSelf`).
    pub fn type_identifier(&self, fq_name: &str) -> String {
        let renamed = self.rename(fq_name);
        let short = renamed.rsplit('.').next().unwrap_or(&renamed);
        match to_identifier(short) {
            ident if ident.is_empty() || ident == "Self" => format!("{}{}", ESCAPE_MARKER, ident),
            ident => ident,
        }
    }
}

fn compile(pattern: &str, kind: PatternKind) -> Result<Regex> {
    Regex::new(pattern).map_err(|source| CodegenError::InvalidPattern {
        kind,
        pattern: pattern.to_string(),
        source,
    })
}

fn compile_all(patterns: &[String], kind: PatternKind) -> Result<Vec<Regex>> {
    patterns.iter().map(|p| compile(p, kind)).collect()
}
