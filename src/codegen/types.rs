//! TOSCA to Rust type mapping
//!
//! The builtin table is a closed enum so every TOSCA primitive has exactly one
//! Rust counterpart. Anything else is a user data type and resolves through
//! the name policy.

use super::names::NamePolicy;
use crate::model::DataType;
use crate::tosca::CollectionKind;

/// TOSCA builtin types with a fixed Rust equivalent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuiltinType {
    String,
    Integer,
    Boolean,
    Float,
    Timestamp,
    Version,
    Range,
    ScalarUnit,
    ScalarUnitSize,
    ScalarUnitTime,
    ScalarUnitFrequency,
    ScalarUnitBitRate,
}

impl BuiltinType {
    pub const ALL: [BuiltinType; 12] = [
        BuiltinType::String,
        BuiltinType::Integer,
        BuiltinType::Boolean,
        BuiltinType::Float,
        BuiltinType::Timestamp,
        BuiltinType::Version,
        BuiltinType::Range,
        BuiltinType::ScalarUnit,
        BuiltinType::ScalarUnitSize,
        BuiltinType::ScalarUnitTime,
        BuiltinType::ScalarUnitFrequency,
        BuiltinType::ScalarUnitBitRate,
    ];

    /// Look up a TOSCA type token (exact match)
    pub fn from_tosca(token: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|b| b.tosca_name() == token)
    }

    pub fn tosca_name(&self) -> &'static str {
        match self {
            BuiltinType::String => "string",
            BuiltinType::Integer => "integer",
            BuiltinType::Boolean => "boolean",
            BuiltinType::Float => "float",
            BuiltinType::Timestamp => "timestamp",
            BuiltinType::Version => "version",
            BuiltinType::Range => "range",
            BuiltinType::ScalarUnit => "scalar-unit",
            BuiltinType::ScalarUnitSize => "scalar-unit.size",
            BuiltinType::ScalarUnitTime => "scalar-unit.time",
            BuiltinType::ScalarUnitFrequency => "scalar-unit.frequency",
            BuiltinType::ScalarUnitBitRate => "scalar-unit.bitrate",
        }
    }

    pub fn rust_type(&self) -> &'static str {
        match self {
            BuiltinType::String => "String",
            BuiltinType::Integer => "i64",
            BuiltinType::Boolean => "bool",
            BuiltinType::Float => "f64",
            BuiltinType::Timestamp => "DateTime<Utc>",
            BuiltinType::Version => "Version",
            BuiltinType::Range => "Range",
            BuiltinType::ScalarUnit => "ScalarUnit",
            BuiltinType::ScalarUnitSize => "ScalarUnitSize",
            BuiltinType::ScalarUnitTime => "ScalarUnitTime",
            BuiltinType::ScalarUnitFrequency => "ScalarUnitFrequency",
            BuiltinType::ScalarUnitBitRate => "ScalarUnitBitRate",
        }
    }

    /// For builtins that are generated records: the type they wrap
    pub fn record_base(&self) -> Option<&'static str> {
        match self {
            BuiltinType::Range => Some("Vec<u64>"),
            BuiltinType::ScalarUnit | BuiltinType::Version => Some("String"),
            BuiltinType::ScalarUnitSize
            | BuiltinType::ScalarUnitTime
            | BuiltinType::ScalarUnitFrequency
            | BuiltinType::ScalarUnitBitRate => Some("ScalarUnit"),
            _ => None,
        }
    }
}

/// The builtin records appended when builtin generation is enabled.
///
/// FQDTNs live in the `tosca:` namespace, which no dotted schema name uses.
pub fn builtin_records() -> Vec<DataType> {
    let mut records: Vec<DataType> = BuiltinType::ALL
        .into_iter()
        .filter_map(|b| {
            b.record_base().map(|base| DataType {
                name: b.rust_type().to_string(),
                fqdtn: format!("tosca:{}", b.tosca_name()),
                derived_from: base.to_string(),
                description: String::new(),
                fields: Vec::new(),
            })
        })
        .collect();
    records.sort_by(|a, b| a.fqdtn.cmp(&b.fqdtn));
    records
}

/// Map a TOSCA type token to a Rust type token.
///
/// Total: unknown tokens are user data types and become the identifier of
/// their (renamed) fully qualified name.
pub fn map_type(token: &str, entry_schema: Option<&str>, policy: &NamePolicy) -> String {
    match CollectionKind::of(token) {
        Some(CollectionKind::List) => {
            format!("Vec<{}>", map_scalar(entry_schema.unwrap_or_default(), policy))
        }
        Some(CollectionKind::Map) => format!(
            "HashMap<String, {}>",
            map_scalar(entry_schema.unwrap_or_default(), policy)
        ),
        None => map_scalar(token, policy),
    }
}

/// Map a non-collection token (also used for `derived_from`)
pub fn map_scalar(token: &str, policy: &NamePolicy) -> String {
    match BuiltinType::from_tosca(token) {
        Some(builtin) => builtin.rust_type().to_string(),
        None => policy.type_identifier(token),
    }
}

/// `use` paths a Rust type token needs beyond the prelude
pub fn imports_for(type_token: &str) -> Vec<&'static str> {
    let mut imports = Vec::new();
    if type_token.contains("DateTime<Utc>") {
        imports.push("chrono::{DateTime, Utc}");
    }
    if type_token.contains("HashMap<") {
        imports.push("std::collections::HashMap");
    }
    imports
}
