//! Intermediate model handed from translation to rendering
//!
//! Nothing here knows about text templates: translation produces these values,
//! the Rust emitter consumes them.

use serde::{Deserialize, Serialize};

use crate::checksum::Checksum;

/// A Rust source file to be generated
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct File {
    /// Module name as it appears in the generated header
    pub package: String,
    /// Additional `use` paths, deduplicated and sorted
    pub imports: Vec<String>,
    /// Records to emit, in order
    pub data_types: Vec<DataType>,
    /// File name of the TOSCA definition the records came from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    /// Checksum of the TOSCA definition content
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_checksum: Option<Checksum>,
}

/// A TOSCA data type translated into a Rust record
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DataType {
    /// Rust struct identifier
    pub name: String,
    /// Fully qualified data type name in TOSCA
    pub fqdtn: String,
    /// Parent type token, empty for root types
    pub derived_from: String,
    pub description: String,
    /// Always present, possibly empty
    pub fields: Vec<Field>,
}

/// A TOSCA property translated into a record field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    /// PascalCase identifier derived from the property name
    pub name: String,
    /// Property name as it appears in the TOSCA definition
    pub original_name: String,
    /// Rust type token
    #[serde(rename = "type")]
    pub type_name: String,
    pub description: String,
    pub required: bool,
    /// Field closes a reference cycle and must be stored behind a `Box`
    pub boxed: bool,
}

impl Field {
    /// A required, unboxed field
    pub fn new(
        name: impl Into<String>,
        original_name: impl Into<String>,
        type_name: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            original_name: original_name.into(),
            type_name: type_name.into(),
            description: String::new(),
            required: true,
            boxed: false,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

impl DataType {
    pub fn has_parent(&self) -> bool {
        !self.derived_from.is_empty()
    }
}
