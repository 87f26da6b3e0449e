//! TOSCA definition loading
//!
//! Reads a single TOSCA definition file and decodes its `data_types` section.
//! Imports are never followed: only the given file is read.

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use serde::{Deserialize, Deserializer, Serialize};
use tracing::debug;

use crate::error::{CodegenError, Result};

/// The decoded part of a TOSCA service template we care about
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Topology {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tosca_definitions_version: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Data types keyed by fully qualified name
    pub data_types: BTreeMap<String, DataTypeDefinition>,
}

/// A TOSCA data type definition
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DataTypeDefinition {
    #[serde(default, deserialize_with = "null_as_default")]
    pub derived_from: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub properties: BTreeMap<String, PropertyDefinition>,
}

/// A TOSCA property definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyDefinition {
    #[serde(rename = "type")]
    pub type_name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entry_schema: Option<EntrySchema>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,

    #[serde(default = "default_required")]
    pub required: bool,
}

/// Entry schema of a `list` or `map` property
///
/// Accepts both the full form (`entry_schema: { type: string }`) and the
/// shorthand (`entry_schema: string`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EntrySchema {
    Short(String),
    Full {
        #[serde(rename = "type")]
        type_name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        description: Option<String>,
    },
}

impl EntrySchema {
    pub fn type_name(&self) -> &str {
        match self {
            EntrySchema::Short(t) => t,
            EntrySchema::Full { type_name, .. } => type_name,
        }
    }
}

/// Collection kinds that require an entry schema
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectionKind {
    List,
    Map,
}

impl CollectionKind {
    /// Classify a TOSCA type token (case-insensitive)
    pub fn of(type_name: &str) -> Option<Self> {
        if type_name.eq_ignore_ascii_case("list") {
            Some(CollectionKind::List)
        } else if type_name.eq_ignore_ascii_case("map") {
            Some(CollectionKind::Map)
        } else {
            None
        }
    }
}

impl PropertyDefinition {
    /// Entry schema type token, if any
    pub fn entry_type(&self) -> Option<&str> {
        self.entry_schema.as_ref().map(EntrySchema::type_name)
    }
}

impl Topology {
    /// Decode a topology from YAML text.
    ///
    /// Fails if `data_types` is absent or malformed, or if a `list`/`map`
    /// property has no entry schema.
    pub fn from_yaml(content: &str) -> std::result::Result<Self, String> {
        Self::from_slice(content.as_bytes())
    }

    /// Decode a topology from raw file bytes; invalid UTF-8 is a decode error
    pub fn from_slice(content: &[u8]) -> std::result::Result<Self, String> {
        let topology: Topology = serde_yaml::from_slice(content).map_err(|e| e.to_string())?;
        topology.check_entry_schemas()?;
        Ok(topology)
    }

    fn check_entry_schemas(&self) -> std::result::Result<(), String> {
        for (dt_name, dt) in &self.data_types {
            for (prop_name, prop) in &dt.properties {
                if CollectionKind::of(&prop.type_name).is_some() && prop.entry_schema.is_none() {
                    return Err(format!(
                        "property {:?} of data type {:?} is a {} without entry_schema",
                        prop_name, dt_name, prop.type_name
                    ));
                }
            }
        }
        Ok(())
    }
}

/// Read the raw bytes of a TOSCA definition file
pub fn read_definition(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).map_err(|source| match source.kind() {
        ErrorKind::NotFound => CodegenError::NotFound {
            path: path.to_path_buf(),
        },
        _ => CodegenError::Read {
            path: path.to_path_buf(),
            source,
        },
    })
}

/// Decode already-read content, attributing errors to `path`
pub fn parse_topology(path: &Path, content: &[u8]) -> Result<Topology> {
    let topology = Topology::from_slice(content).map_err(|message| CodegenError::Decode {
        path: path.to_path_buf(),
        message,
    })?;
    debug!(
        path = %path.display(),
        data_types = topology.data_types.len(),
        version = topology.tosca_definitions_version.as_deref().unwrap_or(""),
        "Loaded TOSCA definition"
    );
    Ok(topology)
}

/// Read and decode a TOSCA definition file
pub fn load_topology(path: &Path) -> Result<Topology> {
    let content = read_definition(path)?;
    parse_topology(path, &content)
}

fn default_required() -> bool {
    true
}

fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
