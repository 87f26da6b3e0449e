//! Code Generation
//!
//! Translates a decoded TOSCA topology into the intermediate model and renders
//! it as Rust source.
//!
//! Architecture:
//! - NamePolicy: compiled include/exclude filters and rename rules
//! - Type mapping: closed builtin table, user types through NamePolicy
//! - translate(): Topology -> sorted records
//! - Emitter (`rust`): model -> formatted Rust source; never reads the topology
//!
//! Output order is part of the contract: records sort by fully qualified
//! name, fields by original property name.

pub mod config;
pub mod cycles;
pub mod names;
pub mod rust;
pub mod types;

use std::collections::{BTreeSet, HashSet};

use tracing::{debug, info, warn};

use crate::error::Result;
use crate::model::{DataType, Field};
use crate::tosca::{DataTypeDefinition, PropertyDefinition, Topology};

pub use config::{EmitFormat, NameMapping, Options, OutputTarget};
pub use names::{to_identifier, NamePolicy};
pub use types::{builtin_records, map_type, BuiltinType};

// =============================================================================
// Translation
// =============================================================================

/// Translate every included data type of `topology` into a record.
///
/// Fails only with `InvalidPattern`, before any data type is examined.
pub fn translate(topology: &Topology, options: &Options) -> Result<Vec<DataType>> {
    let policy = NamePolicy::from_options(options)?;

    let mut records = Vec::with_capacity(topology.data_types.len());
    for (fq_name, definition) in &topology.data_types {
        if !policy.is_included(fq_name) {
            debug!(data_type = %fq_name, "Skipped by name filters");
            continue;
        }
        records.push(translate_data_type(fq_name, definition, &policy));
    }
    records.sort_by(|a, b| a.fqdtn.cmp(&b.fqdtn));

    if options.generate_builtin_types {
        records.extend(builtin_records());
    }

    warn_duplicate_names(&records);
    let boxed = cycles::mark_recursive_fields(&mut records);

    info!(
        records = records.len(),
        skipped = topology.data_types.len() + builtin_count(options) - records.len(),
        boxed_fields = boxed,
        "Translated TOSCA data types"
    );
    Ok(records)
}

fn builtin_count(options: &Options) -> usize {
    if options.generate_builtin_types {
        builtin_records().len()
    } else {
        0
    }
}

fn translate_data_type(
    fq_name: &str,
    definition: &DataTypeDefinition,
    policy: &NamePolicy,
) -> DataType {
    let derived_from = if definition.derived_from.is_empty() {
        String::new()
    } else {
        types::map_scalar(&definition.derived_from, policy)
    };

    let mut fields: Vec<Field> = definition
        .properties
        .iter()
        .map(|(prop_name, prop)| translate_property(prop_name, prop, policy))
        .collect();
    fields.sort_by(|a, b| a.original_name.cmp(&b.original_name));

    DataType {
        name: policy.type_identifier(fq_name),
        fqdtn: fq_name.to_string(),
        derived_from,
        description: definition.description.clone(),
        fields,
    }
}

fn translate_property(prop_name: &str, prop: &PropertyDefinition, policy: &NamePolicy) -> Field {
    Field {
        name: to_identifier(prop_name),
        original_name: prop_name.to_string(),
        type_name: map_type(&prop.type_name, prop.entry_type(), policy),
        description: prop.description.clone(),
        required: prop.required,
        boxed: false,
    }
}

fn warn_duplicate_names(records: &[DataType]) {
    let mut seen_records: HashSet<&str> = HashSet::with_capacity(records.len());
    for record in records {
        if !seen_records.insert(record.name.as_str()) {
            warn!(name = %record.name, data_type = %record.fqdtn, "Duplicate record name");
        }
        let mut seen_fields: HashSet<String> = HashSet::with_capacity(record.fields.len());
        for field in &record.fields {
            let ident = rust::field_ident(&field.name);
            if !seen_fields.insert(ident.trim_start_matches("r#").to_string()) {
                warn!(
                    name = %ident,
                    property = %field.original_name,
                    data_type = %record.fqdtn,
                    "Duplicate field name, a numeric suffix is added"
                );
            }
        }
    }
}

// =============================================================================
// Imports
// =============================================================================

/// `use` paths needed by the records, deduplicated and sorted
pub fn collect_imports(records: &[DataType]) -> Vec<String> {
    let mut imports = BTreeSet::new();
    for record in records {
        imports.extend(types::imports_for(&record.derived_from));
        for field in &record.fields {
            imports.extend(types::imports_for(&field.type_name));
        }
    }
    imports.into_iter().map(str::to_string).collect()
}
