//! Rust Code Emitter
//!
//! Renders a [`File`] into Rust source.
//!
//! Key constraints:
//! - Only the intermediate model is read, never the TOSCA topology
//! - Emitted text is parsed with `syn` and pretty-printed with `prettyplease`;
//!   a parse failure means the emitter produced invalid Rust (`Format` error)

use std::collections::HashSet;

use crate::error::{CodegenError, Result};
use crate::model::{DataType, Field, File};

const DERIVES: &str = "#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]";

// =============================================================================
// Public API
// =============================================================================

/// Render a file model into formatted Rust source
pub fn render(file: &File) -> Result<Vec<u8>> {
    let source = emit_file(file)?;
    let syntax = syn::parse_file(&source)?;
    Ok(prettyplease::unparse(&syntax).into_bytes())
}

/// Emit unformatted Rust source for a file model
pub fn emit_file(file: &File) -> Result<String> {
    check_ident(&file.package, || "package name".to_string())?;

    let mut output = String::new();
    emit_header(&mut output, file);

    if !file.data_types.is_empty() {
        output.push_str("use serde::{Deserialize, Serialize};\n");
        for import in &file.imports {
            output.push_str(&format!("use {};\n", import));
        }
        output.push('\n');
    }

    for data_type in &file.data_types {
        emit_data_type(&mut output, data_type)?;
        output.push('\n');
    }

    Ok(output)
}

// =============================================================================
// Header
// =============================================================================

fn emit_header(output: &mut String, file: &File) {
    output.push_str("//! Code generated by tdt2rs from TOSCA data types. DO NOT EDIT.\n");
    output.push_str("//!\n");
    output.push_str(&format!("//! Package `{}`.\n", file.package));
    if let Some(ref source) = file.source {
        output.push_str(&format!("//! Source: `{}`\n", single_line(source)));
    }
    if let Some(ref checksum) = file.source_checksum {
        output.push_str(&format!("//! Source checksum (SHA-256): {}\n", checksum.as_str()));
    }
    output.push('\n');
}

// =============================================================================
// Data Type Emission
// =============================================================================

fn emit_data_type(output: &mut String, data_type: &DataType) -> Result<()> {
    check_ident(&data_type.name, || format!("data type {}", data_type.fqdtn))?;

    push_doc(
        output,
        "",
        &format!(
            "`{}` is generated from TOSCA data type `{}`.",
            data_type.name,
            single_line(&data_type.fqdtn)
        ),
    );
    if !data_type.description.is_empty() {
        push_doc(output, "", "");
        push_doc(output, "", &data_type.description);
    }
    output.push_str(DERIVES);
    output.push('\n');

    if data_type.has_parent() && data_type.fields.is_empty() {
        emit_newtype(output, data_type);
    } else {
        emit_struct(output, data_type)?;
    }
    Ok(())
}

/// A derived type adding no fields is its parent under another name
fn emit_newtype(output: &mut String, data_type: &DataType) {
    output.push_str("#[serde(transparent)]\n");
    output.push_str(&format!(
        "pub struct {}(pub {});\n",
        data_type.name, data_type.derived_from
    ));
}

fn emit_struct(output: &mut String, data_type: &DataType) -> Result<()> {
    let field_names = unique_field_idents(&data_type.fields);
    for (field, ident) in data_type.fields.iter().zip(&field_names) {
        check_ident(ident, || {
            format!("property {:?} of {}", field.original_name, data_type.fqdtn)
        })?;
    }

    output.push_str(&format!("pub struct {} {{\n", data_type.name));

    if data_type.has_parent() {
        let parent_field = parent_field_name(&data_type.derived_from, &field_names);
        output.push_str("    #[serde(flatten)]\n");
        output.push_str(&format!(
            "    pub {}: {},\n",
            parent_field, data_type.derived_from
        ));
    }

    for (field, ident) in data_type.fields.iter().zip(&field_names) {
        emit_field(output, field, ident);
    }

    output.push_str("}\n");
    Ok(())
}

fn emit_field(output: &mut String, field: &Field, ident: &str) {
    if !field.description.is_empty() {
        push_doc(output, "    ", &field.description);
    }

    if ident.trim_start_matches("r#") != field.original_name {
        output.push_str(&format!(
            "    #[serde(rename = {:?})]\n",
            field.original_name
        ));
    }

    let mut rust_type = field.type_name.clone();
    if field.boxed {
        rust_type = format!("Box<{}>", rust_type);
    }
    if !field.required {
        output.push_str("    #[serde(default, skip_serializing_if = \"Option::is_none\")]\n");
        rust_type = format!("Option<{}>", rust_type);
    }

    output.push_str(&format!("    pub {}: {},\n", ident, rust_type));
}

// =============================================================================
// Helper Utilities
// =============================================================================

fn push_doc(output: &mut String, indent: &str, text: &str) {
    for line in text.replace('\r', "").split('\n') {
        if line.is_empty() {
            output.push_str(&format!("{}///\n", indent));
        } else {
            output.push_str(&format!("{}/// {}\n", indent, line));
        }
    }
}

fn single_line(s: &str) -> String {
    s.replace(['\r', '\n'], " ")
}

fn check_ident(ident: &str, what: impl FnOnce() -> String) -> Result<()> {
    syn::parse_str::<syn::Ident>(ident).map(|_| ()).map_err(|_| {
        CodegenError::Template(format!("{:?} is not a valid Rust identifier for {}", ident, what()))
    })
}

/// Rust field identifier for a PascalCase field name
pub(crate) fn field_ident(name: &str) -> String {
    escape_keyword(&to_snake_case(name))
}

/// Field identifiers of one record, made distinct.
///
/// A field whose identifier spells its property name exactly keeps it; the
/// others get a numeric suffix on collision (`userId` next to `user_id`
/// becomes `user_id_2`) and are renamed back by serde.
fn unique_field_idents(fields: &[Field]) -> Vec<String> {
    let mut idents: Vec<String> = fields.iter().map(|f| field_ident(&f.name)).collect();
    let exact: Vec<bool> = fields
        .iter()
        .zip(&idents)
        .map(|(f, ident)| ident.trim_start_matches("r#") == f.original_name)
        .collect();

    let mut taken: HashSet<String> = idents
        .iter()
        .zip(&exact)
        .filter(|(_, &is_exact)| is_exact)
        .map(|(ident, _)| ident.clone())
        .collect();

    for (ident, is_exact) in idents.iter_mut().zip(&exact) {
        if *is_exact {
            continue;
        }
        if !taken.insert(ident.clone()) {
            let base = ident.trim_start_matches("r#").to_string();
            let mut n = 2;
            while taken.contains(&format!("{}_{}", base, n)) {
                n += 1;
            }
            *ident = format!("{}_{}", base, n);
            taken.insert(ident.clone());
        }
    }
    idents
}

/// Name of the flattened parent field, kept clear of property fields
fn parent_field_name(parent_type: &str, field_names: &[String]) -> String {
    let is_plain = !parent_type.is_empty()
        && parent_type.chars().all(|c| c.is_alphanumeric() || c == '_');
    let mut candidate = if is_plain {
        field_ident(parent_type)
    } else {
        "base".to_string()
    };
    while field_names.contains(&candidate) {
        candidate = format!("{}_base", candidate.trim_start_matches("r#"));
    }
    candidate
}

/// Convert PascalCase to snake_case, keeping acronym runs together
/// (`ValidBoolID` -> `valid_bool_id`, `TOSCARoot` -> `tosca_root`)
fn to_snake_case(s: &str) -> String {
    let chars: Vec<char> = s.chars().collect();
    let mut result = String::with_capacity(s.len() + 4);

    for (i, &c) in chars.iter().enumerate() {
        if c.is_uppercase() {
            let boundary = match i.checked_sub(1).map(|p| chars[p]) {
                Some(prev) if prev.is_lowercase() || prev.is_ascii_digit() => true,
                Some(prev) if prev.is_uppercase() => {
                    chars.get(i + 1).is_some_and(|next| next.is_lowercase())
                }
                _ => false,
            };
            if boundary {
                result.push('_');
            }
            result.extend(c.to_lowercase());
        } else {
            result.push(c);
        }
    }

    result
}

fn escape_keyword(name: &str) -> String {
    if UNRAWABLE_KEYWORDS.contains(&name) {
        format!("{}_", name)
    } else if RUST_KEYWORDS.contains(&name) {
        format!("r#{}", name)
    } else {
        name.to_string()
    }
}

// =============================================================================
// Keywords
// =============================================================================

/// Keywords that cannot be used as raw identifiers
const UNRAWABLE_KEYWORDS: &[&str] = &["crate", "self", "Self", "super"];

const RUST_KEYWORDS: &[&str] = &[
    "as", "break", "const", "continue", "else", "enum", "extern",
    "false", "fn", "for", "if", "impl", "in", "let", "loop", "match", "mod",
    "move", "mut", "pub", "ref", "return", "static", "struct",
    "trait", "true", "type", "unsafe", "use", "where", "while",
    "async", "await", "dyn", "abstract", "become", "box", "do", "final",
    "macro", "override", "priv", "typeof", "unsized", "virtual", "yield", "try", "gen",
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checksum::Checksum;

    fn render_str(file: &File) -> String {
        String::from_utf8(render(file).unwrap()).unwrap()
    }

    fn simple(data_types: Vec<DataType>) -> File {
        File {
            package: "simple".to_string(),
            data_types,
            ..File::default()
        }
    }

    fn my_dt(fields: Vec<Field>) -> DataType {
        DataType {
            name: "MyDT".to_string(),
            fqdtn: "org.ystia.datatypes.MyDT".to_string(),
            fields,
            ..DataType::default()
        }
    }

    #[test]
    fn test_empty_file() {
        let code = render_str(&File {
            package: "something".to_string(),
            ..File::default()
        });
        assert!(code.contains("//! Package `something`."));
        assert!(!code.contains("use serde"));
        assert!(syn::parse_file(&code).unwrap().items.is_empty());
    }

    #[test]
    fn test_simple_data_type() {
        let code = render_str(&simple(vec![my_dt(vec![
            Field::new("F1", "f1", "String"),
            Field::new("MyF2", "my_f2", "i64"),
        ])]));
        assert!(code.contains("use serde::{Deserialize, Serialize};"));
        assert!(code.contains(DERIVES));
        assert!(code.contains("pub struct MyDT {"));
        assert!(code.contains("pub f1: String,"));
        assert!(code.contains("pub my_f2: i64,"));
        assert!(!code.contains("rename"));
    }

    #[test]
    fn test_fields_tags() {
        let code = render_str(&simple(vec![my_dt(vec![
            Field::new("X1Number", "1_number", "f64"),
            Field::new("ValidBoolID", "valid-bool-id", "bool"),
            Field::new("Type", "type", "String"),
        ])]));
        assert!(code.contains("#[serde(rename = \"1_number\")]"));
        assert!(code.contains("pub x1_number: f64,"));
        assert!(code.contains("#[serde(rename = \"valid-bool-id\")]"));
        assert!(code.contains("pub valid_bool_id: bool,"));
        assert!(code.contains("pub r#type: String,"));
        assert!(!code.contains("rename = \"type\""));
    }

    #[test]
    fn test_with_imports() {
        let mut file = simple(vec![my_dt(vec![Field::new("F2", "f2", "DateTime<Utc>")])]);
        file.imports = vec!["chrono::{DateTime, Utc}".to_string()];
        let code = render_str(&file);
        assert!(code.contains("use chrono::{DateTime, Utc};"));
        assert!(code.contains("pub f2: DateTime<Utc>,"));
    }

    #[test]
    fn test_derived_data_type() {
        let code = render_str(&simple(vec![
            my_dt(vec![Field::new("F1", "f1", "String")]),
            DataType {
                name: "MyDerivedDT".to_string(),
                fqdtn: "org.ystia.datatypes.MyDerivedDT".to_string(),
                derived_from: "MyDT".to_string(),
                fields: vec![Field::new("F3", "f3", "Vec<String>")],
                ..DataType::default()
            },
        ]));
        assert!(code.contains("#[serde(flatten)]"));
        assert!(code.contains("pub my_dt: MyDT,"));
        assert!(code.contains("pub f3: Vec<String>,"));
    }

    #[test]
    fn test_derived_from_builtin_is_newtype() {
        let code = render_str(&simple(vec![DataType {
            name: "MyDerivedDT".to_string(),
            fqdtn: "org.ystia.datatypes.MyDerivedDT".to_string(),
            derived_from: "String".to_string(),
            ..DataType::default()
        }]));
        assert!(code.contains("#[serde(transparent)]"));
        assert!(code.contains("pub struct MyDerivedDT(pub String);"));
    }

    #[test]
    fn test_root_without_fields_is_braced() {
        let code = render_str(&simple(vec![my_dt(vec![])]));
        let syntax = syn::parse_file(&code).unwrap();
        match &syntax.items[1] {
            syn::Item::Struct(s) => {
                assert_eq!(s.ident, "MyDT");
                assert!(
                    matches!(s.fields, syn::Fields::Named(ref named) if named.named.is_empty())
                );
            }
            _ => panic!("Expected struct item"),
        }
    }

    #[test]
    fn test_with_descriptions() {
        let mut dt = my_dt(vec![
            Field::new("F2", "f2", "i64").with_description("A multiline\r\ndescription"),
        ]);
        dt.description = "A oneliner description".to_string();
        let code = render_str(&simple(vec![dt]));
        assert!(code.contains("/// `MyDT` is generated from TOSCA data type `org.ystia.datatypes.MyDT`."));
        assert!(code.contains("/// A oneliner description"));
        assert!(code.contains("    /// A multiline\n    /// description\n"));
    }

    #[test]
    fn test_optional_and_boxed_fields() {
        let mut next = Field::new("Next", "next", "Node");
        next.boxed = true;
        next.required = false;
        let mut node = my_dt(vec![next]);
        node.name = "Node".to_string();
        let code = render_str(&simple(vec![node]));
        assert!(code.contains("#[serde(default, skip_serializing_if = \"Option::is_none\")]"));
        assert!(code.contains("pub next: Option<Box<Node>>,"));
    }

    #[test]
    fn test_header_traceability() {
        let mut file = simple(vec![]);
        file.source = Some("normative.yaml".to_string());
        file.source_checksum = Some(Checksum::from_bytes(b"x"));
        let code = render_str(&file);
        assert!(code.contains("//! Source: `normative.yaml`"));
        let expected = format!("//! Source checksum (SHA-256): {}", Checksum::from_bytes(b"x"));
        assert!(code.contains(&expected));
    }

    #[test]
    fn test_parent_field_avoids_collisions() {
        let names = vec!["root".to_string()];
        assert_eq!(parent_field_name("Root", &names), "root_base");
        assert_eq!(parent_field_name("Vec<u64>", &[]), "base");
        assert_eq!(parent_field_name("Root", &[]), "root");
    }

    #[test]
    fn test_invalid_identifier_is_template_error() {
        let mut dt = my_dt(vec![]);
        dt.name = String::new();
        let err = render(&simple(vec![dt])).unwrap_err();
        assert_eq!(err.kind(), "TemplateError");

        let mut dt = my_dt(vec![]);
        dt.name = "Self".to_string();
        assert_eq!(render(&simple(vec![dt])).unwrap_err().kind(), "TemplateError");

        let err = render(&File::default()).unwrap_err();
        assert_eq!(err.kind(), "TemplateError");
    }

    #[test]
    fn test_malformed_type_is_format_error() {
        let err = render(&simple(vec![my_dt(vec![Field::new("F1", "f1", "Vec<")])])).unwrap_err();
        assert_eq!(err.kind(), "FormatError");
    }

    #[test]
    fn test_colliding_field_names_are_suffixed() {
        let code = render_str(&simple(vec![my_dt(vec![
            Field::new("UserId", "userId", "String"),
            Field::new("UserID", "user_id", "String"),
        ])]));
        let syntax = syn::parse_file(&code).unwrap();
        let idents: Vec<String> = match &syntax.items[1] {
            syn::Item::Struct(s) => s
                .fields
                .iter()
                .filter_map(|f| f.ident.as_ref().map(|i| i.to_string()))
                .collect(),
            _ => panic!("Expected struct item"),
        };
        assert_eq!(idents, vec!["user_id_2", "user_id"]);
        assert!(code.contains("#[serde(rename = \"userId\")]"));
        assert!(!code.contains("rename = \"user_id\""));
    }

    #[test]
    fn test_unique_field_idents() {
        let fields = vec![
            Field::new("Type", "Type", "String"),
            Field::new("Type", "type", "String"),
            Field::new("TypeX", "type-x", "String"),
            Field::new("Type", "TYPE", "String"),
        ];
        assert_eq!(
            unique_field_idents(&fields),
            vec!["type_2", "r#type", "type_x", "type_3"]
        );
    }

    #[test]
    fn test_parent_field_avoids_suffixed_fields() {
        let code = render_str(&simple(vec![DataType {
            name: "Leaf".to_string(),
            fqdtn: "ns.Leaf".to_string(),
            derived_from: "Root".to_string(),
            fields: vec![Field::new("Root", "Root", "String"), Field::new("Root", "root", "i64")],
            ..DataType::default()
        }]));
        assert!(code.contains("pub root_2: String,"));
        assert!(code.contains("pub root: i64,"));
        assert!(code.contains("pub root_base: Root,"));
    }

    #[test]
    fn test_to_snake_case() {
        assert_eq!(to_snake_case("MyVal"), "my_val");
        assert_eq!(to_snake_case("ValidBoolID"), "valid_bool_id");
        assert_eq!(to_snake_case("AScalarUnitSize"), "a_scalar_unit_size");
        assert_eq!(to_snake_case("X1Number"), "x1_number");
        assert_eq!(to_snake_case("TOSCARoot"), "tosca_root");
        assert_eq!(to_snake_case("JSON"), "json");
    }

    #[test]
    fn test_escape_keyword() {
        assert_eq!(escape_keyword("type"), "r#type");
        assert_eq!(escape_keyword("self"), "self_");
        assert_eq!(escape_keyword("name"), "name");
        assert_eq!(field_ident("Self"), "self_");
    }
}
