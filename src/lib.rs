//! tdt2rs
//!
//! Generates Rust structures from the `data_types` section of a TOSCA
//! definition file.
//!
//! ## Pipeline
//!
//! ```text
//! definition.yaml
//!   -> tosca::load_topology      (Topology)
//!   -> codegen::translate        (sorted DataType records)
//!   -> codegen::collect_imports  (File)
//!   -> codegen::rust::render     (formatted source)
//!   -> Options::output           (stdout or file)
//! ```
//!
//! Every stage is deterministic: the same definition and options always
//! produce byte-identical output.
//!
//! ## Example
//!
//! ```no_run
//! use tdt2rs::{generate, Options};
//!
//! let options = Options::default()
//!     .with_package("datatypes")
//!     .with_exclude_patterns([r"^tosca\.datatypes\.nfv\."]);
//! let source = generate("normative.yaml".as_ref(), &options)?;
//! print!("{}", String::from_utf8_lossy(&source));
//! # Ok::<(), tdt2rs::CodegenError>(())
//! ```

pub mod checksum;
pub mod codegen;
pub mod config;
pub mod drift;
pub mod error;
pub mod model;
pub mod tosca;

use std::io::Write;
use std::path::Path;

use tracing::info;

pub use checksum::Checksum;
pub use codegen::{EmitFormat, NameMapping, Options, OutputTarget};
pub use config::Tdt2rsConfig;
pub use error::{CodegenError, Result};
pub use model::{DataType, Field, File};

/// Load, translate and assemble the file model for a definition
pub fn build_file(path: &Path, options: &Options) -> Result<File> {
    let content = tosca::read_definition(path)?;
    let topology = tosca::parse_topology(path, &content)?;
    let data_types = codegen::translate(&topology, options)?;

    let cwd = std::env::current_dir().map_err(|e| {
        CodegenError::Config(format!("cannot determine the current directory: {}", e))
    })?;
    let package = config::resolve_package(options, &cwd)?;

    Ok(File {
        package,
        imports: codegen::collect_imports(&data_types),
        data_types,
        source: path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned()),
        source_checksum: Some(Checksum::from_bytes(&content)),
    })
}

/// Render a file model in the requested format
pub fn render_file(file: &File, format: EmitFormat) -> Result<Vec<u8>> {
    match format {
        EmitFormat::Rust => codegen::rust::render(file),
        EmitFormat::Model => {
            let mut json = serde_json::to_vec_pretty(file)
                .map_err(|e| CodegenError::Template(e.to_string()))?;
            json.push(b'\n');
            Ok(json)
        }
    }
}

/// Generate formatted Rust source for a definition, in memory
pub fn generate(path: &Path, options: &Options) -> Result<Vec<u8>> {
    render_file(&build_file(path, options)?, EmitFormat::Rust)
}

/// Generate Rust source and write it to `writer`.
///
/// Nothing is written unless loading, translation and rendering all succeed.
pub fn generate_to_writer(path: &Path, options: &Options, writer: &mut dyn Write) -> Result<()> {
    let rendered = generate(path, options)?;
    write_all(writer, &rendered)
}

/// Generate Rust source into the sink configured in `options.output`.
///
/// A file sink is opened (and truncated) only once rendering succeeded.
pub fn generate_file(path: &Path, options: &Options) -> Result<()> {
    let rendered = generate(path, options)?;
    write_output(&options.output, &rendered)?;
    info!(
        source = %path.display(),
        bytes = rendered.len(),
        output = %options
            .output
            .path()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "stdout".to_string()),
        "Generated Rust data types"
    );
    Ok(())
}

/// Write already rendered content to an output target
pub fn write_output(target: &OutputTarget, content: &[u8]) -> Result<()> {
    let mut sink = target.open().map_err(CodegenError::Write)?;
    write_all(sink.as_mut(), content)
}

fn write_all(writer: &mut dyn Write, content: &[u8]) -> Result<()> {
    writer.write_all(content).map_err(CodegenError::Write)?;
    writer.flush().map_err(CodegenError::Write)
}
