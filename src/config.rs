//! Configuration management for tdt2rs
//!
//! Supports loading configuration from:
//! - Default values
//! - Config file (tdt2rs.toml)
//! - Environment variables (TDT2RS_*)
//!
//! ## Example config file (tdt2rs.toml):
//! ```toml
//! package = "datatypes"
//! output = "src/datatypes.rs"
//! generate_builtin_types = true
//! exclude_patterns = ['^tosca\.datatypes\.nfv\.']
//!
//! [[name_mappings]]
//! pattern = 'tosca\.datatypes\.(.+)'
//! replacement = 'Tosca_${1}'
//! ```

use config_crate::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::codegen::{NameMapping, Options, OutputTarget};
use crate::error::{CodegenError, Result};

/// Main configuration for the generator
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Tdt2rsConfig {
    /// Module name for generated headers
    #[serde(default)]
    pub package: Option<String>,

    /// File to write generated code to (stdout when unset)
    #[serde(default)]
    pub output: Option<PathBuf>,

    /// Append TOSCA builtin records
    #[serde(default)]
    pub generate_builtin_types: bool,

    /// Fully qualified names to keep (regex, unanchored)
    #[serde(default)]
    pub include_patterns: Vec<String>,

    /// Fully qualified names to drop (regex, ignored when includes are set)
    #[serde(default)]
    pub exclude_patterns: Vec<String>,

    /// Ordered rename rules
    #[serde(default)]
    pub name_mappings: Vec<NameMapping>,
}

impl Tdt2rsConfig {
    /// Load configuration from default locations
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration, adding a specific file that must exist
    pub fn load_from(config_path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder();

        let config_locations = ["tdt2rs.toml", ".tdt2rs.toml", "config/tdt2rs.toml"];
        for location in config_locations {
            builder = builder.add_source(File::with_name(location).required(false));
        }

        if let Some(config_dir) = directories::ProjectDirs::from("io", "tdt2rs", "tdt2rs") {
            let xdg_config = config_dir.config_dir().join("tdt2rs.toml");
            if xdg_config.exists() {
                builder = builder.add_source(File::from(xdg_config).required(false));
            }
        }

        if let Some(path) = config_path {
            builder = builder.add_source(File::from(path).required(true));
        }

        builder = builder.add_source(
            Environment::with_prefix("TDT2RS")
                .separator("__")
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("include_patterns")
                .with_list_parse_key("exclude_patterns"),
        );

        let config = builder.build()?;
        Ok(config.try_deserialize()?)
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> std::io::Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        std::fs::write(path, content)
    }

    /// Turn the loaded configuration into generation options
    pub fn into_options(self) -> Options {
        Options {
            package: self.package,
            include_patterns: self.include_patterns,
            exclude_patterns: self.exclude_patterns,
            name_mappings: self.name_mappings,
            generate_builtin_types: self.generate_builtin_types,
            output: self.output.map(OutputTarget::File).unwrap_or_default(),
        }
    }
}

// =============================================================================
// Package Resolution
// =============================================================================

/// Resolve the package name for a run.
///
/// Order: explicit option, output file stem, crate name from `Cargo.toml` in
/// `dir`. The result must be a valid Rust identifier.
pub fn resolve_package(options: &Options, dir: &Path) -> Result<String> {
    let package = match (&options.package, options.output.path()) {
        (Some(package), _) => package.clone(),
        (None, Some(path)) => path
            .file_stem()
            .and_then(|s| s.to_str())
            .map(|s| s.replace('-', "_"))
            .ok_or_else(|| {
                CodegenError::Config(format!(
                    "cannot derive a package name from output file {}",
                    path.display()
                ))
            })?,
        (None, None) => crate_name(dir)?,
    };

    if syn::parse_str::<syn::Ident>(&package).is_err() || package.starts_with("r#") {
        return Err(CodegenError::Config(format!(
            "package name {:?} is not a valid Rust identifier",
            package
        )));
    }
    Ok(package)
}

/// Library name of the crate whose manifest lives in `dir`
pub fn crate_name(dir: &Path) -> Result<String> {
    let manifest_path = dir.join("Cargo.toml");
    let content = std::fs::read_to_string(&manifest_path).map_err(|e| {
        CodegenError::Config(format!(
            "failed to load current package from {}: {}; set a package name explicitly",
            manifest_path.display(),
            e
        ))
    })?;
    let manifest: toml::Value = toml::from_str(&content).map_err(|e| {
        CodegenError::Config(format!("failed to parse {}: {}", manifest_path.display(), e))
    })?;

    let name = ["lib", "package"]
        .iter()
        .find_map(|table| manifest.get(table)?.get("name")?.as_str())
        .ok_or_else(|| {
            CodegenError::Config(format!(
                "{} declares no package name (is it a workspace manifest?)",
                manifest_path.display()
            ))
        })?;
    Ok(name.replace('-', "_"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Tdt2rsConfig::default();
        assert!(config.package.is_none());
        assert!(!config.generate_builtin_types);
        assert_eq!(config.into_options().output, OutputTarget::Stdout);
    }

    #[test]
    fn test_load_from_file_keeps_mapping_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.toml");
        std::fs::write(
            &path,
            r#"
package = "datatypes"
generate_builtin_types = true
include_patterns = ['tosca\.datatypes\..*']

[[name_mappings]]
pattern = 'z'
replacement = 'y'

[[name_mappings]]
pattern = 'a'
replacement = 'b'
"#,
        )
        .unwrap();

        let config = Tdt2rsConfig::load_from(Some(&path)).unwrap();
        assert_eq!(config.package.as_deref(), Some("datatypes"));
        assert!(config.generate_builtin_types);
        assert_eq!(config.include_patterns, vec![r"tosca\.datatypes\..*".to_string()]);
        assert_eq!(
            config.name_mappings,
            vec![NameMapping::new("z", "y"), NameMapping::new("a", "b")]
        );
    }

    #[test]
    fn test_missing_explicit_config_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = Tdt2rsConfig::load_from(Some(&dir.path().join("absent.toml"))).unwrap_err();
        assert_eq!(err.kind(), "ConfigError");
    }

    #[test]
    fn test_save_roundtrips_through_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("saved.toml");
        let config = Tdt2rsConfig {
            package: Some("datatypes".to_string()),
            name_mappings: vec![NameMapping::new(r"ns\.(.+)", "${1}")],
            ..Tdt2rsConfig::default()
        };
        config.save(&path).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("package = \"datatypes\""));
        assert!(content.contains("[[name_mappings]]"));
    }

    #[test]
    fn test_resolve_explicit_package() {
        let options = Options::default().with_package("somepkg");
        assert_eq!(resolve_package(&options, Path::new("/nonexistent")).unwrap(), "somepkg");
    }

    #[test]
    fn test_resolve_package_from_output_file() {
        let options = Options::default()
            .with_output(OutputTarget::File(PathBuf::from("src/tosca-types.rs")));
        assert_eq!(resolve_package(&options, Path::new("/nonexistent")).unwrap(), "tosca_types");
    }

    #[test]
    fn test_resolve_package_from_manifest() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("Cargo.toml"),
            "[package]\nname = \"my-crate\"\nversion = \"0.1.0\"\n",
        )
        .unwrap();
        assert_eq!(resolve_package(&Options::default(), dir.path()).unwrap(), "my_crate");

        std::fs::write(
            dir.path().join("Cargo.toml"),
            "[package]\nname = \"my-crate\"\n\n[lib]\nname = \"mylib\"\n",
        )
        .unwrap();
        assert_eq!(crate_name(dir.path()).unwrap(), "mylib");
    }

    #[test]
    fn test_unresolvable_package() {
        let dir = tempfile::tempdir().unwrap();
        let err = resolve_package(&Options::default(), dir.path()).unwrap_err();
        assert_eq!(err.kind(), "ConfigError");

        std::fs::write(dir.path().join("Cargo.toml"), "[workspace]\nmembers = []\n").unwrap();
        assert_eq!(crate_name(dir.path()).unwrap_err().kind(), "ConfigError");
    }

    #[test]
    fn test_invalid_package_name() {
        let options = Options::default().with_package("not valid");
        let err = resolve_package(&options, Path::new(".")).unwrap_err();
        assert_eq!(err.kind(), "ConfigError");

        let options = Options::default().with_package("type");
        assert!(resolve_package(&options, Path::new(".")).is_err());
    }
}
