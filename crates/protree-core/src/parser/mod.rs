//! Schema loading.
//!
//! [`ProtoParser`] hands `.proto` files to the `protox` compiler, which
//! parses them, resolves imports across the configured import paths and
//! validates the result. Each requested file is then converted into the
//! crate's descriptor model and stored in a caller-owned [`Registry`].
//!
//! Compiled `FileDescriptorSet` binaries (as written by
//! `protoc --descriptor_set_out`) can be loaded with
//! [`ProtoParser::load_descriptor_set`].

mod memory;

use crate::descriptor::FileDescriptor;
use crate::error::{Error, Result};
use crate::registry::Registry;
use memory::MemoryFileResolver;
use prost::Message;
use prost_reflect::DescriptorPool;
use prost_types::FileDescriptorSet;
use protox::file::{ChainFileResolver, GoogleFileResolver, IncludeFileResolver};
use protox::Compiler;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

/// Configuration for schema loading
#[derive(Debug, Clone)]
pub struct ParserConfig {
    /// Directories searched for files and their imports (default: `.`)
    pub import_paths: Vec<PathBuf>,
    /// In-memory sources by file name, consulted before the import paths
    pub import_contents: BTreeMap<String, String>,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            import_paths: vec![PathBuf::from(".")],
            import_contents: BTreeMap::new(),
        }
    }
}

impl ParserConfig {
    /// Creates a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the import paths
    pub fn import_paths<I, P>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.import_paths = paths.into_iter().map(Into::into).collect();
        self
    }

    /// Appends an import path
    pub fn import_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.import_paths.push(path.into());
        self
    }

    /// Adds an in-memory source file
    pub fn import_content(mut self, name: impl Into<String>, source: impl Into<String>) -> Self {
        self.import_contents.insert(name.into(), source.into());
        self
    }

    /// Replaces all in-memory source files
    pub fn import_contents(mut self, contents: BTreeMap<String, String>) -> Self {
        self.import_contents = contents;
        self
    }
}

/// Parses schemas and fills a [`Registry`]
#[derive(Debug, Clone, Default)]
pub struct ProtoParser {
    config: ParserConfig,
}

impl ProtoParser {
    /// Creates a parser with the default config
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a parser with a custom config
    pub fn with_config(config: ParserConfig) -> Self {
        Self { config }
    }

    /// Returns the active config
    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    /// Parses one `.proto` file and registers it.
    ///
    /// Imports are resolved and validated, but only the requested file is
    /// added to the registry. Returns the number of registered files.
    pub fn parse_file(&self, path: impl AsRef<Path>, registry: &mut Registry) -> Result<usize> {
        self.parse_files(&[path], registry)
    }

    /// Parses several `.proto` files in one compilation and registers them.
    pub fn parse_files<P: AsRef<Path>>(
        &self,
        paths: &[P],
        registry: &mut Registry,
    ) -> Result<usize> {
        let mut compiler = Compiler::with_file_resolver(self.resolver());
        compiler.include_imports(false).include_source_info(false);

        for path in paths {
            let path = path.as_ref();
            trace!("Compiling {}", path.display());
            compiler
                .open_file(path)
                .map_err(|e| Error::parse(path, e.to_string()))?;
        }

        let names: Vec<String> = compiler
            .file_descriptor_set()
            .file
            .iter()
            .map(|f| f.name().to_string())
            .collect();

        // The compiler's pool holds packed flags from before option interpretation
        compiler.include_imports(true);
        let pool = DescriptorPool::from_file_descriptor_set(compiler.file_descriptor_set())
            .map_err(|e| Error::descriptor_build(e.to_string()))?;

        register_files(&pool, &names, registry)
    }

    /// Loads an encoded `FileDescriptorSet` and registers every file in it.
    pub fn load_descriptor_set(bytes: &[u8], registry: &mut Registry) -> Result<usize> {
        let set = FileDescriptorSet::decode(bytes)?;
        let names: Vec<String> = set.file.iter().map(|f| f.name().to_string()).collect();

        let pool = DescriptorPool::from_file_descriptor_set(set)
            .map_err(|e| Error::descriptor_build(e.to_string()))?;

        register_files(&pool, &names, registry)
    }

    /// Reads and loads an encoded `FileDescriptorSet` from disk.
    pub fn load_descriptor_set_file(
        path: impl AsRef<Path>,
        registry: &mut Registry,
    ) -> Result<usize> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(|e| Error::file_read(path, e))?;
        trace!("Read {} bytes from {}", bytes.len(), path.display());
        Self::load_descriptor_set(&bytes, registry)
    }

    fn resolver(&self) -> ChainFileResolver {
        let mut resolver = ChainFileResolver::new();
        if !self.config.import_contents.is_empty() {
            resolver.add(MemoryFileResolver::new(self.config.import_contents.clone()));
        }
        for path in &self.config.import_paths {
            resolver.add(IncludeFileResolver::new(path.clone()));
        }
        resolver.add(GoogleFileResolver::new());
        resolver
    }
}

fn register_files(pool: &DescriptorPool, names: &[String], registry: &mut Registry) -> Result<usize> {
    if names.is_empty() {
        return Err(Error::NoFilesFound);
    }

    for name in names {
        let file = pool.get_file_by_name(name).ok_or_else(|| {
            Error::internal(format!("file '{}' missing from descriptor pool", name))
        })?;
        let descriptor = FileDescriptor::from_reflect(&file)?;
        debug!(
            "Loaded {} ({} messages, {} enums, {} services)",
            name,
            descriptor.messages.len(),
            descriptor.enums.len(),
            descriptor.services.len()
        );
        registry.put(name.as_str(), descriptor);
    }

    Ok(names.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::{DefaultValue, FieldKind, Syntax};

    const PERSON: &str = r#"
syntax = "proto3";
package demo;

message Person {
  string name = 1;
  int32 age = 2;
  repeated int64 scores = 3;
  optional string nickname = 4;
  Status status = 5;
}

enum Status {
  UNKNOWN = 0;
  ACTIVE = 1;
}
"#;

    fn memory_parser() -> ProtoParser {
        ProtoParser::with_config(
            ParserConfig::new()
                .import_paths(Vec::<PathBuf>::new())
                .import_content("person.proto", PERSON)
                .import_content(
                    "team.proto",
                    r#"
syntax = "proto3";
package demo;
import "person.proto";

service Teams {
  rpc Lookup (Person) returns (Person);
}
"#,
                ),
        )
    }

    #[test]
    fn test_parse_in_memory() {
        let mut registry = Registry::new();
        let count = memory_parser()
            .parse_file("person.proto", &mut registry)
            .unwrap();
        assert_eq!(count, 1);

        let file = registry.get("person.proto").unwrap();
        assert_eq!(file.syntax, Syntax::Proto3);
        assert_eq!(file.package, "demo");

        let person = &file.messages[0];
        assert_eq!(person.full_name, "demo.Person");
        assert!(person.fields[2].packed);
        assert!(person.fields[3].optional_keyword);

        let status = &person.fields[4];
        assert_eq!(status.kind, FieldKind::Enum);
        assert_eq!(
            status.default,
            DefaultValue::Enum {
                name: "UNKNOWN".to_string(),
                number: 0
            }
        );
    }

    #[test]
    fn test_imports_are_not_registered() {
        let mut registry = Registry::new();
        memory_parser()
            .parse_file("team.proto", &mut registry)
            .unwrap();

        assert_eq!(registry.names().collect::<Vec<_>>(), ["team.proto"]);
        let team = registry.get("team.proto").unwrap();
        assert_eq!(team.imports, ["person.proto"]);
        assert_eq!(team.services[0].methods[0].input, "Person");
    }

    #[test]
    fn test_packed_option_is_honored() {
        let parser = ProtoParser::with_config(
            ParserConfig::new()
                .import_paths(Vec::<PathBuf>::new())
                .import_content(
                    "legacy.proto",
                    "syntax = \"proto2\";\nmessage Old {\n  repeated sint32 deltas = 1 [packed = true];\n  repeated sint32 plain = 2;\n}\n",
                )
                .import_content(
                    "modern.proto",
                    "syntax = \"proto3\";\nmessage New {\n  repeated int32 loose = 1 [packed = false];\n  repeated int32 tight = 2;\n}\n",
                ),
        );
        let mut registry = Registry::new();
        parser
            .parse_files(&["legacy.proto", "modern.proto"], &mut registry)
            .unwrap();

        let old = &registry.get("legacy.proto").unwrap().messages[0];
        assert!(old.fields[0].packed);
        assert!(!old.fields[1].packed);

        let new = &registry.get("modern.proto").unwrap().messages[0];
        assert!(!new.fields[0].packed);
        assert!(new.fields[1].packed);

        let lines = crate::render::render(&registry);
        assert!(lines.contains(&"     [+]sint32 deltas = 0;".to_string()));
        assert!(lines.contains(&"     [*]sint32 plain = 0;".to_string()));
        assert!(lines.contains(&"     [*]int32 loose = 0;".to_string()));
        assert!(lines.contains(&"     [+]int32 tight = 0;".to_string()));
    }

    #[test]
    fn test_parse_error() {
        let parser = ProtoParser::with_config(
            ParserConfig::new().import_content("broken.proto", "message {"),
        );
        let err = parser
            .parse_file("broken.proto", &mut Registry::new())
            .unwrap_err();
        assert!(matches!(err, Error::Parse { .. }));
        assert!(err.to_string().contains("broken.proto"));
    }

    #[test]
    fn test_missing_file() {
        let parser = memory_parser();
        let err = parser
            .parse_file("nope.proto", &mut Registry::new())
            .unwrap_err();
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_load_descriptor_set() {
        let mut compiler = Compiler::with_file_resolver(memory_parser().resolver());
        compiler.include_imports(true);
        compiler.open_file("team.proto").unwrap();
        let bytes = compiler.file_descriptor_set().encode_to_vec();

        let mut registry = Registry::new();
        let count = ProtoParser::load_descriptor_set(&bytes, &mut registry).unwrap();
        assert_eq!(count, 2);
        assert_eq!(
            registry.names().collect::<Vec<_>>(),
            ["person.proto", "team.proto"]
        );
    }

    #[test]
    fn test_load_garbage() {
        let err = ProtoParser::load_descriptor_set(&[0xff, 0xff, 0xff], &mut Registry::new())
            .unwrap_err();
        assert!(matches!(err, Error::DescriptorParse(_)));

        let err = ProtoParser::load_descriptor_set(&[], &mut Registry::new()).unwrap_err();
        assert!(matches!(err, Error::NoFilesFound));
    }
}
