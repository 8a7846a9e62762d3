use protox::file::{File, FileResolver};
use std::collections::BTreeMap;
use std::path::Path;

/// Resolves files from an in-memory name → source map
#[derive(Debug, Clone)]
pub(super) struct MemoryFileResolver {
    contents: BTreeMap<String, String>,
}

impl MemoryFileResolver {
    pub(super) fn new(contents: BTreeMap<String, String>) -> Self {
        Self { contents }
    }
}

impl FileResolver for MemoryFileResolver {
    fn resolve_path(&self, path: &Path) -> Option<String> {
        let name = path.to_str()?.replace('\\', "/");
        let name = name.trim_start_matches("./");
        self.contents
            .contains_key(name)
            .then(|| name.to_string())
    }

    fn open_file(&self, name: &str) -> Result<File, protox::Error> {
        match self.contents.get(name) {
            Some(source) => File::from_source(name, source),
            None => Err(protox::Error::file_not_found(name)),
        }
    }
}
