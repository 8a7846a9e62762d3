//! Registry of resolved file descriptors.
//!
//! The registry is an ordinary value owned by whoever drives parsing and
//! rendering. Files are keyed by name and always iterated in sorted name
//! order, so rendering a registry is reproducible regardless of the order
//! files were parsed in.

use crate::descriptor::FileDescriptor;
use std::collections::BTreeMap;
use tracing::debug;

/// File name → descriptor store with stable, sorted iteration
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Registry {
    files: BTreeMap<String, FileDescriptor>,
}

impl Registry {
    /// Creates an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a descriptor under `name`, replacing any previous entry.
    ///
    /// Returns the replaced descriptor, if there was one.
    pub fn put(&mut self, name: impl Into<String>, file: FileDescriptor) -> Option<FileDescriptor> {
        let name = name.into();
        let previous = self.files.insert(name.clone(), file);
        if previous.is_some() {
            debug!("Replaced registered file {}", name);
        } else {
            debug!("Registered file {}", name);
        }
        previous
    }

    /// Stores a descriptor under its own file name
    pub fn insert(&mut self, file: FileDescriptor) -> Option<FileDescriptor> {
        let name = file.name.clone();
        self.put(name, file)
    }

    /// Returns the descriptor registered under `name`
    pub fn get(&self, name: &str) -> Option<&FileDescriptor> {
        self.files.get(name)
    }

    /// Iterates all descriptors sorted by registered name
    pub fn all(&self) -> impl ExactSizeIterator<Item = &FileDescriptor> + '_ {
        self.files.values()
    }

    /// Iterates registered names in sorted order
    pub fn names(&self) -> impl ExactSizeIterator<Item = &str> + '_ {
        self.files.keys().map(String::as_str)
    }

    /// Number of registered files
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Returns true if no file is registered
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

impl Extend<FileDescriptor> for Registry {
    fn extend<T: IntoIterator<Item = FileDescriptor>>(&mut self, iter: T) {
        for file in iter {
            self.insert(file);
        }
    }
}

impl FromIterator<FileDescriptor> for Registry {
    fn from_iter<T: IntoIterator<Item = FileDescriptor>>(iter: T) -> Self {
        let mut registry = Registry::new();
        registry.extend(iter);
        registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::Syntax;

    #[test]
    fn test_sorted_iteration() {
        let mut registry = Registry::new();
        registry.insert(FileDescriptor::new("zoo.proto", Syntax::Proto3, "z"));
        registry.insert(FileDescriptor::new("alpha.proto", Syntax::Proto3, "a"));
        registry.insert(FileDescriptor::new("mid/b.proto", Syntax::Proto2, "m"));

        let names: Vec<_> = registry.names().collect();
        assert_eq!(names, ["alpha.proto", "mid/b.proto", "zoo.proto"]);

        let packages: Vec<_> = registry.all().map(|f| f.package.as_str()).collect();
        assert_eq!(packages, ["a", "m", "z"]);
    }

    #[test]
    fn test_last_write_wins() {
        let mut registry = Registry::new();
        assert!(registry
            .put("a.proto", FileDescriptor::new("a.proto", Syntax::Proto2, "first"))
            .is_none());
        let previous = registry.put("a.proto", FileDescriptor::new("a.proto", Syntax::Proto3, "second"));

        assert_eq!(previous.map(|f| f.package), Some("first".to_string()));
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get("a.proto").unwrap().package, "second");
    }

    #[test]
    fn test_collect() {
        let registry: Registry = vec![
            FileDescriptor::new("b.proto", Syntax::Proto3, ""),
            FileDescriptor::new("a.proto", Syntax::Proto3, ""),
        ]
        .into_iter()
        .collect();

        assert!(!registry.is_empty());
        assert_eq!(registry.names().collect::<Vec<_>>(), ["a.proto", "b.proto"]);
        assert!(registry.get("c.proto").is_none());
    }
}
