//! Extensible traversal callbacks.
//!
//! [`walk`](super::walk) drives a [`Visitor`] through a registry depth-first.
//! The text renderer, the structured outline and [`StatsVisitor`] are all
//! visitors over the same walk.

use crate::descriptor::{
    EnumDescriptor, FieldDescriptor, FileDescriptor, MessageDescriptor, ServiceDescriptor,
};

/// Top-level section of a file, announced only when non-empty
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    /// Top-level messages
    Messages,
    /// Top-level enums
    Enums,
    /// Services
    Services,
}

impl Section {
    /// Section heading as it appears in text output
    pub fn title(&self) -> &'static str {
        match self {
            Section::Messages => "Messages",
            Section::Enums => "Enums",
            Section::Services => "Services",
        }
    }
}

/// Trait for receiving schema elements during a walk.
///
/// Every method has a no-op default. `depth` is 1 for top-level file members
/// and grows by one per nesting level.
///
/// # Example
///
/// ```
/// use protree_core::descriptor::FieldDescriptor;
/// use protree_core::render::Visitor;
///
/// #[derive(Default)]
/// struct FieldNames(Vec<String>);
///
/// impl Visitor for FieldNames {
///     fn field(&mut self, field: &FieldDescriptor, _depth: usize) {
///         self.0.push(field.name.clone());
///     }
/// }
/// ```
pub trait Visitor {
    /// Called before anything else in a file
    fn begin_file(&mut self, file: &FileDescriptor) {
        let _ = file;
    }

    /// Called after everything in a file
    fn end_file(&mut self, file: &FileDescriptor) {
        let _ = file;
    }

    /// Called before the first member of a non-empty section
    fn begin_section(&mut self, section: Section) {
        let _ = section;
    }

    /// Called when entering a message, before its fields
    fn begin_message(&mut self, message: &MessageDescriptor, depth: usize) {
        let _ = (message, depth);
    }

    /// Called once per field, `depth` being that of the enclosing message
    fn field(&mut self, field: &FieldDescriptor, depth: usize) {
        let _ = (field, depth);
    }

    /// Called when leaving a message, after nested types
    fn end_message(&mut self, message: &MessageDescriptor, depth: usize) {
        let _ = (message, depth);
    }

    /// Called for an enum, top-level or nested
    fn enum_type(&mut self, enum_type: &EnumDescriptor, depth: usize) {
        let _ = (enum_type, depth);
    }

    /// Called for a service
    fn service(&mut self, service: &ServiceDescriptor, depth: usize) {
        let _ = (service, depth);
    }
}

/// A visitor that collects statistics about the walked files
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct StatsVisitor {
    /// Number of files
    pub file_count: usize,
    /// Number of messages, nested included
    pub message_count: usize,
    /// Number of fields
    pub field_count: usize,
    /// Number of enums, nested included
    pub enum_count: usize,
    /// Number of services
    pub service_count: usize,
    /// Number of methods
    pub method_count: usize,
}

impl Visitor for StatsVisitor {
    fn begin_file(&mut self, _file: &FileDescriptor) {
        self.file_count += 1;
    }

    fn begin_message(&mut self, _message: &MessageDescriptor, _depth: usize) {
        self.message_count += 1;
    }

    fn field(&mut self, _field: &FieldDescriptor, _depth: usize) {
        self.field_count += 1;
    }

    fn enum_type(&mut self, _enum_type: &EnumDescriptor, _depth: usize) {
        self.enum_count += 1;
    }

    fn service(&mut self, service: &ServiceDescriptor, _depth: usize) {
        self.service_count += 1;
        self.method_count += service.methods.len();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::{FieldKind, MethodDescriptor, Syntax};
    use crate::render::walk;
    use crate::Registry;

    struct Noop;

    impl Visitor for Noop {}

    fn registry() -> Registry {
        let file = FileDescriptor::new("a.proto", Syntax::Proto3, "a")
            .with_message(
                MessageDescriptor::new("Outer")
                    .with_field(FieldDescriptor::new("id", 1, FieldKind::Int64))
                    .with_message(
                        MessageDescriptor::new("Inner")
                            .with_field(FieldDescriptor::new("x", 1, FieldKind::Float))
                            .with_enum(EnumDescriptor::new("Mode").with_value("OFF", 0)),
                    ),
            )
            .with_enum(EnumDescriptor::new("Kind").with_value("NONE", 0))
            .with_service(
                ServiceDescriptor::new("Api")
                    .with_method(MethodDescriptor::new("Get", "Outer", "Outer"))
                    .with_method(MethodDescriptor::new("Put", "Outer", "Outer")),
            );
        [file].into_iter().collect()
    }

    #[test]
    fn test_noop_visitor() {
        let mut visitor = Noop;
        walk(&registry(), &mut visitor);
    }

    #[test]
    fn test_stats_visitor() {
        let mut stats = StatsVisitor::default();
        walk(&registry(), &mut stats);

        assert_eq!(stats.file_count, 1);
        assert_eq!(stats.message_count, 2);
        assert_eq!(stats.field_count, 2);
        assert_eq!(stats.enum_count, 2);
        assert_eq!(stats.service_count, 1);
        assert_eq!(stats.method_count, 2);
    }

    #[test]
    fn test_section_titles() {
        assert_eq!(Section::Messages.title(), "Messages");
        assert_eq!(Section::Services.title(), "Services");
    }
}
