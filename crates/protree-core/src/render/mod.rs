//! Descriptor tree rendering.
//!
//! [`walk`] traverses a [`Registry`] in sorted file order and, within each
//! file, in declaration order: messages (fields, then nested messages, then
//! nested enums), then enums, then services. [`Renderer`] turns that walk
//! into indented text lines:
//!
//! ```text
//!
//! ======== Proto File: person.proto ========
//! Syntax: proto3
//! Package: demo
//! Path: person.proto
//! Messages:
//!     message Person {
//!      [*]string name = "";
//!      [*]int32 age = 0;
//!     }
//! Enums:
//!     enum Status {
//!       UNKNOWN = 0;
//!       ACTIVE = 1;
//!     }
//! ```
//!
//! Each field line carries a [`Marker`], the kind's type name and, unless
//! the field is a message, a default-value clause from [`format_default`].

mod field;
mod outline;
mod visitor;

use crate::descriptor::{
    EnumDescriptor, FieldDescriptor, FileDescriptor, MessageDescriptor, ServiceDescriptor,
};
use crate::registry::Registry;
use std::fmt::Write as FmtWrite;

pub use field::{format_default, marker, Marker};
pub use outline::{
    EnumOutline, EnumValueOutline, FieldOutline, FileOutline, MessageOutline, MethodOutline,
    OutlineVisitor, ServiceOutline,
};
pub use visitor::{Section, StatsVisitor, Visitor};

/// Configuration for text rendering
#[derive(Debug, Clone)]
pub struct RenderConfig {
    /// Indentation string per depth level (default: 4 spaces)
    pub indent_str: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            indent_str: "    ".to_string(),
        }
    }
}

impl RenderConfig {
    /// Creates a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the indentation string
    pub fn indent_str(mut self, s: impl Into<String>) -> Self {
        self.indent_str = s.into();
        self
    }
}

/// Walks every file of `registry` in sorted name order
pub fn walk<V: Visitor + ?Sized>(registry: &Registry, visitor: &mut V) {
    for file in registry.all() {
        walk_file(file, visitor);
    }
}

/// Walks a single file
pub fn walk_file<V: Visitor + ?Sized>(file: &FileDescriptor, visitor: &mut V) {
    visitor.begin_file(file);

    if !file.messages.is_empty() {
        visitor.begin_section(Section::Messages);
        for message in &file.messages {
            walk_message(message, 1, visitor);
        }
    }

    if !file.enums.is_empty() {
        visitor.begin_section(Section::Enums);
        for enum_type in &file.enums {
            visitor.enum_type(enum_type, 1);
        }
    }

    if !file.services.is_empty() {
        visitor.begin_section(Section::Services);
        for service in &file.services {
            visitor.service(service, 1);
        }
    }

    visitor.end_file(file);
}

fn walk_message<V: Visitor + ?Sized>(message: &MessageDescriptor, depth: usize, visitor: &mut V) {
    visitor.begin_message(message, depth);

    for field in &message.fields {
        visitor.field(field, depth);
    }
    for nested in &message.messages {
        walk_message(nested, depth + 1, visitor);
    }
    for enum_type in &message.enums {
        visitor.enum_type(enum_type, depth + 1);
    }

    visitor.end_message(message, depth);
}

/// Renders registries as text lines
#[derive(Debug, Clone, Default)]
pub struct Renderer {
    config: RenderConfig,
}

impl Renderer {
    /// Creates a renderer with the default config
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a renderer with a custom config
    pub fn with_config(config: RenderConfig) -> Self {
        Self { config }
    }

    /// Returns the active config
    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    /// Renders every file of the registry, in sorted name order
    pub fn render(&self, registry: &Registry) -> Vec<String> {
        let mut text = TextVisitor::new(&self.config);
        walk(registry, &mut text);
        text.lines
    }

    /// Renders a single file
    pub fn render_file(&self, file: &FileDescriptor) -> Vec<String> {
        let mut text = TextVisitor::new(&self.config);
        walk_file(file, &mut text);
        text.lines
    }

    /// Renders the registry as one newline-terminated block
    pub fn render_string(&self, registry: &Registry) -> String {
        let mut output = String::new();
        for line in self.render(registry) {
            output.push_str(&line);
            output.push('\n');
        }
        output
    }

    /// Writes the rendered registry to a writer
    pub fn write_to(&self, registry: &Registry, w: &mut impl FmtWrite) -> std::fmt::Result {
        for line in self.render(registry) {
            writeln!(w, "{}", line)?;
        }
        Ok(())
    }
}

/// Renders a registry with the default config
pub fn render(registry: &Registry) -> Vec<String> {
    Renderer::new().render(registry)
}

/// Visitor producing the text lines
struct TextVisitor<'a> {
    config: &'a RenderConfig,
    lines: Vec<String>,
}

impl<'a> TextVisitor<'a> {
    fn new(config: &'a RenderConfig) -> Self {
        Self {
            config,
            lines: Vec::new(),
        }
    }

    fn indent(&self, depth: usize) -> String {
        self.config.indent_str.repeat(depth)
    }
}

impl Visitor for TextVisitor<'_> {
    fn begin_file(&mut self, file: &FileDescriptor) {
        self.lines.push(String::new());
        self.lines
            .push(format!("======== Proto File: {} ========", file.name));
        self.lines.push(format!("Syntax: {}", file.syntax));
        self.lines.push(format!("Package: {}", file.package));
        self.lines.push(format!("Path: {}", file.name));

        if !file.imports.is_empty() {
            self.lines.push("Imports:".to_string());
            for import in &file.imports {
                self.lines.push(format!("  - {}", import));
            }
        }
    }

    fn begin_section(&mut self, section: Section) {
        self.lines.push(format!("{}:", section.title()));
    }

    fn begin_message(&mut self, message: &MessageDescriptor, depth: usize) {
        let line = format!("{}message {} {{", self.indent(depth), message.name);
        self.lines.push(line);
    }

    fn field(&mut self, field: &FieldDescriptor, depth: usize) {
        let mut line = format!(
            "{} [{}]{} {}",
            self.indent(depth),
            marker(field),
            field.kind.type_name(),
            field.name
        );
        if let Some(default) = format_default(field) {
            line.push_str(" = ");
            line.push_str(&default);
        }
        line.push(';');
        self.lines.push(line);
    }

    fn end_message(&mut self, _message: &MessageDescriptor, depth: usize) {
        let line = format!("{}}}", self.indent(depth));
        self.lines.push(line);
    }

    fn enum_type(&mut self, enum_type: &EnumDescriptor, depth: usize) {
        let indent = self.indent(depth);
        self.lines.push(format!("{}enum {} {{", indent, enum_type.name));
        for value in &enum_type.values {
            self.lines
                .push(format!("{}  {} = {};", indent, value.name, value.number));
        }
        self.lines.push(format!("{}}}", indent));
    }

    fn service(&mut self, service: &ServiceDescriptor, depth: usize) {
        let indent = self.indent(depth);
        self.lines.push(format!("{}service {} {{", indent, service.name));
        for method in &service.methods {
            let input = if method.client_streaming {
                format!("stream {}", method.input)
            } else {
                method.input.clone()
            };
            let output = if method.server_streaming {
                format!("stream {}", method.output)
            } else {
                method.output.clone()
            };
            self.lines.push(format!(
                "{}  rpc {} ({}) returns ({});",
                indent, method.name, input, output
            ));
        }
        self.lines.push(format!("{}}}", indent));
    }
}
