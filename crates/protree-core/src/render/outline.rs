//! Structured export of the rendered tree.
//!
//! [`OutlineVisitor`] builds the same information as the text renderer as
//! plain serializable values, using the same marker and default-value rules.

use super::field::{format_default, Marker};
use super::{walk, Visitor};
use crate::descriptor::{
    EnumDescriptor, FieldDescriptor, FileDescriptor, MessageDescriptor, ServiceDescriptor,
};
use crate::error::{Error, Result};
use crate::registry::Registry;
use serde::Serialize;

/// Outline of one file
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileOutline {
    /// Name
    pub name: String,
    /// Declared syntax
    pub syntax: String,
    /// Package name
    pub package: String,
    /// Imported file names
    pub imports: Vec<String>,
    /// Messages
    pub messages: Vec<MessageOutline>,
    /// Enums
    pub enums: Vec<EnumOutline>,
    /// Services
    pub services: Vec<ServiceOutline>,
}

/// Outline of a message and its nested types
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MessageOutline {
    /// Name
    pub name: String,
    /// Fields in declaration order
    pub fields: Vec<FieldOutline>,
    /// Messages
    pub messages: Vec<MessageOutline>,
    /// Enums
    pub enums: Vec<EnumOutline>,
}

/// Outline of a field
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldOutline {
    /// Name
    pub name: String,
    /// Tag number
    pub number: u32,
    /// Type token
    #[serde(rename = "type")]
    pub type_name: String,
    /// Attribute marker
    pub marker: char,
    /// Formatted default, absent for messages
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
}

/// Outline of an enum
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnumOutline {
    /// Name
    pub name: String,
    /// Values
    pub values: Vec<EnumValueOutline>,
}

/// Outline of an enum value
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnumValueOutline {
    /// Name
    pub name: String,
    /// Numeric value
    pub number: i32,
}

/// Outline of a service
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ServiceOutline {
    /// Name
    pub name: String,
    /// Methods
    pub methods: Vec<MethodOutline>,
}

/// Outline of a method
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MethodOutline {
    /// Name
    pub name: String,
    /// Request message short name
    pub input: String,
    /// Response message short name
    pub output: String,
    /// Request is a stream
    pub client_streaming: bool,
    /// Response is a stream
    pub server_streaming: bool,
}

impl From<&EnumDescriptor> for EnumOutline {
    fn from(enum_type: &EnumDescriptor) -> Self {
        Self {
            name: enum_type.name.clone(),
            values: enum_type
                .values
                .iter()
                .map(|v| EnumValueOutline {
                    name: v.name.clone(),
                    number: v.number,
                })
                .collect(),
        }
    }
}

impl From<&ServiceDescriptor> for ServiceOutline {
    fn from(service: &ServiceDescriptor) -> Self {
        Self {
            name: service.name.clone(),
            methods: service
                .methods
                .iter()
                .map(|m| MethodOutline {
                    name: m.name.clone(),
                    input: m.input.clone(),
                    output: m.output.clone(),
                    client_streaming: m.client_streaming,
                    server_streaming: m.server_streaming,
                })
                .collect(),
        }
    }
}

impl From<&FieldDescriptor> for FieldOutline {
    fn from(field: &FieldDescriptor) -> Self {
        Self {
            name: field.name.clone(),
            number: field.number,
            type_name: field.kind.type_name().to_string(),
            marker: Marker::for_field(field).as_char(),
            default: format_default(field),
        }
    }
}

/// Visitor assembling [`FileOutline`]s
#[derive(Debug, Default)]
pub struct OutlineVisitor {
    files: Vec<FileOutline>,
    current: Option<FileOutline>,
    stack: Vec<MessageOutline>,
}

impl OutlineVisitor {
    /// Creates an empty outline visitor
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the outlines of all walked files
    pub fn finish(self) -> Vec<FileOutline> {
        self.files
    }

    /// Outlines every file of a registry, in sorted name order
    pub fn outline(registry: &Registry) -> Vec<FileOutline> {
        let mut visitor = Self::new();
        walk(registry, &mut visitor);
        visitor.finish()
    }

    /// Outlines a registry as pretty-printed JSON
    pub fn to_json(registry: &Registry) -> Result<String> {
        serde_json::to_string_pretty(&Self::outline(registry))
            .map_err(|e| Error::internal(format!("failed to serialize outline: {}", e)))
    }
}

impl Visitor for OutlineVisitor {
    fn begin_file(&mut self, file: &FileDescriptor) {
        self.current = Some(FileOutline {
            name: file.name.clone(),
            syntax: file.syntax.as_str().to_string(),
            package: file.package.clone(),
            imports: file.imports.clone(),
            messages: Vec::new(),
            enums: Vec::new(),
            services: Vec::new(),
        });
    }

    fn end_file(&mut self, _file: &FileDescriptor) {
        if let Some(file) = self.current.take() {
            self.files.push(file);
        }
    }

    fn begin_message(&mut self, message: &MessageDescriptor, _depth: usize) {
        self.stack.push(MessageOutline {
            name: message.name.clone(),
            fields: Vec::new(),
            messages: Vec::new(),
            enums: Vec::new(),
        });
    }

    fn field(&mut self, field: &FieldDescriptor, _depth: usize) {
        if let Some(message) = self.stack.last_mut() {
            message.fields.push(field.into());
        }
    }

    fn end_message(&mut self, _message: &MessageDescriptor, _depth: usize) {
        let Some(message) = self.stack.pop() else {
            return;
        };
        if let Some(parent) = self.stack.last_mut() {
            parent.messages.push(message);
        } else if let Some(file) = self.current.as_mut() {
            file.messages.push(message);
        }
    }

    fn enum_type(&mut self, enum_type: &EnumDescriptor, _depth: usize) {
        if let Some(message) = self.stack.last_mut() {
            message.enums.push(enum_type.into());
        } else if let Some(file) = self.current.as_mut() {
            file.enums.push(enum_type.into());
        }
    }

    fn service(&mut self, service: &ServiceDescriptor, _depth: usize) {
        if let Some(file) = self.current.as_mut() {
            file.services.push(service.into());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::{DefaultValue, FieldKind, MethodDescriptor, Syntax};
    use pretty_assertions::assert_eq;

    fn registry() -> Registry {
        let file = FileDescriptor::new("shop.proto", Syntax::Proto2, "shop")
            .with_message(
                MessageDescriptor::new("Order")
                    .with_field(
                        FieldDescriptor::new("note", 1, FieldKind::String)
                            .optional(true)
                            .with_default(DefaultValue::String("none".to_string())),
                    )
                    .with_field(FieldDescriptor::new("item", 2, FieldKind::Message))
                    .with_message(
                        MessageDescriptor::new("Line")
                            .with_field(FieldDescriptor::new("qty", 1, FieldKind::Uint32).packed(true)),
                    )
                    .with_enum(EnumDescriptor::new("State").with_value("OPEN", 0)),
            )
            .with_enum(EnumDescriptor::new("Currency").with_value("EUR", 0))
            .with_service(
                ServiceDescriptor::new("Orders")
                    .with_method(MethodDescriptor::new("Place", "Order", "Order")),
            );
        [file].into_iter().collect()
    }

    #[test]
    fn test_outline_structure() {
        let files = OutlineVisitor::outline(&registry());
        assert_eq!(files.len(), 1);

        let file = &files[0];
        assert_eq!(file.syntax, "proto2");
        assert_eq!(file.enums[0].name, "Currency");
        assert_eq!(file.services[0].methods[0].input, "Order");

        let order = &file.messages[0];
        assert_eq!(
            order.fields[0],
            FieldOutline {
                name: "note".to_string(),
                number: 1,
                type_name: "string".to_string(),
                marker: 'o',
                default: Some("\"none\"".to_string()),
            }
        );
        assert_eq!(order.fields[1].default, None);
        assert_eq!(order.enums[0].name, "State");

        let line = &order.messages[0];
        assert_eq!(line.name, "Line");
        assert_eq!(line.fields[0].marker, '+');
        assert_eq!(line.fields[0].default.as_deref(), Some("0"));
    }

    #[test]
    fn test_outline_json() {
        let json = OutlineVisitor::to_json(&registry()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        let field = &value[0]["messages"][0]["fields"][1];
        assert_eq!(field["type"], "message");
        assert_eq!(field["marker"], "*");
        assert!(field.get("default").is_none());
        assert_eq!(value[0]["messages"][0]["messages"][0]["name"], "Line");
    }
}
