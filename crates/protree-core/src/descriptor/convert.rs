//! Conversion from `prost_reflect` descriptors into the renderer's model.
//!
//! This is the boundary where compiled schemas enter the crate. Anything the
//! renderer would otherwise have to guess about (an enum default that names no
//! value, runaway nesting) is rejected here with an error naming the file and
//! the offending descriptor.

use super::{
    DefaultValue, EnumDescriptor, EnumValueDescriptor, FieldDescriptor, FieldKind,
    FileDescriptor, MessageDescriptor, MethodDescriptor, ServiceDescriptor, Syntax,
    MAX_NESTING_DEPTH,
};
use crate::error::{Error, Result};
use prost_reflect::{Cardinality, Kind, Value};
use tracing::trace;

impl FileDescriptor {
    /// Converts a resolved `prost_reflect` file into an owned snapshot.
    pub fn from_reflect(file: &prost_reflect::FileDescriptor) -> Result<Self> {
        let syntax = match file.syntax() {
            prost_reflect::Syntax::Proto3 => Syntax::Proto3,
            _ => Syntax::Proto2,
        };

        let converter = Converter {
            file: file.name(),
            syntax,
        };

        let messages = file
            .messages()
            .map(|message| converter.message(&message, 1))
            .collect::<Result<Vec<_>>>()?;

        let services = file.services().map(|s| converter.service(&s)).collect();

        Ok(Self {
            name: file.name().to_string(),
            syntax,
            package: file.package_name().to_string(),
            imports: file
                .dependencies()
                .map(|dep| dep.name().to_string())
                .collect(),
            messages,
            enums: file.enums().map(|e| converter.enum_type(&e)).collect(),
            services,
        })
    }
}

struct Converter<'a> {
    file: &'a str,
    syntax: Syntax,
}

impl Converter<'_> {
    fn message(
        &self,
        message: &prost_reflect::MessageDescriptor,
        depth: usize,
    ) -> Result<MessageDescriptor> {
        if depth > MAX_NESTING_DEPTH {
            return Err(Error::nesting_too_deep(
                self.file,
                message.full_name(),
                MAX_NESTING_DEPTH,
            ));
        }
        trace!("Converting message {}", message.full_name());

        let fields = message
            .fields()
            .map(|field| self.field(&field))
            .collect::<Result<Vec<_>>>()?;

        let messages = message
            .child_messages()
            .map(|nested| self.message(&nested, depth + 1))
            .collect::<Result<Vec<_>>>()?;

        Ok(MessageDescriptor {
            name: message.name().to_string(),
            full_name: message.full_name().to_string(),
            fields,
            messages,
            enums: message
                .child_enums()
                .map(|e| self.enum_type(&e))
                .collect(),
        })
    }

    fn field(&self, field: &prost_reflect::FieldDescriptor) -> Result<FieldDescriptor> {
        let kind = field.kind();
        let (field_kind, type_name) = match &kind {
            Kind::Double => (FieldKind::Double, None),
            Kind::Float => (FieldKind::Float, None),
            Kind::Int32 => (FieldKind::Int32, None),
            Kind::Int64 => (FieldKind::Int64, None),
            Kind::Uint32 => (FieldKind::Uint32, None),
            Kind::Uint64 => (FieldKind::Uint64, None),
            Kind::Sint32 => (FieldKind::Sint32, None),
            Kind::Sint64 => (FieldKind::Sint64, None),
            Kind::Fixed32 => (FieldKind::Fixed32, None),
            Kind::Fixed64 => (FieldKind::Fixed64, None),
            Kind::Sfixed32 => (FieldKind::Sfixed32, None),
            Kind::Sfixed64 => (FieldKind::Sfixed64, None),
            Kind::Bool => (FieldKind::Bool, None),
            Kind::String => (FieldKind::String, None),
            Kind::Bytes => (FieldKind::Bytes, None),
            Kind::Enum(e) => (FieldKind::Enum, Some(e.full_name().to_string())),
            // Groups are encoded as messages but have no kind of their own here.
            Kind::Message(_) if field.is_group() => (FieldKind::Unknown, None),
            Kind::Message(m) => (FieldKind::Message, Some(m.full_name().to_string())),
        };

        let default = self.default_value(field, &kind)?;

        Ok(FieldDescriptor {
            name: field.name().to_string(),
            number: field.number(),
            kind: field_kind,
            optional_keyword: self.has_optional_keyword(field),
            packed: field.is_packed(),
            default,
            type_name,
        })
    }

    /// proto3 `optional`, or a proto2 optional field outside any oneof.
    fn has_optional_keyword(&self, field: &prost_reflect::FieldDescriptor) -> bool {
        if field.field_descriptor_proto().proto3_optional() {
            return true;
        }
        self.syntax == Syntax::Proto2
            && field.cardinality() == Cardinality::Optional
            && field.containing_oneof().is_none()
    }

    fn default_value(
        &self,
        field: &prost_reflect::FieldDescriptor,
        kind: &Kind,
    ) -> Result<DefaultValue> {
        // Repeated and map fields fall back to the singular default of their kind.
        let value = if field.is_list() || field.is_map() {
            Value::default_value(kind)
        } else {
            Value::default_value_for_field(field)
        };

        let default = match value {
            Value::Bool(v) => DefaultValue::Bool(v),
            Value::I32(v) => DefaultValue::I32(v),
            Value::I64(v) => DefaultValue::I64(v),
            Value::U32(v) => DefaultValue::U32(v),
            Value::U64(v) => DefaultValue::U64(v),
            Value::F32(v) => DefaultValue::F32(v),
            Value::F64(v) => DefaultValue::F64(v),
            Value::String(v) => DefaultValue::String(v),
            Value::Bytes(v) => DefaultValue::Bytes(v),
            Value::EnumNumber(number) => {
                let Kind::Enum(enum_type) = kind else {
                    return Err(Error::unresolved(
                        self.file,
                        field.full_name(),
                        "enum default on a non-enum field",
                    ));
                };
                self.enum_default(field, enum_type, number)?
            }
            _ => DefaultValue::Absent,
        };

        Ok(default)
    }

    fn enum_default(
        &self,
        field: &prost_reflect::FieldDescriptor,
        enum_type: &prost_reflect::EnumDescriptor,
        number: i32,
    ) -> Result<DefaultValue> {
        let value = enum_type.get_value(number).ok_or_else(|| {
            Error::unresolved(
                self.file,
                field.full_name(),
                format!("enum {} has no value {}", enum_type.full_name(), number),
            )
        })?;
        Ok(DefaultValue::Enum {
            name: value.name().to_string(),
            number,
        })
    }

    fn enum_type(&self, enum_type: &prost_reflect::EnumDescriptor) -> EnumDescriptor {
        EnumDescriptor {
            name: enum_type.name().to_string(),
            values: enum_type
                .values()
                .map(|v| EnumValueDescriptor {
                    name: v.name().to_string(),
                    number: v.number(),
                })
                .collect(),
        }
    }

    fn service(&self, service: &prost_reflect::ServiceDescriptor) -> ServiceDescriptor {
        ServiceDescriptor {
            name: service.name().to_string(),
            methods: service
                .methods()
                .map(|m| MethodDescriptor {
                    name: m.name().to_string(),
                    input: m.input().name().to_string(),
                    output: m.output().name().to_string(),
                    client_streaming: m.is_client_streaming(),
                    server_streaming: m.is_server_streaming(),
                })
                .collect(),
        }
    }
}
