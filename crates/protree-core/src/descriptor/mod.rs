//! Immutable descriptor model consumed by the renderer.
//!
//! These types are a resolved snapshot of a schema: every message, enum and
//! method reference has already been looked up by the schema compiler. They
//! are produced by [`FileDescriptor::from_reflect`] or built by hand, and are
//! never mutated once stored in a [`Registry`](crate::Registry).

mod convert;

use bytes::Bytes;
use std::fmt;

/// Deepest message nesting accepted when converting compiled descriptors
pub const MAX_NESTING_DEPTH: usize = 1000;

/// Proto syntax version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Syntax {
    /// Proto2 syntax
    #[default]
    Proto2,
    /// Proto3 syntax
    Proto3,
}

impl Syntax {
    /// Returns the syntax declaration string
    pub fn as_str(&self) -> &'static str {
        match self {
            Syntax::Proto2 => "proto2",
            Syntax::Proto3 => "proto3",
        }
    }
}

impl fmt::Display for Syntax {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The primitive or structural type of a field.
///
/// `Unknown` covers groups and any type code this crate does not recognize.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    /// 64-bit float
    Double,
    /// 32-bit float
    Float,
    /// Signed varint, 32 bits
    Int32,
    /// Signed varint, 64 bits
    Int64,
    /// Unsigned varint, 32 bits
    Uint32,
    /// Unsigned varint, 64 bits
    Uint64,
    /// Zigzag varint, 32 bits
    Sint32,
    /// Zigzag varint, 64 bits
    Sint64,
    /// Fixed-width unsigned, 32 bits
    Fixed32,
    /// Fixed-width unsigned, 64 bits
    Fixed64,
    /// Fixed-width signed, 32 bits
    Sfixed32,
    /// Fixed-width signed, 64 bits
    Sfixed64,
    /// Boolean
    Bool,
    /// UTF-8 string
    String,
    /// Raw bytes
    Bytes,
    /// Enum value
    Enum,
    /// Embedded message
    Message,
    /// Anything else
    Unknown,
}

impl FieldKind {
    /// Returns the canonical lowercase type token for this kind.
    pub fn type_name(self) -> &'static str {
        match self {
            FieldKind::Double => "double",
            FieldKind::Float => "float",
            FieldKind::Int32 => "int32",
            FieldKind::Int64 => "int64",
            FieldKind::Uint32 => "uint32",
            FieldKind::Uint64 => "uint64",
            FieldKind::Sint32 => "sint32",
            FieldKind::Sint64 => "sint64",
            FieldKind::Fixed32 => "fixed32",
            FieldKind::Fixed64 => "fixed64",
            FieldKind::Sfixed32 => "sfixed32",
            FieldKind::Sfixed64 => "sfixed64",
            FieldKind::Bool => "bool",
            FieldKind::String => "string",
            FieldKind::Bytes => "bytes",
            FieldKind::Enum => "enum",
            FieldKind::Message => "message",
            FieldKind::Unknown => "unknown",
        }
    }

    /// Maps a `FieldDescriptorProto.Type` code to a kind.
    ///
    /// Groups (10) and codes outside the known range map to `Unknown`.
    pub fn from_type_code(code: i32) -> Self {
        match code {
            1 => FieldKind::Double,
            2 => FieldKind::Float,
            3 => FieldKind::Int64,
            4 => FieldKind::Uint64,
            5 => FieldKind::Int32,
            6 => FieldKind::Fixed64,
            7 => FieldKind::Fixed32,
            8 => FieldKind::Bool,
            9 => FieldKind::String,
            11 => FieldKind::Message,
            12 => FieldKind::Bytes,
            13 => FieldKind::Uint32,
            14 => FieldKind::Enum,
            15 => FieldKind::Sfixed32,
            16 => FieldKind::Sfixed64,
            17 => FieldKind::Sint32,
            18 => FieldKind::Sint64,
            _ => FieldKind::Unknown,
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name())
    }
}

/// The resolved default of a field.
///
/// Explicit proto2 defaults and implicit zero values are stored the same way.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum DefaultValue {
    /// No default applies (message fields)
    #[default]
    Absent,
    /// Boolean default
    Bool(bool),
    /// int32 / sint32 / sfixed32 default
    I32(i32),
    /// int64 / sint64 / sfixed64 default
    I64(i64),
    /// uint32 / fixed32 default
    U32(u32),
    /// uint64 / fixed64 default
    U64(u64),
    /// float default
    F32(f32),
    /// double default
    F64(f64),
    /// string default
    String(String),
    /// bytes default
    Bytes(Bytes),
    /// Enum default, by symbolic name and number
    Enum {
        /// Name of the enum value
        name: String,
        /// Numeric value
        number: i32,
    },
}

impl DefaultValue {
    /// Returns true if no default is stored
    pub fn is_absent(&self) -> bool {
        matches!(self, DefaultValue::Absent)
    }
}

impl fmt::Display for DefaultValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DefaultValue::Absent => Ok(()),
            DefaultValue::Bool(v) => write!(f, "{}", v),
            DefaultValue::I32(v) => write!(f, "{}", v),
            DefaultValue::I64(v) => write!(f, "{}", v),
            DefaultValue::U32(v) => write!(f, "{}", v),
            DefaultValue::U64(v) => write!(f, "{}", v),
            DefaultValue::F32(v) => write!(f, "{}", v),
            DefaultValue::F64(v) => write!(f, "{}", v),
            DefaultValue::String(v) => f.write_str(v),
            DefaultValue::Bytes(v) => {
                f.write_str("[")?;
                for (i, b) in v.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" ")?;
                    }
                    write!(f, "{}", b)?;
                }
                f.write_str("]")
            }
            DefaultValue::Enum { name, .. } => f.write_str(name),
        }
    }
}

/// A resolved `.proto` file
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FileDescriptor {
    /// File name, unique within a registry
    pub name: String,
    /// Declared syntax
    pub syntax: Syntax,
    /// Package name, empty if none
    pub package: String,
    /// Imported file names in declaration order
    pub imports: Vec<String>,
    /// Top-level messages
    pub messages: Vec<MessageDescriptor>,
    /// Top-level enums
    pub enums: Vec<EnumDescriptor>,
    /// Services
    pub services: Vec<ServiceDescriptor>,
}

impl FileDescriptor {
    /// Creates an empty file descriptor
    pub fn new(name: impl Into<String>, syntax: Syntax, package: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            syntax,
            package: package.into(),
            ..Self::default()
        }
    }

    /// Adds an import
    pub fn with_import(mut self, import: impl Into<String>) -> Self {
        self.imports.push(import.into());
        self
    }

    /// Adds a top-level message
    pub fn with_message(mut self, message: MessageDescriptor) -> Self {
        self.messages.push(message);
        self
    }

    /// Adds a top-level enum
    pub fn with_enum(mut self, enum_type: EnumDescriptor) -> Self {
        self.enums.push(enum_type);
        self
    }

    /// Adds a service
    pub fn with_service(mut self, service: ServiceDescriptor) -> Self {
        self.services.push(service);
        self
    }
}

/// A message type
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MessageDescriptor {
    /// Short name
    pub name: String,
    /// Fully-qualified name
    pub full_name: String,
    /// Fields in declaration order
    pub fields: Vec<FieldDescriptor>,
    /// Nested message types
    pub messages: Vec<MessageDescriptor>,
    /// Nested enum types
    pub enums: Vec<EnumDescriptor>,
}

impl MessageDescriptor {
    /// Creates an empty message whose full name equals its short name
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            full_name: name.clone(),
            name,
            ..Self::default()
        }
    }

    /// Adds a field
    pub fn with_field(mut self, field: FieldDescriptor) -> Self {
        self.fields.push(field);
        self
    }

    /// Adds a nested message
    pub fn with_message(mut self, message: MessageDescriptor) -> Self {
        self.messages.push(message);
        self
    }

    /// Adds a nested enum
    pub fn with_enum(mut self, enum_type: EnumDescriptor) -> Self {
        self.enums.push(enum_type);
        self
    }
}

/// A message field
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDescriptor {
    /// Field name
    pub name: String,
    /// Tag number
    pub number: u32,
    /// Field kind
    pub kind: FieldKind,
    /// Declared with an explicit `optional` keyword
    pub optional_keyword: bool,
    /// Uses packed encoding
    pub packed: bool,
    /// Resolved default value
    pub default: DefaultValue,
    /// Full name of the referenced message or enum type
    pub type_name: Option<String>,
}

impl FieldDescriptor {
    /// Creates a field with the zero default of its kind.
    ///
    /// Enum fields start with an absent default; set one with
    /// [`with_default`](Self::with_default).
    pub fn new(name: impl Into<String>, number: u32, kind: FieldKind) -> Self {
        let default = match kind {
            FieldKind::Double => DefaultValue::F64(0.0),
            FieldKind::Float => DefaultValue::F32(0.0),
            FieldKind::Int32 | FieldKind::Sint32 | FieldKind::Sfixed32 => DefaultValue::I32(0),
            FieldKind::Int64 | FieldKind::Sint64 | FieldKind::Sfixed64 => DefaultValue::I64(0),
            FieldKind::Uint32 | FieldKind::Fixed32 => DefaultValue::U32(0),
            FieldKind::Uint64 | FieldKind::Fixed64 => DefaultValue::U64(0),
            FieldKind::Bool => DefaultValue::Bool(false),
            FieldKind::String => DefaultValue::String(String::new()),
            FieldKind::Bytes => DefaultValue::Bytes(Bytes::new()),
            FieldKind::Enum | FieldKind::Message | FieldKind::Unknown => DefaultValue::Absent,
        };
        Self {
            name: name.into(),
            number,
            kind,
            optional_keyword: false,
            packed: false,
            default,
            type_name: None,
        }
    }

    /// Sets the explicit optional flag
    pub fn optional(mut self, optional: bool) -> Self {
        self.optional_keyword = optional;
        self
    }

    /// Sets the packed flag
    pub fn packed(mut self, packed: bool) -> Self {
        self.packed = packed;
        self
    }

    /// Sets the default value
    pub fn with_default(mut self, default: DefaultValue) -> Self {
        self.default = default;
        self
    }

    /// Sets the referenced type name
    pub fn with_type_name(mut self, type_name: impl Into<String>) -> Self {
        self.type_name = Some(type_name.into());
        self
    }
}

/// An enum type
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EnumDescriptor {
    /// Short name
    pub name: String,
    /// Values in declaration order
    pub values: Vec<EnumValueDescriptor>,
}

impl EnumDescriptor {
    /// Creates an empty enum
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            values: Vec::new(),
        }
    }

    /// Adds a value
    pub fn with_value(mut self, name: impl Into<String>, number: i32) -> Self {
        self.values.push(EnumValueDescriptor {
            name: name.into(),
            number,
        });
        self
    }
}

/// A single enum value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumValueDescriptor {
    /// Value name
    pub name: String,
    /// Numeric value
    pub number: i32,
}

/// A service
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ServiceDescriptor {
    /// Short name
    pub name: String,
    /// Methods in declaration order
    pub methods: Vec<MethodDescriptor>,
}

impl ServiceDescriptor {
    /// Creates an empty service
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            methods: Vec::new(),
        }
    }

    /// Adds a method
    pub fn with_method(mut self, method: MethodDescriptor) -> Self {
        self.methods.push(method);
        self
    }
}

/// A service method
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodDescriptor {
    /// Method name
    pub name: String,
    /// Short name of the request message
    pub input: String,
    /// Short name of the response message
    pub output: String,
    /// Request is a stream
    pub client_streaming: bool,
    /// Response is a stream
    pub server_streaming: bool,
}

impl MethodDescriptor {
    /// Creates a unary method
    pub fn new(
        name: impl Into<String>,
        input: impl Into<String>,
        output: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            input: input.into(),
            output: output.into(),
            client_streaming: false,
            server_streaming: false,
        }
    }

    /// Sets the streaming flags
    pub fn streaming(mut self, client: bool, server: bool) -> Self {
        self.client_streaming = client;
        self.server_streaming = server;
        self
    }
}
