//! # protree-core
//!
//! A library for rendering resolved Protocol Buffer schemas as a
//! deterministic, annotated text tree.
//!
//! This crate provides the core functionality for:
//! - Compiling `.proto` files (or loading compiled descriptor sets) into an
//!   immutable descriptor model
//! - Keeping the loaded files in a [`Registry`] with stable ordering
//! - Rendering every file, message, enum and service as indented text, or
//!   as a serializable outline
//!
//! ## Architecture
//!
//! The library is organized into several modules:
//!
//! - [`parser`]: Schema compilation and descriptor-set loading
//! - [`descriptor`]: The resolved descriptor model
//! - [`registry`]: File name → descriptor store
//! - [`render`]: Tree walk, text renderer and structured outline
//! - [`error`]: Error types and handling
//!
//! ## Example
//!
//! ```no_run
//! use protree_core::{ParserConfig, ProtoParser, Registry, Renderer};
//!
//! let parser = ProtoParser::with_config(ParserConfig::new().import_path("./protos"));
//! let mut registry = Registry::new();
//! parser.parse_file("protos/person.proto", &mut registry)?;
//!
//! for line in Renderer::new().render(&registry) {
//!     println!("{}", line);
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Extensibility
//!
//! [`Visitor`] receives every element the walk visits; implement it to
//! produce other output formats.

#![deny(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, unreachable_pub)]

pub mod descriptor;
pub mod error;
pub mod parser;
pub mod registry;
pub mod render;

// Re-export primary types for convenience
pub use descriptor::{FieldKind, FileDescriptor};
pub use error::{Error, Result};
pub use parser::{ParserConfig, ProtoParser};
pub use registry::Registry;
pub use render::{OutlineVisitor, RenderConfig, Renderer, StatsVisitor, Visitor};

/// Crate version for programmatic access
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
