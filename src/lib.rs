//! Protoparse: a parser for Protocol Buffers `.proto` schema files
//! (proto2 syntax).
//!
//! Feeds on in-memory schema text and produces an immutable [`ProtoFile`]
//! value tree: messages, enums, services, extend blocks, options in their
//! scalar, list, and aggregate forms, and the documentation comments
//! attached to each declaration. Nothing is resolved or validated beyond
//! the syntax itself; downstream tools decide what the type names mean.
//!
//! # Quick Start
//!
//! ```rust
//! use protoparse::{parse, Type};
//!
//! let file = parse("search.proto", r#"
//!     // A single search query.
//!     message SearchRequest {
//!         required string query = 1;
//!         optional int32 page_number = 2;
//!     }
//! "#).unwrap();
//!
//! assert_eq!(file.file_name, "search.proto");
//! match &file.types[0] {
//!     Type::Message(message) => {
//!         assert_eq!(message.name, "SearchRequest");
//!         assert_eq!(message.documentation, "A single search query.");
//!         assert_eq!(message.fields.len(), 2);
//!     }
//!     Type::Enum(_) => unreachable!(),
//! }
//! ```

pub mod error;
pub mod parser;
pub mod types;
pub mod value;

pub use error::ParseError;
pub use parser::parse;
pub use types::{
    EnumType, EnumValue, ExtendDeclaration, ExtensionsRange, Field, Label, MessageType, Method,
    ProtoFile, Service, Type, MAX_TAG_VALUE,
};
pub use value::{OptionMap, OptionValue, ProtoOption};
