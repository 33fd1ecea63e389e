//! Runtime field introspection for Rust records.
//!
//! This crate exposes a uniform API to enumerate, inspect, tag-query and
//! mutate the fields of a struct, including fields that are themselves
//! structs. It is used together with `structs-derive`, which generates the
//! per-type field tables and reflection impls.
//!
//! # Overview
//!
//! The main components are:
//!
//! - [`Field`] - Descriptor for one field: name, kind, tag, value, checked writes
//! - [`Record`] - Root wrapper producing the first level of descriptors
//! - [`Reflect`] - Object-safe dynamic view of a value (deep equality, zero, assignment)
//! - [`Struct`] - Reflection view of a named-field record
//! - [`StructTag`] - `key:"value"` annotation lookup
//! - [`FieldError`] - Failures of field operations
//!
//! # Example
//!
//! ```ignore
//! use structs_core::{Record, Struct};
//!
//! #[derive(Struct)]
//! struct Config {
//!     pub server: Server,
//!     #[structs(tag(json = "debug_mode", structs = "-"))]
//!     pub debug: bool,
//! }
//!
//! #[derive(Struct)]
//! struct Server {
//!     pub port: u16,
//! }
//!
//! let mut config = Config { server: Server { port: 80 }, debug: false };
//! let mut record = Record::new(&mut config);
//!
//! let mut server = record.field("server").unwrap();
//! server.field("port").unwrap().set(8080_u16)?;
//! assert_eq!(config.server.port, 8080);
//! ```

// Lets `#[derive(Struct)]` refer to this crate as `::structs_core` from
// inside the crate itself.
extern crate self as structs_core;

pub mod describe;
pub mod error;
pub mod field;
pub mod kind;
pub mod record;
pub mod reflect;
pub mod tag;

pub use describe::{FieldInfo, Struct};
pub use error::{FieldError, Precondition};
pub use field::{Field, SKIP_MARKER};
pub use kind::Kind;
pub use record::{DEFAULT_TAG_NAME, Record};
pub use reflect::Reflect;
pub use tag::StructTag;

#[cfg(feature = "derive")]
pub use structs_derive::Struct;
