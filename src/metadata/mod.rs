//! Metadata of loaded modules and the runtime type universe.
//!
//! This module holds everything the disassembler needs to turn a call operand into a method:
//! the metadata rows a token can address, the signature blobs those rows carry, and the
//! already-loaded types whose methods are matched against them.
//!
//! # Key Components
//!
//! - [`token`] - Metadata table row references used throughout .NET
//! - [`tables`] - `TypeRef`, `TypeDef`, `TypeSpec` and `MemberRef` rows
//! - [`signatures`] - Method and type signature parsing
//! - [`typesystem`] - Runtime types, the registry and the signature type resolver
//! - [`method`] / [`field`] - Members of runtime types
//! - [`module`] - A hosting module: tables plus declared types
//! - [`memberresolver`] - Call operand to method resolution
//!
//! # Examples
//!
//! ```rust
//! use ilmock::metadata::{
//!     module::Module,
//!     tables::{TableId, TableSet},
//!     typesystem::CilFlavor,
//! };
//!
//! let mut tables = TableSet::default();
//! let type_ref = tables.add_type_ref("System", "Object");
//! assert_eq!(type_ref.table_id(), Some(TableId::TypeRef));
//!
//! let module = Module::new("Sample.dll", tables);
//! let object = module.find_type("System", "Object")?;
//! assert_eq!(object.flavor, CilFlavor::Object);
//! # Ok::<(), ilmock::Error>(())
//! ```

/// Fields of runtime types
pub mod field;
/// Resolution of call-site operands to loaded methods
pub mod memberresolver;
/// Methods of runtime types and their flags
pub mod method;
/// The hosting module a method body is resolved in
pub mod module;
/// Implementation of method and type signatures
pub mod signatures;
/// Metadata table rows
pub mod tables;
/// Metadata tokens
pub mod token;
/// The runtime type system
pub mod typesystem;
