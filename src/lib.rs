// Copyright 2025 Johann Kempter
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0

#![doc(html_no_source)]
#![deny(missing_docs)]
#![deny(unsafe_code)]

//! # ilmock
//!
//! Building blocks for test doubles of .NET code: find out which members a compiled method
//! calls, and create new data types at runtime.
//!
//! ## Features
//!
//! - **Call-site disassembly** - Decode the CIL instruction stream of a method body and resolve
//!   every `call` / `callvirt` operand back to the loaded method it targets
//! - **Signature resolution** - Map ECMA-335 type signatures (primitives, arrays, pointers,
//!   by-refs, generic instances, generic parameters) to runtime types
//! - **Structural member matching** - Match member references by name, generic arity, return
//!   type and parameter types, including inherited methods
//! - **Type synthesis** - Describe a type (name, attributes, ordered fields) and create it through
//!   a pluggable backend, with a generated constructor for the write-once fields
//!
//! ## Quick Start
//!
//! ```rust
//! use ilmock::prelude::*;
//!
//! // ldarg.0; call 0x0A000001; ret
//! let stream = decode_stream(&[0x02, 0x28, 0x01, 0x00, 0x00, 0x0A, 0x2A])?;
//!
//! assert_eq!(stream.instructions.len(), 3);
//! assert_eq!(stream.operands[0].position, 1);
//! assert_eq!(stream.operands[0].token, Token::new(0x0A00_0001));
//! # Ok::<(), ilmock::Error>(())
//! ```
//!
//! ## Architecture
//!
//! ### Disassembly
//!
//! - [`disassembler`] - Opcode tables, the instruction decoder and the method body disassembler
//! - [`metadata::signatures`] - Signature blob parsing
//! - [`metadata::typesystem`] - Runtime types, the [`metadata::typesystem::TypeRegistry`] and
//!   the signature type resolver
//! - [`metadata::memberresolver`] - Token to method resolution
//! - [`metadata::module`] / [`metadata::tables`] - The hosting module and its metadata rows
//!
//! ### Synthesis
//!
//! - [`synthesis`] - Descriptors, builders, the [`synthesis::TypeCreationBackend`] capability and
//!   the in-process [`synthesis::RegistryBackend`]
//!
//! ## Error Handling
//!
//! All fallible operations return [`Result<T>`]. Malformed input (unknown opcodes, truncated
//! operands, corrupt signature blobs) is reported as [`Error::Malformed`] or
//! [`Error::OutOfBounds`]. A call site whose target cannot be resolved is not an error, it is
//! left out of the [`disassembler::MethodBodyDescriptor`].
//!
//! ## Standards Compliance
//!
//! - **ECMA-335 6th Edition** - Partition II (metadata, signatures) and Partition III (CIL)
//!
//! ### References
//!
//! - [ECMA-335 Standard](https://ecma-international.org/wp-content/uploads/ECMA-335_6th_edition_june_2012.pdf)

#[macro_use]
pub(crate) mod error;

/// Shared functionality which is used in unit- and integration-tests
#[cfg(test)]
pub(crate) mod test;

/// Convenient re-exports of the most commonly used types and traits.
///
/// # Example
///
/// ```rust
/// use ilmock::prelude::*;
///
/// let registry = TypeRegistry::new();
/// let int32 = registry.get_primitive(CilPrimitiveKind::I4)?;
/// assert_eq!(int32.fullname(), "System.Int32");
/// # Ok::<(), ilmock::Error>(())
/// ```
pub mod prelude;

/// Opcode tables, instruction decoding and method body disassembly based on ECMA-335
///
/// # Key Types
///
/// - [`disassembler::OpcodeDescriptor`] - A static opcode table entry
/// - [`disassembler::DecodedInstructionStream`] - Decoded opcodes plus call operands
/// - [`disassembler::MethodBodyDescriptor`] - Opcodes plus resolved call targets
///
/// # Main Functions
///
/// - [`disassembler::decode_opcode`] - Look up a single opcode
/// - [`disassembler::decode_stream`] - Decode a method body
/// - [`disassembler::disassemble_method`] - Decode and resolve a method body
pub mod disassembler;

/// Byte-level access to instruction streams and signature blobs
pub mod file;

/// Metadata tokens, table rows, signatures and the runtime type universe
///
/// # Key Components
///
/// - [`metadata::token`] - Metadata tokens for cross-references
/// - [`metadata::tables`] - `TypeRef`, `TypeDef`, `TypeSpec` and `MemberRef` rows
/// - [`metadata::signatures`] - Method and type signatures, generics support
/// - [`metadata::typesystem`] - Runtime types and signature type resolution
/// - [`metadata::module`] - The hosting module of a method
/// - [`metadata::memberresolver`] - Call-site token to method resolution
pub mod metadata;

/// Creation of new runtime types from declarative descriptions
pub mod synthesis;

/// `ilmock` Result type
///
/// A type alias for [`std::result::Result<T, Error>`] where the error type is always [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// `ilmock` Error type
///
/// # Examples
///
/// ```rust
/// use ilmock::{synthesis::TypeDescriptorBuilder, Error};
///
/// match TypeDescriptorBuilder::new().name("").build() {
///     Err(Error::InvalidConfiguration(message)) => println!("Rejected: {message}"),
///     other => panic!("Unexpected: {other:?}"),
/// }
/// ```
pub use error::Error;

/// Cursor over a byte slice with ECMA-335 compressed integer support
pub use file::Parser;
