//! Signature blob decoding (ECMA-335 II.23.2).
//!
//! Member references carry their method signature as a blob; TypeSpec rows carry a type
//! signature. Both are decoded into [`TypeSignature`] / [`SignatureMethod`] trees here and turned
//! into runtime types by [`crate::metadata::typesystem::TypeResolver`].
//!
//! # Examples
//!
//! ```rust
//! use ilmock::metadata::signatures::{parse_method_signature, TypeSignature};
//!
//! // instance int32 Add(int32, int32)
//! let method = parse_method_signature(&[0x20, 0x02, 0x08, 0x08, 0x08])?;
//! assert!(method.has_this);
//! assert_eq!(method.return_type.base, TypeSignature::I4);
//! assert_eq!(method.params.len(), 2);
//! # Ok::<(), ilmock::Error>(())
//! ```

mod parser;
mod types;

pub use parser::{SignatureParser, MAX_SIGNATURE_DEPTH};
pub use types::*;

use crate::Result;

/// Parse a method signature blob.
///
/// # Errors
/// Returns an error if the blob is malformed or uses an unsupported element type.
pub fn parse_method_signature(data: &[u8]) -> Result<SignatureMethod> {
    let mut parser = SignatureParser::new(data);
    parser.parse_method_signature()
}

/// Parse a TypeSpec signature blob into the type it describes.
///
/// # Errors
/// Returns an error if the blob is malformed or uses an unsupported element type.
pub fn parse_type_spec_signature(data: &[u8]) -> Result<TypeSignature> {
    let mut parser = SignatureParser::new(data);
    parser.parse_type()
}

/// `true` if a MemberRef signature blob describes a field rather than a method.
#[must_use]
pub fn is_field_signature(data: &[u8]) -> bool {
    data.first()
        .is_some_and(|header| header & SIGNATURE_HEADER::KIND_MASK == SIGNATURE_HEADER::FIELD)
}
