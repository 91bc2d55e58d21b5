//! Low-level byte access for instruction streams and signature blobs.
//!
//! Everything above this module works on already-loaded data: a method body is a byte slice,
//! a signature is a byte slice, and both are consumed through the cursor-based
//! [`crate::file::parser::Parser`]. All reads are bounds-checked and report
//! [`crate::Error::OutOfBounds`] instead of panicking.
//!
//! # Key Components
//!
//! - [`crate::file::io`] - Little-endian primitive reads (`read_le`, `read_le_at`)
//! - [`crate::file::parser::Parser`] - Cursor with ECMA-335 compressed integer support

pub mod io;
pub mod parser;

pub use parser::Parser;
