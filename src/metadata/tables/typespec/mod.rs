//! `TypeSpec` rows (ECMA-335 II.22.39, table ID `0x1B`).
//!
//! A type specification describes a constructed type (generic instantiation, array, pointer)
//! through a type signature blob. It is decoded on demand by
//! [`crate::metadata::typesystem::TypeResolver`].

use crate::metadata::token::Token;

#[derive(Clone, Debug, PartialEq, Eq)]
/// The `TypeSpec` table holds the signatures of constructed types. `TableId` = 0x1B
pub struct TypeSpecRaw {
    /// `RowID`
    pub rid: u32,
    /// Token
    pub token: Token,
    /// The type signature blob
    pub signature: Vec<u8>,
}
