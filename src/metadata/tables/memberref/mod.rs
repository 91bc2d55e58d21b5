//! `MemberRef` rows (ECMA-335 II.22.25, table ID `0x0A`).
//!
//! A member reference names a field or method of some type as seen from the referencing module:
//! the declaring type (a `MemberRefParent` coded index), the member name and its signature blob.
//! Whether the row describes a field or a method follows from the first byte of the signature.

use crate::metadata::{signatures::is_field_signature, tables::CodedIndex, token::Token};

/// The kind of member a `MemberRef` row describes
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MemberRefKind {
    /// A method or constructor
    Method,
    /// A field
    Field,
}

#[derive(Clone, Debug, PartialEq, Eq)]
/// The `MemberRef` table references members (fields or methods) of types. `TableId` = 0x0A
pub struct MemberRefRaw {
    /// `RowID`
    pub rid: u32,
    /// Token
    pub token: Token,
    /// an index into the `MethodDef`, `ModuleRef`, `TypeDef`, `TypeRef`, or `TypeSpec` tables; more precisely, a `MemberRefParent` (II.24.2.6) coded index
    pub class: CodedIndex,
    /// The member name
    pub name: String,
    /// The signature blob
    pub signature: Vec<u8>,
}

impl MemberRefRaw {
    /// Field or method, decided by the signature's calling convention byte
    #[must_use]
    pub fn kind(&self) -> MemberRefKind {
        if is_field_signature(&self.signature) {
            MemberRefKind::Field
        } else {
            MemberRefKind::Method
        }
    }
}
