//! Coded indices (ECMA-335 II.24.2.6).
//!
//! A coded index stores a table tag in its low bits and a row number in the remaining bits, so
//! that one column can point into several tables. Only the combinations needed to follow member
//! references back to their declaring types are modelled here.

use crate::{
    metadata::{tables::TableId, token::Token},
    Result,
};

/// The coded index combinations this crate decodes.
#[derive(Debug, Hash, Eq, PartialEq, Clone, Copy)]
pub enum CodedIndexType {
    /// References `TypeDef`, `TypeRef`, or `TypeSpec` tables (2 tag bits).
    TypeDefOrRef,

    /// References `TypeDef`, `TypeRef`, `ModuleRef`, `MethodDef`, or `TypeSpec` tables (3 tag
    /// bits). This is the declaring-type column of a `MemberRef` row.
    MemberRefParent,
}

impl CodedIndexType {
    /// The tables this coded index can address, in tag order.
    #[must_use]
    pub fn tables(&self) -> &'static [TableId] {
        match self {
            CodedIndexType::TypeDefOrRef => &[TableId::TypeDef, TableId::TypeRef, TableId::TypeSpec],
            CodedIndexType::MemberRefParent => &[
                TableId::TypeDef,
                TableId::TypeRef,
                TableId::ModuleRef,
                TableId::MethodDef,
                TableId::TypeSpec,
            ],
        }
    }

    /// Number of low bits used for the tag.
    #[must_use]
    pub fn tag_bits(&self) -> u32 {
        match self {
            CodedIndexType::TypeDefOrRef => 2,
            CodedIndexType::MemberRefParent => 3,
        }
    }
}

/// A decoded coded index: the target table, the row and the equivalent token.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CodedIndex {
    /// The table the index points into
    pub tag: TableId,
    /// The 1-based row within that table
    pub row: u32,
    /// The token for `tag` and `row`
    pub token: Token,
}

impl CodedIndex {
    /// Create a coded index pointing at `row` of `tag`.
    #[must_use]
    pub fn new(tag: TableId, row: u32) -> CodedIndex {
        CodedIndex {
            tag,
            row,
            token: Token::from_parts(tag, row),
        }
    }

    /// Decode a raw coded index value.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if the tag does not name one of the tables of
    /// `kind`.
    pub fn decode(value: u32, kind: CodedIndexType) -> Result<CodedIndex> {
        let bits = kind.tag_bits();
        let tag = (value & ((1 << bits) - 1)) as usize;

        match kind.tables().get(tag) {
            Some(table) => Ok(CodedIndex::new(*table, value >> bits)),
            None => Err(malformed_error!(
                "Invalid tag {} for coded index {:?}",
                tag,
                kind
            )),
        }
    }

    /// Encode back into the raw coded index value.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if `tag` is not addressable through `kind`.
    pub fn encode(&self, kind: CodedIndexType) -> Result<u32> {
        let tag = kind
            .tables()
            .iter()
            .position(|table| *table == self.tag)
            .ok_or_else(|| {
                malformed_error!("Table {:?} is not addressable through {:?}", self.tag, kind)
            })?;

        #[allow(clippy::cast_possible_truncation)]
        Ok((self.row << kind.tag_bits()) | tag as u32)
    }
}
