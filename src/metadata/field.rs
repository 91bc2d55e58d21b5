//! Fields of runtime types.

use std::sync::Arc;

use crate::metadata::{
    token::Token,
    typesystem::{CilTypeRc, CilTypeRef},
};

/// A reference to a `CilField`
pub type FieldRc = Arc<CilField>;
/// The fields of a type, in declaration order
pub type FieldList = Arc<boxcar::Vec<FieldRc>>;

#[allow(non_snake_case)]
/// All possible flags for `FieldAttributes`
pub mod FieldAttributes {
    /// These 3 bits contain one of the following values:
    pub const FIELD_ACCESS_MASK: u32 = 0x0007;
    /// Member not referenceable
    pub const COMPILER_CONTROLLED: u32 = 0x0000;
    /// Accessible only by the parent type
    pub const PRIVATE: u32 = 0x0001;
    /// Accessible by sub-types only in this Assembly
    pub const FAM_AND_ASSEM: u32 = 0x0002;
    /// Accessibly by anyone in the Assembly
    pub const ASSEMBLY: u32 = 0x0003;
    /// Accessible only by type and sub-types
    pub const FAMILY: u32 = 0x0004;
    /// Accessibly by sub-types anywhere, plus anyone in assembly
    pub const FAM_OR_ASSEM: u32 = 0x0005;
    /// Accessibly by anyone who has visibility to this scope field contract attributes
    pub const PUBLIC: u32 = 0x0006;
    /// Defined on type, else per instance
    pub const STATIC: u32 = 0x0010;
    /// Field can only be initialized, not written to after init
    pub const INIT_ONLY: u32 = 0x0020;
    /// Value is compile time constant
    pub const LITERAL: u32 = 0x0040;
    /// Reserved (to indicate this field should not be serialized when type is remoted)
    pub const NOT_SERIALIZED: u32 = 0x0080;
    /// Field is special
    pub const SPECIAL_NAME: u32 = 0x0200;
    /// CLI provides 'special' behavior, depending upon the name of the field
    pub const RTSPECIAL_NAME: u32 = 0x0400;
}

/// A field declared by a runtime type
#[derive(Debug)]
pub struct CilField {
    /// Token
    pub token: Token,
    /// The field name
    pub name: String,
    /// a 2-byte bitmask of type `FieldAttributes`
    pub flags: u32,
    /// The declared type of the field
    pub field_type: CilTypeRef,
}

impl CilField {
    /// Create a new field of the given type.
    #[must_use]
    pub fn new(token: Token, name: &str, flags: u32, field_type: &CilTypeRc) -> Self {
        CilField {
            token,
            name: name.to_string(),
            flags,
            field_type: CilTypeRef::from(field_type),
        }
    }

    /// `true` if the field can only be assigned by a constructor
    #[must_use]
    pub fn is_init_only(&self) -> bool {
        self.flags & FieldAttributes::INIT_ONLY != 0
    }

    /// `true` if the field belongs to the type rather than to its instances
    #[must_use]
    pub fn is_static(&self) -> bool {
        self.flags & FieldAttributes::STATIC != 0
    }
}
