//! `TypeRef` rows (ECMA-335 II.22.38, table ID `0x01`).
//!
//! A type reference names a type by namespace and name. The resolution scope (the assembly or
//! module that declares the type) is not needed to locate already-loaded types and is not kept.

use crate::metadata::token::Token;

#[derive(Clone, Debug, PartialEq, Eq)]
/// The `TypeRef` table references types declared in other modules. `TableId` = 0x01
pub struct TypeRefRaw {
    /// `RowID`
    pub rid: u32,
    /// Token
    pub token: Token,
    /// `TypeNamespace` (can be empty)
    pub namespace: String,
    /// `TypeName`
    pub name: String,
}

impl TypeRefRaw {
    /// `Namespace.Name` of the referenced type
    #[must_use]
    pub fn fullname(&self) -> String {
        if self.namespace.is_empty() {
            self.name.clone()
        } else {
            format!("{}.{}", self.namespace, self.name)
        }
    }
}
