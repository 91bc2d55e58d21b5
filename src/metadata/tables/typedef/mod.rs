//! `TypeDef` rows (ECMA-335 II.22.37, table ID `0x02`) and the [`TypeAttributes`] flags.
//!
//! Only the columns needed to locate a definition among the loaded types are kept: flags,
//! namespace and name. Field and method lists live on the runtime
//! [`crate::metadata::typesystem::CilType`].

use crate::metadata::token::Token;

#[allow(non_snake_case)]
/// Type attribute flag constants for `TypeDef` entries and synthesized types.
///
/// ## Visibility Flags
/// - [`TypeAttributes::NOT_PUBLIC`] / [`TypeAttributes::PUBLIC`] - Top-level type visibility
/// - [`TypeAttributes::NESTED_PUBLIC`], [`TypeAttributes::NESTED_PRIVATE`], etc. - Nested type accessibility levels
///
/// ## Layout Flags
/// - [`TypeAttributes::AUTO_LAYOUT`] - Runtime-determined field layout (default)
/// - [`TypeAttributes::SEQUENTIAL_LAYOUT`] - Fields laid out in declaration order
/// - [`TypeAttributes::EXPLICIT_LAYOUT`] - Explicit field offsets specified
pub mod TypeAttributes {
    /// Mask for extracting type visibility information.
    pub const VISIBILITY_MASK: u32 = 0x0000_0007;
    /// Type has no public scope (internal to assembly).
    pub const NOT_PUBLIC: u32 = 0x0000_0000;
    /// Type has public scope (visible outside assembly).
    pub const PUBLIC: u32 = 0x0000_0001;
    /// Nested type with public visibility.
    pub const NESTED_PUBLIC: u32 = 0x0000_0002;
    /// Nested type with private visibility.
    pub const NESTED_PRIVATE: u32 = 0x0000_0003;
    /// Nested type with family (protected) visibility.
    pub const NESTED_FAMILY: u32 = 0x0000_0004;
    /// Nested type with assembly (internal) visibility.
    pub const NESTED_ASSEMBLY: u32 = 0x0000_0005;
    /// Nested type with family-and-assembly visibility.
    pub const NESTED_FAM_AND_ASSEM: u32 = 0x0000_0006;
    /// Nested type with family-or-assembly visibility.
    pub const NESTED_FAM_OR_ASSEM: u32 = 0x0000_0007;

    /// Mask for extracting layout information.
    pub const LAYOUT_MASK: u32 = 0x0000_0018;
    /// Fields are laid out automatically by the runtime.
    pub const AUTO_LAYOUT: u32 = 0x0000_0000;
    /// Fields are laid out sequentially in declaration order.
    pub const SEQUENTIAL_LAYOUT: u32 = 0x0000_0008;
    /// Field layout is supplied explicitly.
    pub const EXPLICIT_LAYOUT: u32 = 0x0000_0010;

    /// Mask for class semantics.
    pub const CLASS_SEMANTICS_MASK: u32 = 0x0000_0020;
    /// Type is a class (or value type).
    pub const CLASS: u32 = 0x0000_0000;
    /// Type is an interface.
    pub const INTERFACE: u32 = 0x0000_0020;
    /// Type cannot be instantiated.
    pub const ABSTRACT: u32 = 0x0000_0080;
    /// Type cannot be derived from.
    pub const SEALED: u32 = 0x0000_0100;
    /// The name has a special meaning to the runtime.
    pub const SPECIAL_NAME: u32 = 0x0000_0400;
    /// Type is imported.
    pub const IMPORT: u32 = 0x0000_1000;
    /// Type is serializable.
    pub const SERIALIZABLE: u32 = 0x0000_2000;
    /// Type initializer may run before the first static field access.
    pub const BEFORE_FIELD_INIT: u32 = 0x0010_0000;
}

#[derive(Clone, Debug, PartialEq, Eq)]
/// The `TypeDef` table defines the types of the current module. `TableId` = 0x02
pub struct TypeDefRaw {
    /// `RowID`
    pub rid: u32,
    /// Token
    pub token: Token,
    /// a 4-byte bitmask of type `TypeAttributes`
    pub flags: u32,
    /// `TypeNamespace` (can be empty)
    pub namespace: String,
    /// `TypeName`
    pub name: String,
}
