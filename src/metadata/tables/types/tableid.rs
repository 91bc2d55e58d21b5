use strum::{EnumCount, EnumIter, IntoEnumIterator};

/// Identifiers for the metadata tables a token can address.
///
/// The numeric values are the table IDs of ECMA-335 and appear as the high byte of a
/// [`crate::metadata::token::Token`]. Only `TypeRef`, `TypeDef`, `TypeSpec` and `MemberRef` rows
/// are read while resolving call sites; the other tables are listed so that tokens addressing
/// them can be classified (and rejected) by name.
///
/// ## Reference
/// * [ECMA-335 Partition II, Section 22](https://ecma-international.org/wp-content/uploads/ECMA-335_6th_edition_june_2012.pdf) - Metadata Tables
#[derive(Clone, Copy, PartialEq, Debug, EnumIter, EnumCount, Eq, Hash)]
pub enum TableId {
    /// `Module` table (0x00) - Information about the current module.
    Module = 0x00,

    /// `TypeRef` table (0x01) - References to types defined in other modules.
    ///
    /// Each row carries the namespace and name of the referenced type together with its
    /// resolution scope.
    TypeRef = 0x01,

    /// `TypeDef` table (0x02) - Definitions of types within this module.
    TypeDef = 0x02,

    /// `Field` table (0x04) - Field definitions within types.
    Field = 0x04,

    /// `MethodDef` table (0x06) - Method definitions within types.
    ///
    /// Calls to methods of the same module may use `MethodDef` tokens directly; those are not
    /// resolved as call targets.
    MethodDef = 0x06,

    /// `Param` table (0x08) - Parameter definitions for methods.
    Param = 0x08,

    /// `InterfaceImpl` table (0x09) - Interface implementations by types.
    InterfaceImpl = 0x09,

    /// `MemberRef` table (0x0A) - References to fields and methods of other types.
    ///
    /// Contains the declaring type (a `MemberRefParent` coded index), the member name and its
    /// signature blob. This is the table call operands are resolved through.
    MemberRef = 0x0A,

    /// `CustomAttribute` table (0x0C) - Custom attribute applications.
    CustomAttribute = 0x0C,

    /// `StandAloneSig` table (0x11) - Standalone signatures (locals, `calli` targets).
    StandAloneSig = 0x11,

    /// `Event` table (0x14) - Event definitions within types.
    Event = 0x14,

    /// `Property` table (0x17) - Property definitions within types.
    Property = 0x17,

    /// `ModuleRef` table (0x1A) - References to other modules of the same assembly.
    ModuleRef = 0x1A,

    /// `TypeSpec` table (0x1B) - Constructed types described by a signature blob.
    ///
    /// Generic instantiations, arrays and pointers used as member parents appear here.
    TypeSpec = 0x1B,

    /// `Assembly` table (0x20) - The current assembly.
    Assembly = 0x20,

    /// `AssemblyRef` table (0x23) - References to other assemblies.
    AssemblyRef = 0x23,

    /// `GenericParam` table (0x2A) - Generic parameter definitions.
    GenericParam = 0x2A,

    /// `MethodSpec` table (0x2B) - Instantiations of generic methods.
    MethodSpec = 0x2B,
}

impl TableId {
    /// Map a token's high byte to a table, `None` if the selector is not a known table.
    #[must_use]
    pub fn from_selector(selector: u8) -> Option<TableId> {
        TableId::iter().find(|table| *table as u8 == selector)
    }
}
