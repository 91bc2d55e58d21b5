//! Metadata table rows read while resolving call sites.
//!
//! The resolver never depends on a binary table layout: it reads rows through the
//! [`MetadataTables`] capability, which any source able to look up a row by table and 1-based row
//! number can implement. [`TableSet`] is the in-memory implementation.
//!
//! # Key Components
//!
//! - [`TableId`] - The table a token addresses
//! - [`CodedIndex`] / [`CodedIndexType`] - Multi-table row references
//! - [`TypeRefRaw`], [`TypeDefRaw`], [`TypeSpecRaw`], [`MemberRefRaw`] - Row records
//! - [`MetadataTables`] - Typed row lookup
//! - [`TableSet`] - In-memory tables
//!
//! # References
//!
//! - [ECMA-335 Standard](https://ecma-international.org/wp-content/uploads/ECMA-335_6th_edition_june_2012.pdf) - Partition II, Section 22

mod memberref;
mod tableset;
mod typedef;
mod typeref;
mod types;
mod typespec;

pub use memberref::{MemberRefKind, MemberRefRaw};
pub use tableset::TableSet;
pub use typedef::{TypeAttributes, TypeDefRaw};
pub use typeref::TypeRefRaw;
pub use types::{CodedIndex, CodedIndexType, TableId};
pub use typespec::TypeSpecRaw;

/// Typed row lookups by 1-based row number.
///
/// Implementations return `None` for rows that do not exist.
pub trait MetadataTables: Send + Sync {
    /// Row `rid` of the `TypeRef` table
    fn type_ref(&self, rid: u32) -> Option<&TypeRefRaw>;

    /// Row `rid` of the `TypeDef` table
    fn type_def(&self, rid: u32) -> Option<&TypeDefRaw>;

    /// Row `rid` of the `TypeSpec` table
    fn type_spec(&self, rid: u32) -> Option<&TypeSpecRaw>;

    /// Row `rid` of the `MemberRef` table
    fn member_ref(&self, rid: u32) -> Option<&MemberRefRaw>;

    /// Number of rows in `table`; tables the implementation does not carry report 0
    fn row_count(&self, table: TableId) -> u32;
}
