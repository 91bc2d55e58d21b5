//! The capability a runtime must offer to host synthesized types.
//!
//! [`crate::synthesis::TypeSynthesizer`] drives a [`TypeCreationBackend`] through a fixed
//! sequence: define the type, define each field in declaration order, define the single
//! constructor, then finalize. Backends decide what a "type" is on their side; the
//! in-process [`crate::synthesis::RegistryBackend`] finalizes into a [`crate::metadata::typesystem::TypeRegistry`].

use crate::{metadata::typesystem::CilTypeRc, Result};

/// One step of a generated constructor body.
///
/// Constructor bodies are a straight-line sequence: the base initializer runs first, followed by
/// one store per write-once field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstructorOp {
    /// Invoke the parameterless initializer of the base type
    CallBaseInitializer,
    /// Store constructor argument `parameter` (0-based, excluding `this`) into `field`
    StoreField {
        /// Index into the constructor parameters
        parameter: usize,
        /// Field handle returned by [`TypeCreationBackend::define_field`]
        field: usize,
    },
}

/// A runtime that can create new types.
///
/// `Pending` is the backend's representation of a type under construction; it is handed back
/// to every definition call and consumed by [`TypeCreationBackend::create_type`], which returns
/// the usable `Handle`. Each call to `create_type` must produce a distinct type, even for
/// identical definitions.
pub trait TypeCreationBackend {
    /// A type whose definition is still open
    type Pending;
    /// A finalized, instantiable type
    type Handle;

    /// Start the definition of a new type.
    ///
    /// # Errors
    /// Returns an error if the backend cannot host a type with this name or these attributes.
    fn define_type(
        &mut self,
        namespace: &str,
        name: &str,
        attributes: u32,
        value_type: bool,
    ) -> Result<Self::Pending>;

    /// Add an instance field and return its handle.
    ///
    /// # Errors
    /// Returns an error if the field cannot be added (e.g. the name is already taken).
    fn define_field(
        &mut self,
        pending: &mut Self::Pending,
        name: &str,
        field_type: &CilTypeRc,
        attributes: u32,
    ) -> Result<usize>;

    /// Define the single public constructor.
    ///
    /// # Errors
    /// Returns an error if a constructor was already defined or `body` references a parameter
    /// or field that does not exist.
    fn define_constructor(
        &mut self,
        pending: &mut Self::Pending,
        parameters: &[CilTypeRc],
        body: &[ConstructorOp],
    ) -> Result<()>;

    /// Finalize the definition.
    ///
    /// # Errors
    /// Returns an error if the definition is incomplete.
    fn create_type(&mut self, pending: Self::Pending) -> Result<Self::Handle>;
}
