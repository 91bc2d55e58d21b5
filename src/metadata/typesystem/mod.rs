//! The runtime type universe that call targets are matched against.
//!
//! Every hosting module owns a [`TypeRegistry`] with the types it declares. Types are shared as
//! [`CilTypeRc`] and carry their fields and methods; constructed types (arrays, pointers,
//! by-refs, generic instantiations) are created on demand by the registry and point at their
//! component types.
//!
//! # Type identity
//!
//! [`CilType::is_equivalent`] is the equality used during member matching:
//! - primitives compare by kind, so `System.Int32` from two registries is the same type
//! - constructed types compare structurally (shape plus component types)
//! - generic parameters compare by position and owner kind (type or method)
//! - every other type compares by identity
//!
//! # Key Components
//!
//! - [`CilType`] / [`CilTypeRc`] / [`CilTypeRef`] - Types and handles
//! - [`CilFlavor`] - The kind of a type
//! - [`CilPrimitiveKind`] - Built-in primitives
//! - [`TypeRegistry`] - Owning store with name lookup and linked fallback registries
//! - [`TypeResolver`] - The Signature Type Resolver

mod base;
mod primitives;
mod registry;
mod resolver;

pub use base::{ArrayDimensions, CilFlavor, CilTypeRef};
pub use primitives::CilPrimitiveKind;
pub use registry::TypeRegistry;
pub use resolver::TypeResolver;

use std::{
    fmt,
    sync::{Arc, OnceLock},
};

use crate::metadata::{
    field::{FieldList, FieldRc},
    method::{MethodList, MethodRc},
    token::Token,
};

/// Reference to a `CilType`
pub type CilTypeRc = Arc<CilType>;

/// Maximum length of a base-class chain that is followed
const MAX_INHERITANCE_DEPTH: usize = 64;

/// A type of the runtime type universe: declared, primitive or constructed.
pub struct CilType {
    /// Registry token (primitives use fixed tokens, everything else is allocated)
    pub token: Token,
    /// The kind of type
    pub flavor: CilFlavor,
    /// `TypeNamespace` (can be empty)
    pub namespace: String,
    /// `TypeName`
    pub name: String,
    /// Flags (a 4-byte bitmask of type `TypeAttributes`)
    pub flags: u32,
    /// Names of the generic parameters of a generic type definition, in order
    pub generic_params: Vec<String>,
    /// Component type: the element of arrays, pointers and by-refs, the generic definition of
    /// generic instances
    pub element: Option<CilTypeRc>,
    /// Type arguments of a generic instance
    pub generic_args: Vec<CilTypeRc>,
    /// All fields this type declares, in declaration order
    pub fields: FieldList,
    /// All methods this type declares
    pub methods: MethodList,
    base: OnceLock<CilTypeRef>,
}

impl CilType {
    /// Create a new named type with no members.
    #[must_use]
    pub fn new(token: Token, flavor: CilFlavor, namespace: &str, name: &str, flags: u32) -> Self {
        CilType {
            token,
            flavor,
            namespace: namespace.to_string(),
            name: name.to_string(),
            flags,
            generic_params: Vec::new(),
            element: None,
            generic_args: Vec::new(),
            fields: Arc::new(boxcar::Vec::new()),
            methods: Arc::new(boxcar::Vec::new()),
            base: OnceLock::new(),
        }
    }

    /// Access the base type of this type, if it exists
    #[must_use]
    pub fn base(&self) -> Option<CilTypeRc> {
        self.base.get().and_then(CilTypeRef::upgrade)
    }

    /// Set the base type. Returns `false` if a base type was already set.
    pub fn set_base(&self, base: &CilTypeRc) -> bool {
        self.base.set(CilTypeRef::new(base)).is_ok()
    }

    /// Returns the full name (Namespace.Name) of the type
    #[must_use]
    pub fn fullname(&self) -> String {
        if self.namespace.is_empty() {
            self.name.clone()
        } else {
            format!("{}.{}", self.namespace, self.name)
        }
    }

    /// The generic type definition for generic instances, the type itself otherwise.
    #[must_use]
    pub fn definition(self: &Arc<Self>) -> CilTypeRc {
        match (&self.flavor, &self.element) {
            (CilFlavor::GenericInstance, Some(definition)) => definition.clone(),
            _ => self.clone(),
        }
    }

    /// Add a method to this type.
    pub fn add_method(&self, method: MethodRc) {
        self.methods.push(method);
    }

    /// Add a field to this type.
    pub fn add_field(&self, field: FieldRc) {
        self.fields.push(field);
    }

    /// Look up a declared field by name.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<FieldRc> {
        self.fields
            .iter()
            .find(|(_, field)| field.name == name)
            .map(|(_, field)| field.clone())
    }

    /// Methods callable on this type, in lookup order.
    ///
    /// Methods of a generic instance are those of its definition. With `include_inherited`,
    /// the methods of every base type follow the type's own methods, nearest base first.
    #[must_use]
    pub fn callable_methods(self: &Arc<Self>, include_inherited: bool) -> Vec<MethodRc> {
        let mut methods = Vec::new();
        let mut current = Some(self.definition());
        let mut depth = 0;

        while let Some(current_type) = current {
            methods.extend(current_type.methods.iter().map(|(_, method)| method.clone()));

            depth += 1;
            if !include_inherited || depth >= MAX_INHERITANCE_DEPTH {
                break;
            }
            current = current_type.base().map(|base| base.definition());
        }

        methods
    }

    /// `true` if `other` denotes the same type.
    ///
    /// Primitives compare by kind, constructed types and generic parameters structurally,
    /// everything else by identity.
    #[must_use]
    pub fn is_equivalent(&self, other: &CilType) -> bool {
        if std::ptr::eq(self, other) {
            return true;
        }

        if self.flavor.is_primitive() || other.flavor.is_primitive() {
            return self.flavor == other.flavor;
        }

        match (&self.flavor, &other.flavor) {
            (CilFlavor::GenericParameter { .. }, CilFlavor::GenericParameter { .. }) => {
                self.flavor == other.flavor
            }
            (CilFlavor::Array { rank: left, .. }, CilFlavor::Array { rank: right, .. }) => {
                left == right && self.same_element(other)
            }
            (CilFlavor::Vector, CilFlavor::Vector)
            | (CilFlavor::Pointer, CilFlavor::Pointer)
            | (CilFlavor::ByRef, CilFlavor::ByRef) => self.same_element(other),
            (CilFlavor::GenericInstance, CilFlavor::GenericInstance) => {
                self.same_element(other)
                    && self.generic_args.len() == other.generic_args.len()
                    && self
                        .generic_args
                        .iter()
                        .zip(&other.generic_args)
                        .all(|(left, right)| left.is_equivalent(right))
            }
            _ => false,
        }
    }

    fn same_element(&self, other: &CilType) -> bool {
        match (&self.element, &other.element) {
            (Some(left), Some(right)) => left.is_equivalent(right),
            _ => false,
        }
    }

    /// `true` if this type is `other` or derives from it.
    #[must_use]
    pub fn is_assignable_to(self: &Arc<Self>, other: &CilType) -> bool {
        let mut current = Some(self.clone());
        let mut depth = 0;

        while let Some(current_type) = current {
            if current_type.is_equivalent(other) {
                return true;
            }

            depth += 1;
            if depth >= MAX_INHERITANCE_DEPTH {
                break;
            }
            current = current_type.base();
        }

        false
    }
}

impl fmt::Debug for CilType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CilType")
            .field("token", &self.token)
            .field("flavor", &self.flavor)
            .field("fullname", &self.fullname())
            .field("fields", &self.fields.count())
            .field("methods", &self.methods.count())
            .finish()
    }
}
