use std::sync::{Arc, Weak};

use crate::metadata::{
    token::Token,
    typesystem::{CilPrimitiveKind, CilType, CilTypeRc},
};

/// A non-owning reference to a `CilType`.
///
/// Types are owned by their [`crate::metadata::typesystem::TypeRegistry`]; methods and fields
/// point back at their declaring type and at parameter types through this handle so that no
/// reference cycles form.
#[derive(Clone, Debug)]
pub struct CilTypeRef {
    weak_ref: Weak<CilType>,
}

impl CilTypeRef {
    /// Create a new `CilTypeRef` from a strong reference
    #[must_use]
    pub fn new(strong_ref: &CilTypeRc) -> Self {
        Self {
            weak_ref: Arc::downgrade(strong_ref),
        }
    }

    /// Get a strong reference to the type, `None` if the owning registry is gone
    #[must_use]
    pub fn upgrade(&self) -> Option<CilTypeRc> {
        self.weak_ref.upgrade()
    }

    /// Check if the referenced type is still alive
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.weak_ref.strong_count() > 0
    }

    /// Get the token of the referenced type (if still alive)
    #[must_use]
    pub fn token(&self) -> Option<Token> {
        self.upgrade().map(|t| t.token)
    }

    /// Get the full name of the referenced type (if still alive)
    #[must_use]
    pub fn fullname(&self) -> Option<String> {
        self.upgrade().map(|t| t.fullname())
    }
}

impl From<CilTypeRc> for CilTypeRef {
    fn from(strong_ref: CilTypeRc) -> Self {
        Self::new(&strong_ref)
    }
}

impl From<&CilTypeRc> for CilTypeRef {
    fn from(strong_ref: &CilTypeRc) -> Self {
        Self::new(strong_ref)
    }
}

/// A single dimension of an array
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ArrayDimensions {
    /// The size of this dimension
    pub size: Option<u32>,
    /// The lower bound of this dimension (lowest index that can be used to access an element)
    pub lower_bound: Option<u32>,
}

#[allow(missing_docs)]
/// The kind of a runtime type
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CilFlavor {
    // Base primitive types
    Void,
    Boolean,
    Char,
    I1,
    U1,
    I2,
    U2,
    I4,
    U4,
    I8,
    U8,
    R4,
    R8,
    I,
    U,
    Object,
    String,

    // Constructed types
    /// Multi-dimensional array (`T[,]`, or `T[*]` for rank 1)
    Array {
        /// The rank (number of dimensions)
        rank: u32,
        /// Details about each dimension
        dimensions: Vec<ArrayDimensions>,
    },
    /// Single-dimension zero-based array (`T[]`)
    Vector,
    Pointer,
    ByRef,
    GenericInstance,
    GenericParameter {
        /// Index in the generic parameters list
        index: u32,
        /// Whether it's a method parameter (true) or type parameter (false)
        method: bool,
    },

    // Type categories
    Class,
    ValueType,
    Interface,

    // Fallback
    Unknown,
}

impl CilFlavor {
    /// Check if this is a primitive type
    #[must_use]
    pub fn is_primitive(&self) -> bool {
        self.to_primitive_kind().is_some()
    }

    /// Check if this is a value type
    #[must_use]
    pub fn is_value_type(&self) -> bool {
        matches!(
            self,
            CilFlavor::Boolean
                | CilFlavor::Char
                | CilFlavor::I1
                | CilFlavor::U1
                | CilFlavor::I2
                | CilFlavor::U2
                | CilFlavor::I4
                | CilFlavor::U4
                | CilFlavor::I8
                | CilFlavor::U8
                | CilFlavor::R4
                | CilFlavor::R8
                | CilFlavor::I
                | CilFlavor::U
                | CilFlavor::ValueType
        )
    }

    /// Check if this type is built from a component type (array, pointer, by-ref, generic instance)
    #[must_use]
    pub fn is_constructed(&self) -> bool {
        matches!(
            self,
            CilFlavor::Array { .. }
                | CilFlavor::Vector
                | CilFlavor::Pointer
                | CilFlavor::ByRef
                | CilFlavor::GenericInstance
        )
    }

    /// Try to convert to a `CilPrimitiveKind` if this is a primitive type
    #[must_use]
    pub fn to_primitive_kind(&self) -> Option<CilPrimitiveKind> {
        match self {
            CilFlavor::Void => Some(CilPrimitiveKind::Void),
            CilFlavor::Boolean => Some(CilPrimitiveKind::Boolean),
            CilFlavor::Char => Some(CilPrimitiveKind::Char),
            CilFlavor::I1 => Some(CilPrimitiveKind::I1),
            CilFlavor::U1 => Some(CilPrimitiveKind::U1),
            CilFlavor::I2 => Some(CilPrimitiveKind::I2),
            CilFlavor::U2 => Some(CilPrimitiveKind::U2),
            CilFlavor::I4 => Some(CilPrimitiveKind::I4),
            CilFlavor::U4 => Some(CilPrimitiveKind::U4),
            CilFlavor::I8 => Some(CilPrimitiveKind::I8),
            CilFlavor::U8 => Some(CilPrimitiveKind::U8),
            CilFlavor::R4 => Some(CilPrimitiveKind::R4),
            CilFlavor::R8 => Some(CilPrimitiveKind::R8),
            CilFlavor::I => Some(CilPrimitiveKind::I),
            CilFlavor::U => Some(CilPrimitiveKind::U),
            CilFlavor::Object => Some(CilPrimitiveKind::Object),
            CilFlavor::String => Some(CilPrimitiveKind::String),
            _ => None,
        }
    }

    /// Short tag used to key constructed types in the registry cache
    pub(crate) fn cache_tag(&self) -> String {
        match self {
            CilFlavor::Array { rank, .. } => format!("array{rank}"),
            CilFlavor::Vector => "vector".to_string(),
            CilFlavor::Pointer => "ptr".to_string(),
            CilFlavor::ByRef => "byref".to_string(),
            CilFlavor::GenericInstance => "inst".to_string(),
            CilFlavor::GenericParameter { index, method } => {
                format!("{}{index}", if *method { "mvar" } else { "var" })
            }
            other => format!("{other:?}"),
        }
    }
}
