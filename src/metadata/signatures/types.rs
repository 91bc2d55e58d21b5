use crate::metadata::{token::Token, typesystem::ArrayDimensions};

/// Element type codes used in signature blobs (ECMA-335 II.23.1.16).
#[allow(non_snake_case)]
pub mod ELEMENT_TYPE {
    /// Marks end of a list
    pub const END: u8 = 0x00;
    /// `void`
    pub const VOID: u8 = 0x01;
    /// `bool`
    pub const BOOLEAN: u8 = 0x02;
    /// `char`
    pub const CHAR: u8 = 0x03;
    /// `sbyte`
    pub const I1: u8 = 0x04;
    /// `byte`
    pub const U1: u8 = 0x05;
    /// `short`
    pub const I2: u8 = 0x06;
    /// `ushort`
    pub const U2: u8 = 0x07;
    /// `int`
    pub const I4: u8 = 0x08;
    /// `uint`
    pub const U4: u8 = 0x09;
    /// `long`
    pub const I8: u8 = 0x0a;
    /// `ulong`
    pub const U8: u8 = 0x0b;
    /// `float`
    pub const R4: u8 = 0x0c;
    /// `double`
    pub const R8: u8 = 0x0d;
    /// `string`
    pub const STRING: u8 = 0x0e;
    /// Followed by type
    pub const PTR: u8 = 0x0f;
    /// Followed by type
    pub const BYREF: u8 = 0x10;
    /// Followed by `TypeDefOrRef` encoded token
    pub const VALUETYPE: u8 = 0x11;
    /// Followed by `TypeDefOrRef` encoded token
    pub const CLASS: u8 = 0x12;
    /// Generic parameter of a type, followed by its index
    pub const VAR: u8 = 0x13;
    /// Followed by type, rank, sizes and lower bounds
    pub const ARRAY: u8 = 0x14;
    /// Followed by generic type, argument count and arguments
    pub const GENERICINST: u8 = 0x15;
    /// `System.TypedReference`
    pub const TYPEDBYREF: u8 = 0x16;
    /// `System.IntPtr`
    pub const I: u8 = 0x18;
    /// `System.UIntPtr`
    pub const U: u8 = 0x19;
    /// Followed by a full method signature
    pub const FNPTR: u8 = 0x1b;
    /// `System.Object`
    pub const OBJECT: u8 = 0x1c;
    /// Single-dimension, zero-based array
    pub const SZARRAY: u8 = 0x1d;
    /// Generic parameter of a method, followed by its index
    pub const MVAR: u8 = 0x1e;
    /// Required modifier, followed by a `TypeDefOrRef` encoded token
    pub const CMOD_REQD: u8 = 0x1f;
    /// Optional modifier, followed by a `TypeDefOrRef` encoded token
    pub const CMOD_OPT: u8 = 0x20;
    /// Sentinel for vararg method signatures
    pub const SENTINEL: u8 = 0x41;
    /// Denotes a local variable that points at a pinned object
    pub const PINNED: u8 = 0x45;
}

/// Leading bytes of method and field signatures (ECMA-335 II.23.2.1 - II.23.2.4).
#[allow(non_snake_case)]
pub mod SIGNATURE_HEADER {
    /// Default managed calling convention
    pub const DEFAULT: u8 = 0x00;
    /// Vararg calling convention
    pub const VARARG: u8 = 0x05;
    /// Field signature marker
    pub const FIELD: u8 = 0x06;
    /// Mask of the calling-convention kind in the low nibble
    pub const KIND_MASK: u8 = 0x0F;
    /// Method has generic parameters, followed by their count
    pub const GENERIC: u8 = 0x10;
    /// Method has an implicit `this` parameter
    pub const HAS_THIS: u8 = 0x20;
    /// `this` is passed explicitly as the first parameter
    pub const EXPLICIT_THIS: u8 = 0x40;
}

/// A decoded type signature tree.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum TypeSignature {
    /// Placeholder for an uninitialized signature
    #[default]
    Unknown,
    /// `void`
    Void,
    /// `bool`
    Boolean,
    /// `char`
    Char,
    /// `sbyte`
    I1,
    /// `byte`
    U1,
    /// `short`
    I2,
    /// `ushort`
    U2,
    /// `int`
    I4,
    /// `uint`
    U4,
    /// `long`
    I8,
    /// `ulong`
    U8,
    /// `float`
    R4,
    /// `double`
    R8,
    /// `nint`
    I,
    /// `nuint`
    U,
    /// `string`
    String,
    /// `object`
    Object,
    /// `System.TypedReference`
    TypedByRef,
    /// Unmanaged pointer
    Ptr(SignaturePointer),
    /// Managed reference
    ByRef(Box<TypeSignature>),
    /// Value type named by a TypeDef, TypeRef or TypeSpec token
    ValueType(Token),
    /// Reference type named by a TypeDef, TypeRef or TypeSpec token
    Class(Token),
    /// Generic parameter of the enclosing type, by index
    GenericParamType(u32),
    /// Generic parameter of the enclosing method, by index
    GenericParamMethod(u32),
    /// Multi-dimensional array with explicit rank
    Array(SignatureArray),
    /// Single-dimension, zero-based vector
    SzArray(SignatureSzArray),
    /// Generic instantiation: the generic type followed by its arguments
    GenericInst(Box<TypeSignature>, Vec<TypeSignature>),
    /// Function pointer
    FnPtr(Box<SignatureMethod>),
    /// A type carrying `modreq` / `modopt` modifiers
    Modified(SignatureModified),
    /// Pinned local (only valid in local variable signatures)
    Pinned(Box<TypeSignature>),
}

/// A custom modifier (`modreq` or `modopt`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CustomModifier {
    /// `true` for `modreq`, `false` for `modopt`
    pub required: bool,
    /// The modifier type (TypeDef, TypeRef or TypeSpec)
    pub token: Token,
}

/// A type preceded by one or more custom modifiers.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SignatureModified {
    /// The modifiers, in blob order
    pub modifiers: Vec<CustomModifier>,
    /// The modified type
    pub base: Box<TypeSignature>,
}

/// An `ARRAY` type: element type, rank and optional per-dimension bounds.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SignatureArray {
    /// Element type
    pub base: Box<TypeSignature>,
    /// Number of dimensions
    pub rank: u32,
    /// Sizes and lower bounds, for as many dimensions as the blob specifies
    pub dimensions: Vec<ArrayDimensions>,
}

/// An `SZARRAY` type.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SignatureSzArray {
    /// Custom modifiers on the element type
    pub modifiers: Vec<CustomModifier>,
    /// Element type
    pub base: Box<TypeSignature>,
}

/// A `PTR` type.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SignaturePointer {
    /// Custom modifiers on the pointed-to type
    pub modifiers: Vec<CustomModifier>,
    /// Pointed-to type
    pub base: Box<TypeSignature>,
}

/// A parameter or return type, including `byref` and custom modifiers.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SignatureParameter {
    /// Custom modifiers
    pub modifiers: Vec<CustomModifier>,
    /// Passed by reference
    pub by_ref: bool,
    /// The parameter type
    pub base: TypeSignature,
}

/// A `MethodDefSig` / `MethodRefSig` (ECMA-335 II.23.2.1 - II.23.2.2).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SignatureMethod {
    /// Instance method (`HASTHIS`)
    pub has_this: bool,
    /// `this` is the first explicit parameter (`EXPLICITTHIS`)
    pub explicit_this: bool,
    /// Vararg calling convention
    pub vararg: bool,
    /// Number of generic method parameters (0 for non-generic methods)
    pub generic_param_count: u32,
    /// The return type
    pub return_type: SignatureParameter,
    /// Fixed parameters
    pub params: Vec<SignatureParameter>,
    /// Parameters after the vararg sentinel
    pub varargs: Vec<SignatureParameter>,
}

impl SignatureMethod {
    /// Number of fixed parameters.
    #[must_use]
    pub fn param_count(&self) -> usize {
        self.params.len()
    }
}
