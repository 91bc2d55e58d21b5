//! Already-loaded runtime methods.
//!
//! A [`CilMethod`] is what a call site resolves to: a method of a loaded type with its name,
//! resolved return and parameter types, flags and (for methods implemented in CIL) the raw
//! instruction stream of its body.

mod types;

pub use types::*;

use std::{
    fmt,
    sync::{Arc, OnceLock},
};

use crate::{
    metadata::{
        token::Token,
        typesystem::{CilTypeRc, CilTypeRef},
    },
    Error::NoMethodBody,
    Result,
};

/// A reference to a `CilMethod`
pub type MethodRc = Arc<CilMethod>;
/// The methods of a type, in declaration order
pub type MethodList = Arc<boxcar::Vec<MethodRc>>;

/// A method of a runtime type
pub struct CilMethod {
    /// Token
    pub token: Token,
    /// The method name
    pub name: String,
    /// Access flags
    pub flags_access: MethodAccessFlags,
    /// Modifier flags
    pub flags_modifiers: MethodModifiers,
    /// Implementation code type
    pub impl_code_type: MethodImplCodeType,
    /// The return type (`System.Void` for methods without a result)
    pub return_type: CilTypeRef,
    /// Parameter types in declaration order; by-ref parameters are `ByRef` types
    pub params: Vec<CilTypeRef>,
    /// Number of generic parameters of a generic method definition
    pub generic_param_count: u32,
    body: Option<Vec<u8>>,
    declaring_type: OnceLock<CilTypeRef>,
}

impl CilMethod {
    /// Create a method without a body.
    ///
    /// ## Arguments
    /// * 'token'       - The token of the method
    /// * 'name'        - The method name
    /// * 'flags'       - Raw `MethodAttributes`
    /// * 'return_type' - The return type
    /// * 'params'      - The parameter types, in order
    #[must_use]
    pub fn new(
        token: Token,
        name: &str,
        flags: u32,
        return_type: &CilTypeRc,
        params: &[CilTypeRc],
    ) -> Self {
        CilMethod {
            token,
            name: name.to_string(),
            flags_access: MethodAccessFlags::from_method_flags(flags),
            flags_modifiers: MethodModifiers::from_method_flags(flags),
            impl_code_type: MethodImplCodeType::IL,
            return_type: CilTypeRef::from(return_type),
            params: params.iter().map(CilTypeRef::from).collect(),
            generic_param_count: 0,
            body: None,
            declaring_type: OnceLock::new(),
        }
    }

    /// Attach the CIL instruction stream of the method body
    #[must_use]
    pub fn with_body(mut self, instructions: &[u8]) -> Self {
        self.body = Some(instructions.to_vec());
        self
    }

    /// Set raw `MethodImplAttributes`
    #[must_use]
    pub fn with_impl_flags(mut self, impl_flags: u32) -> Self {
        self.impl_code_type = MethodImplCodeType::from_impl_flags(impl_flags);
        self
    }

    /// Declare the method as a generic method definition with `count` parameters
    #[must_use]
    pub fn with_generic_params(mut self, count: u32) -> Self {
        self.generic_param_count = count;
        self
    }

    /// The type declaring this method, if set and still alive
    #[must_use]
    pub fn declaring_type(&self) -> Option<CilTypeRc> {
        self.declaring_type.get().and_then(CilTypeRef::upgrade)
    }

    /// Set the declaring type. Returns `false` if it was already set.
    pub fn set_declaring_type(&self, declaring: &CilTypeRc) -> bool {
        self.declaring_type.set(CilTypeRef::new(declaring)).is_ok()
    }

    /// `Namespace.Type::Name`, or just the name if the declaring type is unknown
    #[must_use]
    pub fn fullname(&self) -> String {
        match self.declaring_type() {
            Some(declaring) => format!("{}::{}", declaring.fullname(), self.name),
            None => self.name.clone(),
        }
    }

    /// `true` for static methods
    #[must_use]
    pub fn is_static(&self) -> bool {
        self.flags_modifiers.contains(MethodModifiers::STATIC)
    }

    /// `true` for abstract methods
    #[must_use]
    pub fn is_abstract(&self) -> bool {
        self.flags_modifiers.contains(MethodModifiers::ABSTRACT)
    }

    /// `true` if the method has a CIL instruction stream
    #[must_use]
    pub fn has_body(&self) -> bool {
        self.body.is_some()
            && self.impl_code_type.is_il()
            && !self
                .flags_modifiers
                .intersects(MethodModifiers::ABSTRACT | MethodModifiers::PINVOKE_IMPL)
    }

    /// The raw instruction stream of the method body.
    ///
    /// # Errors
    /// Returns [`crate::Error::NoMethodBody`] for abstract, P/Invoke and runtime-provided methods
    /// and for methods loaded without a body.
    pub fn instructions(&self) -> Result<&[u8]> {
        match &self.body {
            Some(body) if self.has_body() => Ok(body),
            _ => Err(NoMethodBody(self.fullname())),
        }
    }
}

impl fmt::Debug for CilMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CilMethod")
            .field("token", &self.token)
            .field("name", &self.fullname())
            .field("return_type", &self.return_type.fullname())
            .field(
                "params",
                &self
                    .params
                    .iter()
                    .map(CilTypeRef::fullname)
                    .collect::<Vec<_>>(),
            )
            .field("body", &self.body.as_ref().map(Vec::len))
            .finish_non_exhaustive()
    }
}
