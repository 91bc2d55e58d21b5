use std::sync::Arc;

use crate::{
    metadata::{
        module::Module,
        signatures::{SignatureParser, TypeSignature, ELEMENT_TYPE, MAX_SIGNATURE_DEPTH},
        tables::TableId,
        token::Token,
        typesystem::{CilPrimitiveKind, CilTypeRc, TypeRegistry},
    },
    Error::{
        GenericParamOutOfRange, MissingGenericContext, NotSupported, RecursionLimit, TypeError,
        UnsupportedPrimitive,
    },
    Result,
};

/// Resolves signature trees to concrete types of a hosting module.
///
/// Named types (TypeDef / TypeRef rows) are located by qualified name, first among the types the
/// module declares, then in the registries it links to. Constructed types (arrays, pointers,
/// by-refs, generic instances) are created in a separate registry owned by the resolver, so the
/// module is only ever read. Generic parameters are looked up in the optional type-level and
/// method-level contexts.
///
/// # Examples
///
/// ```rust,no_run
/// use ilmock::metadata::{module::Module, signatures::TypeSignature, typesystem::TypeResolver};
///
/// # fn example(module: &Module) -> ilmock::Result<()> {
/// let resolver = TypeResolver::new(module);
/// let ints = resolver.resolve(&TypeSignature::SzArray(ilmock::metadata::signatures::SignatureSzArray {
///     modifiers: vec![],
///     base: Box::new(TypeSignature::I4),
/// }))?;
/// assert_eq!(ints.fullname(), "System.Int32[]");
/// # Ok(())
/// # }
/// ```
pub struct TypeResolver<'a> {
    module: &'a Module,
    constructed: Arc<TypeRegistry>,
    type_context: Option<&'a [CilTypeRc]>,
    method_context: Option<&'a [CilTypeRc]>,
    max_depth: usize,
}

impl<'a> TypeResolver<'a> {
    /// Create a new resolver for the given module, without generic context
    ///
    /// ## Arguments
    /// * 'module' - The hosting module whose tables and types are used
    #[must_use]
    pub fn new(module: &'a Module) -> Self {
        Self::with_registry(module, Arc::new(TypeRegistry::new()))
    }

    /// Create a resolver that places constructed types into `constructed`.
    ///
    /// Resolvers sharing one registry reuse each other's constructed types.
    ///
    /// ## Arguments
    /// * 'module'      - The hosting module whose tables and types are used
    /// * 'constructed' - The registry receiving constructed types
    #[must_use]
    pub fn with_registry(module: &'a Module, constructed: Arc<TypeRegistry>) -> Self {
        TypeResolver {
            module,
            constructed,
            type_context: None,
            method_context: None,
            max_depth: MAX_SIGNATURE_DEPTH,
        }
    }

    /// Bind the type-level generic parameters (`!n`)
    ///
    /// ## Arguments
    /// * 'args' - The type arguments of the enclosing generic instance
    #[must_use]
    pub fn with_type_context(mut self, args: &'a [CilTypeRc]) -> Self {
        self.type_context = Some(args);
        self
    }

    /// Bind the method-level generic parameters (`!!n`)
    ///
    /// ## Arguments
    /// * 'args' - The type arguments of the enclosing generic method
    #[must_use]
    pub fn with_method_context(mut self, args: &'a [CilTypeRc]) -> Self {
        self.method_context = Some(args);
        self
    }

    /// Set the nesting limit for resolution
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Resolve a type signature to a concrete type
    ///
    /// ## Arguments
    /// * 'signature' - The signature to resolve
    ///
    /// # Errors
    /// - [`crate::Error::UnsupportedPrimitive`] for `TypedByRef`
    /// - [`crate::Error::NotSupported`] for function pointers
    /// - [`crate::Error::MissingGenericContext`] / [`crate::Error::GenericParamOutOfRange`] for
    ///   unbound generic parameters
    /// - [`crate::Error::TypeNotFound`] if a named type cannot be located
    /// - [`crate::Error::RecursionLimit`] if the signature nests too deeply
    pub fn resolve(&self, signature: &TypeSignature) -> Result<CilTypeRc> {
        self.resolve_with_depth(signature, 0)
    }

    /// Resolve a TypeDef, TypeRef or TypeSpec token to a concrete type
    ///
    /// # Errors
    /// Returns [`crate::Error::TypeError`] for tokens of other tables,
    /// [`crate::Error::Malformed`] if the addressed row does not exist, and any error of
    /// [`TypeResolver::resolve`].
    pub fn resolve_token(&self, token: Token) -> Result<CilTypeRc> {
        self.resolve_token_with_depth(token, 0)
    }

    fn resolve_with_depth(&self, signature: &TypeSignature, depth: usize) -> Result<CilTypeRc> {
        if depth >= self.max_depth {
            return Err(RecursionLimit(self.max_depth));
        }

        let registry = self.module.types();
        let constructed = &self.constructed;
        match signature {
            TypeSignature::Void => registry.get_primitive(CilPrimitiveKind::Void),
            TypeSignature::Boolean => registry.get_primitive(CilPrimitiveKind::Boolean),
            TypeSignature::Char => registry.get_primitive(CilPrimitiveKind::Char),
            TypeSignature::I1 => registry.get_primitive(CilPrimitiveKind::I1),
            TypeSignature::U1 => registry.get_primitive(CilPrimitiveKind::U1),
            TypeSignature::I2 => registry.get_primitive(CilPrimitiveKind::I2),
            TypeSignature::U2 => registry.get_primitive(CilPrimitiveKind::U2),
            TypeSignature::I4 => registry.get_primitive(CilPrimitiveKind::I4),
            TypeSignature::U4 => registry.get_primitive(CilPrimitiveKind::U4),
            TypeSignature::I8 => registry.get_primitive(CilPrimitiveKind::I8),
            TypeSignature::U8 => registry.get_primitive(CilPrimitiveKind::U8),
            TypeSignature::R4 => registry.get_primitive(CilPrimitiveKind::R4),
            TypeSignature::R8 => registry.get_primitive(CilPrimitiveKind::R8),
            TypeSignature::I => registry.get_primitive(CilPrimitiveKind::I),
            TypeSignature::U => registry.get_primitive(CilPrimitiveKind::U),
            TypeSignature::String => registry.get_primitive(CilPrimitiveKind::String),
            TypeSignature::Object => registry.get_primitive(CilPrimitiveKind::Object),
            TypeSignature::TypedByRef => Err(UnsupportedPrimitive(ELEMENT_TYPE::TYPEDBYREF)),
            TypeSignature::ValueType(token) | TypeSignature::Class(token) => {
                self.resolve_token_with_depth(*token, depth + 1)
            }
            TypeSignature::Ptr(pointer) => {
                let element = self.resolve_with_depth(&pointer.base, depth + 1)?;
                Ok(constructed.pointer_to(&element))
            }
            TypeSignature::ByRef(inner) => {
                let element = self.resolve_with_depth(inner, depth + 1)?;
                Ok(constructed.by_ref_to(&element))
            }
            // Pinning and custom modifiers do not change the type
            TypeSignature::Pinned(inner) => self.resolve_with_depth(inner, depth + 1),
            TypeSignature::Modified(modified) => {
                self.resolve_with_depth(&modified.base, depth + 1)
            }
            TypeSignature::SzArray(vector) => {
                let element = self.resolve_with_depth(&vector.base, depth + 1)?;
                Ok(constructed.vector_of(&element))
            }
            TypeSignature::Array(array) => {
                let element = self.resolve_with_depth(&array.base, depth + 1)?;
                Ok(constructed.array_of(&element, array.rank, array.dimensions.clone()))
            }
            TypeSignature::GenericInst(definition, args) => {
                let definition = self.resolve_with_depth(definition, depth + 1)?;
                let args = args
                    .iter()
                    .map(|arg| self.resolve_with_depth(arg, depth + 1))
                    .collect::<Result<Vec<_>>>()?;
                constructed.generic_instance(&definition, &args)
            }
            TypeSignature::GenericParamType(index) => {
                Self::generic_argument(self.type_context, *index)
            }
            TypeSignature::GenericParamMethod(index) => {
                Self::generic_argument(self.method_context, *index)
            }
            TypeSignature::FnPtr(_) => Err(NotSupported(
                "Function pointer signatures cannot be resolved to a type".to_string(),
            )),
            TypeSignature::Unknown => Err(TypeError(
                "Cannot resolve an unknown type signature".to_string(),
            )),
        }
    }

    fn resolve_token_with_depth(&self, token: Token, depth: usize) -> Result<CilTypeRc> {
        if depth >= self.max_depth {
            return Err(RecursionLimit(self.max_depth));
        }

        let tables = self.module.tables();
        match token.table_id() {
            Some(TableId::TypeDef) => match tables.type_def(token.row()) {
                Some(row) => self.module.find_type(&row.namespace, &row.name),
                None => Err(malformed_error!("TypeDef row {} does not exist", token.row())),
            },
            Some(TableId::TypeRef) => match tables.type_ref(token.row()) {
                Some(row) => self.module.find_type(&row.namespace, &row.name),
                None => Err(malformed_error!("TypeRef row {} does not exist", token.row())),
            },
            Some(TableId::TypeSpec) => match tables.type_spec(token.row()) {
                Some(row) => {
                    let signature = SignatureParser::new(&row.signature)
                        .with_max_depth(self.max_depth)
                        .parse_type()?;
                    self.resolve_with_depth(&signature, depth + 1)
                }
                None => Err(malformed_error!("TypeSpec row {} does not exist", token.row())),
            },
            _ => Err(TypeError(format!("Token {token} does not name a type"))),
        }
    }

    fn generic_argument(context: Option<&[CilTypeRc]>, index: u32) -> Result<CilTypeRc> {
        let Some(args) = context else {
            return Err(MissingGenericContext(index));
        };

        args.get(index as usize)
            .cloned()
            .ok_or(GenericParamOutOfRange {
                index,
                count: args.len(),
            })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{
        metadata::{
            signatures::{
                SignatureArray, SignatureModified, SignaturePointer, SignatureSzArray,
                CustomModifier,
            },
            typesystem::CilFlavor,
        },
        test::TestModule,
        Error,
    };

    fn sz_array(base: TypeSignature) -> TypeSignature {
        TypeSignature::SzArray(SignatureSzArray {
            modifiers: vec![],
            base: Box::new(base),
        })
    }

    #[test]
    fn resolve_primitives() {
        let module = TestModule::new().build();
        let resolver = TypeResolver::new(&module);

        let int32 = resolver.resolve(&TypeSignature::I4).unwrap();
        assert_eq!(int32.fullname(), "System.Int32");
        assert_eq!(int32.flavor, CilFlavor::I4);

        let object = resolver.resolve(&TypeSignature::Object).unwrap();
        assert_eq!(object.fullname(), "System.Object");

        assert!(matches!(
            resolver.resolve(&TypeSignature::TypedByRef),
            Err(Error::UnsupportedPrimitive(0x16))
        ));
    }

    #[test]
    fn resolve_constructed_types() {
        let module = TestModule::new().build();
        let resolver = TypeResolver::new(&module);

        let vector = resolver.resolve(&sz_array(TypeSignature::String)).unwrap();
        assert_eq!(vector.flavor, CilFlavor::Vector);
        assert_eq!(vector.fullname(), "System.String[]");

        let matrix = resolver
            .resolve(&TypeSignature::Array(SignatureArray {
                base: Box::new(TypeSignature::R8),
                rank: 2,
                dimensions: vec![],
            }))
            .unwrap();
        assert!(matches!(matrix.flavor, CilFlavor::Array { rank: 2, .. }));

        let pointer = resolver
            .resolve(&TypeSignature::Ptr(SignaturePointer {
                modifiers: vec![],
                base: Box::new(TypeSignature::U1),
            }))
            .unwrap();
        assert_eq!(pointer.flavor, CilFlavor::Pointer);

        let by_ref = resolver
            .resolve(&TypeSignature::ByRef(Box::new(TypeSignature::I4)))
            .unwrap();
        assert_eq!(by_ref.flavor, CilFlavor::ByRef);
        assert_eq!(by_ref.element.as_ref().unwrap().flavor, CilFlavor::I4);
    }

    #[test]
    fn constructed_types_stay_out_of_the_module() {
        let module = TestModule::new().build();
        let before = module.types().len();

        let resolver = TypeResolver::new(&module);
        let strings = resolver.resolve(&sz_array(TypeSignature::String)).unwrap();
        resolver
            .resolve(&TypeSignature::ByRef(Box::new(TypeSignature::I4)))
            .unwrap();
        assert_eq!(module.types().len(), before);

        let shared = Arc::new(TypeRegistry::new());
        let first = TypeResolver::with_registry(&module, shared.clone())
            .resolve(&sz_array(TypeSignature::String))
            .unwrap();
        let second = TypeResolver::with_registry(&module, shared.clone())
            .resolve(&sz_array(TypeSignature::String))
            .unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert!(!Arc::ptr_eq(&first, &strings));
        assert!(first.is_equivalent(&strings));
        assert_eq!(module.types().len(), before);
    }

    #[test]
    fn pinned_and_modified_are_transparent() {
        let module = TestModule::new().build();
        let resolver = TypeResolver::new(&module);
        let int32 = resolver.resolve(&TypeSignature::I4).unwrap();

        let pinned = resolver
            .resolve(&TypeSignature::Pinned(Box::new(TypeSignature::I4)))
            .unwrap();
        assert!(Arc::ptr_eq(&pinned, &int32));

        let modified = resolver
            .resolve(&TypeSignature::Modified(SignatureModified {
                modifiers: vec![CustomModifier {
                    required: false,
                    token: Token::new(0x0100_0001),
                }],
                base: Box::new(TypeSignature::I4),
            }))
            .unwrap();
        assert!(Arc::ptr_eq(&modified, &int32));
    }

    #[test]
    fn resolve_named_types() {
        let mut builder = TestModule::new();
        let local = builder.declare_class("Acme", "Widget");
        let widget_ref = builder.type_ref("Acme", "Widget");
        let widget_def = builder.type_def("Acme", "Widget");
        let missing = builder.type_ref("Vendor", "Missing");
        let module = builder.build();
        let resolver = TypeResolver::new(&module);

        let resolved = resolver.resolve(&TypeSignature::Class(widget_ref)).unwrap();
        assert!(Arc::ptr_eq(&resolved, &local));
        let resolved = resolver.resolve_token(widget_def).unwrap();
        assert!(Arc::ptr_eq(&resolved, &local));

        assert!(matches!(
            resolver.resolve(&TypeSignature::Class(missing)),
            Err(Error::TypeNotFound(name)) if name == "Vendor.Missing"
        ));
        assert!(matches!(
            resolver.resolve_token(Token::new(0x0100_0063)),
            Err(Error::Malformed { .. })
        ));
        assert!(matches!(
            resolver.resolve_token(Token::new(0x0A00_0001)),
            Err(Error::TypeError(_))
        ));
    }

    #[test]
    fn resolve_type_spec_generic_instance() {
        let mut builder = TestModule::new();
        let list = builder.declare_generic_class("Acme", "Box`1", &["T"]);
        let list_ref = builder.type_ref("Acme", "Box`1");
        // GENERICINST CLASS <TypeRef row> 1 I4
        let coded = ((list_ref.row() << 2) | 1) as u8;
        let spec = builder.type_spec(&[0x15, 0x12, coded, 0x01, 0x08]);
        let module = builder.build();

        let instance = TypeResolver::new(&module).resolve_token(spec).unwrap();
        assert_eq!(instance.flavor, CilFlavor::GenericInstance);
        assert!(Arc::ptr_eq(&instance.definition(), &list));
        assert_eq!(instance.generic_args[0].flavor, CilFlavor::I4);
    }

    #[test]
    fn generic_parameters_need_context() {
        let module = TestModule::new().build();
        let int32 = module.types().get_primitive(CilPrimitiveKind::I4).unwrap();
        let context = [int32.clone()];

        let unbound = TypeResolver::new(&module);
        assert!(matches!(
            unbound.resolve(&TypeSignature::GenericParamType(0)),
            Err(Error::MissingGenericContext(0))
        ));

        let bound = TypeResolver::new(&module).with_type_context(&context);
        let resolved = bound.resolve(&TypeSignature::GenericParamType(0)).unwrap();
        assert!(Arc::ptr_eq(&resolved, &int32));
        assert!(matches!(
            bound.resolve(&TypeSignature::GenericParamType(1)),
            Err(Error::GenericParamOutOfRange { index: 1, count: 1 })
        ));
        assert!(matches!(
            bound.resolve(&TypeSignature::GenericParamMethod(0)),
            Err(Error::MissingGenericContext(0))
        ));

        let method_bound = TypeResolver::new(&module).with_method_context(&context);
        assert!(method_bound
            .resolve(&TypeSignature::GenericParamMethod(0))
            .is_ok());
    }

    #[test]
    fn unsupported_constructs() {
        let module = TestModule::new().build();
        let resolver = TypeResolver::new(&module);

        let fn_ptr = TypeSignature::FnPtr(Box::default());
        assert!(matches!(resolver.resolve(&fn_ptr), Err(Error::NotSupported(_))));
        assert!(matches!(
            resolver.resolve(&TypeSignature::Unknown),
            Err(Error::TypeError(_))
        ));
    }

    #[test]
    fn recursion_limit() {
        let module = TestModule::new().build();
        let resolver = TypeResolver::new(&module).with_max_depth(3);

        let nested = sz_array(sz_array(sz_array(sz_array(TypeSignature::I4))));
        assert!(matches!(
            resolver.resolve(&nested),
            Err(Error::RecursionLimit(3))
        ));
        assert!(resolver.resolve(&sz_array(TypeSignature::I4)).is_ok());
    }
}
