//! Resolution of call operands to loaded methods.
//!
//! A call operand is a token. When it addresses a `MemberRef` row, the row names the declaring
//! type, the member name and its signature; [`MemberResolver`] turns these into the matching
//! [`crate::metadata::method::CilMethod`] of the loaded declaring type:
//!
//! 1. tokens of any other table are no match
//! 2. rows describing fields are no match
//! 3. the declaring type is resolved through [`TypeResolver`] and cached per parent token;
//!    failure to resolve it is no match
//! 4. the signature's return and parameter types are resolved, with the type arguments of a
//!    generic declaring type bound as type-level context
//! 5. the first callable method with the same name, generic arity, return type and
//!    parameter types wins
//!
//! Only damaged metadata (missing rows, undecodable signature blobs) is reported as an error.
//!
//! # Examples
//!
//! ```rust,no_run
//! use ilmock::metadata::{memberresolver::MemberResolver, module::Module, token::Token};
//!
//! # fn example(module: &Module) -> ilmock::Result<()> {
//! let mut resolver = MemberResolver::new(module);
//! match resolver.resolve_token(Token::new(0x0A00_0001))? {
//!     Some(method) => println!("calls {}", method.fullname()),
//!     None => println!("call target not loaded"),
//! }
//! # Ok(())
//! # }
//! ```

use std::{collections::HashMap, sync::Arc};

use log::{debug, trace, warn};

use crate::{
    disassembler::OperandReference,
    metadata::{
        method::MethodRc,
        module::Module,
        signatures::{SignatureMethod, SignatureParameter, SignatureParser, MAX_SIGNATURE_DEPTH},
        tables::{CodedIndex, MemberRefKind, TableId},
        token::Token,
        typesystem::{CilFlavor, CilTypeRc, TypeRegistry, TypeResolver},
    },
    Error, Result,
};

/// Resolves call operands of one module to loaded methods.
///
/// The resolver caches declaring types by parent token. The cache is private to the instance
/// and never invalidated: create one resolver per disassembly request.
///
/// Types constructed while resolving signatures live in a registry owned by the resolver and
/// are dropped with it; the module's own registry is never written.
pub struct MemberResolver<'a> {
    module: &'a Module,
    constructed: Arc<TypeRegistry>,
    include_inherited: bool,
    max_depth: usize,
    cache: HashMap<Token, CilTypeRc>,
}

impl<'a> MemberResolver<'a> {
    /// Create a resolver for the given module
    ///
    /// ## Arguments
    /// * 'module' - The hosting module whose `MemberRef` table the tokens address
    #[must_use]
    pub fn new(module: &'a Module) -> Self {
        MemberResolver {
            module,
            constructed: Arc::new(TypeRegistry::new()),
            include_inherited: true,
            max_depth: MAX_SIGNATURE_DEPTH,
            cache: HashMap::new(),
        }
    }

    /// Whether methods inherited from base types are candidates (default `true`)
    #[must_use]
    pub fn with_inherited(mut self, include_inherited: bool) -> Self {
        self.include_inherited = include_inherited;
        self
    }

    /// Set the nesting limit for signature decoding and type resolution
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Number of declaring types cached so far
    #[must_use]
    pub fn cached_types(&self) -> usize {
        self.cache.len()
    }

    /// Resolve the token of a decoded call operand.
    ///
    /// # Errors
    /// See [`MemberResolver::resolve_token`].
    pub fn resolve(&mut self, operand: &OperandReference) -> Result<Option<MethodRc>> {
        self.resolve_token(operand.token)
    }

    /// Resolve a member token to a loaded method.
    ///
    /// Returns `Ok(None)` when the token cannot be matched to a loaded method.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if the token addresses a row that does not exist or
    /// the member signature cannot be decoded.
    pub fn resolve_token(&mut self, token: Token) -> Result<Option<MethodRc>> {
        if token.table_id() != Some(TableId::MemberRef) {
            debug!("Token {token} does not address the MemberRef table");
            return Ok(None);
        }

        if token.row() == 0 {
            debug!("Token {token} is a nil MemberRef");
            return Ok(None);
        }

        let module = self.module;
        let Some(member) = module.tables().member_ref(token.row()) else {
            return Err(malformed_error!(
                "MemberRef row {} does not exist in {}",
                token.row(),
                module.name()
            ));
        };

        if member.kind() == MemberRefKind::Field {
            debug!("MemberRef {token} ({}) references a field", member.name);
            return Ok(None);
        }

        let Some(declaring) = self.resolve_parent(&member.class)? else {
            return Ok(None);
        };

        let signature = match SignatureParser::new(&member.signature)
            .with_max_depth(self.max_depth)
            .parse_method_signature()
        {
            Ok(signature) => signature,
            Err(error) => {
                warn!(
                    "Failed to decode the signature of {}::{}: {error}",
                    declaring.fullname(),
                    member.name
                );
                return no_match(error);
            }
        };

        let method_args: Vec<CilTypeRc> = (0..signature.generic_param_count)
            .map(|index| self.constructed.generic_parameter(index, true))
            .collect();

        let mut resolver = TypeResolver::with_registry(module, self.constructed.clone())
            .with_max_depth(self.max_depth)
            .with_method_context(&method_args);
        if declaring.flavor == CilFlavor::GenericInstance {
            resolver = resolver.with_type_context(&declaring.generic_args);
        }

        let (return_type, params) = match self.resolve_signature(&resolver, &signature) {
            Ok(resolved) => resolved,
            Err(error) => {
                debug!(
                    "Signature of {}::{} does not resolve: {error}",
                    declaring.fullname(),
                    member.name
                );
                return no_match(error);
            }
        };

        let found = declaring
            .callable_methods(self.include_inherited)
            .into_iter()
            .find(|candidate| {
                candidate.name == member.name
                    && candidate.generic_param_count == signature.generic_param_count
                    && candidate.params.len() == params.len()
                    && candidate
                        .return_type
                        .upgrade()
                        .is_some_and(|declared| {
                            same_type(&declared, &return_type, &declaring.generic_args)
                        })
                    && candidate
                        .params
                        .iter()
                        .zip(&params)
                        .all(|(declared, resolved)| {
                            declared.upgrade().is_some_and(|declared| {
                                same_type(&declared, resolved, &declaring.generic_args)
                            })
                        })
            });

        if found.is_none() {
            debug!(
                "No method of {} matches {} with {} parameter(s)",
                declaring.fullname(),
                member.name,
                params.len()
            );
        }

        Ok(found)
    }

    fn resolve_parent(&mut self, parent: &CodedIndex) -> Result<Option<CilTypeRc>> {
        if !matches!(
            parent.tag,
            TableId::TypeDef | TableId::TypeRef | TableId::TypeSpec
        ) {
            debug!("Declaring {:?} {} is not a type", parent.tag, parent.token);
            return Ok(None);
        }

        if let Some(cached) = self.cache.get(&parent.token) {
            trace!("Declaring type {} served from cache", parent.token);
            return Ok(Some(cached.clone()));
        }

        match TypeResolver::with_registry(self.module, self.constructed.clone())
            .with_max_depth(self.max_depth)
            .resolve_token(parent.token)
        {
            Ok(declaring) => {
                self.cache.insert(parent.token, declaring.clone());
                Ok(Some(declaring))
            }
            Err(error) => {
                debug!("Declaring type {} does not resolve: {error}", parent.token);
                no_match(error)
            }
        }
    }

    fn resolve_signature(
        &self,
        resolver: &TypeResolver<'_>,
        signature: &SignatureMethod,
    ) -> Result<(CilTypeRc, Vec<CilTypeRc>)> {
        let return_type = self.resolve_parameter(resolver, &signature.return_type)?;
        let params = signature
            .params
            .iter()
            .map(|param| self.resolve_parameter(resolver, param))
            .collect::<Result<Vec<_>>>()?;

        Ok((return_type, params))
    }

    fn resolve_parameter(
        &self,
        resolver: &TypeResolver<'_>,
        param: &SignatureParameter,
    ) -> Result<CilTypeRc> {
        let resolved = resolver.resolve(&param.base)?;
        if param.by_ref {
            Ok(self.constructed.by_ref_to(&resolved))
        } else {
            Ok(resolved)
        }
    }
}

/// Downgrade type-system failures to "no match", keep damaged input fatal
fn no_match<T>(error: Error) -> Result<Option<T>> {
    match error {
        Error::Malformed { .. } | Error::OutOfBounds => Err(error),
        _ => Ok(None),
    }
}

/// Compare a declared type against a resolved one, substituting the type parameters of the
/// declaring generic definition by `type_args`
fn same_type(declared: &CilTypeRc, resolved: &CilTypeRc, type_args: &[CilTypeRc]) -> bool {
    if type_args.is_empty() {
        return declared.is_equivalent(resolved);
    }

    match (&declared.flavor, &resolved.flavor) {
        (CilFlavor::GenericParameter { index, method: false }, _) => type_args
            .get(*index as usize)
            .is_some_and(|arg| arg.is_equivalent(resolved)),
        (CilFlavor::Vector, CilFlavor::Vector)
        | (CilFlavor::Pointer, CilFlavor::Pointer)
        | (CilFlavor::ByRef, CilFlavor::ByRef) => same_element(declared, resolved, type_args),
        (CilFlavor::Array { rank: left, .. }, CilFlavor::Array { rank: right, .. }) => {
            left == right && same_element(declared, resolved, type_args)
        }
        (CilFlavor::GenericInstance, CilFlavor::GenericInstance) => {
            same_element(declared, resolved, type_args)
                && declared.generic_args.len() == resolved.generic_args.len()
                && declared
                    .generic_args
                    .iter()
                    .zip(&resolved.generic_args)
                    .all(|(left, right)| same_type(left, right, type_args))
        }
        _ => declared.is_equivalent(resolved),
    }
}

fn same_element(declared: &CilTypeRc, resolved: &CilTypeRc, type_args: &[CilTypeRc]) -> bool {
    match (&declared.element, &resolved.element) {
        (Some(left), Some(right)) => {
            Arc::ptr_eq(left, right) || same_type(left, right, type_args)
        }
        _ => false,
    }
}
