use std::sync::{
    atomic::{AtomicU32, Ordering},
    Arc, OnceLock,
};

use crossbeam_skiplist::SkipMap;
use dashmap::{mapref::entry::Entry, DashMap};
use strum::IntoEnumIterator;

use crate::{
    metadata::{
        token::Token,
        typesystem::{ArrayDimensions, CilFlavor, CilPrimitiveKind, CilType, CilTypeRc},
    },
    Error::TypeError,
    Result,
};

/// First token handed out to non-primitive types
const FIRST_ALLOCATED_TOKEN: u32 = 0xF000_0020;

static PROCESS_REGISTRY: OnceLock<Arc<TypeRegistry>> = OnceLock::new();

/// Owning store of runtime types.
///
/// Types are indexed by token and by full name. Constructed types (arrays, pointers,
/// by-refs, generic instances, generic parameters) are created on first use and reused after
/// that. Other registries can be linked in as fallbacks for name lookups; a hosting module links
/// the process-wide registry returned by [`TypeRegistry::process`].
///
/// All operations take `&self` and are safe to call concurrently.
///
/// # Examples
///
/// ```rust
/// use ilmock::metadata::typesystem::{CilFlavor, CilPrimitiveKind, TypeRegistry};
///
/// let registry = TypeRegistry::new();
/// let widget = registry.create_type("Acme", "Widget", CilFlavor::Class, 0);
///
/// assert!(registry.get_by_fullname("Acme.Widget", false).is_some());
/// assert!(registry.get_by_fullname("System.Int32", false).is_some());
///
/// let int32 = registry.get_primitive(CilPrimitiveKind::I4)?;
/// let vector = registry.vector_of(&int32);
/// assert_eq!(vector.fullname(), "System.Int32[]");
/// assert!(std::sync::Arc::ptr_eq(&vector, &registry.vector_of(&int32)));
/// # let _ = widget;
/// # Ok::<(), ilmock::Error>(())
/// ```
pub struct TypeRegistry {
    /// Primary type storage indexed by token
    types: SkipMap<Token, CilTypeRc>,
    /// Counter for allocating tokens of new types
    next_token: AtomicU32,
    /// Secondary index: types indexed by full name (namespace.name)
    types_by_fullname: DashMap<String, Vec<Token>>,
    /// Constructed types keyed by shape and component identity
    constructed: DashMap<String, Token>,
    /// Linked registries consulted by name lookups
    external_registries: DashMap<String, Arc<TypeRegistry>>,
}

impl TypeRegistry {
    /// Create a new registry holding only the primitive types.
    #[must_use]
    pub fn new() -> Self {
        let registry = TypeRegistry {
            types: SkipMap::new(),
            next_token: AtomicU32::new(FIRST_ALLOCATED_TOKEN),
            types_by_fullname: DashMap::new(),
            constructed: DashMap::new(),
            external_registries: DashMap::new(),
        };

        registry.initialize_primitives();
        registry
    }

    /// The process-wide registry, created on first use.
    ///
    /// Types registered here are visible to every [`crate::metadata::module::Module`] created
    /// with [`crate::metadata::module::Module::new`].
    #[must_use]
    pub fn process() -> Arc<TypeRegistry> {
        PROCESS_REGISTRY
            .get_or_init(|| Arc::new(TypeRegistry::new()))
            .clone()
    }

    fn initialize_primitives(&self) {
        for kind in CilPrimitiveKind::iter() {
            let primitive = Arc::new(CilType::new(
                kind.token(),
                kind.to_flavor(),
                kind.namespace(),
                kind.name(),
                0,
            ));
            self.insert(&primitive);
        }

        for kind in CilPrimitiveKind::iter() {
            if let (Some(base_kind), Some(primitive)) = (kind.base(), self.get(&kind.token())) {
                if let Some(base) = self.get(&base_kind.token()) {
                    primitive.set_base(&base);
                }
            }
        }
    }

    /// Insert a type and index it by name.
    pub fn insert(&self, new_type: &CilTypeRc) {
        let token = new_type.token;
        self.types.insert(token, new_type.clone());

        if !new_type.flavor.is_constructed() {
            self.types_by_fullname
                .entry(new_type.fullname())
                .or_default()
                .push(token);
        }
    }

    /// Allocate a fresh token for a type created outside the registry.
    pub(crate) fn allocate_token(&self) -> Token {
        Token::new(self.next_token.fetch_add(1, Ordering::Relaxed))
    }

    /// Create and insert a new named type with a freshly allocated token.
    pub fn create_type(
        &self,
        namespace: &str,
        name: &str,
        flavor: CilFlavor,
        flags: u32,
    ) -> CilTypeRc {
        self.create_generic_type(namespace, name, flavor, flags, &[])
    }

    /// Create and insert a generic type definition with the given parameter names.
    pub fn create_generic_type(
        &self,
        namespace: &str,
        name: &str,
        flavor: CilFlavor,
        flags: u32,
        generic_params: &[&str],
    ) -> CilTypeRc {
        let mut new_type = CilType::new(self.allocate_token(), flavor, namespace, name, flags);
        new_type.generic_params = generic_params.iter().map(ToString::to_string).collect();

        let new_type = Arc::new(new_type);
        self.insert(&new_type);
        new_type
    }

    /// Get one of the primitive types.
    ///
    /// # Errors
    /// Returns [`crate::Error::TypeError`] if the primitive is missing from this registry.
    pub fn get_primitive(&self, primitive: CilPrimitiveKind) -> Result<CilTypeRc> {
        self.get(&primitive.token()).ok_or_else(|| {
            TypeError(format!(
                "Failed to retrieve primitive type - {}",
                primitive.name()
            ))
        })
    }

    /// Look up a type by token.
    #[must_use]
    pub fn get(&self, token: &Token) -> Option<CilTypeRc> {
        self.types.get(token).map(|entry| entry.value().clone())
    }

    /// Look up a named type by `Namespace.Name`.
    ///
    /// With `external`, linked registries are consulted when this registry has no match. Linked
    /// registries are searched without following their own links.
    #[must_use]
    pub fn get_by_fullname(&self, fullname: &str, external: bool) -> Option<CilTypeRc> {
        if let Some(tokens) = self.types_by_fullname.get(fullname) {
            if let Some(found) = tokens.value().iter().find_map(|token| self.get(token)) {
                return Some(found);
            }
        }

        if external {
            for external_registry in &self.external_registries {
                if let Some(external_type) = external_registry.value().get_by_fullname(fullname, false)
                {
                    return Some(external_type);
                }
            }
        }

        None
    }

    /// Link another registry as a fallback for name lookups. Linking a registry to itself is
    /// ignored.
    pub fn registry_link(&self, name: &str, registry: Arc<TypeRegistry>) {
        if std::ptr::eq(self, Arc::as_ptr(&registry)) {
            return;
        }
        self.external_registries.insert(name.to_string(), registry);
    }

    /// Returns the single-dimension zero-based array type `element[]`.
    pub fn vector_of(&self, element: &CilTypeRc) -> CilTypeRc {
        let name = format!("{}[]", element.name);
        self.get_or_create_constructed(CilFlavor::Vector, element, &[], &name)
    }

    /// Returns the multi-dimensional array type of `element` with the given rank.
    pub fn array_of(
        &self,
        element: &CilTypeRc,
        rank: u32,
        dimensions: Vec<ArrayDimensions>,
    ) -> CilTypeRc {
        let name = if rank <= 1 {
            format!("{}[*]", element.name)
        } else {
            format!("{}[{}]", element.name, ",".repeat(rank as usize - 1))
        };
        self.get_or_create_constructed(CilFlavor::Array { rank, dimensions }, element, &[], &name)
    }

    /// Returns the unmanaged pointer type `element*`.
    pub fn pointer_to(&self, element: &CilTypeRc) -> CilTypeRc {
        let name = format!("{}*", element.name);
        self.get_or_create_constructed(CilFlavor::Pointer, element, &[], &name)
    }

    /// Returns the managed reference type `element&`.
    pub fn by_ref_to(&self, element: &CilTypeRc) -> CilTypeRc {
        let name = format!("{}&", element.name);
        self.get_or_create_constructed(CilFlavor::ByRef, element, &[], &name)
    }

    /// Returns the instantiation of a generic definition with the given type arguments.
    ///
    /// # Errors
    /// Returns [`crate::Error::TypeError`] if `definition` is not generic or the number of
    /// arguments does not match its generic parameters.
    pub fn generic_instance(
        &self,
        definition: &CilTypeRc,
        args: &[CilTypeRc],
    ) -> Result<CilTypeRc> {
        if definition.generic_params.len() != args.len() {
            return Err(TypeError(format!(
                "{} expects {} type argument(s), got {}",
                definition.fullname(),
                definition.generic_params.len(),
                args.len()
            )));
        }

        let arg_names: Vec<&str> = args.iter().map(|arg| arg.name.as_str()).collect();
        let name = format!("{}<{}>", definition.name, arg_names.join(","));
        Ok(self.get_or_create_constructed(CilFlavor::GenericInstance, definition, args, &name))
    }

    /// Returns the placeholder type for generic parameter `index` of a type (`!index`) or of a
    /// method (`!!index`).
    pub fn generic_parameter(&self, index: u32, method: bool) -> CilTypeRc {
        let flavor = CilFlavor::GenericParameter { index, method };
        let key = flavor.cache_tag();

        self.constructed_entry(key, || {
            let name = if method {
                format!("!!{index}")
            } else {
                format!("!{index}")
            };
            CilType::new(self.allocate_token(), flavor, "", &name, 0)
        })
    }

    fn get_or_create_constructed(
        &self,
        flavor: CilFlavor,
        element: &CilTypeRc,
        args: &[CilTypeRc],
        name: &str,
    ) -> CilTypeRc {
        // Components are kept alive by the constructed type, so their addresses stay unique
        let mut key = format!("{}:{:p}", flavor.cache_tag(), Arc::as_ptr(element));
        for arg in args {
            key.push_str(&format!(",{:p}", Arc::as_ptr(arg)));
        }

        self.constructed_entry(key, || {
            let mut new_type =
                CilType::new(self.allocate_token(), flavor, &element.namespace, name, 0);
            new_type.element = Some(element.clone());
            new_type.generic_args = args.to_vec();
            new_type
        })
    }

    fn constructed_entry(&self, key: String, create: impl FnOnce() -> CilType) -> CilTypeRc {
        match self.constructed.entry(key) {
            Entry::Occupied(entry) => {
                if let Some(existing) = self.get(entry.get()) {
                    return existing;
                }
                let new_type = Arc::new(create());
                self.insert(&new_type);
                *entry.into_ref() = new_type.token;
                new_type
            }
            Entry::Vacant(entry) => {
                let new_type = Arc::new(create());
                self.insert(&new_type);
                entry.insert(new_type.token);
                new_type
            }
        }
    }

    /// Number of types in this registry (linked registries excluded).
    #[must_use]
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// `true` if the registry holds no types.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::EnumCount;

    #[test]
    fn primitives_registered() {
        let registry = TypeRegistry::new();
        assert_eq!(registry.len(), CilPrimitiveKind::COUNT);

        let int32 = registry.get_by_fullname("System.Int32", false).unwrap();
        assert_eq!(int32.flavor, CilFlavor::I4);
        assert_eq!(int32.token, CilPrimitiveKind::I4.token());
        assert_eq!(int32.base().unwrap().name, "ValueType");

        let string = registry.get_primitive(CilPrimitiveKind::String).unwrap();
        assert_eq!(string.base().unwrap().fullname(), "System.Object");
    }

    #[test]
    fn create_type_allocates_fresh_tokens() {
        let registry = TypeRegistry::new();
        let first = registry.create_type("Acme", "Widget", CilFlavor::Class, 0);
        let second = registry.create_type("Acme", "Widget", CilFlavor::Class, 0);

        assert_eq!(first.token, Token::new(FIRST_ALLOCATED_TOKEN));
        assert_ne!(first.token, second.token);
        assert!(Arc::ptr_eq(
            &registry.get_by_fullname("Acme.Widget", false).unwrap(),
            &first
        ));
        assert!(Arc::ptr_eq(&registry.get(&second.token).unwrap(), &second));
    }

    #[test]
    fn linked_registry_fallback() {
        let process = Arc::new(TypeRegistry::new());
        let external = process.create_type("Vendor", "Logger", CilFlavor::Interface, 0);

        let local = TypeRegistry::new();
        assert!(local.get_by_fullname("Vendor.Logger", true).is_none());

        local.registry_link("process", process.clone());
        assert!(local.get_by_fullname("Vendor.Logger", false).is_none());
        assert!(Arc::ptr_eq(
            &local.get_by_fullname("Vendor.Logger", true).unwrap(),
            &external
        ));
    }

    #[test]
    fn self_link_is_ignored() {
        let registry = Arc::new(TypeRegistry::new());
        let widget = registry.create_type("Acme", "Widget", CilFlavor::Class, 0);
        registry.registry_link("self", registry.clone());
        assert!(Arc::ptr_eq(
            &registry.get_by_fullname("Acme.Widget", true).unwrap(),
            &widget
        ));
        assert_eq!(Arc::strong_count(&registry), 1);
    }

    #[test]
    fn constructed_types_are_cached() {
        let registry = TypeRegistry::new();
        let int32 = registry.get_primitive(CilPrimitiveKind::I4).unwrap();

        let vector = registry.vector_of(&int32);
        assert_eq!(vector.name, "Int32[]");
        assert!(Arc::ptr_eq(&vector, &registry.vector_of(&int32)));
        assert!(Arc::ptr_eq(vector.element.as_ref().unwrap(), &int32));

        let matrix = registry.array_of(&int32, 2, vec![]);
        assert_eq!(matrix.name, "Int32[,]");
        assert!(!Arc::ptr_eq(&matrix, &vector));

        assert_eq!(registry.pointer_to(&int32).name, "Int32*");
        assert_eq!(registry.by_ref_to(&int32).name, "Int32&");
        assert!(registry.get_by_fullname("System.Int32[]", false).is_none());
    }

    #[test]
    fn generic_instances() {
        let registry = TypeRegistry::new();
        let list = registry.create_generic_type(
            "System.Collections.Generic",
            "List`1",
            CilFlavor::Class,
            0,
            &["T"],
        );
        let int32 = registry.get_primitive(CilPrimitiveKind::I4).unwrap();

        let instance = registry.generic_instance(&list, &[int32.clone()]).unwrap();
        assert_eq!(instance.flavor, CilFlavor::GenericInstance);
        assert_eq!(instance.name, "List`1<Int32>");
        assert!(Arc::ptr_eq(&instance.definition(), &list));
        assert!(Arc::ptr_eq(
            &instance,
            &registry.generic_instance(&list, &[int32.clone()]).unwrap()
        ));

        assert!(registry.generic_instance(&list, &[]).is_err());
        assert!(registry.generic_instance(&int32, &[int32.clone()]).is_err());
    }

    #[test]
    fn generic_parameters() {
        let registry = TypeRegistry::new();
        let type_param = registry.generic_parameter(0, false);
        let method_param = registry.generic_parameter(0, true);

        assert_eq!(type_param.name, "!0");
        assert_eq!(method_param.name, "!!0");
        assert!(!type_param.is_equivalent(&method_param));
        assert!(Arc::ptr_eq(&type_param, &registry.generic_parameter(0, false)));
    }
}
