//! The hosting module call sites are resolved in.
//!
//! A [`Module`] pairs the metadata tables of a compiled module with the registry of types it
//! declares. Named types are looked up in that registry first and then in the registries linked
//! to it; [`Module::new`] links the process-wide registry so that types loaded by other modules
//! are found as well.

use std::{fmt, sync::Arc};

use crate::{
    metadata::{
        tables::MetadataTables,
        typesystem::{CilFlavor, CilTypeRc, TypeRegistry},
    },
    Error::TypeNotFound,
    Result,
};

/// Name under which the process-wide registry is linked
const PROCESS_REGISTRY_LINK: &str = "process";

/// A loaded module: metadata tables plus the types it declares.
pub struct Module {
    name: String,
    tables: Arc<dyn MetadataTables>,
    types: Arc<TypeRegistry>,
}

impl Module {
    /// Create a module with an empty type registry that falls back to the process-wide registry.
    ///
    /// ## Arguments
    /// * 'name'   - The module name, used in diagnostics
    /// * 'tables' - The metadata tables of the module
    pub fn new(name: &str, tables: impl MetadataTables + 'static) -> Self {
        Self::with_registries(
            name,
            Arc::new(tables),
            Arc::new(TypeRegistry::new()),
            Some(TypeRegistry::process()),
        )
    }

    /// Create a module over an existing registry.
    ///
    /// ## Arguments
    /// * 'name'     - The module name, used in diagnostics
    /// * 'tables'   - The metadata tables of the module
    /// * 'types'    - The registry holding the types the module declares
    /// * 'fallback' - A registry consulted when a name is not declared by the module
    pub fn with_registries(
        name: &str,
        tables: Arc<dyn MetadataTables>,
        types: Arc<TypeRegistry>,
        fallback: Option<Arc<TypeRegistry>>,
    ) -> Self {
        if let Some(fallback) = fallback {
            types.registry_link(PROCESS_REGISTRY_LINK, fallback);
        }

        Module {
            name: name.to_string(),
            tables,
            types,
        }
    }

    /// The module name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The metadata tables of the module
    #[must_use]
    pub fn tables(&self) -> &dyn MetadataTables {
        self.tables.as_ref()
    }

    /// The registry of types the module declares
    #[must_use]
    pub fn types(&self) -> &Arc<TypeRegistry> {
        &self.types
    }

    /// Declare a new type in this module
    pub fn declare_type(
        &self,
        namespace: &str,
        name: &str,
        flavor: CilFlavor,
        flags: u32,
    ) -> CilTypeRc {
        self.types.create_type(namespace, name, flavor, flags)
    }

    /// Locate a named type, first among the module's own types, then in the linked registries.
    ///
    /// # Errors
    /// Returns [`crate::Error::TypeNotFound`] with the qualified name if no registry knows it.
    pub fn find_type(&self, namespace: &str, name: &str) -> Result<CilTypeRc> {
        let fullname = if namespace.is_empty() {
            name.to_string()
        } else {
            format!("{namespace}.{name}")
        };

        self.types
            .get_by_fullname(&fullname, true)
            .ok_or(TypeNotFound(fullname))
    }
}

impl fmt::Debug for Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Module")
            .field("name", &self.name)
            .field("types", &self.types.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{metadata::tables::TableSet, Error};

    #[test]
    fn own_types_shadow_fallback() {
        let fallback = Arc::new(TypeRegistry::new());
        let shared = fallback.create_type("Acme", "Widget", CilFlavor::Class, 0);
        let only_shared = fallback.create_type("Acme", "Gadget", CilFlavor::Class, 0);

        let module = Module::with_registries(
            "Consumer.dll",
            Arc::new(TableSet::new()),
            Arc::new(TypeRegistry::new()),
            Some(fallback),
        );
        let own = module.declare_type("Acme", "Widget", CilFlavor::Class, 0);

        assert!(Arc::ptr_eq(&module.find_type("Acme", "Widget").unwrap(), &own));
        assert!(!Arc::ptr_eq(&own, &shared));
        assert!(Arc::ptr_eq(
            &module.find_type("Acme", "Gadget").unwrap(),
            &only_shared
        ));
    }

    #[test]
    fn unknown_type_names_qualified_name() {
        let module = Module::with_registries(
            "Consumer.dll",
            Arc::new(TableSet::new()),
            Arc::new(TypeRegistry::new()),
            None,
        );

        match module.find_type("Vendor", "Missing") {
            Err(Error::TypeNotFound(name)) => assert_eq!(name, "Vendor.Missing"),
            other => panic!("unexpected: {other:?}"),
        }
        assert!(module.find_type("", "Int32").is_err());
        assert!(module.find_type("System", "Int32").is_ok());
    }

    #[test]
    fn process_registry_is_shared() {
        let marker = TypeRegistry::process().create_type(
            "ModuleTests",
            "Shared",
            CilFlavor::Class,
            0,
        );

        let module = Module::new("First.dll", TableSet::new());
        assert_eq!(module.name(), "First.dll");
        assert!(Arc::ptr_eq(
            &module.find_type("ModuleTests", "Shared").unwrap(),
            &marker
        ));
    }
}
