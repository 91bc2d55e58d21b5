//! Factories shared by the unit tests.

use std::sync::{
    atomic::{AtomicU32, Ordering},
    Arc, Once,
};

use crate::metadata::{
    method::{CilMethod, MethodRc},
    module::Module,
    tables::{CodedIndex, TableSet, TypeAttributes},
    token::Token,
    typesystem::{CilFlavor, CilPrimitiveKind, CilTypeRc, TypeRegistry},
};

static NEXT_METHOD_RID: AtomicU32 = AtomicU32::new(1);
static LOGGER: Once = Once::new();

// Route `log` output through the test harness
pub fn init_logger() {
    LOGGER.call_once(|| {
        let _ = env_logger::builder().is_test(true).try_init();
    });
}

// Helper function to create a public instance method and attach it to nothing yet
pub fn create_method(
    declaring: &CilTypeRc,
    name: &str,
    return_type: CilTypeRc,
    params: &[CilTypeRc],
) -> MethodRc {
    let rid = NEXT_METHOD_RID.fetch_add(1, Ordering::Relaxed);
    let method = Arc::new(CilMethod::new(
        Token::new(0x0600_0000 | rid),
        name,
        0x0006,
        &return_type,
        params,
    ));
    method.set_declaring_type(declaring);
    method
}

/// A standalone registry for tests that only need types
pub struct TestTypes {
    registry: Arc<TypeRegistry>,
}

impl TestTypes {
    pub fn new() -> Self {
        init_logger();
        TestTypes {
            registry: Arc::new(TypeRegistry::new()),
        }
    }

    pub fn registry(&self) -> &Arc<TypeRegistry> {
        &self.registry
    }

    pub fn class(&self, namespace: &str, name: &str) -> CilTypeRc {
        self.registry
            .create_type(namespace, name, CilFlavor::Class, TypeAttributes::PUBLIC)
    }

    pub fn primitive(&self, kind: CilPrimitiveKind) -> CilTypeRc {
        self.registry.get_primitive(kind).unwrap()
    }

    pub fn int32(&self) -> CilTypeRc {
        self.primitive(CilPrimitiveKind::I4)
    }
}

/// Builds a `Module` over in-memory tables and an isolated registry
pub struct TestModule {
    tables: TableSet,
    types: Arc<TypeRegistry>,
    fallback: Option<Arc<TypeRegistry>>,
}

impl TestModule {
    pub fn new() -> Self {
        init_logger();
        TestModule {
            tables: TableSet::new(),
            types: Arc::new(TypeRegistry::new()),
            fallback: None,
        }
    }

    pub fn with_fallback(mut self, fallback: Arc<TypeRegistry>) -> Self {
        self.fallback = Some(fallback);
        self
    }

    pub fn types(&self) -> &Arc<TypeRegistry> {
        &self.types
    }

    pub fn primitive(&self, kind: CilPrimitiveKind) -> CilTypeRc {
        self.types.get_primitive(kind).unwrap()
    }

    pub fn declare_class(&self, namespace: &str, name: &str) -> CilTypeRc {
        let object = self.primitive(CilPrimitiveKind::Object);
        let declared =
            self.types
                .create_type(namespace, name, CilFlavor::Class, TypeAttributes::PUBLIC);
        declared.set_base(&object);
        declared
    }

    pub fn declare_generic_class(
        &self,
        namespace: &str,
        name: &str,
        params: &[&str],
    ) -> CilTypeRc {
        self.types.create_generic_type(
            namespace,
            name,
            CilFlavor::Class,
            TypeAttributes::PUBLIC,
            params,
        )
    }

    pub fn type_ref(&mut self, namespace: &str, name: &str) -> Token {
        self.tables.add_type_ref(namespace, name)
    }

    pub fn type_def(&mut self, namespace: &str, name: &str) -> Token {
        self.tables
            .add_type_def(TypeAttributes::PUBLIC, namespace, name)
    }

    pub fn type_spec(&mut self, signature: &[u8]) -> Token {
        self.tables.add_type_spec(signature)
    }

    pub fn member_ref(&mut self, parent: Token, name: &str, signature: &[u8]) -> Token {
        let class = CodedIndex::new(parent.table_id().unwrap(), parent.row());
        self.tables.add_member_ref(class, name, signature)
    }

    pub fn build(self) -> Module {
        Module::with_registries("Test.dll", Arc::new(self.tables), self.types, self.fallback)
    }
}
