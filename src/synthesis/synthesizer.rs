//! Drives a [`TypeCreationBackend`] from a [`TypeDescriptor`].

use log::debug;

use crate::{
    metadata::typesystem::CilTypeRc,
    synthesis::{
        backend::{ConstructorOp, TypeCreationBackend},
        descriptor::TypeDescriptor,
    },
    Result,
};

/// Synthesizes runtime types from descriptors.
///
/// Every call to [`TypeSynthesizer::synthesize`] creates a new type, there is no caching by
/// descriptor or name. The generated type has one field per descriptor field, in order, and a
/// single constructor that takes the write-once fields positionally.
///
/// # Examples
///
/// ```rust
/// use ilmock::{
///     metadata::typesystem::{CilPrimitiveKind, TypeRegistry},
///     synthesis::{
///         CilValue, FieldDescriptorBuilder, RegistryBackend, TypeDescriptorBuilder,
///         TypeSynthesizer,
///     },
/// };
/// use std::sync::Arc;
///
/// let registry = Arc::new(TypeRegistry::new());
/// let float = registry.get_primitive(CilPrimitiveKind::R4)?;
/// let descriptor = TypeDescriptorBuilder::new()
///     .name("Vector2")
///     .value_type(true)
///     .field(FieldDescriptorBuilder::new().name("x").of_type(&float).init_only().build()?)
///     .field(FieldDescriptorBuilder::new().name("y").of_type(&float).init_only().build()?)
///     .build()?;
///
/// let mut synthesizer = TypeSynthesizer::new(RegistryBackend::new(registry));
/// let vector2 = synthesizer.synthesize(&descriptor)?;
///
/// let value = synthesizer
///     .backend()
///     .instantiate(&vector2, vec![CilValue::R4(1.0), CilValue::R4(2.0)])?;
/// assert_eq!(value.get("x"), Some(&CilValue::R4(1.0)));
/// # Ok::<(), ilmock::Error>(())
/// ```
pub struct TypeSynthesizer<B: TypeCreationBackend> {
    backend: B,
}

impl<B: TypeCreationBackend> TypeSynthesizer<B> {
    /// Create a synthesizer on top of `backend`
    pub fn new(backend: B) -> Self {
        TypeSynthesizer { backend }
    }

    /// The backend
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Mutable access to the backend
    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    /// Consume the synthesizer and return the backend
    pub fn into_backend(self) -> B {
        self.backend
    }

    /// Create a new type from `descriptor`.
    ///
    /// The constructor body invokes the base initializer and then stores parameter `n` into the
    /// `n`-th write-once field. Fields that are not write-once are left at their default value.
    ///
    /// # Arguments
    /// * 'descriptor' - The type to create
    ///
    /// # Errors
    /// Returns any error reported by the backend; no partially defined type is kept.
    pub fn synthesize(&mut self, descriptor: &TypeDescriptor) -> Result<B::Handle> {
        let mut pending = self.backend.define_type(
            descriptor.namespace(),
            descriptor.name(),
            descriptor.attributes(),
            descriptor.is_value_type(),
        )?;

        let mut parameters: Vec<CilTypeRc> = Vec::new();
        let mut body = vec![ConstructorOp::CallBaseInitializer];

        for field in descriptor.fields() {
            let handle = self.backend.define_field(
                &mut pending,
                field.name(),
                field.field_type(),
                field.attributes(),
            )?;

            if field.is_init_only() {
                body.push(ConstructorOp::StoreField {
                    parameter: parameters.len(),
                    field: handle,
                });
                parameters.push(field.field_type().clone());
            }
        }

        self.backend
            .define_constructor(&mut pending, &parameters, &body)?;
        let handle = self.backend.create_type(pending)?;

        debug!(
            "Synthesized type {} with {} fields and a {}-parameter constructor",
            descriptor.fullname(),
            descriptor.fields().len(),
            parameters.len()
        );

        Ok(handle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        metadata::typesystem::CilPrimitiveKind,
        synthesis::{FieldDescriptorBuilder, TypeDescriptorBuilder},
        test::TestTypes,
        Error,
    };

    /// Records the calls it receives
    #[derive(Default)]
    struct RecordingBackend {
        calls: Vec<String>,
        constructor: Option<(Vec<String>, Vec<ConstructorOp>)>,
        fail_on_field: Option<String>,
    }

    impl TypeCreationBackend for RecordingBackend {
        type Pending = (String, usize);
        type Handle = String;

        fn define_type(
            &mut self,
            namespace: &str,
            name: &str,
            _attributes: u32,
            value_type: bool,
        ) -> Result<Self::Pending> {
            self.calls
                .push(format!("type {namespace}.{name} value_type={value_type}"));
            Ok((name.to_string(), 0))
        }

        fn define_field(
            &mut self,
            pending: &mut Self::Pending,
            name: &str,
            field_type: &CilTypeRc,
            _attributes: u32,
        ) -> Result<usize> {
            if self.fail_on_field.as_deref() == Some(name) {
                return Err(Error::Synthesis(format!("cannot define {name}")));
            }
            self.calls
                .push(format!("field {name}: {}", field_type.fullname()));
            pending.1 += 1;
            Ok(pending.1 - 1)
        }

        fn define_constructor(
            &mut self,
            _pending: &mut Self::Pending,
            parameters: &[CilTypeRc],
            body: &[ConstructorOp],
        ) -> Result<()> {
            self.calls.push("ctor".to_string());
            self.constructor = Some((
                parameters.iter().map(|p| p.fullname()).collect(),
                body.to_vec(),
            ));
            Ok(())
        }

        fn create_type(&mut self, pending: Self::Pending) -> Result<Self::Handle> {
            self.calls.push("create".to_string());
            Ok(pending.0)
        }
    }

    #[test]
    fn drives_backend_in_order() {
        let types = TestTypes::new();
        let int32 = types.int32();
        let string = types.primitive(CilPrimitiveKind::String);

        let descriptor = TypeDescriptorBuilder::new()
            .name("Customer")
            .namespace("Shop")
            .field(FieldDescriptorBuilder::new().name("id").of_type(&int32).init_only().build().unwrap())
            .field(FieldDescriptorBuilder::new().name("note").of_type(&string).build().unwrap())
            .field(FieldDescriptorBuilder::new().name("name").of_type(&string).init_only().build().unwrap())
            .build()
            .unwrap();

        let mut synthesizer = TypeSynthesizer::new(RecordingBackend::default());
        let handle = synthesizer.synthesize(&descriptor).unwrap();
        assert_eq!(handle, "Customer");

        let backend = synthesizer.into_backend();
        assert_eq!(
            backend.calls,
            [
                "type Shop.Customer value_type=false",
                "field id: System.Int32",
                "field note: System.String",
                "field name: System.String",
                "ctor",
                "create",
            ]
        );

        let (parameters, body) = backend.constructor.unwrap();
        assert_eq!(parameters, ["System.Int32", "System.String"]);
        assert_eq!(
            body,
            [
                ConstructorOp::CallBaseInitializer,
                ConstructorOp::StoreField { parameter: 0, field: 0 },
                ConstructorOp::StoreField { parameter: 1, field: 2 },
            ]
        );
    }

    #[test]
    fn empty_type_gets_parameterless_constructor() {
        let descriptor = TypeDescriptorBuilder::new().name("Marker").build().unwrap();

        let mut synthesizer = TypeSynthesizer::new(RecordingBackend::default());
        synthesizer.synthesize(&descriptor).unwrap();

        let (parameters, body) = synthesizer.backend_mut().constructor.take().unwrap();
        assert!(parameters.is_empty());
        assert_eq!(body, [ConstructorOp::CallBaseInitializer]);
    }

    #[test]
    fn backend_failure_stops_synthesis() {
        let types = TestTypes::new();
        let int32 = types.int32();
        let descriptor = TypeDescriptorBuilder::new()
            .name("Broken")
            .field(FieldDescriptorBuilder::new().name("bad").of_type(&int32).build().unwrap())
            .build()
            .unwrap();

        let backend = RecordingBackend {
            fail_on_field: Some("bad".to_string()),
            ..RecordingBackend::default()
        };
        let mut synthesizer = TypeSynthesizer::new(backend);

        assert!(matches!(
            synthesizer.synthesize(&descriptor),
            Err(Error::Synthesis(_))
        ));
        assert!(!synthesizer.backend().calls.iter().any(|call| call == "create"));
    }
}
