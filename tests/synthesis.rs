//! End-to-end tests for type synthesis through the in-process backend.

use ilmock::prelude::*;
use std::sync::Arc;

fn vector2(registry: &TypeRegistry) -> Result<TypeDescriptor> {
    let float = registry.get_primitive(CilPrimitiveKind::R4)?;

    TypeDescriptorBuilder::new()
        .name("Vector2")
        .namespace("Mocks")
        .value_type(true)
        .field(
            FieldDescriptorBuilder::new()
                .name("x")
                .of_type(&float)
                .init_only()
                .build()?,
        )
        .field(
            FieldDescriptorBuilder::new()
                .name("y")
                .of_type(&float)
                .init_only()
                .build()?,
        )
        .build()
}

#[test]
fn vector2_round_trip() -> Result<()> {
    let registry = Arc::new(TypeRegistry::new());
    let descriptor = vector2(&registry)?;

    let mut synthesizer = TypeSynthesizer::new(RegistryBackend::new(registry.clone()));
    let ty = synthesizer.synthesize(&descriptor)?;

    let constructor = ty
        .methods
        .iter()
        .map(|(_, method)| method.clone())
        .find(|method| method.name == ".ctor")
        .expect("constructor");
    let params: Vec<_> = constructor
        .params
        .iter()
        .map(|param| param.upgrade().expect("parameter type").flavor.clone())
        .collect();
    assert_eq!(params, [CilFlavor::R4, CilFlavor::R4]);

    let instance = synthesizer
        .backend()
        .instantiate(&ty, vec![CilValue::R4(1.0), CilValue::R4(2.0)])?;
    assert_eq!(instance.get("x"), Some(&CilValue::R4(1.0)));
    assert_eq!(instance.get("y"), Some(&CilValue::R4(2.0)));

    let field_names: Vec<_> = ty
        .fields
        .iter()
        .map(|(_, field)| field.name.clone())
        .collect();
    assert_eq!(field_names, ["x", "y"]);
    assert!(ty.fields.iter().all(|(_, field)| field.is_init_only()));

    Ok(())
}

#[test]
fn repeated_synthesis_creates_distinct_types() -> Result<()> {
    let registry = Arc::new(TypeRegistry::new());
    let descriptor = vector2(&registry)?;
    let mut synthesizer = TypeSynthesizer::new(RegistryBackend::new(registry.clone()));

    let first = synthesizer.synthesize(&descriptor)?;
    let second = synthesizer.synthesize(&descriptor)?;

    assert!(!Arc::ptr_eq(&first, &second));
    assert_eq!(first.fullname(), second.fullname());
    assert!(!first.is_assignable_to(&second));
    assert!(!second.is_assignable_to(&first));

    let backend = synthesizer.backend();
    let a = backend.instantiate(&first, vec![CilValue::R4(1.0), CilValue::R4(2.0)])?;
    let b = backend.instantiate(&second, vec![CilValue::R4(1.0), CilValue::R4(2.0)])?;
    assert_ne!(a, b);
    assert!(!a.is_instance_of(&second));
    assert!(!b.is_instance_of(&first));

    Ok(())
}

#[test]
fn empty_names_fail_before_synthesis() {
    assert!(matches!(
        TypeDescriptorBuilder::new().name("").build(),
        Err(Error::InvalidConfiguration(_))
    ));
    assert!(matches!(
        TypeDescriptorBuilder::new().build(),
        Err(Error::InvalidConfiguration(_))
    ));

    let registry = TypeRegistry::new();
    let int32 = registry.get_primitive(CilPrimitiveKind::I4).unwrap();
    assert!(matches!(
        FieldDescriptorBuilder::new().name("").of_type(&int32).build(),
        Err(Error::InvalidConfiguration(_))
    ));
    assert!(matches!(
        FieldDescriptorBuilder::new().name("count").build(),
        Err(Error::InvalidConfiguration(_))
    ));
}

#[test]
fn synthesized_types_can_be_referenced_by_later_types() -> Result<()> {
    let registry = Arc::new(TypeRegistry::new());
    let mut synthesizer = TypeSynthesizer::new(RegistryBackend::new(registry.clone()));
    let vector = synthesizer.synthesize(&vector2(&registry)?)?;

    let descriptor = TypeDescriptorBuilder::new()
        .name("Particle")
        .namespace("Mocks")
        .field(
            FieldDescriptorBuilder::new()
                .name("position")
                .of_type(&vector)
                .init_only()
                .build()?,
        )
        .field(
            FieldDescriptorBuilder::new()
                .name("label")
                .of_type(&registry.get_primitive(CilPrimitiveKind::String)?)
                .build()?,
        )
        .build()?;
    let particle = synthesizer.synthesize(&descriptor)?;

    let backend = synthesizer.backend();
    let position = backend.instantiate(&vector, vec![CilValue::R4(3.0), CilValue::R4(4.0)])?;
    let mut instance =
        backend.instantiate(&particle, vec![CilValue::Object(Box::new(position.clone()))])?;

    assert_eq!(
        instance.get("position"),
        Some(&CilValue::Object(Box::new(position)))
    );
    assert_eq!(instance.get("label"), Some(&CilValue::Null));

    instance.set("label", CilValue::String("dust".to_string()))?;
    assert_eq!(
        instance.get("label"),
        Some(&CilValue::String("dust".to_string()))
    );

    assert!(registry
        .get_by_fullname("Mocks.Particle", false)
        .is_some_and(|found| Arc::ptr_eq(&found, &particle)));
    Ok(())
}
