//! Synthesis of new runtime types from declarative descriptions.
//!
//! A [`TypeDescriptor`] lists the name, attributes and ordered fields of a type. The
//! [`TypeSynthesizer`] turns it into a new type through a [`TypeCreationBackend`]: one field
//! per [`FieldDescriptor`] and a single constructor taking the write-once fields in declaration
//! order. [`RegistryBackend`] is the in-process backend, it registers synthesized types in a
//! [`crate::metadata::typesystem::TypeRegistry`] and can run their constructors.
//!
//! # Key Components
//!
//! - [`FieldDescriptorBuilder`] / [`TypeDescriptorBuilder`] - Validating builders
//! - [`TypeCreationBackend`] - What a runtime must provide to host synthesized types
//! - [`TypeSynthesizer`] - Drives a backend from a descriptor
//! - [`RegistryBackend`], [`CilObject`], [`CilValue`] - In-process types and instances
//!
//! # Example
//!
//! ```rust
//! use ilmock::prelude::*;
//! use std::sync::Arc;
//!
//! let registry = Arc::new(TypeRegistry::new());
//! let int32 = registry.get_primitive(CilPrimitiveKind::I4)?;
//!
//! let descriptor = TypeDescriptorBuilder::new()
//!     .name("OrderLine")
//!     .field(FieldDescriptorBuilder::new().name("quantity").of_type(&int32).init_only().build()?)
//!     .build()?;
//!
//! let mut synthesizer = TypeSynthesizer::new(RegistryBackend::new(registry));
//! let first = synthesizer.synthesize(&descriptor)?;
//! let second = synthesizer.synthesize(&descriptor)?;
//! assert_ne!(first.token, second.token);
//! # Ok::<(), ilmock::Error>(())
//! ```

mod backend;
mod descriptor;
mod runtime;
mod synthesizer;

pub use backend::{ConstructorOp, TypeCreationBackend};
pub use descriptor::{
    FieldDescriptor, FieldDescriptorBuilder, TypeDescriptor, TypeDescriptorBuilder,
};
pub use runtime::{CilObject, CilValue, PendingType, RegistryBackend};
pub use synthesizer::TypeSynthesizer;
