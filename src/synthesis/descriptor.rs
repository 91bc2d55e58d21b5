//! Declarative descriptions of types to synthesize.
//!
//! [`TypeDescriptor`] and [`FieldDescriptor`] are immutable once built. The builders validate
//! eagerly: a field without a name or type fails when the field is built, a type without a name
//! (or with two fields of the same name) fails when the type is built.

use crate::{
    metadata::{
        field::FieldAttributes,
        tables::TypeAttributes,
        typesystem::{CilFlavor, CilTypeRc},
    },
    Error::InvalidConfiguration,
    Result,
};

/// A field of a type to synthesize
#[derive(Debug, Clone)]
pub struct FieldDescriptor {
    name: String,
    field_type: CilTypeRc,
    attributes: u32,
    init_only: bool,
}

impl FieldDescriptor {
    /// The field name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The declared type of the field
    #[must_use]
    pub fn field_type(&self) -> &CilTypeRc {
        &self.field_type
    }

    /// `FieldAttributes` of the field, including [`FieldAttributes::INIT_ONLY`] for write-once
    /// fields
    #[must_use]
    pub fn attributes(&self) -> u32 {
        self.attributes
    }

    /// `true` if the field is assigned by the constructor only
    #[must_use]
    pub fn is_init_only(&self) -> bool {
        self.init_only
    }
}

/// A type to synthesize: name, attributes and fields in declaration order.
///
/// The order of the fields is significant: the generated constructor takes the write-once fields
/// as parameters in that order.
#[derive(Debug, Clone)]
pub struct TypeDescriptor {
    name: String,
    namespace: String,
    attributes: u32,
    value_type: bool,
    fields: Vec<FieldDescriptor>,
}

impl TypeDescriptor {
    /// The simple type name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The namespace (can be empty)
    #[must_use]
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// `Namespace.Name`, or just the name without a namespace
    #[must_use]
    pub fn fullname(&self) -> String {
        if self.namespace.is_empty() {
            self.name.clone()
        } else {
            format!("{}.{}", self.namespace, self.name)
        }
    }

    /// `TypeAttributes` of the type
    #[must_use]
    pub fn attributes(&self) -> u32 {
        self.attributes
    }

    /// `true` for value types, `false` for classes
    #[must_use]
    pub fn is_value_type(&self) -> bool {
        self.value_type
    }

    /// All fields, in declaration order
    #[must_use]
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    /// The write-once fields in declaration order; these become the constructor parameters
    pub fn write_once_fields(&self) -> impl Iterator<Item = &FieldDescriptor> + '_ {
        self.fields.iter().filter(|field| field.init_only)
    }
}

/// Builder for [`FieldDescriptor`].
///
/// # Examples
///
/// ```rust
/// use ilmock::{
///     metadata::typesystem::{CilPrimitiveKind, TypeRegistry},
///     synthesis::FieldDescriptorBuilder,
/// };
///
/// let registry = TypeRegistry::new();
/// let field = FieldDescriptorBuilder::new()
///     .name("x")
///     .of_type(&registry.get_primitive(CilPrimitiveKind::R4)?)
///     .init_only()
///     .build()?;
///
/// assert!(field.is_init_only());
/// assert!(FieldDescriptorBuilder::new().name("y").build().is_err());
/// # Ok::<(), ilmock::Error>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct FieldDescriptorBuilder {
    name: Option<String>,
    field_type: Option<CilTypeRc>,
    attributes: Option<u32>,
    init_only: bool,
}

impl FieldDescriptorBuilder {
    /// Creates a new builder
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the field name.
    ///
    /// # Arguments
    ///
    /// * `name` - The field name, must not be empty
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets the field type.
    ///
    /// # Arguments
    ///
    /// * `field_type` - Any type except `System.Void`
    #[must_use]
    pub fn of_type(mut self, field_type: &CilTypeRc) -> Self {
        self.field_type = Some(field_type.clone());
        self
    }

    /// Sets the `FieldAttributes` (default: [`FieldAttributes::PUBLIC`]).
    #[must_use]
    pub fn attributes(mut self, attributes: u32) -> Self {
        self.attributes = Some(attributes);
        self
    }

    /// Makes the field write-once: it is assigned by the generated constructor only.
    #[must_use]
    pub fn init_only(mut self) -> Self {
        self.init_only = true;
        self
    }

    /// Builds the descriptor.
    ///
    /// # Errors
    /// Returns [`crate::Error::InvalidConfiguration`] if the name is missing or empty, or if the
    /// type is missing or `System.Void`.
    pub fn build(self) -> Result<FieldDescriptor> {
        let name = match self.name {
            Some(name) if !name.is_empty() => name,
            _ => {
                return Err(InvalidConfiguration(
                    "Field name is required and must not be empty".to_string(),
                ))
            }
        };

        let Some(field_type) = self.field_type else {
            return Err(InvalidConfiguration(format!(
                "Field '{name}' has no type"
            )));
        };
        if field_type.flavor == CilFlavor::Void {
            return Err(InvalidConfiguration(format!(
                "Field '{name}' cannot be of type System.Void"
            )));
        }

        let mut attributes = self.attributes.unwrap_or(FieldAttributes::PUBLIC);
        if self.init_only {
            attributes |= FieldAttributes::INIT_ONLY;
        }

        Ok(FieldDescriptor {
            name,
            field_type,
            attributes,
            init_only: self.init_only || attributes & FieldAttributes::INIT_ONLY != 0,
        })
    }
}

/// Builder for [`TypeDescriptor`].
///
/// # Examples
///
/// ```rust
/// use ilmock::{
///     metadata::typesystem::{CilPrimitiveKind, TypeRegistry},
///     synthesis::{FieldDescriptorBuilder, TypeDescriptorBuilder},
/// };
///
/// let registry = TypeRegistry::new();
/// let float = registry.get_primitive(CilPrimitiveKind::R4)?;
///
/// let descriptor = TypeDescriptorBuilder::new()
///     .name("Vector2")
///     .namespace("Geometry")
///     .field(FieldDescriptorBuilder::new().name("x").of_type(&float).init_only().build()?)
///     .field(FieldDescriptorBuilder::new().name("y").of_type(&float).init_only().build()?)
///     .build()?;
///
/// assert_eq!(descriptor.fullname(), "Geometry.Vector2");
/// assert_eq!(descriptor.write_once_fields().count(), 2);
/// # Ok::<(), ilmock::Error>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct TypeDescriptorBuilder {
    name: Option<String>,
    namespace: Option<String>,
    attributes: Option<u32>,
    value_type: bool,
    fields: Vec<FieldDescriptor>,
}

impl TypeDescriptorBuilder {
    /// Creates a new builder
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the type name.
    ///
    /// # Arguments
    ///
    /// * `name` - The simple name of the type (without namespace), must not be empty
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets the type namespace (default: none).
    #[must_use]
    pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    /// Sets the `TypeAttributes` (default: [`TypeAttributes::PUBLIC`] |
    /// [`TypeAttributes::SEALED`]).
    #[must_use]
    pub fn attributes(mut self, attributes: u32) -> Self {
        self.attributes = Some(attributes);
        self
    }

    /// Synthesize a value type instead of a class.
    #[must_use]
    pub fn value_type(mut self, value_type: bool) -> Self {
        self.value_type = value_type;
        self
    }

    /// Appends a field.
    #[must_use]
    pub fn field(mut self, field: FieldDescriptor) -> Self {
        self.fields.push(field);
        self
    }

    /// Builds the descriptor.
    ///
    /// # Errors
    /// Returns [`crate::Error::InvalidConfiguration`] if the name is missing or empty, or if two
    /// fields share a name.
    pub fn build(self) -> Result<TypeDescriptor> {
        let name = match self.name {
            Some(name) if !name.is_empty() => name,
            _ => {
                return Err(InvalidConfiguration(
                    "Type name is required and must not be empty".to_string(),
                ))
            }
        };

        for (index, field) in self.fields.iter().enumerate() {
            if self.fields[..index]
                .iter()
                .any(|earlier| earlier.name == field.name)
            {
                return Err(InvalidConfiguration(format!(
                    "Type '{name}' declares field '{}' more than once",
                    field.name
                )));
            }
        }

        Ok(TypeDescriptor {
            name,
            namespace: self.namespace.unwrap_or_default(),
            attributes: self
                .attributes
                .unwrap_or(TypeAttributes::PUBLIC | TypeAttributes::SEALED),
            value_type: self.value_type,
            fields: self.fields,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{metadata::typesystem::CilPrimitiveKind, test::TestTypes, Error};

    #[test]
    fn field_requires_name_and_type() {
        let types = TestTypes::new();
        let int32 = types.int32();

        assert!(matches!(
            FieldDescriptorBuilder::new().of_type(&int32).build(),
            Err(Error::InvalidConfiguration(_))
        ));
        assert!(matches!(
            FieldDescriptorBuilder::new().name("").of_type(&int32).build(),
            Err(Error::InvalidConfiguration(_))
        ));
        assert!(matches!(
            FieldDescriptorBuilder::new().name("count").build(),
            Err(Error::InvalidConfiguration(_))
        ));

        let void = types.primitive(CilPrimitiveKind::Void);
        assert!(FieldDescriptorBuilder::new()
            .name("nothing")
            .of_type(&void)
            .build()
            .is_err());
    }

    #[test]
    fn field_attributes() {
        let types = TestTypes::new();
        let int32 = types.int32();

        let plain = FieldDescriptorBuilder::new()
            .name("count")
            .of_type(&int32)
            .build()
            .unwrap();
        assert_eq!(plain.attributes(), FieldAttributes::PUBLIC);
        assert!(!plain.is_init_only());

        let write_once = FieldDescriptorBuilder::new()
            .name("id")
            .of_type(&int32)
            .attributes(FieldAttributes::PRIVATE)
            .init_only()
            .build()
            .unwrap();
        assert_eq!(
            write_once.attributes(),
            FieldAttributes::PRIVATE | FieldAttributes::INIT_ONLY
        );
        assert!(write_once.is_init_only());

        let from_flags = FieldDescriptorBuilder::new()
            .name("key")
            .of_type(&int32)
            .attributes(FieldAttributes::PUBLIC | FieldAttributes::INIT_ONLY)
            .build()
            .unwrap();
        assert!(from_flags.is_init_only());
    }

    #[test]
    fn type_requires_name() {
        assert!(matches!(
            TypeDescriptorBuilder::new().build(),
            Err(Error::InvalidConfiguration(_))
        ));
        assert!(matches!(
            TypeDescriptorBuilder::new().name("").build(),
            Err(Error::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn duplicate_fields_rejected() {
        let types = TestTypes::new();
        let int32 = types.int32();
        let field = || {
            FieldDescriptorBuilder::new()
                .name("value")
                .of_type(&int32)
                .build()
                .unwrap()
        };

        let result = TypeDescriptorBuilder::new()
            .name("Twice")
            .field(field())
            .field(field())
            .build();
        assert!(matches!(result, Err(Error::InvalidConfiguration(_))));
    }

    #[test]
    fn write_once_fields_keep_order() {
        let types = TestTypes::new();
        let int32 = types.int32();
        let field = |name: &str, init_only: bool| {
            let builder = FieldDescriptorBuilder::new().name(name).of_type(&int32);
            if init_only {
                builder.init_only().build().unwrap()
            } else {
                builder.build().unwrap()
            }
        };

        let descriptor = TypeDescriptorBuilder::new()
            .name("Point3")
            .field(field("z", true))
            .field(field("cache", false))
            .field(field("a", true))
            .build()
            .unwrap();

        assert_eq!(descriptor.fullname(), "Point3");
        assert_eq!(
            descriptor.attributes(),
            TypeAttributes::PUBLIC | TypeAttributes::SEALED
        );
        assert_eq!(descriptor.fields().len(), 3);
        let names: Vec<_> = descriptor.write_once_fields().map(FieldDescriptor::name).collect();
        assert_eq!(names, ["z", "a"]);
    }
}
