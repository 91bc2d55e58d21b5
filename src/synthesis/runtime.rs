//! In-process type creation on top of a [`TypeRegistry`].
//!
//! [`RegistryBackend`] finalizes synthesized types into a registry, where they sit next to the
//! primitives and every other runtime type, and keeps the constructor plan of each type so that
//! it can be executed by [`RegistryBackend::instantiate`]. Instances are [`CilObject`]s holding
//! one [`CilValue`] per declared field.

use std::{collections::HashMap, fmt, sync::Arc};

use log::trace;

use crate::{
    metadata::{
        field::{CilField, FieldAttributes},
        method::CilMethod,
        tables::TableId,
        token::Token,
        typesystem::{CilFlavor, CilPrimitiveKind, CilType, CilTypeRc, TypeRegistry},
    },
    synthesis::backend::{ConstructorOp, TypeCreationBackend},
    Error::Synthesis,
    Result,
};

/// `public hidebysig specialname rtspecialname`
const CONSTRUCTOR_FLAGS: u32 = 0x0006 | 0x0080 | 0x0800 | 0x1000;
/// Implemented by the runtime, no CIL body
const CONSTRUCTOR_IMPL_FLAGS: u32 = 0x0003;
/// Nesting limit when default-initializing value-type fields
const MAX_DEFAULT_DEPTH: usize = 16;

/// A value held by a field of a [`CilObject`]
#[derive(Debug, Clone, PartialEq)]
pub enum CilValue {
    /// `System.Boolean`
    Boolean(bool),
    /// `System.Char` (a UTF-16 code unit)
    Char(u16),
    /// `System.SByte`
    I1(i8),
    /// `System.Byte`
    U1(u8),
    /// `System.Int16`
    I2(i16),
    /// `System.UInt16`
    U2(u16),
    /// `System.Int32`
    I4(i32),
    /// `System.UInt32`
    U4(u32),
    /// `System.Int64`
    I8(i64),
    /// `System.UInt64`
    U8(u64),
    /// `System.Single`
    R4(f32),
    /// `System.Double`
    R8(f64),
    /// `System.IntPtr`
    I(isize),
    /// `System.UIntPtr`
    U(usize),
    /// `System.String`
    String(String),
    /// The null reference
    Null,
    /// An instance of a synthesized type
    Object(Box<CilObject>),
}

impl CilValue {
    /// The default value of a field of type `ty`: zero, `false`, null, or a zeroed instance for
    /// value types with fields.
    #[must_use]
    pub fn default_for(ty: &CilTypeRc) -> CilValue {
        Self::default_at_depth(ty, 0)
    }

    fn default_at_depth(ty: &CilTypeRc, depth: usize) -> CilValue {
        match ty.flavor {
            CilFlavor::Boolean => CilValue::Boolean(false),
            CilFlavor::Char => CilValue::Char(0),
            CilFlavor::I1 => CilValue::I1(0),
            CilFlavor::U1 => CilValue::U1(0),
            CilFlavor::I2 => CilValue::I2(0),
            CilFlavor::U2 => CilValue::U2(0),
            CilFlavor::I4 => CilValue::I4(0),
            CilFlavor::U4 => CilValue::U4(0),
            CilFlavor::I8 => CilValue::I8(0),
            CilFlavor::U8 => CilValue::U8(0),
            CilFlavor::R4 => CilValue::R4(0.0),
            CilFlavor::R8 => CilValue::R8(0.0),
            CilFlavor::I => CilValue::I(0),
            CilFlavor::U => CilValue::U(0),
            CilFlavor::ValueType if ty.fields.count() > 0 && depth < MAX_DEFAULT_DEPTH => {
                CilValue::Object(Box::new(CilObject::zeroed(ty, depth + 1)))
            }
            _ => CilValue::Null,
        }
    }

    /// `true` if this value can be stored in a location of type `ty`.
    ///
    /// Primitive values match their own kind (or `System.Object`), null matches every reference
    /// type, objects match their type and its base types.
    #[must_use]
    pub fn is_assignable_to(&self, ty: &CilType) -> bool {
        match (self, &ty.flavor) {
            (CilValue::Boolean(_), CilFlavor::Boolean)
            | (CilValue::Char(_), CilFlavor::Char)
            | (CilValue::I1(_), CilFlavor::I1)
            | (CilValue::U1(_), CilFlavor::U1)
            | (CilValue::I2(_), CilFlavor::I2)
            | (CilValue::U2(_), CilFlavor::U2)
            | (CilValue::I4(_), CilFlavor::I4)
            | (CilValue::U4(_), CilFlavor::U4)
            | (CilValue::I8(_), CilFlavor::I8)
            | (CilValue::U8(_), CilFlavor::U8)
            | (CilValue::R4(_), CilFlavor::R4)
            | (CilValue::R8(_), CilFlavor::R8)
            | (CilValue::I(_), CilFlavor::I)
            | (CilValue::U(_), CilFlavor::U)
            | (CilValue::String(_), CilFlavor::String) => true,
            (CilValue::Object(object), _) => object.is_instance_of(ty),
            (CilValue::Null, flavor) => !flavor.is_value_type(),
            (_, CilFlavor::Object) => true,
            _ => false,
        }
    }
}

/// An instance of a synthesized type
#[derive(Clone)]
pub struct CilObject {
    ty: CilTypeRc,
    values: Vec<CilValue>,
}

impl CilObject {
    fn zeroed(ty: &CilTypeRc, depth: usize) -> Self {
        let values = ty
            .fields
            .iter()
            .map(|(_, field)| match field.field_type.upgrade() {
                Some(field_type) => CilValue::default_at_depth(&field_type, depth),
                None => CilValue::Null,
            })
            .collect();

        CilObject {
            ty: ty.clone(),
            values,
        }
    }

    fn field_index(&self, name: &str) -> Option<usize> {
        self.ty
            .fields
            .iter()
            .position(|(_, field)| field.name == name)
    }

    /// The runtime type of this object
    #[must_use]
    pub fn type_handle(&self) -> &CilTypeRc {
        &self.ty
    }

    /// Read a field by name
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&CilValue> {
        self.field_index(name).and_then(|index| self.values.get(index))
    }

    /// Assign a field that is not write-once.
    ///
    /// # Errors
    /// Returns [`crate::Error::Synthesis`] if the field does not exist, is write-once, or cannot
    /// hold `value`.
    pub fn set(&mut self, name: &str, value: CilValue) -> Result<()> {
        let Some((index, field)) = self
            .ty
            .fields
            .iter()
            .enumerate()
            .find(|(_, (_, field))| field.name == name)
            .map(|(index, (_, field))| (index, field.clone()))
        else {
            return Err(Synthesis(format!(
                "{} has no field '{name}'",
                self.ty.fullname()
            )));
        };

        if field.is_init_only() {
            return Err(Synthesis(format!(
                "Field '{name}' of {} can only be assigned by the constructor",
                self.ty.fullname()
            )));
        }

        let assignable = field
            .field_type
            .upgrade()
            .is_some_and(|field_type| value.is_assignable_to(&field_type));
        if !assignable {
            return Err(Synthesis(format!(
                "Value {value:?} cannot be stored in field '{name}' of {}",
                self.ty.fullname()
            )));
        }

        self.values[index] = value;
        Ok(())
    }

    /// `true` if this object's type is `ty` or derives from it
    #[must_use]
    pub fn is_instance_of(&self, ty: &CilType) -> bool {
        self.ty.is_assignable_to(ty)
    }
}

impl PartialEq for CilObject {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.ty, &other.ty) && self.values == other.values
    }
}

impl fmt::Debug for CilObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut debug = f.debug_struct(&self.ty.fullname());
        for ((_, field), value) in self.ty.fields.iter().zip(&self.values) {
            debug.field(&field.name, value);
        }
        debug.finish()
    }
}

/// A type under construction in a [`RegistryBackend`]
pub struct PendingType {
    ty: CilType,
    value_type: bool,
    constructor: Option<ConstructorPlan>,
}

/// The generated constructor of a synthesized type
#[derive(Debug, Clone)]
struct ConstructorPlan {
    parameters: Vec<CilTypeRc>,
    body: Vec<ConstructorOp>,
}

/// Creates synthesized types inside a [`TypeRegistry`].
///
/// Each created type gets a fresh registry token, so two types created from identical
/// definitions are distinct and values of one are not instances of the other.
pub struct RegistryBackend {
    registry: Arc<TypeRegistry>,
    constructors: HashMap<Token, ConstructorPlan>,
    next_field_rid: u32,
    next_method_rid: u32,
}

impl RegistryBackend {
    /// Create a backend that registers its types in `registry`
    #[must_use]
    pub fn new(registry: Arc<TypeRegistry>) -> Self {
        RegistryBackend {
            registry,
            constructors: HashMap::new(),
            next_field_rid: 1,
            next_method_rid: 1,
        }
    }

    /// The registry synthesized types are added to
    #[must_use]
    pub fn registry(&self) -> &Arc<TypeRegistry> {
        &self.registry
    }

    /// Number of types this backend created
    #[must_use]
    pub fn created_count(&self) -> usize {
        self.constructors.len()
    }

    /// Run the generated constructor of `ty`.
    ///
    /// # Arguments
    /// * 'ty'        - A type created by this backend
    /// * 'arguments' - One value per write-once field, in declaration order
    ///
    /// # Errors
    /// Returns [`crate::Error::Synthesis`] if `ty` was not created by this backend, or if the
    /// arguments do not match the constructor parameters.
    pub fn instantiate(&self, ty: &CilTypeRc, arguments: Vec<CilValue>) -> Result<CilObject> {
        let plan = match (self.constructors.get(&ty.token), self.registry.get(&ty.token)) {
            (Some(plan), Some(registered)) if Arc::ptr_eq(&registered, ty) => plan,
            _ => {
                return Err(Synthesis(format!(
                    "{} was not created by this backend",
                    ty.fullname()
                )))
            }
        };

        if arguments.len() != plan.parameters.len() {
            return Err(Synthesis(format!(
                "Constructor of {} takes {} arguments, {} given",
                ty.fullname(),
                plan.parameters.len(),
                arguments.len()
            )));
        }

        for (position, (argument, parameter)) in arguments.iter().zip(&plan.parameters).enumerate()
        {
            if !argument.is_assignable_to(parameter) {
                return Err(Synthesis(format!(
                    "Argument {position} of {}::.ctor expects {}, got {argument:?}",
                    ty.fullname(),
                    parameter.fullname()
                )));
            }
        }

        let mut object = CilObject::zeroed(ty, 0);
        for op in &plan.body {
            match *op {
                // Base initializers of System.Object and System.ValueType have no effect
                ConstructorOp::CallBaseInitializer => {}
                ConstructorOp::StoreField { parameter, field } => {
                    object.values[field] = arguments[parameter].clone();
                }
            }
        }

        trace!("Instantiated {object:?}");
        Ok(object)
    }
}

impl TypeCreationBackend for RegistryBackend {
    type Pending = PendingType;
    type Handle = CilTypeRc;

    fn define_type(
        &mut self,
        namespace: &str,
        name: &str,
        attributes: u32,
        value_type: bool,
    ) -> Result<PendingType> {
        if name.is_empty() {
            return Err(Synthesis("Cannot define a type without a name".to_string()));
        }

        let flavor = if value_type {
            CilFlavor::ValueType
        } else {
            CilFlavor::Class
        };

        Ok(PendingType {
            ty: CilType::new(
                self.registry.allocate_token(),
                flavor,
                namespace,
                name,
                attributes,
            ),
            value_type,
            constructor: None,
        })
    }

    fn define_field(
        &mut self,
        pending: &mut PendingType,
        name: &str,
        field_type: &CilTypeRc,
        attributes: u32,
    ) -> Result<usize> {
        if pending.ty.field(name).is_some() {
            return Err(Synthesis(format!(
                "{} already declares a field '{name}'",
                pending.ty.fullname()
            )));
        }
        if attributes & FieldAttributes::STATIC != 0 {
            return Err(Synthesis(format!(
                "Field '{name}' of {} is static, only instance fields can be synthesized",
                pending.ty.fullname()
            )));
        }

        let token = Token::from_parts(TableId::Field, self.next_field_rid);
        self.next_field_rid += 1;

        pending
            .ty
            .add_field(Arc::new(CilField::new(token, name, attributes, field_type)));
        Ok(pending.ty.fields.count() - 1)
    }

    fn define_constructor(
        &mut self,
        pending: &mut PendingType,
        parameters: &[CilTypeRc],
        body: &[ConstructorOp],
    ) -> Result<()> {
        if pending.constructor.is_some() {
            return Err(Synthesis(format!(
                "{} already has a constructor",
                pending.ty.fullname()
            )));
        }

        let field_count = pending.ty.fields.count();
        for op in body {
            if let ConstructorOp::StoreField { parameter, field } = *op {
                if parameter >= parameters.len() || field >= field_count {
                    return Err(Synthesis(format!(
                        "Constructor of {} stores parameter {parameter} into field {field}, \
                         but it has {} parameters and {field_count} fields",
                        pending.ty.fullname(),
                        parameters.len()
                    )));
                }
            }
        }

        pending.constructor = Some(ConstructorPlan {
            parameters: parameters.to_vec(),
            body: body.to_vec(),
        });
        Ok(())
    }

    fn create_type(&mut self, pending: PendingType) -> Result<CilTypeRc> {
        let PendingType {
            ty,
            value_type,
            constructor,
        } = pending;

        let Some(plan) = constructor else {
            return Err(Synthesis(format!(
                "{} has no constructor",
                ty.fullname()
            )));
        };

        let base = self.registry.get_primitive(if value_type {
            CilPrimitiveKind::ValueType
        } else {
            CilPrimitiveKind::Object
        })?;
        let void = self.registry.get_primitive(CilPrimitiveKind::Void)?;

        let created = Arc::new(ty);
        created.set_base(&base);

        let constructor = Arc::new(
            CilMethod::new(
                Token::from_parts(TableId::MethodDef, self.next_method_rid),
                ".ctor",
                CONSTRUCTOR_FLAGS,
                &void,
                &plan.parameters,
            )
            .with_impl_flags(CONSTRUCTOR_IMPL_FLAGS),
        );
        self.next_method_rid += 1;
        constructor.set_declaring_type(&created);
        created.add_method(constructor);

        self.registry.insert(&created);
        self.constructors.insert(created.token, plan);

        Ok(created)
    }
}
