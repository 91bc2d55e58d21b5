use strum::{EnumCount, EnumIter};

use crate::metadata::{token::Token, typesystem::CilFlavor};

/// The built-in types every registry carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, EnumCount)]
pub enum CilPrimitiveKind {
    /// System.Void - represents no value
    Void,
    /// System.Boolean - true/false value
    Boolean,
    /// System.Char - Unicode 16-bit character
    Char,
    /// System.SByte - signed 8-bit integer
    I1,
    /// System.Byte - unsigned 8-bit integer
    U1,
    /// System.Int16 - signed 16-bit integer
    I2,
    /// System.UInt16 - unsigned 16-bit integer
    U2,
    /// System.Int32 - signed 32-bit integer
    I4,
    /// System.UInt32 - unsigned 32-bit integer
    U4,
    /// System.Int64 - signed 64-bit integer
    I8,
    /// System.UInt64 - unsigned 64-bit integer
    U8,
    /// System.Single - 32-bit floating point
    R4,
    /// System.Double - 64-bit floating point
    R8,
    /// System.IntPtr - native sized signed integer
    I,
    /// System.UIntPtr - native sized unsigned integer
    U,
    /// System.Object - base class for all reference types
    Object,
    /// System.String - immutable string of Unicode characters
    String,
    /// System.ValueType - base class for value types
    ValueType,
}

impl CilPrimitiveKind {
    /// The fixed token this primitive carries in every registry
    #[must_use]
    pub fn token(&self) -> Token {
        Token::new(
            0xF000_0000
                | match self {
                    CilPrimitiveKind::Void => 0x01,
                    CilPrimitiveKind::Boolean => 0x02,
                    CilPrimitiveKind::Char => 0x03,
                    CilPrimitiveKind::I1 => 0x04,
                    CilPrimitiveKind::U1 => 0x05,
                    CilPrimitiveKind::I2 => 0x06,
                    CilPrimitiveKind::U2 => 0x07,
                    CilPrimitiveKind::I4 => 0x08,
                    CilPrimitiveKind::U4 => 0x09,
                    CilPrimitiveKind::I8 => 0x0A,
                    CilPrimitiveKind::U8 => 0x0B,
                    CilPrimitiveKind::R4 => 0x0C,
                    CilPrimitiveKind::R8 => 0x0D,
                    CilPrimitiveKind::I => 0x0E,
                    CilPrimitiveKind::U => 0x0F,
                    CilPrimitiveKind::Object => 0x10,
                    CilPrimitiveKind::String => 0x11,
                    CilPrimitiveKind::ValueType => 0x13,
                },
        )
    }

    /// Namespace of the primitive (always `System`)
    #[must_use]
    pub fn namespace(&self) -> &'static str {
        "System"
    }

    /// Get the short name (without namespace)
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            CilPrimitiveKind::Void => "Void",
            CilPrimitiveKind::Boolean => "Boolean",
            CilPrimitiveKind::Char => "Char",
            CilPrimitiveKind::I1 => "SByte",
            CilPrimitiveKind::U1 => "Byte",
            CilPrimitiveKind::I2 => "Int16",
            CilPrimitiveKind::U2 => "UInt16",
            CilPrimitiveKind::I4 => "Int32",
            CilPrimitiveKind::U4 => "UInt32",
            CilPrimitiveKind::I8 => "Int64",
            CilPrimitiveKind::U8 => "UInt64",
            CilPrimitiveKind::R4 => "Single",
            CilPrimitiveKind::R8 => "Double",
            CilPrimitiveKind::I => "IntPtr",
            CilPrimitiveKind::U => "UIntPtr",
            CilPrimitiveKind::Object => "Object",
            CilPrimitiveKind::String => "String",
            CilPrimitiveKind::ValueType => "ValueType",
        }
    }

    /// Convert to `CilFlavor`
    #[must_use]
    pub fn to_flavor(&self) -> CilFlavor {
        match self {
            CilPrimitiveKind::Void => CilFlavor::Void,
            CilPrimitiveKind::Boolean => CilFlavor::Boolean,
            CilPrimitiveKind::Char => CilFlavor::Char,
            CilPrimitiveKind::I1 => CilFlavor::I1,
            CilPrimitiveKind::U1 => CilFlavor::U1,
            CilPrimitiveKind::I2 => CilFlavor::I2,
            CilPrimitiveKind::U2 => CilFlavor::U2,
            CilPrimitiveKind::I4 => CilFlavor::I4,
            CilPrimitiveKind::U4 => CilFlavor::U4,
            CilPrimitiveKind::I8 => CilFlavor::I8,
            CilPrimitiveKind::U8 => CilFlavor::U8,
            CilPrimitiveKind::R4 => CilFlavor::R4,
            CilPrimitiveKind::R8 => CilFlavor::R8,
            CilPrimitiveKind::I => CilFlavor::I,
            CilPrimitiveKind::U => CilFlavor::U,
            CilPrimitiveKind::Object => CilFlavor::Object,
            CilPrimitiveKind::String => CilFlavor::String,
            CilPrimitiveKind::ValueType => CilFlavor::Class,
        }
    }

    /// The primitive this one derives from, if any
    #[must_use]
    pub fn base(&self) -> Option<CilPrimitiveKind> {
        match self {
            CilPrimitiveKind::Object => None,
            CilPrimitiveKind::String | CilPrimitiveKind::ValueType => {
                Some(CilPrimitiveKind::Object)
            }
            _ => Some(CilPrimitiveKind::ValueType),
        }
    }
}
