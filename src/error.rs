use thiserror::Error;

macro_rules! malformed_error {
    // Single string version
    ($msg:expr) => {
        crate::Error::Malformed {
            message: $msg.to_string(),
            file: file!(),
            line: line!(),
        }
    };

    // Format string with arguments version
    ($fmt:expr, $($arg:tt)*) => {
        crate::Error::Malformed {
            message: format!($fmt, $($arg)*),
            file: file!(),
            line: line!(),
        }
    };
}

/// The generic Error type, which provides coverage for all errors this library can potentially
/// return.
///
/// Errors fall into two groups. Fatal errors abort the current disassembly or synthesis call and
/// are returned to the caller as one of the variants below. Expected failures during member
/// resolution (an external declaring type that is not loaded, an unsupported signature construct)
/// are not errors at all: the resolver reports them as "no match" and the call site is left out
/// of the resulting mapping.
///
/// # Error Categories
///
/// ## Input Errors
/// - [`Error::Malformed`] - Unknown opcode, truncated operand or corrupt signature blob
/// - [`Error::OutOfBounds`] - Attempted to read beyond the end of a buffer
/// - [`Error::NoMethodBody`] - The method to disassemble has no instruction stream
///
/// ## Type System Errors
/// - [`Error::UnsupportedPrimitive`] - Unknown primitive element type code
/// - [`Error::GenericParamOutOfRange`] / [`Error::MissingGenericContext`] - Generic parameter lookup failed
/// - [`Error::NotSupported`] - Signature construct that cannot be resolved (e.g. function pointers)
/// - [`Error::TypeNotFound`] - Qualified name not found in the module or process-wide registry
/// - [`Error::TypeError`] - General type system operation error
/// - [`Error::RecursionLimit`] - Maximum signature nesting depth exceeded
///
/// ## Synthesis Errors
/// - [`Error::InvalidConfiguration`] - Descriptor built with an empty name or without a field type
/// - [`Error::Synthesis`] - The type-creation backend rejected an operation
///
/// # Examples
///
/// ```rust
/// use ilmock::{disassembler::decode_stream, Error};
///
/// match decode_stream(&[0x24]) {
///     Err(Error::Malformed { message, .. }) => println!("rejected: {message}"),
///     other => panic!("unexpected result: {other:?}"),
/// }
/// ```
#[derive(Error, Debug)]
pub enum Error {
    /// The input is damaged and could not be decoded.
    ///
    /// Raised for unknown or reserved opcodes, truncated call operands and corrupt
    /// signature blobs. The error includes the source location where the malformation
    /// was detected for debugging purposes.
    ///
    /// # Fields
    ///
    /// * `message` - Detailed description of what was malformed
    /// * `file` - Source file where the error was detected
    /// * `line` - Source line where the error was detected
    #[error("Malformed - {file}:{line}: {message}")]
    Malformed {
        /// The message to be printed for the Malformed error
        message: String,
        /// The source file in which this error occured
        file: &'static str,
        /// The source line in which this error occured
        line: u32,
    },

    /// An out of bound access was attempted while parsing.
    #[error("Out of Bound read would have occurred!")]
    OutOfBounds,

    /// The method has no instruction stream to disassemble.
    ///
    /// Abstract, extern (P/Invoke) and runtime-provided methods carry no body.
    /// The associated value is the method's name.
    #[error("Method has no body - {0}")]
    NoMethodBody(String),

    /// A signature used a primitive element type code this library does not map.
    #[error("Unsupported primitive type - 0x{0:02X}")]
    UnsupportedPrimitive(u8),

    /// A generic parameter index was outside of the supplied generic context.
    #[error("Generic parameter index out of range - {index} (context has {count})")]
    GenericParamOutOfRange {
        /// The requested parameter index
        index: u32,
        /// The number of types in the generic context
        count: usize,
    },

    /// A generic parameter was referenced while no generic context was supplied.
    #[error("Generic parameter {0} referenced without a generic context")]
    MissingGenericContext(u32),

    /// The signature construct cannot be resolved to a runtime type.
    #[error("Not supported - {0}")]
    NotSupported(String),

    /// Failed to locate a type by its qualified name.
    ///
    /// Neither the hosting module's declared types nor the process-wide registry
    /// contained the requested `Namespace.Name`.
    #[error("Unresolved type - {0}")]
    TypeNotFound(String),

    /// General error during `TypeRegistry` usage.
    #[error("{0}")]
    TypeError(String),

    /// Recursion limit reached.
    ///
    /// Nested signatures (arrays of pointers of generic instances, ...) are bounded
    /// to prevent stack overflow on hostile input.
    #[error("Reach the maximum recursion level allowed - {0}")]
    RecursionLimit(usize),

    /// A type or field descriptor was finalized with missing or empty required values.
    #[error("Invalid configuration - {0}")]
    InvalidConfiguration(String),

    /// The type-creation backend rejected an operation.
    #[error("Synthesis failed - {0}")]
    Synthesis(String),
}
