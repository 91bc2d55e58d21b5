//! # ilmock Prelude
//!
//! This module provides a convenient prelude for the most commonly used types and traits
//! of the library. Import this module to get quick access to the disassembler, the type
//! system and type synthesis.

// ================================================================================================
// Core Types and Error Handling
// ================================================================================================

/// The main error type for all ilmock operations
pub use crate::Error;

/// The result type used throughout ilmock
pub use crate::Result;

/// Low-level byte cursor
pub use crate::Parser;

// ================================================================================================
// Disassembly
// ================================================================================================

/// Decoding of instruction streams
pub use crate::disassembler::{
    decode_opcode, decode_stream, decode_stream_with_mode, DecodedInstructionStream,
    OpcodeDescriptor, OperandMode, OperandReference, OperandType,
};

/// Method body disassembly
pub use crate::disassembler::{
    disassemble_method, DisassemblyConfig, MethodBodyDescriptor, MethodBodyDisassembler,
};

// ================================================================================================
// Metadata
// ================================================================================================

/// Metadata token type for referencing table entries
pub use crate::metadata::token::Token;

/// Metadata table rows
pub use crate::metadata::tables::{
    CodedIndex, CodedIndexType, MemberRefKind, MemberRefRaw, MetadataTables, TableId, TableSet,
    TypeAttributes, TypeDefRaw, TypeRefRaw, TypeSpecRaw,
};

/// Signature parsing
pub use crate::metadata::signatures::{
    parse_method_signature, parse_type_spec_signature, SignatureMethod, SignatureParameter,
    SignatureParser, TypeSignature,
};

/// Hosting module and member resolution
pub use crate::metadata::{memberresolver::MemberResolver, module::Module};

/// Members of runtime types
pub use crate::metadata::{
    field::{CilField, FieldAttributes, FieldRc},
    method::{CilMethod, MethodRc},
};

// ================================================================================================
// Type System
// ================================================================================================

/// Runtime types and signature type resolution
pub use crate::metadata::typesystem::{
    CilFlavor, CilPrimitiveKind, CilType, CilTypeRc, CilTypeRef, TypeRegistry, TypeResolver,
};

// ================================================================================================
// Type Synthesis
// ================================================================================================

/// Descriptors, synthesizer and the in-process backend
pub use crate::synthesis::{
    CilObject, CilValue, ConstructorOp, FieldDescriptor, FieldDescriptorBuilder,
    RegistryBackend, TypeCreationBackend, TypeDescriptor, TypeDescriptorBuilder,
    TypeSynthesizer,
};
