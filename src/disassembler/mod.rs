//! CIL instruction decoding and call-site disassembly.
//!
//! This module turns the instruction stream of a method body into its opcode sequence and maps
//! every `call` / `callvirt` instruction to the loaded method it invokes.
//!
//! # Key Types
//! - [`OpcodeDescriptor`] - One entry of the Opcode Table (mnemonic and operand shape)
//! - [`DecodedInstructionStream`] - Decoded opcodes plus the raw call operands
//! - [`OperandReference`] - The position and token of one call instruction
//! - [`MethodBodyDescriptor`] - Opcodes plus the position-to-method mapping
//! - [`DisassemblyConfig`] - Operand mode, inheritance and depth settings
//!
//! # Main Functions
//! - [`decode_opcode`] - Decode a single opcode
//! - [`decode_stream`] - Decode a method body
//! - [`disassemble_method`] - Decode a method body and resolve its call sites
//!
//! # Example
//! ```rust
//! use ilmock::disassembler::{decode_stream, opcodes};
//!
//! let bytecode = &[opcodes::NOP, opcodes::RET];
//! let stream = decode_stream(bytecode)?;
//! assert_eq!(stream.mnemonics().collect::<Vec<_>>(), ["nop", "ret"]);
//! # Ok::<(), ilmock::Error>(())
//! ```

mod body;
mod decoder;
mod instruction;
pub mod opcodes;

pub use body::{
    disassemble_method, DisassemblyConfig, MethodBodyDescriptor, MethodBodyDisassembler,
};
pub use decoder::{decode_opcode, decode_stream, decode_stream_with_mode};
pub use instruction::{
    DecodedInstructionStream, OpcodeDescriptor, OperandMode, OperandReference, OperandType,
};
pub use opcodes::{INSTRUCTIONS, INSTRUCTIONS_FE};
