//! Decoded instruction types.
//!
//! The decoder does not build rich instruction objects: a decoded stream is the ordered list of
//! opcode descriptors (one per instruction, the `0xFE` prefix folded into its instruction) plus an
//! [`OperandReference`] for every call-style instruction. Positions are logical instruction
//! indices, never byte offsets.
//!
//! # Key Components
//!
//! - [`OperandType`] - Encoded operand shape of an opcode
//! - [`OpcodeDescriptor`] - One entry of the static opcode tables
//! - [`OperandReference`] - Raw token captured after `call` / `callvirt`
//! - [`DecodedInstructionStream`] - Result of decoding one method body
//! - [`OperandMode`] - How the decoder treats operands other than call tokens

use crate::{
    disassembler::opcodes::{self, INSTRUCTIONS, INSTRUCTIONS_FE},
    metadata::token::Token,
};

/// Types of operands for CIL instructions.
///
/// Each variant corresponds to the encoded size of the inline operand following the opcode.
///
/// # Examples
///
/// ```rust
/// use ilmock::disassembler::OperandType;
///
/// assert_eq!(OperandType::None.size(), Some(0));
/// assert_eq!(OperandType::Int8.size(), Some(1));
/// assert_eq!(OperandType::Token.size(), Some(4));
/// assert_eq!(OperandType::Float64.size(), Some(8));
/// assert_eq!(OperandType::Switch.size(), None);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperandType {
    /// No operand present
    None,
    /// Signed 8-bit integer
    Int8,
    /// Unsigned 8-bit integer
    UInt8,
    /// Signed 16-bit integer
    Int16,
    /// Unsigned 16-bit integer
    UInt16,
    /// Signed 32-bit integer
    Int32,
    /// Unsigned 32-bit integer
    UInt32,
    /// Signed 64-bit integer
    Int64,
    /// Unsigned 64-bit integer
    UInt64,
    /// 32-bit floating point
    Float32,
    /// 64-bit floating point
    Float64,
    /// Metadata token reference
    Token,
    /// Jump table: a 4-byte count followed by `count` 4-byte targets
    Switch,
}

impl OperandType {
    /// Size in bytes of the inline operand, `None` for the variable-length switch table.
    #[must_use]
    pub const fn size(&self) -> Option<usize> {
        match self {
            OperandType::None => Some(0),
            OperandType::Int8 | OperandType::UInt8 => Some(1),
            OperandType::Int16 | OperandType::UInt16 => Some(2),
            OperandType::Int32
            | OperandType::UInt32
            | OperandType::Float32
            | OperandType::Token => Some(4),
            OperandType::Int64 | OperandType::UInt64 | OperandType::Float64 => Some(8),
            OperandType::Switch => None,
        }
    }
}

/// One opcode of the instruction set: its encoding, mnemonic and operand shape.
///
/// Descriptors live in the static tables [`INSTRUCTIONS`] and [`INSTRUCTIONS_FE`] and are handed
/// out as `&'static` references. Codes the instruction set leaves unassigned are present as
/// reserved entries with an empty mnemonic so the tables can be indexed directly by byte value.
///
/// # Examples
///
/// ```rust
/// use ilmock::disassembler::{opcodes, OpcodeDescriptor};
///
/// let call = OpcodeDescriptor::lookup(0, opcodes::CALL).unwrap();
/// assert_eq!(call.mnemonic, "call");
/// assert!(call.is_call());
///
/// let ceq = OpcodeDescriptor::lookup(opcodes::FE_PREFIX, opcodes::FE_CEQ).unwrap();
/// assert_eq!(ceq.code(), 0xFE01);
///
/// assert!(OpcodeDescriptor::lookup(0, 0x24).is_none());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpcodeDescriptor {
    /// `0xFE` for two-byte instructions, `0` otherwise
    pub prefix: u8,
    /// The (second) opcode byte
    pub opcode: u8,
    /// ECMA-335 mnemonic, empty for reserved codes
    pub mnemonic: &'static str,
    /// Encoded shape of the inline operand
    pub op_type: OperandType,
}

impl OpcodeDescriptor {
    /// Placeholder for unassigned codes.
    pub const RESERVED: OpcodeDescriptor = OpcodeDescriptor {
        prefix: 0,
        opcode: 0,
        mnemonic: "",
        op_type: OperandType::None,
    };

    /// Create a descriptor.
    #[must_use]
    pub const fn new(prefix: u8, opcode: u8, mnemonic: &'static str, op_type: OperandType) -> Self {
        OpcodeDescriptor {
            prefix,
            opcode,
            mnemonic,
            op_type,
        }
    }

    /// Look up an assigned opcode. `prefix` is `0` for the single-byte table and
    /// [`opcodes::FE_PREFIX`] for the extended table.
    ///
    /// Returns `None` for reserved codes and unknown prefixes.
    #[must_use]
    pub fn lookup(prefix: u8, opcode: u8) -> Option<&'static OpcodeDescriptor> {
        let table: &'static [OpcodeDescriptor] = match prefix {
            0 => &INSTRUCTIONS,
            opcodes::FE_PREFIX => &INSTRUCTIONS_FE,
            _ => return None,
        };

        table
            .get(opcode as usize)
            .filter(|descriptor| !descriptor.is_reserved())
    }

    /// Numeric code: the single byte, or `0xFE00 | second` for extended opcodes.
    #[must_use]
    pub const fn code(&self) -> u16 {
        ((self.prefix as u16) << 8) | self.opcode as u16
    }

    /// Number of bytes the opcode itself occupies (1 or 2), excluding its operand.
    #[must_use]
    pub const fn encoded_len(&self) -> usize {
        if self.prefix == 0 {
            1
        } else {
            2
        }
    }

    /// `true` for unassigned codes.
    #[must_use]
    pub const fn is_reserved(&self) -> bool {
        self.mnemonic.is_empty()
    }

    /// `true` for the two invoke instructions whose operands get resolved: `call` and `callvirt`.
    #[must_use]
    pub const fn is_call(&self) -> bool {
        self.prefix == 0 && (self.opcode == opcodes::CALL || self.opcode == opcodes::CALLVIRT)
    }
}

/// The raw 4-byte token following a call-style instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperandReference {
    /// Logical index of the call instruction within the decoded stream
    pub position: usize,
    /// Byte offset of the call instruction within the method body
    pub offset: usize,
    /// The call-style opcode (`call` or `callvirt`)
    pub opcode: &'static OpcodeDescriptor,
    /// The operand bytes, verbatim, as a token
    pub token: Token,
}

/// The result of decoding one method body.
///
/// Produced once per body and read-only afterwards. Decoding the same bytes twice yields equal
/// values.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DecodedInstructionStream {
    /// One descriptor per decoded instruction, in stream order
    pub instructions: Vec<&'static OpcodeDescriptor>,
    /// One entry per call-style instruction, ordered by position
    pub operands: Vec<OperandReference>,
}

impl DecodedInstructionStream {
    /// Number of decoded instructions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    /// `true` if no instruction was decoded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    /// Mnemonics of all decoded instructions, in order.
    pub fn mnemonics(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.instructions.iter().map(|descriptor| descriptor.mnemonic)
    }

    /// The captured call operand at `position`, if that instruction is a call.
    #[must_use]
    pub fn operand_at(&self, position: usize) -> Option<&OperandReference> {
        self.operands
            .binary_search_by_key(&position, |operand| operand.position)
            .ok()
            .and_then(|index| self.operands.get(index))
    }
}

/// How the decoder treats inline operands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OperandMode {
    /// Only the 4-byte tokens of `call` / `callvirt` are captured and skipped. Every other
    /// operand byte is read as the next opcode.
    #[default]
    CallTokensOnly,
    /// Every inline operand is skipped according to its [`OperandType`], including switch tables.
    Full,
}
