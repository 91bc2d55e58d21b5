//! Instruction Decoder: turns a method body into a [`DecodedInstructionStream`].
//!
//! The scan is byte by byte. [`opcodes::FE_PREFIX`] starts a two-byte instruction whose second
//! byte indexes [`INSTRUCTIONS_FE`]; any other byte indexes [`INSTRUCTIONS`]. Each instruction
//! advances the logical position by one regardless of its width.
//!
//! In the default [`OperandMode::CallTokensOnly`] mode, only `call` and `callvirt` consume an
//! operand: their 4-byte token is captured verbatim and skipped. Every other operand byte is read
//! as the next opcode, so bodies using other inline operands decode into a different opcode
//! sequence. [`OperandMode::Full`] skips every operand by its encoded size instead.
//!
//! # Examples
//!
//! ```rust
//! use ilmock::disassembler::decode_stream;
//!
//! // ldarg.0, call 0x0A000001, ret
//! let stream = decode_stream(&[0x02, 0x28, 0x01, 0x00, 0x00, 0x0A, 0x2A])?;
//! assert_eq!(stream.len(), 3);
//! assert_eq!(stream.operands[0].position, 1);
//! assert_eq!(stream.operands[0].token.value(), 0x0A00_0001);
//! # Ok::<(), ilmock::Error>(())
//! ```

use log::trace;

use crate::{
    disassembler::{
        instruction::{DecodedInstructionStream, OpcodeDescriptor, OperandMode, OperandReference},
        opcodes::{self, INSTRUCTIONS, INSTRUCTIONS_FE},
        OperandType,
    },
    file::Parser,
    metadata::token::Token,
    Result,
};

/// Decode the opcode at the parser's position and advance past it (operand excluded).
///
/// # Errors
/// Returns [`crate::Error::Malformed`] for reserved or unknown codes and for a prefix byte at
/// the end of the stream.
pub fn decode_opcode(parser: &mut Parser) -> Result<&'static OpcodeDescriptor> {
    let offset = parser.pos();
    let first_byte = parser.read_le::<u8>()?;

    let descriptor = match first_byte {
        opcodes::FE_PREFIX => {
            let Ok(second_byte) = parser.read_le::<u8>() else {
                return Err(malformed_error!(
                    "Truncated two-byte opcode at offset {}",
                    offset
                ));
            };

            match INSTRUCTIONS_FE.get(second_byte as usize) {
                Some(instr) => instr,
                None => return Err(malformed_error!("Invalid opcode: FE {:02X}", second_byte)),
            }
        }
        _ => match INSTRUCTIONS.get(first_byte as usize) {
            Some(instr) => instr,
            None => return Err(malformed_error!("Invalid opcode: {:02X}", first_byte)),
        },
    };

    if descriptor.is_reserved() {
        return Err(malformed_error!(
            "Reserved opcode at offset {}: {:02X}",
            offset,
            first_byte
        ));
    }

    Ok(descriptor)
}

/// Decode a method body in the default call-token-only mode.
///
/// # Errors
/// Returns [`crate::Error::Malformed`] on an unknown opcode or a truncated call operand.
pub fn decode_stream(data: &[u8]) -> Result<DecodedInstructionStream> {
    decode_stream_with_mode(data, OperandMode::CallTokensOnly)
}

/// Decode a method body with an explicit [`OperandMode`].
///
/// # Errors
/// Returns [`crate::Error::Malformed`] on an unknown opcode or a truncated operand.
pub fn decode_stream_with_mode(data: &[u8], mode: OperandMode) -> Result<DecodedInstructionStream> {
    let mut parser = Parser::new(data);
    let mut stream = DecodedInstructionStream::default();

    while parser.has_more_data() {
        let offset = parser.pos();
        let position = stream.instructions.len();
        let descriptor = decode_opcode(&mut parser)?;

        if descriptor.is_call() {
            let token = read_call_token(&mut parser, descriptor, offset)?;
            trace!(
                "{} at position {} (offset {}) -> {}",
                descriptor.mnemonic,
                position,
                offset,
                token
            );

            stream.operands.push(OperandReference {
                position,
                offset,
                opcode: descriptor,
                token,
            });
        } else if mode == OperandMode::Full {
            skip_operand(&mut parser, descriptor, offset)?;
        }

        stream.instructions.push(descriptor);
    }

    Ok(stream)
}

fn read_call_token(
    parser: &mut Parser,
    descriptor: &OpcodeDescriptor,
    offset: usize,
) -> Result<Token> {
    let Ok(bytes) = parser.read_bytes(4) else {
        return Err(malformed_error!(
            "Truncated {} operand at offset {} - {} byte(s) left",
            descriptor.mnemonic,
            offset,
            parser.remaining()
        ));
    };

    Ok(Token::from_operand([bytes[0], bytes[1], bytes[2], bytes[3]]))
}

fn skip_operand(parser: &mut Parser, descriptor: &OpcodeDescriptor, offset: usize) -> Result<()> {
    let skipped = match descriptor.op_type {
        OperandType::Switch => parser.read_le::<u32>().and_then(|count| {
            let targets = (count as usize).checked_mul(4).ok_or(crate::Error::OutOfBounds)?;
            parser.advance_by(targets)
        }),
        other => parser.advance_by(other.size().unwrap_or(0)),
    };

    if skipped.is_err() {
        return Err(malformed_error!(
            "Truncated {} operand at offset {}",
            descriptor.mnemonic,
            offset
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    #[test]
    fn decode_opcode_single_byte() {
        let mut parser = Parser::new(&[0x11, 0x10]);
        let result = decode_opcode(&mut parser).unwrap();

        assert_eq!(result.mnemonic, "ldloc.s");
        assert_eq!(result.op_type, OperandType::UInt8);
        assert_eq!(parser.pos(), 1);
    }

    #[test]
    fn decode_opcode_two_byte() {
        let mut parser = Parser::new(&[0xFE, 0x01]);
        let result = decode_opcode(&mut parser).unwrap();

        assert_eq!(result.mnemonic, "ceq");
        assert_eq!(result.prefix, 0xFE);
        assert_eq!(parser.pos(), 2);

        let mut parser = Parser::new(&[0xFE, 0x04]);
        assert_eq!(decode_opcode(&mut parser).unwrap().mnemonic, "clt");
    }

    #[test]
    fn decode_opcode_invalid() {
        for data in [&[0x24][..], &[0xE1], &[0xFF], &[0xFE, 0x08], &[0xFE, 0x1F], &[0xFE]] {
            let mut parser = Parser::new(data);
            assert!(
                matches!(decode_opcode(&mut parser), Err(Error::Malformed { .. })),
                "{data:02X?}"
            );
        }
    }

    #[test]
    fn single_byte_body_has_no_operands() {
        // ldarg.0, ldarg.1, add, ret
        let data = [0x02, 0x03, 0x58, 0x2A];
        let stream = decode_stream(&data).unwrap();

        assert_eq!(stream.len(), data.len());
        assert!(stream.operands.is_empty());
        assert_eq!(
            stream.mnemonics().collect::<Vec<_>>(),
            ["ldarg.0", "ldarg.1", "add", "ret"]
        );
    }

    #[test]
    fn call_operand_captured_verbatim() {
        // nop, callvirt 0x0A000007, pop, call 0x0A000002, ret
        let data = [
            0x00, 0x6F, 0x07, 0x00, 0x00, 0x0A, 0x26, 0x28, 0x02, 0x00, 0x00, 0x0A, 0x2A,
        ];
        let stream = decode_stream(&data).unwrap();

        assert_eq!(stream.len(), 5);
        assert_eq!(stream.operands.len(), 2);

        let first = &stream.operands[0];
        assert_eq!(first.position, 1);
        assert_eq!(first.offset, 1);
        assert_eq!(first.opcode.mnemonic, "callvirt");
        assert_eq!(first.token, Token::new(0x0A00_0007));

        let second = &stream.operands[1];
        assert_eq!(second.position, 3);
        assert_eq!(second.offset, 7);
        assert_eq!(second.opcode.mnemonic, "call");
        assert_eq!(second.token, Token::new(0x0A00_0002));
    }

    #[test]
    fn prefixed_instruction_counts_once() {
        // ldarg.0, ldarg.1, ceq, ret
        let stream = decode_stream(&[0x02, 0x03, 0xFE, 0x01, 0x2A]).unwrap();
        assert_eq!(stream.len(), 4);
        assert_eq!(stream.instructions[2].mnemonic, "ceq");
    }

    #[test]
    fn non_call_operands_are_not_skipped() {
        // ldarg.s 2 decodes as ldarg.s followed by ldarg.0
        let stream = decode_stream(&[0x0E, 0x02, 0x2A]).unwrap();
        assert_eq!(
            stream.mnemonics().collect::<Vec<_>>(),
            ["ldarg.s", "ldarg.0", "ret"]
        );

        let stream = decode_stream_with_mode(&[0x0E, 0x02, 0x2A], OperandMode::Full).unwrap();
        assert_eq!(stream.mnemonics().collect::<Vec<_>>(), ["ldarg.s", "ret"]);
    }

    #[test]
    fn full_mode_skips_switch_table() {
        // ldarg.0, switch (2) [0, 1], call 0x0A000001, ret
        let data = [
            0x02, 0x45, 0x02, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00,
            0x28, 0x01, 0x00, 0x00, 0x0A, 0x2A,
        ];
        let stream = decode_stream_with_mode(&data, OperandMode::Full).unwrap();

        assert_eq!(
            stream.mnemonics().collect::<Vec<_>>(),
            ["ldarg.0", "switch", "call", "ret"]
        );
        assert_eq!(stream.operands[0].position, 2);
        assert_eq!(stream.operands[0].offset, 14);
    }

    #[test]
    fn truncated_operands() {
        assert!(matches!(
            decode_stream(&[0x28, 0x01, 0x00]),
            Err(Error::Malformed { .. })
        ));
        assert!(matches!(
            decode_stream_with_mode(&[0x20, 0x01], OperandMode::Full),
            Err(Error::Malformed { .. })
        ));
        assert!(matches!(
            decode_stream_with_mode(&[0x45, 0xFF, 0xFF, 0xFF, 0xFF], OperandMode::Full),
            Err(Error::Malformed { .. })
        ));
    }

    #[test]
    fn unknown_opcode_is_fatal() {
        assert!(matches!(
            decode_stream(&[0x00, 0x24, 0x2A]),
            Err(Error::Malformed { .. })
        ));
    }

    #[test]
    fn decoding_is_idempotent() {
        let data = [0x02, 0x28, 0x05, 0x00, 0x00, 0x0A, 0xFE, 0x04, 0x2A];
        assert_eq!(decode_stream(&data).unwrap(), decode_stream(&data).unwrap());
    }

    #[test]
    fn empty_body() {
        let stream = decode_stream(&[]).unwrap();
        assert!(stream.is_empty());
    }
}
