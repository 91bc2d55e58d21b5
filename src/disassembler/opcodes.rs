//! The Opcode Table: raw opcode byte constants and the two static lookup tables.
//!
//! Single-byte opcodes are named after their mnemonic ([`CALL`] = `0x28`). Two-byte opcodes share
//! the [`FE_PREFIX`] lead byte and their second byte carries an `FE_` prefix ([`FE_CEQ`] = `0x01`
//! for `ceq`, encoded `FE 01`).
//!
//! [`INSTRUCTIONS`] and [`INSTRUCTIONS_FE`] are indexed directly by byte value. Both tables, and
//! the constants, are generated from the single listing below so they can never disagree.

use crate::disassembler::instruction::{OpcodeDescriptor, OperandType};

/// Lead byte of every two-byte opcode.
pub const FE_PREFIX: u8 = 0xFE;

macro_rules! opcode_tables {
    (
        single: [$( $code:literal $name:ident $mnemonic:literal $op:ident, )*]
        extended: [$( $fe_code:literal $fe_name:ident $fe_mnemonic:literal $fe_op:ident, )*]
    ) => {
        $(
            #[doc = concat!("`", $mnemonic, "`")]
            pub const $name: u8 = $code;
        )*

        $(
            #[doc = concat!("`", $fe_mnemonic, "` (second byte after [`FE_PREFIX`])")]
            pub const $fe_name: u8 = $fe_code;
        )*

        /// Single-byte opcodes, indexed by byte value. Reserved codes have an empty mnemonic.
        pub static INSTRUCTIONS: [OpcodeDescriptor; 0xE1] = {
            let mut table = [OpcodeDescriptor::RESERVED; 0xE1];
            $(
                table[$code as usize] =
                    OpcodeDescriptor::new(0, $code, $mnemonic, OperandType::$op);
            )*
            table
        };

        /// Second bytes of `0xFE`-prefixed opcodes, indexed by byte value. Reserved codes have an
        /// empty mnemonic.
        pub static INSTRUCTIONS_FE: [OpcodeDescriptor; 0x1F] = {
            let mut table = [OpcodeDescriptor::RESERVED; 0x1F];
            $(
                table[$fe_code as usize] =
                    OpcodeDescriptor::new(FE_PREFIX, $fe_code, $fe_mnemonic, OperandType::$fe_op);
            )*
            table
        };
    };
}

opcode_tables! {
    single: [
        0x00 NOP "nop" None,
        0x01 BREAK "break" None,
        0x02 LDARG_0 "ldarg.0" None,
        0x03 LDARG_1 "ldarg.1" None,
        0x04 LDARG_2 "ldarg.2" None,
        0x05 LDARG_3 "ldarg.3" None,
        0x06 LDLOC_0 "ldloc.0" None,
        0x07 LDLOC_1 "ldloc.1" None,
        0x08 LDLOC_2 "ldloc.2" None,
        0x09 LDLOC_3 "ldloc.3" None,
        0x0A STLOC_0 "stloc.0" None,
        0x0B STLOC_1 "stloc.1" None,
        0x0C STLOC_2 "stloc.2" None,
        0x0D STLOC_3 "stloc.3" None,
        0x0E LDARG_S "ldarg.s" UInt8,
        0x0F LDARGA_S "ldarga.s" UInt8,
        0x10 STARG_S "starg.s" UInt8,
        0x11 LDLOC_S "ldloc.s" UInt8,
        0x12 LDLOCA_S "ldloca.s" UInt8,
        0x13 STLOC_S "stloc.s" UInt8,
        0x14 LDNULL "ldnull" None,
        0x15 LDC_I4_M1 "ldc.i4.m1" None,
        0x16 LDC_I4_0 "ldc.i4.0" None,
        0x17 LDC_I4_1 "ldc.i4.1" None,
        0x18 LDC_I4_2 "ldc.i4.2" None,
        0x19 LDC_I4_3 "ldc.i4.3" None,
        0x1A LDC_I4_4 "ldc.i4.4" None,
        0x1B LDC_I4_5 "ldc.i4.5" None,
        0x1C LDC_I4_6 "ldc.i4.6" None,
        0x1D LDC_I4_7 "ldc.i4.7" None,
        0x1E LDC_I4_8 "ldc.i4.8" None,
        0x1F LDC_I4_S "ldc.i4.s" Int8,
        0x20 LDC_I4 "ldc.i4" Int32,
        0x21 LDC_I8 "ldc.i8" Int64,
        0x22 LDC_R4 "ldc.r4" Float32,
        0x23 LDC_R8 "ldc.r8" Float64,
        0x25 DUP "dup" None,
        0x26 POP "pop" None,
        0x27 JMP "jmp" Token,
        0x28 CALL "call" Token,
        0x29 CALLI "calli" Token,
        0x2A RET "ret" None,
        0x2B BR_S "br.s" Int8,
        0x2C BRFALSE_S "brfalse.s" Int8,
        0x2D BRTRUE_S "brtrue.s" Int8,
        0x2E BEQ_S "beq.s" Int8,
        0x2F BGE_S "bge.s" Int8,
        0x30 BGT_S "bgt.s" Int8,
        0x31 BLE_S "ble.s" Int8,
        0x32 BLT_S "blt.s" Int8,
        0x33 BNE_UN_S "bne.un.s" Int8,
        0x34 BGE_UN_S "bge.un.s" Int8,
        0x35 BGT_UN_S "bgt.un.s" Int8,
        0x36 BLE_UN_S "ble.un.s" Int8,
        0x37 BLT_UN_S "blt.un.s" Int8,
        0x38 BR "br" Int32,
        0x39 BRFALSE "brfalse" Int32,
        0x3A BRTRUE "brtrue" Int32,
        0x3B BEQ "beq" Int32,
        0x3C BGE "bge" Int32,
        0x3D BGT "bgt" Int32,
        0x3E BLE "ble" Int32,
        0x3F BLT "blt" Int32,
        0x40 BNE_UN "bne.un" Int32,
        0x41 BGE_UN "bge.un" Int32,
        0x42 BGT_UN "bgt.un" Int32,
        0x43 BLE_UN "ble.un" Int32,
        0x44 BLT_UN "blt.un" Int32,
        0x45 SWITCH "switch" Switch,
        0x46 LDIND_I1 "ldind.i1" None,
        0x47 LDIND_U1 "ldind.u1" None,
        0x48 LDIND_I2 "ldind.i2" None,
        0x49 LDIND_U2 "ldind.u2" None,
        0x4A LDIND_I4 "ldind.i4" None,
        0x4B LDIND_U4 "ldind.u4" None,
        0x4C LDIND_I8 "ldind.i8" None,
        0x4D LDIND_I "ldind.i" None,
        0x4E LDIND_R4 "ldind.r4" None,
        0x4F LDIND_R8 "ldind.r8" None,
        0x50 LDIND_REF "ldind.ref" None,
        0x51 STIND_REF "stind.ref" None,
        0x52 STIND_I1 "stind.i1" None,
        0x53 STIND_I2 "stind.i2" None,
        0x54 STIND_I4 "stind.i4" None,
        0x55 STIND_I8 "stind.i8" None,
        0x56 STIND_R4 "stind.r4" None,
        0x57 STIND_R8 "stind.r8" None,
        0x58 ADD "add" None,
        0x59 SUB "sub" None,
        0x5A MUL "mul" None,
        0x5B DIV "div" None,
        0x5C DIV_UN "div.un" None,
        0x5D REM "rem" None,
        0x5E REM_UN "rem.un" None,
        0x5F AND "and" None,
        0x60 OR "or" None,
        0x61 XOR "xor" None,
        0x62 SHL "shl" None,
        0x63 SHR "shr" None,
        0x64 SHR_UN "shr.un" None,
        0x65 NEG "neg" None,
        0x66 NOT "not" None,
        0x67 CONV_I1 "conv.i1" None,
        0x68 CONV_I2 "conv.i2" None,
        0x69 CONV_I4 "conv.i4" None,
        0x6A CONV_I8 "conv.i8" None,
        0x6B CONV_R4 "conv.r4" None,
        0x6C CONV_R8 "conv.r8" None,
        0x6D CONV_U4 "conv.u4" None,
        0x6E CONV_U8 "conv.u8" None,
        0x6F CALLVIRT "callvirt" Token,
        0x70 CPOBJ "cpobj" Token,
        0x71 LDOBJ "ldobj" Token,
        0x72 LDSTR "ldstr" Token,
        0x73 NEWOBJ "newobj" Token,
        0x74 CASTCLASS "castclass" Token,
        0x75 ISINST "isinst" Token,
        0x76 CONV_R_UN "conv.r.un" None,
        0x79 UNBOX "unbox" Token,
        0x7A THROW "throw" None,
        0x7B LDFLD "ldfld" Token,
        0x7C LDFLDA "ldflda" Token,
        0x7D STFLD "stfld" Token,
        0x7E LDSFLD "ldsfld" Token,
        0x7F LDSFLDA "ldsflda" Token,
        0x80 STSFLD "stsfld" Token,
        0x81 STOBJ "stobj" Token,
        0x82 CONV_OVF_I1_UN "conv.ovf.i1.un" None,
        0x83 CONV_OVF_I2_UN "conv.ovf.i2.un" None,
        0x84 CONV_OVF_I4_UN "conv.ovf.i4.un" None,
        0x85 CONV_OVF_I8_UN "conv.ovf.i8.un" None,
        0x86 CONV_OVF_U1_UN "conv.ovf.u1.un" None,
        0x87 CONV_OVF_U2_UN "conv.ovf.u2.un" None,
        0x88 CONV_OVF_U4_UN "conv.ovf.u4.un" None,
        0x89 CONV_OVF_U8_UN "conv.ovf.u8.un" None,
        0x8A CONV_OVF_I_UN "conv.ovf.i.un" None,
        0x8B CONV_OVF_U_UN "conv.ovf.u.un" None,
        0x8C BOX "box" Token,
        0x8D NEWARR "newarr" Token,
        0x8E LDLEN "ldlen" None,
        0x8F LDELEMA "ldelema" Token,
        0x90 LDELEM_I1 "ldelem.i1" None,
        0x91 LDELEM_U1 "ldelem.u1" None,
        0x92 LDELEM_I2 "ldelem.i2" None,
        0x93 LDELEM_U2 "ldelem.u2" None,
        0x94 LDELEM_I4 "ldelem.i4" None,
        0x95 LDELEM_U4 "ldelem.u4" None,
        0x96 LDELEM_I8 "ldelem.i8" None,
        0x97 LDELEM_I "ldelem.i" None,
        0x98 LDELEM_R4 "ldelem.r4" None,
        0x99 LDELEM_R8 "ldelem.r8" None,
        0x9A LDELEM_REF "ldelem.ref" None,
        0x9B STELEM_I "stelem.i" None,
        0x9C STELEM_I1 "stelem.i1" None,
        0x9D STELEM_I2 "stelem.i2" None,
        0x9E STELEM_I4 "stelem.i4" None,
        0x9F STELEM_I8 "stelem.i8" None,
        0xA0 STELEM_R4 "stelem.r4" None,
        0xA1 STELEM_R8 "stelem.r8" None,
        0xA2 STELEM_REF "stelem.ref" None,
        0xA3 LDELEM "ldelem" Token,
        0xA4 STELEM "stelem" Token,
        0xA5 UNBOX_ANY "unbox.any" Token,
        0xB3 CONV_OVF_I1 "conv.ovf.i1" None,
        0xB4 CONV_OVF_U1 "conv.ovf.u1" None,
        0xB5 CONV_OVF_I2 "conv.ovf.i2" None,
        0xB6 CONV_OVF_U2 "conv.ovf.u2" None,
        0xB7 CONV_OVF_I4 "conv.ovf.i4" None,
        0xB8 CONV_OVF_U4 "conv.ovf.u4" None,
        0xB9 CONV_OVF_I8 "conv.ovf.i8" None,
        0xBA CONV_OVF_U8 "conv.ovf.u8" None,
        0xC2 REFANYVAL "refanyval" Token,
        0xC3 CKFINITE "ckfinite" None,
        0xC6 MKREFANY "mkrefany" Token,
        0xD0 LDTOKEN "ldtoken" Token,
        0xD1 CONV_U2 "conv.u2" None,
        0xD2 CONV_U1 "conv.u1" None,
        0xD3 CONV_I "conv.i" None,
        0xD4 CONV_OVF_I "conv.ovf.i" None,
        0xD5 CONV_OVF_U "conv.ovf.u" None,
        0xD6 ADD_OVF "add.ovf" None,
        0xD7 ADD_OVF_UN "add.ovf.un" None,
        0xD8 MUL_OVF "mul.ovf" None,
        0xD9 MUL_OVF_UN "mul.ovf.un" None,
        0xDA SUB_OVF "sub.ovf" None,
        0xDB SUB_OVF_UN "sub.ovf.un" None,
        0xDC ENDFINALLY "endfinally" None,
        0xDD LEAVE "leave" Int32,
        0xDE LEAVE_S "leave.s" Int8,
        0xDF STIND_I "stind.i" None,
        0xE0 CONV_U "conv.u" None,
    ]
    extended: [
        0x00 FE_ARGLIST "arglist" None,
        0x01 FE_CEQ "ceq" None,
        0x02 FE_CGT "cgt" None,
        0x03 FE_CGT_UN "cgt.un" None,
        0x04 FE_CLT "clt" None,
        0x05 FE_CLT_UN "clt.un" None,
        0x06 FE_LDFTN "ldftn" Token,
        0x07 FE_LDVIRTFTN "ldvirtftn" Token,
        0x09 FE_LDARG "ldarg" UInt16,
        0x0A FE_LDARGA "ldarga" UInt16,
        0x0B FE_STARG "starg" UInt16,
        0x0C FE_LDLOC "ldloc" UInt16,
        0x0D FE_LDLOCA "ldloca" UInt16,
        0x0E FE_STLOC "stloc" UInt16,
        0x0F FE_LOCALLOC "localloc" None,
        0x11 FE_ENDFILTER "endfilter" None,
        0x12 FE_UNALIGNED "unaligned." UInt8,
        0x13 FE_VOLATILE "volatile." None,
        0x14 FE_TAIL "tail." None,
        0x15 FE_INITOBJ "initobj" Token,
        0x16 FE_CONSTRAINED "constrained." Token,
        0x17 FE_CPBLK "cpblk" None,
        0x18 FE_INITBLK "initblk" None,
        0x19 FE_NO "no." UInt8,
        0x1A FE_RETHROW "rethrow" None,
        0x1C FE_SIZEOF "sizeof" Token,
        0x1D FE_REFANYTYPE "refanytype" None,
        0x1E FE_READONLY "readonly." None,
    ]
}
