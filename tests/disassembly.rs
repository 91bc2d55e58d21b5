//! End-to-end tests for call-site disassembly.
//!
//! Every test builds a small in-memory module: a `TableSet` with the member references a method
//! body calls, plus a registry with the loaded types those references should resolve to.

use ilmock::{disassembler::INSTRUCTIONS, metadata::tables::TableId, prelude::*};
use std::sync::Arc;

/// `instance int32 (int32, int32)`
const SIG_INT_INT_INT: [u8; 5] = [0x20, 0x02, 0x08, 0x08, 0x08];
/// `instance int32 (int32, int32, int32)`
const SIG_INT_INT_INT_INT: [u8; 6] = [0x20, 0x03, 0x08, 0x08, 0x08, 0x08];

fn call(opcode: u8, token: Token) -> Vec<u8> {
    let mut bytes = vec![opcode];
    bytes.extend_from_slice(&token.value().to_le_bytes());
    bytes
}

fn method(
    declaring: &CilTypeRc,
    rid: u32,
    name: &str,
    return_type: &CilTypeRc,
    params: &[CilTypeRc],
) -> MethodRc {
    let method = Arc::new(CilMethod::new(
        Token::from_parts(TableId::MethodDef, rid),
        name,
        0x0006,
        return_type,
        params,
    ));
    method.set_declaring_type(declaring);
    declaring.add_method(method.clone());
    method
}

/// A `Calculator` class with two `Add` overloads and a `Clear` method
struct Calculator {
    types: Arc<TypeRegistry>,
    class: CilTypeRc,
    add2: MethodRc,
    add3: MethodRc,
}

impl Calculator {
    fn new() -> Self {
        let types = Arc::new(TypeRegistry::new());
        let int32 = types.get_primitive(CilPrimitiveKind::I4).unwrap();
        let object = types.get_primitive(CilPrimitiveKind::Object).unwrap();

        let class = types.create_type(
            "Arithmetic",
            "Calculator",
            CilFlavor::Class,
            TypeAttributes::PUBLIC,
        );
        class.set_base(&object);

        let add2 = method(&class, 1, "Add", &int32, &[int32.clone(), int32.clone()]);
        let add3 = method(
            &class,
            2,
            "Add",
            &int32,
            &[int32.clone(), int32.clone(), int32.clone()],
        );

        Calculator {
            types,
            class,
            add2,
            add3,
        }
    }

    fn module(&self, tables: TableSet) -> Module {
        Module::with_registries("Arithmetic.dll", Arc::new(tables), self.types.clone(), None)
    }
}

#[test]
fn single_byte_bodies_have_no_operands() {
    let body: Vec<u8> = INSTRUCTIONS
        .iter()
        .filter(|descriptor| !descriptor.is_reserved() && !descriptor.is_call())
        .filter(|descriptor| descriptor.opcode != 0xFE)
        .map(|descriptor| descriptor.opcode)
        .collect();

    let stream = decode_stream(&body).unwrap();
    assert_eq!(stream.instructions.len(), body.len());
    assert!(stream.operands.is_empty());
    for (descriptor, byte) in stream.instructions.iter().zip(&body) {
        assert_eq!(descriptor.opcode, *byte);
    }
}

#[test]
fn call_operand_is_captured_verbatim() {
    // nop; ldarg.0; call 0x0A00002A; ret
    let body = [0x00, 0x02, 0x28, 0x2A, 0x00, 0x00, 0x0A, 0x2A];

    let stream = decode_stream(&body).unwrap();
    assert_eq!(
        stream.mnemonics().collect::<Vec<_>>(),
        ["nop", "ldarg.0", "call", "ret"]
    );
    assert_eq!(stream.operands.len(), 1);

    let operand = &stream.operands[0];
    assert_eq!(operand.position, 2);
    assert_eq!(operand.offset, 2);
    assert_eq!(operand.opcode.mnemonic, "call");
    assert_eq!(operand.token.value().to_le_bytes(), [0x2A, 0x00, 0x00, 0x0A]);
    assert_eq!(operand.token.table_id(), Some(TableId::MemberRef));
    assert_eq!(operand.token.row(), 0x2A);
}

#[test]
fn decoding_is_idempotent() {
    let body = [0x02, 0x6F, 0x01, 0x00, 0x00, 0x0A, 0xFE, 0x01, 0x2A];
    assert_eq!(decode_stream(&body).unwrap(), decode_stream(&body).unwrap());
}

#[test]
fn unknown_opcode_is_fatal() {
    assert!(matches!(
        decode_stream(&[0x00, 0xA6, 0x2A]),
        Err(Error::Malformed { .. })
    ));
}

#[test]
fn non_member_ref_tables_never_match() {
    let calculator = Calculator::new();
    let module = calculator.module(TableSet::new());
    let mut resolver = MemberResolver::new(&module);

    for table in [
        TableId::Module,
        TableId::TypeRef,
        TableId::TypeDef,
        TableId::Field,
        TableId::MethodDef,
        TableId::TypeSpec,
        TableId::MethodSpec,
    ] {
        let token = Token::from_parts(table, 1);
        assert!(resolver.resolve_token(token).unwrap().is_none(), "{table:?}");
    }

    // Unknown table selector
    assert!(resolver
        .resolve_token(Token::new(0x7F00_0001))
        .unwrap()
        .is_none());
}

#[test]
fn unresolvable_declaring_type_is_no_match() {
    let calculator = Calculator::new();
    let mut tables = TableSet::new();
    let missing = tables.add_type_ref("Elsewhere", "NotLoaded");
    let member = tables.add_member_ref(
        CodedIndex::new(TableId::TypeRef, missing.row()),
        "Add",
        &SIG_INT_INT_INT,
    );

    let module = calculator.module(tables);
    let mut resolver = MemberResolver::new(&module);
    assert!(resolver.resolve_token(member).unwrap().is_none());
}

#[test]
fn overloads_resolve_by_parameter_count() {
    let calculator = Calculator::new();
    let mut tables = TableSet::new();
    let parent = tables.add_type_ref("Arithmetic", "Calculator");
    let class = CodedIndex::new(TableId::TypeRef, parent.row());
    let add2 = tables.add_member_ref(class, "Add", &SIG_INT_INT_INT);
    let add3 = tables.add_member_ref(class, "Add", &SIG_INT_INT_INT_INT);

    let module = calculator.module(tables);
    let mut resolver = MemberResolver::new(&module);

    let resolved = resolver.resolve_token(add2).unwrap().unwrap();
    assert!(Arc::ptr_eq(&resolved, &calculator.add2));

    let resolved = resolver.resolve_token(add3).unwrap().unwrap();
    assert!(Arc::ptr_eq(&resolved, &calculator.add3));

    assert_eq!(resolver.cached_types(), 1);
}

#[test]
fn method_body_maps_resolved_call_sites() {
    let calculator = Calculator::new();
    let mut tables = TableSet::new();
    let parent = tables.add_type_ref("Arithmetic", "Calculator");
    let class = CodedIndex::new(TableId::TypeRef, parent.row());
    let add2 = tables.add_member_ref(class, "Add", &SIG_INT_INT_INT);
    let add3 = tables.add_member_ref(class, "Add", &SIG_INT_INT_INT_INT);

    let missing_parent = tables.add_type_ref("Elsewhere", "NotLoaded");
    let missing = tables.add_member_ref(
        CodedIndex::new(TableId::TypeRef, missing_parent.row()),
        "Run",
        &[0x00, 0x00, 0x01],
    );

    let module = calculator.module(tables);

    // ldarg.0; ldc.i4.1; ldc.i4.2; callvirt Add(2); pop;
    // ldarg.0; ldc.i4.1; ldc.i4.2; ldc.i4.3; callvirt Add(3); pop;
    // call Run; ret
    let mut body = vec![0x02, 0x17, 0x18];
    body.extend(call(0x6F, add2));
    body.extend([0x26, 0x02, 0x17, 0x18, 0x19]);
    body.extend(call(0x6F, add3));
    body.push(0x26);
    body.extend(call(0x28, missing));
    body.push(0x2A);

    let caller = Arc::new(
        CilMethod::new(
            Token::from_parts(TableId::MethodDef, 10),
            "Compute",
            0x0006,
            &calculator.types.get_primitive(CilPrimitiveKind::Void).unwrap(),
            &[],
        )
        .with_body(&body),
    );
    caller.set_declaring_type(&calculator.class);

    let descriptor = disassemble_method(&module, &caller).unwrap();
    assert_eq!(descriptor.opcodes().len(), 13);
    assert_eq!(descriptor.call_sites(), [3, 9, 11]);
    assert_eq!(descriptor.call_site_count(), 3);
    assert_eq!(descriptor.resolved_count(), 2);

    assert!(Arc::ptr_eq(descriptor.resolved_at(3).unwrap(), &calculator.add2));
    assert!(Arc::ptr_eq(descriptor.resolved_at(9).unwrap(), &calculator.add3));
    assert!(descriptor.resolved_at(11).is_none());
    assert_eq!(descriptor.unresolved_positions().collect::<Vec<_>>(), [11]);

    let positions: Vec<_> = descriptor.iter().map(|(position, _)| position).collect();
    assert_eq!(positions, [3, 9]);
}

#[test]
fn full_operand_mode_skips_every_operand() {
    let calculator = Calculator::new();
    let mut tables = TableSet::new();
    let parent = tables.add_type_ref("Arithmetic", "Calculator");
    let add2 = tables.add_member_ref(
        CodedIndex::new(TableId::TypeRef, parent.row()),
        "Add",
        &SIG_INT_INT_INT,
    );
    let module = calculator.module(tables);

    // ldarg.0; ldc.i4.s 0x28; ldc.i4 0x0A000001; callvirt Add(2); ret
    let mut body = vec![0x02, 0x1F, 0x28, 0x20, 0x01, 0x00, 0x00, 0x0A];
    body.extend(call(0x6F, add2));
    body.push(0x2A);

    let caller = CilMethod::new(
        Token::from_parts(TableId::MethodDef, 11),
        "Literal",
        0x0006,
        &calculator.types.get_primitive(CilPrimitiveKind::Void).unwrap(),
        &[],
    )
    .with_body(&body);

    let descriptor = MethodBodyDisassembler::new(&module)
        .with_config(DisassemblyConfig::full_operands())
        .disassemble(&caller)
        .unwrap();

    assert_eq!(descriptor.opcodes().len(), 5);
    assert_eq!(descriptor.call_sites(), [3]);
    assert!(Arc::ptr_eq(descriptor.resolved_at(3).unwrap(), &calculator.add2));
}

#[test]
fn abstract_method_has_no_body() {
    let calculator = Calculator::new();
    let module = calculator.module(TableSet::new());

    // public abstract virtual
    let method = CilMethod::new(
        Token::from_parts(TableId::MethodDef, 12),
        "Evaluate",
        0x0006 | 0x0040 | 0x0400,
        &calculator.types.get_primitive(CilPrimitiveKind::Void).unwrap(),
        &[],
    );

    assert!(matches!(
        disassemble_method(&module, &method),
        Err(Error::NoMethodBody(_))
    ));
}
