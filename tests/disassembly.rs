//! Integration tests for the full pipeline: resolve a module tree, then dump the root module.

use asfscope::{
    engine::{EnumInfo, EnumValue, TypedefInfo},
    prelude::*,
};

fn op(opcode: Opcode) -> u32 {
    u32::from(opcode.value())
}

fn word0(opcode: Opcode, operand: u16) -> u32 {
    op(opcode) | (u32::from(operand) << 16)
}

fn main_function() -> FunctionInfo {
    FunctionInfo::new(
        "void game::main()",
        vec![
            op(Opcode::SUSPEND),
            word0(Opcode::STR, 0),
            op(Opcode::JZ),
            2,
            op(Opcode::CALL),
            7,
            word0(Opcode::RET, 0),
        ],
    )
}

fn engine() -> MemoryEngine {
    let main = ModuleInfo {
        enums: vec![EnumInfo {
            name: "Team".to_string(),
            namespace: "game".to_string(),
            type_name: None,
            values: vec![EnumValue {
                name: "Red".to_string(),
                value: 1,
            }],
        }],
        typedefs: vec![TypedefInfo {
            name: "f32".to_string(),
            type_id: 10,
        }],
        functions: vec![main_function()],
        ..Default::default()
    };

    MemoryEngine::new(PointerWidth::Bits32)
        .with_image("main.asf", main)
        .with_image("lib.asf", ModuleInfo::default())
        .with_constant_string(0, b"hello".to_vec())
        .with_function_declaration(7, "void lib::init()")
}

#[test]
fn test_resolve_and_render() -> Result<()> {
    let source = MemorySource::new()
        .with("main.asf", ContainerBuilder::new().dependency("lib.asf").build()?)
        .with("lib.asf", ContainerBuilder::new().build()?);
    let mut tracker = ModuleTracker::builder().source(source).build(engine());

    let main = tracker.resolve("main.asf")?;
    let handle = tracker.module(main).and_then(Module::handle).unwrap();

    let report = Disassembler::new(tracker.engine())?.render(handle)?;
    assert_eq!(
        report.to_string(),
        "enums: 1\n\
         \tTeam\n\
         \t\tRed = 1,\n\
         typedefs: 1\n\
         \tf32 10\n\
         object_types: 0\n\
         global_variables: 0\n\
         imported_functions: 0\n\
         functions: 1\n\
         \tvoid game::main()\n\
         \t\t0000: SUSPEND\n\
         \t\t0001: STR 0 (5:\"hello\")\n\
         \t\t0002: JZ +2 (d:4)\n\
         \t\t0004: CALL 7 (void lib::init())\n\
         \t\t0006: RET 0\n"
    );
    Ok(())
}

#[test]
fn test_report_written_to_writer() -> Result<()> {
    let mut engine = engine();
    let handle = engine.load_precompiled("lib.asf", &[])?;

    let report = Disassembler::new(&engine)?.render(handle)?;
    let mut out = Vec::new();
    report.write_to(&mut out)?;
    assert_eq!(out, report.to_string().into_bytes());
    assert_eq!(report.len(), 6);
    Ok(())
}

#[test]
fn test_shift_jis_constants() -> Result<()> {
    let info = ModuleInfo {
        functions: vec![FunctionInfo::new("void f()", vec![word0(Opcode::STR, 1)])],
        ..Default::default()
    };
    let mut engine = MemoryEngine::new(PointerWidth::Bits64)
        .with_image("m.asf", info)
        .with_constant_string(1, vec![0x83, 0x65, 0x83, 0x58, 0x83, 0x67]);
    let handle = engine.load_precompiled("m.asf", &[])?;

    let report = Disassembler::new(&engine)?
        .with_options(DecodeOptions {
            string_encoding: StringEncoding::ShiftJis,
        })
        .render(handle)?;
    assert_eq!(
        report.lines().last().map(String::as_str),
        Some("\t\t0000: STR 1 (6:\"テスト\")")
    );
    Ok(())
}

#[test]
fn test_damaged_function_abandons_dump() -> Result<()> {
    let info = ModuleInfo {
        functions: vec![
            FunctionInfo::new("void ok()", vec![word0(Opcode::RET, 0)]),
            FunctionInfo::new("void truncated()", vec![op(Opcode::PshC4)]),
        ],
        ..Default::default()
    };
    let mut engine = MemoryEngine::new(PointerWidth::Bits32).with_image("m.asf", info);
    let handle = engine.load_precompiled("m.asf", &[])?;

    assert!(matches!(
        Disassembler::new(&engine)?.render(handle),
        Err(Error::Malformed { .. })
    ));
    Ok(())
}
