//! Text rendering of decoded instructions.
//!
//! The generic format of every shape is `<mnemonic> <operands>`, with variable slots written as
//! `vN` and immediates in decimal. Opcodes listed in [`crate::bytecode::RULES`] replace the
//! generic operand text with their reinterpretation: a resolved string constant, a float, a type
//! or function name, an absolute jump target.
//!
//! Symbols the resolver cannot answer are rendered as `{unknown}` and logged. They never fail the
//! render.

use std::borrow::Cow;

use log::warn;

use crate::{
    bytecode::{
        instruction::{Instruction, Operand},
        rules::{reinterpretation, Reinterpretation},
        shape::OperandShape,
    },
    engine::SymbolResolver,
};

const UNKNOWN: &str = "{unknown}";
const NO_FUNCTION: &str = "{no func}";

/// Text encoding of constant strings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StringEncoding {
    /// UTF-8, invalid sequences replaced
    #[default]
    Utf8,
    /// Shift-JIS, as written by Japanese-locale engines
    ShiftJis,
}

impl StringEncoding {
    /// Decode raw constant string bytes.
    #[must_use]
    pub fn decode(self, bytes: &[u8]) -> Cow<'_, str> {
        match self {
            StringEncoding::Utf8 => String::from_utf8_lossy(bytes),
            StringEncoding::ShiftJis => encoding_rs::SHIFT_JIS.decode(bytes).0,
        }
    }
}

/// Rendering options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecodeOptions {
    /// Encoding used to decode constant string bytes
    pub string_encoding: StringEncoding,
}

/// Render one decoded instruction without its position prefix.
///
/// # Examples
///
/// ```rust
/// use asfscope::bytecode::{render_instruction, DecodeOptions, Instruction, Operand, Opcode, OperandShape};
/// use asfscope::engine::MemoryEngine;
///
/// let jump = Instruction {
///     position: 10,
///     opcode: Opcode::JMP.value(),
///     mnemonic: "JMP",
///     shape: OperandShape::Dword,
///     size: 2,
///     operands: vec![Operand::Dword((-3i32) as u32)],
/// };
///
/// let engine = MemoryEngine::default();
/// assert_eq!(render_instruction(&jump, &engine, &DecodeOptions::default()), "JMP -3 (d:7)");
/// ```
#[must_use]
pub fn render_instruction(
    instruction: &Instruction<'_>,
    resolver: &dyn SymbolResolver,
    options: &DecodeOptions,
) -> String {
    use Operand::{Dword, Qword, Var, Word};

    let m = instruction.mnemonic;
    let rule = reinterpretation(instruction.opcode).filter(|rule| rule.accepts(instruction.shape));
    let lookup = Lookup {
        instruction,
        resolver,
    };

    match instruction.operands.as_slice() {
        [] => m.to_string(),
        [Word(payload)] if instruction.shape == OperandShape::Info => match rule {
            Some(Reinterpretation::Label) => format!("{payload}:"),
            Some(Reinterpretation::LineMarker) => m.to_string(),
            Some(Reinterpretation::BlockMarker) => {
                (if *payload != 0 { "{" } else { "}" }).to_string()
            }
            _ => format!("{m} {payload}"),
        },
        [Word(index)] => match rule {
            Some(Reinterpretation::StringConstant) => {
                match resolver.constant_string(*index) {
                    Some(bytes) => {
                        let text = options.string_encoding.decode(&bytes);
                        format!("{m} {index} ({}:\"{}\")", bytes.len(), text.escape_debug())
                    }
                    None => {
                        lookup.missing("constant string");
                        format!("{m} {index} ({UNKNOWN})")
                    }
                }
            }
            _ => format!("{m} {index}"),
        },
        [Var(a)] => format!("{m} v{a}"),
        [Var(a), Var(b)] => format!("{m} v{a}, v{b}"),
        [Var(a), Word(b)] => format!("{m} v{a}, {b}"),
        [Var(a), Var(b), Var(c)] => format!("{m} v{a}, v{b}, v{c}"),
        [Var(a), Var(b), Dword(value)] => match rule {
            Some(Reinterpretation::FloatImmediate) => {
                format!("{m} v{a}, v{b}, {}", c_fixed(f32::from_bits(*value).into()))
            }
            _ => format!("{m} v{a}, v{b}, {}", *value as i32),
        },
        [Var(a), Word(b), Dword(value)] => match rule {
            Some(Reinterpretation::FloatImmediate) => {
                format!("{m} v{a}, {b}, {}", c_fixed(f32::from_bits(*value).into()))
            }
            _ => format!("{m} v{a}, {b}, {}", *value as i32),
        },
        [Var(a), Dword(value)] => format!("{m} v{a}, {}", lookup.var_dword(rule, *value)),
        [Word(a), Dword(value)] => format!("{m} {a}, {}", lookup.var_dword(rule, *value)),
        [Var(a), Dword(x), Dword(y)] => format!("{m} v{a}, {x}, {y}"),
        [Dword(value)] => format!("{m} {}", lookup.dword(rule, *value)),
        [Qword(value)] => format!("{m} {}", lookup.qword(rule, *value)),
        [Var(a), Qword(value)] => match rule {
            Some(Reinterpretation::TypeHandle) => {
                format!("{m} v{a}, 0x{value:x} (type:{})", lookup.type_name(*value))
            }
            _ => format!("{m} v{a}, {}", int_double(*value)),
        },
        [Dword(handle), Dword(function)] => match rule {
            Some(Reinterpretation::Allocation) => {
                format!("{m} {}", lookup.allocation(u64::from(*handle), *function))
            }
            _ => format!("{m} {handle}, {}", *function as i32),
        },
        [Qword(handle), Dword(function)] => match rule {
            Some(Reinterpretation::Allocation) => {
                format!("{m} {}", lookup.allocation(*handle, *function))
            }
            _ => format!("{m} {handle}, {}", *function as i32),
        },
        operands => {
            let text: Vec<String> = operands.iter().map(ToString::to_string).collect();
            format!("{m} {}", text.join(", "))
        }
    }
}

struct Lookup<'i, 'r> {
    instruction: &'i Instruction<'i>,
    resolver: &'r dyn SymbolResolver,
}

impl<'r> Lookup<'_, 'r> {
    fn missing(&self, what: &str) {
        warn!(
            "{} at {:04x}: unresolved {}",
            self.instruction.mnemonic, self.instruction.position, what
        );
    }

    fn or_unknown(&self, symbol: Option<Cow<'r, str>>, what: &str) -> Cow<'r, str> {
        symbol.unwrap_or_else(|| {
            self.missing(what);
            Cow::Borrowed(UNKNOWN)
        })
    }

    fn type_name(&self, handle: u64) -> Cow<'r, str> {
        self.or_unknown(self.resolver.type_name(handle), "type handle")
    }

    fn dword(&self, rule: Option<Reinterpretation>, value: u32) -> String {
        match rule {
            Some(Reinterpretation::TypeHandle) => {
                format!("0x{value:x} (type:{})", self.type_name(u64::from(value)))
            }
            Some(Reinterpretation::FunctionHandle) => format!(
                "0x{value:x} (func:{})",
                self.or_unknown(
                    self.resolver.function_pointer_declaration(u64::from(value)),
                    "function handle"
                )
            ),
            Some(Reinterpretation::IntFloatImmediate) => int_float(value),
            Some(Reinterpretation::TypeId) => format!(
                "0x{value:x} (decl:{})",
                self.or_unknown(self.resolver.type_declaration(value as i32), "type id")
            ),
            Some(Reinterpretation::FunctionId) => {
                let id = value as i32;
                format!(
                    "{id} ({})",
                    self.or_unknown(self.resolver.function_declaration(id), "function id")
                )
            }
            Some(Reinterpretation::Reference) => format!("0x{value:x}"),
            Some(Reinterpretation::Jump) => {
                let offset = value as i32;
                match self.instruction.jump_target() {
                    Some(target) if target < 0 => {
                        format!("{offset:+} (d:-{:x})", target.unsigned_abs())
                    }
                    Some(target) => format!("{offset:+} (d:{target:x})"),
                    None => offset.to_string(),
                }
            }
            _ => (value as i32).to_string(),
        }
    }

    fn qword(&self, rule: Option<Reinterpretation>, value: u64) -> String {
        match rule {
            Some(Reinterpretation::TypeHandle) => {
                format!("0x{value:x} (type:{})", self.type_name(value))
            }
            Some(Reinterpretation::FunctionHandle) => format!(
                "0x{value:x} (func:{})",
                self.or_unknown(
                    self.resolver.function_pointer_declaration(value),
                    "function handle"
                )
            ),
            Some(Reinterpretation::Reference) => format!("0x{value:x}"),
            _ => int_double(value),
        }
    }

    fn var_dword(&self, rule: Option<Reinterpretation>, value: u32) -> String {
        match rule {
            Some(Reinterpretation::ByteImmediate) => format!("0x{:x}", value as u8),
            Some(Reinterpretation::HalfImmediate) => format!("0x{:x}", value as u16),
            Some(Reinterpretation::IntFloatImmediate) => int_float(value),
            Some(Reinterpretation::FloatImmediate) => c_fixed(f32::from_bits(value).into()),
            Some(Reinterpretation::TypeHandle) => {
                format!("0x{value:x} (type:{})", self.type_name(u64::from(value)))
            }
            _ => (value as i32).to_string(),
        }
    }

    fn allocation(&self, handle: u64, function: u32) -> String {
        let id = function as i32;
        let declaration = self
            .resolver
            .function_declaration(id)
            .unwrap_or(Cow::Borrowed(NO_FUNCTION));

        format!(
            "0x{handle:x}, {id} (type:{}, {declaration})",
            self.type_name(handle)
        )
    }
}

fn int_float(value: u32) -> String {
    format!(
        "0x{value:x} (i:{}, f:{})",
        value as i32,
        c_general(f32::from_bits(value).into())
    )
}

fn int_double(value: u64) -> String {
    format!(
        "0x{value:x} (i:{}, f:{})",
        value as i64,
        c_general(f64::from_bits(value))
    )
}

fn non_finite(value: f64) -> Option<&'static str> {
    if value.is_nan() {
        Some(if value.is_sign_negative() { "-nan" } else { "nan" })
    } else if value.is_infinite() {
        Some(if value.is_sign_negative() { "-inf" } else { "inf" })
    } else {
        None
    }
}

/// `printf("%f")`: six fractional digits.
fn c_fixed(value: f64) -> String {
    match non_finite(value) {
        Some(text) => text.to_string(),
        None => format!("{value:.6}"),
    }
}

/// `printf("%g")`: six significant digits, scientific notation outside `1e-4..1e6`, trailing
/// zeros removed.
fn c_general(value: f64) -> String {
    if let Some(text) = non_finite(value) {
        return text.to_string();
    }
    if value == 0.0 {
        return if value.is_sign_negative() { "-0" } else { "0" }.to_string();
    }

    let scientific = format!("{value:.5e}");
    let Some((mantissa, exponent)) = scientific.split_once('e') else {
        return scientific;
    };
    let exponent: i32 = exponent.parse().unwrap_or(0);

    if !(-4..6).contains(&exponent) {
        let sign = if exponent < 0 { '-' } else { '+' };
        return format!(
            "{}e{sign}{:02}",
            strip_fraction_zeros(mantissa),
            exponent.unsigned_abs()
        );
    }

    let precision = usize::try_from(5 - exponent).unwrap_or(0);
    strip_fraction_zeros(&format!("{value:.precision$}")).to_string()
}

fn strip_fraction_zeros(text: &str) -> &str {
    if text.contains('.') {
        text.trim_end_matches('0').trim_end_matches('.')
    } else {
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        bytecode::{opcodes::Opcode, PointerWidth},
        engine::MemoryEngine,
    };

    fn instruction(opcode: Opcode, shape: OperandShape, operands: Vec<Operand>) -> Instruction<'static> {
        Instruction {
            position: 0x20,
            opcode: opcode.value(),
            mnemonic: opcode.mnemonic(),
            shape,
            size: shape.natural_size(),
            operands,
        }
    }

    fn render(engine: &MemoryEngine, instruction: &Instruction<'_>) -> String {
        render_instruction(instruction, engine, &DecodeOptions::default())
    }

    fn engine() -> MemoryEngine {
        MemoryEngine::new(PointerWidth::Bits64)
            .with_constant_string(3, b"say \"hi\"\n".to_vec())
            .with_type_name(0x1000, "string")
            .with_type_declaration(42, "array<int>")
            .with_function_declaration(7, "void main()")
            .with_function_pointer(0x2000, "void cb()")
    }

    #[test]
    fn general_float_format() {
        assert_eq!(c_general(1.0), "1");
        assert_eq!(c_general(0.5), "0.5");
        assert_eq!(c_general(1.5e-5), "1.5e-05");
        assert_eq!(c_general(123_456.0), "123456");
        assert_eq!(c_general(1_234_567.0), "1.23457e+06");
        assert_eq!(c_general(-2.25), "-2.25");
        assert_eq!(c_general(0.0001), "0.0001");
        assert_eq!(c_general(f64::NAN), "nan");
        assert_eq!(c_general(f64::NEG_INFINITY), "-inf");
        assert_eq!(c_general(0.0), "0");
    }

    #[test]
    fn fixed_float_format() {
        assert_eq!(c_fixed(1.5), "1.500000");
        assert_eq!(c_fixed(-0.25), "-0.250000");
        assert_eq!(c_fixed(f64::INFINITY), "inf");
    }

    #[test]
    fn generic_shapes() {
        let engine = engine();
        let cases = [
            (instruction(Opcode::PopPtr, OperandShape::NoArg, vec![]), "PopPtr"),
            (instruction(Opcode::PshV4, OperandShape::ReadVar, vec![Operand::Var(2)]), "PshV4 v2"),
            (
                instruction(Opcode::CMPi, OperandShape::ReadVarReadVar, vec![Operand::Var(1), Operand::Var(2)]),
                "CMPi v1, v2",
            ),
            (
                instruction(
                    Opcode::ADDi,
                    OperandShape::WriteVarReadVarReadVar,
                    vec![Operand::Var(1), Operand::Var(2), Operand::Var(3)],
                ),
                "ADDi v1, v2, v3",
            ),
            (
                instruction(
                    Opcode::ADDIi,
                    OperandShape::WriteVarReadVarDword,
                    vec![Operand::Var(1), Operand::Var(2), Operand::Dword(-5i32 as u32)],
                ),
                "ADDIi v1, v2, -5",
            ),
            (
                instruction(
                    Opcode::SetListSize,
                    OperandShape::ReadVarDwordDword,
                    vec![Operand::Var(4), Operand::Dword(8), Operand::Dword(3)],
                ),
                "SetListSize v4, 8, 3",
            ),
            (
                instruction(Opcode::COPY, OperandShape::WordDword, vec![Operand::Word(2), Operand::Dword(9)]),
                "COPY 2, 9",
            ),
            (instruction(Opcode::RET, OperandShape::Word, vec![Operand::Word(4)]), "RET 4"),
        ];

        for (instruction, expected) in cases {
            assert_eq!(render(&engine, &instruction), expected);
        }
    }

    #[test]
    fn string_constants() {
        let engine = engine();
        let str3 = instruction(Opcode::STR, OperandShape::Word, vec![Operand::Word(3)]);
        assert_eq!(render(&engine, &str3), r#"STR 3 (9:"say \"hi\"\n")"#);

        let str9 = instruction(Opcode::STR, OperandShape::Word, vec![Operand::Word(9)]);
        assert_eq!(render(&engine, &str9), "STR 9 ({unknown})");
    }

    #[test]
    fn shift_jis_strings() {
        let engine = MemoryEngine::default().with_constant_string(0, vec![0x82, 0xA0]);
        let str0 = instruction(Opcode::STR, OperandShape::Word, vec![Operand::Word(0)]);
        let options = DecodeOptions {
            string_encoding: StringEncoding::ShiftJis,
        };
        assert_eq!(render_instruction(&str0, &engine, &options), "STR 0 (2:\"あ\")");
    }

    #[test]
    fn float_immediates() {
        let engine = engine();
        let addf = instruction(
            Opcode::ADDIf,
            OperandShape::WriteVarReadVarDword,
            vec![Operand::Var(1), Operand::Var(2), Operand::Dword(1.5f32.to_bits())],
        );
        assert_eq!(render(&engine, &addf), "ADDIf v1, v2, 1.500000");

        let cmpf = instruction(
            Opcode::CMPIf,
            OperandShape::ReadVarDword,
            vec![Operand::Var(3), Operand::Dword(0.25f32.to_bits())],
        );
        assert_eq!(render(&engine, &cmpf), "CMPIf v3, 0.250000");

        let pshc4 = instruction(Opcode::PshC4, OperandShape::Dword, vec![Operand::Dword(0x3F80_0000)]);
        assert_eq!(render(&engine, &pshc4), "PshC4 0x3f800000 (i:1065353216, f:1)");

        let setv4 = instruction(
            Opcode::SetV4,
            OperandShape::WriteVarDword,
            vec![Operand::Var(2), Operand::Dword(0x4000_0000)],
        );
        assert_eq!(render(&engine, &setv4), "SetV4 v2, 0x40000000 (i:1073741824, f:2)");
    }

    #[test]
    fn narrow_immediates() {
        let engine = engine();
        let setv1 = instruction(
            Opcode::SetV1,
            OperandShape::WriteVarDword,
            vec![Operand::Var(2), Operand::Dword(0x1FF)],
        );
        assert_eq!(render(&engine, &setv1), "SetV1 v2, 0xff");

        let setv2 = instruction(
            Opcode::SetV2,
            OperandShape::WriteVarDword,
            vec![Operand::Var(2), Operand::Dword(0x1_ABCD)],
        );
        assert_eq!(render(&engine, &setv2), "SetV2 v2, 0xabcd");
    }

    #[test]
    fn jumps() {
        let engine = engine();
        let mut jmp = instruction(Opcode::JMP, OperandShape::Dword, vec![Operand::Dword(-3i32 as u32)]);
        jmp.position = 10;
        assert_eq!(render(&engine, &jmp), "JMP -3 (d:7)");

        let jz = instruction(Opcode::JZ, OperandShape::Dword, vec![Operand::Dword(6)]);
        assert_eq!(render(&engine, &jz), "JZ +6 (d:26)");

        jmp.position = 2;
        assert_eq!(jmp.branch_target(), None);
        assert_eq!(render(&engine, &jmp), "JMP -3 (d:-1)");
    }

    #[test]
    fn symbols() {
        let engine = engine();

        let call = instruction(Opcode::CALL, OperandShape::Dword, vec![Operand::Dword(7)]);
        assert_eq!(render(&engine, &call), "CALL 7 (void main())");

        let callsys = instruction(Opcode::CALLSYS, OperandShape::Dword, vec![Operand::Dword(8)]);
        assert_eq!(render(&engine, &callsys), "CALLSYS 8 ({unknown})");

        let typeid = instruction(Opcode::TYPEID, OperandShape::Dword, vec![Operand::Dword(42)]);
        assert_eq!(render(&engine, &typeid), "TYPEID 0x2a (decl:array<int>)");

        let objtype = instruction(Opcode::OBJTYPE, OperandShape::Qword, vec![Operand::Qword(0x1000)]);
        assert_eq!(render(&engine, &objtype), "OBJTYPE 0x1000 (type:string)");

        let funcptr = instruction(Opcode::FuncPtr, OperandShape::Qword, vec![Operand::Qword(0x2000)]);
        assert_eq!(render(&engine, &funcptr), "FuncPtr 0x2000 (func:void cb())");

        let free = instruction(
            Opcode::FREE,
            OperandShape::WriteVarQword,
            vec![Operand::Var(5), Operand::Qword(0x1000)],
        );
        assert_eq!(render(&engine, &free), "FREE v5, 0x1000 (type:string)");

        let refcpy = instruction(Opcode::REFCPY, OperandShape::Qword, vec![Operand::Qword(0xBEEF)]);
        assert_eq!(render(&engine, &refcpy), "REFCPY 0xbeef");
    }

    #[test]
    fn allocation() {
        let engine = engine();
        let alloc = instruction(
            Opcode::ALLOC,
            OperandShape::QwordDword,
            vec![Operand::Qword(0x1000), Operand::Dword(7)],
        );
        assert_eq!(render(&engine, &alloc), "ALLOC 0x1000, 7 (type:string, void main())");

        let no_ctor = instruction(
            Opcode::ALLOC,
            OperandShape::DwordDword,
            vec![Operand::Dword(0x1000), Operand::Dword(0)],
        );
        assert_eq!(render(&engine, &no_ctor), "ALLOC 0x1000, 0 (type:string, {no func})");
    }

    #[test]
    fn info_markers() {
        let engine = engine();
        let label = instruction(Opcode::LABEL, OperandShape::Info, vec![Operand::Word(4)]);
        assert_eq!(render(&engine, &label), "4:");

        let line = instruction(Opcode::LINE, OperandShape::Info, vec![Operand::Word(12)]);
        assert_eq!(render(&engine, &line), "LINE");

        let open = instruction(Opcode::Block, OperandShape::Info, vec![Operand::Word(1)]);
        assert_eq!(render(&engine, &open), "{");
        let close = instruction(Opcode::Block, OperandShape::Info, vec![Operand::Word(0)]);
        assert_eq!(render(&engine, &close), "}");
    }

    #[test]
    fn qword_defaults() {
        let engine = engine();
        let pshc8 = instruction(Opcode::PshC8, OperandShape::Qword, vec![Operand::Qword(2.5f64.to_bits())]);
        assert_eq!(
            render(&engine, &pshc8),
            format!("PshC8 0x{:x} (i:{}, f:2.5)", 2.5f64.to_bits(), 2.5f64.to_bits() as i64)
        );
    }
}
