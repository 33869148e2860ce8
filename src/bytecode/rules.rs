//! Opcode specific operand reinterpretation.
//!
//! The operand shape alone decides how many operands an instruction has and how wide they are.
//! Some opcodes additionally give an operand a meaning beyond its width: a 16-bit string index, a
//! 32-bit float immediate, a handle to a registered type, a relative jump. [`RULES`] lists every
//! such opcode explicitly; opcodes not listed render with their shape's generic format.

use std::sync::OnceLock;

use crate::bytecode::{opcodes::Opcode, shape::OperandShape};

/// How an instruction's operands are reinterpreted before rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reinterpretation {
    /// The 16-bit immediate indexes the constant string table.
    StringConstant,
    /// The 32-bit immediate is an IEEE-754 single.
    FloatImmediate,
    /// The 32-bit immediate is shown as raw bits, signed integer and single.
    IntFloatImmediate,
    /// The pointer-sized immediate is a registered type handle.
    TypeHandle,
    /// The pointer-sized immediate is a function handle.
    FunctionHandle,
    /// The 32-bit immediate is a type id.
    TypeId,
    /// The 32-bit immediate is a function id.
    FunctionId,
    /// The pointer-sized immediate is an opaque reference shown in hex.
    Reference,
    /// The 32-bit immediate is a signed offset relative to the instruction.
    Jump,
    /// A type handle followed by the id of the constructing function.
    Allocation,
    /// Only the low byte of the 32-bit immediate is meaningful.
    ByteImmediate,
    /// Only the low half-word of the 32-bit immediate is meaningful.
    HalfImmediate,
    /// The info payload is a label number.
    Label,
    /// A source line marker.
    LineMarker,
    /// The info payload opens (non-zero) or closes (zero) a block.
    BlockMarker,
}

impl Reinterpretation {
    /// The operand shapes this rule knows how to reinterpret.
    ///
    /// Pointer-sized operands are dwords on 32-bit engines and qwords on 64-bit engines, so the
    /// handle rules accept both.
    #[must_use]
    pub fn accepted_shapes(self) -> &'static [OperandShape] {
        use OperandShape::*;

        match self {
            Reinterpretation::StringConstant => &[Word],
            Reinterpretation::FloatImmediate => &[
                WriteVarReadVarDword,
                ReadVarWordDword,
                ReadVarDword,
                WriteVarDword,
                WordDword,
            ],
            Reinterpretation::IntFloatImmediate => &[Dword, ReadVarDword, WriteVarDword, WordDword],
            Reinterpretation::TypeHandle => &[
                Dword,
                Qword,
                ReadVarDword,
                WriteVarDword,
                WriteVarQword,
                ReadVarQword,
            ],
            Reinterpretation::FunctionHandle | Reinterpretation::Reference => &[Dword, Qword],
            Reinterpretation::TypeId | Reinterpretation::FunctionId | Reinterpretation::Jump => {
                &[Dword]
            }
            Reinterpretation::Allocation => &[DwordDword, QwordDword],
            Reinterpretation::ByteImmediate | Reinterpretation::HalfImmediate => {
                &[ReadVarDword, WriteVarDword, WordDword]
            }
            Reinterpretation::Label | Reinterpretation::LineMarker | Reinterpretation::BlockMarker => {
                &[Info]
            }
        }
    }

    /// Returns true if this rule applies to `shape`.
    #[must_use]
    pub fn accepts(self, shape: OperandShape) -> bool {
        self.accepted_shapes().contains(&shape)
    }
}

/// Every opcode with a reinterpretation rule.
pub static RULES: &[(Opcode, Reinterpretation)] = &[
    (Opcode::STR, Reinterpretation::StringConstant),
    (Opcode::ADDIf, Reinterpretation::FloatImmediate),
    (Opcode::SUBIf, Reinterpretation::FloatImmediate),
    (Opcode::MULIf, Reinterpretation::FloatImmediate),
    (Opcode::CMPIf, Reinterpretation::FloatImmediate),
    (Opcode::PshC4, Reinterpretation::IntFloatImmediate),
    (Opcode::Cast, Reinterpretation::IntFloatImmediate),
    (Opcode::SetV4, Reinterpretation::IntFloatImmediate),
    (Opcode::OBJTYPE, Reinterpretation::TypeHandle),
    (Opcode::RefCpyV, Reinterpretation::TypeHandle),
    (Opcode::FREE, Reinterpretation::TypeHandle),
    (Opcode::FuncPtr, Reinterpretation::FunctionHandle),
    (Opcode::TYPEID, Reinterpretation::TypeId),
    (Opcode::CALL, Reinterpretation::FunctionId),
    (Opcode::CALLSYS, Reinterpretation::FunctionId),
    (Opcode::CALLBND, Reinterpretation::FunctionId),
    (Opcode::CALLINTF, Reinterpretation::FunctionId),
    (Opcode::Thiscall1, Reinterpretation::FunctionId),
    (Opcode::REFCPY, Reinterpretation::Reference),
    (Opcode::JMP, Reinterpretation::Jump),
    (Opcode::JZ, Reinterpretation::Jump),
    (Opcode::JNZ, Reinterpretation::Jump),
    (Opcode::JS, Reinterpretation::Jump),
    (Opcode::JNS, Reinterpretation::Jump),
    (Opcode::JP, Reinterpretation::Jump),
    (Opcode::JNP, Reinterpretation::Jump),
    (Opcode::JLowZ, Reinterpretation::Jump),
    (Opcode::JLowNZ, Reinterpretation::Jump),
    (Opcode::ALLOC, Reinterpretation::Allocation),
    (Opcode::SetV1, Reinterpretation::ByteImmediate),
    (Opcode::SetV2, Reinterpretation::HalfImmediate),
    (Opcode::LABEL, Reinterpretation::Label),
    (Opcode::LINE, Reinterpretation::LineMarker),
    (Opcode::Block, Reinterpretation::BlockMarker),
];

/// Look up the rule for a raw opcode value.
#[must_use]
pub fn reinterpretation(opcode: u8) -> Option<Reinterpretation> {
    static LOOKUP: OnceLock<[Option<Reinterpretation>; 256]> = OnceLock::new();

    LOOKUP.get_or_init(|| {
        let mut lookup = [None; 256];
        for &(opcode, rule) in RULES {
            lookup[usize::from(opcode.value())] = Some(rule);
        }
        lookup
    })[usize::from(opcode)]
}
