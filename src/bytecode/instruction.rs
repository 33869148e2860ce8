use std::fmt;

use crate::bytecode::{opcodes::Opcode, shape::OperandShape};

/// One decoded operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operand {
    /// Variable slot index
    Var(u16),
    /// 16-bit immediate
    Word(u16),
    /// 32-bit immediate
    Dword(u32),
    /// 64-bit immediate
    Qword(u64),
}

impl Operand {
    /// The raw operand value, zero-extended.
    #[must_use]
    pub fn raw(self) -> u64 {
        match self {
            Operand::Var(value) | Operand::Word(value) => u64::from(value),
            Operand::Dword(value) => u64::from(value),
            Operand::Qword(value) => value,
        }
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Var(slot) => write!(f, "v{slot}"),
            Operand::Word(value) => write!(f, "{value}"),
            Operand::Dword(value) => write!(f, "{}", *value as i32),
            Operand::Qword(value) => write!(f, "0x{value:x}"),
        }
    }
}

/// A decoded view over one instruction window of a code word stream.
///
/// Instructions borrow their display name from the opcode table they were decoded with and are
/// meant to be rendered and dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instruction<'a> {
    /// Word position of the instruction inside its function
    pub position: usize,
    /// Raw opcode value
    pub opcode: u8,
    /// Display name from the opcode table
    pub mnemonic: &'a str,
    /// Declared operand shape
    pub shape: OperandShape,
    /// Declared size in code words
    pub size: usize,
    /// Operands in encoding order
    pub operands: Vec<Operand>,
}

impl Instruction<'_> {
    /// The recognized opcode, if the raw value is one.
    #[must_use]
    pub fn known_opcode(&self) -> Option<Opcode> {
        Opcode::from_repr(self.opcode)
    }

    /// Word position of the next instruction.
    #[must_use]
    pub fn next_position(&self) -> usize {
        self.position + self.size
    }

    /// The word position a relative jump lands on, before the start of the stream if negative.
    ///
    /// Offsets count from the jump instruction itself. Returns `None` for non-jumps.
    #[must_use]
    pub fn jump_target(&self) -> Option<i64> {
        if !self.known_opcode().is_some_and(Opcode::is_jump) {
            return None;
        }

        match self.operands.as_slice() {
            [Operand::Dword(offset)] => i64::try_from(self.position)
                .ok()?
                .checked_add(i64::from(*offset as i32)),
            _ => None,
        }
    }

    /// The absolute word position a relative jump lands on.
    ///
    /// Returns `None` for non-jumps and for targets before the start of the stream.
    #[must_use]
    pub fn branch_target(&self) -> Option<usize> {
        self.jump_target()
            .and_then(|target| usize::try_from(target).ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn jump(position: usize, offset: i32) -> Instruction<'static> {
        Instruction {
            position,
            opcode: Opcode::JMP.value(),
            mnemonic: "JMP",
            shape: OperandShape::Dword,
            size: 2,
            operands: vec![Operand::Dword(offset as u32)],
        }
    }

    #[test]
    fn branch_targets() {
        assert_eq!(jump(10, -3).branch_target(), Some(7));
        assert_eq!(jump(10, 4).branch_target(), Some(14));
        assert_eq!(jump(2, -3).branch_target(), None);
        assert_eq!(jump(2, -3).jump_target(), Some(-1));
        assert_eq!(jump(10, -3).next_position(), 12);
    }

    #[test]
    fn non_jump_has_no_target() {
        let call = Instruction {
            opcode: Opcode::CALL.value(),
            mnemonic: "CALL",
            ..jump(0, 5)
        };
        assert_eq!(call.branch_target(), None);
        assert_eq!(call.jump_target(), None);
    }

    #[test]
    fn operand_display() {
        assert_eq!(Operand::Var(3).to_string(), "v3");
        assert_eq!(Operand::Word(3).to_string(), "3");
        assert_eq!(Operand::Dword(0xFFFF_FFFF).to_string(), "-1");
        assert_eq!(Operand::Qword(0x10).to_string(), "0x10");
        assert_eq!(Operand::Dword(7).raw(), 7);
    }
}
