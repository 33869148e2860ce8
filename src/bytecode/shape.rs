use strum::{EnumCount, EnumIter, FromRepr, IntoStaticStr};

/// Width class of one decoded operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperandKind {
    /// 16-bit variable slot, rendered as `vN`
    Var,
    /// 16-bit immediate
    Word,
    /// 32-bit immediate
    Dword,
    /// 64-bit immediate
    Qword,
}

impl OperandKind {
    /// Encoded width in bytes.
    #[must_use]
    pub fn width(self) -> usize {
        match self {
            OperandKind::Var | OperandKind::Word => 2,
            OperandKind::Dword => 4,
            OperandKind::Qword => 8,
        }
    }
}

/// The operand layout an opcode declares.
///
/// The discriminants are the engine's shape tags. `w`/`r` in the display names mark a variable
/// slot that the instruction writes or reads, `W` a 16-bit immediate, `DW`/`QW` 32- and 64-bit
/// immediates.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, FromRepr, IntoStaticStr, EnumIter, EnumCount,
)]
#[repr(u8)]
pub enum OperandShape {
    /// Compiler bookkeeping with one 16-bit payload (labels, line markers, blocks)
    #[strum(serialize = "INFO")]
    Info = 0,
    #[strum(serialize = "NO_ARG")]
    /// No operands
    NoArg = 1,
    /// `W`
    #[strum(serialize = "W_ARG")]
    Word = 2,
    /// `wW`
    #[strum(serialize = "wW_ARG")]
    WriteVar = 3,
    /// `DW`
    #[strum(serialize = "DW_ARG")]
    Dword = 4,
    /// `rW DW`
    #[strum(serialize = "rW_DW_ARG")]
    ReadVarDword = 5,
    /// `QW`
    #[strum(serialize = "QW_ARG")]
    Qword = 6,
    /// `DW DW`
    #[strum(serialize = "DW_DW_ARG")]
    DwordDword = 7,
    /// `wW rW rW`
    #[strum(serialize = "wW_rW_rW_ARG")]
    WriteVarReadVarReadVar = 8,
    /// `wW QW`
    #[strum(serialize = "wW_QW_ARG")]
    WriteVarQword = 9,
    /// `wW rW`
    #[strum(serialize = "wW_rW_ARG")]
    WriteVarReadVar = 10,
    /// `rW`
    #[strum(serialize = "rW_ARG")]
    ReadVar = 11,
    /// `wW DW`
    #[strum(serialize = "wW_DW_ARG")]
    WriteVarDword = 12,
    /// `wW rW DW`
    #[strum(serialize = "wW_rW_DW_ARG")]
    WriteVarReadVarDword = 13,
    /// `rW rW`
    #[strum(serialize = "rW_rW_ARG")]
    ReadVarReadVar = 14,
    /// `wW W`
    #[strum(serialize = "wW_W_ARG")]
    WriteVarWord = 15,
    /// `QW DW`
    #[strum(serialize = "QW_DW_ARG")]
    QwordDword = 16,
    /// `rW QW`
    #[strum(serialize = "rW_QW_ARG")]
    ReadVarQword = 17,
    /// `W DW`
    #[strum(serialize = "W_DW_ARG")]
    WordDword = 18,
    /// `rW W DW`
    #[strum(serialize = "rW_W_DW_ARG")]
    ReadVarWordDword = 19,
    /// `rW DW DW`
    #[strum(serialize = "rW_DW_DW_ARG")]
    ReadVarDwordDword = 20,
}

impl OperandShape {
    /// The operands this shape carries, in encoding order.
    #[must_use]
    pub fn operands(self) -> &'static [OperandKind] {
        use OperandKind::{Dword, Qword, Var, Word};

        match self {
            OperandShape::NoArg => &[],
            OperandShape::Info | OperandShape::Word => &[Word],
            OperandShape::WriteVar | OperandShape::ReadVar => &[Var],
            OperandShape::Dword => &[Dword],
            OperandShape::Qword => &[Qword],
            OperandShape::ReadVarDword | OperandShape::WriteVarDword => &[Var, Dword],
            OperandShape::WordDword => &[Word, Dword],
            OperandShape::DwordDword => &[Dword, Dword],
            OperandShape::QwordDword => &[Qword, Dword],
            OperandShape::WriteVarReadVarReadVar => &[Var, Var, Var],
            OperandShape::WriteVarQword | OperandShape::ReadVarQword => &[Var, Qword],
            OperandShape::WriteVarReadVar | OperandShape::ReadVarReadVar => &[Var, Var],
            OperandShape::WriteVarReadVarDword => &[Var, Var, Dword],
            OperandShape::WriteVarWord => &[Var, Word],
            OperandShape::ReadVarWordDword => &[Var, Word, Dword],
            OperandShape::ReadVarDwordDword => &[Var, Dword, Dword],
        }
    }

    /// Number of 32-bit code words needed to hold the opcode and its operands.
    ///
    /// The first 16-bit operand shares word 0 with the opcode byte, further 16-bit operands pack
    /// into the following half-words, and 32/64-bit operands start on the next word boundary.
    #[must_use]
    pub fn natural_size(self) -> usize {
        let mut end: usize = 1;
        for kind in self.operands() {
            let width = kind.width();
            let align = width.min(4);
            end = end.div_ceil(align) * align + width;
        }
        end.div_ceil(4)
    }

    /// The engine's name for this shape.
    #[must_use]
    pub fn name(self) -> &'static str {
        self.into()
    }
}
