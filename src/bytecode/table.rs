//! Opcode metadata table.
//!
//! The script engine describes its instruction set with one entry per opcode value: the display
//! name, the raw operand-shape tag and the encoded size in 32-bit code words. The table is
//! supplied by the engine; [`OpcodeTable::standard`] builds the table of a stock engine for either
//! pointer width.
//!
//! Shape tags are kept raw so that a table from a newer engine can still be loaded. A tag the
//! decoder does not know only becomes an error when an instruction using it is decoded.

use strum::IntoEnumIterator;

use crate::{
    bytecode::{opcodes::Opcode, rules::reinterpretation, shape::OperandShape},
    Error, Result,
};

/// Pointer width of the engine that produced the bytecode.
///
/// Instructions that carry a raw pointer use 32-bit operands on 32-bit engines and 64-bit
/// operands on 64-bit engines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerWidth {
    /// 4-byte pointers
    Bits32,
    /// 8-byte pointers
    Bits64,
}

/// The metadata of one opcode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpcodeInfo {
    /// Display name
    pub name: String,
    /// Raw operand-shape tag, see [`OperandShape`]
    pub shape: u8,
    /// Encoded size in code words; the decoder advances by exactly this much
    pub size: usize,
}

impl OpcodeInfo {
    /// Create an entry from its parts.
    pub fn new(name: impl Into<String>, shape: u8, size: usize) -> Self {
        OpcodeInfo {
            name: name.into(),
            shape,
            size,
        }
    }

    /// The decoded shape, or `None` for an unknown tag.
    #[must_use]
    pub fn operand_shape(&self) -> Option<OperandShape> {
        OperandShape::from_repr(self.shape)
    }
}

/// Opcode value to [`OpcodeInfo`] mapping for all 256 opcode values.
#[derive(Debug, Clone)]
pub struct OpcodeTable {
    entries: Vec<Option<OpcodeInfo>>,
}

impl Default for OpcodeTable {
    fn default() -> Self {
        OpcodeTable {
            entries: vec![None; 256],
        }
    }
}

impl OpcodeTable {
    /// Create an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The table of a stock engine.
    ///
    /// Sizes equal each shape's natural size, except for the info instructions, which the engine
    /// declares with size zero because they never survive into finished bytecode.
    #[must_use]
    pub fn standard(width: PointerWidth) -> Self {
        let mut table = Self::new();
        for opcode in Opcode::iter() {
            let shape = standard_shape(opcode, width);
            let size = match shape {
                OperandShape::Info => 0,
                other => other.natural_size(),
            };
            table.insert(opcode.value(), OpcodeInfo::new(opcode.mnemonic(), shape as u8, size));
        }
        table
    }

    /// Set the entry for `opcode`, returning the previous one.
    pub fn insert(&mut self, opcode: u8, info: OpcodeInfo) -> Option<OpcodeInfo> {
        self.entries[usize::from(opcode)].replace(info)
    }

    /// Builder form of [`OpcodeTable::insert`].
    #[must_use]
    pub fn with(mut self, opcode: u8, info: OpcodeInfo) -> Self {
        self.insert(opcode, info);
        self
    }

    /// The entry for `opcode`.
    #[must_use]
    pub fn get(&self, opcode: u8) -> Option<&OpcodeInfo> {
        self.entries[usize::from(opcode)].as_ref()
    }

    /// Number of populated entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.iter().flatten().count()
    }

    /// Returns true if no entry is populated.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterate over populated entries in opcode order.
    pub fn iter(&self) -> impl Iterator<Item = (u8, &OpcodeInfo)> {
        (0..=u8::MAX).zip(self.entries.iter()).filter_map(|(opcode, entry)| {
            entry.as_ref().map(|info| (opcode, info))
        })
    }

    /// Check the table against the recognized opcode set.
    ///
    /// Every [`Opcode`] must have an entry, and every opcode with a reinterpretation rule must
    /// declare a shape that rule can handle. Unknown shape tags are not checked here.
    ///
    /// # Errors
    /// Returns [`crate::Error::OpcodeTable`] listing every problem found.
    pub fn validate(&self) -> Result<()> {
        let mut problems = Vec::new();

        let missing: Vec<&str> = Opcode::iter()
            .filter(|opcode| self.get(opcode.value()).is_none())
            .map(Opcode::mnemonic)
            .collect();
        if !missing.is_empty() {
            problems.push(format!("missing opcodes: {}", missing.join(", ")));
        }

        for (opcode, info) in self.iter() {
            let (Some(rule), Some(shape)) = (reinterpretation(opcode), info.operand_shape()) else {
                continue;
            };
            if !rule.accepts(shape) {
                problems.push(format!(
                    "{} declares {} which {:?} cannot reinterpret",
                    info.name,
                    shape.name(),
                    rule
                ));
            }
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(Error::OpcodeTable(problems.join("; ")))
        }
    }
}

fn standard_shape(opcode: Opcode, width: PointerWidth) -> OperandShape {
    use Opcode::*;
    use OperandShape as S;

    let (ptr, write_ptr, read_ptr, ptr_dword) = match width {
        PointerWidth::Bits32 => (S::Dword, S::WriteVarDword, S::ReadVarDword, S::DwordDword),
        PointerWidth::Bits64 => (S::Qword, S::WriteVarQword, S::ReadVarQword, S::QwordDword),
    };

    match opcode {
        PopPtr | SwapPtr | TZ | TNZ | TS | TNS | TP | TNP | INCi16 | INCi8 | DECi16 | DECi8
        | INCi | DECi | INCf | DECf | INCd | DECd | RDSPtr | PopRPtr | PshRPtr | SUSPEND
        | CHKREF | PshNull | ChkRefS | INCi64 | DECi64 | ClrHi => S::NoArg,

        PshGPtr | PshG4 | REFCPY | LDG | PGA | OBJTYPE | JitEntry | FuncPtr => ptr,
        LdGRdR4 | FREE | CpyGtoV4 | RefCpyV => write_ptr,
        CpyVtoG4 => read_ptr,
        ALLOC | SetG4 => ptr_dword,

        PshC4 | CALL | JMP | JZ | JNZ | JS | JNS | JP | JNP | CALLSYS | CALLBND | TYPEID
        | CALLINTF | Cast | JLowZ | JLowNZ | Thiscall1 | TryBlock => S::Dword,

        RET | STR | GETOBJ | GETOBJREF | GETREF | ChkNullS | VarDecl => S::Word,

        PshV4 | PSF | NOT | NEGi | NEGf | NEGd | IncVi | DecVi | BNOT | PshVPtr | JMPP
        | LOADOBJ | CpyVtoR4 | CpyVtoR8 | WRTV1 | WRTV2 | WRTV4 | WRTV8 | LDV | VAR | iTOf
        | fTOi | uTOf | fTOu | sbTOi | swTOi | ubTOi | uwTOi | ChkNullV | iTOb | iTOw
        | dTOi64 | dTOu64 | i64TOd | u64TOd | NEGi64 | BNOT64 | CallPtr | PshV8 => S::ReadVar,

        STOREOBJ | ClrVPtr | CpyRtoV4 | CpyRtoV8 | RDR1 | RDR2 | RDR4 | RDR8 => S::WriteVar,

        BAND | BOR | BXOR | BSLL | BSRL | BSRA | ADDi | SUBi | MULi | DIVi | MODi | ADDf
        | SUBf | MULf | DIVf | MODf | ADDd | SUBd | MULd | DIVd | MODd | ADDi64 | SUBi64
        | MULi64 | DIVi64 | MODi64 | BAND64 | BOR64 | BXOR64 | BSLL64 | BSRL64 | BSRA64
        | DIVu | MODu | DIVu64 | MODu64 | POWi | POWu | POWf | POWd | POWdi | POWi64
        | POWu64 => S::WriteVarReadVarReadVar,

        CpyVtoV4 | CpyVtoV8 | dTOi | dTOu | dTOf | iTOd | uTOd | fTOd | i64TOi | uTOi64
        | iTOi64 | fTOi64 | fTOu64 | i64TOf | u64TOf => S::WriteVarReadVar,

        CMPd | CMPu | CMPf | CMPi | CmpPtr | CMPi64 | CMPu64 => S::ReadVarReadVar,

        CMPIi | CMPIf | CMPIu | PshListElmnt | ObjInfo => S::ReadVarDword,
        SetV4 | SetV1 | SetV2 | AllocMem => S::WriteVarDword,
        COPY | ADDSi | LoadThisR => S::WordDword,
        ADDIi | SUBIi | MULIi | ADDIf | SUBIf | MULIf => S::WriteVarReadVarDword,
        LoadRObjR | LoadVObjR => S::ReadVarWordDword,
        SetListSize | SetListType => S::ReadVarDwordDword,
        SetV8 => S::WriteVarQword,
        PshC8 => S::Qword,

        Block | LINE | LABEL => S::Info,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_tables_validate() {
        OpcodeTable::standard(PointerWidth::Bits32).validate().unwrap();
        OpcodeTable::standard(PointerWidth::Bits64).validate().unwrap();
    }

    #[test]
    fn pointer_width_changes_shapes() {
        let narrow = OpcodeTable::standard(PointerWidth::Bits32);
        let wide = OpcodeTable::standard(PointerWidth::Bits64);

        let objtype = Opcode::OBJTYPE.value();
        assert_eq!(narrow.get(objtype).unwrap().operand_shape(), Some(OperandShape::Dword));
        assert_eq!(narrow.get(objtype).unwrap().size, 2);
        assert_eq!(wide.get(objtype).unwrap().operand_shape(), Some(OperandShape::Qword));
        assert_eq!(wide.get(objtype).unwrap().size, 3);

        let alloc = Opcode::ALLOC.value();
        assert_eq!(narrow.get(alloc).unwrap().size, 3);
        assert_eq!(wide.get(alloc).unwrap().size, 4);
    }

    #[test]
    fn standard_entries() {
        let table = OpcodeTable::standard(PointerWidth::Bits32);
        assert_eq!(table.len(), Opcode::iter().count());

        let add = table.get(Opcode::ADDi.value()).unwrap();
        assert_eq!(add.name, "ADDi");
        assert_eq!(add.size, 2);

        assert_eq!(table.get(Opcode::LABEL.value()).unwrap().size, 0);
        assert!(table.get(220).is_none());
    }

    #[test]
    fn missing_opcode_reported() {
        let mut table = OpcodeTable::standard(PointerWidth::Bits64);
        table.entries[usize::from(Opcode::RET.value())] = None;

        match table.validate() {
            Err(Error::OpcodeTable(message)) => assert!(message.contains("RET")),
            other => panic!("Expected OpcodeTable error, got {other:?}"),
        }
    }

    #[test]
    fn incompatible_rule_reported() {
        let table = OpcodeTable::standard(PointerWidth::Bits64).with(
            Opcode::JMP.value(),
            OpcodeInfo::new("JMP", OperandShape::Qword as u8, 3),
        );

        match table.validate() {
            Err(Error::OpcodeTable(message)) => assert!(message.contains("JMP declares QW_ARG")),
            other => panic!("Expected OpcodeTable error, got {other:?}"),
        }
    }

    #[test]
    fn every_problem_listed() {
        let mut table = OpcodeTable::standard(PointerWidth::Bits64).with(
            Opcode::JMP.value(),
            OpcodeInfo::new("JMP", OperandShape::Qword as u8, 3),
        );
        table.entries[usize::from(Opcode::RET.value())] = None;

        match table.validate() {
            Err(Error::OpcodeTable(message)) => {
                assert!(message.starts_with("missing opcodes: RET; "));
                assert!(message.ends_with("JMP declares QW_ARG which Jump cannot reinterpret"));
            }
            other => panic!("Expected OpcodeTable error, got {other:?}"),
        }
    }

    #[test]
    fn unknown_shape_not_rejected() {
        let table = OpcodeTable::standard(PointerWidth::Bits32)
            .with(Opcode::NOT.value(), OpcodeInfo::new("NOT", 99, 1));
        assert!(table.validate().is_ok());
    }
}
