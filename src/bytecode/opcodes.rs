//! The recognized opcode set.
//!
//! Values and display names follow the script engine's instruction enumeration. Opcodes
//! `201..=249` are unassigned; `250..=255` are compiler bookkeeping instructions that use the
//! info shape.

#![allow(missing_docs)]

use strum::{EnumCount, EnumIter, FromRepr, IntoStaticStr};

use crate::bytecode::rules::{reinterpretation, Reinterpretation};

/// A recognized bytecode opcode.
///
/// The variant names are the engine's own mnemonics, which is also what the disassembly prints.
#[allow(non_camel_case_types, clippy::upper_case_acronyms)]
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, FromRepr, IntoStaticStr, EnumIter, EnumCount,
)]
#[repr(u8)]
pub enum Opcode {
    PopPtr = 0,
    PshGPtr = 1,
    PshC4 = 2,
    PshV4 = 3,
    PSF = 4,
    SwapPtr = 5,
    NOT = 6,
    PshG4 = 7,
    LdGRdR4 = 8,
    CALL = 9,
    RET = 10,
    JMP = 11,
    JZ = 12,
    JNZ = 13,
    JS = 14,
    JNS = 15,
    JP = 16,
    JNP = 17,
    TZ = 18,
    TNZ = 19,
    TS = 20,
    TNS = 21,
    TP = 22,
    TNP = 23,
    NEGi = 24,
    NEGf = 25,
    NEGd = 26,
    INCi16 = 27,
    INCi8 = 28,
    DECi16 = 29,
    DECi8 = 30,
    INCi = 31,
    DECi = 32,
    INCf = 33,
    DECf = 34,
    INCd = 35,
    DECd = 36,
    IncVi = 37,
    DecVi = 38,
    BNOT = 39,
    BAND = 40,
    BOR = 41,
    BXOR = 42,
    BSLL = 43,
    BSRL = 44,
    BSRA = 45,
    COPY = 46,
    PshC8 = 47,
    PshVPtr = 48,
    RDSPtr = 49,
    CMPd = 50,
    CMPu = 51,
    CMPf = 52,
    CMPi = 53,
    CMPIi = 54,
    CMPIf = 55,
    CMPIu = 56,
    JMPP = 57,
    PopRPtr = 58,
    PshRPtr = 59,
    STR = 60,
    CALLSYS = 61,
    CALLBND = 62,
    SUSPEND = 63,
    ALLOC = 64,
    FREE = 65,
    LOADOBJ = 66,
    STOREOBJ = 67,
    GETOBJ = 68,
    REFCPY = 69,
    CHKREF = 70,
    GETOBJREF = 71,
    GETREF = 72,
    PshNull = 73,
    ClrVPtr = 74,
    OBJTYPE = 75,
    TYPEID = 76,
    SetV4 = 77,
    SetV8 = 78,
    ADDSi = 79,
    CpyVtoV4 = 80,
    CpyVtoV8 = 81,
    CpyVtoR4 = 82,
    CpyVtoR8 = 83,
    CpyVtoG4 = 84,
    CpyRtoV4 = 85,
    CpyRtoV8 = 86,
    CpyGtoV4 = 87,
    WRTV1 = 88,
    WRTV2 = 89,
    WRTV4 = 90,
    WRTV8 = 91,
    RDR1 = 92,
    RDR2 = 93,
    RDR4 = 94,
    RDR8 = 95,
    LDG = 96,
    LDV = 97,
    PGA = 98,
    CmpPtr = 99,
    VAR = 100,
    iTOf = 101,
    fTOi = 102,
    uTOf = 103,
    fTOu = 104,
    sbTOi = 105,
    swTOi = 106,
    ubTOi = 107,
    uwTOi = 108,
    dTOi = 109,
    dTOu = 110,
    dTOf = 111,
    iTOd = 112,
    uTOd = 113,
    fTOd = 114,
    ADDi = 115,
    SUBi = 116,
    MULi = 117,
    DIVi = 118,
    MODi = 119,
    ADDf = 120,
    SUBf = 121,
    MULf = 122,
    DIVf = 123,
    MODf = 124,
    ADDd = 125,
    SUBd = 126,
    MULd = 127,
    DIVd = 128,
    MODd = 129,
    ADDIi = 130,
    SUBIi = 131,
    MULIi = 132,
    ADDIf = 133,
    SUBIf = 134,
    MULIf = 135,
    SetG4 = 136,
    ChkRefS = 137,
    ChkNullV = 138,
    CALLINTF = 139,
    iTOb = 140,
    iTOw = 141,
    SetV1 = 142,
    SetV2 = 143,
    Cast = 144,
    i64TOi = 145,
    uTOi64 = 146,
    iTOi64 = 147,
    fTOi64 = 148,
    dTOi64 = 149,
    fTOu64 = 150,
    dTOu64 = 151,
    i64TOf = 152,
    u64TOf = 153,
    i64TOd = 154,
    u64TOd = 155,
    NEGi64 = 156,
    INCi64 = 157,
    DECi64 = 158,
    BNOT64 = 159,
    ADDi64 = 160,
    SUBi64 = 161,
    MULi64 = 162,
    DIVi64 = 163,
    MODi64 = 164,
    BAND64 = 165,
    BOR64 = 166,
    BXOR64 = 167,
    BSLL64 = 168,
    BSRL64 = 169,
    BSRA64 = 170,
    CMPi64 = 171,
    CMPu64 = 172,
    ChkNullS = 173,
    ClrHi = 174,
    JitEntry = 175,
    CallPtr = 176,
    FuncPtr = 177,
    LoadThisR = 178,
    PshV8 = 179,
    DIVu = 180,
    MODu = 181,
    DIVu64 = 182,
    MODu64 = 183,
    LoadRObjR = 184,
    LoadVObjR = 185,
    RefCpyV = 186,
    JLowZ = 187,
    JLowNZ = 188,
    AllocMem = 189,
    SetListSize = 190,
    PshListElmnt = 191,
    SetListType = 192,
    POWi = 193,
    POWu = 194,
    POWf = 195,
    POWd = 196,
    POWdi = 197,
    POWi64 = 198,
    POWu64 = 199,
    Thiscall1 = 200,
    TryBlock = 250,
    VarDecl = 251,
    Block = 252,
    ObjInfo = 253,
    LINE = 254,
    LABEL = 255,
}

impl Opcode {
    /// The engine mnemonic of this opcode.
    #[must_use]
    pub fn mnemonic(self) -> &'static str {
        self.into()
    }

    /// The raw opcode value.
    #[must_use]
    pub fn value(self) -> u8 {
        self as u8
    }

    /// Returns true for the relative jump family, the opcodes [`RULES`] reinterprets as jumps.
    ///
    /// [`RULES`]: crate::bytecode::RULES
    #[must_use]
    pub fn is_jump(self) -> bool {
        reinterpretation(self.value()) == Some(Reinterpretation::Jump)
    }

    /// Returns true for instructions that call a function by id.
    #[must_use]
    pub fn is_call(self) -> bool {
        matches!(
            self,
            Opcode::CALL | Opcode::CALLSYS | Opcode::CALLBND | Opcode::CALLINTF | Opcode::Thiscall1
        )
    }
}
