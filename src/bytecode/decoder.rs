use log::trace;

use crate::{
    bytecode::{
        display::{render_instruction, DecodeOptions},
        instruction::{Instruction, Operand},
        shape::OperandKind,
        table::OpcodeTable,
    },
    engine::SymbolResolver,
    Error, Parser, Result,
};

/// Largest natural instruction size in code words.
const MAX_WINDOW: usize = 4;

/// Decodes the instruction starting at word `position` of `stream`.
///
/// The opcode is the low byte of the first word. Its table entry selects the operand shape, and
/// the operands are read from the shape's natural window. The returned instruction carries the
/// table's declared size, which is what callers advance by.
///
/// # Arguments
///
/// * `stream` - The function's code words
/// * `position` - Word index of the instruction
/// * `table` - The engine's opcode metadata
///
/// # Errors
///
/// - [`crate::Error::UnknownInstructionShape`] if the opcode declares a shape tag the decoder
///   does not know
/// - [`crate::Error::Malformed`] if the opcode has no table entry, declares a size of zero, or
///   its operands run past the end of the stream
///
/// # Examples
///
/// ```rust
/// use asfscope::bytecode::{decode_instruction, Opcode, OpcodeTable, Operand, PointerWidth};
///
/// let table = OpcodeTable::standard(PointerWidth::Bits32);
/// // ADDi v1, v2, v3
/// let stream = [0x0001_0000 | u32::from(Opcode::ADDi.value()), 0x0003_0002];
///
/// let instruction = decode_instruction(&stream, 0, &table)?;
/// assert_eq!(instruction.mnemonic, "ADDi");
/// assert_eq!(instruction.operands, [Operand::Var(1), Operand::Var(2), Operand::Var(3)]);
/// assert_eq!(instruction.size, 2);
/// # Ok::<(), asfscope::Error>(())
/// ```
pub fn decode_instruction<'t>(
    stream: &[u32],
    position: usize,
    table: &'t OpcodeTable,
) -> Result<Instruction<'t>> {
    let first = *stream
        .get(position)
        .ok_or_else(|| malformed_error!("Position {:04x} is past the end of the stream", position))?;
    let opcode = first.to_le_bytes()[0];

    let info = table
        .get(opcode)
        .ok_or_else(|| malformed_error!("Opcode 0x{:02x} at {:04x} is not in the opcode table", opcode, position))?;
    let shape = info
        .operand_shape()
        .ok_or(Error::UnknownInstructionShape {
            opcode,
            shape: info.shape,
            position,
        })?;

    if info.size == 0 {
        return Err(malformed_error!(
            "{} at {:04x} declares a size of zero",
            info.name,
            position
        ));
    }

    let natural = shape.natural_size();
    let window = position
        .checked_add(natural)
        .and_then(|end| stream.get(position..end))
        .ok_or_else(|| {
            malformed_error!(
                "{} at {:04x} is truncated - needs {} words, {} left",
                info.name,
                position,
                natural,
                stream.len() - position
            )
        })?;

    let mut bytes = [0u8; MAX_WINDOW * 4];
    for (chunk, word) in bytes.chunks_exact_mut(4).zip(window) {
        chunk.copy_from_slice(&word.to_le_bytes());
    }

    // Operands start after the opcode byte, each aligned to its own width (at most a word)
    let mut parser = Parser::new(&bytes[..natural * 4]);
    parser.seek(1)?;

    let kinds = shape.operands();
    let mut operands = Vec::with_capacity(kinds.len());
    for kind in kinds {
        parser.align(kind.width().min(4))?;
        operands.push(match kind {
            OperandKind::Var => Operand::Var(parser.read_le::<u16>()?),
            OperandKind::Word => Operand::Word(parser.read_le::<u16>()?),
            OperandKind::Dword => Operand::Dword(parser.read_le::<u32>()?),
            OperandKind::Qword => Operand::Qword(parser.read_le::<u64>()?),
        });
    }

    Ok(Instruction {
        position,
        opcode,
        mnemonic: &info.name,
        shape,
        size: info.size,
        operands,
    })
}

/// Decodes and renders the instruction at `position`.
///
/// Returns the rendered text and the position of the next instruction, which is `position` plus
/// the opcode's declared size.
///
/// # Errors
///
/// Fails like [`decode_instruction`].
pub fn decode_one(
    stream: &[u32],
    position: usize,
    table: &OpcodeTable,
    resolver: &dyn SymbolResolver,
    options: &DecodeOptions,
) -> Result<(String, usize)> {
    let instruction = decode_instruction(stream, position, table)?;
    let text = render_instruction(&instruction, resolver, options);

    trace!("{position:04x}: {text}");
    Ok((text, instruction.next_position()))
}

/// Decodes and renders a whole function body.
///
/// Every instruction is returned with its word position. The first failure aborts the function;
/// no partial listing is returned.
///
/// # Errors
///
/// Fails like [`decode_instruction`].
pub fn decode_function(
    stream: &[u32],
    table: &OpcodeTable,
    resolver: &dyn SymbolResolver,
    options: &DecodeOptions,
) -> Result<Vec<(usize, String)>> {
    let mut position = 0;
    let mut lines = Vec::new();

    while position < stream.len() {
        let (text, next) = decode_one(stream, position, table, resolver, options)?;
        lines.push((position, text));
        position = next;
    }

    Ok(lines)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        bytecode::{Opcode, OpcodeInfo, OperandShape, PointerWidth},
        engine::MemoryEngine,
    };

    fn op(opcode: Opcode) -> u32 {
        u32::from(opcode.value())
    }

    fn word0(opcode: Opcode, operand: u16) -> u32 {
        op(opcode) | (u32::from(operand) << 16)
    }

    #[test]
    fn operand_layouts() {
        let table = OpcodeTable::standard(PointerWidth::Bits64);

        // SetV8 v2, qword
        let stream = [word0(Opcode::SetV8, 2), 0x89AB_CDEF, 0x0123_4567];
        let instruction = decode_instruction(&stream, 0, &table).unwrap();
        assert_eq!(instruction.shape, OperandShape::WriteVarQword);
        assert_eq!(
            instruction.operands,
            [Operand::Var(2), Operand::Qword(0x0123_4567_89AB_CDEF)]
        );

        // ADDIi v1, v2, dword
        let stream = [word0(Opcode::ADDIi, 1), 2, 0xFFFF_FFFE];
        let instruction = decode_instruction(&stream, 0, &table).unwrap();
        assert_eq!(
            instruction.operands,
            [Operand::Var(1), Operand::Var(2), Operand::Dword(0xFFFF_FFFE)]
        );
        assert_eq!(instruction.size, 3);

        // ALLOC qword, dword
        let stream = [op(Opcode::ALLOC), 0x1000, 0, 7];
        let instruction = decode_instruction(&stream, 0, &table).unwrap();
        assert_eq!(instruction.operands, [Operand::Qword(0x1000), Operand::Dword(7)]);

        // SetListSize v4, dword, dword
        let stream = [word0(Opcode::SetListSize, 4), 8, 3];
        let instruction = decode_instruction(&stream, 0, &table).unwrap();
        assert_eq!(
            instruction.operands,
            [Operand::Var(4), Operand::Dword(8), Operand::Dword(3)]
        );
    }

    #[test]
    fn no_operand_advance() {
        let engine = MemoryEngine::new(PointerWidth::Bits32);
        let table = OpcodeTable::standard(PointerWidth::Bits32);
        let stream = [op(Opcode::PopPtr), op(Opcode::SUSPEND)];

        let (text, next) =
            decode_one(&stream, 0, &table, &engine, &DecodeOptions::default()).unwrap();
        assert_eq!(text, "PopPtr");
        assert_eq!(next, 1);

        // The declared size wins over the shape
        let table = table.with(
            Opcode::PopPtr.value(),
            OpcodeInfo::new("PopPtr", OperandShape::NoArg as u8, 2),
        );
        let (_, next) = decode_one(&stream, 0, &table, &engine, &DecodeOptions::default()).unwrap();
        assert_eq!(next, 2);
    }

    #[test]
    fn jump_target() {
        let engine = MemoryEngine::new(PointerWidth::Bits32);
        let table = OpcodeTable::standard(PointerWidth::Bits32);

        let mut stream = vec![op(Opcode::SUSPEND); 10];
        stream.extend([op(Opcode::JMP), (-3i32) as u32]);

        let (text, next) =
            decode_one(&stream, 10, &table, &engine, &DecodeOptions::default()).unwrap();
        assert_eq!(text, "JMP -3 (d:7)");
        assert_eq!(next, 12);
    }

    #[test]
    fn unknown_shape() {
        let engine = MemoryEngine::new(PointerWidth::Bits32);
        let table = OpcodeTable::standard(PointerWidth::Bits32)
            .with(Opcode::NOT.value(), OpcodeInfo::new("NOT", 77, 1));
        let stream = [op(Opcode::SUSPEND), word0(Opcode::NOT, 1)];

        let result = decode_function(&stream, &table, &engine, &DecodeOptions::default());
        assert!(matches!(
            result,
            Err(Error::UnknownInstructionShape {
                opcode: 6,
                shape: 77,
                position: 1
            })
        ));
    }

    #[test]
    fn malformed_streams() {
        let table = OpcodeTable::standard(PointerWidth::Bits32);

        // Truncated operand
        let stream = [op(Opcode::PshC4)];
        assert!(matches!(
            decode_instruction(&stream, 0, &table),
            Err(Error::Malformed { .. })
        ));

        // Unassigned opcode
        assert!(matches!(
            decode_instruction(&[230], 0, &table),
            Err(Error::Malformed { .. })
        ));

        // Info opcodes are declared with size zero
        assert!(matches!(
            decode_instruction(&[word0(Opcode::LABEL, 1)], 0, &table),
            Err(Error::Malformed { .. })
        ));

        assert!(decode_instruction(&[], 0, &table).is_err());
    }

    #[test]
    fn whole_function() {
        let engine = MemoryEngine::new(PointerWidth::Bits32).with_function_declaration(3, "int f()");
        let table = OpcodeTable::standard(PointerWidth::Bits32);
        let stream = [
            op(Opcode::CALL),
            3,
            word0(Opcode::CpyRtoV4, 1),
            word0(Opcode::RET, 0),
        ];

        let lines = decode_function(&stream, &table, &engine, &DecodeOptions::default()).unwrap();
        assert_eq!(
            lines,
            [
                (0, "CALL 3 (int f())".to_string()),
                (2, "CpyRtoV4 v1".to_string()),
                (3, "RET 0".to_string()),
            ]
        );
    }
}
