//! Script bytecode decoding.
//!
//! A compiled function is a stream of 32-bit code words. Each instruction starts with an opcode
//! byte in the low byte of its first word; the engine's [`OpcodeTable`] maps that byte to a
//! display name, an [`OperandShape`] and a size in words. This module decodes the operands of a
//! shape out of the stream and renders them, applying the opcode-specific [`Reinterpretation`]
//! rules for string constants, floats, symbol handles and jumps.
//!
//! # Key Types
//! - [`Opcode`] - The recognized opcode set
//! - [`OperandShape`] - Operand layouts
//! - [`OpcodeTable`] - Engine supplied opcode metadata
//! - [`Instruction`] - A decoded instruction
//! - [`Reinterpretation`] / [`RULES`] - Opcode specific operand meaning
//!
//! # Main Functions
//! - [`decode_instruction`] - Decode one instruction
//! - [`decode_one`] - Decode and render one instruction
//! - [`decode_function`] - Decode and render a whole function
//!
//! # Example
//! ```rust
//! use asfscope::bytecode::{decode_function, DecodeOptions, Opcode, OpcodeTable, PointerWidth};
//! use asfscope::engine::MemoryEngine;
//!
//! let engine = MemoryEngine::new(PointerWidth::Bits32);
//! let table = OpcodeTable::standard(PointerWidth::Bits32);
//! let stream = [u32::from(Opcode::SUSPEND.value()), u32::from(Opcode::RET.value())];
//!
//! for (position, text) in decode_function(&stream, &table, &engine, &DecodeOptions::default())? {
//!     println!("{position:04x}: {text}");
//! }
//! # Ok::<(), asfscope::Error>(())
//! ```

mod decoder;
mod display;
mod instruction;
mod opcodes;
mod rules;
mod shape;
mod table;

pub use decoder::{decode_function, decode_instruction, decode_one};
pub use display::{render_instruction, DecodeOptions, StringEncoding};
pub use instruction::{Instruction, Operand};
pub use opcodes::Opcode;
pub use rules::{reinterpretation, Reinterpretation, RULES};
pub use shape::{OperandKind, OperandShape};
pub use table::{OpcodeInfo, OpcodeTable, PointerWidth};
