//! # asfscope Prelude
//!
//! This module provides a convenient prelude for the most commonly used types and traits
//! from the asfscope library. Import this module to get quick access to the essential
//! types for loading and disassembling modules.

// ================================================================================================
// Core Types and Error Handling
// ================================================================================================

/// The main error type for all asfscope operations
pub use crate::Error;

/// The result type used throughout asfscope
pub use crate::Result;

/// Low-level file parsing utilities
pub use crate::{File, Parser};

// ================================================================================================
// Containers
// ================================================================================================

/// Container parsing and writing
pub use crate::container::{ContainerBuilder, ContainerHeader};

// ================================================================================================
// Module Resolution
// ================================================================================================

/// The module cache and its configuration
pub use crate::tracker::{ModuleTracker, TrackerBuilder};

/// Cached modules and their states
pub use crate::tracker::{FailureReason, Module, ModuleId, ModuleState};

/// Module sources
pub use crate::tracker::{DirectorySource, MemorySource, ModuleSource};

/// Engine free dependency discovery
pub use crate::tracker::DependencyGraph;

// ================================================================================================
// Engine Collaborator
// ================================================================================================

/// Engine traits
pub use crate::engine::{ScriptEngine, SymbolResolver};

/// Module metadata snapshots
pub use crate::engine::{FunctionInfo, ModuleHandle, ModuleInfo};

/// Engine diagnostics
pub use crate::engine::{MessageInfo, MessageKind};

/// In-memory engine
pub use crate::engine::MemoryEngine;

/// Host registration
pub use crate::host::HostManifest;

// ================================================================================================
// Decoding and Disassembly
// ================================================================================================

/// Opcode metadata
pub use crate::bytecode::{Opcode, OpcodeTable, OperandShape, PointerWidth};

/// Decoding entry points and options
pub use crate::bytecode::{decode_function, decode_one, DecodeOptions, StringEncoding};

/// Module dumps
pub use crate::disassembler::{Disassembler, DisassemblyReport};
